use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use text_feature_vectorizer::{
    cosine_similarity_matrix, Corpus, CountVectorizer, DocFrequency, Documents, LabeledTable, Norm,
    StopWords, TfidfParams, TfidfVectorizer, VectorizerParams,
};

/// Turn a CSV of documents into count or TF-IDF matrices.
#[derive(Parser)]
#[command(name = "vectorize", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Raw term counts, one column per vocabulary term
    Counts {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        vectorizer: VectorizerArgs,
    },

    /// TF-IDF weighted counts
    Tfidf {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        vectorizer: VectorizerArgs,
        #[command(flatten)]
        tfidf: TfidfArgs,
    },

    /// Pairwise cosine similarity between documents
    Similarity {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        vectorizer: VectorizerArgs,
        #[command(flatten)]
        tfidf: TfidfArgs,
        /// Matrix the similarity is computed on
        #[arg(long, value_enum, default_value_t = Representation::Tfidf)]
        representation: Representation,
    },

    /// Print the fitted vocabulary and the most common terms
    Vocabulary {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        vectorizer: VectorizerArgs,
        /// Number of most common terms to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input CSV with a header row
    #[arg(long, short)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "filename")]
    filename_column: String,

    #[arg(long, default_value = "contents")]
    contents_column: String,
}

#[derive(Args)]
struct VectorizerArgs {
    /// JSON file with the full vectorizer configuration; flags below override it
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    ngram_min: Option<usize>,

    #[arg(long)]
    ngram_max: Option<usize>,

    #[arg(long, value_enum)]
    stop_words: Option<StopWordsArg>,

    /// Custom stop word (repeatable); replaces --stop-words
    #[arg(long = "stop-word")]
    stop_word: Vec<String>,

    /// Minimum document frequency: a count ("2") or a proportion ("0.1")
    #[arg(long)]
    min_df: Option<DocFrequency>,

    /// Maximum document frequency: a count ("10") or a proportion ("0.5")
    #[arg(long)]
    max_df: Option<DocFrequency>,

    #[arg(long)]
    max_features: Option<usize>,

    #[arg(long)]
    min_token_len: Option<usize>,

    /// Keep the original letter case
    #[arg(long)]
    no_lowercase: bool,

    /// File with one vocabulary term per line; disables inference
    #[arg(long)]
    vocabulary_file: Option<PathBuf>,
}

#[derive(Args)]
struct TfidfArgs {
    #[arg(long)]
    no_smooth_idf: bool,

    #[arg(long)]
    sublinear_tf: bool,

    #[arg(long, value_enum, default_value_t = NormArg::L2)]
    norm: NormArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum StopWordsArg {
    None,
    English,
}

#[derive(Clone, Copy, ValueEnum)]
enum NormArg {
    L1,
    L2,
    None,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum Representation {
    Counts,
    Tfidf,
}

impl VectorizerArgs {
    fn to_params(&self) -> Result<VectorizerParams> {
        let mut params = match &self.params {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading params file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing params file {}", path.display()))?
            }
            None => VectorizerParams::default(),
        };
        if self.ngram_min.is_some() || self.ngram_max.is_some() {
            let min_n = self.ngram_min.unwrap_or(params.ngram_range.min_n());
            let max_n = self.ngram_max.unwrap_or(params.ngram_range.max_n().max(min_n));
            params = params.with_ngram_range(min_n, max_n);
        }
        if !self.stop_word.is_empty() {
            params = params.with_stop_words(StopWords::custom(self.stop_word.iter().cloned()));
        } else if let Some(sw) = self.stop_words {
            params = params.with_stop_words(match sw {
                StopWordsArg::None => StopWords::None,
                StopWordsArg::English => StopWords::English,
            });
        }
        if let Some(min_df) = self.min_df {
            params = params.with_min_df(min_df);
        }
        if let Some(max_df) = self.max_df {
            params = params.with_max_df(max_df);
        }
        if let Some(max_features) = self.max_features {
            params = params.with_max_features(max_features);
        }
        if let Some(len) = self.min_token_len {
            params = params.with_min_token_len(len);
        }
        if self.no_lowercase {
            params = params.with_lowercase(false);
        }
        if let Some(path) = &self.vocabulary_file {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading vocabulary file {}", path.display()))?;
            let terms = raw.lines().map(str::trim).filter(|l| !l.is_empty());
            params = params.with_vocabulary(terms);
        }
        Ok(params)
    }
}

impl TfidfArgs {
    fn to_params(&self) -> TfidfParams {
        let norm = match self.norm {
            NormArg::L1 => Some(Norm::L1),
            NormArg::L2 => Some(Norm::L2),
            NormArg::None => None,
        };
        TfidfParams::default()
            .with_smooth_idf(!self.no_smooth_idf)
            .with_sublinear_tf(self.sublinear_tf)
            .with_norm(norm)
    }
}

impl IoArgs {
    fn load(&self) -> Result<Documents> {
        let docs = Documents::from_csv_path(&self.input, &self.filename_column, &self.contents_column)
            .with_context(|| format!("loading documents from {}", self.input.display()))?;
        info!(num_docs = docs.len(), input = %self.input.display(), "Documents loaded");
        Ok(docs)
    }

    fn writer(&self) -> Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("creating output file {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout().lock()),
        };
        Ok(writer)
    }

    /// Metadata columns keep the input's names.
    fn table<N>(&self, table: LabeledTable<N>) -> LabeledTable<N>
    where
        N: num::Num + Copy + std::fmt::Display,
    {
        table.with_metadata_columns(&self.filename_column, &self.contents_column)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("text_feature_vectorizer=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Counts { io, vectorizer } => {
            let docs = io.load()?;
            let cv = CountVectorizer::new(vectorizer.to_params()?)?;
            let (vocabulary, counts) = cv.fit_transform(&docs.contents())?;
            info!(vocab_size = vocabulary.len(), "Count matrix ready");
            let table = io.table(LabeledTable::new(&docs, &vocabulary, counts)?);
            table.write_csv(io.writer()?)?;
        }

        Commands::Tfidf {
            io,
            vectorizer,
            tfidf,
        } => {
            let docs = io.load()?;
            let tv = TfidfVectorizer::new(vectorizer.to_params()?, tfidf.to_params())?;
            let (model, matrix) = tv.fit_transform(&docs.contents())?;
            info!(vocab_size = model.vocabulary.len(), "TF-IDF matrix ready");
            let table = io.table(LabeledTable::new(&docs, &model.vocabulary, matrix)?);
            table.write_csv(io.writer()?)?;
        }

        Commands::Similarity {
            io,
            vectorizer,
            tfidf,
            representation,
        } => {
            let docs = io.load()?;
            let params = vectorizer.to_params()?;
            let similarity = if representation == Representation::Counts {
                let (_, counts) = CountVectorizer::new(params)?.fit_transform(&docs.contents())?;
                cosine_similarity_matrix(&counts)
            } else {
                let tv = TfidfVectorizer::new(params, tfidf.to_params())?;
                let (_, matrix) = tv.fit_transform(&docs.contents())?;
                cosine_similarity_matrix(&matrix)
            };
            similarity.write_csv(&docs.filenames(), io.writer()?)?;
        }

        Commands::Vocabulary {
            io,
            vectorizer,
            top,
        } => {
            let docs = io.load()?;
            let cv = CountVectorizer::new(vectorizer.to_params()?)?;
            let contents = docs.contents();
            let vocabulary = cv.fit(&contents)?;
            let corpus = Corpus::from_analyzed(&cv.analyzer().analyze_corpus(&contents));

            let mut out = io.writer()?;
            writeln!(out, "# {} terms", vocabulary.len())?;
            for term in vocabulary.terms() {
                writeln!(out, "{term}")?;
            }
            writeln!(out, "# most common")?;
            for (term, count) in corpus.most_common(top) {
                writeln!(out, "{term}\t{count}")?;
            }
            out.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_feature_vectorizer::NgramRange;

    fn vectorizer_args(flags: &[&str]) -> VectorizerArgs {
        let argv = ["vectorize", "counts", "--input", "docs.csv"]
            .iter()
            .chain(flags)
            .copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Counts { vectorizer, .. } => vectorizer,
            _ => unreachable!("parsed a counts command"),
        }
    }

    fn ngram_range(params: &VectorizerParams) -> (usize, usize) {
        (params.ngram_range.min_n(), params.ngram_range.max_n())
    }

    #[test]
    fn no_flags_give_default_params() {
        assert_eq!(vectorizer_args(&[]).to_params().unwrap(), VectorizerParams::default());
    }

    #[test]
    fn ngram_max_follows_a_larger_ngram_min() {
        let params = vectorizer_args(&["--ngram-min", "2"]).to_params().unwrap();
        assert_eq!(ngram_range(&params), (2, 2));
        let params = vectorizer_args(&["--ngram-max", "3"]).to_params().unwrap();
        assert_eq!(ngram_range(&params), (1, 3));
    }

    #[test]
    fn stop_word_list_replaces_the_builtin_choice() {
        let params = vectorizer_args(&[
            "--stop-words",
            "english",
            "--stop-word",
            "kings",
            "--stop-word",
            "hens",
        ])
        .to_params()
        .unwrap();
        assert_eq!(params.stop_words, StopWords::custom(["kings", "hens"]));

        let params = vectorizer_args(&["--stop-words", "english"]).to_params().unwrap();
        assert_eq!(params.stop_words, StopWords::English);
    }

    #[test]
    fn flags_override_the_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(
            &path,
            r#"{"ngram_range":{"min_n":1,"max_n":3},"min_df":{"count":2},"stop_words":"english"}"#,
        )
        .unwrap();
        let file = path.to_str().unwrap();

        let from_file = vectorizer_args(&["--params", file]).to_params().unwrap();
        assert_eq!(from_file.ngram_range, NgramRange::new(1, 3).unwrap());
        assert_eq!(from_file.min_df, DocFrequency::Count(2));
        assert_eq!(from_file.stop_words, StopWords::English);

        let overridden = vectorizer_args(&["--params", file, "--ngram-min", "2", "--max-df", "0.5"])
            .to_params()
            .unwrap();
        // max_n comes from the file, min_n from the flag
        assert_eq!(ngram_range(&overridden), (2, 3));
        assert_eq!(overridden.min_df, DocFrequency::Count(2));
        assert_eq!(overridden.max_df, DocFrequency::Proportion(0.5));
        assert_eq!(overridden.stop_words, StopWords::English);

        let widened = vectorizer_args(&["--params", file, "--ngram-min", "4"]).to_params().unwrap();
        assert_eq!(ngram_range(&widened), (4, 4));
    }

    #[test]
    fn missing_params_file_is_reported() {
        let err = vectorizer_args(&["--params", "/nonexistent/params.json"])
            .to_params()
            .unwrap_err();
        assert!(err.to_string().contains("reading params file"));
    }
}
