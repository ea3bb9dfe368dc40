use rayon::prelude::*;
use sprs::CsMat;
use tracing::{debug, warn};

use crate::error::Result;
use crate::utils::datastruct::csr_from_rows;
use crate::vectorizer::{
    analyzer::Analyzer,
    corpus::Corpus,
    params::VectorizerParams,
    token::{DefaultTokenizer, Tokenizer},
    vocabulary::Vocabulary,
};

/// Raw term counts, rows = documents, columns = vocabulary terms
pub type CountMatrix = CsMat<u32>;

/// Counts vocabulary terms per document.
///
/// The analyzer must be the one the vocabulary was built with. A mismatch
/// is logged and the matrix is still produced; its columns are then only
/// as meaningful as the overlap between the two policies.
pub fn count_matrix<T, D>(analyzer: &Analyzer<T>, vocabulary: &Vocabulary, docs: &[D]) -> CountMatrix
where
    T: Tokenizer,
    D: AsRef<str> + Sync,
{
    check_signature(analyzer, vocabulary);
    let analyzed = analyzer.analyze_corpus(docs);
    count_analyzed(vocabulary, &analyzed)
}

fn check_signature<T: Tokenizer>(analyzer: &Analyzer<T>, vocabulary: &Vocabulary) {
    if let Some(expected) = vocabulary.analyzer_signature() {
        let actual = analyzer.signature();
        if expected != actual {
            warn!(
                expected,
                actual = %actual,
                "Analyzer differs from the one that built the vocabulary; counts may be unreliable"
            );
        }
    }
}

/// Counts from documents that were already analyzed.
pub fn count_analyzed<S>(vocabulary: &Vocabulary, analyzed: &[Vec<S>]) -> CountMatrix
where
    S: AsRef<str> + Sync,
{
    let rows: Vec<Vec<(usize, u32)>> = analyzed
        .par_iter()
        .map(|terms| {
            let mut cols: Vec<usize> = terms
                .iter()
                .filter_map(|term| vocabulary.index_of(term.as_ref()))
                .collect();
            cols.sort_unstable();
            run_lengths(&cols)
        })
        .collect();
    let matrix = csr_from_rows(vocabulary.len(), rows);
    debug!(
        num_docs = analyzed.len(),
        num_features = vocabulary.len(),
        "Count matrix built"
    );
    matrix
}

/// Collapses a sorted column list into `(col, occurrences)` pairs.
fn run_lengths(sorted_cols: &[usize]) -> Vec<(usize, u32)> {
    let mut out: Vec<(usize, u32)> = Vec::new();
    for &col in sorted_cols {
        match out.last_mut() {
            Some((last, count)) if *last == col => *count += 1,
            _ => out.push((col, 1)),
        }
    }
    out
}

/// Count vectorizer: vocabulary inference plus count matrix construction.
///
/// The fitted [`Vocabulary`] is returned to the caller and passed back in
/// for `transform`; the vectorizer itself holds configuration only.
#[derive(Debug, Clone)]
pub struct CountVectorizer<T = DefaultTokenizer> {
    params: VectorizerParams,
    analyzer: Analyzer<T>,
}

impl CountVectorizer<DefaultTokenizer> {
    pub fn new(params: VectorizerParams) -> Result<Self> {
        let tokenizer = params.default_tokenizer();
        Self::with_tokenizer(params, tokenizer)
    }
}

impl<T> CountVectorizer<T>
where
    T: Tokenizer,
{
    /// Uses `tokenizer` instead of the default one.
    pub fn with_tokenizer(params: VectorizerParams, tokenizer: T) -> Result<Self> {
        params.validate()?;
        let analyzer = Analyzer::new(tokenizer, params.ngram_range, &params.stop_words)?;
        Ok(Self { params, analyzer })
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }

    pub fn analyzer(&self) -> &Analyzer<T> {
        &self.analyzer
    }

    pub fn fit<D>(&self, docs: &[D]) -> Result<Vocabulary>
    where
        D: AsRef<str> + Sync,
    {
        debug!(num_docs = docs.len(), "Fitting CountVectorizer");
        let analyzed = self.analyzer.analyze_corpus(docs);
        self.fit_analyzed(&analyzed)
    }

    pub fn transform<D>(&self, vocabulary: &Vocabulary, docs: &[D]) -> CountMatrix
    where
        D: AsRef<str> + Sync,
    {
        count_matrix(&self.analyzer, vocabulary, docs)
    }

    /// Analyzes the documents once and reuses the result for both steps.
    pub fn fit_transform<D>(&self, docs: &[D]) -> Result<(Vocabulary, CountMatrix)>
    where
        D: AsRef<str> + Sync,
    {
        debug!(num_docs = docs.len(), "fit_transform with single analysis pass");
        let analyzed = self.analyzer.analyze_corpus(docs);
        let vocabulary = self.fit_analyzed(&analyzed)?;
        let matrix = count_analyzed(&vocabulary, &analyzed);
        Ok((vocabulary, matrix))
    }

    fn fit_analyzed(&self, analyzed: &[Vec<String>]) -> Result<Vocabulary> {
        let signature = Some(self.analyzer.signature());
        match &self.params.vocabulary {
            Some(terms) => Vocabulary::from_terms(terms.iter().cloned(), signature),
            None => {
                let corpus = Corpus::from_analyzed(analyzed);
                Vocabulary::build(&corpus, &self.params, signature)
            }
        }
    }
}
