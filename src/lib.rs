/// This crate turns a collection of documents into document-term matrices
/// (raw counts or TF-IDF) and compares documents by cosine similarity.
pub mod error;
pub mod utils;
pub mod vectorizer;

/// Error type and `Result` alias shared by every fallible operation.
pub use error::{Result, VectorizerError};

/// Tokenizer capability
/// Anything that maps a string to an ordered sequence of tokens can be
/// plugged into the vectorizers. `DefaultTokenizer` lower-cases, splits on
/// every non-alphanumeric character and drops tokens shorter than
/// `min_token_len`. `FnTokenizer` wraps a closure.
pub use vectorizer::token::{DefaultTokenizer, FnTokenizer, Tokenizer};

/// Analyzer
/// Tokenizer + stop-word removal + n-gram expansion. Its `signature()` is
/// recorded in every fitted `Vocabulary`.
pub use vectorizer::analyzer::Analyzer;

/// Vectorizer configuration
/// Serde-serializable, builder style, validated when a vectorizer is built.
pub use vectorizer::params::{DocFrequency, NgramRange, Norm, TfidfParams, VectorizerParams};
pub use vectorizer::stop_words::StopWords;

/// Corpus statistics
/// Document count plus per-term document frequency and total count.
/// `most_common(k)` lists the most frequent terms.
pub use vectorizer::corpus::{Corpus, TermStat};

/// Vocabulary
/// Term to column index mapping. Inferred vocabularies are sorted; a
/// supplied one keeps its order.
pub use vectorizer::vocabulary::Vocabulary;

/// Count Vectorizer
/// Fits a vocabulary and builds raw count matrices. `fit` and `transform`
/// can run on different corpora.
pub use vectorizer::count::{count_matrix, CountMatrix, CountVectorizer};

/// TF-IDF Vectorizer and Transformer
/// `TfidfTransformer` rescales any count matrix; `TfidfVectorizer` runs the
/// count vectorizer first. The calculation is pluggable through
/// `TfidfEngine`; `DefaultTfidfEngine` uses smoothed IDF.
pub use vectorizer::tfidf::{
    DefaultTfidfEngine, IdfVector, TfidfEngine, TfidfMatrix, TfidfModel, TfidfTransformer,
    TfidfVectorizer,
};

/// Cosine similarity between every pair of matrix rows.
pub use vectorizer::compare::{cosine_similarity_matrix, SimilarityMatrix};

/// Input documents and labeled CSV export.
pub use vectorizer::document::{Document, Documents};
pub use vectorizer::export::LabeledTable;

/// Sparse matrix storage
/// `MatrixView` is the read interface every consumer uses. The vectorizers
/// return `sprs::CsMat` in CSR layout, which implements it.
pub use sprs::CsMat;
pub use utils::datastruct::{csr_from_rows, csr_zeros, MatrixView};
