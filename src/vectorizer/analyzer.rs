use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::vectorizer::{
    params::NgramRange,
    stop_words::StopWords,
    token::{DefaultTokenizer, Tokenizer},
};

/// Minimum number of documents before corpus analysis goes parallel
const MIN_DOCS_FOR_PARALLEL: usize = 64;

/// Turns a document into the terms counted by the vectorizers:
/// tokenize, drop stop words, then expand into n-grams.
#[derive(Debug, Clone)]
pub struct Analyzer<T = DefaultTokenizer> {
    tokenizer: T,
    ngram_range: NgramRange,
    stop_words: HashSet<String>,
    stop_words_label: String,
}

impl<T> Analyzer<T>
where
    T: Tokenizer,
{
    /// Fails with `InvalidConfig` when `ngram_range` is not `1 <= min_n <= max_n`.
    pub fn new(tokenizer: T, ngram_range: NgramRange, stop_words: &StopWords) -> Result<Self> {
        ngram_range.validate()?;
        Ok(Self {
            tokenizer,
            ngram_range,
            stop_words: stop_words.to_set(),
            stop_words_label: stop_words.label(),
        })
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn ngram_range(&self) -> NgramRange {
        self.ngram_range
    }

    /// Terms of one document, in document order, grouped by increasing n.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens: Vec<String> = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|tok| !self.stop_words.contains(tok))
            .collect();
        ngrams(tokens, self.ngram_range)
    }

    /// Terms of every document. Output order always matches input order.
    pub fn analyze_corpus<D>(&self, docs: &[D]) -> Vec<Vec<String>>
    where
        D: AsRef<str> + Sync,
    {
        if docs.len() >= MIN_DOCS_FOR_PARALLEL {
            debug!(num_docs = docs.len(), "Analyzing documents in parallel");
            docs.par_iter().map(|doc| self.analyze(doc.as_ref())).collect()
        } else {
            debug!(num_docs = docs.len(), "Analyzing documents sequentially");
            docs.iter().map(|doc| self.analyze(doc.as_ref())).collect()
        }
    }

    /// Identifies the whole analysis policy (tokenizer, stop words, n-grams).
    pub fn signature(&self) -> String {
        format!(
            "{}|stop_words={}|ngram={}..={}",
            self.tokenizer.name(),
            self.stop_words_label,
            self.ngram_range.min_n(),
            self.ngram_range.max_n()
        )
    }
}

/// Every contiguous window of `min_n..=max_n` tokens joined by a single
/// space. Windows longer than the document are skipped, and so is `n = 0`.
pub fn ngrams(tokens: Vec<String>, range: NgramRange) -> Vec<String> {
    let (min_n, max_n) = (range.min_n().max(1), range.max_n());
    if min_n == 1 && max_n == 1 {
        return tokens;
    }
    let mut out = Vec::new();
    for n in min_n..=max_n {
        if n == 1 {
            out.extend(tokens.iter().cloned());
            continue;
        }
        out.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    out
}
