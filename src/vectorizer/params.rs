use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};
use crate::vectorizer::stop_words::StopWords;
use crate::vectorizer::token::DefaultTokenizer;

/// Inclusive n-gram length range. `(1, 1)` means unigrams only.
///
/// Built through [`NgramRange::new`] or `TryFrom<(usize, usize)>`, both of
/// which reject `min_n == 0` and `min_n > max_n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramRange {
    min_n: usize,
    max_n: usize,
}

impl NgramRange {
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        let range = Self { min_n, max_n };
        range.validate()?;
        Ok(range)
    }

    pub const fn unigrams() -> Self {
        Self { min_n: 1, max_n: 1 }
    }

    #[inline]
    pub fn min_n(&self) -> usize {
        self.min_n
    }

    #[inline]
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_n == 0 || self.min_n > self.max_n {
            return Err(VectorizerError::InvalidConfig(format!(
                "ngram_range ({}, {}) must satisfy 1 <= min_n <= max_n",
                self.min_n, self.max_n
            )));
        }
        Ok(())
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self::unigrams()
    }
}

impl TryFrom<(usize, usize)> for NgramRange {
    type Error = VectorizerError;

    fn try_from((min_n, max_n): (usize, usize)) -> Result<Self> {
        Self::new(min_n, max_n)
    }
}

/// Document frequency threshold.
/// - `Count(k)`: an absolute number of documents
/// - `Proportion(p)`: a share of the corpus, `p` in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFrequency {
    Count(usize),
    Proportion(f64),
}

impl DocFrequency {
    /// Threshold in documents for a corpus of `n_docs` documents.
    pub fn resolve(self, n_docs: usize) -> f64 {
        match self {
            DocFrequency::Count(k) => k as f64,
            DocFrequency::Proportion(p) => p * n_docs as f64,
        }
    }

    fn validate(self, name: &str) -> Result<()> {
        match self {
            DocFrequency::Proportion(p) if !(0.0..=1.0).contains(&p) => {
                Err(VectorizerError::InvalidConfig(format!(
                    "{name} proportion {p} is outside [0.0, 1.0]"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// `"2"` parses as a count, `"0.5"` or `"1.0"` as a proportion.
impl FromStr for DocFrequency {
    type Err = VectorizerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains(['.', 'e', 'E']) {
            s.parse::<f64>()
                .map(DocFrequency::Proportion)
                .map_err(|e| VectorizerError::InvalidConfig(format!("bad proportion `{s}`: {e}")))
        } else {
            s.parse::<usize>()
                .map(DocFrequency::Count)
                .map_err(|e| VectorizerError::InvalidConfig(format!("bad count `{s}`: {e}")))
        }
    }
}

impl fmt::Display for DocFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocFrequency::Count(k) => write!(f, "{k}"),
            DocFrequency::Proportion(p) => write!(f, "{p:?}"),
        }
    }
}

/// Configuration shared by the count and TF-IDF vectorizers.
///
/// `lowercase` and `min_token_len` only configure the default tokenizer;
/// a tokenizer passed with `with_tokenizer` applies its own policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerParams {
    pub ngram_range: NgramRange,
    pub stop_words: StopWords,
    /// Terms must appear in at least this many documents.
    pub min_df: DocFrequency,
    /// Terms must appear in at most this many documents.
    pub max_df: DocFrequency,
    /// Keep only the most frequent terms across the corpus.
    pub max_features: Option<usize>,
    /// Fixed vocabulary. Inference and df filtering are skipped and the
    /// column order follows this list.
    pub vocabulary: Option<Vec<String>>,
    pub lowercase: bool,
    pub min_token_len: usize,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            ngram_range: NgramRange::unigrams(),
            stop_words: StopWords::None,
            min_df: DocFrequency::Count(1),
            max_df: DocFrequency::Proportion(1.0),
            max_features: None,
            vocabulary: None,
            lowercase: true,
            min_token_len: 2,
        }
    }
}

impl VectorizerParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checked later by [`VectorizerParams::validate`].
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = NgramRange { min_n, max_n };
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn with_min_df(mut self, min_df: DocFrequency) -> Self {
        self.min_df = min_df;
        self
    }

    pub fn with_max_df(mut self, max_df: DocFrequency) -> Self {
        self.max_df = max_df;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_vocabulary<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = Some(terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = min_token_len;
        self
    }

    /// Tokenizer described by `lowercase` / `min_token_len`.
    pub fn default_tokenizer(&self) -> DefaultTokenizer {
        DefaultTokenizer::new(self.lowercase, self.min_token_len)
    }

    pub fn validate(&self) -> Result<()> {
        self.ngram_range.validate()?;
        self.min_df.validate("min_df")?;
        self.max_df.validate("max_df")?;
        if self.max_features == Some(0) {
            return Err(VectorizerError::InvalidConfig(
                "max_features must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Row normalization applied after IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfParams {
    /// idf = ln((1 + n) / (1 + df)) + 1 when set, ln(n / df) + 1 otherwise
    pub smooth_idf: bool,
    /// replace tf with 1 + ln(tf)
    pub sublinear_tf: bool,
    /// `None` leaves rows unnormalized
    pub norm: Option<Norm>,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            smooth_idf: true,
            sublinear_tf: false,
            norm: Some(Norm::L2),
        }
    }
}

impl TfidfParams {
    pub fn with_smooth_idf(mut self, smooth_idf: bool) -> Self {
        self.smooth_idf = smooth_idf;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.norm = norm;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_frequency_parses_counts_and_proportions() {
        assert_eq!("2".parse::<DocFrequency>().unwrap(), DocFrequency::Count(2));
        assert_eq!("0.5".parse::<DocFrequency>().unwrap(), DocFrequency::Proportion(0.5));
        assert_eq!("1.0".parse::<DocFrequency>().unwrap(), DocFrequency::Proportion(1.0));
        assert!("two".parse::<DocFrequency>().is_err());
    }

    #[test]
    fn doc_frequency_resolves_against_corpus_size() {
        assert_eq!(DocFrequency::Count(2).resolve(6), 2.0);
        assert_eq!(DocFrequency::Proportion(0.5).resolve(6), 3.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(VectorizerParams::new().validate().is_ok());
        assert!(VectorizerParams::new().with_ngram_range(0, 1).validate().is_err());
        assert!(VectorizerParams::new().with_ngram_range(3, 2).validate().is_err());
        assert!(VectorizerParams::new()
            .with_max_df(DocFrequency::Proportion(1.5))
            .validate()
            .is_err());
        assert!(VectorizerParams::new().with_max_features(0).validate().is_err());
    }

    #[test]
    fn ngram_range_construction_is_checked() {
        let range = NgramRange::try_from((1, 3)).unwrap();
        assert_eq!((range.min_n(), range.max_n()), (1, 3));
        assert!(NgramRange::try_from((0, 2)).is_err());
        assert!(NgramRange::new(2, 1).is_err());
        assert_eq!(NgramRange::default(), NgramRange::unigrams());
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: VectorizerParams = serde_json::from_str(
            r#"{"ngram_range":{"min_n":1,"max_n":2},"min_df":{"count":2},"max_df":{"proportion":0.5}}"#,
        )
        .unwrap();
        assert_eq!(params.ngram_range, NgramRange::new(1, 2).unwrap());
        assert_eq!(params.min_df, DocFrequency::Count(2));
        assert_eq!(params.max_df, DocFrequency::Proportion(0.5));
        assert_eq!(params.stop_words, StopWords::None);
        assert!(params.lowercase);
    }
}
