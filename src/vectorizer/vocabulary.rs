use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VectorizerError};
use crate::vectorizer::{corpus::Corpus, params::VectorizerParams};

/// Term → column index mapping.
///
/// The column index of a term is its position in the set. Inferred
/// vocabularies are sorted lexicographically; a supplied vocabulary keeps
/// the caller's order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<String>,
    /// signature of the analyzer that produced the terms, if known
    analyzer_signature: Option<String>,
    fixed: bool,
}

impl Vocabulary {
    /// Infers the vocabulary from corpus statistics, applying the
    /// `min_df` / `max_df` / `max_features` filters of `params`.
    pub fn build(
        corpus: &Corpus,
        params: &VectorizerParams,
        analyzer_signature: Option<String>,
    ) -> Result<Self> {
        params.validate()?;
        if corpus.vocab_size() == 0 {
            return Err(VectorizerError::EmptyVocabulary(
                "documents contain no terms; perhaps they only contain stop words".to_string(),
            ));
        }

        let n_docs = corpus.doc_num();
        let min_count = params.min_df.resolve(n_docs);
        let max_count = params.max_df.resolve(n_docs);
        if max_count < min_count {
            return Err(VectorizerError::InvalidConfig(format!(
                "max_df ({}) corresponds to fewer documents than min_df ({})",
                params.max_df, params.min_df
            )));
        }

        let mut kept: Vec<(&str, u64)> = corpus
            .iter()
            .filter(|(_, stat)| {
                let df = stat.doc_freq as f64;
                df >= min_count && df <= max_count
            })
            .map(|(term, stat)| (term, stat.count))
            .collect();
        debug!(
            original_size = corpus.vocab_size(),
            filtered_size = kept.len(),
            min_count,
            max_count,
            "Vocabulary filtered by document frequency"
        );

        kept.sort_unstable_by(|a, b| a.0.cmp(b.0));
        if let Some(limit) = params.max_features {
            if kept.len() > limit {
                // highest counts first, ties in term order
                kept.sort_by(|a, b| b.1.cmp(&a.1));
                kept.truncate(limit);
                kept.sort_unstable_by(|a, b| a.0.cmp(b.0));
                debug!(max_features = limit, "Vocabulary truncated by max_features");
            }
        }

        if kept.is_empty() {
            return Err(VectorizerError::EmptyVocabulary(
                "after pruning, no terms remain; try a lower min_df or a higher max_df"
                    .to_string(),
            ));
        }

        let terms: IndexSet<String> = kept.into_iter().map(|(t, _)| t.to_string()).collect();
        debug!(vocab_size = terms.len(), "Vocabulary built");
        Ok(Self {
            terms,
            analyzer_signature,
            fixed: false,
        })
    }

    /// Fixed vocabulary in caller order. Duplicates and an empty list are
    /// rejected.
    pub fn from_terms<I, S>(terms: I, analyzer_signature: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for term in terms {
            let term = term.into();
            if set.contains(&term) {
                return Err(VectorizerError::InvalidVocabulary(format!(
                    "duplicate term `{term}`"
                )));
            }
            set.insert(term);
        }
        if set.is_empty() {
            return Err(VectorizerError::EmptyVocabulary(
                "supplied vocabulary is empty".to_string(),
            ));
        }
        Ok(Self {
            terms: set,
            analyzer_signature,
            fixed: true,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    #[inline]
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(String::as_str)
    }

    /// Terms in column order
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(String::as_str)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.terms.iter().cloned().collect()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// `true` when supplied by the caller rather than inferred
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn analyzer_signature(&self) -> Option<&str> {
        self.analyzer_signature.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::params::DocFrequency;

    fn corpus() -> Corpus {
        Corpus::from_analyzed(&[
            vec!["movie", "not", "like"],
            vec!["not", "good", "movie"],
            vec!["good"],
            vec!["like"],
            vec!["action"],
        ])
    }

    #[test]
    fn inferred_terms_are_sorted() {
        let vocab = Vocabulary::build(&corpus(), &VectorizerParams::new(), None).unwrap();
        assert_eq!(
            vocab.feature_names(),
            vec!["action", "good", "like", "movie", "not"]
        );
        assert_eq!(vocab.index_of("like"), Some(2));
        assert_eq!(vocab.term(4), Some("not"));
        assert!(!vocab.is_fixed());
    }

    #[test]
    fn doc_frequency_filters() {
        let params = VectorizerParams::new()
            .with_min_df(DocFrequency::Count(2))
            .with_max_df(DocFrequency::Proportion(0.4));
        let vocab = Vocabulary::build(&corpus(), &params, None).unwrap();
        assert_eq!(vocab.feature_names(), vec!["good", "like", "movie", "not"]);

        let params = VectorizerParams::new().with_max_df(DocFrequency::Count(1));
        let vocab = Vocabulary::build(&corpus(), &params, None).unwrap();
        assert_eq!(vocab.feature_names(), vec!["action"]);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let params = VectorizerParams::new().with_max_features(2);
        let vocab = Vocabulary::build(&corpus(), &params, None).unwrap();
        // every count-2 term ties; term order decides
        assert_eq!(vocab.feature_names(), vec!["good", "like"]);
    }

    #[test]
    fn pruning_everything_is_an_error() {
        let params = VectorizerParams::new().with_min_df(DocFrequency::Count(5));
        let err = Vocabulary::build(&corpus(), &params, None).unwrap_err();
        assert!(matches!(err, VectorizerError::EmptyVocabulary(_)));

        let err = Vocabulary::build(&Corpus::new(), &VectorizerParams::new(), None).unwrap_err();
        assert!(matches!(err, VectorizerError::EmptyVocabulary(_)));
    }

    #[test]
    fn inverted_df_range_is_rejected() {
        let params = VectorizerParams::new()
            .with_min_df(DocFrequency::Count(3))
            .with_max_df(DocFrequency::Count(2));
        let err = Vocabulary::build(&corpus(), &params, None).unwrap_err();
        assert!(matches!(err, VectorizerError::InvalidConfig(_)));
    }

    #[test]
    fn supplied_terms_keep_caller_order() {
        let vocab = Vocabulary::from_terms(["kings", "hens"], None).unwrap();
        assert_eq!(vocab.feature_names(), vec!["kings", "hens"]);
        assert!(vocab.is_fixed());
        assert!(matches!(
            Vocabulary::from_terms(["a", "a"], None),
            Err(VectorizerError::InvalidVocabulary(_))
        ));
        assert!(matches!(
            Vocabulary::from_terms(Vec::<String>::new(), None),
            Err(VectorizerError::EmptyVocabulary(_))
        ));
    }
}
