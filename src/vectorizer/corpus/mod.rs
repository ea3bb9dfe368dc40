use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-term statistics across a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TermStat {
    /// number of documents containing the term
    pub doc_freq: usize,
    /// total occurrences over all documents
    pub count: u64,
}

/// keep document count and term statistics of an analyzed corpus
///
/// Terms are kept in first-appearance order, so ties in [`Corpus::most_common`]
/// resolve to whichever term was seen first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    doc_num: usize,
    #[serde(with = "indexmap::map::serde_seq")]
    terms: IndexMap<String, TermStat>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds statistics from already analyzed documents.
    pub fn from_analyzed<T>(docs: &[Vec<T>]) -> Self
    where
        T: AsRef<str>,
    {
        let mut corpus = Self::new();
        for doc in docs {
            corpus.add_doc(doc);
        }
        corpus
    }

    /// Add a document's terms to the corpus
    pub fn add_doc<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        let mut local: IndexMap<&str, u64> = IndexMap::new();
        for term in terms {
            *local.entry(term.as_ref()).or_insert(0) += 1;
        }
        for (term, count) in local {
            let stat = self.terms.entry(term.to_string()).or_default();
            stat.doc_freq += 1;
            stat.count += count;
        }
    }

    /// Merge another corpus into self
    pub fn merge(&mut self, other: &Corpus) {
        self.doc_num += other.doc_num;
        for (term, stat) in &other.terms {
            let entry = self.terms.entry(term.clone()).or_default();
            entry.doc_freq += stat.doc_freq;
            entry.count += stat.count;
        }
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn doc_num(&self) -> usize {
        self.doc_num
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.terms.len()
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, |s| s.doc_freq)
    }

    pub fn term_count(&self, term: &str) -> u64 {
        self.terms.get(term).map_or(0, |s| s.count)
    }

    pub fn stat(&self, term: &str) -> Option<TermStat> {
        self.terms.get(term).copied()
    }

    /// Terms with their statistics in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermStat)> + '_ {
        self.terms.iter().map(|(t, s)| (t.as_str(), *s))
    }

    /// The `k` most frequent terms by total count.
    pub fn most_common(&self, k: usize) -> Vec<(&str, u64)> {
        let mut all: Vec<(&str, u64)> = self.iter().map(|(t, s)| (t, s.count)).collect();
        // stable: equal counts keep first-appearance order
        all.sort_by(|a, b| b.1.cmp(&a.1));
        all.truncate(k);
        all
    }
}
