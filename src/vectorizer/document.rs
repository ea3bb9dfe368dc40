use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VectorizerError};

/// One input document and the name it is exported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub filename: String,
    pub contents: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
        }
    }
}

/// Ordered document collection. Row `i` of every matrix built from it
/// belongs to document `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documents {
    docs: Vec<Document>,
}

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filename: impl Into<String>, contents: impl Into<String>) {
        self.docs.push(Document::new(filename, contents));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.docs.iter()
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.docs.iter().map(|d| d.filename.as_str()).collect()
    }

    /// Texts in input order, ready to hand to a vectorizer.
    pub fn contents(&self) -> Vec<&str> {
        self.docs.iter().map(|d| d.contents.as_str()).collect()
    }

    /// Pairs two aligned columns.
    pub fn from_columns<F, C>(filenames: Vec<F>, contents: Vec<C>) -> Result<Self>
    where
        F: Into<String>,
        C: Into<String>,
    {
        if filenames.len() != contents.len() {
            return Err(VectorizerError::ShapeMismatch {
                what: "contents column",
                expected: filenames.len(),
                actual: contents.len(),
            });
        }
        Ok(filenames.into_iter().zip(contents).collect())
    }

    /// Reads documents from CSV with a header row, taking the two named
    /// columns. Other columns are ignored.
    pub fn from_csv_reader<R: Read>(reader: R, filename_col: &str, contents_col: &str) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| VectorizerError::MissingColumn(name.to_string()))
        };
        let name_idx = position(filename_col)?;
        let text_idx = position(contents_col)?;

        let mut docs = Self::new();
        for record in rdr.records() {
            let record = record?;
            let filename = record.get(name_idx).unwrap_or_default();
            let contents = record.get(text_idx).unwrap_or_default();
            docs.push(filename, contents);
        }
        debug!(num_docs = docs.len(), "Loaded documents from CSV");
        Ok(docs)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P, filename_col: &str, contents_col: &str) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file, filename_col, contents_col)
    }
}

impl<K, V> FromIterator<(K, V)> for Documents
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            docs: iter
                .into_iter()
                .map(|(name, text)| Document::new(name, text))
                .collect(),
        }
    }
}

impl From<IndexMap<String, String>> for Documents {
    fn from(map: IndexMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Documents {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}
