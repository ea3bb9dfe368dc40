use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use num::Num;
use sprs::CsMat;
use tracing::debug;

use crate::error::{Result, VectorizerError};
use crate::utils::datastruct::MatrixView;
use crate::vectorizer::{document::Documents, vocabulary::Vocabulary};

pub const DEFAULT_FILENAME_COLUMN: &str = "filename";
pub const DEFAULT_CONTENTS_COLUMN: &str = "contents";

/// Document-term matrix with its row and column labels, ready for CSV.
///
/// Columns are the two metadata columns followed by one column per term,
/// in vocabulary order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable<N> {
    filename_column: String,
    contents_column: String,
    filenames: Vec<String>,
    contents: Vec<String>,
    terms: Vec<String>,
    matrix: CsMat<N>,
}

impl<N> LabeledTable<N>
where
    N: Num + Copy + Display,
{
    pub fn new(documents: &Documents, vocabulary: &Vocabulary, matrix: CsMat<N>) -> Result<Self> {
        Self::from_parts(
            documents.filenames().into_iter().map(str::to_string).collect(),
            documents.contents().into_iter().map(str::to_string).collect(),
            vocabulary.feature_names(),
            matrix,
        )
    }

    /// Checks that metadata, terms and matrix all agree on their sizes.
    pub fn from_parts(
        filenames: Vec<String>,
        contents: Vec<String>,
        terms: Vec<String>,
        matrix: CsMat<N>,
    ) -> Result<Self> {
        if contents.len() != filenames.len() {
            return Err(VectorizerError::ShapeMismatch {
                what: "contents",
                expected: filenames.len(),
                actual: contents.len(),
            });
        }
        if matrix.n_rows() != filenames.len() {
            return Err(VectorizerError::ShapeMismatch {
                what: "matrix rows",
                expected: filenames.len(),
                actual: matrix.n_rows(),
            });
        }
        if matrix.n_cols() != terms.len() {
            return Err(VectorizerError::ShapeMismatch {
                what: "matrix columns",
                expected: terms.len(),
                actual: matrix.n_cols(),
            });
        }
        Ok(Self {
            filename_column: DEFAULT_FILENAME_COLUMN.to_string(),
            contents_column: DEFAULT_CONTENTS_COLUMN.to_string(),
            filenames,
            contents,
            terms,
            matrix,
        })
    }

    /// Renames the two metadata columns, e.g. `txt.filename`.
    pub fn with_metadata_columns(mut self, filename: impl Into<String>, contents: impl Into<String>) -> Self {
        self.filename_column = filename.into();
        self.contents_column = contents.into();
        self
    }

    /// `(rows, 2 + terms)`
    pub fn shape(&self) -> (usize, usize) {
        (self.filenames.len(), self.terms.len() + 2)
    }

    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(self.terms.len() + 2);
        columns.push(self.filename_column.as_str());
        columns.push(self.contents_column.as_str());
        columns.extend(self.terms.iter().map(String::as_str));
        columns
    }

    pub fn matrix(&self) -> &CsMat<N> {
        &self.matrix
    }

    /// One row rendered as text cells; numbers use their `Display` form.
    pub fn row_strings(&self, row: usize) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.terms.len() + 2);
        cells.push(self.filenames[row].clone());
        cells.push(self.contents[row].clone());
        cells.extend(self.matrix.row_dense(row).iter().map(|v| v.to_string()));
        cells
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.columns())?;
        for row in 0..self.filenames.len() {
            wtr.write_record(self.row_strings(row))?;
        }
        wtr.flush()?;
        debug!(rows = self.filenames.len(), cols = self.terms.len() + 2, "Table written as CSV");
        Ok(())
    }

    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}
