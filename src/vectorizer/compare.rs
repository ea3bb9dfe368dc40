use std::io::Write;

use num::Num;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VectorizerError};
use crate::utils::datastruct::MatrixView;
use crate::utils::math::sparse::{cosine_similarity, dot, norm_sq};

/// Dense, symmetric document × document similarity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    size: usize,
    /// row-major, `size * size` cells
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Number of documents on each side
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Panics when `i` or `j` is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "({i}, {j}) out of range for size {}", self.size);
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics; an empty matrix has no rows anyway
        self.values.chunks_exact(self.size.max(1))
    }

    /// Writes a labeled CSV: a `filename` column, then one column per label.
    pub fn write_csv<W, S>(&self, labels: &[S], writer: W) -> Result<()>
    where
        W: Write,
        S: AsRef<str>,
    {
        if labels.len() != self.size {
            return Err(VectorizerError::ShapeMismatch {
                what: "similarity labels",
                expected: self.size,
                actual: labels.len(),
            });
        }
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = Vec::with_capacity(self.size + 1);
        header.push("filename");
        header.extend(labels.iter().map(AsRef::as_ref));
        wtr.write_record(&header)?;
        for (label, row) in labels.iter().zip(self.rows()) {
            let mut record = Vec::with_capacity(self.size + 1);
            record.push(label.as_ref().to_string());
            record.extend(row.iter().map(f64::to_string));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Pairwise cosine similarity of every row pair.
///
/// Zero rows compare as 0.0 with everything, themselves included. Each
/// upper-triangle cell is computed once and mirrored, so the result is
/// exactly symmetric.
pub fn cosine_similarity_matrix<M, N>(matrix: &M) -> SimilarityMatrix
where
    M: MatrixView<N> + Sync,
    N: Num + Copy + Into<f64>,
{
    let n = matrix.n_rows();
    let norms: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| norm_sq(matrix.row(i)).sqrt())
        .collect();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| {
                    let denom = norms[i] * norms[j];
                    if denom == 0.0 {
                        0.0
                    } else {
                        (dot(matrix.row(i), matrix.row(j)) / denom).clamp(-1.0, 1.0)
                    }
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    let mut values = vec![0.0; n * n];
    for (i, tail) in upper.into_iter().enumerate() {
        values[i * n + i] = if norms[i] > 0.0 { 1.0 } else { 0.0 };
        for (offset, sim) in tail.into_iter().enumerate() {
            let j = i + 1 + offset;
            values[i * n + j] = sim;
            values[j * n + i] = sim;
        }
    }
    debug!(num_docs = n, "Cosine similarity matrix computed");
    SimilarityMatrix { size: n, values }
}

/// Cosine similarity of two rows of the same matrix.
pub fn row_similarity<M, N>(matrix: &M, i: usize, j: usize) -> f64
where
    M: MatrixView<N>,
    N: Num + Copy + Into<f64>,
{
    cosine_similarity(matrix.row(i), matrix.row(j))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::datastruct::{csr_from_rows, csr_zeros};
    use sprs::CsMat;

    fn matrix() -> CsMat<f64> {
        csr_from_rows(
            3,
            vec![
                vec![(0, 1.0), (1, 1.0)],
                vec![(1, 2.0), (2, 2.0)],
                vec![],
                vec![(0, 3.0), (1, 3.0)],
            ],
        )
    }

    #[test]
    fn symmetric_with_unit_diagonal() {
        let m = matrix();
        let sim = cosine_similarity_matrix(&m);
        assert_eq!(sim.size(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(sim.get(i, j).to_bits(), sim.get(j, i).to_bits());
                assert!((-1.0..=1.0).contains(&sim.get(i, j)));
            }
        }
        assert_eq!(sim.get(0, 0), 1.0);
        assert!((sim.get(0, 3) - 1.0).abs() < 1e-12);
        assert!((sim.get(0, 1) - 0.5).abs() < 1e-12);
        assert!((sim.get(0, 1) - row_similarity(&m, 0, 1)).abs() < 1e-12);
    }

    #[test]
    fn zero_rows_are_zero_everywhere() {
        let sim = cosine_similarity_matrix(&matrix());
        assert!(sim.row(2).iter().all(|&v| v == 0.0));
        assert_eq!(sim.get(1, 2), 0.0);
    }

    #[test]
    fn integer_counts_work_too() {
        let counts: CsMat<u32> = csr_from_rows(2, vec![vec![(0, 1)], vec![(0, 4)]]);
        let sim = cosine_similarity_matrix(&counts);
        assert!((sim.get(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_matrix() {
        let empty: CsMat<f64> = csr_zeros(0, 3);
        let sim = cosine_similarity_matrix(&empty);
        assert_eq!(sim.size(), 0);
        assert_eq!(sim.rows().count(), 0);
    }

    #[test]
    fn csv_has_filename_column_and_checks_labels() {
        let sim = cosine_similarity_matrix(&csr_from_rows::<f64>(1, vec![vec![(0, 1.0)], vec![]]));
        let mut out = Vec::new();
        sim.write_csv(&["a.txt", "b.txt"], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "filename,a.txt,b.txt\na.txt,1,0\nb.txt,0,0\n");
        assert!(matches!(
            sim.write_csv(&["only"], Vec::new()),
            Err(VectorizerError::ShapeMismatch { .. })
        ));
    }
}
