use num::Num;
use sprs::CsMat;

/// Read access to a document-term matrix.
///
/// Rows are documents, columns are vocabulary terms. Implementations store
/// the matrix however they like; callers only see shape, cell access and
/// iteration over nonzero cells in ascending column order.
pub trait MatrixView<N>
where
    N: Num + Copy,
{
    /// `(rows, cols)`
    fn shape(&self) -> (usize, usize);

    /// Cell value, zero for cells that are not stored.
    /// Panics when `row` or `col` is out of range.
    fn value(&self, row: usize, col: usize) -> N;

    /// Nonzero cells of one row as `(col, value)`, ascending by `col`.
    fn row(&self, row: usize) -> impl Iterator<Item = (usize, N)> + '_;

    /// Number of stored (nonzero) cells
    fn nnz(&self) -> usize;

    #[inline]
    fn n_rows(&self) -> usize {
        self.shape().0
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.shape().1
    }

    /// All nonzero cells as `(row, col, value)` in row-major order.
    fn nonzero(&self) -> impl Iterator<Item = (usize, usize, N)> + '_ {
        (0..self.n_rows()).flat_map(move |r| self.row(r).map(move |(c, v)| (r, c, v)))
    }

    fn row_sum(&self, row: usize) -> N {
        self.row(row).fold(N::zero(), |acc, (_, v)| acc + v)
    }

    /// Dense copy of one row.
    fn row_dense(&self, row: usize) -> Vec<N> {
        let mut dense = vec![N::zero(); self.n_cols()];
        for (col, val) in self.row(row) {
            dense[col] = val;
        }
        dense
    }

    /// Dense copy of one column.
    fn column(&self, col: usize) -> Vec<N> {
        (0..self.n_rows()).map(|row| self.value(row, col)).collect()
    }

    fn dense_rows(&self) -> Vec<Vec<N>> {
        (0..self.n_rows()).map(|row| self.row_dense(row)).collect()
    }
}

/// Compressed sparse row storage from `sprs`; the vectorizers return it.
///
/// 要素は各行の中で列インデックスの昇順に並ぶ. Zero values are never stored.
impl<N> MatrixView<N> for CsMat<N>
where
    N: Num + Copy,
{
    #[inline]
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    fn value(&self, row: usize, col: usize) -> N {
        assert!(row < self.rows() && col < self.cols(), "cell ({row}, {col}) out of range");
        self.get(row, col).copied().unwrap_or_else(N::zero)
    }

    fn row(&self, row: usize) -> impl Iterator<Item = (usize, N)> + '_ {
        let cells: Vec<(usize, N)> = match self.outer_view(row) {
            Some(view) => view.iter().map(|(col, &val)| (col, val)).collect(),
            None => Vec::new(),
        };
        cells.into_iter()
    }

    #[inline]
    fn nnz(&self) -> usize {
        self.data().len()
    }
}

/// Builds a CSR matrix from per-row `(col, value)` lists.
///
/// Rows are sorted by column here; zero values are dropped. Panics if a
/// column is `>= n_cols` or repeats within a row.
pub fn csr_from_rows<N>(n_cols: usize, rows: Vec<Vec<(usize, N)>>) -> CsMat<N>
where
    N: Num + Copy,
{
    let n_rows = rows.len();
    let nnz_hint = rows.iter().map(Vec::len).sum();
    let mut indptr = Vec::with_capacity(n_rows + 1);
    let mut indices = Vec::with_capacity(nnz_hint);
    let mut data = Vec::with_capacity(nnz_hint);
    indptr.push(0);

    for mut row in rows {
        row.sort_unstable_by_key(|&(col, _)| col);
        for (col, val) in row {
            if val != N::zero() {
                indices.push(col);
                data.push(val);
            }
        }
        indptr.push(indices.len());
    }

    // sprs checks column bounds and strictly increasing indices per row
    CsMat::new((n_rows, n_cols), indptr, indices, data)
}

/// All-zero CSR matrix.
pub fn csr_zeros<N>(n_rows: usize, n_cols: usize) -> CsMat<N>
where
    N: Num + Copy,
{
    CsMat::new((n_rows, n_cols), vec![0; n_rows + 1], Vec::new(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsMat<u32> {
        csr_from_rows(
            4,
            vec![
                vec![(3, 2), (0, 1)],
                vec![],
                vec![(1, 0), (2, 5)],
            ],
        )
    }

    #[test]
    fn from_rows_sorts_and_drops_zeros() {
        let m = sample();
        assert!(m.is_csr());
        assert_eq!(MatrixView::shape(&m), (3, 4));
        assert_eq!(MatrixView::nnz(&m), 3);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 1), (3, 2)]);
        assert_eq!(m.row(2).collect::<Vec<_>>(), vec![(2, 5)]);
    }

    #[test]
    fn dense_access_matches_sparse_cells() {
        let m = sample();
        assert_eq!(
            m.dense_rows(),
            vec![vec![1, 0, 0, 2], vec![0, 0, 0, 0], vec![0, 0, 5, 0]]
        );
        assert_eq!(m.value(2, 2), 5);
        assert_eq!(m.value(1, 3), 0);
        assert_eq!(m.column(3), vec![2, 0, 0]);
        assert_eq!(m.row_sum(0), 3);
        assert_eq!(
            m.nonzero().collect::<Vec<_>>(),
            vec![(0, 0, 1), (0, 3, 2), (2, 2, 5)]
        );
    }

    #[test]
    fn zeros_has_empty_rows() {
        let m: CsMat<f64> = csr_zeros(2, 3);
        assert_eq!(m.n_rows(), 2);
        assert_eq!(MatrixView::nnz(&m), 0);
        assert_eq!(m.row(1).count(), 0);
        assert_eq!(m.value(1, 2), 0.0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_column_panics() {
        let _ = csr_from_rows(2, vec![vec![(2usize, 1u32)]]);
    }

    #[test]
    #[should_panic]
    fn out_of_range_cell_panics() {
        let _ = sample().value(3, 0);
    }
}
