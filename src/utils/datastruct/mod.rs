pub mod csr;

pub use csr::{csr_from_rows, csr_zeros, MatrixView};
