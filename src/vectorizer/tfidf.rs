use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use sprs::CsMat;
use tracing::debug;

use crate::error::{Result, VectorizerError};
use crate::utils::datastruct::{csr_from_rows, MatrixView};
use crate::utils::math::sparse::{norm_l1, norm_sq};
use crate::vectorizer::{
    count::CountVectorizer,
    params::{Norm, TfidfParams, VectorizerParams},
    token::{DefaultTokenizer, Tokenizer},
    vocabulary::Vocabulary,
};

/// TF-IDF weighted matrix, rows L2-normalized by default
pub type TfidfMatrix = CsMat<f64>;

/// TF-IDF計算エンジン
///
/// Plugs the weighting formulas into [`TfidfTransformer`]. The default
/// engine implements the add-one smoothed textbook formulas.
pub trait TfidfEngine {
    /// IDF per term from document frequencies over `doc_num` documents.
    fn idf_vec(doc_freq: &[usize], doc_num: usize, params: &TfidfParams) -> Vec<f64>;

    /// Term-frequency weight of a raw count.
    fn tf(count: u32, params: &TfidfParams) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfidfEngine;

impl TfidfEngine for DefaultTfidfEngine {
    fn idf_vec(doc_freq: &[usize], doc_num: usize, params: &TfidfParams) -> Vec<f64> {
        let n = doc_num as f64;
        doc_freq
            .iter()
            .map(|&df| {
                let df = df as f64;
                if params.smooth_idf {
                    ((1.0 + n) / (1.0 + df)).ln() + 1.0
                } else if df == 0.0 {
                    // column never seen; its cells are all zero anyway
                    1.0
                } else {
                    (n / df).ln() + 1.0
                }
            })
            .collect()
    }

    #[inline]
    fn tf(count: u32, params: &TfidfParams) -> f64 {
        if params.sublinear_tf && count > 0 {
            1.0 + (count as f64).ln()
        } else {
            count as f64
        }
    }
}

/// Fitted inverse document frequencies, one per vocabulary column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdfVector {
    idf_vec: Vec<f64>,
    /// document count the idf was fitted on
    doc_num: usize,
}

impl IdfVector {
    #[inline]
    pub fn len(&self) -> usize {
        self.idf_vec.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idf_vec.is_empty()
    }

    pub fn doc_num(&self) -> usize {
        self.doc_num
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.idf_vec
    }

    pub fn get(&self, col: usize) -> Option<f64> {
        self.idf_vec.get(col).copied()
    }
}

/// Number of rows with a nonzero cell, per column.
pub fn document_frequency<M>(counts: &M) -> Vec<usize>
where
    M: MatrixView<u32>,
{
    let mut df = vec![0usize; counts.n_cols()];
    for (_, col, _) in counts.nonzero() {
        df[col] += 1;
    }
    df
}

/// Rescales a count matrix by IDF and normalizes each row.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfTransformer<E = DefaultTfidfEngine> {
    params: TfidfParams,
    _marker: PhantomData<E>,
}

impl<E> TfidfTransformer<E>
where
    E: TfidfEngine,
{
    pub fn new(params: TfidfParams) -> Self {
        Self {
            params,
            _marker: PhantomData,
        }
    }

    pub fn params(&self) -> &TfidfParams {
        &self.params
    }

    pub fn fit<M>(&self, counts: &M) -> IdfVector
    where
        M: MatrixView<u32>,
    {
        let df = document_frequency(counts);
        let idf_vec = E::idf_vec(&df, counts.n_rows(), &self.params);
        debug!(num_features = idf_vec.len(), doc_num = counts.n_rows(), "IDF fitted");
        IdfVector {
            idf_vec,
            doc_num: counts.n_rows(),
        }
    }

    /// Weights `counts` with a previously fitted `idf`. Rows whose norm is
    /// zero stay all-zero.
    pub fn transform<M>(&self, idf: &IdfVector, counts: &M) -> Result<TfidfMatrix>
    where
        M: MatrixView<u32>,
    {
        if counts.n_cols() != idf.len() {
            return Err(VectorizerError::ShapeMismatch {
                what: "count matrix columns",
                expected: idf.len(),
                actual: counts.n_cols(),
            });
        }
        let params = self.params;
        let rows: Vec<Vec<(usize, f64)>> = (0..counts.n_rows())
            .map(|r| {
                let mut weights: Vec<(usize, f64)> = counts
                    .row(r)
                    .map(|(col, count)| (col, E::tf(count, &params) * idf.idf_vec[col]))
                    .collect();
                let norm = match params.norm {
                    Some(Norm::L2) => norm_sq(weights.iter().copied()).sqrt(),
                    Some(Norm::L1) => norm_l1(weights.iter().copied()),
                    None => 1.0,
                };
                if norm > 0.0 && norm != 1.0 {
                    for (_, w) in weights.iter_mut() {
                        *w /= norm;
                    }
                }
                weights
            })
            .collect();
        let matrix = csr_from_rows(counts.n_cols(), rows);
        debug!(non_zero_entries = matrix.data().len(), "TF-IDF transform complete");
        Ok(matrix)
    }

    pub fn fit_transform<M>(&self, counts: &M) -> Result<(IdfVector, TfidfMatrix)>
    where
        M: MatrixView<u32>,
    {
        let idf = self.fit(counts);
        let matrix = self.transform(&idf, counts)?;
        Ok((idf, matrix))
    }
}

/// Everything needed to transform new documents the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfModel {
    pub vocabulary: Vocabulary,
    pub idf: IdfVector,
}

/// Count vectorizer followed by a TF-IDF transformer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer<T = DefaultTokenizer, E = DefaultTfidfEngine> {
    count_vectorizer: CountVectorizer<T>,
    transformer: TfidfTransformer<E>,
}

impl TfidfVectorizer<DefaultTokenizer, DefaultTfidfEngine> {
    pub fn new(params: VectorizerParams, tfidf_params: TfidfParams) -> Result<Self> {
        Ok(Self {
            count_vectorizer: CountVectorizer::new(params)?,
            transformer: TfidfTransformer::new(tfidf_params),
        })
    }
}

impl<T, E> TfidfVectorizer<T, E>
where
    T: Tokenizer,
    E: TfidfEngine,
{
    pub fn with_parts(count_vectorizer: CountVectorizer<T>, transformer: TfidfTransformer<E>) -> Self {
        Self {
            count_vectorizer,
            transformer,
        }
    }

    pub fn count_vectorizer(&self) -> &CountVectorizer<T> {
        &self.count_vectorizer
    }

    pub fn transformer(&self) -> &TfidfTransformer<E> {
        &self.transformer
    }

    pub fn fit<D>(&self, docs: &[D]) -> Result<TfidfModel>
    where
        D: AsRef<str> + Sync,
    {
        debug!(num_docs = docs.len(), "Fitting TfidfVectorizer");
        let (vocabulary, counts) = self.count_vectorizer.fit_transform(docs)?;
        let idf = self.transformer.fit(&counts);
        Ok(TfidfModel { vocabulary, idf })
    }

    pub fn transform<D>(&self, model: &TfidfModel, docs: &[D]) -> Result<TfidfMatrix>
    where
        D: AsRef<str> + Sync,
    {
        let counts = self.count_vectorizer.transform(&model.vocabulary, docs);
        self.transformer.transform(&model.idf, &counts)
    }

    pub fn fit_transform<D>(&self, docs: &[D]) -> Result<(TfidfModel, TfidfMatrix)>
    where
        D: AsRef<str> + Sync,
    {
        let (vocabulary, counts) = self.count_vectorizer.fit_transform(docs)?;
        let (idf, matrix) = self.transformer.fit_transform(&counts)?;
        Ok((TfidfModel { vocabulary, idf }, matrix))
    }
}
