use std::cmp::Ordering;

/// ドット積 over two sparse vectors given as `(index, value)` pairs.
/// d(a, b) = Σ(a_i * b_i)
///
/// Both iterators must yield ascending indices. Sums run in index order,
/// so `dot(a, b)` and `dot(b, a)` are bit-identical.
#[inline]
pub fn dot<N>(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64
where
    N: Into<f64> + Copy,
{
    let mut a_it = vec.fuse();
    let mut b_it = other.fuse();
    let mut a_next = a_it.next();
    let mut b_next = b_it.next();
    let mut result = 0_f64;
    while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
        match ia.cmp(&ib) {
            Ordering::Equal => {
                result += va.into() * vb.into();
                a_next = a_it.next();
                b_next = b_it.next();
            }
            Ordering::Less => a_next = a_it.next(),
            Ordering::Greater => b_next = b_it.next(),
        }
    }
    result
}

/// Σ(a_i^2)
#[inline]
pub fn norm_sq<N>(vec: impl Iterator<Item = (usize, N)>) -> f64
where
    N: Into<f64> + Copy,
{
    vec.map(|(_, v)| {
        let v: f64 = v.into();
        v * v
    })
    .sum()
}

/// Σ(|a_i|)
#[inline]
pub fn norm_l1<N>(vec: impl Iterator<Item = (usize, N)>) -> f64
where
    N: Into<f64> + Copy,
{
    vec.map(|(_, v)| v.into().abs()).sum()
}

/// コサイン類似度
/// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
///
/// Single pass merge over both vectors. Returns 0.0 when either side has a
/// zero norm.
#[inline]
pub fn cosine_similarity<N>(
    vec: impl Iterator<Item = (usize, N)>,
    other: impl Iterator<Item = (usize, N)>,
) -> f64
where
    N: Into<f64> + Copy,
{
    let mut a_it = vec.fuse();
    let mut b_it = other.fuse();
    let mut a_next = a_it.next();
    let mut b_next = b_it.next();
    let mut norm_a = 0_f64;
    let mut norm_b = 0_f64;
    let mut dot = 0_f64;
    while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
        let (fa, fb): (f64, f64) = (va.into(), vb.into());
        match ia.cmp(&ib) {
            Ordering::Equal => {
                norm_a += fa * fa;
                norm_b += fb * fb;
                dot += fa * fb;
                a_next = a_it.next();
                b_next = b_it.next();
            }
            Ordering::Less => {
                norm_a += fa * fa;
                a_next = a_it.next();
            }
            Ordering::Greater => {
                norm_b += fb * fb;
                b_next = b_it.next();
            }
        }
    }
    while let Some((_, va)) = a_next {
        let fa: f64 = va.into();
        norm_a += fa * fa;
        a_next = a_it.next();
    }
    while let Some((_, vb)) = b_next {
        let fb: f64 = vb.into();
        norm_b += fb * fb;
        b_next = b_it.next();
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
    }
}
