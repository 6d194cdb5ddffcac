//! Four-component `f32` vector and the dot-product kernels.
//!
//! [`dot`] is computed with scalar arithmetic; [`dot_batch`] keeps the left
//! operand resident in a vector register and streams the batch through it.
//! Both sum the four lane products pairwise, `(x + y) + (z + w)`, so every
//! `dot_batch` output is bit-identical to the matching `dot` call.

use std::fmt;

use rayon::prelude::*;

use crate::error::{validation_error, Result};
use crate::simd::{self, Backend, SimdDot};

/// Batches at or below this size are not worth splitting across threads.
pub(crate) const PARALLEL_DOT_THRESHOLD: usize = 1 << 14;

/// Number of vectors handed to one rayon task in [`par_dot_batch`].
pub(crate) const PARALLEL_CHUNK_SIZE: usize = 1 << 12;

/// A 4-lane single-precision vector, aligned so it loads as one 128-bit register.
#[repr(C, align(16))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    #[inline(always)]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Pointer to the first lane; the four lanes are contiguous.
    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *const f32 {
        self as *const Vector4 as *const f32
    }

    #[inline(always)]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut f32 {
        self as *mut Vector4 as *mut f32
    }

    /// Dot product with `other`, see [`dot`].
    #[inline(always)]
    pub fn dot(&self, other: &Vector4) -> f32 {
        dot(self, other)
    }
}

impl From<[f32; 4]> for Vector4 {
    fn from(lanes: [f32; 4]) -> Self {
        Self::new(lanes[0], lanes[1], lanes[2], lanes[3])
    }
}

impl From<Vector4> for [f32; 4] {
    fn from(vector: Vector4) -> Self {
        vector.to_array()
    }
}

impl fmt::Display for Vector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

/// Dot product `a.x*b.x + a.y*b.y + a.z*b.z + a.w*b.w`.
///
/// The products are summed as `(xx + yy) + (zz + ww)`, the order the vector
/// horizontal reduction in [`dot_batch`] uses.
///
/// # Examples
///
/// ```rust
/// use simdmat::linalg::{dot, Vector4};
///
/// let a = Vector4::new(1.0, 2.0, 3.0, 4.0);
/// let b = Vector4::new(4.0, 3.0, 2.0, 1.0);
/// assert_eq!(dot(&a, &b), 20.0);
/// ```
#[inline(always)]
pub fn dot(a: &Vector4, b: &Vector4) -> f32 {
    (a.x * b.x + a.y * b.y) + (a.z * b.z + a.w * b.w)
}

/// Writes `dot(a, vectors[i])` into `out[i]` for every vector in the batch.
///
/// `a` is loaded into a register once and reused for the whole batch.
/// Only the first `vectors.len()` entries of `out` are written.
///
/// # Panics
///
/// Panics if `out` is shorter than `vectors`.
///
/// # Examples
///
/// ```rust
/// use simdmat::linalg::{dot_batch, Vector4};
///
/// let a = Vector4::new(4.0, 3.0, 2.0, 1.0);
/// let vectors: Vec<Vector4> = (0..8).map(|i| Vector4::new(1.0, 2.0, 3.0, i as f32)).collect();
/// let mut out = vec![0.0f32; vectors.len()];
///
/// dot_batch(&mut out, &a, &vectors);
/// assert_eq!(out[5], 21.0);
/// ```
pub fn dot_batch(out: &mut [f32], a: &Vector4, vectors: &[Vector4]) {
    assert!(
        out.len() >= vectors.len(),
        "output holds {} values but the batch has {} vectors",
        out.len(),
        vectors.len()
    );

    let out = &mut out[..vectors.len()];

    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::dot_batch(out, a, vectors) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::dot_batch(out, a, vectors) },
        _ => simd::scalar::dot_batch(out, a, vectors),
    }
}

/// Checked form of [`dot_batch`] that reports a short output slice as an error.
pub fn try_dot_batch(out: &mut [f32], a: &Vector4, vectors: &[Vector4]) -> Result<()> {
    if out.len() < vectors.len() {
        return Err(validation_error(format!(
            "output holds {} values but the batch has {} vectors",
            out.len(),
            vectors.len()
        )));
    }

    dot_batch(out, a, vectors);
    Ok(())
}

/// Batched dot product split across the rayon thread pool.
///
/// Each task runs [`dot_batch`] over a disjoint chunk, so the results are
/// identical to the sequential call. Small batches run sequentially.
pub fn par_dot_batch(a: &Vector4, vectors: &[Vector4]) -> Vec<f32> {
    let mut out = vec![0.0f32; vectors.len()];

    if vectors.len() <= PARALLEL_DOT_THRESHOLD {
        dot_batch(&mut out, a, vectors);
        return out;
    }

    out.par_chunks_mut(PARALLEL_CHUNK_SIZE)
        .zip(vectors.par_chunks(PARALLEL_CHUNK_SIZE))
        .for_each(|(out_chunk, vector_chunk)| dot_batch(out_chunk, a, vector_chunk));

    out
}

/// Batched dot products for a resident left operand.
///
/// | Method | Best Use Case |
/// |--------|---------------|
/// | `simd_dot_batch` | Any batch; register-resident `self` |
/// | `par_simd_dot_batch` | Batches well above 16k vectors |
/// | `scalar_dot_batch` | Reference results / no vector unit |
impl SimdDot<&[Vector4]> for Vector4 {
    type Output = Vec<f32>;

    #[inline(always)]
    fn simd_dot_batch(&self, rhs: &[Vector4]) -> Self::Output {
        let mut out = vec![0.0f32; rhs.len()];
        dot_batch(&mut out, self, rhs);
        out
    }

    #[inline(always)]
    fn par_simd_dot_batch(&self, rhs: &[Vector4]) -> Self::Output {
        par_dot_batch(self, rhs)
    }

    #[inline(always)]
    fn scalar_dot_batch(&self, rhs: &[Vector4]) -> Self::Output {
        let mut out = vec![0.0f32; rhs.len()];
        simd::scalar::dot_batch(&mut out, self, rhs);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<Vector4>(), 16);
        assert_eq!(std::mem::align_of::<Vector4>(), 16);
    }

    #[test]
    fn test_array_conversions() {
        let v = Vector4::from([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(v, Vector4::new(1.0, 2.0, 3.0, 4.0));

        let lanes: [f32; 4] = v.into();
        assert_eq!(lanes, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_dot_method_matches_free_function() {
        let a = Vector4::new(0.5, -1.25, 3.0, 8.0);
        let b = Vector4::new(2.0, 4.0, -0.5, 0.125);
        assert_eq!(a.dot(&b), dot(&a, &b));
    }

    #[test]
    fn test_dot_batch_empty() {
        let mut out: [f32; 0] = [];
        dot_batch(&mut out, &Vector4::splat(1.0), &[]);
    }

    #[test]
    fn test_dot_batch_leaves_tail_untouched() {
        let vectors = [Vector4::splat(1.0); 3];
        let mut out = [-1.0f32; 5];

        dot_batch(&mut out, &Vector4::new(1.0, 2.0, 3.0, 4.0), &vectors);

        assert_eq!(out, [10.0, 10.0, 10.0, -1.0, -1.0]);
    }

    #[test]
    #[should_panic(expected = "output holds 2 values")]
    fn test_dot_batch_short_output_panics() {
        let vectors = [Vector4::zero(); 3];
        let mut out = [0.0f32; 2];
        dot_batch(&mut out, &Vector4::zero(), &vectors);
    }

    #[test]
    fn test_try_dot_batch_short_output() {
        let vectors = [Vector4::zero(); 3];
        let mut out = [0.0f32; 2];
        let result = try_dot_batch(&mut out, &Vector4::zero(), &vectors);
        assert!(matches!(
            result,
            Err(crate::error::SimdmatError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_par_dot_batch_matches_sequential() {
        let a = Vector4::new(0.25, -2.0, 1.5, 3.0);
        let vectors: Vec<Vector4> = (0..PARALLEL_DOT_THRESHOLD + 777)
            .map(|i| {
                let f = i as f32;
                Vector4::new(f * 0.5, -f, 1.0 / (f + 1.0), f.sqrt())
            })
            .collect();

        let mut sequential = vec![0.0f32; vectors.len()];
        dot_batch(&mut sequential, &a, &vectors);

        assert_eq!(par_dot_batch(&a, &vectors), sequential);
    }
}
