//! 3x3 single-precision matrix stored in a padded 10-lane buffer.
//!
//! Lanes `m[0..9]` hold the matrix in row-major order and `m[9]` is padding.
//! The padding lets the kernels read and write full 4-wide rows at offsets
//! 0, 3 and 6 (and an 8-wide block at offset 0) without leaving the struct.
//! Kernels may leave junk in `m[9]`; nothing in this crate reads it back
//! (equality, formatting, trace and the row accessors all skip it).

use std::fmt;
use std::ops::{Add, Mul};

use tracing::debug;

use crate::error::{singular_matrix_error, Result};
use crate::simd::{self, Backend};

/// Number of lanes in the backing buffer, padding included.
pub const MATRIX33_LANES: usize = 10;

/// A 3x3 row-major matrix, 32-byte aligned for 256-bit loads.
#[repr(C, align(32))]
#[derive(Copy, Clone)]
pub struct Matrix33 {
    pub m: [f32; MATRIX33_LANES],
}

impl Matrix33 {
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub const fn new(
        m00: f32,
        m01: f32,
        m02: f32,
        m10: f32,
        m11: f32,
        m12: f32,
        m20: f32,
        m21: f32,
        m22: f32,
    ) -> Self {
        Self {
            m: [m00, m01, m02, m10, m11, m12, m20, m21, m22, 0.0],
        }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self {
            m: [0.0; MATRIX33_LANES],
        }
    }

    #[inline(always)]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)
    }

    /// Every logical entry set to `value`; the padding lane stays zero.
    #[inline(always)]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value, value, value, value, value, value, value)
    }

    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self::new(
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        )
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < 3 && col < 3, "index ({row}, {col}) out of range for 3x3");
        self.m[row * 3 + col]
    }

    pub fn rows(&self) -> [[f32; 3]; 3] {
        [
            [self.m[0], self.m[1], self.m[2]],
            [self.m[3], self.m[4], self.m[5]],
            [self.m[6], self.m[7], self.m[8]],
        ]
    }

    pub fn transposed(&self) -> Self {
        let mut out = Self::zero();
        transpose(&mut out, self);
        out
    }

    /// Inverse, or `None` when the determinant is exactly zero.
    pub fn inverse(&self) -> Option<Self> {
        let mut out = Self::zero();
        try_inverse(&mut out, self, 0.0).ok().map(|_| out)
    }

    pub fn determinant(&self) -> f32 {
        determinant(self)
    }

    pub fn trace(&self) -> f32 {
        trace(self)
    }
}

impl Default for Matrix33 {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Matrix33 {
    fn eq(&self, other: &Self) -> bool {
        self.m[..9] == other.m[..9]
    }
}

impl fmt::Debug for Matrix33 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix33")
            .field("rows", &self.rows())
            .finish()
    }
}

impl fmt::Display for Matrix33 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}, {}, {}", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

impl Add for Matrix33 {
    type Output = Matrix33;

    fn add(self, rhs: Matrix33) -> Self::Output {
        let mut out = Matrix33::zero();
        add(&mut out, &self, &rhs);
        out
    }
}

impl Mul<f32> for Matrix33 {
    type Output = Matrix33;

    fn mul(self, rhs: f32) -> Self::Output {
        let mut out = Matrix33::zero();
        scale(&mut out, &self, rhs);
        out
    }
}

impl Mul for Matrix33 {
    type Output = Matrix33;

    fn mul(self, rhs: Matrix33) -> Self::Output {
        let mut out = Matrix33::zero();
        multiply(&mut out, &self, &rhs);
        out
    }
}

/// Element-wise sum `out = a + b` of the nine logical entries.
pub fn add(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat33_add(out, a, b) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat33_add(out, a, b) },
        _ => simd::scalar::mat33_add(out, a, b),
    }
}

/// Scales every logical entry, `out = a * scalar`.
pub fn scale(out: &mut Matrix33, a: &Matrix33, scalar: f32) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat33_scale(out, a, scalar) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat33_scale(out, a, scalar) },
        _ => simd::scalar::mat33_scale(out, a, scalar),
    }
}

/// Matrix product `out = a * b`.
///
/// Each output row is `a[i][0] * b_row0 + a[i][1] * b_row1 + a[i][2] * b_row2`
/// evaluated as one multiply followed by two fused multiply-adds, so entries
/// carry FMA rounding rather than separate multiply-then-add rounding.
///
/// # Examples
///
/// ```rust
/// use simdmat::linalg::{matrix33, Matrix33};
///
/// let b = Matrix33::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
/// let mut c = Matrix33::zero();
/// matrix33::multiply(&mut c, &Matrix33::identity(), &b);
/// assert_eq!(c, b);
/// ```
pub fn multiply(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat33_mul(out, a, b) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat33_mul(out, a, b) },
        _ => simd::scalar::mat33_mul(out, a, b),
    }
}

/// Transpose `out[i][j] = a[j][i]`. Pure data movement, exact.
pub fn transpose(out: &mut Matrix33, a: &Matrix33) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat33_transpose(out, a) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat33_transpose(out, a) },
        _ => simd::scalar::mat33_transpose(out, a),
    }
}

/// Writes the first column of the adjugate (the cofactors of `a[0][0]`,
/// `a[0][1]`, `a[0][2]`) into `out[0]`, `out[3]`, `out[6]` and returns the
/// determinant expanded along the first row.
#[inline(always)]
fn first_adjugate_column(out: &mut Matrix33, a: &Matrix33) -> f32 {
    let m = &a.m;
    out.m[0] = m[4] * m[8] - m[5] * m[7];
    out.m[3] = m[5] * m[6] - m[3] * m[8];
    out.m[6] = m[3] * m[7] - m[4] * m[6];

    m[0] * out.m[0] + m[1] * out.m[3] + m[2] * out.m[6]
}

/// Fills the remaining six adjugate entries and scales by `1 / determinant`.
#[inline(always)]
fn finish_inverse(out: &mut Matrix33, a: &Matrix33, determinant: f32) {
    let m = &a.m;
    out.m[1] = m[7] * m[2] - m[1] * m[8];
    out.m[2] = m[1] * m[5] - m[4] * m[2];
    out.m[4] = m[0] * m[8] - m[2] * m[6];
    out.m[5] = m[3] * m[2] - m[0] * m[5];
    out.m[7] = m[1] * m[6] - m[0] * m[7];
    out.m[8] = m[0] * m[4] - m[1] * m[3];

    let adjugate = *out;
    scale(out, &adjugate, 1.0 / determinant);
}

/// Inverse via the adjugate, `out = adj(a) / det(a)`.
///
/// The determinant is only checked for being exactly zero. In that case
/// `out[0]`, `out[3]` and `out[6]` hold the first adjugate column and every
/// other lane of `out` keeps the value it had on entry: the output is not a
/// valid matrix and no error is signalled. Use [`try_inverse`] for a checked
/// inverse.
pub fn inverse(out: &mut Matrix33, a: &Matrix33) {
    let determinant = first_adjugate_column(out, a);
    if determinant != 0.0 {
        finish_inverse(out, a, determinant);
    }
}

/// Checked inverse.
///
/// Returns the determinant when `|det(a)| > epsilon` and `out` holds the
/// inverse. Otherwise returns [`SimdmatError::SingularMatrix`] and leaves
/// `out` untouched.
///
/// [`SimdmatError::SingularMatrix`]: crate::error::SimdmatError::SingularMatrix
pub fn try_inverse(out: &mut Matrix33, a: &Matrix33, epsilon: f32) -> Result<f32> {
    let mut staged = *out;
    let determinant = first_adjugate_column(&mut staged, a);

    if determinant.is_nan() || determinant.abs() <= epsilon {
        debug!(determinant, epsilon, "rejecting singular 3x3 matrix");
        return Err(singular_matrix_error(determinant, epsilon));
    }

    finish_inverse(&mut staged, a, determinant);
    *out = staged;
    Ok(determinant)
}

/// Determinant by cofactor expansion along the first row.
pub fn determinant(a: &Matrix33) -> f32 {
    let mut cofactors = Matrix33::zero();
    first_adjugate_column(&mut cofactors, a)
}

/// Sum of the diagonal, `a[0] + a[4] + a[8]`.
#[inline(always)]
pub fn trace(a: &Matrix33) -> f32 {
    a.m[0] + a.m[4] + a.m[8]
}

/// Prints the 3x3 grid to stdout, one comma-separated row per line.
pub fn print(a: &Matrix33) {
    print!("{a}");
}
