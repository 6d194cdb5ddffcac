//! 4x4 single-precision matrix stored as 16 contiguous row-major lanes.
//!
//! The struct is 64-byte aligned: the whole matrix sits in one cache line and
//! every row is an aligned 128-bit load.

use std::fmt;
use std::ops::Mul;

use tracing::debug;

use crate::error::{singular_matrix_error, Result};
use crate::linalg::vector4::Vector4;
use crate::simd::{self, Backend};

/// A 4x4 row-major matrix.
#[repr(C, align(64))]
#[derive(Copy, Clone, PartialEq)]
pub struct Matrix44 {
    pub m: [f32; 16],
}

impl Matrix44 {
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub const fn new(
        m0: f32,
        m1: f32,
        m2: f32,
        m3: f32,
        m4: f32,
        m5: f32,
        m6: f32,
        m7: f32,
        m8: f32,
        m9: f32,
        m10: f32,
        m11: f32,
        m12: f32,
        m13: f32,
        m14: f32,
        m15: f32,
    ) -> Self {
        Self {
            m: [
                m0, m1, m2, m3, m4, m5, m6, m7, m8, m9, m10, m11, m12, m13, m14, m15,
            ],
        }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self { m: [0.0; 16] }
    }

    #[inline(always)]
    pub const fn identity() -> Self {
        Self::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let mut m = [0.0f32; 16];
        let mut i = 0;
        while i < 16 {
            m[i] = rows[i / 4][i % 4];
            i += 1;
        }
        Self { m }
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < 4 && col < 4, "index ({row}, {col}) out of range for 4x4");
        self.m[row * 4 + col]
    }

    #[inline(always)]
    pub fn row(&self, row: usize) -> [f32; 4] {
        assert!(row < 4, "row {row} out of range for 4x4");
        let start = row * 4;
        [
            self.m[start],
            self.m[start + 1],
            self.m[start + 2],
            self.m[start + 3],
        ]
    }

    pub fn rows(&self) -> [[f32; 4]; 4] {
        [self.row(0), self.row(1), self.row(2), self.row(3)]
    }

    pub fn transposed(&self) -> Self {
        let mut out = Self::zero();
        transpose(&mut out, self);
        out
    }

    /// Inverse, or `None` when the determinant is exactly zero (or NaN).
    pub fn inverse(&self) -> Option<Self> {
        let mut out = Self::zero();
        try_inverse(&mut out, self, 0.0).ok().map(|_| out)
    }

    pub fn determinant(&self) -> f32 {
        determinant(self)
    }
}

impl Default for Matrix44 {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Matrix44 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix44")
            .field("rows", &self.rows())
            .finish()
    }
}

impl fmt::Display for Matrix44 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}, {}, {}, {}", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

impl Mul for Matrix44 {
    type Output = Matrix44;

    fn mul(self, rhs: Matrix44) -> Self::Output {
        let mut out = Matrix44::zero();
        multiply(&mut out, &self, &rhs);
        out
    }
}

impl Mul<Vector4> for Matrix44 {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Self::Output {
        let mut out = Vector4::zero();
        multiply_vector(&mut out, &self, &rhs);
        out
    }
}

/// Transpose `out[i][j] = a[j][i]`. Pure data movement, exact.
pub fn transpose(out: &mut Matrix44, a: &Matrix44) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat44_transpose(out, a) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat44_transpose(out, a) },
        _ => simd::scalar::mat44_transpose(out, a),
    }
}

/// Matrix product `out = a * b`.
///
/// Output row `i` is `sum_k a[i][k] * b_row_k`, one multiply and three fused
/// multiply-adds per row.
///
/// # Examples
///
/// ```rust
/// use simdmat::linalg::{matrix44, Matrix44};
///
/// let a = Matrix44::from_rows([[1.0, 2.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]);
/// let mut c = Matrix44::zero();
/// matrix44::multiply(&mut c, &a, &Matrix44::identity());
/// assert_eq!(c, a);
/// ```
pub fn multiply(out: &mut Matrix44, a: &Matrix44, b: &Matrix44) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat44_mul(out, a, b) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat44_mul(out, a, b) },
        _ => simd::scalar::mat44_mul(out, a, b),
    }
}

/// Matrix-vector product `out = a * x`.
///
/// Computed as the weighted column sum `x.x * col0 + x.y * col1 + x.z * col2
/// + x.w * col3`, which needs no horizontal reduction.
pub fn multiply_vector(out: &mut Vector4, a: &Matrix44, x: &Vector4) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat44_mul_vec(out, a, x) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat44_mul_vec(out, a, x) },
        _ => simd::scalar::mat44_mul_vec(out, a, x),
    }
}

/// Inverse through 2x2 block decomposition.
///
/// No determinant check is made: a singular `a` divides by zero and `out`
/// receives infinities and NaNs. Use [`try_inverse`] for a checked inverse.
pub fn inverse(out: &mut Matrix44, a: &Matrix44) {
    match simd::backend() {
        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        Backend::Avx2 => unsafe { simd::avx2::kernels::mat44_inverse(out, a) },
        #[cfg(all(neon, target_arch = "aarch64"))]
        Backend::Neon => unsafe { simd::neon::kernels::mat44_inverse(out, a) },
        _ => simd::scalar::mat44_inverse(out, a),
    }
}

/// Checked inverse.
///
/// Returns the determinant when `|det(a)| > epsilon` and `out` holds the
/// inverse. Otherwise returns [`SimdmatError::SingularMatrix`] and leaves
/// `out` untouched.
///
/// [`SimdmatError::SingularMatrix`]: crate::error::SimdmatError::SingularMatrix
pub fn try_inverse(out: &mut Matrix44, a: &Matrix44, epsilon: f32) -> Result<f32> {
    let determinant = determinant(a);

    if determinant.is_nan() || determinant.abs() <= epsilon {
        debug!(determinant, epsilon, "rejecting singular 4x4 matrix");
        return Err(singular_matrix_error(determinant, epsilon));
    }

    inverse(out, a);
    Ok(determinant)
}

/// Determinant from the same block identities the inverse uses:
/// `det(A)det(D) + det(B)det(C) - tr(adj(A)B adj(D)C)`.
pub fn determinant(a: &Matrix44) -> f32 {
    simd::scalar::mat44_determinant(a)
}

/// Prints the matrix to stdout framed by blank lines.
pub fn print(a: &Matrix44) {
    println!();
    print!("{a}");
    println!();
}
