//! x86 / x86_64 vector kernels for small matrices and vectors.
//!
//! The 4x4 and 3x3 kernels work on 128-bit registers (one `Vector4` or one
//! matrix row per register) using SSE/SSE3 shuffles and FMA; the 3x3 add and
//! scale kernels cover lanes 0..8 with a single 256-bit AVX load.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX, FMA and SSE3 (Intel Haswell / AMD Piledriver and later)
//! - **Target Architecture**: x86 or x86_64
//! - **Compilation**: Selected by `build.rs` through `cfg(avx2)` on native builds
//! - **Runtime Detection**: [`crate::simd::backend`] re-checks the features before dispatching
//!
//! # Memory Alignment
//!
//! - `Vector4` and `Matrix44` rows are loaded with aligned 128-bit loads (16-byte alignment)
//! - `Matrix33` lanes 0..8 use an aligned 256-bit load (the type is 32-byte aligned)
//! - 3x3 rows start at lanes 0, 3 and 6 and always use unaligned loads and stores
//!
//! # Conditional Compilation
//!
//! This module is only compiled when the build system detected AVX2 and FMA. Otherwise the
//! dispatchers fall back to [`crate::simd::scalar`].

pub mod kernels;

#[cfg(test)]
mod tests {
    use super::kernels;
    use crate::linalg::{Matrix33, Matrix44, Vector4};
    use crate::simd::{backend, scalar, Backend};

    fn avx2_available() -> bool {
        backend() == Backend::Avx2
    }

    fn sample_44() -> Matrix44 {
        Matrix44::new(
            90.0, 73.0, 3.0, 4.0, 1.0, 16.0, 7.0, 8.0, 1.0, 3.0, 19.0, 81.2, 2.0, 1.0, 101.8, 15.0,
        )
    }

    fn sample_33() -> Matrix33 {
        Matrix33::new(12.0, 2.0, 3.0, 4.0, 16.0, 6.0, 7.0, 8.0, 19.0)
    }

    #[test]
    fn test_mat44_kernels_match_scalar() {
        if !avx2_available() {
            return;
        }
        let a = sample_44();
        let b = a.transposed();

        let (mut simd, mut reference) = (Matrix44::zero(), Matrix44::zero());

        unsafe { kernels::mat44_mul(&mut simd, &a, &b) };
        scalar::mat44_mul(&mut reference, &a, &b);
        assert_eq!(simd, reference);

        unsafe { kernels::mat44_transpose(&mut simd, &a) };
        scalar::mat44_transpose(&mut reference, &a);
        assert_eq!(simd, reference);

        // same block algorithm and operation order, so bit-identical
        unsafe { kernels::mat44_inverse(&mut simd, &a) };
        scalar::mat44_inverse(&mut reference, &a);
        assert_eq!(simd, reference);
    }

    #[test]
    fn test_mat44_mul_vec_matches_scalar() {
        if !avx2_available() {
            return;
        }
        let a = sample_44();
        let x = Vector4::new(2.0, 3.0, 4.0, 5.0);
        let (mut simd, mut reference) = (Vector4::zero(), Vector4::zero());

        unsafe { kernels::mat44_mul_vec(&mut simd, &a, &x) };
        scalar::mat44_mul_vec(&mut reference, &a, &x);
        assert_eq!(simd, reference);
    }

    #[test]
    fn test_mat33_kernels_match_scalar() {
        if !avx2_available() {
            return;
        }
        let a = sample_33();
        let b = Matrix33::new(1.0, -2.0, 0.5, 3.0, 7.0, -1.0, 0.0, 4.0, 2.0);
        let (mut simd, mut reference) = (Matrix33::zero(), Matrix33::zero());

        unsafe { kernels::mat33_add(&mut simd, &a, &b) };
        scalar::mat33_add(&mut reference, &a, &b);
        assert_eq!(simd, reference);

        unsafe { kernels::mat33_scale(&mut simd, &a, -0.25) };
        scalar::mat33_scale(&mut reference, &a, -0.25);
        assert_eq!(simd, reference);

        unsafe { kernels::mat33_mul(&mut simd, &a, &b) };
        scalar::mat33_mul(&mut reference, &a, &b);
        assert_eq!(simd, reference);

        unsafe { kernels::mat33_transpose(&mut simd, &a) };
        scalar::mat33_transpose(&mut reference, &a);
        assert_eq!(simd, reference);
    }

    #[test]
    fn test_dot_batch_matches_scalar() {
        if !avx2_available() {
            return;
        }
        let a = Vector4::new(0.1, -2.5, 3.75, 1e3);
        let vectors: Vec<Vector4> = (0..37)
            .map(|i| {
                let f = i as f32;
                Vector4::new(f, 1.0 / (f + 1.0), -f * 0.5, 0.001 * f)
            })
            .collect();

        let mut simd = vec![0.0f32; vectors.len()];
        let mut reference = vec![0.0f32; vectors.len()];

        unsafe { kernels::dot_batch(&mut simd, &a, &vectors) };
        scalar::dot_batch(&mut reference, &a, &vectors);
        assert_eq!(simd, reference);
    }
}
