//! ARM NEON kernels for small matrices and vectors.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: any AArch64 processor (NEON is mandatory on ARMv8-A)
//! - **Target Architecture**: AArch64
//! - **Compilation**: Selected by `build.rs` through `cfg(neon)` on native builds
//! - **Runtime Detection**: [`crate::simd::backend`] re-checks the feature before dispatching
//!
//! # Platform Support
//!
//! - **Apple Silicon**: M1, M2, M3 processors (macOS)
//! - **AWS Graviton**: Graviton2, Graviton3 processors
//! - **Linux**: any `asimd` capable ARM64 core

pub mod kernels;

#[cfg(test)]
mod tests {
    use super::kernels;
    use crate::linalg::{Matrix33, Matrix44, Vector4};
    use crate::simd::{backend, scalar, Backend};

    fn neon_available() -> bool {
        backend() == Backend::Neon
    }

    #[test]
    fn test_mat44_kernels_match_scalar() {
        if !neon_available() {
            return;
        }
        let a = Matrix44::new(
            90.0, 73.0, 3.0, 4.0, 1.0, 16.0, 7.0, 8.0, 1.0, 3.0, 19.0, 81.2, 2.0, 1.0, 101.8, 15.0,
        );
        let b = a.transposed();
        let (mut simd, mut reference) = (Matrix44::zero(), Matrix44::zero());

        unsafe { kernels::mat44_mul(&mut simd, &a, &b) };
        scalar::mat44_mul(&mut reference, &a, &b);
        assert_eq!(simd, reference);

        unsafe { kernels::mat44_transpose(&mut simd, &a) };
        scalar::mat44_transpose(&mut reference, &a);
        assert_eq!(simd, reference);

        unsafe { kernels::mat44_inverse(&mut simd, &a) };
        scalar::mat44_inverse(&mut reference, &a);
        assert_eq!(simd, reference);

        let x = Vector4::new(2.0, 3.0, 4.0, 5.0);
        let (mut simd_vec, mut reference_vec) = (Vector4::zero(), Vector4::zero());
        unsafe { kernels::mat44_mul_vec(&mut simd_vec, &a, &x) };
        scalar::mat44_mul_vec(&mut reference_vec, &a, &x);
        assert_eq!(simd_vec, reference_vec);
    }

    #[test]
    fn test_mat33_kernels_match_scalar() {
        if !neon_available() {
            return;
        }
        let a = Matrix33::new(12.0, 2.0, 3.0, 4.0, 16.0, 6.0, 7.0, 8.0, 19.0);
        let b = Matrix33::new(1.0, -2.0, 0.5, 3.0, 7.0, -1.0, 0.0, 4.0, 2.0);
        let (mut simd, mut reference) = (Matrix33::zero(), Matrix33::zero());

        unsafe { kernels::mat33_add(&mut simd, &a, &b) };
        scalar::mat33_add(&mut reference, &a, &b);
        assert_eq!(simd, reference);

        unsafe { kernels::mat33_scale(&mut simd, &a, 3.5) };
        scalar::mat33_scale(&mut reference, &a, 3.5);
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
        if !neon_available() {
            return;
        }
        let a = Vector4::new(0.1, -2.5, 3.75, 1e3);
        let vectors: Vec<Vector4> = (0..29)
            .map(|i| Vector4::new(i as f32, 0.5, -(i as f32), 1.0 / (i as f32 + 1.0)))
            .collect();
        let mut simd = vec![0.0f32; vectors.len()];
        let mut reference = vec![0.0f32; vectors.len()];

        unsafe { kernels::dot_batch(&mut simd, &a, &vectors) };
        scalar::dot_batch(&mut reference, &a, &vectors);
        assert_eq!(simd, reference);
    }
}
