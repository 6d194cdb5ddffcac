//! Fixed-size matrix and vector primitives with their arithmetic kernels.
//!
//! Operations are free functions taking the output by `&mut` and inputs by
//! shared reference, grouped per type:
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`matrix33`] | `add`, `scale`, `multiply`, `transpose`, `inverse`, `try_inverse`, `determinant`, `trace`, `print` |
//! | [`matrix44`] | `multiply`, `multiply_vector`, `transpose`, `inverse`, `try_inverse`, `determinant`, `print` |
//! | [`vector4`] | `dot`, `dot_batch`, `try_dot_batch`, `par_dot_batch` |
//!
//! Because `out` is borrowed mutably, it can never alias an input. The
//! operator impls (`a * b`, `a + b`, `m * v`) and the `transposed` /
//! `inverse` methods return fresh values for in-place style updates.
//!
//! Each call dispatches on [`crate::simd::backend`] to the AVX2/FMA, NEON or
//! scalar kernels.

pub mod matrix33;
pub mod matrix44;
pub mod vector4;

pub use matrix33::Matrix33;
pub use matrix44::Matrix44;
pub use vector4::{dot, dot_batch, par_dot_batch, try_dot_batch, Vector4};
