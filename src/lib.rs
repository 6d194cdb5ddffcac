//! # simdmat
//!
//! SIMD kernels for the small fixed-size primitives of graphics and physics
//! code: a 4-component vector, a padded 3x3 matrix and a 4x4 matrix, all
//! single precision and row-major.
//!
//! ## Backends
//!
//! `build.rs` detects the host CPU and compiles in one vector backend:
//!
//! - **AVX2/FMA** (x86 / x86_64): SSE/SSE3 shuffles, FMA and 256-bit AVX loads
//! - **NEON** (aarch64)
//!
//! The portable [`simd::scalar`] backend is always available. The backend is
//! selected once per process, see [`simd::backend`].
//!
//! ## Usage
//!
//! ```rust
//! use simdmat::linalg::{matrix44, Matrix44, Vector4};
//!
//! let m = Matrix44::from_rows([
//!     [2.0, 0.0, 0.0, 0.0],
//!     [0.0, 4.0, 0.0, 0.0],
//!     [0.0, 0.0, 8.0, 0.0],
//!     [0.0, 0.0, 0.0, 1.0],
//! ]);
//!
//! let mut inv = Matrix44::zero();
//! matrix44::inverse(&mut inv, &m);
//! assert_eq!(inv.get(1, 1), 0.25);
//!
//! let mut y = Vector4::zero();
//! matrix44::multiply_vector(&mut y, &m, &Vector4::new(1.0, 1.0, 1.0, 1.0));
//! assert_eq!(y, Vector4::new(2.0, 4.0, 8.0, 1.0));
//! ```

pub mod benchmark;
pub mod error;
pub mod linalg;
pub mod simd;

pub use error::{Result, SimdmatError, DEFAULT_SINGULAR_EPSILON};
pub use linalg::{Matrix33, Matrix44, Vector4};
