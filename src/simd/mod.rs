//! Kernel backends and runtime backend selection.
//!
//! `build.rs` compiles in at most one vector backend (`cfg(avx2)` or
//! `cfg(neon)`) for native builds. [`backend`] then confirms the running CPU
//! actually has the instructions and caches the answer; every public kernel
//! in [`crate::linalg`] dispatches on it. The [`scalar`] backend is always
//! compiled and is the reference the vector backends are tested against.

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod scalar;

pub mod traits;

pub use traits::SimdDot;

/// Kernel implementation used by the dispatching functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// SSE/SSE3 shuffles, AVX loads/stores and FMA on x86 / x86_64.
    Avx2,
    /// NEON on aarch64.
    Neon,
    /// Portable scalar code.
    Scalar,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Avx2 => "avx2+fma",
            Backend::Neon => "neon",
            Backend::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

static BACKEND: OnceLock<Backend> = OnceLock::new();

/// The backend selected for this process. Detection runs once.
#[inline(always)]
pub fn backend() -> Backend {
    *BACKEND.get_or_init(|| {
        let backend = detect_backend();
        debug!(%backend, "selected kernel backend");
        backend
    })
}

fn detect_backend() -> Backend {
    #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
    {
        if is_x86_feature_detected!("avx")
            && is_x86_feature_detected!("fma")
            && is_x86_feature_detected!("sse3")
        {
            return Backend::Avx2;
        }
    }

    #[cfg(all(neon, target_arch = "aarch64"))]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return Backend::Neon;
        }
    }

    Backend::Scalar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_is_stable() {
        assert_eq!(backend(), backend());
    }

    #[test]
    fn test_backend_matches_compiled_modules() {
        let selected = backend();

        #[cfg(not(all(avx2, any(target_arch = "x86", target_arch = "x86_64"))))]
        assert_ne!(selected, Backend::Avx2);

        #[cfg(not(all(neon, target_arch = "aarch64")))]
        assert_ne!(selected, Backend::Neon);

        assert!(!selected.to_string().is_empty());
    }
}
