//! Wall-clock micro-benchmarks for the kernels.
//!
//! Each routine prints a banner, builds its sample inputs, then runs one
//! kernel in a tight loop inside a scope guarded by a [`Timer`]. The timer
//! prints the elapsed time to stdout when the scope ends.
//!
//! The loop outputs go through [`std::hint::black_box`] so the repeated calls
//! are not optimized away. For statistically sound numbers use the criterion
//! benches in `benches/kernels.rs`.

use std::hint::black_box;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::linalg::{matrix33, matrix44, vector4, Matrix33, Matrix44, Vector4};

/// Iterations for every routine except the single dot product.
pub const ITERATIONS: usize = 1_000_000;

/// Iterations for the single dot product, which is far cheaper per call.
pub const DOT_ITERATIONS: usize = 50_000_000;

/// Vectors per call in the dot batch routine.
pub const DOT_BATCH_LEN: usize = 50;

/// Scoped wall-clock timer.
///
/// Starts on construction and reports the elapsed time either on [`Timer::stop`]
/// or when dropped, whichever comes first. Reports at most once.
#[derive(Debug)]
pub struct Timer {
    start: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Some(Instant::now()),
        }
    }

    /// Prints the elapsed time and returns it. Later calls (and the drop) are no-ops
    /// and return `None`.
    pub fn stop(&mut self) -> Option<Duration> {
        let start = self.start.take()?;
        let elapsed = start.elapsed();

        println!(
            "{} us ({:.3} ms)",
            elapsed.as_micros(),
            elapsed.as_secs_f64() * 1e3
        );
        Some(elapsed)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn banner(name: &str) {
    println!();
    println!("-----------------------");
    println!("{name}");
    println!("-----------------------");
    debug!(routine = name, "starting benchmark routine");
}

fn section(label: &str) {
    println!();
    println!("Time for {label}: ");
}

/// 3x3 and 4x4 matrix products.
pub fn matrix_multiplication() {
    banner("BENCHMARK_MATRIX_MULTIPLICATION");

    section("Matrix33");
    {
        let a = Matrix33::identity();
        let b = Matrix33::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let mut c = Matrix33::zero();

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix33::multiply(black_box(&mut c), black_box(&a), black_box(&b));
        }
    }

    section("Matrix44");
    {
        let a = Matrix44::new(
            1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0,
        );
        let b = Matrix44::new(
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0,
        );
        let mut c = Matrix44::zero();

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix44::multiply(black_box(&mut c), black_box(&a), black_box(&b));
        }
    }
}

/// 3x3 adjugate inverse and 4x4 block inverse.
pub fn matrix_inverse() {
    banner("BENCHMARK_MATRIX_INVERSE");

    section("Matrix33");
    {
        let b = Matrix33::new(12.0, 2.0, 3.0, 4.0, 16.0, 6.0, 7.0, 8.0, 19.0);
        let mut c = Matrix33::zero();

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix33::inverse(black_box(&mut c), black_box(&b));
        }
    }

    section("Matrix44");
    {
        let m = Matrix44::new(
            90.0, 73.0, 3.0, 4.0, 1.0, 16.0, 7.0, 8.0, 1.0, 3.0, 19.0, 81.2, 2.0, 1.0, 101.8, 15.0,
        );
        let mut inv = Matrix44::zero();

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix44::inverse(black_box(&mut inv), black_box(&m));
        }
    }
}

/// 3x3 scale by a scalar.
pub fn matrix_scalar_mult() {
    banner("BENCHMARK_MATRIX_SCALAR_MULT");

    section("Matrix33");
    {
        let a = Matrix33::new(12.0, 2.0, 3.0, 4.0, 16.0, 6.0, 7.0, 8.0, 19.0);
        let mut b = Matrix33::zero();
        let c = 0.999_999_9f32;

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix33::scale(black_box(&mut b), black_box(&a), black_box(c));
        }
    }
}

/// 3x3 and 4x4 transposes.
pub fn matrix_transpose() {
    banner("BENCHMARK_MATRIX_TRANSPOSE");

    section("Matrix33");
    {
        let b = Matrix33::new(12.0, 2.0, 3.0, 4.0, 16.0, 6.0, 7.0, 8.0, 19.0);
        let mut c = Matrix33::zero();

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix33::transpose(black_box(&mut c), black_box(&b));
        }
    }

    section("Matrix44");
    {
        let a = Matrix44::new(
            90.0, 73.0, 3.0, 4.0, 1.0, 16.0, 7.0, 8.0, 1.0, 3.0, 19.0, 81.0, 2.0, 1.0, 101.0, 15.0,
        );
        let mut c = Matrix44::zero();

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            matrix44::transpose(black_box(&mut c), black_box(&a));
        }
    }
}

/// Single dot product and a 50-vector dot batch.
pub fn vector_dot() {
    banner("BENCHMARK_VECTOR_DOT");

    section("dot");
    {
        let a = Vector4::new(12.0, 2.0, 3.0, 4.0);
        let b = Vector4::new(9.0, 12.0, 7.0, 8.0);

        let _timer = Timer::new();
        for _ in 0..DOT_ITERATIONS {
            black_box(vector4::dot(black_box(&a), black_box(&b)));
        }
    }

    section("dot batch");
    {
        let a = Vector4::new(12.0, 2.0, 3.0, 4.0);
        let vectors: Vec<Vector4> = (0..DOT_BATCH_LEN)
            .map(|i| Vector4::new(1.0, 2.0, 3.0, i as f32))
            .collect();
        let mut out = [0.0f32; DOT_BATCH_LEN];

        let _timer = Timer::new();
        for _ in 0..ITERATIONS {
            vector4::dot_batch(black_box(&mut out), black_box(&a), black_box(&vectors));
        }
    }
}
