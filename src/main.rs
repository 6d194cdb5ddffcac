//! Benchmark driver: runs every kernel benchmark routine once, in a fixed order.
//!
//! Logging goes to stderr and is filtered through `RUST_LOG`
//! (default `warn`, e.g. `RUST_LOG=simdmat=debug` shows the backend selection).

use chrono::Local;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use simdmat::{benchmark, simd};

/// Initialize logging from `RUST_LOG`
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() {
    init_logging();

    let backend = simd::backend();
    println!(
        "simdmat {} | backend: {} | {}",
        env!("CARGO_PKG_VERSION"),
        backend,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(%backend, "running kernel benchmarks");

    benchmark::matrix_multiplication();
    benchmark::matrix_inverse();
    benchmark::matrix_scalar_mult();
    benchmark::matrix_transpose();
    benchmark::vector_dot();

    // the benchmark driver always reports a nonzero status
    std::process::exit(1);
}
