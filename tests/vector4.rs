//! Dot product and batched dot product tests.

use simdmat::linalg::{dot, dot_batch, par_dot_batch, try_dot_batch, Vector4};
use simdmat::simd::SimdDot;

fn batch(len: usize) -> Vec<Vector4> {
    (0..len)
        .map(|i| Vector4::new(1.0, 2.0, 3.0, i as f32))
        .collect()
}

#[test]
fn test_dot_reference() {
    let a = Vector4::new(1.0, 2.0, 3.0, 4.0);
    let b = Vector4::new(4.0, 3.0, 2.0, 1.0);
    assert_eq!(dot(&a, &b), 20.0);
    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn test_dot_propagates_nan() {
    let a = Vector4::new(1.0, f32::NAN, 0.0, 0.0);
    assert!(dot(&a, &Vector4::splat(1.0)).is_nan());
}

#[test]
fn test_dot_batch_reference() {
    let a = Vector4::new(4.0, 3.0, 2.0, 1.0);
    let vectors = batch(50);
    let mut out = vec![0.0f32; vectors.len()];

    dot_batch(&mut out, &a, &vectors);

    for (i, value) in out.iter().enumerate() {
        assert_eq!(*value, 16.0 + i as f32, "index {i}");
    }
}

#[test]
fn test_dot_batch_matches_dot_exactly() {
    let a = Vector4::new(0.3, -1.7, 2.9, 1e-3);
    let vectors: Vec<Vector4> = (0..257)
        .map(|i| {
            let f = i as f32;
            Vector4::new(f.sin(), f.cos() * 10.0, 1.0 / (f + 0.5), -f)
        })
        .collect();

    let mut out = vec![0.0f32; vectors.len()];
    dot_batch(&mut out, &a, &vectors);

    for (value, vector) in out.iter().zip(&vectors) {
        assert_eq!(*value, dot(&a, vector));
    }
}

#[test]
fn test_try_dot_batch() {
    let a = Vector4::new(4.0, 3.0, 2.0, 1.0);
    let vectors = batch(4);

    let mut short = [0.0f32; 3];
    assert!(try_dot_batch(&mut short, &a, &vectors).is_err());
    assert_eq!(short, [0.0; 3]);

    let mut out = [0.0f32; 4];
    try_dot_batch(&mut out, &a, &vectors).expect("output is long enough");
    assert_eq!(out, [16.0, 17.0, 18.0, 19.0]);
}

#[test]
fn test_par_dot_batch_large() {
    let a = Vector4::new(4.0, 3.0, 2.0, 1.0);
    let vectors = batch(100_000);

    let parallel = par_dot_batch(&a, &vectors);
    assert_eq!(parallel.len(), vectors.len());

    // integers below 2^24 are exact in f32
    for (i, value) in parallel.iter().enumerate() {
        assert_eq!(*value, 16.0 + i as f32);
    }
}

#[test]
fn test_simd_dot_trait_methods_agree() {
    let a = Vector4::new(4.0, 3.0, 2.0, 1.0);
    let vectors = batch(1_000);

    let simd = a.simd_dot_batch(&vectors[..]);
    let parallel = a.par_simd_dot_batch(&vectors[..]);
    let scalar = a.scalar_dot_batch(&vectors[..]);

    assert_eq!(simd, scalar);
    assert_eq!(parallel, scalar);
}
