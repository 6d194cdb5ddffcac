//! Reference-value tests for the padded 3x3 kernels.

use approx::assert_abs_diff_eq;

use simdmat::linalg::{matrix33, Matrix33};
use simdmat::{SimdmatError, DEFAULT_SINGULAR_EPSILON};

fn sample() -> Matrix33 {
    Matrix33::new(12.0, 2.0, 3.0, 4.0, 16.0, 6.0, 7.0, 8.0, 19.0)
}

#[test]
fn test_determinant_and_trace() {
    let a = sample();
    assert_eq!(matrix33::determinant(&a), 2764.0);
    assert_eq!(matrix33::trace(&a), 47.0);
    assert_eq!(a.determinant(), 2764.0);
    assert_eq!(a.trace(), 47.0);
}

#[test]
fn test_inverse_round_trip() {
    let a = sample();
    let mut inv = Matrix33::zero();
    matrix33::inverse(&mut inv, &a);

    let mut product = Matrix33::zero();
    matrix33::multiply(&mut product, &a, &inv);

    let identity = Matrix33::identity();
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!(product.get(i, j), identity.get(i, j), epsilon = 1e-5);
        }
    }

    // first entry of the inverse: (16*19 - 6*8) / 2764
    assert_abs_diff_eq!(inv.get(0, 0), 256.0 / 2764.0, epsilon = 1e-7);
}

#[test]
fn test_inverse_zero_determinant_writes_first_column_only() {
    let singular = Matrix33::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
    let mut out = Matrix33::splat(7.0);

    matrix33::inverse(&mut out, &singular);

    // cofactors of the first row
    assert_eq!(out.m[0], -3.0);
    assert_eq!(out.m[3], 6.0);
    assert_eq!(out.m[6], -3.0);

    for lane in [1, 2, 4, 5, 7, 8] {
        assert_eq!(out.m[lane], 7.0, "lane {lane} must keep its previous value");
    }
}

#[test]
fn test_try_inverse() {
    let singular = Matrix33::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
    let mut out = Matrix33::splat(7.0);

    let result = matrix33::try_inverse(&mut out, &singular, DEFAULT_SINGULAR_EPSILON);
    assert!(matches!(result, Err(SimdmatError::SingularMatrix { .. })));
    assert_eq!(out, Matrix33::splat(7.0));

    let a = sample();
    let mut raw = Matrix33::zero();
    matrix33::inverse(&mut raw, &a);

    let determinant = matrix33::try_inverse(&mut out, &a, DEFAULT_SINGULAR_EPSILON)
        .expect("sample matrix is invertible");
    assert_eq!(determinant, 2764.0);
    assert_eq!(out, raw);
    assert_eq!(a.inverse(), Some(raw));
}

#[test]
fn test_multiply_reference() {
    let b = Matrix33::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
    let expected = Matrix33::new(41.0, 58.0, 75.0, 110.0, 136.0, 162.0, 172.0, 206.0, 240.0);

    let mut c = Matrix33::zero();
    matrix33::multiply(&mut c, &sample(), &b);
    assert_eq!(c, expected);
    assert_eq!(sample() * b, expected);

    matrix33::multiply(&mut c, &Matrix33::identity(), &b);
    assert_eq!(c, b);
}

#[test]
fn test_multiply_ignores_padding() {
    let mut a = sample();
    let mut b = Matrix33::identity();
    a.m[9] = f32::NAN;
    b.m[9] = 1.0e30;

    let mut c = Matrix33::zero();
    matrix33::multiply(&mut c, &a, &b);
    assert_eq!(c, sample());
}

#[test]
fn test_add_and_scale() {
    let a = sample();
    let b = Matrix33::splat(1.0);

    let mut c = Matrix33::zero();
    matrix33::add(&mut c, &a, &b);
    assert_eq!(c, Matrix33::new(13.0, 3.0, 4.0, 5.0, 17.0, 7.0, 8.0, 9.0, 20.0));
    assert_eq!(a + b, c);

    matrix33::scale(&mut c, &a, 0.5);
    assert_eq!(c, Matrix33::new(6.0, 1.0, 1.5, 2.0, 8.0, 3.0, 3.5, 4.0, 9.5));
    assert_eq!(a * 0.5, c);
}

#[test]
fn test_add_writes_last_lane() {
    // the last logical lane is assigned, not accumulated
    let a = sample();
    let mut c = Matrix33::splat(100.0);
    matrix33::add(&mut c, &a, &Matrix33::zero());
    assert_eq!(c.m[8], 19.0);
}

#[test]
fn test_transpose() {
    let a = sample();
    let mut t = Matrix33::zero();
    matrix33::transpose(&mut t, &a);

    assert_eq!(t, Matrix33::new(12.0, 4.0, 7.0, 2.0, 16.0, 8.0, 3.0, 6.0, 19.0));
    assert_eq!(a.transposed(), t);
    assert_eq!(t.transposed(), a);
}

#[test]
fn test_print_and_display() {
    let text = format!("{}", sample());
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("12"));
    assert!(text.contains("19"));

    matrix33::print(&sample());
}
