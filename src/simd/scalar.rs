//! Portable scalar kernels.
//!
//! These follow the vector kernels operation for operation (same fused
//! multiply-adds, same summation order, same 2x2 block decomposition for the
//! 4x4 inverse) so they can stand in on CPUs without a vector backend and
//! serve as the reference in tests.

use crate::linalg::{Matrix33, Matrix44, Vector4};

// ================================================================================================
// 2x2 BLOCK OPERATIONS
// ================================================================================================

/// A 2x2 block `[[b0, b1], [b2, b3]]` stored row-major in four lanes.
pub type Block2 = [f32; 4];

/// `det(m) = m0*m3 - m1*m2`
#[inline(always)]
pub fn det2(m: Block2) -> f32 {
    m[3] * m[0] - m[2] * m[1]
}

/// `adj(a) * b`, where `adj([[a0, a1], [a2, a3]]) = [[a3, -a1], [-a2, a0]]`.
#[inline(always)]
pub fn adj_mul2(a: Block2, b: Block2) -> Block2 {
    [
        a[3] * b[0] - a[1] * b[2],
        a[3] * b[1] - a[1] * b[3],
        a[0] * b[2] - a[2] * b[0],
        a[0] * b[3] - a[2] * b[1],
    ]
}

/// `a * adj(b)`
#[inline(always)]
pub fn mul_adj2(a: Block2, b: Block2) -> Block2 {
    [
        a[0] * b[3] - a[1] * b[2],
        a[1] * b[0] - a[0] * b[1],
        a[2] * b[3] - a[3] * b[2],
        a[3] * b[0] - a[2] * b[1],
    ]
}

/// `a * b`
#[inline(always)]
pub fn mul2(a: Block2, b: Block2) -> Block2 {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
    ]
}

/// `s * a - b`, lane by lane.
#[inline(always)]
fn scaled_sub2(s: f32, a: Block2, b: Block2) -> Block2 {
    [
        s * a[0] - b[0],
        s * a[1] - b[1],
        s * a[2] - b[2],
        s * a[3] - b[3],
    ]
}

/// `tr(x * y)` summed as `(x0y0 + x1y2) + (x2y1 + x3y3)`.
#[inline(always)]
fn trace_mul2(x: Block2, y: Block2) -> f32 {
    (x[0] * y[0] + x[1] * y[2]) + (x[2] * y[1] + x[3] * y[3])
}

/// The four 2x2 blocks `A, B / C, D` of a 4x4 matrix.
#[inline(always)]
pub fn split_blocks(a: &Matrix44) -> [Block2; 4] {
    let m = &a.m;
    [
        [m[0], m[1], m[4], m[5]],
        [m[2], m[3], m[6], m[7]],
        [m[8], m[9], m[12], m[13]],
        [m[10], m[11], m[14], m[15]],
    ]
}

// ================================================================================================
// MATRIX33
// ================================================================================================

pub fn mat33_add(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    for i in 0..9 {
        out.m[i] = a.m[i] + b.m[i];
    }
}

pub fn mat33_scale(out: &mut Matrix33, a: &Matrix33, scalar: f32) {
    for i in 0..9 {
        out.m[i] = a.m[i] * scalar;
    }
}

pub fn mat33_mul(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    for i in 0..3 {
        let row = i * 3;
        for j in 0..3 {
            let mut c = a.m[row] * b.m[j];
            c = a.m[row + 1].mul_add(b.m[3 + j], c);
            c = a.m[row + 2].mul_add(b.m[6 + j], c);
            out.m[row + j] = c;
        }
    }
}

pub fn mat33_transpose(out: &mut Matrix33, a: &Matrix33) {
    for i in 0..3 {
        for j in 0..3 {
            out.m[i * 3 + j] = a.m[j * 3 + i];
        }
    }
}

// ================================================================================================
// MATRIX44
// ================================================================================================

pub fn mat44_transpose(out: &mut Matrix44, a: &Matrix44) {
    for i in 0..4 {
        for j in 0..4 {
            out.m[i * 4 + j] = a.m[j * 4 + i];
        }
    }
}

pub fn mat44_mul(out: &mut Matrix44, a: &Matrix44, b: &Matrix44) {
    for i in 0..4 {
        let row = i * 4;
        for j in 0..4 {
            let mut c = a.m[row] * b.m[j];
            c = a.m[row + 1].mul_add(b.m[4 + j], c);
            c = a.m[row + 2].mul_add(b.m[8 + j], c);
            c = a.m[row + 3].mul_add(b.m[12 + j], c);
            out.m[row + j] = c;
        }
    }
}

pub fn mat44_mul_vec(out: &mut Vector4, a: &Matrix44, x: &Vector4) {
    let m = &a.m;
    let mut lanes = [0.0f32; 4];
    for (i, lane) in lanes.iter_mut().enumerate() {
        let row = i * 4;
        let mut c = x.x * m[row];
        c = x.y.mul_add(m[row + 1], c);
        c = x.z.mul_add(m[row + 2], c);
        c = x.w.mul_add(m[row + 3], c);
        *lane = c;
    }
    *out = Vector4::from(lanes);
}

/// `det(A)det(D) + det(B)det(C) - tr(adj(A)B * adj(D)C)`
pub fn mat44_determinant(a: &Matrix44) -> f32 {
    let [block_a, block_b, block_c, block_d] = split_blocks(a);

    let a_adj_b = adj_mul2(block_a, block_b);
    let d_adj_c = adj_mul2(block_d, block_c);

    (det2(block_a) * det2(block_d) + det2(block_b) * det2(block_c))
        - trace_mul2(a_adj_b, d_adj_c)
}

/// Block inverse. Each partial block `X#` below is the adjugate of the
/// corresponding block of `det(M) * M^-1`:
///
/// ```text
/// A# = det(D)A - B(adj(D)C)        B# = det(B)C - D adj(adj(A)B)
/// C# = det(C)B - A adj(adj(D)C)    D# = det(A)D - C(adj(A)B)
/// ```
///
/// so the result is `adj(X#) / det` per block, i.e. the lanes `[3, 1, 2, 0]`
/// with signs `(+, -, -, +)`.
pub fn mat44_inverse(out: &mut Matrix44, a: &Matrix44) {
    let [block_a, block_b, block_c, block_d] = split_blocks(a);

    let det_a = det2(block_a);
    let det_b = det2(block_b);
    let det_c = det2(block_c);
    let det_d = det2(block_d);

    let a_adj_b = adj_mul2(block_a, block_b);
    let partial_b = scaled_sub2(det_b, block_c, mul_adj2(block_d, a_adj_b));
    let partial_d = scaled_sub2(det_a, block_d, mul2(block_c, a_adj_b));

    let d_adj_c = adj_mul2(block_d, block_c);
    let partial_a = scaled_sub2(det_d, block_a, mul2(block_b, d_adj_c));
    let partial_c = scaled_sub2(det_c, block_b, mul_adj2(block_a, d_adj_c));

    let determinant = (det_a * det_d + det_b * det_c) - trace_mul2(a_adj_b, d_adj_c);

    let sign = [1.0f32, -1.0, -1.0, 1.0];
    let reciprocal = sign.map(|s| s / determinant);
    let scaled = |p: Block2| -> Block2 {
        [
            p[0] * reciprocal[0],
            p[1] * reciprocal[1],
            p[2] * reciprocal[2],
            p[3] * reciprocal[3],
        ]
    };

    let x = scaled(partial_a);
    let y = scaled(partial_b);
    let z = scaled(partial_c);
    let w = scaled(partial_d);

    out.m = [
        x[3], x[1], y[3], y[1], //
        x[2], x[0], y[2], y[0], //
        z[3], z[1], w[3], w[1], //
        z[2], z[0], w[2], w[0],
    ];
}

// ================================================================================================
// VECTOR4
// ================================================================================================

pub fn dot_batch(out: &mut [f32], a: &Vector4, vectors: &[Vector4]) {
    debug_assert!(out.len() >= vectors.len());

    for (result, vector) in out.iter_mut().zip(vectors) {
        *result = crate::linalg::dot(a, vector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_det2() {
        assert_eq!(det2([1.0, 2.0, 3.0, 4.0]), -2.0);
    }

    #[test]
    fn test_adj_mul2_of_self_is_determinant_identity() {
        let a = [4.0, 7.0, 2.0, 6.0];
        assert_eq!(adj_mul2(a, a), [10.0, 0.0, 0.0, 10.0]);
        assert_eq!(mul_adj2(a, a), [10.0, 0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_mul2() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        assert_eq!(mul2(a, b), [19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_split_blocks() {
        let m = Matrix44::new(
            0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0,
        );
        let [a, b, c, d] = split_blocks(&m);
        assert_eq!(a, [0.0, 1.0, 4.0, 5.0]);
        assert_eq!(b, [2.0, 3.0, 6.0, 7.0]);
        assert_eq!(c, [8.0, 9.0, 12.0, 13.0]);
        assert_eq!(d, [10.0, 11.0, 14.0, 15.0]);
    }

    #[test]
    fn test_inverse_of_block_diagonal() {
        let m = Matrix44::from_rows([
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 4.0, 0.0, 0.0],
            [0.0, 0.0, 0.5, 0.0],
            [0.0, 0.0, 0.0, 8.0],
        ]);
        let mut out = Matrix44::zero();
        mat44_inverse(&mut out, &m);

        let expected = [0.5, 0.25, 2.0, 0.125];
        for i in 0..4 {
            for j in 0..4 {
                let e = if i == j { expected[i] } else { 0.0 };
                assert!((out.get(i, j) - e).abs() < 1e-6, "({i}, {j}) = {}", out.get(i, j));
            }
        }
    }

    #[test]
    fn test_inverse_singular_produces_non_finite() {
        let m = Matrix44::zero();
        let mut out = Matrix44::identity();
        mat44_inverse(&mut out, &m);
        assert!(out.m.iter().all(|v| !v.is_finite()));
    }
}
