//! AArch64 NEON kernels on 128-bit `float32x4_t` registers.
//!
//! Each kernel mirrors its x86 counterpart: the same fused multiply-adds,
//! the same 2x2 block decomposition for the 4x4 inverse and the same
//! pairwise horizontal sums, so results agree with [`crate::simd::scalar`].

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::linalg::{Matrix33, Matrix44, Vector4};

// ================================================================================================
// MATRIX33
// ================================================================================================

/// `out = a + b`
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat33_add(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    let a_ptr = a.m.as_ptr();
    let b_ptr = b.m.as_ptr();
    let out_ptr = out.m.as_mut_ptr();

    for i in (0..8).step_by(4) {
        let sum = vaddq_f32(vld1q_f32(a_ptr.add(i)), vld1q_f32(b_ptr.add(i)));
        vst1q_f32(out_ptr.add(i), sum);
    }
    out.m[8] = a.m[8] + b.m[8];
}

/// `out = a * scalar`
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat33_scale(out: &mut Matrix33, a: &Matrix33, scalar: f32) {
    let a_ptr = a.m.as_ptr();
    let out_ptr = out.m.as_mut_ptr();

    for i in (0..8).step_by(4) {
        vst1q_f32(out_ptr.add(i), vmulq_n_f32(vld1q_f32(a_ptr.add(i)), scalar));
    }
    out.m[8] = a.m[8] * scalar;
}

/// `out = a * b`, row `i` = `a[i][0]*b_row_0 + a[i][1]*b_row_1 + a[i][2]*b_row_2`.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat33_mul(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    let b_ptr = b.m.as_ptr();

    // fourth lane of each row is junk (or padding for the last one)
    let row_0 = vld1q_f32(b_ptr);
    let row_1 = vld1q_f32(b_ptr.add(3));
    let row_2 = vld1q_f32(b_ptr.add(6));

    let out_ptr = out.m.as_mut_ptr();

    for i in (0..9).step_by(3) {
        let mut c_row = vmulq_n_f32(row_0, a.m[i]);
        c_row = vfmaq_n_f32(c_row, row_1, a.m[i + 1]);
        c_row = vfmaq_n_f32(c_row, row_2, a.m[i + 2]);

        // stored in row order so each junk lane is overwritten by the next row
        vst1q_f32(out_ptr.add(i), c_row);
    }
}

/// `out = transpose(a)`
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat33_transpose(out: &mut Matrix33, a: &Matrix33) {
    let a_ptr = a.m.as_ptr();

    let row_0 = vld1q_f32(a_ptr); // a0 a1 a2 a3
    let row_1 = vld1q_f32(a_ptr.add(3)); // a3 a4 a5 a6
    let row_2 = vld1q_f32(a_ptr.add(6)); // a6 a7 a8 a9

    let zip_lo = vzip1q_f32(row_0, row_1); // a0 a3 a1 a4
    let zip_hi = vzip2q_f32(row_0, row_1); // a2 a5 a3 a6

    // [a0 a3 a6 a7], [a1 a4 a7 a8], [a2 a5 a8 a9]
    let col_0 = vcombine_f32(vget_low_f32(zip_lo), vget_low_f32(row_2));
    let col_1 = vcombine_f32(
        vget_high_f32(zip_lo),
        vget_low_f32(vextq_f32::<1>(row_2, row_2)),
    );
    let col_2 = vcombine_f32(vget_low_f32(zip_hi), vget_high_f32(row_2));

    let out_ptr = out.m.as_mut_ptr();
    vst1q_f32(out_ptr, col_0);
    vst1q_f32(out_ptr.add(3), col_1);
    vst1q_f32(out_ptr.add(6), col_2);
}

// ================================================================================================
// MATRIX44
// ================================================================================================

#[inline]
#[target_feature(enable = "neon")]
unsafe fn load_rows(a: &Matrix44) -> [float32x4_t; 4] {
    let ptr = a.m.as_ptr();
    [
        vld1q_f32(ptr),
        vld1q_f32(ptr.add(4)),
        vld1q_f32(ptr.add(8)),
        vld1q_f32(ptr.add(12)),
    ]
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn transpose_rows(rows: [float32x4_t; 4]) -> [float32x4_t; 4] {
    let [row_0, row_1, row_2, row_3] = rows;

    let row02_lo = vzip1q_f32(row_0, row_2); // a0 a8  a1 a9
    let row13_lo = vzip1q_f32(row_1, row_3); // a4 a12 a5 a13
    let row02_hi = vzip2q_f32(row_0, row_2); // a2 a10 a3 a11
    let row13_hi = vzip2q_f32(row_1, row_3); // a6 a14 a7 a15

    [
        vzip1q_f32(row02_lo, row13_lo), // a0 a4 a8  a12
        vzip2q_f32(row02_lo, row13_lo), // a1 a5 a9  a13
        vzip1q_f32(row02_hi, row13_hi), // a2 a6 a10 a14
        vzip2q_f32(row02_hi, row13_hi), // a3 a7 a11 a15
    ]
}

/// `out = transpose(a)`
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat44_transpose(out: &mut Matrix44, a: &Matrix44) {
    let columns = transpose_rows(load_rows(a));

    let out_ptr = out.m.as_mut_ptr();
    for (i, column) in columns.into_iter().enumerate() {
        vst1q_f32(out_ptr.add(i * 4), column);
    }
}

/// `out = a * b`
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat44_mul(out: &mut Matrix44, a: &Matrix44, b: &Matrix44) {
    let [row_0, row_1, row_2, row_3] = load_rows(b);
    let out_ptr = out.m.as_mut_ptr();

    for i in (0..16).step_by(4) {
        let mut out_row = vmulq_n_f32(row_0, a.m[i]);
        out_row = vfmaq_n_f32(out_row, row_1, a.m[i + 1]);
        out_row = vfmaq_n_f32(out_row, row_2, a.m[i + 2]);
        out_row = vfmaq_n_f32(out_row, row_3, a.m[i + 3]);

        vst1q_f32(out_ptr.add(i), out_row);
    }
}

/// `out = a * x` as a weighted sum of the columns of `a`.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat44_mul_vec(out: &mut Vector4, a: &Matrix44, x: &Vector4) {
    let [col_0, col_1, col_2, col_3] = transpose_rows(load_rows(a));

    let mut out_vec = vmulq_n_f32(col_0, x.x);
    out_vec = vfmaq_n_f32(out_vec, col_1, x.y);
    out_vec = vfmaq_n_f32(out_vec, col_2, x.z);
    out_vec = vfmaq_n_f32(out_vec, col_3, x.w);

    vst1q_f32(out.as_mut_ptr(), out_vec);
}

// ------------------------------------------------------------------------------------------------
// 2x2 block helpers, block [[m0, m1], [m2, m3]] in lanes [m0, m1, m2, m3]
// ------------------------------------------------------------------------------------------------

#[inline]
#[target_feature(enable = "neon")]
unsafe fn determinant_2x2(m: float32x4_t) -> f32 {
    // [m3 m2 m1 m0] * [m0 m1 m2 m3]
    let products = vmulq_f32(vrev64q_f32(vextq_f32::<2>(m, m)), m);
    vgetq_lane_f32::<0>(products) - vgetq_lane_f32::<1>(products)
}

/// `adj(a) * b = [a3 a3 a0 a0] * [b0 b1 b2 b3] - [a1 a1 a2 a2] * [b2 b3 b0 b1]`
#[inline]
#[target_feature(enable = "neon")]
unsafe fn adjugate_times_matrix(a: float32x4_t, b: float32x4_t) -> float32x4_t {
    let a_3300 = vcombine_f32(vdup_laneq_f32::<3>(a), vdup_laneq_f32::<0>(a));
    let a_1122 = vcombine_f32(vdup_laneq_f32::<1>(a), vdup_laneq_f32::<2>(a));
    let b_2301 = vextq_f32::<2>(b, b);

    vsubq_f32(vmulq_f32(a_3300, b), vmulq_f32(a_1122, b_2301))
}

/// `a * adj(b) = [a0 a1 a2 a3] * [b3 b0 b3 b0] - [a1 a0 a3 a2] * [b2 b1 b2 b1]`
#[inline]
#[target_feature(enable = "neon")]
unsafe fn matrix_times_adjugate(a: float32x4_t, b: float32x4_t) -> float32x4_t {
    let b_lo = vget_low_f32(b);
    let b_hi = vget_high_f32(b);

    let b_30 = vext_f32::<1>(b_hi, b_lo);
    let b_21 = vrev64_f32(vext_f32::<1>(b_lo, b_hi));

    vsubq_f32(
        vmulq_f32(a, vcombine_f32(b_30, b_30)),
        vmulq_f32(vrev64q_f32(a), vcombine_f32(b_21, b_21)),
    )
}

/// `a * b = [a0 a0 a2 a2] * [b0 b1 b0 b1] + [a1 a1 a3 a3] * [b2 b3 b2 b3]`
#[inline]
#[target_feature(enable = "neon")]
unsafe fn matrix_times_matrix_2x2(a: float32x4_t, b: float32x4_t) -> float32x4_t {
    let b_lo = vget_low_f32(b);
    let b_hi = vget_high_f32(b);

    vaddq_f32(
        vmulq_f32(vtrn1q_f32(a, a), vcombine_f32(b_lo, b_lo)),
        vmulq_f32(vtrn2q_f32(a, a), vcombine_f32(b_hi, b_hi)),
    )
}

/// `tr(x * y) = (x0*y0 + x1*y2) + (x2*y1 + x3*y3)`
#[inline]
#[target_feature(enable = "neon")]
unsafe fn trace_of_product(x: float32x4_t, y: float32x4_t) -> f32 {
    // [y0 y2 y1 y3]
    let y_0213 = vcombine_f32(
        vget_low_f32(vuzp1q_f32(y, y)),
        vget_low_f32(vuzp2q_f32(y, y)),
    );
    let products = vmulq_f32(x, y_0213);
    vpadds_f32(vget_low_f32(vpaddq_f32(products, products)))
}

/// `s * a - b`
#[inline]
#[target_feature(enable = "neon")]
unsafe fn scaled_sub(s: f32, a: float32x4_t, b: float32x4_t) -> float32x4_t {
    vsubq_f32(vmulq_n_f32(a, s), b)
}

/// `out = a^-1` by 2x2 block decomposition, see the x86 kernel for the
/// partial-block formulas. A zero determinant is not checked for.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn mat44_inverse(out: &mut Matrix44, a: &Matrix44) {
    let [row_0, row_1, row_2, row_3] = load_rows(a);

    let block_a = vcombine_f32(vget_low_f32(row_0), vget_low_f32(row_1));
    let block_b = vcombine_f32(vget_high_f32(row_0), vget_high_f32(row_1));
    let block_c = vcombine_f32(vget_low_f32(row_2), vget_low_f32(row_3));
    let block_d = vcombine_f32(vget_high_f32(row_2), vget_high_f32(row_3));

    let det_a = determinant_2x2(block_a);
    let det_b = determinant_2x2(block_b);
    let det_c = determinant_2x2(block_c);
    let det_d = determinant_2x2(block_d);

    let a_adj_b = adjugate_times_matrix(block_a, block_b);
    let partial_b = scaled_sub(det_b, block_c, matrix_times_adjugate(block_d, a_adj_b));
    let partial_d = scaled_sub(det_a, block_d, matrix_times_matrix_2x2(block_c, a_adj_b));

    let d_adj_c = adjugate_times_matrix(block_d, block_c);
    let partial_a = scaled_sub(det_d, block_a, matrix_times_matrix_2x2(block_b, d_adj_c));
    let partial_c = scaled_sub(det_c, block_b, matrix_times_adjugate(block_a, d_adj_c));

    let determinant = (det_a * det_d + det_b * det_c) - trace_of_product(a_adj_b, d_adj_c);

    let adjugate_sign = vld1q_f32([1.0f32, -1.0, -1.0, 1.0].as_ptr());
    let reciprocal = vdivq_f32(adjugate_sign, vdupq_n_f32(determinant));

    let partial_a = vmulq_f32(partial_a, reciprocal);
    let partial_b = vmulq_f32(partial_b, reciprocal);
    let partial_c = vmulq_f32(partial_c, reciprocal);
    let partial_d = vmulq_f32(partial_d, reciprocal);

    // odd lanes reversed -> [x3 x1 y3 y1], even lanes reversed -> [x2 x0 y2 y0]
    let out_ptr = out.m.as_mut_ptr();
    vst1q_f32(out_ptr, vrev64q_f32(vuzp2q_f32(partial_a, partial_b)));
    vst1q_f32(out_ptr.add(4), vrev64q_f32(vuzp1q_f32(partial_a, partial_b)));
    vst1q_f32(out_ptr.add(8), vrev64q_f32(vuzp2q_f32(partial_c, partial_d)));
    vst1q_f32(out_ptr.add(12), vrev64q_f32(vuzp1q_f32(partial_c, partial_d)));
}

// ================================================================================================
// VECTOR4
// ================================================================================================

/// `out[i] = dot(a, vectors[i])`, reduced pairwise as `(xx + yy) + (zz + ww)`.
///
/// # Safety
///
/// The CPU must support NEON. `out` must be at least as long as `vectors`.
#[target_feature(enable = "neon")]
pub unsafe fn dot_batch(out: &mut [f32], a: &Vector4, vectors: &[Vector4]) {
    debug_assert!(out.len() >= vectors.len());

    let vec_a = vld1q_f32(a.as_ptr());

    for (result, vector) in out.iter_mut().zip(vectors) {
        let products = vmulq_f32(vec_a, vld1q_f32(vector.as_ptr()));
        // [xx+yy, zz+ww, xx+yy, zz+ww]
        let pairs = vpaddq_f32(products, products);
        *result = vpadds_f32(vget_low_f32(pairs));
    }
}
