//! x86 / x86_64 kernels: SSE/SSE3 4-wide shuffles, AVX 8-wide loads and FMA.
//!
//! Every kernel is compiled with `avx,fma,sse3` enabled and must only be
//! called after [`crate::simd::backend`] returned [`Backend::Avx2`].
//!
//! Shuffle masks follow `_mm_shuffle_ps(a, b, MASK)`: result lanes 0 and 1
//! come from `a`, lanes 2 and 3 from `b`, two selector bits per lane starting
//! from the low bits.
//!
//! [`Backend::Avx2`]: crate::simd::Backend::Avx2

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::linalg::{Matrix33, Matrix44, Vector4};

// ================================================================================================
// MATRIX33
// ================================================================================================

/// `out = a + b`; lanes 0..8 in one 256-bit add, lane 8 scalar.
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat33_add(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    // Matrix33 is 32-byte aligned, so lanes 0..8 are one aligned load
    let vec_a = _mm256_load_ps(a.m.as_ptr());
    let vec_b = _mm256_load_ps(b.m.as_ptr());

    _mm256_store_ps(out.m.as_mut_ptr(), _mm256_add_ps(vec_a, vec_b));
    out.m[8] = a.m[8] + b.m[8];
}

/// `out = a * scalar`
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat33_scale(out: &mut Matrix33, a: &Matrix33, scalar: f32) {
    let vec = _mm256_load_ps(a.m.as_ptr());
    let scal = _mm256_set1_ps(scalar);

    _mm256_store_ps(out.m.as_mut_ptr(), _mm256_mul_ps(vec, scal));
    out.m[8] = a.m[8] * scalar;
}

/// `out = a * b`
///
/// ```text
/// a0 a1 a2     b0 b1 b2     c0 c1 c2
/// a3 a4 a5  *  b3 b4 b5  =  c3 c4 c5
/// a6 a7 a8     b6 b7 b8     c6 c7 c8
///
/// [c0 c1 c2] = a0 * [b0 b1 b2] + a1 * [b3 b4 b5] + a2 * [b6 b7 b8]
/// ```
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat33_mul(out: &mut Matrix33, a: &Matrix33, b: &Matrix33) {
    let b_ptr = b.m.as_ptr();

    // row_0 = [ b0 b1 b2 b3(junk) ]
    // row_1 = [ b3 b4 b5 b6(junk) ]
    // row_2 = [ b6 b7 b8 b9(padding) ]
    let row_0 = _mm_loadu_ps(b_ptr);
    let row_1 = _mm_loadu_ps(b_ptr.add(3));
    let row_2 = _mm_loadu_ps(b_ptr.add(6));

    let out_ptr = out.m.as_mut_ptr();

    for i in (0..9).step_by(3) {
        // c_row = [ ai*b0 + ai+1*b3 + ai+2*b6, ..., ..., junk ]
        let mut c_row = _mm_mul_ps(_mm_broadcast_ss(&a.m[i]), row_0);
        c_row = _mm_fmadd_ps(_mm_broadcast_ss(&a.m[i + 1]), row_1, c_row);
        c_row = _mm_fmadd_ps(_mm_broadcast_ss(&a.m[i + 2]), row_2, c_row);

        // the junk lane lands on the first entry of the next row, which the
        // next store overwrites; the last one lands in the padding lane
        _mm_storeu_ps(out_ptr.add(i), c_row);
    }
}

/// `out = transpose(a)` from overlapping 4-wide loads.
///
/// ```text
/// a0 a1 a2        a0 a3 a6
/// a3 a4 a5  -->   a1 a4 a7
/// a6 a7 a8        a2 a5 a8
/// ```
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat33_transpose(out: &mut Matrix33, a: &Matrix33) {
    let a_ptr = a.m.as_ptr();

    let row_0 = _mm_loadu_ps(a_ptr); // a0 a1 a2 a3
    let row_1 = _mm_loadu_ps(a_ptr.add(1)); // a1 a2 a3 a4
    let row_2 = _mm_loadu_ps(a_ptr.add(2)); // a2 a3 a4 a5
    let row_3 = _mm_loadu_ps(a_ptr.add(6)); // a6 a7 a8 a9

    let out_ptr = out.m.as_mut_ptr();

    // lanes (0, 3) of the low row and (0, 0) of row_3 -> [a0 a3 a6 a6]
    _mm_storeu_ps(out_ptr, _mm_shuffle_ps(row_0, row_3, 0b00_00_11_00));
    // [a1 a4 a7 a7]
    _mm_storeu_ps(out_ptr.add(3), _mm_shuffle_ps(row_1, row_3, 0b01_01_11_00));
    // [a2 a5 a8 a8], last lane lands in the padding
    _mm_storeu_ps(out_ptr.add(6), _mm_shuffle_ps(row_2, row_3, 0b10_10_11_00));
}

// ================================================================================================
// MATRIX44
// ================================================================================================

#[inline]
#[target_feature(enable = "avx,fma,sse3")]
unsafe fn load_rows(a: &Matrix44) -> [__m128; 4] {
    let ptr = a.m.as_ptr();
    [
        _mm_load_ps(ptr),
        _mm_load_ps(ptr.add(4)),
        _mm_load_ps(ptr.add(8)),
        _mm_load_ps(ptr.add(12)),
    ]
}

/// Transposes four row registers into four column registers.
///
/// ```text
/// a0   a1   a2   a3        a0   a4   a8   a12
/// a4   a5   a6   a7   -->  a1   a5   a9   a13
/// a8   a9   a10  a11  -->  a2   a6   a10  a14
/// a12  a13  a14  a15       a3   a7   a11  a15
/// ```
#[inline]
#[target_feature(enable = "avx,fma,sse3")]
unsafe fn transpose_rows(rows: [__m128; 4]) -> [__m128; 4] {
    let [row_0, row_1, row_2, row_3] = rows;

    let row01_lo = _mm_unpacklo_ps(row_0, row_1); // [a0  a4  a1  a5]
    let row23_lo = _mm_unpacklo_ps(row_2, row_3); // [a8  a12 a9  a13]
    let row01_hi = _mm_unpackhi_ps(row_0, row_1); // [a2  a6  a3  a7]
    let row23_hi = _mm_unpackhi_ps(row_2, row_3); // [a10 a14 a11 a15]

    [
        _mm_shuffle_ps(row01_lo, row23_lo, 0b01_00_01_00), // [a0 a4 a8  a12]
        _mm_shuffle_ps(row01_lo, row23_lo, 0b11_10_11_10), // [a1 a5 a9  a13]
        _mm_shuffle_ps(row01_hi, row23_hi, 0b01_00_01_00), // [a2 a6 a10 a14]
        _mm_shuffle_ps(row01_hi, row23_hi, 0b11_10_11_10), // [a3 a7 a11 a15]
    ]
}

/// `out = transpose(a)`; all four rows are in registers before the first store.
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat44_transpose(out: &mut Matrix44, a: &Matrix44) {
    let columns = transpose_rows(load_rows(a));

    let out_ptr = out.m.as_mut_ptr();
    _mm_store_ps(out_ptr, columns[0]);
    _mm_store_ps(out_ptr.add(4), columns[1]);
    _mm_store_ps(out_ptr.add(8), columns[2]);
    _mm_store_ps(out_ptr.add(12), columns[3]);
}

/// `out = a * b`, output row `i` = `sum_k a[i][k] * b_row_k`.
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat44_mul(out: &mut Matrix44, a: &Matrix44, b: &Matrix44) {
    let [row_0, row_1, row_2, row_3] = load_rows(b);
    let out_ptr = out.m.as_mut_ptr();

    for i in (0..16).step_by(4) {
        // [ai*b00, ai*b01, ai*b02, ai*b03] + [ai+1*b10, ...] + ...
        let mut out_row = _mm_mul_ps(_mm_broadcast_ss(&a.m[i]), row_0);
        out_row = _mm_fmadd_ps(_mm_broadcast_ss(&a.m[i + 1]), row_1, out_row);
        out_row = _mm_fmadd_ps(_mm_broadcast_ss(&a.m[i + 2]), row_2, out_row);
        out_row = _mm_fmadd_ps(_mm_broadcast_ss(&a.m[i + 3]), row_3, out_row);

        _mm_store_ps(out_ptr.add(i), out_row);
    }
}

/// `out = a * x` as the weighted column sum `x0*col0 + x1*col1 + x2*col2 + x3*col3`.
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat44_mul_vec(out: &mut Vector4, a: &Matrix44, x: &Vector4) {
    let [col_0, col_1, col_2, col_3] = transpose_rows(load_rows(a));

    // [x0*a0, x0*a4, x0*a8, x0*a12]
    let mut out_vec = _mm_mul_ps(_mm_broadcast_ss(&x.x), col_0);
    // += [x1*a1, x1*a5, x1*a9, x1*a13]
    out_vec = _mm_fmadd_ps(_mm_broadcast_ss(&x.y), col_1, out_vec);
    out_vec = _mm_fmadd_ps(_mm_broadcast_ss(&x.z), col_2, out_vec);
    out_vec = _mm_fmadd_ps(_mm_broadcast_ss(&x.w), col_3, out_vec);

    _mm_store_ps(out.as_mut_ptr(), out_vec);
}

// ------------------------------------------------------------------------------------------------
// 2x2 block helpers: a register [m0, m1, m2, m3] holds the block [[m0, m1], [m2, m3]]
// ------------------------------------------------------------------------------------------------

/// `det(m)` broadcast to all four lanes.
#[inline]
#[target_feature(enable = "avx,fma,sse3")]
unsafe fn determinant_2x2(m: __m128) -> __m128 {
    // [m3*m0, m2*m1, m1*m2, m0*m3]
    let products = _mm_mul_ps(_mm_shuffle_ps(m, m, 0b00_01_10_11), m);
    // lane 0: m3*m0 - m2*m1
    let det = _mm_sub_ps(products, _mm_shuffle_ps(products, products, 0b11_01_01_01));
    _mm_shuffle_ps(det, det, 0)
}

/// `adj(a) * b`
///
/// ```text
/// a3 -a1     b0 b1     a3*b0 - a1*b2   a3*b1 - a1*b3
/// -a2 a0  *  b2 b3  =  a0*b2 - a2*b0   a0*b3 - a2*b1
///
/// = [a3 a3 a0 a0] * [b0 b1 b2 b3] - [a1 a1 a2 a2] * [b2 b3 b0 b1]
/// ```
#[inline]
#[target_feature(enable = "avx,fma,sse3")]
unsafe fn adjugate_times_matrix(a: __m128, b: __m128) -> __m128 {
    let lhs = _mm_mul_ps(_mm_shuffle_ps(a, a, 0b00_00_11_11), b);
    let rhs = _mm_mul_ps(
        _mm_shuffle_ps(a, a, 0b10_10_01_01),
        _mm_shuffle_ps(b, b, 0b01_00_11_10),
    );
    _mm_sub_ps(lhs, rhs)
}

/// `a * adj(b)`
///
/// ```text
/// a0 a1     b3 -b1     a0*b3 - a1*b2   a1*b0 - a0*b1
/// a2 a3  *  -b2 b0  =  a2*b3 - a3*b2   a3*b0 - a2*b1
///
/// = [a0 a1 a2 a3] * [b3 b0 b3 b0] - [a1 a0 a3 a2] * [b2 b1 b2 b1]
/// ```
#[inline]
#[target_feature(enable = "avx,fma,sse3")]
unsafe fn matrix_times_adjugate(a: __m128, b: __m128) -> __m128 {
    let lhs = _mm_mul_ps(a, _mm_shuffle_ps(b, b, 0b00_11_00_11));
    let rhs = _mm_mul_ps(
        _mm_shuffle_ps(a, a, 0b10_11_00_01),
        _mm_shuffle_ps(b, b, 0b01_10_01_10),
    );
    _mm_sub_ps(lhs, rhs)
}

/// `a * b`
///
/// ```text
/// = [a0 a0 a2 a2] * [b0 b1 b0 b1] + [a1 a1 a3 a3] * [b2 b3 b2 b3]
/// ```
#[inline]
#[target_feature(enable = "avx,fma,sse3")]
unsafe fn matrix_times_matrix_2x2(a: __m128, b: __m128) -> __m128 {
    let lhs = _mm_mul_ps(
        _mm_shuffle_ps(a, a, 0b10_10_00_00),
        _mm_shuffle_ps(b, b, 0b01_00_01_00),
    );
    let rhs = _mm_mul_ps(
        _mm_shuffle_ps(a, a, 0b11_11_01_01),
        _mm_shuffle_ps(b, b, 0b11_10_11_10),
    );
    _mm_add_ps(lhs, rhs)
}

/// `out = a^-1` by 2x2 block decomposition.
///
/// With `M = [[A, B], [C, D]]` the partial blocks
///
/// ```text
/// A# = |D|A - B(D#C)       B# = |B|C - D(A#B)#
/// C# = |C|B - A(D#C)#      D# = |A|D - C(A#B)
/// |M| = |A||D| + |B||C| - tr((A#B)(D#C))
/// ```
///
/// are the adjugates of the blocks of `|M| * M^-1`, so each is multiplied by
/// `(+1, -1, -1, +1) / |M|` and read back in lane order `[3, 1, 2, 0]`.
/// A zero determinant is not checked for.
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn mat44_inverse(out: &mut Matrix44, a: &Matrix44) {
    let [row_0, row_1, row_2, row_3] = load_rows(a);

    // [a00 a01 a10 a11], [a02 a03 a12 a13], [a20 a21 a30 a31], [a22 a23 a32 a33]
    let block_a = _mm_shuffle_ps(row_0, row_1, 0b01_00_01_00);
    let block_b = _mm_shuffle_ps(row_0, row_1, 0b11_10_11_10);
    let block_c = _mm_shuffle_ps(row_2, row_3, 0b01_00_01_00);
    let block_d = _mm_shuffle_ps(row_2, row_3, 0b11_10_11_10);

    let det_a = determinant_2x2(block_a);
    let det_b = determinant_2x2(block_b);
    let det_c = determinant_2x2(block_c);
    let det_d = determinant_2x2(block_d);

    let a_adj_b = adjugate_times_matrix(block_a, block_b);
    let partial_b = _mm_sub_ps(
        _mm_mul_ps(det_b, block_c),
        matrix_times_adjugate(block_d, a_adj_b),
    );
    let partial_d = _mm_sub_ps(
        _mm_mul_ps(det_a, block_d),
        matrix_times_matrix_2x2(block_c, a_adj_b),
    );

    let d_adj_c = adjugate_times_matrix(block_d, block_c);
    let partial_a = _mm_sub_ps(
        _mm_mul_ps(det_d, block_a),
        matrix_times_matrix_2x2(block_b, d_adj_c),
    );
    let partial_c = _mm_sub_ps(
        _mm_mul_ps(det_c, block_b),
        matrix_times_adjugate(block_a, d_adj_c),
    );

    let mut determinant = _mm_add_ps(_mm_mul_ps(det_a, det_d), _mm_mul_ps(det_b, det_c));

    // tr(XY) = x0*y0 + x1*y2 + x2*y1 + x3*y3
    // [ab0*dc0, ab1*dc2, ab2*dc1, ab3*dc3], summed by two horizontal adds
    let mut trace = _mm_mul_ps(a_adj_b, _mm_shuffle_ps(d_adj_c, d_adj_c, 0b11_01_10_00));
    trace = _mm_hadd_ps(trace, trace);
    trace = _mm_hadd_ps(trace, trace);

    determinant = _mm_sub_ps(determinant, trace);

    let adjugate_sign = _mm_setr_ps(1.0, -1.0, -1.0, 1.0);
    let reciprocal = _mm_div_ps(adjugate_sign, determinant);

    let partial_a = _mm_mul_ps(partial_a, reciprocal);
    let partial_b = _mm_mul_ps(partial_b, reciprocal);
    let partial_c = _mm_mul_ps(partial_c, reciprocal);
    let partial_d = _mm_mul_ps(partial_d, reciprocal);

    // [a3 a1 b3 b1]
    // [a2 a0 b2 b0]
    // [c3 c1 d3 d1]
    // [c2 c0 d2 d0]
    let out_ptr = out.m.as_mut_ptr();
    _mm_store_ps(out_ptr, _mm_shuffle_ps(partial_a, partial_b, 0b01_11_01_11));
    _mm_store_ps(out_ptr.add(4), _mm_shuffle_ps(partial_a, partial_b, 0b00_10_00_10));
    _mm_store_ps(out_ptr.add(8), _mm_shuffle_ps(partial_c, partial_d, 0b01_11_01_11));
    _mm_store_ps(out_ptr.add(12), _mm_shuffle_ps(partial_c, partial_d, 0b00_10_00_10));
}

// ================================================================================================
// VECTOR4
// ================================================================================================

/// `out[i] = dot(a, vectors[i])` with `a` held in a register for the whole batch.
///
/// # Safety
///
/// The CPU must support AVX, FMA and SSE3. `out` must be at least as long as `vectors`.
#[target_feature(enable = "avx,fma,sse3")]
pub unsafe fn dot_batch(out: &mut [f32], a: &Vector4, vectors: &[Vector4]) {
    debug_assert!(out.len() >= vectors.len());

    // [xa, ya, za, wa]
    let vec_a = _mm_load_ps(a.as_ptr());

    for (result, vector) in out.iter_mut().zip(vectors) {
        // [xa*x, ya*y, za*z, wa*w]
        let products = _mm_mul_ps(vec_a, _mm_load_ps(vector.as_ptr()));

        // [ya*y, xa*x, wa*w, za*z]
        let swapped = _mm_shuffle_ps(products, products, 0b10_11_00_01);

        // [xx+yy, yy+xx, zz+ww, ww+zz]
        let sums = _mm_add_ps(products, swapped);

        // lane 0: (xx+yy) + (zz+ww)
        let high = _mm_movehl_ps(swapped, sums);
        let total = _mm_add_ss(sums, high);

        *result = _mm_cvtss_f32(total);
    }
}
