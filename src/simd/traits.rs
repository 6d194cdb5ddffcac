/// Batched dot products against a resident left operand.
///
/// Mirrors the simd / parallel-simd / scalar triple: the `simd_` method runs
/// the selected vector backend, `par_simd_` spreads the batch over rayon and
/// `scalar_` always runs the portable kernel.
pub trait SimdDot<Rhs = Self> {
    type Output;

    fn simd_dot_batch(&self, rhs: Rhs) -> Self::Output;
    fn par_simd_dot_batch(&self, rhs: Rhs) -> Self::Output;
    fn scalar_dot_batch(&self, rhs: Rhs) -> Self::Output;
}
