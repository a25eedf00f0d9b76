use ndarray::{Array, ArrayBase, Axis, Data, Dimension};
use num_traits::Zero;

/// Allocate a zeroed array shaped `input.shape() + [channels]`
#[inline]
#[must_use]
pub fn with_trailing_channels<A, B, S, D>(
    input: &ArrayBase<S, D>,
    channels: usize,
) -> Array<B, D::Larger>
where
    S: Data<Elem = A>,
    D: Dimension,
    B: Clone + Zero,
{
    let axis = Axis(input.ndim());
    let mut dim = input.view().insert_axis(axis).raw_dim();
    dim[axis.index()] = channels;
    Array::zeros(dim)
}

/// Write `f(sample)` for every input sample into trailing channel `channel` of `out`
#[inline]
pub fn fill_channel<A, B, S, D, F>(
    out: &mut Array<B, D::Larger>,
    channel: usize,
    input: &ArrayBase<S, D>,
    mut f: F,
) where
    S: Data<Elem = A>,
    D: Dimension,
    F: FnMut(&A) -> B,
{
    let axis = Axis(input.ndim());
    out.index_axis_mut(axis, channel)
        .zip_mut_with(input, |dst, src| *dst = f(src));
}

/// Truncating cast of float samples to 8-bit
///
/// Values outside `[0, 255]` saturate and NaN becomes 0, which is what
/// `as u8` does for floats.
#[must_use]
pub fn to_u8<S, D>(values: &ArrayBase<S, D>) -> Array<u8, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    values.mapv(|v| v as u8)
}
