//! MRI normalization
//!
//! MRI intensities are relative to the scanner and protocol, so there are no
//! fixed windows. Without explicit bounds the slice is z-score normalized.

use super::channels::{fill_channel, with_trailing_channels};
use crate::types::Window;
use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::AsPrimitive;
use tracing::debug;

/// Z-scores are clipped to this many standard deviations
const ZSCORE_CLIP: f64 = 3.0;

/// How an MRI slice is mapped onto `[0, 255]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MriNormalization {
    /// Subtract the mean, divide by the standard deviation, clip to ±3σ
    #[default]
    ZScore,
    /// Clip to the window and rescale linearly
    WindowLevel(Window),
}

impl From<Option<Window>> for MriNormalization {
    fn from(window: Option<Window>) -> Self {
        window.map_or(Self::ZScore, Self::WindowLevel)
    }
}

impl From<Window> for MriNormalization {
    fn from(window: Window) -> Self {
        Self::WindowLevel(window)
    }
}

/// Normalize MRI intensities to 8-bit
///
/// Both modes end with a truncating cast, not rounding.
#[must_use]
pub fn norm_mri<A, S, D>(volume: &ArrayBase<S, D>, mode: MriNormalization) -> Array<u8, D>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    match mode {
        MriNormalization::ZScore => zscore(volume),
        MriNormalization::WindowLevel(window) => volume.mapv(|v| window.scale(v.as_()) as u8),
    }
}

/// Normalize once and replicate the result into three identical channels
///
/// Output shape is `slice.shape() + [3]`, matching [`crate::window`].
#[must_use]
pub fn window_mri<A, S, D>(slice: &ArrayBase<S, D>, mode: MriNormalization) -> Array<u8, D::Larger>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    let normalized = norm_mri(slice, mode);
    let mut out = with_trailing_channels(&normalized, 3);

    for channel in 0..3 {
        fill_channel(&mut out, channel, &normalized, |&v| v);
    }

    out
}

fn zscore<A, S, D>(volume: &ArrayBase<S, D>) -> Array<u8, D>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    let Some((mean, std)) = mean_std(volume) else {
        return Array::zeros(volume.raw_dim());
    };

    // Flat image: nothing to normalize against
    if std == 0.0 {
        debug!(mean, "flat MRI slice, z-score output is all zeros");
        return Array::zeros(volume.raw_dim());
    }

    debug!(mean, std, "z-score normalizing MRI slice");

    volume.mapv(|v| {
        let z = ((f64::from(v.as_()) - mean) / std).clamp(-ZSCORE_CLIP, ZSCORE_CLIP);
        ((z + ZSCORE_CLIP) / (2.0 * ZSCORE_CLIP) * 255.0) as u8
    })
}

/// Population mean and standard deviation, `None` for an empty array
fn mean_std<A, S, D>(volume: &ArrayBase<S, D>) -> Option<(f64, f64)>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    if volume.is_empty() {
        return None;
    }

    let count = volume.len() as f64;
    let mean = volume.iter().map(|v| f64::from(v.as_())).sum::<f64>() / count;
    let variance = volume
        .iter()
        .map(|v| {
            let delta = f64::from(v.as_()) - mean;
            delta * delta
        })
        .sum::<f64>()
        / count;

    Some((mean, variance.sqrt()))
}
