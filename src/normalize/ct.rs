//! CT windowing
//!
//! Hounsfield units have a fixed physical meaning, so CT slices are windowed
//! with fixed clinical ranges. The three presets are stacked as RGB channels,
//! which makes the slice look pseudo-colored when displayed.

use super::channels::{fill_channel, with_trailing_channels};
use crate::types::Window;
use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::AsPrimitive;

/// Clip to `window` and rescale linearly to `[0.0, 255.0]`
///
/// The result stays `f32`; no integer cast happens here.
#[must_use]
pub fn norm<A, S, D>(volume: &ArrayBase<S, D>, window: Window) -> Array<f32, D>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    volume.mapv(|v| window.scale(v.as_()))
}

/// Window a CT slice with the wide, mediastinum and brain presets
///
/// Output shape is `slice.shape() + [3]`: channel 0 is the wide window,
/// channel 1 the mediastinum window and channel 2 the brain window.
#[must_use]
pub fn window<A, S, D>(slice: &ArrayBase<S, D>) -> Array<f32, D::Larger>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    let mut out = with_trailing_channels(slice, Window::CT_PRESETS.len());

    for (channel, preset) in Window::CT_PRESETS.into_iter().enumerate() {
        fill_channel(&mut out, channel, slice, |&v| preset.scale(v.as_()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, Axis, array};

    #[test]
    fn test_norm_clips_then_scales() {
        let ct = array![-2000i32, 0, 2000];
        let out = norm(&ct, Window::WIDE);
        assert_eq!(out, array![0.0f32, 127.5, 255.0]);
    }

    #[test]
    fn test_norm_maps_bounds_exactly() {
        let window = Window::new(-135.0, 215.0).unwrap();
        let ct = array![[-135.0f32, 215.0], [40.0, -1000.0]];
        let out = norm(&ct, window);

        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 1]], 255.0);
        assert_relative_eq!(out[[1, 0]], 127.5);
        assert_eq!(out[[1, 1]], 0.0);
    }

    #[test]
    fn test_norm_stays_in_range() {
        let ct = Array2::from_shape_fn((32, 32), |(r, c)| (r as i16 - 16) * 97 + c as i16 * 13);
        for preset in Window::CT_PRESETS {
            let out = norm(&ct, preset);
            assert!(out.iter().all(|&v| (0.0..=255.0).contains(&v)));
        }
    }

    #[test]
    fn test_norm_does_not_touch_input() {
        let ct = array![-5000.0f64, 5000.0];
        let _ = norm(&ct, Window::BRAIN);
        assert_eq!(ct, array![-5000.0, 5000.0]);
    }

    #[test]
    fn test_nan_stays_nan() {
        let ct = array![f32::NAN, 40.0];
        assert!(norm(&ct, Window::WIDE)[0].is_nan());
        assert!(window(&ct).index_axis(Axis(0), 0).iter().all(|v| v.is_nan()));
        assert!(!window(&ct)[[1, 2]].is_nan());
    }

    #[test]
    fn test_norm_wide_window_maps_bounds() {
        let window = Window::new(-1.5e38, 1.5e38).unwrap();
        let ct = array![-3e38f32, -1.5e38, 0.0, 1.5e38, 3e38];
        assert_eq!(norm(&ct, window), array![0.0f32, 0.0, 127.5, 255.0, 255.0]);
    }

    #[test]
    fn test_window_channel_order() {
        let ct = Array2::from_shape_fn((6, 5), |(r, c)| (r as i16 * 5 + c as i16) * 40 - 600);
        let out = window(&ct);

        assert_eq!(out.shape(), &[6, 5, 3]);
        assert_eq!(out.index_axis(Axis(2), 0), norm(&ct, Window::WIDE));
        assert_eq!(out.index_axis(Axis(2), 1), norm(&ct, Window::MEDIASTINUM));
        assert_eq!(out.index_axis(Axis(2), 2), norm(&ct, Window::BRAIN));
    }

    #[test]
    fn test_window_single_pixel_values() {
        // 40 HU: middle of wide, inside mediastinum, middle of brain
        let ct = array![[40i16]];
        let out = window(&ct);

        assert_relative_eq!(out[[0, 0, 0]], (40.0 + 1024.0) / 2048.0 * 255.0);
        assert_relative_eq!(out[[0, 0, 1]], (40.0 + 135.0) / 350.0 * 255.0);
        assert_relative_eq!(out[[0, 0, 2]], 127.5);
    }

    #[test]
    fn test_window_on_volume() {
        let volume = ndarray::Array3::<i16>::from_elem((4, 3, 2), 80);
        let out = window(&volume);
        assert_eq!(out.shape(), &[4, 3, 2, 3]);
        assert!(out.index_axis(Axis(3), 2).iter().all(|&v| v == 255.0));
    }
}
