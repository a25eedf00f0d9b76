//! Slice-to-URI pipeline
//!
//! Windows a 2D slice for its modality, casts it to 8-bit RGB and encodes it.

use crate::encode::{SliceFormat, encode_slice};
use crate::normalize::{MriNormalization, to_u8, window, window_mri};
use anyhow::{Context, Result};
use ndarray::{Array3, ArrayBase, Data, Ix2};
use num_traits::AsPrimitive;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported modality: {0}")]
pub struct UnsupportedModality(pub String);

/// Imaging modality and how its slices are normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modality {
    /// Three fixed Hounsfield windows stacked as pseudo-color
    Ct,
    /// Single normalization replicated as grayscale
    Mri(MriNormalization),
}

impl FromStr for Modality {
    type Err = UnsupportedModality;

    /// Parse a DICOM modality code (`CT`, `MR`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CT" => Ok(Self::Ct),
            "MR" => Ok(Self::Mri(MriNormalization::default())),
            other => Err(UnsupportedModality(other.to_string())),
        }
    }
}

impl Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ct => write!(f, "CT"),
            Self::Mri(_) => write!(f, "MR"),
        }
    }
}

/// Window a 2D slice into a `(rows, cols, 3)` 8-bit array
#[must_use]
pub fn windowed_rgb<A, S>(slice: &ArrayBase<S, Ix2>, modality: Modality) -> Array3<u8>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
{
    match modality {
        Modality::Ct => to_u8(&window(slice)),
        Modality::Mri(mode) => window_mri(slice, mode),
    }
}

/// Window a 2D slice for `modality` and encode it as a data URI
///
/// # Errors
///
/// Returns an error if the windowed slice cannot be encoded
pub fn encode_windowed<A, S>(
    slice: &ArrayBase<S, Ix2>,
    modality: Modality,
    format: SliceFormat,
) -> Result<String>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
{
    let rgb = windowed_rgb(slice, modality);
    encode_slice(&rgb, format).with_context(|| format!("Failed to encode {modality} slice"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::norm_mri;
    use crate::types::Window;
    use assert_matches::assert_matches;
    use ndarray::{Array2, Axis};

    #[test]
    fn test_modality_from_dicom_code() {
        assert_eq!("CT".parse::<Modality>(), Ok(Modality::Ct));
        assert_eq!(" MR ".parse::<Modality>(), Ok(Modality::Mri(MriNormalization::ZScore)));
        assert_matches!("CR".parse::<Modality>(), Err(UnsupportedModality(code)) => {
            assert_eq!(code, "CR");
        });
    }

    #[test]
    fn test_modality_display() {
        assert_eq!(Modality::Ct.to_string(), "CT");
        assert_eq!(Modality::Mri(Window::BRAIN.into()).to_string(), "MR");
        assert_eq!(UnsupportedModality("US".into()).to_string(), "Unsupported modality: US");
    }

    #[test]
    fn test_ct_slice_is_pseudo_color() {
        // 40 HU everywhere: the three windows disagree
        let ct = Array2::<i16>::from_elem((4, 4), 40);
        let rgb = windowed_rgb(&ct, Modality::Ct);

        assert_eq!(rgb.shape(), &[4, 4, 3]);
        assert_eq!(rgb[[0, 0, 0]], 132);
        assert_eq!(rgb[[0, 0, 1]], 127);
        assert_eq!(rgb[[0, 0, 2]], 127);
    }

    #[test]
    fn test_mri_slice_is_grayscale() {
        let mri = Array2::from_shape_fn((6, 6), |(r, c)| (r * 6 + c) as u16);
        let mode = MriNormalization::ZScore;
        let rgb = windowed_rgb(&mri, Modality::Mri(mode));

        let expected = norm_mri(&mri, mode);
        for channel in 0..3 {
            assert_eq!(rgb.index_axis(Axis(2), channel), expected);
        }
    }

    #[test]
    fn test_encode_windowed_produces_data_uri() {
        let ct = Array2::from_shape_fn((32, 32), |(r, c)| r as f32 * 30.0 - c as f32 * 10.0);
        let uri = encode_windowed(&ct, Modality::Ct, SliceFormat::Png).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let uri = encode_windowed(&ct, "MR".parse().unwrap(), SliceFormat::default()).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_encode_windowed_empty_slice_fails() {
        let empty = Array2::<f32>::zeros((0, 0));
        let err = encode_windowed(&empty, Modality::Ct, SliceFormat::Jpeg).unwrap_err();
        assert_eq!(err.to_string(), "Failed to encode CT slice");
    }
}
