//! Encode a 2D slice as a base64 `data:` URI

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageBuffer, ImageFormat};
use ndarray::{ArrayBase, Data, Dimension};
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// Compressed image format used for the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceFormat {
    #[default]
    Jpeg,
    Png,
}

impl SliceFormat {
    /// Subtype used in the MIME type, e.g. `jpeg` in `image/jpeg`
    #[inline]
    #[must_use]
    pub fn mime_subtype(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl From<SliceFormat> for ImageFormat {
    fn from(format: SliceFormat) -> Self {
        match format {
            SliceFormat::Jpeg => ImageFormat::Jpeg,
            SliceFormat::Png => ImageFormat::Png,
        }
    }
}

impl fmt::Display for SliceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_subtype())
    }
}

/// Pixel layout derived from the array shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelLayout {
    /// `(rows, cols)` or `(rows, cols, channels)` with 1 to 4 channels
    fn from_shape(shape: &[usize]) -> Result<(usize, usize, Self)> {
        let (rows, cols, layout) = match *shape {
            [rows, cols] | [rows, cols, 1] => (rows, cols, Self::Gray),
            [rows, cols, 2] => (rows, cols, Self::GrayAlpha),
            [rows, cols, 3] => (rows, cols, Self::Rgb),
            [rows, cols, 4] => (rows, cols, Self::Rgba),
            _ => bail!(
                "Unsupported slice shape {shape:?} \
                 (expected rows x cols with 1, 2, 3 or 4 channels)"
            ),
        };

        if rows == 0 || cols == 0 {
            bail!("Cannot encode an empty slice of shape {shape:?}");
        }

        Ok((rows, cols, layout))
    }

    #[inline]
    fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba)
    }
}

/// Encode a slice as a JPEG data URI
///
/// # Errors
///
/// See [`encode_slice`]
pub fn encode<S, D>(slice: &ArrayBase<S, D>) -> Result<String>
where
    S: Data<Elem = u8>,
    D: Dimension,
{
    encode_slice(slice, SliceFormat::default())
}

/// Encode a slice as `data:image/<format>;base64,<payload>`
///
/// # Errors
///
/// Returns an error if the shape is not a non-empty `rows x cols` image with
/// 1 to 4 channels, or if the codec cannot write it. Codec errors keep the
/// underlying [`image::ImageError`] as their source.
pub fn encode_slice<S, D>(slice: &ArrayBase<S, D>, format: SliceFormat) -> Result<String>
where
    S: Data<Elem = u8>,
    D: Dimension,
{
    let bytes = encode_image_bytes(slice, format)?;
    let payload = STANDARD.encode(&bytes);

    Ok(format!("data:{mime};base64,{payload}", mime = format.mime_type()))
}

/// Compress a slice into an in-memory image file
///
/// # Errors
///
/// See [`encode_slice`]
pub fn encode_image_bytes<S, D>(slice: &ArrayBase<S, D>, format: SliceFormat) -> Result<Vec<u8>>
where
    S: Data<Elem = u8>,
    D: Dimension,
{
    let (rows, cols, layout) = PixelLayout::from_shape(slice.shape())?;
    if format == SliceFormat::Jpeg && layout.has_alpha() {
        bail!("Cannot write {layout:?} slice as {format}: the format has no alpha channel");
    }

    let width = u32::try_from(cols).context("Slice is too wide to encode")?;
    let height = u32::try_from(rows).context("Slice is too tall to encode")?;

    // Logical order, so transposed or strided views come out row-major
    let pixels: Vec<u8> = slice.iter().copied().collect();

    let image = match layout {
        PixelLayout::Gray => {
            ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        PixelLayout::GrayAlpha => {
            ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8)
        }
        PixelLayout::Rgb => {
            ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        PixelLayout::Rgba => {
            ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
        }
    }
    .context("Failed to create image buffer")?;

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format.into())
        .with_context(|| format!("Failed to encode {cols}x{rows} {layout:?} slice as {format}"))?;

    let bytes = buffer.into_inner();
    debug!(%format, width, height, bytes = bytes.len(), "encoded slice");

    Ok(bytes)
}
