//! Export of frame views to `image` buffers.
//!
//! Produces an [`RgbaImage`] from a [`PixelBufferView`] so frames can be
//! displayed, encoded or compared with the `image` crate's tooling.
//!
//! # Color Conversion
//!
//! NV12 is treated as full-range BT.601:
//!
//! ```text
//! R = Y + 1.402    * (Cr - 128)
//! G = Y - 0.344136 * (Cb - 128) - 0.714136 * (Cr - 128)
//! B = Y + 1.772    * (Cb - 128)
//! ```
//!
//! Each 2x2 luma block shares one CbCr pair. On odd-sized frames the last
//! column or row reuses the nearest chroma sample.

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::trace;

use crate::buffer::{PixelBufferView, Plane};
use crate::format::PixelFormat;

/// Errors from exporting a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Pixel format is neither NV12 nor BGRA32.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    /// A plane has no pixels.
    #[error("Plane {plane} is empty")]
    EmptyPlane { plane: usize },
}

/// Convert `view` into an 8-bit RGBA image of the same dimensions.
///
/// # Errors
///
/// Returns `ConvertError::UnsupportedFormat` for formats other than NV12 and
/// BGRA32, and `ConvertError::EmptyPlane` for NV12 frames too narrow or short
/// to carry chroma.
pub fn to_rgba_image(view: &PixelBufferView<'_>) -> Result<RgbaImage, ConvertError> {
    let format = view.format();
    trace!(%format, width = view.width(), height = view.height(), "to_rgba_image");
    match (format, view.planes()) {
        (PixelFormat::Bgra32, [packed]) => Ok(bgra_to_rgba(packed)),
        (PixelFormat::Nv12, [luma, chroma]) => {
            if chroma.width() == 0 || chroma.height() == 0 {
                return Err(ConvertError::EmptyPlane { plane: 1 });
            }
            Ok(nv12_to_rgba(luma, chroma))
        }
        _ => Err(ConvertError::UnsupportedFormat(format)),
    }
}

fn bgra_to_rgba(plane: &Plane<'_>) -> RgbaImage {
    let mut image = RgbaImage::new(plane.width(), plane.height());
    for (y, row) in plane.rows().enumerate() {
        for (x, px) in row.chunks_exact(4).enumerate() {
            image.put_pixel(x as u32, y as u32, Rgba([px[2], px[1], px[0], px[3]]));
        }
    }
    image
}

fn nv12_to_rgba(luma: &Plane<'_>, chroma: &Plane<'_>) -> RgbaImage {
    let mut image = RgbaImage::new(luma.width(), luma.height());
    let last_cx = chroma.width() - 1;
    let last_cy = chroma.height() - 1;
    for (y, luma_row) in luma.rows().enumerate() {
        let chroma_row = chroma.row((y as u32 / 2).min(last_cy));
        for (x, &luma_value) in luma_row.iter().enumerate() {
            let cx = (x as u32 / 2).min(last_cx) as usize * 2;
            let rgb = ycbcr_to_rgb(luma_value, chroma_row[cx], chroma_row[cx + 1]);
            image.put_pixel(x as u32, y as u32, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        }
    }
    image
}

/// Full-range BT.601 YCbCr to RGB.
#[inline]
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    [to_u8(r), to_u8(g), to_u8(b)]
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
