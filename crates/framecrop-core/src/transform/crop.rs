//! Zero-copy cropping by plane offset arithmetic.
//!
//! A crop never touches pixel data. It derives, for every plane, the byte
//! offset of the region's first pixel and returns a [`PixelBufferView`] whose
//! planes start there, with the source strides unchanged. The result borrows
//! the source memory and cannot outlive it.
//!
//! # Offsets
//!
//! For a region whose top-left luma pixel is (`x`, `y`):
//!
//! - NV12 luma: `y * stride_y + x`
//! - NV12 chroma: `(y / 2) * stride_uv + (x / 2) * 2`
//! - BGRA32: `y * stride + x * 4`
//!
//! Chroma offsets are derived from the halved luma origin rather than
//! recomputed, which keeps both planes aligned on the same image position.

use tracing::trace;

use super::types::{CropError, CropRegion};
use crate::buffer::{BufferError, PixelBufferView};
use crate::format::PixelFormat;

/// Square region used by [`center_square_crop`] for a `width` x `height` source.
///
/// The origin is centred on the longer axis: a landscape frame gets
/// `x = (width - height) / 2, y = 0`, anything else
/// `x = 0, y = (height - width) / 2`. Integer division truncates.
///
/// # Errors
///
/// Returns `CropError::RegionExceedsSource` if `side` is larger than the
/// shorter edge.
pub fn center_square_region(width: u32, height: u32, side: u32) -> Result<CropRegion, CropError> {
    if side > width.min(height) {
        return Err(CropError::RegionExceedsSource {
            width: side,
            height: side,
            source_width: width,
            source_height: height,
        });
    }
    let (origin_x, origin_y) = if width > height {
        ((width - height) / 2, 0)
    } else {
        (0, (height - width) / 2)
    };
    Ok(CropRegion {
        origin_x,
        origin_y,
        side,
    })
}

/// Crop a `side` x `side` square out of `source`, centred on its longer axis.
///
/// The returned view aliases `source`'s memory: plane base offsets move,
/// strides stay, and widths/heights become the cropped size (halved for NV12
/// chroma). Nothing is copied or allocated.
///
/// # Errors
///
/// - `CropError::UnsupportedFormat` for formats other than NV12 and BGRA32,
///   checked before any offset is computed
/// - `CropError::EmptyRegion` for `side == 0`, or `side == 1` on NV12 (no chroma)
/// - `CropError::RegionExceedsSource` if `side` exceeds the shorter edge
pub fn center_square_crop<'a>(
    source: &PixelBufferView<'a>,
    side: u32,
) -> Result<PixelBufferView<'a>, CropError> {
    let format = ensure_supported(source)?;
    trace!(%format, width = source.width(), height = source.height(), side, "center_square_crop");

    let region = center_square_region(source.width(), source.height(), side)?;
    window(source, region.origin_x, region.origin_y, side, side)
}

/// Crop a `width` x `height` region centred on both axes of `source`.
///
/// The origin is `((W - width) / 2, (H - height) / 2)`. Offsets and borrowing
/// follow [`center_square_crop`].
///
/// # Errors
///
/// Same as [`center_square_crop`], with `RegionExceedsSource` raised when
/// either dimension is larger than the source.
pub fn centered_crop<'a>(
    source: &PixelBufferView<'a>,
    width: u32,
    height: u32,
) -> Result<PixelBufferView<'a>, CropError> {
    let format = ensure_supported(source)?;
    trace!(%format, src_w = source.width(), src_h = source.height(), width, height, "centered_crop");

    let (src_w, src_h) = (source.width(), source.height());
    if width > src_w || height > src_h {
        return Err(CropError::RegionExceedsSource {
            width,
            height,
            source_width: src_w,
            source_height: src_h,
        });
    }
    window(source, (src_w - width) / 2, (src_h - height) / 2, width, height)
}

fn ensure_supported(source: &PixelBufferView<'_>) -> Result<PixelFormat, CropError> {
    let format = source.format();
    if format.is_supported() {
        Ok(format)
    } else {
        Err(CropError::UnsupportedFormat(format))
    }
}

/// Window every plane of `source` onto the luma-space rectangle.
fn window<'a>(
    source: &PixelBufferView<'a>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<PixelBufferView<'a>, CropError> {
    let format = source.format();
    let empty = CropError::EmptyRegion {
        format,
        width,
        height,
    };
    if width == 0 || height == 0 {
        return Err(empty);
    }

    match (format, source.planes()) {
        (PixelFormat::Nv12, [luma, chroma]) => {
            if width < 2 || height < 2 {
                return Err(empty);
            }
            let luma = luma.window(x, y, width, height)?;
            let chroma = chroma.window(x / 2, y / 2, width / 2, height / 2)?;
            Ok(PixelBufferView::new(format, vec![luma, chroma])?)
        }
        (PixelFormat::Bgra32, [packed]) => {
            let packed = packed.window(x, y, width, height)?;
            Ok(PixelBufferView::new(format, vec![packed])?)
        }
        (PixelFormat::Other(_), _) => Err(CropError::UnsupportedFormat(format)),
        (_, planes) => Err(CropError::InvalidLayout(BufferError::PlaneCount {
            format,
            expected: format.plane_count().unwrap_or(0),
            actual: planes.len(),
        })),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for frame dimensions (keep reasonable for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (2u32..=96, 2u32..=96)
    }

    /// BGRA frame with row padding where each pixel encodes its position.
    fn bgra_frame(width: u32, height: u32) -> (Vec<u8>, usize) {
        let stride = width as usize * 4 + 12;
        let mut data = vec![0u8; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let i = y * stride + x * 4;
                data[i..i + 4].copy_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        (data, stride)
    }

    proptest! {
        /// Property: the square region lies inside the source.
        #[test]
        fn prop_region_within_bounds(
            (width, height) in dimensions_strategy(),
            fraction in 0.0f64..=1.0,
        ) {
            let side = ((width.min(height) as f64) * fraction) as u32;
            let region = center_square_region(width, height, side).unwrap();

            prop_assert!(region.origin_x + side <= width);
            prop_assert!(region.origin_y + side <= height);
            prop_assert!(region.fits_within(width, height));
        }

        /// Property: the origin follows the longer-axis centring formula.
        #[test]
        fn prop_region_centred_on_longer_axis(
            (width, height) in dimensions_strategy(),
        ) {
            let region = center_square_region(width, height, width.min(height)).unwrap();
            if width > height {
                prop_assert_eq!(region.origin_x, (width - height) / 2);
                prop_assert_eq!(region.origin_y, 0);
            } else {
                prop_assert_eq!(region.origin_x, 0);
                prop_assert_eq!(region.origin_y, (height - width) / 2);
            }
        }

        /// Property: any side beyond the shorter edge is rejected.
        #[test]
        fn prop_oversized_side_rejected(
            (width, height) in dimensions_strategy(),
            extra in 1u32..=64,
        ) {
            let side = width.min(height) + extra;
            let result = center_square_region(width, height, side);
            let is_exceeds = matches!(result, Err(CropError::RegionExceedsSource { .. }));
            prop_assert!(is_exceeds);
        }

        /// Property: cropped pixels are the source pixels at the region offset.
        #[test]
        fn prop_crop_reads_source_pixels(
            (width, height) in dimensions_strategy(),
        ) {
            let (data, stride) = bgra_frame(width, height);
            let source = PixelBufferView::bgra(width, height, &data, stride).unwrap();
            let side = width.min(height);
            let region = center_square_region(width, height, side).unwrap();
            let crop = center_square_crop(&source, side).unwrap();
            let plane = crop.plane(0).unwrap();

            prop_assert_eq!(crop.size().width, side);
            prop_assert_eq!(crop.size().height, side);
            for (y, x) in [(0, 0), (side - 1, side - 1), (side / 2, side / 3)] {
                let px = plane.pixel(x, y).unwrap();
                prop_assert_eq!(px[0], (region.origin_x + x) as u8);
                prop_assert_eq!(px[1], (region.origin_y + y) as u8);
            }
        }

        /// Property: NV12 chroma window is half the luma window on both axes.
        #[test]
        fn prop_nv12_chroma_half_of_luma(
            (width, height) in (4u32..=96, 4u32..=96),
        ) {
            let luma = vec![0u8; (width * height) as usize];
            let chroma = vec![0u8; ((width / 2) * 2 * (height / 2)) as usize];
            let source = PixelBufferView::nv12(
                width, height, &luma, width as usize, &chroma, (width / 2) as usize * 2,
            ).unwrap();
            let side = width.min(height);
            let crop = center_square_crop(&source, side).unwrap();

            let region = center_square_region(width, height, side).unwrap();
            let expected_luma = region.origin_y as usize * width as usize + region.origin_x as usize;
            let expected_chroma = (region.origin_y / 2) as usize * (width / 2) as usize * 2
                + (region.origin_x / 2) as usize * 2;

            let luma_offset = crop.plane(0).unwrap().data().as_ptr() as usize - luma.as_ptr() as usize;
            let chroma_offset = crop.plane(1).unwrap().data().as_ptr() as usize - chroma.as_ptr() as usize;
            prop_assert_eq!(luma_offset, expected_luma);
            prop_assert_eq!(chroma_offset, expected_chroma);
            prop_assert_eq!(crop.plane(1).unwrap().width(), side / 2);
            prop_assert_eq!(crop.plane(1).unwrap().height(), side / 2);
        }

        /// Property: cropping is deterministic.
        #[test]
        fn prop_crop_is_deterministic(
            (width, height) in dimensions_strategy(),
        ) {
            let (data, stride) = bgra_frame(width, height);
            let source = PixelBufferView::bgra(width, height, &data, stride).unwrap();
            let side = width.min(height);

            let a = center_square_crop(&source, side).unwrap();
            let b = center_square_crop(&source, side).unwrap();
            prop_assert_eq!(a.plane(0).unwrap().data().as_ptr(), b.plane(0).unwrap().data().as_ptr());
            prop_assert_eq!(a.size(), b.size());
        }
    }
}
