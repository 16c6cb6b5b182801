//! Plane resampling.
//!
//! The engine delegates all pixel work to a [`Scaler`]. It hands over one
//! source plane and one destination plane at a time, with their strides, and
//! expects the destination to be completely written on success.
//!
//! [`FirScaler`] is the default implementation, built on `fast_image_resize`
//! (SIMD-accelerated). It uses an area-weighted box filter and treats every
//! channel independently, so interleaved CbCr and BGRA bytes are resampled
//! without any alpha handling.

use fast_image_resize as fir;
use fir::images::{Image, ImageRef};
use fir::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use thiserror::Error;
use tracing::trace;

use crate::buffer::{Plane, PlaneMut};

/// Errors reported by a [`Scaler`].
#[derive(Debug, Error)]
pub enum ScaleError {
    /// No resampling kernel for this many bytes per pixel.
    #[error("Unsupported pixel size: {0} bytes")]
    UnsupportedPixelSize(usize),

    /// Source and destination planes disagree on bytes per pixel.
    #[error("Pixel size mismatch: source has {src} bytes per pixel, destination {dst}")]
    PixelSizeMismatch { src: usize, dst: usize },

    /// One of the planes has no pixels.
    #[error("Cannot scale empty plane {width}x{height}")]
    EmptyPlane { width: u32, height: u32 },

    /// Buffer rejected by `fast_image_resize`.
    #[error("Image buffer error: {0}")]
    ImageBuffer(#[from] fir::ImageBufferError),

    /// Resampling failed inside `fast_image_resize`.
    #[error("Fast image resize error: {0}")]
    Resize(#[from] fir::ResizeError),
}

/// Resamples one plane into another.
pub trait Scaler {
    /// Fill `dst` with `src` resampled to `dst`'s dimensions.
    fn scale(&mut self, src: &Plane<'_>, dst: &mut PlaneMut<'_>) -> Result<(), ScaleError>;
}

impl<S: Scaler + ?Sized> Scaler for &mut S {
    fn scale(&mut self, src: &Plane<'_>, dst: &mut PlaneMut<'_>) -> Result<(), ScaleError> {
        (**self).scale(src, dst)
    }
}

impl<S: Scaler + ?Sized> Scaler for Box<S> {
    fn scale(&mut self, src: &Plane<'_>, dst: &mut PlaneMut<'_>) -> Result<(), ScaleError> {
        (**self).scale(src, dst)
    }
}

/// CPU scaler on top of `fast_image_resize`.
///
/// Keeps its resizer and staging buffers between calls, so reuse one
/// instance per worker.
pub struct FirScaler {
    resizer: Resizer,
    options: ResizeOptions,
    src_staging: Vec<u8>,
    dst_staging: Vec<u8>,
}

impl Default for FirScaler {
    fn default() -> Self {
        Self::with_algorithm(ResizeAlg::Convolution(FilterType::Box))
    }
}

impl FirScaler {
    /// Area-weighted (box filter) scaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scaler using a specific `fast_image_resize` algorithm.
    pub fn with_algorithm(algorithm: ResizeAlg) -> Self {
        Self {
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(algorithm).use_alpha(false),
            src_staging: Vec::new(),
            dst_staging: Vec::new(),
        }
    }
}

impl std::fmt::Debug for FirScaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirScaler")
            .field("src_staging", &self.src_staging.len())
            .field("dst_staging", &self.dst_staging.len())
            .finish_non_exhaustive()
    }
}

fn pixel_type(bytes_per_pixel: usize) -> Result<PixelType, ScaleError> {
    match bytes_per_pixel {
        1 => Ok(PixelType::U8),
        2 => Ok(PixelType::U8x2),
        4 => Ok(PixelType::U8x4),
        other => Err(ScaleError::UnsupportedPixelSize(other)),
    }
}

impl Scaler for FirScaler {
    fn scale(&mut self, src: &Plane<'_>, dst: &mut PlaneMut<'_>) -> Result<(), ScaleError> {
        let src_layout = src.layout();
        let dst_layout = dst.layout();
        if src_layout.bytes_per_pixel != dst_layout.bytes_per_pixel {
            return Err(ScaleError::PixelSizeMismatch {
                src: src_layout.bytes_per_pixel,
                dst: dst_layout.bytes_per_pixel,
            });
        }
        let pixel_type = pixel_type(src_layout.bytes_per_pixel)?;
        for layout in [src_layout, dst_layout] {
            if layout.width == 0 || layout.height == 0 {
                return Err(ScaleError::EmptyPlane {
                    width: layout.width,
                    height: layout.height,
                });
            }
        }
        trace!(
            src_w = src_layout.width,
            src_h = src_layout.height,
            dst_w = dst_layout.width,
            dst_h = dst_layout.height,
            bpp = src_layout.bytes_per_pixel,
            "scale plane"
        );

        // Same geometry: plain row copy.
        if src_layout.width == dst_layout.width && src_layout.height == dst_layout.height {
            for (y, row) in src.rows().enumerate() {
                dst.row_mut(y as u32).copy_from_slice(row);
            }
            return Ok(());
        }

        // --- Source: fast_image_resize wants tightly packed rows ---
        let src_row_bytes = src_layout.row_bytes();
        let src_tight_len = src_row_bytes * src_layout.height as usize;
        let src_bytes: &[u8] = if src_layout.stride == src_row_bytes {
            &src.data()[..src_tight_len]
        } else {
            self.src_staging.clear();
            self.src_staging.reserve(src_tight_len);
            for row in src.rows() {
                self.src_staging.extend_from_slice(row);
            }
            &self.src_staging
        };
        let src_image = ImageRef::new(src_layout.width, src_layout.height, src_bytes, pixel_type)?;

        // --- Destination: write in place when tight, otherwise stage and scatter ---
        let dst_row_bytes = dst_layout.row_bytes();
        let dst_tight_len = dst_row_bytes * dst_layout.height as usize;
        if dst_layout.stride == dst_row_bytes {
            let mut dst_image = Image::from_slice_u8(
                dst_layout.width,
                dst_layout.height,
                &mut dst.data_mut()[..dst_tight_len],
                pixel_type,
            )?;
            self.resizer.resize(&src_image, &mut dst_image, &self.options)?;
        } else {
            self.dst_staging.clear();
            self.dst_staging.resize(dst_tight_len, 0);
            {
                let mut dst_image = Image::from_slice_u8(
                    dst_layout.width,
                    dst_layout.height,
                    &mut self.dst_staging,
                    pixel_type,
                )?;
                self.resizer.resize(&src_image, &mut dst_image, &self.options)?;
            }
            for (y, row) in self.dst_staging.chunks_exact(dst_row_bytes).enumerate() {
                dst.row_mut(y as u32).copy_from_slice(row);
            }
        }
        Ok(())
    }
}
