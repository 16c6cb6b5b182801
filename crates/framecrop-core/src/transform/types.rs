//! Error and region types for crop and resize.

use thiserror::Error;

use crate::alloc::AllocError;
use crate::buffer::BufferError;
use crate::format::PixelFormat;
use crate::scale::ScaleError;

/// Errors from crop operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CropError {
    /// Requested region is larger than the source.
    #[error("Crop region {width}x{height} exceeds source {source_width}x{source_height}")]
    RegionExceedsSource {
        width: u32,
        height: u32,
        source_width: u32,
        source_height: u32,
    },

    /// Pixel format is neither NV12 nor BGRA32.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    /// Requested region has no pixels on some plane.
    #[error("Crop region {width}x{height} is empty for {format}")]
    EmptyRegion {
        format: PixelFormat,
        width: u32,
        height: u32,
    },

    /// Source planes could not be windowed.
    #[error("Invalid source layout: {0}")]
    InvalidLayout(#[from] BufferError),
}

/// Errors from resize operations.
#[derive(Debug, Error)]
pub enum ResizeError {
    /// Output buffer could not be obtained from the allocator.
    #[error("Failed to allocate output buffer: {0}")]
    AllocationFailed(#[source] AllocError),

    /// The scaler reported a failure.
    #[error("Scaling failed: {0}")]
    ScaleFailed(#[source] ScaleError),

    /// Pixel format is neither NV12 nor BGRA32.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    /// Target has no pixels on some plane.
    #[error("Invalid target size {width}x{height} for {format}")]
    InvalidTargetSize {
        format: PixelFormat,
        width: u32,
        height: u32,
    },

    /// A source plane has no pixels, e.g. the chroma of a 1-pixel-wide NV12 frame.
    #[error("Source plane {plane} of {format} is empty")]
    EmptySourcePlane { format: PixelFormat, plane: usize },

    /// Cropping before the resize failed.
    #[error("Crop failed: {0}")]
    Crop(#[source] CropError),
}

impl From<CropError> for ResizeError {
    fn from(err: CropError) -> Self {
        match err {
            CropError::UnsupportedFormat(format) => ResizeError::UnsupportedFormat(format),
            other => ResizeError::Crop(other),
        }
    }
}

/// A square region of a source frame, in luma (plane 0) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge.
    pub origin_x: u32,
    /// Top edge.
    pub origin_y: u32,
    /// Edge length.
    pub side: u32,
}

impl CropRegion {
    /// Origin of this region on `plane` of `format`.
    ///
    /// Subsampled chroma takes the luma origin halved and rounded down, so
    /// both planes always start at the same image position.
    pub fn plane_origin(&self, format: PixelFormat, plane: usize) -> Option<(u32, u32)> {
        match (format, plane) {
            (PixelFormat::Nv12, 0) | (PixelFormat::Bgra32, 0) => {
                Some((self.origin_x, self.origin_y))
            }
            (PixelFormat::Nv12, 1) => Some((self.origin_x / 2, self.origin_y / 2)),
            _ => None,
        }
    }

    /// True if the region lies inside a `width` x `height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.origin_x
            .checked_add(self.side)
            .is_some_and(|right| right <= width)
            && self
                .origin_y
                .checked_add(self.side)
                .is_some_and(|bottom| bottom <= height)
    }
}
