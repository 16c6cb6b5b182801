//! Geometry types shared by borrowed views and owned buffers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::PixelFormat;

/// Errors raised while describing a buffer's planes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Row stride cannot hold a full row of pixels.
    #[error("Stride too small: {stride} bytes cannot hold {width} pixels of {bytes_per_pixel} bytes")]
    StrideTooSmall {
        stride: usize,
        width: u32,
        bytes_per_pixel: usize,
    },

    /// Plane slice is shorter than its layout requires.
    #[error("Plane data too short: expected at least {expected} bytes, got {actual}")]
    PlaneTooShort { expected: usize, actual: usize },

    /// Chroma plane is not half the luma plane on both axes.
    #[error("Chroma plane is {chroma_width}x{chroma_height}, expected half of luma {luma_width}x{luma_height}")]
    ChromaMismatch {
        luma_width: u32,
        luma_height: u32,
        chroma_width: u32,
        chroma_height: u32,
    },

    /// Wrong number of planes for the format.
    #[error("{format} expects {expected} planes, got {actual}")]
    PlaneCount {
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },

    /// Plane bytes per pixel disagree with the format.
    #[error("Plane {plane} of {format} must use {expected} bytes per pixel, got {actual}")]
    BytesPerPixel {
        format: PixelFormat,
        plane: usize,
        expected: usize,
        actual: usize,
    },

    /// Plane dimensions disagree with the frame size.
    #[error("Plane {plane} is {width}x{height}, expected {expected_width}x{expected_height}")]
    PlaneSize {
        plane: usize,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    ZeroDimensions { width: u32, height: u32 },

    /// Requested sub-region does not fit inside the plane.
    #[error("Region {width}x{height} at ({x}, {y}) exceeds plane {plane_width}x{plane_height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        plane_width: u32,
        plane_height: u32,
    },
}

/// Pixel dimensions of an image or plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A `side` x `side` square.
    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// True if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Length of the shorter edge.
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Row geometry of a single plane.
///
/// Offsets are always derived through [`PlaneLayout::byte_offset`], which
/// refuses coordinates outside the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Width in pixels (chroma samples for subsampled planes).
    pub width: u32,
    /// Height in rows.
    pub height: u32,
    /// Bytes from the start of one row to the start of the next.
    pub stride: usize,
    /// Bytes occupied by one pixel of this plane.
    pub bytes_per_pixel: usize,
}

impl PlaneLayout {
    /// Create a layout, checking that `stride` can hold a full row.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        bytes_per_pixel: usize,
    ) -> Result<Self, BufferError> {
        let layout = Self {
            width,
            height,
            stride,
            bytes_per_pixel,
        };
        if stride < layout.row_bytes() {
            return Err(BufferError::StrideTooSmall {
                stride,
                width,
                bytes_per_pixel,
            });
        }
        Ok(layout)
    }

    /// Layout with no row padding.
    pub fn tight(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        Self {
            width,
            height,
            stride: width as usize * bytes_per_pixel,
            bytes_per_pixel,
        }
    }

    /// Bytes of pixel data in one row, excluding padding.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }

    /// Smallest slice length that covers every pixel of the plane.
    ///
    /// The last row does not need its padding.
    pub fn min_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        (self.height as usize - 1) * self.stride + self.row_bytes()
    }

    /// Byte index of pixel (`x`, `y`), or `None` outside the plane.
    #[inline]
    pub fn byte_offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.stride + x as usize * self.bytes_per_pixel)
    }

    /// Layout of a `width` x `height` window at (`x`, `y`), keeping the stride.
    ///
    /// Returns the window layout and the byte offset of its first pixel.
    pub fn window(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(PlaneLayout, usize), BufferError> {
        let fits = width > 0
            && height > 0
            && x.checked_add(width).is_some_and(|r| r <= self.width)
            && y.checked_add(height).is_some_and(|b| b <= self.height);
        let offset = self.byte_offset(x, y).filter(|_| fits).ok_or(BufferError::OutOfBounds {
            x,
            y,
            width,
            height,
            plane_width: self.width,
            plane_height: self.height,
        })?;
        let layout = PlaneLayout {
            width,
            height,
            stride: self.stride,
            bytes_per_pixel: self.bytes_per_pixel,
        };
        Ok((layout, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_must_hold_row() {
        assert!(PlaneLayout::new(100, 10, 400, 4).is_ok());
        assert!(PlaneLayout::new(100, 10, 512, 4).is_ok());

        let err = PlaneLayout::new(100, 10, 399, 4).unwrap_err();
        assert_eq!(
            err,
            BufferError::StrideTooSmall {
                stride: 399,
                width: 100,
                bytes_per_pixel: 4
            }
        );
    }

    #[test]
    fn test_min_len_skips_last_row_padding() {
        let layout = PlaneLayout::new(10, 3, 16, 1).unwrap();
        assert_eq!(layout.min_len(), 16 * 2 + 10);
        assert_eq!(PlaneLayout::tight(0, 0, 4).min_len(), 0);
    }

    #[test]
    fn test_byte_offset_bounds() {
        let layout = PlaneLayout::new(960, 540, 1024, 2).unwrap();
        assert_eq!(layout.byte_offset(0, 0), Some(0));
        assert_eq!(layout.byte_offset(210, 0), Some(420));
        assert_eq!(layout.byte_offset(3, 2), Some(2 * 1024 + 6));
        assert_eq!(layout.byte_offset(960, 0), None);
        assert_eq!(layout.byte_offset(0, 540), None);
    }

    #[test]
    fn test_window() {
        let layout = PlaneLayout::new(1920, 1080, 7680, 4).unwrap();
        let (win, offset) = layout.window(420, 0, 1080, 1080).unwrap();
        assert_eq!(offset, 420 * 4);
        assert_eq!(win.width, 1080);
        assert_eq!(win.height, 1080);
        assert_eq!(win.stride, 7680);

        assert!(layout.window(421, 0, 1500, 1080).is_err());
        assert!(layout.window(0, 1, 1080, 1080).is_err());
        assert!(layout.window(0, 0, 0, 10).is_err());
        assert!(layout.window(u32::MAX, 0, 2, 2).is_err());
    }

    #[test]
    fn test_size_helpers() {
        let size = Size::new(1920, 1080);
        assert_eq!(size.min_side(), 1080);
        assert_eq!(size.pixel_count(), 1920 * 1080);
        assert!(!size.is_empty());
        assert!(Size::new(0, 5).is_empty());
        assert_eq!(Size::square(64), Size::from((64, 64)));
    }
}
