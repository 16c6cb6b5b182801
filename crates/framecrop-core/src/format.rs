//! Pixel format tags and per-plane geometry.
//!
//! Only two layouts are handled by the crop and resize paths:
//!
//! - [`PixelFormat::Nv12`] - bi-planar YUV 4:2:0. Plane 0 is full-resolution
//!   luma (1 byte per pixel), plane 1 is half-resolution interleaved CbCr
//!   (2 bytes per chroma sample pair).
//! - [`PixelFormat::Bgra32`] - a single plane of packed B-G-R-A bytes.
//!
//! Anything else is carried as [`PixelFormat::Other`] with its FourCC code so
//! that callers can report what they received, but every operation rejects it
//! before touching plane memory.

use serde::{Deserialize, Serialize};

/// FourCC for full-range bi-planar 4:2:0 (`'420f'`).
pub const FOURCC_420F: u32 = u32::from_be_bytes(*b"420f");

/// FourCC for video-range bi-planar 4:2:0 (`'420v'`).
pub const FOURCC_420V: u32 = u32::from_be_bytes(*b"420v");

/// FourCC for packed 32-bit BGRA (`'BGRA'`).
pub const FOURCC_BGRA: u32 = u32::from_be_bytes(*b"BGRA");

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Bi-planar YUV 4:2:0: full-resolution luma, half-resolution interleaved chroma.
    Nv12,
    /// Packed 32-bit, 4 bytes per pixel in B-G-R-A order.
    Bgra32,
    /// Any other format, identified by its FourCC code. Never supported.
    Other(u32),
}

impl PixelFormat {
    /// Returns true for the formats the crop and resize paths understand.
    #[inline]
    pub fn is_supported(self) -> bool {
        !matches!(self, PixelFormat::Other(_))
    }

    /// Number of planes, or `None` for unsupported formats.
    pub fn plane_count(self) -> Option<usize> {
        match self {
            PixelFormat::Nv12 => Some(2),
            PixelFormat::Bgra32 => Some(1),
            PixelFormat::Other(_) => None,
        }
    }

    /// Bytes per pixel of the given plane, or `None` if the plane does not exist.
    pub fn bytes_per_pixel(self, plane: usize) -> Option<usize> {
        match (self, plane) {
            (PixelFormat::Nv12, 0) => Some(1),
            (PixelFormat::Nv12, 1) => Some(2),
            (PixelFormat::Bgra32, 0) => Some(4),
            _ => None,
        }
    }

    /// Pixel dimensions of `plane` for an image of `width` x `height`.
    ///
    /// Chroma of [`PixelFormat::Nv12`] is subsampled by two on both axes,
    /// rounding down.
    pub fn plane_dimensions(self, plane: usize, width: u32, height: u32) -> Option<(u32, u32)> {
        match (self, plane) {
            (PixelFormat::Nv12, 0) | (PixelFormat::Bgra32, 0) => Some((width, height)),
            (PixelFormat::Nv12, 1) => Some((width / 2, height / 2)),
            _ => None,
        }
    }

    /// FourCC code for this format.
    pub fn fourcc(self) -> u32 {
        match self {
            PixelFormat::Nv12 => FOURCC_420F,
            PixelFormat::Bgra32 => FOURCC_BGRA,
            PixelFormat::Other(code) => code,
        }
    }
}

impl From<u32> for PixelFormat {
    fn from(code: u32) -> Self {
        match code {
            FOURCC_420F | FOURCC_420V => PixelFormat::Nv12,
            FOURCC_BGRA => PixelFormat::Bgra32,
            other => PixelFormat::Other(other),
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Nv12 => write!(f, "NV12"),
            PixelFormat::Bgra32 => write!(f, "BGRA32"),
            PixelFormat::Other(code) => {
                let bytes = code.to_be_bytes();
                if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                    write!(f, "'{}'", String::from_utf8_lossy(&bytes))
                } else {
                    write!(f, "{:#010x}", code)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_round_trip_for_known_formats() {
        assert_eq!(PixelFormat::from(FOURCC_420F), PixelFormat::Nv12);
        assert_eq!(PixelFormat::from(FOURCC_420V), PixelFormat::Nv12);
        assert_eq!(PixelFormat::from(FOURCC_BGRA), PixelFormat::Bgra32);
        assert_eq!(PixelFormat::Bgra32.fourcc(), 0x4247_5241);
    }

    #[test]
    fn test_unknown_fourcc_is_other() {
        let code = u32::from_be_bytes(*b"y420");
        let format = PixelFormat::from(code);
        assert_eq!(format, PixelFormat::Other(code));
        assert!(!format.is_supported());
        assert_eq!(format.plane_count(), None);
        assert_eq!(format.bytes_per_pixel(0), None);
    }

    #[test]
    fn test_plane_geometry() {
        assert_eq!(PixelFormat::Nv12.plane_count(), Some(2));
        assert_eq!(PixelFormat::Nv12.bytes_per_pixel(0), Some(1));
        assert_eq!(PixelFormat::Nv12.bytes_per_pixel(1), Some(2));
        assert_eq!(PixelFormat::Nv12.bytes_per_pixel(2), None);
        assert_eq!(PixelFormat::Bgra32.bytes_per_pixel(0), Some(4));
        assert_eq!(PixelFormat::Bgra32.bytes_per_pixel(1), None);

        assert_eq!(
            PixelFormat::Nv12.plane_dimensions(1, 1920, 1080),
            Some((960, 540))
        );
        assert_eq!(PixelFormat::Nv12.plane_dimensions(1, 5, 3), Some((2, 1)));
        assert_eq!(
            PixelFormat::Bgra32.plane_dimensions(0, 640, 480),
            Some((640, 480))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PixelFormat::Nv12.to_string(), "NV12");
        assert_eq!(PixelFormat::Other(FOURCC_420F).to_string(), "'420f'");
        assert_eq!(PixelFormat::Other(1).to_string(), "0x00000001");
    }
}
