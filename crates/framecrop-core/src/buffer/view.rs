//! Borrowed, non-owning views over plane memory.
//!
//! A [`PixelBufferView`] never owns its bytes. It is tied to the lifetime of
//! the slices it was built from, so a crop that aliases a source frame cannot
//! outlive that frame.

use super::types::{BufferError, PlaneLayout, Size};
use crate::format::PixelFormat;

/// Read-only plane: a layout plus the bytes starting at its first pixel.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    layout: PlaneLayout,
    data: &'a [u8],
}

impl<'a> Plane<'a> {
    /// Wrap `data`, checking that it covers every row of `layout`.
    pub fn new(layout: PlaneLayout, data: &'a [u8]) -> Result<Self, BufferError> {
        let expected = layout.min_len();
        if data.len() < expected {
            return Err(BufferError::PlaneTooShort {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { layout, data })
    }

    #[inline]
    pub fn layout(&self) -> PlaneLayout {
        self.layout
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    /// The underlying bytes, starting at pixel (0, 0).
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the plane.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(y < self.layout.height, "row {} out of bounds", y);
        let start = y as usize * self.layout.stride;
        &self.data[start..start + self.layout.row_bytes()]
    }

    /// Iterates over rows, without padding.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.layout.height).map(move |y| self.row(y))
    }

    /// Bytes of the pixel at (`x`, `y`), or `None` outside the plane.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&'a [u8]> {
        let offset = self.layout.byte_offset(x, y)?;
        self.data.get(offset..offset + self.layout.bytes_per_pixel)
    }

    /// A window into this plane sharing the same memory and stride.
    pub fn window(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Plane<'a>, BufferError> {
        let (layout, offset) = self.layout.window(x, y, width, height)?;
        Plane::new(layout, &self.data[offset..])
    }
}

/// Writable plane, used for freshly allocated output buffers.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    layout: PlaneLayout,
    data: &'a mut [u8],
}

impl<'a> PlaneMut<'a> {
    /// Wrap `data`, checking that it covers every row of `layout`.
    pub fn new(layout: PlaneLayout, data: &'a mut [u8]) -> Result<Self, BufferError> {
        let expected = layout.min_len();
        if data.len() < expected {
            return Err(BufferError::PlaneTooShort {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { layout, data })
    }

    #[inline]
    pub fn layout(&self) -> PlaneLayout {
        self.layout
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    /// The underlying bytes, starting at pixel (0, 0).
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Mutable pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the plane.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.layout.height, "row {} out of bounds", y);
        let start = y as usize * self.layout.stride;
        let end = start + self.layout.row_bytes();
        &mut self.data[start..end]
    }

    /// Read-only view of the same plane.
    pub fn as_plane(&self) -> Plane<'_> {
        Plane {
            layout: self.layout,
            data: &*self.data,
        }
    }
}

/// Non-owning description of a frame: format plus one [`Plane`] per plane.
///
/// Views over supported formats are validated on construction (plane count,
/// bytes per pixel, 4:2:0 chroma subsampling). Views tagged
/// [`PixelFormat::Other`] are accepted as opaque so that they can be handed to
/// operations, which then reject them.
#[derive(Debug, Clone)]
pub struct PixelBufferView<'a> {
    format: PixelFormat,
    planes: Vec<Plane<'a>>,
}

impl<'a> PixelBufferView<'a> {
    /// Build a view from already-described planes.
    pub fn new(format: PixelFormat, planes: Vec<Plane<'a>>) -> Result<Self, BufferError> {
        if let Some(expected) = format.plane_count() {
            if planes.len() != expected {
                return Err(BufferError::PlaneCount {
                    format,
                    expected,
                    actual: planes.len(),
                });
            }
            for (index, plane) in planes.iter().enumerate() {
                let bpp = format.bytes_per_pixel(index).unwrap_or(0);
                if plane.layout().bytes_per_pixel != bpp {
                    return Err(BufferError::BytesPerPixel {
                        format,
                        plane: index,
                        expected: bpp,
                        actual: plane.layout().bytes_per_pixel,
                    });
                }
            }
            let luma = planes[0].layout();
            if luma.width == 0 || luma.height == 0 {
                return Err(BufferError::ZeroDimensions {
                    width: luma.width,
                    height: luma.height,
                });
            }
            if format == PixelFormat::Nv12 {
                let chroma = planes[1].layout();
                if chroma.width != luma.width / 2 || chroma.height != luma.height / 2 {
                    return Err(BufferError::ChromaMismatch {
                        luma_width: luma.width,
                        luma_height: luma.height,
                        chroma_width: chroma.width,
                        chroma_height: chroma.height,
                    });
                }
            }
        }
        Ok(Self { format, planes })
    }

    /// View over a bi-planar 4:2:0 frame.
    pub fn nv12(
        width: u32,
        height: u32,
        luma: &'a [u8],
        luma_stride: usize,
        chroma: &'a [u8],
        chroma_stride: usize,
    ) -> Result<Self, BufferError> {
        let y = Plane::new(PlaneLayout::new(width, height, luma_stride, 1)?, luma)?;
        let uv = Plane::new(
            PlaneLayout::new(width / 2, height / 2, chroma_stride, 2)?,
            chroma,
        )?;
        Self::new(PixelFormat::Nv12, vec![y, uv])
    }

    /// View over a packed BGRA frame.
    pub fn bgra(width: u32, height: u32, data: &'a [u8], stride: usize) -> Result<Self, BufferError> {
        let plane = Plane::new(PlaneLayout::new(width, height, stride, 4)?, data)?;
        Self::new(PixelFormat::Bgra32, vec![plane])
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Width of plane 0, or 0 for a view without planes.
    pub fn width(&self) -> u32 {
        self.planes.first().map_or(0, Plane::width)
    }

    /// Height of plane 0, or 0 for a view without planes.
    pub fn height(&self) -> u32 {
        self.planes.first().map_or(0, Plane::height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn planes(&self) -> &[Plane<'a>] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> Option<&Plane<'a>> {
        self.planes.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_rejects_short_data() {
        let layout = PlaneLayout::new(4, 4, 8, 1).unwrap();
        let data = vec![0u8; 8 * 3 + 3];
        let err = Plane::new(layout, &data).unwrap_err();
        assert_eq!(
            err,
            BufferError::PlaneTooShort {
                expected: 28,
                actual: 27
            }
        );
    }

    #[test]
    fn test_plane_rows_skip_padding() {
        let mut data = vec![0xEEu8; 8 * 2];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);
        data[8..12].copy_from_slice(&[5, 6, 7, 8]);
        let plane = Plane::new(PlaneLayout::new(4, 2, 8, 1).unwrap(), &data).unwrap();

        let rows: Vec<&[u8]> = plane.rows().collect();
        assert_eq!(rows, vec![&[1u8, 2, 3, 4][..], &[5u8, 6, 7, 8][..]]);
        assert_eq!(plane.pixel(3, 1), Some(&[8u8][..]));
        assert_eq!(plane.pixel(4, 1), None);
    }

    #[test]
    fn test_plane_window_aliases_memory() {
        let data: Vec<u8> = (0..64).collect();
        let plane = Plane::new(PlaneLayout::new(8, 8, 8, 1).unwrap(), &data).unwrap();
        let win = plane.window(2, 3, 4, 4).unwrap();

        assert_eq!(win.row(0), &[26, 27, 28, 29]);
        assert_eq!(win.stride(), 8);
        assert!(std::ptr::eq(win.data().as_ptr(), &data[26]));
    }

    #[test]
    fn test_plane_mut_writes_visible_through_as_plane() {
        let mut data = vec![0u8; 6 * 2];
        let mut plane = PlaneMut::new(PlaneLayout::new(2, 2, 6, 2).unwrap(), &mut data).unwrap();
        plane.row_mut(1).copy_from_slice(&[1, 2, 3, 4]);

        let read = plane.as_plane();
        assert_eq!(read.row(0), &[0, 0, 0, 0]);
        assert_eq!(read.row(1), &[1, 2, 3, 4]);
        assert_eq!(read.pixel(1, 1), Some(&[3u8, 4][..]));
        drop(plane);
        assert_eq!(&data[6..10], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_nv12_view() {
        let luma = vec![0u8; 64 * 32];
        let chroma = vec![0u8; 64 * 16];
        let view = PixelBufferView::nv12(64, 32, &luma, 64, &chroma, 64).unwrap();

        assert_eq!(view.format(), PixelFormat::Nv12);
        assert_eq!(view.size(), Size::new(64, 32));
        assert_eq!(view.planes().len(), 2);
        assert_eq!(view.plane(1).map(Plane::width), Some(32));
        assert_eq!(view.plane(1).map(Plane::height), Some(16));
    }

    #[test]
    fn test_nv12_chroma_mismatch() {
        let luma = vec![0u8; 64 * 32];
        let chroma = vec![0u8; 64 * 32];
        let y = Plane::new(PlaneLayout::tight(64, 32, 1), &luma).unwrap();
        let uv = Plane::new(PlaneLayout::tight(32, 32, 2), &chroma).unwrap();

        let err = PixelBufferView::new(PixelFormat::Nv12, vec![y, uv]).unwrap_err();
        assert!(matches!(err, BufferError::ChromaMismatch { .. }));
    }

    #[test]
    fn test_plane_count_and_bpp_checked() {
        let data = vec![0u8; 16 * 16 * 4];
        let packed = Plane::new(PlaneLayout::tight(16, 16, 4), &data).unwrap();
        let err = PixelBufferView::new(PixelFormat::Nv12, vec![packed]).unwrap_err();
        assert!(matches!(err, BufferError::PlaneCount { expected: 2, .. }));

        let luma = Plane::new(PlaneLayout::tight(16, 16, 1), &data).unwrap();
        let err = PixelBufferView::new(PixelFormat::Bgra32, vec![luma]).unwrap_err();
        assert!(matches!(err, BufferError::BytesPerPixel { expected: 4, .. }));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = PixelBufferView::bgra(0, 10, &[], 0).unwrap_err();
        assert_eq!(err, BufferError::ZeroDimensions { width: 0, height: 10 });
    }

    #[test]
    fn test_other_format_is_opaque() {
        let data = vec![0u8; 16];
        let plane = Plane::new(PlaneLayout::tight(4, 4, 1), &data).unwrap();
        let code = u32::from_be_bytes(*b"y420");
        let view = PixelBufferView::new(PixelFormat::Other(code), vec![plane]).unwrap();
        assert_eq!(view.size(), Size::new(4, 4));
    }
}
