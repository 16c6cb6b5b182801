//! Owned output buffers.

use tracing::trace;

use super::types::{BufferError, PlaneLayout, Size};
use super::view::{Plane, PixelBufferView, PlaneMut};
use crate::alloc::Allocation;
use crate::format::PixelFormat;

/// Callback that returns a buffer's bytes to whoever allocated them.
pub type ReleaseFn = Box<dyn FnOnce(Vec<u8>) + Send>;

/// Holds allocator-owned bytes and hands them back exactly once.
///
/// The callback sits in an `Option` and is taken on first use, so reaching
/// the release path again is a no-op.
pub(crate) struct ReleaseGuard {
    bytes: Vec<u8>,
    release: Option<ReleaseFn>,
}

impl ReleaseGuard {
    pub(crate) fn new(bytes: Vec<u8>, release: ReleaseFn) -> Self {
        Self {
            bytes,
            release: Some(release),
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn run(&mut self) {
        if let Some(release) = self.release.take() {
            release(std::mem::take(&mut self.bytes));
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.run();
    }
}

/// A frame buffer that owns its memory.
///
/// The memory comes from a [`BufferAllocator`](crate::alloc::BufferAllocator)
/// and goes back to it when the buffer is dropped or [`release`]d. `release`
/// consumes the buffer, so the bytes cannot be handed back twice.
///
/// [`release`]: PixelBuffer::release
pub struct PixelBuffer {
    format: PixelFormat,
    size: Size,
    planes: Vec<PlaneLayout>,
    offsets: Vec<usize>,
    storage: ReleaseGuard,
}

impl PixelBuffer {
    /// Take ownership of an allocation.
    ///
    /// The allocation is checked against its declared plane layouts. If the
    /// check fails the bytes are released before the error is returned.
    pub fn from_allocation(allocation: Allocation) -> Result<Self, BufferError> {
        let Allocation {
            format,
            size,
            planes,
            offsets,
            storage,
        } = allocation;

        let expected = format.plane_count().unwrap_or(planes.len());
        if planes.len() != expected || offsets.len() != planes.len() {
            return Err(BufferError::PlaneCount {
                format,
                expected,
                actual: planes.len().min(offsets.len()),
            });
        }
        for (layout, &offset) in planes.iter().zip(&offsets) {
            let end = offset.saturating_add(layout.min_len());
            if end > storage.bytes.len() {
                return Err(BufferError::PlaneTooShort {
                    expected: end,
                    actual: storage.bytes.len(),
                });
            }
        }

        Ok(Self {
            format,
            size,
            planes,
            offsets,
            storage,
        })
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width and height in pixels.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn plane_layout(&self, index: usize) -> Option<PlaneLayout> {
        self.planes.get(index).copied()
    }

    /// Read-only access to plane `index`.
    pub fn plane(&self, index: usize) -> Option<Plane<'_>> {
        let layout = *self.planes.get(index)?;
        let offset = *self.offsets.get(index)?;
        Plane::new(layout, self.storage.bytes.get(offset..)?).ok()
    }

    /// Writable access to plane `index`.
    pub fn plane_mut(&mut self, index: usize) -> Option<PlaneMut<'_>> {
        let layout = *self.planes.get(index)?;
        let start = *self.offsets.get(index)?;
        let end = start.checked_add(layout.min_len())?;
        PlaneMut::new(layout, self.storage.bytes.get_mut(start..end)?).ok()
    }

    /// Borrow the buffer as a view, e.g. to crop or resize it again.
    pub fn view(&self) -> Result<PixelBufferView<'_>, BufferError> {
        let planes = (0..self.planes.len())
            .map(|index| {
                let offset = self.offsets[index];
                Plane::new(self.planes[index], &self.storage.bytes[offset..])
            })
            .collect::<Result<Vec<_>, _>>()?;
        PixelBufferView::new(self.format, planes)
    }

    /// Total bytes backing the buffer, including row padding.
    pub fn byte_size(&self) -> usize {
        self.storage.bytes.len()
    }

    /// Hand the memory back to its allocator now.
    ///
    /// Equivalent to dropping the buffer.
    pub fn release(mut self) {
        trace!(format = %self.format, width = self.size.width, height = self.size.height, "release");
        self.storage.run();
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("format", &self.format)
            .field("size", &self.size)
            .field("planes", &self.planes)
            .field("offsets", &self.offsets)
            .field("len", &self.storage.bytes.len())
            .finish()
    }
}
