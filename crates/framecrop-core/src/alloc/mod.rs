//! Output buffer allocation.
//!
//! The engine never allocates plane memory itself. It asks a
//! [`BufferAllocator`] for an [`Allocation`]: zeroed bytes, the plane layout
//! inside them, and the callback that gives the bytes back. The callback runs
//! exactly once: when the resulting
//! [`PixelBuffer`](crate::buffer::PixelBuffer) is released, or when the
//! allocation itself is dropped unused.
//!
//! Two allocators are provided:
//!
//! - [`HeapAllocator`] - a fresh `Vec<u8>` per request, freed on release
//! - [`PixelBufferPool`] - fixed-geometry buffers recycled across frames

mod pool;

pub use pool::{PixelBufferPool, PoolConfig, PoolStats};

use thiserror::Error;
use tracing::trace;

use crate::buffer::{BufferError, PlaneLayout, ReleaseFn, ReleaseGuard, Size};
use crate::format::PixelFormat;

/// Errors returned by allocators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// Requested width or height is zero, or a plane would be empty.
    #[error("Cannot allocate a {width}x{height} buffer")]
    ZeroSize { width: u32, height: u32 },

    /// Byte size does not fit in memory arithmetic.
    #[error("Buffer size overflows for {width}x{height}")]
    Overflow { width: u32, height: u32 },

    /// Pool has reached its outstanding buffer limit.
    #[error("Buffer pool exhausted: {limit} buffers already in use")]
    Exhausted { limit: usize },

    /// Pool was asked for a format or size it does not serve.
    #[error("Pool serves {expected_format} {expected_width}x{expected_height}, requested {format} {width}x{height}")]
    Mismatch {
        expected_format: PixelFormat,
        expected_width: u32,
        expected_height: u32,
        format: PixelFormat,
        width: u32,
        height: u32,
    },

    /// No plane layout exists for this format.
    #[error("Cannot allocate buffers of format {0}")]
    UnsupportedFormat(PixelFormat),

    /// Allocator produced a layout that does not fit its bytes.
    #[error("Invalid allocation layout: {0}")]
    InvalidLayout(#[from] BufferError),
}

/// Raw ingredients of an owned buffer.
///
/// The backing bytes and their release callback are held together; dropping
/// an allocation that was never turned into a buffer still gives the bytes
/// back.
pub struct Allocation {
    pub format: PixelFormat,
    pub size: Size,
    /// One layout per plane.
    pub planes: Vec<PlaneLayout>,
    /// Byte offset of each plane inside the backing bytes.
    pub offsets: Vec<usize>,
    pub(crate) storage: ReleaseGuard,
}

impl Allocation {
    /// Wrap zeroed `bytes` laid out as `planes` at `offsets`. `release` is
    /// called exactly once with the bytes.
    pub fn new(
        format: PixelFormat,
        size: Size,
        planes: Vec<PlaneLayout>,
        offsets: Vec<usize>,
        bytes: Vec<u8>,
        release: ReleaseFn,
    ) -> Self {
        Self {
            format,
            size,
            planes,
            offsets,
            storage: ReleaseGuard::new(bytes, release),
        }
    }

    /// Backing memory for all planes.
    pub fn bytes(&self) -> &[u8] {
        self.storage.bytes()
    }
}

impl std::fmt::Debug for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocation")
            .field("format", &self.format)
            .field("size", &self.size)
            .field("planes", &self.planes)
            .field("offsets", &self.offsets)
            .field("len", &self.storage.bytes().len())
            .finish_non_exhaustive()
    }
}

/// Source of writable output buffers.
///
/// Implementations handle their own synchronisation; the engine only calls
/// [`acquire`](BufferAllocator::acquire) and never keeps an allocation beyond
/// one operation.
pub trait BufferAllocator {
    /// Obtain zeroed memory for a `size` frame of `format`.
    fn acquire(&self, format: PixelFormat, size: Size) -> Result<Allocation, AllocError>;
}

impl<A: BufferAllocator + ?Sized> BufferAllocator for &A {
    fn acquire(&self, format: PixelFormat, size: Size) -> Result<Allocation, AllocError> {
        (**self).acquire(format, size)
    }
}

/// Contiguous plane geometry for a frame: layouts, offsets and total length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrameLayout {
    pub planes: Vec<PlaneLayout>,
    pub offsets: Vec<usize>,
    pub len: usize,
}

impl FrameLayout {
    /// Lay out every plane of `format` back to back, rows padded to `row_alignment`.
    pub fn compute(format: PixelFormat, size: Size, row_alignment: usize) -> Result<Self, AllocError> {
        let count = format
            .plane_count()
            .ok_or(AllocError::UnsupportedFormat(format))?;
        let overflow = AllocError::Overflow {
            width: size.width,
            height: size.height,
        };
        let align = row_alignment.max(1);

        let mut planes = Vec::with_capacity(count);
        let mut offsets = Vec::with_capacity(count);
        let mut len = 0usize;
        for index in 0..count {
            let (width, height) = format
                .plane_dimensions(index, size.width, size.height)
                .ok_or(AllocError::UnsupportedFormat(format))?;
            if width == 0 || height == 0 {
                return Err(AllocError::ZeroSize {
                    width: size.width,
                    height: size.height,
                });
            }
            let bpp = format
                .bytes_per_pixel(index)
                .ok_or(AllocError::UnsupportedFormat(format))?;
            let row_bytes = (width as usize).checked_mul(bpp).ok_or(overflow.clone())?;
            let stride = row_bytes
                .checked_next_multiple_of(align)
                .ok_or(overflow.clone())?;
            let plane_len = stride.checked_mul(height as usize).ok_or(overflow.clone())?;

            planes.push(PlaneLayout::new(width, height, stride, bpp)?);
            offsets.push(len);
            len = len.checked_add(plane_len).ok_or(overflow.clone())?;
        }
        Ok(Self {
            planes,
            offsets,
            len,
        })
    }
}

/// Allocates a fresh zeroed `Vec<u8>` for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapAllocator {
    row_alignment: usize,
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self { row_alignment: 1 }
    }
}

impl HeapAllocator {
    /// Allocator with tightly packed rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator that pads every row to a multiple of `alignment` bytes.
    pub fn with_row_alignment(alignment: usize) -> Self {
        Self {
            row_alignment: alignment.max(1),
        }
    }

    pub fn row_alignment(&self) -> usize {
        self.row_alignment
    }
}

impl BufferAllocator for HeapAllocator {
    fn acquire(&self, format: PixelFormat, size: Size) -> Result<Allocation, AllocError> {
        let layout = FrameLayout::compute(format, size, self.row_alignment)?;
        trace!(%format, width = size.width, height = size.height, len = layout.len, "heap acquire");
        Ok(Allocation::new(
            format,
            size,
            layout.planes,
            layout.offsets,
            vec![0u8; layout.len],
            Box::new(|bytes: Vec<u8>| drop(bytes)),
        ))
    }
}
