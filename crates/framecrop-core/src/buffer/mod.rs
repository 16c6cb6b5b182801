//! Frame buffer descriptions.
//!
//! Two kinds of buffer exist, kept apart by the type system:
//!
//! - [`PixelBufferView`] borrows plane memory owned by someone else (a capture
//!   pipeline, or another buffer). Crops are views.
//! - [`PixelBuffer`] owns memory obtained from an allocator and releases it
//!   exactly once. Resizes produce buffers.
//!
//! Both describe each plane with a [`PlaneLayout`]: width, height, stride and
//! bytes per pixel. Stride may exceed `width * bytes_per_pixel` when rows are
//! padded.

mod owned;
mod types;
mod view;

pub(crate) use owned::ReleaseGuard;
pub use owned::{PixelBuffer, ReleaseFn};
pub use types::{BufferError, PlaneLayout, Size};
pub use view::{PixelBufferView, Plane, PlaneMut};
