//! Framecrop Core - Frame buffer geometry library
//!
//! This crate crops and resizes video frame buffers in NV12 (bi-planar YUV
//! 4:2:0) and BGRA32 layouts, including centred square thumbnails for
//! downstream vision models.
//!
//! Crops are zero-copy views into the caller's memory. Resizes write into
//! buffers obtained from a [`BufferAllocator`] and are resampled by a
//! [`Scaler`]; both collaborators can be swapped out.

pub mod alloc;
pub mod buffer;
pub mod convert;
pub mod engine;
pub mod format;
pub mod scale;
pub mod transform;

pub use alloc::{AllocError, BufferAllocator, HeapAllocator, PixelBufferPool, PoolConfig};
pub use buffer::{BufferError, PixelBuffer, PixelBufferView, Plane, PlaneLayout, PlaneMut, Size};
pub use convert::{to_rgba_image, ConvertError};
pub use engine::FrameEngine;
pub use format::PixelFormat;
pub use scale::{FirScaler, ScaleError, Scaler};
pub use transform::{
    center_square_crop, centered_crop, centered_square_thumbnail, resize_to, CropError,
    CropRegion, ResizeError,
};
