//! Frame transformations: square cropping and resizing.
//!
//! Crops are zero-copy and return borrowed views. Resizes allocate a new
//! buffer through a [`BufferAllocator`](crate::alloc::BufferAllocator) and
//! fill it with a [`Scaler`](crate::scale::Scaler).
//!
//! # Operation Order
//!
//! A centred square thumbnail is produced in two steps:
//! 1. Centre square crop at the shorter edge (no copy)
//! 2. Resize of the cropped view to the requested side
//!
//! # Coordinate System
//!
//! - Crop regions are in plane-0 pixels
//! - NV12 chroma coordinates are the luma coordinates halved, rounded down
//! - Origin is the top-left corner

mod crop;
mod resize;
mod types;

pub use crop::{center_square_crop, center_square_region, centered_crop};
pub use resize::{centered_square_thumbnail, resize_to};
pub use types::{CropError, CropRegion, ResizeError};
