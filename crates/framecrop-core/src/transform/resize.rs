//! Resize into freshly allocated buffers.
//!
//! Geometry is settled before any pixel work starts: source and target are
//! checked, the output buffer is acquired and its plane layouts verified,
//! and only then is the scaler invoked, once per plane. If anything fails
//! after acquisition the output buffer is dropped on the way out, which
//! hands its memory back to the allocator.

use tracing::{debug, trace};

use super::crop::center_square_crop;
use super::types::ResizeError;
use crate::alloc::{AllocError, BufferAllocator};
use crate::buffer::{BufferError, PixelBuffer, PixelBufferView, Size};
use crate::format::PixelFormat;
use crate::scale::Scaler;

/// Resample `source` into a new `target`-sized buffer of the same format.
///
/// # Arguments
///
/// * `source` - Frame to read; not modified
/// * `target` - Output dimensions
/// * `allocator` - Provides the output memory
/// * `scaler` - Resamples each plane
///
/// # Returns
///
/// An owned [`PixelBuffer`] whose dimensions equal `target`.
///
/// # Errors
///
/// - `ResizeError::UnsupportedFormat` for formats other than NV12 and BGRA32
/// - `ResizeError::EmptySourcePlane` if any source plane has no pixels
/// - `ResizeError::InvalidTargetSize` if any output plane would be empty
/// - `ResizeError::AllocationFailed` if the allocator refuses, or returns
///   planes that do not match `target`; the allocation is released
/// - `ResizeError::ScaleFailed` if the scaler fails; the output is released
pub fn resize_to<A, S>(
    source: &PixelBufferView<'_>,
    target: Size,
    allocator: &A,
    scaler: &mut S,
) -> Result<PixelBuffer, ResizeError>
where
    A: BufferAllocator + ?Sized,
    S: Scaler + ?Sized,
{
    let format = source.format();
    trace!(
        %format,
        src_w = source.width(),
        src_h = source.height(),
        dst_w = target.width,
        dst_h = target.height,
        "resize_to"
    );
    if !format.is_supported() {
        return Err(ResizeError::UnsupportedFormat(format));
    }
    if let Some(plane) = source
        .planes()
        .iter()
        .position(|p| p.width() == 0 || p.height() == 0)
    {
        return Err(ResizeError::EmptySourcePlane { format, plane });
    }
    let min_edge = if format == PixelFormat::Nv12 { 2 } else { 1 };
    if target.width < min_edge || target.height < min_edge {
        return Err(ResizeError::InvalidTargetSize {
            format,
            width: target.width,
            height: target.height,
        });
    }

    let allocation = allocator
        .acquire(format, target)
        .map_err(ResizeError::AllocationFailed)?;
    let mut output = PixelBuffer::from_allocation(allocation)
        .map_err(|err| ResizeError::AllocationFailed(AllocError::InvalidLayout(err)))?;
    if output.format() != format || output.size() != target {
        return Err(ResizeError::AllocationFailed(AllocError::Mismatch {
            expected_format: format,
            expected_width: target.width,
            expected_height: target.height,
            format: output.format(),
            width: output.size().width,
            height: output.size().height,
        }));
    }
    check_output_layout(&output, target)
        .map_err(|err| ResizeError::AllocationFailed(AllocError::InvalidLayout(err)))?;

    for (index, src_plane) in source.planes().iter().enumerate() {
        let mut dst_plane = output.plane_mut(index).ok_or_else(|| {
            ResizeError::AllocationFailed(AllocError::UnsupportedFormat(format))
        })?;
        if let Err(err) = scaler.scale(src_plane, &mut dst_plane) {
            debug!(plane = index, error = %err, "scaler failed, releasing output");
            return Err(ResizeError::ScaleFailed(err));
        }
    }
    Ok(output)
}

/// Every plane of `output` must have the geometry `format` prescribes for
/// `target`.
fn check_output_layout(output: &PixelBuffer, target: Size) -> Result<(), BufferError> {
    let format = output.format();
    for plane in 0..output.plane_count() {
        let (Some(layout), Some((width, height)), Some(bpp)) = (
            output.plane_layout(plane),
            format.plane_dimensions(plane, target.width, target.height),
            format.bytes_per_pixel(plane),
        ) else {
            return Err(BufferError::PlaneCount {
                format,
                expected: format.plane_count().unwrap_or(0),
                actual: output.plane_count(),
            });
        };
        if layout.width != width || layout.height != height {
            return Err(BufferError::PlaneSize {
                plane,
                expected_width: width,
                expected_height: height,
                width: layout.width,
                height: layout.height,
            });
        }
        if layout.bytes_per_pixel != bpp {
            return Err(BufferError::BytesPerPixel {
                format,
                plane,
                expected: bpp,
                actual: layout.bytes_per_pixel,
            });
        }
    }
    Ok(())
}

/// Centre-crop `source` to its largest square and resample it to
/// `output_side` x `output_side`.
///
/// The intermediate crop is a borrowed view that never leaves this function.
///
/// # Errors
///
/// As [`resize_to`]; crop failures other than an unsupported format are
/// reported as `ResizeError::Crop`.
pub fn centered_square_thumbnail<A, S>(
    source: &PixelBufferView<'_>,
    output_side: u32,
    allocator: &A,
    scaler: &mut S,
) -> Result<PixelBuffer, ResizeError>
where
    A: BufferAllocator + ?Sized,
    S: Scaler + ?Sized,
{
    let side = source.size().min_side();
    let square = center_square_crop(source, side)?;
    resize_to(&square, Size::square(output_side), allocator, scaler)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
