//! Frame engine: an allocator and a scaler bundled behind one handle.
//!
//! The free functions in [`crate::transform`] take their collaborators per
//! call. [`FrameEngine`] owns them instead, which is convenient for a capture
//! pipeline that resizes every frame with the same pool and keeps the
//! scaler's scratch buffers warm. Use one engine per worker thread.

use crate::alloc::{BufferAllocator, HeapAllocator};
use crate::buffer::{PixelBuffer, PixelBufferView, Size};
use crate::scale::{FirScaler, Scaler};
use crate::transform::{self, CropError, ResizeError};

/// Crop and resize frames with a fixed allocator and scaler.
#[derive(Debug, Default)]
pub struct FrameEngine<A = HeapAllocator, S = FirScaler> {
    allocator: A,
    scaler: S,
}

impl FrameEngine {
    /// Engine with a heap allocator and the box-filter scaler.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A, S> FrameEngine<A, S>
where
    A: BufferAllocator,
    S: Scaler,
{
    /// Engine built from explicit collaborators.
    pub fn with_parts(allocator: A, scaler: S) -> Self {
        Self { allocator, scaler }
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn scaler_mut(&mut self) -> &mut S {
        &mut self.scaler
    }

    /// Split the engine back into its collaborators.
    pub fn into_parts(self) -> (A, S) {
        (self.allocator, self.scaler)
    }

    /// See [`transform::center_square_crop`].
    pub fn center_square_crop<'a>(
        &self,
        source: &PixelBufferView<'a>,
        side: u32,
    ) -> Result<PixelBufferView<'a>, CropError> {
        transform::center_square_crop(source, side)
    }

    /// See [`transform::centered_crop`].
    pub fn centered_crop<'a>(
        &self,
        source: &PixelBufferView<'a>,
        width: u32,
        height: u32,
    ) -> Result<PixelBufferView<'a>, CropError> {
        transform::centered_crop(source, width, height)
    }

    /// See [`transform::resize_to`].
    pub fn resize_to(
        &mut self,
        source: &PixelBufferView<'_>,
        target: Size,
    ) -> Result<PixelBuffer, ResizeError> {
        transform::resize_to(source, target, &self.allocator, &mut self.scaler)
    }

    /// See [`transform::centered_square_thumbnail`].
    pub fn centered_square_thumbnail(
        &mut self,
        source: &PixelBufferView<'_>,
        output_side: u32,
    ) -> Result<PixelBuffer, ResizeError> {
        transform::centered_square_thumbnail(source, output_side, &self.allocator, &mut self.scaler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{PixelBufferPool, PoolConfig};
    use crate::format::PixelFormat;

    fn gradient_nv12(width: u32, height: u32) -> (Vec<u8>, Vec<u8>) {
        let luma = (0..width * height).map(|i| (i % width) as u8).collect();
        let chroma = vec![128u8; (width / 2 * 2 * (height / 2)) as usize];
        (luma, chroma)
    }

    #[test]
    fn test_default_engine_thumbnail() {
        let (luma, chroma) = gradient_nv12(320, 180);
        let source = PixelBufferView::nv12(320, 180, &luma, 320, &chroma, 320).unwrap();
        let mut engine = FrameEngine::new();

        let thumb = engine.centered_square_thumbnail(&source, 64).unwrap();
        assert_eq!(thumb.dimensions(), (64, 64));
        assert_eq!(thumb.format(), PixelFormat::Nv12);
    }

    #[test]
    fn test_engine_crop_matches_free_function() {
        let (luma, chroma) = gradient_nv12(64, 32);
        let source = PixelBufferView::nv12(64, 32, &luma, 64, &chroma, 64).unwrap();
        let engine = FrameEngine::new();

        let a = engine.center_square_crop(&source, 32).unwrap();
        let b = transform::center_square_crop(&source, 32).unwrap();
        assert_eq!(a.plane(0).unwrap().data().as_ptr(), b.plane(0).unwrap().data().as_ptr());
        assert_eq!(a.plane(0).unwrap().pixel(0, 0), Some(&[16u8][..]));

        let c = engine.centered_crop(&source, 8, 4).unwrap();
        assert_eq!(c.plane(0).unwrap().pixel(0, 0), Some(&[28u8][..]));
    }

    #[test]
    fn test_engine_with_pool() {
        let data = vec![40u8; 100 * 60 * 4];
        let source = PixelBufferView::bgra(100, 60, &data, 400).unwrap();
        let pool = PixelBufferPool::new(PoolConfig::new(PixelFormat::Bgra32, Size::square(32))).unwrap();
        let mut engine = FrameEngine::with_parts(pool.clone(), FirScaler::new());

        for _ in 0..5 {
            let thumb = engine.centered_square_thumbnail(&source, 32).unwrap();
            assert_eq!(thumb.dimensions(), (32, 32));
            assert_eq!(pool.stats().outstanding, 1);
        }
        assert_eq!(pool.stats().outstanding, 0);
        assert_eq!(engine.allocator().stats().available, 3);

        let err = engine.resize_to(&source, Size::square(16)).unwrap_err();
        assert!(matches!(err, ResizeError::AllocationFailed(_)));
    }

    #[test]
    fn test_engine_rejects_oversized_crop() {
        let data = vec![0u8; 16 * 8 * 4];
        let source = PixelBufferView::bgra(16, 8, &data, 64).unwrap();
        let engine = FrameEngine::new();
        let err = engine.center_square_crop(&source, 9).unwrap_err();
        assert!(matches!(err, CropError::RegionExceedsSource { .. }));
    }

    /// Box-filter scaler that counts planes.
    #[derive(Default)]
    struct CountingScaler {
        inner: FirScaler,
        planes: usize,
    }

    impl Scaler for CountingScaler {
        fn scale(
            &mut self,
            src: &crate::buffer::Plane<'_>,
            dst: &mut crate::buffer::PlaneMut<'_>,
        ) -> Result<(), crate::scale::ScaleError> {
            self.planes += 1;
            self.inner.scale(src, dst)
        }
    }

    #[test]
    fn test_scaler_state_persists_across_calls() {
        let (luma, chroma) = gradient_nv12(64, 32);
        let source = PixelBufferView::nv12(64, 32, &luma, 64, &chroma, 64).unwrap();
        let mut engine = FrameEngine::with_parts(HeapAllocator::new(), CountingScaler::default());

        engine.resize_to(&source, Size::new(32, 16)).unwrap();
        assert_eq!(engine.scaler_mut().planes, 2);
        engine.centered_square_thumbnail(&source, 8).unwrap();
        assert_eq!(engine.scaler_mut().planes, 4);

        engine.scaler_mut().planes = 0;
        let data = vec![0u8; 8 * 8 * 4];
        let bgra = PixelBufferView::bgra(8, 8, &data, 32).unwrap();
        engine.resize_to(&bgra, Size::square(4)).unwrap();
        assert_eq!(engine.scaler_mut().planes, 1);
    }

    #[test]
    fn test_into_parts() {
        let engine = FrameEngine::with_parts(HeapAllocator::with_row_alignment(32), FirScaler::new());
        let (allocator, _scaler) = engine.into_parts();
        assert_eq!(allocator.row_alignment(), 32);
    }
}
