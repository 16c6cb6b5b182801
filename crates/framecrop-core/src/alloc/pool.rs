//! Fixed-geometry buffer pool for frame-by-frame output.
//!
//! A pool serves a single pixel format and size. Released buffers are zeroed
//! and kept for reuse, up to `min_buffers` of them; anything beyond that is
//! dropped. An optional `max_outstanding` limit makes [`acquire`] fail with
//! [`AllocError::Exhausted`] instead of growing without bound.
//!
//! ```text
//! acquire ──▶ [free list] ──▶ PixelBuffer ──▶ drop / release ──┐
//!                 ▲                                            │
//!                 └────────────── zeroed, recycled ◀───────────┘
//! ```
//!
//! [`acquire`]: crate::alloc::BufferAllocator::acquire

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AllocError, Allocation, BufferAllocator, FrameLayout};
use crate::buffer::Size;
use crate::format::PixelFormat;

fn default_min_buffers() -> usize {
    3
}

fn default_row_alignment() -> usize {
    1
}

/// Pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Format of every buffer in the pool.
    pub format: PixelFormat,
    /// Size of every buffer in the pool.
    pub size: Size,
    /// Buffers allocated up front and kept for reuse.
    #[serde(default = "default_min_buffers")]
    pub min_buffers: usize,
    /// Upper bound on buffers handed out at once. `None` means unbounded.
    #[serde(default)]
    pub max_outstanding: Option<usize>,
    /// Row padding, in bytes, for every plane.
    #[serde(default = "default_row_alignment")]
    pub row_alignment: usize,
}

impl PoolConfig {
    /// Configuration with the default retention of three buffers.
    pub fn new(format: PixelFormat, size: Size) -> Self {
        Self {
            format,
            size,
            min_buffers: default_min_buffers(),
            max_outstanding: None,
            row_alignment: default_row_alignment(),
        }
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers waiting in the free list.
    pub available: usize,
    /// Buffers currently held by callers.
    pub outstanding: usize,
    /// Maximum number of buffers kept in the free list.
    pub retained: usize,
}

#[derive(Debug)]
struct PoolState {
    free: VecDeque<Vec<u8>>,
    outstanding: usize,
}

#[derive(Debug)]
struct PoolInner {
    config: PoolConfig,
    layout: FrameLayout,
    state: Mutex<PoolState>,
}

impl PoolInner {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // The state stays consistent across a panic, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn give_back(&self, mut bytes: Vec<u8>) {
        bytes.fill(0);
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.free.len() < self.config.min_buffers && bytes.len() == self.layout.len {
            state.free.push_back(bytes);
        }
    }
}

/// Thread-safe pool of identically shaped output buffers.
///
/// Cloning is cheap and yields a handle to the same pool. Buffers still held
/// by callers when the last handle is dropped are simply freed on release.
#[derive(Debug, Clone)]
pub struct PixelBufferPool {
    inner: Arc<PoolInner>,
}

impl PixelBufferPool {
    /// Create a pool and allocate its `min_buffers` up front.
    pub fn new(config: PoolConfig) -> Result<Self, AllocError> {
        let layout = FrameLayout::compute(config.format, config.size, config.row_alignment)?;
        let free = (0..config.min_buffers)
            .map(|_| vec![0u8; layout.len])
            .collect::<VecDeque<_>>();
        debug!(
            format = %config.format,
            width = config.size.width,
            height = config.size.height,
            buffers = config.min_buffers,
            "created pixel buffer pool"
        );
        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                layout,
                state: Mutex::new(PoolState {
                    free,
                    outstanding: 0,
                }),
            }),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Current occupancy.
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.lock();
        PoolStats {
            available: state.free.len(),
            outstanding: state.outstanding,
            retained: self.inner.config.min_buffers,
        }
    }

    /// Drop every buffer in the free list.
    pub fn flush(&self) {
        self.inner.lock().free.clear();
    }
}

impl BufferAllocator for PixelBufferPool {
    fn acquire(&self, format: PixelFormat, size: Size) -> Result<Allocation, AllocError> {
        let config = &self.inner.config;
        if format != config.format || size != config.size {
            return Err(AllocError::Mismatch {
                expected_format: config.format,
                expected_width: config.size.width,
                expected_height: config.size.height,
                format,
                width: size.width,
                height: size.height,
            });
        }

        let bytes = {
            let mut state = self.inner.lock();
            if let Some(limit) = config.max_outstanding {
                if state.outstanding >= limit {
                    debug!(limit, "pixel buffer pool exhausted");
                    return Err(AllocError::Exhausted { limit });
                }
            }
            state.outstanding += 1;
            state.free.pop_front()
        };
        let bytes = bytes.unwrap_or_else(|| {
            debug!(len = self.inner.layout.len, "pool empty, allocating");
            vec![0u8; self.inner.layout.len]
        });

        let pool: Weak<PoolInner> = Arc::downgrade(&self.inner);
        Ok(Allocation::new(
            format,
            size,
            self.inner.layout.planes.clone(),
            self.inner.layout.offsets.clone(),
            bytes,
            Box::new(move |bytes: Vec<u8>| {
                if let Some(pool) = pool.upgrade() {
                    pool.give_back(bytes);
                }
            }),
        ))
    }
}
