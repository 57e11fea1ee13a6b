use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
use mockall::automock;

/// Source of the current buffer occupancy.
#[cfg_attr(test, automock)]
pub trait BufferManager: Send + Sync {
    /// Seconds of downloaded media not yet played.
    fn buffer_level(&self) -> f64;
}

/// A buffer level snapshot written by the player and read by the controller.
#[derive(Debug, Default)]
pub struct SharedBufferLevel {
    /// `f64` bits.
    seconds: AtomicU64,
}

impl SharedBufferLevel {
    pub fn new(seconds: f64) -> Self {
        let level = Self::default();
        level.set(seconds);
        level
    }

    /// Negative and NaN levels are stored as zero.
    pub fn set(&self, seconds: f64) {
        self.seconds.store(seconds.max(0.0).to_bits(), Ordering::Release);
    }
}

impl BufferManager for SharedBufferLevel {
    fn buffer_level(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Acquire))
    }
}
