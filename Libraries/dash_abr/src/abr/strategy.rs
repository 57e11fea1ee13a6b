//! The per-decision strategy seam. A controller owns exactly one strategy, chosen from its
//! configuration when it is built.

use crate::config::{AbrConfig, AbrStrategy};
use crate::error::AbrError;
use crate::model::{Catalog, Selection};

use super::bandwidth_based::BandwidthBased;
use super::buffer_based::BufferBased;
use super::hybrid::Hybrid;

/// Snapshot of everything a strategy may look at for one decision.
#[derive(Debug, Clone, Copy)]
pub struct SelectionInput<'a> {
    pub adaptation_sets: &'a Catalog,
    /// Estimated throughput, bits per second.
    pub bandwidth: f64,
    /// Buffered media, seconds.
    pub buffer_level: f64,
    /// The selection returned by the previous decision, if any.
    pub previous: Option<&'a Selection>,
}

/// One ABR algorithm. The controller picks one at construction and never switches.
pub trait SelectionStrategy: Send {
    fn kind(&self) -> AbrStrategy;

    /// Chooses one representation per adaptation set. Every adaptation set in the input is
    /// guaranteed to hold at least one representation.
    fn select(&mut self, input: SelectionInput<'_>) -> Result<Selection, AbrError>;
}

pub fn build_strategy(config: &AbrConfig) -> Box<dyn SelectionStrategy> {
    match config.strategy {
        AbrStrategy::BufferBased => Box::new(BufferBased::new(config.max_buffer_duration_seconds)),
        AbrStrategy::BandwidthBased => Box::new(BandwidthBased),
        AbrStrategy::Hybrid => Box::new(Hybrid::new(
            config.panic_buffer_seconds,
            config.safe_buffer_seconds,
        )),
    }
}
