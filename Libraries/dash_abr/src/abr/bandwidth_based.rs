//! Bandwidth-only selection.

use tracing::debug;

use crate::config::AbrStrategy;
use crate::error::AbrError;
use crate::model::Selection;

use super::partition::ideal_selection;
use super::strategy::{SelectionInput, SelectionStrategy};

/// Picks the ideal representation for the full bandwidth estimate, nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct BandwidthBased;

impl SelectionStrategy for BandwidthBased {
    fn kind(&self) -> AbrStrategy {
        AbrStrategy::BandwidthBased
    }

    fn select(&mut self, input: SelectionInput<'_>) -> Result<Selection, AbrError> {
        // Whole bits per second, like the hybrid budget.
        let available_bandwidth = input.bandwidth.floor();
        let selection = ideal_selection(input.adaptation_sets, available_bandwidth)?;
        debug!(available_bandwidth, ?selection, "Bandwidth-based selection");
        Ok(selection)
    }
}
