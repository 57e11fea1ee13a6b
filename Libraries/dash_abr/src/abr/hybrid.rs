//! Bandwidth-driven selection held in place by the buffer level.
//!
//! Below the panic threshold the bitrate may only fall, above the safe threshold it may only
//! rise, and in between the ideal choice is taken as is.

use tracing::debug;

use crate::config::AbrStrategy;
use crate::error::AbrError;
use crate::model::{AdaptationSet, RepresentationId, Selection};

use super::partition::ideal_selection;
use super::strategy::{SelectionInput, SelectionStrategy};

/// Only this share of the measured bandwidth is handed to the partitioning.
pub const BANDWIDTH_SAFETY_FACTOR: f64 = 0.7;

/// Bandwidth-driven choice held back by the buffer level.
///
/// Below the panic buffer the bitrate may only go down, above the safe buffer it may only go
/// up, and in between the ideal choice is taken as is.
#[derive(Debug, Clone)]
pub struct Hybrid {
    panic_buffer: f64,
    safe_buffer: f64,
}

impl Hybrid {
    pub fn new(panic_buffer: f64, safe_buffer: f64) -> Self {
        Self {
            panic_buffer,
            safe_buffer,
        }
    }

    fn hold(
        &self,
        adaptation_set: &AdaptationSet,
        last_id: RepresentationId,
        ideal_id: RepresentationId,
        buffer_level: f64,
    ) -> RepresentationId {
        let representations = &adaptation_set.representations;
        let (Some(last), Some(ideal)) =
            (representations.get(&last_id), representations.get(&ideal_id))
        else {
            return ideal_id;
        };

        if buffer_level < self.panic_buffer {
            if last.bandwidth < ideal.bandwidth {
                last.id
            } else {
                ideal.id
            }
        } else if buffer_level > self.safe_buffer {
            if last.bandwidth > ideal.bandwidth {
                last.id
            } else {
                ideal.id
            }
        } else {
            ideal.id
        }
    }
}

impl SelectionStrategy for Hybrid {
    fn kind(&self) -> AbrStrategy {
        AbrStrategy::Hybrid
    }

    fn select(&mut self, input: SelectionInput<'_>) -> Result<Selection, AbrError> {
        let available_bandwidth = (input.bandwidth * BANDWIDTH_SAFETY_FACTOR).floor();
        let ideal = ideal_selection(input.adaptation_sets, available_bandwidth)?;

        let Some(previous) = input.previous else {
            debug!(available_bandwidth, ?ideal, "Hybrid selection without history");
            return Ok(ideal);
        };

        let selection: Selection = ideal
            .iter()
            .map(|(id, ideal_id)| {
                let chosen = match previous.get(id) {
                    Some(last_id) => self.hold(
                        &input.adaptation_sets[id],
                        *last_id,
                        *ideal_id,
                        input.buffer_level,
                    ),
                    None => *ideal_id,
                };
                (*id, chosen)
            })
            .collect();

        debug!(
            available_bandwidth,
            buffer_level = input.buffer_level,
            ?ideal,
            ?selection,
            "Hybrid selection"
        );
        Ok(selection)
    }
}
