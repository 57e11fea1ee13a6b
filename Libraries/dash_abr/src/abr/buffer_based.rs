//! Buffer-occupancy driven selection through a per-set [`RateMap`].

use std::collections::HashMap;

use tracing::{debug, error};

use crate::config::AbrStrategy;
use crate::error::{AbrError, ConfigurationError, InvariantViolation};
use crate::model::{AdaptationSet, AdaptationSetId, RepresentationId, Selection};

use super::rate_map::RateMap;
use super::strategy::{SelectionInput, SelectionStrategy};

/// Picks each track's bitrate from the buffer occupancy alone, through a per-track rate map.
#[derive(Debug, Clone)]
pub struct BufferBased {
    max_buffer_duration: f64,
    rate_maps: HashMap<AdaptationSetId, RateMap>,
}

impl BufferBased {
    pub fn new(max_buffer_duration: f64) -> Self {
        Self {
            max_buffer_duration,
            rate_maps: HashMap::new(),
        }
    }

    /// The cached rate map of `adaptation_set`, rebuilt when its ladder changed.
    fn rate_map(&mut self, adaptation_set: &AdaptationSet) -> Result<&RateMap, ConfigurationError> {
        let ladder = adaptation_set.bitrate_ladder();
        let stale = self
            .rate_maps
            .get(&adaptation_set.id)
            .map_or(true, |map| !map.is_built_from(&ladder));
        if stale {
            let map = RateMap::new(&ladder)
                .ok_or(ConfigurationError::EmptyAdaptationSet(adaptation_set.id))?;
            debug!(adaptation_set = adaptation_set.id, anchors = ?map.anchors(), "Built rate map");
            self.rate_maps.insert(adaptation_set.id, map);
        }
        self.rate_maps
            .get(&adaptation_set.id)
            .ok_or(ConfigurationError::EmptyAdaptationSet(adaptation_set.id))
    }

    fn choose(
        &mut self,
        adaptation_set: &AdaptationSet,
        buffer_fraction: f64,
    ) -> Result<RepresentationId, AbrError> {
        let next_bitrate = self.rate_map(adaptation_set)?.bitrate_for(buffer_fraction);
        match adaptation_set.representation_with_bitrate(next_bitrate) {
            Some(representation) => Ok(representation.id),
            None => {
                let violation = InvariantViolation::BitrateNotFound {
                    adaptation_set: adaptation_set.id,
                    bitrate: next_bitrate,
                };
                error!("{violation}");
                Err(violation.into())
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_rate_map(&self, id: AdaptationSetId) -> Option<&RateMap> {
        self.rate_maps.get(&id)
    }

    #[cfg(test)]
    pub(crate) fn cache_rate_map(&mut self, id: AdaptationSetId, map: RateMap) {
        self.rate_maps.insert(id, map);
    }
}

impl SelectionStrategy for BufferBased {
    fn kind(&self) -> AbrStrategy {
        AbrStrategy::BufferBased
    }

    fn select(&mut self, input: SelectionInput<'_>) -> Result<Selection, AbrError> {
        let buffer_fraction = input.buffer_level / self.max_buffer_duration;
        let mut selection = Selection::new();
        for (id, adaptation_set) in input.adaptation_sets {
            selection.insert(*id, self.choose(adaptation_set, buffer_fraction)?);
        }
        debug!(
            buffer_level = input.buffer_level,
            buffer_fraction,
            ?selection,
            "Buffer-based selection"
        );
        Ok(selection)
    }
}
