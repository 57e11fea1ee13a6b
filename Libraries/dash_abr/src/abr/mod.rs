//! Representation selection for DASH playback.
//!
//! [`DashAbrController`] reads the bandwidth and buffer snapshots, hands them to the strategy
//! chosen at construction and returns one representation per adaptation set.

pub mod bandwidth_based;
pub mod buffer_based;
pub mod hybrid;
pub mod partition;
pub mod rate_map;
pub mod strategy;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::bandwidth::BandwidthMeter;
use crate::buffer::BufferManager;
use crate::config::{AbrConfig, AbrStrategy};
use crate::error::{AbrError, ConfigurationError};
use crate::model::{AdaptationSet, AdaptationSetId, Catalog, RepresentationId, Selection};

use self::strategy::{build_strategy, SelectionInput, SelectionStrategy};

pub trait AbrController {
    /// Chooses the representation to download next for every adaptation set.
    ///
    /// The returned selection holds exactly one representation id per adaptation set id of
    /// `adaptation_sets`, and each id exists in that adaptation set.
    fn update_selection(&mut self, adaptation_sets: &Catalog) -> Result<Selection, AbrError>;
}

pub struct DashAbrController {
    config: AbrConfig,
    bandwidth_meter: Arc<dyn BandwidthMeter>,
    buffer_manager: Arc<dyn BufferManager>,
    strategy: Box<dyn SelectionStrategy>,
    last_selections: Option<Selection>,
    /// Lowest-bitrate representation id and its bitrate, per adaptation set.
    min_bitrate_representations: HashMap<AdaptationSetId, (RepresentationId, u64)>,
}

impl DashAbrController {
    pub fn new(
        config: AbrConfig,
        bandwidth_meter: Arc<dyn BandwidthMeter>,
        buffer_manager: Arc<dyn BufferManager>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let strategy = build_strategy(&config);
        Ok(Self {
            config,
            bandwidth_meter,
            buffer_manager,
            strategy,
            last_selections: None,
            min_bitrate_representations: HashMap::new(),
        })
    }

    pub fn strategy(&self) -> AbrStrategy {
        self.strategy.kind()
    }

    pub fn config(&self) -> &AbrConfig {
        &self.config
    }

    /// The selection returned by the last successful decision.
    pub fn last_selections(&self) -> Option<&Selection> {
        self.last_selections.as_ref()
    }

    /// Id of the lowest-bitrate representation of `adaptation_set`, memoized per adaptation set.
    pub fn lowest_bitrate_representation(
        &mut self,
        adaptation_set: &AdaptationSet,
    ) -> Result<RepresentationId, ConfigurationError> {
        let lowest = adaptation_set
            .lowest_bitrate()
            .ok_or(ConfigurationError::EmptyAdaptationSet(adaptation_set.id))?;
        if let Some((id, bandwidth)) = self.min_bitrate_representations.get(&adaptation_set.id) {
            let memo_still_lowest = *bandwidth == lowest.bandwidth
                && adaptation_set.representations.get(id).map(|r| r.bandwidth) == Some(*bandwidth);
            if memo_still_lowest {
                return Ok(*id);
            }
        }
        let id = lowest.id;
        self.min_bitrate_representations
            .insert(adaptation_set.id, (id, lowest.bandwidth));
        Ok(id)
    }
}

impl AbrController for DashAbrController {
    fn update_selection(&mut self, adaptation_sets: &Catalog) -> Result<Selection, AbrError> {
        if let Some((id, _)) = adaptation_sets
            .iter()
            .find(|(_, a)| a.representations.is_empty())
        {
            return Err(ConfigurationError::EmptyAdaptationSet(*id).into());
        }

        let bandwidth = self.bandwidth_meter.bandwidth().max(0.0);
        let buffer_level = self.buffer_manager.buffer_level().max(0.0);
        debug!(
            strategy = %self.strategy.kind(),
            bandwidth,
            buffer_level,
            adaptation_sets = adaptation_sets.len(),
            "Updating selection"
        );

        let selection = self.strategy.select(SelectionInput {
            adaptation_sets,
            bandwidth,
            buffer_level,
            previous: self.last_selections.as_ref(),
        })?;
        self.last_selections = Some(selection.clone());
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::bandwidth::MockBandwidthMeter;
    use crate::buffer::MockBufferManager;
    use crate::model::{catalog_from, ContentType, Representation};

    const LADDER: [u64; 7] = [
        391_570, 641_379, 988_603, 1_489_543, 2_284_798, 3_487_003, 5_253_818,
    ];

    fn meter(bps: f64) -> Arc<dyn BandwidthMeter> {
        let mut meter = MockBandwidthMeter::new();
        meter.expect_bandwidth().return_const(bps);
        Arc::new(meter)
    }

    fn buffer(seconds: f64) -> Arc<dyn BufferManager> {
        let mut buffer = MockBufferManager::new();
        buffer.expect_buffer_level().return_const(seconds);
        Arc::new(buffer)
    }

    fn build_controller(strategy: AbrStrategy, bps: f64, seconds: f64) -> DashAbrController {
        DashAbrController::new(AbrConfig::new(strategy), meter(bps), buffer(seconds)).unwrap()
    }

    fn video(id: AdaptationSetId) -> AdaptationSet {
        AdaptationSet::new(
            id,
            ContentType::Video,
            LADDER
                .iter()
                .enumerate()
                .map(|(i, b)| Representation::new(i as RepresentationId, *b)),
        )
    }

    fn audio(id: AdaptationSetId) -> AdaptationSet {
        AdaptationSet::new(
            id,
            ContentType::Audio,
            [Representation::new(0, 64_000), Representation::new(1, 128_000)],
        )
    }

    #[rstest]
    #[case(AbrStrategy::BufferBased)]
    #[case(AbrStrategy::BandwidthBased)]
    #[case(AbrStrategy::Hybrid)]
    fn selects_one_existing_representation_per_adaptation_set(#[case] strategy: AbrStrategy) {
        let catalog = catalog_from([video(0), video(1), audio(2)]);
        let mut controller = build_controller(strategy, 4_000_000.0, 12.0);

        let selection = controller.update_selection(&catalog).unwrap();
        assert_eq!(selection.keys().collect::<Vec<_>>(), catalog.keys().collect::<Vec<_>>());
        for (id, representation) in &selection {
            assert!(catalog[id].representations.contains_key(representation));
        }
        assert_eq!(controller.strategy(), strategy);
        assert_eq!(controller.last_selections(), Some(&selection));
    }

    #[rstest]
    #[case(AbrStrategy::BufferBased)]
    #[case(AbrStrategy::BandwidthBased)]
    #[case(AbrStrategy::Hybrid)]
    fn empty_adaptation_set_is_a_configuration_error(#[case] strategy: AbrStrategy) {
        let empty_audio = AdaptationSet::new(5, ContentType::Audio, Vec::<Representation>::new());
        let catalog = catalog_from([video(0), empty_audio]);
        let mut controller = build_controller(strategy, 1_000_000.0, 10.0);

        let err = controller.update_selection(&catalog).unwrap_err();
        assert!(matches!(
            err,
            AbrError::Configuration(ConfigurationError::EmptyAdaptationSet(5))
        ));
        assert!(controller.last_selections().is_none());
    }

    #[rstest]
    #[case(AbrStrategy::BufferBased)]
    #[case(AbrStrategy::BandwidthBased)]
    #[case(AbrStrategy::Hybrid)]
    fn empty_catalog_yields_empty_selection(#[case] strategy: AbrStrategy) {
        let mut controller = build_controller(strategy, 1_000_000.0, 10.0);
        assert!(controller.update_selection(&Catalog::new()).unwrap().is_empty());
    }

    #[test]
    fn does_not_mutate_the_catalog() {
        let catalog = catalog_from([video(0), audio(1)]);
        let snapshot = catalog.clone();
        let mut controller = build_controller(AbrStrategy::BufferBased, 0.0, 20.0);
        controller.update_selection(&catalog).unwrap();
        assert_eq!(catalog, snapshot);
    }

    #[test]
    fn negative_readings_are_treated_as_zero() {
        let catalog = catalog_from([video(0)]);
        let mut controller = build_controller(AbrStrategy::BandwidthBased, -5.0, -1.0);
        assert_eq!(controller.update_selection(&catalog).unwrap()[&0], 0);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = AbrConfig {
            max_buffer_duration_seconds: 0.0,
            ..AbrConfig::default()
        };
        assert!(DashAbrController::new(config, meter(0.0), buffer(0.0)).is_err());
    }

    #[test]
    fn reads_collaborators_once_per_decision() {
        let mut bandwidth = MockBandwidthMeter::new();
        bandwidth.expect_bandwidth().times(2).return_const(2_000_000.0);
        let mut level = MockBufferManager::new();
        level.expect_buffer_level().times(2).return_const(10.0);

        let catalog = catalog_from([video(0)]);
        let mut controller = DashAbrController::new(
            AbrConfig::new(AbrStrategy::Hybrid),
            Arc::new(bandwidth),
            Arc::new(level),
        )
        .unwrap();
        controller.update_selection(&catalog).unwrap();
        controller.update_selection(&catalog).unwrap();
    }

    #[test]
    fn lowest_bitrate_representation_is_memoized() {
        let mut controller =
            DashAbrController::new(AbrConfig::default(), meter(0.0), buffer(0.0)).unwrap();
        let set = video(3);
        assert_eq!(controller.lowest_bitrate_representation(&set).unwrap(), 0);
        assert_eq!(controller.min_bitrate_representations.get(&3), Some(&(0, 391_570)));

        // A refreshed set without the memoized id is recomputed.
        let refreshed = AdaptationSet::new(
            3,
            ContentType::Video,
            [Representation::new(8, 900_000), Representation::new(9, 450_000)],
        );
        assert_eq!(controller.lowest_bitrate_representation(&refreshed).unwrap(), 9);

        // The memoized id survives a refresh but is no longer the cheapest.
        let small = AdaptationSet::new(
            6,
            ContentType::Video,
            [Representation::new(0, 100), Representation::new(1, 900)],
        );
        assert_eq!(controller.lowest_bitrate_representation(&small).unwrap(), 0);
        let reordered = AdaptationSet::new(
            6,
            ContentType::Video,
            [Representation::new(0, 900_000), Representation::new(1, 100)],
        );
        assert_eq!(controller.lowest_bitrate_representation(&reordered).unwrap(), 1);
        assert_eq!(controller.min_bitrate_representations.get(&6), Some(&(1, 100)));

        let empty = AdaptationSet::new(4, ContentType::Video, Vec::<Representation>::new());
        assert!(matches!(
            controller.lowest_bitrate_representation(&empty),
            Err(ConfigurationError::EmptyAdaptationSet(4))
        ));
    }
}
