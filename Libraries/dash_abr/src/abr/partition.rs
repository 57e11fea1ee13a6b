//! Splitting a bandwidth budget across the tracks of a catalog.

use std::collections::BTreeMap;

use crate::error::ConfigurationError;
use crate::model::{AdaptationSet, AdaptationSetId, Catalog, RepresentationId, Selection};

/// Share of the budget given to video when video and non-video tracks are both present.
pub const VIDEO_SHARE: f64 = 0.8;
/// Share of the budget given to audio (and other non-video tracks) in that case.
pub const AUDIO_SHARE: f64 = 0.2;

/// Bandwidth (bps) allocated to each adaptation set of `adaptation_sets` out of `budget`.
///
/// When video and non-video tracks coexist, video tracks split 80% of the budget and the rest
/// split 20%. Otherwise every track gets an even share.
pub fn partition_bandwidth(
    adaptation_sets: &Catalog,
    budget: f64,
) -> BTreeMap<AdaptationSetId, f64> {
    let num_videos = adaptation_sets
        .values()
        .filter(|a| a.content_type.is_video())
        .count();
    let num_audios = adaptation_sets.len() - num_videos;

    if adaptation_sets.is_empty() {
        return BTreeMap::new();
    }

    if num_videos == 0 || num_audios == 0 {
        let per_set = budget / adaptation_sets.len() as f64;
        return adaptation_sets.keys().map(|id| (*id, per_set)).collect();
    }

    let per_video = budget * VIDEO_SHARE / num_videos as f64;
    let per_audio = budget * AUDIO_SHARE / num_audios as f64;
    adaptation_sets
        .iter()
        .map(|(id, a)| {
            let share = if a.content_type.is_video() { per_video } else { per_audio };
            (*id, share)
        })
        .collect()
}

/// The best representation of `adaptation_set` for `bandwidth` bps, ignoring buffer state.
///
/// This is the highest bitrate strictly below `bandwidth`, or the lowest bitrate when none fits.
pub fn choose_ideal_representation(
    adaptation_set: &AdaptationSet,
    bandwidth: f64,
) -> Result<RepresentationId, ConfigurationError> {
    let mut representations: Vec<_> = adaptation_set.representations.values().collect();
    // Descending bitrate, ascending id among equal bitrates.
    representations.sort_by(|a, b| b.bandwidth.cmp(&a.bandwidth).then(a.id.cmp(&b.id)));

    if let Some(fits) = representations.iter().find(|r| (r.bandwidth as f64) < bandwidth) {
        return Ok(fits.id);
    }
    adaptation_set
        .lowest_bitrate()
        .map(|r| r.id)
        .ok_or(ConfigurationError::EmptyAdaptationSet(adaptation_set.id))
}

/// The ideal representation of every track once `budget` is partitioned across them.
pub fn ideal_selection(
    adaptation_sets: &Catalog,
    budget: f64,
) -> Result<Selection, ConfigurationError> {
    partition_bandwidth(adaptation_sets, budget)
        .into_iter()
        .map(|(id, share)| {
            let chosen = choose_ideal_representation(&adaptation_sets[&id], share)?;
            Ok((id, chosen))
        })
        .collect()
}
