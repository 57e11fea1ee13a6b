//! DASH catalog data structures consumed by the ABR controller.
//! These mirror the adaptation sets and representations of a parsed MPD, reduced to what a
//! bitrate decision needs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type AdaptationSetId = u32;
pub type RepresentationId = u32;

/// The adaptation sets known at decision time, keyed by adaptation set id.
pub type Catalog = BTreeMap<AdaptationSetId, AdaptationSet>;

/// One representation id chosen per adaptation set.
pub type Selection = BTreeMap<AdaptationSetId, RepresentationId>;

/// Media type carried by an adaptation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Audio,
    #[serde(other)]
    Other,
}

impl ContentType {
    /// Infers the content type from a MIME type such as `video/mp4`.
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type.starts_with("audio") {
            ContentType::Audio
        } else if mime_type.starts_with("video") {
            ContentType::Video
        } else {
            ContentType::Other
        }
    }

    pub fn is_video(self) -> bool {
        self == ContentType::Video
    }
}

/// A single encoded quality tier within an adaptation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representation {
    /// Identifier, unique within its adaptation set.
    pub id: RepresentationId,
    /// Average bandwidth in bits per second (bps).
    pub bandwidth: u64,
    /// MIME type of the media (e.g., "video/mp4").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Codec string (e.g., "avc1.64001f").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Representation {
    /// A representation with only an id and a bitrate.
    pub fn new(id: RepresentationId, bandwidth: u64) -> Self {
        Self {
            id,
            bandwidth,
            mime_type: None,
            codecs: None,
            width: None,
            height: None,
        }
    }
}

/// An adaptation set groups representations with the same content type (e.g., audio or video).
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptationSet {
    pub id: AdaptationSetId,
    pub content_type: ContentType,
    /// All representations available in this adaptation set, keyed by representation id.
    pub representations: BTreeMap<RepresentationId, Representation>,
}

impl AdaptationSet {
    pub fn new(
        id: AdaptationSetId,
        content_type: ContentType,
        representations: impl IntoIterator<Item = Representation>,
    ) -> Self {
        Self {
            id,
            content_type,
            representations: representations.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Bitrates of every representation, sorted ascending.
    pub fn bitrate_ladder(&self) -> Vec<u64> {
        let mut bitrates: Vec<u64> = self.representations.values().map(|r| r.bandwidth).collect();
        bitrates.sort_unstable();
        bitrates
    }

    /// The lowest-id representation whose bitrate equals `bitrate`.
    pub fn representation_with_bitrate(&self, bitrate: u64) -> Option<&Representation> {
        self.representations.values().find(|r| r.bandwidth == bitrate)
    }

    /// The representation with the lowest bitrate, ties broken by lowest id.
    pub fn lowest_bitrate(&self) -> Option<&Representation> {
        self.representations.values().min_by_key(|r| r.bandwidth)
    }
}

/// Builds a catalog keyed by each adaptation set's own id.
pub fn catalog_from(adaptation_sets: impl IntoIterator<Item = AdaptationSet>) -> Catalog {
    adaptation_sets.into_iter().map(|a| (a.id, a)).collect()
}
