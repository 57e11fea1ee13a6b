//! Replays a recorded session through an ABR controller.
//!
//! A session holds the adaptation sets of a stream and, for every segment, the buffer level
//! observed before the decision and the download that followed it.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::abr::AbrController;
use crate::bandwidth::EwmaBandwidthMeter;
use crate::buffer::SharedBufferLevel;
use crate::error::{AbrError, ConfigurationError};
use crate::events::{PlayerEventListener, SchedulerEventListener};
use crate::model::{
    catalog_from, AdaptationSet, AdaptationSetId, Catalog, ContentType, Representation, Selection,
};

#[derive(Debug, Clone, Deserialize)]
pub struct AdaptationSetEntry {
    pub id: AdaptationSetId,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    /// Used to infer the content type when `content_type` is absent.
    #[serde(default)]
    pub mime_type: Option<String>,
    pub representations: Vec<Representation>,
}

impl From<AdaptationSetEntry> for AdaptationSet {
    fn from(entry: AdaptationSetEntry) -> Self {
        let content_type = entry.content_type.unwrap_or_else(|| {
            ContentType::from_mime_type(entry.mime_type.as_deref().unwrap_or_default())
        });
        AdaptationSet::new(entry.id, content_type, entry.representations)
    }
}

/// A completed segment download.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Download {
    pub bytes: u64,
    pub seconds: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Step {
    /// Buffer level (seconds) observed before the decision.
    pub buffer_level: f64,
    #[serde(default)]
    pub download: Option<Download>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub adaptation_sets: Vec<AdaptationSetEntry>,
    pub steps: Vec<Step>,
}

impl Session {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn catalog(&self) -> Catalog {
        catalog_from(self.adaptation_sets.iter().cloned().map(AdaptationSet::from))
    }
}

/// Drives `controller` through every step of `session` and returns the selection of each step.
///
/// `meter` and `buffer` must be the collaborators the controller was built with.
pub async fn replay<C, L>(
    session: &Session,
    controller: &mut C,
    meter: &EwmaBandwidthMeter,
    buffer: &SharedBufferLevel,
    listener: &L,
) -> Result<Vec<Selection>, AbrError>
where
    C: AbrController,
    L: SchedulerEventListener + PlayerEventListener,
{
    let catalog = session.catalog();
    let mut decisions = Vec::with_capacity(session.steps.len());

    for (index, step) in session.steps.iter().enumerate() {
        let index = index as u64;
        buffer.set(step.buffer_level);
        listener.on_buffer_level_change(step.buffer_level).await;

        let selection = controller.update_selection(&catalog)?;
        listener.on_segment_download_start(index, &selection).await;

        if let Some(download) = step.download {
            meter.record(download.bytes, download.seconds);
        }
        listener.on_segment_download_complete(index).await;
        decisions.push(selection);
    }

    info!("Replayed {} steps over {} adaptation sets", decisions.len(), catalog.len());
    Ok(decisions)
}
