pub mod abr;
pub mod args;
pub mod bandwidth;
pub mod buffer;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod replay;

pub use abr::{AbrController, DashAbrController};
pub use bandwidth::{BandwidthMeter, EwmaBandwidthMeter};
pub use buffer::{BufferManager, SharedBufferLevel};
pub use config::{AbrConfig, AbrStrategy};
pub use error::{AbrError, ConfigurationError, InvariantViolation};
pub use events::{EventLogger, PlayerEventListener, PlayerState, SchedulerEventListener};
pub use model::{AdaptationSet, Catalog, ContentType, Representation, Selection};
