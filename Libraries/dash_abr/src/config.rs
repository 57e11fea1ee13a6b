use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Which ABR algorithm a controller runs. Fixed for the lifetime of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(try_from = "String", into = "String")]
pub enum AbrStrategy {
    /// Choose from the buffer occupancy through a rate map.
    BufferBased,
    /// Choose from the bandwidth estimate alone.
    BandwidthBased,
    /// Bandwidth-driven choice with buffer-driven hysteresis.
    Hybrid,
}

impl AbrStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            AbrStrategy::BufferBased => "buffer-based",
            AbrStrategy::BandwidthBased => "bandwidth-based",
            AbrStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for AbrStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbrStrategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buffer-based" => Ok(AbrStrategy::BufferBased),
            "bandwidth-based" => Ok(AbrStrategy::BandwidthBased),
            "hybrid" => Ok(AbrStrategy::Hybrid),
            other => Err(ConfigurationError::UnknownStrategy(other.to_string())),
        }
    }
}

impl TryFrom<String> for AbrStrategy {
    type Error = ConfigurationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<AbrStrategy> for String {
    fn from(strategy: AbrStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Settings recognized by the ABR controller at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbrConfig {
    pub strategy: AbrStrategy,
    /// Below this buffer level (seconds) the hybrid strategy never raises the bitrate.
    pub panic_buffer_seconds: f64,
    /// Above this buffer level (seconds) the hybrid strategy never lowers the bitrate.
    pub safe_buffer_seconds: f64,
    /// Buffer capacity used to turn the buffer level into an occupancy fraction.
    pub max_buffer_duration_seconds: f64,
}

impl Default for AbrConfig {
    fn default() -> Self {
        Self {
            strategy: AbrStrategy::Hybrid,
            panic_buffer_seconds: 5.0,
            safe_buffer_seconds: 20.0,
            max_buffer_duration_seconds: 30.0,
        }
    }
}

impl AbrConfig {
    pub fn new(strategy: AbrStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Loads a JSON configuration file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a JSON configuration. An unrecognized strategy name is reported as
    /// [`ConfigurationError::UnknownStrategy`] rather than a generic parse error.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigurationError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if let Some(name) = value.get("strategy").and_then(serde_json::Value::as_str) {
            name.parse::<AbrStrategy>()?;
        }
        let config: AbrConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_non_negative("panic_buffer_seconds", self.panic_buffer_seconds)?;
        check_non_negative("safe_buffer_seconds", self.safe_buffer_seconds)?;
        check_non_negative("max_buffer_duration_seconds", self.max_buffer_duration_seconds)?;
        if self.max_buffer_duration_seconds == 0.0 {
            return Err(ConfigurationError::InvalidValue {
                field: "max_buffer_duration_seconds",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.panic_buffer_seconds > self.safe_buffer_seconds {
            return Err(ConfigurationError::InvalidValue {
                field: "panic_buffer_seconds",
                reason: format!(
                    "{} exceeds safe_buffer_seconds {}",
                    self.panic_buffer_seconds, self.safe_buffer_seconds
                ),
            });
        }
        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            field,
            reason: format!("{value} is not a finite, non-negative number of seconds"),
        })
    }
}
