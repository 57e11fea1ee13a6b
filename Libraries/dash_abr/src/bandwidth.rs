use std::sync::Mutex;

#[cfg(test)]
use mockall::automock;

/// Source of the current throughput estimate.
///
/// Implementations are updated elsewhere and must answer without blocking.
#[cfg_attr(test, automock)]
pub trait BandwidthMeter: Send + Sync {
    /// Estimated throughput in bits per second.
    fn bandwidth(&self) -> f64;
}

#[derive(Debug)]
struct EwmaState {
    ewma: f64,
    initialized: bool,
}

/// Exponentially weighted moving average over download samples.
#[derive(Debug)]
pub struct EwmaBandwidthMeter {
    alpha: f64,
    initial_estimate: f64,
    state: Mutex<EwmaState>,
}

impl EwmaBandwidthMeter {
    /// `alpha` is the weight of the newest sample; `initial_estimate` (bps) is reported until the
    /// first sample arrives.
    pub fn new(alpha: f64, initial_estimate: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            initial_estimate: initial_estimate.max(0.0),
            state: Mutex::new(EwmaState {
                ewma: 0.0,
                initialized: false,
            }),
        }
    }

    /**
     * Records the number of bytes downloaded and the time taken in seconds.
     * Samples without a positive duration carry no throughput information and are dropped.
     */
    pub fn record(&self, bytes: u64, duration_s: f64) {
        if duration_s.is_nan() || duration_s <= 0.0 || duration_s.is_infinite() {
            tracing::debug!(bytes, duration_s, "Dropping bandwidth sample without duration");
            return;
        }
        let sample = (bytes as f64 * 8.0) / duration_s;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.ewma = if state.initialized {
            self.alpha * sample + (1.0 - self.alpha) * state.ewma
        } else {
            state.initialized = true;
            sample // first sample
        };
    }
}

impl BandwidthMeter for EwmaBandwidthMeter {
    fn bandwidth(&self) -> f64 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.initialized {
            state.ewma
        } else {
            self.initial_estimate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_initial_estimate_before_samples() {
        let meter = EwmaBandwidthMeter::new(0.25, 1_000_000.0);
        assert_eq!(meter.bandwidth(), 1_000_000.0);
    }

    #[test]
    fn first_sample_replaces_initial_estimate() {
        let meter = EwmaBandwidthMeter::new(0.25, 1_000_000.0);
        meter.record(250_000, 1.0);
        assert_eq!(meter.bandwidth(), 2_000_000.0);
    }

    #[test]
    fn later_samples_are_smoothed() {
        let meter = EwmaBandwidthMeter::new(0.5, 0.0);
        meter.record(250_000, 1.0);
        meter.record(500_000, 1.0);
        assert_eq!(meter.bandwidth(), 3_000_000.0);
    }

    #[test]
    fn ignores_zero_duration_samples() {
        let meter = EwmaBandwidthMeter::new(0.25, 500.0);
        meter.record(1_000, 0.0);
        meter.record(1_000, f64::NAN);
        meter.record(1_000, -2.0);
        meter.record(1_000, f64::INFINITY);
        assert_eq!(meter.bandwidth(), 500.0);
    }
}
