//! Initial tuning for a controller.

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

/// Default proportional gain
pub const DEFAULT_KP: f64 = 0.2;

/// Default clamp on the magnitude of the accumulated integral term
pub const DEFAULT_WINDUP_GUARD: f64 = 1_000_000.0;

/// Gains and timing limits used to construct a controller.
///
/// Values are not validated. Negative gains, a negative sample time,
/// and a zero or negative windup guard are all passed through as given.
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ser", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f64,

    /// Integral gain
    pub ki: f64,

    /// Derivative gain
    pub kd: f64,

    /// Minimum interval in seconds between effective updates.
    /// Zero recomputes on every call.
    pub sample_time: f64,

    /// Bound on the magnitude of the accumulated integral term
    pub windup_guard: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: DEFAULT_KP,
            ki: 0.0,
            kd: 0.0,
            sample_time: 0.0,
            windup_guard: DEFAULT_WINDUP_GUARD,
        }
    }
}

impl PidConfig {
    pub fn with_gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    pub fn with_sample_time(mut self, sample_time: f64) -> Self {
        self.sample_time = sample_time;
        self
    }

    pub fn with_windup_guard(mut self, windup_guard: f64) -> Self {
        self.windup_guard = windup_guard;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "ser")]
    #[test]
    fn missing_fields_take_defaults() {
        let cfg: PidConfig = serde_json::from_str(r#"{"ki": 1.5, "sample_time": 0.01}"#).unwrap();
        assert_eq!(cfg.kp, DEFAULT_KP);
        assert_eq!(cfg.ki, 1.5);
        assert_eq!(cfg.kd, 0.0);
        assert_eq!(cfg.sample_time, 0.01);
        assert_eq!(cfg.windup_guard, DEFAULT_WINDUP_GUARD);
    }

    #[test]
    fn builder_keeps_unset_fields() {
        let cfg = PidConfig::default().with_windup_guard(20.0);
        assert_eq!(cfg.kp, DEFAULT_KP);
        assert_eq!(cfg.windup_guard, 20.0);

        let cfg = cfg.with_gains(1.0, 2.0, 3.0).with_sample_time(-1.0);
        assert_eq!((cfg.kp, cfg.ki, cfg.kd), (1.0, 2.0, 3.0));
        assert_eq!(cfg.sample_time, -1.0);
        assert_eq!(cfg.windup_guard, 20.0);
    }
}
