//! Read-only view of the controller's numeric state

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};

/// Snapshot of the controller's run-time state, taken with `Controller::state`.
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControllerState {
    pub setpoint: f64,
    pub last_time: f64,
    pub current_time: f64,
    pub last_error: f64,

    pub p_term: f64,
    pub i_term: f64,
    pub d_term: f64,

    /// Effective output: the flush pressure while flushing,
    /// otherwise the last computed PID output
    pub output: f64,

    pub flush: bool,
    pub flush_pressure: f64,
}
