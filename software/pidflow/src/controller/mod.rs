//! PID feedback controller with a flush override

mod clock;
mod state;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use state::ControllerState;

use tracing::{debug, trace, warn};

use crate::config::{DEFAULT_WINDUP_GUARD, PidConfig};
use crate::error::ControlError;

/// A PID controller with simple saturation for anti-windup
/// and a flush mode that pins the output to a fixed pressure.
///
/// Time steps are measured between successive calls to `update`
/// using the controller's clock. While flushing, the PID terms keep
/// updating underneath so the controller stays warm for `resume_flow`.
///
/// Setters are plain assignments; no input is validated.
#[derive(Clone, Debug)]
pub struct Controller<C: Clock = MonotonicClock> {
    // Gains
    kp: f64,
    ki: f64,
    kd: f64,

    // Tuning that is restored by `reset`
    setpoint: f64,
    sample_time: f64,
    windup_guard: f64,

    // Timing
    last_time: f64,
    current_time: f64,

    // Internal state
    last_error: f64,
    p_term: f64,
    i_term: f64,
    d_term: f64,
    output: f64,

    // Override
    flush: bool,
    flush_pressure: f64,

    clock: C,
}

impl Controller<MonotonicClock> {
    /// Initialize a controller that reads time from a fresh monotonic clock
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_clock(kp, ki, kd, MonotonicClock::new())
    }
}

impl Default for Controller<MonotonicClock> {
    fn default() -> Self {
        let cfg = PidConfig::default();
        Self::new(cfg.kp, cfg.ki, cfg.kd)
    }
}

impl<C: Clock> Controller<C> {
    /// Initialize a controller with the given gains and time source,
    /// starting from a clean baseline.
    pub fn with_clock(kp: f64, ki: f64, kd: f64, clock: C) -> Self {
        let mut controller = Self {
            kp,
            ki,
            kd,

            setpoint: 0.0,
            sample_time: 0.0,
            windup_guard: DEFAULT_WINDUP_GUARD,

            last_time: 0.0,
            current_time: 0.0,

            last_error: 0.0,
            p_term: 0.0,
            i_term: 0.0,
            d_term: 0.0,
            output: 0.0,

            flush: false,
            flush_pressure: 0.0,

            clock,
        };
        controller.reset();
        controller
    }

    /// Initialize a controller from a stored tuning
    pub fn from_config(cfg: PidConfig, clock: C) -> Self {
        let mut controller = Self::with_clock(cfg.kp, cfg.ki, cfg.kd, clock);
        controller.sample_time = cfg.sample_time;
        controller.windup_guard = cfg.windup_guard;
        controller
    }

    /// The current tuning, suitable for storing and rebuilding the controller later
    pub fn config(&self) -> PidConfig {
        PidConfig {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            sample_time: self.sample_time,
            windup_guard: self.windup_guard,
        }
    }

    /// Return everything except the gains to the construction-time baseline
    /// and restamp the time reference.
    pub fn reset(&mut self) {
        debug!("Resetting controller");
        self.sample_time = 0.0;
        self.current_time = self.clock.now_s();
        self.last_time = self.current_time;
        self.windup_guard = DEFAULT_WINDUP_GUARD;
        self.setpoint = 0.0;

        self.flush = false;
        self.flush_pressure = 0.0;

        self.p_term = 0.0;
        self.i_term = 0.0;
        self.d_term = 0.0;
        self.last_error = 0.0;
        self.output = 0.0;
    }

    /// Pin the output at `pressure` until the flush is stopped or flow is resumed
    pub fn start_flush(&mut self, pressure: f64) {
        debug!("Starting flush at pressure {pressure}");
        self.flush = true;
        self.flush_pressure = pressure;
    }

    /// End the flush and drop back to a cold baseline.
    /// Gains are kept.
    pub fn stop_flush(&mut self) {
        debug!("Stopping flush at pressure {}", self.flush_pressure);
        self.flush = false;
        self.flush_pressure = 0.0;
        self.setpoint = 0.0;
        self.reset();
    }

    /// End the flush and continue control toward `setpoint` without a jump in the output.
    ///
    /// The integral term is back-solved from `last_output` so that the next
    /// update at zero error produces `last_output` again. `ki` becomes the new
    /// integral gain. Fails without modifying the controller if `ki` is zero.
    pub fn resume_flow(
        &mut self,
        setpoint: f64,
        ki: f64,
        last_output: f64,
    ) -> Result<(), ControlError> {
        if ki == 0.0 {
            warn!("Refusing to resume flow with zero integral gain");
            return Err(ControlError::InvalidGain { ki });
        }

        debug!("Resuming flow toward {setpoint} from output {last_output}");

        self.ki = ki;
        self.sample_time = 0.0;
        self.current_time = self.clock.now_s();
        self.last_time = self.current_time;
        self.windup_guard = DEFAULT_WINDUP_GUARD;

        self.flush = false;
        self.flush_pressure = 0.0;

        self.p_term = 0.0;
        self.i_term = last_output / ki;
        self.d_term = 0.0;
        self.last_error = 0.0;

        self.output = last_output;
        self.setpoint = setpoint;

        Ok(())
    }

    /// Discard the accumulated integral term, leaving everything else in place
    pub fn clear_integral(&mut self) {
        self.i_term = 0.0;
    }

    /// Get the next output from the controller given a measurement
    /// of the controlled process.
    ///
    /// The PID terms are only recomputed when at least `sample_time` has elapsed
    /// since the previous call. The error and time history advance on every call,
    /// so a skipped tick still becomes the reference for the next one.
    pub fn update(&mut self, feedback: f64) -> f64 {
        let error = self.setpoint - feedback;

        self.current_time = self.clock.now_s();
        let dt = self.current_time - self.last_time;
        let de = error - self.last_error;

        self.last_time = self.current_time;
        self.last_error = error;

        if dt >= self.sample_time {
            self.p_term = self.kp * error;

            // Anti-windup saturation
            self.i_term += error * dt;
            if self.i_term < -self.windup_guard {
                self.i_term = -self.windup_guard;
            } else if self.i_term > self.windup_guard {
                self.i_term = self.windup_guard;
            }

            self.d_term = if dt > 0.0 { de / dt } else { 0.0 };

            self.output = self.p_term + self.ki * self.i_term + self.kd * self.d_term;
        } else {
            trace!(
                "Skipping update after {dt}s, sample time is {}s",
                self.sample_time
            );
        }

        self.output()
    }

    pub fn set_kp(&mut self, kp: f64) {
        self.kp = kp;
    }

    pub fn set_ki(&mut self, ki: f64) {
        self.ki = ki;
    }

    pub fn set_kd(&mut self, kd: f64) {
        self.kd = kd;
    }

    pub fn set_target(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Set the bound on the magnitude of the integral term.
    /// Takes effect at the next effective update.
    pub fn set_windup_guard(&mut self, windup_guard: f64) {
        self.windup_guard = windup_guard;
    }

    /// Set the minimum interval in seconds between effective updates
    pub fn set_sample_time(&mut self, sample_time: f64) {
        self.sample_time = sample_time;
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn target(&self) -> f64 {
        self.setpoint
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    pub fn windup_guard(&self) -> f64 {
        self.windup_guard
    }

    pub fn is_flushing(&self) -> bool {
        self.flush
    }

    pub fn flush_pressure(&self) -> f64 {
        self.flush_pressure
    }

    pub fn p_term(&self) -> f64 {
        self.p_term
    }

    pub fn i_term(&self) -> f64 {
        self.i_term
    }

    pub fn d_term(&self) -> f64 {
        self.d_term
    }

    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// The flush pressure while flushing, otherwise the last computed output
    pub fn output(&self) -> f64 {
        if self.flush {
            self.flush_pressure
        } else {
            self.output
        }
    }

    /// Snapshot of the run-time state
    pub fn state(&self) -> ControllerState {
        ControllerState {
            setpoint: self.setpoint,
            last_time: self.last_time,
            current_time: self.current_time,
            last_error: self.last_error,
            p_term: self.p_term,
            i_term: self.i_term,
            d_term: self.d_term,
            output: self.output(),
            flush: self.flush,
            flush_pressure: self.flush_pressure,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
