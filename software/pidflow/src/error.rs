//! Failure modes of controller operations

use thiserror::Error;

/// Errors returned by controller operations.
///
/// Tuning setters accept any value and never fail; only transitions that
/// would otherwise divide by a gain are checked.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum ControlError {
    /// The integral term can't be back-solved from the output with this gain.
    #[error("Integral gain of {ki} cannot seed the integral term from the last output")]
    InvalidGain { ki: f64 },
}
