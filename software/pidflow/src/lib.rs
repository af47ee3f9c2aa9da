#![doc = include_str!("../README.md")]

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;

pub use config::PidConfig;
pub use controller::{Clock, Controller, ControllerState, ManualClock, MonotonicClock};
pub use error::ControlError;
