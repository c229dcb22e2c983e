//! Alarm decision core.
//!
//! This module holds the value types of the security system, the listener
//! capability used to fan out updates, and the [`AlarmController`] state
//! machine that ties them together.

pub mod controller;
pub mod listener;
pub mod types;

pub use controller::AlarmController;
pub use listener::{ListenerRegistry, LoggingListener, StatusListener};
pub use types::{AlarmStatus, ArmingStatus, Sensor, SensorType};
