//! Home security library.
//!
//! The decision core of a home-security controller: sensors, arming modes
//! and a cat-detecting camera feed into an alarm state machine that records
//! its state through a pluggable store and notifies registered listeners.

pub mod config;
pub mod error;
pub mod image;
pub mod input;
pub mod security;
pub mod store;
