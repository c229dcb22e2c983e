//! Durable state behind the alarm controller.
//!
//! A store holds the current arming status, the current alarm status and the
//! set of known sensors. Every write is complete (and, for file-backed
//! stores, on disk) before the call returns.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::security::{AlarmStatus, ArmingStatus, Sensor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub trait StateStore: Send + Sync {
    fn arming_status(&self) -> ArmingStatus;

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()>;

    fn alarm_status(&self) -> AlarmStatus;

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()>;

    /// Snapshot of all known sensors.
    fn sensors(&self) -> HashSet<Sensor>;

    /// Add a sensor. A sensor whose id is already stored is left as it is.
    fn add_sensor(&self, sensor: Sensor) -> Result<()>;

    /// Remove a sensor. Removing an unknown sensor is not an error.
    fn remove_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// Overwrite a stored sensor's state.
    ///
    /// Fails with [`SecurityError::UnknownSensor`](crate::error::SecurityError::UnknownSensor)
    /// if the sensor was never added.
    fn update_sensor(&self, sensor: &Sensor) -> Result<()>;
}

/// Plain-data view of a store, also the on-disk JSON layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub arming_status: ArmingStatus,
    #[serde(default)]
    pub alarm_status: AlarmStatus,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}
