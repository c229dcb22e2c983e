//! Core value types of the security system.
//!
//! The enumerations serialize as `SCREAMING_SNAKE_CASE` strings and parse back
//! from the same spelling (case-insensitive). Parsing never coerces: an unknown
//! value is an error.

use crate::error::{Result, SecurityError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Operator-selected mode controlling whether sensor triggers are honored.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ArmingStatus {
    #[default]
    Disarmed,
    ArmedHome,
    ArmedAway,
}

impl ArmingStatus {
    /// Parse an arming status, failing on anything outside the three modes.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim())
            .map_err(|_| SecurityError::InvalidArmingStatus(value.to_string()))
    }

    /// True for `ArmedHome` and `ArmedAway`.
    pub fn is_armed(self) -> bool {
        matches!(self, Self::ArmedHome | Self::ArmedAway)
    }
}

/// Current escalation level of the system.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AlarmStatus {
    #[default]
    NoAlarm,
    PendingAlarm,
    Alarm,
}

impl AlarmStatus {
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim())
            .map_err(|_| SecurityError::InvalidAlarmStatus(value.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SensorType {
    Door,
    Window,
    Motion,
}

impl SensorType {
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim())
            .map_err(|_| SecurityError::InvalidSensorType(value.to_string()))
    }
}

/// A door, window or motion sensor known to the controller.
///
/// Identity is the `id`: equality and hashing ignore the name and the active
/// flag, so a sensor can be looked up in a set after its state changed.
/// The `active` flag is only writable inside the crate; callers change it
/// through [`AlarmController::change_sensor_activation_status`].
///
/// [`AlarmController::change_sensor_activation_status`]: super::AlarmController::change_sensor_activation_status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    id: Uuid,
    name: String,
    sensor_type: SensorType,
    active: bool,
}

impl Sensor {
    /// Create a new, inactive sensor with a fresh id.
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sensor_type,
            active: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Sensor {}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Display order: by name, ties broken by id.
impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}
