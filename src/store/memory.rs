//! In-process state store.

use super::{StateStore, StoreSnapshot};
use crate::error::{Result, SecurityError};
use crate::security::{AlarmStatus, ArmingStatus, Sensor};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    arming_status: ArmingStatus,
    alarm_status: AlarmStatus,
    sensors: HashMap<Uuid, Sensor>,
}

/// Thread-safe store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store: disarmed, no alarm, no sensors.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let sensors = snapshot
            .sensors
            .into_iter()
            .map(|sensor| (sensor.id(), sensor))
            .collect();
        Self {
            state: RwLock::new(State {
                arming_status: snapshot.arming_status,
                alarm_status: snapshot.alarm_status,
                sensors,
            }),
        }
    }

    /// Copy of the current state, sensors sorted for stable output.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        let mut sensors: Vec<Sensor> = state.sensors.values().cloned().collect();
        sensors.sort();
        StoreSnapshot {
            arming_status: state.arming_status,
            alarm_status: state.alarm_status,
            sensors,
        }
    }
}

impl StateStore for MemoryStore {
    fn arming_status(&self) -> ArmingStatus {
        self.state.read().arming_status
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.state.write().arming_status = status;
        Ok(())
    }

    fn alarm_status(&self) -> AlarmStatus {
        self.state.read().alarm_status
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.state.write().alarm_status = status;
        Ok(())
    }

    fn sensors(&self) -> HashSet<Sensor> {
        self.state.read().sensors.values().cloned().collect()
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.state
            .write()
            .sensors
            .entry(sensor.id())
            .or_insert(sensor);
        Ok(())
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.state.write().sensors.remove(&sensor.id());
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        let mut state = self.state.write();
        match state.sensors.get_mut(&sensor.id()) {
            Some(stored) => {
                *stored = sensor.clone();
                Ok(())
            }
            None => Err(SecurityError::UnknownSensor(sensor.id())),
        }
    }
}
