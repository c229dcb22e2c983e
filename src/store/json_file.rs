//! JSON file-backed state store.
//!
//! The whole state is kept in memory and rewritten to a single JSON file on
//! every change. Writes go through a temp file in the same directory followed
//! by a rename, so a crash leaves either the old or the new state on disk.

use super::{StateStore, StoreSnapshot};
use crate::error::{Result, SecurityError};
use crate::security::{AlarmStatus, ArmingStatus, Sensor};
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const STATE_FILE_NAME: &str = "state.json";

pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreSnapshot>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting from defaults if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
            info!(
                "Loaded security state from {} ({} sensors)",
                path.display(),
                snapshot.sensors.len()
            );
            snapshot
        } else {
            info!(
                "No security state at {}, starting disarmed",
                path.display()
            );
            StoreSnapshot::default()
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Default state file location under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("home-security")
            .join(STATE_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the state, write it out, then publish it.
    ///
    /// The in-memory state only changes once the file write succeeded.
    fn commit<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<()>,
    {
        let mut state = self.state.write();
        let mut next = state.clone();
        change(&mut next)?;
        self.write_file(&next)?;
        *state = next;
        Ok(())
    }

    fn write_file(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("Wrote security state to {}", self.path.display());
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn arming_status(&self) -> ArmingStatus {
        self.state.read().arming_status
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.commit(|s| {
            s.arming_status = status;
            Ok(())
        })
    }

    fn alarm_status(&self) -> AlarmStatus {
        self.state.read().alarm_status
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.commit(|s| {
            s.alarm_status = status;
            Ok(())
        })
    }

    fn sensors(&self) -> HashSet<Sensor> {
        self.state.read().sensors.iter().cloned().collect()
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        if self.state.read().sensors.contains(&sensor) {
            return Ok(());
        }
        self.commit(|s| {
            s.sensors.push(sensor);
            s.sensors.sort();
            Ok(())
        })
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        if !self.state.read().sensors.contains(sensor) {
            return Ok(());
        }
        self.commit(|s| {
            s.sensors.retain(|existing| existing.id() != sensor.id());
            Ok(())
        })
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.commit(|s| {
            let stored = s
                .sensors
                .iter_mut()
                .find(|existing| existing.id() == sensor.id())
                .ok_or(SecurityError::UnknownSensor(sensor.id()))?;
            *stored = sensor.clone();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SensorType;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::open(dir.path().join("nested").join(STATE_FILE_NAME)).unwrap()
    }

    #[test]
    fn test_missing_file_starts_from_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.arming_status(), ArmingStatus::Disarmed);
        assert_eq!(store.alarm_status(), AlarmStatus::NoAlarm);
        assert!(store.sensors().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let mut door = Sensor::new("Front door", SensorType::Door);
        {
            let store = store_in(&dir);
            store.set_arming_status(ArmingStatus::ArmedHome).unwrap();
            store.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
            store.add_sensor(door.clone()).unwrap();
            store
                .add_sensor(Sensor::new("Hallway", SensorType::Motion))
                .unwrap();
            door.set_active(true);
            store.update_sensor(&door).unwrap();
        }

        let reopened = store_in(&dir);
        assert_eq!(reopened.arming_status(), ArmingStatus::ArmedHome);
        assert_eq!(reopened.alarm_status(), AlarmStatus::PendingAlarm);
        let sensors = reopened.sensors();
        assert_eq!(sensors.len(), 2);
        assert!(sensors.get(&door).unwrap().is_active());
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["arming_status"], "ARMED_AWAY");
        assert_eq!(json["alarm_status"], "NO_ALARM");
        assert!(json["sensors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failed_update_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let stranger = Sensor::new("Stranger", SensorType::Window);
        assert!(matches!(
            store.update_sensor(&stranger),
            Err(SecurityError::UnknownSensor(_))
        ));
        assert!(store.sensors().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_re_adding_sensor_keeps_stored_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut door = Sensor::new("Door", SensorType::Door);
        store.add_sensor(door.clone()).unwrap();
        let stale = door.clone();
        door.set_active(true);
        store.update_sensor(&door).unwrap();

        store.add_sensor(stale).unwrap();
        assert_eq!(store.sensors().len(), 1);
        assert!(store.sensors().get(&door).unwrap().is_active());

        let reopened = store_in(&dir);
        assert!(reopened.sensors().get(&door).unwrap().is_active());
    }

    #[test]
    fn test_remove_sensor() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let window = Sensor::new("Window", SensorType::Window);
        store.add_sensor(window.clone()).unwrap();
        store
            .remove_sensor(&Sensor::new("Ghost", SensorType::Door))
            .unwrap();
        assert_eq!(store.sensors().len(), 1);
        store.remove_sensor(&window).unwrap();

        let reopened = store_in(&dir);
        assert!(reopened.sensors().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(SecurityError::SerdeJsonError(_))
        ));
    }
}
