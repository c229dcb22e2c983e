//! Alarm state machine.
//!
//! [`AlarmController`] owns every decision about the alarm status. Arming
//! changes, sensor edges and camera results come in through its public
//! operations; state is read from and written through a [`StateStore`]; and
//! registered [`StatusListener`]s hear about every recorded alarm status and
//! every camera result.
//!
//! ```text
//! NO_ALARM      --sensor activated, armed-->        PENDING_ALARM
//! PENDING_ALARM --sensor activated, armed-->        ALARM
//! PENDING_ALARM --last active sensor deactivated--> NO_ALARM
//! any           --disarmed-->                       NO_ALARM
//! any           --cat seen while ARMED_HOME-->      ALARM
//! any           --no cat, all sensors inactive-->   NO_ALARM
//! ```

use super::listener::{ListenerRegistry, StatusListener};
use super::types::{AlarmStatus, ArmingStatus, Sensor};
use crate::error::{Result, SecurityError};
use crate::image::{CameraImage, DEFAULT_CAT_CONFIDENCE, ImageClassifier};
use crate::store::StateStore;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Decision core of the security system.
///
/// All public operations take `&self` and run one at a time behind a single
/// internal lock, so the controller can be shared through an `Arc` between
/// input tasks. Listener callbacks run while that lock is held and must not
/// call the controller's mutating operations.
pub struct AlarmController {
    store: Arc<dyn StateStore>,
    classifier: Arc<dyn ImageClassifier>,
    listeners: ListenerRegistry,
    confidence_threshold: f32,
    op_lock: Mutex<()>,
}

impl AlarmController {
    pub fn new(store: Arc<dyn StateStore>, classifier: Arc<dyn ImageClassifier>) -> Self {
        Self {
            store,
            classifier,
            listeners: ListenerRegistry::new(),
            confidence_threshold: DEFAULT_CAT_CONFIDENCE,
            op_lock: Mutex::new(()),
        }
    }

    /// Override the confidence passed to the classifier (default 50%).
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Change the arming mode.
    ///
    /// Disarming clears any alarm. Arming resets every sensor to inactive,
    /// which can only calm the alarm down, never escalate it.
    ///
    /// Sensors are reset one at a time in name order. If a store write
    /// fails the error is returned as is: sensors reset so far stay
    /// inactive and the arming status keeps its previous value.
    pub fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        let _guard = self.op_lock.lock();
        info!("[Alarm] Arming status -> {}", status);

        if status == ArmingStatus::Disarmed {
            self.record_alarm_status(AlarmStatus::NoAlarm)?;
        } else if status.is_armed() {
            let mut sensors: Vec<Sensor> = self.store.sensors().into_iter().collect();
            sensors.sort();
            for sensor in sensors.iter_mut() {
                self.apply_sensor_activation(sensor, false)?;
            }
        }

        self.store.set_arming_status(status)
    }

    /// Record a new alarm status and notify listeners.
    ///
    /// A request for `PendingAlarm` while no sensor is active is recorded as
    /// `NoAlarm`. Returns the status that was actually stored.
    pub fn set_alarm_status(&self, status: AlarmStatus) -> Result<AlarmStatus> {
        let _guard = self.op_lock.lock();
        self.record_alarm_status(status)
    }

    /// Set a sensor's active flag and run the alarm rules for the edge.
    ///
    /// Only an inactive->active or active->inactive change touches the
    /// alarm status; repeating the current value just persists the sensor.
    /// The sensor must have been added first. On success `sensor` reflects
    /// the stored state.
    pub fn change_sensor_activation_status(&self, sensor: &mut Sensor, active: bool) -> Result<()> {
        let _guard = self.op_lock.lock();
        self.apply_sensor_activation(sensor, active)
    }

    /// Classify a camera frame and apply the cat rules.
    ///
    /// Classification errors are returned unchanged; in that case nothing is
    /// recorded and no listener is called. Returns the classifier's answer.
    pub fn process_camera_image(&self, image: &CameraImage) -> Result<bool> {
        let cat = self
            .classifier
            .contains_cat(image, self.confidence_threshold)?;

        let _guard = self.op_lock.lock();
        self.cat_detected(cat)?;
        Ok(cat)
    }

    pub fn add_status_listener(&self, listener: &Arc<dyn StatusListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_status_listener(&self, listener: &Arc<dyn StatusListener>) {
        self.listeners.remove(listener);
    }

    pub fn alarm_status(&self) -> AlarmStatus {
        self.store.alarm_status()
    }

    pub fn arming_status(&self) -> ArmingStatus {
        self.store.arming_status()
    }

    pub fn sensors(&self) -> HashSet<Sensor> {
        self.store.sensors()
    }

    /// Register a sensor. Re-adding a known sensor leaves the stored one,
    /// including its active flag, untouched.
    pub fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        let _guard = self.op_lock.lock();
        self.store.add_sensor(sensor)
    }

    pub fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        let _guard = self.op_lock.lock();
        self.store.remove_sensor(sensor)
    }

    // Everything below runs with `op_lock` held.

    fn record_alarm_status(&self, requested: AlarmStatus) -> Result<AlarmStatus> {
        let status = if requested == AlarmStatus::PendingAlarm && self.all_sensors_inactive() {
            warn!("[Alarm] Pending alarm requested with no active sensor, recording NO_ALARM");
            AlarmStatus::NoAlarm
        } else {
            requested
        };

        self.store.set_alarm_status(status)?;
        info!("[Alarm] Alarm status -> {}", status);
        self.listeners.notify_alarm_status(status);
        Ok(status)
    }

    fn apply_sensor_activation(&self, sensor: &mut Sensor, active: bool) -> Result<()> {
        let was_active = self
            .store
            .sensors()
            .get(&*sensor)
            .map(Sensor::is_active)
            .ok_or(SecurityError::UnknownSensor(sensor.id()))?;

        // Persist first so the pending guard sees this sensor's new state.
        let mut updated = sensor.clone();
        updated.set_active(active);
        self.store.update_sensor(&updated)?;
        *sensor = updated;

        match (was_active, active) {
            (false, true) => {
                info!("[Alarm] Sensor '{}' activated", sensor.name());
                self.handle_activated_sensor()?;
            }
            (true, false) => {
                info!("[Alarm] Sensor '{}' deactivated", sensor.name());
                self.handle_deactivated_sensor()?;
            }
            _ => debug!(
                "[Alarm] Sensor '{}' already {}",
                sensor.name(),
                if active { "active" } else { "inactive" }
            ),
        }

        self.listeners.notify_sensor_status();
        Ok(())
    }

    fn handle_activated_sensor(&self) -> Result<()> {
        if self.store.arming_status() == ArmingStatus::Disarmed {
            debug!("[Alarm] System disarmed, ignoring sensor trigger");
            return Ok(());
        }

        match self.store.alarm_status() {
            AlarmStatus::NoAlarm => {
                self.record_alarm_status(AlarmStatus::PendingAlarm)?;
            }
            AlarmStatus::PendingAlarm => {
                self.record_alarm_status(AlarmStatus::Alarm)?;
            }
            AlarmStatus::Alarm => debug!("[Alarm] Already in ALARM"),
        }
        Ok(())
    }

    fn handle_deactivated_sensor(&self) -> Result<()> {
        if self.store.alarm_status() == AlarmStatus::PendingAlarm {
            self.record_alarm_status(AlarmStatus::NoAlarm)?;
        }
        Ok(())
    }

    fn cat_detected(&self, cat: bool) -> Result<()> {
        if cat && self.store.arming_status() == ArmingStatus::ArmedHome {
            info!("[Alarm] Cat detected while armed at home");
            self.record_alarm_status(AlarmStatus::Alarm)?;
        } else if !cat && self.all_sensors_inactive() {
            self.record_alarm_status(AlarmStatus::NoAlarm)?;
        }

        self.listeners.notify_cat_detected(cat);
        Ok(())
    }

    fn all_sensors_inactive(&self) -> bool {
        self.store.sensors().iter().all(|s| !s.is_active())
    }
}
