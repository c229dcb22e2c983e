//! Status listeners for alarm and camera updates.
//!
//! The controller keeps only weak references to listeners: registering a
//! listener never extends its lifetime, and a dropped listener simply stops
//! receiving updates.

use super::types::AlarmStatus;
use log::info;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Receives updates from the [`AlarmController`](super::AlarmController).
///
/// Callbacks run synchronously while the controller holds its operation
/// lock. They must return promptly and must not call back into the
/// controller's mutating operations.
pub trait StatusListener: Send + Sync {
    /// The alarm status actually recorded by the controller.
    fn on_alarm_status_changed(&self, status: AlarmStatus);

    /// Raw result of the latest camera image classification.
    fn on_cat_detected(&self, cat_detected: bool);

    /// A sensor's activation state was persisted.
    fn on_sensor_status_changed(&self) {}
}

/// Set of registered listeners keyed by pointer identity.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Weak<dyn StatusListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Adding the same listener twice is a no-op.
    pub fn add(&self, listener: &Arc<dyn StatusListener>) {
        let weak = Arc::downgrade(listener);
        let mut listeners = self.listeners.write();
        if !listeners.iter().any(|l| Weak::ptr_eq(l, &weak)) {
            listeners.push(weak);
        }
    }

    /// Unregister a listener. Unknown listeners are ignored.
    pub fn remove(&self, listener: &Arc<dyn StatusListener>) {
        let weak = Arc::downgrade(listener);
        self.listeners.write().retain(|l| !Weak::ptr_eq(l, &weak));
    }

    /// Number of registered listeners that are still alive.
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_alarm_status(&self, status: AlarmStatus) {
        for listener in self.snapshot() {
            listener.on_alarm_status_changed(status);
        }
    }

    pub fn notify_cat_detected(&self, cat_detected: bool) {
        for listener in self.snapshot() {
            listener.on_cat_detected(cat_detected);
        }
    }

    pub fn notify_sensor_status(&self) {
        for listener in self.snapshot() {
            listener.on_sensor_status_changed();
        }
    }

    /// Upgrade the live listeners in registration order and prune dead ones.
    ///
    /// The returned list is detached from the registry, so a callback that
    /// adds or removes listeners does not disturb the current fan-out.
    fn snapshot(&self) -> Vec<Arc<dyn StatusListener>> {
        let mut listeners = self.listeners.write();
        listeners.retain(|l| l.strong_count() > 0);
        listeners.iter().filter_map(Weak::upgrade).collect()
    }
}

/// Listener that writes every update to the log.
pub struct LoggingListener;

impl StatusListener for LoggingListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        info!("[Listener] Alarm status: {}", status);
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        if cat_detected {
            info!("[Listener] Camera: cat detected");
        } else {
            info!("[Listener] Camera: no cat");
        }
    }

    fn on_sensor_status_changed(&self) {
        info!("[Listener] Sensor status changed");
    }
}
