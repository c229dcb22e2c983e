//! Sensor and camera simulation for testing.
//!
//! Feeds random sensor flips and camera frames into an [`AlarmController`]
//! so the state machine can be watched without real hardware.

use crate::error::Result;
use crate::image::CameraImage;
use crate::security::{AlarmController, Sensor};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// What a single simulation step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedEvent {
    SensorToggled { name: String, active: bool },
    CameraFrame { cat_detected: bool },
}

/// Spawn a task that feeds one random event per tick into the controller.
///
/// Stops after `max_events` events when given, otherwise runs until aborted.
/// Errors from the controller are logged and the simulation carries on.
///
/// # Returns
///
/// A `JoinHandle` that can be used to abort the simulation task.
pub fn run_security_simulation(
    controller: Arc<AlarmController>,
    period: Duration,
    seed: Option<u64>,
    max_events: Option<u64>,
) -> JoinHandle<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tokio::spawn(async move {
        let mut ticker = interval(period);
        let mut fed = 0u64;
        while max_events.is_none_or(|max| fed < max) {
            ticker.tick().await;
            match simulation_step(&controller, &mut rng) {
                Ok(SimulatedEvent::SensorToggled { name, active }) => {
                    info!(
                        "[Sim] Sensor '{}' -> {}",
                        name,
                        if active { "active" } else { "inactive" }
                    );
                }
                Ok(SimulatedEvent::CameraFrame { cat_detected }) => {
                    info!("[Sim] Camera frame processed, cat: {}", cat_detected);
                }
                Err(e) => warn!("[Sim] Simulation step failed: {}", e),
            }
            fed += 1;
        }
        info!("[Sim] Simulation finished after {} events", fed);
    })
}

/// Run one simulated event: usually a sensor flip, sometimes a camera frame.
///
/// With no sensors registered every step is a camera frame.
pub fn simulation_step(controller: &AlarmController, rng: &mut StdRng) -> Result<SimulatedEvent> {
    let mut sensors: Vec<Sensor> = controller.sensors().into_iter().collect();
    sensors.sort();

    if !sensors.is_empty() && rng.gen_bool(2.0 / 3.0) {
        if let Some(sensor) = sensors.choose_mut(rng) {
            let active = !sensor.is_active();
            controller.change_sensor_activation_status(sensor, active)?;
            return Ok(SimulatedEvent::SensorToggled {
                name: sensor.name().to_string(),
                active,
            });
        }
    }

    let shade = rng.r#gen::<u8>();
    let frame = CameraImage::filled(FRAME_WIDTH, FRAME_HEIGHT, [shade, shade, shade]);
    let cat_detected = controller.process_camera_image(&frame)?;
    Ok(SimulatedEvent::CameraFrame { cat_detected })
}
