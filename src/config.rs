use crate::image::DEFAULT_CAT_CONFIDENCE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from a .env file.
/// Values may contain spaces without quotes; existing variables win.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            // SAFETY: runs once during startup, before any task reads the environment
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split .env content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let mut value = value.trim();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            Some((key.trim(), value))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub camera: CameraConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Explicit state file; `None` means the platform data directory.
    pub state_file: Option<PathBuf>,
    /// Keep state in memory only (nothing survives a restart).
    pub in_memory: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub interval_secs: u64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                state_file: None,
                in_memory: false,
            },
            camera: CameraConfig {
                confidence_threshold: DEFAULT_CAT_CONFIDENCE,
            },
            simulation: SimulationConfig {
                interval_secs: 5,
                seed: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("SECURITY_STATE_FILE") {
            config.store.state_file = Some(PathBuf::from(path));
        }
        if let Some(in_memory) = lookup("SECURITY_IN_MEMORY")
            && let Ok(flag) = in_memory.parse()
        {
            config.store.in_memory = flag;
        }
        if let Some(confidence) = lookup("SECURITY_CAT_CONFIDENCE")
            && let Ok(c) = confidence.parse()
        {
            config.camera.confidence_threshold = c;
        }

        // Simulation
        if let Some(interval) = lookup("SECURITY_SIMULATION_INTERVAL_SECS")
            && let Ok(i) = interval.parse()
        {
            config.simulation.interval_secs = i;
        }
        if let Some(seed) = lookup("SECURITY_SIMULATION_SEED")
            && let Ok(s) = seed.parse()
        {
            config.simulation.seed = Some(s);
        }

        config
    }
}
