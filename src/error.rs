use thiserror::Error as ThisError;
use uuid::Uuid;

#[derive(ThisError, Debug)]
pub enum SecurityError {
    #[error("Image classification failed: {0}")]
    Classification(String),

    #[error("Unknown sensor: {0}")]
    UnknownSensor(Uuid),

    #[error("Invalid arming status: {0}")]
    InvalidArmingStatus(String),

    #[error("Invalid alarm status: {0}")]
    InvalidAlarmStatus(String),

    #[error("Invalid sensor type: {0}")]
    InvalidSensorType(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SecurityError>;
