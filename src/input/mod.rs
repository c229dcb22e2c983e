//! Event sources feeding the alarm controller.

pub mod simulation;
