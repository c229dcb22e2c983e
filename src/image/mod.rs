//! Camera imagery and the cat classifier capability.
//!
//! The controller never looks at pixels itself. It hands each frame to an
//! [`ImageClassifier`] together with a confidence threshold and only acts on
//! the boolean answer.

pub mod fake;

pub use fake::FakeImageClassifier;

use crate::error::Result;

/// Default confidence (percent) a classifier must reach to report a cat.
pub const DEFAULT_CAT_CONFIDENCE: f32 = 50.0;

/// A single frame from the security camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    /// Packed RGB8 pixel data, row-major.
    pub pixels: Vec<u8>,
}

impl CameraImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Solid-color frame, handy for simulations and tests.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixel_count = width as usize * height as usize;
        let pixels = rgb.iter().copied().cycle().take(pixel_count * 3).collect();
        Self::new(width, height, pixels)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Decides whether a camera frame shows a cat.
pub trait ImageClassifier: Send + Sync {
    /// Returns `Ok(true)` if a cat is found with at least
    /// `confidence_threshold` percent confidence.
    ///
    /// Fails with [`SecurityError::Classification`](crate::error::SecurityError::Classification)
    /// when the backing service is unreachable or answers with garbage.
    fn contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool>;
}
