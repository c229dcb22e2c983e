//! Stand-in classifier for development without a vision backend.

use super::{CameraImage, ImageClassifier};
use crate::error::{Result, SecurityError};
use log::debug;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Answers "cat or no cat" at random.
///
/// The answer ignores the image content; only empty frames are rejected.
/// A seeded instance produces a repeatable sequence of answers.
pub struct FakeImageClassifier {
    rng: Mutex<StdRng>,
}

impl FakeImageClassifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for FakeImageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        if image.is_empty() {
            return Err(SecurityError::Classification(
                "empty camera frame".to_string(),
            ));
        }
        let confidence: f32 = self.rng.lock().gen_range(0.0..100.0);
        let cat = confidence >= confidence_threshold;
        debug!(
            "[Camera] Fake classification: confidence {:.1} vs threshold {:.1} -> {}",
            confidence, confidence_threshold, cat
        );
        Ok(cat)
    }
}
