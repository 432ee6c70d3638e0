use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Which path produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationPath {
    /// Landmark proportion heuristic.
    Landmarks,
    /// Learned regressor.
    LearnedModel,
    /// No landmarks: quality-only guess with a wide range.
    Fallback,
}

/// Outcome of one age estimation.
///
/// Reliability is carried by `confidence` and the width of the age range;
/// there is no failure case.
#[derive(Debug, Clone)]
pub struct AgeEstimationResult {
    /// Estimated age in years, in [5, 90].
    pub estimated_age: f32,

    /// Confidence in [0.3, 1.0].
    pub confidence: f32,

    /// Lower end of the age range, in [0, 100].
    pub age_range_low: u32,

    /// Upper end of the age range, in [0, 100].
    pub age_range_high: u32,

    /// Face region the estimate was made for, when an image was supplied.
    pub face_image: Option<Arc<DynamicImage>>,

    pub processing_time: Duration,

    pub path: EstimationPath,
}

impl AgeEstimationResult {
    pub fn age_range(&self) -> std::ops::RangeInclusive<u32> {
        self.age_range_low..=self.age_range_high
    }

    /// Age rounded to whole years, for display.
    pub fn rounded_age(&self) -> u32 {
        self.estimated_age.round() as u32
    }

    pub fn is_fallback(&self) -> bool {
        self.path == EstimationPath::Fallback
    }
}
