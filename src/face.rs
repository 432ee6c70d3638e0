use serde::{Deserialize, Serialize};

use crate::features::DEFAULT_QUALITY;
use crate::landmarks::LandmarkSet;
use crate::types::{BoundingBox, HeadPose};

/// A face as reported by an upstream face detector.
///
/// The bounding box is normalized to the image; landmark points are in the
/// detector's own normalized space and are used as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounding_box: BoundingBox,

    /// Detector confidence in [0,1].
    #[serde(default = "full_confidence")]
    pub confidence: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<LandmarkSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<HeadPose>,

    /// Image quality score in [0,1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
}

fn full_confidence() -> f32 {
    1.0
}

impl DetectedFace {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            confidence: 1.0,
            landmarks: None,
            pose: None,
            quality: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_landmarks(mut self, landmarks: LandmarkSet) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn with_pose(mut self, pose: HeadPose) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Landmarks, if any region holds points.
    pub fn usable_landmarks(&self) -> Option<&LandmarkSet> {
        self.landmarks.as_ref().filter(|set| !set.is_empty())
    }

    /// Quality score to score with: clamped to [0,1], defaulting when absent
    /// or not a number.
    pub fn resolved_quality(&self) -> f32 {
        match self.quality {
            Some(q) if q.is_finite() => q.clamp(0.0, 1.0),
            _ => DEFAULT_QUALITY,
        }
    }
}
