//! # face-age
//!
//! Pure Rust heuristic facial age estimation from landmark geometry.
//!
//! This crate provides:
//! - **Landmark Regions**: named regions (eyes, brows, nose, lips, contour) as
//!   reported by a face detector, plus an adapter for 68-point iBUG shapes
//! - **Proportion Features**: eye spacing, face length, jawline angle, nose and
//!   lip proportions, brow position and a skin-texture proxy
//! - **Age Estimation**: weighted scoring into an age, a confidence and an age
//!   range, with an optional learned regressor
//!
//! ## Algorithm Overview
//!
//! 1. Measure each facial proportion whose regions are present
//! 2. Offset each measurement from its adult reference value and scale it
//! 3. Age = 30 + weighted sum of offsets, clamped to [5, 90]
//! 4. Confidence = mean of image quality and landmark completeness, floored at 0.3
//! 5. Age range = age ± (10 − 5 × confidence), rounded and clamped to [0, 100]
//!
//! Faces without landmarks get a quality-only fallback estimate at minimum
//! confidence. Estimation never fails; reliability is reported through
//! confidence and range width.
//!
//! ## Quick Start
//!
//! ```rust
//! use face_age::{
//!     AgeEstimator, BoundingBox, DetectedFace, EstimatorConfig, LandmarkRegion, LandmarkSet,
//!     Point,
//! };
//!
//! let landmarks = LandmarkSet::new()
//!     .with_region(LandmarkRegion::LeftEye, vec![Point::new(0.30, 0.40), Point::new(0.40, 0.40)])
//!     .with_region(LandmarkRegion::RightEye, vec![Point::new(0.60, 0.40), Point::new(0.70, 0.40)]);
//!
//! let face = DetectedFace::new(BoundingBox::new(0.2, 0.1, 0.5, 0.6))
//!     .with_landmarks(landmarks)
//!     .with_quality(0.8);
//!
//! let estimator = AgeEstimator::new(EstimatorConfig::default());
//! let result = estimator.estimate(&face);
//!
//! assert!((5.0..=90.0).contains(&result.estimated_age));
//! assert!(result.age_range_low <= result.age_range_high);
//! ```

mod config;
mod error;
mod estimator;
mod face;
pub mod features;
mod landmarks;
mod model;
mod result;
pub mod scoring;
mod types;

pub use config::{EstimatorConfig, FeatureToggles, StrategyKind};
pub use error::{Error, Result};
pub use estimator::{AgeEstimator, EstimationStrategy};
pub use face::DetectedFace;
pub use features::{Feature, FeatureVector};
pub use landmarks::{LandmarkRegion, LandmarkSet};
pub use model::{AgeRegressor, AgeRegressorBuilder, BUNDLED_MODEL_FILE};
pub use result::{AgeEstimationResult, EstimationPath};
pub use types::{BoundingBox, HeadPose, Point};
