//! The age estimator.

use std::sync::Arc;
use std::time::Instant;

use image::imageops::FilterType;
use image::DynamicImage;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::config::{EstimatorConfig, StrategyKind};
use crate::face::DetectedFace;
use crate::features::FeatureVector;
use crate::landmarks::LandmarkSet;
use crate::model::AgeRegressor;
use crate::result::{AgeEstimationResult, EstimationPath};
use crate::scoring;

/// How ages are estimated from landmarks. Chosen once when the estimator is
/// built.
#[derive(Debug, Clone)]
pub enum EstimationStrategy {
    /// Weighted facial proportion heuristic.
    Landmarks,
    /// Learned regressor over the same features. Shared read-only.
    LearnedModel(Arc<AgeRegressor>),
}

impl EstimationStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            EstimationStrategy::Landmarks => StrategyKind::Landmarks,
            EstimationStrategy::LearnedModel(_) => StrategyKind::LearnedModel,
        }
    }
}

/// Estimates age from detected faces.
///
/// Estimation never fails: a face without landmarks gets a quality-only
/// fallback estimate at minimum confidence. The estimator holds no mutable
/// state and can be shared across threads.
///
/// # Usage
///
/// ```
/// use face_age::{AgeEstimator, BoundingBox, DetectedFace, EstimatorConfig};
///
/// let estimator = AgeEstimator::new(EstimatorConfig::default());
/// let face = DetectedFace::new(BoundingBox::new(0.2, 0.1, 0.5, 0.6)).with_quality(1.0);
///
/// // No landmarks: quality-only fallback
/// let result = estimator.estimate(&face);
/// assert!(result.is_fallback());
/// assert_eq!((result.age_range_low, result.age_range_high), (15, 45));
/// ```
#[derive(Debug, Clone)]
pub struct AgeEstimator {
    config: EstimatorConfig,
    strategy: EstimationStrategy,
}

impl Default for AgeEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl AgeEstimator {
    /// Build an estimator from config.
    ///
    /// If the config asks for the learned model, the bundled model is loaded
    /// from `model_dir`. Any load failure falls back to the landmark
    /// heuristic.
    pub fn new(config: EstimatorConfig) -> Self {
        let model = match config.strategy {
            StrategyKind::Landmarks => None,
            StrategyKind::LearnedModel => match config.model_dir.as_deref() {
                Some(dir) => AgeRegressor::load_bundled(dir).map(Arc::new),
                None => {
                    warn!("Learned model requested but no model directory configured");
                    None
                }
            },
        };
        Self::assemble(config, model)
    }

    /// Build an estimator around an already loaded model.
    pub fn with_model(config: EstimatorConfig, model: Arc<AgeRegressor>) -> Self {
        let config = config.with_strategy(StrategyKind::LearnedModel);
        Self::assemble(config, Some(model))
    }

    fn assemble(config: EstimatorConfig, model: Option<Arc<AgeRegressor>>) -> Self {
        let strategy = match (config.strategy, model) {
            (StrategyKind::LearnedModel, Some(model)) => EstimationStrategy::LearnedModel(model),
            (StrategyKind::LearnedModel, None) => {
                warn!("No age model available, using landmark heuristic");
                EstimationStrategy::Landmarks
            }
            (StrategyKind::Landmarks, _) => EstimationStrategy::Landmarks,
        };
        debug!(strategy = ?strategy.kind(), "Age estimator ready");
        Self { config, strategy }
    }

    /// New estimator with `config`, keeping the loaded model when the new
    /// config still asks for it. Use this instead of mutating settings.
    pub fn reconfigure(&self, config: EstimatorConfig) -> Self {
        match (&self.strategy, config.strategy) {
            (EstimationStrategy::LearnedModel(model), StrategyKind::LearnedModel)
                if config.model_dir == self.config.model_dir =>
            {
                Self::assemble(config, Some(Arc::clone(model)))
            }
            _ => Self::new(config),
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn strategy(&self) -> &EstimationStrategy {
        &self.strategy
    }

    /// Estimate the age of one face.
    pub fn estimate(&self, face: &DetectedFace) -> AgeEstimationResult {
        let start = Instant::now();
        let quality = face.resolved_quality();

        let (estimated_age, confidence, (low, high), path) = match face.usable_landmarks() {
            Some(landmarks) => self.estimate_from_landmarks(landmarks, quality),
            None => {
                let (age, confidence, range) = scoring::fallback(quality);
                (age, confidence, range, EstimationPath::Fallback)
            }
        };

        let result = AgeEstimationResult {
            estimated_age,
            confidence,
            age_range_low: low,
            age_range_high: high,
            face_image: None,
            processing_time: start.elapsed(),
            path,
        };
        trace!(
            age = result.estimated_age,
            confidence = result.confidence,
            low = result.age_range_low,
            high = result.age_range_high,
            path = ?result.path,
            "Estimated age"
        );
        result
    }

    /// Estimate the age of a face and attach its crop from `image`.
    ///
    /// The crop is resized to a square of `face_input_size` when configured.
    pub fn estimate_in_image(&self, face: &DetectedFace, image: &DynamicImage) -> AgeEstimationResult {
        let start = Instant::now();
        let crop = self.crop_face(face, image);
        let mut result = self.estimate(face);
        result.face_image = Some(Arc::new(crop));
        result.processing_time = start.elapsed();
        result
    }

    /// Estimate every face of one frame in parallel. Output order matches
    /// input order.
    pub fn estimate_batch(&self, faces: &[DetectedFace]) -> Vec<AgeEstimationResult> {
        faces.par_iter().map(|face| self.estimate(face)).collect()
    }

    /// Like [`AgeEstimator::estimate_batch`], with crops from `image`.
    pub fn estimate_batch_in_image(
        &self,
        faces: &[DetectedFace],
        image: &DynamicImage,
    ) -> Vec<AgeEstimationResult> {
        faces
            .par_iter()
            .map(|face| self.estimate_in_image(face, image))
            .collect()
    }

    fn estimate_from_landmarks(
        &self,
        landmarks: &LandmarkSet,
        quality: f32,
    ) -> (f32, f32, (u32, u32), EstimationPath) {
        let features = FeatureVector::extract(landmarks, quality);

        let (age, confidence, path) = match &self.strategy {
            EstimationStrategy::Landmarks => {
                let modifier = scoring::age_modifier(&features, &self.config.features);
                let age = scoring::landmark_age(modifier);
                let confidence = scoring::landmark_confidence(quality, landmarks.completeness());
                (age, confidence, EstimationPath::Landmarks)
            }
            EstimationStrategy::LearnedModel(model) => {
                let (age, confidence) = model.predict(&features);
                (
                    scoring::clamp_age(age),
                    scoring::clamp_confidence(confidence),
                    EstimationPath::LearnedModel,
                )
            }
        };

        let range = scoring::age_range(age, scoring::range_margin(confidence));
        (age, confidence, range, path)
    }

    fn crop_face(&self, face: &DetectedFace, image: &DynamicImage) -> DynamicImage {
        let (x, y, w, h) = face
            .bounding_box
            .to_pixel_rect(image.width(), image.height());
        let crop = image.crop_imm(x, y, w, h);
        match self.config.face_input_size {
            Some(size) if size > 0 => crop.resize_exact(size, size, FilterType::Triangle),
            _ => crop,
        }
    }
}
