//! Estimator configuration.
//!
//! Configuration is immutable once an estimator is built. It can be written
//! by hand or read from TOML:
//!
//! ```toml
//! strategy = "learned_model"
//! model_dir = "models"
//! face_input_size = 224
//!
//! [features]
//! skin_texture = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::features::Feature;

/// Which estimation strategy an estimator should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Landmark proportion heuristic.
    #[default]
    Landmarks,
    /// Learned regressor, if a model artifact can be loaded.
    LearnedModel,
}

/// Per-feature switches for the landmark heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub eye_spacing: bool,
    pub face_length: bool,
    pub jawline: bool,
    pub nose: bool,
    pub lips: bool,
    pub brow: bool,
    pub skin_texture: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            eye_spacing: true,
            face_length: true,
            jawline: true,
            nose: true,
            lips: true,
            brow: true,
            skin_texture: true,
        }
    }
}

impl FeatureToggles {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::EyeSpacing => self.eye_spacing,
            Feature::FaceLength => self.face_length,
            Feature::Jawline => self.jawline,
            Feature::Nose => self.nose,
            Feature::Lips => self.lips,
            Feature::Brow => self.brow,
            Feature::SkinTexture => self.skin_texture,
        }
    }

    /// Copy with one feature switched.
    #[must_use]
    pub fn with(mut self, feature: Feature, enabled: bool) -> Self {
        let slot = match feature {
            Feature::EyeSpacing => &mut self.eye_spacing,
            Feature::FaceLength => &mut self.face_length,
            Feature::Jawline => &mut self.jawline,
            Feature::Nose => &mut self.nose,
            Feature::Lips => &mut self.lips,
            Feature::Brow => &mut self.brow,
            Feature::SkinTexture => &mut self.skin_texture,
        };
        *slot = enabled;
        self
    }
}

/// Configuration for [`AgeEstimator`](crate::AgeEstimator).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Requested strategy. `LearnedModel` degrades to `Landmarks` when no
    /// model can be loaded.
    pub strategy: StrategyKind,

    /// Directory holding the bundled model artifact.
    pub model_dir: Option<PathBuf>,

    /// Side length the face crop is resized to. `None` keeps the crop as is.
    pub face_input_size: Option<u32>,

    /// Landmark heuristic feature switches.
    pub features: FeatureToggles,
}

impl EstimatorConfig {
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.model_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_face_input_size(mut self, size: u32) -> Self {
        self.face_input_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureToggles) -> Self {
        self.features = features;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded estimator config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Like [`EstimatorConfig::from_file`], but logs and falls back to the
    /// defaults when the file can't be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config file {}: {}; using defaults",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }
}
