use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::features::{Feature, FeatureVector};

/// File name the bundled model is looked up under.
pub const BUNDLED_MODEL_FILE: &str = "age_regressor.bin";

/// Number of model inputs, one per [`Feature`].
pub const NUM_INPUTS: usize = Feature::ALL.len();

/// A learned linear age regressor over landmark features.
///
/// Inputs are the unweighted feature contributions in [`Feature::ALL`]
/// order, with missing features fed as 0. The model also records its
/// validation RMSE in years, which is turned into a confidence proxy.
///
/// # Usage
///
/// ```
/// use face_age::{AgeRegressor, AgeRegressorBuilder, FeatureVector, BUNDLED_MODEL_FILE};
///
/// let dir = tempfile::tempdir()?;
/// AgeRegressorBuilder::new()
///     .bias(30.0)
///     .weights(vec![1.0; 7])
///     .rmse(10.0)
///     .build()?
///     .save(dir.path().join(BUNDLED_MODEL_FILE))?;
///
/// let model = AgeRegressor::load(dir.path().join(BUNDLED_MODEL_FILE))?;
/// let (age, confidence) = model.predict(&FeatureVector::default());
/// assert_eq!((age, confidence), (30.0, 0.5));
/// # Ok::<(), face_age::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeRegressor {
    /// Intercept, in years.
    bias: f32,

    /// One weight per input feature.
    weights: Vec<f32>,

    /// Root-mean-square error on held-out data, in years.
    rmse: f32,
}

impl AgeRegressor {
    /// Load a model from a binary file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let model: Self = bincode::deserialize(&bytes)?;
        model.validate()?;
        Ok(model)
    }

    /// Save the model to a binary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let bytes = bincode::serialize(self)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Load [`BUNDLED_MODEL_FILE`] from `dir`.
    ///
    /// A missing or unreadable model means "no model available": the failure
    /// is logged and `None` returned.
    pub fn load_bundled<P: AsRef<Path>>(dir: P) -> Option<Self> {
        let path = dir.as_ref().join(BUNDLED_MODEL_FILE);
        match Self::load(&path) {
            Ok(model) => {
                debug!("Loaded age model from {}", path.display());
                Some(model)
            }
            Err(e) => {
                warn!("Age model unavailable at {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn rmse(&self) -> f32 {
        self.rmse
    }

    /// Predict an age and a confidence in [0,1].
    ///
    /// Confidence is `1 / (1 + rmse / 10)`: a model that is typically off by
    /// ten years scores 0.5.
    pub fn predict(&self, features: &FeatureVector) -> (f32, f32) {
        let inputs = features.to_inputs();
        let age = self.bias
            + self
                .weights
                .iter()
                .zip(inputs.iter())
                .map(|(w, x)| w * x)
                .sum::<f32>();
        let confidence = (1.0 / (1.0 + self.rmse / 10.0)).clamp(0.0, 1.0);
        (age, confidence)
    }

    fn validate(&self) -> Result<()> {
        if self.weights.len() != NUM_INPUTS {
            return Err(Error::InvalidModel(format!(
                "expected {} weights, found {}",
                NUM_INPUTS,
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidModel("non-finite coefficient".into()));
        }
        if !self.rmse.is_finite() || self.rmse < 0.0 {
            return Err(Error::InvalidModel(format!("invalid rmse {}", self.rmse)));
        }
        Ok(())
    }
}

/// Builder for creating an AgeRegressor model.
pub struct AgeRegressorBuilder {
    bias: f32,
    weights: Option<Vec<f32>>,
    rmse: Option<f32>,
}

impl AgeRegressorBuilder {
    pub fn new() -> Self {
        Self {
            bias: 0.0,
            weights: None,
            rmse: None,
        }
    }

    pub fn bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    /// Set the feature weights, in [`Feature::ALL`] order.
    pub fn weights(mut self, weights: Vec<f32>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn rmse(mut self, rmse: f32) -> Self {
        self.rmse = Some(rmse);
        self
    }

    /// Build the AgeRegressor.
    pub fn build(self) -> Result<AgeRegressor> {
        let weights = self
            .weights
            .ok_or_else(|| Error::InvalidModel("Missing weights".into()))?;
        let rmse = self
            .rmse
            .ok_or_else(|| Error::InvalidModel("Missing rmse".into()))?;

        let model = AgeRegressor {
            bias: self.bias,
            weights,
            rmse,
        };
        model.validate()?;
        Ok(model)
    }
}

impl Default for AgeRegressorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
