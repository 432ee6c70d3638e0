//! Turning features into an age, a confidence and an age range.

use crate::config::FeatureToggles;
use crate::features::{Feature, FeatureVector};

/// Age every estimate starts from before feature offsets are added.
pub const BASE_AGE: f32 = 30.0;
pub const MIN_AGE: f32 = 5.0;
pub const MAX_AGE: f32 = 90.0;

/// Lowest confidence any estimate reports.
pub const MIN_CONFIDENCE: f32 = 0.3;
/// Confidence reported when no landmarks were available.
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

const FALLBACK_QUALITY_SCALE: f32 = 15.0;
const FALLBACK_MARGIN: f32 = 15.0;

const MAX_MARGIN: f32 = 10.0;
const MARGIN_CONFIDENCE_SCALE: f32 = 5.0;

const RANGE_MIN: f32 = 0.0;
const RANGE_MAX: f32 = 100.0;

/// Weight of each feature in the age sum. Eye spacing is negative: wider
/// spacing reads younger.
pub fn weight(feature: Feature) -> f32 {
    match feature {
        Feature::EyeSpacing => -0.15,
        Feature::FaceLength => 0.12,
        Feature::Jawline => 0.18,
        Feature::Nose => 0.10,
        Feature::Lips => 0.07,
        Feature::Brow => 0.08,
        Feature::SkinTexture => 0.25,
    }
}

/// Weighted sum of the enabled, available features.
pub fn age_modifier(features: &FeatureVector, toggles: &FeatureToggles) -> f32 {
    Feature::ALL
        .iter()
        .filter(|f| toggles.is_enabled(**f))
        .filter_map(|f| features.get(*f).map(|value| value * weight(*f)))
        .sum()
}

/// Base age plus modifier, clamped to the supported age span.
pub fn landmark_age(modifier: f32) -> f32 {
    clamp_age(BASE_AGE + modifier)
}

pub fn clamp_age(age: f32) -> f32 {
    if age.is_nan() {
        return BASE_AGE;
    }
    age.clamp(MIN_AGE, MAX_AGE)
}

/// Mean of image quality and landmark completeness, floored at
/// [`MIN_CONFIDENCE`].
pub fn landmark_confidence(quality: f32, completeness: f32) -> f32 {
    clamp_confidence((quality + completeness) / 2.0)
}

pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        return MIN_CONFIDENCE;
    }
    confidence.clamp(MIN_CONFIDENCE, 1.0)
}

/// Half-width of the age range: 10 years at zero confidence, 5 at full.
pub fn range_margin(confidence: f32) -> f32 {
    MAX_MARGIN - confidence * MARGIN_CONFIDENCE_SCALE
}

/// Integer age range `age ± margin`, each end rounded and clamped to [0,100].
pub fn age_range(age: f32, margin: f32) -> (u32, u32) {
    let low = (age - margin).round().clamp(RANGE_MIN, RANGE_MAX);
    let high = (age + margin).round().clamp(RANGE_MIN, RANGE_MAX);
    (low as u32, high as u32)
}

/// Age, confidence and range when no landmarks are available.
pub fn fallback(quality: f32) -> (f32, f32, (u32, u32)) {
    let age = BASE_AGE + (1.0 - quality) * FALLBACK_QUALITY_SCALE;
    (age, FALLBACK_CONFIDENCE, age_range(age, FALLBACK_MARGIN))
}
