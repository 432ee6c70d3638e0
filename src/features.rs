//! Facial proportion features measured from landmark regions.
//!
//! Each feature compares one facial proportion against a reference value
//! typical of an adult face and scales the offset into "years-ish" units.
//! Features whose regions are missing are `None`; the scoring step simply
//! leaves them out.

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkRegion, LandmarkSet};
use crate::types::Point;

/// Minimum denominator used wherever a ratio is formed.
pub const MIN_DENOMINATOR: f32 = 0.001;

/// Quality score assumed when the detector supplies none.
pub const DEFAULT_QUALITY: f32 = 0.5;

const REFERENCE_EYE_SPACING: f32 = 0.25;
const EYE_SPACING_SCALE: f32 = 100.0;

const REFERENCE_FACE_LENGTH: f32 = 0.4;
const FACE_LENGTH_SCALE: f32 = 50.0;

const JAWLINE_SCALE: f32 = 20.0;
/// Fewer contour points than this cannot give distinct chin and jaw points.
const MIN_CONTOUR_POINTS: usize = 3;

const REFERENCE_NOSE_SIZE: f32 = 0.15;
const NOSE_SCALE: f32 = 80.0;

const REFERENCE_LIP_RATIO: f32 = 0.7;
const LIP_SCALE: f32 = 40.0;

const REFERENCE_BROW_DISTANCE: f32 = 0.1;
const BROW_SCALE: f32 = 100.0;

const SKIN_TEXTURE_SCALE: f32 = 30.0;

/// Feature groups the heuristic scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    EyeSpacing,
    FaceLength,
    Jawline,
    Nose,
    Lips,
    Brow,
    SkinTexture,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::EyeSpacing,
        Feature::FaceLength,
        Feature::Jawline,
        Feature::Nose,
        Feature::Lips,
        Feature::Brow,
        Feature::SkinTexture,
    ];
}

/// Unweighted feature contributions for one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub eye_spacing: Option<f32>,
    pub face_length: Option<f32>,
    pub jawline: Option<f32>,
    pub nose: Option<f32>,
    pub lips: Option<f32>,
    pub brow: Option<f32>,
    pub skin_texture: f32,
}

impl FeatureVector {
    /// Measure every feature available in `landmarks`.
    ///
    /// `quality` must already be resolved (defaulted and clamped).
    pub fn extract(landmarks: &LandmarkSet, quality: f32) -> Self {
        Self {
            eye_spacing: eye_spacing(landmarks),
            face_length: face_length(landmarks),
            jawline: jawline_angle(landmarks),
            nose: nose_proportion(landmarks),
            lips: lip_proportion(landmarks),
            brow: brow_position(landmarks),
            skin_texture: skin_texture(quality),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<f32> {
        match feature {
            Feature::EyeSpacing => self.eye_spacing,
            Feature::FaceLength => self.face_length,
            Feature::Jawline => self.jawline,
            Feature::Nose => self.nose,
            Feature::Lips => self.lips,
            Feature::Brow => self.brow,
            Feature::SkinTexture => Some(self.skin_texture),
        }
    }

    /// Dense model input in [`Feature::ALL`] order, missing features as 0.
    pub fn to_inputs(&self) -> [f32; 7] {
        Feature::ALL.map(|f| self.get(f).unwrap_or(0.0))
    }
}

/// Average of a run of points. Caller guarantees `points` is non-empty.
pub fn centroid(points: &[Point]) -> Point {
    let sum = points.iter().fold(Point::zero(), |acc, p| acc + *p);
    sum * (1.0 / points.len() as f32)
}

/// Horizontal extent (max x - min x).
pub fn span_x(points: &[Point]) -> f32 {
    span(points.iter().map(|p| p.x))
}

/// Vertical extent (max y - min y).
pub fn span_y(points: &[Point]) -> f32 {
    span(points.iter().map(|p| p.y))
}

fn span(values: impl Iterator<Item = f32>) -> f32 {
    let (min, max) = values.fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        0.0
    } else {
        max - min
    }
}

/// Wider-set eyes read younger.
fn eye_spacing(landmarks: &LandmarkSet) -> Option<f32> {
    let left = centroid(landmarks.get(LandmarkRegion::LeftEye)?);
    let right = centroid(landmarks.get(LandmarkRegion::RightEye)?);
    let spacing = (right.x - left.x).abs();
    Some((spacing - REFERENCE_EYE_SPACING) * EYE_SPACING_SCALE)
}

fn face_length(landmarks: &LandmarkSet) -> Option<f32> {
    let contour = landmarks.get(LandmarkRegion::FaceContour)?;
    Some((span_y(contour) - REFERENCE_FACE_LENGTH) * FACE_LENGTH_SCALE)
}

/// Mean direction of the two chin-to-jaw segments of the contour, as signed
/// `atan2(dy, dx)` angles.
///
/// Chin, left jaw and right jaw are picked by proportional index (1/2, 1/4,
/// 3/4 of the contour). This assumes the detector's contour runs ear to ear
/// through the chin with a fixed point count; detectors that order or count
/// contour points differently will land on other points.
fn jawline_angle(landmarks: &LandmarkSet) -> Option<f32> {
    let contour = landmarks.get(LandmarkRegion::FaceContour)?;
    if contour.len() < MIN_CONTOUR_POINTS {
        return None;
    }

    let n = contour.len();
    let chin = contour[n / 2];
    let left_jaw = contour[n / 4];
    let right_jaw = contour[3 * n / 4];

    let angle_to = |jaw: Point| {
        let delta = jaw - chin;
        delta.y.atan2(delta.x)
    };

    let mean_angle = (angle_to(left_jaw) + angle_to(right_jaw)) / 2.0;
    Some(mean_angle * JAWLINE_SCALE)
}

fn nose_proportion(landmarks: &LandmarkSet) -> Option<f32> {
    let nose = landmarks.get(LandmarkRegion::Nose)?;
    let size = span_y(nose) + span_x(nose);
    Some((size - REFERENCE_NOSE_SIZE) * NOSE_SCALE)
}

/// Lips thin with age: the inner/outer height ratio drops.
fn lip_proportion(landmarks: &LandmarkSet) -> Option<f32> {
    let outer = landmarks.get(LandmarkRegion::OuterLips)?;
    let inner = landmarks.get(LandmarkRegion::InnerLips)?;
    let ratio = span_y(inner) / span_y(outer).max(MIN_DENOMINATOR);
    Some((REFERENCE_LIP_RATIO - ratio) * LIP_SCALE)
}

/// Brows sit lower over the eyes with age.
///
/// Averages over whichever side has both brow and eye.
fn brow_position(landmarks: &LandmarkSet) -> Option<f32> {
    let pairs = [
        (LandmarkRegion::LeftEyebrow, LandmarkRegion::LeftEye),
        (LandmarkRegion::RightEyebrow, LandmarkRegion::RightEye),
    ];

    let distances: Vec<f32> = pairs
        .iter()
        .filter_map(|(brow, eye)| {
            let brow = centroid(landmarks.get(*brow)?);
            let eye = centroid(landmarks.get(*eye)?);
            Some((eye.y - brow.y).abs())
        })
        .collect();

    if distances.is_empty() {
        return None;
    }

    let avg = distances.iter().sum::<f32>() / distances.len() as f32;
    Some((REFERENCE_BROW_DISTANCE - avg) * BROW_SCALE)
}

/// Proxy for skin texture: low image quality correlates with visible texture.
fn skin_texture(quality: f32) -> f32 {
    (1.0 - quality) * SKIN_TEXTURE_SCALE
}
