//! Named facial landmark regions.
//!
//! A face detector reports landmarks grouped into regions (eyes, brows, nose,
//! lips, contour). Every region has the same shape, an ordered run of points
//! in the detector's normalized coordinate space, so a [`LandmarkSet`] is just
//! a map from [`LandmarkRegion`] to points. A missing key means the detector
//! did not find that region.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Point};

/// Landmark regions a face detector may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkRegion {
    LeftEye,
    RightEye,
    Nose,
    NoseCrest,
    OuterLips,
    InnerLips,
    FaceContour,
    LeftEyebrow,
    RightEyebrow,
}

impl LandmarkRegion {
    pub const ALL: [LandmarkRegion; 9] = [
        LandmarkRegion::LeftEye,
        LandmarkRegion::RightEye,
        LandmarkRegion::Nose,
        LandmarkRegion::NoseCrest,
        LandmarkRegion::OuterLips,
        LandmarkRegion::InnerLips,
        LandmarkRegion::FaceContour,
        LandmarkRegion::LeftEyebrow,
        LandmarkRegion::RightEyebrow,
    ];

    /// Regions counted towards landmark completeness.
    pub const REQUIRED: [LandmarkRegion; 5] = [
        LandmarkRegion::LeftEye,
        LandmarkRegion::RightEye,
        LandmarkRegion::Nose,
        LandmarkRegion::OuterLips,
        LandmarkRegion::FaceContour,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkRegion::LeftEye => "left_eye",
            LandmarkRegion::RightEye => "right_eye",
            LandmarkRegion::Nose => "nose",
            LandmarkRegion::NoseCrest => "nose_crest",
            LandmarkRegion::OuterLips => "outer_lips",
            LandmarkRegion::InnerLips => "inner_lips",
            LandmarkRegion::FaceContour => "face_contour",
            LandmarkRegion::LeftEyebrow => "left_eyebrow",
            LandmarkRegion::RightEyebrow => "right_eyebrow",
        }
    }
}

impl std::fmt::Display for LandmarkRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of named landmark regions for one face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    regions: BTreeMap<LandmarkRegion, Vec<Point>>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region, replacing any previous points for it.
    ///
    /// An empty point run is treated as "not detected" and removes the region.
    pub fn insert(&mut self, region: LandmarkRegion, points: Vec<Point>) {
        if points.is_empty() {
            self.regions.remove(&region);
        } else {
            self.regions.insert(region, points);
        }
    }

    /// Builder-style variant of [`LandmarkSet::insert`].
    pub fn with_region(mut self, region: LandmarkRegion, points: Vec<Point>) -> Self {
        self.insert(region, points);
        self
    }

    pub fn remove(&mut self, region: LandmarkRegion) -> Option<Vec<Point>> {
        self.regions.remove(&region)
    }

    /// Points of a region, `None` if absent or empty.
    pub fn get(&self, region: LandmarkRegion) -> Option<&[Point]> {
        self.regions
            .get(&region)
            .map(Vec::as_slice)
            .filter(|points| !points.is_empty())
    }

    pub fn contains(&self, region: LandmarkRegion) -> bool {
        self.get(region).is_some()
    }

    /// True if no region holds any point.
    pub fn is_empty(&self) -> bool {
        self.regions.values().all(Vec::is_empty)
    }

    /// Number of regions present.
    pub fn len(&self) -> usize {
        self.regions.values().filter(|p| !p.is_empty()).count()
    }

    pub fn regions(&self) -> impl Iterator<Item = (LandmarkRegion, &[Point])> {
        self.regions
            .iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(region, points)| (*region, points.as_slice()))
    }

    /// Fraction of [`LandmarkRegion::REQUIRED`] regions present, in [0,1].
    pub fn completeness(&self) -> f32 {
        let present = LandmarkRegion::REQUIRED
            .iter()
            .filter(|r| self.contains(**r))
            .count();
        present as f32 / LandmarkRegion::REQUIRED.len() as f32
    }

    /// Group a 68-point iBUG shape into named regions.
    ///
    /// `points` are image coordinates, as emitted by ERT shape predictors;
    /// they are normalized to `face_box` so the result lives in the same
    /// face-relative space the estimator's reference values assume. Shapes
    /// with extra points (e.g. 81-point models with forehead landmarks) use
    /// only the first 68. Returns `None` if fewer than 68 points are given.
    pub fn from_ibug68(points: &[Point], face_box: &BoundingBox) -> Option<Self> {
        if points.len() < 68 {
            return None;
        }

        let normalized = |range: std::ops::RangeInclusive<usize>| -> Vec<Point> {
            points[range]
                .iter()
                .map(|p| face_box.normalize_point(*p))
                .collect()
        };

        // Subject's right side is image-left in the iBUG layout
        let set = Self::new()
            .with_region(LandmarkRegion::FaceContour, normalized(0..=16))
            .with_region(LandmarkRegion::RightEyebrow, normalized(17..=21))
            .with_region(LandmarkRegion::LeftEyebrow, normalized(22..=26))
            .with_region(LandmarkRegion::NoseCrest, normalized(27..=30))
            .with_region(LandmarkRegion::Nose, normalized(30..=35))
            .with_region(LandmarkRegion::RightEye, normalized(36..=41))
            .with_region(LandmarkRegion::LeftEye, normalized(42..=47))
            .with_region(LandmarkRegion::OuterLips, normalized(48..=59))
            .with_region(LandmarkRegion::InnerLips, normalized(60..=67));

        Some(set)
    }
}

impl FromIterator<(LandmarkRegion, Vec<Point>)> for LandmarkSet {
    fn from_iter<T: IntoIterator<Item = (LandmarkRegion, Vec<Point>)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (region, points) in iter {
            set.insert(region, points);
        }
        set
    }
}
