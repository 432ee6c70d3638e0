//! Integration tests for age estimation behaviour across the public API.

use face_age::{
    AgeEstimationResult, AgeEstimator, AgeRegressorBuilder, BoundingBox, DetectedFace,
    EstimationPath, EstimatorConfig, LandmarkRegion, LandmarkSet, Point, StrategyKind,
    BUNDLED_MODEL_FILE,
};

fn bbox() -> BoundingBox {
    BoundingBox::new(0.2, 0.1, 0.5, 0.6)
}

fn pts(coords: &[(f32, f32)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// A face whose proportions sit at the heuristic's reference values, inside
/// a square contour.
fn reference_landmarks(eye_spacing: f32) -> LandmarkSet {
    let half = eye_spacing / 2.0;
    LandmarkSet::new()
        .with_region(
            LandmarkRegion::LeftEye,
            pts(&[(0.475 - half, 0.4), (0.525 - half, 0.4)]),
        )
        .with_region(
            LandmarkRegion::RightEye,
            pts(&[(0.475 + half, 0.4), (0.525 + half, 0.4)]),
        )
        .with_region(
            LandmarkRegion::FaceContour,
            pts(&[(0.3, 0.3), (0.7, 0.3), (0.7, 0.7), (0.3, 0.7)]),
        )
        .with_region(LandmarkRegion::Nose, pts(&[(0.45, 0.5), (0.55, 0.5), (0.5, 0.55)]))
        .with_region(LandmarkRegion::OuterLips, pts(&[(0.4, 0.65), (0.6, 0.75)]))
        .with_region(LandmarkRegion::InnerLips, pts(&[(0.45, 0.68), (0.55, 0.75)]))
        .with_region(
            LandmarkRegion::LeftEyebrow,
            pts(&[(0.475 - half, 0.3), (0.525 - half, 0.3)]),
        )
        .with_region(
            LandmarkRegion::RightEyebrow,
            pts(&[(0.475 + half, 0.3), (0.525 + half, 0.3)]),
        )
}

/// 68-point iBUG mean face in [0,1] face coordinates.
fn mean_face_68() -> Vec<Point> {
    pts(&[
        // Jaw line (0-16)
        (0.10, 0.35), (0.11, 0.45), (0.12, 0.55), (0.14, 0.65), (0.18, 0.73), (0.24, 0.80),
        (0.32, 0.85), (0.41, 0.88), (0.50, 0.89), (0.59, 0.88), (0.68, 0.85), (0.76, 0.80),
        (0.82, 0.73), (0.86, 0.65), (0.88, 0.55), (0.89, 0.45), (0.90, 0.35),
        // Brows (17-26)
        (0.20, 0.26), (0.25, 0.22), (0.32, 0.21), (0.38, 0.23), (0.43, 0.27),
        (0.57, 0.27), (0.62, 0.23), (0.68, 0.21), (0.75, 0.22), (0.80, 0.26),
        // Nose (27-35)
        (0.50, 0.32), (0.50, 0.40), (0.50, 0.48), (0.50, 0.55),
        (0.40, 0.58), (0.45, 0.60), (0.50, 0.62), (0.55, 0.60), (0.60, 0.58),
        // Eyes (36-47)
        (0.24, 0.32), (0.28, 0.29), (0.34, 0.29), (0.38, 0.33), (0.34, 0.35), (0.28, 0.35),
        (0.62, 0.33), (0.66, 0.29), (0.72, 0.29), (0.76, 0.32), (0.72, 0.35), (0.66, 0.35),
        // Outer lip (48-59)
        (0.32, 0.72), (0.38, 0.68), (0.44, 0.66), (0.50, 0.67), (0.56, 0.66), (0.62, 0.68),
        (0.68, 0.72), (0.62, 0.78), (0.56, 0.80), (0.50, 0.81), (0.44, 0.80), (0.38, 0.78),
        // Inner lip (60-67)
        (0.36, 0.72), (0.44, 0.70), (0.50, 0.70), (0.56, 0.70), (0.64, 0.72), (0.56, 0.74),
        (0.50, 0.75), (0.44, 0.74),
    ])
}

/// Deterministic pseudo-random generator for input sweeps.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / (1u64 << 24) as f32
    }

    /// Value in [lo, hi).
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }
}

fn random_face(rng: &mut Lcg) -> DetectedFace {
    let mut set = LandmarkSet::new();
    for region in LandmarkRegion::ALL {
        if rng.next_f32() < 0.25 {
            continue;
        }
        let n = 1 + (rng.next_f32() * 20.0) as usize;
        // Deliberately allow coordinates well outside [0,1]
        let points = (0..n)
            .map(|_| Point::new(rng.range(-2.0, 3.0), rng.range(-2.0, 3.0)))
            .collect();
        set.insert(region, points);
    }

    let mut face = DetectedFace::new(bbox()).with_landmarks(set);
    if rng.next_f32() < 0.8 {
        face = face.with_quality(rng.range(-0.5, 1.5));
    }
    face
}

fn assert_invariants(result: &AgeEstimationResult) {
    assert!(
        (5.0..=90.0).contains(&result.estimated_age),
        "age {} out of bounds",
        result.estimated_age
    );
    assert!(
        (0.3..=1.0).contains(&result.confidence),
        "confidence {} out of bounds",
        result.confidence
    );
    assert!(result.age_range_low <= 100);
    assert!(result.age_range_high <= 100);
    assert!(result.age_range_low <= result.age_range_high);
}

#[test]
fn invariants_hold_for_arbitrary_landmarks() {
    let estimator = AgeEstimator::default();
    let mut rng = Lcg(42);
    for _ in 0..2000 {
        let face = random_face(&mut rng);
        assert_invariants(&estimator.estimate(&face));
    }
}

#[test]
fn invariants_hold_without_landmarks() {
    let estimator = AgeEstimator::default();
    for q in [-1.0, 0.0, 0.25, 0.5, 0.75, 1.0, 2.0, f32::NAN, f32::INFINITY] {
        let face = DetectedFace::new(bbox()).with_quality(q);
        assert_invariants(&estimator.estimate(&face));
    }
    assert_invariants(&estimator.estimate(&DetectedFace::new(bbox())));
}

#[test]
fn fallback_with_perfect_quality() {
    let face = DetectedFace::new(bbox()).with_quality(1.0);
    let result = AgeEstimator::default().estimate(&face);
    assert_eq!(result.path, EstimationPath::Fallback);
    assert_eq!(result.estimated_age, 30.0);
    assert_eq!(result.confidence, 0.3);
    assert_eq!((result.age_range_low, result.age_range_high), (15, 45));
}

#[test]
fn fallback_with_zero_quality() {
    let face = DetectedFace::new(bbox()).with_quality(0.0);
    let result = AgeEstimator::default().estimate(&face);
    assert_eq!(result.estimated_age, 45.0);
    assert_eq!(result.confidence, 0.3);
    assert_eq!((result.age_range_low, result.age_range_high), (30, 60));
}

#[test]
fn empty_landmark_set_takes_fallback() {
    let face = DetectedFace::new(bbox())
        .with_landmarks(LandmarkSet::new())
        .with_quality(1.0);
    assert!(AgeEstimator::default().estimate(&face).is_fallback());
}

#[test]
fn landmark_path_is_deterministic() {
    let estimator = AgeEstimator::default();
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let face = random_face(&mut rng);
        let a = estimator.estimate(&face);
        let b = estimator.estimate(&face.clone());
        assert_eq!(a.estimated_age.to_bits(), b.estimated_age.to_bits());
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
        assert_eq!(a.age_range(), b.age_range());
        assert_eq!(a.path, b.path);
    }
}

#[test]
fn complete_landmarks_with_perfect_quality_give_full_confidence() {
    let face = DetectedFace::new(bbox())
        .with_landmarks(reference_landmarks(0.25))
        .with_quality(1.0);
    let result = AgeEstimator::default().estimate(&face);
    assert_eq!(result.path, EstimationPath::Landmarks);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn wider_eye_spacing_reads_younger() {
    let estimator = AgeEstimator::default();
    let ages: Vec<f32> = [0.15, 0.2, 0.25, 0.3, 0.35]
        .iter()
        .map(|&spacing| {
            let face = DetectedFace::new(bbox())
                .with_landmarks(reference_landmarks(spacing))
                .with_quality(0.9);
            estimator.estimate(&face).estimated_age
        })
        .collect();

    for pair in ages.windows(2) {
        assert!(pair[1] < pair[0], "ages not strictly decreasing: {:?}", ages);
    }
}

#[test]
fn reference_proportions_stay_near_base_age() {
    let face = DetectedFace::new(bbox())
        .with_landmarks(reference_landmarks(0.25))
        .with_quality(1.0);
    let result = AgeEstimator::default().estimate(&face);

    // Every proportion sits at its reference except the jaw angle. The chin is
    // the bottom-right corner: the left jaw point lies straight above it
    // (-pi/2), the right one straight to its left (pi).
    let jaw = (-std::f32::consts::FRAC_PI_2 + std::f32::consts::PI) / 2.0 * 20.0;
    let expected = 30.0 + jaw * 0.18;
    assert!((result.estimated_age - 30.0).abs() < 5.0);
    assert!((result.estimated_age - expected).abs() < 0.01);
    assert_eq!((result.age_range_low, result.age_range_high), (28, 38));
}

#[test]
fn missing_regions_are_skipped() {
    let mut landmarks = reference_landmarks(0.25);
    landmarks.remove(LandmarkRegion::FaceContour);
    landmarks.remove(LandmarkRegion::InnerLips);

    let face = DetectedFace::new(bbox())
        .with_landmarks(landmarks)
        .with_quality(1.0);
    let result = AgeEstimator::default().estimate(&face);

    // Everything left sits at its reference value
    assert!((result.estimated_age - 30.0).abs() < 0.01);
    // (1.0 + 4/5) / 2
    assert!((result.confidence - 0.9).abs() < 1e-6);
}

#[test]
fn ibug_shape_feeds_the_estimator() {
    let face_box = BoundingBox::new(100.0, 50.0, 200.0, 200.0);
    let shape: Vec<Point> = mean_face_68()
        .into_iter()
        .map(|p| face_box.denormalize_point(p))
        .collect();
    let landmarks = LandmarkSet::from_ibug68(&shape, &face_box).unwrap();

    let face = DetectedFace::new(bbox())
        .with_landmarks(landmarks)
        .with_quality(1.0);
    let result = AgeEstimator::default().estimate(&face);

    assert_eq!(result.path, EstimationPath::Landmarks);
    assert_eq!(result.confidence, 1.0);
    // The symmetric mean contour averages to a jaw angle of -pi/2, pulling
    // about 5.7 years off the sum of the other features.
    assert!((result.estimated_age - 25.35).abs() < 0.01);
    assert_eq!((result.age_range_low, result.age_range_high), (20, 30));
}

#[test]
fn bundled_model_is_picked_up_from_config() {
    let dir = tempfile::tempdir().unwrap();
    AgeRegressorBuilder::new()
        .bias(50.0)
        .weights(vec![0.0; 7])
        .rmse(10.0)
        .build()
        .unwrap()
        .save(dir.path().join(BUNDLED_MODEL_FILE))
        .unwrap();

    let config = EstimatorConfig::default()
        .with_strategy(StrategyKind::LearnedModel)
        .with_model_dir(dir.path());
    let estimator = AgeEstimator::new(config);
    assert_eq!(estimator.strategy().kind(), StrategyKind::LearnedModel);

    let face = DetectedFace::new(bbox())
        .with_landmarks(reference_landmarks(0.25))
        .with_quality(1.0);
    let result = estimator.estimate(&face);
    assert_eq!(result.path, EstimationPath::LearnedModel);
    assert_eq!(result.estimated_age, 50.0);
    assert!((result.confidence - 0.5).abs() < 1e-6);
    // margin 7.5
    assert_eq!((result.age_range_low, result.age_range_high), (43, 58));
}

#[test]
fn batch_matches_single_estimates() {
    let estimator = AgeEstimator::default();
    let mut rng = Lcg(99);
    let faces: Vec<DetectedFace> = (0..64).map(|_| random_face(&mut rng)).collect();

    let batch = estimator.estimate_batch(&faces);
    assert_eq!(batch.len(), faces.len());
    for (face, result) in faces.iter().zip(&batch) {
        let single = estimator.estimate(face);
        assert_eq!(single.estimated_age.to_bits(), result.estimated_age.to_bits());
        assert_eq!(single.age_range(), result.age_range());
    }
}
