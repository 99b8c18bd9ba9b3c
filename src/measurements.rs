//! Absolute body measurements from a landmark set.
//!
//! All values are in the physical unit implied by the frame's
//! pixel-to-unit ratio (centimetres for the built-in size guides). The
//! circumference figures are empirical approximations from a single frontal
//! view, not physical guarantees.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::chain_length_3d;
use crate::types::{BodyPoint, FrameContext, LandmarkSet};

/// Fraction of the vertical shoulder-to-hip distance taken as chest depth.
pub const CHEST_DEPTH_FACTOR: f32 = 0.6;

/// Ratio between waist circumference and planar hip width.
pub const WAIST_TO_HIP_WIDTH: f32 = 2.2;

/// Landmarks that must be visible for a usable full-body pose, with the
/// visibility each one contributes to the required total.
pub const REQUIRED_VISIBILITY: [(BodyPoint, f32); 6] = [
    (BodyPoint::LeftShoulder, 0.7),
    (BodyPoint::RightShoulder, 0.7),
    (BodyPoint::LeftHip, 0.7),
    (BodyPoint::RightHip, 0.7),
    (BodyPoint::LeftKnee, 0.5),
    (BodyPoint::RightKnee, 0.5),
];

/// Summed visibility over [`REQUIRED_VISIBILITY`].
pub fn visibility_score(landmarks: &LandmarkSet) -> f32 {
    REQUIRED_VISIBILITY
        .iter()
        .map(|(point, _)| landmarks[*point].visibility)
        .sum()
}

/// Slack on the aggregate comparison. Scores and thresholds are summed in
/// different orders, so an exact 3.8 score may round just under the total.
const VISIBILITY_TOLERANCE: f32 = 1e-5;

/// Sum of the per-landmark thresholds in [`REQUIRED_VISIBILITY`] (3.8).
pub fn required_visibility() -> f32 {
    REQUIRED_VISIBILITY.iter().map(|(_, threshold)| *threshold).sum()
}

/// Whether the pose is usable for measurement.
///
/// The gate is on the aggregate score, not per landmark: a poorly visible
/// knee can be compensated by a clearly visible shoulder.
pub fn is_full_body(landmarks: &LandmarkSet) -> bool {
    meets_required(visibility_score(landmarks), required_visibility())
}

fn meets_required(score: f32, required: f32) -> bool {
    score + VISIBILITY_TOLERANCE >= required
}

/// Like [`is_full_body`] but reports the shortfall as [`Error::InsufficientVisibility`].
pub fn require_full_body(landmarks: &LandmarkSet) -> Result<()> {
    let score = visibility_score(landmarks);
    let required = required_visibility();
    if meets_required(score, required) {
        Ok(())
    } else {
        Err(Error::InsufficientVisibility { score, required })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    ShoulderWidth,
    Chest,
    Waist,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 7] = [
        Self::ShoulderWidth,
        Self::Chest,
        Self::Waist,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::ShoulderWidth => "shoulder_width",
            Self::Chest => "chest",
            Self::Waist => "waist",
            Self::LeftArm => "left_arm",
            Self::RightArm => "right_arm",
            Self::LeftLeg => "left_leg",
            Self::RightLeg => "right_leg",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named physical measurements for one frame. Read-only once built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurements {
    values: BTreeMap<MeasurementKind, f32>,
}

impl Measurements {
    /// Derive every [`MeasurementKind`] from a landmark set.
    ///
    /// Does not check visibility; gate with [`is_full_body`] first.
    pub fn extract(landmarks: &LandmarkSet, frame: &FrameContext) -> Self {
        let width = frame.width() as f32;
        let height = frame.height() as f32;
        let ratio = frame.pixel_to_unit();

        let left_shoulder = &landmarks[BodyPoint::LeftShoulder];
        let right_shoulder = &landmarks[BodyPoint::RightShoulder];
        let left_hip = &landmarks[BodyPoint::LeftHip];
        let right_hip = &landmarks[BodyPoint::RightHip];

        let shoulder_width = (left_shoulder.x - right_shoulder.x).abs() * width * ratio;

        let chest_depth =
            (left_shoulder.y - left_hip.y).abs() * height * ratio * CHEST_DEPTH_FACTOR;
        let chest = shoulder_width * 2.0 + chest_depth * 2.0;

        let hip_width = (left_hip.x - right_hip.x).abs() * width * ratio;
        let waist = hip_width * WAIST_TO_HIP_WIDTH;

        let chain = |start: BodyPoint, mid: BodyPoint, end: BodyPoint| {
            chain_length_3d(&landmarks[start], &landmarks[mid], &landmarks[end], frame, ratio)
        };
        let left_arm = chain(BodyPoint::LeftShoulder, BodyPoint::LeftElbow, BodyPoint::LeftWrist);
        let right_arm = chain(
            BodyPoint::RightShoulder,
            BodyPoint::RightElbow,
            BodyPoint::RightWrist,
        );
        let left_leg = chain(BodyPoint::LeftHip, BodyPoint::LeftKnee, BodyPoint::LeftAnkle);
        let right_leg = chain(BodyPoint::RightHip, BodyPoint::RightKnee, BodyPoint::RightAnkle);

        let measurements = Self::from_values([
            (MeasurementKind::ShoulderWidth, shoulder_width),
            (MeasurementKind::Chest, chest),
            (MeasurementKind::Waist, waist),
            (MeasurementKind::LeftArm, left_arm),
            (MeasurementKind::RightArm, right_arm),
            (MeasurementKind::LeftLeg, left_leg),
            (MeasurementKind::RightLeg, right_leg),
        ]);
        debug!(?measurements, "extracted measurements");
        measurements
    }

    /// Build from explicit values, e.g. tape measurements fed to the size estimator.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (MeasurementKind, f32)>,
    {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn get(&self, kind: MeasurementKind) -> Result<f32> {
        self.values
            .get(&kind)
            .copied()
            .ok_or(Error::MissingMeasurement(kind))
    }

    pub fn contains(&self, kind: MeasurementKind) -> bool {
        self.values.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasurementKind, f32)> + '_ {
        self.values.iter().map(|(kind, value)| (*kind, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Landmark;

    fn visible_set(visibility: f32) -> LandmarkSet {
        let mut set = LandmarkSet::default();
        for point in BodyPoint::ALL {
            set.set(point, Landmark::new(0.5, 0.5, 0.0, visibility));
        }
        set
    }

    fn with_visibility(mut set: LandmarkSet, point: BodyPoint, visibility: f32) -> LandmarkSet {
        let mut lm = set[point];
        lm.visibility = visibility;
        set.set(point, lm);
        set
    }

    #[test]
    fn required_visibility_total() {
        assert!((required_visibility() - 3.8).abs() < 1e-6);
    }

    #[test]
    fn full_body_boundary_with_uneven_visibilities() {
        // 1.0 + 1.0 + 0.9 + 0.9 + 0.0 + 0.0 = 3.8, no landmark at its own threshold.
        let set = visible_set(0.0);
        let set = with_visibility(set, BodyPoint::LeftShoulder, 1.0);
        let set = with_visibility(set, BodyPoint::RightShoulder, 1.0);
        let set = with_visibility(set, BodyPoint::LeftHip, 0.9);
        let set = with_visibility(set, BodyPoint::RightHip, 0.9);
        assert!(is_full_body(&set));
        assert!(require_full_body(&set).is_ok());

        let below = with_visibility(set, BodyPoint::RightHip, 0.9 - 1e-3);
        assert!(!is_full_body(&below));
        assert!(matches!(
            require_full_body(&below),
            Err(Error::InsufficientVisibility { .. })
        ));
    }

    #[test]
    fn score_short_of_threshold_total_is_rejected() {
        // 3.5 falls short of the 3.8 total.
        let set = visible_set(0.0);
        let set = with_visibility(set, BodyPoint::LeftShoulder, 1.0);
        let set = with_visibility(set, BodyPoint::RightShoulder, 1.0);
        let set = with_visibility(set, BodyPoint::LeftHip, 0.75);
        let set = with_visibility(set, BodyPoint::RightHip, 0.75);
        assert!(!is_full_body(&set));
    }

    #[test]
    fn full_body_at_exact_threshold() {
        let mut set = visible_set(0.0);
        for (point, threshold) in REQUIRED_VISIBILITY {
            set = with_visibility(set, point, threshold);
        }
        assert!(is_full_body(&set));
        assert!(require_full_body(&set).is_ok());

        let below = with_visibility(set, BodyPoint::RightKnee, 0.5 - 1e-3);
        assert!(!is_full_body(&below));
        assert!(matches!(
            require_full_body(&below),
            Err(Error::InsufficientVisibility { .. })
        ));
    }

    #[test]
    fn full_body_is_aggregate_not_per_landmark() {
        // Knee far below its own 0.5 threshold, shoulders make up for it.
        let set = visible_set(0.7);
        let set = with_visibility(set, BodyPoint::LeftKnee, 0.2);
        let set = with_visibility(set, BodyPoint::RightKnee, 0.5);
        let set = with_visibility(set, BodyPoint::LeftShoulder, 1.0);
        let set = with_visibility(set, BodyPoint::RightShoulder, 1.0);
        assert!(is_full_body(&set));
    }

    #[test]
    fn invisible_pose_is_rejected() {
        assert!(!is_full_body(&visible_set(0.0)));
        assert!(is_full_body(&visible_set(1.0)));
    }

    #[test]
    fn extract_measurements() {
        let frame = FrameContext::new(1000, 1000, 0.1).unwrap();
        let mut set = visible_set(1.0);
        set.set(BodyPoint::LeftShoulder, Landmark::new(0.6, 0.3, 0.0, 1.0));
        set.set(BodyPoint::RightShoulder, Landmark::new(0.4, 0.3, 0.0, 1.0));
        set.set(BodyPoint::LeftHip, Landmark::new(0.55, 0.6, 0.0, 1.0));
        set.set(BodyPoint::RightHip, Landmark::new(0.45, 0.6, 0.0, 1.0));
        set.set(BodyPoint::LeftElbow, Landmark::new(0.6, 0.45, 0.0, 1.0));
        set.set(BodyPoint::LeftWrist, Landmark::new(0.6, 0.6, 0.0, 1.0));
        set.set(BodyPoint::LeftKnee, Landmark::new(0.55, 0.8, 0.0, 1.0));
        set.set(BodyPoint::LeftAnkle, Landmark::new(0.55, 0.95, 0.0, 1.0));

        let m = Measurements::extract(&set, &frame);

        // 0.2 * 1000 * 0.1
        assert!((m.get(MeasurementKind::ShoulderWidth).unwrap() - 20.0).abs() < 1e-3);
        // depth = 0.3 * 1000 * 0.1 * 0.6 = 18; chest = 2*20 + 2*18
        assert!((m.get(MeasurementKind::Chest).unwrap() - 76.0).abs() < 1e-3);
        // hip width 10 * 2.2
        assert!((m.get(MeasurementKind::Waist).unwrap() - 22.0).abs() < 1e-3);
        // 15 + 15
        assert!((m.get(MeasurementKind::LeftArm).unwrap() - 30.0).abs() < 1e-3);
        // 20 + 15
        assert!((m.get(MeasurementKind::LeftLeg).unwrap() - 35.0).abs() < 1e-3);
        assert_eq!(m.len(), MeasurementKind::ALL.len());
    }

    #[test]
    fn limb_length_includes_depth() {
        let frame = FrameContext::new(1000, 1000, 1.0).unwrap();
        let mut set = visible_set(1.0);
        set.set(BodyPoint::RightShoulder, Landmark::new(0.5, 0.3, 0.0, 1.0));
        set.set(BodyPoint::RightElbow, Landmark::new(0.5, 0.3, 0.1, 1.0));
        set.set(BodyPoint::RightWrist, Landmark::new(0.5, 0.3, 0.3, 1.0));

        let m = Measurements::extract(&set, &frame);
        assert!((m.get(MeasurementKind::RightArm).unwrap() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn missing_measurement_is_reported() {
        let m = Measurements::from_values([(MeasurementKind::Chest, 90.0)]);
        assert_eq!(m.get(MeasurementKind::Chest).unwrap(), 90.0);
        assert!(matches!(
            m.get(MeasurementKind::Waist),
            Err(Error::MissingMeasurement(MeasurementKind::Waist))
        ));
    }

    #[test]
    fn measurements_serialize_by_name() {
        let m = Measurements::from_values([(MeasurementKind::ShoulderWidth, 42.0)]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"shoulder_width":42.0}"#);

        let back: Measurements = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
