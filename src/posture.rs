//! Shoulder alignment, spinal curvature and forward-head signals.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{BodyPoint, FrameContext, LandmarkSet};

/// Slope magnitude (degrees) above which shoulders count as uneven.
pub const SHOULDER_SLOPE_THRESHOLD_DEG: f32 = 5.0;

/// Horizontal run used for the shoulder slope, as a fraction of image width.
/// This is a fixed baseline, not the measured shoulder distance.
pub const SHOULDER_SLOPE_BASELINE: f32 = 0.2;

/// Shoulder/hip midpoint offset, as a fraction of image width, above which
/// the spine is classified as curved.
pub const SPINAL_DEVIATION_THRESHOLD: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShoulderAlignment {
    Even,
    LeftHigh,
    RightHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostureType {
    Neutral,
    /// Hunched back.
    Kyphotic,
    Lordotic,
    SwayBack,
    ForwardHead,
}

/// Pelvic tilt. Not derived from landmarks; only supplied by callers that
/// measure it some other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PelvicTilt {
    Neutral,
    Anterior,
    Posterior,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PostureReport {
    pub shoulder_alignment: ShoulderAlignment,
    /// Present only when `shoulder_alignment` is not [`ShoulderAlignment::Even`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder_slope_deg: Option<f32>,
    pub posture_type: PostureType,
    /// Horizontal shoulder/hip midpoint offset in pixels.
    pub spinal_deviation_px: f32,
    /// (mean shoulder y - nose y) / image height. Unclassified.
    pub head_forward_ratio: f32,
}

impl PostureReport {
    pub fn analyze(landmarks: &LandmarkSet, frame: &FrameContext) -> Self {
        let (shoulder_alignment, shoulder_slope_deg) = shoulder_alignment(landmarks, frame);
        let (posture_type, spinal_deviation_px) = spinal_curvature(landmarks, frame);
        let head_forward_ratio = head_forward_ratio(landmarks, frame);

        let report = Self {
            shoulder_alignment,
            shoulder_slope_deg,
            posture_type,
            spinal_deviation_px,
            head_forward_ratio,
        };
        debug!(?report, "posture analyzed");
        report
    }
}

/// Slope of the shoulder line in degrees, positive when the right shoulder
/// sits lower in the image than the left.
pub fn shoulder_slope_deg(landmarks: &LandmarkSet, frame: &FrameContext) -> f32 {
    let height = frame.height() as f32;
    let left_y = landmarks[BodyPoint::LeftShoulder].y * height;
    let right_y = landmarks[BodyPoint::RightShoulder].y * height;
    let baseline = frame.width() as f32 * SHOULDER_SLOPE_BASELINE;
    (right_y - left_y).atan2(baseline).to_degrees()
}

pub fn shoulder_alignment(
    landmarks: &LandmarkSet,
    frame: &FrameContext,
) -> (ShoulderAlignment, Option<f32>) {
    let slope = shoulder_slope_deg(landmarks, frame);
    classify_shoulder_slope(slope)
}

/// EVEN within ±5°, otherwise by sign. The slope is kept only when uneven.
pub fn classify_shoulder_slope(slope_deg: f32) -> (ShoulderAlignment, Option<f32>) {
    if slope_deg.abs() > SHOULDER_SLOPE_THRESHOLD_DEG {
        let alignment = if slope_deg > 0.0 {
            ShoulderAlignment::LeftHigh
        } else {
            ShoulderAlignment::RightHigh
        };
        (alignment, Some(slope_deg))
    } else {
        (ShoulderAlignment::Even, None)
    }
}

/// Classify the spine from the horizontal offset between shoulder and hip
/// midpoints. Returns the class and the offset in pixels.
///
/// The sign test runs on the absolute offset, so any deviation past the
/// threshold reads as [`PostureType::Kyphotic`] and `Lordotic` is never
/// produced. Kept as observed until the intended sign convention is known.
pub fn spinal_curvature(landmarks: &LandmarkSet, frame: &FrameContext) -> (PostureType, f32) {
    let width = frame.width() as f32;
    let neck = (landmarks[BodyPoint::LeftShoulder].x + landmarks[BodyPoint::RightShoulder].x) / 2.0;
    let mid_back = (landmarks[BodyPoint::LeftHip].x + landmarks[BodyPoint::RightHip].x) / 2.0;
    let deviation = (neck - mid_back).abs() * width;

    let posture_type = if deviation > SPINAL_DEVIATION_THRESHOLD * width {
        if deviation > 0.0 {
            PostureType::Kyphotic
        } else {
            PostureType::Lordotic
        }
    } else {
        PostureType::Neutral
    };
    (posture_type, deviation)
}

pub fn head_forward_ratio(landmarks: &LandmarkSet, frame: &FrameContext) -> f32 {
    let height = frame.height() as f32;
    let nose_y = landmarks[BodyPoint::Nose].y * height;
    let shoulder_y = (landmarks[BodyPoint::LeftShoulder].y + landmarks[BodyPoint::RightShoulder].y)
        / 2.0
        * height;
    (shoulder_y - nose_y) / height
}
