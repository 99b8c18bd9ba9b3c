//! Body proportions and joint flexibility scores.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::joint_angle;
use crate::measurements::{MeasurementKind, Measurements, WAIST_TO_HIP_WIDTH};
use crate::types::{BodyPoint, FrameContext, LandmarkSet};

/// Chest circumference divided by this stands in for torso length.
pub const CHEST_TO_TORSO: f32 = 2.5;

/// Shoulder-hip ratios inside [BALANCED_MIN, BALANCED_MAX] are balanced.
pub const BALANCED_MIN: f32 = 0.95;
pub const BALANCED_MAX: f32 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    InvertedTriangle,
    Pear,
    Balanced,
}

impl BodyType {
    /// Step function of the shoulder-hip ratio. Both boundaries are balanced.
    pub fn from_shoulder_hip_ratio(ratio: f32) -> Self {
        if ratio > BALANCED_MAX {
            Self::InvertedTriangle
        } else if ratio < BALANCED_MIN {
            Self::Pear
        } else {
            Self::Balanced
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::InvertedTriangle => "inverted_triangle",
            Self::Pear => "pear",
            Self::Balanced => "balanced",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proportions {
    pub torso_leg_ratio: f32,
    pub shoulder_hip_ratio: f32,
    pub body_type: BodyType,
}

impl Proportions {
    /// Needs chest, both legs, shoulder width and waist. A missing value is
    /// reported rather than read as zero.
    pub fn from_measurements(measurements: &Measurements) -> Result<Self> {
        let chest = measurements.get(MeasurementKind::Chest)?;
        let left_leg = measurements.get(MeasurementKind::LeftLeg)?;
        let right_leg = measurements.get(MeasurementKind::RightLeg)?;
        let shoulder_width = measurements.get(MeasurementKind::ShoulderWidth)?;
        let waist = measurements.get(MeasurementKind::Waist)?;

        let torso_length = chest / CHEST_TO_TORSO;
        let leg_length = (left_leg + right_leg) / 2.0;
        if leg_length <= 0.0 {
            return Err(Error::DegenerateGeometry("zero leg length"));
        }

        let hip_width = waist / WAIST_TO_HIP_WIDTH;
        if hip_width <= 0.0 {
            return Err(Error::DegenerateGeometry("zero hip width"));
        }

        let shoulder_hip_ratio = shoulder_width / hip_width;
        let proportions = Self {
            torso_leg_ratio: torso_length / leg_length,
            shoulder_hip_ratio,
            body_type: BodyType::from_shoulder_hip_ratio(shoulder_hip_ratio),
        };
        debug!(?proportions, "proportions computed");
        Ok(proportions)
    }
}

/// Linear rescale of a joint angle onto [0, 100].
fn flexibility_score(angle_deg: f32, offset: f32, divisor: f32) -> f32 {
    ((angle_deg - offset) / divisor).clamp(0.0, 100.0)
}

/// Shoulder score from the left elbow-shoulder-hip angle.
pub fn shoulder_flexibility_from_angle(angle_deg: f32) -> f32 {
    flexibility_score(angle_deg, 45.0, 1.2)
}

/// Hip score from the left shoulder-hip-knee angle.
pub fn hip_flexibility_from_angle(angle_deg: f32) -> f32 {
    flexibility_score(angle_deg, 160.0, 0.4)
}

pub fn shoulder_flexibility(landmarks: &LandmarkSet, frame: &FrameContext) -> Result<f32> {
    let angle = joint_angle(
        &landmarks[BodyPoint::LeftElbow],
        &landmarks[BodyPoint::LeftShoulder],
        &landmarks[BodyPoint::LeftHip],
        frame,
    )?;
    Ok(shoulder_flexibility_from_angle(angle))
}

pub fn hip_flexibility(landmarks: &LandmarkSet, frame: &FrameContext) -> Result<f32> {
    let angle = joint_angle(
        &landmarks[BodyPoint::LeftShoulder],
        &landmarks[BodyPoint::LeftHip],
        &landmarks[BodyPoint::LeftKnee],
        frame,
    )?;
    Ok(hip_flexibility_from_angle(angle))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Flexibility {
    pub shoulder: f32,
    pub hip: f32,
}

impl Flexibility {
    /// Both scores, failing if either joint is degenerate. Use
    /// [`shoulder_flexibility`] and [`hip_flexibility`] to keep one when the
    /// other fails.
    pub fn estimate(landmarks: &LandmarkSet, frame: &FrameContext) -> Result<Self> {
        Ok(Self {
            shoulder: shoulder_flexibility(landmarks, frame)?,
            hip: hip_flexibility(landmarks, frame)?,
        })
    }
}
