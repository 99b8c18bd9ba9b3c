//! One-frame analysis: landmarks in, every derived signal out.
//!
//! Derived fields fail independently. A degenerate joint angle costs only
//! that flexibility score; posture, recommendations and sizing still run.
//! Only a pose that fails full-body validation aborts the whole analysis.

use serde::Serialize;
use tracing::{debug, warn};

use crate::appearance::Appearance;
use crate::error::Result;
use crate::measurements::{require_full_body, visibility_score, Measurements};
use crate::posture::{PelvicTilt, PostureReport};
use crate::proportions::{hip_flexibility, shoulder_flexibility, Flexibility, Proportions};
use crate::recommend::{recommend, PostureSignals, Recommendations};
use crate::size::{estimate_size, Gender, SizeEstimate, SizeGuide};
use crate::types::{FrameContext, LandmarkSet};

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub size_guide: SizeGuide,
    /// Measured elsewhere; landmarks alone do not yield it.
    pub pelvic_tilt: Option<PelvicTilt>,
    pub appearance: Appearance,
}

impl AnalysisOptions {
    pub fn for_gender(gender: Gender) -> Self {
        Self::with_size_guide(SizeGuide::builtin(gender))
    }

    pub fn with_size_guide(size_guide: SizeGuide) -> Self {
        Self {
            size_guide,
            pelvic_tilt: None,
            appearance: Appearance::default(),
        }
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::for_gender(Gender::default())
    }
}

#[derive(Debug)]
pub struct BodyAnalysis {
    pub frame: FrameContext,
    pub visibility_score: f32,
    pub measurements: Measurements,
    pub posture: PostureReport,
    pub proportions: Result<Proportions>,
    pub shoulder_flexibility: Result<f32>,
    pub hip_flexibility: Result<f32>,
    pub recommendations: Recommendations,
    pub size: Result<SizeEstimate>,
    pub appearance: Appearance,
}

impl BodyAnalysis {
    /// Both flexibility scores, if both joints were measurable.
    pub fn flexibility(&self) -> Option<Flexibility> {
        match (&self.shoulder_flexibility, &self.hip_flexibility) {
            (Ok(shoulder), Ok(hip)) => Some(Flexibility {
                shoulder: *shoulder,
                hip: *hip,
            }),
            _ => None,
        }
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            visibility_score: self.visibility_score,
            measurements: self.measurements.clone(),
            posture: self.posture,
            proportions: Outcome::from(&self.proportions),
            shoulder_flexibility: Outcome::from(&self.shoulder_flexibility),
            hip_flexibility: Outcome::from(&self.hip_flexibility),
            recommendations: self.recommendations.clone(),
            size: Outcome::from(&self.size),
            appearance: self.appearance.clone(),
        }
    }
}

/// A derived value or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Value(T),
    Failed { error: String },
}

impl<T: Clone> From<&Result<T>> for Outcome<T> {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(value) => Self::Value(value.clone()),
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Serializable view of a [`BodyAnalysis`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub visibility_score: f32,
    pub measurements: Measurements,
    pub posture: PostureReport,
    pub proportions: Outcome<Proportions>,
    pub shoulder_flexibility: Outcome<f32>,
    pub hip_flexibility: Outcome<f32>,
    pub recommendations: Recommendations,
    pub size: Outcome<SizeEstimate>,
    pub appearance: Appearance,
}

/// Run every stage on one frame.
///
/// Fails with [`Error::InsufficientVisibility`](crate::Error::InsufficientVisibility)
/// when the pose is not a usable full body; nothing else is attempted then.
pub fn analyze(
    landmarks: &LandmarkSet,
    frame: &FrameContext,
    options: &AnalysisOptions,
) -> Result<BodyAnalysis> {
    if let Err(e) = require_full_body(landmarks) {
        warn!("{e}");
        return Err(e);
    }
    let visibility_score = visibility_score(landmarks);

    let measurements = Measurements::extract(landmarks, frame);
    let posture = PostureReport::analyze(landmarks, frame);

    let proportions = Proportions::from_measurements(&measurements);
    let shoulder_flexibility = shoulder_flexibility(landmarks, frame);
    let hip_flexibility = hip_flexibility(landmarks, frame);
    for (field, result) in [
        ("shoulder_flexibility", &shoulder_flexibility),
        ("hip_flexibility", &hip_flexibility),
    ] {
        if let Err(e) = result {
            warn!(field, "{e}");
        }
    }
    if let Err(e) = &proportions {
        warn!(field = "proportions", "{e}");
    }

    let signals = PostureSignals::from_report(&posture).with_pelvic_tilt(options.pelvic_tilt);
    let recommendations = recommend(&signals);

    let size = estimate_size(&measurements, &options.size_guide);
    if let Err(e) = &size {
        warn!(field = "size", "{e}");
    }

    debug!(visibility_score, "analysis complete");
    Ok(BodyAnalysis {
        frame: *frame,
        visibility_score,
        measurements,
        posture,
        proportions,
        shoulder_flexibility,
        hip_flexibility,
        recommendations,
        size,
        appearance: options.appearance.clone(),
    })
}
