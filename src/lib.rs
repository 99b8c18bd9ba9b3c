//! # percent-body
//!
//! Body measurements, posture signals and fit recommendations from a single
//! frame of pose landmarks.
//!
//! This crate provides:
//! - **Measurements**: shoulder width, chest, waist, arm and leg lengths from
//!   normalized landmarks and a pixel-to-unit ratio
//! - **Posture**: shoulder alignment, spinal curvature and forward-head ratio
//! - **Proportions**: torso/leg and shoulder/hip ratios, body type, joint flexibility
//! - **Recommendations**: a static rule table from posture to clothing cuts
//! - **Sizing**: nearest-fit search over a per-gender size guide
//!
//! Landmark detection itself happens upstream. Any detector producing the
//! 33-point BlazePose topology with per-point visibility can feed this crate.
//!
//! ## Pipeline
//!
//! 1. Check the pose is a usable full body (aggregate visibility gate)
//! 2. Extract measurements from landmark geometry
//! 3. Derive posture, proportions and flexibility independently
//! 4. Map posture to clothing cuts and measurements to a garment size
//!
//! ## Quick Start
//!
//! ```rust
//! use percent_body::{analyze, AnalysisOptions, BodyPoint, FrameContext, Landmark, LandmarkSet};
//!
//! let mut landmarks = LandmarkSet::default();
//! for (point, x, y) in [
//!     (BodyPoint::Nose, 0.5, 0.15),
//!     (BodyPoint::LeftShoulder, 0.6, 0.3),
//!     (BodyPoint::RightShoulder, 0.4, 0.3),
//!     (BodyPoint::LeftElbow, 0.65, 0.42),
//!     (BodyPoint::LeftWrist, 0.67, 0.55),
//!     (BodyPoint::LeftHip, 0.6, 0.6),
//!     (BodyPoint::RightHip, 0.4, 0.6),
//!     (BodyPoint::LeftKnee, 0.6, 0.78),
//!     (BodyPoint::RightKnee, 0.4, 0.78),
//! ] {
//!     landmarks.set(point, Landmark::new(x, y, 0.0, 1.0));
//! }
//!
//! // 1000x1000 image, 0.1 cm per pixel
//! let frame = FrameContext::new(1000, 1000, 0.1).unwrap();
//! let analysis = analyze(&landmarks, &frame, &AnalysisOptions::default()).unwrap();
//!
//! println!("{:?}", analysis.posture.shoulder_alignment);
//! println!("{:?}", analysis.size);
//! ```

mod analysis;
mod appearance;
mod config;
mod error;
pub mod geometry;
mod measurements;
pub mod posture;
mod proportions;
pub mod recommend;
mod size;
mod types;

pub use analysis::{analyze, AnalysisOptions, AnalysisReport, BodyAnalysis, Outcome};
pub use appearance::{nearest_color_name, Appearance, ClothingColor, SkinTone, SkinToneSample};
pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use measurements::{
    is_full_body, require_full_body, required_visibility, visibility_score, MeasurementKind,
    Measurements, REQUIRED_VISIBILITY,
};
pub use posture::{PelvicTilt, PostureReport, PostureType, ShoulderAlignment};
pub use proportions::{hip_flexibility, shoulder_flexibility, BodyType, Flexibility, Proportions};
pub use recommend::{recommend, PostureSignals, Recommendations, RuleKey};
pub use size::{
    estimate_clothing_size, estimate_size, uk_to_us, Gender, SizeEstimate, SizeGuide, SizeRange,
    SizeRow,
};
pub use types::{BodyPoint, FrameContext, Landmark, LandmarkSet, Point};
