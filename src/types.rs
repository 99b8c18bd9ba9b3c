use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn dot(&self, other: &Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (*self - *other).norm()
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// The 33 body points of the BlazePose topology.
///
/// Discriminants match the detector's output order, so a raw landmark array
/// can be indexed with `point as usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum BodyPoint {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyPoint {
    pub const COUNT: usize = 33;

    pub const ALL: [BodyPoint; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for BodyPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single detected body landmark.
///
/// `x` and `y` are normalized to [0,1] relative to image width and height.
/// `z` is the detector's relative depth estimate, on roughly the same scale as `x`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    /// Detector confidence that the point is present and unoccluded, in [0,1].
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// Planar position in pixel space.
    pub fn to_pixel(&self, frame: &FrameContext) -> Point {
        Point::new(
            self.x * frame.width() as f32,
            self.y * frame.height() as f32,
        )
    }

    /// Position in pixel space with depth scaled by image width.
    pub fn to_pixel_3d(&self, frame: &FrameContext) -> [f32; 3] {
        let w = frame.width() as f32;
        [self.x * w, self.y * frame.height() as f32, self.z * w]
    }
}

/// A full set of landmarks for one detected pose, indexed by [`BodyPoint`].
///
/// Serialized as a map from body-point name to landmark. Points missing from
/// a deserialized map become invisible default landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<BodyPoint, Landmark>", into = "BTreeMap<BodyPoint, Landmark>")]
pub struct LandmarkSet {
    landmarks: [Landmark; BodyPoint::COUNT],
}

impl LandmarkSet {
    pub fn new(landmarks: [Landmark; BodyPoint::COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build from the detector's raw output order. Returns `None` unless
    /// exactly [`BodyPoint::COUNT`] landmarks are given.
    pub fn from_slice(landmarks: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; BodyPoint::COUNT] = landmarks.try_into().ok()?;
        Some(Self { landmarks })
    }

    pub fn get(&self, point: BodyPoint) -> &Landmark {
        &self.landmarks[point.index()]
    }

    pub fn set(&mut self, point: BodyPoint, landmark: Landmark) {
        self.landmarks[point.index()] = landmark;
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPoint, &Landmark)> {
        BodyPoint::ALL.iter().copied().zip(self.landmarks.iter())
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); BodyPoint::COUNT],
        }
    }
}

impl std::ops::Index<BodyPoint> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, point: BodyPoint) -> &Self::Output {
        self.get(point)
    }
}

impl From<BTreeMap<BodyPoint, Landmark>> for LandmarkSet {
    fn from(map: BTreeMap<BodyPoint, Landmark>) -> Self {
        let mut set = Self::default();
        for (point, landmark) in map {
            set.set(point, landmark);
        }
        set
    }
}

impl From<LandmarkSet> for BTreeMap<BodyPoint, Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.iter().map(|(point, lm)| (point, *lm)).collect()
    }
}

/// Image dimensions plus the pixel-to-physical-unit ratio for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameContext {
    width: u32,
    height: u32,
    pixel_to_unit: f32,
}

impl FrameContext {
    /// Fails with [`Error::InvalidFrame`] on a zero dimension and
    /// [`Error::InvalidScale`] unless the ratio is a positive finite number.
    pub fn new(width: u32, height: u32, pixel_to_unit: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrame { width, height });
        }
        if !(pixel_to_unit.is_finite() && pixel_to_unit > 0.0) {
            return Err(Error::InvalidScale(pixel_to_unit));
        }
        Ok(Self {
            width,
            height,
            pixel_to_unit,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Physical units per pixel.
    pub fn pixel_to_unit(&self) -> f32 {
        self.pixel_to_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);

        let diff = b - a;
        assert_eq!(diff.x, 3.0);
        assert_eq!(diff.y, 4.0);
        assert!((diff.norm() - 5.0).abs() < 1e-6);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);
        assert_eq!(a.dot(&b), 16.0);
    }

    #[test]
    fn body_point_indices_match_order() {
        for (i, point) in BodyPoint::ALL.iter().enumerate() {
            assert_eq!(point.index(), i);
            assert_eq!(BodyPoint::from_index(i), Some(*point));
        }
        assert_eq!(BodyPoint::from_index(BodyPoint::COUNT), None);
        assert_eq!(BodyPoint::LeftShoulder.index(), 11);
        assert_eq!(BodyPoint::RightKnee.to_string(), "right_knee");
    }

    #[test]
    fn landmark_set_deserializes_sparse_map() {
        let json = r#"{
            "left_shoulder": {"x": 0.4, "y": 0.3, "visibility": 0.9},
            "nose": {"x": 0.5, "y": 0.1, "z": -0.2, "visibility": 1.0}
        }"#;
        let set: LandmarkSet = serde_json::from_str(json).unwrap();

        assert_eq!(set[BodyPoint::LeftShoulder].x, 0.4);
        assert_eq!(set[BodyPoint::LeftShoulder].z, 0.0);
        assert_eq!(set[BodyPoint::Nose].z, -0.2);
        assert_eq!(set[BodyPoint::RightHip], Landmark::default());
    }

    #[test]
    fn landmark_set_from_slice_checks_length() {
        let raw = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); BodyPoint::COUNT];
        assert!(LandmarkSet::from_slice(&raw).is_some());
        assert!(LandmarkSet::from_slice(&raw[..17]).is_none());
    }

    #[test]
    fn landmark_pixel_projection() {
        let frame = FrameContext::new(200, 100, 0.5).unwrap();
        let lm = Landmark::new(0.5, 0.5, 0.25, 1.0);

        let p = lm.to_pixel(&frame);
        assert_eq!(p, Point::new(100.0, 50.0));
        assert_eq!(lm.to_pixel_3d(&frame), [100.0, 50.0, 50.0]);
    }

    #[test]
    fn frame_context_validation() {
        assert!(FrameContext::new(640, 480, 0.1).is_ok());
        assert!(matches!(
            FrameContext::new(0, 480, 0.1),
            Err(Error::InvalidFrame { width: 0, .. })
        ));
        assert!(matches!(FrameContext::new(640, 480, 0.0), Err(Error::InvalidScale(_))));
        assert!(matches!(FrameContext::new(640, 480, -1.0), Err(Error::InvalidScale(_))));
        assert!(matches!(
            FrameContext::new(640, 480, f32::NAN),
            Err(Error::InvalidScale(_))
        ));
    }
}
