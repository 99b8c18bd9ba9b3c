//! Distances and joint angles between landmarks in pixel space.

use crate::error::{Error, Result};
use crate::types::{FrameContext, Landmark};

/// Vectors shorter than this (in pixels) are treated as zero length.
const MIN_VECTOR_LENGTH: f32 = 1e-6;

/// Euclidean distance between two landmarks projected into pixel space,
/// multiplied by `scale`.
///
/// Depth is projected as `z * width`. `scale` is not validated here; callers
/// pass the ratio from a validated [`FrameContext`] or their own positive value.
pub fn distance_3d(a: &Landmark, b: &Landmark, frame: &FrameContext, scale: f32) -> f32 {
    let pa = a.to_pixel_3d(frame);
    let pb = b.to_pixel_3d(frame);
    let sq: f32 = pa.iter().zip(pb.iter()).map(|(p, q)| (p - q) * (p - q)).sum();
    sq.sqrt() * scale
}

/// Sum of the two segment lengths `start -> mid -> end`, scaled.
pub fn chain_length_3d(
    start: &Landmark,
    mid: &Landmark,
    end: &Landmark,
    frame: &FrameContext,
    scale: f32,
) -> f32 {
    distance_3d(start, mid, frame, scale) + distance_3d(mid, end, frame, scale)
}

/// Angle at vertex `b` between the rays `b -> a` and `b -> c`, in degrees [0, 180].
///
/// Planar only: depth is ignored. Fails with [`Error::DegenerateGeometry`]
/// when either ray has zero length.
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark, frame: &FrameContext) -> Result<f32> {
    let vertex = b.to_pixel(frame);
    let ba = a.to_pixel(frame) - vertex;
    let bc = c.to_pixel(frame) - vertex;

    let norm_ba = ba.norm();
    let norm_bc = bc.norm();
    if norm_ba < MIN_VECTOR_LENGTH || norm_bc < MIN_VECTOR_LENGTH {
        return Err(Error::DegenerateGeometry("coincident landmarks at joint"));
    }

    // Rounding can push the cosine just outside [-1, 1].
    let cosine = (ba.dot(&bc) / (norm_ba * norm_bc)).clamp(-1.0, 1.0);
    Ok(cosine.acos().to_degrees())
}
