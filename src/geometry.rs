//! Vector primitives over landmarks.

use crate::error::{Error, Result};
use crate::types::Landmark;

/// Euclidean distance between two points in 3-D.
pub fn distance(a: &Landmark, b: &Landmark) -> f64 {
    magnitude(&(*a - *b))
}

pub fn magnitude(v: &Landmark) -> f64 {
    dot(v, v).sqrt()
}

pub fn dot(u: &Landmark, v: &Landmark) -> f64 {
    u.x * v.x + u.y * v.y + u.z * v.z
}

pub fn cross(u: &Landmark, v: &Landmark) -> Landmark {
    Landmark::new(
        u.y * v.z - u.z * v.y,
        u.z * v.x - u.x * v.z,
        u.x * v.y - u.y * v.x,
    )
}

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Fails with [`Error::DegenerateGeometry`] when either vector has zero length.
pub fn angle_between(u: &Landmark, v: &Landmark, what: &'static str) -> Result<f64> {
    let norm = magnitude(u) * magnitude(v);
    if norm == 0.0 || !norm.is_finite() {
        return Err(Error::DegenerateGeometry(what));
    }
    // atan2 stays exact near 0 and 180 degrees, where acos of a rounded cosine drifts.
    Ok(magnitude(&cross(u, v)).atan2(dot(u, v)).to_degrees())
}

/// Angle at `vertex` between the rays towards `a` and `b`, in degrees.
pub fn vertex_angle(
    a: &Landmark,
    vertex: &Landmark,
    b: &Landmark,
    what: &'static str,
) -> Result<f64> {
    angle_between(&(*a - *vertex), &(*b - *vertex), what)
}
