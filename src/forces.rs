//! Force generators: pure functions producing forces for callers to
//! accumulate into bodies ahead of a step.

use crate::math::Vec2;

/// Gravitational force on a body of the given mass.
#[inline]
pub fn weight(mass: f64, gravity: Vec2) -> Vec2 {
    gravity * mass
}

/// Hooke's law spring force pulling `position` toward the rest distance
/// from `anchor`.
///
/// Returns zero at exactly zero separation, where the pull direction is
/// undefined.
pub fn spring(position: Vec2, anchor: Vec2, rest_length: f64, k: f64) -> Vec2 {
    let d = position - anchor;
    let length = d.mag();
    if length == 0.0 {
        return Vec2::zero();
    }
    let displacement = length - rest_length;
    (d / length) * (-k * displacement)
}
