//! Math types and helpers for the kernel, built on `ultraviolet`.
//!
//! All simulation math is `f64`; the crate-wide [`Vec2`] and [`Rotor2`]
//! aliases pick the double-precision ultraviolet types.

pub use ultraviolet as uv;

pub type Vec2 = uv::DVec2;
pub type Rotor2 = uv::DRotor2;

/// A wrapper type for a vector that is known to be normalized.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(v.normalized())
    }

    /// Wrap a vector that is already normalized, skipping the normalization.
    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec2::unit_x())
    }

    pub fn unit_y() -> Self {
        Unit(Vec2::unit_y())
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

// rotating a unit vector preserves its length
impl std::ops::Mul<Unit<Vec2>> for Rotor2 {
    type Output = Unit<Vec2>;

    fn mul(self, rhs: Unit<Vec2>) -> Unit<Vec2> {
        Unit(self * rhs.0)
    }
}

// Vec2 utils

/// Counterclockwise perpendicular of a vector.
///
/// Also the 2D angular velocity cross product:
/// `w × r = left_normal(r) * w`.
#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Clockwise perpendicular of a vector.
///
/// For a counterclockwise-wound polygon this is the outward direction
/// of an edge.
#[inline]
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

#[inline]
pub fn unit_left_normal(u: Unit<Vec2>) -> Unit<Vec2> {
    Unit::new_unchecked(left_normal(*u))
}

#[inline]
pub fn unit_right_normal(u: Unit<Vec2>) -> Unit<Vec2> {
    Unit::new_unchecked(right_normal(*u))
}
