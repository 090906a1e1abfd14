//! Bodies, the objects being simulated, and their kinematic state.

use crate::{
    collision::Shape,
    math::{left_normal, Vec2},
};

/// Fixed multiplier applied to linear velocity on every integration step.
///
/// A numerical stability measure, not a physical law; treat it as a
/// tunable constant.
pub const LINEAR_DAMPING: f64 = 0.99;

/// Mass of a body with its inverse cached.
///
/// A zero mass means the body cannot be moved by forces or impulses;
/// its inverse is stored as zero so it drops out of the contact math.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Mass {
    mass: f64,
    inverse: f64,
}

impl Mass {
    pub fn new(mass: f64) -> Self {
        let inverse = if mass == 0.0 { 0.0 } else { 1.0 / mass };
        Mass { mass, inverse }
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn inverse(&self) -> f64 {
        self.inverse
    }
}

impl From<f64> for Mass {
    fn from(mass: f64) -> Self {
        Mass::new(mass)
    }
}

/// Surface properties of a body, combined pairwise when two bodies touch.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Material {
    /// Bounciness in [0, 1]: how much relative normal velocity survives a
    /// collision. 1 is perfectly elastic, 0 perfectly inelastic.
    pub restitution: f64,
    /// Friction coefficient (>= 0) scaling the tangential contact impulse.
    pub friction: f64,
}

impl Material {
    pub fn new(restitution: f64, friction: f64) -> Self {
        Material {
            restitution,
            friction,
        }
    }

    /// Restitution of a contact between this material and another:
    /// the lesser of the two.
    #[inline]
    pub fn restitution_with(&self, other: &Material) -> f64 {
        self.restitution.min(other.restitution)
    }

    /// Friction of a contact between this material and another:
    /// the lesser of the two.
    #[inline]
    pub fn friction_with(&self, other: &Material) -> f64 {
        self.friction.min(other.friction)
    }
}

impl Default for Material {
    fn default() -> Self {
        Material {
            restitution: 0.7,
            friction: 0.7,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// Dynamic bodies need a finite, non-negative mass.
    #[error("body mass must be finite and non-negative")]
    InvalidMass,
    /// There is no moment of inertia formula for the given shape;
    /// dynamic polygons must be 4-vertex boxes.
    #[error("no moment of inertia formula for this shape")]
    UnsupportedInertia,
}

/// A simulated object: one shape plus kinematic state.
///
/// Forces and torques accumulate between steps and are consumed by
/// integration (accumulate-then-clear, one window per tick). Position and
/// rotation are only writable through methods so the shape's world-space
/// data is refreshed on every pose change and can never go stale.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "BodySnapshot")
)]
pub struct Body {
    shape: Shape,
    position: Vec2,
    rotation: f64,
    pub velocity: Vec2,
    pub angular_velocity: f64,
    acceleration: Vec2,
    angular_acceleration: f64,
    sum_forces: Vec2,
    sum_torque: f64,
    mass: Mass,
    moment_of_inertia: f64,
    inv_moment_of_inertia: f64,
    pub material: Material,
    is_static: bool,
}

impl Body {
    /// Create a body that moves under forces and impulses.
    ///
    /// A mass of zero is allowed and makes the body immovable while
    /// keeping it non-static. Fails if the mass is negative or not
    /// finite, or if the shape has no moment of inertia formula
    /// (a polygon that is not a 4-vertex box).
    pub fn new_dynamic(
        shape: Shape,
        position: Vec2,
        mass: f64,
        material: Material,
    ) -> Result<Self, BodyError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(BodyError::InvalidMass);
        }
        let moment = shape
            .moment_of_inertia_coef()
            .filter(|coef| *coef > 0.0)
            .ok_or(BodyError::UnsupportedInertia)?;
        Ok(Self::with_parts(
            shape,
            position,
            Mass::new(mass),
            moment,
            material,
            false,
        ))
    }

    /// Create a body that never moves.
    ///
    /// Any shape is accepted; where no moment of inertia formula exists
    /// the body's rotational compliance is treated as infinite.
    pub fn new_static(shape: Shape, position: Vec2, material: Material) -> Self {
        let moment = match shape.moment_of_inertia_coef() {
            Some(coef) if coef > 0.0 => coef,
            _ => f64::INFINITY,
        };
        Self::with_parts(shape, position, Mass::new(0.0), moment, material, true)
    }

    fn with_parts(
        shape: Shape,
        position: Vec2,
        mass: Mass,
        moment_of_inertia: f64,
        material: Material,
        is_static: bool,
    ) -> Self {
        let mut body = Body {
            shape,
            position,
            rotation: 0.0,
            velocity: Vec2::zero(),
            angular_velocity: 0.0,
            acceleration: Vec2::zero(),
            angular_acceleration: 0.0,
            sum_forces: Vec2::zero(),
            sum_torque: 0.0,
            mass,
            moment_of_inertia,
            inv_moment_of_inertia: 1.0 / moment_of_inertia,
            material,
            is_static,
        };
        // establish the world-space cache for the starting pose
        body.shape.update_vertices(position, 0.0);
        body
    }

    //
    // accessors
    //

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass.mass()
    }

    #[inline]
    pub fn inv_mass(&self) -> f64 {
        if self.is_static {
            0.0
        } else {
            self.mass.inverse()
        }
    }

    /// Moment of inertia of the body's shape under a unit mass convention.
    #[inline]
    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True if nothing can move this body: it is static or has zero mass.
    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.is_static || self.mass.mass() == 0.0
    }

    /// Linear acceleration derived during the latest integration step.
    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Angular acceleration derived during the latest integration step.
    #[inline]
    pub fn angular_acceleration(&self) -> f64 {
        self.angular_acceleration
    }

    #[inline]
    pub fn sum_forces(&self) -> Vec2 {
        self.sum_forces
    }

    #[inline]
    pub fn sum_torque(&self) -> f64 {
        self.sum_torque
    }

    //
    // pose
    //

    /// Move and orient the body.
    ///
    /// This is the single pose mutation path; every other way of moving a
    /// body goes through it, which keeps the shape's world-space vertices
    /// in sync with the pose at all times.
    pub fn set_pose(&mut self, position: Vec2, rotation: f64) {
        self.position = position;
        self.rotation = rotation;
        self.shape.update_vertices(position, rotation);
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.set_pose(position, self.rotation);
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.set_pose(self.position, rotation);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_pose(self.position + delta, self.rotation);
    }

    //
    // forces & impulses
    //

    /// Accumulate a force for the next integration step.
    pub fn apply_force(&mut self, force: Vec2) {
        self.sum_forces += force;
    }

    /// Accumulate a torque for the next integration step.
    pub fn apply_torque(&mut self, torque: f64) {
        self.sum_torque += torque;
    }

    /// Apply an instantaneous momentum change at `offset` from the center
    /// of mass. Static bodies ignore impulses entirely.
    pub fn apply_impulse(&mut self, impulse: Vec2, offset: Vec2) {
        if self.is_static {
            return;
        }
        self.velocity += impulse * self.mass.inverse();
        self.angular_velocity += offset.wedge(impulse).xy * self.inv_moment_of_inertia;
    }

    /// Velocity of the body point at `offset` from the center of mass,
    /// including the contribution of the body's spin.
    pub fn point_velocity(&self, offset: Vec2) -> Vec2 {
        self.velocity + left_normal(offset) * self.angular_velocity
    }

    //
    // integration
    //

    /// Advance linear and angular state by `dt` seconds.
    pub fn integrate(&mut self, dt: f64) {
        self.integrate_linear(dt);
        self.integrate_angular(dt);
    }

    /// Semi-implicit Euler update of velocity and position.
    ///
    /// Velocity is additionally scaled by [`LINEAR_DAMPING`] each step.
    /// Immovable bodies only have their force accumulator cleared.
    pub fn integrate_linear(&mut self, dt: f64) {
        let force = std::mem::replace(&mut self.sum_forces, Vec2::zero());
        if self.is_immovable() {
            return;
        }
        self.acceleration = force * self.mass.inverse();
        self.velocity += self.acceleration * dt;
        self.velocity *= LINEAR_DAMPING;
        self.set_pose(self.position + self.velocity * dt, self.rotation);
    }

    /// Semi-implicit Euler update of angular velocity and rotation, with
    /// `angular_acceleration = sum_torque / (moment_of_inertia * mass)`.
    ///
    /// Immovable bodies only have their torque accumulator cleared.
    pub fn integrate_angular(&mut self, dt: f64) {
        let torque = std::mem::replace(&mut self.sum_torque, 0.0);
        if self.is_immovable() {
            return;
        }
        self.angular_acceleration = torque / (self.moment_of_inertia * self.mass.mass());
        self.angular_velocity += self.angular_acceleration * dt;
        self.set_pose(self.position, self.rotation + self.angular_velocity * dt);
    }
}

/// The raw fields of a [`Body`] as they appear in a serialized scene.
///
/// Deserialization goes through this mirror so that a loaded body
/// rebuilds its shape's world-space cache from the restored pose instead
/// of trusting whatever the snapshot carried for it.
#[cfg(feature = "serde-types")]
#[derive(serde::Deserialize)]
#[serde(rename = "Body")]
struct BodySnapshot {
    shape: Shape,
    position: Vec2,
    rotation: f64,
    velocity: Vec2,
    angular_velocity: f64,
    acceleration: Vec2,
    angular_acceleration: f64,
    sum_forces: Vec2,
    sum_torque: f64,
    mass: Mass,
    moment_of_inertia: f64,
    inv_moment_of_inertia: f64,
    material: Material,
    is_static: bool,
}

#[cfg(feature = "serde-types")]
impl From<BodySnapshot> for Body {
    fn from(snapshot: BodySnapshot) -> Self {
        let mut body = Body {
            shape: snapshot.shape,
            position: snapshot.position,
            rotation: snapshot.rotation,
            velocity: snapshot.velocity,
            angular_velocity: snapshot.angular_velocity,
            acceleration: snapshot.acceleration,
            angular_acceleration: snapshot.angular_acceleration,
            sum_forces: snapshot.sum_forces,
            sum_torque: snapshot.sum_torque,
            mass: snapshot.mass,
            moment_of_inertia: snapshot.moment_of_inertia,
            inv_moment_of_inertia: snapshot.inv_moment_of_inertia,
            material: snapshot.material,
            is_static: snapshot.is_static,
        };
        body.set_pose(snapshot.position, snapshot.rotation);
        body
    }
}
