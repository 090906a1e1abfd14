//! The world driver: owns the bodies and advances the whole simulation
//! one timestep at a time.

use crate::{
    body::Body,
    collision::{detect, Contact},
    forces,
    math::Vec2,
    solver,
};

/// Longest timestep [`World::step`] will simulate in one call, in
/// seconds. Wall-clock hitches beyond this are cut down rather than
/// integrated, trading slow-motion for stability.
pub const MAX_TIMESTEP: f64 = 0.016;

/// Clamp a measured timestep into the stable simulation range.
///
/// Values above [`MAX_TIMESTEP`] are cut down and negative values floor
/// at zero instead of running the simulation backwards.
#[inline]
pub fn clamp_timestep(dt: f64) -> f64 {
    dt.clamp(0.0, MAX_TIMESTEP)
}

/// A contact found during a step, kept for inspection and debug
/// drawing. Rebuilt from scratch every step; never fed back into the
/// simulation.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ContactEvent {
    /// Indices of the two bodies, in ascending order.
    pub bodies: [usize; 2],
    pub contact: Contact,
}

/// All simulated bodies plus the global simulation parameters.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct World {
    /// Acceleration applied to every dynamic body as a weight force,
    /// in units per second squared.
    pub gravity: Vec2,
    bodies: Vec<Body>,
    #[cfg_attr(feature = "serde-types", serde(skip))]
    contacts: Vec<ContactEvent>,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        World {
            gravity,
            bodies: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Add a body and get back its index, stable for the lifetime of
    /// the world.
    pub fn add_body(&mut self, body: Body) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Contacts found during the most recent step.
    pub fn contacts(&self) -> &[ContactEvent] {
        &self.contacts
    }

    /// Advance the simulation by `dt` seconds (clamped per
    /// [`clamp_timestep`]).
    ///
    /// Three strictly ordered passes: accumulate gravity into every
    /// body, test every pair in ascending index order resolving each
    /// contact immediately as it is found, then integrate every body
    /// exactly once.
    pub fn step(&mut self, dt: f64) {
        let _span = tracy_span!("world step", "step");
        let dt = clamp_timestep(dt);

        for body in &mut self.bodies {
            let weight = forces::weight(body.mass(), self.gravity);
            body.apply_force(weight);
        }

        {
            let _span = tracy_span!("detect and resolve", "step");
            self.contacts.clear();
            for a_idx in 0..self.bodies.len() {
                let (head, tail) = self.bodies.split_at_mut(a_idx + 1);
                let body_a = &mut head[a_idx];
                for (b_off, body_b) in tail.iter_mut().enumerate() {
                    if let Some(contact) = detect(body_a, body_b) {
                        solver::resolve(body_a, body_b, &contact);
                        self.contacts.push(ContactEvent {
                            bodies: [a_idx, a_idx + 1 + b_off],
                            contact,
                        });
                    }
                }
            }
        }

        {
            let _span = tracy_span!("integrate", "step");
            for body in &mut self.bodies {
                body.integrate(dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body::Material, collision::Shape};
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn ball(r: f64, position: Vec2, mass: f64, material: Material) -> Body {
        Body::new_dynamic(Shape::new_circle(r), position, mass, material).unwrap()
    }

    #[test]
    fn timestep_clamping() {
        assert_eq!(clamp_timestep(0.008), 0.008);
        assert_eq!(clamp_timestep(0.5), MAX_TIMESTEP);
        assert_eq!(clamp_timestep(-0.2), 0.0);
    }

    #[test]
    fn free_fall_accumulates_then_clears_gravity() {
        let mut world = World::new(Vec2::new(0.0, -9.8));
        let idx = world.add_body(ball(1.0, Vec2::zero(), 1.0, Material::default()));
        world.step(0.016);

        let body = world.body(idx).unwrap();
        // the weight force went through the accumulator and out again
        assert!((body.acceleration() - Vec2::new(0.0, -9.8)).mag() < EPS);
        assert!(body.sum_forces().mag() < EPS);

        let expected_vel = -9.8 * 0.016 * 0.99;
        assert!((body.velocity.y - expected_vel).abs() < EPS);
        assert!((body.position().y - expected_vel * 0.016).abs() < EPS);
    }

    #[test]
    fn oversized_timestep_behaves_like_the_ceiling() {
        let build = || {
            let mut world = World::new(Vec2::new(0.0, -9.8));
            world.add_body(ball(1.0, Vec2::zero(), 1.0, Material::default()));
            world
        };
        let mut clamped = build();
        let mut ceiling = build();
        clamped.step(2.5);
        ceiling.step(MAX_TIMESTEP);

        let (a, b) = (clamped.body(0).unwrap(), ceiling.body(0).unwrap());
        assert_eq!(a.position().y, b.position().y);
        assert_eq!(a.velocity.y, b.velocity.y);
    }

    #[test]
    fn overlapping_circles_are_pushed_apart() {
        let mat = Material::new(0.7, 0.0);
        let mut world = World::new(Vec2::zero());
        world.add_body(ball(10.0, Vec2::zero(), 1.0, mat));
        world.add_body(ball(10.0, Vec2::new(15.0, 0.0), 1.0, mat));

        world.step(0.016);

        // depth 5 split evenly, and the contact was recorded as seen
        // before resolution
        assert!((world.body(0).unwrap().position() - Vec2::new(-2.5, 0.0)).mag() < EPS);
        assert!((world.body(1).unwrap().position() - Vec2::new(17.5, 0.0)).mag() < EPS);
        assert_eq!(world.contacts().len(), 1);
        assert_eq!(world.contacts()[0].bodies, [0, 1]);
        assert!((world.contacts()[0].contact.depth - 5.0).abs() < EPS);

        // now exactly touching, which still counts as a contact for
        // circles, at zero depth
        world.step(0.016);
        assert_eq!(world.contacts().len(), 1);
        assert!(world.contacts()[0].contact.depth.abs() < EPS);

        // the contact list is rebuilt once the pair separates
        world.body_mut(1).unwrap().set_position(Vec2::new(100.0, 0.0));
        world.step(0.016);
        assert!(world.contacts().is_empty());
    }

    #[test]
    fn ball_rests_on_static_floor() {
        let mat = Material::new(0.0, 0.0);
        let mut world = World::new(Vec2::new(0.0, -9.8));
        let ball_idx = world.add_body(ball(5.0, Vec2::new(0.0, 5.0), 1.0, mat));
        let floor_idx = world.add_body(Body::new_static(
            Shape::new_box(40.0, 10.0),
            Vec2::new(0.0, -5.0),
            mat,
        ));

        for _ in 0..120 {
            world.step(0.016);
        }

        let ball = world.body(ball_idx).unwrap();
        assert!((ball.position().y - 5.0).abs() < 0.1);
        assert!(ball.position().x.abs() < EPS);

        let floor = world.body(floor_idx).unwrap();
        assert!((floor.position() - Vec2::new(0.0, -5.0)).mag() < EPS);
        assert!(floor.rotation().abs() < EPS);
        assert!(floor.velocity.mag() < EPS);
        assert!(floor.angular_velocity.abs() < EPS);
    }

    #[test]
    fn mixed_shapes_settle_without_blowing_up() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mat = Material::new(0.3, 0.4);
        let mut world = World::new(Vec2::new(0.0, -9.8));
        world.add_body(Body::new_static(
            Shape::new_box(200.0, 10.0),
            Vec2::new(0.0, -5.0),
            mat,
        ));
        for i in 0..12 {
            let position = Vec2::new(rng.gen_range(-40.0..40.0), 10.0 + 12.0 * i as f64);
            let body = if i % 2 == 0 {
                ball(rng.gen_range(1.0..4.0), position, rng.gen_range(0.5..3.0), mat)
            } else {
                Body::new_dynamic(
                    Shape::new_box(rng.gen_range(2.0..6.0), rng.gen_range(2.0..6.0)),
                    position,
                    rng.gen_range(0.5..3.0),
                    mat,
                )
                .unwrap()
            };
            world.add_body(body);
        }

        for _ in 0..200 {
            world.step(0.016);
        }

        for body in world.bodies() {
            assert!(body.position().x.is_finite());
            assert!(body.position().y.is_finite());
            assert!(body.velocity.x.is_finite());
            assert!(body.velocity.y.is_finite());
            assert!(body.angular_velocity.is_finite());
        }
    }

    #[test]
    fn identical_worlds_stay_bitwise_identical() {
        let build = || {
            let mut rng = rand::rngs::StdRng::seed_from_u64(42);
            let mat = Material::new(0.5, 0.2);
            let mut world = World::new(Vec2::new(0.0, -9.8));
            world.add_body(Body::new_static(
                Shape::new_box(100.0, 10.0),
                Vec2::new(0.0, -5.0),
                mat,
            ));
            for _ in 0..10 {
                let position = Vec2::new(rng.gen_range(-30.0..30.0), rng.gen_range(5.0..60.0));
                world.add_body(ball(rng.gen_range(1.0..3.0), position, 1.0, mat));
            }
            world
        };

        let mut w1 = build();
        let mut w2 = build();
        for _ in 0..60 {
            w1.step(0.016);
            w2.step(0.016);
        }

        for (a, b) in w1.bodies().iter().zip(w2.bodies()) {
            assert_eq!(a.position().x, b.position().x);
            assert_eq!(a.position().y, b.position().y);
            assert_eq!(a.velocity.x, b.velocity.x);
            assert_eq!(a.velocity.y, b.velocity.y);
            assert_eq!(a.rotation(), b.rotation());
        }
    }

    #[cfg(feature = "serde-types")]
    mod serde_round_trip {
        use super::*;

        #[test]
        fn world_round_trips_through_ron() {
            let mut world = World::new(Vec2::new(0.0, -490.0));
            world.add_body(Body::new_static(
                Shape::new_box(40.0, 10.0),
                Vec2::new(0.0, -5.0),
                Material::default(),
            ));
            world.add_body(
                Body::new_dynamic(
                    Shape::new_circle(5.0),
                    Vec2::new(0.0, 4.0),
                    2.0,
                    Material::new(0.5, 0.2),
                )
                .unwrap(),
            );
            world.step(0.016);
            assert_eq!(world.contacts().len(), 1);

            let ron = ron::ser::to_string(&world).unwrap();
            let restored: World = ron::de::from_str(&ron).unwrap();

            assert_eq!(restored.bodies().len(), world.bodies().len());
            for (a, b) in world.bodies().iter().zip(restored.bodies()) {
                assert_eq!(a.position().x, b.position().x);
                assert_eq!(a.position().y, b.position().y);
                assert_eq!(a.velocity.x, b.velocity.x);
                assert_eq!(a.mass(), b.mass());
                assert_eq!(a.is_static(), b.is_static());
            }
            // the contact list is transient, not part of the snapshot
            assert!(restored.contacts().is_empty());
        }
    }
}
