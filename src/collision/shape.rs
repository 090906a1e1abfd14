//! Shapes a body can have: circles and convex polygons.

use itertools::izip;

use crate::math::{Rotor2, Vec2};

/// The geometry of a body.
///
/// The set of shapes is closed on purpose; collision routines match on
/// every pair of variants exhaustively.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Shape {
    Circle { r: f64 },
    Polygon(Polygon),
}

impl Shape {
    pub fn new_circle(r: f64) -> Self {
        debug_assert!(r > 0.0, "circle radius must be positive");
        Shape::Circle { r }
    }

    /// An axis-aligned box, i.e. the 4-vertex special case of a polygon.
    pub fn new_box(width: f64, height: f64) -> Self {
        Shape::Polygon(Polygon::new_box(width, height))
    }

    pub fn new_polygon(local_vertices: Vec<Vec2>) -> Self {
        Shape::Polygon(Polygon::new(local_vertices))
    }

    /// Moment of inertia of the shape under a unit mass convention,
    /// or None if no formula is known for it.
    ///
    /// A formula exists for circles and 4-vertex polygons only.
    pub fn moment_of_inertia_coef(&self) -> Option<f64> {
        match self {
            Shape::Circle { r } => Some(0.5 * r * r),
            Shape::Polygon(poly) => {
                if poly.local_vertices.len() != 4 {
                    return None;
                }
                let w = (poly.local_vertices[1] - poly.local_vertices[0]).mag();
                let h = (poly.local_vertices[3] - poly.local_vertices[0]).mag();
                Some(0.083333 * (w * w + h * h))
            }
        }
    }

    /// Extent of the shape along the body-local x axis.
    pub fn width(&self) -> f64 {
        match self {
            Shape::Circle { r } => 2.0 * r,
            Shape::Polygon(poly) => poly.local_extent(|v| v.x),
        }
    }

    /// Extent of the shape along the body-local y axis.
    pub fn height(&self) -> f64 {
        match self {
            Shape::Circle { r } => 2.0 * r,
            Shape::Polygon(poly) => poly.local_extent(|v| v.y),
        }
    }

    /// Refresh pose-derived data. Circles have none; a polygon recomputes
    /// its world-space vertices.
    ///
    /// Bodies call this on every pose change, so shapes owned by a body
    /// never need it called manually.
    pub fn update_vertices(&mut self, position: Vec2, rotation: f64) {
        match self {
            Shape::Circle { .. } => {}
            Shape::Polygon(poly) => poly.update_vertices(position, rotation),
        }
    }
}

/// A convex polygon, wound counterclockwise.
///
/// Stores its vertices twice: in body-local space, and a cache of them
/// transformed by the owning body's current pose. The cache is what every
/// collision query reads, so it must be refreshed whenever the pose
/// changes (see [`update_vertices`][Self::update_vertices]).
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Polygon {
    local_vertices: Vec<Vec2>,
    world_vertices: Vec<Vec2>,
}

impl Polygon {
    /// Create a polygon from counterclockwise-wound local vertices.
    ///
    /// Convexity and winding are not checked; collision results are
    /// meaningless if either is violated.
    pub fn new(local_vertices: Vec<Vec2>) -> Self {
        debug_assert!(
            local_vertices.len() >= 3,
            "a polygon needs at least 3 vertices"
        );
        Polygon {
            world_vertices: local_vertices.clone(),
            local_vertices,
        }
    }

    /// A `width` by `height` box centered on the body's position.
    pub fn new_box(width: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Polygon::new(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    #[inline]
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local_vertices
    }

    #[inline]
    pub fn world_vertices(&self) -> &[Vec2] {
        &self.world_vertices
    }

    /// The world-space edge vector leading out of vertex `idx`.
    #[inline]
    pub fn edge_at(&self, idx: usize) -> Vec2 {
        let next = (idx + 1) % self.world_vertices.len();
        self.world_vertices[next] - self.world_vertices[idx]
    }

    /// Recompute the world-space vertex cache for the given pose.
    pub fn update_vertices(&mut self, position: Vec2, rotation: f64) {
        let rotor = Rotor2::from_angle(rotation);
        // the cache length follows the locals, not whatever a snapshot
        // may have carried for it
        self.world_vertices.resize(self.local_vertices.len(), Vec2::zero());
        for (world, local) in izip!(&mut self.world_vertices, &self.local_vertices) {
            *world = rotor * *local + position;
        }
    }

    fn local_extent(&self, axis: impl Fn(&Vec2) -> f64) -> f64 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in &self.local_vertices {
            min = min.min(axis(v));
            max = max.max(axis(v));
        }
        max - min
    }
}
