//! Narrow-phase collision detection: precise overlap tests between
//! pairs of shapes, producing a single contact per pair.

use itertools::Itertools;

use super::shape::{Polygon, Shape};
use crate::{
    body::Body,
    math::{right_normal, Unit, Vec2},
};

/// A single point of contact between two overlapping bodies.
///
/// Ephemeral: produced by [`detect`] and consumed by the solver within
/// the same step. The normal points from the first body toward the
/// second. `start` lies on the second body's surface and `end` on the
/// first's; the distance between them along the normal is `depth`.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Contact {
    pub normal: Unit<Vec2>,
    pub start: Vec2,
    pub end: Vec2,
    pub depth: f64,
}

/// Check a pair of bodies for overlap.
///
/// Returns None if both bodies are static or the shapes do not overlap.
/// The contact is expressed in the order the bodies were passed: the
/// normal faces from `a` toward `b` no matter which shape each one has.
pub fn detect(a: &Body, b: &Body) -> Option<Contact> {
    if a.is_static() && b.is_static() {
        return None;
    }
    match (a.shape(), b.shape()) {
        (Shape::Circle { r: ra }, Shape::Circle { r: rb }) => {
            circle_circle(a.position(), *ra, b.position(), *rb)
        }
        (Shape::Polygon(pa), Shape::Polygon(pb)) => polygon_polygon(pa, pb),
        (Shape::Polygon(poly), Shape::Circle { r }) => polygon_circle(poly, b.position(), *r),
        (Shape::Circle { r }, Shape::Polygon(poly)) => {
            polygon_circle(poly, a.position(), *r).map(flip)
        }
    }
}

/// Reverse the roles of the two bodies in a contact.
fn flip(contact: Contact) -> Contact {
    Contact {
        normal: -contact.normal,
        start: contact.end,
        end: contact.start,
        depth: contact.depth,
    }
}

//
// CIRCLE <-> CIRCLE
//

fn circle_circle(pos_a: Vec2, ra: f64, pos_b: Vec2, rb: f64) -> Option<Contact> {
    let d = pos_b - pos_a;
    let distance = d.mag();
    if distance > ra + rb {
        return None;
    }

    let normal = if distance == 0.0 {
        // coincident centers, consider the penetration to be on the x axis
        Unit::unit_x()
    } else {
        Unit::new_normalize(d)
    };

    let start = pos_b - *normal * rb;
    let end = pos_a + *normal * ra;

    Some(Contact {
        normal,
        start,
        end,
        depth: (end - start).mag(),
    })
}

//
// POLYGON <-> POLYGON
//

fn polygon_polygon(a: &Polygon, b: &Polygon) -> Option<Contact> {
    let (ab_penetration, a_normal, b_vertex) = best_penetration(a, b)?;
    let (ba_penetration, b_normal, a_vertex) = best_penetration(b, a)?;

    // a non-negative best penetration means a separating axis exists
    if ab_penetration >= 0.0 || ba_penetration >= 0.0 {
        return None;
    }

    // resolve along the shallower direction (least negative penetration,
    // i.e. the axis of minimum translation)
    Some(if ab_penetration >= ba_penetration {
        let depth = -ab_penetration;
        Contact {
            normal: a_normal,
            start: b_vertex,
            end: b_vertex + *a_normal * depth,
            depth,
        }
    } else {
        let depth = -ba_penetration;
        Contact {
            // the winning normal faces b -> a; flip it to face a -> b
            normal: -b_normal,
            start: a_vertex + *b_normal * depth,
            end: a_vertex,
            depth,
        }
    })
}

/// How far `other`'s deepest vertex penetrates past each edge of
/// `reference`, measured along the edge's outward normal; the best
/// (least negative) such penetration is the separating-axis candidate
/// for this direction.
///
/// Returns the best penetration together with the edge normal and the
/// vertex of `other` realizing it, or None if `reference` has no usable
/// edges at all.
fn best_penetration(reference: &Polygon, other: &Polygon) -> Option<(f64, Unit<Vec2>, Vec2)> {
    let mut best: Option<(f64, Unit<Vec2>, Vec2)> = None;

    for (vertex, next) in reference.world_vertices().iter().circular_tuple_windows() {
        let edge = *next - *vertex;
        if edge.mag_sq() == 0.0 {
            // zero-length edge, no axis to test
            continue;
        }
        let normal = Unit::new_normalize(right_normal(edge));

        let mut min_penetration = f64::INFINITY;
        let mut min_vertex = Vec2::zero();
        for v_other in other.world_vertices() {
            let penetration = (*v_other - *vertex).dot(*normal);
            if penetration < min_penetration {
                min_penetration = penetration;
                min_vertex = *v_other;
            }
        }

        match best {
            Some((best_pen, ..)) if min_penetration <= best_pen => {}
            _ => best = Some((min_penetration, normal, min_vertex)),
        }
    }

    best
}

//
// POLYGON <-> CIRCLE
//

fn polygon_circle(poly: &Polygon, center: Vec2, radius: f64) -> Option<Contact> {
    let verts = poly.world_vertices();
    let count = verts.len();

    // signed distance of the circle center past each edge along its
    // outward normal; the edge with the largest value is the closest
    let mut projections = Vec::with_capacity(count);
    let mut closest_distance = f64::NEG_INFINITY;
    let mut closest_idx = 0;

    for (idx, vertex) in verts.iter().enumerate() {
        let edge = poly.edge_at(idx);
        if edge.mag_sq() == 0.0 {
            projections.push(f64::NEG_INFINITY);
            continue;
        }
        let normal = Unit::new_normalize(right_normal(edge));
        let projection = (center - *vertex).dot(*normal);
        projections.push(projection);
        if projection > closest_distance {
            closest_distance = projection;
            closest_idx = idx;
        }
    }

    if closest_distance == f64::NEG_INFINITY {
        // no usable edges
        return None;
    }
    if closest_distance > radius {
        // separated beyond the closest face
        return None;
    }

    let prev_idx = (closest_idx + count - 1) % count;
    let next_idx = (closest_idx + 1) % count;

    // region classification: the face case must come before the vertex
    // cases so contacts stay stable across edge-region seams
    if closest_distance < 0.0 {
        // center is inside the polygon
        Some(face_contact(poly, closest_idx, center, radius, closest_distance))
    } else if projections[prev_idx] > 0.0 {
        // corner region of the closest vertex
        Some(vertex_contact(verts[closest_idx], center, radius))
    } else if projections[next_idx] > 0.0 {
        // corner region of the next vertex
        Some(vertex_contact(verts[next_idx], center, radius))
    } else {
        // within the face's slab
        Some(face_contact(poly, closest_idx, center, radius, closest_distance))
    }
}

fn face_contact(
    poly: &Polygon,
    edge_idx: usize,
    center: Vec2,
    radius: f64,
    distance: f64,
) -> Contact {
    let normal = Unit::new_normalize(right_normal(poly.edge_at(edge_idx)));
    let start = center - *normal * radius;
    let depth = radius - distance;
    Contact {
        normal,
        start,
        end: start + *normal * depth,
        depth,
    }
}

fn vertex_contact(vertex: Vec2, center: Vec2, radius: f64) -> Contact {
    let normal = Unit::new_normalize(center - vertex);
    let start = center - *normal * radius;
    Contact {
        normal,
        start,
        end: vertex,
        depth: (start - vertex).mag(),
    }
}
