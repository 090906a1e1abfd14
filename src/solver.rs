//! Contact resolution: positional de-penetration followed by a single
//! velocity-level impulse exchange per contact.

use crate::{
    body::Body,
    collision::Contact,
    math::{unit_right_normal, Vec2},
};

/// Resolve a detected contact between two bodies.
///
/// Positional correction runs first, then the impulse pass reuses the
/// same contact record with the corrected positions. One call per
/// contact per step; there is no iterative relaxation.
pub fn resolve(a: &mut Body, b: &mut Body, contact: &Contact) {
    resolve_penetration(a, b, contact);
    resolve_impulse(a, b, contact);
}

//
// Positional correction
//

/// Translate two overlapping bodies apart along the contact normal,
/// split in proportion to inverse mass. Static bodies stay put.
pub fn resolve_penetration(a: &mut Body, b: &mut Body, contact: &Contact) {
    let inv_sum = a.inv_mass() + b.inv_mass();
    if inv_sum == 0.0 {
        return;
    }
    let share_a = contact.depth * a.inv_mass() / inv_sum;
    let share_b = contact.depth * b.inv_mass() / inv_sum;

    if !a.is_static() {
        a.translate(-(*contact.normal) * share_a);
    }
    if !b.is_static() {
        b.translate(*contact.normal * share_b);
    }
}

//
// Impulse exchange
//

/// Exchange momentum at the contact point.
///
/// A normal impulse with the combined restitution is computed first,
/// then a tangential impulse along the normal's perpendicular scaled by
/// the combined friction. Both are derived from the same pre-impulse
/// relative velocity and applied as one accumulated impulse, so the
/// passes are independent single solves rather than a coupled friction
/// model.
pub fn resolve_impulse(a: &mut Body, b: &mut Body, contact: &Contact) {
    let e = a.material.restitution_with(&b.material);
    let f = a.material.friction_with(&b.material);

    // lever arms from each center of mass to the contact point on that
    // body's own surface
    let ra = contact.end - a.position();
    let rb = contact.start - b.position();

    let v_rel = a.point_velocity(ra) - b.point_velocity(rb);

    let normal_impulse = impulse_along(a, b, v_rel, ra, rb, *contact.normal, e);
    let tangent_impulse =
        impulse_along(a, b, v_rel, ra, rb, *unit_right_normal(contact.normal), 0.0) * f;
    let impulse = normal_impulse + tangent_impulse;

    a.apply_impulse(impulse, ra);
    b.apply_impulse(-impulse, rb);
}

/// The impulse along `direction` that removes the relative contact
/// velocity in that direction, with restitution `e`:
///
/// ```text
///                      -(1 + e)(v_rel . dir)
/// J = dir * -----------------------------------------------------
///           1/Ma + 1/Mb + (ra x dir)^2 / Ia + (rb x dir)^2 / Ib
/// ```
///
/// Moments of inertia use the unit mass convention. A zero denominator
/// (nothing at the contact can be moved in this direction) yields a
/// zero impulse.
fn impulse_along(
    a: &Body,
    b: &Body,
    v_rel: Vec2,
    ra: Vec2,
    rb: Vec2,
    direction: Vec2,
    e: f64,
) -> Vec2 {
    let ra_cross = ra.wedge(direction).xy;
    let rb_cross = rb.wedge(direction).xy;
    let effective_mass = a.inv_mass()
        + b.inv_mass()
        + ra_cross * ra_cross / a.moment_of_inertia()
        + rb_cross * rb_cross / b.moment_of_inertia();
    if effective_mass == 0.0 {
        return Vec2::zero();
    }

    let magnitude = -(1.0 + e) * v_rel.dot(direction) / effective_mass;
    direction * magnitude
}
