//! Collision shapes and the narrow-phase overlap tests between them.

mod shape;
pub use shape::{Polygon, Shape};

pub mod narrowphase;
pub use narrowphase::{detect, Contact};
