// Profiling spans resolve to no-ops unless the tracy feature is enabled.
macro_rules! tracy_span {
    ($name:expr, $function:expr) => {
        ::tracy_client::Client::running()
            .map(|client| client.span_alloc(Some($name), $function, file!(), line!(), 0))
    };
}

pub mod math;
pub use math::{
    left_normal, right_normal, unit_left_normal, unit_right_normal, uv, Rotor2, Unit, Vec2,
};

pub mod collision;
pub use collision::{detect, Contact, Polygon, Shape};

pub mod body;
pub use body::{Body, BodyError, Mass, Material};

pub mod solver;
pub use solver::{resolve, resolve_impulse, resolve_penetration};

pub mod forces;

pub mod world;
pub use world::{clamp_timestep, ContactEvent, World};
