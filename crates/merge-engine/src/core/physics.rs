//! Contract between the merge game loop and a rigid-body world.
//!
//! The game never integrates motion itself. It asks the world to advance one
//! fixed tick, receives the "pair began touching" events for that tick, and
//! reads back positions and velocities. Returning from `step_into` is the
//! step-complete signal: every contact of the step has been delivered by then.

use glam::Vec2;

use crate::api::types::PieceId;

/// Two pieces that started touching during the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPair {
    pub a: PieceId,
    pub b: PieceId,
}

impl ContactPair {
    pub fn new(a: PieceId, b: PieceId) -> Self {
        Self { a, b }
    }

    /// Whether either side of the pair is `id`.
    pub fn involves(&self, id: PieceId) -> bool {
        self.a == id || self.b == id
    }
}

/// Axis-aligned static rectangle (walls, floor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Boundary {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }
}

/// Physical material for piece colliders.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Rigid-body world as seen by the game loop.
///
/// Bodies are keyed by `PieceId`. Boundary bodies have no id and never show up
/// in contact pairs. Lookups on unknown ids return `None` or do nothing.
pub trait PhysicsAdapter {
    /// Set the fixed integration timestep.
    fn set_dt(&mut self, dt: f32);

    /// Add an immovable boundary body.
    fn create_static_boundary(&mut self, boundary: &Boundary);

    /// Add a circular body for a piece.
    fn create_circle(&mut self, id: PieceId, pos: Vec2, radius: f32, is_static: bool);

    /// Switch a piece body between static (pinned) and dynamic (simulated).
    fn set_body_static(&mut self, id: PieceId, is_static: bool);

    /// Teleport a piece body. Used for the aimed piece while it is static.
    fn set_position(&mut self, id: PieceId, pos: Vec2);

    /// Overwrite a piece body's linear velocity. Ignored for static bodies.
    fn set_velocity(&mut self, id: PieceId, vel: Vec2);

    /// Remove a piece body. Returns `false` if the id was unknown.
    fn remove_body(&mut self, id: PieceId) -> bool;

    /// Advance one tick and append the contacts that began during it.
    fn step_into(&mut self, contacts: &mut Vec<ContactPair>);

    fn position(&self, id: PieceId) -> Option<Vec2>;

    fn velocity(&self, id: PieceId) -> Option<Vec2>;

    /// Body angle in radians. Worlds without rotation report none.
    fn rotation(&self, _id: PieceId) -> Option<f32> {
        None
    }

    /// Number of bodies, boundaries included.
    fn body_count(&self) -> usize;
}
