//! In-memory `PhysicsAdapter` for unit tests.
//!
//! Bodies never move on their own. Tests place them, set velocities, and queue
//! the contact pairs the next `step_into` should report.

use std::collections::HashMap;

use glam::Vec2;

use crate::api::types::PieceId;
use crate::core::physics::{Boundary, ContactPair, PhysicsAdapter};

#[derive(Debug, Clone, Copy)]
pub struct ScriptedBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub is_static: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedWorld {
    pub bodies: HashMap<PieceId, ScriptedBody>,
    pub boundaries: Vec<Boundary>,
    pub dt: f32,
    pub steps: u32,
    queued: Vec<ContactPair>,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `a`/`b` as touching on the next step.
    pub fn queue_contact(&mut self, a: PieceId, b: PieceId) {
        self.queued.push(ContactPair::new(a, b));
    }

    /// Overwrite a body's position and velocity.
    pub fn place(&mut self, id: PieceId, pos: Vec2, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
            body.vel = vel;
        }
    }

    pub fn body(&self, id: PieceId) -> Option<&ScriptedBody> {
        self.bodies.get(&id)
    }
}

impl PhysicsAdapter for ScriptedWorld {
    fn set_dt(&mut self, dt: f32) {
        self.dt = dt;
    }

    fn create_static_boundary(&mut self, boundary: &Boundary) {
        self.boundaries.push(*boundary);
    }

    fn create_circle(&mut self, id: PieceId, pos: Vec2, radius: f32, is_static: bool) {
        self.bodies.insert(id, ScriptedBody { pos, vel: Vec2::ZERO, radius, is_static });
    }

    fn set_body_static(&mut self, id: PieceId, is_static: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.is_static = is_static;
        }
    }

    fn set_position(&mut self, id: PieceId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    fn set_velocity(&mut self, id: PieceId, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            if !body.is_static {
                body.vel = vel;
            }
        }
    }

    fn remove_body(&mut self, id: PieceId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn step_into(&mut self, contacts: &mut Vec<ContactPair>) {
        self.steps += 1;
        for pair in self.queued.drain(..) {
            if self.bodies.contains_key(&pair.a) && self.bodies.contains_key(&pair.b) {
                contacts.push(pair);
            }
        }
    }

    fn position(&self, id: PieceId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.pos)
    }

    fn velocity(&self, id: PieceId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.vel)
    }

    fn body_count(&self) -> usize {
        self.bodies.len() + self.boundaries.len()
    }
}
