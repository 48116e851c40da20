use glam::Vec2;
use crate::api::types::PieceId;

/// A single merge piece as tracked by the registry.
/// Position and velocity mirror the physics body after every step.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Unique identifier, also the key into the physics world.
    pub id: PieceId,
    /// Size tier, 1..=MAX_RANK.
    pub rank: u8,
    /// Collider radius, derived from rank.
    pub radius: f32,
    /// Centre in world space (Y grows downward).
    pub pos: Vec2,
    /// Linear velocity from the last physics step.
    pub vel: Vec2,
    /// Body angle in radians, presentation only.
    pub rotation: f32,
    /// True while the piece is aimed and not yet released.
    pub is_static: bool,
    /// Set once the piece is committed to a pending merge; never cleared.
    pub merge_lock: bool,
}

impl Piece {
    /// Create a dynamic, unlocked piece at the origin.
    pub fn new(id: PieceId, rank: u8, radius: f32) -> Self {
        Self {
            id,
            rank,
            radius,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            is_static: false,
            merge_lock: false,
        }
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_vel(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Whether this piece may still be claimed by a new merge.
    pub fn can_merge(&self) -> bool {
        !self.is_static && !self.merge_lock
    }
}
