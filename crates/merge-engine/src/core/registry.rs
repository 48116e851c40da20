use glam::Vec2;

use crate::api::types::PieceId;
use crate::components::piece::Piece;
use crate::core::physics::PhysicsAdapter;

/// Authoritative piece storage using a flat Vec.
///
/// Every insertion and removal goes through here so the registry and the
/// physics world never disagree about which pieces exist. Designed for the
/// few dozen pieces a play field holds, not thousands.
pub struct PieceRegistry {
    pieces: Vec<Piece>,
    next_id: u32,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pieces: Vec::with_capacity(capacity),
            next_id: 1,
        }
    }

    /// Reserve the next unique piece id. Ids are never reused, even across
    /// `clear`, so a stale id from a previous session can't alias a new piece.
    pub fn next_id(&mut self) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Track a piece and create its body in the world. A dynamic piece
    /// starts with its `vel`.
    pub fn spawn<W: PhysicsAdapter + ?Sized>(&mut self, world: &mut W, piece: Piece) -> PieceId {
        let id = piece.id;
        world.create_circle(id, piece.pos, piece.radius, piece.is_static);
        if !piece.is_static && piece.vel != Vec2::ZERO {
            world.set_velocity(id, piece.vel);
        }
        self.pieces.push(piece);
        id
    }

    /// Stop tracking a piece and remove its body. Returns the removed piece.
    pub fn despawn<W: PhysicsAdapter + ?Sized>(&mut self, world: &mut W, id: PieceId) -> Option<Piece> {
        let idx = self.pieces.iter().position(|p| p.id == id)?;
        // Keep arrival order stable for snapshots and game-over scans.
        let piece = self.pieces.remove(idx);
        world.remove_body(id);
        Some(piece)
    }

    /// Remove every tracked piece from the registry and the world.
    /// Returns how many pieces were removed.
    pub fn clear<W: PhysicsAdapter + ?Sized>(&mut self, world: &mut W) -> usize {
        let count = self.pieces.len();
        for piece in self.pieces.drain(..) {
            world.remove_body(piece.id);
        }
        count
    }

    /// Copy position, velocity and angle of all pieces back from the world.
    pub fn sync_from<W: PhysicsAdapter + ?Sized>(&mut self, world: &W) {
        for piece in self.pieces.iter_mut() {
            if let Some(pos) = world.position(piece.id) {
                piece.pos = pos;
            }
            if let Some(vel) = world.velocity(piece.id) {
                piece.vel = vel;
            }
            if let Some(rotation) = world.rotation(piece.id) {
                piece.rotation = rotation;
            }
        }
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over all pieces in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Number of tracked pieces.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl Default for PieceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
