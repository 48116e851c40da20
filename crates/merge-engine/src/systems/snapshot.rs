//! Presentation feed: per-piece snapshots and the flat instance buffer the
//! browser host reads.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::api::types::PieceId;
use crate::components::rank::RankTable;
use crate::core::registry::PieceRegistry;

/// Read-only view of one piece for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub rank: u8,
    pub position: Vec2,
    pub radius: f32,
    pub is_static: bool,
}

/// Snapshot of every tracked piece, in registry order.
pub fn take_snapshot(registry: &PieceRegistry) -> Vec<PieceSnapshot> {
    registry
        .iter()
        .map(|p| PieceSnapshot {
            id: p.id,
            rank: p.rank,
            position: p.pos,
            radius: p.radius,
            is_static: p.is_static,
        })
        .collect()
}

/// Per-piece render data shared with the host.
/// Must match the host protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PieceInstance {
    pub x: f32,
    pub y: f32,
    /// Radians.
    pub rotation: f32,
    pub radius: f32,
    pub rank: f32,
    /// Sprite scale for the active skin (512 px source covers the diameter).
    pub sprite_scale: f32,
    /// 1.0 while aimed, 0.0 once dropped.
    pub is_static: f32,
    pub id: f32,
}

impl PieceInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Instance buffer rebuilt every frame.
pub struct InstanceBuffer {
    instances: Vec<PieceInstance>,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the contents with the current pieces. Pieces past capacity are
    /// dropped from the feed (the game keeps simulating them).
    pub fn rebuild(&mut self, registry: &PieceRegistry, ranks: &RankTable) {
        self.instances.clear();
        for piece in registry.iter().take(self.capacity) {
            self.instances.push(PieceInstance {
                x: piece.pos.x,
                y: piece.pos.y,
                rotation: piece.rotation,
                radius: piece.radius,
                rank: piece.rank as f32,
                sprite_scale: ranks.sprite_scale(piece.rank),
                is_static: if piece.is_static { 1.0 } else { 0.0 },
                id: piece.id.0 as f32,
            });
        }
        if registry.len() > self.capacity {
            log::warn!(
                "instance buffer full: {} pieces, {} exported",
                registry.len(),
                self.capacity
            );
        }
    }

    pub fn instances(&self) -> &[PieceInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw pointer to instance data for host reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    /// Instance data as a flat float slice.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::piece::Piece;
    use crate::components::rank::Skin;
    use crate::core::scripted::ScriptedWorld;

    fn registry_with(ranks: &[(u8, Vec2, bool)]) -> PieceRegistry {
        let table = RankTable::default();
        let mut world = ScriptedWorld::new();
        let mut registry = PieceRegistry::new();
        for &(rank, pos, is_static) in ranks {
            let id = registry.next_id();
            let piece = Piece::new(id, rank, table.radius(rank))
                .with_pos(pos)
                .with_static(is_static);
            registry.spawn(&mut world, piece);
        }
        registry
    }

    #[test]
    fn piece_instance_is_8_floats() {
        assert_eq!(std::mem::size_of::<PieceInstance>(), PieceInstance::STRIDE_BYTES);
        assert_eq!(PieceInstance::FLOATS, 8);
    }

    #[test]
    fn snapshot_follows_registry_order() {
        let registry = registry_with(&[
            (2, Vec2::new(225.0, 50.0), true),
            (1, Vec2::new(100.0, 600.0), false),
        ]);
        let snap = take_snapshot(&registry);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].id, PieceId(1));
        assert!(snap[0].is_static);
        assert_eq!(snap[0].radius, 30.0);
        assert_eq!(snap[1].rank, 1);
        assert_eq!(snap[1].position, Vec2::new(100.0, 600.0));
    }

    #[test]
    fn rebuild_writes_flat_floats() {
        let registry = registry_with(&[(3, Vec2::new(120.0, 400.0), false)]);
        let mut buf = InstanceBuffer::new(8);
        buf.rebuild(&registry, &RankTable::new(Skin::Planet));

        assert_eq!(buf.instance_count(), 1);
        let floats = buf.as_floats();
        assert_eq!(floats.len(), PieceInstance::FLOATS);
        assert_eq!(&floats[..2], &[120.0, 400.0]);
        assert_eq!(floats[3], 45.0);
        assert_eq!(floats[4], 3.0);
        assert!((floats[5] - 90.0 / 512.0).abs() < 1e-6);
        assert_eq!(floats[6], 0.0);
        assert_eq!(floats[7], 1.0);
    }

    #[test]
    fn rebuild_respects_capacity() {
        let registry = registry_with(&[
            (1, Vec2::ZERO, false),
            (1, Vec2::ZERO, false),
            (1, Vec2::ZERO, false),
        ]);
        let mut buf = InstanceBuffer::new(2);
        buf.rebuild(&registry, &RankTable::default());
        assert_eq!(buf.instance_count(), 2);

        buf.rebuild(&PieceRegistry::new(), &RankTable::default());
        assert_eq!(buf.instance_count(), 0);
    }
}
