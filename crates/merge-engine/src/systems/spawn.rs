//! Spawn/aim controller: the single aimed piece.
//!
//! Lifecycle of the aimed piece: `spawn` pins a random low-rank piece at the
//! top centre, `update_aim` slides it horizontally inside the walls, and
//! `release` hands it to physics and schedules the next spawn.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::api::config::GameConfig;
use crate::api::game::{Phase, Session};
use crate::api::types::PieceId;
use crate::components::piece::Piece;
use crate::components::rank::{RankTable, SPAWN_RANKS};
use crate::core::physics::PhysicsAdapter;
use crate::core::registry::PieceRegistry;
use crate::core::timeline::{Timeline, TimelineAction};

/// Clamp an aim coordinate so a piece of `radius` stays between the walls.
///
/// NaN aims at the field centre. A piece wider than the field is centred.
pub fn clamp_aim_x(x: f32, radius: f32, left: f32, right: f32) -> f32 {
    let lo = left + radius;
    let hi = right - radius;
    if x.is_nan() || lo > hi {
        return (left + right) / 2.0;
    }
    x.clamp(lo, hi)
}

pub struct AimController {
    rng: Pcg32,
    spawn_point: Vec2,
    field_left: f32,
    field_right: f32,
    spawn_delay: f32,
    drop_debounce: f32,
}

impl AimController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            spawn_point: config.spawn_point(),
            field_left: config.field_left(),
            field_right: config.field_right(),
            spawn_delay: config.spawn_delay,
            drop_debounce: config.drop_debounce,
        }
    }

    /// Create the next aimed piece. No-op once the session is over or while
    /// another piece is still aimed.
    pub fn spawn<W: PhysicsAdapter + ?Sized>(
        &mut self,
        session: &mut Session,
        registry: &mut PieceRegistry,
        world: &mut W,
        ranks: &RankTable,
        timeline: &mut Timeline,
    ) -> Option<PieceId> {
        if session.game_over || session.aimed.is_some() {
            return None;
        }

        let rank = self.rng.random_range(SPAWN_RANKS);
        let id = registry.next_id();
        let piece = Piece::new(id, rank, ranks.radius(rank))
            .with_pos(self.spawn_point)
            .with_static(true);
        registry.spawn(world, piece);

        session.aimed = Some(id);
        session.phase = Phase::Aiming;
        if self.drop_debounce > 0.0 {
            session.can_drop = false;
            timeline.schedule(self.drop_debounce, TimelineAction::EnableDrop);
        } else {
            session.can_drop = true;
        }
        log::debug!("spawned aimed piece {} (rank {})", id.0, rank);
        Some(id)
    }

    /// Slide the aimed piece to `x`, clamped by its own radius. Returns the new
    /// position, or `None` when there is nothing to aim.
    pub fn update_aim<W: PhysicsAdapter + ?Sized>(
        &self,
        x: f32,
        session: &Session,
        registry: &mut PieceRegistry,
        world: &mut W,
    ) -> Option<Vec2> {
        if session.game_over {
            return None;
        }
        let piece = registry.get_mut(session.aimed?)?;
        if !piece.is_static {
            return None;
        }

        let clamped = clamp_aim_x(x, piece.radius, self.field_left, self.field_right);
        let pos = Vec2::new(clamped, self.spawn_point.y);
        piece.pos = pos;
        world.set_position(piece.id, pos);
        Some(pos)
    }

    /// Drop the aimed piece into the simulation and schedule the next spawn.
    /// No-op unless a static piece is aimed, dropping is allowed, and the
    /// session is still running.
    pub fn release<W: PhysicsAdapter + ?Sized>(
        &mut self,
        session: &mut Session,
        registry: &mut PieceRegistry,
        world: &mut W,
        timeline: &mut Timeline,
    ) -> Option<PieceId> {
        if session.game_over || !session.can_drop {
            return None;
        }
        let piece = registry.get_mut(session.aimed?)?;
        if !piece.is_static {
            return None;
        }

        piece.is_static = false;
        piece.vel = Vec2::ZERO;
        let id = piece.id;
        world.set_body_static(id, false);

        session.aimed = None;
        session.can_drop = false;
        session.phase = Phase::Released;
        timeline.schedule(self.spawn_delay, TimelineAction::SpawnNext);
        log::debug!("released piece {}", id.0);
        Some(id)
    }
}
