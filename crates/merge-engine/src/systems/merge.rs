//! Collision-to-merge resolution.
//!
//! Two phases per simulation step:
//!
//! 1. While the step's contacts are delivered, [`MergeResolver::on_pair_touch`]
//!    qualifies each pair, locks both pieces, and queues a [`PendingMerge`].
//!    The world is not touched.
//! 2. Once all contacts are in, [`MergeResolver::flush`] applies the queue in
//!    arrival order: remove the two sources, spawn the next rank at their
//!    midpoint moving at their mean velocity, add score. The queue is empty afterwards.
//!
//! The lock set in phase 1 is what stops one piece from being claimed by two
//! contacts of the same step.

use glam::Vec2;

use crate::api::types::PieceId;
use crate::components::piece::Piece;
use crate::components::rank::RankTable;
use crate::core::physics::{ContactPair, PhysicsAdapter};
use crate::core::registry::PieceRegistry;
use crate::error::MergeError;

/// A merge decided at contact time, applied at flush time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMerge {
    pub a: PieceId,
    pub b: PieceId,
    /// Rank shared by both sources.
    pub source_rank: u8,
    pub result_rank: u8,
    pub midpoint: Vec2,
    /// Mean velocity of the sources, inherited by the merged piece so it is
    /// not mistaken for a resting one before its first step.
    pub velocity: Vec2,
}

/// A merge that was applied during flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    /// The newly created piece.
    pub id: PieceId,
    pub rank: u8,
    pub pos: Vec2,
    /// Score awarded for this merge; reported in the SCORE event.
    pub awarded: u64,
}

#[derive(Debug, Default)]
pub struct MergeResolver {
    pending: Vec<PendingMerge>,
}

impl MergeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one "began touching" contact. Returns `true` if the pair was
    /// queued for merging.
    ///
    /// A pair qualifies when both pieces are tracked, dynamic, unlocked, of
    /// equal rank, and that rank can still grow.
    pub fn on_pair_touch(
        &mut self,
        registry: &mut PieceRegistry,
        ranks: &RankTable,
        pair: ContactPair,
    ) -> bool {
        if pair.a == pair.b {
            return false;
        }
        let (Some(a), Some(b)) = (registry.get(pair.a), registry.get(pair.b)) else {
            return false;
        };
        if a.rank != b.rank || !a.can_merge() || !b.can_merge() {
            return false;
        }
        let Some(result_rank) = ranks.merge_result(a.rank) else {
            return false;
        };

        let merge = PendingMerge {
            a: a.id,
            b: b.id,
            source_rank: a.rank,
            result_rank,
            midpoint: (a.pos + b.pos) / 2.0,
            velocity: (a.vel + b.vel) / 2.0,
        };

        for id in [pair.a, pair.b] {
            if let Some(piece) = registry.get_mut(id) {
                piece.merge_lock = true;
            }
        }
        log::debug!(
            "merge queued: {} + {} (rank {}) -> rank {}",
            merge.a.0,
            merge.b.0,
            merge.source_rank,
            merge.result_rank
        );
        self.pending.push(merge);
        true
    }

    /// Apply every pending merge and empty the queue. Awarded points are added
    /// to `score`. Merges whose sources are gone are skipped with a warning and
    /// award nothing.
    pub fn flush<W: PhysicsAdapter + ?Sized>(
        &mut self,
        registry: &mut PieceRegistry,
        world: &mut W,
        ranks: &RankTable,
        score: &mut u64,
    ) -> Vec<MergeOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending.len());

        for merge in self.pending.drain(..) {
            if let Some(missing) = [merge.a, merge.b].into_iter().find(|id| !registry.contains(*id)) {
                let err = MergeError::PieceNotFound { id: missing, context: "merge flush" };
                log::warn!("skipping merge {} + {}: {}", merge.a.0, merge.b.0, err);
                continue;
            }

            registry.despawn(world, merge.a);
            registry.despawn(world, merge.b);

            let id = registry.next_id();
            let piece = Piece::new(id, merge.result_rank, ranks.radius(merge.result_rank))
                .with_pos(merge.midpoint)
                .with_vel(merge.velocity);
            registry.spawn(world, piece);

            let awarded = ranks.score(merge.source_rank);
            *score = score.saturating_add(awarded);

            outcomes.push(MergeOutcome {
                id,
                rank: merge.result_rank,
                pos: merge.midpoint,
                awarded,
            });
        }

        outcomes
    }

    /// Merges queued during the current step.
    pub fn pending(&self) -> &[PendingMerge] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop queued merges without applying them (session reset).
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::rank::MAX_RANK;
    use crate::core::scripted::ScriptedWorld;

    struct Fixture {
        world: ScriptedWorld,
        registry: PieceRegistry,
        ranks: RankTable,
        resolver: MergeResolver,
        score: u64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: ScriptedWorld::new(),
                registry: PieceRegistry::new(),
                ranks: RankTable::default(),
                resolver: MergeResolver::new(),
                score: 0,
            }
        }

        fn piece(&mut self, rank: u8, pos: Vec2) -> PieceId {
            let id = self.registry.next_id();
            let piece = Piece::new(id, rank, self.ranks.radius(rank)).with_pos(pos);
            self.registry.spawn(&mut self.world, piece)
        }

        fn touch(&mut self, a: PieceId, b: PieceId) -> bool {
            self.resolver
                .on_pair_touch(&mut self.registry, &self.ranks, ContactPair::new(a, b))
        }

        fn flush(&mut self) -> Vec<MergeOutcome> {
            self.resolver
                .flush(&mut self.registry, &mut self.world, &self.ranks, &mut self.score)
        }
    }

    #[test]
    fn every_mergeable_rank_produces_next_rank_at_midpoint() {
        for rank in 1..MAX_RANK {
            let mut f = Fixture::new();
            let a = f.piece(rank, Vec2::new(100.0, 400.0));
            let b = f.piece(rank, Vec2::new(140.0, 420.0));

            assert!(f.touch(a, b), "rank {rank} should qualify");
            let outcomes = f.flush();

            assert_eq!(outcomes.len(), 1);
            assert_eq!(f.registry.len(), 1);
            let merged = f.registry.get(outcomes[0].id).unwrap();
            assert_eq!(merged.rank, rank + 1);
            assert_eq!(merged.pos, Vec2::new(120.0, 410.0));
            assert!(!merged.is_static);
            assert!(!merged.merge_lock);
            assert_eq!(f.score, f.ranks.score(rank));
            assert!(f.resolver.is_empty());
        }
    }

    #[test]
    fn merged_piece_inherits_mean_velocity() {
        let mut f = Fixture::new();
        let a = f.piece(1, Vec2::new(200.0, 70.0));
        let b = f.piece(1, Vec2::new(200.0, 110.0));
        f.world.place(a, Vec2::new(200.0, 70.0), Vec2::new(20.0, 300.0));
        f.world.place(b, Vec2::new(200.0, 110.0), Vec2::new(-20.0, 280.0));
        f.registry.sync_from(&f.world);

        assert!(f.touch(a, b));
        let outcomes = f.flush();

        let id = outcomes[0].id;
        assert_eq!(f.registry.get(id).unwrap().vel, Vec2::new(0.0, 290.0));
        assert_eq!(f.world.body(id).unwrap().vel, Vec2::new(0.0, 290.0));
    }

    #[test]
    fn top_rank_never_merges_or_locks() {
        let mut f = Fixture::new();
        let a = f.piece(MAX_RANK, Vec2::new(100.0, 400.0));
        let b = f.piece(MAX_RANK, Vec2::new(300.0, 400.0));

        assert!(!f.touch(a, b));
        assert!(!f.registry.get(a).unwrap().merge_lock);
        assert!(!f.registry.get(b).unwrap().merge_lock);
        assert!(f.flush().is_empty());
        assert_eq!(f.registry.len(), 2);
        assert_eq!(f.score, 0);
    }

    #[test]
    fn different_ranks_do_not_merge() {
        let mut f = Fixture::new();
        let a = f.piece(2, Vec2::ZERO);
        let b = f.piece(3, Vec2::ZERO);
        assert!(!f.touch(a, b));
        assert!(f.resolver.is_empty());
    }

    #[test]
    fn locked_piece_is_claimed_once_per_step() {
        let mut f = Fixture::new();
        let a = f.piece(1, Vec2::new(100.0, 400.0));
        let b = f.piece(1, Vec2::new(140.0, 400.0));
        let c = f.piece(1, Vec2::new(60.0, 400.0));

        assert!(f.touch(a, b));
        assert!(!f.touch(a, c), "a is already locked");
        assert!(!f.touch(c, b), "b is already locked");
        assert_eq!(f.resolver.pending().len(), 1);

        let outcomes = f.flush();
        assert_eq!(outcomes.len(), 1);
        // c survives untouched and unlocked.
        let survivor = f.registry.get(c).unwrap();
        assert!(!survivor.merge_lock);
        assert_eq!(f.registry.len(), 2);
        assert_eq!(f.score, f.ranks.score(1));
    }

    #[test]
    fn duplicate_contact_for_same_pair_is_ignored() {
        let mut f = Fixture::new();
        let a = f.piece(4, Vec2::ZERO);
        let b = f.piece(4, Vec2::ZERO);
        assert!(f.touch(a, b));
        assert!(!f.touch(b, a));
        assert_eq!(f.flush().len(), 1);
    }

    #[test]
    fn static_piece_does_not_merge() {
        let mut f = Fixture::new();
        let id = f.registry.next_id();
        let aimed = Piece::new(id, 2, 30.0).with_static(true);
        f.registry.spawn(&mut f.world, aimed);
        let b = f.piece(2, Vec2::ZERO);

        assert!(!f.touch(id, b));
        assert!(!f.registry.get(b).unwrap().merge_lock);
    }

    #[test]
    fn self_contact_and_unknown_ids_are_ignored() {
        let mut f = Fixture::new();
        let a = f.piece(1, Vec2::ZERO);
        assert!(!f.touch(a, a));
        assert!(!f.touch(a, PieceId(999)));
        assert!(!f.registry.get(a).unwrap().merge_lock);
    }

    #[test]
    fn stale_pending_merge_is_skipped_without_score() {
        let mut f = Fixture::new();
        let a = f.piece(1, Vec2::ZERO);
        let b = f.piece(1, Vec2::ZERO);
        assert!(f.touch(a, b));

        // Simulate a lock bypass: the source vanished before flush.
        f.registry.despawn(&mut f.world, b);
        let outcomes = f.flush();

        assert!(outcomes.is_empty());
        assert_eq!(f.score, 0);
        assert!(f.registry.contains(a));
        assert!(f.resolver.is_empty());
    }

    #[test]
    fn several_merges_flush_in_arrival_order() {
        let mut f = Fixture::new();
        let a = f.piece(1, Vec2::new(0.0, 0.0));
        let b = f.piece(1, Vec2::new(10.0, 0.0));
        let c = f.piece(3, Vec2::new(100.0, 0.0));
        let d = f.piece(3, Vec2::new(110.0, 0.0));

        assert!(f.touch(c, d));
        assert!(f.touch(a, b));
        let outcomes = f.flush();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].rank, 4);
        assert_eq!(outcomes[1].rank, 2);
        assert_eq!(f.score, f.ranks.score(3) + f.ranks.score(1));
        // Two sources out, one merged piece in, per merge.
        assert_eq!(f.world.body_count(), 2);
    }
}
