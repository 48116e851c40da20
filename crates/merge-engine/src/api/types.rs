use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Unique identifier for a piece, shared by the registry and the physics world.
/// Ids start at 1 and are never reused within a `PieceRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// A sound event emitted by the game logic.
/// The numeric value maps to a host-defined sound in the browser audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    pub const DROP: Self = Self(1);
    pub const MERGE: Self = Self(2);
    pub const GAME_OVER: Self = Self(3);
}

/// Game event kinds carried in `GameEvent::kind`.
pub mod event_kind {
    /// a = rank, b = x
    pub const DROP: f32 = 1.0;
    /// a = resulting rank, b = x, c = y
    pub const MERGE: f32 = 2.0;
    /// a = score
    pub const SCORE: f32 = 3.0;
    /// a = final score
    pub const GAME_OVER: f32 = 4.0;
}

/// A game event communicated from Rust to the UI layer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn drop(rank: u8, x: f32) -> Self {
        Self { kind: event_kind::DROP, a: rank as f32, b: x, c: 0.0 }
    }

    pub fn merge(rank: u8, pos: Vec2) -> Self {
        Self { kind: event_kind::MERGE, a: rank as f32, b: pos.x, c: pos.y }
    }

    /// New total and the points gained since the last SCORE event.
    pub fn score(score: u64, gained: u64) -> Self {
        Self { kind: event_kind::SCORE, a: score as f32, b: gained as f32, c: 0.0 }
    }

    pub fn game_over(score: u64) -> Self {
        Self { kind: event_kind::GAME_OVER, a: score as f32, b: 0.0, c: 0.0 }
    }

    /// View a run of events as the flat floats the host reads.
    pub fn as_floats(events: &[GameEvent]) -> &[f32] {
        bytemuck::cast_slice(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
    }

    #[test]
    fn merge_event_payload() {
        let e = GameEvent::merge(3, Vec2::new(120.0, 400.0));
        assert_eq!(e.kind, event_kind::MERGE);
        assert_eq!(e.a, 3.0);
        assert_eq!(e.b, 120.0);
        assert_eq!(e.c, 400.0);
    }

    #[test]
    fn events_flatten_in_order() {
        let events = [GameEvent::drop(2, 100.0), GameEvent::score(8, 4)];
        assert_eq!(
            GameEvent::as_floats(&events),
            &[event_kind::DROP, 2.0, 100.0, 0.0, event_kind::SCORE, 8.0, 4.0, 0.0]
        );
    }
}
