pub mod api;
pub mod bridge;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::GameConfig;
pub use api::game::{MergeGame, Phase, Session};
pub use api::types::{event_kind, GameEvent, PieceId, SoundEvent};
pub use bridge::protocol::ProtocolLayout;
pub use components::piece::Piece;
pub use components::rank::{RankDef, RankTable, Skin, MAX_RANK, SPAWN_RANKS};
pub use core::physics::{Boundary, ColliderMaterial, ContactPair, PhysicsAdapter};
pub use core::registry::PieceRegistry;
pub use core::time::FixedTimestep;
pub use core::timeline::{Timeline, TimelineAction};
pub use error::MergeError;
pub use input::queue::{custom, InputEvent, InputQueue, KEY_SPACE};
pub use systems::game_over::GameOverDetector;
pub use systems::merge::{MergeOutcome, MergeResolver, PendingMerge};
pub use systems::snapshot::{take_snapshot, InstanceBuffer, PieceInstance, PieceSnapshot};
pub use systems::spawn::{clamp_aim_x, AimController};

#[cfg(feature = "physics")]
pub use core::rapier::RapierWorld;
