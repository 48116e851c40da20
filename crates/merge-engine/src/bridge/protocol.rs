/// Shared buffer layout for the browser host.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Instances: max_instances × 8 floats]
/// [Sounds: max_sounds × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init. Counts and session
/// fields are rewritten every frame.

use crate::api::config::GameConfig;
use crate::api::types::GameEvent;
use crate::systems::snapshot::PieceInstance;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_MAX_SOUNDS: usize = 4;
pub const HEADER_SOUND_COUNT: usize = 5;
pub const HEADER_MAX_EVENTS: usize = 6;
pub const HEADER_EVENT_COUNT: usize = 7;
pub const HEADER_WORLD_WIDTH: usize = 8;
pub const HEADER_WORLD_HEIGHT: usize = 9;
pub const HEADER_FAILURE_LINE: usize = 10;
pub const HEADER_SCORE: usize = 11;
pub const HEADER_GAME_OVER: usize = 12;
pub const HEADER_CAN_DROP: usize = 13;
/// 0 = fruit, 1 = planet.
pub const HEADER_SKIN: usize = 14;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per piece instance (wire format, never changes).
pub const INSTANCE_FLOATS: usize = PieceInstance::FLOATS;

/// Floats per game event: kind, a, b, c (wire format, never changes).
pub const EVENT_FLOATS: usize = GameEvent::FLOATS;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    pub max_sounds: usize,
    pub max_events: usize,

    /// Size of instance data section in floats.
    pub instance_data_floats: usize,
    /// Size of sound data section in floats.
    pub sound_data_floats: usize,
    /// Size of event data section in floats.
    pub event_data_floats: usize,

    /// Offset (in floats) where instance data begins.
    pub instance_data_offset: usize,
    /// Offset (in floats) where sound data begins.
    pub sound_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_instances: usize, max_sounds: usize, max_events: usize) -> Self {
        let instance_data_floats = max_instances * INSTANCE_FLOATS;
        let sound_data_floats = max_sounds;
        let event_data_floats = max_events * EVENT_FLOATS;

        let instance_data_offset = HEADER_FLOATS;
        let sound_data_offset = instance_data_offset + instance_data_floats;
        let event_data_offset = sound_data_offset + sound_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_instances,
            max_sounds,
            max_events,
            instance_data_floats,
            sound_data_floats,
            event_data_floats,
            instance_data_offset,
            sound_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_instances, config.max_sounds, config.max_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_default_config_matches_expected_sizes() {
        let layout = ProtocolLayout::from_config(&GameConfig::default());

        assert_eq!(layout.max_instances, 256);
        assert_eq!(layout.max_sounds, 32);
        assert_eq!(layout.max_events, 32);
        assert_eq!(layout.instance_data_floats, 256 * 8);
        assert_eq!(layout.event_data_floats, 32 * 4);
        assert_eq!(layout.buffer_total_floats, 16 + 256 * 8 + 32 + 32 * 4);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(100, 10, 20);

        assert_eq!(layout.instance_data_offset, HEADER_FLOATS);
        assert_eq!(layout.sound_data_offset, layout.instance_data_offset + layout.instance_data_floats);
        assert_eq!(layout.event_data_offset, layout.sound_data_offset + layout.sound_data_floats);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + layout.event_data_floats);
    }

    #[test]
    fn header_fields_fit_in_header() {
        for idx in [HEADER_FRAME_COUNTER, HEADER_SCORE, HEADER_GAME_OVER, HEADER_CAN_DROP, HEADER_SKIN] {
            assert!(idx < HEADER_FLOATS);
        }
    }
}
