//! Failure-line check.

use crate::api::config::GameConfig;
use crate::api::game::Session;
use crate::api::types::PieceId;
use crate::core::registry::PieceRegistry;

/// Ends the session when a dropped piece comes to rest above the failure line.
#[derive(Debug, Clone, Copy)]
pub struct GameOverDetector {
    failure_line: f32,
    rest_speed: f32,
}

impl GameOverDetector {
    pub fn new(failure_line: f32, rest_speed: f32) -> Self {
        Self { failure_line, rest_speed }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.failure_line, config.rest_speed)
    }

    /// First dynamic piece whose centre is above the line while its vertical
    /// speed is below the rest threshold. Static pieces are ignored, and an
    /// already finished session never fires again.
    pub fn check(&self, session: &Session, registry: &PieceRegistry) -> Option<PieceId> {
        if session.game_over {
            return None;
        }
        registry
            .iter()
            .find(|p| !p.is_static && p.pos.y < self.failure_line && p.vel.y.abs() < self.rest_speed)
            .map(|p| p.id)
    }

    pub fn failure_line(&self) -> f32 {
        self.failure_line
    }
}
