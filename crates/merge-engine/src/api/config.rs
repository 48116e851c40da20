//! Game configuration.
//!
//! [`GameConfig::default`] is the classic play field: a 450 × 700
//! field with 10-wide side walls and a 20-tall floor, pieces aimed at y = 50,
//! and a failure line at y = 100. Any subset of fields can be overridden from
//! JSON; missing keys keep their defaults.

use glam::Vec2;
use serde::Deserialize;

use crate::components::rank::Skin;
use crate::core::physics::Boundary;
use crate::error::MergeError;

/// Engine and gameplay configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Thickness of the left and right walls.
    pub wall_thickness: f32,
    /// Thickness of the floor.
    pub floor_thickness: f32,
    /// Y of the aimed piece centre.
    pub aim_height: f32,
    /// A dynamic piece resting above this Y ends the session.
    pub failure_line: f32,
    /// Below this |vy| a piece counts as resting.
    pub rest_speed: f32,
    /// Gravity, positive Y is downward.
    pub gravity: Vec2,
    /// Delay between a release and the next aimed piece (seconds).
    pub spawn_delay: f32,
    /// Delay between a spawn and the first allowed release (seconds).
    pub drop_debounce: f32,
    /// Seed for the spawn-rank generator.
    pub seed: u64,
    /// Initial presentation skin.
    pub skin: Skin,
    /// Maximum number of piece instances exported per frame.
    pub max_instances: usize,
    /// Maximum number of sound events per frame.
    pub max_sounds: usize,
    /// Maximum number of game events per frame.
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 450.0,
            world_height: 700.0,
            wall_thickness: 10.0,
            floor_thickness: 20.0,
            aim_height: 50.0,
            failure_line: 100.0,
            rest_speed: 0.5,
            gravity: Vec2::new(0.0, 981.0),
            spawn_delay: 1.0,
            drop_debounce: 0.1,
            seed: 0x5eed,
            skin: Skin::Fruit,
            max_instances: 256,
            max_sounds: 32,
            max_events: 32,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, MergeError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a playable field.
    pub fn validate(&self) -> Result<(), MergeError> {
        let invalid = |field, reason| Err(MergeError::InvalidConfig { field, reason });

        if !(self.fixed_dt > 0.0 && self.fixed_dt <= 1.0) {
            return invalid("fixed_dt", "must be in (0, 1]");
        }
        if self.wall_thickness < 0.0 || self.floor_thickness < 0.0 {
            return invalid("wall_thickness", "walls and floor must not be negative");
        }
        if self.field_right() <= self.field_left() {
            return invalid("world_width", "leaves no room between the walls");
        }
        if !(self.failure_line > 0.0 && self.failure_line < self.floor_y()) {
            return invalid("failure_line", "must lie between the top and the floor");
        }
        if !(self.aim_height >= 0.0 && self.aim_height < self.failure_line) {
            return invalid("aim_height", "must be above the failure line");
        }
        if !(self.rest_speed > 0.0) {
            return invalid("rest_speed", "must be positive");
        }
        if self.spawn_delay < 0.0 || self.drop_debounce < 0.0 {
            return invalid("spawn_delay", "delays must not be negative");
        }
        if self.max_instances == 0 {
            return invalid("max_instances", "must be at least 1");
        }
        Ok(())
    }

    /// Inner edge of the left wall.
    pub fn field_left(&self) -> f32 {
        self.wall_thickness
    }

    /// Inner edge of the right wall.
    pub fn field_right(&self) -> f32 {
        self.world_width - self.wall_thickness
    }

    /// Top of the floor.
    pub fn floor_y(&self) -> f32 {
        self.world_height - self.floor_thickness
    }

    /// Where a new aimed piece appears.
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.world_width / 2.0, self.aim_height)
    }

    /// Static bodies enclosing the field: left wall, right wall, floor.
    pub fn boundaries(&self) -> [Boundary; 3] {
        let half_wall = self.wall_thickness / 2.0;
        let half_h = self.world_height / 2.0;
        [
            Boundary::new(Vec2::new(half_wall, half_h), Vec2::new(half_wall, half_h)),
            Boundary::new(
                Vec2::new(self.world_width - half_wall, half_h),
                Vec2::new(half_wall, half_h),
            ),
            Boundary::new(
                Vec2::new(self.world_width / 2.0, self.world_height - self.floor_thickness / 2.0),
                Vec2::new(self.world_width / 2.0, self.floor_thickness / 2.0),
            ),
        ]
    }
}
