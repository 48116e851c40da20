use glam::Vec2;

use crate::api::config::GameConfig;
use crate::api::types::{GameEvent, PieceId, SoundEvent};
use crate::components::piece::Piece;
use crate::components::rank::{RankTable, Skin};
use crate::core::physics::{ContactPair, PhysicsAdapter};
use crate::core::registry::PieceRegistry;
use crate::core::timeline::{Timeline, TimelineAction};
use crate::input::queue::{custom, InputEvent, InputQueue, KEY_SPACE};
use crate::systems::game_over::GameOverDetector;
use crate::systems::merge::MergeResolver;
use crate::systems::snapshot::{take_snapshot, PieceSnapshot};
use crate::systems::spawn::AimController;

#[cfg(feature = "physics")]
use crate::core::rapier::RapierWorld;
use crate::error::MergeError;

/// Where the session is in the aim/drop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No piece aimed yet.
    #[default]
    Idle,
    /// A static piece follows the pointer.
    Aiming,
    /// The last piece was dropped; the next spawn is scheduled.
    Released,
    /// Terminal until `reset`.
    GameOver,
}

/// Mutable session state shared by the controllers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Never decreases within a session.
    pub score: u64,
    /// One-way latch, cleared only by `reset`.
    pub game_over: bool,
    pub can_drop: bool,
    pub aimed: Option<PieceId>,
    pub phase: Phase,
}

/// The merge game: registry, merge queue, aim controller and failure check
/// driven over a physics world.
pub struct MergeGame<W: PhysicsAdapter> {
    config: GameConfig,
    world: W,
    registry: PieceRegistry,
    ranks: RankTable,
    merges: MergeResolver,
    aim: AimController,
    detector: GameOverDetector,
    timeline: Timeline,
    session: Session,
    contacts: Vec<ContactPair>,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
}

#[cfg(feature = "physics")]
impl MergeGame<RapierWorld> {
    /// Validate `config` and build a game over a rapier world.
    pub fn with_config(config: GameConfig) -> Result<Self, MergeError> {
        let world = RapierWorld::new(config.gravity);
        Self::new(config, world)
    }
}

impl<W: PhysicsAdapter> MergeGame<W> {
    /// Validate `config` and build the field boundaries in `world`. No piece
    /// exists until `start`.
    pub fn new(config: GameConfig, mut world: W) -> Result<Self, MergeError> {
        config.validate()?;
        world.set_dt(config.fixed_dt);
        for boundary in config.boundaries().iter() {
            world.create_static_boundary(boundary);
        }
        Ok(Self {
            world,
            registry: PieceRegistry::new(),
            ranks: RankTable::new(config.skin),
            merges: MergeResolver::new(),
            aim: AimController::new(&config),
            detector: GameOverDetector::from_config(&config),
            timeline: Timeline::new(),
            session: Session::default(),
            contacts: Vec::with_capacity(32),
            sounds: Vec::new(),
            events: Vec::new(),
            config,
        })
    }

    /// Spawn the first aimed piece.
    pub fn start(&mut self) {
        log::info!("merge game started (seed {:#x})", self.config.seed);
        self.spawn_next();
    }

    /// Move the aimed piece to `x`. No-op without an aimed piece.
    pub fn update_aim(&mut self, x: f32) {
        self.aim
            .update_aim(x, &self.session, &mut self.registry, &mut self.world);
    }

    /// Drop the aimed piece. No-op unless a drop is currently allowed.
    pub fn release(&mut self) {
        let Some(id) = self.aim.release(
            &mut self.session,
            &mut self.registry,
            &mut self.world,
            &mut self.timeline,
        ) else {
            return;
        };
        if let Some(piece) = self.registry.get(id) {
            self.events.push(GameEvent::drop(piece.rank, piece.pos.x));
        }
        self.sounds.push(SoundEvent::DROP);
    }

    /// Remove every piece, zero the score, drop any scheduled action, and
    /// spawn a fresh aimed piece.
    pub fn reset(&mut self) {
        let removed = self.registry.clear(&mut self.world);
        self.merges.clear();
        self.contacts.clear();
        self.timeline.cancel_all();
        self.session = Session::default();
        log::info!("session reset, {} pieces removed", removed);
        self.spawn_next();
    }

    /// Advance one fixed step: physics, merge qualification, flush, failure
    /// check, then scheduled actions. Does nothing once the session is over.
    pub fn tick(&mut self) {
        if self.session.game_over {
            return;
        }

        self.contacts.clear();
        self.world.step_into(&mut self.contacts);
        self.registry.sync_from(&self.world);

        for pair in self.contacts.drain(..) {
            self.merges.on_pair_touch(&mut self.registry, &self.ranks, pair);
        }
        let outcomes = self.merges.flush(
            &mut self.registry,
            &mut self.world,
            &self.ranks,
            &mut self.session.score,
        );
        let mut gained = 0u64;
        for outcome in &outcomes {
            self.events.push(GameEvent::merge(outcome.rank, outcome.pos));
            self.sounds.push(SoundEvent::MERGE);
            gained = gained.saturating_add(outcome.awarded);
        }
        if !outcomes.is_empty() {
            self.events.push(GameEvent::score(self.session.score, gained));
        }

        if let Some(id) = self.detector.check(&self.session, &self.registry) {
            self.end_session(id);
            return;
        }

        for action in self.timeline.advance(self.config.fixed_dt) {
            match action {
                TimelineAction::SpawnNext => self.spawn_next(),
                TimelineAction::EnableDrop => {
                    if self.session.aimed.is_some() {
                        self.session.can_drop = true;
                    }
                }
            }
        }
    }

    /// Apply queued input: pointer moves aim, pointer-up or space releases,
    /// custom events reset or toggle the skin. A reset ends processing for
    /// this batch.
    pub fn handle_input(&mut self, input: &InputQueue) {
        for event in input.iter() {
            match *event {
                InputEvent::PointerMove { x, .. } => self.update_aim(x),
                InputEvent::PointerUp { .. } => self.release(),
                InputEvent::KeyDown { key_code } if key_code == KEY_SPACE => self.release(),
                InputEvent::Custom { kind: custom::RESET, .. } => {
                    self.reset();
                    return;
                }
                InputEvent::Custom { kind: custom::TOGGLE_SKIN, .. } => {
                    self.toggle_skin();
                }
                _ => {}
            }
        }
    }

    /// Switch presentation skin. Radius and score are unaffected.
    pub fn toggle_skin(&mut self) -> Skin {
        let skin = self.ranks.skin().toggled();
        self.ranks.set_skin(skin);
        log::debug!("skin -> {}", skin.as_str());
        skin
    }

    /// Put a dynamic piece of `rank` directly into the field. Used for
    /// scripted setups and tests; normal play only spawns through aiming.
    pub fn place_piece(&mut self, rank: u8, pos: Vec2) -> Option<PieceId> {
        self.ranks.get(rank)?;
        let id = self.registry.next_id();
        let piece = Piece::new(id, rank, self.ranks.radius(rank)).with_pos(pos);
        Some(self.registry.spawn(&mut self.world, piece))
    }

    /// Per-piece view for rendering, in registry order.
    pub fn snapshot(&self) -> Vec<PieceSnapshot> {
        take_snapshot(&self.registry)
    }

    /// Clear per-frame events and sounds.
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn is_game_over(&self) -> bool {
        self.session.game_over
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn can_drop(&self) -> bool {
        self.session.can_drop
    }

    pub fn aimed(&self) -> Option<PieceId> {
        self.session.aimed
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn pieces(&self) -> &PieceRegistry {
        &self.registry
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    fn spawn_next(&mut self) {
        self.aim.spawn(
            &mut self.session,
            &mut self.registry,
            &mut self.world,
            &self.ranks,
            &mut self.timeline,
        );
    }

    fn end_session(&mut self, culprit: PieceId) {
        self.session.game_over = true;
        self.session.can_drop = false;
        self.session.phase = Phase::GameOver;
        self.timeline.cancel_all();
        self.events.push(GameEvent::game_over(self.session.score));
        self.sounds.push(SoundEvent::GAME_OVER);
        log::info!(
            "game over: piece {} rests above the line, final score {}",
            culprit.0,
            self.session.score
        );
    }
}
