use merge_engine::bridge::protocol::{
    HEADER_CAN_DROP, HEADER_EVENT_COUNT, HEADER_FAILURE_LINE, HEADER_FLOATS,
    HEADER_FRAME_COUNTER, HEADER_GAME_OVER, HEADER_INSTANCE_COUNT, HEADER_MAX_EVENTS,
    HEADER_MAX_INSTANCES, HEADER_MAX_SOUNDS, HEADER_PROTOCOL_VERSION, HEADER_SCORE,
    HEADER_SKIN, HEADER_SOUND_COUNT, HEADER_WORLD_HEIGHT, HEADER_WORLD_WIDTH,
    PROTOCOL_VERSION,
};
use merge_engine::{
    FixedTimestep, GameConfig, GameEvent, InputEvent, InputQueue, InstanceBuffer, MergeError, MergeGame,
    PhysicsAdapter, ProtocolLayout, Skin,
};

/// Frame driver for one merge game.
///
/// The host calls `tick` once per animation frame with the elapsed time. The
/// runner turns it into fixed steps, applies queued input, and packs the
/// result into one flat f32 buffer laid out by [`ProtocolLayout`].
/// `lib.rs` keeps a `thread_local!` runner and exports free functions via
/// `#[wasm_bindgen]`, because wasm-bindgen cannot export generic structs.
pub struct GameRunner<W: PhysicsAdapter> {
    game: MergeGame<W>,
    input: InputQueue,
    instances: InstanceBuffer,
    timestep: FixedTimestep,
    layout: ProtocolLayout,
    frame: u32,
    /// Header, instances, sounds and events, in that order.
    shared: Vec<f32>,
}

#[cfg(feature = "physics")]
impl GameRunner<merge_engine::RapierWorld> {
    /// Parse a JSON config (empty string for defaults) and start a session.
    pub fn from_json(json: &str) -> Result<Self, MergeError> {
        let config = if json.trim().is_empty() {
            GameConfig::default()
        } else {
            GameConfig::from_json(json)?
        };
        Ok(Self::new(MergeGame::with_config(config)?))
    }
}

impl<W: PhysicsAdapter> GameRunner<W> {
    /// Wrap a game and spawn its first aimed piece.
    pub fn new(mut game: MergeGame<W>) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(config);
        let instances = InstanceBuffer::new(config.max_instances);

        let mut shared = vec![0.0; layout.buffer_total_floats];
        shared[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        shared[HEADER_MAX_INSTANCES] = layout.max_instances as f32;
        shared[HEADER_MAX_SOUNDS] = layout.max_sounds as f32;
        shared[HEADER_MAX_EVENTS] = layout.max_events as f32;
        shared[HEADER_WORLD_WIDTH] = config.world_width;
        shared[HEADER_WORLD_HEIGHT] = config.world_height;
        shared[HEADER_FAILURE_LINE] = config.failure_line;

        game.start();
        let mut runner = Self {
            game,
            input: InputQueue::new(),
            instances,
            timestep,
            layout,
            frame: 0,
            shared,
        };
        runner.pack();
        runner
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: apply input, run fixed steps, repack the shared buffer.
    pub fn tick(&mut self, dt: f32) {
        // Clear per-frame transient data
        self.game.clear_frame_data();

        // Input first so a release lands before the step that simulates it.
        self.game.handle_input(&self.input);
        self.input.clear();

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.tick();
        }

        self.frame = self.frame.wrapping_add(1);
        self.pack();
    }

    fn pack(&mut self) {
        self.instances.rebuild(self.game.pieces(), self.game.ranks());

        let layout = &self.layout;
        let shared = &mut self.shared;

        let floats = self.instances.as_floats();
        shared[layout.instance_data_offset..layout.instance_data_offset + floats.len()]
            .copy_from_slice(floats);

        let sound_count = self.game.sounds.len().min(layout.max_sounds);
        for (slot, sound) in shared[layout.sound_data_offset..]
            .iter_mut()
            .zip(self.game.sounds.iter().take(sound_count))
        {
            *slot = sound.0 as f32;
        }

        let event_count = self.game.events.len().min(layout.max_events);
        let events = GameEvent::as_floats(&self.game.events[..event_count]);
        shared[layout.event_data_offset..layout.event_data_offset + events.len()]
            .copy_from_slice(events);

        shared[HEADER_FRAME_COUNTER] = self.frame as f32;
        shared[HEADER_INSTANCE_COUNT] = self.instances.instance_count() as f32;
        shared[HEADER_SOUND_COUNT] = sound_count as f32;
        shared[HEADER_EVENT_COUNT] = event_count as f32;
        shared[HEADER_SCORE] = self.game.score() as f32;
        shared[HEADER_GAME_OVER] = if self.game.is_game_over() { 1.0 } else { 0.0 };
        shared[HEADER_CAN_DROP] = if self.game.can_drop() { 1.0 } else { 0.0 };
        shared[HEADER_SKIN] = match self.game.ranks().skin() {
            Skin::Fruit => 0.0,
            Skin::Planet => 1.0,
        };
    }

    // ---- Direct controls (bypass the input queue) ----

    pub fn reset(&mut self) {
        self.game.reset();
        self.timestep.reset();
        self.input.clear();
        self.pack();
    }

    pub fn toggle_skin(&mut self) {
        self.game.toggle_skin();
        self.pack();
    }

    // ---- Read-only session state ----

    pub fn game(&self) -> &MergeGame<W> {
        &self.game
    }

    pub fn score(&self) -> f64 {
        self.game.score() as f64
    }

    pub fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }

    // ---- Pointer accessors for host reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.shared.as_ptr()
    }

    pub fn buffer(&self) -> &[f32] {
        &self.shared
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.instance_count()
    }

    pub fn world_width(&self) -> f32 {
        self.game.config().world_width
    }

    pub fn world_height(&self) -> f32 {
        self.game.config().world_height
    }

    // ---- Capacity accessors (read by the host via wasm_bindgen exports) ----

    pub fn header_floats(&self) -> u32 {
        HEADER_FLOATS as u32
    }

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
