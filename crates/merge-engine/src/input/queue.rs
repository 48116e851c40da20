/// Key code the host sends for the space bar.
pub const KEY_SPACE: u32 = 32;

/// `Custom` event kinds sent by the UI layer.
pub mod custom {
    /// Start a fresh session.
    pub const RESET: u32 = 1;
    /// Switch between the fruit and planet skins.
    pub const TOGGLE_SKIN: u32 = 2;
}

/// Input event types the host forwards to the game.
/// Only pointer x, pointer-up, space, and the custom kinds above have meaning.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// A touch/click began at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at world coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to world coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
    /// A UI button press. `kind` is one of [`custom`]; `a`, `b`, `c` are spare payload.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// A queue of input events.
/// The host pushes events between frames; the game applies them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event (called from the host via wasm-bindgen).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
