//! WASM exports for the merge game.
//!
//! One runner lives in a `thread_local!`. Every export is a free function
//! because wasm-bindgen cannot export the generic [`GameRunner`]. Calls made
//! before `game_init` do nothing and return zero values.

pub mod runner;

pub use runner::GameRunner;

#[cfg(feature = "physics")]
mod exports {
    use std::cell::RefCell;

    use merge_engine::{InputEvent, RapierWorld};
    use wasm_bindgen::prelude::*;

    use crate::GameRunner;

    thread_local! {
        static RUNNER: RefCell<Option<GameRunner<RapierWorld>>> = const { RefCell::new(None) };
    }

    fn with_runner<R>(f: impl FnOnce(&mut GameRunner<RapierWorld>) -> R) -> Option<R> {
        RUNNER.with(|cell| {
            let mut borrow = cell.borrow_mut();
            match borrow.as_mut() {
                Some(runner) => Some(f(runner)),
                None => {
                    log::warn!("merge game not initialized; call game_init() first");
                    None
                }
            }
        })
    }

    /// Create the runner from a JSON config (empty string for defaults).
    #[wasm_bindgen]
    pub fn game_init(config_json: &str) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let runner = GameRunner::from_json(config_json).map_err(|err| {
            let msg = JsValue::from_str(&err.to_string());
            web_sys::console::error_1(&msg);
            msg
        })?;
        RUNNER.with(|cell| {
            *cell.borrow_mut() = Some(runner);
        });
        log::info!("merge-web: initialized");
        Ok(())
    }

    #[wasm_bindgen]
    pub fn game_tick(dt: f32) {
        with_runner(|r| r.tick(dt));
    }

    #[wasm_bindgen]
    pub fn game_pointer_down(x: f32, y: f32) {
        with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
    }

    #[wasm_bindgen]
    pub fn game_pointer_up(x: f32, y: f32) {
        with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
    }

    #[wasm_bindgen]
    pub fn game_pointer_move(x: f32, y: f32) {
        with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
    }

    #[wasm_bindgen]
    pub fn game_key_down(key_code: u32) {
        with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
    }

    #[wasm_bindgen]
    pub fn game_key_up(key_code: u32) {
        with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
    }

    #[wasm_bindgen]
    pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
        with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
    }

    #[wasm_bindgen]
    pub fn game_reset() {
        with_runner(|r| r.reset());
    }

    #[wasm_bindgen]
    pub fn game_toggle_skin() {
        with_runner(|r| r.toggle_skin());
    }

    // ---- Session state ----

    #[wasm_bindgen]
    pub fn get_score() -> f64 {
        with_runner(|r| r.score()).unwrap_or(0.0)
    }

    #[wasm_bindgen]
    pub fn is_game_over() -> bool {
        with_runner(|r| r.is_game_over()).unwrap_or(false)
    }

    // ---- Data accessors ----

    #[wasm_bindgen]
    pub fn get_buffer_ptr() -> *const f32 {
        with_runner(|r| r.buffer_ptr()).unwrap_or(std::ptr::null())
    }

    #[wasm_bindgen]
    pub fn get_instances_ptr() -> *const f32 {
        with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
    }

    #[wasm_bindgen]
    pub fn get_instance_count() -> u32 {
        with_runner(|r| r.instance_count()).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn get_world_width() -> f32 {
        with_runner(|r| r.world_width()).unwrap_or(0.0)
    }

    #[wasm_bindgen]
    pub fn get_world_height() -> f32 {
        with_runner(|r| r.world_height()).unwrap_or(0.0)
    }

    // ---- Capacity accessors ----

    #[wasm_bindgen]
    pub fn get_header_floats() -> u32 {
        with_runner(|r| r.header_floats()).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn get_max_instances() -> u32 {
        with_runner(|r| r.max_instances()).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn get_max_sounds() -> u32 {
        with_runner(|r| r.max_sounds()).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn get_max_events() -> u32 {
        with_runner(|r| r.max_events()).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn get_buffer_total_floats() -> u32 {
        with_runner(|r| r.buffer_total_floats()).unwrap_or(0)
    }
}
