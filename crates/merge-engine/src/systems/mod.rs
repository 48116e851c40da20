pub mod game_over;
pub mod merge;
pub mod snapshot;
pub mod spawn;
