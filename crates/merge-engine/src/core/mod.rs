pub mod physics;
#[cfg(feature = "physics")]
pub mod rapier;
pub mod registry;
#[cfg(test)]
pub mod scripted;
pub mod time;
pub mod timeline;
