pub mod piece;
pub mod rank;
