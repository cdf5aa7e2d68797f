pub mod board;
pub mod direction;
