#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod config;
pub mod creator;
pub mod solver;
pub mod worker;
pub mod working_grid;
