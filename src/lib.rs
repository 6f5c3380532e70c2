#![warn(clippy::pedantic, clippy::nursery)]
pub mod cli;
pub mod core;
pub mod pipeline;
pub mod vis;
