#[macro_use]
extern crate tracing;

pub mod cli;
pub mod counter;
pub mod error;
pub mod parameters;
pub mod pointing_motion;
pub mod replay;
pub mod scheduler;
pub mod utils;
