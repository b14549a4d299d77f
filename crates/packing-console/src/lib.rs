//! Scanner console for the packing station
//!
//! Turns scanner and keyboard input lines into station operations and
//! prints each result as a JSON line.

pub mod command;
pub mod console;

pub use command::{Command, CommandError, HELP};
pub use console::{Console, RunSummary, Step};
