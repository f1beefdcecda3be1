//! Metamod Example Plugin
//!
//! A Metamod plugin for Half-Life/CS 1.6 dedicated servers that adds two
//! console commands:
//!
//! - `entinfo <entityIndex>` prints an entity's variables.
//! - `traceline <entityIndex> <forwardDistance>` traces a line along the
//!   entity's view direction and prints what it hit.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod commands;
mod config;
mod context;
pub mod engine;
pub mod math;
mod metamod;
mod plugin;

// Re-export the Metamod exports for the DLL
pub use metamod::exports::*;
