//! Folio: an animated portfolio showcase for the terminal
//!
//! The binary wires the engine to either the terminal UI (`show`) or a
//! virtual clock (`replay`). Everything else lives in the workspace crates.

pub mod commands;
pub mod telemetry;
