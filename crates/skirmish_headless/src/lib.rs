//! Headless match runner for bots and CI verification.
//!
//! This crate hosts a single skirmish match controlled via JSON commands
//! on stdin, with responses on stdout. This enables:
//!
//! - **Bot testing**: a script can play both seats without any frontend
//! - **CI verification**: scripted matches check rules and determinism
//! - **Replay verification**: recorded matches re-run to the same hash
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (spawn, move, tick, query, etc.)
//! - **stdout**: Outcomes and snapshots (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! echo '{"cmd":"spawn","player":"alice","species":"speed","tile":0}' | cargo run -p skirmish_headless
//! ```

pub mod protocol;
pub mod runner;

pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner, RunnerError};
