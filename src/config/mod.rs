//! Configuration loading for the read-aloud viewer.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so narration can still start.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, serialize_config};
pub use models::{AppConfig, MAX_CHUNK_SIZE, MAX_PAUSE_AFTER_UNIT_SECS, SegmentMode};
