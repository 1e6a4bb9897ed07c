#![forbid(unsafe_code)]

//! Core domain model and planning logic for Hero Workout.
//!
//! This crate provides:
//! - Domain types (exercise templates, planned exercises, locations)
//! - Catalog loading and validation
//! - The randomized session planner
//! - Narration, music and the session runner that walks a plan

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod planner;
pub mod narration;
pub mod music;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use planner::{format_plan, props_by_location, Planner, PropsByLocation};
pub use narration::{narrator_from_config, Narrator};
pub use music::{MusicPlayer, PlaylistPlayer};
pub use session::{InstantPacer, Pacer, Pause, RealPacer, SessionReport, SessionRunner, SessionSettings};
