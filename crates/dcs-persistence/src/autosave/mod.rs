//! Auto-save for patient charts.
//!
//! Provides:
//! - `DirtyTracker` - follows the chart revision and decides when to save
//! - `AutoSaveConfig` - user settings for auto-save behavior

mod config;
mod tracker;

pub use config::AutoSaveConfig;
pub use tracker::DirtyTracker;
