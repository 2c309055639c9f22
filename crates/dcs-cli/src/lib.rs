//! CLI library components for Dental Chart Studio.

pub mod config;
pub mod logging;
pub mod patient;
pub mod session;
