//! Data model for Dental Chart Studio.
//!
//! - `catalog` - condition taxonomy with rendering metadata
//! - `condition` - typed condition kinds and whole-tooth overlay markers
//! - `tooth` - FDI tooth identifiers
//! - `enums` - dentition mode, surface codes and roles
//! - `chart` - the tooth/surface state store

pub mod catalog;
pub mod chart;
pub mod condition;
pub mod enums;
pub mod error;
pub mod tooth;

pub use catalog::{ConditionCatalog, ConditionCategory, ConditionItem};
pub use chart::{ChartState, SurfaceState, ToothRecord, WholeToothState};
pub use condition::{Condition, OverlayMarker, OverlaySpec};
pub use enums::{ConditionScope, DentitionMode, SurfaceCode, SurfaceRole};
pub use error::{ModelError, Result};
pub use tooth::{Arch, Side, ToothId};
