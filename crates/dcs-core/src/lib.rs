//! Charting engine for Dental Chart Studio.
//!
//! Control flow for one interaction: a `(tooth, surface?, condition)` triple
//! is validated into an [`ApplyRequest`], the [`transition`] function mutates
//! the chart, the [`sync`] views follow, and [`DentalChart`] pushes a history
//! entry. The [`render`] scene is projected from that state on demand.
//!
//! ## Modules
//!
//! - `layout` - deterministic tooth arrangement per dentition
//! - `transition` - condition application rules
//! - `history` - undo/redo over deep snapshots
//! - `sync` - note indicators, periodontal chart, DMFT
//! - `render` - scene graph projection
//! - `chart` - the engine facade
//! - `assist` - dictation hooks
//! - `debounce` - debounce and supersession for external calls
//! - `findings` - active pathology list

pub mod assist;
pub mod chart;
pub mod config;
pub mod debounce;
pub mod error;
pub mod findings;
pub mod history;
pub mod layout;
pub mod render;
pub mod sync;
pub mod transition;

pub use assist::{ChartingAction, DictationReport, ParsedDictation, PerioAction};
pub use chart::{DentalChart, LoadReport, NoteRequest};
pub use config::{ChartConfig, LoadPolicy};
pub use debounce::{Debouncer, SupersessionGate, Ticket};
pub use error::{ApplyError, ChartError, Result};
pub use findings::ClinicalFinding;
pub use history::{History, HistoryPosition};
pub use layout::{ChartLayout, Point, Rect, SurfaceLayout, ToothLayout};
pub use render::{Scene, Shape};
pub use sync::{
    Aspect, DmftScore, DmftTracker, NoteIndicator, NoteIndicators, NoteTarget, PerioChart,
    PerioComparison, PerioError, PerioScores,
};
pub use transition::{ApplyRequest, Outcome, Transition};
