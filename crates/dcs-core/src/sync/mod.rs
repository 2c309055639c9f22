//! Derived views kept consistent with the chart after every mutation.
//!
//! - `notes` - note indicators per tooth/surface target
//! - `perio` - periodontal chart with missing-tooth flags and scores
//! - `dmft` - decayed/missing/filled index

pub mod dmft;
pub mod notes;
pub mod perio;

pub use dmft::{DmftScore, DmftTracker};
pub use notes::{NoteIndicator, NoteIndicators, NoteTarget};
pub use perio::{Aspect, PerioChart, PerioComparison, PerioError, PerioScores};
