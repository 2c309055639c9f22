//! Charting engine errors.
//!
//! [`ApplyError`] covers rejected interactions: the chart is left untouched
//! and the caller decides whether to surface the message. [`ChartError`]
//! wraps everything the engine facade can report.

use thiserror::Error;

use dcs_model::{Condition, DentitionMode, ModelError, SurfaceCode, ToothId};

use crate::sync::perio::PerioError;

/// A condition or note request that failed its preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("tooth {0} is not on the current chart")]
    UnknownTooth(String),

    #[error("unknown condition key {0:?}")]
    UnknownCondition(String),

    #[error("malformed surface code {0:?}")]
    MalformedSurface(String),

    #[error("tooth {tooth} has no {surface} surface")]
    SurfaceNotOnTooth { tooth: ToothId, surface: SurfaceCode },

    #[error("{condition} is charted per surface; choose a surface on tooth {tooth}")]
    SurfaceRequired { tooth: ToothId, condition: Condition },

    #[error("nothing is charted on tooth {tooth}{} to attach a note to", surface_suffix(.surface))]
    NoActiveCondition {
        tooth: ToothId,
        surface: Option<SurfaceCode>,
    },
}

fn surface_suffix(surface: &Option<SurfaceCode>) -> String {
    surface.map_or_else(String::new, |code| format!(", surface {code}"))
}

/// Engine facade error.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Perio(#[from] PerioError),

    /// A loaded chart does not match the layout of its dentition mode.
    #[error(
        "snapshot does not match the {mode} layout: {} unknown teeth, {} unknown surfaces, {} mismatched ids",
        unknown_teeth.len(),
        unknown_surfaces.len(),
        mismatched_ids.len()
    )]
    LayoutMismatch {
        mode: DentitionMode,
        unknown_teeth: Vec<String>,
        unknown_surfaces: Vec<String>,
        mismatched_ids: Vec<String>,
    },

    #[error("failed to read chart snapshot")]
    Snapshot {
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ChartError>;
