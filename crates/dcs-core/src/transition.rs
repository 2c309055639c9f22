//! Condition application state machine.
//!
//! [`apply`] is the single transition function for "apply condition to
//! (tooth, surface?)". Rules, in priority order:
//!
//! 1. `missing` on the whole tooth resets every surface and sets the tooth
//!    missing. Re-applying keeps it missing.
//! 2. Whole-tooth conditions toggle: the active one is cleared when applied
//!    again, otherwise it replaces whatever was active. This includes
//!    `missing` sent with a surface, which leaves the surfaces alone.
//! 3. Surface conditions toggle on their surface. Turning one off clears the
//!    surface note; switching material keeps it.
//!
//! Requests are validated before any mutation, so a rejected request leaves
//! the chart exactly as it was.

use serde::Serialize;
use tracing::{debug, warn};

use dcs_model::{
    ChartState, Condition, ConditionCatalog, ConditionScope, SurfaceCode, ToothId, WholeToothState,
};

use crate::error::ApplyError;
use crate::layout::ChartLayout;

/// A validated "apply condition" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyRequest {
    pub tooth: ToothId,
    pub surface: Option<SurfaceCode>,
    pub condition: Condition,
}

impl ApplyRequest {
    pub fn new(tooth: ToothId, surface: Option<SurfaceCode>, condition: Condition) -> Self {
        Self {
            tooth,
            surface,
            condition,
        }
    }

    /// Build a request from the raw interaction triple.
    ///
    /// An empty surface string means "no surface".
    pub fn parse(
        tooth: &str,
        surface: Option<&str>,
        key: &str,
        catalog: &ConditionCatalog,
    ) -> Result<Self, ApplyError> {
        let tooth_id: ToothId = tooth
            .parse()
            .map_err(|_| ApplyError::UnknownTooth(tooth.to_string()))?;
        let condition = catalog
            .lookup(key)
            .map(|item| item.condition)
            .ok_or_else(|| ApplyError::UnknownCondition(key.to_string()))?;
        let surface = match surface.map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Some(
                code.parse::<SurfaceCode>()
                    .map_err(|_| ApplyError::MalformedSurface(code.to_string()))?,
            ),
            None => None,
        };
        Ok(Self::new(tooth_id, surface, condition))
    }
}

/// What a successful application did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transition {
    /// Rule 1: the tooth was reset and is now missing.
    MarkedMissing,
    /// A whole-tooth condition became active, replacing `replaced` if any.
    WholeSet {
        condition: Condition,
        replaced: Option<Condition>,
    },
    /// The active whole-tooth condition was toggled off.
    WholeCleared { condition: Condition },
    /// A surface took `condition`, replacing `replaced` if any.
    SurfaceSet {
        surface: SurfaceCode,
        condition: Condition,
        replaced: Option<Condition>,
    },
    /// A surface was toggled back to sound.
    SurfaceCleared {
        surface: SurfaceCode,
        condition: Condition,
    },
}

/// Result of a successful [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub tooth: ToothId,
    pub transition: Transition,
    /// True when the tooth's whole-tooth `missing` status flipped.
    pub missing_changed: bool,
    /// True when the tooth's surfaces were reset.
    pub surfaces_reset: bool,
}

/// Check a request against the chart and layout without mutating anything.
pub fn validate(
    state: &ChartState,
    layout: &ChartLayout,
    request: &ApplyRequest,
) -> Result<(), ApplyError> {
    let tooth = state
        .get(&request.tooth)
        .filter(|_| layout.contains(request.tooth))
        .ok_or_else(|| ApplyError::UnknownTooth(request.tooth.to_string()))?;

    if let Some(surface) = request.surface
        && tooth.surface(surface).is_none()
    {
        return Err(ApplyError::SurfaceNotOnTooth {
            tooth: request.tooth,
            surface,
        });
    }

    if request.condition.scope() == ConditionScope::Surface && request.surface.is_none() {
        return Err(ApplyError::SurfaceRequired {
            tooth: request.tooth,
            condition: request.condition,
        });
    }
    Ok(())
}

/// Apply one condition request to the chart.
///
/// On error the chart is unchanged and the rejection is logged at `warn`.
pub fn apply(
    state: &mut ChartState,
    layout: &ChartLayout,
    request: &ApplyRequest,
) -> Result<Outcome, ApplyError> {
    if let Err(error) = validate(state, layout, request) {
        warn!(
            tooth = %request.tooth,
            surface = ?request.surface,
            condition = %request.condition,
            %error,
            "condition request rejected"
        );
        return Err(error);
    }

    let tooth = state
        .get_mut(&request.tooth)
        .ok_or_else(|| ApplyError::UnknownTooth(request.tooth.to_string()))?;
    let was_missing = tooth.is_missing();

    let (transition, surfaces_reset) = match (request.condition, request.surface) {
        (Condition::Missing, None) => {
            tooth.whole_tooth_state = Some(WholeToothState::new(Condition::Missing));
            tooth.reset_surfaces();
            (Transition::MarkedMissing, true)
        }
        (condition, _) if condition.is_whole_tooth() => {
            let previous = tooth.whole_tooth_state.take().map(|state| state.condition);
            if previous == Some(condition) {
                (Transition::WholeCleared { condition }, false)
            } else {
                tooth.whole_tooth_state = Some(WholeToothState::new(condition));
                (
                    Transition::WholeSet {
                        condition,
                        replaced: previous,
                    },
                    false,
                )
            }
        }
        (condition, Some(code)) => {
            let surface = tooth
                .surface_mut(code)
                .ok_or(ApplyError::SurfaceNotOnTooth {
                    tooth: request.tooth,
                    surface: code,
                })?;
            if surface.condition == Some(condition) {
                surface.reset();
                (
                    Transition::SurfaceCleared {
                        surface: code,
                        condition,
                    },
                    false,
                )
            } else {
                let replaced = surface.condition.replace(condition);
                (
                    Transition::SurfaceSet {
                        surface: code,
                        condition,
                        replaced,
                    },
                    false,
                )
            }
        }
        (condition, None) => {
            return Err(ApplyError::SurfaceRequired {
                tooth: request.tooth,
                condition,
            });
        }
    };

    let missing_changed = was_missing != tooth.is_missing();
    debug!(
        tooth = %request.tooth,
        ?transition,
        missing_changed,
        "condition applied"
    );
    Ok(Outcome {
        tooth: request.tooth,
        transition,
        missing_changed,
        surfaces_reset,
    })
}
