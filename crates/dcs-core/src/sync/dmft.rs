//! DMFT index (decayed, missing, filled teeth).
//!
//! Each tooth contributes to at most one component:
//!
//! 1. `missing` or `to-be-extracted` on the whole tooth counts as Missing.
//! 2. Whole-tooth fracture or root fragment, or caries on any surface,
//!    counts as Decayed.
//! 3. A crown or root canal, or any restorative surface material, counts as
//!    Filled.
//!
//! Decayed takes precedence over Filled on the same tooth.

use std::fmt;

use serde::{Deserialize, Serialize};

use dcs_model::{ChartState, Condition, ToothRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmftScore {
    pub decayed: u32,
    pub missing: u32,
    pub filled: u32,
}

impl DmftScore {
    pub fn new(decayed: u32, missing: u32, filled: u32) -> Self {
        Self {
            decayed,
            missing,
            filled,
        }
    }

    pub fn total(&self) -> u32 {
        self.decayed
            .saturating_add(self.missing)
            .saturating_add(self.filled)
    }
}

impl fmt::Display for DmftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "D: {}, M: {}, F: {}, Total DMFT: {}",
            self.decayed,
            self.missing,
            self.filled,
            self.total()
        )
    }
}

/// DMFT component a single tooth contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmftClass {
    Decayed,
    Missing,
    Filled,
}

pub fn classify(tooth: &ToothRecord) -> Option<DmftClass> {
    let whole = tooth.whole_condition();
    if matches!(whole, Some(Condition::Missing | Condition::ToBeExtracted)) {
        return Some(DmftClass::Missing);
    }
    let decayed = matches!(
        whole,
        Some(Condition::Caries | Condition::RootFragment | Condition::Fracture)
    ) || tooth.any_surface(|condition| condition == Condition::Caries);
    if decayed {
        return Some(DmftClass::Decayed);
    }
    let filled = matches!(whole, Some(Condition::Crown | Condition::Rct))
        || tooth.any_surface(|condition| condition.is_restorative());
    filled.then_some(DmftClass::Filled)
}

/// Recompute the index from scratch.
pub fn compute(state: &ChartState) -> DmftScore {
    state
        .records()
        .filter_map(classify)
        .fold(DmftScore::default(), |mut score, class| {
            match class {
                DmftClass::Decayed => score.decayed += 1,
                DmftClass::Missing => score.missing += 1,
                DmftClass::Filled => score.filled += 1,
            }
            score
        })
}

/// Current score plus the manual-override flag.
///
/// A manual score stands until the next chart mutation recomputes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmftTracker {
    score: DmftScore,
    manual: bool,
}

impl DmftTracker {
    pub fn recompute(&mut self, state: &ChartState) -> DmftScore {
        self.score = compute(state);
        self.manual = false;
        self.score
    }

    pub fn set_manual(&mut self, score: DmftScore) {
        self.score = score;
        self.manual = true;
    }

    pub fn score(&self) -> DmftScore {
        self.score
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }
}
