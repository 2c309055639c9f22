//! Note indicators.
//!
//! A target (whole tooth or one surface) carrying a non-default condition
//! shows an indicator: neutral when it has no note, highlighted when it has
//! one. Sound targets show nothing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use dcs_model::{ChartState, SurfaceCode, ToothId};

use crate::layout::{ChartLayout, Point, Rect};

pub const NOTE_ABSENT_COLOR: &str = "#9ca3af";
pub const NOTE_PRESENT_COLOR: &str = "#f59e0b";

/// Indicator anchor relative to the target's top-right corner.
const ANCHOR_INSET_X: f64 = 8.0;
const ANCHOR_INSET_Y: f64 = 2.0;

/// What a note is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "surface", rename_all = "lowercase")]
pub enum NoteTarget {
    Whole,
    Surface(SurfaceCode),
}

impl NoteTarget {
    pub fn from_surface(surface: Option<SurfaceCode>) -> Self {
        surface.map_or(NoteTarget::Whole, NoteTarget::Surface)
    }

    pub fn surface(&self) -> Option<SurfaceCode> {
        match self {
            NoteTarget::Whole => None,
            NoteTarget::Surface(code) => Some(*code),
        }
    }
}

impl fmt::Display for NoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteTarget::Whole => f.write_str("whole"),
            NoteTarget::Surface(code) => write!(f, "{code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteIndicator {
    pub tooth: ToothId,
    pub target: NoteTarget,
    pub position: Point,
    pub has_note: bool,
    pub color: &'static str,
}

/// Indicator set keyed by (tooth, target).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteIndicators {
    indicators: BTreeMap<(ToothId, NoteTarget), NoteIndicator>,
}

impl NoteIndicators {
    /// Compute every indicator from scratch.
    pub fn rebuild(state: &ChartState, layout: &ChartLayout) -> Self {
        let mut indicators = Self::default();
        for id in state.tooth_ids() {
            indicators.refresh_tooth(state, layout, id);
        }
        indicators
    }

    /// Recompute one target. Returns the indicator now shown, if any.
    pub fn refresh(
        &mut self,
        state: &ChartState,
        layout: &ChartLayout,
        tooth: ToothId,
        target: NoteTarget,
    ) -> Option<&NoteIndicator> {
        let key = (tooth, target);
        match indicator_for(state, layout, tooth, target) {
            Some(indicator) => {
                self.indicators.insert(key, indicator);
                self.indicators.get(&key)
            }
            None => {
                self.indicators.remove(&key);
                None
            }
        }
    }

    /// Recompute the whole-tooth target and every surface of one tooth.
    pub fn refresh_tooth(&mut self, state: &ChartState, layout: &ChartLayout, tooth: ToothId) {
        self.refresh(state, layout, tooth, NoteTarget::Whole);
        let codes: Vec<SurfaceCode> = state
            .get(&tooth)
            .map(|record| record.surfaces.keys().copied().collect())
            .unwrap_or_default();
        for code in codes {
            self.refresh(state, layout, tooth, NoteTarget::Surface(code));
        }
    }

    pub fn get(&self, tooth: ToothId, target: NoteTarget) -> Option<&NoteIndicator> {
        self.indicators.get(&(tooth, target))
    }

    pub fn for_tooth(&self, tooth: ToothId) -> impl Iterator<Item = &NoteIndicator> {
        self.indicators
            .range((tooth, NoteTarget::Whole)..)
            .take_while(move |((id, _), _)| *id == tooth)
            .map(|(_, indicator)| indicator)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteIndicator> {
        self.indicators.values()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

fn indicator_for(
    state: &ChartState,
    layout: &ChartLayout,
    tooth: ToothId,
    target: NoteTarget,
) -> Option<NoteIndicator> {
    let record = state.get(&tooth)?;
    let tooth_layout = layout.tooth(tooth)?;
    let (note, anchor): (&str, Rect) = match target {
        NoteTarget::Whole => {
            let whole = record.whole_tooth_state.as_ref()?;
            (whole.note.as_str(), tooth_layout.bbox)
        }
        NoteTarget::Surface(code) => {
            let surface = record.surface(code)?;
            if surface.is_sound() {
                return None;
            }
            (surface.note.as_str(), tooth_layout.surface(code)?.rect)
        }
    };
    let has_note = !note.is_empty();
    Some(NoteIndicator {
        tooth,
        target,
        position: Point::new(anchor.x2() - ANCHOR_INSET_X, anchor.y + ANCHOR_INSET_Y),
        has_note,
        color: if has_note {
            NOTE_PRESENT_COLOR
        } else {
            NOTE_ABSENT_COLOR
        },
    })
}
