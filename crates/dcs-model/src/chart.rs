//! Tooth/surface state store.
//!
//! [`ChartState`] exclusively owns every [`ToothRecord`]. It is plain data:
//! it serializes to the persisted chart form and deep-copies by `Clone`, which
//! is what the history stack stores. Rendering handles never live here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::enums::{DentitionMode, SurfaceCode};
use crate::error::{ModelError, Result};
use crate::tooth::ToothId;

/// Condition and note of one surface. `None` means sound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceState {
    #[serde(default, with = "sound_or_condition")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub note: String,
}

impl SurfaceState {
    pub fn is_sound(&self) -> bool {
        self.condition.is_none()
    }

    /// Reset to sound with an empty note.
    pub fn reset(&mut self) {
        self.condition = None;
        self.note.clear();
    }
}

/// The single active whole-tooth condition and its note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WholeToothState {
    pub condition: Condition,
    #[serde(default)]
    pub note: String,
}

impl WholeToothState {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            note: String::new(),
        }
    }
}

/// Everything recorded for one tooth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToothRecord {
    pub id: ToothId,
    pub surfaces: BTreeMap<SurfaceCode, SurfaceState>,
    #[serde(default)]
    pub whole_tooth_state: Option<WholeToothState>,
}

impl ToothRecord {
    /// A record with every given surface sound and no whole-tooth condition.
    pub fn new<S>(id: ToothId, surfaces: S) -> Self
    where
        S: IntoIterator<Item = SurfaceCode>,
    {
        Self {
            id,
            surfaces: surfaces
                .into_iter()
                .map(|code| (code, SurfaceState::default()))
                .collect(),
            whole_tooth_state: None,
        }
    }

    pub fn surface(&self, code: SurfaceCode) -> Option<&SurfaceState> {
        self.surfaces.get(&code)
    }

    pub fn surface_mut(&mut self, code: SurfaceCode) -> Option<&mut SurfaceState> {
        self.surfaces.get_mut(&code)
    }

    pub fn whole_condition(&self) -> Option<Condition> {
        self.whole_tooth_state.as_ref().map(|state| state.condition)
    }

    pub fn is_missing(&self) -> bool {
        self.whole_condition() == Some(Condition::Missing)
    }

    /// Surfaces carrying a non-sound condition, in code order.
    pub fn charted_surfaces(&self) -> impl Iterator<Item = (SurfaceCode, Condition)> + '_ {
        self.surfaces
            .iter()
            .filter_map(|(code, state)| state.condition.map(|condition| (*code, condition)))
    }

    pub fn any_surface(&self, predicate: impl Fn(Condition) -> bool) -> bool {
        self.charted_surfaces()
            .any(|(_, condition)| predicate(condition))
    }

    /// True when nothing is charted on this tooth.
    pub fn is_clear(&self) -> bool {
        self.whole_tooth_state.is_none() && self.surfaces.values().all(SurfaceState::is_sound)
    }

    /// Reset every surface to sound with an empty note.
    pub fn reset_surfaces(&mut self) {
        self.surfaces.values_mut().for_each(SurfaceState::reset);
    }
}

/// The full chart: dentition mode plus one record per tooth of that mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartState {
    #[serde(default)]
    pub dentition_mode: DentitionMode,
    #[serde(default)]
    pub teeth: BTreeMap<ToothId, ToothRecord>,
}

impl ChartState {
    /// An empty chart for the given mode. Call [`ChartState::initialize`] to
    /// seed its teeth.
    pub fn new(dentition_mode: DentitionMode) -> Self {
        Self {
            dentition_mode,
            teeth: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &ToothId) -> Option<&ToothRecord> {
        self.teeth.get(id)
    }

    pub fn get_mut(&mut self, id: &ToothId) -> Option<&mut ToothRecord> {
        self.teeth.get_mut(id)
    }

    /// Look up a tooth, reporting absence as an error.
    pub fn tooth(&self, id: &ToothId) -> Result<&ToothRecord> {
        self.teeth.get(id).ok_or(ModelError::UnknownTooth(*id))
    }

    pub fn tooth_mut(&mut self, id: &ToothId) -> Result<&mut ToothRecord> {
        self.teeth.get_mut(id).ok_or(ModelError::UnknownTooth(*id))
    }

    /// Seed records for the given teeth.
    ///
    /// Idempotent: an existing record is never overwritten, it only gains
    /// surfaces it does not have yet (seeded sound).
    pub fn initialize<I, S>(&mut self, layout: I)
    where
        I: IntoIterator<Item = (ToothId, S)>,
        S: IntoIterator<Item = SurfaceCode>,
    {
        for (id, surfaces) in layout {
            let record = self
                .teeth
                .entry(id)
                .or_insert_with(|| ToothRecord::new(id, std::iter::empty()));
            for code in surfaces {
                record.surfaces.entry(code).or_default();
            }
        }
    }

    /// Discard every record and seed a fresh tooth set for `mode`.
    pub fn regenerate<I, S>(&mut self, mode: DentitionMode, layout: I)
    where
        I: IntoIterator<Item = (ToothId, S)>,
        S: IntoIterator<Item = SurfaceCode>,
    {
        self.dentition_mode = mode;
        self.teeth.clear();
        self.initialize(layout);
    }

    pub fn tooth_ids(&self) -> impl Iterator<Item = ToothId> + '_ {
        self.teeth.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &ToothRecord> {
        self.teeth.values()
    }

    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }

    /// Teeth whose whole-tooth condition is `missing`.
    pub fn missing_teeth(&self) -> impl Iterator<Item = ToothId> + '_ {
        self.teeth
            .values()
            .filter(|record| record.is_missing())
            .map(|record| record.id)
    }
}

/// Serialize `None` as `"sound"` and `Some(condition)` as its key.
mod sound_or_condition {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::condition::Condition;

    pub const SOUND: &str = "sound";

    pub fn serialize<S>(value: &Option<Condition>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map_or(SOUND, |condition| condition.key()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Condition>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") | Some(SOUND) => Ok(None),
            Some(key) => key.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
