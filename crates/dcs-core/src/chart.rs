//! Charting engine facade.
//!
//! [`DentalChart`] owns the layout, the chart state, history and every
//! derived view. All mutations go through it so that after each one:
//!
//! - note indicators of the affected targets are recomputed,
//! - periodontal missing flags follow the chart,
//! - the DMFT score is recomputed,
//! - a history entry is pushed.
//!
//! Undo, redo and snapshot loads rebuild the chart by replaying the saved
//! conditions through the same transition function a click uses.

use serde::Serialize;
use tracing::{debug, info, warn};

use dcs_model::{ChartState, ConditionCatalog, DentitionMode, SurfaceCode, ToothId};

use crate::config::{ChartConfig, LoadPolicy};
use crate::error::{ApplyError, ChartError, Result};
use crate::findings::{self, ClinicalFinding};
use crate::history::{History, HistoryPosition};
use crate::layout::ChartLayout;
use crate::render::{self, Scene};
use crate::sync::dmft::{DmftScore, DmftTracker};
use crate::sync::notes::{NoteIndicators, NoteTarget};
use crate::sync::perio::{self, Aspect, PerioChart, PerioError, PerioScores, PerioSite};
use crate::transition::{self, ApplyRequest, Outcome};

/// Emitted when the user asks to view or edit a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub tooth_id: ToothId,
    pub surface_code: Option<SurfaceCode>,
    pub current_note: String,
}

/// What a snapshot load kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub mode: DentitionMode,
    pub teeth_loaded: usize,
    /// Teeth that are not part of the mode's layout.
    pub unknown_teeth: Vec<String>,
    /// `tooth:surface` pairs the layout does not give that tooth.
    pub unknown_surfaces: Vec<String>,
    /// `key:id` for records whose inner id disagrees with their map key.
    /// The map key wins.
    pub mismatched_ids: Vec<String>,
    /// Notes attached to a target with no active condition.
    pub dropped_notes: Vec<String>,
    /// Conditions recorded in the wrong scope.
    pub dropped_conditions: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_teeth.is_empty()
            && self.unknown_surfaces.is_empty()
            && self.mismatched_ids.is_empty()
            && self.dropped_notes.is_empty()
            && self.dropped_conditions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DentalChart {
    config: ChartConfig,
    catalog: ConditionCatalog,
    layout: ChartLayout,
    state: ChartState,
    history: History,
    notes: NoteIndicators,
    perio: PerioChart,
    dmft: DmftTracker,
    revision: u64,
}

impl Default for DentalChart {
    fn default() -> Self {
        Self::new()
    }
}

impl DentalChart {
    /// A blank permanent chart with default configuration.
    pub fn new() -> Self {
        Self::with_config(ChartConfig::default())
    }

    pub fn with_config(config: ChartConfig) -> Self {
        Self::with_catalog(config, ConditionCatalog::standard().clone())
    }

    pub fn with_catalog(config: ChartConfig, catalog: ConditionCatalog) -> Self {
        let layout = ChartLayout::generate(DentitionMode::Permanent);
        let mut state = ChartState::new(layout.mode);
        state.initialize(layout.seeds());
        let mut history = History::new(config.history_limit);
        history.save(&state);
        let notes = NoteIndicators::rebuild(&state, &layout);
        let perio = PerioChart::for_layout(&layout);
        let mut dmft = DmftTracker::default();
        dmft.recompute(&state);
        Self {
            config,
            catalog,
            layout,
            state,
            history,
            notes,
            perio,
            dmft,
            revision: 0,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn dentition_mode(&self) -> DentitionMode {
        self.state.dentition_mode
    }

    /// Serializable copy of the current chart.
    pub fn snapshot(&self) -> ChartState {
        self.state.clone()
    }

    pub fn notes(&self) -> &NoteIndicators {
        &self.notes
    }

    pub fn perio(&self) -> &PerioChart {
        &self.perio
    }

    pub fn perio_scores(&self) -> PerioScores {
        self.perio.scores()
    }

    pub fn dmft(&self) -> DmftScore {
        self.dmft.score()
    }

    pub fn dmft_is_manual(&self) -> bool {
        self.dmft.is_manual()
    }

    pub fn history_position(&self) -> HistoryPosition {
        self.history.position()
    }

    /// Monotonic counter bumped by every mutation; used for dirty tracking.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn findings(&self) -> Vec<ClinicalFinding> {
        findings::collect(&self.state, &self.catalog)
    }

    pub fn scene(&self) -> Scene {
        render::project(&self.layout, &self.state, &self.notes, &self.catalog)
    }

    /// Apply a condition from the raw interaction triple.
    pub fn apply(
        &mut self,
        tooth: &str,
        surface: Option<&str>,
        key: &str,
    ) -> std::result::Result<Outcome, ApplyError> {
        let request = ApplyRequest::parse(tooth, surface, key, &self.catalog).inspect_err(
            |error| warn!(tooth, surface, key, %error, "condition request rejected"),
        )?;
        self.apply_request(&request)
    }

    pub fn apply_request(
        &mut self,
        request: &ApplyRequest,
    ) -> std::result::Result<Outcome, ApplyError> {
        let outcome = transition::apply(&mut self.state, &self.layout, request)?;

        if outcome.surfaces_reset {
            self.notes
                .refresh_tooth(&self.state, &self.layout, outcome.tooth);
        } else {
            self.notes
                .refresh(&self.state, &self.layout, outcome.tooth, NoteTarget::Whole);
            if let Some(surface) = request.surface {
                self.notes.refresh(
                    &self.state,
                    &self.layout,
                    outcome.tooth,
                    NoteTarget::Surface(surface),
                );
            }
        }
        if outcome.missing_changed {
            let missing = self
                .state
                .get(&outcome.tooth)
                .is_some_and(|record| record.is_missing());
            if let Err(error) = self.perio.set_missing(outcome.tooth, missing) {
                warn!(%error, "periodontal chart out of step with layout");
                self.perio.sync_missing(&self.state);
            }
        }
        self.commit();
        Ok(outcome)
    }

    /// Switch dentition. The same mode only redraws; a new mode discards the
    /// current tooth set and periodontal chart.
    pub fn set_dentition_mode(&mut self, mode: DentitionMode) {
        if mode == self.state.dentition_mode {
            self.redraw();
            return;
        }
        info!(from = %self.state.dentition_mode, to = %mode, "switching dentition");
        self.layout = ChartLayout::generate(mode);
        self.state.regenerate(mode, self.layout.seeds());
        self.perio = PerioChart::for_layout(&self.layout);
        self.notes = NoteIndicators::rebuild(&self.state, &self.layout);
        self.commit();
    }

    pub fn toggle_dentition(&mut self) -> DentitionMode {
        let mode = self.state.dentition_mode.toggled();
        self.set_dentition_mode(mode);
        mode
    }

    /// Re-seed the current layout without discarding edits.
    pub fn redraw(&mut self) {
        self.state.initialize(self.layout.seeds());
        self.notes = NoteIndicators::rebuild(&self.state, &self.layout);
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.replay(&entry);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo().cloned() else {
            return false;
        };
        self.replay(&entry);
        true
    }

    /// Load a chart snapshot as a new, undoable history entry.
    pub fn load_snapshot(&mut self, snapshot: &ChartState) -> Result<LoadReport> {
        let report = self.load(snapshot)?;
        self.history.save(&self.state);
        Ok(report)
    }

    /// Load a serialized chart snapshot.
    pub fn load_snapshot_json(&mut self, json: &str) -> Result<LoadReport> {
        let snapshot: ChartState =
            serde_json::from_str(json).map_err(|source| ChartError::Snapshot { source })?;
        self.load_snapshot(&snapshot)
    }

    /// Replace the chart with a stored one and restart history from it.
    pub fn restore(&mut self, snapshot: &ChartState) -> Result<LoadReport> {
        let report = self.load(snapshot)?;
        self.history.reset_with(&self.state);
        Ok(report)
    }

    /// Replace the periodontal chart, e.g. with the one stored for a patient.
    pub fn restore_perio(&mut self, perio: PerioChart) {
        self.perio = perio.reconciled(&self.layout);
        self.perio.sync_missing(&self.state);
    }

    pub fn request_note(
        &self,
        tooth: ToothId,
        surface: Option<SurfaceCode>,
    ) -> std::result::Result<NoteRequest, ApplyError> {
        let current_note = self.note_slot(tooth, surface)?.to_string();
        Ok(NoteRequest {
            tooth_id: tooth,
            surface_code: surface,
            current_note,
        })
    }

    /// Store a note on a target that carries an active condition.
    pub fn write_note(
        &mut self,
        tooth: ToothId,
        surface: Option<SurfaceCode>,
        text: &str,
    ) -> std::result::Result<(), ApplyError> {
        self.note_slot(tooth, surface)?;
        let record = self
            .state
            .get_mut(&tooth)
            .ok_or_else(|| ApplyError::UnknownTooth(tooth.to_string()))?;
        let slot = match surface {
            Some(code) => record.surface_mut(code).map(|state| &mut state.note),
            None => record.whole_tooth_state.as_mut().map(|state| &mut state.note),
        };
        if let Some(note) = slot {
            *note = text.to_string();
        }
        self.notes.refresh(
            &self.state,
            &self.layout,
            tooth,
            NoteTarget::from_surface(surface),
        );
        debug!(%tooth, surface = ?surface, "note written");
        self.history.save(&self.state);
        self.revision += 1;
        Ok(())
    }

    /// Override the computed DMFT until the next chart mutation.
    pub fn set_manual_dmft(&mut self, score: DmftScore) {
        self.dmft.set_manual(score);
        self.revision += 1;
    }

    pub fn record_probing_depths(
        &mut self,
        tooth: ToothId,
        aspect: Aspect,
        readings: [u8; perio::SITES_PER_ASPECT],
    ) -> std::result::Result<(), PerioError> {
        self.perio.record_probing_depths(tooth, aspect, readings)?;
        self.revision += 1;
        Ok(())
    }

    /// Edit one periodontal site (one-based site number).
    pub fn update_perio_site(
        &mut self,
        tooth: ToothId,
        aspect: Aspect,
        site: usize,
        update: impl FnOnce(&mut PerioSite) -> std::result::Result<(), PerioError>,
    ) -> std::result::Result<(), PerioError> {
        let mut edited = *self.perio.site_mut(tooth, aspect, site)?;
        update(&mut edited)?;
        *self.perio.site_mut(tooth, aspect, site)? = edited;
        self.revision += 1;
        Ok(())
    }

    fn note_slot(
        &self,
        tooth: ToothId,
        surface: Option<SurfaceCode>,
    ) -> std::result::Result<&str, ApplyError> {
        let record = self
            .state
            .get(&tooth)
            .ok_or_else(|| ApplyError::UnknownTooth(tooth.to_string()))?;
        let no_condition = ApplyError::NoActiveCondition { tooth, surface };
        match surface {
            Some(code) => {
                let state = record
                    .surface(code)
                    .ok_or(ApplyError::SurfaceNotOnTooth {
                        tooth,
                        surface: code,
                    })?;
                if state.is_sound() {
                    return Err(no_condition);
                }
                Ok(&state.note)
            }
            None => record
                .whole_tooth_state
                .as_ref()
                .map(|state| state.note.as_str())
                .ok_or(no_condition),
        }
    }

    /// Derived-view refresh shared by every chart mutation.
    fn commit(&mut self) {
        self.dmft.recompute(&self.state);
        self.history.save(&self.state);
        self.revision += 1;
    }

    fn replay(&mut self, entry: &ChartState) {
        if let Err(error) = self.rebuild_from(entry, LoadPolicy::Repair) {
            warn!(%error, "history entry could not be replayed");
        }
        self.revision += 1;
    }

    fn load(&mut self, snapshot: &ChartState) -> Result<LoadReport> {
        let report = self.rebuild_from(snapshot, self.config.load_policy)?;
        if report.is_clean() {
            info!(mode = %report.mode, teeth = report.teeth_loaded, "chart snapshot loaded");
        } else {
            warn!(
                mode = %report.mode,
                unknown_teeth = report.unknown_teeth.len(),
                unknown_surfaces = report.unknown_surfaces.len(),
                mismatched_ids = report.mismatched_ids.len(),
                dropped_notes = report.dropped_notes.len(),
                dropped_conditions = report.dropped_conditions.len(),
                "chart snapshot repaired on load"
            );
        }
        self.revision += 1;
        Ok(report)
    }

    /// Regenerate the layout for the snapshot's mode, then overlay its
    /// conditions and notes through the transition function.
    ///
    /// Teeth are identified by their map key, so each tooth is replayed at
    /// most once.
    fn rebuild_from(&mut self, snapshot: &ChartState, policy: LoadPolicy) -> Result<LoadReport> {
        let mode = snapshot.dentition_mode;
        let layout = ChartLayout::generate(mode);
        let mut report = LoadReport {
            mode,
            ..LoadReport::default()
        };

        for (&id, record) in &snapshot.teeth {
            if record.id != id {
                report.mismatched_ids.push(format!("{id}:{}", record.id));
            }
            match layout.tooth(id) {
                None => report.unknown_teeth.push(id.to_string()),
                Some(tooth) => {
                    report.unknown_surfaces.extend(
                        record
                            .surfaces
                            .keys()
                            .filter(|code| !tooth.has_surface(**code))
                            .map(|code| format!("{id}:{code}")),
                    );
                }
            }
        }
        if policy == LoadPolicy::Reject
            && (!report.unknown_teeth.is_empty()
                || !report.unknown_surfaces.is_empty()
                || !report.mismatched_ids.is_empty())
        {
            return Err(ChartError::LayoutMismatch {
                mode,
                unknown_teeth: report.unknown_teeth,
                unknown_surfaces: report.unknown_surfaces,
                mismatched_ids: report.mismatched_ids,
            });
        }

        let mut state = ChartState::new(mode);
        state.initialize(layout.seeds());
        for (&id, record) in snapshot.teeth.iter().filter(|(id, _)| layout.contains(**id)) {
            if let Some(whole) = &record.whole_tooth_state {
                if !whole.condition.is_whole_tooth() {
                    report.dropped_conditions.push(format!("{id}:whole"));
                } else {
                    transition::apply(
                        &mut state,
                        &layout,
                        &ApplyRequest::new(id, None, whole.condition),
                    )?;
                    if let Some(target) = state
                        .get_mut(&id)
                        .and_then(|tooth| tooth.whole_tooth_state.as_mut())
                    {
                        target.note.clone_from(&whole.note);
                    }
                }
            }
            for (code, surface) in &record.surfaces {
                if !layout.tooth(id).is_some_and(|tooth| tooth.has_surface(*code)) {
                    continue;
                }
                let Some(condition) = surface.condition else {
                    if !surface.note.is_empty() {
                        report.dropped_notes.push(format!("{id}:{code}"));
                    }
                    continue;
                };
                if condition.is_whole_tooth() {
                    report.dropped_conditions.push(format!("{id}:{code}"));
                    continue;
                }
                transition::apply(
                    &mut state,
                    &layout,
                    &ApplyRequest::new(id, Some(*code), condition),
                )?;
                if let Some(target) = state.get_mut(&id).and_then(|tooth| tooth.surface_mut(*code))
                {
                    target.note.clone_from(&surface.note);
                }
            }
            report.teeth_loaded += 1;
        }

        if layout.mode != self.layout.mode {
            self.perio = std::mem::replace(&mut self.perio, PerioChart::for_layout(&layout))
                .reconciled(&layout);
        }
        self.layout = layout;
        self.state = state;
        self.notes = NoteIndicators::rebuild(&self.state, &self.layout);
        self.perio.sync_missing(&self.state);
        self.dmft.recompute(&self.state);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcs_model::Condition;

    fn id(value: &str) -> ToothId {
        value.parse().unwrap()
    }

    #[test]
    fn new_chart_starts_with_one_history_entry() {
        let chart = DentalChart::new();
        assert_eq!(chart.state().len(), 32);
        assert_eq!(chart.history_position().len, 1);
        assert!(!chart.history_position().can_undo);
        assert_eq!(chart.dmft(), DmftScore::default());
    }

    #[test]
    fn mutation_updates_every_derived_view() {
        let mut chart = DentalChart::new();
        chart.apply("16", None, "missing").unwrap();
        assert_eq!(chart.dmft().missing, 1);
        assert!(chart.perio().tooth(id("16")).unwrap().missing);
        assert!(chart.notes().get(id("16"), NoteTarget::Whole).is_some());
        assert_eq!(chart.history_position().len, 2);
        assert_eq!(chart.revision(), 1);
    }

    #[test]
    fn rejected_request_changes_nothing() {
        let mut chart = DentalChart::new();
        let before = chart.snapshot();
        assert!(chart.apply("16", None, "caries").is_err());
        assert!(chart.apply("16", Some("Q"), "caries").is_err());
        assert!(chart.apply("19", None, "crown").is_err());
        assert_eq!(chart.snapshot(), before);
        assert_eq!(chart.history_position().len, 1);
        assert_eq!(chart.revision(), 0);
    }

    #[test]
    fn toggling_dentition_regenerates_chart() {
        let mut chart = DentalChart::new();
        chart.apply("16", Some("O"), "caries").unwrap();
        assert_eq!(chart.toggle_dentition(), DentitionMode::Primary);
        assert_eq!(chart.state().len(), 20);
        assert_eq!(chart.perio().teeth.len(), 20);
        assert_eq!(chart.dmft(), DmftScore::default());

        assert!(chart.undo());
        assert_eq!(chart.dentition_mode(), DentitionMode::Permanent);
        assert_eq!(chart.perio().teeth.len(), 32);
        assert_eq!(chart.dmft().decayed, 1);
    }

    #[test]
    fn same_mode_redraw_keeps_edits() {
        let mut chart = DentalChart::new();
        chart.apply("21", None, "crown").unwrap();
        chart.set_dentition_mode(DentitionMode::Permanent);
        assert_eq!(
            chart.state().get(&id("21")).unwrap().whole_condition(),
            Some(Condition::Crown)
        );
        assert_eq!(chart.history_position().len, 2);
    }

    #[test]
    fn manual_dmft_lasts_until_next_mutation() {
        let mut chart = DentalChart::new();
        chart.set_manual_dmft(DmftScore::new(4, 0, 2));
        assert!(chart.dmft_is_manual());
        assert_eq!(chart.dmft().total(), 6);
        chart.apply("11", None, "crown").unwrap();
        assert!(!chart.dmft_is_manual());
        assert_eq!(chart.dmft(), DmftScore::new(0, 0, 1));
    }

    #[test]
    fn reject_policy_keeps_current_chart() {
        let config = ChartConfig {
            load_policy: LoadPolicy::Reject,
            ..ChartConfig::default()
        };
        let mut chart = DentalChart::with_config(config);
        chart.apply("11", None, "crown").unwrap();
        let before = chart.snapshot();

        let mut snapshot = ChartState::new(DentitionMode::Permanent);
        snapshot.initialize([(id("55"), vec![SurfaceCode::Occlusal])]);
        let error = chart.load_snapshot(&snapshot).unwrap_err();
        assert!(matches!(error, ChartError::LayoutMismatch { .. }));
        assert_eq!(chart.snapshot(), before);
    }

    #[test]
    fn repair_policy_reports_dropped_items() {
        let mut chart = DentalChart::new();
        let mut snapshot = ChartState::new(DentitionMode::Permanent);
        snapshot.initialize([
            (id("55"), vec![SurfaceCode::Occlusal]),
            (id("11"), vec![SurfaceCode::Occlusal, SurfaceCode::Incisal]),
        ]);
        if let Some(surface) = snapshot
            .get_mut(&id("11"))
            .and_then(|tooth| tooth.surface_mut(SurfaceCode::Incisal))
        {
            surface.condition = Some(Condition::Composite);
            surface.note = "shade A2".to_string();
        }

        let report = chart.load_snapshot(&snapshot).unwrap();
        assert_eq!(report.unknown_teeth, vec!["55"]);
        assert_eq!(report.unknown_surfaces, vec!["11:O"]);
        assert_eq!(chart.state().len(), 32);
        let incisal = chart
            .state()
            .get(&id("11"))
            .and_then(|tooth| tooth.surface(SurfaceCode::Incisal))
            .unwrap();
        assert_eq!(incisal.condition, Some(Condition::Composite));
        assert_eq!(incisal.note, "shade A2");
        assert_eq!(chart.dmft().filled, 1);
    }

    #[test]
    fn missing_tooth_and_its_surfaces_survive_replay() {
        let mut chart = DentalChart::new();
        chart.apply("46", None, "missing").unwrap();
        chart.apply("46", Some("O"), "caries").unwrap();
        let charted = chart.snapshot();

        chart.apply("11", None, "crown").unwrap();
        assert!(chart.undo());
        assert_eq!(chart.snapshot(), charted);
        assert!(chart.redo());
        assert!(chart.undo());

        let mut reopened = DentalChart::new();
        let report = reopened.load_snapshot(&charted).unwrap();
        assert!(report.is_clean(), "{report:?}");
        let tooth = reopened.state().get(&id("46")).unwrap();
        assert!(tooth.is_missing());
        assert_eq!(
            tooth.surface(SurfaceCode::Occlusal).unwrap().condition,
            Some(Condition::Caries)
        );
        assert_eq!(reopened.snapshot(), charted);
        assert!(reopened.perio().tooth(id("46")).unwrap().missing);
    }

    #[test]
    fn records_are_replayed_once_under_their_map_key() {
        let json = r#"{"dentitionMode":"permanent","teeth":{
            "16":{"id":"16","surfaces":{},"wholeToothState":{"condition":"crown","note":""}},
            "17":{"id":"16","surfaces":{},"wholeToothState":{"condition":"crown","note":""}}
        }}"#;
        let mut chart = DentalChart::new();
        let report = chart.load_snapshot_json(json).unwrap();
        assert_eq!(report.teeth_loaded, 2);
        assert_eq!(report.mismatched_ids, vec!["17:16"]);
        assert!(!report.is_clean());
        for tooth in ["16", "17"] {
            assert_eq!(
                chart.state().get(&id(tooth)).unwrap().whole_condition(),
                Some(Condition::Crown),
                "{tooth}"
            );
        }
        assert_eq!(chart.state().get(&id("17")).unwrap().id, id("17"));

        let mut strict = DentalChart::with_config(ChartConfig {
            load_policy: LoadPolicy::Reject,
            ..ChartConfig::default()
        });
        let error = strict.load_snapshot_json(json).unwrap_err();
        assert!(matches!(
            error,
            ChartError::LayoutMismatch { ref mismatched_ids, .. } if mismatched_ids == &["17:16"]
        ));
    }

    #[test]
    fn load_snapshot_json_surfaces_parse_errors() {
        let mut chart = DentalChart::new();
        let error = chart
            .load_snapshot_json(r#"{"teeth":{"16":{"id":"16","surfaces":{"O":{"condition":"veneer"}}}}}"#)
            .unwrap_err();
        assert!(matches!(error, ChartError::Snapshot { .. }));
    }
}
