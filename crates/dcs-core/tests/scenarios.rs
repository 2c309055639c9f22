//! End-to-end charting scenarios through the engine facade.

use std::time::{Duration, Instant};

use dcs_core::sync::perio::{Aspect, PerioError, PerioSite};
use dcs_core::{ApplyError, Debouncer, DentalChart, DmftScore, NoteTarget, SupersessionGate};
use dcs_model::{Condition, DentitionMode, SurfaceCode, ToothId};

fn id(value: &str) -> ToothId {
    value.parse().unwrap()
}

#[test]
fn new_mutation_after_undo_discards_the_redo_tail() {
    let mut chart = DentalChart::new();
    chart.apply("11", None, "crown").unwrap();
    chart.apply("12", None, "rct").unwrap();
    chart.apply("13", Some("I"), "composite").unwrap();
    assert_eq!(chart.history_position().len, 4);
    assert_eq!(chart.history_position().index, 3);

    assert!(chart.undo());
    assert!(chart.undo());
    assert_eq!(chart.history_position().index, 1);

    chart.apply("21", None, "implant").unwrap();
    let position = chart.history_position();
    assert_eq!(position.len, 3);
    assert_eq!(position.index, 2);
    assert!(!position.can_redo);
    assert!(!chart.redo());

    let state = chart.state();
    assert_eq!(state.get(&id("11")).unwrap().whole_condition(), Some(Condition::Crown));
    assert_eq!(state.get(&id("12")).unwrap().whole_condition(), None);
    assert_eq!(state.get(&id("21")).unwrap().whole_condition(), Some(Condition::Implant));
}

#[test]
fn history_bounds_are_no_ops() {
    let mut chart = DentalChart::new();
    assert!(!chart.undo());
    assert!(!chart.redo());
    chart.apply("11", None, "crown").unwrap();
    assert!(!chart.redo());
    assert!(chart.undo());
    assert!(!chart.undo());
    assert_eq!(chart.history_position().index, 0);
}

#[test]
fn dmft_precedence() {
    let mut chart = DentalChart::new();
    chart.apply("16", Some("O"), "caries").unwrap();
    chart.apply("16", Some("B"), "composite").unwrap();
    chart.apply("26", None, "crown").unwrap();
    chart.apply("46", Some("O"), "caries").unwrap();
    chart.apply("46", Some("M"), "caries").unwrap();
    assert_eq!(chart.dmft(), DmftScore::new(2, 0, 1));

    chart.apply("46", None, "missing").unwrap();
    assert_eq!(chart.dmft(), DmftScore::new(1, 1, 1));
    assert_eq!(chart.dmft().total(), 3);
    assert_eq!(
        chart.dmft().to_string(),
        "D: 1, M: 1, F: 1, Total DMFT: 3"
    );
}

#[test]
fn whole_tooth_conditions_are_mutually_exclusive() {
    let mut chart = DentalChart::new();
    chart.apply("36", None, "fracture").unwrap();
    chart.apply("36", None, "rct").unwrap();
    chart.apply("36", Some("O"), "bridge-pontic").unwrap();
    let tooth = chart.state().get(&id("36")).unwrap();
    assert_eq!(tooth.whole_condition(), Some(Condition::BridgePontic));

    let scene = chart.scene();
    let node = scene.tooth(id("36")).unwrap();
    assert_eq!(node.overlays.len(), 1);
}

#[test]
fn notes_follow_their_condition() {
    let mut chart = DentalChart::new();
    let tooth = id("16");

    assert_eq!(
        chart.write_note(tooth, Some(SurfaceCode::Occlusal), "watch"),
        Err(ApplyError::NoActiveCondition {
            tooth,
            surface: Some(SurfaceCode::Occlusal),
        })
    );

    chart.apply("16", Some("O"), "caries").unwrap();
    let indicator = chart
        .notes()
        .get(tooth, NoteTarget::Surface(SurfaceCode::Occlusal))
        .unwrap();
    assert!(!indicator.has_note);

    chart
        .write_note(tooth, Some(SurfaceCode::Occlusal), "deep lesion")
        .unwrap();
    let request = chart.request_note(tooth, Some(SurfaceCode::Occlusal)).unwrap();
    assert_eq!(request.current_note, "deep lesion");
    assert!(
        chart
            .notes()
            .get(tooth, NoteTarget::Surface(SurfaceCode::Occlusal))
            .unwrap()
            .has_note
    );

    chart.apply("16", Some("O"), "caries").unwrap();
    assert!(chart.request_note(tooth, Some(SurfaceCode::Occlusal)).is_err());
    assert!(
        chart
            .notes()
            .get(tooth, NoteTarget::Surface(SurfaceCode::Occlusal))
            .is_none()
    );

    chart.apply("16", None, "crown").unwrap();
    chart.write_note(tooth, None, "zirconia").unwrap();
    chart.apply("16", None, "crown").unwrap();
    assert!(chart.state().get(&tooth).unwrap().is_clear());
    assert!(chart.notes().for_tooth(tooth).next().is_none());

    chart.apply("16", None, "crown").unwrap();
    assert_eq!(chart.request_note(tooth, None).unwrap().current_note, "");
}

#[test]
fn undo_restores_notes() {
    let mut chart = DentalChart::new();
    let tooth = id("21");
    chart.apply("21", None, "impacted").unwrap();
    chart.write_note(tooth, None, "refer to surgeon").unwrap();
    chart.apply("21", None, "impacted").unwrap();
    assert!(chart.request_note(tooth, None).is_err());

    assert!(chart.undo());
    assert_eq!(
        chart.request_note(tooth, None).unwrap().current_note,
        "refer to surgeon"
    );
    assert!(chart.notes().get(tooth, NoteTarget::Whole).unwrap().has_note);
}

#[test]
fn missing_teeth_leave_the_periodontal_scores() {
    let mut chart = DentalChart::new();
    let bleed = |site: &mut PerioSite| -> Result<(), PerioError> {
        site.bleeding = true;
        Ok(())
    };
    chart.update_perio_site(id("11"), Aspect::Buccal, 1, bleed).unwrap();
    chart.update_perio_site(id("16"), Aspect::Lingual, 2, bleed).unwrap();
    chart
        .record_probing_depths(id("16"), Aspect::Buccal, [5, 6, 4])
        .unwrap();

    let scores = chart.perio_scores();
    assert_eq!(scores.counted_sites, 32 * 6);
    assert_eq!(scores.bleeding_sites, 2);
    assert_eq!(scores.bop_percent, 1);

    chart.apply("16", None, "missing").unwrap();
    let scores = chart.perio_scores();
    assert_eq!(scores.counted_sites, 31 * 6);
    assert_eq!(scores.bleeding_sites, 1);

    let perio_16 = chart.perio().tooth(id("16")).unwrap();
    assert!(perio_16.missing);
    assert_eq!(perio_16.buccal.sites[0].probing_depth, Some(5));

    chart.apply("16", None, "missing").unwrap();
    assert!(chart.perio().tooth(id("16")).unwrap().missing);
    chart.apply("16", None, "implant").unwrap();
    assert!(!chart.perio().tooth(id("16")).unwrap().missing);
    assert_eq!(chart.perio_scores().bleeding_sites, 2);
}

#[test]
fn primary_dentition_round_trip() {
    let mut chart = DentalChart::new();
    chart.toggle_dentition();
    assert_eq!(chart.dentition_mode(), DentitionMode::Primary);
    chart.apply("54", Some("O"), "caries").unwrap();
    chart.apply("61", Some("O"), "sealant").unwrap();
    assert!(chart.apply("61", Some("I"), "sealant").is_err());
    assert!(chart.apply("16", None, "crown").is_err());

    let snapshot = serde_json::to_string(&chart.snapshot()).unwrap();
    let mut restored = DentalChart::new();
    let report = restored.load_snapshot_json(&snapshot).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.teeth_loaded, 20);
    assert_eq!(restored.snapshot(), chart.snapshot());
    assert_eq!(restored.perio().teeth.len(), 20);
    assert_eq!(restored.dmft(), DmftScore::new(1, 0, 1));
}

#[test]
fn restore_restarts_history() {
    let mut source = DentalChart::new();
    source.apply("31", None, "to-be-extracted").unwrap();

    let mut chart = DentalChart::new();
    chart.apply("11", None, "crown").unwrap();
    chart.restore(&source.snapshot()).unwrap();
    let position = chart.history_position();
    assert_eq!(position.len, 1);
    assert!(!position.can_undo);
    assert_eq!(chart.dmft().missing, 1);
}

#[test]
fn debouncer_fires_only_the_last_value() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(1500));
    debouncer.schedule("upper right", start);
    debouncer.schedule("upper right molar", start + Duration::from_millis(900));
    assert_eq!(debouncer.poll(start + Duration::from_millis(2000)), None);
    assert_eq!(
        debouncer.poll(start + Duration::from_millis(2400)),
        Some("upper right molar")
    );
    assert!(!debouncer.is_pending());
}

#[test]
fn stale_responses_are_rejected() {
    let mut gate = SupersessionGate::new();
    let first = gate.issue("procedure");
    let second = gate.issue("diagnosis");
    assert!(!gate.is_current(first));
    assert!(gate.is_current(second));
    assert!(gate.is_current_for(second, &"diagnosis"));
    assert!(!gate.is_current_for(second, &"procedure"));
}
