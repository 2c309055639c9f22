//! Property tests for the charting engine.

use proptest::prelude::*;

use dcs_core::sync::dmft;
use dcs_core::{ChartLayout, DentalChart};
use dcs_model::{Condition, DentitionMode, SurfaceCode, ToothId};

fn permanent_ids() -> Vec<ToothId> {
    ChartLayout::generate(DentitionMode::Permanent)
        .tooth_ids()
        .collect()
}

fn tooth_strategy() -> impl Strategy<Value = ToothId> {
    prop::sample::select(permanent_ids())
}

fn condition_strategy() -> impl Strategy<Value = Condition> {
    prop::sample::select(Condition::ALL.to_vec())
}

fn surface_condition_strategy() -> impl Strategy<Value = Condition> {
    prop::sample::select(
        Condition::ALL
            .iter()
            .copied()
            .filter(|condition| !condition.is_whole_tooth())
            .collect::<Vec<_>>(),
    )
}

fn surface_slot_strategy() -> impl Strategy<Value = Option<usize>> {
    prop::option::of(0usize..5)
}

/// One interaction: tooth, optional surface cell index, condition.
fn step_strategy() -> impl Strategy<Value = (ToothId, Option<usize>, Condition)> {
    (tooth_strategy(), surface_slot_strategy(), condition_strategy())
}

fn apply_step(chart: &mut DentalChart, (tooth, slot, condition): (ToothId, Option<usize>, Condition)) {
    let surface = slot.and_then(|index| {
        chart
            .layout()
            .tooth(tooth)
            .and_then(|layout| layout.surfaces.get(index))
            .map(|cell| cell.code)
    });
    let surface = surface.map(|code| code.to_string());
    // Rejections are part of the exercise; they must leave the chart intact.
    let _ = chart.apply(&tooth.to_string(), surface.as_deref(), condition.key());
}

fn cell(chart: &DentalChart, tooth: ToothId, index: usize) -> SurfaceCode {
    chart.layout().tooth(tooth).unwrap().surfaces[index].code
}

proptest! {
    #[test]
    fn applying_a_surface_condition_twice_restores_the_chart(
        history in prop::collection::vec(step_strategy(), 0..20),
        tooth in tooth_strategy(),
        index in 0usize..5,
        condition in surface_condition_strategy(),
    ) {
        let mut chart = DentalChart::new();
        for step in history {
            apply_step(&mut chart, step);
        }
        let code = cell(&chart, tooth, index);
        let record = chart.state().get(&tooth).unwrap();
        prop_assume!(record.surface(code).unwrap().is_sound());

        let before = chart.snapshot();
        let key = condition.key();
        chart.apply(&tooth.to_string(), Some(code.as_str()), key).unwrap();
        chart.apply(&tooth.to_string(), Some(code.as_str()), key).unwrap();
        prop_assert_eq!(chart.snapshot(), before);
    }

    #[test]
    fn missing_resets_every_surface_and_counts_only_as_missing(
        history in prop::collection::vec(step_strategy(), 0..30),
        tooth in tooth_strategy(),
    ) {
        let mut chart = DentalChart::new();
        for step in history {
            apply_step(&mut chart, step);
        }
        chart.apply(&tooth.to_string(), None, "missing").unwrap();
        chart.apply(&tooth.to_string(), None, "missing").unwrap();

        let record = chart.state().get(&tooth).unwrap();
        prop_assert!(record.is_missing());
        prop_assert!(record.surfaces.values().all(|surface| surface.is_sound() && surface.note.is_empty()));
        prop_assert_eq!(dmft::classify(record), Some(dmft::DmftClass::Missing));
        prop_assert!(chart.perio().tooth(tooth).unwrap().missing);
    }

    #[test]
    fn chart_invariants_hold_after_any_sequence(
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        let mut chart = DentalChart::new();
        for step in steps {
            apply_step(&mut chart, step);
        }
        for record in chart.state().records() {
            // At most one whole-tooth condition, and only whole-tooth kinds there.
            if let Some(whole) = record.whole_condition() {
                prop_assert!(whole.is_whole_tooth());
            }
            for surface in record.surfaces.values() {
                if let Some(condition) = surface.condition {
                    prop_assert!(!condition.is_whole_tooth());
                }
            }
            prop_assert_eq!(
                chart.perio().tooth(record.id).unwrap().missing,
                record.is_missing()
            );
        }
        prop_assert_eq!(chart.dmft(), dmft::compute(chart.state()));
    }

    #[test]
    fn undo_then_redo_is_observably_identical(
        steps in prop::collection::vec(step_strategy(), 1..25),
    ) {
        let mut chart = DentalChart::new();
        for step in steps {
            apply_step(&mut chart, step);
        }
        prop_assume!(chart.history_position().can_undo);

        let state = chart.snapshot();
        let scene = chart.scene();
        let dmft = chart.dmft();
        let perio = chart.perio_scores();
        let position = chart.history_position();

        prop_assert!(chart.undo());
        prop_assert!(chart.redo());

        prop_assert_eq!(chart.snapshot(), state);
        prop_assert_eq!(chart.scene(), scene);
        prop_assert_eq!(chart.dmft(), dmft);
        prop_assert_eq!(chart.perio_scores(), perio);
        prop_assert_eq!(chart.history_position(), position);
    }

    #[test]
    fn layout_generation_is_deterministic(primary in any::<bool>()) {
        let mode = if primary { DentitionMode::Primary } else { DentitionMode::Permanent };
        let first = ChartLayout::generate(mode);
        let second = ChartLayout::generate(mode);

        let roles = |layout: &ChartLayout| -> Vec<(ToothId, Vec<_>)> {
            layout
                .teeth
                .iter()
                .map(|tooth| {
                    (
                        tooth.id,
                        tooth.surfaces.iter().map(|cell| (cell.code, cell.role)).collect(),
                    )
                })
                .collect()
        };
        prop_assert_eq!(roles(&first), roles(&second));
        prop_assert_eq!(first.teeth.len(), mode.tooth_count());
        prop_assert_eq!(first, second);
    }
}
