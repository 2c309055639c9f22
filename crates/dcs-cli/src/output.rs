use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dcs_core::sync::perio::Measure;
use dcs_core::{
    ChartLayout, DentalChart, DictationReport, DmftScore, LoadReport, Outcome, PerioComparison,
    PerioScores, Transition,
};
use dcs_model::{ConditionCatalog, ConditionScope, ToothRecord};
use dcs_persistence::PatientRecord;

use dcs_cli::session::SessionSummary;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn print_catalog(catalog: &ConditionCatalog) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Scope"),
        header_cell("Color"),
        header_cell("Keywords"),
    ]);
    apply_table_style(&mut table);
    for category in catalog.categories() {
        for item in &category.items {
            table.add_row(vec![
                dim_cell(category.label),
                Cell::new(item.key).fg(Color::Blue).add_attribute(Attribute::Bold),
                Cell::new(item.label),
                scope_cell(item.scope),
                Cell::new(item.color),
                keyword_cell(item.keywords),
            ]);
        }
    }
    println!("{table}");
}

pub fn print_layout(layout: &ChartLayout) {
    println!(
        "Dentition: {} ({} teeth, {} x {})",
        layout.mode,
        layout.teeth.len(),
        layout.width,
        layout.height
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tooth"),
        header_cell("X"),
        header_cell("Y"),
        header_cell("Surfaces"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for tooth in &layout.teeth {
        let surfaces: Vec<String> = tooth.surface_codes().map(|code| code.to_string()).collect();
        table.add_row(vec![
            Cell::new(tooth.id).add_attribute(Attribute::Bold),
            Cell::new(tooth.bbox.x),
            Cell::new(tooth.bbox.y),
            Cell::new(surfaces.join(" ")),
        ]);
    }
    println!("{table}");
}

pub fn print_chart(patient_id: &str, chart: &DentalChart) {
    println!("Patient: {patient_id}");
    println!("Dentition: {}", chart.dentition_mode());

    let catalog = chart.catalog();
    let charted: Vec<&ToothRecord> = chart
        .state()
        .records()
        .filter(|record| !record.is_clear())
        .collect();
    if charted.is_empty() {
        println!("No conditions charted.");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Tooth"),
            header_cell("Whole tooth"),
            header_cell("Surfaces"),
            header_cell("Notes"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 3, CellAlignment::Right);
        for record in charted {
            let whole = record
                .whole_condition()
                .map_or_else(|| dim_cell("-"), |condition| Cell::new(catalog.label(condition)));
            let surfaces: Vec<String> = record
                .charted_surfaces()
                .map(|(code, condition)| format!("{code}: {}", catalog.label(condition)))
                .collect();
            let notes = chart
                .notes()
                .for_tooth(record.id)
                .filter(|indicator| indicator.has_note)
                .count();
            table.add_row(vec![
                Cell::new(record.id).add_attribute(Attribute::Bold),
                whole,
                Cell::new(surfaces.join(", ")),
                count_cell(notes),
            ]);
        }
        println!("{table}");
    }

    print_dmft(chart.dmft(), chart.dmft_is_manual());
    print_perio_scores(&chart.perio_scores());
    let findings = chart.findings();
    println!("Findings:");
    println!("{}", dcs_core::findings::summary(&findings));
}

pub fn print_dmft(score: DmftScore, manual: bool) {
    let source = if manual { " (manual)" } else { "" };
    println!("DMFT{source}: {score}");
}

pub fn print_perio_scores(scores: &PerioScores) {
    println!(
        "Periodontal: BOP {}%, plaque {}% over {} sites",
        scores.bop_percent, scores.plaque_percent, scores.counted_sites
    );
}

pub fn print_outcome(outcome: &Outcome, catalog: &ConditionCatalog) {
    let tooth = outcome.tooth;
    let line = match outcome.transition {
        Transition::MarkedMissing => format!("Tooth {tooth} marked missing."),
        Transition::WholeSet {
            condition,
            replaced,
        } => match replaced {
            Some(previous) => format!(
                "Tooth {tooth}: {} replaced {}.",
                catalog.label(condition),
                catalog.label(previous)
            ),
            None => format!("Tooth {tooth}: {}.", catalog.label(condition)),
        },
        Transition::WholeCleared { condition } => {
            format!("Tooth {tooth}: {} cleared.", catalog.label(condition))
        }
        Transition::SurfaceSet {
            surface,
            condition,
            replaced,
        } => match replaced {
            Some(previous) => format!(
                "Tooth {tooth} surface {surface}: {} replaced {}.",
                catalog.label(condition),
                catalog.label(previous)
            ),
            None => format!("Tooth {tooth} surface {surface}: {}.", catalog.label(condition)),
        },
        Transition::SurfaceCleared { surface, condition } => format!(
            "Tooth {tooth} surface {surface}: {} cleared.",
            catalog.label(condition)
        ),
    };
    println!("{line}");
}

pub fn print_load_report(report: &LoadReport) {
    if report.is_clean() {
        return;
    }
    eprintln!("warning: stored chart did not match the layout and was repaired");
    for (label, items) in [
        ("unknown teeth", &report.unknown_teeth),
        ("unknown surfaces", &report.unknown_surfaces),
        ("mismatched ids", &report.mismatched_ids),
        ("dropped notes", &report.dropped_notes),
        ("dropped conditions", &report.dropped_conditions),
    ] {
        if !items.is_empty() {
            eprintln!("  {label}: {}", items.join(", "));
        }
    }
}

pub fn print_session_summary(summary: &SessionSummary) {
    println!("Patient: {}", summary.patient_id);
    println!(
        "Steps: {} ({} rejected), saves: {} ({} automatic)",
        summary.steps,
        summary.rejected.len(),
        summary.saves,
        summary.auto_saves
    );
    for line in &summary.rejected {
        println!("  rejected {line}");
    }
    print_dmft(summary.dmft, false);
}

pub fn print_dictation_report(report: &DictationReport) {
    for line in &report.applied {
        println!("{line}");
    }
    for line in &report.skipped {
        eprintln!("skipped: {line}");
    }
    if let Some(note) = &report.clinical_note {
        println!("Clinical note: {note}");
    }
}

pub fn print_snapshots(record: &PatientRecord) {
    if record.snapshots.is_empty() {
        println!("No snapshots saved for {}.", record.patient_id);
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Saved"),
        header_cell("Dentition"),
        header_cell("DMFT"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for snapshot in &record.snapshots {
        let saved = snapshot.timestamp().map_or_else(
            || dim_cell(&snapshot.timestamp),
            |timestamp| Cell::new(timestamp.format("%Y-%m-%d %H:%M")),
        );
        table.add_row(vec![
            Cell::new(&snapshot.name).add_attribute(Attribute::Bold),
            saved,
            Cell::new(snapshot.chart.dentition_mode),
            Cell::new(snapshot.dmft.total()),
        ]);
    }
    println!("{table}");
}

pub fn print_comparison(name: &str, comparison: &PerioComparison) {
    if comparison.deltas.is_empty() && comparison.new_findings.is_empty() {
        println!("No periodontal changes since '{name}'.");
        return;
    }
    println!("Periodontal changes since '{name}':");
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tooth"),
        header_cell("Aspect"),
        header_cell("Site"),
        header_cell("Measure"),
        header_cell("Before"),
        header_cell("After"),
        header_cell("Change"),
    ]);
    apply_table_style(&mut table);
    for index in 2..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for delta in &comparison.deltas {
        let measure = match delta.measure {
            Measure::GingivalMargin => "GM",
            Measure::ProbingDepth => "PD",
        };
        table.add_row(vec![
            Cell::new(delta.tooth).add_attribute(Attribute::Bold),
            Cell::new(delta.aspect),
            Cell::new(delta.site),
            Cell::new(measure),
            reading_cell(delta.before),
            reading_cell(delta.after),
            change_cell(delta.delta),
        ]);
    }
    println!("{table}");
    for finding in &comparison.new_findings {
        println!(
            "  new {:?} at tooth {} ({}) site {}",
            finding.kind, finding.tooth, finding.aspect, finding.site
        );
    }
}

fn scope_cell(scope: ConditionScope) -> Cell {
    match scope {
        ConditionScope::Whole => Cell::new(scope).fg(Color::Magenta),
        ConditionScope::Surface => Cell::new(scope),
    }
}

fn keyword_cell(keywords: &[&str]) -> Cell {
    if keywords.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(keywords.join(", "))
    }
}

fn reading_cell(value: Option<u8>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn change_cell(delta: i16) -> Cell {
    if delta > 0 {
        Cell::new(format!("+{delta}"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(delta).fg(Color::Green)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        dim_cell(count)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
