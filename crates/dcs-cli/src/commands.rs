use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use dcs_core::{ChartLayout, ParsedDictation};
use dcs_model::{ConditionCatalog, DentitionMode, SurfaceCode, ToothId};
use dcs_persistence::{FileStore, PersistenceError, list_patients};

use dcs_cli::config::CliConfig;
use dcs_cli::logging::redact_value;
use dcs_cli::patient::{PatientSession, describe, resolve_patient_id};
use dcs_cli::session::{SessionSummary, run_script};

use crate::cli::{
    ApplyArgs, DictateArgs, LayoutArgs, ModeArgs, NoteArgs, PatientArgs, SceneArgs, SessionArgs,
    SnapshotCommand,
};
use crate::output::{
    print_catalog, print_chart, print_comparison, print_dictation_report, print_dmft,
    print_layout, print_load_report, print_outcome, print_snapshots,
};

/// Store and settings shared by every command.
pub struct Workspace {
    pub store: FileStore,
    pub config: CliConfig,
}

impl Workspace {
    fn open(&self, patient: &PatientArgs) -> Result<PatientSession> {
        let id = resolve_patient_id(&self.store, patient.patient.as_deref())?;
        let session = PatientSession::open(self.store.clone(), &id, &self.config)?;
        if let Some(report) = session.load_report() {
            print_load_report(report);
        }
        Ok(session)
    }

    fn open_existing(&self, patient: &PatientArgs) -> Result<PatientSession> {
        let id = resolve_patient_id(&self.store, patient.patient.as_deref())?;
        let session = PatientSession::open_existing(self.store.clone(), &id, &self.config)?;
        if let Some(report) = session.load_report() {
            print_load_report(report);
        }
        Ok(session)
    }
}

pub fn run_conditions() -> Result<()> {
    print_catalog(ConditionCatalog::standard());
    Ok(())
}

pub fn run_layout(args: &LayoutArgs) -> Result<()> {
    print_layout(&ChartLayout::generate(args.mode.into()));
    Ok(())
}

pub fn run_patients(workspace: &Workspace) -> Result<()> {
    let patients = list_patients(&workspace.store).map_err(describe)?;
    if patients.is_empty() {
        println!("No patients in {}.", workspace.store.root().display());
    }
    for id in patients {
        println!("{id}");
    }
    Ok(())
}

pub fn run_show(workspace: &Workspace, args: &PatientArgs) -> Result<()> {
    let session = workspace.open_existing(args)?;
    print_chart(session.patient_id(), session.chart());
    Ok(())
}

pub fn run_apply(workspace: &Workspace, args: &ApplyArgs) -> Result<()> {
    let mut session = workspace.open(&args.patient)?;
    let span = info_span!("apply", patient = %session.patient_id());
    let _guard = span.enter();

    let outcome = session
        .chart_mut()
        .apply(&args.tooth, args.surface.as_deref(), &args.condition)
        .with_context(|| format!("apply {} to tooth {}", args.condition, args.tooth))?;
    print_outcome(&outcome, session.chart().catalog());
    session.save_if_dirty()?;
    print_dmft(session.chart().dmft(), false);
    Ok(())
}

pub fn run_note(workspace: &Workspace, args: &NoteArgs) -> Result<()> {
    let mut session = workspace.open(&args.patient)?;
    let tooth: ToothId = args
        .tooth
        .parse()
        .with_context(|| format!("invalid tooth {:?}", args.tooth))?;
    let surface = args
        .surface
        .as_deref()
        .map(str::parse::<SurfaceCode>)
        .transpose()
        .context("invalid surface")?;

    let Some(text) = &args.text else {
        let request = session.chart().request_note(tooth, surface)?;
        if request.current_note.is_empty() {
            println!("(no note)");
        } else {
            println!("{}", request.current_note);
        }
        return Ok(());
    };

    session.chart_mut().write_note(tooth, surface, text)?;
    debug!(%tooth, note = redact_value(text), "note saved");
    session.save_if_dirty()?;
    println!("Note saved for tooth {tooth}.");
    Ok(())
}

pub fn run_mode(workspace: &Workspace, args: &ModeArgs) -> Result<()> {
    let mut session = workspace.open(&args.patient)?;
    let mode: DentitionMode = match args.mode {
        Some(mode) => {
            session.chart_mut().set_dentition_mode(mode.into());
            mode.into()
        }
        None => session.chart_mut().toggle_dentition(),
    };
    session.save_if_dirty()?;
    info!(patient = %session.patient_id(), %mode, "dentition set");
    println!("Dentition: {mode}");
    Ok(())
}

pub fn run_session(workspace: &Workspace, args: &SessionArgs) -> Result<SessionSummary> {
    let script = read_input(args.script.as_deref())?;
    let mut session = workspace.open(&args.patient)?;
    let span = info_span!("session", patient = %session.patient_id());
    let _guard = span.enter();
    run_script(&mut session, &script)
}

pub fn run_dictate(workspace: &Workspace, args: &DictateArgs) -> Result<bool> {
    let payload = read_input(args.payload.as_deref())?;
    let dictation = ParsedDictation::from_json(&payload).context("parse dictation payload")?;
    let mut session = workspace.open(&args.patient)?;
    let report = session.chart_mut().apply_dictation(&dictation);
    print_dictation_report(&report);
    session.save_if_dirty()?;
    Ok(report.skipped.is_empty())
}

pub fn run_scene(workspace: &Workspace, args: &SceneArgs) -> Result<()> {
    let session = workspace.open_existing(&args.patient)?;
    let scene = session.chart().scene();
    let json = if args.pretty {
        serde_json::to_string_pretty(&scene)
    } else {
        serde_json::to_string(&scene)
    }
    .context("serialize scene")?;
    println!("{json}");
    Ok(())
}

pub fn run_snapshot(workspace: &Workspace, command: &SnapshotCommand) -> Result<()> {
    match command {
        SnapshotCommand::Save { patient, name } => {
            let mut session = workspace.open_existing(patient)?;
            session.save_snapshot(name);
            session.save_if_dirty()?;
            println!("Snapshot '{name}' saved.");
        }
        SnapshotCommand::List { patient } => {
            let session = workspace.open_existing(patient)?;
            print_snapshots(session.record());
        }
        SnapshotCommand::Compare { patient, name } => {
            let session = workspace.open_existing(patient)?;
            let snapshot = session.record().snapshot(name).ok_or_else(|| {
                describe(PersistenceError::SnapshotNotFound { name: name.clone() })
            })?;
            print_comparison(name, &snapshot.compare_to(session.chart().perio()));
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("read stdin")?;
            Ok(text)
        }
    }
}
