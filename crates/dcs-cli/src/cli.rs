//! CLI argument definitions for the dental chart.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use dcs_core::LoadPolicy;
use dcs_model::DentitionMode;

#[derive(Parser)]
#[command(
    name = "dental-chart",
    version,
    about = "Dental Chart Studio - odontogram charting from the command line",
    long_about = "Chart dental conditions on an FDI odontogram.\n\n\
                  Charts are stored per patient as JSON records. Scripted sessions\n\
                  support undo/redo, periodontal readings and snapshots."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include clinical note text in logs.
    ///
    /// Notes are patient data and are redacted by default.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// JSON configuration file (chart and auto-save settings).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding patient records.
    #[arg(
        long = "store-dir",
        value_name = "DIR",
        default_value = ".dental-chart",
        global = true
    )]
    pub store_dir: PathBuf,

    /// How stored charts that disagree with the layout are handled.
    #[arg(long = "load-policy", value_enum, global = true)]
    pub load_policy: Option<LoadPolicyArg>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the condition catalog.
    Conditions,

    /// Print the tooth layout for a dentition.
    Layout(LayoutArgs),

    /// List stored patients.
    Patients,

    /// Show a patient's chart, DMFT and periodontal scores.
    Show(PatientArgs),

    /// Apply a condition to a tooth or surface and save.
    Apply(ApplyArgs),

    /// Read or write the note on a charted tooth or surface.
    Note(NoteArgs),

    /// Set or toggle the dentition.
    Mode(ModeArgs),

    /// Run a charting script against a patient.
    Session(SessionArgs),

    /// Apply a parsed dictation payload (JSON).
    Dictate(DictateArgs),

    /// Print the rendering scene as JSON.
    Scene(SceneArgs),

    /// Manage named chart snapshots.
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(Args)]
pub struct PatientArgs {
    /// Patient identifier (defaults to the last saved patient).
    #[arg(long = "patient", short = 'p', value_name = "ID")]
    pub patient: Option<String>,
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Dentition to lay out.
    #[arg(long = "mode", value_enum, default_value = "permanent")]
    pub mode: DentitionArg,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub patient: PatientArgs,

    /// FDI tooth number, e.g. 36.
    #[arg(value_name = "TOOTH")]
    pub tooth: String,

    /// Condition key, e.g. caries or crown.
    #[arg(value_name = "CONDITION")]
    pub condition: String,

    /// Surface code (M, D, O, I, B, L). Omit for whole-tooth conditions.
    #[arg(long = "surface", short = 's', value_name = "CODE")]
    pub surface: Option<String>,
}

#[derive(Args)]
pub struct NoteArgs {
    #[command(flatten)]
    pub patient: PatientArgs,

    /// FDI tooth number.
    #[arg(value_name = "TOOTH")]
    pub tooth: String,

    /// New note text. Prints the current note when omitted.
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Surface the note belongs to. Omit for the whole-tooth condition.
    #[arg(long = "surface", short = 's', value_name = "CODE")]
    pub surface: Option<String>,
}

#[derive(Args)]
pub struct ModeArgs {
    #[command(flatten)]
    pub patient: PatientArgs,

    /// Target dentition. Toggles when omitted.
    #[arg(value_enum, value_name = "MODE")]
    pub mode: Option<DentitionArg>,
}

#[derive(Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub patient: PatientArgs,

    /// Script file. Reads stdin when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,
}

#[derive(Args)]
pub struct DictateArgs {
    #[command(flatten)]
    pub patient: PatientArgs,

    /// Dictation payload file. Reads stdin when omitted.
    #[arg(value_name = "PAYLOAD")]
    pub payload: Option<PathBuf>,
}

#[derive(Args)]
pub struct SceneArgs {
    #[command(flatten)]
    pub patient: PatientArgs,

    /// Pretty-print the JSON.
    #[arg(long = "pretty")]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum SnapshotCommand {
    /// Freeze the current chart under a name.
    Save {
        #[command(flatten)]
        patient: PatientArgs,

        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List saved snapshots.
    List {
        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Compare a snapshot's periodontal chart with the current one.
    Compare {
        #[command(flatten)]
        patient: PatientArgs,

        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DentitionArg {
    Permanent,
    Primary,
}

impl From<DentitionArg> for DentitionMode {
    fn from(value: DentitionArg) -> Self {
        match value {
            DentitionArg::Permanent => DentitionMode::Permanent,
            DentitionArg::Primary => DentitionMode::Primary,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LoadPolicyArg {
    Repair,
    Reject,
}

impl From<LoadPolicyArg> for LoadPolicy {
    fn from(value: LoadPolicyArg) -> Self {
        match value {
            LoadPolicyArg::Repair => LoadPolicy::Repair,
            LoadPolicyArg::Reject => LoadPolicy::Reject,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
