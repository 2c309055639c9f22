//! Scripted charting sessions.
//!
//! One command per line; blank lines and `#` comments are ignored.
//!
//! ```text
//! apply 36 O caries        # surface condition
//! apply 11 - crown         # whole-tooth condition
//! note 36 O deep lesion, monitor
//! undo
//! redo
//! mode primary             # primary | permanent | toggle
//! perio 16 b 3 2 4
//! snapshot Initial exam
//! save
//! ```
//!
//! Chart requests that fail their preconditions are reported and skipped,
//! like a rejected click. Malformed lines stop the script.

use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use tracing::{debug, warn};

use dcs_core::DmftScore;
use dcs_core::sync::perio::{Aspect, SITES_PER_ASPECT};
use dcs_model::{DentitionMode, SurfaceCode, ToothId};

use crate::logging::redact_value;
use crate::patient::PatientSession;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Apply {
        tooth: String,
        surface: Option<String>,
        condition: String,
    },
    Note {
        tooth: String,
        surface: Option<String>,
        text: String,
    },
    Undo,
    Redo,
    Mode(ModeChange),
    Perio {
        tooth: String,
        aspect: String,
        readings: [u8; SITES_PER_ASPECT],
    },
    Snapshot(String),
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    Set(DentitionMode),
    Toggle,
}

/// What a script run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub patient_id: String,
    pub steps: usize,
    /// `line N: reason` for every skipped step.
    pub rejected: Vec<String>,
    pub auto_saves: usize,
    pub saves: usize,
    pub dmft: DmftScore,
}

enum StepResult {
    Done,
    Rejected(String),
}

/// Parse one line. Returns `None` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Step>> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = split_word(line);
    let step = match command.to_ascii_lowercase().as_str() {
        "apply" => {
            let (tooth, rest) = split_word(rest);
            let (surface, rest) = split_word(rest);
            let (condition, extra) = split_word(rest);
            if condition.is_empty() || !extra.is_empty() {
                bail!("expected `apply <tooth> <surface|-> <condition>`");
            }
            Step::Apply {
                tooth: tooth.to_string(),
                surface: optional_surface(surface),
                condition: condition.to_string(),
            }
        }
        "note" => {
            let (tooth, rest) = split_word(rest);
            let (surface, text) = split_word(rest);
            if surface.is_empty() {
                bail!("expected `note <tooth> <surface|-> <text>`");
            }
            Step::Note {
                tooth: tooth.to_string(),
                surface: optional_surface(surface),
                text: text.to_string(),
            }
        }
        "undo" => no_arguments(rest, Step::Undo)?,
        "redo" => no_arguments(rest, Step::Redo)?,
        "save" => no_arguments(rest, Step::Save)?,
        "mode" => {
            let change = match rest.to_ascii_lowercase().as_str() {
                "" | "toggle" => ModeChange::Toggle,
                "primary" => ModeChange::Set(DentitionMode::Primary),
                "permanent" => ModeChange::Set(DentitionMode::Permanent),
                other => bail!("unknown dentition {other:?}"),
            };
            Step::Mode(change)
        }
        "perio" => {
            let (tooth, rest) = split_word(rest);
            let (aspect, rest) = split_word(rest);
            let values = rest
                .split_whitespace()
                .map(|value| {
                    value
                        .parse::<u8>()
                        .with_context(|| format!("invalid reading {value:?}"))
                })
                .collect::<Result<Vec<u8>>>()?;
            let readings: [u8; SITES_PER_ASPECT] = values
                .try_into()
                .map_err(|_| anyhow!("expected {SITES_PER_ASPECT} probing depths"))?;
            if aspect.is_empty() {
                bail!("expected `perio <tooth> <b|l> <d1> <d2> <d3>`");
            }
            Step::Perio {
                tooth: tooth.to_string(),
                aspect: aspect.to_string(),
                readings,
            }
        }
        "snapshot" => {
            if rest.is_empty() {
                bail!("expected `snapshot <name>`");
            }
            Step::Snapshot(rest.to_string())
        }
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(step))
}

/// Run a script against an open patient. The record is saved at the end if
/// anything changed.
pub fn run_script(session: &mut PatientSession, script: &str) -> Result<SessionSummary> {
    let mut summary = SessionSummary {
        patient_id: session.patient_id().to_string(),
        ..SessionSummary::default()
    };

    for (index, line) in script.lines().enumerate() {
        let number = index + 1;
        let Some(step) = parse_line(line).with_context(|| format!("line {number}"))? else {
            continue;
        };
        summary.steps += 1;
        match execute(session, &step).with_context(|| format!("line {number}"))? {
            StepResult::Done => {}
            StepResult::Rejected(reason) => {
                warn!(line = number, %reason, "script step rejected");
                summary.rejected.push(format!("line {number}: {reason}"));
            }
        }
        if session.tick(Instant::now())? {
            summary.auto_saves += 1;
        }
    }

    session.save_if_dirty()?;
    summary.saves = session.saves();
    summary.dmft = session.chart().dmft();
    Ok(summary)
}

fn execute(session: &mut PatientSession, step: &Step) -> Result<StepResult> {
    let result = match step {
        Step::Apply {
            tooth,
            surface,
            condition,
        } => match session
            .chart_mut()
            .apply(tooth, surface.as_deref(), condition)
        {
            Ok(_) => StepResult::Done,
            Err(error) => StepResult::Rejected(error.to_string()),
        },
        Step::Note {
            tooth,
            surface,
            text,
        } => {
            let target = match parse_target(tooth, surface.as_deref()) {
                Ok(target) => target,
                Err(reason) => return Ok(StepResult::Rejected(reason)),
            };
            debug!(%tooth, note = redact_value(text), "writing note");
            match session.chart_mut().write_note(target.0, target.1, text) {
                Ok(()) => StepResult::Done,
                Err(error) => StepResult::Rejected(error.to_string()),
            }
        }
        Step::Undo => {
            if !session.chart_mut().undo() {
                debug!("nothing to undo");
            }
            StepResult::Done
        }
        Step::Redo => {
            if !session.chart_mut().redo() {
                debug!("nothing to redo");
            }
            StepResult::Done
        }
        Step::Mode(ModeChange::Toggle) => {
            session.chart_mut().toggle_dentition();
            StepResult::Done
        }
        Step::Mode(ModeChange::Set(mode)) => {
            session.chart_mut().set_dentition_mode(*mode);
            StepResult::Done
        }
        Step::Perio {
            tooth,
            aspect,
            readings,
        } => {
            let Ok(id) = tooth.parse::<ToothId>() else {
                return Ok(StepResult::Rejected(format!("invalid tooth {tooth:?}")));
            };
            let aspect: Aspect = match aspect.parse() {
                Ok(aspect) => aspect,
                Err(error) => return Ok(StepResult::Rejected(error.to_string())),
            };
            match session
                .chart_mut()
                .record_probing_depths(id, aspect, *readings)
            {
                Ok(()) => StepResult::Done,
                Err(error) => StepResult::Rejected(error.to_string()),
            }
        }
        Step::Snapshot(name) => {
            session.save_snapshot(name);
            StepResult::Done
        }
        Step::Save => {
            session.save()?;
            StepResult::Done
        }
    };
    Ok(result)
}

fn parse_target(
    tooth: &str,
    surface: Option<&str>,
) -> std::result::Result<(ToothId, Option<SurfaceCode>), String> {
    let id = tooth
        .parse::<ToothId>()
        .map_err(|_| format!("invalid tooth {tooth:?}"))?;
    let code = surface
        .map(str::parse::<SurfaceCode>)
        .transpose()
        .map_err(|error| error.to_string())?;
    Ok((id, code))
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(head, _)| head)
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn optional_surface(value: &str) -> Option<String> {
    match value {
        "" | "-" => None,
        code => Some(code.to_string()),
    }
}

fn no_arguments(rest: &str, step: Step) -> Result<Step> {
    if rest.is_empty() {
        Ok(step)
    } else {
        Err(anyhow!("unexpected arguments {rest:?}"))
    }
}
