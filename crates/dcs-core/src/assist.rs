//! Hooks driven by assistant services.
//!
//! A dictation service turns free speech into a [`ParsedDictation`]; the
//! engine applies its actions through the ordinary transition function, so
//! dictated charting behaves exactly like clicks. Understanding the speech is
//! the service's job, not the engine's.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dcs_model::{SurfaceCode, ToothId};

use crate::chart::DentalChart;
use crate::sync::perio::{Aspect, SITES_PER_ASPECT};
use crate::transition::{self, ApplyRequest};

/// Structured result of parsing one dictation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParsedDictation {
    pub charting_actions: Vec<ChartingAction>,
    pub perio_actions: Vec<PerioAction>,
    pub clinical_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartingAction {
    pub tooth_id: String,
    pub condition: String,
    #[serde(default)]
    pub surfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerioAction {
    pub tooth_id: String,
    /// `"b"` or `"l"`.
    pub surface: String,
    pub readings: Vec<i64>,
}

/// What a dictation did to the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictationReport {
    /// Human-readable log lines for applied actions.
    pub applied: Vec<String>,
    /// Actions that were skipped, with the reason.
    pub skipped: Vec<String>,
    /// Clinical note text to append to the visit record.
    pub clinical_note: Option<String>,
}

impl DictationReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.clinical_note.is_none()
    }
}

impl ParsedDictation {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl DentalChart {
    /// Apply every action of a parsed dictation.
    ///
    /// Condition terms are resolved by key first, then by label or keyword.
    /// Whole-tooth conditions ignore `surfaces`; surface conditions are
    /// applied once per distinct listed surface, and only when every listed
    /// surface is valid. Invalid actions are skipped and reported without
    /// affecting the others.
    pub fn apply_dictation(&mut self, dictation: &ParsedDictation) -> DictationReport {
        let mut report = DictationReport::default();

        for action in &dictation.charting_actions {
            match self.apply_charting_action(action) {
                Ok(line) => report.applied.push(line),
                Err(reason) => {
                    warn!(tooth = %action.tooth_id, condition = %action.condition, %reason, "dictated charting action skipped");
                    report.skipped.push(reason);
                }
            }
        }

        for action in &dictation.perio_actions {
            match self.apply_perio_action(action) {
                Ok(line) => report.applied.push(line),
                Err(reason) => {
                    warn!(tooth = %action.tooth_id, %reason, "dictated periodontal action skipped");
                    report.skipped.push(reason);
                }
            }
        }

        report.clinical_note = dictation
            .clinical_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string);

        debug!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "dictation applied"
        );
        report
    }

    fn apply_charting_action(&mut self, action: &ChartingAction) -> Result<String, String> {
        let tooth: ToothId = action
            .tooth_id
            .parse()
            .map_err(|_| format!("tooth {} is not on the chart", action.tooth_id))?;
        if self.state().get(&tooth).is_none() {
            return Err(format!("tooth {tooth} is not on the chart"));
        }
        let item = self
            .catalog()
            .resolve_keyword(&action.condition)
            .ok_or_else(|| format!("unknown condition {:?}", action.condition))?;
        let condition = item.condition;
        let label = item.label;

        if condition.is_whole_tooth() {
            self.apply_request(&ApplyRequest::new(tooth, None, condition))
                .map_err(|error| error.to_string())?;
            return Ok(format!("Marked {label} on tooth {tooth}."));
        }

        if action.surfaces.is_empty() {
            return Err(format!("{label} on tooth {tooth} needs at least one surface"));
        }

        // All or nothing: a bad surface leaves the chart untouched.
        let mut requests: Vec<ApplyRequest> = Vec::with_capacity(action.surfaces.len());
        for surface in &action.surfaces {
            let code: SurfaceCode = surface
                .trim()
                .parse()
                .map_err(|_| format!("malformed surface {surface:?} on tooth {tooth}"))?;
            let request = ApplyRequest::new(tooth, Some(code), condition);
            transition::validate(self.state(), self.layout(), &request)
                .map_err(|error| error.to_string())?;
            if !requests.contains(&request) {
                requests.push(request);
            }
        }

        let mut applied = Vec::with_capacity(requests.len());
        for request in &requests {
            self.apply_request(request)
                .map_err(|error| error.to_string())?;
            if let Some(code) = request.surface {
                applied.push(code.to_string());
            }
        }
        Ok(format!(
            "Marked {label} on tooth {tooth}, surfaces {}.",
            applied.join(", ")
        ))
    }

    fn apply_perio_action(&mut self, action: &PerioAction) -> Result<String, String> {
        let tooth: ToothId = action
            .tooth_id
            .parse()
            .map_err(|_| format!("tooth {} is not on the chart", action.tooth_id))?;
        let aspect: Aspect = action.surface.parse::<Aspect>().map_err(|error| error.to_string())?;
        let readings: [u8; SITES_PER_ASPECT] = action
            .readings
            .iter()
            .map(|&value| u8::try_from(value).map_err(|_| format!("reading {value} is out of range")))
            .collect::<Result<Vec<u8>, String>>()?
            .try_into()
            .map_err(|_| {
                format!(
                    "expected {SITES_PER_ASPECT} readings for tooth {tooth}, got {}",
                    action.readings.len()
                )
            })?;
        self.record_probing_depths(tooth, aspect, readings)
            .map_err(|error| error.to_string())?;
        let listed: Vec<String> = readings.iter().map(u8::to_string).collect();
        Ok(format!(
            "Logged perio for tooth {tooth} ({aspect}): {}.",
            listed.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::dmft::DmftScore;
    use dcs_model::Condition;

    #[test]
    fn parses_service_payload() {
        let dictation = ParsedDictation::from_json(
            r#"{
                "chartingActions": [{"toothId": "36", "condition": "caries", "surfaces": ["o", "m"]}],
                "perioActions": [{"toothId": "11", "surface": "b", "readings": [3, 2, 3]}],
                "clinicalNote": "Patient reports sensitivity."
            }"#,
        )
        .unwrap();
        assert_eq!(dictation.charting_actions[0].surfaces, vec!["o", "m"]);
        assert_eq!(dictation.perio_actions[0].readings, vec![3, 2, 3]);

        let empty = ParsedDictation::from_json("{}").unwrap();
        assert_eq!(empty, ParsedDictation::default());
    }

    #[test]
    fn applies_actions_through_the_chart() {
        let mut chart = DentalChart::new();
        let dictation = ParsedDictation {
            charting_actions: vec![
                ChartingAction {
                    tooth_id: "36".to_string(),
                    condition: "decay".to_string(),
                    surfaces: vec!["o".to_string(), "M".to_string()],
                },
                ChartingAction {
                    tooth_id: "46".to_string(),
                    condition: "root canal".to_string(),
                    surfaces: vec!["O".to_string()],
                },
                ChartingAction {
                    tooth_id: "99".to_string(),
                    condition: "crown".to_string(),
                    surfaces: Vec::new(),
                },
            ],
            perio_actions: vec![
                PerioAction {
                    tooth_id: "11".to_string(),
                    surface: "b".to_string(),
                    readings: vec![3, 2, 3],
                },
                PerioAction {
                    tooth_id: "12".to_string(),
                    surface: "l".to_string(),
                    readings: vec![3, 2],
                },
            ],
            clinical_note: Some("  ".to_string()),
        };

        let report = chart.apply_dictation(&dictation);
        assert_eq!(report.applied.len(), 3);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.clinical_note, None);
        assert_eq!(
            report.applied[0],
            "Marked Caries on tooth 36, surfaces O, M."
        );

        let tooth = chart.state().get(&"36".parse().unwrap()).unwrap();
        assert_eq!(
            tooth.surface(SurfaceCode::Occlusal).unwrap().condition,
            Some(Condition::Caries)
        );
        assert_eq!(
            chart.state().get(&"46".parse().unwrap()).unwrap().whole_condition(),
            Some(Condition::Rct)
        );
        let perio = chart.perio().tooth("11".parse().unwrap()).unwrap();
        assert_eq!(perio.buccal.sites[1].probing_depth, Some(2));
        assert_eq!(chart.dmft().decayed, 1);
        assert_eq!(chart.dmft().filled, 1);
    }

    #[test]
    fn action_with_a_bad_surface_charts_nothing() {
        let mut chart = DentalChart::new();
        let dictation = ParsedDictation {
            charting_actions: vec![
                ChartingAction {
                    tooth_id: "16".to_string(),
                    condition: "caries".to_string(),
                    surfaces: vec!["O".to_string(), "X".to_string()],
                },
                ChartingAction {
                    tooth_id: "11".to_string(),
                    condition: "caries".to_string(),
                    surfaces: vec!["M".to_string(), "O".to_string()],
                },
            ],
            ..ParsedDictation::default()
        };
        let before = chart.snapshot();

        let report = chart.apply_dictation(&dictation);
        assert!(report.applied.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].contains("\"X\""), "{}", report.skipped[0]);
        assert_eq!(chart.snapshot(), before);
        assert_eq!(chart.dmft(), DmftScore::default());
        assert_eq!(chart.history_position().len, 1);
    }

    #[test]
    fn repeated_surfaces_are_charted_once() {
        let mut chart = DentalChart::new();
        let dictation = ParsedDictation {
            charting_actions: vec![ChartingAction {
                tooth_id: "36".to_string(),
                condition: "amalgam".to_string(),
                surfaces: vec!["O".to_string(), "o".to_string(), "D".to_string()],
            }],
            ..ParsedDictation::default()
        };

        let report = chart.apply_dictation(&dictation);
        assert_eq!(
            report.applied,
            vec!["Marked Amalgam on tooth 36, surfaces O, D."]
        );
        let tooth = chart.state().get(&"36".parse().unwrap()).unwrap();
        assert_eq!(
            tooth.surface(SurfaceCode::Occlusal).unwrap().condition,
            Some(Condition::Amalgam)
        );
        assert_eq!(chart.history_position().len, 3);
    }
}
