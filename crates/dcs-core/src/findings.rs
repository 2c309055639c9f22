//! Clinical findings: active pathology on the chart, as fed to treatment
//! planning and procedure suggestion prompts.

use std::fmt;

use serde::Serialize;

use dcs_model::{ChartState, Condition, ConditionCatalog, SurfaceCode, ToothId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalFinding {
    pub tooth: ToothId,
    pub surface: Option<SurfaceCode>,
    pub condition: Condition,
    pub label: &'static str,
}

impl fmt::Display for ClinicalFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on tooth #{}", self.label, self.tooth)?;
        if let Some(surface) = self.surface {
            write!(f, ", surface {surface}")?;
        }
        Ok(())
    }
}

/// Collect findings in tooth order.
///
/// Whole-tooth conditions count except `missing` and `implant`; surface
/// conditions count unless they are restorations.
pub fn collect(state: &ChartState, catalog: &ConditionCatalog) -> Vec<ClinicalFinding> {
    let mut findings = Vec::new();
    for record in state.records() {
        if let Some(condition) = record.whole_condition()
            && !matches!(condition, Condition::Missing | Condition::Implant)
        {
            findings.push(ClinicalFinding {
                tooth: record.id,
                surface: None,
                condition,
                label: catalog.label(condition),
            });
        }
        for (surface, condition) in record.charted_surfaces() {
            if condition.is_restorative() {
                continue;
            }
            findings.push(ClinicalFinding {
                tooth: record.id,
                surface: Some(surface),
                condition,
                label: catalog.label(condition),
            });
        }
    }
    findings
}

/// Findings as a bullet list, or a fallback line when there are none.
pub fn summary(findings: &[ClinicalFinding]) -> String {
    if findings.is_empty() {
        return "No specific findings charted.".to_string();
    }
    findings
        .iter()
        .map(|finding| format!("- {finding}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcs_model::{DentitionMode, WholeToothState};

    #[test]
    fn restorations_and_missing_teeth_are_not_findings() {
        let mut state = ChartState::new(DentitionMode::Permanent);
        state.initialize([
            ("16".parse().unwrap(), vec![SurfaceCode::Occlusal, SurfaceCode::Mesial]),
            ("26".parse().unwrap(), vec![SurfaceCode::Occlusal]),
            ("36".parse().unwrap(), vec![SurfaceCode::Occlusal]),
        ]);
        let tooth = state.get_mut(&"16".parse().unwrap()).unwrap();
        tooth.surface_mut(SurfaceCode::Occlusal).unwrap().condition = Some(Condition::Caries);
        tooth.surface_mut(SurfaceCode::Mesial).unwrap().condition = Some(Condition::Amalgam);
        state.get_mut(&"26".parse().unwrap()).unwrap().whole_tooth_state =
            Some(WholeToothState::new(Condition::Missing));
        state.get_mut(&"36".parse().unwrap()).unwrap().whole_tooth_state =
            Some(WholeToothState::new(Condition::Fracture));

        let findings = collect(&state, ConditionCatalog::standard());
        let lines: Vec<String> = findings.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec!["Caries on tooth #16, surface O", "Fracture on tooth #36"]
        );
        assert_eq!(
            summary(&findings),
            "- Caries on tooth #16, surface O\n- Fracture on tooth #36"
        );
        assert_eq!(summary(&[]), "No specific findings charted.");
    }
}
