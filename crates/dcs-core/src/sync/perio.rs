//! Periodontal chart.
//!
//! ## Structure
//!
//! One [`PerioTooth`] per tooth of the current dentition, in layout order.
//! Each tooth has a buccal and a lingual/palatal [`PerioAspect`] of three
//! sites. A site holds gingival margin and probing depth readings (0-20 mm)
//! plus bleeding-on-probing and plaque flags.
//!
//! ## Missing teeth
//!
//! Teeth charted `missing` are flagged here. Flagged teeth keep their
//! readings but are left out of the BOP and plaque scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use dcs_model::{ChartState, DentitionMode, ToothId};

use crate::layout::ChartLayout;

/// Largest accepted millimetre reading.
pub const MAX_READING: u8 = 20;

/// Probing sites per aspect (distal, middle, mesial as charted).
pub const SITES_PER_ASPECT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerioError {
    #[error("tooth {0} is not on the periodontal chart")]
    UnknownTooth(ToothId),

    #[error("reading {value} is out of range (0-{max})", max = MAX_READING)]
    ReadingOutOfRange { value: u8 },

    #[error("site index {0} is out of range (1-{max})", max = SITES_PER_ASPECT)]
    SiteOutOfRange(usize),

    #[error("unknown periodontal aspect {0:?} (expected \"b\" or \"l\")")]
    InvalidAspect(String),
}

pub type Result<T> = std::result::Result<T, PerioError>;

/// Which side of the tooth a site row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aspect {
    #[serde(rename = "b")]
    Buccal,
    /// Lingual on the lower arch, palatal on the upper arch.
    #[serde(rename = "l")]
    Lingual,
}

impl Aspect {
    pub const ALL: [Aspect; 2] = [Aspect::Buccal, Aspect::Lingual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aspect::Buccal => "b",
            Aspect::Lingual => "l",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = PerioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" | "buccal" | "facial" => Ok(Aspect::Buccal),
            "l" | "lingual" | "p" | "palatal" => Ok(Aspect::Lingual),
            _ => Err(PerioError::InvalidAspect(s.to_string())),
        }
    }
}

/// Probing depth classification for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthClass {
    Healthy,
    DeepPocket,
}

/// One probing site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerioSite {
    #[serde(default)]
    pub gingival_margin: Option<u8>,
    #[serde(default)]
    pub probing_depth: Option<u8>,
    #[serde(default)]
    pub bleeding: bool,
    #[serde(default)]
    pub plaque: bool,
}

impl PerioSite {
    /// Clinical attachment level: probing depth plus gingival margin, shown
    /// only when either reading is present.
    pub fn attachment_level(&self) -> Option<u8> {
        if self.gingival_margin.is_none() && self.probing_depth.is_none() {
            return None;
        }
        Some(self.probing_depth.unwrap_or(0) + self.gingival_margin.unwrap_or(0))
    }

    pub fn depth_class(&self) -> Option<DepthClass> {
        match self.probing_depth? {
            0 => None,
            1..=3 => Some(DepthClass::Healthy),
            _ => Some(DepthClass::DeepPocket),
        }
    }

    pub fn has_recession(&self) -> bool {
        self.gingival_margin.is_some_and(|margin| margin > 0)
    }

    pub fn set_probing_depth(&mut self, value: Option<u8>) -> Result<()> {
        self.probing_depth = check_reading(value)?;
        Ok(())
    }

    pub fn set_gingival_margin(&mut self, value: Option<u8>) -> Result<()> {
        self.gingival_margin = check_reading(value)?;
        Ok(())
    }
}

fn check_reading(value: Option<u8>) -> Result<Option<u8>> {
    match value {
        Some(value) if value > MAX_READING => Err(PerioError::ReadingOutOfRange { value }),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerioAspect {
    #[serde(default)]
    pub sites: [PerioSite; SITES_PER_ASPECT],
    #[serde(default)]
    pub furcation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerioTooth {
    pub id: ToothId,
    #[serde(default)]
    pub buccal: PerioAspect,
    #[serde(default)]
    pub lingual: PerioAspect,
    #[serde(default)]
    pub mobility: String,
    #[serde(default)]
    pub implant: String,
    #[serde(default)]
    pub missing: bool,
}

impl PerioTooth {
    pub fn new(id: ToothId) -> Self {
        Self {
            id,
            buccal: PerioAspect::default(),
            lingual: PerioAspect::default(),
            mobility: String::new(),
            implant: String::new(),
            missing: false,
        }
    }

    pub fn aspect(&self, aspect: Aspect) -> &PerioAspect {
        match aspect {
            Aspect::Buccal => &self.buccal,
            Aspect::Lingual => &self.lingual,
        }
    }

    pub fn aspect_mut(&mut self, aspect: Aspect) -> &mut PerioAspect {
        match aspect {
            Aspect::Buccal => &mut self.buccal,
            Aspect::Lingual => &mut self.lingual,
        }
    }

    /// Every site with its aspect and zero-based index.
    pub fn sites(&self) -> impl Iterator<Item = (Aspect, usize, &PerioSite)> {
        Aspect::ALL.into_iter().flat_map(move |aspect| {
            self.aspect(aspect)
                .sites
                .iter()
                .enumerate()
                .map(move |(index, site)| (aspect, index, site))
        })
    }
}

/// BOP and plaque index percentages over non-missing teeth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerioScores {
    pub counted_sites: usize,
    pub bleeding_sites: usize,
    pub plaque_sites: usize,
    pub bop_percent: u8,
    pub plaque_percent: u8,
}

fn percent(positive: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (positive as f64 / total as f64 * 100.0).round();
    rounded.clamp(0.0, 100.0) as u8
}

/// A numeric reading that differs between two charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDelta {
    pub tooth: ToothId,
    pub aspect: Aspect,
    /// One-based site number.
    pub site: usize,
    pub measure: Measure,
    pub before: Option<u8>,
    pub after: Option<u8>,
    /// Positive means the reading grew (worse).
    pub delta: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    GingivalMargin,
    ProbingDepth,
}

/// A bleeding or plaque flag that became present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinding {
    pub tooth: ToothId,
    pub aspect: Aspect,
    pub site: usize,
    pub kind: FindingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    Bleeding,
    Plaque,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerioComparison {
    pub deltas: Vec<ReadingDelta>,
    pub new_findings: Vec<NewFinding>,
}

impl PerioComparison {
    pub fn worsened(&self) -> impl Iterator<Item = &ReadingDelta> {
        self.deltas.iter().filter(|delta| delta.delta > 0)
    }

    pub fn improved(&self) -> impl Iterator<Item = &ReadingDelta> {
        self.deltas.iter().filter(|delta| delta.delta < 0)
    }
}

/// The periodontal chart for one dentition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerioChart {
    #[serde(default)]
    pub dentition_mode: DentitionMode,
    #[serde(default)]
    pub teeth: Vec<PerioTooth>,
}

impl PerioChart {
    /// An empty chart with one tooth per layout position.
    pub fn for_layout(layout: &ChartLayout) -> Self {
        Self {
            dentition_mode: layout.mode,
            teeth: layout.tooth_ids().map(PerioTooth::new).collect(),
        }
    }

    pub fn for_mode(mode: DentitionMode) -> Self {
        Self::for_layout(&ChartLayout::generate(mode))
    }

    /// Rebuild against `layout`, carrying over readings for teeth that
    /// exist in both.
    pub fn reconciled(mut self, layout: &ChartLayout) -> Self {
        let teeth = layout
            .tooth_ids()
            .map(|id| match self.teeth.iter().position(|tooth| tooth.id == id) {
                Some(index) => self.teeth.swap_remove(index),
                None => PerioTooth::new(id),
            })
            .collect();
        Self {
            dentition_mode: layout.mode,
            teeth,
        }
    }

    pub fn tooth(&self, id: ToothId) -> Result<&PerioTooth> {
        self.teeth
            .iter()
            .find(|tooth| tooth.id == id)
            .ok_or(PerioError::UnknownTooth(id))
    }

    pub fn tooth_mut(&mut self, id: ToothId) -> Result<&mut PerioTooth> {
        self.teeth
            .iter_mut()
            .find(|tooth| tooth.id == id)
            .ok_or(PerioError::UnknownTooth(id))
    }

    /// Mutable access to one site by one-based number.
    pub fn site_mut(&mut self, id: ToothId, aspect: Aspect, site: usize) -> Result<&mut PerioSite> {
        let index = site_index(site)?;
        let tooth = self.tooth_mut(id)?;
        Ok(&mut tooth.aspect_mut(aspect).sites[index])
    }

    pub fn set_missing(&mut self, id: ToothId, missing: bool) -> Result<()> {
        let tooth = self.tooth_mut(id)?;
        if tooth.missing != missing {
            debug!(tooth = %id, missing, "periodontal missing flag changed");
        }
        tooth.missing = missing;
        Ok(())
    }

    /// Align every missing flag with the chart.
    pub fn sync_missing(&mut self, state: &ChartState) {
        for tooth in &mut self.teeth {
            tooth.missing = state.get(&tooth.id).is_some_and(|record| record.is_missing());
        }
    }

    pub fn missing_teeth(&self) -> impl Iterator<Item = ToothId> + '_ {
        self.teeth
            .iter()
            .filter(|tooth| tooth.missing)
            .map(|tooth| tooth.id)
    }

    /// Store three probing depths for one aspect.
    ///
    /// All readings are validated before any is written.
    pub fn record_probing_depths(
        &mut self,
        id: ToothId,
        aspect: Aspect,
        readings: [u8; SITES_PER_ASPECT],
    ) -> Result<()> {
        if let Some(&value) = readings.iter().find(|&&value| value > MAX_READING) {
            return Err(PerioError::ReadingOutOfRange { value });
        }
        let tooth = self.tooth_mut(id)?;
        for (site, reading) in tooth.aspect_mut(aspect).sites.iter_mut().zip(readings) {
            site.probing_depth = Some(reading);
        }
        debug!(tooth = %id, %aspect, ?readings, "probing depths recorded");
        Ok(())
    }

    pub fn scores(&self) -> PerioScores {
        let mut scores = PerioScores::default();
        for tooth in self.teeth.iter().filter(|tooth| !tooth.missing) {
            for (_, _, site) in tooth.sites() {
                scores.counted_sites += 1;
                scores.bleeding_sites += usize::from(site.bleeding);
                scores.plaque_sites += usize::from(site.plaque);
            }
        }
        scores.bop_percent = percent(scores.bleeding_sites, scores.counted_sites);
        scores.plaque_percent = percent(scores.plaque_sites, scores.counted_sites);
        scores
    }

    /// Compare an earlier chart against this one.
    ///
    /// Sites are matched by tooth, aspect and site number; teeth absent from
    /// `earlier` compare against empty readings.
    pub fn compare_with(&self, earlier: &PerioChart) -> PerioComparison {
        let mut comparison = PerioComparison::default();
        for tooth in &self.teeth {
            let before_tooth = earlier.teeth.iter().find(|t| t.id == tooth.id);
            for (aspect, index, after) in tooth.sites() {
                let before = before_tooth
                    .map(|t| t.aspect(aspect).sites[index])
                    .unwrap_or_default();
                let site = index + 1;

                for (measure, old, new) in [
                    (
                        Measure::GingivalMargin,
                        before.gingival_margin,
                        after.gingival_margin,
                    ),
                    (Measure::ProbingDepth, before.probing_depth, after.probing_depth),
                ] {
                    let delta = i16::from(new.unwrap_or(0)) - i16::from(old.unwrap_or(0));
                    if delta != 0 {
                        comparison.deltas.push(ReadingDelta {
                            tooth: tooth.id,
                            aspect,
                            site,
                            measure,
                            before: old,
                            after: new,
                            delta,
                        });
                    }
                }

                for (kind, old, new) in [
                    (FindingKind::Bleeding, before.bleeding, after.bleeding),
                    (FindingKind::Plaque, before.plaque, after.plaque),
                ] {
                    if new && !old {
                        comparison.new_findings.push(NewFinding {
                            tooth: tooth.id,
                            aspect,
                            site,
                            kind,
                        });
                    }
                }
            }
        }
        comparison
    }
}

fn site_index(site: usize) -> Result<usize> {
    if (1..=SITES_PER_ASPECT).contains(&site) {
        Ok(site - 1)
    } else {
        Err(PerioError::SiteOutOfRange(site))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ToothId {
        value.parse().unwrap()
    }

    #[test]
    fn chart_follows_layout_order() {
        let chart = PerioChart::for_mode(DentitionMode::Primary);
        assert_eq!(chart.teeth.len(), 20);
        assert_eq!(chart.teeth[0].id, id("55"));
        assert_eq!(chart.teeth[10].id, id("85"));
    }

    #[test]
    fn attachment_level_needs_a_reading() {
        let mut site = PerioSite::default();
        assert_eq!(site.attachment_level(), None);
        site.gingival_margin = Some(2);
        assert_eq!(site.attachment_level(), Some(2));
        site.probing_depth = Some(5);
        assert_eq!(site.attachment_level(), Some(7));
        assert_eq!(site.depth_class(), Some(DepthClass::DeepPocket));
        assert!(site.has_recession());
        site.probing_depth = Some(3);
        assert_eq!(site.depth_class(), Some(DepthClass::Healthy));
        assert!(site.set_probing_depth(Some(21)).is_err());
    }

    #[test]
    fn scores_exclude_missing_teeth() {
        let mut chart = PerioChart::for_mode(DentitionMode::Permanent);
        chart.site_mut(id("16"), Aspect::Buccal, 1).unwrap().bleeding = true;
        chart.site_mut(id("17"), Aspect::Lingual, 2).unwrap().plaque = true;

        let scores = chart.scores();
        assert_eq!(scores.counted_sites, 32 * 6);
        assert_eq!(scores.bleeding_sites, 1);
        assert_eq!(scores.bop_percent, 1);

        chart.set_missing(id("16"), true).unwrap();
        let scores = chart.scores();
        assert_eq!(scores.counted_sites, 31 * 6);
        assert_eq!(scores.bleeding_sites, 0);
        assert_eq!(scores.plaque_sites, 1);
        assert!(
            chart
                .tooth(id("16"))
                .unwrap()
                .buccal
                .sites[0]
                .bleeding
        );
    }

    #[test]
    fn empty_chart_scores_zero() {
        let chart = PerioChart {
            dentition_mode: DentitionMode::Permanent,
            teeth: Vec::new(),
        };
        assert_eq!(chart.scores().bop_percent, 0);
    }

    #[test]
    fn probing_depths_are_validated_first() {
        let mut chart = PerioChart::for_mode(DentitionMode::Permanent);
        assert_eq!(
            chart.record_probing_depths(id("11"), Aspect::Buccal, [3, 25, 3]),
            Err(PerioError::ReadingOutOfRange { value: 25 })
        );
        assert_eq!(chart.tooth(id("11")).unwrap().buccal.sites[0].probing_depth, None);

        chart
            .record_probing_depths(id("11"), Aspect::Buccal, [3, 2, 3])
            .unwrap();
        let depths: Vec<_> = chart.tooth(id("11")).unwrap().buccal.sites
            .iter()
            .map(|site| site.probing_depth)
            .collect();
        assert_eq!(depths, vec![Some(3), Some(2), Some(3)]);
        assert_eq!(
            chart.record_probing_depths(id("55"), Aspect::Buccal, [1, 1, 1]),
            Err(PerioError::UnknownTooth(id("55")))
        );
    }

    #[test]
    fn comparison_reports_signed_deltas_and_new_flags() {
        let mut earlier = PerioChart::for_mode(DentitionMode::Permanent);
        earlier
            .record_probing_depths(id("26"), Aspect::Buccal, [3, 3, 3])
            .unwrap();
        earlier.site_mut(id("26"), Aspect::Buccal, 1).unwrap().bleeding = true;

        let mut later = earlier.clone();
        later
            .record_probing_depths(id("26"), Aspect::Buccal, [5, 3, 2])
            .unwrap();
        later.site_mut(id("26"), Aspect::Buccal, 2).unwrap().bleeding = true;
        later.site_mut(id("26"), Aspect::Buccal, 1).unwrap().bleeding = false;

        let comparison = later.compare_with(&earlier);
        let deltas: Vec<(usize, i16)> = comparison.deltas.iter().map(|d| (d.site, d.delta)).collect();
        assert_eq!(deltas, vec![(1, 2), (3, -1)]);
        assert_eq!(comparison.worsened().count(), 1);
        assert_eq!(comparison.improved().count(), 1);
        assert_eq!(
            comparison.new_findings,
            vec![NewFinding {
                tooth: id("26"),
                aspect: Aspect::Buccal,
                site: 2,
                kind: FindingKind::Bleeding,
            }]
        );
    }

    #[test]
    fn reconcile_keeps_matching_teeth() {
        let mut chart = PerioChart::for_mode(DentitionMode::Permanent);
        chart.tooth_mut(id("11")).unwrap().mobility = "I".to_string();
        let layout = ChartLayout::generate(DentitionMode::Permanent);
        let reconciled = chart.clone().reconciled(&layout);
        assert_eq!(reconciled, chart);

        let primary = chart.reconciled(&ChartLayout::generate(DentitionMode::Primary));
        assert_eq!(primary.dentition_mode, DentitionMode::Primary);
        assert!(primary.teeth.iter().all(|tooth| tooth.mobility.is_empty()));
    }

    #[test]
    fn aspect_parses_loose_names() {
        assert_eq!("B".parse::<Aspect>().unwrap(), Aspect::Buccal);
        assert_eq!("palatal".parse::<Aspect>().unwrap(), Aspect::Lingual);
        assert!("x".parse::<Aspect>().is_err());
    }
}
