//! Clinical condition kinds and their whole-tooth overlay markers.
//!
//! Every charted condition is a variant of [`Condition`]. Whole-tooth kinds
//! resolve their overlay marker through a single exhaustive match in
//! [`Condition::overlay`]; the marker carries the parameters needed to build
//! its shape against a tooth bounding box.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::ConditionScope;
use crate::error::ModelError;

/// A condition that can be recorded on a tooth or surface.
///
/// Serialized with its catalog key (`"root-fragment"`, `"rct"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Caries,
    Fracture,
    RootFragment,
    Amalgam,
    Composite,
    GlassIonomer,
    Gold,
    Crown,
    Sealant,
    Missing,
    ToBeExtracted,
    Impacted,
    Unerupted,
    PartiallyErupted,
    Rct,
    Implant,
    BridgePontic,
}

impl Condition {
    pub const ALL: [Condition; 17] = [
        Condition::Caries,
        Condition::Fracture,
        Condition::RootFragment,
        Condition::Amalgam,
        Condition::Composite,
        Condition::GlassIonomer,
        Condition::Gold,
        Condition::Crown,
        Condition::Sealant,
        Condition::Missing,
        Condition::ToBeExtracted,
        Condition::Impacted,
        Condition::Unerupted,
        Condition::PartiallyErupted,
        Condition::Rct,
        Condition::Implant,
        Condition::BridgePontic,
    ];

    /// Catalog key, also the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            Condition::Caries => "caries",
            Condition::Fracture => "fracture",
            Condition::RootFragment => "root-fragment",
            Condition::Amalgam => "amalgam",
            Condition::Composite => "composite",
            Condition::GlassIonomer => "glass-ionomer",
            Condition::Gold => "gold",
            Condition::Crown => "crown",
            Condition::Sealant => "sealant",
            Condition::Missing => "missing",
            Condition::ToBeExtracted => "to-be-extracted",
            Condition::Impacted => "impacted",
            Condition::Unerupted => "unerupted",
            Condition::PartiallyErupted => "partially-erupted",
            Condition::Rct => "rct",
            Condition::Implant => "implant",
            Condition::BridgePontic => "bridge-pontic",
        }
    }

    pub fn scope(&self) -> ConditionScope {
        match self {
            Condition::Caries
            | Condition::Amalgam
            | Condition::Composite
            | Condition::GlassIonomer
            | Condition::Gold
            | Condition::Sealant => ConditionScope::Surface,
            Condition::Fracture
            | Condition::RootFragment
            | Condition::Crown
            | Condition::Missing
            | Condition::ToBeExtracted
            | Condition::Impacted
            | Condition::Unerupted
            | Condition::PartiallyErupted
            | Condition::Rct
            | Condition::Implant
            | Condition::BridgePontic => ConditionScope::Whole,
        }
    }

    pub fn is_whole_tooth(&self) -> bool {
        self.scope() == ConditionScope::Whole
    }

    /// Direct restorative materials placed on a surface.
    pub fn is_restorative(&self) -> bool {
        matches!(
            self,
            Condition::Amalgam
                | Condition::Composite
                | Condition::GlassIonomer
                | Condition::Gold
                | Condition::Sealant
        )
    }

    /// Overlay drawn over the tooth while this whole-tooth condition is active.
    ///
    /// Surface conditions, crowns and implants render as fill classes only.
    pub fn overlay(&self) -> Option<OverlaySpec> {
        let (marker, class_name) = match self {
            Condition::Rct => (OverlayMarker::VerticalLine, "rct-line"),
            Condition::Missing => (OverlayMarker::DiagonalCross, "missing-cross"),
            Condition::ToBeExtracted => (
                OverlayMarker::VerticalBars {
                    offsets: [0.3, 0.7],
                },
                "tbe-lines",
            ),
            Condition::Impacted => (
                OverlayMarker::Circle { radius_ratio: 0.6 },
                "impacted-circle",
            ),
            Condition::Unerupted => (
                OverlayMarker::Circle { radius_ratio: 0.6 },
                "unerupted-circle",
            ),
            Condition::PartiallyErupted => (
                OverlayMarker::Circle { radius_ratio: 0.6 },
                "partially-erupted-circle",
            ),
            Condition::Fracture => (
                OverlayMarker::JaggedLine {
                    breaks: [0.3, 0.6],
                },
                "fracture-line",
            ),
            Condition::RootFragment => (OverlayMarker::DiagonalLine, "root-fragment-cross"),
            Condition::BridgePontic => (OverlayMarker::HorizontalLine, "bridge-pontic-line"),
            Condition::Crown
            | Condition::Implant
            | Condition::Caries
            | Condition::Amalgam
            | Condition::Composite
            | Condition::GlassIonomer
            | Condition::Gold
            | Condition::Sealant => return None,
        };
        Some(OverlaySpec { marker, class_name })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Condition {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Condition::ALL
            .iter()
            .copied()
            .find(|condition| condition.key() == key)
            .ok_or_else(|| ModelError::UnknownCondition(s.to_string()))
    }
}

/// Overlay shape family with its construction parameters.
///
/// Ratios are fractions of the tooth bounding box width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OverlayMarker {
    /// Vertical line through the horizontal centre, top to bottom.
    VerticalLine,
    /// Both diagonals of the bounding box.
    DiagonalCross,
    /// Two full-height vertical bars at the given width offsets.
    VerticalBars { offsets: [f64; 2] },
    /// Circle centred on the tooth.
    Circle { radius_ratio: f64 },
    /// Zig-zag from the left-centre to the right-centre, touching the top at
    /// the first break and the bottom at the second.
    JaggedLine { breaks: [f64; 2] },
    /// Single diagonal from bottom-left to top-right.
    DiagonalLine,
    /// Horizontal line through the vertical centre.
    HorizontalLine,
}

/// Overlay marker plus the render class that identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlaySpec {
    pub marker: OverlayMarker,
    pub class_name: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for condition in Condition::ALL {
            assert_eq!(condition.key().parse::<Condition>().unwrap(), condition);
        }
        assert!("sound".parse::<Condition>().is_err());
    }

    #[test]
    fn serialized_form_is_the_catalog_key() {
        for condition in Condition::ALL {
            let json = serde_json::to_string(&condition).unwrap();
            assert_eq!(json, format!("\"{}\"", condition.key()));
        }
    }

    #[test]
    fn only_whole_tooth_conditions_have_overlays() {
        for condition in Condition::ALL {
            if condition.overlay().is_some() {
                assert!(condition.is_whole_tooth(), "{condition} has an overlay");
            }
        }
        assert!(Condition::Crown.overlay().is_none());
        assert_eq!(
            Condition::ToBeExtracted.overlay().map(|o| o.class_name),
            Some("tbe-lines")
        );
    }
}
