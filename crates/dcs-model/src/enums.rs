//! Type-safe enumerations for charting concepts.
//!
//! These enums replace the string literals used by the chart surface
//! (`"permanent"`, `"O"`, `"whole"`) with closed types. Each one keeps its
//! canonical string form for serialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Dentition mode: which tooth set and numbering the chart uses.
///
/// Serialized as `"permanent"` / `"primary"`. Unknown strings fall back to
/// [`DentitionMode::Permanent`] when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum DentitionMode {
    /// Adult dentition, FDI quadrants 1-4, 32 teeth.
    #[default]
    Permanent,
    /// Child dentition, FDI quadrants 5-8, 20 teeth.
    Primary,
}

impl DentitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DentitionMode::Permanent => "permanent",
            DentitionMode::Primary => "primary",
        }
    }

    /// Parse a mode string, falling back to `Permanent` for anything unknown.
    pub fn parse_lossy(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// The other dentition mode.
    pub fn toggled(&self) -> Self {
        match self {
            DentitionMode::Permanent => DentitionMode::Primary,
            DentitionMode::Primary => DentitionMode::Permanent,
        }
    }

    /// FDI quadrant numbers in this dentition (upper right, upper left,
    /// lower left, lower right).
    pub fn quadrants(&self) -> [u8; 4] {
        match self {
            DentitionMode::Permanent => [1, 2, 3, 4],
            DentitionMode::Primary => [5, 6, 7, 8],
        }
    }

    /// Number of teeth per quadrant.
    pub fn teeth_per_quadrant(&self) -> u8 {
        match self {
            DentitionMode::Permanent => 8,
            DentitionMode::Primary => 5,
        }
    }

    pub fn tooth_count(&self) -> usize {
        usize::from(self.teeth_per_quadrant()) * 4
    }
}

impl fmt::Display for DentitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DentitionMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" | "adult" => Ok(DentitionMode::Permanent),
            "primary" | "deciduous" | "child" => Ok(DentitionMode::Primary),
            _ => Err(ModelError::InvalidDentitionMode(s.to_string())),
        }
    }
}

impl From<String> for DentitionMode {
    fn from(value: String) -> Self {
        DentitionMode::parse_lossy(&value)
    }
}

impl From<DentitionMode> for &'static str {
    fn from(mode: DentitionMode) -> Self {
        mode.as_str()
    }
}

/// Whether a condition is recorded against a whole tooth or one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionScope {
    Whole,
    Surface,
}

impl ConditionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionScope::Whole => "whole",
            ConditionScope::Surface => "surface",
        }
    }
}

impl fmt::Display for ConditionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anatomical role of a surface cell, independent of orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceRole {
    Mesial,
    Distal,
    Buccal,
    /// Lingual on the lower arch, palatal on the upper arch.
    LingualOrPalatal,
    /// Occlusal on posterior teeth, incisal on anterior teeth.
    OcclusalOrIncisal,
}

impl SurfaceRole {
    pub const ALL: [SurfaceRole; 5] = [
        SurfaceRole::Mesial,
        SurfaceRole::Distal,
        SurfaceRole::Buccal,
        SurfaceRole::LingualOrPalatal,
        SurfaceRole::OcclusalOrIncisal,
    ];
}

/// Surface code as charted: one letter per anatomical face.
///
/// The code for a given role depends on the tooth (palatal vs lingual,
/// occlusal vs incisal) and is fixed once the layout assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurfaceCode {
    #[serde(rename = "M")]
    Mesial,
    #[serde(rename = "D")]
    Distal,
    #[serde(rename = "B")]
    Buccal,
    #[serde(rename = "L")]
    Lingual,
    #[serde(rename = "P")]
    Palatal,
    #[serde(rename = "O")]
    Occlusal,
    #[serde(rename = "I")]
    Incisal,
}

impl SurfaceCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceCode::Mesial => "M",
            SurfaceCode::Distal => "D",
            SurfaceCode::Buccal => "B",
            SurfaceCode::Lingual => "L",
            SurfaceCode::Palatal => "P",
            SurfaceCode::Occlusal => "O",
            SurfaceCode::Incisal => "I",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceCode::Mesial => "Mesial",
            SurfaceCode::Distal => "Distal",
            SurfaceCode::Buccal => "Buccal",
            SurfaceCode::Lingual => "Lingual",
            SurfaceCode::Palatal => "Palatal",
            SurfaceCode::Occlusal => "Occlusal",
            SurfaceCode::Incisal => "Incisal",
        }
    }

    /// The role this code fills on any tooth that carries it.
    pub fn role(&self) -> SurfaceRole {
        match self {
            SurfaceCode::Mesial => SurfaceRole::Mesial,
            SurfaceCode::Distal => SurfaceRole::Distal,
            SurfaceCode::Buccal => SurfaceRole::Buccal,
            SurfaceCode::Lingual | SurfaceCode::Palatal => SurfaceRole::LingualOrPalatal,
            SurfaceCode::Occlusal | SurfaceCode::Incisal => SurfaceRole::OcclusalOrIncisal,
        }
    }
}

impl fmt::Display for SurfaceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceCode {
    type Err = ModelError;

    /// Accepts the single-letter code or the full surface name, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" | "MESIAL" => Ok(SurfaceCode::Mesial),
            "D" | "DISTAL" => Ok(SurfaceCode::Distal),
            "B" | "BUCCAL" | "FACIAL" => Ok(SurfaceCode::Buccal),
            "L" | "LINGUAL" => Ok(SurfaceCode::Lingual),
            "P" | "PALATAL" => Ok(SurfaceCode::Palatal),
            "O" | "OCCLUSAL" => Ok(SurfaceCode::Occlusal),
            "I" | "INCISAL" => Ok(SurfaceCode::Incisal),
            _ => Err(ModelError::InvalidSurfaceCode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dentition_mode_falls_back_to_permanent() {
        assert_eq!(DentitionMode::parse_lossy("primary"), DentitionMode::Primary);
        assert_eq!(DentitionMode::parse_lossy("Primary "), DentitionMode::Primary);
        assert_eq!(DentitionMode::parse_lossy("mixed"), DentitionMode::Permanent);
        assert_eq!(DentitionMode::parse_lossy(""), DentitionMode::Permanent);
        assert!("mixed".parse::<DentitionMode>().is_err());
    }

    #[test]
    fn dentition_mode_toggles() {
        assert_eq!(DentitionMode::Permanent.toggled(), DentitionMode::Primary);
        assert_eq!(DentitionMode::Primary.toggled(), DentitionMode::Permanent);
        assert_eq!(DentitionMode::Permanent.tooth_count(), 32);
        assert_eq!(DentitionMode::Primary.tooth_count(), 20);
    }

    #[test]
    fn surface_code_parses_letters_and_names() {
        assert_eq!("o".parse::<SurfaceCode>().unwrap(), SurfaceCode::Occlusal);
        assert_eq!("Palatal".parse::<SurfaceCode>().unwrap(), SurfaceCode::Palatal);
        assert!("X".parse::<SurfaceCode>().is_err());
        assert_eq!(SurfaceCode::Palatal.role(), SurfaceRole::LingualOrPalatal);
        assert_eq!(SurfaceCode::Incisal.role(), SurfaceRole::OcclusalOrIncisal);
    }
}
