//! FDI tooth identifiers.
//!
//! A tooth id is the two-digit FDI notation: quadrant digit followed by the
//! position counted from the midline (`"18"` is the upper right third molar,
//! `"55"` the upper right second primary molar).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::DentitionMode;
use crate::error::ModelError;

/// Upper or lower arch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Upper,
    Lower,
}

/// Patient side. Patient-right quadrants are drawn on the viewer's left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Left,
}

/// A validated FDI tooth identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToothId {
    quadrant: u8,
    position: u8,
}

impl ToothId {
    /// Build a tooth id, rejecting quadrant/position pairs outside FDI notation.
    pub fn new(quadrant: u8, position: u8) -> Result<Self, ModelError> {
        let max_position = match quadrant {
            1..=4 => 8,
            5..=8 => 5,
            _ => return Err(ModelError::InvalidToothId(format!("{quadrant}{position}"))),
        };
        if position == 0 || position > max_position {
            return Err(ModelError::InvalidToothId(format!("{quadrant}{position}")));
        }
        Ok(Self { quadrant, position })
    }

    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    /// The dentition this tooth belongs to.
    pub fn dentition(&self) -> DentitionMode {
        if self.quadrant <= 4 {
            DentitionMode::Permanent
        } else {
            DentitionMode::Primary
        }
    }

    pub fn arch(&self) -> Arch {
        match self.quadrant {
            1 | 2 | 5 | 6 => Arch::Upper,
            _ => Arch::Lower,
        }
    }

    pub fn side(&self) -> Side {
        match self.quadrant {
            1 | 4 | 5 | 8 => Side::Right,
            _ => Side::Left,
        }
    }

    /// Premolars and molars (position 4 and above) in both dentitions.
    pub fn is_posterior(&self) -> bool {
        self.position >= 4
    }

    /// Whether the central charting surface is occlusal rather than incisal.
    /// Every primary tooth is charted occlusal.
    pub fn has_occlusal_centre(&self) -> bool {
        self.dentition() == DentitionMode::Primary || self.is_posterior()
    }
}

impl fmt::Display for ToothId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quadrant, self.position)
    }
}

impl FromStr for ToothId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        let bytes = trimmed.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ModelError::InvalidToothId(s.to_string()));
        }
        ToothId::new(bytes[0] - b'0', bytes[1] - b'0')
            .map_err(|_| ModelError::InvalidToothId(s.to_string()))
    }
}

impl TryFrom<String> for ToothId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToothId> for String {
    fn from(id: ToothId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fdi_notation() {
        let id: ToothId = "18".parse().unwrap();
        assert_eq!(id.quadrant(), 1);
        assert_eq!(id.position(), 8);
        assert_eq!(id.arch(), Arch::Upper);
        assert_eq!(id.side(), Side::Right);
        assert!(id.is_posterior());
        assert_eq!(id.to_string(), "18");
        assert_eq!("#46".parse::<ToothId>().unwrap().to_string(), "46");
    }

    #[test]
    fn rejects_out_of_range_positions() {
        assert!("19".parse::<ToothId>().is_err());
        assert!("56".parse::<ToothId>().is_err());
        assert!("90".parse::<ToothId>().is_err());
        assert!("10".parse::<ToothId>().is_err());
        assert!("1".parse::<ToothId>().is_err());
        assert!("abc".parse::<ToothId>().is_err());
    }

    #[test]
    fn primary_teeth_report_their_dentition() {
        let id: ToothId = "75".parse().unwrap();
        assert_eq!(id.dentition(), DentitionMode::Primary);
        assert_eq!(id.arch(), Arch::Lower);
        assert_eq!(id.side(), Side::Left);
        let incisor: ToothId = "51".parse().unwrap();
        assert!(!incisor.is_posterior());
        assert!(incisor.has_occlusal_centre());
        assert!(!"11".parse::<ToothId>().unwrap().has_occlusal_centre());
    }
}
