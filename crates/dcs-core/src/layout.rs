//! Deterministic chart layout.
//!
//! For a dentition mode the generator produces every tooth id in drawing
//! order, each tooth's bounding box and label anchor, and the surface cells
//! with the code assigned to each role.
//!
//! ## Arrangement
//!
//! - The upper row holds the patient-right quadrant (drawn on the viewer's
//!   left, positions descending toward the midline) and then the
//!   patient-left quadrant (positions ascending away from the midline).
//! - The lower row mirrors it directly below, after the inter-arch gap.
//! - Each tooth is a 3x3 grid of cells; five are used (centre, left, right,
//!   top, bottom).
//!
//! Generation is pure: the same mode always yields an identical layout.

use serde::Serialize;

use dcs_model::{Arch, DentitionMode, Side, SurfaceCode, SurfaceRole, ToothId};

pub const TOOTH_SIZE: f64 = 50.0;
pub const SURFACE_SIZE: f64 = TOOTH_SIZE / 3.0;
pub const TOOTH_SPACING: f64 = 5.0;
pub const MIDLINE_SPACING: f64 = 20.0;
pub const ARCH_SPACING: f64 = 40.0;
pub const LABEL_OFFSET: f64 = 18.0;
pub const CHART_HEIGHT: f64 = TOOTH_SIZE * 2.0 + ARCH_SPACING + LABEL_OFFSET * 2.0;

/// Upper row top edge.
pub const UPPER_ROW_Y: f64 = LABEL_OFFSET;
/// Lower row top edge.
pub const LOWER_ROW_Y: f64 = UPPER_ROW_Y + TOOTH_SIZE + ARCH_SPACING;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in chart units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.x2() && point.y >= self.y && point.y <= self.y2()
    }
}

/// One clickable surface cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceLayout {
    pub code: SurfaceCode,
    pub role: SurfaceRole,
    pub rect: Rect,
}

/// Geometry and surface assignment for one tooth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToothLayout {
    pub id: ToothId,
    pub bbox: Rect,
    /// Centre anchor of the tooth number label.
    pub label: Point,
    /// Cells in drawing order: centre, left, right, top, bottom.
    pub surfaces: Vec<SurfaceLayout>,
}

impl ToothLayout {
    fn build(id: ToothId, x: f64, y: f64) -> Self {
        let bbox = Rect::new(x, y, TOOTH_SIZE, TOOTH_SIZE);
        let label_y = match id.arch() {
            Arch::Upper => y + TOOTH_SIZE + LABEL_OFFSET,
            Arch::Lower => y - LABEL_OFFSET + 15.0,
        };
        let cell = |col: f64, row: f64| {
            Rect::new(
                x + SURFACE_SIZE * col,
                y + SURFACE_SIZE * row,
                SURFACE_SIZE,
                SURFACE_SIZE,
            )
        };
        let (left, right) = match id.side() {
            Side::Right => (SurfaceRole::Distal, SurfaceRole::Mesial),
            Side::Left => (SurfaceRole::Mesial, SurfaceRole::Distal),
        };
        let (top, bottom) = match id.arch() {
            Arch::Upper => (SurfaceRole::Buccal, SurfaceRole::LingualOrPalatal),
            Arch::Lower => (SurfaceRole::LingualOrPalatal, SurfaceRole::Buccal),
        };
        let surfaces = [
            (SurfaceRole::OcclusalOrIncisal, cell(1.0, 1.0)),
            (left, cell(0.0, 1.0)),
            (right, cell(2.0, 1.0)),
            (top, cell(1.0, 0.0)),
            (bottom, cell(1.0, 2.0)),
        ]
        .into_iter()
        .map(|(role, rect)| SurfaceLayout {
            code: surface_code(id, role),
            role,
            rect,
        })
        .collect();

        Self {
            id,
            bbox,
            label: Point::new(x + TOOTH_SIZE / 2.0, label_y),
            surfaces,
        }
    }

    pub fn surface(&self, code: SurfaceCode) -> Option<&SurfaceLayout> {
        self.surfaces.iter().find(|surface| surface.code == code)
    }

    pub fn has_surface(&self, code: SurfaceCode) -> bool {
        self.surface(code).is_some()
    }

    pub fn surface_codes(&self) -> impl Iterator<Item = SurfaceCode> + '_ {
        self.surfaces.iter().map(|surface| surface.code)
    }
}

/// The complete arrangement for one dentition mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub mode: DentitionMode,
    pub width: f64,
    pub height: f64,
    /// Upper row left to right, then lower row left to right.
    pub teeth: Vec<ToothLayout>,
}

impl ChartLayout {
    /// Generate the layout for `mode`.
    pub fn generate(mode: DentitionMode) -> Self {
        let per_quadrant = usize::from(mode.teeth_per_quadrant());
        let [upper_right, upper_left, lower_left, lower_right] = mode.quadrants();

        let mut upper = Vec::with_capacity(per_quadrant * 2);
        let mut lower = Vec::with_capacity(per_quadrant * 2);
        let mut x = 0.0;
        for (upper_q, lower_q, descending) in [
            (upper_right, lower_right, true),
            (upper_left, lower_left, false),
        ] {
            for position in quadrant_positions(mode, descending) {
                if let Ok(id) = ToothId::new(upper_q, position) {
                    upper.push(ToothLayout::build(id, x, UPPER_ROW_Y));
                }
                if let Ok(id) = ToothId::new(lower_q, position) {
                    lower.push(ToothLayout::build(id, x, LOWER_ROW_Y));
                }
                x += TOOTH_SIZE + TOOTH_SPACING;
            }
            x += MIDLINE_SPACING - TOOTH_SPACING;
        }

        upper.extend(lower);
        Self {
            mode,
            width: chart_width(mode),
            height: CHART_HEIGHT,
            teeth: upper,
        }
    }

    /// Generate from an untrusted mode string; unknown values fall back to
    /// the permanent dentition.
    pub fn generate_lossy(mode: &str) -> Self {
        Self::generate(DentitionMode::parse_lossy(mode))
    }

    pub fn tooth(&self, id: ToothId) -> Option<&ToothLayout> {
        self.teeth.iter().find(|tooth| tooth.id == id)
    }

    pub fn contains(&self, id: ToothId) -> bool {
        self.tooth(id).is_some()
    }

    pub fn tooth_ids(&self) -> impl Iterator<Item = ToothId> + '_ {
        self.teeth.iter().map(|tooth| tooth.id)
    }

    /// Seed pairs for [`dcs_model::ChartState::initialize`].
    pub fn seeds(&self) -> impl Iterator<Item = (ToothId, Vec<SurfaceCode>)> + '_ {
        self.teeth
            .iter()
            .map(|tooth| (tooth.id, tooth.surface_codes().collect()))
    }
}

/// Surface code that fills `role` on tooth `id`.
pub fn surface_code(id: ToothId, role: SurfaceRole) -> SurfaceCode {
    match role {
        SurfaceRole::Mesial => SurfaceCode::Mesial,
        SurfaceRole::Distal => SurfaceCode::Distal,
        SurfaceRole::Buccal => SurfaceCode::Buccal,
        SurfaceRole::LingualOrPalatal => match id.arch() {
            Arch::Upper => SurfaceCode::Palatal,
            Arch::Lower => SurfaceCode::Lingual,
        },
        SurfaceRole::OcclusalOrIncisal => {
            if id.has_occlusal_centre() {
                SurfaceCode::Occlusal
            } else {
                SurfaceCode::Incisal
            }
        }
    }
}

/// Total width: two quadrants of teeth plus the midline gap.
pub fn chart_width(mode: DentitionMode) -> f64 {
    let per_quadrant = f64::from(mode.teeth_per_quadrant());
    (TOOTH_SIZE * per_quadrant + TOOTH_SPACING * (per_quadrant - 1.0)) * 2.0 + MIDLINE_SPACING
}

fn quadrant_positions(mode: DentitionMode, descending: bool) -> Vec<u8> {
    let positions = 1..=mode.teeth_per_quadrant();
    if descending {
        positions.rev().collect()
    } else {
        positions.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ToothId {
        value.parse().unwrap()
    }

    #[test]
    fn permanent_order_matches_fdi_reading_order() {
        let layout = ChartLayout::generate(DentitionMode::Permanent);
        let ids: Vec<String> = layout.tooth_ids().map(|id| id.to_string()).collect();
        assert_eq!(ids.len(), 32);
        assert_eq!(&ids[..3], ["18", "17", "16"]);
        assert_eq!(&ids[7..10], ["11", "21", "22"]);
        assert_eq!(ids[15], "28");
        assert_eq!(&ids[16..18], ["48", "47"]);
        assert_eq!(&ids[23..25], ["41", "31"]);
        assert_eq!(ids[31], "38");
    }

    #[test]
    fn primary_order_uses_quadrants_five_to_eight() {
        let layout = ChartLayout::generate(DentitionMode::Primary);
        let ids: Vec<String> = layout.tooth_ids().map(|id| id.to_string()).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(ids[0], "55");
        assert_eq!(&ids[4..6], ["51", "61"]);
        assert_eq!(ids[10], "85");
        assert_eq!(ids[19], "75");
    }

    #[test]
    fn primary_anteriors_are_charted_occlusal() {
        let layout = ChartLayout::generate(DentitionMode::Primary);
        for tooth in &layout.teeth {
            assert!(tooth.has_surface(SurfaceCode::Occlusal), "{}", tooth.id);
            assert!(!tooth.has_surface(SurfaceCode::Incisal), "{}", tooth.id);
        }
    }

    #[test]
    fn geometry_constants() {
        assert_eq!(CHART_HEIGHT, 176.0);
        assert_eq!(UPPER_ROW_Y, 18.0);
        assert_eq!(LOWER_ROW_Y, 108.0);
        assert_eq!(chart_width(DentitionMode::Permanent), 890.0);
        assert_eq!(chart_width(DentitionMode::Primary), 560.0);

        let layout = ChartLayout::generate(DentitionMode::Permanent);
        let first_left = layout.tooth(id("21")).unwrap();
        assert_eq!(first_left.bbox.x, 8.0 * 55.0 + 15.0);
        let last = layout.tooth(id("28")).unwrap();
        assert_eq!(last.bbox.x2(), layout.width);
        assert_eq!(layout.tooth(id("46")).unwrap().bbox.y, LOWER_ROW_Y);
    }

    #[test]
    fn surface_codes_follow_orientation() {
        let layout = ChartLayout::generate(DentitionMode::Permanent);

        let upper_right_molar = layout.tooth(id("16")).unwrap();
        let codes: Vec<SurfaceCode> = upper_right_molar.surface_codes().collect();
        assert_eq!(
            codes,
            vec![
                SurfaceCode::Occlusal,
                SurfaceCode::Distal,
                SurfaceCode::Mesial,
                SurfaceCode::Buccal,
                SurfaceCode::Palatal,
            ]
        );

        let lower_left_incisor = layout.tooth(id("31")).unwrap();
        let codes: Vec<SurfaceCode> = lower_left_incisor.surface_codes().collect();
        assert_eq!(
            codes,
            vec![
                SurfaceCode::Incisal,
                SurfaceCode::Mesial,
                SurfaceCode::Distal,
                SurfaceCode::Lingual,
                SurfaceCode::Buccal,
            ]
        );

        let buccal = lower_left_incisor.surface(SurfaceCode::Buccal).unwrap();
        assert_eq!(buccal.rect.y, LOWER_ROW_Y + SURFACE_SIZE * 2.0);
    }

    #[test]
    fn labels_sit_outside_the_arches() {
        let layout = ChartLayout::generate(DentitionMode::Permanent);
        let upper = layout.tooth(id("11")).unwrap();
        assert_eq!(upper.label.y, UPPER_ROW_Y + TOOTH_SIZE + LABEL_OFFSET);
        let lower = layout.tooth(id("41")).unwrap();
        assert_eq!(lower.label.y, LOWER_ROW_Y - 3.0);
    }

    #[test]
    fn unknown_mode_falls_back_to_permanent() {
        let layout = ChartLayout::generate_lossy("mixed");
        assert_eq!(layout.mode, DentitionMode::Permanent);
        assert_eq!(layout.teeth.len(), 32);
    }
}
