//! Rendering projection.
//!
//! [`project`] turns layout plus chart state into a [`Scene`]: plain nodes
//! with geometry, fill classes, overlay shapes and note indicators. The
//! scene is rebuilt on demand and is never read back into the chart.

use serde::Serialize;

use dcs_model::{
    ChartState, ConditionCatalog, DentitionMode, OverlayMarker, SurfaceCode, ToothId,
};

use crate::layout::{ChartLayout, Point, Rect, ToothLayout};
use crate::sync::notes::{NoteIndicator, NoteIndicators};

/// Render class of a sound surface.
pub const SOUND_CLASS: &str = "sound";

/// Overlay geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Line { from: Point, to: Point },
    /// One or more disconnected polylines.
    Path { segments: Vec<Vec<Point>> },
    Circle { center: Point, radius: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayNode {
    pub class_name: &'static str,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceNode {
    pub code: SurfaceCode,
    pub rect: Rect,
    pub class_name: &'static str,
    pub fill: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToothNode {
    pub id: ToothId,
    pub bbox: Rect,
    pub label: Point,
    /// Fill class of the active whole-tooth condition.
    pub class_name: Option<&'static str>,
    pub surfaces: Vec<SurfaceNode>,
    pub overlays: Vec<OverlayNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub mode: DentitionMode,
    pub width: f64,
    pub height: f64,
    pub teeth: Vec<ToothNode>,
    pub notes: Vec<NoteIndicator>,
}

impl Scene {
    pub fn tooth(&self, id: ToothId) -> Option<&ToothNode> {
        self.teeth.iter().find(|tooth| tooth.id == id)
    }
}

/// Build the scene for the current chart.
pub fn project(
    layout: &ChartLayout,
    state: &ChartState,
    notes: &NoteIndicators,
    catalog: &ConditionCatalog,
) -> Scene {
    let teeth = layout
        .teeth
        .iter()
        .map(|tooth| project_tooth(tooth, state, catalog))
        .collect();
    Scene {
        mode: layout.mode,
        width: layout.width,
        height: layout.height,
        teeth,
        notes: notes.iter().cloned().collect(),
    }
}

fn project_tooth(tooth: &ToothLayout, state: &ChartState, catalog: &ConditionCatalog) -> ToothNode {
    let record = state.get(&tooth.id);
    let whole = record.and_then(|record| record.whole_condition());

    let surfaces = tooth
        .surfaces
        .iter()
        .map(|cell| {
            let condition = record
                .and_then(|record| record.surface(cell.code))
                .and_then(|surface| surface.condition);
            let item = condition.and_then(|condition| catalog.item(condition));
            SurfaceNode {
                code: cell.code,
                rect: cell.rect,
                class_name: item.map_or(SOUND_CLASS, |item| item.render_class),
                fill: item.map(|item| item.color),
            }
        })
        .collect();

    let overlays = whole
        .and_then(|condition| condition.overlay())
        .map(|spec| OverlayNode {
            class_name: spec.class_name,
            shape: overlay_shape(spec.marker, tooth.bbox),
        })
        .into_iter()
        .collect();

    ToothNode {
        id: tooth.id,
        bbox: tooth.bbox,
        label: tooth.label,
        class_name: whole.and_then(|condition| catalog.item(condition)).map(|item| item.render_class),
        surfaces,
        overlays,
    }
}

/// Geometry of an overlay marker against a tooth bounding box.
pub fn overlay_shape(marker: OverlayMarker, bbox: Rect) -> Shape {
    let at_width = |ratio: f64| bbox.x + bbox.width * ratio;
    match marker {
        OverlayMarker::VerticalLine => Shape::Line {
            from: Point::new(bbox.cx(), bbox.y),
            to: Point::new(bbox.cx(), bbox.y2()),
        },
        OverlayMarker::DiagonalCross => Shape::Path {
            segments: vec![
                vec![Point::new(bbox.x, bbox.y), Point::new(bbox.x2(), bbox.y2())],
                vec![Point::new(bbox.x2(), bbox.y), Point::new(bbox.x, bbox.y2())],
            ],
        },
        OverlayMarker::VerticalBars { offsets } => Shape::Path {
            segments: offsets
                .iter()
                .map(|&ratio| {
                    vec![
                        Point::new(at_width(ratio), bbox.y),
                        Point::new(at_width(ratio), bbox.y2()),
                    ]
                })
                .collect(),
        },
        OverlayMarker::Circle { radius_ratio } => Shape::Circle {
            center: Point::new(bbox.cx(), bbox.cy()),
            radius: bbox.width * radius_ratio,
        },
        OverlayMarker::JaggedLine { breaks: [first, second] } => Shape::Path {
            segments: vec![vec![
                Point::new(bbox.x, bbox.cy()),
                Point::new(at_width(first), bbox.y),
                Point::new(at_width(second), bbox.y2()),
                Point::new(bbox.x2(), bbox.cy()),
            ]],
        },
        OverlayMarker::DiagonalLine => Shape::Line {
            from: Point::new(bbox.x, bbox.y2()),
            to: Point::new(bbox.x2(), bbox.y),
        },
        OverlayMarker::HorizontalLine => Shape::Line {
            from: Point::new(bbox.x, bbox.cy()),
            to: Point::new(bbox.x2(), bbox.cy()),
        },
    }
}
