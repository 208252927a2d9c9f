use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::path::Path;
use crate::geom::point::Point;
use crate::geom::units::{Length, PositiveLength, UnsignedLength};
use crate::model::layer::Layer;

// Polygon graphic on a single layer, optionally filled. On the board
// outline layer the path is the milling contour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub uuid: Uuid,
    pub layer: Layer,
    pub line_width: UnsignedLength,
    pub filled: bool,
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub uuid: Uuid,
    pub layer: Layer,
    pub line_width: UnsignedLength,
    pub filled: bool,
    pub center: Point,
    pub diameter: PositiveLength,
}

impl Circle {
    pub fn outline(&self) -> Path {
        Path::circle(self.center, self.diameter)
    }
}

// Vector text rendered to stroke paths by the editor's text layouter; the
// checker consumes the precomputed character paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeText {
    pub uuid: Uuid,
    pub layer: Layer,
    pub stroke_width: PositiveLength,
    pub paths: Vec<Path>,
}

// Non-plated drilled hole. The path describes the drill travel: a single
// vertex is a round drill, two straight vertices a single-segment slot,
// more vertices or arcs a milled slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    pub uuid: Uuid,
    pub diameter: PositiveLength,
    pub path: Path,
    pub stop_mask_offset: Option<Length>,
}

// Drill path shapes, ordered from least to most demanding to manufacture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKind {
    RoundDrill,
    SingleSegmentStraight,
    MultiSegmentStraight,
    Curved,
}

pub fn classify_slot(path: &Path) -> SlotKind {
    if path.has_arcs() {
        SlotKind::Curved
    } else if path.is_single_point() {
        SlotKind::RoundDrill
    } else if path.segment_count() <= 1 {
        SlotKind::SingleSegmentStraight
    } else {
        SlotKind::MultiSegmentStraight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::units::Angle;
    use crate::geom::{pt, vtx};

    #[test]
    fn test_classify_slot() {
        assert_eq!(classify_slot(&Path::from_points(&[pt(0, 0)])), SlotKind::RoundDrill);
        assert_eq!(
            classify_slot(&Path::line(pt(0, 0), pt(5_000_000, 0))),
            SlotKind::SingleSegmentStraight
        );
        assert_eq!(
            classify_slot(&Path::from_points(&[pt(0, 0), pt(1_000, 0), pt(1_000, 1_000)])),
            SlotKind::MultiSegmentStraight
        );
        let curved = Path::new(vec![vtx(pt(0, 0), Angle::DEG_90), vtx(pt(1_000, 1_000), Angle::ZERO)]);
        assert_eq!(classify_slot(&curved), SlotKind::Curved);
        assert!(SlotKind::RoundDrill < SlotKind::Curved);
    }
}
