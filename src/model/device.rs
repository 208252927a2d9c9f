use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::path::Path;
use crate::geom::point::Point;
use crate::geom::units::{Angle, Length, LimitedRatio, PositiveLength};
use crate::model::graphics::{Circle, Hole, Polygon, StrokeText};
use crate::model::layer::Layer;
use crate::model::transform::Transform;

// Plated hole of a THT pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadHole {
    pub uuid: Uuid,
    pub diameter: PositiveLength,
    pub path: Path,
}

// Copper land outline of a pad. Corner radii are a ratio of half the
// smaller box dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadShape {
    RoundedRect { corner_radius: LimitedRatio },
    RoundedOctagon { corner_radius: LimitedRatio },
    Stroke { path: Path },
    Custom { outline: Path },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PadSide {
    Top,
    Bottom,
}

// Pad of a library footprint, in footprint coordinates. A pad without
// holes is surface mount on its side; a pad with holes spans all copper
// layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintPad {
    pub uuid: Uuid,
    pub position: Point,
    pub rotation: Angle,
    pub width: PositiveLength,
    pub height: PositiveLength,
    pub shape: PadShape,
    pub side: PadSide,
    pub holes: Vec<PadHole>,
    pub stop_mask_offset: Option<Length>,
    // Component signal this pad belongs to; nets resolve through the
    // circuit, not through back-pointers.
    pub signal: Option<Uuid>,
}

impl FootprintPad {
    pub fn is_tht(&self) -> bool {
        !self.holes.is_empty()
    }

    // Layer the copper of an SMT pad lands on before device placement.
    pub const fn smt_layer(&self) -> Layer {
        match self.side {
            PadSide::Top => Layer::TopCopper,
            PadSide::Bottom => Layer::BottomCopper,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, false)
    }
}

// Library footprint shared by device instances through the board's arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub uuid: Uuid,
    pub name: String,
    pub pads: Vec<FootprintPad>,
    pub polygons: Vec<Polygon>,
    pub circles: Vec<Circle>,
    pub holes: Vec<Hole>,
    pub texts: Vec<StrokeText>,
}

impl Footprint {
    pub fn new(uuid: Uuid, name: &str) -> Self {
        Self {
            uuid,
            name: name.to_string(),
            pads: Vec::new(),
            polygons: Vec::new(),
            circles: Vec::new(),
            holes: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn pad(&self, uuid: Uuid) -> Option<&FootprintPad> {
        self.pads.iter().find(|p| p.uuid == uuid)
    }
}

// Index into the board's footprint arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FootprintId(pub usize);

// Placed device: a component instance realized on the board with a library
// device and footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub uuid: Uuid,
    pub component: Uuid,
    pub library_device: Uuid,
    pub footprint: FootprintId,
    pub transform: Transform,
    pub texts: Vec<StrokeText>,
}
