use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::path::Path;
use crate::geom::point::Point;
use crate::geom::units::{Length, PositiveLength};
use crate::model::layer::Layer;

// A named signal of the circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSignal {
    pub uuid: Uuid,
    pub name: String,
}

// Plated through-hole via. Always spans all copper layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via {
    pub uuid: Uuid,
    pub position: Point,
    pub size: PositiveLength,
    pub drill: PositiveLength,
    pub stop_mask_offset: Option<Length>,
}

impl Via {
    // The drill as a path, for the generic hole machinery.
    pub fn drill_path(&self) -> Path {
        Path::from_points(&[self.position])
    }
}

// Junction point of net lines within a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPoint {
    pub uuid: Uuid,
    pub position: Point,
}

// What a net line end attaches to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetLineAnchor {
    Junction(Uuid),
    Via(Uuid),
    Pad { device: Uuid, pad: Uuid },
}

// Routed trace on a single copper layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetLine {
    pub uuid: Uuid,
    pub layer: Layer,
    pub width: PositiveLength,
    pub start: NetLineAnchor,
    pub end: NetLineAnchor,
}

// A connected group of vias, lines and junctions belonging to one net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSegment {
    pub uuid: Uuid,
    pub net: Option<Uuid>,
    pub vias: Vec<Via>,
    pub lines: Vec<NetLine>,
    pub points: Vec<NetPoint>,
}

impl NetSegment {
    pub fn new(uuid: Uuid, net: Option<Uuid>) -> Self {
        Self { uuid, net, vias: Vec::new(), lines: Vec::new(), points: Vec::new() }
    }

    pub fn via(&self, uuid: Uuid) -> Option<&Via> {
        self.vias.iter().find(|v| v.uuid == uuid)
    }

    pub fn point(&self, uuid: Uuid) -> Option<&NetPoint> {
        self.points.iter().find(|p| p.uuid == uuid)
    }

    // A stale segment routes nothing at all.
    pub fn is_empty(&self) -> bool {
        self.vias.is_empty() && self.lines.is_empty()
    }

    // Junctions no net line attaches to.
    pub fn unconnected_points(&self) -> impl Iterator<Item = &NetPoint> {
        self.points.iter().filter(|p| {
            !self.lines.iter().any(|l| {
                l.start == NetLineAnchor::Junction(p.uuid) || l.end == NetLineAnchor::Junction(p.uuid)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::pt;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_unconnected_points() {
        let mut seg = NetSegment::new(uuid(1), None);
        seg.points.push(NetPoint { uuid: uuid(2), position: pt(0, 0) });
        seg.points.push(NetPoint { uuid: uuid(3), position: pt(1_000, 0) });
        seg.points.push(NetPoint { uuid: uuid(4), position: pt(2_000, 0) });
        seg.lines.push(NetLine {
            uuid: uuid(5),
            layer: Layer::TopCopper,
            width: PositiveLength::nm(200_000),
            start: NetLineAnchor::Junction(uuid(2)),
            end: NetLineAnchor::Junction(uuid(3)),
        });
        let stale: Vec<_> = seg.unconnected_points().map(|p| p.uuid).collect();
        assert_eq!(stale, vec![uuid(4)]);
        assert!(!seg.is_empty());
        assert!(NetSegment::new(uuid(9), None).is_empty());
    }
}
