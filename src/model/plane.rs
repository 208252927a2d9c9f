use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::path::Path;
use crate::geom::polygon::PolygonSet;
use crate::geom::units::UnsignedLength;
use crate::model::layer::Layer;

// Filled copper area belonging to a net. The filled fragments are derived
// data, recomputed by BoardModel::rebuild_planes and cached here; they are
// empty until the first rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plane {
    pub uuid: Uuid,
    pub layer: Layer,
    pub net: Option<Uuid>,
    pub outline: Path,
    pub min_width: UnsignedLength,
    pub min_clearance: UnsignedLength,
    #[serde(skip)]
    fragments: PolygonSet,
}

impl Plane {
    pub fn new(
        uuid: Uuid,
        layer: Layer,
        net: Option<Uuid>,
        outline: Path,
        min_width: UnsignedLength,
        min_clearance: UnsignedLength,
    ) -> Self {
        Self { uuid, layer, net, outline, min_width, min_clearance, fragments: PolygonSet::empty() }
    }

    pub fn fragments(&self) -> &PolygonSet {
        &self.fragments
    }

    pub(crate) fn set_fragments(&mut self, fragments: PolygonSet) {
        self.fragments = fragments;
    }
}
