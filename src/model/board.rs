use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::point::Point;
use crate::geom::MAX_ARC_TOLERANCE;
use crate::model::device::{Device, Footprint, FootprintId, FootprintPad};
use crate::model::graphics::{Hole, Polygon, StrokeText};
use crate::model::layer::Layer;
use crate::model::net::{NetLineAnchor, NetSegment, NetSignal};
use crate::model::pathgen::PathGenerator;
use crate::model::plane::Plane;
use crate::model::transform::Transform;

// Signal instance of a component; the indirection pads resolve their net
// through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSignalInstance {
    pub uuid: Uuid,
    pub net: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub uuid: Uuid,
    pub name: String,
    pub schematic_only: bool,
    pub default_device: Option<Uuid>,
    pub signals: Vec<ComponentSignalInstance>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    instances: Vec<ComponentInstance>,
    nets: Vec<NetSignal>,
}

impl Circuit {
    pub fn add_component_instance(&mut self, i: ComponentInstance) {
        self.instances.push(i);
    }

    pub fn add_net(&mut self, n: NetSignal) {
        self.nets.push(n);
    }

    pub fn component_instances(&self) -> &[ComponentInstance] {
        &self.instances
    }

    pub fn component_instance(&self, uuid: Uuid) -> Option<&ComponentInstance> {
        self.instances.iter().find(|i| i.uuid == uuid)
    }

    pub fn nets(&self) -> &[NetSignal] {
        &self.nets
    }

    pub fn net(&self, uuid: Uuid) -> Option<&NetSignal> {
        self.nets.iter().find(|n| n.uuid == uuid)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    circuit: Circuit,
}

impl Project {
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }
}

// Unrouted connection computed by the editor's connectivity layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirWire {
    pub net: Option<Uuid>,
    pub from: (Uuid, Point),
    pub to: (Uuid, Point),
}

// A fully described board. The checker takes a read-only view except for
// rebuild_planes, which refreshes the cached plane fragments.
#[derive(Debug, Default, Clone)]
pub struct BoardModel {
    name: String,
    inner_layer_count: u8,
    footprints: Vec<Footprint>,
    devices: Vec<Device>,
    segments: Vec<NetSegment>,
    planes: Vec<Plane>,
    polygons: Vec<Polygon>,
    texts: Vec<StrokeText>,
    holes: Vec<Hole>,
    air_wires: Vec<AirWire>,
    project: Project,
}

impl BoardModel {
    pub fn new(name: &str, inner_layer_count: u8) -> Self {
        Self { name: name.to_string(), inner_layer_count, ..Self::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Copper stackup in order: top, inner 1..N, bottom.
    pub fn copper_layers(&self) -> Vec<Layer> {
        let mut layers = vec![Layer::TopCopper];
        for i in 1..=self.inner_layer_count {
            layers.push(Layer::inner_copper(i));
        }
        layers.push(Layer::BottomCopper);
        layers
    }

    pub fn inner_copper(&self, i: u8) -> Option<Layer> {
        (i >= 1 && i <= self.inner_layer_count).then(|| Layer::inner_copper(i))
    }

    pub fn add_footprint(&mut self, f: Footprint) -> FootprintId {
        self.footprints.push(f);
        FootprintId(self.footprints.len() - 1)
    }

    pub fn footprint(&self, id: FootprintId) -> &Footprint {
        &self.footprints[id.0]
    }

    pub fn add_device(&mut self, d: Device) {
        self.devices.push(d);
    }

    pub fn add_net_segment(&mut self, s: NetSegment) {
        self.segments.push(s);
    }

    pub fn add_plane(&mut self, p: Plane) {
        self.planes.push(p);
    }

    pub fn add_polygon(&mut self, p: Polygon) {
        self.polygons.push(p);
    }

    pub fn add_stroke_text(&mut self, t: StrokeText) {
        self.texts.push(t);
    }

    pub fn add_hole(&mut self, h: Hole) {
        self.holes.push(h);
    }

    pub fn set_air_wires(&mut self, wires: Vec<AirWire>) {
        self.air_wires = wires;
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn net_segments(&self) -> &[NetSegment] {
        &self.segments
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn stroke_texts(&self) -> &[StrokeText] {
        &self.texts
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn air_wires(&self) -> &[AirWire] {
        &self.air_wires
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn device_instance_by_component_uuid(&self, component: Uuid) -> Option<&Device> {
        self.devices.iter().find(|d| d.component == component)
    }

    pub fn net_name(&self, net: Uuid) -> String {
        self.project
            .circuit()
            .net(net)
            .map_or_else(|| net.to_string(), |n| n.name.clone())
    }

    // Net a pad carries, resolved through the circuit.
    pub fn pad_net(&self, device: &Device, pad: &FootprintPad) -> Option<Uuid> {
        let signal = pad.signal?;
        let instance = self.project.circuit().component_instance(device.component)?;
        instance.signals.iter().find(|s| s.uuid == signal).and_then(|s| s.net)
    }

    // Board position of a pad once its device placement is applied.
    pub fn pad_transform(&self, device: &Device, pad: &FootprintPad) -> Transform {
        device.transform.compose(&pad.transform())
    }

    pub fn anchor_position(&self, seg: &NetSegment, anchor: NetLineAnchor) -> Option<Point> {
        match anchor {
            NetLineAnchor::Junction(uuid) => seg.point(uuid).map(|p| p.position),
            NetLineAnchor::Via(uuid) => seg.via(uuid).map(|v| v.position),
            NetLineAnchor::Pad { device, pad } => {
                let dev = self.devices.iter().find(|d| d.uuid == device)?;
                let pad = self.footprint(dev.footprint).pad(pad)?;
                Some(self.pad_transform(dev, pad).position)
            }
        }
    }

    // Recomputes the filled fragments of every plane: the outline minus
    // foreign copper inflated by the plane clearance, opened by the minimum
    // width so sub-minimum slivers disappear.
    pub fn rebuild_planes(&mut self) {
        let fragments: Vec<_> = {
            let gen = PathGenerator::new(self);
            self.planes.iter().map(|p| gen.plane_fill(p, MAX_ARC_TOLERANCE)).collect()
        };
        for (plane, f) in self.planes.iter_mut().zip(fragments) {
            plane.set_fragments(f);
        }
    }

    // Air wires are maintained by the editor's connectivity layer; the
    // board revalidates net references and keeps the last computed set.
    pub fn force_air_wires_rebuild(&mut self) {
        let circuit = self.project.circuit().clone();
        self.air_wires.retain(|w| w.net.map_or(true, |n| circuit.net(n).is_some()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_layers_order() {
        let b = BoardModel::new("test", 2);
        assert_eq!(
            b.copper_layers(),
            vec![
                Layer::TopCopper,
                Layer::inner_copper(1),
                Layer::inner_copper(2),
                Layer::BottomCopper
            ]
        );
        assert_eq!(b.inner_copper(2), Some(Layer::inner_copper(2)));
        assert_eq!(b.inner_copper(3), None);
        assert_eq!(b.inner_copper(0), None);
    }
}
