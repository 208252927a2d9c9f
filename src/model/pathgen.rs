use std::collections::BTreeSet;

use log::debug;
use uuid::Uuid;

use crate::geom::path::Path;
use crate::geom::polygon::PolygonSet;
use crate::geom::pt;
use crate::geom::units::{Length, PositiveLength, UnsignedLength};
use crate::model::board::BoardModel;
use crate::model::device::{Device, FootprintPad, PadShape};
use crate::model::graphics::{Circle, Polygon, StrokeText};
use crate::model::layer::Layer;
use crate::model::net::{NetLine, NetSegment, Via};
use crate::model::plane::Plane;
use crate::model::transform::Transform;

// Which nets a copper query admits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetFilter {
    Any,
    Only(BTreeSet<Option<Uuid>>),
    Except(Option<Uuid>),
}

impl NetFilter {
    fn matches(&self, net: Option<Uuid>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(set) => set.is_empty() || set.contains(&net),
            Self::Except(n) => net != *n,
        }
    }
}

// Converts board objects into polygon sets on a requested layer, with an
// optional outward offset. The single geometry authority for the checker:
// every check sees shapes produced here, flattened within one tolerance.
#[derive(Debug, Copy, Clone)]
pub struct PathGenerator<'a> {
    board: &'a BoardModel,
}

impl<'a> PathGenerator<'a> {
    pub fn new(board: &'a BoardModel) -> Self {
        Self { board }
    }

    // Via copper is the full annular disc; the drill is not subtracted. On
    // the stop mask the opening grows by the via's mask offset.
    pub fn via_area(&self, via: &Via, layer: Layer, offset: UnsignedLength, tol: UnsignedLength) -> PolygonSet {
        let extra = if layer.is_copper() {
            Length::ZERO
        } else if layer.is_stop_mask() {
            via.stop_mask_offset.unwrap_or(Length::ZERO)
        } else {
            return PolygonSet::empty();
        };
        let d = via.size.len() + 2 * (extra + offset.len());
        match PositiveLength::new(d) {
            Ok(d) => PolygonSet::from_closed_path(&Path::circle(via.position, d), tol),
            Err(_) => PolygonSet::empty(),
        }
    }

    pub fn net_line_area(
        &self,
        seg: &NetSegment,
        line: &NetLine,
        layer: Layer,
        offset: UnsignedLength,
        tol: UnsignedLength,
    ) -> PolygonSet {
        if line.layer != layer {
            return PolygonSet::empty();
        }
        let (Some(a), Some(b)) = (
            self.board.anchor_position(seg, line.start),
            self.board.anchor_position(seg, line.end),
        ) else {
            debug!("net line {} has dangling anchors, skipped", line.uuid);
            return PolygonSet::empty();
        };
        let w = PositiveLength::new(line.width.len() + 2 * offset.len())
            .unwrap_or(line.width);
        PolygonSet::from_closed_path(&Path::obround(a, b, w), tol)
    }

    // Pad copper on a layer: the shape outline with its corner treatment.
    // SMT pads exist on their placed side only; THT pads span all copper
    // layers. On the stop mask the shape grows by the pad's mask offset.
    pub fn pad_area(
        &self,
        device: &Device,
        pad: &FootprintPad,
        layer: Layer,
        offset: UnsignedLength,
        tol: UnsignedLength,
    ) -> PolygonSet {
        let tf = self.board.pad_transform(device, pad);
        let placed_side = device.transform.apply_layer(pad.smt_layer());
        let extra = if layer.is_copper() {
            let on_layer = if pad.is_tht() { true } else { placed_side == layer };
            if !on_layer {
                return PolygonSet::empty();
            }
            Length::ZERO
        } else if layer.is_stop_mask() {
            let side_mask = match placed_side {
                Layer::TopCopper => Layer::TopStopMask,
                _ => Layer::BottomStopMask,
            };
            if !pad.is_tht() && layer != side_mask {
                return PolygonSet::empty();
            }
            pad.stop_mask_offset.unwrap_or(Length::ZERO)
        } else {
            return PolygonSet::empty();
        };
        let grow = extra + offset.len();
        let base = self.pad_shape_area(pad, &tf, tol);
        if grow.is_zero() {
            base
        } else {
            base.offset(grow, tol)
        }
    }

    fn pad_shape_area(&self, pad: &FootprintPad, tf: &Transform, tol: UnsignedLength) -> PolygonSet {
        let min = pad.width.len().min(pad.height.len());
        match &pad.shape {
            PadShape::RoundedRect { corner_radius } => {
                let r = UnsignedLength::new(corner_radius.of(min.half())).unwrap_or_default();
                let p = Path::rounded_rect(pt(0, 0), pad.width, pad.height, r);
                PolygonSet::from_closed_path(&tf.apply_path(&p), tol)
            }
            PadShape::RoundedOctagon { corner_radius } => {
                let p = Path::octagon(pt(0, 0), pad.width, pad.height);
                let set = PolygonSet::from_closed_path(&tf.apply_path(&p), tol);
                // Rounding a convex outline is an opening by the radius;
                // keep strictly inside the inradius so it cannot vanish.
                let r = corner_radius.of(min.half()).min(min.half() - Length::nm(1));
                if r.to_nm() > 0 {
                    set.offset(-r, tol).offset(r, tol)
                } else {
                    set
                }
            }
            PadShape::Stroke { path } => {
                PolygonSet::stroke(&tf.apply_path(path), pad.width, tol)
            }
            PadShape::Custom { outline } => {
                PolygonSet::from_closed_path(&tf.apply_path(outline), tol)
            }
        }
    }

    // Plane copper is whatever rebuild_planes cached; callers ignoring
    // planes (quick mode) skip the call entirely.
    pub fn plane_area(&self, plane: &Plane, layer: Layer, offset: UnsignedLength, tol: UnsignedLength) -> PolygonSet {
        if plane.layer != layer {
            return PolygonSet::empty();
        }
        if offset.is_zero() {
            plane.fragments().clone()
        } else {
            plane.fragments().offset(offset.len(), tol)
        }
    }

    pub fn polygon_area(
        &self,
        poly: &Polygon,
        tf: Option<&Transform>,
        layer: Layer,
        offset: UnsignedLength,
        tol: UnsignedLength,
    ) -> PolygonSet {
        let identity = Transform::identity();
        let tf = tf.unwrap_or(&identity);
        if tf.apply_layer(poly.layer) != layer {
            return PolygonSet::empty();
        }
        let path = tf.apply_path(&poly.path);
        let mut parts = Vec::new();
        if poly.filled && path.is_closed() {
            parts.push(PolygonSet::from_closed_path(&path, tol));
        }
        if let Ok(w) = PositiveLength::new(poly.line_width.len()) {
            parts.push(PolygonSet::stroke(&path, w, tol));
        } else if !poly.filled {
            debug!("unfilled zero-width polygon {}, skipped", poly.uuid);
        }
        let set = PolygonSet::union_all(parts);
        if offset.is_zero() {
            set
        } else {
            set.offset(offset.len(), tol)
        }
    }

    pub fn circle_area(
        &self,
        circle: &Circle,
        tf: Option<&Transform>,
        layer: Layer,
        offset: UnsignedLength,
        tol: UnsignedLength,
    ) -> PolygonSet {
        let identity = Transform::identity();
        let tf = tf.unwrap_or(&identity);
        if tf.apply_layer(circle.layer) != layer {
            return PolygonSet::empty();
        }
        let path = tf.apply_path(&circle.outline());
        let mut parts = Vec::new();
        if circle.filled {
            parts.push(PolygonSet::from_closed_path(&path, tol));
        }
        if let Ok(w) = PositiveLength::new(circle.line_width.len()) {
            parts.push(PolygonSet::stroke(&path, w, tol));
        }
        let set = PolygonSet::union_all(parts);
        if offset.is_zero() {
            set
        } else {
            set.offset(offset.len(), tol)
        }
    }

    // Stroke text copper: the outline strokes of every character path.
    pub fn text_area(
        &self,
        text: &StrokeText,
        tf: Option<&Transform>,
        layer: Layer,
        offset: UnsignedLength,
        tol: UnsignedLength,
    ) -> PolygonSet {
        let identity = Transform::identity();
        let tf = tf.unwrap_or(&identity);
        if tf.apply_layer(text.layer) != layer {
            return PolygonSet::empty();
        }
        let w = PositiveLength::new(text.stroke_width.len() + 2 * offset.len())
            .unwrap_or(text.stroke_width);
        PolygonSet::union_all(
            text.paths.iter().map(|p| PolygonSet::stroke(&tf.apply_path(p), w, tol)).collect(),
        )
    }

    // Drilled area of a hole path: the path stroked at diameter + 2*offset.
    pub fn hole_area(
        &self,
        path: &Path,
        diameter: PositiveLength,
        tf: Option<&Transform>,
        offset: UnsignedLength,
        tol: UnsignedLength,
    ) -> PolygonSet {
        let identity = Transform::identity();
        let tf = tf.unwrap_or(&identity);
        let d = PositiveLength::new(diameter.len() + 2 * offset.len()).unwrap_or(diameter);
        PolygonSet::stroke(&tf.apply_path(path), d, tol)
    }

    // Union of all copper on a layer whose net passes the filter.
    pub fn copper_area(
        &self,
        layer: Layer,
        filter: &NetFilter,
        include_planes: bool,
        tol: UnsignedLength,
    ) -> PolygonSet {
        let mut parts = Vec::new();
        let zero = UnsignedLength::ZERO;
        for seg in self.board.net_segments() {
            if filter.matches(seg.net) {
                for via in &seg.vias {
                    parts.push(self.via_area(via, layer, zero, tol));
                }
                for line in &seg.lines {
                    parts.push(self.net_line_area(seg, line, layer, zero, tol));
                }
            }
        }
        for dev in self.board.devices() {
            let fpt = self.board.footprint(dev.footprint);
            for pad in &fpt.pads {
                if filter.matches(self.board.pad_net(dev, pad)) {
                    parts.push(self.pad_area(dev, pad, layer, zero, tol));
                }
            }
            if filter.matches(None) {
                for poly in &fpt.polygons {
                    parts.push(self.polygon_area(poly, Some(&dev.transform), layer, zero, tol));
                }
                for circle in &fpt.circles {
                    parts.push(self.circle_area(circle, Some(&dev.transform), layer, zero, tol));
                }
                for text in fpt.texts.iter().chain(&dev.texts) {
                    parts.push(self.text_area(text, Some(&dev.transform), layer, zero, tol));
                }
            }
        }
        if include_planes {
            for plane in self.board.planes() {
                if filter.matches(plane.net) {
                    parts.push(self.plane_area(plane, layer, zero, tol));
                }
            }
        }
        if filter.matches(None) {
            for poly in self.board.polygons() {
                parts.push(self.polygon_area(poly, None, layer, zero, tol));
            }
            for text in self.board.stroke_texts() {
                parts.push(self.text_area(text, None, layer, zero, tol));
            }
        }
        PolygonSet::union_all(parts)
    }

    // Filled fragments for one plane: outline minus foreign copper inflated
    // by the plane clearance, opened by the minimum width.
    pub fn plane_fill(&self, plane: &Plane, tol: UnsignedLength) -> PolygonSet {
        let outline = PolygonSet::from_closed_path(&plane.outline, tol);
        if outline.is_empty() {
            debug!("plane {} outline is degenerate, fill is empty", plane.uuid);
            return outline;
        }
        let foreign =
            self.copper_area(plane.layer, &NetFilter::Except(plane.net), false, tol);
        let mut fill = outline;
        if !foreign.is_empty() && !plane.min_clearance.is_zero() {
            fill = fill.subtract(&foreign.offset(plane.min_clearance.len(), tol));
        } else if !foreign.is_empty() {
            fill = fill.subtract(&foreign);
        }
        let half = plane.min_width.len().half();
        if half.to_nm() > 0 {
            fill = fill.offset(-half, tol).offset(half, tol);
        }
        fill
    }

    // All board outline contours: board polygons plus placed footprint
    // polygons on the outline layer.
    pub fn board_outlines(&self) -> Vec<OutlineRef> {
        let mut out = Vec::new();
        for poly in self.board.polygons() {
            if poly.layer == Layer::BoardOutline {
                out.push(OutlineRef { device: None, polygon: poly.uuid, path: poly.path.clone() });
            }
        }
        for dev in self.board.devices() {
            for poly in &self.board.footprint(dev.footprint).polygons {
                if poly.layer == Layer::BoardOutline {
                    out.push(OutlineRef {
                        device: Some(dev.uuid),
                        polygon: poly.uuid,
                        path: dev.transform.apply_path(&poly.path),
                    });
                }
            }
        }
        out
    }

    // Filled union of the closed outline contours.
    pub fn board_area(&self, tol: UnsignedLength) -> PolygonSet {
        PolygonSet::union_all(
            self.board_outlines()
                .iter()
                .filter(|o| o.path.is_closed())
                .map(|o| PolygonSet::from_closed_path(&o.path, tol))
                .collect(),
        )
    }

    // Device courtyard on a courtyard layer.
    pub fn courtyard_area(&self, device: &Device, layer: Layer, tol: UnsignedLength) -> PolygonSet {
        let fpt = self.board.footprint(device.footprint);
        let zero = UnsignedLength::ZERO;
        let mut parts = Vec::new();
        for poly in &fpt.polygons {
            if device.transform.apply_layer(poly.layer) == layer {
                let path = device.transform.apply_path(&poly.path);
                parts.push(PolygonSet::from_closed_path(&path, tol));
                if let Ok(w) = PositiveLength::new(poly.line_width.len()) {
                    parts.push(PolygonSet::stroke(&path, w, tol));
                }
            }
        }
        for circle in &fpt.circles {
            parts.push(self.circle_area(circle, Some(&device.transform), layer, zero, tol));
            if device.transform.apply_layer(circle.layer) == layer && !circle.filled {
                // Courtyards are keep-out areas; an unfilled contour still
                // spans its interior.
                let path = device.transform.apply_path(&circle.outline());
                parts.push(PolygonSet::from_closed_path(&path, tol));
            }
        }
        PolygonSet::union_all(parts)
    }
}

// A board outline contour and where it came from.
#[derive(Debug, Clone)]
pub struct OutlineRef {
    pub device: Option<Uuid>,
    pub polygon: Uuid,
    pub path: Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{pt, MAX_ARC_TOLERANCE};
    use crate::model::device::{Footprint, PadSide};
    use crate::model::net::{NetLineAnchor, NetPoint};

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_via_area_on_layers() {
        let board = BoardModel::new("t", 0);
        let gen = PathGenerator::new(&board);
        let via = Via {
            uuid: uuid(1),
            position: pt(0, 0),
            size: PositiveLength::nm(500_000),
            drill: PositiveLength::nm(300_000),
            stop_mask_offset: Some(Length::nm(50_000)),
        };
        let cu = gen.via_area(&via, Layer::TopCopper, UnsignedLength::ZERO, MAX_ARC_TOLERANCE);
        assert!(cu.contains_point(pt(240_000, 0)));
        assert!(!cu.contains_point(pt(260_000, 0)));
        // Stop mask opening grows by the offset.
        let mask = gen.via_area(&via, Layer::TopStopMask, UnsignedLength::ZERO, MAX_ARC_TOLERANCE);
        assert!(mask.contains_point(pt(290_000, 0)));
        assert!(gen
            .via_area(&via, Layer::TopLegend, UnsignedLength::ZERO, MAX_ARC_TOLERANCE)
            .is_empty());
    }

    #[test]
    fn test_net_line_area() {
        let mut board = BoardModel::new("t", 0);
        let mut seg = NetSegment::new(uuid(1), None);
        seg.points.push(NetPoint { uuid: uuid(2), position: pt(0, 0) });
        seg.points.push(NetPoint { uuid: uuid(3), position: pt(1_000_000, 0) });
        seg.lines.push(NetLine {
            uuid: uuid(4),
            layer: Layer::TopCopper,
            width: PositiveLength::nm(200_000),
            start: NetLineAnchor::Junction(uuid(2)),
            end: NetLineAnchor::Junction(uuid(3)),
        });
        board.add_net_segment(seg);
        let gen = PathGenerator::new(&board);
        let seg = &board.net_segments()[0];
        let line = &seg.lines[0];
        let area =
            gen.net_line_area(seg, line, Layer::TopCopper, UnsignedLength::ZERO, MAX_ARC_TOLERANCE);
        assert!(area.contains_point(pt(500_000, 0)));
        assert!(area.contains_point(pt(500_000, 90_000)));
        assert!(!area.contains_point(pt(500_000, 110_000)));
        assert!(gen
            .net_line_area(seg, line, Layer::BottomCopper, UnsignedLength::ZERO, MAX_ARC_TOLERANCE)
            .is_empty());
    }

    fn board_with_two_vias() -> BoardModel {
        let mut board = BoardModel::new("t", 0);
        for (n, net, x) in [(1u128, uuid(0xA), 0i64), (2, uuid(0xB), 2_000_000)] {
            let mut seg = NetSegment::new(uuid(n), Some(net));
            seg.vias.push(Via {
                uuid: uuid(n * 16),
                position: pt(x, 0),
                size: PositiveLength::nm(500_000),
                drill: PositiveLength::nm(300_000),
                stop_mask_offset: None,
            });
            board.add_net_segment(seg);
        }
        board
    }

    #[test]
    fn test_copper_area_net_filters() {
        let board = board_with_two_vias();
        let gen = PathGenerator::new(&board);
        let tol = MAX_ARC_TOLERANCE;
        let all = gen.copper_area(Layer::TopCopper, &NetFilter::Any, false, tol);
        assert!(all.contains_point(pt(0, 0)));
        assert!(all.contains_point(pt(2_000_000, 0)));
        // An empty net set is unrestricted.
        let unrestricted =
            gen.copper_area(Layer::TopCopper, &NetFilter::Only(BTreeSet::new()), false, tol);
        assert!((unrestricted.area() - all.area()).abs() < 1.0);
        let only_a = gen.copper_area(
            Layer::TopCopper,
            &NetFilter::Only([Some(uuid(0xA))].into_iter().collect()),
            false,
            tol,
        );
        assert!(only_a.contains_point(pt(0, 0)));
        assert!(!only_a.contains_point(pt(2_000_000, 0)));
        let except_a =
            gen.copper_area(Layer::TopCopper, &NetFilter::Except(Some(uuid(0xA))), false, tol);
        assert!(!except_a.contains_point(pt(0, 0)));
        assert!(except_a.contains_point(pt(2_000_000, 0)));
    }

    #[test]
    fn test_plane_fill_keeps_clearance_to_foreign_copper() {
        let mut board = board_with_two_vias();
        let outline = Path::from_points(&[
            pt(-1_000_000, -1_000_000),
            pt(3_000_000, -1_000_000),
            pt(3_000_000, 1_000_000),
            pt(-1_000_000, 1_000_000),
            pt(-1_000_000, -1_000_000),
        ]);
        board.add_plane(Plane::new(
            uuid(5),
            Layer::TopCopper,
            Some(uuid(0xA)),
            outline,
            UnsignedLength::nm(200_000),
            UnsignedLength::nm(200_000),
        ));
        let gen = PathGenerator::new(&board);
        let fill = gen.plane_fill(&board.planes()[0], MAX_ARC_TOLERANCE);
        // Same-net via stays covered, the foreign via is cut out with its
        // clearance.
        assert!(fill.contains_point(pt(0, 0)));
        assert!(!fill.contains_point(pt(2_000_000, 0)));
        assert!(!fill.contains_point(pt(2_000_000, 400_000)));
        assert!(fill.contains_point(pt(2_000_000, 900_000)));
    }

    #[test]
    fn test_pad_shapes() {
        let mut board = BoardModel::new("t", 0);
        let mut fpt = Footprint::new(uuid(1), "f");
        fpt.pads.push(FootprintPad {
            uuid: uuid(2),
            position: pt(0, 0),
            rotation: crate::geom::units::Angle::ZERO,
            width: PositiveLength::nm(2_000_000),
            height: PositiveLength::nm(1_000_000),
            shape: PadShape::RoundedRect {
                corner_radius: crate::geom::units::LimitedRatio::ppm(1_000_000),
            },
            side: PadSide::Top,
            holes: Vec::new(),
            stop_mask_offset: None,
            signal: None,
        });
        let id = board.add_footprint(fpt);
        board.add_device(Device {
            uuid: uuid(3),
            component: uuid(4),
            library_device: uuid(5),
            footprint: id,
            transform: Transform::identity(),
            texts: Vec::new(),
        });
        let gen = PathGenerator::new(&board);
        let dev = &board.devices()[0];
        let pad = &board.footprint(dev.footprint).pads[0];
        let tol = MAX_ARC_TOLERANCE;
        let area = gen.pad_area(dev, pad, Layer::TopCopper, UnsignedLength::ZERO, tol);
        // Full rounding turns the rect into an obround: the sharp corner
        // region is gone, the flat middle stays.
        assert!(area.contains_point(pt(0, 0)));
        assert!(area.contains_point(pt(900_000, 0)));
        assert!(!area.contains_point(pt(980_000, 480_000)));
        // SMT pads do not exist on the other side.
        assert!(gen
            .pad_area(dev, pad, Layer::BottomCopper, UnsignedLength::ZERO, tol)
            .is_empty());
    }
}
