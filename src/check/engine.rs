use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use itertools::Itertools;
use log::debug;
use uuid::Uuid;

use crate::check::msg::{marker, CheckMessage, NetTag, ObjectKind, ObjectRef};
use crate::check::report::{CancelToken, Reporter};
use crate::check::{BoardCheck, RunOutcome, Settings, CHECK_ORDER, QUICK_CHECKS};
use crate::err::Result;
use crate::geom::path::Path;
use crate::geom::polygon::PolygonSet;
use crate::geom::units::{Length, PositiveLength, UnsignedLength};
use crate::geom::MAX_ARC_TOLERANCE;
use crate::model::board::BoardModel;
use crate::model::graphics::classify_slot;
use crate::model::layer::Layer;
use crate::model::net::NetLineAnchor;
use crate::model::pathgen::PathGenerator;

// The design rule check suite. Runs the checks in a fixed order against a
// board model; everything it emits is deterministic for a given model and
// settings, including the approval keys.
#[derive(Debug, Clone)]
pub struct DesignRuleCheck {
    settings: Settings,
    quick: bool,
}

impl DesignRuleCheck {
    pub fn new(settings: Settings, quick: bool) -> Self {
        Self { settings, quick }
    }

    pub fn run(
        &self,
        board: &mut BoardModel,
        cancel: &CancelToken,
        reporter: &mut dyn Reporter,
    ) -> Result<RunOutcome> {
        reporter.started();
        if !self.quick {
            // The only model mutations of a run, done up front so the
            // checks see one consistent snapshot.
            board.rebuild_planes();
            board.force_air_wires_rebuild();
        }
        let mut run = Run {
            board: &*board,
            settings: &self.settings,
            quick: self.quick,
            reporter: &mut *reporter,
            msgs: Vec::new(),
            status_log: Vec::new(),
            progress: 0,
            copper_cache: BTreeMap::new(),
            items: None,
        };
        run.progress(2);
        let mut cancelled = false;
        for check in CHECK_ORDER {
            if self.quick && !QUICK_CHECKS.contains(check) {
                continue;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if !self.enabled(check) {
                continue;
            }
            run.status(check.status_text());
            run.execute(check);
            run.progress(check.progress_target());
        }
        if !cancelled {
            run.progress(95);
            run.progress(97);
            run.progress(100);
        }
        let outcome =
            RunOutcome { messages: run.msgs, cancelled, status_log: run.status_log };
        reporter.finished(cancelled);
        Ok(outcome)
    }

    // A zero minimum disables its check entirely.
    fn enabled(&self, check: BoardCheck) -> bool {
        let s = &self.settings;
        match check {
            BoardCheck::CopperWidth => !s.min_copper_width.is_zero(),
            BoardCheck::CopperCopperClearance => !s.min_copper_copper_clearance.is_zero(),
            BoardCheck::CopperBoardClearance => !s.min_copper_board_clearance.is_zero(),
            BoardCheck::CopperHoleClearance => !s.min_copper_npth_clearance.is_zero(),
            BoardCheck::DrillDrillClearance => !s.min_drill_drill_clearance.is_zero(),
            BoardCheck::DrillBoardClearance => !s.min_drill_board_clearance.is_zero(),
            BoardCheck::AnnularRing => !s.min_pth_annular_ring.is_zero(),
            BoardCheck::DrillDiameter => {
                !s.min_npth_drill_diameter.is_zero() || !s.min_pth_drill_diameter.is_zero()
            }
            BoardCheck::SlotWidth => {
                !s.min_npth_slot_width.is_zero() || !s.min_pth_slot_width.is_zero()
            }
            _ => true,
        }
    }
}

// One copper feature on one layer.
#[derive(Debug, Clone)]
struct CopperItem {
    obj: ObjectRef,
    net: Option<Uuid>,
    layer: Layer,
    area: Rc<PolygonSet>,
}

// One drill, with its path already in board coordinates.
#[derive(Debug, Clone)]
struct DrillItem {
    owner: ObjectRef,
    hole: Uuid,
    path: Path,
    diameter: PositiveLength,
    pth: bool,
}

struct Run<'a> {
    board: &'a BoardModel,
    settings: &'a Settings,
    quick: bool,
    reporter: &'a mut dyn Reporter,
    msgs: Vec<CheckMessage>,
    status_log: Vec<String>,
    progress: u8,
    copper_cache: BTreeMap<(Layer, bool), Rc<PolygonSet>>,
    items: Option<Rc<Vec<CopperItem>>>,
}

impl<'a> Run<'a> {
    fn execute(&mut self, check: BoardCheck) {
        match check {
            BoardCheck::CopperWidth => self.check_copper_width(),
            BoardCheck::CopperCopperClearance => self.check_copper_copper_clearance(),
            BoardCheck::CopperBoardClearance => self.check_copper_board_clearance(),
            BoardCheck::CopperHoleClearance => self.check_copper_hole_clearance(),
            BoardCheck::DrillDrillClearance => self.check_drill_drill_clearance(),
            BoardCheck::DrillBoardClearance => self.check_drill_board_clearance(),
            BoardCheck::AnnularRing => self.check_annular_ring(),
            BoardCheck::DrillDiameter => self.check_drill_diameter(),
            BoardCheck::SlotWidth => self.check_slot_width(),
            BoardCheck::AllowedSlots => self.check_allowed_slots(),
            BoardCheck::PadConnection => self.check_pad_connections(),
            BoardCheck::CourtyardClearance => self.check_courtyard_clearances(),
            BoardCheck::BoardOutline => self.check_board_outline(),
            BoardCheck::UnplacedComponents => self.check_unplaced_components(),
            BoardCheck::DefaultDevices => self.check_default_devices(),
            BoardCheck::MissingConnections => self.check_missing_connections(),
            BoardCheck::StaleObjects => self.check_stale_objects(),
        }
    }

    fn progress(&mut self, pct: u8) {
        if pct > self.progress {
            self.progress = pct;
            self.reporter.progress(pct);
        }
    }

    fn status(&mut self, text: &str) {
        self.status_log.push(text.to_string());
        self.reporter.status(text);
    }

    fn emit(&mut self, msg: CheckMessage) {
        self.reporter.message(&msg);
        self.msgs.push(msg);
    }

    // Tied to the board borrow, not to self, so geometry generation can
    // interleave with message emission.
    fn gen(&self) -> PathGenerator<'a> {
        PathGenerator::new(self.board)
    }

    fn net_tag(&self, net: Option<Uuid>) -> NetTag {
        NetTag { uuid: net, name: net.map(|n| self.board.net_name(n)).unwrap_or_default() }
    }

    // Every copper feature, one entry per (feature, layer), in a fixed
    // visit order. Computed once per run.
    fn copper_items(&mut self) -> Rc<Vec<CopperItem>> {
        if let Some(items) = &self.items {
            return Rc::clone(items);
        }
        let board = self.board;
        let gen = self.gen();
        let tol = MAX_ARC_TOLERANCE;
        let zero = UnsignedLength::ZERO;
        let mut out = Vec::new();
        let mut push = |obj: ObjectRef, net: Option<Uuid>, layer: Layer, area: PolygonSet| {
            if !area.is_empty() {
                out.push(CopperItem { obj, net, layer, area: Rc::new(area) });
            }
        };
        for layer in board.copper_layers() {
            for seg in board.net_segments() {
                for via in &seg.vias {
                    let obj = ObjectRef::new(ObjectKind::Via, via.uuid);
                    push(obj, seg.net, layer, gen.via_area(via, layer, zero, tol));
                }
                for line in &seg.lines {
                    let obj = ObjectRef::new(ObjectKind::NetLine, line.uuid);
                    push(obj, seg.net, layer, gen.net_line_area(seg, line, layer, zero, tol));
                }
            }
            for dev in board.devices() {
                let fpt = board.footprint(dev.footprint);
                for pad in &fpt.pads {
                    let obj = ObjectRef::in_device(ObjectKind::Pad, pad.uuid, dev.uuid);
                    let net = board.pad_net(dev, pad);
                    push(obj, net, layer, gen.pad_area(dev, pad, layer, zero, tol));
                }
                for poly in &fpt.polygons {
                    let obj = ObjectRef::in_device(ObjectKind::Polygon, poly.uuid, dev.uuid);
                    let area = gen.polygon_area(poly, Some(&dev.transform), layer, zero, tol);
                    push(obj, None, layer, area);
                }
                for circle in &fpt.circles {
                    let obj = ObjectRef::in_device(ObjectKind::Circle, circle.uuid, dev.uuid);
                    let area = gen.circle_area(circle, Some(&dev.transform), layer, zero, tol);
                    push(obj, None, layer, area);
                }
                for text in fpt.texts.iter().chain(&dev.texts) {
                    let obj = ObjectRef::in_device(ObjectKind::StrokeText, text.uuid, dev.uuid);
                    let area = gen.text_area(text, Some(&dev.transform), layer, zero, tol);
                    push(obj, None, layer, area);
                }
            }
            if !self.quick {
                for plane in board.planes() {
                    let obj = ObjectRef::new(ObjectKind::Plane, plane.uuid);
                    push(obj, plane.net, layer, gen.plane_area(plane, layer, zero, tol));
                }
            }
            for poly in board.polygons() {
                let obj = ObjectRef::new(ObjectKind::Polygon, poly.uuid);
                push(obj, None, layer, gen.polygon_area(poly, None, layer, zero, tol));
            }
            for text in board.stroke_texts() {
                let obj = ObjectRef::new(ObjectKind::StrokeText, text.uuid);
                push(obj, None, layer, gen.text_area(text, None, layer, zero, tol));
            }
        }
        let rc = Rc::new(out);
        self.items = Some(Rc::clone(&rc));
        rc
    }

    fn copper_union(&mut self, layer: Layer, include_planes: bool) -> Rc<PolygonSet> {
        if let Some(u) = self.copper_cache.get(&(layer, include_planes)) {
            return Rc::clone(u);
        }
        let items = self.copper_items();
        let sets = items
            .iter()
            .filter(|i| {
                i.layer == layer && (include_planes || i.obj.kind != ObjectKind::Plane)
            })
            .map(|i| (*i.area).clone())
            .collect();
        let u = Rc::new(PolygonSet::union_all(sets));
        self.copper_cache.insert((layer, include_planes), Rc::clone(&u));
        u
    }

    // Every drill on the board: via drills, plated pad holes, non-plated
    // footprint and board holes.
    fn drill_items(&self) -> Vec<DrillItem> {
        let board = self.board;
        let mut out = Vec::new();
        for seg in board.net_segments() {
            for via in &seg.vias {
                out.push(DrillItem {
                    owner: ObjectRef::new(ObjectKind::Via, via.uuid),
                    hole: via.uuid,
                    path: via.drill_path(),
                    diameter: via.drill,
                    pth: true,
                });
            }
        }
        for dev in board.devices() {
            let fpt = board.footprint(dev.footprint);
            for pad in &fpt.pads {
                let tf = board.pad_transform(dev, pad);
                for hole in &pad.holes {
                    out.push(DrillItem {
                        owner: ObjectRef::in_device(ObjectKind::Pad, pad.uuid, dev.uuid),
                        hole: hole.uuid,
                        path: tf.apply_path(&hole.path),
                        diameter: hole.diameter,
                        pth: true,
                    });
                }
            }
            for hole in &fpt.holes {
                out.push(DrillItem {
                    owner: ObjectRef::in_device(ObjectKind::Hole, hole.uuid, dev.uuid),
                    hole: hole.uuid,
                    path: dev.transform.apply_path(&hole.path),
                    diameter: hole.diameter,
                    pth: false,
                });
            }
        }
        for hole in board.holes() {
            out.push(DrillItem {
                owner: ObjectRef::new(ObjectKind::Hole, hole.uuid),
                hole: hole.uuid,
                path: hole.path.clone(),
                diameter: hole.diameter,
                pth: false,
            });
        }
        out
    }

    // Forbidden area along the board outline, total width w.
    fn edge_band(&self, w: Length) -> PolygonSet {
        let Ok(w) = PositiveLength::new(w) else { return PolygonSet::empty() };
        let tol = MAX_ARC_TOLERANCE;
        let gen = self.gen();
        PolygonSet::union_all(
            gen.board_outlines().iter().map(|o| PolygonSet::stroke(&o.path, w, tol)).collect(),
        )
    }

    // Check 1: minimum copper width of stroke texts, planes and traces.
    fn check_copper_width(&mut self) {
        let min = self.settings.min_copper_width;
        let tol = MAX_ARC_TOLERANCE;
        let board = self.board;
        for text in board.stroke_texts() {
            if text.layer.is_copper() && text.stroke_width.len() < min.len() {
                let obj = ObjectRef::new(ObjectKind::StrokeText, text.uuid);
                let locations = text
                    .paths
                    .iter()
                    .flat_map(|p| p.to_outline_strokes(text.stroke_width, tol))
                    .collect();
                self.emit(CheckMessage::minimum_width_violation(
                    &obj,
                    text.stroke_width.len(),
                    min,
                    locations,
                ));
            }
        }
        for plane in board.planes() {
            if plane.min_width.len() < min.len() {
                let obj = ObjectRef::new(ObjectKind::Plane, plane.uuid);
                self.emit(CheckMessage::minimum_width_violation(
                    &obj,
                    plane.min_width.len(),
                    min,
                    vec![plane.outline.clone()],
                ));
            }
        }
        for seg in board.net_segments() {
            for line in &seg.lines {
                if line.width.len() >= min.len() {
                    continue;
                }
                let (Some(a), Some(b)) = (
                    board.anchor_position(seg, line.start),
                    board.anchor_position(seg, line.end),
                ) else {
                    debug!("net line {} has dangling anchors, skipped", line.uuid);
                    continue;
                };
                let obj = ObjectRef::new(ObjectKind::NetLine, line.uuid);
                let locations = Path::line(a, b).to_outline_strokes(line.width, tol);
                self.emit(CheckMessage::minimum_width_violation(
                    &obj,
                    line.width.len(),
                    min,
                    locations,
                ));
            }
        }
        for dev in board.devices() {
            let fpt = board.footprint(dev.footprint);
            for text in fpt.texts.iter().chain(&dev.texts) {
                let layer = dev.transform.apply_layer(text.layer);
                if layer.is_copper() && text.stroke_width.len() < min.len() {
                    let obj = ObjectRef::in_device(ObjectKind::StrokeText, text.uuid, dev.uuid);
                    let locations = text
                        .paths
                        .iter()
                        .map(|p| dev.transform.apply_path(p))
                        .flat_map(|p| p.to_outline_strokes(text.stroke_width, tol))
                        .collect();
                    self.emit(CheckMessage::minimum_width_violation(
                        &obj,
                        text.stroke_width.len(),
                        min,
                        locations,
                    ));
                }
            }
        }
    }

    // Check 2: clearance between copper features of different nets. Each
    // feature is inflated by half the clearance (minus the shared arc
    // tolerance and one nanometre) so touching inflations mean a real
    // violation.
    fn check_copper_copper_clearance(&mut self) {
        let c = self.settings.min_copper_copper_clearance;
        let tol = MAX_ARC_TOLERANCE;
        let delta = Length::nm((((c.to_nm() - tol.to_nm()) / 2) - 1).max(0));
        let items = self.copper_items();
        self.progress(14);
        for layer in self.board.copper_layers() {
            let layer_items: Vec<&CopperItem> =
                items.iter().filter(|i| i.layer == layer).collect();
            let inflated: Vec<PolygonSet> =
                layer_items.iter().map(|i| i.area.offset(delta, tol)).collect();
            for (i, j) in (0..layer_items.len()).tuple_combinations() {
                let (a, b) = (layer_items[i], layer_items[j]);
                if let (Some(na), Some(nb)) = (a.net, b.net) {
                    if na == nb {
                        continue;
                    }
                }
                let overlap = inflated[i].intersect(&inflated[j]);
                if !overlap.is_empty() {
                    let msg = CheckMessage::copper_copper_clearance_violation(
                        layer,
                        &a.obj,
                        &self.net_tag(a.net),
                        &b.obj,
                        &self.net_tag(b.net),
                        c,
                        overlap.outlines(),
                    );
                    self.emit(msg);
                }
            }
        }
    }

    // Check 3: copper distance to the board outline.
    fn check_copper_board_clearance(&mut self) {
        let c = self.settings.min_copper_board_clearance;
        let tol = MAX_ARC_TOLERANCE;
        let band = self.edge_band(2 * c.len() - tol.len() - Length::nm(1));
        if band.is_empty() {
            return;
        }
        let items = self.copper_items();
        let mut seen: BTreeSet<ObjectRef> = BTreeSet::new();
        for item in items.iter() {
            if !seen.insert(item.obj.clone()) {
                continue;
            }
            let total = PolygonSet::union_all(
                items
                    .iter()
                    .filter(|i| i.obj == item.obj)
                    .map(|i| (*i.area).clone())
                    .collect(),
            );
            let overlap = total.intersect(&band);
            if !overlap.is_empty() {
                let msg = CheckMessage::copper_board_clearance_violation(
                    &item.obj,
                    c,
                    overlap.outlines(),
                );
                self.emit(msg);
            }
        }
    }

    // Check 4: copper distance to non-plated holes, on any copper layer.
    fn check_copper_hole_clearance(&mut self) {
        let c = self.settings.min_copper_npth_clearance;
        let tol = MAX_ARC_TOLERANCE;
        let delta = UnsignedLength::nm((c.to_nm() - tol.to_nm() - 1).max(0));
        let layers = self.board.copper_layers();
        let include_planes = !self.quick;
        let copper = PolygonSet::union_all(
            layers.iter().map(|&l| (*self.copper_union(l, include_planes)).clone()).collect(),
        );
        if copper.is_empty() {
            return;
        }
        let gen = self.gen();
        for drill in self.drill_items().iter().filter(|d| !d.pth) {
            let area = gen.hole_area(&drill.path, drill.diameter, None, delta, tol);
            let overlap = area.intersect(&copper);
            if !overlap.is_empty() {
                let msg = CheckMessage::copper_hole_clearance_violation(
                    &drill.owner,
                    drill.hole,
                    c,
                    overlap.outlines(),
                );
                self.emit(msg);
            }
        }
    }

    // Check 5: drill to drill distance. The inflation grows the diameter,
    // so each drill carries half the clearance.
    fn check_drill_drill_clearance(&mut self) {
        let c = self.settings.min_drill_drill_clearance;
        let tol = MAX_ARC_TOLERANCE;
        let growth = (c.to_nm() - tol.to_nm() - 1).max(0);
        let delta = UnsignedLength::nm(growth / 2);
        let gen = self.gen();
        let drills = self.drill_items();
        let areas: Vec<PolygonSet> = drills
            .iter()
            .map(|d| gen.hole_area(&d.path, d.diameter, None, delta, tol))
            .collect();
        for (i, j) in (0..drills.len()).tuple_combinations() {
            let overlap = areas[i].intersect(&areas[j]);
            if !overlap.is_empty() {
                let (a, b) = (&drills[i], &drills[j]);
                let msg = CheckMessage::drill_drill_clearance_violation(
                    &a.owner,
                    a.hole,
                    &b.owner,
                    b.hole,
                    c,
                    overlap.outlines(),
                );
                self.emit(msg);
            }
        }
    }

    // Check 6: drill distance to the board outline.
    fn check_drill_board_clearance(&mut self) {
        let c = self.settings.min_drill_board_clearance;
        let tol = MAX_ARC_TOLERANCE;
        let band = self.edge_band(2 * c.len() - tol.len() - Length::nm(1));
        if band.is_empty() {
            return;
        }
        let gen = self.gen();
        for drill in &self.drill_items() {
            let area = gen.hole_area(&drill.path, drill.diameter, None, UnsignedLength::ZERO, tol);
            let overlap = area.intersect(&band);
            if !overlap.is_empty() {
                let msg = CheckMessage::drill_board_clearance_violation(
                    &drill.owner,
                    drill.hole,
                    c,
                    overlap.outlines(),
                );
                self.emit(msg);
            }
        }
    }

    // Check 7: plated holes must keep their own annular ring on every
    // copper layer. Plane fragments do not count: pour connection styles
    // (thermal spokes) make them an unreliable substitute for the ring.
    fn check_annular_ring(&mut self) {
        let ring = self.settings.min_pth_annular_ring;
        let tol = MAX_ARC_TOLERANCE;
        let delta = UnsignedLength::nm((ring.to_nm() - tol.to_nm() - 1).max(0));
        let layers = self.board.copper_layers();
        let mut common: Option<PolygonSet> = None;
        for layer in layers {
            let u = (*self.copper_union(layer, false)).clone();
            common = Some(match common {
                None => u,
                Some(c) => c.intersect(&u),
            });
        }
        let common = common.unwrap_or_default();
        let gen = self.gen();
        for drill in self.drill_items().iter().filter(|d| d.pth) {
            let inflated = gen.hole_area(&drill.path, drill.diameter, None, delta, tol);
            let uncovered = inflated.subtract(&common);
            if !uncovered.is_empty() {
                let msg = CheckMessage::minimum_annular_ring_violation(
                    &drill.owner,
                    ring,
                    uncovered.outlines(),
                );
                self.emit(msg);
            }
        }
    }

    // Check 8: minimum drill diameters for round holes.
    fn check_drill_diameter(&mut self) {
        let tol = MAX_ARC_TOLERANCE;
        let gen = self.gen();
        for drill in &self.drill_items() {
            if !drill.path.is_single_point() {
                continue;
            }
            let min = if drill.pth {
                self.settings.min_pth_drill_diameter
            } else {
                self.settings.min_npth_drill_diameter
            };
            if min.is_zero() || drill.diameter.len() >= min.len() {
                continue;
            }
            let area = gen.hole_area(&drill.path, drill.diameter, None, UnsignedLength::ZERO, tol);
            let msg = CheckMessage::minimum_drill_diameter_violation(
                &drill.owner,
                drill.hole,
                drill.diameter,
                min,
                area.outlines(),
            );
            self.emit(msg);
        }
    }

    // Check 9: minimum slot widths; a slot's width is its drill diameter.
    fn check_slot_width(&mut self) {
        let tol = MAX_ARC_TOLERANCE;
        let gen = self.gen();
        for drill in &self.drill_items() {
            if drill.path.is_single_point() {
                continue;
            }
            let min = if drill.pth {
                self.settings.min_pth_slot_width
            } else {
                self.settings.min_npth_slot_width
            };
            if min.is_zero() || drill.diameter.len() >= min.len() {
                continue;
            }
            let area = gen.hole_area(&drill.path, drill.diameter, None, UnsignedLength::ZERO, tol);
            let msg = CheckMessage::minimum_slot_width_violation(
                &drill.owner,
                drill.hole,
                drill.diameter,
                min,
                area.outlines(),
            );
            self.emit(msg);
        }
    }

    // Check 10: slot shapes beyond what the settings allow.
    fn check_allowed_slots(&mut self) {
        let tol = MAX_ARC_TOLERANCE;
        let gen = self.gen();
        for drill in &self.drill_items() {
            let allowance = if drill.pth {
                self.settings.allowed_pth_slots
            } else {
                self.settings.allowed_npth_slots
            };
            let slot = classify_slot(&drill.path);
            if allowance.allows(slot) {
                continue;
            }
            let area = gen.hole_area(&drill.path, drill.diameter, None, UnsignedLength::ZERO, tol);
            let msg =
                CheckMessage::forbidden_slot(&drill.owner, drill.hole, slot, area.outlines());
            self.emit(msg);
        }
    }

    // Check 11: a pad with an attached trace must have copper at its
    // origin on the trace's layer.
    fn check_pad_connections(&mut self) {
        let tol = MAX_ARC_TOLERANCE;
        let board = self.board;
        let gen = self.gen();
        let mut seen: BTreeSet<(Uuid, Uuid, Layer)> = BTreeSet::new();
        for seg in board.net_segments() {
            for line in &seg.lines {
                for anchor in [line.start, line.end] {
                    let NetLineAnchor::Pad { device, pad } = anchor else { continue };
                    if !seen.insert((device, pad, line.layer)) {
                        continue;
                    }
                    let Some(dev) = board.devices().iter().find(|d| d.uuid == device) else {
                        debug!("net line {} references unknown device", line.uuid);
                        continue;
                    };
                    let Some(padref) = board.footprint(dev.footprint).pad(pad) else {
                        debug!("net line {} references unknown pad", line.uuid);
                        continue;
                    };
                    let area = gen.pad_area(dev, padref, line.layer, UnsignedLength::ZERO, tol);
                    let origin = board.pad_transform(dev, padref).position;
                    if area.contains_point(origin) {
                        continue;
                    }
                    let locations = if area.is_empty() {
                        vec![marker(origin)]
                    } else {
                        area.outlines()
                    };
                    self.emit(CheckMessage::invalid_pad_connection(
                        device, pad, line.layer, locations,
                    ));
                }
            }
        }
    }

    // Check 12: courtyard overlaps per courtyard layer.
    fn check_courtyard_clearances(&mut self) {
        let tol = MAX_ARC_TOLERANCE;
        let gen = self.gen();
        for layer in [Layer::TopCourtyard, Layer::BottomCourtyard] {
            let areas: Vec<(Uuid, PolygonSet)> = self
                .board
                .devices()
                .iter()
                .map(|d| (d.uuid, gen.courtyard_area(d, layer, tol)))
                .filter(|(_, a)| !a.is_empty())
                .collect();
            for (i, j) in (0..areas.len()).tuple_combinations() {
                let overlap = areas[i].1.intersect(&areas[j].1);
                if !overlap.is_empty() {
                    let msg = CheckMessage::courtyard_overlap(
                        areas[i].0,
                        areas[j].0,
                        overlap.outlines(),
                    );
                    self.emit(msg);
                }
            }
        }
    }

    // Check 13: outline presence, closure, count and inner corner radii.
    fn check_board_outline(&mut self) {
        let tol = MAX_ARC_TOLERANCE;
        let gen = self.gen();
        let outlines = gen.board_outlines();
        for o in &outlines {
            if !o.path.is_closed() {
                let msg = CheckMessage::open_board_outline_polygon(
                    o.device,
                    o.polygon,
                    vec![o.path.clone()],
                );
                self.emit(msg);
            }
        }
        let area = gen.board_area(tol);
        if area.is_empty() {
            self.emit(CheckMessage::missing_board_outline());
            return;
        }
        if area.region_count() > 1 {
            self.emit(CheckMessage::multiple_board_outlines(area.outlines()));
        }
        let tool = self.settings.min_outline_tool_diameter;
        let r = tool.len().half();
        if r > tol.len() {
            // Morphological closing with the tool radius; any residue is a
            // corner the tool cannot cut.
            let closed = area.offset(r - tol.len(), tol).offset(-r, tol);
            let residue = closed.subtract(&area);
            if !residue.is_empty() {
                self.emit(CheckMessage::minimum_board_outline_inner_radius_violation(
                    residue.outlines(),
                ));
            }
        }
    }

    // Check 14: components of the circuit without a device on the board.
    fn check_unplaced_components(&mut self) {
        let board = self.board;
        for inst in board.project().circuit().component_instances() {
            if inst.schematic_only {
                continue;
            }
            if board.device_instance_by_component_uuid(inst.uuid).is_none() {
                self.emit(CheckMessage::missing_device(inst.uuid, &inst.name));
            }
        }
    }

    // Check 15: placed devices differing from the chosen default device.
    fn check_default_devices(&mut self) {
        let board = self.board;
        for inst in board.project().circuit().component_instances() {
            let Some(dev) = board.device_instance_by_component_uuid(inst.uuid) else {
                continue;
            };
            if let Some(default) = inst.default_device {
                if default != dev.library_device {
                    self.emit(CheckMessage::default_device_mismatch(inst.uuid, &inst.name));
                }
            }
        }
    }

    // Check 16: remaining air wires are missing connections.
    fn check_missing_connections(&mut self) {
        let board = self.board;
        for wire in board.air_wires() {
            let msg =
                CheckMessage::missing_connection(&self.net_tag(wire.net), wire.from, wire.to);
            self.emit(msg);
        }
    }

    // Check 17: stale net segments and junctions.
    fn check_stale_objects(&mut self) {
        let board = self.board;
        for seg in board.net_segments() {
            if seg.is_empty() {
                self.emit(CheckMessage::empty_net_segment(seg.uuid, &self.net_tag(seg.net)));
                continue;
            }
            let stale: Vec<_> =
                seg.unconnected_points().map(|p| (p.uuid, p.position)).collect();
            for (uuid, position) in stale {
                self.emit(CheckMessage::unconnected_junction(
                    uuid,
                    &self.net_tag(seg.net),
                    position,
                ));
            }
        }
    }
}
