use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::geom::path::Path;
use crate::geom::point::Point;
use crate::geom::units::{Length, PositiveLength, UnsignedLength};
use crate::model::graphics::SlotKind;
use crate::model::layer::Layer;
use crate::sexpr::Sexpr;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

// What kind of board object a message refers to; the display names are the
// node names inside approval keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    Via,
    NetLine,
    NetSegment,
    NetPoint,
    Pad,
    Plane,
    Polygon,
    Circle,
    StrokeText,
    Hole,
    Device,
}

// Stable reference to a board object, with the owning device where the
// object lives inside a placed footprint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub uuid: Uuid,
    pub device: Option<Uuid>,
}

impl ObjectRef {
    pub const fn new(kind: ObjectKind, uuid: Uuid) -> Self {
        Self { kind, uuid, device: None }
    }

    pub const fn in_device(kind: ObjectKind, uuid: Uuid, device: Uuid) -> Self {
        Self { kind, uuid, device: Some(device) }
    }

    // Approval key fragments: the owning device first, then the object.
    pub fn key_nodes(&self) -> Vec<Sexpr> {
        let mut nodes = Vec::with_capacity(2);
        if let Some(device) = self.device {
            nodes.push(Sexpr::entry("device", device));
        }
        nodes.push(Sexpr::entry(&self.kind.to_string(), self.uuid));
        nodes
    }

    fn key_node_wrapped(&self, name: &str, extra: Option<Uuid>) -> Sexpr {
        let mut node = Sexpr::node(name).with_nodes(self.key_nodes());
        if let Some(hole) = extra {
            node = node.with_node(Sexpr::entry("hole", hole));
        }
        node
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ObjectKind::Via => write!(f, "via"),
            ObjectKind::NetLine => write!(f, "trace"),
            ObjectKind::NetSegment => write!(f, "net segment"),
            ObjectKind::NetPoint => write!(f, "junction"),
            ObjectKind::Pad => write!(f, "pad"),
            ObjectKind::Plane => write!(f, "plane"),
            ObjectKind::Polygon => write!(f, "polygon"),
            ObjectKind::Circle => write!(f, "circle"),
            ObjectKind::StrokeText => write!(f, "stroke text"),
            ObjectKind::Hole => write!(f, "hole"),
            ObjectKind::Device => write!(f, "device"),
        }
    }
}

// Net identity for message texts and keys: the uuid is the stable part,
// the name the human part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetTag {
    pub uuid: Option<Uuid>,
    pub name: String,
}

impl NetTag {
    pub fn none() -> Self {
        Self { uuid: None, name: String::new() }
    }

    fn key_atom(&self) -> String {
        self.uuid.map_or_else(|| "none".to_string(), |u| u.to_string())
    }

    fn label(&self) -> String {
        if self.name.is_empty() {
            "no net".to_string()
        } else {
            format!("net '{}'", self.name)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    MinimumWidthViolation,
    CopperCopperClearanceViolation,
    CopperBoardClearanceViolation,
    CopperHoleClearanceViolation,
    DrillDrillClearanceViolation,
    DrillBoardClearanceViolation,
    MinimumAnnularRingViolation,
    MinimumDrillDiameterViolation,
    MinimumSlotWidthViolation,
    ForbiddenSlot,
    InvalidPadConnection,
    CourtyardOverlap,
    OpenBoardOutlinePolygon,
    MissingBoardOutline,
    MultipleBoardOutlines,
    MinimumBoardOutlineInnerRadiusViolation,
    MissingDevice,
    DefaultDeviceMismatch,
    MissingConnection,
    EmptyNetSegment,
    UnconnectedJunction,
}

#[derive(Debug)]
struct MessageData {
    kind: MessageKind,
    severity: Severity,
    message: String,
    description: String,
    approval: Sexpr,
    locations: Vec<Path>,
}

// One rule violation. Immutable after construction and cheap to clone;
// location paths are values, detached from the model they came from.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    inner: Arc<MessageData>,
}

impl CheckMessage {
    fn build(
        kind: MessageKind,
        severity: Severity,
        message: String,
        description: &str,
        nodes: Vec<Sexpr>,
        locations: Vec<Path>,
    ) -> Self {
        let approval = Sexpr::node("approved").with_atom(kind).with_nodes(nodes);
        Self {
            inner: Arc::new(MessageData {
                kind,
                severity,
                message,
                description: description.to_string(),
                approval,
                locations,
            }),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.inner.kind
    }

    pub fn severity(&self) -> Severity {
        self.inner.severity
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn approval(&self) -> &Sexpr {
        &self.inner.approval
    }

    pub fn locations(&self) -> &[Path] {
        &self.inner.locations
    }

    pub fn minimum_width_violation(
        obj: &ObjectRef,
        width: Length,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        Self::build(
            MessageKind::MinimumWidthViolation,
            Severity::Error,
            format!("Min. copper width of {obj} is {width} < {min}"),
            "The copper structure is narrower than the minimum width \
             configured for this board, so it may break during production \
             or lift off under thermal stress.",
            obj.key_nodes(),
            locations,
        )
    }

    pub fn copper_copper_clearance_violation(
        layer: Layer,
        a: &ObjectRef,
        net_a: &NetTag,
        b: &ObjectRef,
        net_b: &NetTag,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        let nodes = vec![
            Sexpr::entry("layer1", layer),
            Sexpr::entry("net1", net_a.key_atom()),
            a.key_node_wrapped("obj1", None),
            Sexpr::entry("layer2", layer),
            Sexpr::entry("net2", net_b.key_atom()),
            b.key_node_wrapped("obj2", None),
        ];
        Self::build(
            MessageKind::CopperCopperClearanceViolation,
            Severity::Error,
            format!(
                "Clearance of {a} ({}) to {b} ({}) on '{layer}' is < {min}",
                net_a.label(),
                net_b.label()
            ),
            "Two copper structures of different nets are closer together \
             than the minimum clearance, which risks shorts or arcing \
             during operation.",
            nodes,
            locations,
        )
    }

    pub fn copper_board_clearance_violation(
        obj: &ObjectRef,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        Self::build(
            MessageKind::CopperBoardClearanceViolation,
            Severity::Error,
            format!("Clearance of {obj} to the board edge is < {min}"),
            "Copper too close to the board outline can be damaged or \
             exposed when the board is milled out of the panel.",
            obj.key_nodes(),
            locations,
        )
    }

    pub fn copper_hole_clearance_violation(
        owner: &ObjectRef,
        hole: Uuid,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        let mut nodes = owner.key_nodes();
        nodes.push(Sexpr::entry("hole", hole));
        Self::build(
            MessageKind::CopperHoleClearanceViolation,
            Severity::Error,
            format!("Clearance of copper to non-plated hole of {owner} is < {min}"),
            "Copper too close to a non-plated hole can be ripped off by \
             the drill or create an unintended connection to the hole wall.",
            nodes,
            locations,
        )
    }

    pub fn drill_drill_clearance_violation(
        a: &ObjectRef,
        a_hole: Uuid,
        b: &ObjectRef,
        b_hole: Uuid,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        // Canonical child sorting orders the two drill nodes, so swapped
        // inputs produce the identical key.
        let nodes = vec![
            a.key_node_wrapped("drill", Some(a_hole)),
            b.key_node_wrapped("drill", Some(b_hole)),
        ];
        Self::build(
            MessageKind::DrillDrillClearanceViolation,
            Severity::Error,
            format!("Clearance between drill of {a} and drill of {b} is < {min}"),
            "Drills too close together can break the drill bit or leave \
             a weak web of material between the holes.",
            nodes,
            locations,
        )
    }

    pub fn drill_board_clearance_violation(
        owner: &ObjectRef,
        hole: Uuid,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        let mut nodes = owner.key_nodes();
        nodes.push(Sexpr::entry("hole", hole));
        Self::build(
            MessageKind::DrillBoardClearanceViolation,
            Severity::Error,
            format!("Clearance of drill of {owner} to the board edge is < {min}"),
            "A drill too close to the board outline can break out of the \
             board edge during drilling or depaneling.",
            nodes,
            locations,
        )
    }

    pub fn minimum_annular_ring_violation(
        obj: &ObjectRef,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        Self::build(
            MessageKind::MinimumAnnularRingViolation,
            Severity::Warning,
            format!("Annular ring of {obj} is < {min}"),
            "The copper ring remaining around the drilled hole is thinner \
             than the configured minimum, so drill misalignment may break \
             the connection.",
            obj.key_nodes(),
            locations,
        )
    }

    pub fn minimum_drill_diameter_violation(
        owner: &ObjectRef,
        hole: Uuid,
        diameter: PositiveLength,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        let mut nodes = owner.key_nodes();
        nodes.push(Sexpr::entry("hole", hole));
        Self::build(
            MessageKind::MinimumDrillDiameterViolation,
            Severity::Warning,
            format!("Drill diameter of {owner} is {diameter} < {min}"),
            "The drill is smaller than the minimum the fabrication house \
             can reliably produce.",
            nodes,
            locations,
        )
    }

    pub fn minimum_slot_width_violation(
        owner: &ObjectRef,
        hole: Uuid,
        width: PositiveLength,
        min: UnsignedLength,
        locations: Vec<Path>,
    ) -> Self {
        let mut nodes = owner.key_nodes();
        nodes.push(Sexpr::entry("hole", hole));
        Self::build(
            MessageKind::MinimumSlotWidthViolation,
            Severity::Warning,
            format!("Slot width of {owner} is {width} < {min}"),
            "The slot is narrower than the minimum milling tool the \
             fabrication house can use.",
            nodes,
            locations,
        )
    }

    pub fn forbidden_slot(
        owner: &ObjectRef,
        hole: Uuid,
        slot: SlotKind,
        locations: Vec<Path>,
    ) -> Self {
        let mut nodes = owner.key_nodes();
        nodes.push(Sexpr::entry("hole", hole));
        let what = match slot {
            SlotKind::Curved => "a curved slot",
            SlotKind::MultiSegmentStraight => "a multi-segment slot",
            SlotKind::SingleSegmentStraight => "a slot",
            SlotKind::RoundDrill => "a round drill",
        };
        Self::build(
            MessageKind::ForbiddenSlot,
            Severity::Warning,
            format!("Hole of {owner} is {what}, which is not allowed"),
            "The hole shape exceeds what the board settings allow; many \
             fabrication houses charge extra for slots or do not offer \
             curved ones at all.",
            nodes,
            locations,
        )
    }

    pub fn invalid_pad_connection(
        device: Uuid,
        pad: Uuid,
        layer: Layer,
        locations: Vec<Path>,
    ) -> Self {
        let nodes = vec![
            Sexpr::entry("device", device),
            Sexpr::entry("pad", pad),
            Sexpr::entry("layer", layer),
        ];
        Self::build(
            MessageKind::InvalidPadConnection,
            Severity::Error,
            format!("Invalid connection of pad on '{layer}'"),
            "A trace attaches to this pad on a layer where the pad has no \
             copper at its origin, so the connection would be open.",
            nodes,
            locations,
        )
    }

    pub fn courtyard_overlap(dev1: Uuid, dev2: Uuid, locations: Vec<Path>) -> Self {
        // Sorted canonical children order the device pair.
        let nodes = vec![Sexpr::entry("device", dev1), Sexpr::entry("device", dev2)];
        Self::build(
            MessageKind::CourtyardOverlap,
            Severity::Warning,
            "Courtyards of two devices overlap".to_string(),
            "The keep-out areas of two devices intersect; the parts may \
             collide during assembly.",
            nodes,
            locations,
        )
    }

    pub fn open_board_outline_polygon(
        device: Option<Uuid>,
        polygon: Uuid,
        locations: Vec<Path>,
    ) -> Self {
        let mut nodes = Vec::new();
        if let Some(device) = device {
            nodes.push(Sexpr::entry("device", device));
        }
        nodes.push(Sexpr::entry("polygon", polygon));
        Self::build(
            MessageKind::OpenBoardOutlinePolygon,
            Severity::Error,
            "Board outline polygon is not closed".to_string(),
            "An outline polygon whose first and last vertex differ cannot \
             be milled; close the polygon.",
            nodes,
            locations,
        )
    }

    pub fn missing_board_outline() -> Self {
        Self::build(
            MessageKind::MissingBoardOutline,
            Severity::Error,
            "Board outline is missing".to_string(),
            "No closed polygon exists on the board outline layer, so the \
             board dimensions are undefined.",
            Vec::new(),
            Vec::new(),
        )
    }

    pub fn multiple_board_outlines(locations: Vec<Path>) -> Self {
        Self::build(
            MessageKind::MultipleBoardOutlines,
            Severity::Warning,
            "Multiple board outlines".to_string(),
            "The outline layer contains more than one closed region; \
             unless this is a panel, the extra outlines are probably a \
             mistake.",
            Vec::new(),
            locations,
        )
    }

    pub fn minimum_board_outline_inner_radius_violation(locations: Vec<Path>) -> Self {
        Self::build(
            MessageKind::MinimumBoardOutlineInnerRadiusViolation,
            Severity::Warning,
            "Board outline inner radius too small".to_string(),
            "Inside corners of the outline are sharper than the configured \
             milling tool radius and cannot be cut as drawn.",
            Vec::new(),
            locations,
        )
    }

    pub fn missing_device(component: Uuid, name: &str) -> Self {
        Self::build(
            MessageKind::MissingDevice,
            Severity::Warning,
            format!("Component '{name}' is not placed on the board"),
            "The circuit contains this component but the board has no \
             device for it; the board would be incomplete.",
            vec![Sexpr::entry("component", component)],
            Vec::new(),
        )
    }

    pub fn default_device_mismatch(component: Uuid, name: &str) -> Self {
        Self::build(
            MessageKind::DefaultDeviceMismatch,
            Severity::Hint,
            format!("Device of '{name}' differs from the chosen default"),
            "The placed device is not the one selected as default for this \
             component; this may be intentional, e.g. an alternative part.",
            vec![Sexpr::entry("component", component)],
            Vec::new(),
        )
    }

    pub fn missing_connection(net: &NetTag, from: (Uuid, Point), to: (Uuid, Point)) -> Self {
        // Sorted canonical children order the endpoint pair.
        let nodes = vec![
            Sexpr::entry("net", net.key_atom()),
            Sexpr::entry("endpoint", from.0),
            Sexpr::entry("endpoint", to.0),
        ];
        Self::build(
            MessageKind::MissingConnection,
            Severity::Warning,
            format!("Missing connection in {}", net.label()),
            "An air wire remains between two points that should be \
             connected by copper.",
            nodes,
            vec![Path::line(from.1, to.1)],
        )
    }

    pub fn empty_net_segment(segment: Uuid, net: &NetTag) -> Self {
        Self::build(
            MessageKind::EmptyNetSegment,
            Severity::Hint,
            format!("Empty net segment in {}", net.label()),
            "A net segment without any traces or vias is stale data and \
             can be removed.",
            vec![Sexpr::entry("net_segment", segment)],
            Vec::new(),
        )
    }

    pub fn unconnected_junction(point: Uuid, net: &NetTag, position: Point) -> Self {
        Self::build(
            MessageKind::UnconnectedJunction,
            Severity::Hint,
            format!("Unconnected junction in {}", net.label()),
            "A junction without attached traces is stale data and can be \
             removed.",
            vec![Sexpr::entry("net_point", point)],
            vec![marker(position)],
        )
    }
}

impl PartialEq for CheckMessage {
    fn eq(&self, o: &Self) -> bool {
        self.kind() == o.kind()
            && self.severity() == o.severity()
            && self.message() == o.message()
            && self.approval() == o.approval()
            && self.locations() == o.locations()
    }
}

impl Eq for CheckMessage {}

// Small square highlight for point-like findings.
pub(crate) fn marker(p: Point) -> Path {
    let d = Length::nm(100_000);
    Path::from_points(&[
        p + Point::new(-d, -d),
        p + Point::new(d, -d),
        p + Point::new(d, d),
        p + Point::new(-d, d),
        p + Point::new(-d, -d),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::Sexpr;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_severity_order_and_display() {
        assert!(Severity::Hint < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_drill_pair_key_is_canonical() {
        let a = ObjectRef::new(ObjectKind::Via, uuid(1));
        let b = ObjectRef::in_device(ObjectKind::Pad, uuid(2), uuid(3));
        let m1 = CheckMessage::drill_drill_clearance_violation(
            &a,
            uuid(1),
            &b,
            uuid(4),
            UnsignedLength::nm(350_000),
            Vec::new(),
        );
        let m2 = CheckMessage::drill_drill_clearance_violation(
            &b,
            uuid(4),
            &a,
            uuid(1),
            UnsignedLength::nm(350_000),
            Vec::new(),
        );
        assert_eq!(m1.approval(), m2.approval());
    }

    #[test]
    fn test_courtyard_key_orders_devices() {
        let m1 = CheckMessage::courtyard_overlap(uuid(7), uuid(5), Vec::new());
        let m2 = CheckMessage::courtyard_overlap(uuid(5), uuid(7), Vec::new());
        assert_eq!(m1.approval(), m2.approval());
    }

    #[test]
    fn test_approval_round_trip() {
        let obj = ObjectRef::in_device(ObjectKind::Hole, uuid(8), uuid(9));
        let m = CheckMessage::forbidden_slot(&obj, uuid(8), SlotKind::Curved, Vec::new());
        let text = m.approval().canonical();
        assert_eq!(Sexpr::parse(&text).unwrap(), *m.approval());
        assert!(text.starts_with("(approved"));
        assert!(text.contains("forbidden_slot"));
    }

    #[test]
    fn test_message_kind_atoms() {
        assert_eq!(MessageKind::MinimumWidthViolation.to_string(), "minimum_width_violation");
        assert_eq!(MessageKind::ForbiddenSlot.to_string(), "forbidden_slot");
    }
}
