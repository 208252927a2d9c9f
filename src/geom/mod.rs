use crate::geom::path::Vertex;
use crate::geom::point::Point;
use crate::geom::units::{Angle, Length, UnsignedLength};

pub mod path;
pub mod point;
pub mod polygon;
pub mod units;

// Chord error bound for flattening arcs into line segments. All checks see
// geometry within this same tolerance.
pub const MAX_ARC_TOLERANCE: UnsignedLength = UnsignedLength::nm(5000);

pub const fn pt(x: i64, y: i64) -> Point {
    Point::new(Length::nm(x), Length::nm(y))
}

pub const fn vtx(p: Point, arc_sweep: Angle) -> Vertex {
    Vertex { position: p, arc_sweep }
}
