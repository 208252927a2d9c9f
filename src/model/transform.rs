use serde::{Deserialize, Serialize};

use crate::geom::path::Path;
use crate::geom::point::Point;
use crate::geom::units::Angle;
use crate::geom::vtx;
use crate::model::layer::Layer;

// Placement of a library element on the board: mirror across the y axis
// first, then rotate counterclockwise, then translate. Rotation is exact
// for multiples of 90 degrees and falls back to floating point otherwise.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point,
    pub rotation: Angle,
    pub mirror: bool,
}

impl Transform {
    pub const fn new(position: Point, rotation: Angle, mirror: bool) -> Self {
        Self { position, rotation, mirror }
    }

    pub const fn identity() -> Self {
        Self { position: Point::zero(), rotation: Angle::ZERO, mirror: false }
    }

    pub fn apply(&self, p: Point) -> Point {
        let p = if self.mirror { Point::new(-p.x, p.y) } else { p };
        rotate(p, self.rotation) + self.position
    }

    pub fn apply_path(&self, path: &Path) -> Path {
        Path::new(
            path.vertices()
                .iter()
                .map(|v| {
                    let sweep = if self.mirror { -v.arc_sweep } else { v.arc_sweep };
                    vtx(self.apply(v.position), sweep)
                })
                .collect(),
        )
    }

    // Layer a local-side feature lands on once the element is placed.
    pub fn apply_layer(&self, layer: Layer) -> Layer {
        if self.mirror {
            layer.mirrored()
        } else {
            layer
        }
    }

    // Composition of a child placement (e.g. a pad in a footprint) with
    // this placement.
    pub fn compose(&self, child: &Transform) -> Transform {
        let rotation = if self.mirror { self.rotation - child.rotation } else { self.rotation + child.rotation };
        Transform {
            position: self.apply(child.position),
            rotation,
            mirror: self.mirror != child.mirror,
        }
    }
}

fn rotate(p: Point, a: Angle) -> Point {
    let quarters = a.normalized().to_mdeg() / 90_000;
    if a.is_multiple_of_90() {
        return match quarters {
            0 => p,
            1 => Point::new(-p.y, p.x),
            2 => Point::new(-p.x, -p.y),
            _ => Point::new(p.y, -p.x),
        };
    }
    // Float touchpoint: rotation by arbitrary angles has no exact integer
    // form; deterministic for a given input on all IEEE-754 targets.
    let (sin, cos) = a.to_rad().sin_cos();
    Point::from_f64(p.fx() * cos - p.fy() * sin, p.fx() * sin + p.fy() * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::pt;

    #[test]
    fn test_exact_quarter_rotation() {
        let t = Transform::new(pt(1_000, 0), Angle::DEG_90, false);
        assert_eq!(t.apply(pt(100, 0)), pt(1_000, 100));
        let t = Transform::new(Point::zero(), Angle::DEG_270, false);
        assert_eq!(t.apply(pt(100, 0)), pt(0, -100));
    }

    #[test]
    fn test_mirror_before_rotation() {
        let t = Transform::new(Point::zero(), Angle::DEG_90, true);
        // (100, 0) mirrors to (-100, 0), then rotates to (0, -100).
        assert_eq!(t.apply(pt(100, 0)), pt(0, -100));
    }

    #[test]
    fn test_mirror_flips_arcs_and_layers() {
        let t = Transform::new(Point::zero(), Angle::ZERO, true);
        let p = Path::new(vec![vtx(pt(0, 0), Angle::DEG_90), vtx(pt(100, 100), Angle::ZERO)]);
        let m = t.apply_path(&p);
        assert_eq!(m.vertices()[0].arc_sweep, -Angle::DEG_90);
        assert_eq!(m.vertices()[1].position, pt(-100, 100));
        assert_eq!(t.apply_layer(Layer::TopCopper), Layer::BottomCopper);
    }

    #[test]
    fn test_float_rotation_rounds() {
        let t = Transform::new(Point::zero(), Angle::from_deg(45.0), false);
        let p = t.apply(pt(1_000_000, 0));
        assert_eq!(p, pt(707_107, 707_107));
    }
}
