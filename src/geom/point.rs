use std::fmt;

use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use serde::{Deserialize, Serialize};

use crate::geom::units::Length;

// Integer nanometre point. Cross and dot products are widened to 128 bits
// so they cannot overflow for any representable board extent.
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize,
)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self::new(Length::ZERO, Length::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    pub fn cross(&self, p: Point) -> i128 {
        i128::from(self.x.to_nm()) * i128::from(p.y.to_nm())
            - i128::from(self.y.to_nm()) * i128::from(p.x.to_nm())
    }

    pub fn dot(&self, p: Point) -> i128 {
        i128::from(self.x.to_nm()) * i128::from(p.x.to_nm())
            + i128::from(self.y.to_nm()) * i128::from(p.y.to_nm())
    }

    pub fn mag2(&self) -> i128 {
        self.dot(*self)
    }

    // Euclidean distance in nanometres. The square root leaves the exact
    // integer domain; callers needing exact comparisons use mag2.
    pub fn dist(&self, b: Point) -> f64 {
        ((b - *self).mag2() as f64).sqrt()
    }

    pub fn fx(&self) -> f64 {
        self.x.to_nm() as f64
    }

    pub fn fy(&self) -> f64 {
        self.y.to_nm() as f64
    }

    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(Length::nm(x.round() as i64), Length::nm(y.round() as i64))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl_op_ex!(-|a: &Point| -> Point { Point::new(-a.x, -a.y) });
impl_op_ex!(+ |a: &Point, b: &Point| -> Point { Point::new(a.x + b.x, a.y + b.y) });
impl_op_ex!(+= |a: &mut Point, b: &Point| { a.x += b.x; a.y += b.y; });
impl_op_ex!(-|a: &Point, b: &Point| -> Point { Point::new(a.x - b.x, a.y - b.y) });
impl_op_ex!(-= |a: &mut Point, b: &Point| { a.x -= b.x; a.y -= b.y; });
impl_op_ex_commutative!(*|a: &Point, b: &i64| -> Point { Point::new(a.x * b, a.y * b) });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::pt;

    #[test]
    fn test_ops() {
        assert_eq!(pt(1, 2) + pt(3, 4), pt(4, 6));
        assert_eq!(pt(1, 2) - pt(3, 4), pt(-2, -2));
        assert_eq!(pt(1, 2) * 3, pt(3, 6));
        assert_eq!(-pt(1, 2), pt(-1, -2));
    }

    #[test]
    fn test_cross_dot_widening() {
        // Board-scale coordinates square to > 2^63; must not overflow.
        let a = pt(4_000_000_000, 0);
        let b = pt(0, 4_000_000_000);
        assert_eq!(a.cross(b), 16_000_000_000_000_000_000i128);
        assert_eq!(a.dot(a), 16_000_000_000_000_000_000i128);
    }

    #[test]
    fn test_dist() {
        assert!((pt(0, 0).dist(pt(3_000, 4_000)) - 5_000.0).abs() < 1e-9);
    }
}
