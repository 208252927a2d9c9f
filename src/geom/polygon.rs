use geo::{Area, BooleanOps, Contains, Coord, LineString, MultiPolygon, Polygon};

use crate::geom::path::Path;
use crate::geom::point::Point;
use crate::geom::units::{Length, PositiveLength, UnsignedLength};

// Regions below this area (in square nanometres) are boolean-op debris, not
// geometry; they are treated as empty.
const SLIVER_AREA: f64 = 1.0;

// A set of planar polygons with holes. The algebra runs on f64 coordinates
// that carry nanometre values exactly (board extents stay far below 2^53);
// paths entering and leaving the set are integer nanometres.
#[derive(Debug, Clone)]
pub struct PolygonSet {
    mp: MultiPolygon<f64>,
}

impl Default for PolygonSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl PolygonSet {
    pub fn empty() -> Self {
        Self { mp: MultiPolygon(Vec::new()) }
    }

    // Fills a closed path. Arcs are flattened within tol; degenerate rings
    // (under three distinct vertices or sliver area) yield the empty set.
    pub fn from_closed_path(path: &Path, tol: UnsignedLength) -> Self {
        let flat = path.flattened(tol);
        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(flat.len());
        for p in flat.positions() {
            let c = Coord { x: p.fx(), y: p.fy() };
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }
        if coords.first() == coords.last() {
            coords.pop();
        }
        if coords.len() < 3 {
            return Self::empty();
        }
        if ring_signed_area(&coords) < 0.0 {
            coords.reverse();
        }
        if ring_signed_area(&coords) < SLIVER_AREA {
            return Self::empty();
        }
        coords.push(coords[0]);
        Self { mp: MultiPolygon(vec![Polygon::new(LineString(coords), Vec::new())]) }
    }

    // Fills the stroked outline of a path: the union of one region per
    // segment (obround / washer slice), radius width/2.
    pub fn stroke(path: &Path, width: PositiveLength, tol: UnsignedLength) -> Self {
        Self::union_all(
            path.to_outline_strokes(width, tol)
                .iter()
                .map(|p| Self::from_closed_path(p, tol))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.mp.0.is_empty() || self.mp.unsigned_area() < SLIVER_AREA
    }

    pub fn area(&self) -> f64 {
        self.mp.unsigned_area()
    }

    // Count of distinct filled regions (outer rings).
    pub fn region_count(&self) -> usize {
        self.mp.0.iter().filter(|p| p.unsigned_area() >= SLIVER_AREA).count()
    }

    // The empty set is the unit of union.
    pub fn unite(&self, o: &PolygonSet) -> PolygonSet {
        if self.is_empty() {
            return o.clone();
        }
        if o.is_empty() {
            return self.clone();
        }
        Self { mp: self.mp.union(&o.mp) }
    }

    // The empty set absorbs intersection.
    pub fn intersect(&self, o: &PolygonSet) -> PolygonSet {
        if self.is_empty() || o.is_empty() {
            return Self::empty();
        }
        Self { mp: self.mp.intersection(&o.mp) }
    }

    pub fn subtract(&self, o: &PolygonSet) -> PolygonSet {
        if self.is_empty() || o.is_empty() {
            return self.clone();
        }
        Self { mp: self.mp.difference(&o.mp) }
    }

    // Balanced pairwise merge; deterministic in the input order.
    pub fn union_all(mut sets: Vec<PolygonSet>) -> PolygonSet {
        sets.retain(|s| !s.is_empty());
        if sets.is_empty() {
            return Self::empty();
        }
        while sets.len() > 1 {
            let mut next = Vec::with_capacity(sets.len() / 2 + 1);
            let mut it = sets.into_iter();
            while let Some(a) = it.next() {
                match it.next() {
                    Some(b) => next.push(a.unite(&b)),
                    None => next.push(a),
                }
            }
            sets = next;
        }
        sets.pop().unwrap_or_else(Self::empty)
    }

    // Minkowski sum with a disc of signed radius delta. Positive offsets
    // grow the set by a band swept along the boundary; negative offsets
    // erode by subtracting that band, which equals erosion by the disc for
    // bounded sets. Round corners are approximated within tol.
    pub fn offset(&self, delta: Length, tol: UnsignedLength) -> PolygonSet {
        if self.is_empty() || delta.is_zero() {
            return self.clone();
        }
        let r = delta.abs().to_nm() as f64;
        let band = Self { mp: MultiPolygon(self.boundary_band(r, tol)) };
        if delta.to_nm() > 0 {
            self.unite(&band)
        } else {
            self.subtract(&band)
        }
    }

    fn boundary_band(&self, r: f64, tol: UnsignedLength) -> Vec<Polygon<f64>> {
        let mut capsules = Vec::new();
        for poly in &self.mp.0 {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                for w in ring.0.windows(2) {
                    capsules.push(capsule_ring(w[0], w[1], r, tol));
                }
            }
        }
        // Merge through the set machinery to keep one deterministic path.
        let sets = capsules
            .into_iter()
            .map(|p| Self { mp: MultiPolygon(vec![p]) })
            .collect::<Vec<_>>();
        Self::union_all(sets).mp.0
    }

    // All boundary rings as closed counterclockwise paths, nesting and hole
    // roles discarded. Used where an overlap area gets reported.
    pub fn outlines(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for poly in &self.mp.0 {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                if let Some(p) = ring_to_path(ring, false) {
                    out.push(p);
                }
            }
        }
        out
    }

    // Boundary rings with roles kept: outer rings counterclockwise, holes
    // clockwise.
    pub fn rings(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for poly in &self.mp.0 {
            if let Some(p) = ring_to_path(poly.exterior(), false) {
                out.push(p);
            }
            for ring in poly.interiors() {
                if let Some(p) = ring_to_path(ring, true) {
                    out.push(p);
                }
            }
        }
        out
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.mp.contains(&geo::Point::new(p.fx(), p.fy()))
    }
}

fn ring_signed_area(coords: &[Coord<f64>]) -> f64 {
    let n = coords.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = coords[i];
        let b = coords[(i + 1) % n];
        acc += a.x * b.y - a.y * b.x;
    }
    acc / 2.0
}

fn ring_to_path(ring: &LineString<f64>, clockwise: bool) -> Option<Path> {
    let mut coords: Vec<Coord<f64>> = ring.0.clone();
    if coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 || ring_signed_area(&coords).abs() < SLIVER_AREA {
        return None;
    }
    if (ring_signed_area(&coords) < 0.0) != clockwise {
        coords.reverse();
    }
    let mut pts: Vec<Point> =
        coords.iter().map(|c| Point::from_f64(c.x, c.y)).collect();
    pts.push(pts[0]);
    pts.dedup();
    Some(Path::from_points(&pts))
}

fn circle_segments(r: f64, tol: UnsignedLength) -> usize {
    let tol = (tol.to_nm() as f64).max(1.0);
    let step = 2.0 * (1.0 - tol / r).clamp(-1.0, 1.0).acos();
    if step <= 0.0 {
        return 8;
    }
    ((std::f64::consts::TAU / step).ceil() as usize).clamp(8, 4096)
}

// Capsule around the segment a..b, radius r, as a counterclockwise ring.
fn capsule_ring(a: Coord<f64>, b: Coord<f64>, r: f64, tol: UnsignedLength) -> Polygon<f64> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let l = dx.hypot(dy);
    if l <= 0.0 {
        return circle_polygon(a, r, tol);
    }
    let base = dy.atan2(dx);
    let n = circle_segments(r, tol) / 2;
    let mut coords = Vec::with_capacity(2 * n + 3);
    // Cap around b from -90 to +90 degrees relative to the direction, then
    // cap around a on the far side.
    for i in 0..=n {
        let ang = base - std::f64::consts::FRAC_PI_2
            + std::f64::consts::PI * (i as f64) / (n as f64);
        coords.push(Coord { x: b.x + r * ang.cos(), y: b.y + r * ang.sin() });
    }
    for i in 0..=n {
        let ang = base + std::f64::consts::FRAC_PI_2
            + std::f64::consts::PI * (i as f64) / (n as f64);
        coords.push(Coord { x: a.x + r * ang.cos(), y: a.y + r * ang.sin() });
    }
    coords.push(coords[0]);
    Polygon::new(LineString(coords), Vec::new())
}

fn circle_polygon(c: Coord<f64>, r: f64, tol: UnsignedLength) -> Polygon<f64> {
    let n = circle_segments(r, tol);
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let ang = std::f64::consts::TAU * (i as f64) / (n as f64);
        coords.push(Coord { x: c.x + r * ang.cos(), y: c.y + r * ang.sin() });
    }
    coords.push(coords[0]);
    Polygon::new(LineString(coords), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{pt, MAX_ARC_TOLERANCE};

    fn rect(l: i64, b: i64, r: i64, t: i64) -> PolygonSet {
        let p = Path::from_points(&[pt(l, b), pt(r, b), pt(r, t), pt(l, t), pt(l, b)]);
        PolygonSet::from_closed_path(&p, MAX_ARC_TOLERANCE)
    }

    #[test]
    fn test_empty_identities() {
        let a = rect(0, 0, 1_000_000, 1_000_000);
        let e = PolygonSet::empty();
        assert!(e.is_empty());
        assert!(!a.unite(&e).is_empty());
        assert!(e.intersect(&a).is_empty());
        assert!(a.intersect(&e).is_empty());
        assert!(e.subtract(&a).is_empty());
        assert!((a.subtract(&e).area() - a.area()).abs() < 1.0);
    }

    #[test]
    fn test_union_merges_overlap() {
        let a = rect(0, 0, 2_000_000, 1_000_000);
        let b = rect(1_000_000, 0, 3_000_000, 1_000_000);
        let u = a.unite(&b);
        assert_eq!(u.region_count(), 1);
        assert!((u.area() - 3e6 * 1e6).abs() < 1e6);
    }

    #[test]
    fn test_union_keeps_disjoint_regions() {
        let a = rect(0, 0, 1_000_000, 1_000_000);
        let b = rect(5_000_000, 0, 6_000_000, 1_000_000);
        assert_eq!(a.unite(&b).region_count(), 2);
    }

    #[test]
    fn test_intersect_and_subtract() {
        let a = rect(0, 0, 2_000_000, 2_000_000);
        let b = rect(1_000_000, 0, 3_000_000, 2_000_000);
        let i = a.intersect(&b);
        assert!((i.area() - 1e6 * 2e6).abs() < 1e6);
        let d = a.subtract(&b);
        assert!((d.area() - 1e6 * 2e6).abs() < 1e6);
        let far = rect(9_000_000, 9_000_000, 9_500_000, 9_500_000);
        assert!(a.intersect(&far).is_empty());
    }

    #[test]
    fn test_subtract_can_cut_holes() {
        let outer = rect(0, 0, 4_000_000, 4_000_000);
        let inner = rect(1_000_000, 1_000_000, 3_000_000, 3_000_000);
        let holed = outer.subtract(&inner);
        assert_eq!(holed.region_count(), 1);
        assert_eq!(holed.rings().len(), 2);
        // outlines() flattens the hole into a plain ring.
        assert_eq!(holed.outlines().len(), 2);
        assert!(!holed.contains_point(pt(2_000_000, 2_000_000)));
        assert!(holed.contains_point(pt(500_000, 500_000)));
    }

    #[test]
    fn test_offset_grow_and_shrink() {
        let a = rect(0, 0, 2_000_000, 2_000_000);
        let grown = a.offset(Length::nm(500_000), MAX_ARC_TOLERANCE);
        assert!(grown.area() > a.area());
        assert!(grown.contains_point(pt(-400_000, 1_000_000)));
        let shrunk = a.offset(Length::nm(-500_000), MAX_ARC_TOLERANCE);
        assert!(shrunk.area() < a.area());
        assert!(!shrunk.contains_point(pt(250_000, 1_000_000)));
        assert!(shrunk.contains_point(pt(1_000_000, 1_000_000)));
        // Eroding past the half width empties the set.
        assert!(a.offset(Length::nm(-1_100_000), MAX_ARC_TOLERANCE).is_empty());
    }

    #[test]
    fn test_stroke_obround_area() {
        let p = Path::line(pt(0, 0), pt(10_000_000, 0));
        let s = PolygonSet::stroke(&p, PositiveLength::nm(200_000), MAX_ARC_TOLERANCE);
        // Obround area: l*w + pi*(w/2)^2, within flattening tolerance.
        let expect = 10e6 * 200e3 + std::f64::consts::PI * 100e3 * 100e3;
        assert!((s.area() - expect).abs() / expect < 0.01);
    }

    #[test]
    fn test_from_degenerate_path_is_empty() {
        assert!(PolygonSet::from_closed_path(&Path::from_points(&[pt(0, 0)]), MAX_ARC_TOLERANCE)
            .is_empty());
        let line = Path::from_points(&[pt(0, 0), pt(1_000, 0), pt(0, 0)]);
        assert!(PolygonSet::from_closed_path(&line, MAX_ARC_TOLERANCE).is_empty());
    }

    #[test]
    fn test_circle_path_area() {
        let c = Path::circle(pt(0, 0), PositiveLength::nm(1_000_000));
        let s = PolygonSet::from_closed_path(&c, MAX_ARC_TOLERANCE);
        let expect = std::f64::consts::PI * 500e3 * 500e3;
        assert!((s.area() - expect).abs() / expect < 0.02);
        assert!(s.contains_point(pt(0, 0)));
        assert!(!s.contains_point(pt(600_000, 0)));
    }
}
