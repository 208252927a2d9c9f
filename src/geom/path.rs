use serde::{Deserialize, Serialize};

use crate::geom::point::Point;
use crate::geom::units::{Angle, Length, PositiveLength, UnsignedLength};
use crate::geom::vtx;

// A path vertex. The arc sweep describes the edge from this vertex to the
// next one; zero sweep is a straight segment, positive sweeps are
// counterclockwise. Sweeps lie strictly inside (-360deg, 360deg).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point,
    pub arc_sweep: Angle,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    vertices: Vec<Vertex>,
}

impl Path {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    pub fn from_points(pts: &[Point]) -> Self {
        Self { vertices: pts.iter().map(|&p| vtx(p, Angle::ZERO)).collect() }
    }

    pub fn line(a: Point, b: Point) -> Self {
        Self::from_points(&[a, b])
    }

    pub fn circle(center: Point, diameter: PositiveLength) -> Self {
        let r = diameter.len().half();
        let right = center + Point::new(r, Length::ZERO);
        let left = center - Point::new(r, Length::ZERO);
        Self::new(vec![
            vtx(right, Angle::DEG_180),
            vtx(left, Angle::DEG_180),
            vtx(right, Angle::ZERO),
        ])
    }

    // Stadium shape around the segment a..b; equals a circle when a == b.
    pub fn obround(a: Point, b: Point, width: PositiveLength) -> Self {
        if a == b {
            return Self::circle(a, width);
        }
        let r = width.len().half().to_nm() as f64;
        // Float touchpoint: the chord direction angle has no exact integer
        // form; bounded to half-width rounding of the four corner points.
        let ang = (b.fy() - a.fy()).atan2(b.fx() - a.fx());
        let n = Point::from_f64(-ang.sin() * r, ang.cos() * r);
        Self::new(vec![
            vtx(a - n, Angle::ZERO),
            vtx(b - n, Angle::DEG_180),
            vtx(b + n, Angle::ZERO),
            vtx(a + n, Angle::DEG_180),
            vtx(a - n, Angle::ZERO),
        ])
    }

    pub fn rect(center: Point, w: PositiveLength, h: PositiveLength) -> Self {
        let (hw, hh) = (w.len().half(), h.len().half());
        Self::from_points(&[
            center + Point::new(-hw, -hh),
            center + Point::new(hw, -hh),
            center + Point::new(hw, hh),
            center + Point::new(-hw, hh),
            center + Point::new(-hw, -hh),
        ])
    }

    pub fn rounded_rect(
        center: Point,
        w: PositiveLength,
        h: PositiveLength,
        radius: UnsignedLength,
    ) -> Self {
        let (hw, hh) = (w.len().half(), h.len().half());
        let r = radius.len().min(hw).min(hh);
        if r.is_zero() {
            return Self::rect(center, w, h);
        }
        let c = |x: Length, y: Length, sweep: Angle| vtx(center + Point::new(x, y), sweep);
        Self::new(vec![
            c(-hw + r, -hh, Angle::ZERO),
            c(hw - r, -hh, Angle::DEG_90),
            c(hw, -hh + r, Angle::ZERO),
            c(hw, hh - r, Angle::DEG_90),
            c(hw - r, hh, Angle::ZERO),
            c(-hw + r, hh, Angle::DEG_90),
            c(-hw, hh - r, Angle::ZERO),
            c(-hw, -hh + r, Angle::DEG_90),
            c(-hw + r, -hh, Angle::ZERO),
        ])
    }

    // Octagon inscribed in the w x h box, 45 degree corner cuts.
    pub fn octagon(center: Point, w: PositiveLength, h: PositiveLength) -> Self {
        let (hw, hh) = (w.len().half(), h.len().half());
        let min = hw.min(hh);
        let cut = Length::nm((min.to_nm() as f64 * (2.0 - std::f64::consts::SQRT_2)).round() as i64);
        let p = |x: Length, y: Length| center + Point::new(x, y);
        Self::from_points(&[
            p(hw, -hh + cut),
            p(hw, hh - cut),
            p(hw - cut, hh),
            p(-hw + cut, hh),
            p(-hw, hh - cut),
            p(-hw, -hh + cut),
            p(-hw + cut, -hh),
            p(hw - cut, -hh),
            p(hw, -hh + cut),
        ])
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.vertices.len() >= 2
            && self.vertices.first().map(|v| v.position) == self.vertices.last().map(|v| v.position)
    }

    pub fn has_arcs(&self) -> bool {
        // The last vertex has no outgoing edge, so its sweep is inert.
        let n = self.vertices.len();
        self.vertices.iter().take(n.saturating_sub(1)).any(|v| !v.arc_sweep.is_zero())
    }

    // True when every vertex sits on the same position (a round drill).
    pub fn is_single_point(&self) -> bool {
        match self.vertices.first() {
            None => true,
            Some(first) => self.vertices.iter().all(|v| v.position == first.position),
        }
    }

    // Count of edges with distinct endpoints.
    pub fn segment_count(&self) -> usize {
        self.vertices.windows(2).filter(|w| w[0].position != w[1].position).count()
    }

    pub fn translated(&self, by: Point) -> Self {
        Self::new(
            self.vertices.iter().map(|v| vtx(v.position + by, v.arc_sweep)).collect(),
        )
    }

    pub fn reversed(&self) -> Self {
        let mut vertices: Vec<Vertex> = Vec::with_capacity(self.vertices.len());
        for w in self.vertices.windows(2).rev() {
            vertices.push(vtx(w[1].position, -w[0].arc_sweep));
        }
        if let Some(first) = self.vertices.first() {
            vertices.push(vtx(first.position, Angle::ZERO));
        }
        Self::new(vertices)
    }

    // Replaces every arc edge by a polyline whose perpendicular chord
    // deviation from the true arc is at most tol.
    pub fn flattened(&self, tol: UnsignedLength) -> Path {
        if !self.has_arcs() {
            return self.clone();
        }
        let mut out: Vec<Vertex> = Vec::with_capacity(self.vertices.len());
        for i in 0..self.vertices.len() {
            let v = self.vertices[i];
            out.push(vtx(v.position, Angle::ZERO));
            if v.arc_sweep.is_zero() || i + 1 >= self.vertices.len() {
                continue;
            }
            let next = self.vertices[i + 1].position;
            for p in flatten_arc(v.position, next, v.arc_sweep, tol) {
                out.push(vtx(p, Angle::ZERO));
            }
        }
        Path::new(out)
    }

    // One closed region per segment: the Minkowski sum of the segment with a
    // disc of radius width/2. Straight segments become obrounds, arcs become
    // washer slices with rounded caps. Adjacent regions overlap at shared
    // vertices; callers union them as needed.
    pub fn to_outline_strokes(&self, width: PositiveLength, tol: UnsignedLength) -> Vec<Path> {
        let mut out = Vec::new();
        if self.vertices.len() == 1 {
            out.push(Path::circle(self.vertices[0].position, width));
            return out;
        }
        for i in 0..self.vertices.len().saturating_sub(1) {
            let v = self.vertices[i];
            let next = self.vertices[i + 1].position;
            if v.arc_sweep.is_zero() || v.position == next {
                out.push(Path::obround(v.position, next, width));
            } else {
                out.extend(arc_stroke(v.position, next, v.arc_sweep, width, tol));
            }
        }
        out
    }
}

// Arc parameters recovered from a chord and its sweep. At a sweep of
// exactly 180 degrees the centre degenerates onto the chord midpoint.
struct ArcFrame {
    cx: f64,
    cy: f64,
    r: f64,
    start: f64, // Start angle in radians.
    sweep: f64, // Signed sweep in radians.
}

fn arc_frame(a: Point, b: Point, sweep: Angle) -> Option<ArcFrame> {
    let (dx, dy) = (b.fx() - a.fx(), b.fy() - a.fy());
    let l = dx.hypot(dy);
    if l <= 0.0 {
        return None;
    }
    let sweep_rad = sweep.to_rad();
    let half = (sweep_rad / 2.0).abs();
    if half <= 0.0 {
        return None;
    }
    let r = (l / 2.0) / half.sin();
    let h = (l / 2.0) / half.tan();
    // Left normal of the directed chord; the centre lies on it for positive
    // sweeps and opposite for negative ones.
    let (nx, ny) = (-dy / l, dx / l);
    let side = if sweep_rad > 0.0 { 1.0 } else { -1.0 };
    let (mx, my) = ((a.fx() + b.fx()) / 2.0, (a.fy() + b.fy()) / 2.0);
    let (cx, cy) = (mx + nx * h * side, my + ny * h * side);
    let start = (a.fy() - cy).atan2(a.fx() - cx);
    Some(ArcFrame { cx, cy, r, start, sweep: sweep_rad })
}

// Segment count so the chord error stays within tol: a chord over angle
// theta deviates by r * (1 - cos(theta / 2)).
fn arc_segments(r: f64, sweep: f64, tol: UnsignedLength) -> usize {
    let tol = (tol.to_nm() as f64).max(1.0);
    let max_step = 2.0 * (1.0 - tol / r).clamp(-1.0, 1.0).acos();
    if max_step <= 0.0 {
        return 1;
    }
    ((sweep.abs() / max_step).ceil() as usize).clamp(1, 4096)
}

// Intermediate points strictly between a and b, exclusive on both ends.
fn flatten_arc(a: Point, b: Point, sweep: Angle, tol: UnsignedLength) -> Vec<Point> {
    let Some(fr) = arc_frame(a, b, sweep) else { return Vec::new() };
    let n = arc_segments(fr.r, fr.sweep, tol);
    let mut out = Vec::with_capacity(n.saturating_sub(1));
    for i in 1..n {
        let ang = fr.start + fr.sweep * (i as f64) / (n as f64);
        out.push(Point::from_f64(fr.cx + fr.r * ang.cos(), fr.cy + fr.r * ang.sin()));
    }
    out
}

// Washer slice: the stroked arc segment with semicircular end caps. Falls
// back to obrounds over the flattened arc when the stroke swallows the
// inner radius.
fn arc_stroke(
    a: Point,
    b: Point,
    sweep: Angle,
    width: PositiveLength,
    tol: UnsignedLength,
) -> Vec<Path> {
    let w2 = width.len().half().to_nm() as f64;
    let Some(fr) = arc_frame(a, b, sweep) else {
        return vec![Path::obround(a, b, width)];
    };
    if fr.r - w2 <= 0.0 {
        let flat = Path::new(vec![vtx(a, sweep), vtx(b, Angle::ZERO)]).flattened(tol);
        let mut out = Vec::new();
        for seg in flat.vertices().windows(2) {
            out.push(Path::obround(seg[0].position, seg[1].position, width));
        }
        return out;
    }
    let (r_out, r_in) = (fr.r + w2, fr.r - w2);
    let end = fr.start + fr.sweep;
    let at = |r: f64, ang: f64| Point::from_f64(fr.cx + r * ang.cos(), fr.cy + r * ang.sin());
    let mut pts = Vec::new();
    // Outer arc forwards.
    let n_out = arc_segments(r_out, fr.sweep, tol);
    for i in 0..=n_out {
        pts.push(at(r_out, fr.start + fr.sweep * (i as f64) / (n_out as f64)));
    }
    // End cap: half turn around the segment end, from outer to inner.
    push_cap(&mut pts, b, end, fr.sweep.signum(), w2, tol);
    // Inner arc backwards.
    let n_in = arc_segments(r_in, fr.sweep, tol);
    for i in (0..=n_in).rev() {
        pts.push(at(r_in, fr.start + fr.sweep * (i as f64) / (n_in as f64)));
    }
    // Start cap back to the outer start point.
    push_cap(&mut pts, a, fr.start + std::f64::consts::PI, fr.sweep.signum(), w2, tol);
    if pts.first() != pts.last() {
        let first = pts[0];
        pts.push(first);
    }
    vec![Path::from_points(&pts)]
}

// Semicircle of radius w2 around centre, starting at angle ang (relative to
// the arc centre direction) and turning half a turn in the travel direction.
fn push_cap(pts: &mut Vec<Point>, centre: Point, ang: f64, dir: f64, w2: f64, tol: UnsignedLength) {
    let n = arc_segments(w2, std::f64::consts::PI, tol);
    for i in 1..n {
        let a = ang + dir * std::f64::consts::PI * (i as f64) / (n as f64);
        pts.push(Point::from_f64(centre.fx() + w2 * a.cos(), centre.fy() + w2 * a.sin()));
    }
    pts.push(Point::from_f64(
        centre.fx() + w2 * (ang + dir * std::f64::consts::PI).cos(),
        centre.fy() + w2 * (ang + dir * std::f64::consts::PI).sin(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{pt, MAX_ARC_TOLERANCE};

    fn chord_error(a: Point, b: Point, sweep: Angle, tol: UnsignedLength) -> f64 {
        let fr = arc_frame(a, b, sweep).unwrap();
        let mut worst: f64 = 0.0;
        let mut prev = a;
        let mut pts = flatten_arc(a, b, sweep, tol);
        pts.push(b);
        for p in pts {
            // Deviation of the chord midpoint from the circle.
            let (mx, my) = ((prev.fx() + p.fx()) / 2.0, (prev.fy() + p.fy()) / 2.0);
            let d = ((mx - fr.cx).hypot(my - fr.cy) - fr.r).abs();
            worst = worst.max(d);
            prev = p;
        }
        worst
    }

    #[test]
    fn test_flatten_arc_within_tolerance() {
        let tol = MAX_ARC_TOLERANCE;
        // Quarter arc of radius ~10mm.
        let err = chord_error(pt(10_000_000, 0), pt(0, 10_000_000), Angle::DEG_90, tol);
        assert!(err <= tol.to_nm() as f64 + 2.0, "chord error {err}");
    }

    #[test]
    fn test_flatten_half_turn_centre_on_chord() {
        // At exactly 180 degrees the centre is the chord midpoint.
        let fr = arc_frame(pt(-1_000_000, 0), pt(1_000_000, 0), Angle::DEG_180, ).unwrap();
        assert!(fr.cx.abs() < 1.0 && fr.cy.abs() < 1.0);
        assert!((fr.r - 1_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_circle_is_closed() {
        let c = Path::circle(pt(0, 0), PositiveLength::nm(1_000_000));
        assert!(c.is_closed());
        assert!(c.has_arcs());
        let flat = c.flattened(MAX_ARC_TOLERANCE);
        assert!(flat.is_closed());
        assert!(!flat.has_arcs());
        assert!(flat.len() > 8);
        // Every flattened point lies within tol of the circle.
        for p in flat.positions() {
            let d = (p.fx().hypot(p.fy()) - 500_000.0).abs();
            assert!(d <= MAX_ARC_TOLERANCE.to_nm() as f64 + 1.0);
        }
    }

    #[test]
    fn test_obround_degenerates_to_circle() {
        let o = Path::obround(pt(5, 5), pt(5, 5), PositiveLength::nm(200_000));
        assert_eq!(o, Path::circle(pt(5, 5), PositiveLength::nm(200_000)));
    }

    #[test]
    fn test_obround_geometry() {
        let o = Path::obround(pt(0, 0), pt(1_000_000, 0), PositiveLength::nm(200_000));
        assert!(o.is_closed());
        let v = o.vertices();
        assert_eq!(v[0].position, pt(0, -100_000));
        assert_eq!(v[1].position, pt(1_000_000, -100_000));
        assert_eq!(v[1].arc_sweep, Angle::DEG_180);
        assert_eq!(v[2].position, pt(1_000_000, 100_000));
    }

    #[test]
    fn test_outline_strokes_per_segment() {
        let p = Path::from_points(&[pt(0, 0), pt(1_000_000, 0), pt(1_000_000, 1_000_000)]);
        let strokes = p.to_outline_strokes(PositiveLength::nm(100_000), MAX_ARC_TOLERANCE);
        assert_eq!(strokes.len(), 2);
        assert!(strokes.iter().all(Path::is_closed));
    }

    #[test]
    fn test_slot_shape_helpers() {
        assert!(Path::from_points(&[pt(0, 0)]).is_single_point());
        let slot = Path::line(pt(0, 0), pt(5_000_000, 0));
        assert!(!slot.is_single_point());
        assert_eq!(slot.segment_count(), 1);
        assert!(!slot.has_arcs());
        let multi = Path::from_points(&[pt(0, 0), pt(1, 0), pt(1, 1)]);
        assert_eq!(multi.segment_count(), 2);
        let curved = Path::new(vec![vtx(pt(0, 0), Angle::DEG_90), vtx(pt(1, 1), Angle::ZERO)]);
        assert!(curved.has_arcs());
    }

    #[test]
    fn test_reversed_round_trip() {
        let p = Path::new(vec![
            vtx(pt(0, 0), Angle::DEG_90),
            vtx(pt(1_000, 1_000), Angle::ZERO),
            vtx(pt(2_000, 0), Angle::ZERO),
        ]);
        let r = p.reversed();
        assert_eq!(r.vertices()[0].position, pt(2_000, 0));
        assert_eq!(r.vertices()[1].position, pt(1_000, 1_000));
        assert_eq!(r.vertices()[1].arc_sweep, -Angle::DEG_90);
        assert_eq!(r.reversed(), p);
    }
}
