//! Path stroking
//!
//! Expands a centerline into a filled outline polygon. Each subpath is
//! walked forward and backward at half the stroke width, with caps at
//! open ends and joins between segments.
//!
//! ```
//! use subpix::{Path, Stroke, LineCap, LineJoin};
//!
//! let mut path = Path::new();
//! path.move_to(0.0, 0.0);
//! path.line_to(100.0, 100.0);
//! path.line_to(200.0, 50.0);
//!
//! let mut stroke = Stroke::new(path);
//! stroke.width(2.5);
//! stroke.line_cap(LineCap::Round);
//! stroke.line_join(LineJoin::Miter);
//! ```

use crate::path::cross;
use crate::path::len;
use crate::path::split;
use crate::path::PathCommand;
use crate::path::Vertex;
use crate::path::VertexSource;

use std::f64::consts::PI;

/// Cap style at open subpath ends
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LineCap {
    Butt,
    Square,
    Round,
}

/// Join style on the outside of a corner
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LineJoin {
    Miter,
    /// Miter that falls back to a plain bevel past the limit
    MiterRevert,
    Round,
    Bevel,
    /// Miter that falls back to a round join past the limit
    MiterRound,
}

/// Join style on the inside of a corner
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InnerJoin {
    Bevel,
    Miter,
    Jag,
    Round,
}

/// Stroke outline generator over a vertex source
#[derive(Debug)]
pub struct Stroke<T: VertexSource> {
    source: T,
    /// Half the stroke width
    width: f64,
    width_abs: f64,
    /// Collinearity threshold for the bevel-vs-miter shortcut
    width_eps: f64,
    width_sign: f64,
    miter_limit: f64,
    inner_miter_limit: f64,
    approx_scale: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    inner_join: InnerJoin,
}

impl<T> VertexSource for Stroke<T>
where
    T: VertexSource,
{
    fn xconvert(&self) -> Vec<Vertex<f64>> {
        self.stroke()
    }
}

macro_rules! prev {
    ($i:expr, $n:expr) => {
        ($i + $n - 1) % $n
    };
}
macro_rules! next {
    ($i:expr, $n:expr) => {
        ($i + 1) % $n
    };
}

impl<T> Stroke<T>
where
    T: VertexSource,
{
    pub fn new(source: T) -> Self {
        Self {
            source,
            width: 0.5,
            width_abs: 0.5,
            width_eps: 0.5 / 1024.0,
            width_sign: 1.0,
            miter_limit: 4.0,
            inner_miter_limit: 1.01,
            approx_scale: 1.0,
            inner_join: InnerJoin::Miter,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
        }
    }
    /// Set the full stroke width in pixels
    pub fn width(&mut self, width: f64) {
        self.width = width / 2.0;
        self.width_abs = self.width.abs();
        self.width_sign = if self.width < 0.0 { -1.0 } else { 1.0 };
    }
    pub fn line_cap(&mut self, line_cap: LineCap) {
        self.line_cap = line_cap;
    }
    pub fn line_join(&mut self, line_join: LineJoin) {
        self.line_join = line_join;
    }
    pub fn inner_join(&mut self, inner_join: InnerJoin) {
        self.inner_join = inner_join;
    }
    /// Maximum miter length as a multiple of the half width
    pub fn miter_limit(&mut self, miter_limit: f64) {
        self.miter_limit = miter_limit;
    }
    pub fn inner_miter_limit(&mut self, inner_miter_limit: f64) {
        self.inner_miter_limit = inner_miter_limit;
    }
    pub fn approximation_scale(&mut self, scale: f64) {
        self.approx_scale = scale;
    }

    fn calc_cap(&self, v0: &Vertex<f64>, v1: &Vertex<f64>) -> Vec<Vertex<f64>> {
        let mut out = vec![];
        let dx = v1.x - v0.x;
        let dy = v1.y - v0.y;
        let len = (dx * dx + dy * dy).sqrt();
        let dx1 = self.width * dy / len;
        let dy1 = self.width * dx / len;

        match self.line_cap {
            LineCap::Square => {
                let dx2 = dy1 * self.width_sign;
                let dy2 = dx1 * self.width_sign;
                out.push(Vertex::line_to(v0.x - dx1 - dx2, v0.y + dy1 - dy2));
                out.push(Vertex::line_to(v0.x + dx1 - dx2, v0.y - dy1 - dy2));
            }
            LineCap::Butt => {
                out.push(Vertex::line_to(v0.x - dx1, v0.y + dy1));
                out.push(Vertex::line_to(v0.x + dx1, v0.y - dy1));
            }
            LineCap::Round => {
                let da =
                    2.0 * (self.width_abs / (self.width_abs + 0.125 / self.approx_scale)).acos();
                let n = (PI / da).round() as usize;
                let da = PI / (n + 1) as f64;
                out.push(Vertex::line_to(v0.x - dx1, v0.y + dy1));
                if self.width_sign > 0.0 {
                    let mut a1 = dy1.atan2(-dx1);
                    a1 += da;
                    for _ in 0..n {
                        out.push(Vertex::line_to(
                            v0.x + a1.cos() * self.width,
                            v0.y + a1.sin() * self.width,
                        ));
                        a1 += da;
                    }
                } else {
                    let mut a1 = (-dy1).atan2(dx1);
                    a1 -= da;
                    for _ in 0..n {
                        out.push(Vertex::line_to(
                            v0.x + a1.cos() * self.width,
                            v0.y + a1.sin() * self.width,
                        ));
                        a1 -= da;
                    }
                }
                out.push(Vertex::line_to(v0.x + dx1, v0.y - dy1));
            }
        }
        out
    }

    /// Arc from direction (dx1,dy1) to (dx2,dy2) around (x,y)
    fn calc_arc(&self, x: f64, y: f64, dx1: f64, dy1: f64, dx2: f64, dy2: f64) -> Vec<Vertex<f64>> {
        let mut out = vec![];
        let mut a1 = (dy1 * self.width_sign).atan2(dx1 * self.width_sign);
        let mut a2 = (dy2 * self.width_sign).atan2(dx2 * self.width_sign);
        let mut da = 2.0 * (self.width_abs / (self.width_abs + 0.125 / self.approx_scale)).acos();
        out.push(Vertex::line_to(x + dx1, y + dy1));
        if self.width_sign > 0.0 {
            if a1 > a2 {
                a2 += 2.0 * PI;
            }
            let n = ((a2 - a1) / da) as i64;
            da = (a2 - a1) / (n + 1) as f64;
            a1 += da;
            for _ in 0..n {
                out.push(Vertex::line_to(
                    x + a1.cos() * self.width,
                    y + a1.sin() * self.width,
                ));
                a1 += da;
            }
        } else {
            if a1 < a2 {
                a2 -= 2.0 * PI;
            }
            let n = ((a1 - a2) / da) as i64;
            da = (a1 - a2) / (n + 1) as f64;
            a1 -= da;
            for _ in 0..n {
                out.push(Vertex::line_to(
                    x + a1.cos() * self.width,
                    y + a1.sin() * self.width,
                ));
                a1 -= da;
            }
        }
        out.push(Vertex::line_to(x + dx2, y + dy2));
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_miter(
        &self,
        p0: &Vertex<f64>,
        p1: &Vertex<f64>,
        p2: &Vertex<f64>,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
        join: LineJoin,
        mlimit: f64,
        dbevel: f64,
    ) -> Vec<Vertex<f64>> {
        let mut out = vec![];
        let mut xi = p1.x;
        let mut yi = p1.y;
        let mut di = 1.0;
        let lim = self.width_abs * mlimit;
        let mut miter_limit_exceeded = true;
        let mut intersection_failed = true;

        if let Some((xit, yit)) = calc_intersection(
            p0.x + dx1,
            p0.y - dy1,
            p1.x + dx1,
            p1.y - dy1,
            p1.x + dx2,
            p1.y - dy2,
            p2.x + dx2,
            p2.y - dy2,
        ) {
            xi = xit;
            yi = yit;
            let pz = Vertex::line_to(xi, yi);
            di = len(p1, &pz);
            if di <= lim {
                out.push(Vertex::line_to(xi, yi));
                miter_limit_exceeded = false;
            }
            intersection_failed = false;
        } else {
            // The three points are almost collinear. Check whether the
            // next segment continues the previous one or doubles back,
            // using the perpendicular through p1.
            let x2 = p1.x + dx1;
            let y2 = p1.y - dy1;
            let pz = Vertex::line_to(x2, y2);
            if (cross(p0, p1, &pz) < 0.0) == (cross(p1, p2, &pz) < 0.0) {
                out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                miter_limit_exceeded = false;
            }
        }

        if miter_limit_exceeded {
            match join {
                LineJoin::MiterRevert => {
                    // SVG and PDF compatible: fall back to a plain bevel
                    out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                    out.push(Vertex::line_to(p1.x + dx2, p1.y - dy2));
                }
                LineJoin::Round | LineJoin::MiterRound => {
                    out.extend(self.calc_arc(p1.x, p1.y, dx1, -dy1, dx2, -dy2))
                }
                _ => {
                    if intersection_failed {
                        let mlimit = mlimit * self.width_sign;
                        out.push(Vertex::line_to(
                            p1.x + dx1 + dy1 * mlimit,
                            p1.y - dy1 + dx1 * mlimit,
                        ));
                        out.push(Vertex::line_to(
                            p1.x + dx2 - dy2 * mlimit,
                            p1.y - dy2 - dx2 * mlimit,
                        ));
                    } else {
                        // Cut the miter point back to the limit distance.
                        // The linear interpolation overshoots on sharp
                        // corners, so the result is pulled back onto the
                        // limit circle around the joint.
                        let x1 = p1.x + dx1;
                        let y1 = p1.y - dy1;
                        let x2 = p1.x + dx2;
                        let y2 = p1.y - dy2;
                        let di = (lim - dbevel) / (di - dbevel);
                        let clamp = |px: f64, py: f64| {
                            let d = ((px - p1.x).powi(2) + (py - p1.y).powi(2)).sqrt();
                            if d > lim {
                                let s = lim / d;
                                (p1.x + (px - p1.x) * s, p1.y + (py - p1.y) * s)
                            } else {
                                (px, py)
                            }
                        };
                        let (ax, ay) = clamp(x1 + (xi - x1) * di, y1 + (yi - y1) * di);
                        let (bx, by) = clamp(x2 + (xi - x2) * di, y2 + (yi - y2) * di);
                        out.push(Vertex::line_to(ax, ay));
                        out.push(Vertex::line_to(bx, by));
                    }
                }
            }
        }
        out
    }

    fn calc_join(&self, p0: &Vertex<f64>, p1: &Vertex<f64>, p2: &Vertex<f64>) -> Vec<Vertex<f64>> {
        let mut out = vec![];
        let len1 = len(p1, p0);
        let len2 = len(p2, p1);
        // Coincident points carry no direction, skip the join
        if len1 == 0.0 || len2 == 0.0 {
            return out;
        }
        let dx1 = self.width * (p1.y - p0.y) / len1;
        let dy1 = self.width * (p1.x - p0.x) / len1;
        let dx2 = self.width * (p2.y - p1.y) / len2;
        let dy2 = self.width * (p2.x - p1.x) / len2;
        let cp = cross(p0, p1, p2);

        if cp != 0.0 && cp.is_sign_positive() == self.width.is_sign_positive() {
            // Inner join
            let mut limit = if len1 < len2 {
                len1 / self.width_abs
            } else {
                len2 / self.width_abs
            };
            if limit < self.inner_miter_limit {
                limit = self.inner_miter_limit;
            }
            match self.inner_join {
                InnerJoin::Bevel => {
                    out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                    out.push(Vertex::line_to(p1.x + dx2, p1.y - dy2));
                }
                InnerJoin::Miter => {
                    out.extend(self.calc_miter(
                        p0,
                        p1,
                        p2,
                        dx1,
                        dy1,
                        dx2,
                        dy2,
                        LineJoin::MiterRevert,
                        limit,
                        0.0,
                    ));
                }
                InnerJoin::Jag | InnerJoin::Round => {
                    let cp = (dx1 - dx2).powi(2) + (dy1 - dy2).powi(2);
                    if cp < len1.powi(2) && cp < len2.powi(2) {
                        out.extend(self.calc_miter(
                            p0,
                            p1,
                            p2,
                            dx1,
                            dy1,
                            dx2,
                            dy2,
                            LineJoin::MiterRevert,
                            limit,
                            0.0,
                        ));
                    } else if self.inner_join == InnerJoin::Jag {
                        out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                        out.push(Vertex::line_to(p1.x, p1.y));
                        out.push(Vertex::line_to(p1.x + dx2, p1.y - dy2));
                    } else {
                        out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                        out.push(Vertex::line_to(p1.x, p1.y));
                        out.extend(self.calc_arc(p1.x, p1.y, dx2, -dy2, dx1, -dy1));
                        out.push(Vertex::line_to(p1.x, p1.y));
                        out.push(Vertex::line_to(p1.x + dx2, p1.y - dy2));
                    }
                }
            }
        } else {
            // Outer join
            let dx = (dx1 + dx2) / 2.0;
            let dy = (dy1 + dy2) / 2.0;
            let dbevel = (dx * dx + dy * dy).sqrt();

            if (self.line_join == LineJoin::Round || self.line_join == LineJoin::Bevel)
                && self.approx_scale * (self.width_abs - dbevel) < self.width_eps
            {
                // Almost collinear segments: a single miter point is
                // indistinguishable from the bevel or round join and
                // keeps the outline smaller.
                if let Some((dx, dy)) = calc_intersection(
                    p0.x + dx1,
                    p0.y - dy1,
                    p1.x + dx1,
                    p1.y - dy1,
                    p1.x + dx2,
                    p1.y - dy2,
                    p2.x + dx2,
                    p2.y - dy2,
                ) {
                    out.push(Vertex::line_to(dx, dy));
                } else {
                    out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                }
                return out;
            }
            match self.line_join {
                LineJoin::Miter | LineJoin::MiterRevert | LineJoin::MiterRound => {
                    out.extend(self.calc_miter(
                        p0,
                        p1,
                        p2,
                        dx1,
                        dy1,
                        dx2,
                        dy2,
                        self.line_join,
                        self.miter_limit,
                        dbevel,
                    ))
                }
                LineJoin::Round => {
                    out.extend(self.calc_arc(p1.x, p1.y, dx1, -dy1, dx2, -dy2))
                }
                LineJoin::Bevel => {
                    out.push(Vertex::line_to(p1.x + dx1, p1.y - dy1));
                    out.push(Vertex::line_to(p1.x + dx2, p1.y - dy2));
                }
            }
        }
        out
    }

    /// Outline polygon for a subpath that collapsed to a single point
    ///
    /// Round caps give a polygonal dot, square caps an axis-aligned
    /// square. Butt caps produce nothing for a zero-length segment.
    fn calc_dot(&self, v: &Vertex<f64>) -> Vec<Vertex<f64>> {
        let mut out = vec![];
        let r = self.width_abs;
        match self.line_cap {
            LineCap::Butt => {}
            LineCap::Square => {
                out.push(Vertex::move_to(v.x - r, v.y - r));
                out.push(Vertex::line_to(v.x + r, v.y - r));
                out.push(Vertex::line_to(v.x + r, v.y + r));
                out.push(Vertex::line_to(v.x - r, v.y + r));
                out.push(Vertex::close_polygon(v.x - r, v.y + r));
            }
            LineCap::Round => {
                let da = 2.0 * (r / (r + 0.125 / self.approx_scale)).acos();
                let n = ((2.0 * PI / da).ceil() as usize).max(4);
                let da = 2.0 * PI / n as f64;
                for i in 0..n {
                    let a = da * i as f64;
                    let x = v.x + a.cos() * r;
                    let y = v.y + a.sin() * r;
                    if i == 0 {
                        out.push(Vertex::move_to(x, y));
                    } else {
                        out.push(Vertex::line_to(x, y));
                    }
                }
                let last = out[out.len() - 1];
                out.push(Vertex::close_polygon(last.x, last.y));
            }
        }
        out
    }

    fn stroke(&self) -> Vec<Vertex<f64>> {
        let mut all_out = vec![];
        if self.width <= 0.0 {
            return all_out;
        }
        let v0 = &self.source.xconvert();
        // Walk each subpath separately
        let pairs = split(v0);
        for (m1, m2) in pairs {
            let mut outf = vec![];
            let v = clean_path(&v0[m1..=m2]);
            if v.is_empty() {
                continue;
            }
            let closed = is_path_closed(&v);
            let n = if closed { v.len() - 1 } else { v.len() };
            // Subpath collapsed to a point
            if n <= 1 {
                all_out.extend(self.calc_dot(&v[0]));
                continue;
            }
            let (n1, n2) = if closed { (0, n) } else { (1, n - 1) };

            if !closed {
                outf.extend(self.calc_cap(&v[0], &v[1]));
            }
            for i in n1..n2 {
                outf.extend(self.calc_join(&v[prev!(i, n)], &v[i], &v[next!(i, n)]));
            }
            if outf.is_empty() {
                continue;
            }
            if closed {
                let last = outf[outf.len() - 1];
                outf.push(Vertex::close_polygon(last.x, last.y));
            }

            let mut outb = vec![];
            if !closed {
                outb.extend(self.calc_cap(&v[n - 1], &v[n - 2]));
            }
            for i in (n1..n2).rev() {
                outb.extend(self.calc_join(&v[next!(i, n)], &v[i], &v[prev!(i, n)]));
            }
            if !outb.is_empty() {
                if closed {
                    // Inner wall runs as its own subpath, opposite winding
                    outb[0].cmd = PathCommand::MoveTo;
                }
                let last = outb[outb.len() - 1];
                outb.push(Vertex::close_polygon(last.x, last.y));
            }

            outf[0].cmd = PathCommand::MoveTo;
            outf.extend(outb);
            all_out.extend(outf);
        }
        all_out
    }
}

/// Intersection of the lines (a,b) and (c,d)
///
/// Returns `None` for parallel or coincident lines.
#[allow(clippy::too_many_arguments)]
fn calc_intersection(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    dx: f64,
    dy: f64,
) -> Option<(f64, f64)> {
    let intersection_epsilon = 1.0e-30;
    let num = (ay - cy) * (dx - cx) - (ax - cx) * (dy - cy);
    let den = (bx - ax) * (dy - cy) - (by - ay) * (dx - cx);
    if den.abs() < intersection_epsilon {
        return None;
    }
    let r = num / den;
    Some((ax + r * (bx - ax), ay + r * (by - ay)))
}

fn is_path_closed(verts: &[Vertex<f64>]) -> bool {
    verts.iter().any(|v| v.cmd == PathCommand::Close)
}

/// Remove vertices closer than 1e-6 to their predecessor, and for
/// closed paths drop trailing points coincident with the start
fn clean_path(v: &[Vertex<f64>]) -> Vec<Vertex<f64>> {
    let mut mark = vec![];
    if !v.is_empty() {
        mark.push(0);
    }
    for i in 1..v.len() {
        match v[i].cmd {
            PathCommand::LineTo => {
                if len(&v[i - 1], &v[i]) >= 1e-6 {
                    mark.push(i);
                }
            }
            _ => mark.push(i),
        }
    }
    if mark.is_empty() {
        return vec![];
    }
    let mut out: Vec<_> = mark.into_iter().map(|i| v[i]).collect();

    if !is_path_closed(&out) {
        return out;
    }
    let first = out[0];
    while let Some(i) = last_line_to(&out) {
        let last = out[i];
        if len(&first, &last) >= 1e-6 {
            break;
        }
        out.remove(i);
    }
    out
}

fn last_line_to(v: &[Vertex<f64>]) -> Option<usize> {
    (1..v.len()).rev().find(|&i| v[i].cmd == PathCommand::LineTo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    fn verts(s: &impl VertexSource) -> Vec<Vertex<f64>> {
        s.xconvert()
    }

    #[test]
    fn open_segment_butt_cap_is_a_quad() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        let mut s = Stroke::new(p);
        s.width(2.0);
        let out = verts(&s);
        // Two caps of two points each plus the closing vertex
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].cmd, PathCommand::MoveTo);
        assert_eq!(out[4].cmd, PathCommand::Close);
        let ys: Vec<f64> = out[..4].iter().map(|v| v.y).collect();
        assert!(ys.iter().all(|y| (y.abs() - 1.0).abs() < 1e-9));
    }

    #[test]
    fn zero_width_produces_nothing() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        let mut s = Stroke::new(p);
        s.width(0.0);
        assert!(verts(&s).is_empty());
    }

    #[test]
    fn repeated_points_do_not_panic() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        let mut s = Stroke::new(p);
        s.width(2.0);
        assert!(!verts(&s).is_empty());
    }

    #[test]
    fn dot_with_round_cap_becomes_polygon() {
        let mut p = Path::new();
        p.move_to(5.0, 5.0);
        p.line_to(5.0, 5.0);
        let mut s = Stroke::new(p);
        s.width(4.0);
        s.line_cap(LineCap::Round);
        let out = verts(&s);
        assert!(out.len() >= 5);
        for v in out.iter().filter(|v| v.cmd != PathCommand::Close) {
            let d = ((v.x - 5.0).powi(2) + (v.y - 5.0).powi(2)).sqrt();
            assert!((d - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn dot_with_butt_cap_is_empty() {
        let mut p = Path::new();
        p.move_to(5.0, 5.0);
        p.line_to(5.0, 5.0);
        let mut s = Stroke::new(p);
        s.width(4.0);
        assert!(verts(&s).is_empty());
    }

    #[test]
    fn closed_path_yields_two_walls() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.line_to(0.0, 10.0);
        p.close_polygon();
        let mut s = Stroke::new(p);
        s.width(2.0);
        let out = verts(&s);
        let moves = out.iter().filter(|v| v.cmd == PathCommand::MoveTo).count();
        let closes = out.iter().filter(|v| v.cmd == PathCommand::Close).count();
        assert_eq!(moves, 2);
        assert_eq!(closes, 2);
    }

    #[test]
    fn sharp_corner_respects_miter_limit() {
        // A hairpin corner would shoot a long miter spike
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(20.0, 0.0);
        p.line_to(0.0, 1.0);
        let mut s = Stroke::new(p);
        s.width(4.0);
        s.miter_limit(2.0);
        let out = verts(&s);
        for v in out.iter().filter(|v| v.cmd != PathCommand::Close) {
            assert!(
                v.x <= 20.0 + 2.0 * 2.0 + 1e-6,
                "miter spike escaped the limit: {:?}",
                v
            );
        }
    }
}
