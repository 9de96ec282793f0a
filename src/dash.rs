//! Path dashing
//!
//! Converts a path into alternating on/off runs measured along its arc
//! length. The output is a vertex stream of open subpaths, one per dash,
//! ready for [Stroke](crate::Stroke).

use crate::path::len;
use crate::path::PathCommand;
use crate::path::Vertex;
use crate::path::VertexSource;

/// Dash lengths and a starting offset into the pattern
///
/// Lengths alternate on, off, on, off. A pattern with an odd number of
/// entries repeats doubled, following the SVG `stroke-dasharray` rule,
/// so `[3]` means 3 on, 3 off.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashPattern {
    pub array: Vec<f64>,
    pub phase: f64,
}

impl DashPattern {
    pub fn new(array: Vec<f64>, phase: f64) -> Self {
        Self { array, phase }
    }

    /// Effective dash lengths with the odd-count doubling applied
    pub fn segments(&self) -> Vec<f64> {
        if self.array.len() % 2 == 1 {
            let mut out = self.array.clone();
            out.extend_from_slice(&self.array);
            out
        } else {
            self.array.clone()
        }
    }

    /// Sum of one pattern period
    pub fn total(&self) -> f64 {
        self.segments().iter().sum()
    }

    /// A pattern that cannot produce dashes renders the path solid
    pub fn is_solid(&self) -> bool {
        self.array.is_empty() || self.total() <= 0.0 || self.array.iter().any(|&d| d < 0.0)
    }
}

/// Dash converter over a vertex source
#[derive(Debug)]
pub struct Dash<T: VertexSource> {
    source: T,
    pattern: DashPattern,
}

impl<T> VertexSource for Dash<T>
where
    T: VertexSource,
{
    fn xconvert(&self) -> Vec<Vertex<f64>> {
        self.dash()
    }
}

impl<T> Dash<T>
where
    T: VertexSource,
{
    pub fn new(source: T) -> Self {
        Self {
            source,
            pattern: DashPattern::default(),
        }
    }

    pub fn with_pattern(source: T, pattern: DashPattern) -> Self {
        Self { source, pattern }
    }

    pub fn add_dash(&mut self, on: f64, off: f64) {
        self.pattern.array.push(on);
        self.pattern.array.push(off);
    }

    pub fn dash_start(&mut self, phase: f64) {
        self.pattern.phase = phase;
    }

    fn dash(&self) -> Vec<Vertex<f64>> {
        let verts = self.source.xconvert();
        if self.pattern.is_solid() {
            return verts;
        }
        let dashes = self.pattern.segments();
        let total: f64 = dashes.iter().sum();
        let mut out = vec![];
        let mut points: Vec<Vertex<f64>> = vec![];
        let mut closed = false;
        for v in verts.iter() {
            match v.cmd {
                PathCommand::MoveTo => {
                    self.dash_subpath(&points, closed, &dashes, total, &mut out);
                    points.clear();
                    closed = false;
                    points.push(*v);
                }
                PathCommand::LineTo => points.push(*v),
                PathCommand::Close => closed = true,
                PathCommand::Stop => break,
                PathCommand::QuadTo | PathCommand::CubicTo => {
                    unreachable!("curves are flattened before dashing")
                }
            }
        }
        self.dash_subpath(&points, closed, &dashes, total, &mut out);
        out
    }

    /// Walk one polyline, cutting it at pattern boundaries
    fn dash_subpath(
        &self,
        points: &[Vertex<f64>],
        closed: bool,
        dashes: &[f64],
        total: f64,
        out: &mut Vec<Vertex<f64>>,
    ) {
        if points.len() < 2 {
            return;
        }
        let mut pts: Vec<Vertex<f64>> = points.to_vec();
        if closed {
            pts.push(points[0]);
        }

        // Position the pattern cursor from the phase, wrapping whole
        // periods so any phase lands inside one pattern repetition
        let mut ds = self.pattern.phase.rem_euclid(total);
        let mut idx = 0;
        while ds >= dashes[idx] {
            ds -= dashes[idx];
            idx = (idx + 1) % dashes.len();
        }
        let mut rest = dashes[idx] - ds;
        let mut on = idx % 2 == 0;
        let mut pen_down = false;

        let mut cur = pts[0];
        for w in pts.windows(2) {
            let (a, b) = (w[0], w[1]);
            let seglen = len(&a, &b);
            if seglen == 0.0 {
                continue;
            }
            let mut travelled = len(&a, &cur);
            loop {
                let remain = seglen - travelled;
                if rest >= remain {
                    // Segment ends inside the current run
                    if on {
                        if !pen_down {
                            out.push(Vertex::move_to(cur.x, cur.y));
                            pen_down = true;
                        }
                        out.push(Vertex::line_to(b.x, b.y));
                    }
                    rest -= remain;
                    cur = b;
                    break;
                }
                // Run boundary falls inside this segment
                travelled += rest;
                let t = travelled / seglen;
                let bx = a.x + (b.x - a.x) * t;
                let by = a.y + (b.y - a.y) * t;
                if on {
                    if !pen_down {
                        out.push(Vertex::move_to(cur.x, cur.y));
                    }
                    out.push(Vertex::line_to(bx, by));
                }
                pen_down = false;
                cur = Vertex::line_to(bx, by);
                idx = (idx + 1) % dashes.len();
                rest = dashes[idx];
                on = !on;
            }
        }
    }
}
