//! Path storage and vertex sources
//!
//! A [Path] is an ordered sequence of move/line/curve/close commands with
//! `f64` coordinates. Consumers never see the curve commands: converting a
//! path through [VertexSource::xconvert] flattens curves into line
//! segments within the path's flatness tolerance.

use crate::curve;

/// Anything that can produce a flattened vertex sequence
///
/// The produced sequence contains only `MoveTo`, `LineTo` and `Close`
/// commands; it is finite and restartable (conversion is a pure function
/// of the source's state).
pub trait VertexSource {
    fn xconvert(&self) -> Vec<Vertex<f64>>;
}

impl<'a, T: VertexSource + ?Sized> VertexSource for &'a T {
    fn xconvert(&self) -> Vec<Vertex<f64>> {
        (**self).xconvert()
    }
}

/// Path drawing command attached to a vertex
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCommand {
    Stop,
    MoveTo,
    LineTo,
    /// Quadratic segment; occupies two vertices (control, end)
    QuadTo,
    /// Cubic segment; occupies three vertices (control1, control2, end)
    CubicTo,
    Close,
}

impl Default for PathCommand {
    fn default() -> PathCommand {
        PathCommand::MoveTo
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vertex<T> {
    pub x: T,
    pub y: T,
    pub cmd: PathCommand,
}

impl<T> Vertex<T> {
    pub fn new(x: T, y: T, cmd: PathCommand) -> Self {
        Self { x, y, cmd }
    }
    pub fn move_to(x: T, y: T) -> Self {
        Self::new(x, y, PathCommand::MoveTo)
    }
    pub fn line_to(x: T, y: T) -> Self {
        Self::new(x, y, PathCommand::LineTo)
    }
    pub fn close_polygon(x: T, y: T) -> Self {
        Self::new(x, y, PathCommand::Close)
    }
}

/// Distance between two vertices
pub fn len(a: &Vertex<f64>, b: &Vertex<f64>) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Cross product of the turn p1 -> p2 -> p
pub fn cross(p1: &Vertex<f64>, p2: &Vertex<f64>, p: &Vertex<f64>) -> f64 {
    (p.x - p2.x) * (p2.y - p1.y) - (p.y - p2.y) * (p2.x - p1.x)
}

/// Split a vertex sequence into subpath index ranges, one per MoveTo
///
/// Returns inclusive (start, end) pairs.
pub fn split(verts: &[Vertex<f64>]) -> Vec<(usize, usize)> {
    let mut pairs = vec![];
    let mut start = None;
    for (i, v) in verts.iter().enumerate() {
        match v.cmd {
            PathCommand::MoveTo => {
                if let Some(s) = start {
                    if i > s {
                        pairs.push((s, i - 1));
                    }
                }
                start = Some(i);
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if verts.len() > s {
            pairs.push((s, verts.len() - 1));
        }
    }
    pairs
}

/// Default flatness tolerance in device units
const DEFAULT_TOLERANCE: f64 = 0.25;

/// Mutable path builder
///
/// Paths are reusable: `remove_all` resets the builder without releasing
/// its storage.
#[derive(Debug, Clone)]
pub struct Path {
    pub vertices: Vec<Vertex<f64>>,
    tolerance: f64,
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Path {
    /// Flatten curve segments within the path tolerance
    fn xconvert(&self) -> Vec<Vertex<f64>> {
        self.flatten(self.tolerance)
    }
}

impl Path {
    pub fn new() -> Self {
        Self {
            vertices: vec![],
            tolerance: DEFAULT_TOLERANCE,
        }
    }
    /// Remove all vertices, keeping the allocation for reuse
    pub fn remove_all(&mut self) {
        self.vertices.clear();
    }
    /// Change the curve flatness tolerance (device units, > 0)
    pub fn flatness(&mut self, tolerance: f64) {
        if tolerance > 0.0 {
            self.tolerance = tolerance;
        }
    }
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.vertices.push(Vertex::move_to(x, y));
    }
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.vertices.push(Vertex::line_to(x, y));
    }
    /// Quadratic Bezier from the current point through (`cx`,`cy`)
    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.vertices.push(Vertex::new(cx, cy, PathCommand::QuadTo));
        self.vertices.push(Vertex::new(x, y, PathCommand::QuadTo));
    }
    /// Cubic Bezier from the current point through two control points
    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.vertices.push(Vertex::new(c1x, c1y, PathCommand::CubicTo));
        self.vertices.push(Vertex::new(c2x, c2y, PathCommand::CubicTo));
        self.vertices.push(Vertex::new(x, y, PathCommand::CubicTo));
    }
    pub fn close_polygon(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let n = self.vertices.len();
        let last = self.vertices[n - 1];
        if last.cmd == PathCommand::LineTo
            || last.cmd == PathCommand::QuadTo
            || last.cmd == PathCommand::CubicTo
        {
            self.vertices.push(Vertex::close_polygon(last.x, last.y));
        }
    }
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Flatten curve commands into line segments within `tolerance`
    ///
    /// Each curve segment is subdivided independently; there is no state
    /// carried from one segment to the next.
    pub fn flatten(&self, tolerance: f64) -> Vec<Vertex<f64>> {
        let mut out: Vec<Vertex<f64>> = Vec::with_capacity(self.vertices.len());
        let mut i = 0;
        let n = self.vertices.len();
        while i < n {
            let v = self.vertices[i];
            match v.cmd {
                PathCommand::MoveTo | PathCommand::LineTo | PathCommand::Close => {
                    out.push(v);
                    i += 1;
                }
                PathCommand::Stop => {
                    i += 1;
                }
                PathCommand::QuadTo => {
                    // Control then end; a missing end or current point
                    // degrades to a straight segment
                    if i + 1 >= n {
                        out.push(Vertex::line_to(v.x, v.y));
                        i += 1;
                        continue;
                    }
                    let end = self.vertices[i + 1];
                    match out.last().copied() {
                        Some(p0) => {
                            curve::flatten_quad(
                                p0.x, p0.y, v.x, v.y, end.x, end.y, tolerance, &mut out,
                            );
                        }
                        None => out.push(Vertex::move_to(end.x, end.y)),
                    }
                    i += 2;
                }
                PathCommand::CubicTo => {
                    if i + 2 >= n {
                        out.push(Vertex::line_to(v.x, v.y));
                        i += 1;
                        continue;
                    }
                    let c2 = self.vertices[i + 1];
                    let end = self.vertices[i + 2];
                    match out.last().copied() {
                        Some(p0) => {
                            curve::flatten_cubic(
                                p0.x, p0.y, v.x, v.y, c2.x, c2.y, end.x, end.y, tolerance,
                                &mut out,
                            );
                        }
                        None => out.push(Vertex::move_to(end.x, end.y)),
                    }
                    i += 3;
                }
            }
        }
        out
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathOrientation {
    Clockwise,
    CounterClockwise,
}

/// Normalize the winding direction of every subpath
pub fn arrange_orientations(path: &mut Path, dir: PathOrientation) {
    let pairs = split(&path.vertices);
    for (s, e) in pairs {
        let pdir = perceive_polygon_orientation(&path.vertices[s..=e]);
        if pdir != dir {
            invert_polygon(&mut path.vertices[s..=e]);
        }
    }
}

/// Reverse a polygon's winding in place
///
/// The geometric points between the `MoveTo` and an optional trailing
/// `Close` are reversed, and the `Close` is re-pointed at the new
/// first vertex.
pub fn invert_polygon(v: &mut [Vertex<f64>]) {
    let n = v.len();
    if n < 2 {
        return;
    }
    let closed = v[n - 1].cmd == PathCommand::Close;
    let m = if closed { n - 1 } else { n };
    v[..m].reverse();
    for p in v[..m].iter_mut() {
        p.cmd = PathCommand::LineTo;
    }
    v[0].cmd = PathCommand::MoveTo;
    if closed {
        v[n - 1] = Vertex::close_polygon(v[0].x, v[0].y);
    }
}

/// Signed-area orientation of a polygon's vertices
pub fn perceive_polygon_orientation(vertices: &[Vertex<f64>]) -> PathOrientation {
    let n = vertices.len();
    if n == 0 {
        return PathOrientation::CounterClockwise;
    }
    let p0 = vertices[0];
    let mut area = 0.0;
    for (i, p1) in vertices.iter().enumerate() {
        let p2 = vertices[(i + 1) % n];
        let (x1, y1) = if p1.cmd == PathCommand::Close {
            (p0.x, p0.y)
        } else {
            (p1.x, p1.y)
        };
        let (x2, y2) = if p2.cmd == PathCommand::Close {
            (p0.x, p0.y)
        } else {
            (p2.x, p2.y)
        };
        area += x1 * y2 - y1 * x2;
    }
    if area < 0.0 {
        PathOrientation::Clockwise
    } else {
        PathOrientation::CounterClockwise
    }
}

use crate::clip::Rectangle;

/// Bounding rectangle of a vertex source, `None` for an empty source
pub fn bounding_rect<VS: VertexSource>(source: &VS) -> Option<Rectangle<f64>> {
    let pts = source.xconvert();
    if pts.is_empty() {
        None
    } else {
        let mut r = Rectangle::new(pts[0].x, pts[0].y, pts[0].x, pts[0].y);
        for p in &pts {
            r.expand(p.x, p.y);
        }
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_finds_subpaths() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(1.0, 0.0);
        p.move_to(5.0, 5.0);
        p.line_to(6.0, 5.0);
        p.line_to(6.0, 6.0);
        let pairs = split(&p.vertices);
        assert_eq!(pairs, vec![(0, 1), (2, 4)]);
    }

    #[test]
    fn close_requires_segments() {
        let mut p = Path::new();
        p.close_polygon();
        assert!(p.is_empty());
        p.move_to(0.0, 0.0);
        p.close_polygon();
        assert_eq!(p.vertices.len(), 1);
        p.line_to(1.0, 1.0);
        p.close_polygon();
        assert_eq!(p.vertices[2].cmd, PathCommand::Close);
    }

    #[test]
    fn invert_keeps_the_outline_geometry() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.close_polygon();
        invert_polygon(&mut p.vertices);
        let pts: Vec<_> = p.vertices.iter().map(|v| (v.x, v.y)).collect();
        assert_eq!(
            pts,
            vec![(10.0, 10.0), (10.0, 0.0), (0.0, 0.0), (10.0, 10.0)]
        );
        assert_eq!(p.vertices[0].cmd, PathCommand::MoveTo);
        assert_eq!(p.vertices[1].cmd, PathCommand::LineTo);
        assert_eq!(p.vertices[3].cmd, PathCommand::Close);
    }

    #[test]
    fn orientation_detects_and_inverts() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.close_polygon();
        assert_eq!(
            perceive_polygon_orientation(&p.vertices),
            PathOrientation::CounterClockwise
        );
        arrange_orientations(&mut p, PathOrientation::Clockwise);
        assert_eq!(
            perceive_polygon_orientation(&p.vertices),
            PathOrientation::Clockwise
        );
    }

    #[test]
    fn bounding_rect_covers_flattened_curves() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.quad_to(5.0, 10.0, 10.0, 0.0);
        let r = bounding_rect(&p).unwrap();
        assert_eq!((r.x1(), r.y1()), (0.0, 0.0));
        assert_eq!(r.x2(), 10.0);
        // The curve's apex is at y = 5, within flattening tolerance
        assert!((r.y2() - 5.0).abs() < 0.25);

        assert!(bounding_rect(&Path::new()).is_none());
    }

    #[test]
    fn xconvert_flattens_curves() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.quad_to(5.0, 10.0, 10.0, 0.0);
        let flat = p.xconvert();
        assert!(flat.len() > 3, "curve should subdivide, got {}", flat.len());
        assert!(flat
            .iter()
            .all(|v| v.cmd == PathCommand::MoveTo || v.cmd == PathCommand::LineTo));
        let end = flat.last().unwrap();
        assert!((end.x - 10.0).abs() < 1e-9 && end.y.abs() < 1e-9);
    }
}
