//! Adaptive flattening of quadratic and cubic Bezier segments
//!
//! Recursive de Casteljau subdivision: a segment is split at its midpoint
//! until the control polygon deviates from the chord by less than the
//! flatness tolerance. Degenerate input (collinear or coincident control
//! points) terminates through the collinear branch or, in the worst case,
//! the recursion limit, and flattens to a straight segment.
//!
//! Each call handles exactly one curve segment; no state crosses segment
//! boundaries.

use crate::path::Vertex;

const COLLINEARITY_EPSILON: f64 = 1e-30;
const RECURSION_LIMIT: u32 = 32;

fn sq_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

/// Flatten a quadratic Bezier into `LineTo` vertices
///
/// The current point (`x1`,`y1`) is assumed to be in `out` already; the
/// subdivision points and the end point are appended.
pub fn flatten_quad(
    x1: f64,
    y1: f64,
    cx: f64,
    cy: f64,
    x2: f64,
    y2: f64,
    tolerance: f64,
    out: &mut Vec<Vertex<f64>>,
) {
    let tol_sq = tolerance * tolerance;
    quad_recursive(x1, y1, cx, cy, x2, y2, tol_sq, 0, out);
    out.push(Vertex::line_to(x2, y2));
}

#[allow(clippy::too_many_arguments)]
fn quad_recursive(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    tol_sq: f64,
    level: u32,
    out: &mut Vec<Vertex<f64>>,
) {
    if level > RECURSION_LIMIT {
        return;
    }

    let x12 = (x1 + x2) / 2.0;
    let y12 = (y1 + y2) / 2.0;
    let x23 = (x2 + x3) / 2.0;
    let y23 = (y2 + y3) / 2.0;
    let x123 = (x12 + x23) / 2.0;
    let y123 = (y12 + y23) / 2.0;

    let dx = x3 - x1;
    let dy = y3 - y1;
    let d = ((x2 - x3) * dy - (y2 - y3) * dx).abs();

    if d > COLLINEARITY_EPSILON {
        if d * d <= tol_sq * (dx * dx + dy * dy) {
            out.push(Vertex::line_to(x123, y123));
            return;
        }
    } else {
        // Control point collinear with the chord
        let da = dx * dx + dy * dy;
        let dist = if da == 0.0 {
            sq_distance(x1, y1, x2, y2)
        } else {
            let t = ((x2 - x1) * dx + (y2 - y1) * dy) / da;
            if t > 0.0 && t < 1.0 {
                // Between the endpoints: already a straight line
                return;
            }
            if t <= 0.0 {
                sq_distance(x2, y2, x1, y1)
            } else {
                sq_distance(x2, y2, x3, y3)
            }
        };
        if dist < tol_sq {
            out.push(Vertex::line_to(x2, y2));
            return;
        }
    }

    quad_recursive(x1, y1, x12, y12, x123, y123, tol_sq, level + 1, out);
    quad_recursive(x123, y123, x23, y23, x3, y3, tol_sq, level + 1, out);
}

/// Flatten a cubic Bezier into `LineTo` vertices
///
/// Same contract as [flatten_quad]: current point already emitted, end
/// point appended here.
#[allow(clippy::too_many_arguments)]
pub fn flatten_cubic(
    x1: f64,
    y1: f64,
    c1x: f64,
    c1y: f64,
    c2x: f64,
    c2y: f64,
    x2: f64,
    y2: f64,
    tolerance: f64,
    out: &mut Vec<Vertex<f64>>,
) {
    let tol_sq = tolerance * tolerance;
    cubic_recursive(x1, y1, c1x, c1y, c2x, c2y, x2, y2, tol_sq, 0, out);
    out.push(Vertex::line_to(x2, y2));
}

#[allow(clippy::too_many_arguments)]
fn cubic_recursive(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    x4: f64,
    y4: f64,
    tol_sq: f64,
    level: u32,
    out: &mut Vec<Vertex<f64>>,
) {
    if level > RECURSION_LIMIT {
        return;
    }

    let x12 = (x1 + x2) / 2.0;
    let y12 = (y1 + y2) / 2.0;
    let x23 = (x2 + x3) / 2.0;
    let y23 = (y2 + y3) / 2.0;
    let x34 = (x3 + x4) / 2.0;
    let y34 = (y3 + y4) / 2.0;
    let x123 = (x12 + x23) / 2.0;
    let y123 = (y12 + y23) / 2.0;
    let x234 = (x23 + x34) / 2.0;
    let y234 = (y23 + y34) / 2.0;
    let x1234 = (x123 + x234) / 2.0;
    let y1234 = (y123 + y234) / 2.0;

    let dx = x4 - x1;
    let dy = y4 - y1;
    let d2 = ((x2 - x4) * dy - (y2 - y4) * dx).abs();
    let d3 = ((x3 - x4) * dy - (y3 - y4) * dx).abs();

    match (
        (d2 > COLLINEARITY_EPSILON) as u8,
        (d3 > COLLINEARITY_EPSILON) as u8,
    ) {
        (0, 0) => {
            // All collinear or coincident
            let da = dx * dx + dy * dy;
            if da == 0.0 {
                let d2 = sq_distance(x1, y1, x2, y2);
                let d3 = sq_distance(x4, y4, x3, y3);
                if d2 < tol_sq && d3 < tol_sq {
                    out.push(Vertex::line_to(x1234, y1234));
                    return;
                }
            } else {
                let t2 = ((x2 - x1) * dx + (y2 - y1) * dy) / da;
                let t3 = ((x3 - x1) * dx + (y3 - y1) * dy) / da;
                if t2 > 0.0 && t2 < 1.0 && t3 > 0.0 && t3 < 1.0 {
                    // Both control points between the endpoints
                    return;
                }
                let d2 = point_line_excess(x2, y2, x1, y1, x4, y4, t2);
                let d3 = point_line_excess(x3, y3, x1, y1, x4, y4, t3);
                if d2 < tol_sq && d3 < tol_sq {
                    out.push(Vertex::line_to(x1234, y1234));
                    return;
                }
            }
        }
        (0, 1) => {
            // Only p3 deviates from the chord
            if d3 * d3 <= tol_sq * (dx * dx + dy * dy) {
                out.push(Vertex::line_to(x1234, y1234));
                return;
            }
        }
        (1, 0) => {
            // Only p2 deviates from the chord
            if d2 * d2 <= tol_sq * (dx * dx + dy * dy) {
                out.push(Vertex::line_to(x1234, y1234));
                return;
            }
        }
        _ => {
            // Regular case
            let d = d2 + d3;
            if d * d <= tol_sq * (dx * dx + dy * dy) {
                out.push(Vertex::line_to(x1234, y1234));
                return;
            }
        }
    }

    cubic_recursive(
        x1, y1, x12, y12, x123, y123, x1234, y1234, tol_sq, level + 1, out,
    );
    cubic_recursive(
        x1234, y1234, x234, y234, x34, y34, x4, y4, tol_sq, level + 1, out,
    );
}

/// Squared distance from a point to a chord, measured past the endpoints
fn point_line_excess(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64, t: f64) -> f64 {
    if t <= 0.0 {
        sq_distance(px, py, ax, ay)
    } else if t >= 1.0 {
        sq_distance(px, py, bx, by)
    } else {
        let dx = bx - ax;
        let dy = by - ay;
        sq_distance(px, py, ax + t * dx, ay + t * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_quad(x1: f64, y1: f64, cx: f64, cy: f64, x2: f64, y2: f64, t: f64) -> (f64, f64) {
        let s = 1.0 - t;
        (
            s * s * x1 + 2.0 * s * t * cx + t * t * x2,
            s * s * y1 + 2.0 * s * t * cy + t * t * y2,
        )
    }

    fn polyline_deviation(pts: &[Vertex<f64>], sample: impl Fn(f64) -> (f64, f64)) -> f64 {
        let mut max_d: f64 = 0.0;
        for i in 0..=256 {
            let (x, y) = sample(i as f64 / 256.0);
            let mut best = f64::MAX;
            for w in pts.windows(2) {
                best = best.min(seg_distance(x, y, w[0].x, w[0].y, w[1].x, w[1].y));
            }
            max_d = max_d.max(best);
        }
        max_d
    }

    fn seg_distance(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
        let dx = bx - ax;
        let dy = by - ay;
        let d = dx * dx + dy * dy;
        let t = if d == 0.0 {
            0.0
        } else {
            (((px - ax) * dx + (py - ay) * dy) / d).max(0.0).min(1.0)
        };
        sq_distance(px, py, ax + t * dx, ay + t * dy).sqrt()
    }

    #[test]
    fn quad_deviation_within_tolerance() {
        let mut out = vec![Vertex::move_to(0.0, 0.0)];
        flatten_quad(0.0, 0.0, 50.0, 100.0, 100.0, 0.0, 0.25, &mut out);
        let dev = polyline_deviation(&out, |t| eval_quad(0.0, 0.0, 50.0, 100.0, 100.0, 0.0, t));
        assert!(dev <= 0.25, "deviation {} above tolerance", dev);
    }

    #[test]
    fn tighter_tolerance_never_worse() {
        let mut coarse = vec![Vertex::move_to(0.0, 0.0)];
        flatten_quad(0.0, 0.0, 80.0, 120.0, 160.0, 0.0, 1.0, &mut coarse);
        let mut fine = vec![Vertex::move_to(0.0, 0.0)];
        flatten_quad(0.0, 0.0, 80.0, 120.0, 160.0, 0.0, 0.1, &mut fine);

        let sample = |t| eval_quad(0.0, 0.0, 80.0, 120.0, 160.0, 0.0, t);
        let dev_coarse = polyline_deviation(&coarse, sample);
        let dev_fine = polyline_deviation(&fine, sample);
        assert!(
            dev_fine <= dev_coarse + 1e-12,
            "re-flattening tighter increased deviation: {} > {}",
            dev_fine,
            dev_coarse
        );
        assert!(fine.len() >= coarse.len());
    }

    #[test]
    fn collinear_quad_flattens_to_line() {
        let mut out = vec![Vertex::move_to(0.0, 0.0)];
        flatten_quad(0.0, 0.0, 5.0, 5.0, 10.0, 10.0, 0.25, &mut out);
        assert_eq!(out.len(), 2, "collinear control point should add no midpoints");
    }

    #[test]
    fn zero_length_curve_terminates() {
        let mut out = vec![Vertex::move_to(3.0, 3.0)];
        flatten_cubic(3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 0.25, &mut out);
        assert!(out.len() <= 3);
        let end = out.last().unwrap();
        assert_eq!((end.x, end.y), (3.0, 3.0));
    }

    #[test]
    fn cubic_endpoints_exact() {
        let mut out = vec![Vertex::move_to(-10.0, 4.0)];
        flatten_cubic(-10.0, 4.0, 0.0, 40.0, 20.0, -30.0, 30.0, 4.0, 0.1, &mut out);
        let end = out.last().unwrap();
        assert_eq!((end.x, end.y), (30.0, 4.0));
        assert!(out.len() > 4);
    }
}
