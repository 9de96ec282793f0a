//! Geometry and coverage clipping
//!
//! [Clip] trims line segments against a rectangular box in sub-pixel
//! coordinates before they reach cell accumulation. [ClipRegion] is the
//! post-rasterization form: a rectangle or polygon applied to a rendered
//! coverage buffer.

use crate::cell::CellRaster;
use crate::path::Path;

/// Axis-aligned rectangle with normalized corners (`x1 <= x2`, `y1 <= y2`)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle<T: PartialOrd + Copy> {
    x1: T,
    y1: T,
    x2: T,
    y2: T,
}

impl<T> Rectangle<T>
where
    T: PartialOrd + Copy,
{
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        Self { x1, y1, x2, y2 }
    }
    pub fn x1(&self) -> T {
        self.x1
    }
    pub fn y1(&self) -> T {
        self.y1
    }
    pub fn x2(&self) -> T {
        self.x2
    }
    pub fn y2(&self) -> T {
        self.y2
    }
    /// Grow to include the point `(x, y)`
    pub fn expand(&mut self, x: T, y: T) {
        if x < self.x1 {
            self.x1 = x;
        }
        if x > self.x2 {
            self.x2 = x;
        }
        if y < self.y1 {
            self.y1 = y;
        }
        if y > self.y2 {
            self.y2 = y;
        }
    }
}

const INSIDE: u8 = 0b0000;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const BOTTOM: u8 = 0b0100;
const TOP: u8 = 0b1000;

/// Cohen-Sutherland region code of `(x, y)` relative to the box
fn clip_flags(x: i64, y: i64, x1: i64, y1: i64, x2: i64, y2: i64) -> u8 {
    let mut code = INSIDE;
    if x < x1 {
        code |= LEFT;
    }
    if x > x2 {
        code |= RIGHT;
    }
    if y < y1 {
        code |= BOTTOM;
    }
    if y > y2 {
        code |= TOP;
    }
    code
}

fn mul_div(a: i64, b: i64, c: i64) -> i64 {
    let (a, b, c) = (a as f64, b as f64, c as f64);
    (a * b / c).round() as i64
}

/// Segment clipper feeding a [CellRaster]
///
/// Holds the current point and the optional clip box, both in sub-pixel
/// integer coordinates.
#[derive(Debug)]
pub struct Clip {
    x1: i64,
    y1: i64,
    clip_box: Option<Rectangle<i64>>,
    clip_flag: u8,
}

impl Clip {
    pub fn new() -> Self {
        Self {
            x1: 0,
            y1: 0,
            clip_box: None,
            clip_flag: INSIDE,
        }
    }

    pub fn clip_box(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        let r = Rectangle::new(x1, y1, x2, y2);
        self.clip_box = Some(r);
        self.clip_flag = clip_flags(self.x1, self.y1, r.x1, r.y1, r.x2, r.y2);
    }

    pub fn move_to(&mut self, x2: i64, y2: i64) {
        self.x1 = x2;
        self.y1 = y2;
        if let Some(ref b) = self.clip_box {
            self.clip_flag = clip_flags(x2, y2, b.x1, b.y1, b.x2, b.y2);
        }
    }

    pub fn line_to(&mut self, ras: &mut CellRaster, x2: i64, y2: i64) {
        if let Some(b) = self.clip_box {
            let f2 = clip_flags(x2, y2, b.x1, b.y1, b.x2, b.y2);
            // Fully above or below the box on both ends: nothing to draw
            if (self.clip_flag & 0b1100) == (f2 & 0b1100) && (self.clip_flag & 0b1100) != INSIDE {
                self.x1 = x2;
                self.y1 = y2;
                self.clip_flag = f2;
                return;
            }
            let (x1, y1, f1) = (self.x1, self.y1, self.clip_flag);
            match (f1 & 0b0011, f2 & 0b0011) {
                (INSIDE, INSIDE) => self.line_clip_y(ras, x1, y1, x2, y2, f1, f2),
                (INSIDE, RIGHT) => {
                    let y3 = y1 + mul_div(b.x2 - x1, y2 - y1, x2 - x1);
                    let f3 = clip_flags(b.x2, y3, b.x1, b.y1, b.x2, b.y2);
                    self.line_clip_y(ras, x1, y1, b.x2, y3, f1, f3);
                    self.line_clip_y(ras, b.x2, y3, b.x2, y2, f3, f2);
                }
                (RIGHT, INSIDE) => {
                    let y3 = y1 + mul_div(b.x2 - x1, y2 - y1, x2 - x1);
                    let f3 = clip_flags(b.x2, y3, b.x1, b.y1, b.x2, b.y2);
                    self.line_clip_y(ras, b.x2, y1, b.x2, y3, f1, f3);
                    self.line_clip_y(ras, b.x2, y3, x2, y2, f3, f2);
                }
                (INSIDE, LEFT) => {
                    let y3 = y1 + mul_div(b.x1 - x1, y2 - y1, x2 - x1);
                    let f3 = clip_flags(b.x1, y3, b.x1, b.y1, b.x2, b.y2);
                    self.line_clip_y(ras, x1, y1, b.x1, y3, f1, f3);
                    self.line_clip_y(ras, b.x1, y3, b.x1, y2, f3, f2);
                }
                (RIGHT, LEFT) => {
                    let y3 = y1 + mul_div(b.x2 - x1, y2 - y1, x2 - x1);
                    let y4 = y1 + mul_div(b.x1 - x1, y2 - y1, x2 - x1);
                    let f3 = clip_flags(b.x2, y3, b.x1, b.y1, b.x2, b.y2);
                    let f4 = clip_flags(b.x1, y4, b.x1, b.y1, b.x2, b.y2);
                    self.line_clip_y(ras, b.x2, y1, b.x2, y3, f1, f3);
                    self.line_clip_y(ras, b.x2, y3, b.x1, y4, f3, f4);
                    self.line_clip_y(ras, b.x1, y4, b.x1, y2, f4, f2);
                }
                (LEFT, INSIDE) => {
                    let y3 = y1 + mul_div(b.x1 - x1, y2 - y1, x2 - x1);
                    let f3 = clip_flags(b.x1, y3, b.x1, b.y1, b.x2, b.y2);
                    self.line_clip_y(ras, b.x1, y1, b.x1, y3, f1, f3);
                    self.line_clip_y(ras, b.x1, y3, x2, y2, f3, f2);
                }
                (LEFT, RIGHT) => {
                    let y3 = y1 + mul_div(b.x1 - x1, y2 - y1, x2 - x1);
                    let y4 = y1 + mul_div(b.x2 - x1, y2 - y1, x2 - x1);
                    let f3 = clip_flags(b.x1, y3, b.x1, b.y1, b.x2, b.y2);
                    let f4 = clip_flags(b.x2, y4, b.x1, b.y1, b.x2, b.y2);
                    self.line_clip_y(ras, b.x1, y1, b.x1, y3, f1, f3);
                    self.line_clip_y(ras, b.x1, y3, b.x2, y4, f3, f4);
                    self.line_clip_y(ras, b.x2, y4, b.x2, y2, f4, f2);
                }
                (LEFT, LEFT) => self.line_clip_y(ras, b.x1, y1, b.x1, y2, f1, f2),
                (RIGHT, RIGHT) => self.line_clip_y(ras, b.x2, y1, b.x2, y2, f1, f2),
                (_, _) => unreachable!("flag combinations are exhaustive"),
            }
            self.clip_flag = f2;
        } else {
            ras.line(self.x1, self.y1, x2, y2);
        }
        self.x1 = x2;
        self.y1 = y2;
    }

    fn line_clip_y(
        &self,
        ras: &mut CellRaster,
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        f1: u8,
        f2: u8,
    ) {
        // unwrap: only called with a clip box installed
        let b = self.clip_box.unwrap();
        let f1 = f1 & 0b1100;
        let f2 = f2 & 0b1100;
        if y1 == y2 {
            ras.line(x1, y1, x2, y2);
            return;
        }
        if f1 == INSIDE && f2 == INSIDE {
            ras.line(x1, y1, x2, y2);
            return;
        }
        if f1 == f2 {
            // Both ends off the same side vertically: no rows covered
            return;
        }
        let (mut tx1, mut ty1, mut tx2, mut ty2) = (x1, y1, x2, y2);
        if f1 & BOTTOM != 0 {
            tx1 = x1 + mul_div(b.y1 - y1, x2 - x1, y2 - y1);
            ty1 = b.y1;
        }
        if f1 & TOP != 0 {
            tx1 = x1 + mul_div(b.y2 - y1, x2 - x1, y2 - y1);
            ty1 = b.y2;
        }
        if f2 & BOTTOM != 0 {
            tx2 = x1 + mul_div(b.y1 - y1, x2 - x1, y2 - y1);
            ty2 = b.y1;
        }
        if f2 & TOP != 0 {
            tx2 = x1 + mul_div(b.y2 - y1, x2 - x1, y2 - y1);
            ty2 = b.y2;
        }
        // The clamped-out portion still contributes cover along the edge
        if f1 & BOTTOM != 0 {
            ras.line(x1, b.y1, tx1, ty1);
        }
        if f1 & TOP != 0 {
            ras.line(x1, b.y2, tx1, ty1);
        }
        ras.line(tx1, ty1, tx2, ty2);
        if f2 & BOTTOM != 0 {
            ras.line(tx2, ty2, x2, b.y1);
        }
        if f2 & TOP != 0 {
            ras.line(tx2, ty2, x2, b.y2);
        }
    }
}

/// Clip applied to a finished coverage buffer
#[derive(Debug, Clone)]
pub enum ClipRegion {
    /// Keep coverage inside the rectangle, zero everything outside
    Rect(Rectangle<f64>),
    /// Keep coverage weighted by the polygon's own anti-aliased mask
    Polygon(Path),
}
