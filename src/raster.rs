//! Scanline rasterizer
//!
//! Converts a flattened vertex stream into per-row coverage spans. The
//! pipeline is cell accumulation ([CellRaster](crate::cell::CellRaster)),
//! a row sort, and a sweep that turns signed cover and area into 8-bit
//! alpha values under the active [FillingRule].

use crate::cell::CellRaster;
use crate::clip::Clip;
use crate::config::SubPixelConfig;
use crate::path::PathCommand;
use crate::path::Vertex;
use crate::path::VertexSource;
use crate::scan::Scanline;

/// Final anti-aliasing depth of the produced coverage, fixed at 8 bits
const AA_SHIFT: i64 = 8;
const AA_SCALE: i64 = 1 << AA_SHIFT;
const AA_MASK: i64 = AA_SCALE - 1;
const AA_SCALE2: i64 = AA_SCALE * 2;
const AA_MASK2: i64 = AA_SCALE2 - 1;

/// Winding rule for resolving self-intersecting outlines
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FillingRule {
    NonZero,
    EvenOdd,
}

impl Default for FillingRule {
    fn default() -> Self {
        FillingRule::NonZero
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum PathStatus {
    Initial,
    Closed,
    MoveTo,
    LineTo,
}

/// Polygon rasterizer producing anti-aliased scanlines
#[derive(Debug)]
pub struct RasterizerScanline {
    clipper: Clip,
    outline: CellRaster,
    status: PathStatus,
    start: Vertex<i64>,
    scale_x: f64,
    scale_y: f64,
    filling_rule: FillingRule,
    gamma: Vec<u64>,
    scan_y: i64,
}

impl RasterizerScanline {
    pub fn new(config: &SubPixelConfig) -> Self {
        Self {
            clipper: Clip::new(),
            outline: CellRaster::new(config),
            status: PathStatus::Initial,
            start: Vertex::move_to(0, 0),
            scale_x: config.scale_x() as f64,
            scale_y: config.scale_y() as f64,
            filling_rule: FillingRule::NonZero,
            gamma: (0..256u64).collect(),
            scan_y: 0,
        }
    }

    pub fn filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    /// Replace the coverage response curve; `f` maps [0,1] to [0,1]
    pub fn gamma<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        self.gamma = (0..256)
            .map(|i| f(i as f64 / 255.0))
            .map(|v| (v.max(0.0).min(1.0) * 255.0).round() as u64)
            .collect();
    }

    /// Clipping box in pixel coordinates
    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.clipper.clip_box(
            self.coord_x(x1),
            self.coord_y(y1),
            self.coord_x(x2),
            self.coord_y(y2),
        );
    }

    pub fn reset(&mut self) {
        self.outline.reset();
        self.status = PathStatus::Initial;
    }

    fn coord_x(&self, x: f64) -> i64 {
        (x * self.scale_x).round() as i64
    }
    fn coord_y(&self, y: f64) -> i64 {
        (y * self.scale_y).round() as i64
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        let (x, y) = (self.coord_x(x), self.coord_y(y));
        if self.status == PathStatus::LineTo {
            self.close_polygon();
        }
        self.clipper.move_to(x, y);
        self.start = Vertex::move_to(x, y);
        self.status = PathStatus::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        let (x, y) = (self.coord_x(x), self.coord_y(y));
        self.clipper.line_to(&mut self.outline, x, y);
        self.status = PathStatus::LineTo;
    }

    /// Close the current polygon back to its starting point
    pub fn close_polygon(&mut self) {
        if self.status == PathStatus::LineTo {
            self.clipper
                .line_to(&mut self.outline, self.start.x, self.start.y);
            self.status = PathStatus::Closed;
        }
    }

    /// Feed a full vertex source, closing every subpath
    pub fn add_path<VS: VertexSource>(&mut self, path: &VS) {
        for v in path.xconvert() {
            match v.cmd {
                PathCommand::MoveTo => self.move_to_d(v.x, v.y),
                PathCommand::LineTo => self.line_to_d(v.x, v.y),
                PathCommand::Close => self.close_polygon(),
                PathCommand::Stop => break,
                PathCommand::QuadTo | PathCommand::CubicTo => {
                    unreachable!("curves are flattened before rasterization")
                }
            }
        }
        self.close_polygon();
    }

    pub fn min_x(&self) -> i64 {
        self.outline.min_x
    }
    pub fn max_x(&self) -> i64 {
        self.outline.max_x
    }

    fn calculate_alpha(&self, area: i64) -> u64 {
        // Fold the sub-pixel resolution down to the 8-bit alpha range
        let shift = self.outline.shift_x() as i64 + self.outline.shift_y() as i64 + 1 - AA_SHIFT;
        let mut cover = if shift >= 0 { area >> shift } else { area << -shift };
        cover = cover.abs();
        if self.filling_rule == FillingRule::EvenOdd {
            cover &= AA_MASK2;
            if cover > AA_SCALE {
                cover = AA_SCALE2 - cover;
            }
        }
        let cover = cover.max(0).min(AA_MASK);
        self.gamma[cover as usize]
    }

    /// Start sweeping scanlines from the top of the accumulated outline
    pub fn rewind_scanlines(&mut self) -> bool {
        self.close_polygon();
        self.outline.sort_cells();
        if self.outline.total_cells() == 0 || self.outline.max_y < 0 {
            false
        } else {
            self.scan_y = self.outline.min_y.max(0);
            true
        }
    }

    /// Produce the next non-empty scanline; returns false when done
    pub fn sweep_scanline(&mut self, sl: &mut Scanline) -> bool {
        loop {
            if self.scan_y > self.outline.max_y {
                return false;
            }
            sl.reset_spans();

            let cells = self.outline.scanline_cells(self.scan_y);
            let mut cover = 0;
            let mut i = 0;
            while i < cells.len() {
                let x = cells[i].x;
                let mut area = cells[i].area;
                cover += cells[i].cover;
                // Merge cells landing on the same pixel
                i += 1;
                while i < cells.len() && cells[i].x == x {
                    area += cells[i].area;
                    cover += cells[i].cover;
                    i += 1;
                }
                let shift_x1 = self.outline.shift_x() + 1;
                let mut x2 = x;
                if area != 0 {
                    let alpha = self.calculate_alpha((cover << shift_x1) - area);
                    if alpha > 0 {
                        sl.add_cell(x, alpha);
                    }
                    x2 = x + 1;
                }
                if i < cells.len() && cells[i].x > x2 {
                    let alpha = self.calculate_alpha(cover << shift_x1);
                    if alpha > 0 {
                        sl.add_span(x2, cells[i].x - x2, alpha);
                    }
                }
            }

            if sl.num_spans() != 0 {
                sl.finalize(self.scan_y);
                self.scan_y += 1;
                return true;
            }
            self.scan_y += 1;
        }
    }
}
