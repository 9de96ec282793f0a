//! Coverage cell accumulation
//!
//! Lines arrive in sub-pixel integer coordinates and are decomposed into
//! per-pixel [Cell]s carrying a signed `cover` (vertical sub-pixel extent)
//! and `area` (twice the signed area in sub-pixel units). The x and y axes
//! carry independent sub-pixel shifts from the
//! [SubPixelConfig](crate::SubPixelConfig).

use crate::config::SubPixelConfig;

use std::cmp::max;
use std::cmp::min;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub cover: i64,
    pub area: i64,
}

impl Cell {
    pub fn new() -> Self {
        Cell {
            x: std::i64::MAX,
            y: std::i64::MAX,
            cover: 0,
            area: 0,
        }
    }
    pub fn at(x: i64, y: i64) -> Self {
        let mut c = Cell::new();
        c.x = x;
        c.y = y;
        c
    }
    pub fn equal(&self, x: i64, y: i64) -> bool {
        self.x - x == 0 && self.y - y == 0
    }
    pub fn is_empty(&self) -> bool {
        self.cover == 0 && self.area == 0
    }
}

/// Cell accumulator for one rasterization pass
#[derive(Debug)]
pub struct CellRaster {
    shift_x: u32,
    shift_y: u32,
    scale_x: i64,
    scale_y: i64,
    mask_x: i64,
    mask_y: i64,
    pub cells: Vec<Cell>,
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
    pub sorted_y: Vec<Vec<Cell>>,
}

impl CellRaster {
    pub fn new(config: &SubPixelConfig) -> Self {
        Self {
            shift_x: config.log2_x(),
            shift_y: config.log2_y(),
            scale_x: config.scale_x(),
            scale_y: config.scale_y(),
            mask_x: config.scale_x() - 1,
            mask_y: config.scale_y() - 1,
            cells: vec![],
            min_x: std::i64::MAX,
            min_y: std::i64::MAX,
            max_x: std::i64::MIN,
            max_y: std::i64::MIN,
            sorted_y: vec![],
        }
    }

    /// Clear accumulated cells, keeping allocations for the next pass
    pub fn reset(&mut self) {
        self.max_x = std::i64::MIN;
        self.max_y = std::i64::MIN;
        self.min_x = std::i64::MAX;
        self.min_y = std::i64::MAX;
        self.sorted_y.clear();
        self.cells.clear();
    }

    pub fn shift_x(&self) -> u32 {
        self.shift_x
    }
    pub fn shift_y(&self) -> u32 {
        self.shift_y
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Bucket cells by row and sort each row by x
    pub fn sort_cells(&mut self) {
        if !self.sorted_y.is_empty() || self.max_y < 0 {
            return;
        }
        self.sorted_y = vec![vec![]; (self.max_y + 1) as usize];
        for c in self.cells.iter() {
            if c.y >= 0 {
                self.sorted_y[c.y as usize].push(*c);
            }
        }
        for row in self.sorted_y.iter_mut() {
            row.sort_by(|a, b| a.x.cmp(&b.x));
        }
    }

    pub fn scanline_cells(&self, y: i64) -> &[Cell] {
        &self.sorted_y[y as usize]
    }

    fn curr_cell_not_equal(&self, x: i64, y: i64) -> bool {
        match self.cells.last() {
            None => true,
            Some(cur) => !cur.equal(x, y),
        }
    }

    fn pop_last_cell_if_empty(&mut self) {
        if let Some(last) = self.cells.last() {
            if last.is_empty() {
                self.cells.pop();
            }
        }
    }

    fn set_curr_cell(&mut self, x: i64, y: i64) {
        if self.curr_cell_not_equal(x, y) {
            self.pop_last_cell_if_empty();
            self.cells.push(Cell::at(x, y));
        }
    }

    fn curr_cell(&mut self) -> &mut Cell {
        // set_curr_cell always leaves at least one cell
        self.cells.last_mut().unwrap()
    }

    /// Accumulate a line within a single row
    ///
    /// `x1`,`x2` are sub-pixel x positions; `y1`,`y2` are y fractions
    /// within row `ey`.
    fn render_hline(&mut self, ey: i64, x1: i64, y1: i64, x2: i64, y2: i64) {
        let ex1 = x1 >> self.shift_x;
        let ex2 = x2 >> self.shift_x;
        let fx1 = x1 & self.mask_x;
        let fx2 = x2 & self.mask_x;

        // Horizontal line contributes no cover
        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        // Single cell
        if ex1 == ex2 {
            let cell = self.curr_cell();
            cell.cover += y2 - y1;
            cell.area += (fx1 + fx2) * (y2 - y1);
            return;
        }

        // Run of adjacent cells on the same row
        let (mut p, first, incr, dx) = if x2 - x1 < 0 {
            (fx1 * (y2 - y1), 0, -1, x1 - x2)
        } else {
            ((self.scale_x - fx1) * (y2 - y1), self.scale_x, 1, x2 - x1)
        };
        let mut delta = p / dx;
        let mut xmod = p % dx;
        if xmod < 0 {
            delta -= 1;
            xmod += dx;
        }
        {
            let cell = self.curr_cell();
            cell.cover += delta;
            cell.area += (fx1 + first) * delta;
        }
        let mut ex1 = ex1 + incr;
        self.set_curr_cell(ex1, ey);
        let mut y1 = y1 + delta;

        if ex1 != ex2 {
            p = self.scale_x * (y2 - y1 + delta);
            let mut lift = p / dx;
            let mut rem = p % dx;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            xmod -= dx;

            while ex1 != ex2 {
                delta = lift;
                xmod += rem;
                if xmod >= 0 {
                    xmod -= dx;
                    delta += 1;
                }
                {
                    let scale_x = self.scale_x;
                    let cell = self.curr_cell();
                    cell.cover += delta;
                    cell.area += scale_x * delta;
                }
                y1 += delta;
                ex1 += incr;
                self.set_curr_cell(ex1, ey);
            }
        }
        delta = y2 - y1;
        let scale_x = self.scale_x;
        let cell = self.curr_cell();
        cell.cover += delta;
        cell.area += (fx2 + scale_x - first) * delta;
    }

    /// Accumulate a line in sub-pixel coordinates
    pub fn line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        let dx_limit = 16384 << self.shift_x;
        let dx = x2 - x1;
        // Split very long lines in half to bound the interpolation error
        if dx >= dx_limit || dx <= -dx_limit {
            let cx = (x1 + x2) / 2;
            let cy = (y1 + y2) / 2;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }
        let dy = y2 - y1;
        let ex1 = x1 >> self.shift_x;
        let ex2 = x2 >> self.shift_x;
        let ey1 = y1 >> self.shift_y;
        let ey2 = y2 >> self.shift_y;
        let fy1 = y1 & self.mask_y;
        let fy2 = y2 & self.mask_y;

        self.min_x = min(ex2, min(ex1, self.min_x));
        self.min_y = min(ey2, min(ey1, self.min_y));
        self.max_x = max(ex2, max(ex1, self.max_x));
        self.max_y = max(ey2, max(ey1, self.max_y));

        self.set_curr_cell(ex1, ey1);

        // Single row
        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            self.pop_last_cell_if_empty();
            return;
        }

        // Vertical line: each row gets the full x fraction
        if dx == 0 {
            let ex = x1 >> self.shift_x;
            let two_fx = (x1 - (ex << self.shift_x)) << 1;

            let (first, incr) = if dy < 0 { (0, -1) } else { (self.scale_y, 1) };
            let delta = first - fy1;
            {
                let cell = self.curr_cell();
                cell.cover += delta;
                cell.area += two_fx * delta;
            }

            let mut ey1 = ey1 + incr;
            self.set_curr_cell(ex, ey1);
            let delta = first + first - self.scale_y;
            let area = two_fx * delta;
            while ey1 != ey2 {
                {
                    let cell = self.curr_cell();
                    cell.cover = delta;
                    cell.area = area;
                }
                ey1 += incr;
                self.set_curr_cell(ex, ey1);
            }
            let delta = fy2 - self.scale_y + first;
            let cell = self.curr_cell();
            cell.cover += delta;
            cell.area += two_fx * delta;
            return;
        }

        // General case: walk row by row
        let (p, first, incr, dy) = if dy < 0 {
            (fy1 * dx, 0, -1, -dy)
        } else {
            ((self.scale_y - fy1) * dx, self.scale_y, 1, dy)
        };
        let mut delta = p / dy;
        let mut xmod = p % dy;
        if xmod < 0 {
            delta -= 1;
            xmod += dy;
        }
        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);
        let mut ey1 = ey1 + incr;
        self.set_curr_cell(x_from >> self.shift_x, ey1);
        if ey1 != ey2 {
            let p = self.scale_y * dx;
            let mut lift = p / dy;
            let mut rem = p % dy;
            if rem < 0 {
                lift -= 1;
                rem += dy;
            }
            xmod -= dy;
            while ey1 != ey2 {
                delta = lift;
                xmod += rem;
                if xmod >= 0 {
                    xmod -= dy;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, self.scale_y - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.set_curr_cell(x_from >> self.shift_x, ey1);
            }
        }
        self.render_hline(ey1, x_from, self.scale_y - first, x2, fy2);
        self.pop_last_cell_if_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> CellRaster {
        CellRaster::new(&SubPixelConfig::new(3, 3).unwrap())
    }

    #[test]
    fn closed_box_cover_cancels() {
        // A closed rectangle's left and right edges carry opposite cover
        let mut r = raster();
        let s = 8; // one pixel at 8 sub-pixels
        r.line(0, 0, 0, 2 * s);
        r.line(0, 2 * s, 3 * s, 2 * s);
        r.line(3 * s, 2 * s, 3 * s, 0);
        r.line(3 * s, 0, 0, 0);
        r.sort_cells();
        for y in 0..=r.max_y {
            let total: i64 = r.scanline_cells(y).iter().map(|c| c.cover).sum();
            assert_eq!(total, 0, "net cover per row must cancel (row {})", y);
        }
    }

    #[test]
    fn bounds_track_input() {
        let mut r = raster();
        r.line(8, 8, 80, 40);
        assert_eq!(r.min_x, 1);
        assert_eq!(r.max_x, 10);
        assert_eq!(r.min_y, 1);
        assert_eq!(r.max_y, 5);
    }

    #[test]
    fn long_line_splits_without_overflow() {
        let mut r = raster();
        r.line(0, 0, 20_000 * 8, 8);
        assert!(r.total_cells() > 0);
    }
}
