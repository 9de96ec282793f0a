//! Scanline span container

/// Run of pixels within a scanline with an 8-bit coverage value each
///
/// `len == 1` spans carry a single coverage in `covers`; longer spans
/// carry one coverage per pixel for partially covered cells and a
/// single repeated value for interior runs.
#[derive(Debug, Default)]
pub struct Span {
    pub x: i64,
    pub len: i64,
    pub covers: Vec<u64>,
}

/// "No previous cell" marker, kept clear of the coordinate range so
/// `last_x + 1` never overflows
const LAST_X: i64 = 0x7FFF_FFF0;

/// One scanline worth of spans, rebuilt row by row during the sweep
#[derive(Debug, Default)]
pub struct Scanline {
    last_x: i64,
    min_x: i64,
    pub spans: Vec<Span>,
    pub y: i64,
}

impl Scanline {
    pub fn new() -> Self {
        Self {
            last_x: LAST_X,
            min_x: 0,
            spans: vec![],
            y: 0,
        }
    }

    /// Mark the scanline as empty for the next row
    pub fn reset_spans(&mut self) {
        self.last_x = LAST_X;
        self.spans.clear();
    }

    pub fn reset(&mut self, min_x: i64, _max_x: i64) {
        self.last_x = LAST_X;
        self.min_x = min_x;
        self.spans.clear();
    }

    /// Add a single cell's coverage, extending the previous span when adjacent
    pub fn add_cell(&mut self, x: i64, cover: u64) {
        let x = x - self.min_x;
        if x == self.last_x + 1 {
            // unwrap: adjacency implies a previous span exists
            let cur = self.spans.last_mut().unwrap();
            if cur.covers.len() == 1 && cur.len > 1 {
                // Spell a compact uniform run out per pixel before
                // appending a differing edge cover
                let c = cur.covers[0];
                cur.covers = vec![c; cur.len as usize];
            }
            cur.len += 1;
            cur.covers.push(cover);
        } else {
            self.spans.push(Span {
                x: x + self.min_x,
                len: 1,
                covers: vec![cover],
            });
        }
        self.last_x = x;
    }

    /// Add a solid interior run with uniform coverage
    pub fn add_span(&mut self, x: i64, len: i64, cover: u64) {
        let x = x - self.min_x;
        if x == self.last_x + 1 {
            let cur = self.spans.last_mut().unwrap();
            // Extend a uniform run with a matching cover
            if cur.covers.len() == 1 && cur.covers[0] == cover {
                cur.len += len;
            } else {
                self.spans.push(Span {
                    x: x + self.min_x,
                    len,
                    covers: vec![cover],
                });
            }
        } else {
            self.spans.push(Span {
                x: x + self.min_x,
                len,
                covers: vec![cover],
            });
        }
        self.last_x = x + len - 1;
    }

    pub fn finalize(&mut self, y: i64) {
        self.y = y;
    }

    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_cells_merge_into_one_span() {
        let mut sl = Scanline::new();
        sl.reset(0, 100);
        sl.add_cell(3, 128);
        sl.add_cell(4, 200);
        sl.add_cell(5, 255);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.spans[0].x, 3);
        assert_eq!(sl.spans[0].len, 3);
        assert_eq!(sl.spans[0].covers, vec![128, 200, 255]);
    }

    #[test]
    fn gap_starts_a_new_span() {
        let mut sl = Scanline::new();
        sl.reset(0, 100);
        sl.add_cell(3, 255);
        sl.add_cell(7, 255);
        assert_eq!(sl.num_spans(), 2);
        assert_eq!(sl.spans[1].x, 7);
    }

    #[test]
    fn first_cell_on_a_fresh_scanline_starts_a_span() {
        let mut sl = Scanline::new();
        sl.add_cell(0, 255);
        assert_eq!(sl.num_spans(), 1);
        sl.reset_spans();
        sl.add_cell(5, 128);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.spans[0].x, 5);
    }

    #[test]
    fn cell_after_solid_run_expands_the_covers() {
        // Left edge, interior run, right edge, as any partially
        // covered row produces
        let mut sl = Scanline::new();
        sl.reset(0, 100);
        sl.add_cell(0, 191);
        sl.add_span(1, 9, 255);
        sl.add_cell(10, 191);
        let last = &sl.spans[sl.num_spans() - 1];
        assert_eq!(last.len as usize, last.covers.len());
        assert_eq!(*last.covers.last().unwrap(), 191);
        assert!(last.covers[..last.covers.len() - 1]
            .iter()
            .all(|&c| c == 255));
    }

    #[test]
    fn solid_run_keeps_single_cover() {
        let mut sl = Scanline::new();
        sl.reset(0, 100);
        sl.add_cell(2, 100);
        sl.add_span(3, 10, 255);
        assert_eq!(sl.num_spans(), 2);
        assert_eq!(sl.spans[1].len, 10);
        assert_eq!(sl.spans[1].covers, vec![255]);
    }
}
