//! 8-bit coverage target
//!
//! Row-major grayscale buffer the renderer writes spans into. One byte
//! per pixel, 0 for empty and 255 for fully covered.

use crate::clip::Rectangle;
use crate::config::Error;
use crate::config::SubPixelConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl CoverageBuffer {
    /// Allocate a zeroed buffer, checking the target against the
    /// configuration's coordinate limit
    pub fn new(width: usize, height: usize, config: &SubPixelConfig) -> Result<Self, Error> {
        config.check_target(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; width * height],
        })
    }

    /// Same-sized zeroed buffer, used for clip masks
    pub(crate) fn like(other: &CoverageBuffer) -> Self {
        Self {
            width: other.width,
            height: other.height,
            data: vec![0u8; other.width * other.height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        for v in self.data.iter_mut() {
            *v = 0;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Write one span of coverage, keeping the maximum of old and new
    ///
    /// Out-of-range portions are clamped away. `covers` holds either
    /// one value per pixel or a single value repeated across the span.
    pub fn blend_span(&mut self, x: i64, y: i64, len: i64, covers: &[u64]) {
        if y < 0 || y >= self.height as i64 || len <= 0 {
            return;
        }
        let uniform = covers.len() == 1 && len > 1;
        for i in 0..len {
            let px = x + i;
            if px < 0 || px >= self.width as i64 {
                continue;
            }
            let c = if uniform { covers[0] } else { covers[i as usize] };
            let c = c.min(255) as u8;
            let idx = y as usize * self.width + px as usize;
            if c > self.data[idx] {
                self.data[idx] = c;
            }
        }
    }

    /// Zero every pixel whose center lies outside the rectangle
    pub fn intersect_rect(&mut self, r: &Rectangle<f64>) {
        for y in 0..self.height {
            for x in 0..self.width {
                let cx = x as f64 + 0.5;
                let cy = y as f64 + 0.5;
                if cx < r.x1() || cx > r.x2() || cy < r.y1() || cy > r.y2() {
                    self.data[y * self.width + x] = 0;
                }
            }
        }
    }

    /// Pointwise minimum with a mask buffer of the same dimensions
    pub fn min_with(&mut self, mask: &CoverageBuffer) {
        debug_assert_eq!(self.width, mask.width);
        debug_assert_eq!(self.height, mask.height);
        for (v, m) in self.data.iter_mut().zip(mask.data.iter()) {
            *v = (*v).min(*m);
        }
    }

    /// Total coverage, useful for area estimates in tests
    pub fn sum(&self) -> u64 {
        self.data.iter().map(|&v| v as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SubPixelConfig {
        SubPixelConfig::default()
    }

    #[test]
    fn blend_takes_maximum() {
        let mut buf = CoverageBuffer::new(8, 4, &config()).unwrap();
        buf.blend_span(1, 1, 3, &[100, 200, 50]);
        buf.blend_span(1, 1, 3, &[150]);
        assert_eq!(buf.get(1, 1), 150);
        assert_eq!(buf.get(2, 1), 200);
        assert_eq!(buf.get(3, 1), 150);
    }

    #[test]
    fn blend_clamps_out_of_range() {
        let mut buf = CoverageBuffer::new(4, 4, &config()).unwrap();
        buf.blend_span(-2, 0, 8, &[255]);
        buf.blend_span(0, -1, 4, &[255]);
        buf.blend_span(0, 4, 4, &[255]);
        assert_eq!(buf.sum(), 4 * 255);
    }

    #[test]
    fn rect_clip_is_idempotent() {
        let mut buf = CoverageBuffer::new(8, 8, &config()).unwrap();
        buf.blend_span(0, 3, 8, &[255]);
        let r = Rectangle::new(2.0, 0.0, 6.0, 8.0);
        buf.intersect_rect(&r);
        let once = buf.clone();
        buf.intersect_rect(&r);
        assert_eq!(buf, once);
        assert_eq!(buf.get(1, 3), 0);
        assert_eq!(buf.get(3, 3), 255);
    }

    #[test]
    fn monotonic_clip_never_raises_coverage() {
        let mut buf = CoverageBuffer::new(4, 4, &config()).unwrap();
        buf.blend_span(0, 0, 4, &[200]);
        let mut mask = CoverageBuffer::like(&buf);
        mask.blend_span(0, 0, 4, &[100]);
        buf.min_with(&mask);
        assert_eq!(buf.get(0, 0), 100);
    }
}
