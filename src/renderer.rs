//! Rendering front end
//!
//! [Renderer] ties the pipeline together: it owns a pooled rasterizer
//! and scanline, clips incoming geometry to the target, and applies
//! post-rasterization clip regions to the coverage buffer.

use crate::clip::ClipRegion;
use crate::config::Error;
use crate::config::SubPixelConfig;
use crate::coverage::CoverageBuffer;
use crate::dash::Dash;
use crate::dash::DashPattern;
use crate::path::VertexSource;
use crate::raster::FillingRule;
use crate::raster::RasterizerScanline;
use crate::scan::Scanline;
use crate::stroke::InnerJoin;
use crate::stroke::LineCap;
use crate::stroke::LineJoin;
use crate::stroke::Stroke;

/// Full stroke description applied in one call
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub inner_join: InnerJoin,
    pub miter_limit: f64,
    pub dash: Option<DashPattern>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            inner_join: InnerJoin::Miter,
            miter_limit: 4.0,
            dash: None,
        }
    }
}

/// Renderer for filling and stroking paths into coverage buffers
///
/// The rasterizer and scanline are reused across calls, as is the mask
/// buffer allocated for the first polygon clip.
#[derive(Debug)]
pub struct Renderer {
    config: SubPixelConfig,
    ras: RasterizerScanline,
    sl: Scanline,
    mask: Option<CoverageBuffer>,
}

impl Renderer {
    /// Build a renderer, resolving the scan-conversion engine once
    pub fn new(config: SubPixelConfig) -> Result<Self, Error> {
        if config.verbose() {
            eprintln!(
                "subpix: engine {} at {}x{} sub-pixels",
                config.engine().name(),
                config.scale_x(),
                config.scale_y()
            );
        }
        Ok(Self {
            config,
            ras: RasterizerScanline::new(&config),
            sl: Scanline::new(),
            mask: None,
        })
    }

    /// Renderer configured from `SUBPIX_*` environment variables
    pub fn from_env() -> Result<Self, Error> {
        Self::new(SubPixelConfig::from_env()?)
    }

    pub fn config(&self) -> &SubPixelConfig {
        &self.config
    }

    /// Name of the active scan-conversion engine
    pub fn engine_name(&self) -> &'static str {
        self.config.engine().name()
    }

    /// Fill a path under the given rule and clip sequence
    pub fn fill<VS: VertexSource>(
        &mut self,
        path: &VS,
        rule: FillingRule,
        clips: &[ClipRegion],
        cov: &mut CoverageBuffer,
    ) {
        self.rasterize(path, rule, cov);
        self.apply_clips(clips, cov);
    }

    /// Stroke a path, dashing it first when the style says so
    ///
    /// The expanded outline is filled under the non-zero rule so the
    /// forward and backward walls reinforce instead of cancelling.
    pub fn stroke<VS: VertexSource>(
        &mut self,
        path: &VS,
        style: &StrokeStyle,
        clips: &[ClipRegion],
        cov: &mut CoverageBuffer,
    ) {
        match &style.dash {
            Some(pattern) if !pattern.is_solid() => {
                let dashed = Dash::with_pattern(path, pattern.clone());
                let outline = self.configure_stroke(dashed, style);
                self.rasterize(&outline, FillingRule::NonZero, cov);
            }
            _ => {
                let outline = self.configure_stroke(path, style);
                self.rasterize(&outline, FillingRule::NonZero, cov);
            }
        }
        self.apply_clips(clips, cov);
    }

    fn configure_stroke<VS: VertexSource>(&self, source: VS, style: &StrokeStyle) -> Stroke<VS> {
        let mut stroke = Stroke::new(source);
        stroke.width(style.width);
        stroke.line_cap(style.cap);
        stroke.line_join(style.join);
        stroke.inner_join(style.inner_join);
        stroke.miter_limit(style.miter_limit);
        stroke
    }

    fn rasterize<VS: VertexSource>(
        &mut self,
        path: &VS,
        rule: FillingRule,
        cov: &mut CoverageBuffer,
    ) {
        self.ras.reset();
        self.ras.filling_rule(rule);
        self.ras
            .clip_box(0.0, 0.0, cov.width() as f64, cov.height() as f64);
        self.ras.add_path(path);
        if !self.ras.rewind_scanlines() {
            return;
        }
        self.sl.reset(self.ras.min_x(), self.ras.max_x());
        while self.ras.sweep_scanline(&mut self.sl) {
            let y = self.sl.y;
            for span in self.sl.spans.iter() {
                cov.blend_span(span.x, y, span.len, &span.covers);
            }
        }
    }

    /// Apply clip regions in sequence; each can only reduce coverage
    fn apply_clips(&mut self, clips: &[ClipRegion], cov: &mut CoverageBuffer) {
        for clip in clips {
            match clip {
                ClipRegion::Rect(r) => cov.intersect_rect(r),
                ClipRegion::Polygon(p) => {
                    let mut mask = match self.mask.take() {
                        Some(m) if m.width() == cov.width() && m.height() == cov.height() => m,
                        _ => CoverageBuffer::like(cov),
                    };
                    mask.clear();
                    self.rasterize(p, FillingRule::NonZero, &mut mask);
                    cov.min_with(&mask);
                    self.mask = Some(mask);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Rectangle;
    use crate::path::Path;

    fn setup(w: usize, h: usize) -> (Renderer, CoverageBuffer) {
        let cfg = SubPixelConfig::default();
        let ren = Renderer::new(cfg).unwrap();
        let cov = CoverageBuffer::new(w, h, &cfg).unwrap();
        (ren, cov)
    }

    fn square(x1: f64, y1: f64, x2: f64, y2: f64) -> Path {
        let mut p = Path::new();
        p.move_to(x1, y1);
        p.line_to(x2, y1);
        p.line_to(x2, y2);
        p.line_to(x1, y2);
        p.close_polygon();
        p
    }

    #[test]
    fn fill_writes_expected_area() {
        let (mut ren, mut cov) = setup(20, 20);
        ren.fill(
            &square(2.0, 2.0, 12.0, 12.0),
            FillingRule::NonZero,
            &[],
            &mut cov,
        );
        assert_eq!(cov.sum(), 100 * 255);
    }

    #[test]
    fn fill_is_idempotent() {
        let (mut ren, mut cov) = setup(20, 20);
        let p = square(2.5, 2.5, 11.5, 11.5);
        ren.fill(&p, FillingRule::NonZero, &[], &mut cov);
        let first = cov.clone();
        ren.fill(&p, FillingRule::NonZero, &[], &mut cov);
        assert_eq!(cov, first);
    }

    #[test]
    fn geometry_outside_target_is_clipped() {
        let (mut ren, mut cov) = setup(10, 10);
        ren.fill(
            &square(-100.0, -100.0, 100.0, 100.0),
            FillingRule::NonZero,
            &[],
            &mut cov,
        );
        assert_eq!(cov.sum(), 100 * 255);
    }

    #[test]
    fn rect_clip_trims_fill() {
        let (mut ren, mut cov) = setup(20, 20);
        let clips = [ClipRegion::Rect(Rectangle::new(0.0, 0.0, 5.0, 20.0))];
        ren.fill(
            &square(0.0, 0.0, 20.0, 20.0),
            FillingRule::NonZero,
            &clips,
            &mut cov,
        );
        assert_eq!(cov.sum(), 5 * 20 * 255);
    }

    #[test]
    fn polygon_clip_masks_fill() {
        let (mut ren, mut cov) = setup(20, 20);
        let clips = [ClipRegion::Polygon(square(0.0, 0.0, 20.0, 10.0))];
        ren.fill(
            &square(0.0, 0.0, 20.0, 20.0),
            FillingRule::NonZero,
            &clips,
            &mut cov,
        );
        assert_eq!(cov.sum(), 20 * 10 * 255);
        assert_eq!(cov.get(5, 5), 255);
        assert_eq!(cov.get(5, 15), 0);
    }

    #[test]
    fn sequential_clips_intersect() {
        let (mut ren, mut cov) = setup(20, 20);
        let clips = [
            ClipRegion::Rect(Rectangle::new(0.0, 0.0, 10.0, 20.0)),
            ClipRegion::Polygon(square(0.0, 0.0, 20.0, 10.0)),
        ];
        ren.fill(
            &square(0.0, 0.0, 20.0, 20.0),
            FillingRule::NonZero,
            &clips,
            &mut cov,
        );
        assert_eq!(cov.sum(), 10 * 10 * 255);
    }

    #[test]
    fn stroke_covers_the_centerline() {
        let (mut ren, mut cov) = setup(20, 20);
        let mut p = Path::new();
        p.move_to(2.0, 10.0);
        p.line_to(18.0, 10.0);
        let style = StrokeStyle {
            width: 4.0,
            ..Default::default()
        };
        ren.stroke(&p, &style, &[], &mut cov);
        for x in 3..17 {
            assert_eq!(cov.get(x, 9), 255, "pixel ({}, 9)", x);
            assert_eq!(cov.get(x, 10), 255, "pixel ({}, 10)", x);
        }
        assert_eq!(cov.get(10, 3), 0);
    }

    #[test]
    fn dashed_stroke_leaves_gaps() {
        let (mut ren, mut cov) = setup(40, 10);
        let mut p = Path::new();
        p.move_to(0.0, 5.0);
        p.line_to(40.0, 5.0);
        let style = StrokeStyle {
            width: 2.0,
            dash: Some(DashPattern::new(vec![4.0, 4.0], 0.0)),
            ..Default::default()
        };
        ren.stroke(&p, &style, &[], &mut cov);
        assert_eq!(cov.get(2, 5), 255);
        assert_eq!(cov.get(6, 5), 0);
        assert_eq!(cov.get(10, 5), 255);
    }

    #[test]
    fn degenerate_path_renders_nothing() {
        let (mut ren, mut cov) = setup(10, 10);
        let mut p = Path::new();
        p.move_to(5.0, 5.0);
        ren.fill(&p, FillingRule::NonZero, &[], &mut cov);
        assert_eq!(cov.sum(), 0);
        ren.stroke(&p, &StrokeStyle::default(), &[], &mut cov);
        assert_eq!(cov.sum(), 0);
    }
}
