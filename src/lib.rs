//! Scanline polygon rasterizer with configurable sub-pixel anti-aliasing
//!
//! Converts vector paths (lines, quadratic and cubic curves, with optional
//! stroking and dashing) into per-pixel coverage values suitable for
//! compositing with a paint color. Coverage is computed by signed-area
//! accumulation on a sub-pixel grid whose resolution is configured once at
//! startup.
//!
//! # Data flow
//!
//! ```text
//!   cfg  = SubPixelConfig::new(3, 3)
//!   ren  = Renderer::new(cfg)
//!   cov  = CoverageBuffer::new(w, h, &cfg)
//!  Fill
//!    ren.fill(&path, rule, clips, &mut cov)
//!      path.xconvert()           -- curves flattened to line segments
//!      ras.line_to_d()
//!        clip.line_to()          -- segment clipping against the buffer
//!          cells.line()          -- cover/area accumulation per cell
//!      ras.sweep_scanline()      -- cells -> 8-bit coverage spans
//!      cov.blend_span()
//!      clip regions              -- rect bounds / polygon mask, min-combined
//!  Stroke
//!    ren.stroke(&path, &style, clips, &mut cov)
//!      Dash::xconvert()          -- optional, arc-length on/off toggling
//!      Stroke::xconvert()        -- caps, joins, closed fillable outlines
//!      then as Fill (non-zero rule)
//! ```
//!
//! # Example
//!
//!     let cfg = subpix::SubPixelConfig::new(3, 3).unwrap();
//!     let mut ren = subpix::Renderer::new(cfg).unwrap();
//!     let mut cov = subpix::CoverageBuffer::new(100, 100, &cfg).unwrap();
//!
//!     let mut path = subpix::Path::new();
//!     path.move_to(10.0, 10.0);
//!     path.line_to(50.0, 90.0);
//!     path.line_to(90.0, 10.0);
//!     path.close_polygon();
//!
//!     ren.fill(&path, subpix::FillingRule::NonZero, &[], &mut cov);

pub mod cell;
pub mod clip;
pub mod config;
pub mod coverage;
pub mod curve;
pub mod dash;
pub mod dump;
pub mod path;
pub mod raster;
pub mod renderer;
pub mod scan;
pub mod stroke;

pub use crate::clip::{ClipRegion, Rectangle};
pub use crate::config::{EngineKind, Error, SubPixelConfig, MAX_SUBPIXEL_LOG2};
pub use crate::coverage::CoverageBuffer;
pub use crate::dash::{Dash, DashPattern};
pub use crate::path::{Path, PathCommand, Vertex, VertexSource};
pub use crate::raster::{FillingRule, RasterizerScanline};
pub use crate::renderer::{Renderer, StrokeStyle};
pub use crate::scan::Scanline;
pub use crate::stroke::{InnerJoin, LineCap, LineJoin, Stroke};
