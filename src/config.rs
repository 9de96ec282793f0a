//! Sub-pixel grid configuration and engine selection
//!
//! The sub-pixel resolution is defined by two log2 values, one per axis:
//! a log2 of 3 means 8 sub-pixel samples per pixel in that axis. The
//! configuration is constructed once at startup, validated there, and then
//! passed by value into the [Renderer](crate::Renderer); nothing in the
//! crate reads global state after that point.

use std::env;
use std::fmt;

/// Largest accepted sub-pixel log2 value per axis (256 samples per pixel)
pub const MAX_SUBPIXEL_LOG2: u32 = 8;

/// Largest sub-pixel coordinate magnitude the cell accumulator addresses
///
/// Checked against `max(width, height) << log2` when a coverage buffer is
/// created, so overflow is a startup error rather than a mid-pass surprise.
const COORD_LIMIT: u64 = 1 << 30;

const ENV_LOG2_X: &str = "SUBPIX_LOG2_X";
const ENV_LOG2_Y: &str = "SUBPIX_LOG2_Y";
const ENV_ENGINE: &str = "SUBPIX_ENGINE";
const ENV_VERBOSE: &str = "SUBPIX_VERBOSE";

/// Configuration and validation errors
///
/// Geometry is never an error: degenerate paths produce empty coverage.
/// Everything that can fail does so here, at initialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Sub-pixel log2 value outside `0..=MAX_SUBPIXEL_LOG2`
    SubPixelOutOfRange { axis: char, value: u32 },
    /// Target buffer too large for the configured sub-pixel resolution
    TargetTooLarge {
        width: usize,
        height: usize,
        log2_x: u32,
        log2_y: u32,
    },
    /// Engine name not recognized at startup
    UnknownEngine(String),
    /// Environment variable present but malformed
    InvalidEnv { var: &'static str, value: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::SubPixelOutOfRange { axis, value } => write!(
                f,
                "sub-pixel log2 {} = {} outside 0..={}",
                axis, value, MAX_SUBPIXEL_LOG2
            ),
            Error::TargetTooLarge {
                width,
                height,
                log2_x,
                log2_y,
            } => write!(
                f,
                "target {}x{} overflows the cell accumulator at sub-pixel log2 {}x{}",
                width, height, log2_x, log2_y
            ),
            Error::UnknownEngine(name) => write!(f, "unknown rasterizer engine {:?}", name),
            Error::InvalidEnv { var, value } => {
                write!(f, "invalid value {:?} for environment variable {}", value, var)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Scan-conversion engine selection
///
/// Resolved once when the [Renderer](crate::Renderer) is constructed,
/// never looked up mid-render. Only the signed-area scanline engine is
/// built in; the enum exists so alternate engines can be A/B tested
/// behind the same interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineKind {
    /// Signed-area cell accumulation swept into coverage scanlines
    ScanlineArea,
}

impl EngineKind {
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "scanline-area" => Ok(EngineKind::ScanlineArea),
            _ => Err(Error::UnknownEngine(name.to_string())),
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::ScanlineArea => "scanline-area",
        }
    }
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::ScanlineArea
    }
}

/// Process-wide rasterization configuration
///
/// Immutable after construction; copied into every component that needs
/// the sub-pixel scales.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SubPixelConfig {
    log2_x: u32,
    log2_y: u32,
    engine: EngineKind,
    verbose: bool,
}

impl Default for SubPixelConfig {
    /// 8x8 sub-pixel samples per pixel
    fn default() -> Self {
        Self {
            log2_x: 3,
            log2_y: 3,
            engine: EngineKind::default(),
            verbose: false,
        }
    }
}

impl SubPixelConfig {
    /// Create a configuration with the given per-axis sub-pixel log2 values
    pub fn new(log2_x: u32, log2_y: u32) -> Result<Self, Error> {
        if log2_x > MAX_SUBPIXEL_LOG2 {
            return Err(Error::SubPixelOutOfRange {
                axis: 'x',
                value: log2_x,
            });
        }
        if log2_y > MAX_SUBPIXEL_LOG2 {
            return Err(Error::SubPixelOutOfRange {
                axis: 'y',
                value: log2_y,
            });
        }
        Ok(Self {
            log2_x,
            log2_y,
            ..Default::default()
        })
    }

    /// Read the configuration from the environment, once, at startup
    ///
    /// Recognized variables: `SUBPIX_LOG2_X`, `SUBPIX_LOG2_Y`,
    /// `SUBPIX_ENGINE`, `SUBPIX_VERBOSE`. Absent variables keep their
    /// defaults; malformed ones fail fast.
    pub fn from_env() -> Result<Self, Error> {
        let mut cfg = Self::default();
        if let Some(v) = read_env(ENV_LOG2_X)? {
            cfg = Self::new(parse_u32(ENV_LOG2_X, &v)?, cfg.log2_y)?;
        }
        if let Some(v) = read_env(ENV_LOG2_Y)? {
            cfg = Self::new(cfg.log2_x, parse_u32(ENV_LOG2_Y, &v)?)?;
        }
        if let Some(v) = read_env(ENV_ENGINE)? {
            cfg.engine = EngineKind::from_name(&v)?;
        }
        if let Some(v) = read_env(ENV_VERBOSE)? {
            cfg.verbose = match v.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(Error::InvalidEnv {
                        var: ENV_VERBOSE,
                        value: v,
                    })
                }
            };
        }
        Ok(cfg)
    }

    /// Select the scan-conversion engine
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }
    /// Report the active engine on stderr when the renderer is built
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn log2_x(&self) -> u32 {
        self.log2_x
    }
    pub fn log2_y(&self) -> u32 {
        self.log2_y
    }
    /// Sub-pixel samples per pixel in x
    pub fn scale_x(&self) -> i64 {
        1 << self.log2_x
    }
    /// Sub-pixel samples per pixel in y
    pub fn scale_y(&self) -> i64 {
        1 << self.log2_y
    }
    pub fn engine(&self) -> EngineKind {
        self.engine
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Verify a target buffer is addressable at this sub-pixel resolution
    ///
    /// Called when a [CoverageBuffer](crate::CoverageBuffer) is created.
    pub fn check_target(&self, width: usize, height: usize) -> Result<(), Error> {
        let side = width.max(height) as u64;
        let shift = self.log2_x.max(self.log2_y);
        if side << shift > COORD_LIMIT {
            return Err(Error::TargetTooLarge {
                width,
                height,
                log2_x: self.log2_x,
                log2_y: self.log2_y,
            });
        }
        Ok(())
    }
}

fn read_env(var: &'static str) -> Result<Option<String>, Error> {
    match env::var(var) {
        Ok(v) => Ok(Some(v)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(v)) => Err(Error::InvalidEnv {
            var,
            value: v.to_string_lossy().into_owned(),
        }),
    }
}

fn parse_u32(var: &'static str, value: &str) -> Result<u32, Error> {
    value.trim().parse().map_err(|_| Error::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
