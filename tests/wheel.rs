//! Spoked wheel scene: a filled hub circle and 90 stroked radial spokes
//! on a 1000x1000 target. Exercises curve flattening, stroking and the
//! rasterizer together at realistic scale.

use subpix::{
    ClipRegion, CoverageBuffer, FillingRule, Path, Rectangle, Renderer, StrokeStyle,
    SubPixelConfig,
};

const CX: f64 = 500.0;
const CY: f64 = 500.0;
const HUB_R: f64 = 266.0;
const SPOKE_R0: f64 = 5.0;
const SPOKE_R1: f64 = 497.0;
const SPOKES: usize = 90;

fn hub() -> Path {
    let mut p = Path::new();
    let k = 0.552_284_749_8 * HUB_R;
    p.move_to(CX + HUB_R, CY);
    p.cubic_to(CX + HUB_R, CY + k, CX + k, CY + HUB_R, CX, CY + HUB_R);
    p.cubic_to(CX - k, CY + HUB_R, CX - HUB_R, CY + k, CX - HUB_R, CY);
    p.cubic_to(CX - HUB_R, CY - k, CX - k, CY - HUB_R, CX, CY - HUB_R);
    p.cubic_to(CX + k, CY - HUB_R, CX + HUB_R, CY - k, CX + HUB_R, CY);
    p.close_polygon();
    p
}

fn spokes() -> Path {
    let mut p = Path::new();
    for i in 0..SPOKES {
        let a = (i as f64) * 2.0 * std::f64::consts::PI / SPOKES as f64;
        let (s, c) = a.sin_cos();
        p.move_to(CX + SPOKE_R0 * c, CY + SPOKE_R0 * s);
        p.line_to(CX + SPOKE_R1 * c, CY + SPOKE_R1 * s);
    }
    p
}

fn render(cfg: SubPixelConfig) -> CoverageBuffer {
    let mut ren = Renderer::new(cfg).unwrap();
    let mut cov = CoverageBuffer::new(1000, 1000, &cfg).unwrap();
    ren.fill(&hub(), FillingRule::NonZero, &[], &mut cov);
    let style = StrokeStyle {
        width: 4.0,
        ..Default::default()
    };
    ren.stroke(&spokes(), &style, &[], &mut cov);
    cov
}

#[test]
fn wheel_scene_renders() {
    let cov = render(SubPixelConfig::default());

    // Hub interior is opaque
    assert_eq!(cov.get(500, 500), 255);
    assert_eq!(cov.get(400, 450), 255);

    // The 0 degree spoke runs along y = 500, width 4
    assert_eq!(cov.get(950, 499), 255);
    assert_eq!(cov.get(950, 500), 255);

    // Between spokes at radius 400 there is empty space
    // (angle 2 degrees, 14 px away from either neighboring spoke)
    let a = 2.0f64.to_radians();
    let x = (CX + 400.0 * a.cos()) as usize;
    let y = (CY + 400.0 * a.sin()) as usize;
    assert_eq!(cov.get(x, y), 0);

    // Corners are beyond the spoke radius
    assert_eq!(cov.get(0, 0), 0);
    assert_eq!(cov.get(999, 999), 0);

    // Total coverage is the hub disc plus 90 partial spokes, give or take
    // anti-aliased edges
    let hub_area = std::f64::consts::PI * HUB_R * HUB_R;
    let spoke_area = SPOKES as f64 * (SPOKE_R1 - HUB_R) * 4.0;
    let expected = (hub_area + spoke_area) * 255.0;
    let got = cov.sum() as f64;
    let err = (got - expected).abs() / expected;
    assert!(err < 0.05, "coverage error {:.4} too large", err);
}

#[test]
fn wheel_scene_is_deterministic() {
    let a = render(SubPixelConfig::default());
    let b = render(SubPixelConfig::default());
    assert_eq!(a, b);
}

#[test]
fn wheel_quadrant_clip() {
    let cfg = SubPixelConfig::default();
    let mut ren = Renderer::new(cfg).unwrap();
    let mut cov = CoverageBuffer::new(1000, 1000, &cfg).unwrap();
    let clips = [ClipRegion::Rect(Rectangle::new(0.0, 0.0, 500.0, 500.0))];
    ren.fill(&hub(), FillingRule::NonZero, &clips, &mut cov);
    // Upper-left quadrant of the hub survives, the rest is gone
    assert_eq!(cov.get(400, 400), 255);
    assert_eq!(cov.get(600, 600), 0);
    assert_eq!(cov.get(600, 400), 0);

    let quarter = std::f64::consts::PI * HUB_R * HUB_R / 4.0 * 255.0;
    let got = cov.sum() as f64;
    assert!((got - quarter).abs() / quarter < 0.02);
}
