use subpix::{EngineKind, Error, Renderer, SubPixelConfig};

use std::env;

// All environment manipulation lives in this single test in this one
// binary, so no parallel test can observe a half-set configuration.

#[test]
fn renderer_from_env_picks_up_settings() {
    env::set_var("SUBPIX_LOG2_X", "4");
    env::set_var("SUBPIX_LOG2_Y", "1");
    env::set_var("SUBPIX_ENGINE", "scanline-area");
    env::set_var("SUBPIX_VERBOSE", "0");

    let ren = Renderer::from_env().unwrap();
    assert_eq!(ren.config().log2_x(), 4);
    assert_eq!(ren.config().log2_y(), 1);
    assert_eq!(ren.config().engine(), EngineKind::ScanlineArea);
    assert_eq!(ren.engine_name(), "scanline-area");

    env::set_var("SUBPIX_ENGINE", "pisces");
    match SubPixelConfig::from_env() {
        Err(Error::UnknownEngine(name)) => assert_eq!(name, "pisces"),
        other => panic!("expected UnknownEngine, got {:?}", other),
    }

    env::set_var("SUBPIX_ENGINE", "scanline-area");
    env::set_var("SUBPIX_LOG2_X", "banana");
    assert!(SubPixelConfig::from_env().is_err());

    env::remove_var("SUBPIX_LOG2_X");
    env::remove_var("SUBPIX_LOG2_Y");
    env::remove_var("SUBPIX_ENGINE");
    env::remove_var("SUBPIX_VERBOSE");
}
