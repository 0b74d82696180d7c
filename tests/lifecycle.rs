//! Engine initialize/shutdown behaviour.
//!
//! The engine flag is process-wide, so everything lives in a single test.

use vipsize::engine::{self, Engine, EngineSettings};
use vipsize::imaging::{Options, ResizeError};

#[test]
fn initialize_and_shutdown_are_idempotent() {
    assert!(!engine::is_initialized());
    assert!(!engine::shutdown());

    assert!(engine::initialize());
    assert!(!engine::initialize());
    assert!(engine::is_initialized());

    assert!(engine::shutdown());
    assert!(!engine::shutdown());
    assert!(!engine::is_initialized());

    // Building an engine brings the flag back up
    let engine = Engine::new(EngineSettings::default());
    assert!(engine::is_initialized());

    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.resize(16, 0);

    engine::shutdown();
    assert!(matches!(
        engine.resize(&png, &Options::default()),
        Err(ResizeError::NotInitialized)
    ));
    assert!(matches!(
        engine.auto_rotate(std::path::Path::new("/nonexistent.jpg"), &Options::default()),
        Err(ResizeError::NotInitialized)
    ));
}
