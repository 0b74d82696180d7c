//! Engine lifecycle and request context.
//!
//! The process has one global "engine is up" flag. [`initialize`] and
//! [`shutdown`] flip it and are safe to call any number of times. An
//! [`Engine`] is the value callers hold: it carries the backend with its
//! settings and refuses work once the flag has been cleared.

use crate::imaging::{
    self, AutoRotated, ImageBackend, Options, PixelLimits, RequestPlan, ResizeError, RustBackend,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Engine-wide settings, read from the `[engine]` config section.
pub type EngineSettings = PixelLimits;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Bring the engine up. Returns `true` if this call changed the state.
pub fn initialize() -> bool {
    let changed = !INITIALIZED.swap(true, Ordering::SeqCst);
    if changed {
        info!("engine initialized");
    }
    changed
}

/// Tear the engine down. Returns `true` if this call changed the state.
pub fn shutdown() -> bool {
    let changed = INITIALIZED.swap(false, Ordering::SeqCst);
    if changed {
        info!("engine shut down");
    }
    changed
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

/// Request context: the backend every call runs on.
#[derive(Debug, Clone)]
pub struct Engine<B = RustBackend> {
    backend: B,
}

impl Engine<RustBackend> {
    /// Initialize the engine and build a [`RustBackend`] with `settings`.
    pub fn new(settings: EngineSettings) -> Self {
        debug!(
            "engine settings: max_alloc {} bytes, max_dimension {}px",
            settings.max_alloc, settings.max_dimension
        );
        Self::with_backend(RustBackend::with_limits(settings))
    }
}

impl<B: ImageBackend> Engine<B> {
    /// Initialize the engine around any backend.
    pub fn with_backend(backend: B) -> Self {
        initialize();
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_initialized(&self) -> Result<(), ResizeError> {
        if is_initialized() {
            Ok(())
        } else {
            Err(ResizeError::NotInitialized)
        }
    }

    /// See [`imaging::resize`].
    pub fn resize(&self, buf: &[u8], opts: &Options) -> Result<Vec<u8>, ResizeError> {
        self.ensure_initialized()?;
        imaging::resize(&self.backend, buf, opts)
    }

    /// See [`imaging::auto_rotate`].
    pub fn auto_rotate(&self, path: &Path, opts: &Options) -> Result<AutoRotated, ResizeError> {
        self.ensure_initialized()?;
        imaging::auto_rotate(&self.backend, path, opts)
    }

    /// See [`imaging::plan_buffer`].
    pub fn plan(&self, buf: &[u8], opts: &Options) -> Result<RequestPlan, ResizeError> {
        self.ensure_initialized()?;
        imaging::plan_buffer(&self.backend, buf, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;

    // The flag is process-wide, so the whole lifecycle lives in one test.
    #[test]
    fn engine_follows_global_flag() {
        let engine = Engine::with_backend(MockBackend::new(10, 10));
        assert!(is_initialized());
        assert!(!initialize());

        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.resize(16, 0);
        assert_eq!(engine.resize(&png, &Options::default()).unwrap(), b"10x10");

        assert!(shutdown());
        assert!(!shutdown());
        assert!(matches!(
            engine.resize(&png, &Options::default()),
            Err(ResizeError::NotInitialized)
        ));
        assert!(matches!(
            engine.auto_rotate(Path::new("/a.jpg"), &Options::default()),
            Err(ResizeError::NotInitialized)
        ));
        assert!(engine.backend().get_operations().len() == 3);

        assert!(initialize());
        assert!(engine.plan(&png, &Options::default()).is_ok());
    }
}
