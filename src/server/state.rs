use crate::processor::BackgroundRemovalProcessor;
use std::sync::{Arc, Mutex};

/// Shared handler state
///
/// One processor serves every request; the mutex serializes inference.
#[derive(Debug, Clone)]
pub struct AppState {
    pub processor: Arc<Mutex<BackgroundRemovalProcessor>>,
    /// Expose error details in 500 responses
    pub debug: bool,
}

impl AppState {
    #[must_use]
    pub fn new(processor: BackgroundRemovalProcessor, debug: bool) -> Self {
        Self {
            processor: Arc::new(Mutex::new(processor)),
            debug,
        }
    }
}
