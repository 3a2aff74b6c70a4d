use std::sync::Arc;

use crate::generation::service::ContentService;
use crate::store::RecordStore;
use crate::watermark::WatermarkStore;

/// Collaborators the engine talks to, built once in `main` and handed to
/// the poller. Tests assemble one from in-memory doubles.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn RecordStore>,
    pub content: Arc<dyn ContentService>,
    pub watermark: Arc<dyn WatermarkStore>,
}
