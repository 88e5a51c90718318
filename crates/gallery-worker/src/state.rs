use gallery_processing::UploadEventRouter;
use gallery_storage::StorageBackend;
use std::sync::Arc;

/// Shared state handed to every handler.
pub struct AppState {
    pub router: Arc<UploadEventRouter>,
    pub storage_backend: StorageBackend,
}
