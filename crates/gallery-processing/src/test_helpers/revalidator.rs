use async_trait::async_trait;
use gallery_infra::CacheRevalidator;
use std::sync::Mutex;

/// Records every revalidation request instead of sending it.
#[derive(Default)]
pub struct RecordingRevalidator {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag lists passed to `revalidate`, in call order. Empty lists are recorded too.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheRevalidator for RecordingRevalidator {
    async fn revalidate(&self, tags: &[String]) {
        self.calls.lock().unwrap().push(tags.to_vec());
    }
}
