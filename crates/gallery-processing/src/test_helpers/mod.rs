//! Test helpers for processor unit and integration tests
//!
//! In-memory storage with failure injection, a revalidator that records its calls,
//! a transcoder that fails chosen sizes and generated image fixtures.

pub mod fixtures;
pub mod mock_storage;
pub mod revalidator;
pub mod transcoder;

pub use mock_storage::{MockObject, MockStorage};
pub use revalidator::RecordingRevalidator;
pub use transcoder::FailingTranscoder;

use gallery_db::MediaMetadataStore;
use std::sync::Arc;

use crate::image::NativeImageTranscoder;
use crate::upload::{PipelineServices, PipelineSettings};

/// Pipeline services over in-memory collaborators and the native transcoder.
pub fn test_services(
    storage: Arc<MockStorage>,
    store: Arc<dyn MediaMetadataStore>,
    revalidator: Arc<RecordingRevalidator>,
) -> PipelineServices {
    PipelineServices {
        storage,
        store,
        transcoder: Arc::new(NativeImageTranscoder),
        revalidator,
        settings: PipelineSettings::default(),
    }
}
