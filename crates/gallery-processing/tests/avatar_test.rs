use gallery_core::{AppError, UserRecord};
use gallery_db::InMemoryMetadataStore;
use gallery_processing::test_helpers::fixtures::{sample_gif, sample_png};
use gallery_processing::test_helpers::{test_services, MockStorage, RecordingRevalidator};
use gallery_processing::{ProcessOutcome, SkipReason, UploadEvent, UploadEventRouter};
use std::sync::Arc;

struct Harness {
    storage: Arc<MockStorage>,
    store: Arc<InMemoryMetadataStore>,
    revalidator: Arc<RecordingRevalidator>,
    router: UploadEventRouter,
}

fn harness() -> Harness {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(InMemoryMetadataStore::new());
    let revalidator = Arc::new(RecordingRevalidator::new());
    store
        .insert_user(UserRecord {
            id: "u1".to_string(),
            ..Default::default()
        })
        .unwrap();
    let router = UploadEventRouter::new(&test_services(
        storage.clone(),
        store.clone(),
        revalidator.clone(),
    ));
    Harness {
        storage,
        store,
        revalidator,
        router,
    }
}

#[tokio::test]
async fn avatar_upload_stores_original_and_sizes() {
    let h = harness();
    let key = "users/u1/avatar/me.png";
    h.storage.set_file(key, sample_png(400, 300), Some("image/png"));

    let outcome = h
        .router
        .handle_event(&UploadEvent::new("gallery-uploads", key))
        .await
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Processed);

    let user = h.store.user("u1").unwrap();
    assert_eq!(
        user.avatar_url.as_deref(),
        Some("https://cdn.example.com/users/u1/avatar/thumbnails/original.webp")
    );
    let mut sizes: Vec<&str> = user.avatar_thumbnails.keys().map(String::as_str).collect();
    sizes.sort();
    assert_eq!(sizes, vec!["large", "medium", "small"]);

    let small = h
        .storage
        .get_file("users/u1/avatar/thumbnails/small.webp")
        .unwrap();
    let decoded = image::load_from_memory(&small).unwrap();
    assert_eq!(image::GenericImageView::dimensions(&decoded), (64, 64));

    assert!(h.revalidator.calls().is_empty());
}

#[tokio::test]
async fn gif_avatar_is_rejected_and_user_left_unchanged() {
    let h = harness();
    let key = "users/u1/avatar/anim.gif";
    h.storage.set_file(key, sample_gif(40, 40), Some("image/gif"));

    let err = h
        .router
        .handle_event(&UploadEvent::new("gallery-uploads", key))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    assert!(h.store.user("u1").unwrap().avatar_url.is_none());
    assert_eq!(h.storage.put_count(), 0);
}

#[tokio::test]
async fn missing_avatar_object_is_skipped() {
    let h = harness();

    let outcome = h
        .router
        .handle_event(&UploadEvent::new("gallery-uploads", "users/u1/avatar/me.png"))
        .await
        .unwrap();

    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::ObjectNotFound));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn avatar_for_unknown_user_is_an_error() {
    let h = harness();
    let key = "users/ghost/avatar/me.png";
    h.storage.set_file(key, sample_png(100, 100), Some("image/png"));

    let err = h
        .router
        .handle_event(&UploadEvent::new("gallery-uploads", key))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn missing_filename_is_skipped() {
    let h = harness();

    let outcome = h
        .router
        .handle_event(&UploadEvent::new("gallery-uploads", "users/u1/avatar/"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ProcessOutcome::Skipped(SkipReason::MissingPathSegment)
    );
}
