use gallery_core::{AppError, MediaRecord, MediaStatus};
use gallery_db::InMemoryMetadataStore;
use gallery_processing::test_helpers::fixtures::{sample_gif, sample_jpeg, sample_png};
use gallery_processing::test_helpers::{
    test_services, FailingTranscoder, MockStorage, RecordingRevalidator,
};
use gallery_processing::{ProcessOutcome, SkipReason, UploadEvent, UploadEventRouter};
use std::sync::Arc;

const BUCKET: &str = "gallery-uploads";
const CDN: &str = "https://cdn.example.com";

struct Harness {
    storage: Arc<MockStorage>,
    store: Arc<InMemoryMetadataStore>,
    revalidator: Arc<RecordingRevalidator>,
    router: UploadEventRouter,
}

impl Harness {
    fn new() -> Self {
        Self::with_storage(MockStorage::new())
    }

    fn with_storage(storage: MockStorage) -> Self {
        let storage = Arc::new(storage);
        let store = Arc::new(InMemoryMetadataStore::new());
        let revalidator = Arc::new(RecordingRevalidator::new());
        let services = test_services(storage.clone(), store.clone(), revalidator.clone());
        let router = UploadEventRouter::new(&services);
        Self {
            storage,
            store,
            revalidator,
            router,
        }
    }

    fn with_transcoder(transcoder: FailingTranscoder) -> Self {
        let storage = Arc::new(MockStorage::new());
        let store = Arc::new(InMemoryMetadataStore::new());
        let revalidator = Arc::new(RecordingRevalidator::new());
        let mut services = test_services(storage.clone(), store.clone(), revalidator.clone());
        services.transcoder = Arc::new(transcoder);
        let router = UploadEventRouter::new(&services);
        Self {
            storage,
            store,
            revalidator,
            router,
        }
    }

    fn seed_media(&self, id: &str, album_id: &str, key: &str, mime: &str) {
        self.store
            .insert_media(MediaRecord::pending(id, album_id, key, mime))
            .unwrap();
    }

    async fn upload(&self, key: &str) -> Result<ProcessOutcome, AppError> {
        self.router.handle_event(&UploadEvent::new(BUCKET, key)).await
    }
}

fn album_tags(album_id: &str) -> Vec<String> {
    vec!["albums".to_string(), format!("album-{}", album_id)]
}

#[tokio::test]
async fn jpeg_upload_gets_full_matrix_and_display_copy() {
    let h = Harness::new();
    let key = "albums/abc123/media/photo.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage
        .set_file(key, sample_jpeg(800, 600), Some("image/jpeg"));

    let outcome = h.upload(key).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Processed);

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.status, MediaStatus::Uploaded);

    let mut names: Vec<&str> = media.thumbnails.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["cover", "large", "medium", "originalSize", "small", "xlarge"]
    );
    assert_eq!(
        media.thumbnail_url.as_deref(),
        Some(format!("{}/albums/abc123/media/thumbnails/photo_small.webp", CDN).as_str())
    );

    let display = format!("{}/albums/abc123/media/photo_display.webp", CDN);
    assert_eq!(media.thumbnails.get("originalSize"), Some(&display));
    assert_eq!(media.display_url.as_deref(), Some(display.as_str()));
    assert_eq!(
        h.storage
            .object("albums/abc123/media/photo_display.webp")
            .unwrap()
            .content_type,
        "image/webp"
    );

    assert_eq!(h.revalidator.calls(), vec![album_tags("abc123")]);
}

#[tokio::test]
async fn non_image_upload_is_marked_uploaded_without_thumbnails() {
    let h = Harness::new();
    let key = "albums/abc123/media/doc.pdf";
    h.seed_media("m1", "abc123", key, "application/pdf");
    h.storage
        .set_file(key, b"%PDF-1.7".to_vec(), Some("application/pdf"));

    assert_eq!(h.upload(key).await.unwrap(), ProcessOutcome::Processed);

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.status, MediaStatus::Uploaded);
    assert!(media.thumbnails.is_empty());
    assert!(media.thumbnail_url.is_none());
    assert!(media.display_url.is_none());
    assert_eq!(h.storage.put_count(), 0);
    assert_eq!(h.revalidator.calls(), vec![album_tags("abc123")]);
}

#[tokio::test]
async fn thumbnail_echo_does_nothing() {
    let h = Harness::new();

    let outcome = h
        .upload("users/u1/avatar/thumbnails/small.webp")
        .await
        .unwrap();

    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::ThumbnailEcho));
    assert_eq!(h.storage.put_count(), 0);
    assert_eq!(h.store.write_count(), 0);
    assert!(h.revalidator.calls().is_empty());
}

#[tokio::test]
async fn upload_without_record_is_skipped() {
    let h = Harness::new();
    let key = "albums/xyz/media/missing.png";
    h.storage.set_file(key, sample_png(32, 32), Some("image/png"));

    let outcome = h.upload(key).await.unwrap();

    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::NoMatchingRecord));
    assert_eq!(h.storage.put_count(), 0);
    assert_eq!(h.store.write_count(), 0);
    assert!(h.revalidator.calls().is_empty());
}

#[tokio::test]
async fn deleted_object_is_skipped() {
    let h = Harness::new();
    let key = "albums/abc123/media/gone.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");

    let outcome = h.upload(key).await.unwrap();

    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::ObjectNotFound));
    assert_eq!(h.store.media("m1").unwrap().status, MediaStatus::Pending);
}

#[tokio::test]
async fn failed_sizes_are_left_out_of_the_record() {
    let h = Harness::with_transcoder(FailingTranscoder::failing_widths([960, 1600]));
    let key = "albums/abc123/media/photo.png";
    h.seed_media("m1", "abc123", key, "image/png");
    h.storage.set_file(key, sample_png(300, 200), Some("image/png"));

    assert_eq!(h.upload(key).await.unwrap(), ProcessOutcome::Processed);

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.status, MediaStatus::Uploaded);
    assert_eq!(media.thumbnails.len(), 4);
    assert!(media.thumbnails.contains_key("small"));
    assert!(!media.thumbnails.contains_key("large"));
    assert!(!media.thumbnails.contains_key("xlarge"));
    assert!(!h.storage.has_file("albums/abc123/media/thumbnails/photo_large.webp"));
}

#[tokio::test]
async fn primary_falls_back_when_small_fails() {
    let storage = MockStorage::new();
    storage.fail_puts_containing("photo_small");
    let h = Harness::with_storage(storage);
    let key = "albums/abc123/media/photo.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage.set_file(key, sample_jpeg(300, 300), Some("image/jpeg"));

    h.upload(key).await.unwrap();

    let media = h.store.media("m1").unwrap();
    assert!(!media.thumbnails.contains_key("small"));
    assert_eq!(
        media.thumbnail_url.as_deref(),
        Some(format!("{}/albums/abc123/media/thumbnails/photo_cover.webp", CDN).as_str())
    );
}

#[tokio::test]
async fn display_copy_alone_when_every_size_fails() {
    let h = Harness::with_transcoder(FailingTranscoder::failing_widths([
        240, 600, 480, 960, 1600,
    ]));
    let key = "albums/abc123/media/photo.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage.set_file(key, sample_jpeg(200, 200), Some("image/jpeg"));

    assert_eq!(h.upload(key).await.unwrap(), ProcessOutcome::Processed);

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.status, MediaStatus::Uploaded);
    assert!(media.thumbnails.is_empty());
    assert!(media.thumbnail_url.is_none());
    assert_eq!(
        media.display_url.as_deref(),
        Some(format!("{}/albums/abc123/media/photo_display.webp", CDN).as_str())
    );
}

#[tokio::test]
async fn display_failure_keeps_thumbnails() {
    let h = Harness::with_transcoder(FailingTranscoder::failing_widths([]).failing_reencode());
    let key = "albums/abc123/media/photo.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage.set_file(key, sample_jpeg(800, 600), Some("image/jpeg"));

    assert_eq!(h.upload(key).await.unwrap(), ProcessOutcome::Processed);

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.status, MediaStatus::Uploaded);
    assert_eq!(media.thumbnails.len(), 5);
    assert!(!media.thumbnails.contains_key("originalSize"));
    assert_eq!(
        media.thumbnail_url.as_deref(),
        Some(format!("{}/albums/abc123/media/thumbnails/photo_small.webp", CDN).as_str())
    );
    assert!(media.display_url.is_none());
    assert!(h
        .storage
        .object("albums/abc123/media/photo_display.webp")
        .is_none());
    assert_eq!(h.revalidator.calls(), vec![album_tags("abc123")]);
}

#[tokio::test]
async fn corrupt_image_still_marks_uploaded() {
    let h = Harness::new();
    let key = "albums/abc123/media/broken.png";
    h.seed_media("m1", "abc123", key, "image/png");
    h.storage
        .set_file(key, b"not really a png".to_vec(), Some("image/png"));

    assert_eq!(h.upload(key).await.unwrap(), ProcessOutcome::Processed);

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.status, MediaStatus::Uploaded);
    assert!(media.thumbnails.is_empty());
    assert_eq!(h.storage.put_count(), 0);
}

#[tokio::test]
async fn webp_upload_skips_display_copy() {
    let h = Harness::new();
    let key = "albums/abc123/media/photo.webp";
    h.seed_media("m1", "abc123", key, "image/webp");
    let webp = {
        let png = sample_png(120, 80);
        let img = image::load_from_memory(&png).unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::WebP).unwrap();
        out.into_inner()
    };
    h.storage.set_file(key, webp, Some("image/webp"));

    h.upload(key).await.unwrap();

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.thumbnails.len(), 5);
    assert!(!media.thumbnails.contains_key("originalSize"));
    assert!(media.display_url.is_none());
    assert!(!h.storage.has_file("albums/abc123/media/photo_display.webp"));
}

#[tokio::test]
async fn gif_upload_is_converted_for_display() {
    let h = Harness::new();
    let key = "albums/abc123/media/loop.gif";
    h.seed_media("m1", "abc123", key, "image/gif");
    h.storage.set_file(key, sample_gif(64, 48), Some("image/gif"));

    h.upload(key).await.unwrap();

    let media = h.store.media("m1").unwrap();
    assert_eq!(media.thumbnails.len(), 6);
    assert!(h.storage.has_file("albums/abc123/media/loop_display.webp"));
}

#[tokio::test]
async fn missing_content_type_falls_back_to_record_mime() {
    let h = Harness::new();
    let key = "albums/abc123/media/photo.png";
    h.seed_media("m1", "abc123", key, "image/png");
    h.storage.set_file(key, sample_png(100, 100), None);

    h.upload(key).await.unwrap();

    assert_eq!(h.store.media("m1").unwrap().thumbnails.len(), 6);
}

#[tokio::test]
async fn encoded_key_matches_the_stored_record() {
    let h = Harness::new();
    let key = "albums/abc123/media/summer trip.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage.set_file(key, sample_jpeg(100, 100), Some("image/jpeg"));

    let outcome = h
        .router
        .handle_event(&UploadEvent::new(BUCKET, "albums/abc123/media/summer+trip.jpg"))
        .await
        .unwrap();

    assert_eq!(outcome, ProcessOutcome::Processed);
    assert!(h
        .storage
        .has_file("albums/abc123/media/thumbnails/summer trip_small.webp"));
}

#[tokio::test]
async fn redelivery_rewrites_the_same_objects() {
    let h = Harness::new();
    let key = "albums/abc123/media/photo.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage.set_file(key, sample_jpeg(200, 150), Some("image/jpeg"));

    h.upload(key).await.unwrap();
    let first = h.store.media("m1").unwrap();
    let keys_after_first = h.storage.keys();

    h.upload(key).await.unwrap();
    let second = h.store.media("m1").unwrap();

    assert_eq!(h.storage.keys(), keys_after_first);
    assert_eq!(first.thumbnails, second.thumbnails);
    assert_eq!(second.status, MediaStatus::Uploaded);
    assert_eq!(h.revalidator.calls().len(), 2);
}

#[tokio::test]
async fn foreign_bucket_is_skipped() {
    let h = Harness::with_storage(MockStorage::new().with_bucket("other-bucket"));
    let key = "albums/abc123/media/photo.jpg";
    h.seed_media("m1", "abc123", key, "image/jpeg");
    h.storage.set_file(key, sample_jpeg(50, 50), Some("image/jpeg"));

    let outcome = h.upload(key).await.unwrap();

    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::ForeignBucket));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn missing_album_id_is_skipped() {
    let h = Harness::new();

    let outcome = h.upload("albums//media/photo.jpg").await.unwrap();

    assert_eq!(
        outcome,
        ProcessOutcome::Skipped(SkipReason::MissingPathSegment)
    );
}
