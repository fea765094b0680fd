//! OCR request pipeline.
//!
//! One linear pass per request: validate the URL, fetch, check the declared
//! content type, decode to RGB, recognize, then append the audit line and
//! store the debug image. The first failing step ends the request; nothing
//! is retried and no partial text is returned.

mod types;

use std::sync::Arc;

use image::DynamicImage;

use crate::config::{Settings, DEFAULT_LOG_EXCERPT_CHARS};
use crate::decode::decode_rgb;
use crate::fetch::{FetchError, ImageFetcher};
use crate::ocr::{OcrBackend, OcrError, OcrResult, TesseractBackend};
use crate::storage::{AuditStore, FsAuditStore, LogEntry};

pub use types::{OcrRequestError, Recognized, UNSUPPORTED_FORMAT_MESSAGE};

/// Service for OCR requests.
#[derive(Clone)]
pub struct OcrService {
    fetcher: ImageFetcher,
    backend: Arc<dyn OcrBackend>,
    store: Arc<dyn AuditStore>,
    excerpt_chars: usize,
}

impl OcrService {
    /// Create a new OCR service.
    pub fn new(
        fetcher: ImageFetcher,
        backend: Arc<dyn OcrBackend>,
        store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            fetcher,
            backend,
            store,
            excerpt_chars: DEFAULT_LOG_EXCERPT_CHARS,
        }
    }

    /// Tesseract backend and on-disk audit store, as configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let fetcher = ImageFetcher::from_settings(settings)?;
        let backend = Arc::new(TesseractBackend::with_config(settings.ocr.clone()));
        let store = Arc::new(FsAuditStore::from_settings(settings));
        Ok(Self::new(fetcher, backend, store).with_excerpt_chars(settings.log_excerpt_chars))
    }

    /// Set how many characters of text each log line keeps.
    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    pub fn backend(&self) -> &dyn OcrBackend {
        self.backend.as_ref()
    }

    /// Handle one OCR request end to end, returning the trimmed text.
    ///
    /// The fetch uses the trimmed URL; the log line records it as received.
    pub async fn process(&self, image_url: Option<&str>) -> Result<String, OcrRequestError> {
        let received = image_url.unwrap_or_default();
        let image_url = validate_image_url(image_url)?;

        let recognized = self.recognize(image_url).await?;
        tracing::info!(
            "Recognized {} chars from {} via {} in {}ms",
            recognized.text.chars().count(),
            image_url,
            recognized.backend,
            recognized.processing_time_ms
        );

        let entry = LogEntry::new(received, &recognized.text, self.excerpt_chars);
        self.store
            .append(&entry)
            .await
            .map_err(|source| OcrRequestError::Storage {
                action: "append OCR log",
                source,
            })?;
        self.store
            .store(&recognized.image, &entry.image_id())
            .await
            .map_err(|source| OcrRequestError::Storage {
                action: "save debug image",
                source,
            })?;

        Ok(recognized.text)
    }

    /// Fetch, validate, decode and recognize without touching the audit store.
    pub async fn recognize(&self, image_url: &str) -> Result<Recognized, OcrRequestError> {
        let fetched = self.fetcher.fetch(image_url).await?;

        if !fetched.is_declared_image() {
            return Err(OcrRequestError::ContentType(
                fetched.content_type_or_unknown().to_string(),
            ));
        }

        let image = decode_rgb(&fetched.bytes)?;
        let (image, result) = self.run_backend(image).await?;
        let result = result?;

        Ok(Recognized {
            text: result.text.trim().to_string(),
            image,
            backend: result.backend,
            processing_time_ms: result.processing_time_ms,
        })
    }

    /// Full audit log contents, `None` before the first successful request.
    pub async fn read_log(&self) -> std::io::Result<Option<String>> {
        self.store.read_log().await
    }

    /// Run the (blocking) backend off the async runtime, handing the image back.
    async fn run_backend(
        &self,
        image: DynamicImage,
    ) -> Result<(DynamicImage, Result<OcrResult, OcrError>), OcrRequestError> {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || {
            let result = backend.ocr_image(&image);
            (image, result)
        })
        .await
        .map_err(|e| OcrRequestError::Internal(format!("OCR task failed: {}", e)))
    }
}

/// Require a non-blank URL.
pub fn validate_image_url(image_url: Option<&str>) -> Result<&str, OcrRequestError> {
    match image_url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(OcrRequestError::MissingImageUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    use axum::{
        http::{header::CONTENT_TYPE, StatusCode},
        routing::get,
        Router,
    };
    use image::{ImageFormat, RgbImage};

    use crate::storage::MemoryAuditStore;

    /// Backend that returns canned text.
    struct FixedBackend(String);

    impl OcrBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "always available".to_string()
        }

        fn ocr_image(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                text: self.0.clone(),
                backend: "fixed",
                processing_time_ms: 0,
            })
        }
    }

    /// Backend that always fails.
    struct BrokenBackend;

    impl OcrBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn availability_hint(&self) -> String {
            "never available".to_string()
        }

        fn ocr_image(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
            Err(OcrError::OcrFailed("engine exploded".to_string()))
        }
    }

    fn jpeg_bytes() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 6, image::Rgb([255, 255, 255])))
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    async fn spawn_upstream() -> String {
        let jpeg = jpeg_bytes();
        let app = Router::new()
            .route(
                "/hello.jpg",
                get(move || {
                    let jpeg = jpeg.clone();
                    async move { ([(CONTENT_TYPE, "image/jpeg")], jpeg) }
                }),
            )
            .route(
                "/page.html",
                get(|| async { ([(CONTENT_TYPE, "text/html; charset=utf-8")], "<html></html>") }),
            )
            .route(
                "/logo.svg",
                get(|| async { ([(CONTENT_TYPE, "image/svg+xml")], "<svg></svg>") }),
            )
            .route(
                "/notfound.png",
                get(|| async { (StatusCode::NOT_FOUND, "gone") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn service(backend: Arc<dyn OcrBackend>, store: Arc<MemoryAuditStore>) -> OcrService {
        let fetcher = ImageFetcher::new(Duration::from_secs(5), None).unwrap();
        OcrService::new(fetcher, backend, store)
    }

    #[test]
    fn test_validate_image_url() {
        assert!(matches!(
            validate_image_url(None),
            Err(OcrRequestError::MissingImageUrl)
        ));
        assert!(matches!(
            validate_image_url(Some("")),
            Err(OcrRequestError::MissingImageUrl)
        ));
        assert!(matches!(
            validate_image_url(Some("   ")),
            Err(OcrRequestError::MissingImageUrl)
        ));
        assert_eq!(validate_image_url(Some(" https://a/b.png ")).unwrap(), "https://a/b.png");
    }

    #[tokio::test]
    async fn test_process_success_trims_and_audits() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("  HELLO \n\n".to_string())), store.clone());

        let url = format!("{}/hello.jpg", base);
        let text = svc.process(Some(&url)).await.unwrap();
        assert_eq!(text, "HELLO");

        let lines = store.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(&format!(" | {} | HELLO\n", url)));

        let images = store.images();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].1, images[0].2), (12, 6));
    }

    #[tokio::test]
    async fn test_process_logs_url_as_received() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("HELLO".to_string())), store.clone());

        let received = format!("  {}/hello.jpg ", base);
        let text = svc.process(Some(&received)).await.unwrap();
        assert_eq!(text, "HELLO");

        let lines = store.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(&format!(" | {} | HELLO\n", received)));
    }

    #[tokio::test]
    async fn test_process_log_excerpt_is_truncated() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("x".repeat(250))), store.clone());

        let text = svc
            .process(Some(&format!("{}/hello.jpg", base)))
            .await
            .unwrap();
        assert_eq!(text.len(), 250);

        let line = &store.lines()[0];
        let excerpt = line.trim_end().rsplit(" | ").next().unwrap();
        assert_eq!(excerpt.chars().count(), 100);
    }

    #[tokio::test]
    async fn test_process_rejects_html() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("unused".to_string())), store.clone());

        let err = svc
            .process(Some(&format!("{}/page.html", base)))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrRequestError::ContentType(ref ct) if ct.contains("text/html")));
        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn test_process_rejects_svg() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("unused".to_string())), store.clone());

        let err = svc
            .process(Some(&format!("{}/logo.svg", base)))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrRequestError::UnsupportedFormat(_)));
        assert_eq!(err.to_string(), UNSUPPORTED_FORMAT_MESSAGE);
    }

    #[tokio::test]
    async fn test_process_upstream_404() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("unused".to_string())), store.clone());

        let err = svc
            .process(Some(&format!("{}/notfound.png", base)))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrRequestError::Fetch(FetchError::Status { .. })));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_process_backend_failure_leaves_no_audit_trail() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(BrokenBackend), store.clone());

        let err = svc
            .process(Some(&format!("{}/hello.jpg", base)))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrRequestError::Ocr(_)));
        assert!(store.lines().is_empty());
        assert!(store.images().is_empty());
    }

    #[tokio::test]
    async fn test_recognize_has_no_side_effects() {
        let base = spawn_upstream().await;
        let store = Arc::new(MemoryAuditStore::new());
        let svc = service(Arc::new(FixedBackend("HELLO".to_string())), store.clone());

        let recognized = svc
            .recognize(&format!("{}/hello.jpg", base))
            .await
            .unwrap();
        assert_eq!(recognized.text, "HELLO");
        assert_eq!(recognized.backend, "fixed");
        assert!(store.lines().is_empty());
        assert_eq!(svc.read_log().await.unwrap(), None);
    }
}
