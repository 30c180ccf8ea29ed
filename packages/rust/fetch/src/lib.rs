//! HTTP collaborators: manga page fetch and image download.
//!
//! Both are thin wrappers over one shared `reqwest` client. There are no
//! retries; callers decide whether a failure skips the manga or is only logged.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use tomoscrape_shared::{Result, ScrapeConfig, TomoError};

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Fetches catalog pages and downloads images.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher with the configured user agent and timeout.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TomoError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET a page and return its body. Non-2xx responses are errors.
    #[instrument(skip(self))]
    pub async fn fetch_document(&self, url: &str) -> Result<String> {
        debug!("fetching document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TomoError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TomoError::fetch(url, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| TomoError::fetch(url, format!("body read failed: {e}")))
    }

    /// GET an image and write it to `path`, creating parent directories.
    /// Returns the number of bytes written.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn download_image(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TomoError::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TomoError::download(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TomoError::download(url, format!("body read failed: {e}")))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TomoError::download(url, format!("{}: {e}", parent.display())))?;
        }
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| TomoError::download(url, format!("{}: {e}", path.display())))?;

        debug!(bytes = bytes.len(), "image saved");
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomoscrape_shared::AppConfig;
    use uuid::Uuid;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        let mut config = ScrapeConfig::try_from(&AppConfig::default()).unwrap();
        config.user_agent = "tomoscrape-test".into();
        config.timeout_secs = 5;
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetch_document_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coleccion.php"))
            .and(header("user-agent", "tomoscrape-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h2>Berserk</h2>"))
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch_document(&format!("{}/coleccion.php", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<h2>Berserk</h2>");
    }

    #[tokio::test]
    async fn fetch_document_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch_document(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, TomoError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn fetch_document_unreachable_host() {
        let err = fetcher()
            .fetch_document("http://127.0.0.1:1/nothing")
            .await
            .unwrap_err();
        assert!(matches!(err, TomoError::Fetch { .. }));
    }

    #[tokio::test]
    async fn download_image_writes_bytes_and_creates_dirs() {
        let server = MockServer::start().await;
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        Mock::given(path("/tomos/1.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg.clone()))
            .mount(&server)
            .await;

        let tmp_dir = std::env::temp_dir().join(format!("tomo-fetch-test-{}", Uuid::now_v7()));
        let target = tmp_dir.join("tomos/7/1.jpg");

        let written = fetcher()
            .download_image(&format!("{}/tomos/1.jpg", server.uri()), &target)
            .await
            .unwrap();

        assert_eq!(written, jpeg.len() as u64);
        assert_eq!(std::fs::read(&target).unwrap(), jpeg);

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[tokio::test]
    async fn download_image_error_status_is_download_error() {
        let server = MockServer::start().await;
        Mock::given(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tmp_dir = std::env::temp_dir().join(format!("tomo-fetch-test-{}", Uuid::now_v7()));
        let target = tmp_dir.join("gone.jpg");

        let err = fetcher()
            .download_image(&format!("{}/gone.jpg", server.uri()), &target)
            .await
            .unwrap_err();
        assert!(matches!(err, TomoError::Download { .. }));
        assert!(!target.exists());
    }
}
