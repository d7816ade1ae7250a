use crate::data::PlateLayout;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Outcome of a layout fetch, delivered to the UI loop
#[derive(Debug, Clone)]
pub enum LayoutMessage {
    Loaded(PlateLayout),
    /// Failure detail, shown to the user as-is
    Failed(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with an error status. The body is kept verbatim.
    #[error("{body}")]
    Rejected { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to read layout file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid plate layout: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Text to display in place of the plate
    pub fn detail(&self) -> String {
        match self {
            FetchError::Rejected { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Anything that can produce the layout of a plate
pub trait LayoutSource {
    fn fetch_layout(
        &self,
        plate_id: u32,
    ) -> impl Future<Output = Result<PlateLayout, FetchError>> + Send;
}

/// Fetches `GET {base_url}{layout_path}?plate_id=N` and decodes the JSON body
#[derive(Debug, Clone)]
pub struct HttpLayoutSource {
    client: reqwest::Client,
    url: String,
}

impl HttpLayoutSource {
    pub fn new(base_url: &str, layout_path: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, layout_path)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, layout_path: &str) -> Self {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            layout_path.trim_start_matches('/')
        );
        Self { client, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LayoutSource for HttpLayoutSource {
    async fn fetch_layout(&self, plate_id: u32) -> Result<PlateLayout, FetchError> {
        debug!("GET {} plate_id={}", self.url, plate_id);
        let response = self
            .client
            .get(&self.url)
            .query(&[("plate_id", plate_id)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Reads a layout from a JSON file. The plate id is not used.
#[derive(Debug, Clone)]
pub struct FileLayoutSource {
    path: PathBuf,
}

impl FileLayoutSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LayoutSource for FileLayoutSource {
    async fn fetch_layout(&self, _plate_id: u32) -> Result<PlateLayout, FetchError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Source picked at startup from the command line
#[derive(Debug, Clone)]
pub enum AnyLayoutSource {
    Http(HttpLayoutSource),
    File(FileLayoutSource),
}

impl LayoutSource for AnyLayoutSource {
    async fn fetch_layout(&self, plate_id: u32) -> Result<PlateLayout, FetchError> {
        match self {
            AnyLayoutSource::Http(source) => source.fetch_layout(plate_id).await,
            AnyLayoutSource::File(source) => source.fetch_layout(plate_id).await,
        }
    }
}

pub struct LayoutFetch;

impl LayoutFetch {
    /// Fetch once and report the single outcome on `layout_tx`. No retries.
    pub async fn start<S: LayoutSource>(
        source: S,
        plate_id: u32,
        layout_tx: mpsc::UnboundedSender<LayoutMessage>,
    ) {
        info!("Fetching layout for plate {}...", plate_id);

        let message = match source.fetch_layout(plate_id).await {
            Ok(layout) => {
                info!(
                    "Plate {} layout: {}x{} editable={}",
                    plate_id, layout.rows, layout.cols, layout.editable
                );
                LayoutMessage::Loaded(layout)
            }
            Err(e) => {
                error!("Failed to fetch plate {} layout: {}", plate_id, e);
                LayoutMessage::Failed(e.detail())
            }
        };

        let _ = layout_tx.send(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the request head
    async fn serve_once(status: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_url_joining() {
        let source = HttpLayoutSource::new("http://lab:8888/", "/plate_layout");
        assert_eq!(source.url(), "http://lab:8888/plate_layout");
        let source = HttpLayoutSource::new("http://lab:8888", "plate_layout");
        assert_eq!(source.url(), "http://lab:8888/plate_layout");
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"rows": 8, "cols": 12, "editable": true}"#).await;
        let source = HttpLayoutSource::with_client(local_client(), &base_url, "/plate_layout");

        let layout = source.fetch_layout(1).await.unwrap();
        assert_eq!(layout, PlateLayout::new(8, 12, true));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /plate_layout?plate_id=1 "));
    }

    #[tokio::test]
    async fn test_http_error_body_is_verbatim() {
        let body = "<html><title>404: Plate 7 does not exist</title></html>";
        let (base_url, server) = serve_once("404 Not Found", body).await;
        let source = HttpLayoutSource::with_client(local_client(), &base_url, "/plate_layout");

        let err = source.fetch_layout(7).await.unwrap_err();
        assert!(matches!(err, FetchError::Rejected { status: 404, .. }));
        assert_eq!(err.detail(), body);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rows": 2, "cols": 3, "editable": false}}"#).unwrap();

        let layout = FileLayoutSource::new(file.path())
            .fetch_layout(1)
            .await
            .unwrap();
        assert_eq!(layout, PlateLayout::new(2, 3, false));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileLayoutSource::new(dir.path().join("missing.json"))
            .fetch_layout(1)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_fetch_reports_failure_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dir = tempfile::tempdir().unwrap();
        let source = FileLayoutSource::new(dir.path().join("missing.json"));

        LayoutFetch::start(source, 3, tx).await;
        match rx.recv().await {
            Some(LayoutMessage::Failed(detail)) => assert!(detail.contains("missing.json")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
