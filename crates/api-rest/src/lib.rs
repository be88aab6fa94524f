//! # API REST
//!
//! Minimal HTTP viewer for converted agent exports.
//!
//! Handles:
//! - `GET /` greeting page
//! - `GET /agent` rendering either the configured archive or, when an `apiai_token` query
//!   parameter is given, the agent fetched live from the remote API
//! - markdown to HTML conversion and the page template
//!
//! Uses `apiai2text-core` for conversion and `apiai2text-remote` for live fetching. The archive
//! path is fixed when the server is constructed; nothing is read from the environment while
//! handling requests.

#![warn(rust_2018_idioms)]

use anyhow::Context;
use apiai2text_core::{convert_archive_path, convert_documents, ConvertError, ConvertOptions};
use apiai2text_remote::{FetchError, RemoteConfig, RemoteFetcher};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Port used when `PORT` is unset or blank.
pub const DEFAULT_PORT: u16 = 5000;

/// Viewer configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    archive_path: PathBuf,
    addr: SocketAddr,
    remote: RemoteConfig,
    options: ConvertOptions,
}

impl ViewerConfig {
    /// Create a new `ViewerConfig` serving `archive_path` on `127.0.0.1:<port>`.
    pub fn new(archive_path: PathBuf, port: u16) -> Self {
        Self {
            archive_path,
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            remote: RemoteConfig::default(),
            options: ConvertOptions::default(),
        }
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn options(&self) -> ConvertOptions {
        self.options
    }
}

/// Parse the listen port from an optional `PORT` value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PORT`].
///
/// # Errors
///
/// Returns an error if the value is not a valid port number.
pub fn port_from_env_value(value: Option<String>) -> anyhow::Result<u16> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {v}"))
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_PORT))
}

/// Application state shared across request handlers
#[derive(Clone)]
struct AppState {
    cfg: Arc<ViewerConfig>,
    fetcher: RemoteFetcher,
}

/// Query parameters accepted by `/agent`.
#[derive(Debug, Deserialize)]
struct AgentQuery {
    apiai_token: Option<String>,
}

/// Builds the viewer router with a fetcher created from the configured remote settings.
///
/// # Errors
///
/// Returns an error if the HTTP client for remote fetching cannot be built.
pub fn router(cfg: ViewerConfig) -> anyhow::Result<Router> {
    let fetcher = RemoteFetcher::new(cfg.remote.clone())?;
    Ok(router_with_fetcher(cfg, fetcher))
}

/// Builds the viewer router around an existing fetcher.
pub fn router_with_fetcher(cfg: ViewerConfig, fetcher: RemoteFetcher) -> Router {
    let state = AppState {
        cfg: Arc::new(cfg),
        fetcher,
    };

    Router::new()
        .route("/", get(index))
        .route("/agent", get(view_agent))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves the viewer until the process stops.
///
/// # Errors
///
/// Returns an error if:
/// - the remote client cannot be built,
/// - the address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(cfg: ViewerConfig) -> anyhow::Result<()> {
    let addr = cfg.addr();
    tracing::info!(
        "-- Starting apiai2text viewer on http://{} for {}",
        addr,
        cfg.archive_path().display()
    );

    let app = router(cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Greeting page
async fn index() -> Html<String> {
    Html(page("apiai2text", "<p>Hello World!</p>\n"))
}

/// Renders the agent as HTML.
///
/// With a non-empty `apiai_token` the intents are fetched live (the token is forwarded as a
/// bearer credential); otherwise the archive configured at startup is converted.
///
/// # Errors
///
/// Returns an error page with:
/// - `502 Bad Gateway` if fetching from the remote API fails,
/// - `500 Internal Server Error` if the archive or an intent document cannot be converted.
async fn view_agent(
    State(state): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let token = query.apiai_token.filter(|t| !t.trim().is_empty());

    let markdown = match token {
        Some(token) => {
            let documents = state.fetcher.fetch_all(&token).await.map_err(|e| {
                tracing::error!("Remote fetch error: {:?}", e);
                fetch_error_page(&e)
            })?;
            convert_documents(documents, state.cfg.options()).map_err(|e| {
                tracing::error!("Remote conversion error: {:?}", e);
                convert_error_page(&e)
            })?
        }
        None => {
            let cfg = state.cfg.clone();
            tokio::task::spawn_blocking(move || {
                convert_archive_path(cfg.archive_path(), cfg.options())
            })
            .await
            .map_err(|e| {
                tracing::error!("Conversion task failed: {:?}", e);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "conversion task failed")
            })?
            .map_err(|e| {
                tracing::error!("Archive conversion error: {:?}", e);
                convert_error_page(&e)
            })?
        }
    };

    Ok(Html(page("Agent", &markdown_to_html(&markdown))))
}

/// Converts rendered markdown (inline `<img>` tags included) to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut output = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut output, parser);
    output
}

fn fetch_error_page(err: &FetchError) -> (StatusCode, Html<String>) {
    error_page(StatusCode::BAD_GATEWAY, &err.to_string())
}

fn convert_error_page(err: &ConvertError) -> (StatusCode, Html<String>) {
    error_page(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

fn error_page(status: StatusCode, message: &str) -> (StatusCode, Html<String>) {
    // A fenced block makes the markdown renderer escape the message.
    let body = markdown_to_html(&format!("# Error\n\n```text\n{message}\n```\n"));
    (status, Html(page("Error", &body)))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         {body}\
         </body>\n\
         </html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::io::{Cursor, Write};
    use std::time::Duration;
    use tower::ServiceExt;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const GREETING: &str = r#"{
        "id": "g-1",
        "name": "greeting",
        "userSays": [{ "data": [{ "text": "hello" }] }],
        "responses": [{
            "messages": [
                { "type": 0, "speech": "Hi <there>" },
                { "type": 3, "imageUrl": "https://example.com/wave.gif" }
            ]
        }]
    }"#;

    fn write_archive(dir: &Path) -> PathBuf {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("intents/greeting.json", FileOptions::default())
            .expect("start file");
        writer.write_all(GREETING.as_bytes()).expect("write file");
        let bytes = writer.finish().expect("finish zip").into_inner();

        let path = dir.join("agent.zip");
        std::fs::write(&path, bytes).expect("write archive");
        path
    }

    fn test_router(archive_path: PathBuf) -> Router {
        let remote = RemoteConfig::default()
            .with_base_url("http://127.0.0.1:9/v1")
            .with_min_interval(Duration::from_millis(1));
        let cfg = ViewerConfig::new(archive_path, DEFAULT_PORT).with_remote(remote.clone());
        let client = reqwest_client();
        router_with_fetcher(cfg, RemoteFetcher::with_client(client, remote))
    }

    fn reqwest_client() -> apiai2text_remote::reqwest::Client {
        apiai2text_remote::reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(2))
            .build()
            .expect("build client")
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
    }

    #[tokio::test]
    async fn index_greets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, body) = get_page(test_router(dir.path().join("unused.zip")), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello World!"));
    }

    #[tokio::test]
    async fn agent_renders_configured_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = write_archive(dir.path());

        let (status, body) = get_page(test_router(archive), "/agent").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Intent: intents/greeting.json</h1>"));
        assert!(body.contains("<li>hello</li>"));
        assert!(body.contains("<img src=\"https://example.com/wave.gif\" width=\"200\"/>"));
    }

    #[tokio::test]
    async fn empty_token_falls_back_to_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = write_archive(dir.path());

        let (status, body) = get_page(test_router(archive), "/agent?apiai_token=").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Intent: intents/greeting.json"));
    }

    #[tokio::test]
    async fn missing_archive_is_error_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, body) = get_page(test_router(dir.path().join("missing.zip")), "/agent").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("failed to open archive file"));
    }

    #[tokio::test]
    async fn unreachable_remote_is_bad_gateway() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, body) = get_page(
            test_router(dir.path().join("unused.zip")),
            "/agent?apiai_token=abc",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("fetch failed"));
    }

    #[test]
    fn markdown_conversion_keeps_inline_images() {
        let html = markdown_to_html("## Agent Responses\n\n1. Hi\n<img src=\"x\" width=\"200\"/>\n");
        assert!(html.contains("<h2>Agent Responses</h2>"));
        assert!(html.contains("<img src=\"x\" width=\"200\"/>"));
    }

    #[test]
    fn error_messages_are_escaped() {
        let (status, Html(body)) = error_page(StatusCode::BAD_GATEWAY, "bad <script> body");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("bad &lt;script&gt; body"));
    }

    #[test]
    fn port_defaults_and_parses() {
        assert_eq!(port_from_env_value(None).expect("default"), DEFAULT_PORT);
        assert_eq!(
            port_from_env_value(Some("  ".into())).expect("blank"),
            DEFAULT_PORT
        );
        assert_eq!(port_from_env_value(Some("8080".into())).expect("port"), 8080);
        assert!(port_from_env_value(Some("eighty".into())).is_err());
    }

    #[test]
    fn config_binds_localhost() {
        let cfg = ViewerConfig::new(PathBuf::from("agent.zip"), 8080);
        assert_eq!(cfg.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.archive_path(), Path::new("agent.zip"));
    }
}
