//! Test utilities for CLI testing
//!
//! Provides an in-process mock of the Manuals API for client and handler tests.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use manuals_core::api::{
    Device, DevicesResponse, Document, DocumentsResponse, ErrorResponse, SearchResponse,
    SearchResult,
};
use manuals_core::{API_KEY_HEADER, API_VERSION};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// API key accepted by the mock server
pub const TEST_API_KEY: &str = "test-key";

/// Body served by the download endpoint for `doc-0001`
pub const DOWNLOAD_BODY: &[u8] = b"%PDF-1.4\nESP32 datasheet\n%%EOF\n";

/// Document without a filename in its metadata or download headers
pub const UNNAMED_DOCUMENT: &str = "unnamed";

/// Document whose download stream fails after the first chunk
pub const INTERRUPTED_DOCUMENT: &str = "interrupted";

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
}

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    devices: Arc<Vec<Device>>,
    documents: Arc<Vec<Document>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("vendor".to_string(), serde_json::json!("Espressif"));

        let devices = vec![
            Device {
                id: "dev-0001".to_string(),
                domain: "hardware".to_string(),
                device_type: "dev-boards".to_string(),
                name: "ESP32 Dev Board".to_string(),
                path: "hardware/dev-boards/esp32".to_string(),
                content: Some("# ESP32\nWi-Fi + BLE SoC".to_string()),
                metadata: Some(metadata),
                indexed_at: "2025-12-01T10:00:00Z".to_string(),
            },
            Device {
                id: "dev-0002".to_string(),
                domain: "hardware".to_string(),
                device_type: "sensors".to_string(),
                name: "BME280 Environmental Sensor".to_string(),
                path: "hardware/sensors/bme280".to_string(),
                content: None,
                metadata: None,
                indexed_at: "2025-12-02T11:30:00Z".to_string(),
            },
        ];

        let documents = vec![
            Document {
                id: "doc-0001".to_string(),
                device_id: "dev-0001".to_string(),
                path: "hardware/dev-boards/esp32/esp32-datasheet.pdf".to_string(),
                filename: "esp32-datasheet.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                size_bytes: DOWNLOAD_BODY.len() as u64,
                checksum: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
                    .to_string(),
                indexed_at: "2025-12-01T10:05:00Z".to_string(),
            },
            Document {
                id: "doc-0002".to_string(),
                device_id: "dev-0002".to_string(),
                path: "hardware/sensors/bme280/bme280.pdf".to_string(),
                filename: "bme280.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                size_bytes: 1_572_864,
                checksum: "60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752"
                    .to_string(),
                indexed_at: "2025-12-02T11:35:00Z".to_string(),
            },
        ];

        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            devices: Arc::new(devices),
            documents: Arc::new(documents),
        }
    }
}

impl MockServerState {
    /// Raw query string of the most recent request, `None` if nothing was received.
    pub fn last_query(&self) -> Option<Option<String>> {
        self.requests.lock().unwrap().last().map(|r| r.query.clone())
    }

    /// API key header of the most recent request.
    pub fn last_api_key(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.api_key.clone())
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Record the request and check its API key.
    fn authorize(&self, uri: &Uri, headers: &HeaderMap) -> Option<Response> {
        let api_key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        self.requests.lock().unwrap().push(RecordedRequest {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            api_key: api_key.clone(),
        });

        if api_key.as_deref() != Some(TEST_API_KEY) {
            return Some(json_error(StatusCode::UNAUTHORIZED, "invalid API key"));
        }
        None
    }
}

/// Query parameters accepted by the list and search endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    q: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    domain: Option<String>,
    #[serde(rename = "type")]
    device_type: Option<String>,
    device_id: Option<String>,
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0,
        }
    }

    /// Start the mock server and return its base URL
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        for _ in 0..20 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Ok((self, server_url))
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    fn create_router(&self) -> Router {
        let base = format!("/api/{}", API_VERSION);

        Router::new()
            .route(&format!("{}/search", base), get(search_handler))
            .route(&format!("{}/devices", base), get(list_devices_handler))
            .route(&format!("{}/devices/:id", base), get(get_device_handler))
            .route(&format!("{}/documents", base), get(list_documents_handler))
            .route(&format!("{}/documents/:id", base), get(get_document_handler))
            .route(
                &format!("{}/documents/:id/download", base),
                get(download_handler),
            )
            .with_state(self.state.clone())
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    (status, Json(body)).into_response()
}

fn page<T: Clone>(items: Vec<T>, params: &ListQuery) -> (Vec<T>, u64, u64, u64) {
    let total = items.len() as u64;
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(50);
    let data = items.into_iter().skip(offset).take(limit).collect();
    (data, total, limit as u64, offset as u64)
}

// Handler functions

async fn search_handler(
    State(state): State<MockServerState>,
    Query(params): Query<ListQuery>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = state.authorize(&uri, &headers) {
        return rejection;
    }
    let Some(query) = params.q else {
        return json_error(StatusCode::BAD_REQUEST, "missing query");
    };

    let response = SearchResponse {
        results: vec![SearchResult {
            device_id: "abc123ef4567890a".to_string(),
            name: "ESP32 Dev Board".to_string(),
            domain: "hardware".to_string(),
            device_type: "dev-boards".to_string(),
            path: "hardware/dev-boards/esp32".to_string(),
            score: 0.92,
            snippet: "The ESP32 is a dual-core SoC with integrated Wi-Fi and Bluetooth."
                .to_string(),
        }],
        total: 1,
        query,
    };
    Json(response).into_response()
}

async fn list_devices_handler(
    State(state): State<MockServerState>,
    Query(params): Query<ListQuery>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = state.authorize(&uri, &headers) {
        return rejection;
    }

    let matching: Vec<Device> = state
        .devices
        .iter()
        .filter(|d| params.domain.as_ref().map_or(true, |v| &d.domain == v))
        .filter(|d| params.device_type.as_ref().map_or(true, |v| &d.device_type == v))
        .cloned()
        .collect();

    let (data, total, limit, offset) = page(matching, &params);
    Json(DevicesResponse {
        data,
        total,
        limit,
        offset,
    })
    .into_response()
}

async fn get_device_handler(
    State(state): State<MockServerState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = state.authorize(&uri, &headers) {
        return rejection;
    }
    if id == "garbled" {
        return (StatusCode::OK, "not json").into_response();
    }

    match state.devices.iter().find(|d| d.id == id) {
        Some(device) => Json(device.clone()).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn list_documents_handler(
    State(state): State<MockServerState>,
    Query(params): Query<ListQuery>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = state.authorize(&uri, &headers) {
        return rejection;
    }

    let matching: Vec<Document> = state
        .documents
        .iter()
        .filter(|d| params.device_id.as_ref().map_or(true, |v| &d.device_id == v))
        .cloned()
        .collect();

    let (data, total, limit, offset) = page(matching, &params);
    Json(DocumentsResponse {
        data,
        total,
        limit,
        offset,
    })
    .into_response()
}

async fn get_document_handler(
    State(state): State<MockServerState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = state.authorize(&uri, &headers) {
        return rejection;
    }
    if id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response();
    }
    if id == UNNAMED_DOCUMENT || id == INTERRUPTED_DOCUMENT {
        let filename = if id == INTERRUPTED_DOCUMENT {
            "interrupted.pdf"
        } else {
            ""
        };
        return Json(Document {
            id,
            filename: filename.to_string(),
            mime_type: "application/pdf".to_string(),
            ..Document::default()
        })
        .into_response();
    }

    match state.documents.iter().find(|d| d.id == id) {
        Some(doc) => Json(doc.clone()).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn download_handler(
    State(state): State<MockServerState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = state.authorize(&uri, &headers) {
        return rejection;
    }

    if id == UNNAMED_DOCUMENT {
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/pdf")
            .body(Body::from(DOWNLOAD_BODY))
            .unwrap();
    }
    if id == INTERRUPTED_DOCUMENT {
        let chunks: Vec<std::io::Result<Vec<u8>>> = vec![
            Ok(b"%PDF-1.4\n".to_vec()),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "stream interrupted",
            )),
        ];
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/pdf")
            .header(
                header::CONTENT_DISPOSITION,
                r#"attachment; filename="interrupted.pdf""#,
            )
            .body(Body::from_stream(futures::stream::iter(chunks)))
            .unwrap();
    }

    let disposition = match id.as_str() {
        "doc-0001" => r#"attachment; filename="esp32-datasheet.pdf""#,
        // Unterminated quote
        "doc-0002" => r#"attachment; filename="bme280.pdf"#,
        _ => return json_error(StatusCode::NOT_FOUND, "not found"),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(DOWNLOAD_BODY))
        .unwrap()
}
