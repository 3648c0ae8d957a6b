//! HTTP client for communicating with the Manuals API.

use manuals_core::{api, ManualsError, Result, API_KEY_HEADER, API_VERSION};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::disposition;

/// Timeout applied to every request issued by [`ManualsClient`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Normalize a base URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Build pagination and filter query parameters.
///
/// Zero and empty values are left out entirely rather than sent as `0` or `""`.
/// Parameters keep the order `limit`, `offset`, then the filters as given.
pub fn list_query<'a>(
    limit: u32,
    offset: u32,
    filters: &[(&'a str, &str)],
) -> Vec<(&'a str, String)> {
    let mut params = Vec::new();
    if limit > 0 {
        params.push(("limit", limit.to_string()));
    }
    if offset > 0 {
        params.push(("offset", offset.to_string()));
    }
    for (name, value) in filters {
        if !value.is_empty() {
            params.push((*name, value.to_string()));
        }
    }
    params
}

/// Turn a non-2xx body into a message: the `error` field when the body is
/// `{"error": "..."}`, the raw body text otherwise.
pub fn decode_error_message(body: &str) -> String {
    match serde_json::from_str::<api::ErrorResponse>(body) {
        Ok(err) => err.error,
        Err(_) => body.to_string(),
    }
}

fn require_id(id: &str, what: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ManualsError::validation(format!("{} ID cannot be empty", what)));
    }
    Ok(())
}

/// HTTP client for the Manuals REST API.
///
/// Every call is a single authenticated `GET` against
/// `<base_url>/api/<version>/<resource>`. There is no retry: a failed attempt
/// is returned to the caller as is.
///
/// # Errors
///
/// All operations return [`ManualsError::Request`] on transport failure,
/// [`ManualsError::Api`] on a non-2xx status and [`ManualsError::Decode`] when
/// the body does not match the expected shape.
///
/// # Examples
///
/// ```no_run
/// use manuals_cli::client::ManualsClient;
///
/// # async fn example() -> manuals_core::Result<()> {
/// let client = ManualsClient::new("http://localhost:8080", "my-api-key")?;
///
/// let results = client.search("esp32 gpio", 5).await?;
/// for hit in &results.results {
///     println!("{} ({:.2})", hit.name, hit.score);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ManualsClient {
    client: Client,
    base_url: String,
}

impl ManualsClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the API key cannot be sent as a header
    /// value, and a request error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key).map_err(|_| {
            ManualsError::validation("API key contains characters not allowed in a header")
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("manuals/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(ManualsError::request)?;

        Ok(Self {
            client,
            base_url: normalize_url(base_url),
        })
    }

    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, API_VERSION, resource)
    }

    /// Issue the `GET` and turn non-2xx statuses into [`ManualsError::Api`].
    async fn send(&self, resource: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.endpoint(resource);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(ManualsError::request)?;
        let status = response.status();
        debug!("GET {} -> {}", resource, status);

        if !status.is_success() {
            // Buffer the whole body, the connection is released when `response` drops.
            let body = response.text().await.map_err(ManualsError::request)?;
            let message = decode_error_message(&body);
            debug!("API error from {}: {}", resource, message);
            return Err(ManualsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(resource, query).await?;
        let body = response.bytes().await.map_err(ManualsError::request)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Search devices and documentation.
    ///
    /// A `limit` of 0 leaves the limit to the server default.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the query is empty or whitespace.
    pub async fn search(&self, query: &str, limit: u32) -> Result<api::SearchResponse> {
        if query.trim().is_empty() {
            return Err(ManualsError::validation("search query cannot be empty"));
        }

        let mut params = vec![("q", query.to_string())];
        params.extend(list_query(limit, 0, &[]));

        self.get_json("search", &params).await
    }

    /// List devices, optionally filtered by domain and type.
    pub async fn list_devices(
        &self,
        limit: u32,
        offset: u32,
        domain: &str,
        device_type: &str,
    ) -> Result<api::DevicesResponse> {
        let params = list_query(limit, offset, &[("domain", domain), ("type", device_type)]);

        self.get_json("devices", &params).await
    }

    /// Retrieve a single device.
    ///
    /// The ID is opaque and forwarded verbatim into the URL path.
    pub async fn get_device(&self, id: &str) -> Result<api::Device> {
        require_id(id, "device")?;

        self.get_json(&format!("devices/{}", id), &[]).await
    }

    /// List documents, optionally restricted to one device.
    pub async fn list_documents(
        &self,
        limit: u32,
        offset: u32,
        device_id: &str,
    ) -> Result<api::DocumentsResponse> {
        let params = list_query(limit, offset, &[("device_id", device_id)]);

        self.get_json("documents", &params).await
    }

    /// Retrieve metadata for a single document.
    pub async fn get_document(&self, id: &str) -> Result<api::Document> {
        require_id(id, "document")?;

        self.get_json(&format!("documents/{}", id), &[]).await
    }

    /// Open the binary content of a document.
    ///
    /// The body is not buffered: the returned [`DocumentDownload`] owns the
    /// open response and streams it on [`DocumentDownload::copy_to`].
    pub async fn download_document(&self, id: &str) -> Result<DocumentDownload> {
        require_id(id, "document")?;

        let response = self
            .send(&format!("documents/{}/download", id), &[])
            .await?;

        let suggested_filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition::suggested_filename);

        Ok(DocumentDownload {
            response,
            suggested_filename,
        })
    }
}

/// An open document download.
///
/// Dropping it without calling [`copy_to`](Self::copy_to) closes the
/// underlying connection.
#[derive(Debug)]
pub struct DocumentDownload {
    response: Response,
    suggested_filename: Option<String>,
}

impl DocumentDownload {
    /// Filename suggested by the server's `Content-Disposition` header, if it parsed.
    pub fn suggested_filename(&self) -> Option<&str> {
        self.suggested_filename.as_deref()
    }

    /// Body length announced by the server, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Stream the body into `writer`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns a request error if the body cannot be read and a filesystem
    /// error if the writer fails.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;

        while let Some(chunk) = self.response.chunk().await.map_err(ManualsError::request)? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        debug!("Downloaded {} bytes", written);
        Ok(written)
    }
}
