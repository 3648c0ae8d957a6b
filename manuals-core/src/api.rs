//! API models for the Manuals REST API
//!
//! Response bodies as served under `/api/<version>/`. Missing fields decode to
//! their zero value, so older or newer servers that omit a field still parse.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// Identifier of the matching device
    pub device_id: String,
    pub name: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub path: String,
    /// Relevance score, higher is more relevant
    pub score: f64,
    /// Text excerpt around the match
    pub snippet: String,
}

/// Response from the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Total number of matches, may exceed `results.len()`
    pub total: u64,
    /// The query as echoed by the server
    pub query: String,
}

/// A hardware or software entity with associated documentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub id: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// Server-formatted indexing timestamp
    pub indexed_at: String,
}

/// A page of devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesResponse {
    pub data: Vec<Device>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// A downloadable file attached to a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub id: String,
    pub device_id: String,
    pub path: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Hex-encoded checksum
    pub checksum: String,
    pub indexed_at: String,
}

/// A page of documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsResponse {
    pub data: Vec<Document>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Pagination metadata shared by list responses.
pub trait Page {
    /// Number of items in this page.
    fn len(&self) -> usize;

    /// Total number of items reported by the server.
    fn total(&self) -> u64;

    /// Offset of this page.
    fn offset(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the page after this one, `None` when this page reaches the total.
    fn next_offset(&self) -> Option<u64> {
        if self.total() > self.len() as u64 {
            Some(self.offset() + self.len() as u64)
        } else {
            None
        }
    }
}

impl Page for DevicesResponse {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}

impl Page for DocumentsResponse {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}
