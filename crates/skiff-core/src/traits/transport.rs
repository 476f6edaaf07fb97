//! Transport primitive trait.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::Method;

/// The raw outcome of one network exchange: a status code and the
/// JSON-decoded body. Classification into success or failure happens
/// upstream, in the request executor.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// The host-provided primitive that performs actual network I/O.
///
/// A [`TransportError`] here means the call failed before yielding a
/// status; a non-2xx status is NOT a transport error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange.
    async fn request_once(
        &self,
        url: &str,
        method: Method,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError>;

    /// Upload one local file as a multipart form field, returning the raw
    /// response text.
    async fn upload_once(
        &self,
        url: &str,
        file_path: &Path,
        headers: &[(String, String)],
        field_name: &str,
    ) -> Result<String, TransportError>;
}
