//! reqwest-backed transport primitive.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use serde_json::Value;
use tracing::{instrument, trace};

use skiff_core::error::TransportError;
use skiff_core::{Method, RawResponse, Transport};

/// [`Transport`] implementation over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("skiff/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, headers, body))]
    async fn request_once(
        &self,
        url: &str,
        method: Method,
        headers: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self.client.request(reqwest_method(method), url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(triage)?;
        let status = response.status().as_u16();
        // Decode leniently: a non-JSON error page still classifies by status.
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        trace!(status, "exchange complete");

        Ok(RawResponse { status, body })
    }

    #[instrument(skip(self, file_path, headers), fields(file = %file_path.display()))]
    async fn upload_once(
        &self,
        url: &str,
        file_path: &Path,
        headers: &[(String, String)],
        field_name: &str,
    ) -> Result<String, TransportError> {
        let data = tokio::fs::read(file_path)
            .await
            .map_err(|e| TransportError::File {
                message: e.to_string(),
            })?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let part = multipart::Part::bytes(data).file_name(file_name);
        let form = multipart::Form::new().part(field_name.to_string(), part);

        let mut request = self.client.post(url).multipart(form);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(triage)?;
        trace!(status = response.status().as_u16(), "upload complete");
        response.text().await.map_err(triage)
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Sort a reqwest failure into the transport error taxonomy.
fn triage(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}
