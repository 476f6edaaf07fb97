//! Sequential multi-file upload.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, instrument};

use skiff_core::Result;

use crate::client::Client;

/// Title on the batch upload indicator.
const UPLOADING_TITLE: &str = "Uploading";

/// Multipart field name for the uploaded file.
const UPLOAD_FIELD: &str = "file";

impl Client {
    /// Let the user pick files, then upload them one at a time.
    ///
    /// One long-lived busy overlay covers the whole batch; it is a
    /// dedicated indicator, not the reference-counted request spinner.
    /// Responses come back in input order. The first failure aborts the
    /// remaining uploads and hides the overlay.
    #[instrument(skip(self))]
    pub async fn upload_image(&self, endpoint: &str) -> Result<Vec<Value>> {
        let paths = self.inner.picker.pick_files().await?;
        debug!(count = paths.len(), "files chosen");

        self.inner.presenter.show_busy(UPLOADING_TITLE);
        let mut responses = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.upload_file(endpoint, path).await {
                Ok(response) => responses.push(response),
                Err(err) => {
                    self.inner.presenter.hide_busy();
                    return Err(err);
                }
            }
        }
        self.inner.presenter.hide_busy();

        info!(count = responses.len(), "batch upload complete");
        Ok(responses)
    }

    /// Upload one file to `endpoint`, parsing the JSON response text.
    #[instrument(skip(self, path), fields(file = %path.display()))]
    pub async fn upload_file(&self, endpoint: &str, path: &Path) -> Result<Value> {
        let url = self.upload_url(endpoint);
        let token = self.get_token().await?;
        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", token.as_str()),
        )];

        let text = self
            .inner
            .transport
            .upload_once(&url, path, &headers, UPLOAD_FIELD)
            .await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Parse JSON leniently, yielding `None` instead of an error.
pub fn safe_parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_parse_json_accepts_valid_json() {
        assert_eq!(safe_parse_json(r#"{"ok":true}"#), Some(json!({"ok": true})));
    }

    #[test]
    fn safe_parse_json_swallows_garbage() {
        assert_eq!(safe_parse_json("<html>nope</html>"), None);
        assert_eq!(safe_parse_json(""), None);
    }
}
