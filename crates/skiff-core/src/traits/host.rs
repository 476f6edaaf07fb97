//! Host environment traits: login-code acquisition and file picking.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::Result;

/// Yields the one-shot opaque code consumed by the login exchange.
#[async_trait]
pub trait LoginCodeProvider: Send + Sync {
    /// Obtain a fresh login code from the host environment.
    async fn login_code(&self) -> Result<String>;
}

/// Lets the user choose local files for upload.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Obtain a sequence of local file paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`](crate::Error::Cancelled) when the
    /// user declines the picker.
    async fn pick_files(&self) -> Result<Vec<PathBuf>>;
}
