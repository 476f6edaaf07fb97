//! skiff-core - Core types and traits for the skiff API client layer.

pub mod error;
pub mod request;
pub mod session;
pub mod traits;
pub mod types;

pub use error::Error;
pub use request::{ErrorPolicy, Method, Request};
pub use session::{AccessToken, Session};
pub use traits::{FilePicker, LoginCodeProvider, Notice, NoticePresenter, RawResponse, Transport};
pub use types::RemoteRoot;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
