//! skiff-http - Authenticated request pipeline for the skiff client layer.
//!
//! The entry point is [`Client`]: it builds outgoing requests, acquires
//! and caches the bearer token (deduplicating concurrent logins),
//! brackets dispatch with a shared debounced loading indicator, and
//! orchestrates sequential multi-file uploads.

mod auth;
mod cache;
mod client;
mod loading;
mod transport;
mod upload;

pub use client::{Client, ClientBuilder, TracingPresenter};
pub use loading::{LoadingCoordinator, LoadingGuard};
pub use transport::ReqwestTransport;
pub use upload::safe_parse_json;

pub use skiff_core::error;
pub use skiff_core::{
    AccessToken, Error, ErrorPolicy, FilePicker, LoginCodeProvider, Method, Notice,
    NoticePresenter, RawResponse, RemoteRoot, Request, Result, Session, Transport,
};
