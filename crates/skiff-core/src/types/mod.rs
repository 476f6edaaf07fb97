//! Core value types.

mod remote_root;

pub use remote_root::RemoteRoot;
