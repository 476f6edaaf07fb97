//! Traits for the host-provided collaborators.

mod host;
mod presenter;
mod transport;

pub use host::{FilePicker, LoginCodeProvider};
pub use presenter::{Notice, NoticePresenter};
pub use transport::{RawResponse, Transport};
