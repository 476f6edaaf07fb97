//! Notice presenter trait.

/// A user-facing notice, presented modally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub content: String,
    /// Offer only a dismiss action, no cancel.
    pub dismiss_only: bool,
}

/// The host-provided presentation layer for notices and busy indicators.
///
/// Methods are synchronous: the host fires the presentation and returns,
/// it never waits for user interaction here.
pub trait NoticePresenter: Send + Sync {
    /// Present a modal notice.
    fn show_notice(&self, notice: &Notice);

    /// Show the shared busy indicator with the given title.
    ///
    /// A second `show_busy` replaces the current indicator.
    fn show_busy(&self, title: &str);

    /// Hide the busy indicator. Must tolerate being called when nothing
    /// is shown.
    fn hide_busy(&self);
}
