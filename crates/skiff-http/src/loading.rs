//! Shared loading indicator with debounce.
//!
//! Concurrent requests share one indicator: the first push arms it, the
//! last pop tears it down. A short debounce delay keeps fast requests
//! from flashing the indicator.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

use skiff_core::NoticePresenter;

/// Title shown on the shared loading indicator.
const LOADING_TITLE: &str = "Loading";

/// Debounce before a non-instant push shows the indicator.
const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Reference-counts concurrent loading requests over a shared presenter.
#[derive(Clone)]
pub struct LoadingCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    presenter: Arc<dyn NoticePresenter>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    count: u32,
    timer: Option<JoinHandle<()>>,
}

impl LoadingCoordinator {
    pub fn new(presenter: Arc<dyn NoticePresenter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                presenter,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Increment the counter. On the 0→1 transition, show the indicator
    /// immediately (`instant`) or arm the debounce timer.
    ///
    /// The timer re-checks the counter before showing, so a request that
    /// completes inside the debounce window never flashes the indicator.
    pub fn push(&self, instant: bool) {
        let mut state = self.inner.state.lock().unwrap();
        state.count += 1;
        trace!(count = state.count, instant, "loading push");
        if state.count != 1 {
            return;
        }

        if instant {
            self.inner.presenter.show_busy(LOADING_TITLE);
        } else {
            let inner = Arc::clone(&self.inner);
            state.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(DEBOUNCE_DELAY).await;
                let state = inner.state.lock().unwrap();
                if state.count > 0 {
                    inner.presenter.show_busy(LOADING_TITLE);
                }
            }));
        }
    }

    /// Decrement the counter. On reaching 0, cancel any pending timer and
    /// hide the indicator.
    ///
    /// A pop without a matching prior push is a caller bug; the counter
    /// saturates rather than going negative.
    pub fn pop(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.count = state.count.saturating_sub(1);
        trace!(count = state.count, "loading pop");
        if state.count == 0 {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            self.inner.presenter.hide_busy();
        }
    }

    /// Push, returning a guard whose drop pops. This is how callers get a
    /// balanced push/pop pair on every exit path.
    pub fn guard(&self, instant: bool) -> LoadingGuard {
        self.push(instant);
        LoadingGuard {
            coordinator: self.clone(),
        }
    }

    /// Number of requests currently counted as loading.
    pub fn depth(&self) -> u32 {
        self.inner.state.lock().unwrap().count
    }
}

/// Pops the loading counter when dropped.
pub struct LoadingGuard {
    coordinator: LoadingCoordinator,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.coordinator.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingPresenter {
        shows: AtomicUsize,
        hides: AtomicUsize,
    }

    impl NoticePresenter for RecordingPresenter {
        fn show_notice(&self, _notice: &skiff_core::Notice) {}

        fn show_busy(&self, _title: &str) {
            self.shows.fetch_add(1, Ordering::SeqCst);
        }

        fn hide_busy(&self) {
            self.hides.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn coordinator() -> (LoadingCoordinator, Arc<RecordingPresenter>) {
        let presenter = Arc::new(RecordingPresenter::default());
        let loading = LoadingCoordinator::new(presenter.clone());
        (loading, presenter)
    }

    #[tokio::test(start_paused = true)]
    async fn instant_push_shows_without_delay() {
        let (loading, presenter) = coordinator();

        loading.push(true);
        assert_eq!(presenter.shows.load(Ordering::SeqCst), 1);

        loading.pop();
        assert_eq!(presenter.hides.load(Ordering::SeqCst), 1);
        assert_eq!(loading.depth(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_push_shows_after_delay() {
        let (loading, presenter) = coordinator();

        loading.push(false);
        tokio::task::yield_now().await;
        assert_eq!(presenter.shows.load(Ordering::SeqCst), 0);

        tokio::time::advance(DEBOUNCE_DELAY).await;
        tokio::task::yield_now().await;
        assert_eq!(presenter.shows.load(Ordering::SeqCst), 1);

        loading.pop();
        assert_eq!(presenter.hides.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_pop_never_shows() {
        let (loading, presenter) = coordinator();

        loading.push(false);
        tokio::task::yield_now().await;
        loading.pop();

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(presenter.shows.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn balanced_interleaving_ends_hidden_at_zero() {
        let (loading, presenter) = coordinator();

        loading.push(true);
        loading.push(false);
        loading.pop();
        loading.push(false);
        loading.pop();
        loading.pop();

        assert_eq!(loading.depth(), 0);
        assert_eq!(presenter.hides.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn only_first_push_arms_the_indicator() {
        let (loading, presenter) = coordinator();

        loading.push(true);
        loading.push(true);
        loading.push(true);
        assert_eq!(presenter.shows.load(Ordering::SeqCst), 1);

        loading.pop();
        loading.pop();
        assert_eq!(presenter.hides.load(Ordering::SeqCst), 0);
        loading.pop();
        assert_eq!(presenter.hides.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn guard_pops_on_drop() {
        let (loading, presenter) = coordinator();

        {
            let _guard = loading.guard(true);
            assert_eq!(loading.depth(), 1);
        }
        assert_eq!(loading.depth(), 0);
        assert_eq!(presenter.hides.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn guard_pops_on_early_return() {
        let (loading, _presenter) = coordinator();

        fn fails(loading: &LoadingCoordinator) -> Result<(), ()> {
            let _guard = loading.guard(false);
            Err(())
        }

        assert!(fails(&loading).is_err());
        assert_eq!(loading.depth(), 0);
    }
}
