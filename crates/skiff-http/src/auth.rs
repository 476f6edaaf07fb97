//! Token acquisition and login single-flight coordination.
//!
//! At most one login exchange runs at a time. Callers that arrive while a
//! login is in flight subscribe to a completion signal and are all woken
//! with the same outcome when it settles; a failed login rejects every
//! waiter and leaves the coordinator ready for a later retry.

use std::future::Future;
use std::sync::{Mutex, RwLock};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};

use skiff_core::error::AuthError;
use skiff_core::{AccessToken, Result, Session};

/// Settled outcome of a login flight, clonable so it can be broadcast.
type FlightOutcome = std::result::Result<AccessToken, String>;

enum Role {
    Leader(watch::Sender<Option<FlightOutcome>>),
    Waiter(watch::Receiver<Option<FlightOutcome>>),
}

/// What a successful login exchange yields.
pub(crate) struct LoginSuccess {
    pub token: AccessToken,
    pub user: Option<Value>,
}

/// Holds the session cell and the login in-flight slot.
///
/// The session is only ever mutated here, after a successful login.
pub(crate) struct AuthCoordinator {
    session: RwLock<Session>,
    flight: Mutex<Option<watch::Receiver<Option<FlightOutcome>>>>,
}

impl AuthCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            session: RwLock::new(Session::default()),
            flight: Mutex::new(None),
        }
    }

    /// The cached bearer token, if a login has succeeded.
    pub(crate) fn token(&self) -> Option<AccessToken> {
        self.session.read().unwrap().token.clone()
    }

    /// The cached user object from the last login.
    pub(crate) fn user(&self) -> Option<Value> {
        self.session.read().unwrap().user.clone()
    }

    /// Return the cached token, or drive `login` to obtain one.
    ///
    /// If another caller's login is already in flight, `login` is never
    /// polled; this caller waits for the shared outcome instead.
    pub(crate) async fn token_or_login<F>(&self, login: F) -> Result<AccessToken>
    where
        F: Future<Output = Result<LoginSuccess>>,
    {
        if let Some(token) = self.token() {
            return Ok(token);
        }

        // Check-then-set inside one lock span: two callers can never both
        // come out of this block as the leader.
        let role = {
            let mut flight = self.flight.lock().unwrap();
            match flight.as_ref() {
                Some(rx) => Role::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    *flight = Some(rx);
                    Role::Leader(tx)
                }
            }
        };

        let tx = match role {
            Role::Waiter(rx) => {
                debug!("login already in flight, waiting");
                return self.wait(rx).await;
            }
            Role::Leader(tx) => tx,
        };

        debug!("starting login exchange");
        let outcome = match login.await {
            Ok(LoginSuccess { token, user }) => {
                // Store the session before waking waiters, so anyone who
                // re-checks the cache also sees the token.
                {
                    let mut session = self.session.write().unwrap();
                    session.token = Some(token.clone());
                    session.user = user;
                }
                info!("login succeeded");
                Ok(token)
            }
            Err(err) => {
                debug!(error = %err, "login failed");
                Err(err)
            }
        };

        // Clear the slot before broadcasting: the flight is over either
        // way, and a failed login must not strand the next attempt.
        *self.flight.lock().unwrap() = None;
        let broadcast = match &outcome {
            Ok(token) => Ok(token.clone()),
            Err(err) => Err(err.to_string()),
        };
        let _ = tx.send(Some(broadcast));

        outcome
    }

    async fn wait(
        &self,
        mut rx: watch::Receiver<Option<FlightOutcome>>,
    ) -> Result<AccessToken> {
        loop {
            let settled = rx.borrow_and_update().clone();
            if let Some(outcome) = settled {
                return outcome.map_err(|message| AuthError::LoginFailed { message }.into());
            }
            if rx.changed().await.is_err() {
                // Leader dropped without settling.
                return Err(AuthError::LoginFailed {
                    message: "login aborted".to_string(),
                }
                .into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn token(s: &str) -> AccessToken {
        AccessToken::new(s).unwrap()
    }

    #[tokio::test]
    async fn cached_token_short_circuits() {
        let auth = AuthCoordinator::new();
        let calls = AtomicUsize::new(0);

        let first = auth
            .token_or_login(async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(LoginSuccess {
                    token: token("t1"),
                    user: Some(serde_json::json!({"name": "alice"})),
                })
            })
            .await
            .unwrap();
        assert_eq!(first.as_str(), "t1");

        let second = auth
            .token_or_login(async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(LoginSuccess {
                    token: token("t2"),
                    user: None,
                })
            })
            .await
            .unwrap();

        assert_eq!(second.as_str(), "t1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(auth.user().unwrap()["name"], "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_login() {
        let auth = AuthCoordinator::new();
        let calls = AtomicUsize::new(0);

        let slow_login = |result: &'static str| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(LoginSuccess {
                    token: token(result),
                    user: None,
                })
            }
        };

        let (a, b, c) = tokio::join!(
            auth.token_or_login(slow_login("t1")),
            auth.token_or_login(slow_login("t2")),
            auth.token_or_login(slow_login("t3")),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap().as_str(), "t1");
        assert_eq!(b.unwrap().as_str(), "t1");
        assert_eq!(c.unwrap().as_str(), "t1");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_login_rejects_waiters_and_allows_retry() {
        let auth = AuthCoordinator::new();
        let calls = AtomicUsize::new(0);

        let failing_login = async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(Error::from(AuthError::MissingToken))
        };

        let never_polled = async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(LoginSuccess {
                token: token("t2"),
                user: None,
            })
        };

        let (leader, waiter) = tokio::join!(
            auth.token_or_login(failing_login),
            auth.token_or_login(never_polled),
        );

        assert!(matches!(
            leader.unwrap_err(),
            Error::Auth(AuthError::MissingToken)
        ));
        assert!(matches!(
            waiter.unwrap_err(),
            Error::Auth(AuthError::LoginFailed { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(auth.token().is_none());

        // The flight slot was cleared, so a later caller can retry.
        let retry = auth
            .token_or_login(async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(LoginSuccess {
                    token: token("t3"),
                    user: None,
                })
            })
            .await
            .unwrap();
        assert_eq!(retry.as_str(), "t3");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
