//! The authenticated request pipeline.

use std::fmt;
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, trace};

use skiff_core::error::{AuthError, HttpError, InvalidInputError, NETWORK_FAILED_MESSAGE};
use skiff_core::{
    AccessToken, Error, ErrorPolicy, FilePicker, LoginCodeProvider, Notice, NoticePresenter,
    RemoteRoot, Request, Result, Transport,
};

use crate::auth::{AuthCoordinator, LoginSuccess};
use crate::cache::QueryCache;
use crate::loading::LoadingCoordinator;
use crate::transport::ReqwestTransport;

/// Title on the error dialog.
const ERROR_TITLE: &str = "Error";

/// Path of the login exchange.
const LOGIN_PATH: &str = "/login";

/// Paths that are exchanged without a bearer token.
const NO_TOKEN_PATHS: &[&str] = &[LOGIN_PATH];

/// The authenticated API client.
///
/// Cheap to clone; all clones share the session, the loading counter,
/// and the login in-flight slot.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) root: RemoteRoot,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) presenter: Arc<dyn NoticePresenter>,
    pub(crate) code_provider: Arc<dyn LoginCodeProvider>,
    pub(crate) picker: Arc<dyn FilePicker>,
    pub(crate) loading: LoadingCoordinator,
    pub(crate) auth: AuthCoordinator,
    pub(crate) cache: QueryCache,
}

impl Client {
    /// Start building a client for the given remote root.
    pub fn builder(root: RemoteRoot) -> ClientBuilder {
        ClientBuilder {
            root,
            transport: None,
            presenter: None,
            code_provider: None,
            picker: None,
        }
    }

    /// Execute one request through the full pipeline.
    ///
    /// Returns `Ok(Some(body))` on success. `Ok(None)` occurs only under
    /// [`ErrorPolicy::ReportAndSwallow`], after the failure was presented.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: Request) -> Result<Option<Value>> {
        let policy = request.error_policy;
        match self.run(&request).await {
            Ok(body) => Ok(Some(body)),
            Err(err) => self.settle(err, policy),
        }
    }

    /// Execute a request and deserialize the response body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let body = self.execute(request).await?.unwrap_or(Value::Null);
        Ok(serde_json::from_value(body)?)
    }

    /// GET a path with default settings.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute_json(Request::get(path)).await
    }

    /// POST a JSON body to a path with default settings.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.execute_json(Request::post(path).body(body)).await
    }

    /// PUT a JSON body to a path with default settings.
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.execute_json(Request::put(path).body(body)).await
    }

    /// DELETE a path with default settings.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute_json(Request::delete(path)).await
    }

    /// The cached bearer token, triggering a login when absent.
    ///
    /// Concurrent callers during an in-flight login all resolve to the
    /// same token; no second exchange is started.
    pub async fn get_token(&self) -> Result<AccessToken> {
        self.inner.auth.token_or_login(self.perform_login()).await
    }

    /// The opaque user object from the last successful login.
    pub fn get_user_info(&self) -> Option<Value> {
        self.inner.auth.user()
    }

    /// The fully-qualified URL for an upload endpoint.
    pub fn upload_url(&self, endpoint: &str) -> String {
        self.inner.root.join(endpoint)
    }

    /// The core pipeline: token, URL, spinner bracket, dispatch, classify.
    async fn run(&self, request: &Request) -> Result<Value> {
        let mut headers: Vec<(String, String)> = Vec::new();
        if !is_no_token_path(&request.path) {
            // A token failure propagates before the transport or the
            // loading indicator is ever touched.
            let token = self.get_token().await?;
            headers.push((
                "Authorization".to_string(),
                format!("bearer {}", token.as_str()),
            ));
        }

        let url = self.inner.root.join(&with_query(&request.path, &request.query));
        debug!(%url, "dispatching");

        let response = {
            let _spinner = request
                .spinner
                .then(|| self.inner.loading.guard(request.instant_spinner));
            self.inner
                .transport
                .request_once(&url, request.method, &headers, request.body.as_ref())
                .await
        }?;

        trace!(status = response.status, "response received");
        if (200..300).contains(&response.status) {
            return Ok(response.body);
        }

        let message = response
            .body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Err(HttpError::new(response.status, message).into())
    }

    /// The login exchange: obtain a one-shot code from the host, swap it
    /// at the unauthenticated login endpoint, require a token back.
    ///
    /// Runs silently; presentation of a login failure belongs to the call
    /// that needed the token. Boxed because it re-enters `execute`.
    fn perform_login(&self) -> Pin<Box<dyn Future<Output = Result<LoginSuccess>> + Send + '_>> {
        Box::pin(async move {
            let code = self.inner.code_provider.login_code().await?;
            debug!("exchanging login code");

            let body = self
                .execute(
                    Request::post(LOGIN_PATH)
                        .body(json!({ "code": code }))
                        .error_policy(ErrorPolicy::Silent),
                )
                .await?
                .unwrap_or(Value::Null);

            let token = body
                .get("token")
                .and_then(Value::as_str)
                .and_then(AccessToken::new)
                .ok_or(AuthError::MissingToken)?;
            let user = body.get("user").cloned();
            info!("login exchange complete");
            Ok(LoginSuccess { token, user })
        })
    }

    /// Apply the error policy to a classified failure.
    fn settle(&self, err: Error, policy: ErrorPolicy) -> Result<Option<Value>> {
        match policy {
            ErrorPolicy::Silent => Err(err),
            ErrorPolicy::Report => {
                self.present_error(&err);
                Err(err)
            }
            ErrorPolicy::ReportAndSwallow => {
                self.present_error(&err);
                Ok(None)
            }
        }
    }

    fn present_error(&self, err: &Error) {
        let content = err
            .user_message()
            .unwrap_or_else(|| NETWORK_FAILED_MESSAGE.to_string());
        self.inner.presenter.show_notice(&Notice {
            title: ERROR_TITLE.to_string(),
            content,
            dismiss_only: true,
        });
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("root", &self.inner.root)
            .finish_non_exhaustive()
    }
}

/// Serialize the query pairs onto the path, insertion order preserved.
/// An empty mapping yields no `?`.
fn with_query(path: &str, query: &[(String, String)]) -> String {
    let mut url = path.to_string();
    for (index, (key, value)) in query.iter().enumerate() {
        url.push(if index == 0 { '?' } else { '&' });
        let _ = write!(url, "{key}={value}");
    }
    url
}

fn is_no_token_path(path: &str) -> bool {
    NO_TOKEN_PATHS.iter().any(|prefix| path.contains(prefix))
}

/// Builds a [`Client`], wiring in the host collaborators.
pub struct ClientBuilder {
    root: RemoteRoot,
    transport: Option<Arc<dyn Transport>>,
    presenter: Option<Arc<dyn NoticePresenter>>,
    code_provider: Option<Arc<dyn LoginCodeProvider>>,
    picker: Option<Arc<dyn FilePicker>>,
}

impl ClientBuilder {
    /// Override the transport primitive. Defaults to [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the presenter. Defaults to [`TracingPresenter`].
    pub fn presenter(mut self, presenter: Arc<dyn NoticePresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Set the login-code provider. Required.
    pub fn login_code_provider(mut self, provider: Arc<dyn LoginCodeProvider>) -> Self {
        self.code_provider = Some(provider);
        self
    }

    /// Set the file picker. Required.
    pub fn file_picker(mut self, picker: Arc<dyn FilePicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Assemble the client.
    ///
    /// # Errors
    ///
    /// Fails when a required collaborator was not provided.
    pub fn build(self) -> Result<Client> {
        let code_provider = self.code_provider.ok_or_else(|| InvalidInputError::Config {
            message: "login code provider is required".to_string(),
        })?;
        let picker = self.picker.ok_or_else(|| InvalidInputError::Config {
            message: "file picker is required".to_string(),
        })?;
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let presenter = self
            .presenter
            .unwrap_or_else(|| Arc::new(TracingPresenter));
        let loading = LoadingCoordinator::new(presenter.clone());

        Ok(Client {
            inner: Arc::new(ClientInner {
                root: self.root,
                transport,
                presenter,
                code_provider,
                picker,
                loading,
                auth: AuthCoordinator::new(),
                cache: QueryCache::new(),
            }),
        })
    }
}

/// Headless presenter that emits tracing events instead of UI.
///
/// The default until the host installs a real presentation layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl NoticePresenter for TracingPresenter {
    fn show_notice(&self, notice: &Notice) {
        info!(title = %notice.title, content = %notice.content, "notice");
    }

    fn show_busy(&self, title: &str) {
        debug!(%title, "busy indicator shown");
    }

    fn hide_busy(&self) {
        debug!("busy indicator hidden");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_adds_no_question_mark() {
        assert_eq!(with_query("/items", &[]), "/items");
    }

    #[test]
    fn query_serializes_in_insertion_order() {
        let query = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];
        assert_eq!(with_query("/items", &query), "/items?a=1&b=2");
    }

    #[test]
    fn login_path_needs_no_token() {
        assert!(is_no_token_path("/login"));
        assert!(is_no_token_path("/api/login"));
        assert!(!is_no_token_path("/items"));
    }
}
