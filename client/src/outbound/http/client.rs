//! Reqwest-backed session backend adapter.
//!
//! This adapter owns transport details only: endpoint resolution, the cookie
//! jar carrying the backend session, request timeouts, HTTP error mapping and
//! JSON decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    ActivatePlanRequestDto, ActivatePlanResponseDto, ErrorBodyDto, LoginRequestDto,
    PlanStatusDto, SignupRequestDto, UpdatePasswordRequestDto,
};
use crate::domain::ports::{PlanApi, SessionApi, SessionApiError};
use crate::domain::{
    LoginCredentials, PasswordChange, Plan, PlanStatus, SessionUser, SignupRequest,
    StoredAnalysis,
};

const DEFAULT_USER_AGENT: &str = concat!("unbind-client/", env!("CARGO_PKG_VERSION"));

const CURRENT_USER_PATH: &str = "auth/me";
const LOGIN_PATH: &str = "auth/login";
const SIGNUP_PATH: &str = "auth/signup";
const LOGOUT_PATH: &str = "auth/logout";
const UPDATE_PASSWORD_PATH: &str = "auth/update-password";
const ANALYSES_PATH: &str = "user/analyses";
const PLAN_STATUS_PATH: &str = "user/plan/";
const PLAN_ACTIVATE_PATH: &str = "user/plan/activate";
const PLAN_CANCEL_PATH: &str = "user/plan/cancel";

/// Raised when the adapter cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum HttpBackendBuildError {
    /// The base URL cannot carry relative endpoint paths.
    #[error("backend base URL '{url}' cannot be a base for API paths")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
    },
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Session and plan backend reached over HTTP.
///
/// One instance holds one cookie jar, so every request made through it shares
/// the backend session established by `login` or `signup`.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build an adapter rooted at `base_url` with a per-request timeout.
    ///
    /// A base URL without a trailing slash is treated as a directory, so
    /// `http://host/api` and `http://host/api/` resolve the same endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`HttpBackendBuildError`] when the URL cannot be a base or the
    /// reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, HttpBackendBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(HttpBackendBuildError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: normalise_base(base_url),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, SessionApiError> {
        let url = self.base_url.join(path).map_err(|error| {
            SessionApiError::transport(format!("invalid endpoint '{path}': {error}"))
        })?;
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, SessionApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.request(Method::GET, path)?.send().await;
        decode_json(path, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, SessionApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path)?.json(body).send().await;
        decode_json(path, response).await
    }

    /// POST an optional JSON body and ignore the success body.
    async fn post_discarding<B>(&self, path: &str, body: Option<&B>) -> Result<(), SessionApiError>
    where
        B: Serialize + Sync,
    {
        let mut request = self.request(Method::POST, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let payload = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, payload.as_ref()));
        }
        debug!(path, status = status.as_u16(), "backend call succeeded");
        Ok(())
    }
}

/// Ensure the base path ends in `/` so `join` appends rather than replaces.
fn normalise_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn decode_json<T>(
    path: &str,
    response: Result<Response, reqwest::Error>,
) -> Result<T, SessionApiError>
where
    T: DeserializeOwned,
{
    let response = response.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    debug!(path, status = status.as_u16(), bytes = body.len(), "backend call succeeded");
    serde_json::from_slice(body.as_ref()).map_err(|error| {
        SessionApiError::decode(format!("invalid JSON from '{path}': {error}"))
    })
}

#[async_trait]
impl SessionApi for HttpBackend {
    async fn current_user(&self) -> Option<SessionUser> {
        match self.get_json::<SessionUser>(CURRENT_USER_PATH).await {
            Ok(user) => Some(user),
            Err(error) => {
                debug!(%error, "backend does not recognise a session");
                None
            }
        }
    }

    async fn user_analyses(&self) -> Result<Vec<StoredAnalysis>, SessionApiError> {
        self.get_json(ANALYSES_PATH).await
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionUser, SessionApiError> {
        self.post_json(LOGIN_PATH, &LoginRequestDto::from(credentials))
            .await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<SessionUser, SessionApiError> {
        self.post_json(SIGNUP_PATH, &SignupRequestDto::from(request))
            .await
    }

    async fn logout(&self) -> Result<(), SessionApiError> {
        self.post_discarding::<()>(LOGOUT_PATH, None).await
    }

    async fn update_password(&self, change: &PasswordChange) -> Result<(), SessionApiError> {
        let body = UpdatePasswordRequestDto::from(change);
        self.post_discarding(UPDATE_PASSWORD_PATH, Some(&body)).await
    }
}

#[async_trait]
impl PlanApi for HttpBackend {
    async fn plan_status(&self) -> Result<PlanStatus, SessionApiError> {
        let dto: PlanStatusDto = self.get_json(PLAN_STATUS_PATH).await?;
        Ok(dto.into_domain())
    }

    async fn activate(&self, plan: Plan) -> Result<Plan, SessionApiError> {
        let body = ActivatePlanRequestDto {
            plan: plan.as_str(),
        };
        let dto: ActivatePlanResponseDto = self.post_json(PLAN_ACTIVATE_PATH, &body).await?;
        dto.into_domain().map_err(SessionApiError::decode)
    }

    async fn cancel(&self) -> Result<(), SessionApiError> {
        self.post_discarding::<()>(PLAN_CANCEL_PATH, None).await
    }
}

fn map_transport_error(error: reqwest::Error) -> SessionApiError {
    if error.is_timeout() {
        SessionApiError::timeout(error.to_string())
    } else if error.is_decode() {
        SessionApiError::decode(error.to_string())
    } else {
        SessionApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SessionApiError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SessionApiError::unauthorized(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            SessionApiError::rejected(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SessionApiError::timeout(message)
        }
        _ => SessionApiError::status(status.as_u16(), message),
    }
}

/// Prefer the FastAPI `detail` text; fall back to a compact body preview.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Some(detail) = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::into_message)
    {
        return detail;
    }
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Kind {
        Unauthorized,
        Rejected,
        Timeout,
        Status(u16),
    }

    fn kind_of(error: &SessionApiError) -> Kind {
        match error {
            SessionApiError::Unauthorized { .. } => Kind::Unauthorized,
            SessionApiError::Rejected { .. } => Kind::Rejected,
            SessionApiError::Timeout { .. } => Kind::Timeout,
            SessionApiError::Status { status, .. } => Kind::Status(*status),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, Kind::Unauthorized)]
    #[case::forbidden(StatusCode::FORBIDDEN, Kind::Unauthorized)]
    #[case::bad_request(StatusCode::BAD_REQUEST, Kind::Rejected)]
    #[case::conflict(StatusCode::CONFLICT, Kind::Rejected)]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY, Kind::Rejected)]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, Kind::Timeout)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, Kind::Timeout)]
    #[case::not_found(StatusCode::NOT_FOUND, Kind::Status(404))]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, Kind::Status(500))]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: Kind) {
        let error = map_status_error(status, br#"{"detail":"nope"}"#);
        assert_eq!(kind_of(&error), expected);
    }

    #[rstest]
    fn status_errors_carry_fastapi_detail() {
        let error = map_status_error(StatusCode::UNAUTHORIZED, br#"{"detail":"Invalid credentials"}"#);
        assert_eq!(
            error,
            SessionApiError::unauthorized("Invalid credentials"),
        );
    }

    #[rstest]
    #[case(b"".as_slice(), "status 502")]
    #[case(b"<html>\n  Bad   gateway\n</html>".as_slice(), "status 502: <html> Bad gateway </html>")]
    fn falls_back_to_body_preview(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, body), expected);
    }

    #[rstest]
    fn truncates_long_previews() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[rstest]
    #[case("http://localhost:8000/api", "http://localhost:8000/api/auth/me")]
    #[case("http://localhost:8000/api/", "http://localhost:8000/api/auth/me")]
    #[case("http://localhost:8000", "http://localhost:8000/auth/me")]
    fn resolves_endpoints_below_base(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid base");
        let backend = HttpBackend::new(base, Duration::from_secs(5)).expect("client builds");
        let url = backend
            .base_url()
            .join(CURRENT_USER_PATH)
            .expect("endpoint joins");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn rejects_non_base_urls() {
        let url = Url::parse("mailto:ops@example.com").expect("valid url");
        let result = HttpBackend::new(url, Duration::from_secs(5));
        assert!(matches!(
            result,
            Err(HttpBackendBuildError::InvalidBaseUrl { .. })
        ));
    }
}
