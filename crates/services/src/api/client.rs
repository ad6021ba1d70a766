use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use langapp_core::model::{
    AuthResponse, CourseDetails, CourseId, CourseSummary, LessonDetails, LessonId, LoginRequest,
    RegisterRequest, Task, User, UserPatch,
};

use crate::auth_context::AuthContext;
use crate::config::ApiConfig;
use crate::error::ApiError;

use super::{AuthApi, CourseApi, LessonApi};

/// HTTP client for the language-app REST API.
///
/// The bearer token is read from the shared [`AuthContext`] on every request,
/// so signing in or out takes effect without rebuilding the client.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    auth: AuthContext,
}

/// Error body shape used by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, auth: AuthContext) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            auth,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidEndpoint {
                path: segments.join("/"),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        let mut rb = self.http.request(method, url);
        if let Some(token) = self.auth.token() {
            rb = rb.bearer_auth(token);
        }
        Ok(rb)
    }

    async fn send(&self, rb: RequestBuilder) -> Result<Response, ApiError> {
        let response = rb.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message);
        tracing::debug!(%status, ?message, "API request rejected");
        Err(ApiError::Status { status, message })
    }

    async fn send_json<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(rb).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let rb = self.request(Method::POST, &["auth", "register"])?.json(&body);
        self.send_json(rb).await
    }

    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            username_or_email: username_or_email.to_string(),
            password: password.to_string(),
        };
        let rb = self.request(Method::POST, &["auth", "login"])?.json(&body);
        self.send_json(rb).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let rb = self.request(Method::POST, &["auth", "logout"])?;
        self.send(rb).await?;
        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        let rb = self.request(Method::GET, &["auth", "me"])?;
        self.send_json(rb).await
    }

    async fn update_me(&self, patch: &UserPatch) -> Result<User, ApiError> {
        let rb = self.request(Method::PATCH, &["auth", "me"])?.json(patch);
        self.send_json(rb).await
    }
}

#[async_trait]
impl CourseApi for ApiClient {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, ApiError> {
        let rb = self.request(Method::GET, &["courses"])?;
        self.send_json(rb).await
    }

    async fn course(&self, id: &CourseId) -> Result<CourseDetails, ApiError> {
        let rb = self.request(Method::GET, &["courses", id.as_str()])?;
        self.send_json(rb).await
    }
}

#[async_trait]
impl LessonApi for ApiClient {
    async fn lesson_details(&self, id: &LessonId) -> Result<LessonDetails, ApiError> {
        let rb = self.request(Method::GET, &["lessons", id.as_str()])?;
        self.send_json(rb).await
    }

    async fn lesson_tasks(&self, id: &LessonId) -> Result<Vec<Task>, ApiError> {
        let rb = self.request(Method::GET, &["lessons", id.as_str(), "tasks"])?;
        self.send_json(rb).await
    }

    async fn complete_lesson(&self, id: &LessonId) -> Result<String, ApiError> {
        let rb = self.request(Method::POST, &["lessons", id.as_str(), "complete"])?;
        let response = self.send(rb).await?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base).unwrap(), AuthContext::new()).unwrap()
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let api = client("http://localhost:8080/api");
        let url = api.endpoint(&["lessons", "l-1", "tasks"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/lessons/l-1/tasks");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let api = client("http://localhost:8080/api/");
        let url = api.endpoint(&["courses"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/courses");
    }

    #[test]
    fn endpoint_encodes_identifiers() {
        let api = client("http://localhost/api");
        let url = api.endpoint(&["courses", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/courses/a%20b%2Fc");
    }
}
