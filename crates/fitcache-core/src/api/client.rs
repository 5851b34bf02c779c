//! API client for the fitness-tracker REST backend.
//!
//! This module provides the `ApiClient` struct. Each resource kind is served
//! under `{base}/{path}` with `GET /user/{userId}`, `POST`, `PUT /{id}` and
//! `DELETE /{id}`; the generic methods below cover all four kinds through the
//! `Resource` trait.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{NewUser, Resource, User, Validate, ValidationError};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default backend location when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Path of the user collection.
const USERS_PATH: &str = "users";

/// API client for the fitness backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client using the transport's default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an optional whole-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = Self::parse_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
        let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!("{}: scheme must be http or https", raw)));
        }
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw.to_string()));
        }
        Ok(url)
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Request failed");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send(&self, request: RequestBuilder, method: &Method, url: &Url) -> Result<Response, ApiError> {
        debug!(method = %method, url = %url, "Sending request");
        let response = request.send().await?;
        Self::check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, ApiError> {
        let request = self.request(method.clone(), url.clone());
        let response = self.send(request, &method, &url).await?;
        Self::decode(response, &url).await
    }

    async fn send_json_body<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        // .json() sets Content-Type: application/json
        let request = self.request(method.clone(), url.clone()).json(body);
        let response = self.send(request, &method, &url).await?;
        Self::decode(response, &url).await
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn require_id(id: &str) -> Result<(), ApiError> {
        if id.trim().is_empty() {
            return Err(ValidationError::new("id", "must not be empty").into());
        }
        Ok(())
    }

    // ===== Resource Operations =====

    /// `GET /{path}/user/{userId}`
    pub async fn list<R: Resource>(&self, user_id: &str) -> Result<Vec<R>, ApiError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::new("userId", "must not be empty").into());
        }
        let url = self.url(&[R::KIND.path(), "user", user_id])?;
        let items: Vec<R> = self.send_json(Method::GET, url).await?;
        debug!(kind = %R::KIND, user_id = user_id, count = items.len(), "Listed resources");
        Ok(items)
    }

    /// `POST /{path}`
    pub async fn create<R: Resource>(&self, payload: &R::Create) -> Result<R, ApiError> {
        payload.validate()?;
        let url = self.url(&[R::KIND.path()])?;
        self.send_json_body(Method::POST, url, payload).await
    }

    /// `PUT /{path}/{id}` with only the patch's populated fields.
    pub async fn update<R: Resource>(&self, id: &str, patch: &R::Patch) -> Result<R, ApiError> {
        Self::require_id(id)?;
        patch.validate()?;
        let url = self.url(&[R::KIND.path(), id])?;
        self.send_json_body(Method::PUT, url, patch).await
    }

    /// `DELETE /{path}/{id}`. Whatever body the server returns is ignored.
    pub async fn delete<R: Resource>(&self, id: &str) -> Result<(), ApiError> {
        Self::require_id(id)?;
        let url = self.url(&[R::KIND.path(), id])?;
        let request = self.request(Method::DELETE, url.clone());
        self.send(request, &Method::DELETE, &url).await?;
        debug!(kind = %R::KIND, id = id, "Deleted resource");
        Ok(())
    }

    // ===== Users =====

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        user.validate()?;
        let url = self.url(&[USERS_PATH])?;
        self.send_json_body(Method::POST, url, user).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.url(&[USERS_PATH])?;
        self.send_json(Method::GET, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceKind;

    #[test]
    fn test_url_building() {
        let client = ApiClient::new(DEFAULT_BASE_URL).expect("client");
        let url = client
            .url(&[ResourceKind::Workouts.path(), "user", "user-123"])
            .expect("url");
        assert_eq!(url.as_str(), "http://localhost:5000/api/workouts/user/user-123");

        let url = client.url(&[ResourceKind::Nutrition.path()]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:5000/api/nutrition");
    }

    #[test]
    fn test_trailing_slash_and_encoding() {
        let client = ApiClient::new("https://fit.example.com/api/").expect("client");
        let url = client.url(&["exercises", "a b/c"]).expect("url");
        assert_eq!(url.as_str(), "https://fit.example.com/api/exercises/a%20b%2Fc");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(ApiClient::new("ftp://host/api"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(ApiClient::new("mailto:someone@example.com"), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_require_id() {
        assert!(ApiClient::require_id("w-1").is_ok());
        assert!(matches!(ApiClient::require_id(" "), Err(ApiError::Validation(_))));
    }
}
