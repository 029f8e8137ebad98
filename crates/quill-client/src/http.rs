//! HTTP client for the admin API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use quill_core::domain::{AssistRequest, Post, PostFields};
use quill_core::ports::{CompletionGateway, GatewayError, PostGateway};
use quill_shared::ErrorResponse;
use quill_shared::dto::{CompletionRequest, CompletionResponse, DeleteResponse, PostPayload, PostResponse};

/// Authenticated client for `/api`. Implements both editor gateways.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach the bearer token returned by `/api/auth/login`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.without_url().to_string()))?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.without_url().to_string()))
    }

    /// Turn a non-2xx answer into [`GatewayError`], using the problem body when present.
    async fn check(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let problem = response.json::<ErrorResponse>().await.ok();
        Err(rejection(status.as_u16(), problem))
    }

    async fn send_post(&self, builder: RequestBuilder) -> Result<Post, GatewayError> {
        let body: PostResponse = self.send(builder).await?;
        Post::try_from(body).map_err(GatewayError::Decode)
    }
}

fn rejection(status: u16, problem: Option<ErrorResponse>) -> GatewayError {
    match problem {
        Some(p) if p.is_not_configured() => GatewayError::NotConfigured,
        Some(p) => GatewayError::Rejected {
            status,
            message: p.message().to_string(),
        },
        None => GatewayError::Rejected {
            status,
            message: format!("Request failed with status {status}"),
        },
    }
}

#[async_trait]
impl PostGateway for ApiClient {
    async fn fetch(&self, id: Uuid) -> Result<Post, GatewayError> {
        self.send_post(self.request(Method::GET, &format!("/api/posts/{id}")))
            .await
    }

    async fn create(&self, fields: &PostFields) -> Result<Post, GatewayError> {
        let payload = PostPayload::from(fields);
        self.send_post(self.request(Method::POST, "/api/posts").json(&payload))
            .await
    }

    async fn update(&self, id: Uuid, fields: &PostFields) -> Result<Post, GatewayError> {
        let payload = PostPayload::from(fields);
        self.send_post(
            self.request(Method::PUT, &format!("/api/posts/{id}"))
                .json(&payload),
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError> {
        let _: DeleteResponse = self
            .send(self.request(Method::DELETE, &format!("/api/posts/{id}")))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CompletionGateway for ApiClient {
    async fn complete(&self, request: &AssistRequest) -> Result<String, GatewayError> {
        let body = CompletionRequest {
            prompt: Some(request.prompt.clone()).filter(|p| !p.is_empty()),
            title: Some(request.title.clone()).filter(|t| !t.is_empty()),
            mode: Some(request.mode.as_str().to_string()),
        };
        let response: CompletionResponse = self
            .send(self.request(Method::POST, "/api/ai/complete").json(&body))
            .await?;
        Ok(response.completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.url("/api/posts"), "http://localhost:8080/api/posts");
    }

    #[test]
    fn test_rejection_prefers_problem_detail() {
        let err = rejection(409, Some(ErrorResponse::slug_exists("hello")));
        assert_eq!(
            err,
            GatewayError::Rejected {
                status: 409,
                message: "A post with slug 'hello' already exists".to_string(),
            }
        );
        assert_eq!(err.to_string(), "A post with slug 'hello' already exists");
    }

    #[test]
    fn test_not_configured_is_distinct() {
        let err = rejection(503, Some(ErrorResponse::not_configured("AI feature not configured")));
        assert_eq!(err, GatewayError::NotConfigured);
    }

    #[test]
    fn test_rejection_without_body() {
        let err = rejection(404, None);
        assert!(err.is_not_found());
    }
}
