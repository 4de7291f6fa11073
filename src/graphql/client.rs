// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! GraphQL-over-HTTP transport with a swappable bearer token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum GraphQlError {
    #[error("Invalid GraphQL endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("GraphQL request failed: {0}")]
    Request(String),

    #[error("GraphQL endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Errors reported in the response's `errors` array.
    #[error("GraphQL error: {}", .0.join("; "))]
    Response(Vec<String>),

    #[error("GraphQL response had no data")]
    MissingData,

    #[error("GraphQL response was invalid: {0}")]
    Decode(String),
}

impl GraphQlError {
    /// The server's own message when there is one.
    pub fn short_message(&self) -> String {
        match self {
            GraphQlError::Response(messages) => messages
                .first()
                .cloned()
                .unwrap_or_else(|| self.to_string()),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

/// GraphQL client.
///
/// Clones share the bearer token, so setting it once authenticates every
/// handle.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    endpoint: String,
    http: Client,
    bearer: Arc<RwLock<Option<String>>>,
}

impl GraphQlClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GraphQlError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| GraphQlError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraphQlError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: parsed.to_string(),
            http,
            bearer: Arc::new(RwLock::new(None)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Attach `Authorization: Bearer <token>` to subsequent requests.
    pub async fn set_auth_token(&self, token: &str) {
        *self.bearer.write().await = Some(token.to_string());
    }

    /// Stop sending the `Authorization` header.
    pub async fn clear_auth_token(&self) {
        *self.bearer.write().await = None;
    }

    pub async fn has_auth_token(&self) -> bool {
        self.bearer.read().await.is_some()
    }

    /// Execute a document and return the raw `data` object.
    pub async fn request_value(&self, document: &str, variables: Value) -> Result<Value, GraphQlError> {
        let operation = operation_name(document);
        let payload = json!({ "query": document, "variables": variables });

        let mut request = self.http.post(&self.endpoint).json(&payload);
        if let Some(token) = self.bearer.read().await.as_deref() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        debug!(operation = %operation, "GraphQL request");
        let response = request
            .send()
            .await
            .map_err(|e| GraphQlError::Request(format!("{operation}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GraphQlError::Request(format!("{operation}: {e}")))?;

        let envelope: ResponseEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(GraphQlError::Decode(format!("{operation}: {e}")));
            }
            Err(_) => {
                return Err(GraphQlError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(GraphQlError::Response(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        if !status.is_success() {
            return Err(GraphQlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match envelope.data {
            Some(Value::Null) | None => Err(GraphQlError::MissingData),
            Some(data) => Ok(data),
        }
    }

    /// Execute a document and decode `data` into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<T, GraphQlError> {
        let data = self.request_value(document, variables).await?;
        decode(data)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(data: Value) -> Result<T, GraphQlError> {
    serde_json::from_value(data).map_err(|e| GraphQlError::Decode(e.to_string()))
}

/// Operation name of a document, for logs.
pub(crate) fn operation_name(document: &str) -> &str {
    let trimmed = document.trim_start();
    let rest = trimmed
        .strip_prefix("query")
        .or_else(|| trimmed.strip_prefix("mutation"))
        .unwrap_or("")
        .trim_start();
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if end == 0 {
        "anonymous"
    } else {
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubServer, StubResponse};

    #[test]
    fn operation_names_are_extracted() {
        assert_eq!(operation_name("\n  query GetCourses($status: String) {"), "GetCourses");
        assert_eq!(operation_name("mutation Login($input: LoginInput!) {"), "Login");
        assert_eq!(operation_name("{ me { walletAddress } }"), "anonymous");
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let err = GraphQlClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GraphQlError::InvalidEndpoint(_)));
    }

    #[tokio::test]
    async fn bearer_header_follows_token_state() {
        let server = StubServer::start(|_| StubResponse::data(json!({ "ok": true }))).await;
        let client = GraphQlClient::new(&server.graphql_url(), Duration::from_secs(5)).unwrap();

        client.request_value("query A { ok }", json!({})).await.unwrap();
        client.set_auth_token("tok-1").await;
        client.request_value("query B { ok }", json!({})).await.unwrap();
        client.clear_auth_token().await;
        client.request_value("query C { ok }", json!({})).await.unwrap();

        let seen = server.graphql_requests();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].authorization, None);
        assert_eq!(seen[1].authorization.as_deref(), Some("Bearer tok-1"));
        assert_eq!(seen[2].authorization, None);
    }

    #[tokio::test]
    async fn graphql_errors_are_surfaced() {
        let server = StubServer::start(|_| {
            StubResponse::errors(&["Unauthorized", "Token expired"])
        })
        .await;
        let client = GraphQlClient::new(&server.graphql_url(), Duration::from_secs(5)).unwrap();

        let err = client.request_value("query Me { me { id } }", json!({})).await.unwrap_err();
        match &err {
            GraphQlError::Response(messages) => assert_eq!(messages.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.short_message(), "Unauthorized");
    }

    #[tokio::test]
    async fn non_json_failure_reports_status() {
        let server = StubServer::start(|_| StubResponse::raw(502, "bad gateway")).await;
        let client = GraphQlClient::new(&server.graphql_url(), Duration::from_secs(5)).unwrap();

        let err = client.request_value("query A { ok }", json!({})).await.unwrap_err();
        assert!(matches!(err, GraphQlError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn null_data_is_an_error() {
        let server = StubServer::start(|_| StubResponse::data(Value::Null)).await;
        let client = GraphQlClient::new(&server.graphql_url(), Duration::from_secs(5)).unwrap();

        let err = client.request_value("query A { ok }", json!({})).await.unwrap_err();
        assert!(matches!(err, GraphQlError::MissingData));
    }
}
