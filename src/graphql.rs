//! Minimal GraphQL-over-HTTP transport shared by the Linear and GitHub clients.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Timeout applied to every GraphQL request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors returned by a GraphQL endpoint or the transport underneath it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or the response body not read.
    #[error("{service} network error: {message}")]
    Network {
        /// Service name used in messages.
        service: &'static str,
        /// Underlying transport error.
        message: String,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("{service} API request failed: HTTP {status}: {body}")]
    Http {
        /// Service name used in messages.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response carried a GraphQL `errors` array.
    #[error("{service} API error: {message}")]
    GraphQl {
        /// Service name used in messages.
        service: &'static str,
        /// Message of the first reported error.
        message: String,
    },

    /// The response had neither `data` nor `errors`, or `data` had the wrong shape.
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse {
        /// Service name used in messages.
        service: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct Response<T> {
    data: Option<T>,
    errors: Option<Vec<ResponseError>>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

/// A GraphQL endpoint with a fixed authorization header.
#[derive(Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    authorization: String,
    service: &'static str,
}

impl GraphQlClient {
    /// Creates a client that posts to `endpoint` with the given `Authorization` value.
    pub fn new(
        service: &'static str,
        endpoint: impl Into<String>,
        authorization: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("linear-release/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                service,
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            authorization: authorization.into(),
            service,
        })
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Executes `query` with `variables` and decodes the `data` member.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let service = self.service;

        debug!(endpoint = %self.endpoint, service, "Sending GraphQL request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .json(&Request { query, variables })
            .send()
            .await
            .map_err(|e| ApiError::Network {
                service,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read error response body: {e}");
                String::new()
            });
            return Err(ApiError::Http {
                service,
                status: status.as_u16(),
                body,
            });
        }

        let body: Response<T> = response.json().await.map_err(|e| ApiError::InvalidResponse {
            service,
            message: e.to_string(),
        })?;

        if let Some(first) = body.errors.and_then(|errors| errors.into_iter().next()) {
            return Err(ApiError::GraphQl {
                service,
                message: first.message,
            });
        }

        body.data.ok_or_else(|| ApiError::InvalidResponse {
            service,
            message: "no data returned".to_string(),
        })
    }
}
