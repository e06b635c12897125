//! GraphQL transport abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stackpage_core::{Error, GraphqlError, Result};

/// Abstraction over the HTTP layer that carries GraphQL requests.
///
/// This trait allows swapping the real client for a canned one in tests and
/// offline runs without changing fetcher code.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Executes one request and returns the decoded GraphQL envelope.
    ///
    /// Implementations report HTTP and network failures as errors. A decoded
    /// envelope may still carry GraphQL `errors`; see
    /// [`GraphqlResponse::into_data`].
    async fn execute(&self, request: GraphqlRequest) -> Result<GraphqlResponse>;
}

/// A fully prepared GraphQL request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest {
    /// Absolute endpoint URL including the query string.
    pub endpoint: String,

    /// Header name/value pairs in insertion order.
    pub headers: Vec<(String, String)>,

    /// JSON body.
    pub body: GraphqlBody,
}

impl GraphqlRequest {
    /// Value of the first header with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Standard GraphQL-over-HTTP request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlBody {
    /// Query document.
    pub query: String,

    /// Query variables.
    pub variables: serde_json::Value,

    /// Operation to run when the document defines several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse {
    /// Result data, absent when the request failed validation.
    #[serde(default)]
    pub data: Option<serde_json::Value>,

    /// Errors reported by the server.
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    /// Creates a successful response with the given data.
    pub fn with_data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Creates a response carrying only errors.
    pub fn with_errors(errors: Vec<GraphqlError>) -> Self {
        Self { data: None, errors }
    }

    /// Returns the data, failing if the server reported any errors.
    ///
    /// Partial data next to errors is discarded.
    pub fn into_data(self) -> Result<Option<serde_json::Value>> {
        if !self.errors.is_empty() {
            return Err(Error::GraphQl(self.errors));
        }
        Ok(self.data)
    }
}
