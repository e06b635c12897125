//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use stackpage_core::{Error, Result, StackConfig};

use crate::transport::{GraphqlRequest, GraphqlResponse, GraphqlTransport};

/// GraphQL transport that POSTs JSON over HTTPS.
///
/// Each call is a single attempt. Retries, if wanted, belong to the caller.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the client defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport_with_source("Failed to build HTTP client", e))?;
        Ok(Self { client })
    }

    /// Creates a transport honoring the configured timeout, if any.
    pub fn from_config(config: &StackConfig) -> Result<Self> {
        match config.timeout_secs {
            Some(secs) => Self::with_timeout(Duration::from_secs(secs)),
            None => Ok(Self::new()),
        }
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn execute(&self, request: GraphqlRequest) -> Result<GraphqlResponse> {
        let mut builder = self.client.post(&request.endpoint).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport_with_source("Failed to call GraphQL endpoint", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport_with_source("Failed to read GraphQL response", e))?;

        if !status.is_success() {
            // The API reports query problems as a non-2xx status with a
            // regular GraphQL envelope.
            if let Ok(envelope) = serde_json::from_str::<GraphqlResponse>(&body)
                && !envelope.errors.is_empty()
            {
                return Err(Error::GraphQl(envelope.errors));
            }
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::invalid_data(format!("GraphQL response is not an envelope: {e}")))
    }
}
