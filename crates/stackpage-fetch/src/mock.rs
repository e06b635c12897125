//! Mock GraphQL transport for testing and offline runs.

use std::sync::Arc;

use async_trait::async_trait;
use stackpage_core::{Error, Result};
use tokio::sync::Mutex;

use crate::transport::{GraphqlRequest, GraphqlResponse, GraphqlTransport};

/// A canned outcome for one request.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this envelope.
    Response(GraphqlResponse),
    /// Fail as if the server answered with this HTTP status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Fail as if the connection broke.
    Transport(String),
}

/// Mock transport that returns canned replies and records every request.
///
/// Replies are returned in order. After all replies are used, the transport
/// cycles back to the first one. Clones share state.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    canned: Vec<MockReply>,
    index: usize,
    requests: Vec<GraphqlRequest>,
}

impl MockTransport {
    /// Creates a mock transport with canned replies.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackpage_fetch::{GraphqlResponse, MockReply, MockTransport};
    ///
    /// let transport = MockTransport::new(vec![
    ///     MockReply::Response(GraphqlResponse::with_data(serde_json::json!({"all_page": null}))),
    ///     MockReply::Transport("connection reset".to_string()),
    /// ]);
    /// ```
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                canned: replies,
                index: 0,
                requests: Vec::new(),
            })),
        }
    }

    /// Creates a mock transport with a single response.
    pub fn with_response(response: GraphqlResponse) -> Self {
        Self::new(vec![MockReply::Response(response)])
    }

    /// Creates a mock transport answering every request with `data`.
    pub fn with_data(data: serde_json::Value) -> Self {
        Self::with_response(GraphqlResponse::with_data(data))
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<GraphqlRequest> {
        self.state.lock().await.requests.clone()
    }

    /// The most recent request.
    pub async fn last_request(&self) -> Option<GraphqlRequest> {
        self.state.lock().await.requests.last().cloned()
    }
}

#[async_trait]
impl GraphqlTransport for MockTransport {
    async fn execute(&self, request: GraphqlRequest) -> Result<GraphqlResponse> {
        let mut state = self.state.lock().await;
        state.requests.push(request);

        if state.canned.is_empty() {
            return Err(Error::transport("mock transport has no canned replies"));
        }

        let reply = state.canned[state.index].clone();
        state.index = (state.index + 1) % state.canned.len();

        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Status { status, body } => Err(Error::Status { status, body }),
            MockReply::Transport(message) => Err(Error::transport(message)),
        }
    }
}
