//! Page fetching.
//!
//! [`PageFetcher`] turns a page URL into a [`PageRecord`]: it picks the
//! GraphQL host, builds the authenticated request, runs it through a
//! [`GraphqlTransport`], and normalizes the first match. With live preview
//! on, the record also carries edit tags.

use std::sync::Arc;

use stackpage_core::{
    DEFAULT_LOCALE, Endpoints, Error, PageRecord, Result, StackConfig, build_edit_metadata,
};

use crate::normalize::normalize_page;
use crate::preview::LivePreview;
use crate::query::{PAGE_OPERATION, PAGE_QUERY, PageQueryData, page_variables};
use crate::transport::{GraphqlBody, GraphqlRequest, GraphqlTransport};

/// Header carrying the delivery token.
const ACCESS_TOKEN_HEADER: &str = "access_token";

/// Header carrying the live preview hash.
const LIVE_PREVIEW_HEADER: &str = "live_preview";

/// Header carrying the preview token.
const PREVIEW_TOKEN_HEADER: &str = "preview_token";

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches and normalizes pages for one stack.
///
/// The fetcher is `Send + Sync`; share it behind an `Arc` for overlapping
/// calls. Every call is a single request with no retries.
pub struct PageFetcher {
    api_key: String,
    delivery_token: String,
    environment: String,
    preview: bool,
    preview_token: Option<String>,
    endpoints: Endpoints,
    transport: Arc<dyn GraphqlTransport>,
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("api_key", &self.api_key)
            .field("environment", &self.environment)
            .field("preview", &self.preview)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl PageFetcher {
    /// Creates a fetcher for the configured stack.
    ///
    /// Endpoints are resolved once here. Missing hosts are reported when a
    /// request needs them, not at construction.
    pub fn new(config: &StackConfig, transport: Arc<dyn GraphqlTransport>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            delivery_token: config.delivery_token.clone(),
            environment: config.environment.clone(),
            preview: config.preview,
            preview_token: config.preview_token().map(str::to_string),
            endpoints: config.endpoints(),
            transport,
        }
    }

    /// Whether live preview is enabled.
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// The endpoints this fetcher talks to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Build the request for `url` without sending it.
    ///
    /// The preview host is used only when live preview is on and a non-blank
    /// hash is given. The `live_preview` header is sent whenever a non-blank
    /// hash is given.
    pub fn build_request(&self, url: &str, hash: Option<&str>) -> Result<GraphqlRequest> {
        // A blank hash means no editing session.
        let hash = hash.filter(|h| !h.trim().is_empty());
        let use_preview_host = self.preview && hash.is_some();
        let host = if use_preview_host {
            self.endpoints.graphql_preview_host()?
        } else {
            self.endpoints.graphql_host()?
        };
        tracing::debug!(host, preview = use_preview_host, "selected GraphQL host");

        let mut headers = vec![(
            ACCESS_TOKEN_HEADER.to_string(),
            self.delivery_token.clone(),
        )];
        if let Some(hash) = hash {
            headers.push((LIVE_PREVIEW_HEADER.to_string(), hash.to_string()));
            if let Some(token) = &self.preview_token {
                headers.push((PREVIEW_TOKEN_HEADER.to_string(), token.clone()));
            }
        }

        Ok(GraphqlRequest {
            endpoint: format!(
                "https://{host}/stacks/{}?environment={}",
                self.api_key, self.environment
            ),
            headers,
            body: GraphqlBody {
                query: PAGE_QUERY.to_string(),
                variables: page_variables(url),
                operation_name: Some(PAGE_OPERATION.to_string()),
            },
        })
    }

    /// Fetch the page at `url`.
    ///
    /// Returns `Ok(None)` when no page matches. With live preview on, the
    /// record carries edit tags for every present field.
    ///
    /// # Errors
    ///
    /// Configuration errors for unresolvable hosts, transport and status
    /// errors from the request, [`Error::GraphQl`] when the server reports
    /// errors, and [`Error::InvalidData`] when the data does not have the
    /// expected shape.
    pub async fn fetch_page(&self, url: &str, hash: Option<&str>) -> Result<Option<PageRecord>> {
        let request = self.build_request(url, hash)?;
        let response = self.transport.execute(request).await?;

        let Some(data) = response.into_data()? else {
            return Ok(None);
        };
        let data: PageQueryData = serde_json::from_value(data)
            .map_err(|e| Error::invalid_data(format!("unexpected page query data: {e}")))?;

        let Some(record) = normalize_page(data)? else {
            tracing::debug!(url, "no page matched");
            return Ok(None);
        };

        if !self.preview {
            return Ok(Some(record));
        }

        let metadata = build_edit_metadata(&record, &record.content_type_id, DEFAULT_LOCALE);
        Ok(Some(record.with_edit_metadata(metadata)))
    }

    /// Fetch the page at `url` using the session's current hash.
    pub async fn fetch_page_with_session(
        &self,
        url: &str,
        live_preview: &LivePreview,
    ) -> Result<Option<PageRecord>> {
        let hash = live_preview.hash();
        self.fetch_page(url, hash.as_deref()).await
    }
}
