//! Page fetching over the CMS GraphQL delivery API.
//!
//! [`PageFetcher`] issues the page query through a [`GraphqlTransport`],
//! normalizes the first match into a [`PageRecord`], and attaches edit tags
//! when live preview is on. [`LivePreview`] and [`PreviewSession`] re-run the
//! fetch whenever the editing bridge reports a changed entry.
//!
//! [`PageRecord`]: stackpage_core::PageRecord

mod fetcher;
mod http;
mod mock;
mod normalize;
mod preview;
mod query;
mod transport;

pub use fetcher::PageFetcher;
pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};
pub use normalize::normalize_page;
pub use preview::{
    ClientUrlParams, EditButtonConfig, LivePreview, LivePreviewConfig, PageSink, PreviewSession,
    StackDetails, SubscriptionId,
};
pub use query::{PAGE_QUERY, PageQueryData};
pub use transport::{GraphqlBody, GraphqlRequest, GraphqlResponse, GraphqlTransport};
