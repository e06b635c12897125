//! The page query and its response shape.
//!
//! GraphQL makes almost every field nullable, so the wire types below are
//! `Option` throughout; [`crate::normalize_page`] decides what is required.

use serde::Deserialize;

/// Operation name of [`PAGE_QUERY`].
pub const PAGE_OPERATION: &str = "Page";

/// Looks a page up by URL, with its hero image and modular blocks.
pub const PAGE_QUERY: &str = r#"query Page($url: String!) {
  all_page(where: {url: $url}) {
    items {
      system {
        uid
        content_type_uid
      }
      description
      rich_text
      title
      url
      imageConnection {
        edges {
          node {
            url
            title
          }
        }
      }
      blocks {
        ... on PageBlocksBlock {
          __typename
          block {
            copy
            imageConnection {
              edges {
                node {
                  url
                  title
                }
              }
            }
            layout
            title
          }
        }
      }
    }
  }
}"#;

/// `data` of the page query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQueryData {
    /// Result of `all_page`.
    pub all_page: Option<PageCollection>,
}

/// Paged collection of page entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageCollection {
    /// Matching entries.
    pub items: Option<Vec<Option<PageItem>>>,
}

/// One page entry as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageItem {
    /// Entry system fields.
    pub system: Option<EntrySystem>,
    /// Page title.
    pub title: Option<String>,
    /// Page description.
    pub description: Option<String>,
    /// Page URL.
    pub url: Option<String>,
    /// Rich text HTML.
    pub rich_text: Option<String>,
    /// Hero image connection.
    #[serde(rename = "imageConnection")]
    pub image_connection: Option<ImageConnection>,
    /// Modular blocks.
    pub blocks: Option<Vec<Option<BlockItem>>>,
}

/// Entry system fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntrySystem {
    /// Entry UID.
    pub uid: Option<String>,
    /// Content type UID.
    pub content_type_uid: Option<String>,
}

/// Asset connection (`edges { node }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageConnection {
    /// Connection edges.
    pub edges: Option<Vec<Option<ImageEdge>>>,
}

/// One connection edge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageEdge {
    /// Asset node.
    pub node: Option<ImageNode>,
}

/// Asset fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageNode {
    /// Asset URL.
    pub url: Option<String>,
    /// Asset title.
    pub title: Option<String>,
}

/// A member of the modular-blocks union. Only `PageBlocksBlock` carries `block`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockItem {
    /// Union member name.
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    /// Block payload.
    pub block: Option<BlockFields>,
}

/// Fields of a page block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockFields {
    /// Block heading.
    pub title: Option<String>,
    /// Block HTML body.
    pub copy: Option<String>,
    /// Layout select value.
    pub layout: Option<String>,
    /// Block image connection.
    #[serde(rename = "imageConnection")]
    pub image_connection: Option<ImageConnection>,
}

/// Variables for [`PAGE_QUERY`]. An empty URL means the site root.
pub fn page_variables(url: &str) -> serde_json::Value {
    let url = if url.is_empty() { "/" } else { url };
    serde_json::json!({ "url": url })
}
