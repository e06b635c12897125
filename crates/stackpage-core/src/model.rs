//! The normalized page record handed to renderers.
//!
//! A [`PageRecord`] is built fresh for every fetch and never mutated
//! afterwards. HTML-bearing fields (`rich_text`, [`Block::copy`]) hold raw,
//! untrusted markup; consumers must sanitize them before display.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::edit_tags::EditMetadata;

/// A single page entry, flattened from the GraphQL response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page title.
    pub title: Option<String>,

    /// Short description.
    pub description: Option<String>,

    /// URL path the page was looked up by.
    pub url: String,

    /// Raw rich text HTML. Untrusted.
    pub rich_text: Option<String>,

    /// Hero image (first edge of the image connection).
    pub image: Option<ImageRef>,

    /// Layout blocks in source order.
    pub blocks: Vec<BlockWrapper>,

    /// Entry UID.
    pub uid: String,

    /// Content type UID of the entry.
    pub content_type_id: String,

    /// Editable-region tags. Present only when live preview is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_metadata: Option<EditMetadata>,
}

impl PageRecord {
    /// Returns a copy of this record carrying the given edit metadata.
    #[must_use]
    pub fn with_edit_metadata(self, edit_metadata: EditMetadata) -> Self {
        Self {
            edit_metadata: Some(edit_metadata),
            ..self
        }
    }

    /// Whether edit metadata is attached.
    pub fn has_edit_metadata(&self) -> bool {
        self.edit_metadata.is_some()
    }
}

/// An image asset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Asset URL.
    pub url: String,
    /// Asset title, used as alt text.
    pub title: String,
}

/// Wrapper mirroring the modular-block shape `{ block: { .. } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWrapper {
    /// The block payload.
    pub block: Block,
}

/// A content block: image, text, and how to lay them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block heading.
    pub title: Option<String>,

    /// Raw HTML body. Untrusted.
    pub copy: Option<String>,

    /// Image placement.
    #[serde(default)]
    pub layout: Layout,

    /// Block image (first edge of the block's image connection).
    pub image: Option<ImageRef>,
}

/// Where a block places its image relative to its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Layout {
    /// Image on the left, text on the right.
    #[default]
    ImageLeft,
    /// Image on the right, text on the left.
    ImageRight,
    /// A layout value this crate does not know, kept verbatim.
    Other(String),
}

impl Layout {
    /// Wire value of this layout.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ImageLeft => "image_left",
            Self::ImageRight => "image_right",
            Self::Other(value) => value,
        }
    }

    /// Renderers put the image first only for `image_left`.
    pub fn is_image_left(&self) -> bool {
        matches!(self, Self::ImageLeft)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Layout {
    fn from(value: String) -> Self {
        match value.as_str() {
            "image_left" => Self::ImageLeft,
            "image_right" => Self::ImageRight,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Layout {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Layout> for String {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}
