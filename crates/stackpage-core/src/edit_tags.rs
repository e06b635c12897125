//! Editable-region metadata for live preview.
//!
//! In preview mode every rendered field carries a `data-cslp` attribute that
//! the preview bridge uses to draw click-to-edit overlays. The attribute value
//! addresses a field as `{content_type}.{uid}.{locale}.{path}`.
//!
//! [`build_edit_metadata`] computes those attributes for a [`PageRecord`] as a
//! separate value; the record itself is left untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Block, PageRecord};

/// Locale used for edit tags. Only a single locale is supported.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Attributes attached to one editable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTag {
    /// Field address understood by the preview bridge.
    #[serde(rename = "data-cslp")]
    pub data_cslp: String,
}

impl EditTag {
    /// Creates a tag with the given `data-cslp` value.
    pub fn new(data_cslp: impl Into<String>) -> Self {
        Self {
            data_cslp: data_cslp.into(),
        }
    }
}

/// Mapping from dotted field path (`title`, `blocks.0.block.copy`) to its tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditMetadata(BTreeMap<String, EditTag>);

impl EditMetadata {
    /// Tag for a field path, if the field was present.
    pub fn get(&self, path: &str) -> Option<&EditTag> {
        self.0.get(path)
    }

    /// Tag for a field inside the block at `index`.
    pub fn block_field(&self, index: usize, field: &str) -> Option<&EditTag> {
        self.get(&format!("blocks.{index}.block.{field}"))
    }

    /// Insert or replace a tag.
    pub fn insert(&mut self, path: impl Into<String>, tag: EditTag) {
        self.0.insert(path.into(), tag);
    }

    /// Number of tagged paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no paths are tagged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(path, tag)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EditTag)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Build edit tags for every present field of `record`.
///
/// Absent (`None`) fields get no tag. Arrays get a tag for the whole field
/// and one per element; nested objects are tagged field by field.
pub fn build_edit_metadata(record: &PageRecord, content_type: &str, locale: &str) -> EditMetadata {
    let mut writer = TagWriter {
        prefix: format!("{content_type}.{}.{locale}", record.uid),
        tags: EditMetadata::default(),
    };

    writer.optional("title", record.title.as_ref());
    writer.optional("description", record.description.as_ref());
    writer.tag("url");
    writer.optional("rich_text", record.rich_text.as_ref());
    if record.image.is_some() {
        writer.image("image");
    }

    writer.tag("blocks");
    for (index, wrapper) in record.blocks.iter().enumerate() {
        let base = format!("blocks.{index}");
        writer.tag(&base);
        writer.block(&format!("{base}.block"), &wrapper.block);
    }

    writer.tags
}

struct TagWriter {
    prefix: String,
    tags: EditMetadata,
}

impl TagWriter {
    fn tag(&mut self, path: &str) {
        let value = format!("{}.{path}", self.prefix);
        self.tags.insert(path, EditTag::new(value));
    }

    fn optional<T>(&mut self, path: &str, field: Option<&T>) {
        if field.is_some() {
            self.tag(path);
        }
    }

    fn image(&mut self, path: &str) {
        self.tag(path);
        self.tag(&format!("{path}.url"));
        self.tag(&format!("{path}.title"));
    }

    fn block(&mut self, path: &str, block: &Block) {
        self.tag(path);
        self.optional(&format!("{path}.title"), block.title.as_ref());
        self.optional(&format!("{path}.copy"), block.copy.as_ref());
        self.tag(&format!("{path}.layout"));
        if block.image.is_some() {
            self.image(&format!("{path}.image"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{BlockWrapper, ImageRef, Layout};

    fn block(title: &str, image: Option<ImageRef>) -> BlockWrapper {
        BlockWrapper {
            block: Block {
                title: Some(title.into()),
                copy: None,
                layout: Layout::ImageLeft,
                image,
            },
        }
    }

    fn record() -> PageRecord {
        PageRecord {
            title: Some("Home".into()),
            description: None,
            url: "/".into(),
            rich_text: Some("<p>Hi</p>".into()),
            image: Some(ImageRef {
                url: "https://images.example/hero.png".into(),
                title: "Hero".into(),
            }),
            blocks: vec![
                block("A", None),
                block(
                    "B",
                    Some(ImageRef {
                        url: "https://images.example/b.png".into(),
                        title: "B".into(),
                    }),
                ),
            ],
            uid: "blt42".into(),
            content_type_id: "page".into(),
            edit_metadata: None,
        }
    }

    #[test]
    fn test_top_level_fields_tagged() {
        let tags = build_edit_metadata(&record(), "page", DEFAULT_LOCALE);
        assert_eq!(tags.get("title").unwrap().data_cslp, "page.blt42.en-us.title");
        assert_eq!(
            tags.get("rich_text").unwrap().data_cslp,
            "page.blt42.en-us.rich_text"
        );
        assert_eq!(
            tags.get("image.url").unwrap().data_cslp,
            "page.blt42.en-us.image.url"
        );
    }

    #[test]
    fn test_absent_fields_not_tagged() {
        let tags = build_edit_metadata(&record(), "page", DEFAULT_LOCALE);
        assert!(tags.get("description").is_none());
        assert!(tags.block_field(0, "copy").is_none());
        assert!(tags.get("blocks.0.block.image").is_none());
    }

    #[test]
    fn test_block_fields_tagged_by_index() {
        let tags = build_edit_metadata(&record(), "page", DEFAULT_LOCALE);
        assert_eq!(tags.get("blocks").unwrap().data_cslp, "page.blt42.en-us.blocks");
        assert_eq!(tags.get("blocks.1").unwrap().data_cslp, "page.blt42.en-us.blocks.1");
        assert_eq!(
            tags.block_field(1, "title").unwrap().data_cslp,
            "page.blt42.en-us.blocks.1.block.title"
        );
        assert_eq!(
            tags.block_field(1, "image.url").unwrap().data_cslp,
            "page.blt42.en-us.blocks.1.block.image.url"
        );
    }

    #[test]
    fn test_record_is_not_modified() {
        let original = record();
        let _ = build_edit_metadata(&original, "page", DEFAULT_LOCALE);
        assert!(original.edit_metadata.is_none());
    }

    #[test]
    fn test_serializes_as_attribute_objects() {
        let mut tags = EditMetadata::default();
        tags.insert("title", EditTag::new("page.x.en-us.title"));
        let value = serde_json::to_value(&tags).unwrap();
        assert_eq!(value["title"]["data-cslp"], "page.x.en-us.title");
    }
}
