//! Flattening of the page query response into a [`PageRecord`].

use stackpage_core::{Block, BlockWrapper, Error, ImageRef, Layout, PageRecord, Result};

use crate::query::{BlockItem, ImageConnection, PageItem, PageQueryData};

/// Normalize the page query `data` into a record.
///
/// Only the first item is used; later matches are dropped. Returns
/// `Ok(None)` when nothing matched. An item without `system.uid` or
/// `system.content_type_uid` is invalid data.
pub fn normalize_page(data: PageQueryData) -> Result<Option<PageRecord>> {
    let items = data
        .all_page
        .and_then(|collection| collection.items)
        .unwrap_or_default();

    if items.len() > 1 {
        tracing::debug!(
            matches = items.len(),
            "multiple pages matched; using the first"
        );
    }

    match items.into_iter().next().flatten() {
        Some(item) => normalize_item(item).map(Some),
        None => Ok(None),
    }
}

fn normalize_item(item: PageItem) -> Result<PageRecord> {
    let system = item
        .system
        .ok_or_else(|| Error::invalid_data("page entry has no system fields"))?;
    let uid = system
        .uid
        .ok_or_else(|| Error::invalid_data("page entry has no system.uid"))?;
    let content_type_id = system
        .content_type_uid
        .ok_or_else(|| Error::invalid_data("page entry has no system.content_type_uid"))?;

    let blocks = item
        .blocks
        .unwrap_or_default()
        .into_iter()
        .map(normalize_block)
        .collect();

    Ok(PageRecord {
        title: item.title,
        description: item.description,
        url: item.url.unwrap_or_default(),
        rich_text: item.rich_text,
        image: first_image(item.image_connection),
        blocks,
        uid,
        content_type_id,
        edit_metadata: None,
    })
}

/// Every list element becomes a block, so indices match the source list.
/// A null entry or a member without a payload yields an empty block.
fn normalize_block(item: Option<BlockItem>) -> BlockWrapper {
    let Some(fields) = item.and_then(|item| {
        if item.block.is_none() {
            tracing::debug!(typename = ?item.typename, "block has no page block payload");
        }
        item.block
    }) else {
        return BlockWrapper {
            block: Block {
                title: None,
                copy: None,
                layout: Layout::default(),
                image: None,
            },
        };
    };

    BlockWrapper {
        block: Block {
            title: fields.title,
            copy: fields.copy,
            layout: fields.layout.map(Layout::from).unwrap_or_default(),
            image: first_image(fields.image_connection),
        },
    }
}

/// The node of edge 0, if the connection has one.
fn first_image(connection: Option<ImageConnection>) -> Option<ImageRef> {
    let node = connection?.edges?.into_iter().next()??.node?;
    Some(ImageRef {
        url: node.url.unwrap_or_default(),
        title: node.title.unwrap_or_default(),
    })
}
