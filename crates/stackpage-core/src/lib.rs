//! Shared types, configuration, and errors for stackpage.
//!
//! This crate provides the foundational types used by the stackpage
//! fetcher and CLI. It performs no network I/O.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: Stack configuration loaded from file and environment
//! - [`endpoints`]: Regional endpoint resolution
//! - [`model`]: The normalized page record
//! - [`edit_tags`]: Editable-region metadata for live preview

pub mod config;
pub mod edit_tags;
pub mod endpoints;
pub mod error;
pub mod model;

// Re-export key types at crate root for convenience
pub use config::StackConfig;
pub use edit_tags::{DEFAULT_LOCALE, EditMetadata, EditTag, build_edit_metadata};
pub use endpoints::{Endpoints, HostOverrides, Region, resolve_endpoints};
pub use error::{Error, GraphqlError, Result};
pub use model::{Block, BlockWrapper, ImageRef, Layout, PageRecord};
