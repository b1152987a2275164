//! Embedded JSON document store.
//!
//! This crate provides:
//! - A [`Collection`] of serde documents with snapshot persistence
//! - Duplicate-key and secondary unique-index enforcement
//! - A [`Store`] facade bundling the collections the backend uses
//!
//! Each collection is a keyed map of documents. Mutations are atomic per
//! collection: the write lock is held while the snapshot file is rewritten,
//! so a single-document write either lands fully or not at all. Nothing
//! here spans two collections; callers that need a cross-collection write
//! sequence get no transaction and must document the gap at the call site.
//! Joins are composed by callers out of single-collection reads.

pub mod collection;
pub mod error;
pub mod store;

pub use collection::{Collection, Document};
pub use error::{StoreError, StoreResult};
pub use store::Store;
