//! Domain model for portfolio content.
//!
//! # Responsibility
//! - Define the content collections and their entry shapes.
//! - Define the ordering contract shared by every list-like collection.
//!
//! # Invariants
//! - Every stored record is identified by a storage-assigned `RecordId`.
//! - Display order within a collection is carried by `sequence` only.

pub mod content;
pub mod entries;
pub mod record;
