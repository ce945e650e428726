//! Manual ordering of content collections.
//!
//! # Responsibility
//! - Drive drag-and-drop reordering over an in-memory working list.
//! - Persist through the narrow `SequenceWriter` seam only.

pub mod drag_sort;

pub use drag_sort::{renumber, DragSort, ReorderError, ReorderResult, SequenceUpdate};
