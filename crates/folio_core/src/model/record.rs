//! Orderable record contract and the stored-row envelope.
//!
//! # Responsibility
//! - Define the minimal shape the reorder engine needs from any record.
//! - Carry storage-assigned identity and timestamps around domain entries.
//!
//! # Invariants
//! - `id` is assigned by the storage layer at creation and never changes.
//! - Lower `sequence` sorts first; ties are tolerated at rest.

use serde::{Deserialize, Serialize};

/// Opaque record identifier assigned by the storage layer.
pub type RecordId = String;

/// A record participating in manual ordering within one collection.
pub trait Orderable {
    /// Stable identifier used to address the record in storage.
    fn record_id(&self) -> &str;
    /// Current rank within the collection.
    fn sequence(&self) -> i64;
    /// Overwrites the in-memory rank.
    fn set_sequence(&mut self, sequence: i64);
}

/// One persisted row: storage metadata plus the domain entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<E> {
    pub id: RecordId,
    pub sequence: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
    #[serde(flatten)]
    pub entry: E,
}

impl<E> Orderable for Stored<E> {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn sequence(&self) -> i64 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: i64) {
        self.sequence = sequence;
    }
}

#[cfg(test)]
mod tests {
    use super::Stored;
    use crate::model::entries::Skill;

    #[test]
    fn stored_serializes_entry_fields_inline() {
        let stored = Stored {
            id: "s1".to_string(),
            sequence: 2,
            created_at: 10,
            updated_at: 20,
            entry: Skill {
                name: "Rust".to_string(),
                icon: "SiRust".to_string(),
            },
        };

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "s1",
                "sequence": 2,
                "created_at": 10,
                "updated_at": 20,
                "name": "Rust",
                "icon": "SiRust"
            })
        );
    }
}
