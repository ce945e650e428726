//! Drag-to-reorder working list.
//!
//! # Responsibility
//! - Hold the ordered working copy of one collection during admin editing.
//! - Recompute contiguous `sequence` values on every drag-over step.
//! - Persist the dragged record's final rank with one keyed write.
//!
//! # Invariants
//! - After `load`, the list is sorted ascending by `sequence` (stable).
//! - After every applied `drag_over`, `sequence == index + 1` for all items.
//! - `end_drag` issues at most one `SequenceWriter::update_sequence` call,
//!   addressed to the dragged record.
//! - Only the dragged record is persisted; displaced neighbours keep their
//!   stored values until the caller refreshes and reloads.

use crate::model::content::ContentKind;
use crate::model::record::{Orderable, RecordId};
use crate::repo::content_repo::{RepoError, SequenceWriter};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The single write issued by a completed gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceUpdate {
    pub kind: ContentKind,
    pub id: RecordId,
    pub sequence: i64,
}

/// Errors surfaced by `end_drag`.
#[derive(Debug)]
pub enum ReorderError {
    /// The store rejected the sequence write. The working list is left
    /// as-is and may now disagree with storage.
    Persist {
        update: SequenceUpdate,
        source: RepoError,
    },
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist { update, source } => write!(
                f,
                "failed to persist sequence {} for {} entry {}: {source}",
                update.sequence, update.kind, update.id
            ),
        }
    }
}

impl Error for ReorderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist { source, .. } => Some(source),
        }
    }
}

pub type ReorderResult<T> = Result<T, ReorderError>;

/// Working list plus drag state for one collection.
#[derive(Debug)]
pub struct DragSort<T: Orderable> {
    kind: ContentKind,
    items: Vec<T>,
    dragged: Option<RecordId>,
}

impl<T: Orderable> DragSort<T> {
    /// Creates an engine for `kind` with an initial batch.
    pub fn new(kind: ContentKind, records: Vec<T>) -> Self {
        let mut engine = Self {
            kind,
            items: Vec::new(),
            dragged: None,
        };
        engine.load(records);
        engine
    }

    /// Replaces the working list with `records`, sorted by `sequence`.
    ///
    /// Any drag in progress is abandoned.
    pub fn load(&mut self, records: Vec<T>) {
        self.items = records;
        self.items.sort_by_key(|item| item.sequence());
        self.dragged = None;
    }

    /// Collection this engine persists to.
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Current working list.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Id of the record being dragged, if any.
    pub fn dragged_id(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Whether reorder controls apply to this list at all.
    pub fn can_reorder(&self) -> bool {
        self.items.len() > 1
    }

    /// Picks up the record `id`.
    ///
    /// Returns `false` (and sets nothing) when the list has fewer than two
    /// items or `id` is not in the working list.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        if !self.can_reorder() || self.position_of(id).is_none() {
            return false;
        }
        self.dragged = Some(id.to_string());
        true
    }

    /// Moves the dragged record to the target's slot and renumbers.
    ///
    /// The dragged record is removed and reinserted at the index the target
    /// held before the removal. Returns `false` without touching the list
    /// when no drag is active, the target is the dragged record, or either
    /// id is unknown.
    pub fn drag_over(&mut self, target_id: &str) -> bool {
        let Some(dragged) = self.dragged.as_deref() else {
            return false;
        };
        if dragged == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position_of(dragged), self.position_of(target_id))
        else {
            return false;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        renumber(&mut self.items);
        true
    }

    /// Drops the gesture locally without persisting anything.
    ///
    /// The recomputed order stays in the working list until the next `load`.
    pub fn abandon_drag(&mut self) {
        self.dragged = None;
    }

    /// Finishes the gesture and persists the dragged record's sequence.
    ///
    /// Returns `Ok(None)` when no drag was active. On success `refresh` runs
    /// and the issued update is returned. On failure the error is logged and
    /// returned; `refresh` does not run. Drag state is cleared either way.
    pub fn end_drag<W, F>(&mut self, writer: &W, refresh: F) -> ReorderResult<Option<SequenceUpdate>>
    where
        W: SequenceWriter + ?Sized,
        F: FnOnce(),
    {
        let Some(dragged) = self.dragged.take() else {
            return Ok(None);
        };
        let Some(sequence) = self.position_of(&dragged).map(|index| self.items[index].sequence())
        else {
            debug!(
                "event=reorder_persist module=reorder status=skipped kind={} id={}",
                self.kind, dragged
            );
            return Ok(None);
        };

        let update = SequenceUpdate {
            kind: self.kind,
            id: dragged,
            sequence,
        };
        match writer.update_sequence(update.kind, &update.id, update.sequence) {
            Ok(()) => {
                info!(
                    "event=reorder_persist module=reorder status=ok kind={} id={} sequence={}",
                    update.kind, update.id, update.sequence
                );
                refresh();
                Ok(Some(update))
            }
            Err(source) => {
                error!(
                    "event=reorder_persist module=reorder status=error kind={} id={} sequence={} error={}",
                    update.kind, update.id, update.sequence, source
                );
                Err(ReorderError::Persist { update, source })
            }
        }
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.record_id() == id)
    }
}

/// Rewrites `sequence` to `index + 1` across the slice.
pub fn renumber<T: Orderable>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_sequence(index as i64 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: String,
        sequence: i64,
    }

    impl Orderable for Item {
        fn record_id(&self) -> &str {
            &self.id
        }

        fn sequence(&self) -> i64 {
            self.sequence
        }

        fn set_sequence(&mut self, sequence: i64) {
            self.sequence = sequence;
        }
    }

    fn item(id: &str, sequence: i64) -> Item {
        Item {
            id: id.to_string(),
            sequence,
        }
    }

    fn abc() -> DragSort<Item> {
        DragSort::new(
            ContentKind::Experiences,
            vec![item("A", 1), item("B", 2), item("C", 3)],
        )
    }

    fn snapshot(engine: &DragSort<Item>) -> Vec<(String, i64)> {
        engine
            .items()
            .iter()
            .map(|item| (item.id.clone(), item.sequence))
            .collect()
    }

    fn expected(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs
            .iter()
            .map(|(id, sequence)| (id.to_string(), *sequence))
            .collect()
    }

    #[derive(Default)]
    struct RecordingWriter {
        calls: RefCell<Vec<(ContentKind, String, i64)>>,
        fail: bool,
    }

    impl SequenceWriter for RecordingWriter {
        fn update_sequence(
            &self,
            kind: ContentKind,
            id: &str,
            sequence: i64,
        ) -> Result<(), RepoError> {
            self.calls
                .borrow_mut()
                .push((kind, id.to_string(), sequence));
            if self.fail {
                return Err(RepoError::Db(DbError::Sqlite(
                    rusqlite::Error::SqliteFailure(
                        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                        Some("disk I/O error".to_string()),
                    ),
                )));
            }
            Ok(())
        }
    }

    #[test]
    fn load_sorts_by_sequence_and_keeps_ties_stable() {
        let engine = DragSort::new(
            ContentKind::Projects,
            vec![item("x", 3), item("y", 0), item("z", 0), item("w", 1)],
        );
        assert_eq!(
            snapshot(&engine),
            expected(&[("y", 0), ("z", 0), ("w", 1), ("x", 3)])
        );
    }

    #[test]
    fn dragging_first_over_last_moves_it_to_the_end() {
        let mut engine = abc();
        assert!(engine.begin_drag("A"));
        assert!(engine.drag_over("C"));
        assert_eq!(snapshot(&engine), expected(&[("B", 1), ("C", 2), ("A", 3)]));

        let writer = RecordingWriter::default();
        let refreshed = Cell::new(false);
        let update = engine
            .end_drag(&writer, || refreshed.set(true))
            .unwrap()
            .unwrap();

        assert_eq!(update.id, "A");
        assert_eq!(update.sequence, 3);
        assert_eq!(
            *writer.calls.borrow(),
            vec![(ContentKind::Experiences, "A".to_string(), 3)]
        );
        assert!(refreshed.get());
        assert!(!engine.is_dragging());
    }

    #[test]
    fn dragging_up_lands_before_target() {
        let mut engine = abc();
        engine.begin_drag("C");
        engine.drag_over("A");
        assert_eq!(snapshot(&engine), expected(&[("C", 1), ("A", 2), ("B", 3)]));
    }

    #[test]
    fn singleton_list_never_starts_a_drag() {
        let mut engine = DragSort::new(ContentKind::Skills, vec![item("solo", 1)]);
        assert!(!engine.can_reorder());
        assert!(!engine.begin_drag("solo"));
        assert_eq!(engine.dragged_id(), None);

        let writer = RecordingWriter::default();
        assert_eq!(engine.end_drag(&writer, || {}).unwrap(), None);
        assert!(writer.calls.borrow().is_empty());
    }

    #[test]
    fn begin_drag_ignores_unknown_id() {
        let mut engine = abc();
        assert!(!engine.begin_drag("missing"));
        assert!(!engine.is_dragging());
    }

    #[test]
    fn drag_over_self_or_without_drag_is_noop() {
        let mut engine = abc();
        let before = snapshot(&engine);

        assert!(!engine.drag_over("B"));
        assert_eq!(snapshot(&engine), before);

        engine.begin_drag("B");
        assert!(!engine.drag_over("B"));
        assert!(!engine.drag_over("missing"));
        assert_eq!(snapshot(&engine), before);
    }

    #[test]
    fn end_drag_without_drag_issues_no_write() {
        let mut engine = abc();
        let writer = RecordingWriter::default();
        let refreshed = Cell::new(false);

        assert_eq!(engine.end_drag(&writer, || refreshed.set(true)).unwrap(), None);
        assert!(writer.calls.borrow().is_empty());
        assert!(!refreshed.get());
    }

    #[test]
    fn many_drag_over_steps_keep_contiguous_sequences() {
        let records: Vec<Item> = (0..8)
            .map(|index| item(&format!("r{index}"), (index * 10) as i64))
            .collect();
        let mut engine = DragSort::new(ContentKind::AboutItems, records);
        engine.begin_drag("r2");

        for target in ["r7", "r0", "r5", "r5", "r1", "r6", "r3", "r4", "r0"] {
            engine.drag_over(target);
            let sequences: Vec<i64> = engine.items().iter().map(|item| item.sequence).collect();
            assert_eq!(sequences, (1..=8).collect::<Vec<i64>>());
        }
    }

    #[test]
    fn end_drag_persists_only_the_final_position_of_dragged_record() {
        let records: Vec<Item> = (1..=5).map(|index| item(&format!("r{index}"), index)).collect();
        let mut engine = DragSort::new(ContentKind::Projects, records);
        engine.begin_drag("r1");
        for target in ["r2", "r3", "r4", "r3"] {
            engine.drag_over(target);
        }
        let final_sequence = engine
            .items()
            .iter()
            .find(|item| item.id == "r1")
            .map(|item| item.sequence)
            .unwrap();

        let writer = RecordingWriter::default();
        engine.end_drag(&writer, || {}).unwrap();
        assert_eq!(
            *writer.calls.borrow(),
            vec![(ContentKind::Projects, "r1".to_string(), final_sequence)]
        );
    }

    #[test]
    fn failed_write_clears_drag_and_keeps_working_list() {
        let mut engine = abc();
        engine.begin_drag("A");
        engine.drag_over("C");
        let reordered = snapshot(&engine);

        let writer = RecordingWriter {
            fail: true,
            ..RecordingWriter::default()
        };
        let refreshed = Cell::new(false);
        let err = engine
            .end_drag(&writer, || refreshed.set(true))
            .unwrap_err();

        let ReorderError::Persist { update, .. } = &err;
        assert_eq!(update.id, "A");
        assert_eq!(update.sequence, 3);
        assert!(err.to_string().contains("disk I/O error"));
        assert!(!refreshed.get());
        assert!(!engine.is_dragging());
        assert_eq!(snapshot(&engine), reordered);
    }

    #[test]
    fn load_discards_prior_order_and_drag_state() {
        let mut engine = abc();
        engine.begin_drag("A");
        engine.drag_over("C");

        engine.load(vec![item("C", 2), item("A", 1), item("B", 3)]);
        assert!(!engine.is_dragging());
        assert_eq!(snapshot(&engine), expected(&[("A", 1), ("C", 2), ("B", 3)]));

        // A stray drag-over after reload changes nothing.
        assert!(!engine.drag_over("B"));
    }

    #[test]
    fn abandoned_drag_keeps_local_order_without_writing() {
        let mut engine = abc();
        engine.begin_drag("B");
        engine.drag_over("A");
        engine.abandon_drag();

        let writer = RecordingWriter::default();
        assert_eq!(engine.end_drag(&writer, || {}).unwrap(), None);
        assert!(writer.calls.borrow().is_empty());
        assert_eq!(snapshot(&engine), expected(&[("B", 1), ("A", 2), ("C", 3)]));
    }
}
