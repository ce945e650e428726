//! Content repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over every content collection through one generic surface.
//! - Provide the single-row sequence write the reorder engine persists with.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Entry::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Lists are deterministic: `sequence ASC, created_at ASC, rowid ASC`.
//! - Timestamps are epoch milliseconds taken from the process clock.
//! - Repositories only accept connections whose content tables carry the
//!   `sequence` column.

use crate::db::evolution::{table_exists, table_has_column, SEQUENCE_COLUMN};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::content::ContentKind;
use crate::model::entries::{BlogPost, ContentValidationError, Entry};
use crate::model::record::{RecordId, Stored};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Params, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

// Ties on `date` fall back to manual order, then insertion order.
const POST_DATE_ORDER: &str = "ORDER BY date DESC, sequence ASC, rowid ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for content persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entry failed field validation.
    Validation(ContentValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No row with `id` exists in the collection.
    NotFound { kind: ContentKind, id: RecordId },
    /// Persisted data cannot be converted to a valid entry.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} entry not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted content: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "content repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "content repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "content repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContentValidationError> for RepoError {
    fn from(value: ContentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row mapping for one entry type.
pub trait ContentEntity: Entry {
    /// Domain columns in bind order, excluding `id`, `sequence` and timestamps.
    const COLUMNS: &'static [&'static str];

    /// Values for `COLUMNS`, in the same order.
    fn to_values(&self) -> RepoResult<Vec<Value>>;

    /// Reads the domain columns from a row selected with `COLUMNS`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Single-row keyed sequence update.
pub trait SequenceWriter {
    /// Sets `sequence` on the row `id` of `kind`.
    fn update_sequence(&self, kind: ContentKind, id: &str, sequence: i64) -> RepoResult<()>;
}

/// Repository interface for content CRUD and ordering.
pub trait ContentRepository: SequenceWriter {
    fn create_entry<E: ContentEntity>(&self, entry: &E, sequence: i64) -> RepoResult<Stored<E>>;
    fn get_entry<E: ContentEntity>(&self, id: &str) -> RepoResult<Option<Stored<E>>>;
    fn list_entries<E: ContentEntity>(&self) -> RepoResult<Vec<Stored<E>>>;
    fn update_entry<E: ContentEntity>(&self, id: &str, entry: &E) -> RepoResult<Stored<E>>;
    fn delete_entry(&self, kind: ContentKind, id: &str) -> RepoResult<()>;
    fn entry_exists(&self, kind: ContentKind, id: &str) -> RepoResult<bool>;
    fn count_entries(&self, kind: ContentKind) -> RepoResult<u64>;
    /// `MAX(sequence) + 1`, or 1 for an empty collection.
    fn next_sequence(&self, kind: ContentKind) -> RepoResult<i64>;
    /// Moves one row to `target`, shifting the rows in between by one.
    ///
    /// Returns the applied sequence after clamping to the current range.
    fn move_to_sequence(&self, kind: ContentKind, id: &str, target: i64) -> RepoResult<i64>;
    /// Every blog post, newest `date` first.
    fn list_posts_by_date(&self) -> RepoResult<Vec<Stored<BlogPost>>>;
    /// Blog posts filed under `category_id`, newest `date` first.
    fn list_posts_by_category(&self, category_id: &str) -> RepoResult<Vec<Stored<BlogPost>>>;
}

/// SQLite-backed content repository.
pub struct SqliteContentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    /// Creates repository from a migrated and evolved connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_content_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_entries<E: ContentEntity, P: Params>(
        &self,
        clause: &str,
        params: P,
    ) -> RepoResult<Vec<Stored<E>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} {clause};", select_sql::<E>()))?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_stored_row(row)?);
        }
        Ok(items)
    }
}

impl SequenceWriter for SqliteContentRepository<'_> {
    fn update_sequence(&self, kind: ContentKind, id: &str, sequence: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET sequence = ?2,
                     updated_at = ?3
                 WHERE id = ?1;",
                kind.table()
            ),
            params![id, sequence, now_ms()],
        )?;
        if changed == 0 {
            return Err(not_found(kind, id));
        }
        Ok(())
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn create_entry<E: ContentEntity>(&self, entry: &E, sequence: i64) -> RepoResult<Stored<E>> {
        entry.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = now_ms();
        let mut values = vec![
            Value::Text(id.clone()),
            Value::Integer(sequence),
            Value::Integer(now),
            Value::Integer(now),
        ];
        values.extend(entry.to_values()?);

        let placeholders = vec!["?"; values.len()].join(", ");
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, sequence, created_at, updated_at, {}) VALUES ({placeholders});",
                E::KIND.table(),
                E::COLUMNS.join(", ")
            ),
            params_from_iter(values),
        )?;

        self.get_entry::<E>(&id)?
            .ok_or_else(|| RepoError::InvalidData(format!("row {id} vanished after insert")))
    }

    fn get_entry<E: ContentEntity>(&self, id: &str) -> RepoResult<Option<Stored<E>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1;", select_sql::<E>()))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_stored_row(row)?));
        }
        Ok(None)
    }

    fn list_entries<E: ContentEntity>(&self) -> RepoResult<Vec<Stored<E>>> {
        self.query_entries("ORDER BY sequence ASC, created_at ASC, rowid ASC", [])
    }

    fn list_posts_by_date(&self) -> RepoResult<Vec<Stored<BlogPost>>> {
        self.query_entries(POST_DATE_ORDER, [])
    }

    fn list_posts_by_category(&self, category_id: &str) -> RepoResult<Vec<Stored<BlogPost>>> {
        self.query_entries(
            &format!("WHERE category_id = ?1 {POST_DATE_ORDER}"),
            [category_id],
        )
    }

    fn update_entry<E: ContentEntity>(&self, id: &str, entry: &E) -> RepoResult<Stored<E>> {
        entry.validate()?;

        let assignments = E::COLUMNS
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut values = entry.to_values()?;
        values.push(Value::Integer(now_ms()));
        values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET {assignments},
                     updated_at = ?
                 WHERE id = ?;",
                E::KIND.table()
            ),
            params_from_iter(values),
        )?;
        if changed == 0 {
            return Err(not_found(E::KIND, id));
        }

        self.get_entry::<E>(id)?.ok_or_else(|| not_found(E::KIND, id))
    }

    fn delete_entry(&self, kind: ContentKind, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", kind.table()),
            [id],
        )?;
        if changed == 0 {
            return Err(not_found(kind, id));
        }
        Ok(())
    }

    fn entry_exists(&self, kind: ContentKind, id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
                kind.table()
            ),
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_entries(&self, kind: ContentKind) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", kind.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn next_sequence(&self, kind: ContentKind) -> RepoResult<i64> {
        let next = self.conn.query_row(
            &format!(
                "SELECT COALESCE(MAX(sequence), 0) + 1 FROM {};",
                kind.table()
            ),
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn move_to_sequence(&self, kind: ContentKind, id: &str, target: i64) -> RepoResult<i64> {
        let table = kind.table();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let current: Option<i64> = tx
            .query_row(
                &format!("SELECT sequence FROM {table} WHERE id = ?1;"),
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let current = current.ok_or_else(|| not_found(kind, id))?;

        let (min_seq, max_seq): (i64, i64) = tx.query_row(
            &format!("SELECT MIN(sequence), MAX(sequence) FROM {table};"),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let applied = target.clamp(min_seq, max_seq);
        let now = now_ms();

        if current < applied {
            tx.execute(
                &format!(
                    "UPDATE {table}
                     SET sequence = sequence - 1,
                         updated_at = ?3
                     WHERE sequence > ?1 AND sequence <= ?2;"
                ),
                params![current, applied, now],
            )?;
        } else if current > applied {
            tx.execute(
                &format!(
                    "UPDATE {table}
                     SET sequence = sequence + 1,
                         updated_at = ?3
                     WHERE sequence >= ?1 AND sequence < ?2;"
                ),
                params![applied, current, now],
            )?;
        }

        tx.execute(
            &format!(
                "UPDATE {table}
                 SET sequence = ?2,
                     updated_at = ?3
                 WHERE id = ?1;"
            ),
            params![id, applied, now],
        )?;

        tx.commit()?;
        Ok(applied)
    }
}

fn select_sql<E: ContentEntity>() -> String {
    format!(
        "SELECT id, sequence, created_at, updated_at, {} FROM {}",
        E::COLUMNS.join(", "),
        E::KIND.table()
    )
}

fn parse_stored_row<E: ContentEntity>(row: &Row<'_>) -> RepoResult<Stored<E>> {
    let entry = E::from_row(row)?;
    entry.validate().map_err(|err| {
        RepoError::InvalidData(format!("{} row fails validation: {err}", E::KIND))
    })?;

    Ok(Stored {
        id: row.get("id")?,
        sequence: row.get("sequence")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        entry,
    })
}

/// Epoch milliseconds from the process clock.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn not_found(kind: ContentKind, id: &str) -> RepoError {
    RepoError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn ensure_content_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for kind in ContentKind::ALL {
        let table = kind.table();
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in ["id", SEQUENCE_COLUMN, "created_at", "updated_at"] {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}
