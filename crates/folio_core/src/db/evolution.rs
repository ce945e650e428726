//! Idempotent schema evolution for manual-ordering columns.
//!
//! # Responsibility
//! - Ensure every content table carries the `sequence` column.
//! - Backfill a stable initial order when the column is first added.
//! - Keep each table's evolution independent and best-effort.
//!
//! # Invariants
//! - A table that already has the column is never touched (no DDL, no
//!   backfill), so repeated runs leave existing `sequence` values intact.
//! - Column add is idempotent at the DDL level: a concurrent add that wins
//!   the race surfaces as `AlreadyPresent`, not as an error.
//! - Failure on one table never aborts evolution of the others.

use crate::db::{DbError, DbResult};
use crate::model::content::ContentKind;
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Column name used for manual ordering in every content table.
pub const SEQUENCE_COLUMN: &str = "sequence";

/// How a freshly added column is filled for existing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillStrategy {
    /// 1-based row number over the stored order; no ORDER BY is applied.
    RowNumber,
}

/// Describes one column the runner guarantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub table: String,
    pub column: &'static str,
    /// Value new rows get when the insert omits the column.
    pub default: i64,
    pub backfill: BackfillStrategy,
}

impl ColumnDescriptor {
    /// Descriptor for the `sequence` column of `table`.
    pub fn sequence(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: SEQUENCE_COLUMN,
            default: 0,
            backfill: BackfillStrategy::RowNumber,
        }
    }
}

/// Result of an add-column request at the DDL level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAddition {
    Added,
    AlreadyPresent,
}

/// Narrow schema surface the runner needs from a store.
pub trait SchemaStore {
    /// Returns whether `column` exists on `table`.
    fn column_exists(&self, table: &str, column: &str) -> DbResult<bool>;
    /// Adds the described column with its default, tolerating a prior add.
    fn add_column_with_default(&self, descriptor: &ColumnDescriptor) -> DbResult<ColumnAddition>;
    /// Numbers every existing row; returns the number of rows updated.
    fn backfill_row_numbers(&self, descriptor: &ColumnDescriptor) -> DbResult<usize>;
}

/// Per-table outcome of `ensure_sequence_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionOutcome {
    /// Column was already there; nothing ran.
    AlreadyPresent,
    /// Column was added and `backfilled_rows` rows were numbered.
    Added { backfilled_rows: usize },
    /// Introspection missed the column but the add found it: another
    /// process added it first and owns the backfill.
    AddedConcurrently,
    /// Column was added but the backfill failed; rows keep the default.
    BackfillFailed,
}

/// Step at which evolution of one table failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionStage {
    Introspect,
    AddColumn,
}

impl EvolutionStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Introspect => "introspect",
            Self::AddColumn => "add_column",
        }
    }
}

/// Evolution failure for one table.
#[derive(Debug)]
pub struct EvolutionError {
    pub table: String,
    pub stage: EvolutionStage,
    pub source: DbError,
}

impl Display for EvolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "schema evolution failed for `{}` during {}: {}",
            self.table,
            self.stage.as_str(),
            self.source
        )
    }
}

impl Error for EvolutionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

pub type EvolutionResult<T> = Result<T, EvolutionError>;

/// Summary of one evolution pass over several tables.
#[derive(Debug, Default)]
pub struct EvolutionReport {
    /// Tables that evolved (or were already current), in run order.
    pub outcomes: Vec<(String, EvolutionOutcome)>,
    /// Tables whose evolution failed, in run order.
    pub failures: Vec<EvolutionError>,
}

impl EvolutionReport {
    /// True when no table failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Tables that gained the column during this pass.
    pub fn added_tables(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| {
                matches!(
                    outcome,
                    EvolutionOutcome::Added { .. } | EvolutionOutcome::BackfillFailed
                )
            })
            .map(|(table, _)| table.as_str())
            .collect()
    }

    /// Outcome recorded for `table`, if it evolved without failure.
    pub fn outcome_for(&self, table: &str) -> Option<EvolutionOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, outcome)| *outcome)
    }
}

/// Ensures `table` has a `sequence` column, backfilling on first add.
///
/// # Errors
/// - Returns an error when introspection or the column add fails.
///   Backfill failure is logged and reported as `BackfillFailed` instead.
pub fn ensure_sequence_column<S>(store: &S, table: &str) -> EvolutionResult<EvolutionOutcome>
where
    S: SchemaStore + ?Sized,
{
    let descriptor = ColumnDescriptor::sequence(table);

    let exists = store
        .column_exists(table, descriptor.column)
        .map_err(|source| EvolutionError {
            table: table.to_string(),
            stage: EvolutionStage::Introspect,
            source,
        })?;
    if exists {
        return Ok(EvolutionOutcome::AlreadyPresent);
    }

    let addition = store
        .add_column_with_default(&descriptor)
        .map_err(|source| EvolutionError {
            table: table.to_string(),
            stage: EvolutionStage::AddColumn,
            source,
        })?;
    if addition == ColumnAddition::AlreadyPresent {
        info!(
            "event=schema_evolve module=db status=ok table={} column={} result=added_concurrently",
            table, descriptor.column
        );
        return Ok(EvolutionOutcome::AddedConcurrently);
    }

    match store.backfill_row_numbers(&descriptor) {
        Ok(rows) => {
            info!(
                "event=schema_evolve module=db status=ok table={} column={} result=added backfilled_rows={}",
                table, descriptor.column, rows
            );
            Ok(EvolutionOutcome::Added {
                backfilled_rows: rows,
            })
        }
        Err(err) => {
            warn!(
                "event=schema_evolve module=db status=degraded table={} column={} result=backfill_failed error={}",
                table, descriptor.column, err
            );
            Ok(EvolutionOutcome::BackfillFailed)
        }
    }
}

/// Runs `ensure_sequence_column` for each table, independently.
pub fn evolve_tables<'a, S, I>(store: &S, tables: I) -> EvolutionReport
where
    S: SchemaStore + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut report = EvolutionReport::default();
    for table in tables {
        match ensure_sequence_column(store, table) {
            Ok(outcome) => report.outcomes.push((table.to_string(), outcome)),
            Err(err) => {
                error!(
                    "event=schema_evolve module=db status=error table={} stage={} error={}",
                    err.table,
                    err.stage.as_str(),
                    err.source
                );
                report.failures.push(err);
            }
        }
    }
    report
}

/// Runs evolution over every content table in bootstrap order.
pub fn evolve_content_tables<S>(store: &S) -> EvolutionReport
where
    S: SchemaStore + ?Sized,
{
    evolve_tables(store, ContentKind::ALL.iter().map(|kind| kind.table()))
}

/// SQLite implementation of `SchemaStore`.
pub struct SqliteSchemaStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSchemaStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SchemaStore for SqliteSchemaStore<'_> {
    fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        table_has_column(self.conn, table, column)
    }

    fn add_column_with_default(&self, descriptor: &ColumnDescriptor) -> DbResult<ColumnAddition> {
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} INTEGER NOT NULL DEFAULT {};",
            quote_identifier(&descriptor.table),
            quote_identifier(descriptor.column),
            descriptor.default
        );
        match self.conn.execute(&sql, []) {
            Ok(_) => Ok(ColumnAddition::Added),
            Err(err) if is_duplicate_column(&err) => Ok(ColumnAddition::AlreadyPresent),
            Err(err) => Err(err.into()),
        }
    }

    fn backfill_row_numbers(&self, descriptor: &ColumnDescriptor) -> DbResult<usize> {
        let table = quote_identifier(&descriptor.table);
        let column = quote_identifier(descriptor.column);
        let sql = match descriptor.backfill {
            BackfillStrategy::RowNumber => format!(
                "WITH indexed_rows AS (
                    SELECT id, ROW_NUMBER() OVER () AS row_num
                    FROM {table}
                )
                UPDATE {table}
                SET {column} = indexed_rows.row_num
                FROM indexed_rows
                WHERE {table}.id = indexed_rows.id;"
            ),
        };
        Ok(self.conn.execute(&sql, [])?)
    }
}

/// Returns whether `table` has `column`, via `PRAGMA table_info`.
pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", quote_identifier(table)))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns whether a table named `table` exists.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            message.contains("duplicate column name")
        }
        _ => false,
    }
}
