//! "Initialize database" administrative action.
//!
//! # Responsibility
//! - Bring a connection to the current table schema and ordering columns.
//! - Optionally seed default content into collections that are still empty.
//!
//! # Invariants
//! - Repeating the action never duplicates content: only empty tables are seeded.
//! - Seeding is all-or-nothing; a failure rolls every seeded table back.
//! - Evolution failures are reported, not raised, matching `open_db`.

use crate::db::migrations::apply_migrations;
use crate::db::{evolve_content_tables, DbError, EvolutionReport, SqliteSchemaStore};
use crate::model::content::ContentKind;
use crate::model::entries::BlogCategory;
use crate::repo::content_repo::{
    ContentEntity, ContentRepository, RepoError, SqliteContentRepository,
};
use crate::seed;
use crate::service::content_service::{ContentService, ContentServiceError};
use log::{error, info, warn};
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Options for `initialize_database`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Insert default content into empty collections.
    pub seed: bool,
}

/// Summary of one `initialize_database` run.
#[derive(Debug, Default)]
pub struct InitReport {
    pub migrations_applied: usize,
    pub evolution: EvolutionReport,
    /// Collections that received default content, with row counts.
    pub seeded: Vec<(ContentKind, usize)>,
}

impl InitReport {
    pub fn seeded_rows(&self, kind: ContentKind) -> usize {
        self.seeded
            .iter()
            .find(|(seeded_kind, _)| *seeded_kind == kind)
            .map_or(0, |(_, rows)| *rows)
    }
}

#[derive(Debug)]
pub enum InitError {
    Db(DbError),
    Seed(ContentServiceError),
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database initialization failed: {err}"),
            Self::Seed(err) => write!(f, "seeding default content failed: {err}"),
        }
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Seed(err) => Some(err),
        }
    }
}

impl From<DbError> for InitError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for InitError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}

impl From<ContentServiceError> for InitError {
    fn from(value: ContentServiceError) -> Self {
        Self::Seed(value)
    }
}

impl From<RepoError> for InitError {
    fn from(value: RepoError) -> Self {
        Self::Seed(ContentServiceError::from(value))
    }
}

/// Migrates, evolves and optionally seeds the content store.
pub fn initialize_database(
    conn: &mut Connection,
    options: &InitOptions,
) -> Result<InitReport, InitError> {
    info!("event=db_init module=service status=start seed={}", options.seed);

    let result = run_initialize(conn, options);
    match &result {
        Ok(report) => info!(
            "event=db_init module=service status=ok migrations={} evolved={} seeded_tables={}",
            report.migrations_applied,
            report.evolution.added_tables().len(),
            report.seeded.len()
        ),
        Err(err) => error!("event=db_init module=service status=error error={err}"),
    }
    result
}

fn run_initialize(conn: &mut Connection, options: &InitOptions) -> Result<InitReport, InitError> {
    let migrations_applied = apply_migrations(conn)?;
    let evolution = evolve_content_tables(&SqliteSchemaStore::new(conn));
    if !evolution.is_clean() {
        warn!(
            "event=db_init module=service status=degraded failures={}",
            evolution.failures.len()
        );
    }

    let mut report = InitReport {
        migrations_applied,
        evolution,
        seeded: Vec::new(),
    };
    if options.seed {
        let tx = conn.transaction()?;
        report.seeded = {
            let service = ContentService::new(SqliteContentRepository::try_new(&tx)?);
            seed_defaults(&service)?
        };
        tx.commit()?;
    }
    Ok(report)
}

fn seed_defaults<R: ContentRepository>(
    service: &ContentService<R>,
) -> Result<Vec<(ContentKind, usize)>, InitError> {
    let mut seeded = Vec::new();
    let mut record = |kind: ContentKind, rows: usize| {
        if rows > 0 {
            seeded.push((kind, rows));
        }
    };

    record(ContentKind::AboutItems, seed_if_empty(service, seed::about_items())?);
    record(ContentKind::Skills, seed_if_empty(service, seed::skills())?);
    record(ContentKind::Experiences, seed_if_empty(service, seed::experiences())?);
    record(ContentKind::Education, seed_if_empty(service, seed::education())?);
    record(ContentKind::Projects, seed_if_empty(service, seed::projects())?);
    record(
        ContentKind::BlogCategories,
        seed_if_empty(service, seed::blog_categories())?,
    );

    // Posts resolve their category by name, so categories go first.
    if service.repo().count_entries(ContentKind::BlogPosts)? == 0 {
        let category_ids = service
            .list::<BlogCategory>()?
            .into_iter()
            .map(|category| (category.entry.name.to_lowercase(), category.id))
            .collect::<HashMap<_, _>>();

        let mut rows = 0;
        for (category, mut post) in seed::blog_posts() {
            let Some(category_id) = category_ids.get(&category.to_lowercase()) else {
                warn!(
                    "event=db_init module=service status=skip reason=missing_category category={category}"
                );
                continue;
            };
            post.category_id = category_id.clone();
            service.create(&post, None)?;
            rows += 1;
        }
        record(ContentKind::BlogPosts, rows);
    }

    Ok(seeded)
}

fn seed_if_empty<R: ContentRepository, E: ContentEntity>(
    service: &ContentService<R>,
    entries: Vec<E>,
) -> Result<usize, InitError> {
    if service.repo().count_entries(E::KIND)? > 0 {
        return Ok(0);
    }
    for entry in &entries {
        service.create(entry, None)?;
    }
    Ok(entries.len())
}
