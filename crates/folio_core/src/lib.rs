//! Content store for a personal portfolio site.
//! Owns the content tables, their manual ordering and schema evolution.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{default_log_level, ConfigError, FolioConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, EvolutionOutcome, EvolutionReport};
pub use logging::{init_logging, LoggingError, LoggingOutcome};
pub use model::content::{ContentKind, UnknownContentKind};
pub use model::entries::{
    AboutItem, BlogCategory, BlogPost, BlogPostView, ContentValidationError, Education, Entry,
    Experience, Project, Skill,
};
pub use model::record::{Orderable, RecordId, Stored};
pub use reorder::{DragSort, ReorderError, ReorderResult, SequenceUpdate};
pub use repo::content_repo::{
    ContentEntity, ContentRepository, RepoError, RepoResult, SequenceWriter,
    SqliteContentRepository,
};
pub use service::bootstrap::{initialize_database, InitError, InitOptions, InitReport};
pub use service::content_service::{ContentService, ContentServiceError, ContentServiceResult};

/// Minimal health-check API for operators.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
