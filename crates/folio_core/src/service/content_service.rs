//! Content use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete entry points for admin callers.
//! - Assign initial `sequence` values and check cross-collection references.
//! - Hand out reorder sessions pre-loaded with the canonical list.
//! - Serve blog posts joined with their category, newest first.
//!
//! # Invariants
//! - New entries without an explicit sequence sort after every existing entry.
//! - An entry's referenced row must exist before the entry is written.
//! - Service APIs never bypass repository validation/persistence contracts.

use crate::model::content::ContentKind;
use crate::model::entries::{BlogCategory, BlogPost, BlogPostView, ContentValidationError};
use crate::model::record::{RecordId, Stored};
use crate::reorder::DragSort;
use crate::repo::content_repo::{
    ContentEntity, ContentRepository, RepoError, RepoResult, SequenceWriter,
};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from content service operations.
#[derive(Debug)]
pub enum ContentServiceError {
    /// Entry failed field validation.
    InvalidEntry(ContentValidationError),
    /// Target entry does not exist.
    EntryNotFound { kind: ContentKind, id: RecordId },
    /// Entry points at a row that does not exist.
    MissingReference { kind: ContentKind, id: RecordId },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ContentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntry(err) => write!(f, "invalid entry: {err}"),
            Self::EntryNotFound { kind, id } => write!(f, "{kind} entry not found: {id}"),
            Self::MissingReference { kind, id } => {
                write!(f, "referenced {kind} entry does not exist: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEntry(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::EntryNotFound { kind, id },
            RepoError::Validation(err) => Self::InvalidEntry(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ContentValidationError> for ContentServiceError {
    fn from(value: ContentValidationError) -> Self {
        Self::InvalidEntry(value)
    }
}

pub type ContentServiceResult<T> = Result<T, ContentServiceError>;

/// Content service facade.
pub struct ContentService<R: ContentRepository> {
    repo: R,
}

impl<R: ContentRepository> ContentService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one entry at `sequence`, or after the last entry when `None`.
    pub fn create<E: ContentEntity>(
        &self,
        entry: &E,
        sequence: Option<i64>,
    ) -> ContentServiceResult<Stored<E>> {
        entry.validate()?;
        self.ensure_reference_exists(entry)?;

        let sequence = match sequence {
            Some(value) => value,
            None => self.repo.next_sequence(E::KIND)?,
        };
        self.repo.create_entry(entry, sequence).map_err(Into::into)
    }

    /// Loads one entry by id.
    pub fn get<E: ContentEntity>(&self, id: &str) -> ContentServiceResult<Stored<E>> {
        self.repo
            .get_entry::<E>(id)?
            .ok_or_else(|| ContentServiceError::EntryNotFound {
                kind: E::KIND,
                id: id.to_string(),
            })
    }

    /// Lists a collection in display order.
    pub fn list<E: ContentEntity>(&self) -> ContentServiceResult<Vec<Stored<E>>> {
        self.repo.list_entries::<E>().map_err(Into::into)
    }

    /// Replaces the domain fields of one entry. `sequence` is untouched.
    pub fn update<E: ContentEntity>(&self, id: &str, entry: &E) -> ContentServiceResult<Stored<E>> {
        entry.validate()?;
        self.ensure_reference_exists(entry)?;
        self.repo.update_entry(id, entry).map_err(Into::into)
    }

    /// Deletes one entry.
    pub fn delete(&self, kind: ContentKind, id: &str) -> ContentServiceResult<()> {
        self.repo.delete_entry(kind, id).map_err(Into::into)
    }

    /// Moves one entry to `target`, shifting the entries in between.
    ///
    /// Returns the applied sequence after clamping.
    pub fn move_to_sequence(
        &self,
        kind: ContentKind,
        id: &str,
        target: i64,
    ) -> ContentServiceResult<i64> {
        self.repo
            .move_to_sequence(kind, id, target)
            .map_err(Into::into)
    }

    /// Every blog post with its category, newest `date` first.
    pub fn blog_posts(&self) -> ContentServiceResult<Vec<BlogPostView>> {
        let posts = self.repo.list_posts_by_date()?;
        self.attach_categories(posts)
    }

    /// Blog posts filed under `category_id` with their category, newest first.
    ///
    /// An unknown category yields an empty list.
    pub fn posts_by_category(&self, category_id: &str) -> ContentServiceResult<Vec<BlogPostView>> {
        let posts = self.repo.list_posts_by_category(category_id)?;
        self.attach_categories(posts)
    }

    /// One blog post with its category.
    pub fn blog_post(&self, id: &str) -> ContentServiceResult<BlogPostView> {
        let post = self.get::<BlogPost>(id)?;
        let mut views = self.attach_categories(vec![post])?;
        views.pop().ok_or_else(|| ContentServiceError::EntryNotFound {
            kind: ContentKind::BlogPosts,
            id: id.to_string(),
        })
    }

    /// Starts a reorder session loaded with the current list.
    pub fn reorder_session<E: ContentEntity>(
        &self,
    ) -> ContentServiceResult<DragSort<Stored<E>>> {
        Ok(DragSort::new(E::KIND, self.list::<E>()?))
    }

    /// Reloads `session` from storage, abandoning any drag in progress.
    pub fn refresh_session<E: ContentEntity>(
        &self,
        session: &mut DragSort<Stored<E>>,
    ) -> ContentServiceResult<()> {
        session.load(self.list::<E>()?);
        Ok(())
    }

    /// Borrow the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn attach_categories(
        &self,
        posts: Vec<Stored<BlogPost>>,
    ) -> ContentServiceResult<Vec<BlogPostView>> {
        let mut categories = HashMap::new();
        for post in &posts {
            let category_id = post.entry.category_id.as_str();
            if !categories.contains_key(category_id) {
                let category = self.repo.get_entry::<BlogCategory>(category_id)?;
                categories.insert(category_id.to_string(), category);
            }
        }

        Ok(posts
            .into_iter()
            .map(|post| {
                let category = categories.get(&post.entry.category_id).cloned().flatten();
                BlogPostView { post, category }
            })
            .collect())
    }

    fn ensure_reference_exists<E: ContentEntity>(&self, entry: &E) -> ContentServiceResult<()> {
        if let Some((kind, id)) = entry.reference() {
            if !self.repo.entry_exists(kind, id)? {
                return Err(ContentServiceError::MissingReference {
                    kind,
                    id: id.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<R: ContentRepository> SequenceWriter for ContentService<R> {
    fn update_sequence(&self, kind: ContentKind, id: &str, sequence: i64) -> RepoResult<()> {
        self.repo.update_sequence(kind, id, sequence)
    }
}
