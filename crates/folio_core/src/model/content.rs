//! Content collection catalog.
//!
//! # Responsibility
//! - Name every content table the portfolio stores.
//! - Provide the fixed evolution/bootstrap order.
//!
//! # Invariants
//! - `ContentKind::ALL` order is stable; schema evolution and seeding walk it
//!   front to back.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One content collection, backed by exactly one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    AboutItems,
    Skills,
    Experiences,
    Education,
    Projects,
    BlogCategories,
    BlogPosts,
}

impl ContentKind {
    /// Every content collection, in bootstrap order.
    pub const ALL: [ContentKind; 7] = [
        ContentKind::AboutItems,
        ContentKind::Skills,
        ContentKind::Experiences,
        ContentKind::Education,
        ContentKind::Projects,
        ContentKind::BlogCategories,
        ContentKind::BlogPosts,
    ];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::AboutItems => "about_items",
            Self::Skills => "skills",
            Self::Experiences => "experiences",
            Self::Education => "education",
            Self::Projects => "projects",
            Self::BlogCategories => "blog_categories",
            Self::BlogPosts => "blog_posts",
        }
    }

    /// Resolves a table name back to its collection.
    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.table() == table)
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Error returned when a string names no known collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownContentKind(pub String);

impl Display for UnknownContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown content collection `{}`", self.0)
    }
}

impl std::error::Error for UnknownContentKind {}

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::from_table(normalized.as_str()).ok_or_else(|| UnknownContentKind(value.to_string()))
    }
}
