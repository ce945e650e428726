//! Portfolio content entries.
//!
//! # Responsibility
//! - Define the domain fields of every content collection.
//! - Validate entries before they reach persistence.
//!
//! # Invariants
//! - Required text fields are non-blank after trim.
//! - Optional link fields, when set, are absolute `http`/`https` URLs or
//!   site-root paths such as `/blog/cover.jpg`.
//! - List fields never contain blank values.

use super::content::ContentKind;
use super::record::Stored;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://[^\s/?#]+|/[^/\s])[^\s]*$").expect("valid link regex")
});
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

/// Validation failures for content entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    /// A required field is empty after trim.
    BlankField(&'static str),
    /// A link field is neither an http(s) URL nor a site-root path.
    InvalidUrl { field: &'static str, value: String },
    /// A date field is not `YYYY-MM-DD`.
    InvalidDate { field: &'static str, value: String },
    /// A list field holds an empty value at `index`.
    BlankListItem { field: &'static str, index: usize },
}

impl Display for ContentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidUrl { field, value } => {
                write!(f, "`{field}` must be an http(s) URL or /path, got `{value}`")
            }
            Self::InvalidDate { field, value } => {
                write!(f, "`{field}` must be YYYY-MM-DD, got `{value}`")
            }
            Self::BlankListItem { field, index } => {
                write!(f, "`{field}[{index}]` must not be blank")
            }
        }
    }
}

impl Error for ContentValidationError {}

/// Domain entry stored in one content collection.
pub trait Entry: Clone {
    /// Collection this entry type lives in.
    const KIND: ContentKind;

    /// Checks field-level invariants.
    fn validate(&self) -> Result<(), ContentValidationError>;

    /// Row in another collection this entry points at, if any.
    fn reference(&self) -> Option<(ContentKind, &str)> {
        None
    }
}

/// Highlight card in the about section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutItem {
    pub title: String,
    pub content: String,
    /// Icon key resolved by the presentation layer.
    pub icon: String,
}

/// One skill badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub icon: String,
}

/// Work history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub logo: Option<String>,
    pub position: String,
    /// Free-form display period, e.g. `Jan 2021 - Present`.
    pub period: String,
    pub description: String,
    pub skills: Vec<String>,
}

/// Education history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub university: String,
    pub logo: Option<String>,
    pub degree: String,
    pub period: String,
    pub cgpa: String,
    pub subjects: Vec<String>,
    pub description: String,
}

/// Showcased project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub skills: Vec<String>,
    pub github: Option<String>,
    pub live: Option<String>,
}

/// Blog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogCategory {
    pub name: String,
    pub icon: String,
}

/// Blog post. `content` is markdown and stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    pub author: String,
    pub author_image: Option<String>,
    /// Id of the owning `blog_categories` row.
    pub category_id: String,
    /// Display hint such as `8 min read`.
    pub read_time: String,
}

/// Blog post read together with its owning category.
///
/// `category` is `None` only when the referenced row is gone, which the
/// foreign key prevents on connections opened through `open_db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostView {
    #[serde(flatten)]
    pub post: Stored<BlogPost>,
    pub category: Option<Stored<BlogCategory>>,
}

impl Entry for AboutItem {
    const KIND: ContentKind = ContentKind::AboutItems;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        require("icon", &self.icon)
    }
}

impl Entry for Skill {
    const KIND: ContentKind = ContentKind::Skills;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("name", &self.name)?;
        require("icon", &self.icon)
    }
}

impl Entry for Experience {
    const KIND: ContentKind = ContentKind::Experiences;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("company", &self.company)?;
        optional_url("logo", self.logo.as_deref())?;
        require("position", &self.position)?;
        require("period", &self.period)?;
        require("description", &self.description)?;
        require_items("skills", &self.skills)
    }
}

impl Entry for Education {
    const KIND: ContentKind = ContentKind::Education;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("university", &self.university)?;
        optional_url("logo", self.logo.as_deref())?;
        require("degree", &self.degree)?;
        require("period", &self.period)?;
        require("cgpa", &self.cgpa)?;
        require_items("subjects", &self.subjects)?;
        require("description", &self.description)
    }
}

impl Entry for Project {
    const KIND: ContentKind = ContentKind::Projects;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("name", &self.name)?;
        require("description", &self.description)?;
        optional_url("image", self.image.as_deref())?;
        require_items("skills", &self.skills)?;
        optional_url("github", self.github.as_deref())?;
        optional_url("live", self.live.as_deref())
    }
}

impl Entry for BlogCategory {
    const KIND: ContentKind = ContentKind::BlogCategories;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("name", &self.name)?;
        require("icon", &self.icon)
    }
}

impl Entry for BlogPost {
    const KIND: ContentKind = ContentKind::BlogPosts;

    fn validate(&self) -> Result<(), ContentValidationError> {
        require("title", &self.title)?;
        require("excerpt", &self.excerpt)?;
        optional_url("image", self.image.as_deref())?;
        if !ISO_DATE_RE.is_match(self.date.trim()) {
            return Err(ContentValidationError::InvalidDate {
                field: "date",
                value: self.date.clone(),
            });
        }
        require("author", &self.author)?;
        optional_url("author_image", self.author_image.as_deref())?;
        require("category_id", &self.category_id)?;
        require("read_time", &self.read_time)
    }

    fn reference(&self) -> Option<(ContentKind, &str)> {
        Some((ContentKind::BlogCategories, self.category_id.as_str()))
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ContentValidationError> {
    if value.trim().is_empty() {
        return Err(ContentValidationError::BlankField(field));
    }
    Ok(())
}

// Empty strings count as unset; the admin forms submit "" for cleared links.
fn optional_url(field: &'static str, value: Option<&str>) -> Result<(), ContentValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(()),
        Some(url) if LINK_RE.is_match(url) => Ok(()),
        Some(url) => Err(ContentValidationError::InvalidUrl {
            field,
            value: url.to_string(),
        }),
    }
}

fn require_items(field: &'static str, values: &[String]) -> Result<(), ContentValidationError> {
    match values.iter().position(|value| value.trim().is_empty()) {
        Some(index) => Err(ContentValidationError::BlankListItem { field, index }),
        None => Ok(()),
    }
}
