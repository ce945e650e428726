//! Column mappings between content entries and SQLite rows.
//!
//! List fields are stored as JSON text arrays. Blank optional links are
//! stored as NULL and read back as `None`.

use super::content_repo::{ContentEntity, RepoError, RepoResult};
use crate::model::entries::{
    AboutItem, BlogCategory, BlogPost, Education, Entry, Experience, Project, Skill,
};
use rusqlite::types::Value;
use rusqlite::Row;

impl ContentEntity for AboutItem {
    const COLUMNS: &'static [&'static str] = &["title", "content", "icon"];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![
            text(&self.title),
            text(&self.content),
            text(&self.icon),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            title: row.get("title")?,
            content: row.get("content")?,
            icon: row.get("icon")?,
        })
    }
}

impl ContentEntity for Skill {
    const COLUMNS: &'static [&'static str] = &["name", "icon"];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![text(&self.name), text(&self.icon)])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            name: row.get("name")?,
            icon: row.get("icon")?,
        })
    }
}

impl ContentEntity for Experience {
    const COLUMNS: &'static [&'static str] = &[
        "company",
        "logo",
        "position",
        "period",
        "description",
        "skills",
    ];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![
            text(&self.company),
            optional_text(self.logo.as_deref()),
            text(&self.position),
            text(&self.period),
            text(&self.description),
            string_list(&self.skills)?,
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            company: row.get("company")?,
            logo: row.get("logo")?,
            position: row.get("position")?,
            period: row.get("period")?,
            description: row.get("description")?,
            skills: parse_string_list::<Self>(row, "skills")?,
        })
    }
}

impl ContentEntity for Education {
    const COLUMNS: &'static [&'static str] = &[
        "university",
        "logo",
        "degree",
        "period",
        "cgpa",
        "subjects",
        "description",
    ];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![
            text(&self.university),
            optional_text(self.logo.as_deref()),
            text(&self.degree),
            text(&self.period),
            text(&self.cgpa),
            string_list(&self.subjects)?,
            text(&self.description),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            university: row.get("university")?,
            logo: row.get("logo")?,
            degree: row.get("degree")?,
            period: row.get("period")?,
            cgpa: row.get("cgpa")?,
            subjects: parse_string_list::<Self>(row, "subjects")?,
            description: row.get("description")?,
        })
    }
}

impl ContentEntity for Project {
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "image", "skills", "github", "live"];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![
            text(&self.name),
            text(&self.description),
            optional_text(self.image.as_deref()),
            string_list(&self.skills)?,
            optional_text(self.github.as_deref()),
            optional_text(self.live.as_deref()),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            name: row.get("name")?,
            description: row.get("description")?,
            image: row.get("image")?,
            skills: parse_string_list::<Self>(row, "skills")?,
            github: row.get("github")?,
            live: row.get("live")?,
        })
    }
}

impl ContentEntity for BlogCategory {
    const COLUMNS: &'static [&'static str] = &["name", "icon"];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![text(&self.name), text(&self.icon)])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            name: row.get("name")?,
            icon: row.get("icon")?,
        })
    }
}

impl ContentEntity for BlogPost {
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "excerpt",
        "content",
        "image",
        "date",
        "author",
        "author_image",
        "category_id",
        "read_time",
    ];

    fn to_values(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![
            text(&self.title),
            text(&self.excerpt),
            Value::Text(self.content.clone()),
            optional_text(self.image.as_deref()),
            text(&self.date),
            text(&self.author),
            optional_text(self.author_image.as_deref()),
            text(&self.category_id),
            text(&self.read_time),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            title: row.get("title")?,
            excerpt: row.get("excerpt")?,
            content: row.get("content")?,
            image: row.get("image")?,
            date: row.get("date")?,
            author: row.get("author")?,
            author_image: row.get("author_image")?,
            category_id: row.get("category_id")?,
            read_time: row.get("read_time")?,
        })
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.trim().to_string())
}

fn optional_text(value: Option<&str>) -> Value {
    match value.map(str::trim) {
        None | Some("") => Value::Null,
        Some(value) => Value::Text(value.to_string()),
    }
}

fn string_list(values: &[String]) -> RepoResult<Value> {
    let trimmed: Vec<&str> = values.iter().map(|value| value.trim()).collect();
    serde_json::to_string(&trimmed)
        .map(Value::Text)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode list: {err}")))
}

fn parse_string_list<E: Entry>(row: &Row<'_>, column: &'static str) -> RepoResult<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid JSON list `{raw}` in {}.{column}",
            E::KIND.table()
        ))
    })
}
