//! Project entity model and DTOs.

use chrono::{DateTime, NaiveDate};
use portfolio_core::error::CoreError;
use portfolio_core::types::DbId;
use portfolio_core::validation::require_fields;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
///
/// Column names are camelCase in the table and in JSON alike.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub image_url: Option<String>,
    pub project_link: Option<String>,
    pub github_link: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Request body for create and update. Nothing is enforced at parse time;
/// call [`ProjectInput::validate`] before handing it to the repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub image_url: Option<String>,
    pub project_link: Option<String>,
    pub github_link: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
}

/// The full set of mutable columns, with required fields guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub image_url: Option<String>,
    pub project_link: Option<String>,
    pub github_link: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectInput {
    /// Check the required fields and produce the bindable field set.
    pub fn validate(self) -> Result<ProjectFields, CoreError> {
        require_fields(&[
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
            ("technologies", self.technologies.as_deref()),
            ("status", self.status.as_deref()),
        ])?;

        Ok(ProjectFields {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            technologies: self.technologies.unwrap_or_default(),
            image_url: self.image_url,
            project_link: self.project_link,
            github_link: self.github_link,
            status: self.status.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

impl ProjectFields {
    /// The record as stored under `id`.
    pub fn into_project(self, id: DbId) -> Project {
        Project {
            id,
            title: self.title,
            description: self.description,
            technologies: self.technologies,
            image_url: self.image_url,
            project_link: self.project_link,
            github_link: self.github_link,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Accept `null`, `""`, `YYYY-MM-DD`, or an RFC 3339 timestamp (date part kept).
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| {
            serde::de::Error::custom(format!("invalid date '{raw}', expected YYYY-MM-DD"))
        })
}
