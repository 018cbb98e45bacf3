//! Hosted per-user storage
//!
//! When a learner is signed in, courses and chat messages live in remote
//! tables keyed by their user id. [`SupabaseStore`] talks to a PostgREST
//! endpoint (`/rest/v1/<table>`) with the project's anon key plus the user's
//! bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StorageError;
use crate::course::{ChatMessage, Course};

/// Table holding one row per saved course
pub const COURSES_TABLE: &str = "courses";
/// Table holding chat messages
pub const MESSAGES_TABLE: &str = "messages";

/// A signed-in learner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Hosted user id
    pub user_id: String,
    /// Bearer token for row-level access
    pub access_token: String,
}

/// Remote per-user tables
#[async_trait]
pub trait HostedStore: Send + Sync {
    /// Insert a course row owned by the session user
    async fn insert_course(&self, session: &Session, course: &Course) -> Result<(), StorageError>;

    /// List the session user's courses, newest first
    async fn list_courses(&self, session: &Session) -> Result<Vec<Course>, StorageError>;

    /// Delete the session user's course with `course_id`
    ///
    /// Returns `false` when no row matched.
    async fn delete_course(&self, session: &Session, course_id: &str) -> Result<bool, StorageError>;

    /// Insert a chat message row
    async fn insert_message(&self, session: &Session, message: &ChatMessage) -> Result<(), StorageError>;
}

#[derive(Serialize)]
struct CourseRow<'a> {
    user_id: &'a str,
    title: &'a str,
    description: &'a str,
    data: &'a Course,
}

#[derive(Deserialize)]
struct StoredCourseRow {
    data: serde_json::Value,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl StoredCourseRow {
    fn into_course(self) -> Result<Course, serde_json::Error> {
        let mut course: Course = serde_json::from_value(self.data)?;
        if course.created_at.is_none() {
            course.created_at = self.created_at;
        }
        Ok(course)
    }
}

/// Courses from listed rows, skipping rows whose data cannot be read
fn courses_from_rows(rows: Vec<StoredCourseRow>) -> Vec<Course> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match row.into_course() {
            Ok(course) => Some(course),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable hosted course row");
                None
            }
        })
        .collect()
}

#[derive(Serialize)]
struct MessageRow<'a> {
    user_id: &'a str,
    course_id: Option<&'a str>,
    role: crate::course::MessageRole,
    content: &'a str,
    created_at: DateTime<Utc>,
}

/// PostgREST-backed [`HostedStore`]
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl SupabaseStore {
    /// Connect to a project at `base_url` using its public anon key
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http_client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, table: &str, session: &Session) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Hosted {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl HostedStore for SupabaseStore {
    async fn insert_course(&self, session: &Session, course: &Course) -> Result<(), StorageError> {
        let row = CourseRow {
            user_id: &session.user_id,
            title: &course.title,
            description: &course.description,
            data: course,
        };
        let response = self
            .request(reqwest::Method::POST, COURSES_TABLE, session)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!(course_id = %course.id, user_id = %session.user_id, "Saved course to hosted store");
        Ok(())
    }

    async fn list_courses(&self, session: &Session) -> Result<Vec<Course>, StorageError> {
        let response = self
            .request(reqwest::Method::GET, COURSES_TABLE, session)
            .query(&[
                ("select", "data,created_at".to_string()),
                ("user_id", format!("eq.{}", session.user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<StoredCourseRow> = Self::check(response).await?.json().await?;
        Ok(courses_from_rows(rows))
    }

    async fn delete_course(&self, session: &Session, course_id: &str) -> Result<bool, StorageError> {
        let response = self
            .request(reqwest::Method::DELETE, COURSES_TABLE, session)
            .header("Prefer", "return=representation")
            .query(&[
                ("user_id", format!("eq.{}", session.user_id)),
                ("data->>id", format!("eq.{course_id}")),
            ])
            .send()
            .await?;
        let deleted: Vec<serde_json::Value> = Self::check(response).await?.json().await?;

        if deleted.is_empty() {
            tracing::warn!(course_id, user_id = %session.user_id, "No hosted course row matched delete");
            return Ok(false);
        }
        tracing::info!(course_id, user_id = %session.user_id, rows = deleted.len(), "Deleted course from hosted store");
        Ok(true)
    }

    async fn insert_message(&self, session: &Session, message: &ChatMessage) -> Result<(), StorageError> {
        let row = MessageRow {
            user_id: &session.user_id,
            course_id: message.course_id.as_deref(),
            role: message.role,
            content: &message.content,
            created_at: message.created_at,
        };
        let response = self
            .request(reqwest::Method::POST, MESSAGES_TABLE, session)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let store = SupabaseStore::new("https://example.supabase.co/", "anon", Duration::from_secs(5)).unwrap();
        assert_eq!(
            store.table_url(COURSES_TABLE),
            "https://example.supabase.co/rest/v1/courses"
        );
    }

    #[test]
    fn test_course_row_shape() {
        let course = Course {
            id: "course-1".into(),
            title: "Physics".into(),
            description: "Motion".into(),
            estimated_duration: String::new(),
            difficulty: crate::course::Difficulty::Beginner,
            modules: Vec::new(),
            created_at: None,
        };
        let row = CourseRow {
            user_id: "u1",
            title: &course.title,
            description: &course.description,
            data: &course,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["data"]["id"], "course-1");
    }

    #[test]
    fn test_stored_row_parses() {
        let row: StoredCourseRow = serde_json::from_str(
            r#"{"data":{"id":"c","title":"T","modules":[]},"created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let course = row.into_course().unwrap();
        assert_eq!(course.id, "c");
        assert!(course.created_at.is_some());
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let rows: Vec<StoredCourseRow> = serde_json::from_str(
            r#"[
                {"data":{"id":"a","title":"Kept","difficulty":"beginner","modules":[]}},
                {"data":{"title":"No id"}},
                {"data":"not an object"},
                {"data":{"id":"b","title":"Also kept"}}
            ]"#,
        )
        .unwrap();
        let ids: Vec<_> = courses_from_rows(rows).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
