//! Course library
//!
//! Keeps the in-memory course list that a host displays, and persists
//! changes to the hosted store when a session is present or to local
//! storage otherwise.
//!
//! Mutations are optimistic: the in-memory list changes first, then the
//! write happens. If the write fails the list is put back the way it was
//! and the error is returned to the caller.
//!
//! Local lists are edited as raw JSON records. A record this version cannot
//! read is skipped when loading but written back untouched, and a list that
//! cannot be read at all is never overwritten.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{read_json, write_json, HostedStore, KeyValueStore, Session, StorageError};
use crate::course::{ChatMessage, Course};

/// Local key holding the signed-out course list
pub const COURSES_KEY: &str = "courses";
/// Local key holding chat messages
pub const MESSAGES_KEY: &str = "messages";

/// Where persisted data goes for the current session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageTarget {
    /// Local key/value storage
    Local,
    /// Remote per-user tables
    Hosted,
}

/// The learner's saved courses
pub struct CourseLibrary {
    local: Arc<dyn KeyValueStore>,
    hosted: Option<Arc<dyn HostedStore>>,
    session: Option<Session>,
    courses: Vec<Course>,
}

impl CourseLibrary {
    /// Library backed only by local storage
    #[must_use]
    pub fn new(local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            local,
            hosted: None,
            session: None,
            courses: Vec::new(),
        }
    }

    /// Attach a hosted store used whenever a session is present
    #[must_use]
    pub fn with_hosted(mut self, hosted: Arc<dyn HostedStore>) -> Self {
        self.hosted = Some(hosted);
        self
    }

    /// Sign in or out
    ///
    /// Clears the in-memory list; call [`reload`](Self::reload) afterwards.
    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
        self.courses.clear();
    }

    /// Current session, if signed in
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Where writes currently go
    #[must_use]
    pub fn target(&self) -> StorageTarget {
        match (&self.session, &self.hosted) {
            (Some(_), Some(_)) => StorageTarget::Hosted,
            _ => StorageTarget::Local,
        }
    }

    /// Courses as last loaded or mutated
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Find a course by id
    #[must_use]
    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    fn hosted_target(&self) -> Option<(&Arc<dyn HostedStore>, &Session)> {
        match (&self.hosted, &self.session) {
            (Some(hosted), Some(session)) => Some((hosted, session)),
            _ => None,
        }
    }

    fn local_courses(&self) -> Vec<Course> {
        read_records(self.local.as_ref(), COURSES_KEY)
    }

    /// Load the course list from the active target
    ///
    /// Corrupt local data loads as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted store cannot be read. The in-memory
    /// list is left unchanged in that case.
    pub async fn reload(&mut self) -> Result<&[Course], StorageError> {
        let courses = match self.hosted_target() {
            Some((hosted, session)) => hosted.list_courses(session).await?,
            None => self.local_courses(),
        };
        tracing::debug!(count = courses.len(), target = ?self.target(), "Loaded courses");
        self.courses = courses;
        Ok(&self.courses)
    }

    /// Save a course
    ///
    /// Locally the course is appended to the stored list. Hosted stores
    /// return newest first, so there the course goes to the front.
    ///
    /// # Errors
    ///
    /// Returns the write error after rolling back the in-memory list.
    pub async fn save_course(&mut self, course: Course) -> Result<(), StorageError> {
        let snapshot = self.courses.clone();

        let result = match self.hosted_target() {
            Some((hosted, session)) => {
                let hosted = Arc::clone(hosted);
                let session = session.clone();
                self.courses.insert(0, course.clone());
                hosted.insert_course(&session, &course).await
            }
            None => {
                self.courses.push(course.clone());
                append_record(self.local.as_ref(), COURSES_KEY, &course)
            }
        };

        if let Err(e) = result {
            tracing::warn!(course_id = %course.id, error = %e, "Saving course failed, rolling back");
            self.courses = snapshot;
            return Err(e);
        }

        tracing::info!(course_id = %course.id, title = %course.title, "Saved course");
        Ok(())
    }

    /// Delete a course by id
    ///
    /// Returns `false` when no such course was in the list, or when the
    /// storage behind it no longer held the course. In the latter case the
    /// course is still dropped from the list.
    ///
    /// # Errors
    ///
    /// Returns the write error after restoring the course in place.
    pub async fn delete_course(&mut self, course_id: &str) -> Result<bool, StorageError> {
        let Some(index) = self.courses.iter().position(|c| c.id == course_id) else {
            return Ok(false);
        };
        let removed = self.courses.remove(index);

        let result = match self.hosted_target() {
            Some((hosted, session)) => {
                let hosted = Arc::clone(hosted);
                let session = session.clone();
                hosted.delete_course(&session, course_id).await
            }
            None => {
                let local = self.local.as_ref();
                stored_records(local, COURSES_KEY).and_then(|mut records| {
                    let before = records.len();
                    records.retain(|r| r.get("id").and_then(Value::as_str) != Some(course_id));
                    if records.len() == before {
                        return Ok(false);
                    }
                    write_json(local, COURSES_KEY, &records).map(|()| true)
                })
            }
        };

        match result {
            Ok(true) => {
                tracing::info!(course_id, "Deleted course");
                Ok(true)
            }
            Ok(false) => {
                tracing::warn!(course_id, target = ?self.target(), "Course was not in storage");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(course_id, error = %e, "Deleting course failed, restoring it");
                self.courses.insert(index, removed);
                Err(e)
            }
        }
    }

    /// Persist a chat message
    ///
    /// Local messages are appended in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn save_message(&self, message: &ChatMessage) -> Result<(), StorageError> {
        match self.hosted_target() {
            Some((hosted, session)) => hosted.insert_message(session, message).await,
            None => append_record(self.local.as_ref(), MESSAGES_KEY, message),
        }
    }

    /// Locally stored chat messages in the order they were written
    #[must_use]
    pub fn local_messages(&self) -> Vec<ChatMessage> {
        read_records(self.local.as_ref(), MESSAGES_KEY)
    }
}

/// Records under `key` that parse as `T`; unreadable ones are logged and skipped
fn read_records<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    read_json::<Vec<Value>>(store, key)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "Skipping unreadable stored record");
                None
            }
        })
        .collect()
}

/// The raw stored list under `key`, for rewriting
///
/// Unlike [`read_records`] this fails rather than returning an empty list, so
/// a write never replaces data it could not read.
fn stored_records(store: &dyn KeyValueStore, key: &str) -> Result<Vec<Value>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn append_record<T: Serialize>(store: &dyn KeyValueStore, key: &str, record: &T) -> Result<(), StorageError> {
    let mut records = stored_records(store, key)?;
    records.push(serde_json::to_value(record)?);
    write_json(store, key, &records)
}
