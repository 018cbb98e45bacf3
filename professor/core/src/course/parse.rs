//! Parsing model replies into courses and lessons
//!
//! Models wrap JSON in prose or code fences often enough that the reply is
//! cut down to its outermost `{ ... }` before deserializing. Everything past
//! that point is typed: a reply either becomes a valid record or a
//! [`ParseFailure`] saying why not.

use serde::Deserialize;
use thiserror::Error;

use super::model::{Course, CourseModule, Difficulty, LessonContent};

/// Why a reply could not be turned into a record
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Nothing but whitespace
    #[error("reply is empty")]
    Empty,
    /// The extracted text is not JSON of the expected shape
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),
    /// A course reply without a `modules` array
    #[error("course reply has no modules array")]
    MissingModules,
}

/// Outermost `{ ... }` of `reply`, or the whole reply when there is none
#[must_use]
pub fn extract_json_object(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleDraft {
    id: Option<String>,
    title: Option<String>,
    duration: Option<String>,
    topics: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseDraft {
    title: Option<String>,
    description: Option<String>,
    estimated_duration: Option<String>,
    difficulty: Option<String>,
    modules: Option<Vec<ModuleDraft>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Turn a course-outline reply into a [`Course`]
///
/// Missing module ids become `module-<n>` (1-based). A missing title falls
/// back to the topic, a missing description to "A practical course on
/// <topic>", and an unrecognised difficulty to the default. The returned
/// course carries a fresh id and no creation time.
///
/// # Errors
///
/// Returns a [`ParseFailure`] for empty replies, invalid JSON and replies
/// without a `modules` array.
pub fn parse_course_reply(reply: &str, topic: &str) -> Result<Course, ParseFailure> {
    if reply.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }
    let draft: CourseDraft =
        serde_json::from_str(extract_json_object(reply)).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    let modules = draft.modules.ok_or(ParseFailure::MissingModules)?;

    let modules = modules
        .into_iter()
        .enumerate()
        .map(|(idx, m)| CourseModule {
            id: non_blank(m.id).unwrap_or_else(|| format!("module-{}", idx + 1)),
            title: m.title.unwrap_or_default(),
            duration: m.duration.unwrap_or_default(),
            topics: m.topics.unwrap_or_default(),
        })
        .collect();

    let difficulty = draft
        .difficulty
        .and_then(|d| d.parse::<Difficulty>().ok())
        .unwrap_or_default();

    Ok(Course {
        id: Course::new_id(),
        title: non_blank(draft.title).unwrap_or_else(|| topic.to_string()),
        description: non_blank(draft.description).unwrap_or_else(|| format!("A practical course on {topic}")),
        estimated_duration: draft.estimated_duration.unwrap_or_default(),
        difficulty,
        modules,
        created_at: None,
    })
}

/// Turn a lesson reply into [`LessonContent`]
///
/// # Errors
///
/// Returns a [`ParseFailure`] for empty replies and replies that do not
/// deserialize into a lesson.
pub fn parse_lesson_reply(reply: &str) -> Result<LessonContent, ParseFailure> {
    if reply.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }
    serde_json::from_str(extract_json_object(reply)).map_err(|e| ParseFailure::InvalidJson(e.to_string()))
}
