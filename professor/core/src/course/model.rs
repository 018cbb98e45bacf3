//! Course, lesson and chat data shapes
//!
//! These are the persisted and wire forms. Field names are camelCase on the
//! wire so stored data and model replies share one shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course difficulty
///
/// Serialized by display name; any casing is accepted when reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum Difficulty {
    /// No prior knowledge assumed
    Beginner,
    /// Some familiarity assumed
    #[default]
    Intermediate,
    /// Deep prior knowledge assumed
    Advanced,
}

impl Difficulty {
    /// Display name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One module of a course
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    /// Identifier, `module-<n>` when the generator did not supply one
    #[serde(default)]
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Human-readable duration such as "2 hours"
    #[serde(default)]
    pub duration: String,
    /// Topics covered
    #[serde(default)]
    pub topics: Vec<String>,
}

impl CourseModule {
    /// Build a module
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration: duration.into(),
            topics: Vec::new(),
        }
    }

    /// Set the topics
    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }
}

/// A generated course
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier
    pub id: String,
    /// Title
    pub title: String,
    /// One-paragraph description
    #[serde(default)]
    pub description: String,
    /// Human-readable total such as "11.5 hours"
    #[serde(default)]
    pub estimated_duration: String,
    /// Difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Modules in order
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    /// When the course was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Fresh course identifier
    #[must_use]
    pub fn new_id() -> String {
        format!("course-{}", uuid::Uuid::new_v4())
    }
}

/// Which lesson to generate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    /// Lesson title
    pub lesson_title: String,
    /// Course topic
    pub topic: String,
    /// Module the lesson belongs to
    pub module_title: String,
    /// Target difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// A worked example inside a lesson
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonExample {
    /// Title
    pub title: String,
    /// What the example shows
    #[serde(default)]
    pub description: String,
    /// Optional code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Language of `code`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Body of a lesson
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonBody {
    /// Main explanation
    #[serde(default)]
    pub explanation: String,
    /// Bullet points to remember
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Worked examples
    #[serde(default)]
    pub examples: Vec<LessonExample>,
}

/// Exercise format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    /// Pick one of several options
    #[default]
    MultipleChoice,
    /// Write code
    Coding,
    /// Free text answer
    Text,
}

/// Practice exercise
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// The question
    pub question: String,
    /// Format
    #[serde(rename = "type", default)]
    pub kind: ExerciseKind,
    /// Choices for multiple-choice exercises
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Expected answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// Why the answer is right
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Further reading
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Title
    pub title: String,
    /// Kind of resource (documentation, video, article, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Link
    #[serde(default)]
    pub url: String,
    /// Short description
    #[serde(default)]
    pub description: String,
}

/// Full content of one lesson
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonContent {
    /// Opening paragraph
    pub introduction: String,
    /// What the learner will be able to do
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    /// Explanation, key points and examples
    pub content: LessonBody,
    /// Practice
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Further reading
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Who wrote a chat message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The learner
    User,
    /// The professor
    Assistant,
}

/// A chat message tied to a course
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Course the conversation belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// Author
    pub role: MessageRole,
    /// Text
    pub content: String,
    /// When it was written
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Message stamped with the current time
    #[must_use]
    pub fn now(course_id: Option<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            course_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!("beginner".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert_eq!(" ADVANCED ".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_course_wire_shape() {
        let course = Course {
            id: "course-1".into(),
            title: "Rust".into(),
            description: "Systems".into(),
            estimated_duration: "4 hours".into(),
            difficulty: Difficulty::Beginner,
            modules: vec![CourseModule::new("module-1", "Intro", "1 hour").with_topics(["Ownership"])],
            created_at: None,
        };
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["estimatedDuration"], "4 hours");
        assert_eq!(json["difficulty"], "Beginner");
        assert_eq!(json["modules"][0]["topics"][0], "Ownership");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_stored_course_accepts_loose_records() {
        let course: Course = serde_json::from_str(
            r#"{"id":"course-ai","title":"Rust","difficulty":"beginner","modules":[{"duration":"1 hour"}]}"#,
        )
        .unwrap();
        assert_eq!(course.difficulty, Difficulty::Beginner);
        assert_eq!(course.modules[0].id, "");
        assert_eq!(course.modules[0].title, "");
        assert_eq!(serde_json::to_value(&course).unwrap()["difficulty"], "Beginner");
    }

    #[test]
    fn test_exercise_kind_wire_names() {
        let ex: Exercise = serde_json::from_str(
            r#"{"question":"Q","type":"multiple-choice","options":["a","b"],"correctAnswer":"a"}"#,
        )
        .unwrap();
        assert_eq!(ex.kind, ExerciseKind::MultipleChoice);
        assert_eq!(ex.correct_answer.as_deref(), Some("a"));
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(Course::new_id(), Course::new_id());
        assert!(Course::new_id().starts_with("course-"));
    }

    #[test]
    fn test_message_role_lowercase() {
        let msg = ChatMessage::now(Some("c".into()), MessageRole::Assistant, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["courseId"], "c");
    }
}
