//! Courses, lessons and questions
//!
//! - [`model`]: the persisted and wire shapes
//! - [`parse`]: reply text to typed records
//! - [`fallback`]: templates used when generation cannot help
//! - [`service`]: [`CourseService`], which ties the three to an LLM backend

pub mod fallback;
pub mod model;
pub mod parse;
pub mod service;

pub use fallback::{fallback_course, fallback_lesson, FALLBACK_ANSWER};
pub use model::{
    ChatMessage, Course, CourseModule, Difficulty, Exercise, ExerciseKind, LessonBody, LessonContent, LessonExample,
    LessonRequest, MessageRole, Resource,
};
pub use parse::{extract_json_object, parse_course_reply, parse_lesson_reply, ParseFailure};
pub use service::{lesson_context, CourseService, Generated, GenerationError, Origin, DEFAULT_GENERATION_TIMEOUT};
