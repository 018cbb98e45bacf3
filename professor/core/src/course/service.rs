//! Course, lesson and question generation
//!
//! # Design
//!
//! ```text
//!   topic ──► prompt ──► LlmBackend::send ──► parse ──► Generated { origin: Generated }
//!                 │              │               │
//!                 │ disabled     │ error         │ ParseFailure
//!                 ▼              ▼               ▼
//!              fallback ◄──── fallback ◄───── fallback        (origin: Fallback { reason })
//!
//!   timeout / cancel ──► GenerationError (never silently replaced)
//! ```
//!
//! Every call runs under [`run_with_deadline`] so a stuck provider or an
//! impatient user never leaves the caller hanging.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use super::fallback::{fallback_course, fallback_lesson, FALLBACK_ANSWER};
use super::model::{Course, LessonContent, LessonRequest};
use super::parse::{parse_course_reply, parse_lesson_reply};
use crate::backend::{LlmBackend, LlmRequest};
use crate::cancel::{run_with_deadline, CancelToken, Interrupted};
use crate::config::LlmSettings;

/// Deadline used when none is configured
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

const COURSE_SYSTEM_PROMPT: &str = "You are an expert course designer. Return ONLY valid JSON for a practical, \
     project-based course outline with fields: title, description, estimatedDuration, difficulty \
     (Beginner|Intermediate|Advanced), modules: [{id,title,duration,topics[]}]. Duration values can be \
     approximate strings.";

const LESSON_SYSTEM_PROMPT: &str = "You are an expert instructor. Return ONLY valid JSON for one lesson with \
     fields: introduction, learningObjectives[], content: {explanation, keyPoints[], examples: [{title, \
     description, code?, language?}]}, exercises: [{question, type (multiple-choice|coding|text), options[]?, \
     correctAnswer?, explanation?}], resources: [{title, type, url, description}].";

const QUESTION_SYSTEM_PROMPT: &str =
    "You are an AI professor. Answer concisely and practically using the lesson context when relevant.";

const COURSE_TEMPERATURE: f32 = 0.4;
const LESSON_TEMPERATURE: f32 = 0.7;
const QUESTION_TEMPERATURE: f32 = 0.5;

/// Where a result came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Produced by the model
    Generated,
    /// Deterministic template, with the reason generation was skipped
    Fallback {
        /// What went wrong
        reason: String,
    },
}

/// A result tagged with its [`Origin`]
#[derive(Clone, Debug, PartialEq)]
pub struct Generated<T> {
    /// The course, lesson or answer
    pub value: T,
    /// How it was produced
    pub origin: Origin,
}

impl<T> Generated<T> {
    fn generated(value: T) -> Self {
        Self {
            value,
            origin: Origin::Generated,
        }
    }

    fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            origin: Origin::Fallback { reason: reason.into() },
        }
    }

    /// Whether the value is a template
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, Origin::Fallback { .. })
    }
}

/// Failures the caller has to show rather than paper over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Nothing to generate a course about
    #[error("topic is empty")]
    EmptyTopic,
    /// Nothing to answer
    #[error("question is empty")]
    EmptyQuestion,
    /// The provider did not answer in time
    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
    /// The caller gave up
    #[error("generation cancelled")]
    Cancelled,
}

impl From<Interrupted> for GenerationError {
    fn from(err: Interrupted) -> Self {
        match err {
            Interrupted::TimedOut(limit) => Self::TimedOut(limit),
            Interrupted::Cancelled => Self::Cancelled,
        }
    }
}

/// Join lesson fields into the context block sent with a question
#[must_use]
pub fn lesson_context(request: &LessonRequest, lesson: &LessonContent) -> String {
    format!(
        "Lesson: {}\nTopic: {}\nIntroduction: {}\nKey Points: {}\nCurrent explanation: {}",
        request.lesson_title,
        request.topic,
        lesson.introduction,
        lesson.content.key_points.join(", "),
        lesson.content.explanation,
    )
}

/// Generates course material through an [`LlmBackend`]
pub struct CourseService<B> {
    backend: B,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl<B: LlmBackend> CourseService<B> {
    /// Service using `model` with per-operation temperatures
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            temperature: None,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Service configured from the `[llm]` settings
    pub fn from_settings(backend: B, settings: &LlmSettings) -> Self {
        Self {
            backend,
            model: settings.model().to_string(),
            temperature: settings.temperature,
            timeout: settings.request_timeout(),
        }
    }

    /// Deadline for each request
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use one temperature for every operation
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Model requested from the backend
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system: &str, user: String, default_temperature: f32) -> LlmRequest {
        LlmRequest::new(self.model.clone())
            .with_system(system)
            .with_user(user)
            .with_temperature(self.temperature.unwrap_or(default_temperature))
    }

    /// Send `request`; the inner error is a reason to fall back
    async fn complete(
        &self,
        operation: &'static str,
        request: &LlmRequest,
        token: &CancelToken,
    ) -> Result<Result<String, String>, GenerationError> {
        if !self.backend.is_enabled() {
            tracing::debug!(operation, backend = self.backend.name(), "Backend disabled, using fallback");
            return Ok(Err(format!("{} backend is not configured", self.backend.name())));
        }

        match run_with_deadline(self.backend.send(request), self.timeout, token).await {
            Err(interrupted) => {
                tracing::warn!(operation, error = %interrupted, "Generation interrupted");
                Err(interrupted.into())
            }
            Ok(Err(e)) => {
                tracing::warn!(operation, backend = self.backend.name(), error = %e, "Generation failed, using fallback");
                Ok(Err(e.to_string()))
            }
            Ok(Ok(response)) => {
                tracing::debug!(
                    operation,
                    model = %response.model,
                    tokens = ?response.tokens_used,
                    duration_ms = ?response.duration_ms,
                    "Generation complete"
                );
                Ok(Ok(response.content))
            }
        }
    }

    /// Generate a course outline for `topic`
    ///
    /// Backend and parse failures yield the template course. The returned
    /// course always carries a creation time.
    ///
    /// # Errors
    ///
    /// [`GenerationError::EmptyTopic`] for a blank topic, and
    /// [`GenerationError::TimedOut`] / [`GenerationError::Cancelled`] when
    /// the request is interrupted.
    pub async fn generate_course(&self, topic: &str, token: &CancelToken) -> Result<Generated<Course>, GenerationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(GenerationError::EmptyTopic);
        }

        let request = self.request(
            COURSE_SYSTEM_PROMPT,
            format!("Create a concise, hands-on course outline for the topic: \"{topic}\"."),
            COURSE_TEMPERATURE,
        );
        let mut outcome = match self.complete("course", &request, token).await? {
            Ok(reply) => match parse_course_reply(&reply, topic) {
                Ok(course) => Generated::generated(course),
                Err(failure) => {
                    tracing::warn!(topic, error = %failure, "Unusable course reply, using fallback");
                    Generated::fallback(fallback_course(topic), failure.to_string())
                }
            },
            Err(reason) => Generated::fallback(fallback_course(topic), reason),
        };
        outcome.value.created_at = Some(Utc::now());

        tracing::info!(
            topic,
            course_id = %outcome.value.id,
            modules = outcome.value.modules.len(),
            fallback = outcome.is_fallback(),
            "Course ready"
        );
        Ok(outcome)
    }

    /// Generate the content of one lesson
    ///
    /// # Errors
    ///
    /// [`GenerationError::TimedOut`] / [`GenerationError::Cancelled`] when
    /// the request is interrupted.
    pub async fn generate_lesson(
        &self,
        request: &LessonRequest,
        token: &CancelToken,
    ) -> Result<Generated<LessonContent>, GenerationError> {
        let prompt = self.request(
            LESSON_SYSTEM_PROMPT,
            format!(
                "Write the lesson \"{}\" about {} for the module \"{}\". Difficulty: {}.",
                request.lesson_title,
                request.topic,
                request.module_title,
                request.difficulty.as_str()
            ),
            LESSON_TEMPERATURE,
        );

        let outcome = match self.complete("lesson", &prompt, token).await? {
            Ok(reply) => match parse_lesson_reply(&reply) {
                Ok(lesson) => Generated::generated(lesson),
                Err(failure) => {
                    tracing::warn!(lesson = %request.lesson_title, error = %failure, "Unusable lesson reply, using fallback");
                    Generated::fallback(fallback_lesson(request), failure.to_string())
                }
            },
            Err(reason) => Generated::fallback(fallback_lesson(request), reason),
        };
        Ok(outcome)
    }

    /// Answer `question` with `context` from the current lesson
    ///
    /// # Errors
    ///
    /// [`GenerationError::EmptyQuestion`] for a blank question, and
    /// [`GenerationError::TimedOut`] / [`GenerationError::Cancelled`] when
    /// the request is interrupted.
    pub async fn ask_question(
        &self,
        context: &str,
        question: &str,
        token: &CancelToken,
    ) -> Result<Generated<String>, GenerationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(GenerationError::EmptyQuestion);
        }

        let request = self.request(
            QUESTION_SYSTEM_PROMPT,
            format!("Context:\n{context}\n\nQuestion: {question}"),
            QUESTION_TEMPERATURE,
        );
        let outcome = match self.complete("question", &request, token).await? {
            Ok(reply) if !reply.trim().is_empty() => Generated::generated(reply.trim().to_string()),
            Ok(_) => Generated::fallback(FALLBACK_ANSWER.to_string(), "empty reply"),
            Err(reason) => Generated::fallback(FALLBACK_ANSWER.to_string(), reason),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LlmResponse;
    use crate::course::model::Difficulty;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    // ========================================================================
    // Test backends
    // ========================================================================

    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct ScriptedBackend {
        reply: Reply,
        enabled: bool,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedBackend {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                enabled: true,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn disabled() -> Self {
            Self {
                enabled: false,
                ..Self::new(Reply::Fail)
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
            self.seen.lock().push(request.clone());
            match self.reply {
                Reply::Text(text) => Ok(LlmResponse {
                    content: text.to_string(),
                    model: request.model.clone(),
                    tokens_used: None,
                    duration_ms: None,
                }),
                Reply::Fail => anyhow::bail!("connection refused"),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    fn service(reply: Reply) -> CourseService<ScriptedBackend> {
        CourseService::new(ScriptedBackend::new(reply), "test-model")
    }

    fn lesson_request() -> LessonRequest {
        LessonRequest {
            lesson_title: "Scales".into(),
            topic: "Major scales".into(),
            module_title: "Guitar Fundamentals".into(),
            difficulty: Difficulty::Beginner,
        }
    }

    // ========================================================================
    // Courses
    // ========================================================================

    #[tokio::test]
    async fn test_generated_course() {
        let svc = service(Reply::Text(
            r#"{"title": "Guitar 101", "difficulty": "Beginner", "modules": [{"title": "Chords"}]}"#,
        ));
        let out = svc.generate_course("Guitar", &CancelToken::new()).await.unwrap();

        assert_eq!(out.origin, Origin::Generated);
        assert_eq!(out.value.title, "Guitar 101");
        assert_eq!(out.value.modules[0].id, "module-1");
        assert!(out.value.created_at.is_some());

        let seen = svc.backend().seen.lock();
        assert_eq!(seen[0].model, "test-model");
        assert!((seen[0].temperature - COURSE_TEMPERATURE).abs() < f32::EPSILON);
        assert!(seen[0].messages[1].content.contains("\"Guitar\""));
    }

    #[tokio::test]
    async fn test_failing_backend_falls_back() {
        let out = service(Reply::Fail)
            .generate_course("Guitar", &CancelToken::new())
            .await
            .unwrap();

        assert!(out.is_fallback());
        assert_eq!(out.value.title, "Complete Guitar Mastery");
        assert_eq!(out.value.modules.len(), 4);
        assert!(out.value.created_at.is_some());
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let out = service(Reply::Text("Sorry, I can't do that."))
            .generate_course("Chess", &CancelToken::new())
            .await
            .unwrap();
        assert!(out.is_fallback());
        assert_eq!(out.value.title, "Complete Chess Mastery");
    }

    #[tokio::test]
    async fn test_disabled_backend_skips_network() {
        let svc = CourseService::new(ScriptedBackend::disabled(), "m");
        let out = svc.generate_course("Guitar", &CancelToken::new()).await.unwrap();
        assert!(out.is_fallback());
        assert!(svc.backend().seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_topic_rejected() {
        let err = service(Reply::Fail).generate_course("   ", &CancelToken::new()).await;
        assert_eq!(err, Err(GenerationError::EmptyTopic));
    }

    #[tokio::test]
    async fn test_timeout_is_surfaced() {
        let limit = Duration::from_millis(10);
        let svc = service(Reply::Hang).with_timeout(limit);
        let err = svc.generate_course("Guitar", &CancelToken::new()).await;
        assert_eq!(err, Err(GenerationError::TimedOut(limit)));
    }

    #[tokio::test]
    async fn test_cancellation_is_surfaced() {
        let token = CancelToken::new();
        token.cancel();
        let err = service(Reply::Hang).generate_course("Guitar", &token).await;
        assert_eq!(err, Err(GenerationError::Cancelled));
    }

    // ========================================================================
    // Lessons and questions
    // ========================================================================

    #[tokio::test]
    async fn test_lesson_fallback_on_bad_json() {
        let out = service(Reply::Text("{\"introduction\": 3}"))
            .generate_lesson(&lesson_request(), &CancelToken::new())
            .await
            .unwrap();
        assert!(out.is_fallback());
        assert!(out.value.introduction.starts_with("Welcome to Scales!"));
    }

    #[tokio::test]
    async fn test_temperature_override_applies_everywhere() {
        let svc = service(Reply::Text("Play slowly.")).with_temperature(0.1);
        let out = svc
            .ask_question("Lesson: Scales", "How do I practice?", &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(out.value, "Play slowly.");

        let seen = svc.backend().seen.lock();
        assert!((seen[0].temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(seen[0].messages[1].content, "Context:\nLesson: Scales\n\nQuestion: How do I practice?");
    }

    #[tokio::test]
    async fn test_question_fallbacks() {
        let out = service(Reply::Text("   "))
            .ask_question("", "Why?", &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(out.value, FALLBACK_ANSWER);
        assert!(out.is_fallback());

        let err = service(Reply::Fail).ask_question("", " ", &CancelToken::new()).await;
        assert_eq!(err, Err(GenerationError::EmptyQuestion));
    }

    #[test]
    fn test_lesson_context_format() {
        let request = lesson_request();
        let lesson = fallback_lesson(&request);
        let context = lesson_context(&request, &lesson);
        assert!(context.starts_with("Lesson: Scales\nTopic: Major scales\nIntroduction: Welcome"));
        assert!(context.contains("Key Points: Core principles of Major scales, Best practices"));
    }
}
