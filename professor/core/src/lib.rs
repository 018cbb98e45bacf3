//! Professor Core - Headless AI Professor Engine
//!
//! This crate holds everything behind the AI professor that is not pixels:
//! the procedurally animated avatar, the environment it stands in, course
//! generation through an LLM, and persistence. A renderer (3D canvas,
//! terminal, test harness) feeds it input and draws the frames it returns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Hosts / Renderers                         │
//! │   ┌──────────┐   ┌──────────────┐   ┌──────────────────────────┐ │
//! │   │   CLI    │   │  3D canvas   │   │   Headless / tests       │ │
//! │   └────┬─────┘   └──────┬───────┘   └────────────┬─────────────┘ │
//! │        └────────────────┴────────────────────────┘               │
//! │                 Action (up)        SceneFrame (down)             │
//! └──────────────────────────┼───────────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┼───────────────────────────────────────┐
//! │                    PROFESSOR CORE                                │
//! │  ┌───────────────────────┴─────────────────────────────────────┐ │
//! │  │                    ProfessorEngine                          │ │
//! │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐  │ │
//! │  │  │ AppState │  │ Animator │  │  Scene   │  │ FrameClock  │  │ │
//! │  │  │ reducer  │  │ (avatar) │  │ Composer │  │             │  │ │
//! │  │  └──────────┘  └──────────┘  └──────────┘  └─────────────┘  │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! │  ┌────────────────┐  ┌───────────────┐  ┌──────────────────────┐ │
//! │  │ CourseService  │──│  LlmBackend   │  │  CourseLibrary       │ │
//! │  │ (+ fallbacks)  │  │ OpenAI/Ollama │  │  local / hosted      │ │
//! │  └────────────────┘  └───────────────┘  └──────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ProfessorEngine`]: owns state and turns ticks into [`SceneFrame`]s
//! - [`Action`] / [`reduce`]: every state change
//! - [`AvatarConfig`]: learner-tunable avatar settings
//! - [`CourseService`]: course, lesson and question generation
//! - [`CourseLibrary`]: saved courses and chat history
//! - [`ProfessorConfig`]: file and environment configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use professor_core::{Action, AvatarConfig, ProfessorEngine};
//!
//! let mut engine = ProfessorEngine::new(AvatarConfig::default(), 42, 0.016);
//! engine.dispatch(Action::SetTopic(Some("Basic Physics".into())));
//! engine.dispatch(Action::StartSpeaking);
//! let frame = engine.tick(0.016);
//! // draw `frame`
//! ```
//!
//! # Module Overview
//!
//! - [`animation`]: primitives, lights and the frame clock
//! - [`app`]: application state, actions and the engine
//! - [`avatar`]: configuration, state derivation and the animator
//! - [`backend`]: LLM backend abstraction (OpenAI-compatible, Ollama)
//! - [`cancel`]: cancellation tokens and deadlines
//! - [`color`]: hex colours and the palette
//! - [`config`]: TOML and environment configuration
//! - [`course`]: course models, parsing, fallbacks and generation
//! - [`scene`]: environments, overlays, visualizers and composition
//! - [`storage`]: key-value stores, the hosted store and the course library
//!
//! # No Renderer Dependencies
//!
//! Frames are plain data. Nothing here depends on a graphics API.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod app;
pub mod avatar;
pub mod backend;
pub mod cancel;
pub mod color;
pub mod config;
pub mod course;
pub mod scene;
pub mod storage;

pub use app::{reduce, Action, AppState, Effect, ProfessorEngine};
pub use avatar::{AvatarConfig, AvatarConfigStore, ConfigAction, Emotion, Gesture, InteractionSignals, Personality};
pub use backend::{build_backend, LlmBackend, LlmRequest, LlmResponse};
pub use cancel::{run_with_deadline, CancelToken, Interrupted};
pub use color::{Color, ColorParseError};
pub use config::{load_config, ConfigError, ConfigOverrides, ProfessorConfig};
pub use course::{Course, CourseService, Generated, GenerationError, LessonContent, LessonRequest, Origin};
pub use scene::{EnvironmentScene, SceneComposer, SceneFrame};
pub use storage::{CourseLibrary, FileStore, KeyValueStore, MemoryStore, StorageError};
