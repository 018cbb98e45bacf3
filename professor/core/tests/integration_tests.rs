//! Integration tests across engine, configuration, generation and storage
//!
//! These tests drive the public API the way a host would:
//! - Ticking the engine and checking the avatar it produces
//! - Reducing configuration actions and persisting the result
//! - Generating courses against a broken backend
//! - Saving courses locally and reading them back from disk

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glam::Vec3;
use pretty_assertions::assert_eq;
use tempfile::{NamedTempFile, TempDir};

use professor_core::avatar::AvatarConfigStore;
use professor_core::backend::{LlmBackend, LlmRequest, LlmResponse};
use professor_core::color::Color;
use professor_core::config::{load_config_with_env, ConfigOverrides, ConfigSource, LlmProvider};
use professor_core::course::fallback_course;
use professor_core::storage::{CourseLibrary, FileStore, KeyValueStore};
use professor_core::{
    Action, AvatarConfig, CancelToken, ConfigAction, CourseService, EnvironmentScene, Personality, ProfessorEngine,
};

const FRAME: f32 = 0.016;

struct BrokenBackend;

#[async_trait]
impl LlmBackend for BrokenBackend {
    fn name(&self) -> &str {
        "Broken"
    }

    async fn health_check(&self) -> bool {
        false
    }

    async fn send(&self, _request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        anyhow::bail!("503 Service Unavailable")
    }
}

// =============================================================================
// Engine and animation
// =============================================================================

#[test]
fn test_head_scale_is_size_unless_speaking() {
    let config = AvatarConfig {
        size: 1.4,
        ..AvatarConfig::default()
    };
    let mut engine = ProfessorEngine::new(config, 3, FRAME);
    engine.dispatch(Action::StartListening);

    for _ in 0..500 {
        let frame = engine.tick(FRAME);
        assert_eq!(frame.avatar.head.transform.scale, Vec3::splat(1.4));
    }

    engine.dispatch(Action::StopListening);
    engine.dispatch(Action::StartSpeaking);
    let varied = (0..100)
        .map(|_| engine.tick(FRAME).avatar.head.transform.scale)
        .any(|scale| scale != Vec3::splat(1.4));
    assert!(varied);
}

#[test]
fn test_blinks_follow_the_timer() {
    let mut engine = ProfessorEngine::new(AvatarConfig::default(), 9, FRAME);
    let blinks: Vec<u64> = (0..2_000)
        .filter_map(|_| {
            let frame = engine.tick(FRAME);
            frame
                .avatar
                .face
                .filter(|face| face.blinking)
                .map(|_| frame.tick.index)
        })
        .collect();

    // The timer is tested before it advances, 0.016 per reference frame
    let mut timer = 0.0_f32;
    let mut expected = Vec::new();
    for n in 0..2_000u64 {
        if (timer * 0.2).sin() > 0.95 {
            expected.push(n);
        }
        timer += 0.016;
    }
    assert!(!expected.is_empty());
    assert_eq!(blinks, expected);
}

#[test]
fn test_topic_switches_scene_and_overlay() {
    let mut engine = ProfessorEngine::new(AvatarConfig::default(), 5, FRAME);
    engine.dispatch(Action::SetTopic(Some("Basic Physics".into())));

    let frame = engine.tick(FRAME);
    assert_eq!(frame.scene, EnvironmentScene::Laboratory);
    assert!(frame.overlay.is_some());
    assert!(frame.environment.primitives.iter().any(|p| p.tag == "lab_table"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_enthusiastic_preset_through_engine() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    let configs = AvatarConfigStore::new(Arc::clone(&store));

    let mut engine = ProfessorEngine::new(configs.load(), 1, FRAME);
    let effects = engine.dispatch(Action::Config(ConfigAction::ApplyPreset(Personality::Enthusiastic)));
    for effect in effects {
        let professor_core::Effect::PersistConfig(config) = effect;
        configs.save(&config).unwrap();
    }

    let reloaded = AvatarConfigStore::new(store).load();
    let defaults = AvatarConfig::default();
    assert_eq!(reloaded.personality, Personality::Enthusiastic);
    assert!((reloaded.energy - 0.95).abs() < f32::EPSILON);
    assert!((reloaded.expressiveness - 1.0).abs() < f32::EPSILON);
    assert!((reloaded.float_speed - 3.0).abs() < f32::EPSILON);
    assert_eq!(reloaded.primary_color, Color::from_hex("#f59e0b").unwrap());
    assert_eq!(reloaded.secondary_color, Color::from_hex("#ef4444").unwrap());
    assert!((reloaded.size - defaults.size).abs() < f32::EPSILON);
    assert_eq!(reloaded.eye_color, defaults.eye_color);
    assert_eq!(reloaded.particle_count, defaults.particle_count);
}

#[test]
fn test_reset_is_idempotent() {
    let tweaked = AvatarConfig::default().reduce(&ConfigAction::ApplyPreset(Personality::Technical));
    let once = tweaked.reduce(&ConfigAction::Reset);
    let twice = once.clone().reduce(&ConfigAction::Reset);
    assert_eq!(once, twice);
    assert_eq!(once, AvatarConfig::default());
}

#[test]
fn test_config_file_env_and_overrides() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[llm]
provider = "ollama"
model = "llama3.1"
request_timeout_secs = 30

[animation]
seed = 7
"#
    )
    .unwrap();

    let env = |key: &str| match key {
        "PROFESSOR_TIMEOUT_SECS" => Some("45".to_string()),
        _ => None,
    };
    let mut config = load_config_with_env(Some(file.path()), env).unwrap();
    assert_eq!(config.llm.provider, LlmProvider::Ollama);
    assert_eq!(config.llm.model(), "llama3.1");
    assert_eq!(config.llm.request_timeout(), Duration::from_secs(45));
    assert_eq!(config.animation.seed, Some(7));
    assert_eq!(config.source(), ConfigSource::Env);

    ConfigOverrides::new().with_model("qwen2.5".into()).apply(&mut config);
    assert_eq!(config.llm.model(), "qwen2.5");
    assert_eq!(config.source(), ConfigSource::Cli);
}

// =============================================================================
// Courses and storage
// =============================================================================

#[tokio::test]
async fn test_failing_backend_yields_template_course() {
    let service = CourseService::new(BrokenBackend, "gpt-4o-mini");
    let outcome = service.generate_course("Guitar", &CancelToken::new()).await.unwrap();

    assert!(outcome.is_fallback());
    assert_eq!(outcome.value.title, "Complete Guitar Mastery");
    assert_eq!(outcome.value.modules.len(), 4);
}

#[tokio::test]
async fn test_local_library_round_trip() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));

    let mut library = CourseLibrary::new(Arc::clone(&store));
    library.save_course(fallback_course("Chess")).await.unwrap();
    let before = library.reload().await.unwrap().to_vec();

    let added = fallback_course("Guitar");
    library.save_course(added.clone()).await.unwrap();

    let mut fresh = CourseLibrary::new(store);
    let after = fresh.reload().await.unwrap().to_vec();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.last(), Some(&added));
}

#[tokio::test]
async fn test_saving_keeps_courses_written_by_older_clients() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    store
        .set(
            "courses",
            r#"[{"id":"course-ai","title":"Rust","description":"","estimatedDuration":"","difficulty":"beginner","modules":[{"title":"Ownership"}]}]"#,
        )
        .unwrap();

    let mut library = CourseLibrary::new(Arc::clone(&store));
    assert_eq!(library.reload().await.unwrap().len(), 1);
    library.save_course(fallback_course("Guitar")).await.unwrap();

    let mut fresh = CourseLibrary::new(store);
    let titles: Vec<_> = fresh.reload().await.unwrap().iter().map(|c| c.title.clone()).collect();
    assert_eq!(titles, vec!["Rust".to_string(), "Complete Guitar Mastery".to_string()]);
}
