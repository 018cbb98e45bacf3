//! Professor CLI - Command-line surface for the AI professor
//!
//! Generates courses, lessons and answers through the configured LLM
//! backend, manages the saved course library and avatar settings, and can
//! run the animation engine headless.
//!
//! # Usage
//!
//! ```bash
//! # Generate a course outline and save it
//! professor generate "Rust for embedded" --save
//!
//! # Lesson content for one module topic
//! professor lesson "Ownership" --module "Rust Fundamentals" --difficulty beginner
//!
//! # Ask a question
//! professor ask "What is a lifetime?" --context "Lesson: Borrowing"
//!
//! # Avatar settings
//! professor avatar preset enthusiastic
//! professor avatar set --size 1.2 --energy 0.9
//!
//! # Run the engine for 120 frames and dump the last one
//! professor simulate --topic "Basic Physics" --speaking --frames 120 --json
//!
//! # Verbose logging
//! RUST_LOG=debug professor generate "Chess"
//! ```
//!
//! # Signals
//!
//! - `SIGINT` (Ctrl-C): cancels any in-flight generation

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use professor_core::avatar::{AvatarConfigPatch, AvatarConfigStore, ConfigAction, Personality};
use professor_core::backend::build_backend;
use professor_core::color::Color;
use professor_core::config::{load_config_from_path, ConfigOverrides, LlmProvider, ProfessorConfig};
use professor_core::course::{
    ChatMessage, Course, CourseService, Difficulty, Generated, LessonRequest, MessageRole, Origin,
};
use professor_core::storage::{CourseLibrary, FileStore, KeyValueStore, Session, SupabaseStore};
use professor_core::{Action, CancelToken, EnvironmentScene, ProfessorEngine};

/// Professor - AI course generator and animated tutor
#[derive(Parser, Debug)]
#[command(name = "professor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, env = "PROFESSOR_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// LLM provider (openai, ollama)
    #[arg(long, global = true)]
    provider: Option<LlmProvider>,

    /// Model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// LLM base URL
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Data directory for saved courses and settings
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Seed for gestures and scene layouts
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Hosted user id (enables hosted storage together with the token)
    #[arg(long, env = "PROFESSOR_USER_ID", global = true, hide_env_values = true)]
    user_id: Option<String>,

    /// Hosted access token
    #[arg(long, env = "PROFESSOR_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "PROFESSOR_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a course outline for a topic
    Generate {
        /// What the course is about
        topic: String,
        /// Add the course to the library
        #[arg(long)]
        save: bool,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Generate the content of one lesson
    Lesson {
        /// Lesson topic
        topic: String,
        /// Module the lesson belongs to
        #[arg(long, default_value = "General")]
        module: String,
        /// Lesson title (defaults to the topic)
        #[arg(long)]
        title: Option<String>,
        /// Beginner, intermediate or advanced
        #[arg(long, default_value = "intermediate")]
        difficulty: Difficulty,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Ask the professor a question
    Ask {
        /// The question
        question: String,
        /// Lesson context to answer from
        #[arg(long, default_value = "")]
        context: String,
        /// Course the conversation belongs to; the exchange is saved
        #[arg(long)]
        course: Option<String>,
    },
    /// Manage saved courses
    #[command(subcommand)]
    Courses(CoursesCommand),
    /// Manage avatar settings
    #[command(subcommand)]
    Avatar(AvatarCommand),
    /// Run the animation engine headless
    Simulate(SimulateArgs),
}

#[derive(Subcommand, Debug)]
enum CoursesCommand {
    /// List saved courses
    List,
    /// Show one course
    Show {
        /// Course id
        id: String,
    },
    /// Delete a course
    Delete {
        /// Course id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum AvatarCommand {
    /// Print the current settings as JSON
    Show,
    /// Apply a personality preset
    Preset {
        /// friendly, professional, enthusiastic, wise or technical
        personality: Personality,
    },
    /// Change personality without touching colours or motion
    Personality {
        /// friendly, professional, enthusiastic, wise or technical
        personality: Personality,
    },
    /// Back to defaults
    Reset,
    /// Change individual settings
    Set(AvatarSetArgs),
}

#[derive(Args, Clone, Debug)]
struct AvatarSetArgs {
    /// Primary colour (#rrggbb)
    #[arg(long)]
    primary_color: Option<Color>,
    /// Secondary colour (#rrggbb)
    #[arg(long)]
    secondary_color: Option<Color>,
    /// Eye colour (#rrggbb)
    #[arg(long)]
    eye_color: Option<Color>,
    /// Overall scale
    #[arg(long)]
    size: Option<f32>,
    /// Glow intensity (0-1)
    #[arg(long)]
    glow_intensity: Option<f32>,
    /// Expressiveness (0-1)
    #[arg(long)]
    expressiveness: Option<f32>,
    /// Energy (0-1)
    #[arg(long)]
    energy: Option<f32>,
    /// Float speed
    #[arg(long)]
    float_speed: Option<f32>,
    /// Sway amount
    #[arg(long)]
    rotation_intensity: Option<f32>,
    /// Ambient sparkle count
    #[arg(long)]
    particle_count: Option<u32>,
    /// Draw eyes and mouth
    #[arg(long)]
    facial_expressions: Option<bool>,
    /// Draw hands
    #[arg(long)]
    hand_gestures: Option<bool>,
    /// Draw sparkles and ornaments
    #[arg(long)]
    environment_effects: Option<bool>,
}

impl From<AvatarSetArgs> for AvatarConfigPatch {
    fn from(args: AvatarSetArgs) -> Self {
        Self {
            primary_color: args.primary_color,
            secondary_color: args.secondary_color,
            eye_color: args.eye_color,
            size: args.size,
            glow_intensity: args.glow_intensity,
            personality: None,
            expressiveness: args.expressiveness,
            energy: args.energy,
            float_speed: args.float_speed,
            rotation_intensity: args.rotation_intensity,
            particle_count: args.particle_count,
            enable_facial_expressions: args.facial_expressions,
            enable_hand_gestures: args.hand_gestures,
            enable_environment_effects: args.environment_effects,
        }
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Topic that picks the scene and overlay
    #[arg(long)]
    topic: Option<String>,
    /// Force a scene
    #[arg(long)]
    scene: Option<EnvironmentScene>,
    /// Number of frames
    #[arg(long, default_value_t = 60)]
    frames: u32,
    /// Seconds per frame
    #[arg(long, default_value_t = 0.016)]
    dt: f32,
    /// Professor is listening
    #[arg(long)]
    listening: bool,
    /// Professor is speaking
    #[arg(long)]
    speaking: bool,
    /// Print the last frame as JSON
    #[arg(long)]
    json: bool,
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so JSON output on stdout stays clean.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("professor={level},professor_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<ProfessorConfig> {
    let mut config = load_config_from_path(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(provider) = cli.provider {
        overrides = overrides.with_provider(provider);
    }
    if let Some(model) = &cli.model {
        overrides = overrides.with_model(model.clone());
    }
    if let Some(url) = &cli.base_url {
        overrides = overrides.with_base_url(url.clone());
    }
    if let Some(secs) = cli.timeout {
        overrides = overrides.with_request_timeout_secs(secs);
    }
    if let Some(dir) = &cli.data_dir {
        overrides = overrides.with_data_dir(dir.clone());
    }
    if let Some(seed) = cli.seed {
        overrides = overrides.with_seed(seed);
    }
    overrides.apply(&mut config);
    config.validate()?;

    info!(
        source = %config.source(),
        provider = %config.llm.provider,
        data_dir = %config.storage.data_dir().display(),
        "Configuration loaded"
    );
    Ok(config)
}

fn local_store(config: &ProfessorConfig) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(config.storage.data_dir()))
}

async fn open_library(cli: &Cli, config: &ProfessorConfig) -> Result<CourseLibrary> {
    let mut library = CourseLibrary::new(local_store(config));

    if let Some((url, anon_key)) = config.storage.hosted() {
        let hosted = SupabaseStore::new(url, anon_key, config.llm.request_timeout())?;
        library = library.with_hosted(Arc::new(hosted));
    }

    let session = match (&cli.user_id, &cli.access_token) {
        (Some(user_id), Some(access_token)) => Some(Session {
            user_id: user_id.clone(),
            access_token: access_token.clone(),
        }),
        (Some(_), None) | (None, Some(_)) => {
            warn!("Both a user id and an access token are needed for hosted storage; using local storage");
            None
        }
        (None, None) => None,
    };
    library.set_session(session);
    library.reload().await.context("Failed to load saved courses")?;
    Ok(library)
}

/// Cancel `token` on Ctrl-C
fn cancel_on_interrupt(token: &CancelToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

fn report_origin<T>(outcome: &Generated<T>) {
    if let Origin::Fallback { reason } = &outcome.origin {
        eprintln!("note: generation unavailable ({reason}); showing template content");
    }
}

fn print_course(course: &Course) {
    println!("{} [{}]", course.title, course.id);
    println!("{}", course.description);
    println!("{} · {}", course.difficulty, course.estimated_duration);
    for module in &course.modules {
        println!("  {} {} ({})", module.id, module.title, module.duration);
        for topic in &module.topics {
            println!("      - {topic}");
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    match &cli.command {
        Command::Generate { topic, save, json } => {
            let service = CourseService::from_settings(build_backend(&config.llm)?, &config.llm);
            let token = CancelToken::new();
            cancel_on_interrupt(&token);

            let outcome = service.generate_course(topic, &token).await?;
            report_origin(&outcome);
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome.value)?);
            } else {
                print_course(&outcome.value);
            }

            if *save {
                let mut library = open_library(&cli, &config).await?;
                let id = outcome.value.id.clone();
                library.save_course(outcome.value).await.context("Failed to save course")?;
                info!(course_id = %id, target = ?library.target(), "Course saved");
            }
        }

        Command::Lesson {
            topic,
            module,
            title,
            difficulty,
            json,
        } => {
            let service = CourseService::from_settings(build_backend(&config.llm)?, &config.llm);
            let token = CancelToken::new();
            cancel_on_interrupt(&token);

            let request = LessonRequest {
                lesson_title: title.clone().unwrap_or_else(|| topic.clone()),
                topic: topic.clone(),
                module_title: module.clone(),
                difficulty: *difficulty,
            };
            let outcome = service.generate_lesson(&request, &token).await?;
            report_origin(&outcome);

            let lesson = &outcome.value;
            if *json {
                println!("{}", serde_json::to_string_pretty(lesson)?);
            } else {
                println!("{}\n", lesson.introduction);
                for objective in &lesson.learning_objectives {
                    println!("  * {objective}");
                }
                println!("\n{}\n", lesson.content.explanation);
                for point in &lesson.content.key_points {
                    println!("  - {point}");
                }
                for exercise in &lesson.exercises {
                    println!("\nQ: {}", exercise.question);
                    for option in &exercise.options {
                        println!("   ( ) {option}");
                    }
                }
            }
        }

        Command::Ask {
            question,
            context,
            course,
        } => {
            let service = CourseService::from_settings(build_backend(&config.llm)?, &config.llm);
            let token = CancelToken::new();
            cancel_on_interrupt(&token);

            let outcome = service.ask_question(context, question, &token).await?;
            println!("{}", outcome.value);

            if course.is_some() {
                let library = open_library(&cli, &config).await?;
                for message in [
                    ChatMessage::now(course.clone(), MessageRole::User, question.as_str()),
                    ChatMessage::now(course.clone(), MessageRole::Assistant, outcome.value.as_str()),
                ] {
                    if let Err(e) = library.save_message(&message).await {
                        warn!(error = %e, "Failed to save chat message");
                    }
                }
            }
        }

        Command::Courses(sub) => {
            let mut library = open_library(&cli, &config).await?;
            match sub {
                CoursesCommand::List => {
                    if library.courses().is_empty() {
                        println!("No saved courses.");
                    }
                    for course in library.courses() {
                        println!(
                            "{}  {}  ({} modules, {})",
                            course.id,
                            course.title,
                            course.modules.len(),
                            course.difficulty
                        );
                    }
                }
                CoursesCommand::Show { id } => {
                    let course = library
                        .get(id)
                        .with_context(|| format!("No course with id {id}"))?;
                    print_course(course);
                }
                CoursesCommand::Delete { id } => {
                    if library.delete_course(id).await? {
                        println!("Deleted {id}");
                    } else {
                        anyhow::bail!("No course with id {id}");
                    }
                }
            }
        }

        Command::Avatar(sub) => {
            let store = AvatarConfigStore::new(local_store(&config));
            let current = store.load();
            let action = match sub {
                AvatarCommand::Show => {
                    println!("{}", serde_json::to_string_pretty(&current)?);
                    return Ok(());
                }
                AvatarCommand::Preset { personality } => ConfigAction::ApplyPreset(*personality),
                AvatarCommand::Personality { personality } => ConfigAction::SetPersonality(*personality),
                AvatarCommand::Reset => ConfigAction::Reset,
                AvatarCommand::Set(args) => {
                    let patch = AvatarConfigPatch::from(args.clone());
                    if patch.is_empty() {
                        anyhow::bail!("Nothing to change; pass at least one setting");
                    }
                    ConfigAction::Update(patch)
                }
            };

            let next = current.reduce(&action);
            store.save(&next).context("Failed to save avatar settings")?;
            println!("{}", serde_json::to_string_pretty(&next)?);
        }

        Command::Simulate(args) => simulate(&config, args)?,
    }

    Ok(())
}

fn simulate(config: &ProfessorConfig, args: &SimulateArgs) -> Result<()> {
    let avatar = AvatarConfigStore::new(local_store(config)).load();
    let seed = simulation_seed(config.animation.seed);
    let mut engine = ProfessorEngine::new(avatar, seed, config.animation.reference_frame_secs);

    engine.dispatch(Action::SetTopic(args.topic.clone()));
    if let Some(scene) = args.scene {
        engine.dispatch(Action::SetScene(scene));
    }
    if args.listening {
        engine.dispatch(Action::StartListening);
    }
    if args.speaking {
        engine.dispatch(Action::StartSpeaking);
    }
    info!(seed, frames = args.frames, scene = %engine.state().scene(), "Simulating");

    let mut last = None;
    let mut blinks = 0u32;
    for _ in 0..args.frames {
        let frame = engine.tick(args.dt);
        if frame.avatar.face.as_ref().is_some_and(|face| face.blinking) {
            blinks += 1;
        }
        last = Some(frame);
    }

    let Some(frame) = last else {
        return Ok(());
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        println!(
            "t={:.3}s scene={} emotion={:?} gesture={:?} blinks={blinks}",
            frame.tick.elapsed, frame.scene, frame.avatar.emotion, frame.avatar.gesture
        );
        println!(
            "environment: {} primitives, {} lights; overlay: {:?}; camera auto-rotate: {}",
            frame.environment.primitives.len(),
            frame.environment.lights.len(),
            frame.overlay,
            frame.camera.auto_rotate
        );
    }
    Ok(())
}

/// The configured seed, or a fresh random one
fn simulation_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(rand::random)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["professor", "generate", "Chess", "--save", "--model", "llama3.2"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("llama3.2"));
        assert!(matches!(cli.command, Command::Generate { save: true, json: false, .. }));

        let cli = Cli::try_parse_from(["professor", "avatar", "preset", "Wise"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Avatar(AvatarCommand::Preset {
                personality: Personality::Wise
            })
        ));

        assert!(Cli::try_parse_from(["professor", "avatar", "preset", "grumpy"]).is_err());
    }

    #[test]
    fn test_set_args_become_patch() {
        let cli = Cli::try_parse_from(["professor", "avatar", "set", "--energy", "0.9", "--primary-color", "#112233"])
            .unwrap();
        let Command::Avatar(AvatarCommand::Set(args)) = cli.command else {
            panic!("expected avatar set");
        };
        let patch = AvatarConfigPatch::from(args);
        assert_eq!(patch.energy, Some(0.9));
        assert_eq!(patch.primary_color, Some(Color::from_hex("#112233").unwrap()));
        assert!(patch.size.is_none());
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["professor", "simulate", "--scene", "space"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.frames, 60);
        assert_eq!(args.scene, Some(EnvironmentScene::Space));
    }

    #[test]
    fn test_simulation_seed() {
        assert_eq!(simulation_seed(Some(7)), 7);
        let draws: std::collections::HashSet<u64> = (0..8).map(|_| simulation_seed(None)).collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn test_avatar_commands_persist() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ProfessorConfig::new();
        config.storage.data_dir = Some(dir.path().to_path_buf());

        let store = AvatarConfigStore::new(local_store(&config));
        let next = store.load().reduce(&ConfigAction::ApplyPreset(Personality::Technical));
        store.save(&next).unwrap();

        let reloaded = AvatarConfigStore::new(local_store(&config)).load();
        assert_eq!(reloaded.personality, Personality::Technical);
    }
}
