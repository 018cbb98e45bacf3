//! Application state and the engine that drives a frame loop
//!
//! # Design
//!
//! ```text
//!   host input ──► Action ──► reduce(state, action, rng) ──► (AppState, Vec<Effect>)
//!                                                                 │
//!                                         effects ◄───────────────┘ (host persists)
//!
//!   host frame ──► ProfessorEngine::tick(dt) ──► FrameClock ──► AvatarAnimator ──► SceneComposer ──► SceneFrame
//! ```
//!
//! All mutation funnels through [`reduce`]. The engine is the single writer:
//! network results come back to it as actions, never by touching state
//! directly.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{FrameClock, FrameTick};
use crate::avatar::animator::{AnimationInputs, AvatarAnimator};
use crate::avatar::config::{AvatarConfig, ConfigAction};
use crate::avatar::state::{derive_emotion, next_gesture, select_environment, Emotion, Gesture, InteractionSignals};
use crate::scene::{CompositionInputs, EnvironmentScene, SceneComposer, SceneFrame};

/// Everything a frame is derived from
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// Avatar configuration
    pub config: AvatarConfig,
    /// Listening and speaking flags
    pub signals: InteractionSignals,
    /// Current topic, trimmed and non-empty
    pub topic: Option<String>,
    /// Scene picked from the last topic
    pub topic_scene: EnvironmentScene,
    /// Scene chosen explicitly, until the next topic
    pub scene_override: Option<EnvironmentScene>,
    /// Current gesture
    pub gesture: Gesture,
    /// Pointer in normalized device coordinates
    pub pointer: Vec2,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AvatarConfig::default())
    }
}

impl AppState {
    /// Idle state with `config`
    #[must_use]
    pub fn new(config: AvatarConfig) -> Self {
        Self {
            config,
            signals: InteractionSignals::idle(),
            topic: None,
            topic_scene: EnvironmentScene::default(),
            scene_override: None,
            gesture: Gesture::Idle,
            pointer: Vec2::ZERO,
        }
    }

    /// Scene to render
    #[must_use]
    pub fn scene(&self) -> EnvironmentScene {
        self.scene_override.unwrap_or(self.topic_scene)
    }

    /// Current emotion
    #[must_use]
    pub fn emotion(&self) -> Emotion {
        derive_emotion(self.signals, self.config.personality)
    }
}

/// Something that happened
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// The microphone opened
    StartListening,
    /// The microphone closed
    StopListening,
    /// The professor started talking
    StartSpeaking,
    /// The professor stopped talking
    StopSpeaking,
    /// A new topic, or `None` to clear it
    SetTopic(Option<String>),
    /// Pick a scene regardless of topic
    SetScene(EnvironmentScene),
    /// Change the avatar configuration
    Config(ConfigAction),
    /// Pointer moved (normalized device coordinates)
    SetPointer(Vec2),
}

/// Work the host has to do after a reduction
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Store this configuration
    PersistConfig(AvatarConfig),
}

/// Apply `action` to `state`
///
/// The RNG is consulted only when speaking begins, to roll a gesture.
/// A cleared topic keeps the current scene.
pub fn reduce<R: Rng + ?Sized>(state: AppState, action: Action, rng: &mut R) -> (AppState, Vec<Effect>) {
    let mut next = state;
    let mut effects = Vec::new();

    let signals = match action {
        Action::StartListening => Some(InteractionSignals {
            listening: true,
            ..next.signals
        }),
        Action::StopListening => Some(InteractionSignals {
            listening: false,
            ..next.signals
        }),
        Action::StartSpeaking => Some(InteractionSignals {
            speaking: true,
            ..next.signals
        }),
        Action::StopSpeaking => Some(InteractionSignals {
            speaking: false,
            ..next.signals
        }),
        Action::SetTopic(topic) => {
            next.topic = topic.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
            if let Some(topic) = next.topic.as_deref() {
                next.topic_scene = select_environment(Some(topic));
                next.scene_override = None;
            }
            None
        }
        Action::SetScene(scene) => {
            next.scene_override = Some(scene);
            None
        }
        Action::Config(config_action) => {
            let config = next.config.clone().reduce(&config_action);
            if config != next.config {
                effects.push(Effect::PersistConfig(config.clone()));
                next.config = config;
            }
            None
        }
        Action::SetPointer(pointer) => {
            next.pointer = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
            None
        }
    };

    if let Some(signals) = signals {
        next.gesture = next_gesture(next.signals, signals, next.gesture, rng);
        next.signals = signals;
    }

    (next, effects)
}

/// Owns the state and everything needed to turn it into frames
pub struct ProfessorEngine {
    state: AppState,
    rng: StdRng,
    clock: FrameClock,
    animator: AvatarAnimator,
    composer: SceneComposer,
}

impl ProfessorEngine {
    /// Engine with `config`, a seed for every random choice and the
    /// reference frame duration the accumulators are tuned to
    #[must_use]
    pub fn new(config: AvatarConfig, seed: u64, reference_frame_secs: f32) -> Self {
        let state = AppState::new(config);
        let composer = SceneComposer::new(state.scene(), seed);
        Self {
            state,
            rng: StdRng::seed_from_u64(seed),
            clock: FrameClock::with_reference(reference_frame_secs),
            animator: AvatarAnimator::new(),
            composer,
        }
    }

    /// Current state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an action and return the effects the host should carry out
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        tracing::debug!(?action, "Dispatch");
        let state = std::mem::take(&mut self.state);
        let (state, effects) = reduce(state, action, &mut self.rng);
        self.state = state;
        if self.composer.set_scene(self.state.scene()) {
            tracing::info!(scene = %self.state.scene(), "Scene changed");
        }
        effects
    }

    /// Advance the clock by `dt` seconds and build the frame
    pub fn tick(&mut self, dt: f32) -> SceneFrame {
        let tick = self.clock.advance(dt);
        self.frame(&tick)
    }

    fn frame(&mut self, tick: &FrameTick) -> SceneFrame {
        let state = &self.state;
        let topic = state.topic.as_deref();
        let avatar = self.animator.tick(
            tick,
            &AnimationInputs {
                config: &state.config,
                signals: state.signals,
                emotion: state.emotion(),
                gesture: state.gesture,
                pointer: state.pointer,
                topic,
            },
        );
        self.composer.compose(
            tick,
            &CompositionInputs {
                config: &state.config,
                signals: state.signals,
                topic,
            },
            avatar,
        )
    }

    /// Start over as if freshly mounted: clock and accumulators return to
    /// zero, state is kept
    pub fn remount(&mut self) {
        self.clock.reset();
        self.animator.reset();
    }
}
