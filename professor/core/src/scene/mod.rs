//! Scene Composition
//!
//! Assembles everything a renderer needs for one frame: the active
//! environment, an optional topic overlay, the audio visualizer stack, the
//! camera rig and the avatar itself.
//!
//! # Design
//!
//! ```text
//!   AvatarConfig ──► ScenePalette ─┬─► Environment::frame ──┐
//!                                  ├─► ContextOverlay ──────┤
//!   signals ──► audio_intensity ───┴─► MultiLayerVisualizer ┼─► SceneFrame
//!   signals, energy ──► CameraRig ──────────────────────────┤
//!   AvatarAnimator::tick ──► AvatarFrame ───────────────────┘
//! ```
//!
//! Exactly one environment is live at a time. Switching scenes replaces it
//! immediately; there is no cross-fade.

pub mod environment;
pub mod overlay;
pub mod visualizer;

use std::f32::consts::PI;

use glam::Vec3;
use serde::Serialize;

pub use environment::{Environment, EnvironmentFrame, EnvironmentInputs, EnvironmentScene, ScenePalette, SceneLayout};
pub use overlay::{select_overlay, ContextOverlay};
pub use visualizer::{audio_intensity, AudioVisualizer, MultiLayerVisualizer, VisualizerFrame, VisualizerKind};

use crate::animation::{FrameTick, Primitive};
use crate::avatar::animator::AvatarFrame;
use crate::avatar::config::AvatarConfig;
use crate::avatar::state::InteractionSignals;

impl ScenePalette {
    /// Palette taken from the avatar configuration
    #[must_use]
    pub fn from_config(config: &AvatarConfig) -> Self {
        Self {
            primary: config.primary_color,
            secondary: config.secondary_color,
            accent: config.eye_color,
        }
    }
}

/// Orbit camera settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CameraRig {
    /// Camera position
    pub position: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Slowly orbit the professor
    pub auto_rotate: bool,
    /// Orbit speed
    pub auto_rotate_speed: f32,
    /// Lowest polar angle the user can orbit to
    pub min_polar_angle: f32,
    /// Highest polar angle the user can orbit to
    pub max_polar_angle: f32,
    /// Scroll zoom
    pub enable_zoom: bool,
    /// Drag pan
    pub enable_pan: bool,
}

impl CameraRig {
    /// Rig for the current interaction state
    ///
    /// The camera only orbits while the professor is idle.
    #[must_use]
    pub fn for_state(signals: InteractionSignals, energy: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 8.0),
            fov: 50.0,
            auto_rotate: !signals.is_active(),
            auto_rotate_speed: 0.5 * energy,
            min_polar_angle: PI / 3.0,
            max_polar_angle: PI / 1.5,
            enable_zoom: false,
            enable_pan: false,
        }
    }
}

/// Everything rendered in one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneFrame {
    /// Tick that produced this frame
    pub tick: FrameTick,
    /// Active environment
    pub scene: EnvironmentScene,
    /// Environment contents
    pub environment: EnvironmentFrame,
    /// Overlay chosen for the topic
    pub overlay: Option<ContextOverlay>,
    /// Overlay contents
    pub overlay_primitives: Vec<Primitive>,
    /// Audio visualizer layers
    pub visualizers: Vec<VisualizerFrame>,
    /// Camera
    pub camera: CameraRig,
    /// The professor
    pub avatar: AvatarFrame,
}

/// Inputs to [`SceneComposer::compose`] beyond the avatar frame
#[derive(Clone, Copy, Debug)]
pub struct CompositionInputs<'a> {
    /// Current configuration
    pub config: &'a AvatarConfig,
    /// Listening and speaking flags
    pub signals: InteractionSignals,
    /// Current topic
    pub topic: Option<&'a str>,
}

/// Owns the live environment and composes frames around it
#[derive(Clone, Debug)]
pub struct SceneComposer {
    seed: u64,
    environment: Environment,
}

impl SceneComposer {
    /// Composer starting in `scene`, with layouts rolled from `seed`
    #[must_use]
    pub fn new(scene: EnvironmentScene, seed: u64) -> Self {
        Self {
            seed,
            environment: Environment::new(scene, seed),
        }
    }

    /// Active scene
    #[must_use]
    pub fn scene(&self) -> EnvironmentScene {
        self.environment.scene()
    }

    /// Live environment
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Switch to `scene`
    ///
    /// Returns `true` if the environment was replaced. Switching to the
    /// active scene keeps its layout.
    pub fn set_scene(&mut self, scene: EnvironmentScene) -> bool {
        if scene == self.environment.scene() {
            return false;
        }
        tracing::debug!(from = %self.environment.scene(), to = %scene, "Switching environment");
        self.environment = Environment::new(scene, self.seed);
        true
    }

    /// Compose a frame around an already animated avatar
    #[must_use]
    pub fn compose(&self, tick: &FrameTick, inputs: &CompositionInputs<'_>, avatar: AvatarFrame) -> SceneFrame {
        let config = inputs.config;
        let t = tick.elapsed;
        let active = inputs.signals.is_active();
        let palette = ScenePalette::from_config(config);

        let environment = self.environment.frame(
            t,
            &EnvironmentInputs {
                palette,
                intensity: config.glow_intensity,
                active,
            },
        );

        let overlay = select_overlay(inputs.topic);
        let overlay_primitives = overlay.map(|o| o.primitives(&palette, active)).unwrap_or_default();

        let stack = MultiLayerVisualizer::new(
            audio_intensity(inputs.signals, config.energy),
            config.primary_color,
            config.secondary_color,
        );

        SceneFrame {
            tick: *tick,
            scene: self.environment.scene(),
            environment,
            overlay,
            overlay_primitives,
            visualizers: stack.frame(t, active),
            camera: CameraRig::for_state(inputs.signals, config.energy),
            avatar,
        }
    }
}
