//! The professor avatar
//!
//! - [`config`]: learner-tunable settings, personality presets and their reducer
//! - [`state`]: emotion, gesture, scene and label derivation
//! - [`animator`]: per-tick procedural animation

pub mod animator;
pub mod config;
pub mod state;

pub use animator::{AnimationInputs, AvatarAnimator, AvatarFrame};
pub use config::{
    presets, AvatarConfig, AvatarConfigPatch, AvatarConfigStore, ConfigAction, Personality, PersonalityPreset,
    UnknownPersonality, AVATAR_CONFIG_KEY,
};
pub use state::{
    derive_emotion, next_gesture, select_environment, status_label, topic_label, Emotion, Gesture,
    InteractionSignals,
};
