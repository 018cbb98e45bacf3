//! Avatar state derivation
//!
//! Pure functions from interaction signals and configuration to the
//! professor's emotion, gesture, scene and status text. Nothing here holds
//! state; the gesture roll takes the RNG as an argument so callers decide
//! whether it is seeded.
//!
//! # Priority rules
//!
//! ```text
//! emotion:  speaking → Explaining
//!           listening → Focused
//!           otherwise → personality's resting emotion
//!
//! gesture:  begins speaking → random of {Explaining, Pointing, Welcoming}
//!           still speaking  → unchanged
//!           listening       → Thinking
//!           otherwise       → Idle
//! ```

use glam::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::Personality;
use crate::scene::EnvironmentScene;

/// What the learner and professor are currently doing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct InteractionSignals {
    /// Microphone is capturing the learner
    pub listening: bool,
    /// Professor is talking
    pub speaking: bool,
}

impl InteractionSignals {
    /// Neither listening nor speaking
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            listening: false,
            speaking: false,
        }
    }

    /// Either signal is on
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.listening || self.speaking
    }
}

/// Facial emotion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// Resting face
    #[default]
    Neutral,
    /// Smiling
    Happy,
    /// Wide-eyed
    Excited,
    /// Narrowed eyes, attentive
    Focused,
    /// Puzzled
    Confused,
    /// Mid-explanation
    Explaining,
}

/// Eye and mouth proportions for an emotion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expression {
    /// Uniform eye scale
    pub eye_scale: f32,
    /// Eye height on the face
    pub eye_y: f32,
    /// Base mouth scale
    pub mouth_scale: f32,
}

impl Emotion {
    /// Face proportions for this emotion
    #[must_use]
    pub const fn expression(self) -> Expression {
        let (eye_scale, eye_y, mouth_scale) = match self {
            Self::Neutral => (1.0, 0.1, 0.05),
            Self::Happy => (0.8, 0.15, 0.08),
            Self::Excited => (1.2, 0.12, 0.1),
            Self::Focused => (0.9, 0.08, 0.03),
            Self::Confused => (1.1, 0.05, 0.04),
            Self::Explaining => (1.0, 0.13, 0.07),
        };
        Expression {
            eye_scale,
            eye_y,
            mouth_scale,
        }
    }
}

/// Hand gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    /// Hands at rest
    #[default]
    Idle,
    /// Both hands out to the sides
    Explaining,
    /// Right hand raised forward
    Pointing,
    /// Arms open
    Welcoming,
    /// Right hand near the chin
    Thinking,
}

/// Gestures picked from when speech begins
pub const SPEAKING_GESTURES: [Gesture; 3] = [Gesture::Explaining, Gesture::Pointing, Gesture::Welcoming];

impl Gesture {
    /// Left and right hand targets before expressiveness scaling
    #[must_use]
    pub fn hand_targets(self) -> (Vec3, Vec3) {
        match self {
            Self::Idle => (Vec3::ZERO, Vec3::ZERO),
            Self::Explaining => (Vec3::new(-1.5, 0.5, 1.0), Vec3::new(1.5, 0.5, 1.0)),
            Self::Pointing => (Vec3::ZERO, Vec3::new(1.8, 0.8, 1.2)),
            Self::Welcoming => (Vec3::new(-1.2, 0.3, 0.8), Vec3::new(1.2, 0.3, 0.8)),
            Self::Thinking => (Vec3::ZERO, Vec3::new(0.5, 1.2, 0.8)),
        }
    }
}

/// Emotion the personality falls back to when nothing is happening
#[must_use]
pub const fn resting_emotion(personality: Personality) -> Emotion {
    match personality {
        Personality::Friendly => Emotion::Happy,
        Personality::Professional | Personality::Wise => Emotion::Neutral,
        Personality::Enthusiastic => Emotion::Excited,
        Personality::Technical => Emotion::Focused,
    }
}

/// Derive the current emotion
#[must_use]
pub const fn derive_emotion(signals: InteractionSignals, personality: Personality) -> Emotion {
    if signals.speaking {
        Emotion::Explaining
    } else if signals.listening {
        Emotion::Focused
    } else {
        resting_emotion(personality)
    }
}

/// Next gesture after a change of signals
///
/// A fresh speaking gesture is rolled only on the transition into speaking;
/// while speech continues the current gesture is held.
pub fn next_gesture<R: Rng + ?Sized>(
    previous: InteractionSignals,
    next: InteractionSignals,
    current: Gesture,
    rng: &mut R,
) -> Gesture {
    if next.speaking {
        if !previous.speaking || !SPEAKING_GESTURES.contains(&current) {
            return SPEAKING_GESTURES
                .choose(rng)
                .copied()
                .unwrap_or(Gesture::Explaining);
        }
        current
    } else if next.listening {
        Gesture::Thinking
    } else {
        Gesture::Idle
    }
}

/// Keyword families tried in order when picking a scene for a topic
pub const SCENE_RULES: [(&[&str], EnvironmentScene); 5] = [
    (&["science", "chemistry", "physics"], EnvironmentScene::Laboratory),
    (&["math", "literature", "history"], EnvironmentScene::Library),
    (&["nature", "biology", "environment"], EnvironmentScene::Nature),
    (&["space", "astronomy", "cosmos"], EnvironmentScene::Space),
    (&["traditional", "basic", "elementary"], EnvironmentScene::Classroom),
];

/// Case-insensitive substring match against any keyword
#[must_use]
pub fn contains_any(topic: &str, keywords: &[&str]) -> bool {
    let lower = topic.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Pick the environment for a topic
///
/// The first matching keyword family wins; no topic or no match gives the
/// futuristic scene.
#[must_use]
pub fn select_environment(topic: Option<&str>) -> EnvironmentScene {
    let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) else {
        return EnvironmentScene::Futuristic;
    };
    SCENE_RULES
        .iter()
        .find(|(keywords, _)| contains_any(topic, keywords))
        .map_or(EnvironmentScene::Futuristic, |(_, scene)| *scene)
}

/// Status line floating above the professor
#[must_use]
pub fn status_label(signals: InteractionSignals, personality: Personality) -> String {
    if signals.listening {
        "🎤 Listening...".to_string()
    } else if signals.speaking {
        "🗣️ Speaking...".to_string()
    } else {
        format!("AI Professor ({personality})")
    }
}

/// Topic badge, absent when there is no topic
#[must_use]
pub fn topic_label(topic: Option<&str>) -> Option<String> {
    topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("📚 {t}"))
}
