//! Avatar configuration
//!
//! The learner-tunable look and feel of the professor. Five personality
//! presets each bundle a palette and motion profile; everything else can be
//! adjusted field by field through [`AvatarConfigPatch`].
//!
//! Configuration changes go through [`AvatarConfig::reduce`] so that every
//! change is a pure value transition. Persistence lives in
//! [`AvatarConfigStore`], which writes the whole config as camelCase JSON
//! under the `avatarConfig` key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{palette, Color};
use crate::storage::{read_json, write_json, KeyValueStore, StorageError};

/// Storage key for the persisted configuration
pub const AVATAR_CONFIG_KEY: &str = "avatarConfig";

/// Professor personality
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Warm and encouraging
    #[default]
    Friendly,
    /// Focused and methodical
    Professional,
    /// Energetic and passionate
    Enthusiastic,
    /// Calm and experienced
    Wise,
    /// Precise and analytical
    Technical,
}

impl Personality {
    /// Every personality, in presentation order
    pub const ALL: [Personality; 5] = [
        Self::Friendly,
        Self::Professional,
        Self::Enthusiastic,
        Self::Wise,
        Self::Technical,
    ];

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Professional => "professional",
            Self::Enthusiastic => "enthusiastic",
            Self::Wise => "wise",
            Self::Technical => "technical",
        }
    }

    /// Preset bundled with this personality
    #[must_use]
    pub fn preset(self) -> &'static PersonalityPreset {
        match self {
            Self::Friendly => &PRESETS[0],
            Self::Professional => &PRESETS[1],
            Self::Enthusiastic => &PRESETS[2],
            Self::Wise => &PRESETS[3],
            Self::Technical => &PRESETS[4],
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A personality name that is not one of the five
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown personality '{0}' (expected friendly, professional, enthusiastic, wise or technical)")]
pub struct UnknownPersonality(pub String);

impl FromStr for Personality {
    type Err = UnknownPersonality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| UnknownPersonality(s.to_string()))
    }
}

/// Palette and motion profile applied by a personality preset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersonalityPreset {
    /// Personality this preset belongs to
    pub personality: Personality,
    /// Head and main accent colour
    pub primary_color: Color,
    /// Listening colour and secondary accent
    pub secondary_color: Color,
    /// Motion energy (0.0-1.0)
    pub energy: f32,
    /// Facial and gesture expressiveness (0.0-1.0)
    pub expressiveness: f32,
    /// Float bob speed
    pub float_speed: f32,
    /// One-line description shown next to the preset
    pub description: &'static str,
}

static PRESETS: [PersonalityPreset; 5] = [
    PersonalityPreset {
        personality: Personality::Friendly,
        primary_color: palette::EMERALD,
        secondary_color: palette::AMBER,
        energy: 0.8,
        expressiveness: 0.9,
        float_speed: 2.5,
        description: "Warm, approachable, and encouraging",
    },
    PersonalityPreset {
        personality: Personality::Professional,
        primary_color: palette::BLUE,
        secondary_color: palette::SLATE,
        energy: 0.5,
        expressiveness: 0.6,
        float_speed: 1.5,
        description: "Focused, knowledgeable, and methodical",
    },
    PersonalityPreset {
        personality: Personality::Enthusiastic,
        primary_color: palette::AMBER,
        secondary_color: palette::RED,
        energy: 0.95,
        expressiveness: 1.0,
        float_speed: 3.0,
        description: "Energetic, passionate, and inspiring",
    },
    PersonalityPreset {
        personality: Personality::Wise,
        primary_color: palette::PURPLE,
        secondary_color: palette::INDIGO,
        energy: 0.4,
        expressiveness: 0.5,
        float_speed: 1.0,
        description: "Thoughtful, experienced, and calm",
    },
    PersonalityPreset {
        personality: Personality::Technical,
        primary_color: palette::CYAN,
        secondary_color: palette::DARK_CYAN,
        energy: 0.6,
        expressiveness: 0.4,
        float_speed: 2.0,
        description: "Precise, analytical, and detail-oriented",
    },
];

/// Every preset, in presentation order
#[must_use]
pub fn presets() -> &'static [PersonalityPreset] {
    &PRESETS
}

/// Learner-tunable avatar configuration
///
/// Fields missing from stored data take their default values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvatarConfig {
    /// Head and main accent colour
    pub primary_color: Color,
    /// Listening colour and secondary accent
    pub secondary_color: Color,
    /// Eye glow colour
    pub eye_color: Color,
    /// Overall scale
    pub size: f32,
    /// Glow and light intensity (0.0-1.0)
    pub glow_intensity: f32,
    /// Personality
    pub personality: Personality,
    /// Facial and gesture expressiveness (0.0-1.0)
    pub expressiveness: f32,
    /// Motion energy (0.0-1.0)
    pub energy: f32,
    /// Float bob speed
    pub float_speed: f32,
    /// Group sway amount
    pub rotation_intensity: f32,
    /// Number of ambient sparkles
    pub particle_count: u32,
    /// Draw eyes and mouth
    pub enable_facial_expressions: bool,
    /// Draw hands
    pub enable_hand_gestures: bool,
    /// Draw sparkles and personality ornaments
    pub enable_environment_effects: bool,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            primary_color: palette::VIOLET,
            secondary_color: palette::CYAN,
            eye_color: palette::SKY,
            size: 1.0,
            glow_intensity: 0.5,
            personality: Personality::Friendly,
            expressiveness: 0.7,
            energy: 0.6,
            float_speed: 2.0,
            rotation_intensity: 0.3,
            particle_count: 100,
            enable_facial_expressions: true,
            enable_hand_gestures: true,
            enable_environment_effects: true,
        }
    }
}

/// Partial update; `None` fields are left alone
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvatarConfigPatch {
    /// New primary colour
    pub primary_color: Option<Color>,
    /// New secondary colour
    pub secondary_color: Option<Color>,
    /// New eye colour
    pub eye_color: Option<Color>,
    /// New size
    pub size: Option<f32>,
    /// New glow intensity
    pub glow_intensity: Option<f32>,
    /// New personality (does not apply its preset)
    pub personality: Option<Personality>,
    /// New expressiveness
    pub expressiveness: Option<f32>,
    /// New energy
    pub energy: Option<f32>,
    /// New float speed
    pub float_speed: Option<f32>,
    /// New rotation intensity
    pub rotation_intensity: Option<f32>,
    /// New particle count
    pub particle_count: Option<u32>,
    /// Toggle facial expressions
    pub enable_facial_expressions: Option<bool>,
    /// Toggle hand gestures
    pub enable_hand_gestures: Option<bool>,
    /// Toggle environment effects
    pub enable_environment_effects: Option<bool>,
}

impl AvatarConfigPatch {
    /// True when the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, config: &mut AvatarConfig) {
        macro_rules! merge {
            ($patch:ident => $target:ident: $($field:ident),* $(,)?) => {
                $(if let Some(v) = $patch.$field { $target.$field = v; })*
            };
        }
        let patch = self;
        merge!(
            patch => config:
            primary_color,
            secondary_color,
            eye_color,
            size,
            glow_intensity,
            personality,
            expressiveness,
            energy,
            float_speed,
            rotation_intensity,
            particle_count,
            enable_facial_expressions,
            enable_hand_gestures,
            enable_environment_effects,
        );
    }
}

/// A change to the avatar configuration
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigAction {
    /// Switch personality and take its palette and motion profile
    ApplyPreset(Personality),
    /// Switch personality only
    SetPersonality(Personality),
    /// Merge a partial update
    Update(AvatarConfigPatch),
    /// Back to defaults
    Reset,
}

impl AvatarConfig {
    /// Apply an action, returning the new configuration
    #[must_use]
    pub fn reduce(self, action: &ConfigAction) -> Self {
        match action {
            ConfigAction::ApplyPreset(personality) => self.with_preset(*personality),
            ConfigAction::SetPersonality(personality) => Self {
                personality: *personality,
                ..self
            },
            ConfigAction::Update(patch) => {
                let mut next = self;
                patch.apply(&mut next);
                next
            }
            ConfigAction::Reset => Self::default(),
        }
    }

    /// Take a personality's preset, leaving every other field alone
    #[must_use]
    pub fn with_preset(self, personality: Personality) -> Self {
        let preset = personality.preset();
        Self {
            personality,
            primary_color: preset.primary_color,
            secondary_color: preset.secondary_color,
            energy: preset.energy,
            expressiveness: preset.expressiveness,
            float_speed: preset.float_speed,
            ..self
        }
    }
}

/// Loads and saves the configuration under [`AVATAR_CONFIG_KEY`]
#[derive(Clone)]
pub struct AvatarConfigStore {
    store: Arc<dyn KeyValueStore>,
}

impl AvatarConfigStore {
    /// Wrap a key/value store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the saved configuration
    ///
    /// Missing or corrupt data yields the defaults; corruption is logged.
    #[must_use]
    pub fn load(&self) -> AvatarConfig {
        read_json(self.store.as_ref(), AVATAR_CONFIG_KEY).unwrap_or_default()
    }

    /// Save the whole configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save(&self, config: &AvatarConfig) -> Result<(), StorageError> {
        write_json(self.store.as_ref(), AVATAR_CONFIG_KEY, config)?;
        tracing::debug!(personality = %config.personality, "Saved avatar config");
        Ok(())
    }

    /// Remove the saved configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(AVATAR_CONFIG_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    // ========================================================================
    // Defaults and presets
    // ========================================================================

    #[test]
    fn test_defaults() {
        let config = AvatarConfig::default();
        assert_eq!(config.primary_color.to_hex(), "#7c3aed");
        assert_eq!(config.secondary_color.to_hex(), "#06b6d4");
        assert_eq!(config.eye_color.to_hex(), "#60a5fa");
        assert_eq!(config.personality, Personality::Friendly);
        assert_eq!(config.particle_count, 100);
        assert!(config.enable_facial_expressions);
        assert!(config.enable_hand_gestures);
        assert!(config.enable_environment_effects);
    }

    #[test]
    fn test_preset_lookup_matches_personality() {
        for personality in Personality::ALL {
            assert_eq!(personality.preset().personality, personality);
        }
        assert_eq!(presets().len(), 5);
    }

    #[test]
    fn test_apply_preset_overwrites_exactly_six_fields() {
        let start = AvatarConfig {
            size: 1.7,
            glow_intensity: 0.9,
            eye_color: palette::RED,
            rotation_intensity: 0.1,
            particle_count: 42,
            enable_hand_gestures: false,
            ..AvatarConfig::default()
        };

        let next = start.clone().reduce(&ConfigAction::ApplyPreset(Personality::Wise));

        assert_eq!(next.personality, Personality::Wise);
        assert_eq!(next.primary_color.to_hex(), "#8b5cf6");
        assert_eq!(next.secondary_color.to_hex(), "#6366f1");
        assert!((next.energy - 0.4).abs() < f32::EPSILON);
        assert!((next.expressiveness - 0.5).abs() < f32::EPSILON);
        assert!((next.float_speed - 1.0).abs() < f32::EPSILON);

        // Untouched
        assert!((next.size - start.size).abs() < f32::EPSILON);
        assert!((next.glow_intensity - start.glow_intensity).abs() < f32::EPSILON);
        assert_eq!(next.eye_color, start.eye_color);
        assert!((next.rotation_intensity - start.rotation_intensity).abs() < f32::EPSILON);
        assert_eq!(next.particle_count, start.particle_count);
        assert_eq!(next.enable_hand_gestures, start.enable_hand_gestures);
    }

    #[test]
    fn test_set_personality_keeps_palette() {
        let start = AvatarConfig::default();
        let next = start.clone().reduce(&ConfigAction::SetPersonality(Personality::Technical));
        assert_eq!(next.personality, Personality::Technical);
        assert_eq!(next.primary_color, start.primary_color);
    }

    #[test]
    fn test_update_merges_patch() {
        let patch = AvatarConfigPatch {
            size: Some(1.5),
            enable_facial_expressions: Some(false),
            ..Default::default()
        };
        let next = AvatarConfig::default().reduce(&ConfigAction::Update(patch));
        assert!((next.size - 1.5).abs() < f32::EPSILON);
        assert!(!next.enable_facial_expressions);
        assert!((next.energy - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset() {
        let changed = AvatarConfig::default().reduce(&ConfigAction::ApplyPreset(Personality::Enthusiastic));
        assert_eq!(changed.reduce(&ConfigAction::Reset), AvatarConfig::default());
    }

    #[test]
    fn test_personality_parse() {
        assert_eq!("Wise".parse::<Personality>().unwrap(), Personality::Wise);
        assert!("grumpy".parse::<Personality>().is_err());
    }

    // ========================================================================
    // Serialization and persistence
    // ========================================================================

    #[test]
    fn test_camel_case_wire_form() {
        let json = serde_json::to_value(AvatarConfig::default()).unwrap();
        assert_eq!(json["primaryColor"], "#7c3aed");
        assert_eq!(json["particleCount"], 100);
        assert_eq!(json["enableHandGestures"], true);
        assert_eq!(json["personality"], "friendly");
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch: AvatarConfigPatch = serde_json::from_str(r##"{"eyeColor":"#ffffff"}"##).unwrap();
        assert_eq!(patch.eye_color, Some(Color::WHITE));
        assert!(patch.size.is_none());
        assert!(AvatarConfigPatch::default().is_empty());
    }

    #[test]
    fn test_store_round_trip() {
        let store = AvatarConfigStore::new(Arc::new(MemoryStore::new()));
        let config = AvatarConfig::default().with_preset(Personality::Technical);
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_store_corrupt_data_loads_defaults() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(AVATAR_CONFIG_KEY, "{\"primaryColor\": 12").unwrap();
        let store = AvatarConfigStore::new(backing);
        assert_eq!(store.load(), AvatarConfig::default());
    }

    #[test]
    fn test_store_missing_loads_defaults() {
        let store = AvatarConfigStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load(), AvatarConfig::default());
        store.clear().unwrap();
    }
}
