//! Topic overlays
//!
//! Small decorations layered over the environment when the topic names a
//! subject with an obvious visual hook.

#![allow(clippy::cast_precision_loss)]

use glam::Vec3;
use serde::Serialize;

use super::environment::ScenePalette;
use crate::animation::{ring_point, Material, Primitive, Shape};
use crate::avatar::state::contains_any;

/// Overlay chosen for a topic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextOverlay {
    /// Integral and pi formulas
    Mathematics,
    /// Mass-energy and reduced Planck formulas
    Physics,
    /// A six-atom molecule ring
    Chemistry,
}

/// Pick the overlay for `topic`; rules are tried in order
#[must_use]
pub fn select_overlay(topic: Option<&str>) -> Option<ContextOverlay> {
    let topic = topic?;
    if contains_any(topic, &["math", "calculus", "algebra"]) {
        Some(ContextOverlay::Mathematics)
    } else if contains_any(topic, &["physics", "quantum"]) {
        Some(ContextOverlay::Physics)
    } else if contains_any(topic, &["chemistry", "molecule"]) {
        Some(ContextOverlay::Chemistry)
    } else {
        None
    }
}

fn text(content: &str, font_size: f32, position: Vec3, material: Material) -> Primitive {
    Primitive::new(
        "formula",
        Shape::Text {
            content: content.to_string(),
            font_size,
        },
        material,
    )
    .at(position)
}

impl ContextOverlay {
    /// Primitives for this overlay
    #[must_use]
    pub fn primitives(self, colors: &ScenePalette, active: bool) -> Vec<Primitive> {
        match self {
            Self::Mathematics => vec![
                text(
                    "∫ f(x)dx = F(x) + C",
                    0.8,
                    Vec3::new(0.0, 4.0, -5.0),
                    Material::solid(colors.primary),
                ),
                text(
                    "π = 3.14159...",
                    0.5,
                    Vec3::new(-3.0, 3.0, -4.0),
                    Material::solid(colors.secondary),
                ),
            ],
            Self::Physics => vec![
                text("E = mc²", 0.6, Vec3::new(0.0, 4.0, -5.0), Material::solid(colors.primary)),
                text("ℏ = h/2π", 0.4, Vec3::new(3.0, 3.0, -4.0), Material::solid(colors.accent)),
            ],
            Self::Chemistry => {
                let glow = if active { 0.3 } else { 0.1 };
                (0..6)
                    .map(|i| {
                        let (x, z) = ring_point(i, 6, 2.0);
                        let color = if i % 2 == 0 { colors.primary } else { colors.secondary };
                        Primitive::new("atom", Shape::Sphere { radius: 0.2 }, Material::glowing(color, glow))
                            .at(Vec3::new(x, 4.0 + (i as f32).sin(), z - 3.0))
                    })
                    .collect()
            }
        }
    }
}
