//! Audio-reactive visualizers
//!
//! There is no audio input. "Audio" here means a synthetic signal driven by
//! time, an intensity and a frequency, which makes the professor look like it
//! is hearing or producing sound.
//!
//! ```text
//!   MultiLayerVisualizer @ (0, -3, 0)
//!   ├── ring       0.6·I  f 0.5  secondary  size 1.2  @ (0, 0, -1)
//!   ├── waveform   1.0·I  f 2.0  primary    size 1.0  @ (0, -1, 0)
//!   ├── particles  0.8·I  f 1.5  primary    size 0.8  @ origin
//!   └── neural     0.4·I  f 0.8  secondary  size 0.6  @ (0, 0, 2)
//! ```

#![allow(clippy::cast_precision_loss)]

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::{ring_point, Material, Primitive, Shape, Transform};
use crate::avatar::state::InteractionSignals;
use crate::color::Color;

/// Samples in a waveform
pub const WAVEFORM_SAMPLES: usize = 64;
/// Spheres in the particle ring
pub const PARTICLE_COUNT: usize = 32;
/// Bars in the equalizer
pub const BAR_COUNT: usize = 16;
/// Concentric rings
pub const RING_COUNT: usize = 8;
/// Nodes in the neural ring
pub const NEURAL_NODE_COUNT: usize = 12;

/// Visualizer style
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisualizerKind {
    /// Sum of three sines drawn as a line
    #[default]
    Waveform,
    /// Spheres breathing around a ring
    Particles,
    /// Equalizer bars
    Bars,
    /// Concentric pulsing tori
    Ring,
    /// Ring of nodes joined to their neighbour and opposite
    Neural,
}

/// Drive level for the visualizers
///
/// Listening is checked first, matching the status label.
#[must_use]
pub fn audio_intensity(signals: InteractionSignals, energy: f32) -> f32 {
    let base = if signals.listening {
        0.8
    } else if signals.speaking {
        1.0
    } else {
        0.3
    };
    base * energy
}

/// One visualizer's output
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisualizerFrame {
    /// Style
    pub kind: VisualizerKind,
    /// Primitives in the parent's coordinates
    pub primitives: Vec<Primitive>,
}

/// A single visualizer
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AudioVisualizer {
    /// Style
    pub kind: VisualizerKind,
    /// Amplitude
    pub intensity: f32,
    /// Speed of the synthetic signal
    pub frequency: f32,
    /// Colour of every element
    pub color: Color,
    /// Spatial scale of the response
    pub size: f32,
    /// Offset from the parent
    pub position: Vec3,
}

impl AudioVisualizer {
    /// Visualizer with unit intensity, frequency and size at the origin
    #[must_use]
    pub fn new(kind: VisualizerKind, color: Color) -> Self {
        Self {
            kind,
            intensity: 1.0,
            frequency: 1.0,
            color,
            size: 1.0,
            position: Vec3::ZERO,
        }
    }

    /// Set the amplitude
    #[must_use]
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the signal speed
    #[must_use]
    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the spatial scale
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Set the offset
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Produce the visualizer at time `t`
    #[must_use]
    pub fn frame(&self, t: f32, active: bool) -> VisualizerFrame {
        let primitives = match self.kind {
            VisualizerKind::Waveform => self.waveform(t, active),
            VisualizerKind::Particles => self.particles(t, active),
            VisualizerKind::Bars => self.bars(t, active),
            VisualizerKind::Ring => self.rings(t, active),
            VisualizerKind::Neural => self.neural(t, active),
        };
        VisualizerFrame {
            kind: self.kind,
            primitives,
        }
    }

    /// Waveform heights; flat when inactive
    #[must_use]
    pub fn waveform_samples(&self, t: f32, active: bool) -> Vec<f32> {
        if !active {
            return vec![0.0; WAVEFORM_SAMPLES];
        }
        let (amp, f) = (self.intensity, self.frequency);
        (0..WAVEFORM_SAMPLES)
            .map(|i| {
                let x = i as f32 / WAVEFORM_SAMPLES as f32 * PI * 4.0;
                let w1 = (x + t * f * 2.0).sin() * amp;
                let w2 = (x * 2.0 + t * f * 3.0).sin() * amp * 0.5;
                let w3 = (x * 0.5 + t * f).sin() * amp * 0.3;
                (w1 + w2 + w3) * self.size
            })
            .collect()
    }

    fn waveform(&self, t: f32, active: bool) -> Vec<Primitive> {
        let half = WAVEFORM_SAMPLES as f32 / 2.0;
        let points = self
            .waveform_samples(t, active)
            .into_iter()
            .enumerate()
            .map(|(i, y)| Vec3::new((i as f32 - half) * 0.1, y, 0.0))
            .collect();
        let opacity = if active { 0.8 } else { 0.3 };
        vec![Primitive::new(
            "waveform",
            Shape::Line { points, width: 3.0 },
            Material::solid(self.color).with_opacity(opacity),
        )
        .at(self.position)]
    }

    fn particles(&self, t: f32, active: bool) -> Vec<Primitive> {
        let (amp, f, size) = (self.intensity, self.frequency, self.size);
        (0..PARTICLE_COUNT)
            .map(|i| {
                let fi = i as f32;
                let (cos, sin) = ring_point(i, PARTICLE_COUNT, 1.0);
                let radius = 2.0 + (t * f + fi * 0.5).sin() * amp * size;
                let height = (t * f * 2.0 + fi * 0.3).cos() * amp * size;
                let (scale, glow) = if active { (0.1 + amp * 0.5, amp) } else { (0.05, 0.1) };
                Primitive::new(
                    "audio_particle",
                    Shape::Sphere { radius: 0.05 },
                    Material::glowing(self.color, glow).with_opacity(0.8),
                )
                .with_transform(
                    Transform::at(self.position + Vec3::new(cos * radius, height, sin * radius))
                        .with_uniform_scale(scale),
                )
            })
            .collect()
    }

    fn bars(&self, t: f32, active: bool) -> Vec<Primitive> {
        let (amp, f) = (self.intensity, self.frequency);
        let half = BAR_COUNT as f32 / 2.0;
        (0..BAR_COUNT)
            .map(|i| {
                let fi = i as f32;
                let level = ((t * f * (fi + 1.0) * 0.5).sin() * (t * f * 2.0).cos() * amp).abs();
                let height = (level * self.size * 2.0).max(0.1);
                let glow = if active { level } else { 0.1 };
                Primitive::new(
                    "bar",
                    Shape::Cuboid {
                        size: Vec3::new(0.2, 1.0, 0.2),
                    },
                    Material::glowing(self.color, glow).with_opacity(0.7),
                )
                .with_transform(
                    Transform::at(self.position + Vec3::new((fi - half) * 0.3, height * 0.5, 0.0))
                        .with_scale(Vec3::new(1.0, height, 1.0)),
                )
            })
            .collect()
    }

    fn rings(&self, t: f32, active: bool) -> Vec<Primitive> {
        (0..RING_COUNT)
            .map(|i| {
                let fi = i as f32;
                let phase = t * self.frequency + fi * 0.8;
                let scale = 1.0 + phase.sin() * self.intensity * self.size * 0.5;
                let opacity = if active { 0.3 + phase.cos().abs() * 0.4 } else { 0.1 };
                Primitive::new(
                    "ring",
                    Shape::Torus {
                        radius: 1.5 + fi * 0.3,
                        tube: 0.05,
                    },
                    Material::glowing(self.color, 0.2).with_opacity(opacity),
                )
                .with_transform(
                    Transform::at(self.position)
                        .with_rotation(Vec3::new(0.0, 0.0, t * 0.5 + fi * 0.3))
                        .with_uniform_scale(scale),
                )
            })
            .collect()
    }

    /// Local node positions of the neural ring
    #[must_use]
    pub fn neural_nodes() -> Vec<Vec3> {
        (0..NEURAL_NODE_COUNT)
            .map(|i| {
                let (x, z) = ring_point(i, NEURAL_NODE_COUNT, 2.0);
                Vec3::new(x, (i as f32 * 0.7).sin() * 0.5, z)
            })
            .collect()
    }

    /// Node index pairs: each node to the next and to the opposite node
    #[must_use]
    pub fn neural_edges() -> Vec<(usize, usize)> {
        (0..NEURAL_NODE_COUNT)
            .flat_map(|i| {
                [
                    (i, (i + 1) % NEURAL_NODE_COUNT),
                    (i, (i + NEURAL_NODE_COUNT / 2) % NEURAL_NODE_COUNT),
                ]
            })
            .collect()
    }

    fn neural(&self, t: f32, active: bool) -> Vec<Primitive> {
        let nodes = Self::neural_nodes();
        let mut primitives: Vec<Primitive> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let phase = t * self.frequency + i as f32 * 0.5;
                let level = phase.sin().abs() * self.intensity;
                let glow = if active { level * 0.8 } else { 0.1 };
                Primitive::new(
                    "neural_node",
                    Shape::Sphere { radius: 0.1 },
                    Material::glowing(self.color, glow).with_opacity(0.8),
                )
                .with_transform(
                    Transform::at(self.position + *node).with_uniform_scale(0.1 + level * self.size * 0.3),
                )
            })
            .collect();

        let opacity = if active { 0.4 } else { 0.1 };
        primitives.extend(Self::neural_edges().into_iter().map(|(a, b)| {
            Primitive::new(
                "neural_edge",
                Shape::Line {
                    points: vec![nodes[a], nodes[b]],
                    width: 1.0,
                },
                Material::solid(self.color).with_opacity(opacity),
            )
            .at(self.position)
        }));
        primitives
    }
}

/// The four stacked visualizers under the professor
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MultiLayerVisualizer {
    /// Offset of the whole stack
    pub position: Vec3,
    /// Ring, waveform, particles, neural
    pub layers: [AudioVisualizer; 4],
}

impl MultiLayerVisualizer {
    /// Build the stack for a drive level and the avatar's two colours
    #[must_use]
    pub fn new(intensity: f32, primary: Color, secondary: Color) -> Self {
        Self {
            position: Vec3::new(0.0, -3.0, 0.0),
            layers: [
                AudioVisualizer::new(VisualizerKind::Ring, secondary)
                    .with_intensity(intensity * 0.6)
                    .with_frequency(0.5)
                    .with_size(1.2)
                    .at(Vec3::new(0.0, 0.0, -1.0)),
                AudioVisualizer::new(VisualizerKind::Waveform, primary)
                    .with_intensity(intensity)
                    .with_frequency(2.0)
                    .at(Vec3::new(0.0, -1.0, 0.0)),
                AudioVisualizer::new(VisualizerKind::Particles, primary)
                    .with_intensity(intensity * 0.8)
                    .with_frequency(1.5)
                    .with_size(0.8),
                AudioVisualizer::new(VisualizerKind::Neural, secondary)
                    .with_intensity(intensity * 0.4)
                    .with_frequency(0.8)
                    .with_size(0.6)
                    .at(Vec3::new(0.0, 0.0, 2.0)),
            ],
        }
    }

    /// Produce every layer, offset by the stack position
    #[must_use]
    pub fn frame(&self, t: f32, active: bool) -> Vec<VisualizerFrame> {
        self.layers
            .iter()
            .map(|layer| {
                let mut frame = layer.frame(t, active);
                for prim in &mut frame.primitives {
                    prim.transform.position += self.position;
                }
                frame
            })
            .collect()
    }
}
