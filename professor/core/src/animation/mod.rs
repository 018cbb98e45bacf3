//! Animation primitives
//!
//! Everything the core hands to a renderer is described with the small set of
//! types in this module: a [`Primitive`] is a shape with a [`Transform`] and a
//! [`Material`], a [`Light`] lights it, and particle fields are described by
//! parameters rather than per-particle state.
//!
//! # Design Philosophy
//!
//! The core never talks to a GPU. A frame is a plain value that a WebGL,
//! wgpu or terminal renderer can draw however it likes:
//!
//! ```text
//! FrameClock ──tick──> AvatarAnimator ─┐
//!                                      ├──> SceneFrame ──> renderer
//! AppState ─────────> SceneComposer ───┘
//! ```
//!
//! Rotations are Euler angles in radians, positions are in world units with
//! +Y up, and colours are [`Color`] values.

pub mod timing;

pub use glam::{Vec2, Vec3};
pub use timing::{FrameClock, FrameTick, REFERENCE_FRAME_SECS};

use serde::Serialize;

use crate::color::Color;

/// Position, rotation and scale of a primitive
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
    /// World position
    pub position: Vec3,
    /// Euler rotation in radians
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform moved to `position`
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Set the rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set a per-axis scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set the same scale on every axis
    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Shift the position by `offset`
    #[must_use]
    pub fn offset(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Noise distortion applied to the head surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Distortion {
    /// How far vertices are pushed (0.0-1.0)
    pub amount: f32,
    /// How fast the noise moves
    pub speed: f32,
}

/// Surface appearance of a primitive
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Material {
    /// Base colour
    pub color: Color,
    /// Glow colour, if the surface emits light
    pub emissive: Option<Color>,
    /// Glow strength
    pub emissive_intensity: f32,
    /// 1.0 is opaque
    pub opacity: f32,
    /// Draw edges only
    pub wireframe: bool,
    /// Animated surface distortion
    pub distortion: Option<Distortion>,
}

impl Material {
    /// Opaque, non-emissive surface
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            emissive: None,
            emissive_intensity: 0.0,
            opacity: 1.0,
            wireframe: false,
            distortion: None,
        }
    }

    /// Surface that glows in its own colour
    #[must_use]
    pub fn glowing(color: Color, intensity: f32) -> Self {
        Self::solid(color).with_emissive(color, intensity)
    }

    /// Set the glow
    #[must_use]
    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = Some(emissive);
        self.emissive_intensity = intensity;
        self
    }

    /// Set the opacity (clamped to `0.0..=1.0`)
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Render as wireframe
    #[must_use]
    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    /// Set the surface distortion
    #[must_use]
    pub fn with_distortion(mut self, amount: f32, speed: f32) -> Self {
        self.distortion = Some(Distortion { amount, speed });
        self
    }
}

/// Geometry of a primitive
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Sphere of the given radius
    Sphere {
        /// Radius
        radius: f32,
    },
    /// Axis-aligned box
    Cuboid {
        /// Width, height, depth
        size: Vec3,
    },
    /// Cylinder or cone along Y
    Cylinder {
        /// Radius at the top
        radius_top: f32,
        /// Radius at the bottom
        radius_bottom: f32,
        /// Height
        height: f32,
    },
    /// Ring
    Torus {
        /// Distance from centre to tube centre
        radius: f32,
        /// Tube radius
        tube: f32,
    },
    /// Flat rectangle in the XY plane
    Plane {
        /// Width
        width: f32,
        /// Height
        height: f32,
    },
    /// Low-poly sphere
    Icosahedron {
        /// Radius
        radius: f32,
    },
    /// Polyline through points in local space
    Line {
        /// Points
        points: Vec<Vec3>,
        /// Stroke width in pixels
        width: f32,
    },
    /// Floating text label
    Text {
        /// Text to draw
        content: String,
        /// Font size in world units
        font_size: f32,
    },
}

/// Gentle bobbing applied by the renderer around a primitive
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FloatMotion {
    /// Bob frequency
    pub speed: f32,
    /// How much the float also rotates
    pub rotation_intensity: f32,
    /// Bob height
    pub float_intensity: f32,
}

/// A drawable shape
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Primitive {
    /// What this primitive is, for renderers and tests
    pub tag: &'static str,
    /// Geometry
    pub shape: Shape,
    /// Placement
    pub transform: Transform,
    /// Appearance
    pub material: Material,
    /// Optional renderer-side float wrapper
    pub float: Option<FloatMotion>,
}

impl Primitive {
    /// Create a primitive at the identity transform
    #[must_use]
    pub fn new(tag: &'static str, shape: Shape, material: Material) -> Self {
        Self {
            tag,
            shape,
            transform: Transform::default(),
            material,
            float: None,
        }
    }

    /// Set the transform
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Move to `position` keeping rotation and scale
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Wrap in a float
    #[must_use]
    pub fn floating(mut self, float: FloatMotion) -> Self {
        self.float = Some(float);
        self
    }
}

/// Kind of light source
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightKind {
    /// Uniform light from everywhere
    Ambient,
    /// Omnidirectional light at a position
    Point,
    /// Cone of light from a position
    Spot {
        /// Cone half-angle in radians
        angle: f32,
    },
    /// Parallel light from a direction
    Directional,
}

/// A light in the scene
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Light {
    /// Kind of light
    pub kind: LightKind,
    /// Position (or direction for directional lights)
    pub position: Vec3,
    /// Intensity
    pub intensity: f32,
    /// Colour
    pub color: Color,
}

impl Light {
    /// Ambient light
    #[must_use]
    pub fn ambient(intensity: f32, color: Color) -> Self {
        Self {
            kind: LightKind::Ambient,
            position: Vec3::ZERO,
            intensity,
            color,
        }
    }

    /// Point light
    #[must_use]
    pub fn point(position: Vec3, intensity: f32, color: Color) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            intensity,
            color,
        }
    }

    /// Spot light
    #[must_use]
    pub fn spot(position: Vec3, angle: f32, intensity: f32, color: Color) -> Self {
        Self {
            kind: LightKind::Spot { angle },
            position,
            intensity,
            color,
        }
    }

    /// Directional light
    #[must_use]
    pub fn directional(position: Vec3, intensity: f32, color: Color) -> Self {
        Self {
            kind: LightKind::Directional,
            position,
            intensity,
            color,
        }
    }
}

/// Sparkle cloud animated entirely by the renderer
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParticleField {
    /// Number of sparkles
    pub count: u32,
    /// Extent of the cloud
    pub scale: f32,
    /// Size of each sparkle
    pub size: f32,
    /// Drift speed
    pub speed: f32,
    /// Colour
    pub color: Color,
}

/// Distant star backdrop
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StarField {
    /// Inner radius of the star shell
    pub radius: f32,
    /// Shell depth
    pub depth: f32,
    /// Number of stars
    pub count: u32,
    /// Star size factor
    pub factor: f32,
    /// Twinkle speed
    pub speed: f32,
}

/// Point `i` of `n` evenly spaced around a circle of `radius` in the XZ plane
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn ring_point(i: usize, n: usize, radius: f32) -> (f32, f32) {
    let angle = i as f32 / n as f32 * std::f32::consts::TAU;
    (angle.cos() * radius, angle.sin() * radius)
}
