//! Environment scenes
//!
//! Six backdrops behind the professor. Each one is a pure function of elapsed
//! time, the shared palette, an intensity and the active flag. Objects that
//! are scattered randomly get their positions from a [`SceneLayout`] rolled
//! once from a seed when the environment is created, so the same seed always
//! yields the same room.
//!
//! Drifting particles (lab sparks, library dust, falling leaves) follow the
//! closed form of a per-frame drift, see [`sine_drift`] and [`cosine_drift`].

#![allow(clippy::cast_precision_loss)]

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::animation::timing::{cosine_drift, sine_drift};
use crate::animation::{ring_point, Light, Material, ParticleField, Primitive, Shape, StarField, Transform};
use crate::color::{palette, Color};

/// Which backdrop is active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentScene {
    /// Whiteboard, desks and chairs
    Classroom,
    /// Benches, glowing equipment and sparks
    Laboratory,
    /// Shelves of books and dust in warm light
    Library,
    /// Holograms and energy streams
    #[default]
    Futuristic,
    /// A ring of trees on grass
    Nature,
    /// Stars, asteroids and nebulae
    Space,
}

impl EnvironmentScene {
    /// Every scene, in selector order
    pub const ALL: [EnvironmentScene; 6] = [
        Self::Futuristic,
        Self::Classroom,
        Self::Laboratory,
        Self::Library,
        Self::Nature,
        Self::Space,
    ];

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classroom => "classroom",
            Self::Laboratory => "laboratory",
            Self::Library => "library",
            Self::Futuristic => "futuristic",
            Self::Nature => "nature",
            Self::Space => "space",
        }
    }
}

impl fmt::Display for EnvironmentScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentScene {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|scene| scene.as_str() == lower)
            .ok_or_else(|| format!("unknown scene: {s}"))
    }
}

/// Colours an environment is painted with
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScenePalette {
    /// Main accent (avatar primary colour)
    pub primary: Color,
    /// Second accent (avatar secondary colour)
    pub secondary: Color,
    /// Highlight (avatar eye colour)
    pub accent: Color,
}

/// Per-frame inputs shared by every environment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentInputs {
    /// Palette
    pub palette: ScenePalette,
    /// Light and glow multiplier
    pub intensity: f32,
    /// The professor is listening or speaking
    pub active: bool,
}

/// What an environment contributes to one frame
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EnvironmentFrame {
    /// Solid objects
    pub primitives: Vec<Primitive>,
    /// Lights
    pub lights: Vec<Light>,
    /// Renderer-animated sparkle clouds
    pub particles: Vec<ParticleField>,
    /// Star backdrop
    pub stars: Option<StarField>,
}

/// Random placements rolled once per environment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLayout {
    /// Larger scattered objects (lab equipment, asteroids)
    pub fixtures: Vec<Vec3>,
    /// Radii of scattered fixtures where they vary
    pub radii: Vec<f32>,
    /// Small drifting objects (sparks, dust, leaves)
    pub motes: Vec<Vec3>,
}

impl SceneLayout {
    /// Roll the layout for `scene`
    #[must_use]
    pub fn generate(scene: EnvironmentScene, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        match scene {
            EnvironmentScene::Laboratory => {
                let fixtures = scatter(&mut rng, 8, 4.0, (-1.0, -1.0), 3.0);
                let motes = scatter(&mut rng, 20, 5.0, (0.0, 3.0), 4.0);
                Self {
                    fixtures,
                    radii: Vec::new(),
                    motes,
                }
            }
            EnvironmentScene::Library => Self {
                motes: scatter(&mut rng, 15, 6.0, (0.0, 4.0), 5.0),
                ..Self::default()
            },
            EnvironmentScene::Nature => Self {
                motes: scatter(&mut rng, 20, 7.5, (0.0, 5.0), 7.5),
                ..Self::default()
            },
            EnvironmentScene::Space => {
                let fixtures = scatter(&mut rng, 6, 10.0, (-5.0, 5.0), 10.0);
                let radii = (0..6).map(|_| rng.gen_range(0.5..1.0)).collect();
                Self {
                    fixtures,
                    radii,
                    motes: Vec::new(),
                }
            }
            EnvironmentScene::Classroom | EnvironmentScene::Futuristic => Self::default(),
        }
    }
}

fn scatter(rng: &mut StdRng, n: usize, half_x: f32, y: (f32, f32), half_z: f32) -> Vec<Vec3> {
    (0..n)
        .map(|_| {
            let x = rng.gen_range(-half_x..half_x);
            let y = if y.1 > y.0 { rng.gen_range(y.0..y.1) } else { y.0 };
            Vec3::new(x, y, rng.gen_range(-half_z..half_z))
        })
        .collect()
}

/// An instantiated environment
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    scene: EnvironmentScene,
    layout: SceneLayout,
}

impl Environment {
    /// Instantiate `scene` with a layout rolled from `seed`
    #[must_use]
    pub fn new(scene: EnvironmentScene, seed: u64) -> Self {
        Self {
            scene,
            layout: SceneLayout::generate(scene, seed),
        }
    }

    /// Which scene this is
    #[must_use]
    pub fn scene(&self) -> EnvironmentScene {
        self.scene
    }

    /// The rolled layout
    #[must_use]
    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    /// Produce this environment at time `t`
    #[must_use]
    pub fn frame(&self, t: f32, inputs: &EnvironmentInputs) -> EnvironmentFrame {
        match self.scene {
            EnvironmentScene::Classroom => classroom(t, inputs),
            EnvironmentScene::Laboratory => laboratory(t, inputs, &self.layout),
            EnvironmentScene::Library => library(t, inputs, &self.layout),
            EnvironmentScene::Futuristic => futuristic(t, inputs),
            EnvironmentScene::Nature => nature(t, inputs, &self.layout),
            EnvironmentScene::Space => space(t, inputs, &self.layout),
        }
    }
}

fn cuboid(w: f32, h: f32, d: f32) -> Shape {
    Shape::Cuboid {
        size: Vec3::new(w, h, d),
    }
}

fn classroom(t: f32, inputs: &EnvironmentInputs) -> EnvironmentFrame {
    let mut primitives = vec![Primitive::new("whiteboard", cuboid(6.0, 3.0, 0.1), Material::solid(palette::DUST))
        .at(Vec3::new(0.0, (t * 0.5).sin() * 0.1, -8.0))];

    for i in 0..6 {
        let x = ((i % 3) as f32 - 1.0) * 3.0;
        let row = (i / 3) as f32 * 2.0;
        let fi = i as f32;
        primitives.push(
            Primitive::new("desk", cuboid(1.5, 0.8, 0.8), Material::solid(palette::WOOD)).with_transform(
                Transform::at(Vec3::new(x, -0.5, row - 1.0))
                    .with_rotation(Vec3::new(0.0, (t * 0.3 + fi).sin() * 0.05, 0.0)),
            ),
        );
        primitives.push(
            Primitive::new("chair", cuboid(0.6, 1.2, 0.6), Material::solid(palette::DARK_WOOD))
                .at(Vec3::new(x, 0.1, row)),
        );
    }

    let lights = (0..4)
        .map(|i| {
            Light::point(
                Vec3::new((i as f32 - 1.5) * 3.0, 5.0, 0.0),
                0.8 * inputs.intensity,
                Color::WHITE,
            )
        })
        .collect();

    EnvironmentFrame {
        primitives,
        lights,
        ..EnvironmentFrame::default()
    }
}

fn laboratory(t: f32, inputs: &EnvironmentInputs, layout: &SceneLayout) -> EnvironmentFrame {
    let colors = inputs.palette;
    let mut primitives: Vec<Primitive> = (0..4)
        .map(|i| {
            Primitive::new("lab_table", cuboid(3.0, 0.2, 1.5), Material::solid(palette::BENCH)).at(Vec3::new(
                ((i % 2) as f32 - 0.5) * 4.0,
                -1.0,
                (i / 2) as f32 * 3.0 - 1.5,
            ))
        })
        .collect();

    for (i, base) in layout.fixtures.iter().enumerate() {
        let fi = i as f32;
        let color = if i % 2 == 0 { colors.primary } else { colors.secondary };
        primitives.push(
            Primitive::new(
                "equipment",
                Shape::Cylinder {
                    radius_top: 0.3,
                    radius_bottom: 0.2,
                    height: 1.0,
                },
                Material::glowing(color, 0.2 * inputs.intensity),
            )
            .with_transform(
                Transform::at(Vec3::new(base.x, (t + fi).sin() * 0.1 - 1.0, base.z))
                    .with_rotation(Vec3::new(0.0, t * 0.2 + fi, 0.0)),
            ),
        );
    }

    let spark_glow = if inputs.active { 0.8 } else { 0.3 };
    for (i, base) in layout.motes.iter().enumerate() {
        let fi = i as f32;
        primitives.push(
            Primitive::new(
                "spark",
                Shape::Sphere { radius: 0.05 },
                Material::glowing(colors.accent, spark_glow).with_opacity(0.6),
            )
            .with_transform(
                Transform::at(*base + Vec3::new(0.0, sine_drift(0.01, 2.0, fi, t), 0.0))
                    .with_uniform_scale(0.5 + (t * 3.0 + fi).sin() * 0.2),
            ),
        );
    }

    EnvironmentFrame {
        primitives,
        lights: vec![
            Light::point(Vec3::new(0.0, 4.0, 0.0), 1.2 * inputs.intensity, colors.secondary),
            Light::spot(Vec3::new(-3.0, 3.0, 2.0), PI / 3.0, 0.8 * inputs.intensity, colors.primary),
            Light::spot(Vec3::new(3.0, 3.0, -2.0), PI / 3.0, 0.8 * inputs.intensity, colors.primary),
        ],
        ..EnvironmentFrame::default()
    }
}

fn library(t: f32, inputs: &EnvironmentInputs, layout: &SceneLayout) -> EnvironmentFrame {
    let mut primitives = Vec::new();
    let mut book_index = 0.0_f32;

    for i in 0..6 {
        let x = (i as f32 - 2.5) * 2.0;
        primitives.push(Primitive::new("shelf", cuboid(0.3, 4.0, 1.5), Material::solid(palette::WOOD)).at(Vec3::new(
            x, 0.0, -6.0,
        )));

        for j in 0..8 {
            let hue = ((i * j * 30) % 360) as f32;
            primitives.push(
                Primitive::new(
                    "book",
                    cuboid(0.25, 0.3, 0.05),
                    Material::solid(Color::from_hsl(hue, 0.6, 0.5)),
                )
                .with_transform(
                    Transform::at(Vec3::new(
                        x,
                        -1.5 + (j % 4) as f32 * 0.4,
                        -6.0 + if j < 4 { 0.5 } else { -0.5 },
                    ))
                    .with_rotation(Vec3::new(0.0, 0.0, (t * 0.5 + book_index).sin() * 0.02)),
                ),
            );
            book_index += 1.0;
        }
    }

    for i in 0..2 {
        primitives.push(
            Primitive::new("reading_table", cuboid(4.0, 0.1, 2.0), Material::solid(palette::DARK_WOOD))
                .at(Vec3::new((i as f32 - 0.5) * 5.0, -1.5, 2.0)),
        );
    }

    for (i, base) in layout.motes.iter().enumerate() {
        let fi = i as f32;
        let drift = Vec3::new(
            cosine_drift(0.002, 0.3, fi, t),
            sine_drift(0.005, 1.0, fi * 0.5, t),
            0.0,
        );
        primitives.push(
            Primitive::new("dust", Shape::Sphere { radius: 0.02 }, Material::solid(palette::DUST).with_opacity(0.3))
                .at(*base + drift),
        );
    }

    EnvironmentFrame {
        primitives,
        lights: vec![
            Light::ambient(0.4 * inputs.intensity, palette::CORNSILK),
            Light::point(Vec3::new(0.0, 3.0, 0.0), 0.8 * inputs.intensity, palette::LAMP),
        ],
        ..EnvironmentFrame::default()
    }
}

fn futuristic(t: f32, inputs: &EnvironmentInputs) -> EnvironmentFrame {
    let colors = inputs.palette;
    let mut primitives = Vec::new();

    for i in 0..6 {
        let fi = i as f32;
        let (x, z) = ring_point(i, 6, 5.0);
        primitives.push(
            Primitive::new(
                "hologram",
                cuboid(2.0, 1.5, 0.1),
                Material::glowing(colors.primary, 0.5 + (t * 4.0 + fi).sin() * 0.3).with_opacity(0.7),
            )
            .with_transform(
                Transform::at(Vec3::new(x, (t * 2.0 + fi).sin() * 0.5, z)).with_rotation(Vec3::new(0.0, t + fi, 0.0)),
            ),
        );
    }

    for i in 0..12 {
        let fi = i as f32;
        let (x, z) = ring_point(i, 12, 7.0);
        primitives.push(
            Primitive::new(
                "energy_stream",
                Shape::Cylinder {
                    radius_top: 0.05,
                    radius_bottom: 0.05,
                    height: 8.0,
                },
                Material::glowing(colors.secondary, 0.8).with_opacity(0.6),
            )
            .with_transform(
                Transform::at(Vec3::new(x, 0.0, z))
                    .with_rotation(Vec3::new(0.0, 0.0, t * 2.0 + fi))
                    .with_uniform_scale(1.0 + (t * 3.0 + fi).sin() * 0.3),
            ),
        );
    }

    for i in 0..10 {
        let x = (i as f32 - 5.0) * 2.0;
        primitives.push(Primitive::new(
            "grid_line",
            Shape::Line {
                points: vec![Vec3::new(x, -2.0, -10.0), Vec3::new(x, -2.0, 10.0)],
                width: 1.0,
            },
            Material::solid(colors.accent).with_opacity(0.3),
        ));
    }

    let mut lights = vec![Light::point(Vec3::new(0.0, 8.0, 0.0), 1.5 * inputs.intensity, colors.primary)];
    lights.extend((0..4).map(|i| {
        let (x, z) = ring_point(i, 4, 10.0);
        let color = if i % 2 == 0 { colors.secondary } else { colors.accent };
        Light::spot(Vec3::new(x, 6.0, z), 0.5, 0.8 * inputs.intensity, color)
    }));

    EnvironmentFrame {
        primitives,
        lights,
        ..EnvironmentFrame::default()
    }
}

fn nature(t: f32, inputs: &EnvironmentInputs, layout: &SceneLayout) -> EnvironmentFrame {
    let mut primitives = Vec::new();

    for i in 0..8 {
        let fi = i as f32;
        let (x, z) = ring_point(i, 8, 8.0);
        primitives.push(
            Primitive::new(
                "trunk",
                Shape::Cylinder {
                    radius_top: 0.3,
                    radius_bottom: 0.5,
                    height: 4.0,
                },
                Material::solid(palette::WOOD),
            )
            .with_transform(
                Transform::at(Vec3::new(x, 0.0, z)).with_rotation(Vec3::new(0.0, 0.0, (t * 0.5 + fi).sin() * 0.1)),
            ),
        );
        primitives.push(
            Primitive::new("canopy", Shape::Sphere { radius: 2.0 }, Material::solid(palette::FOREST))
                .at(Vec3::new(x, 2.5, z)),
        );
    }

    primitives.push(
        Primitive::new(
            "ground",
            Shape::Plane {
                width: 30.0,
                height: 30.0,
            },
            Material::solid(palette::LIME),
        )
        .with_transform(Transform::at(Vec3::new(0.0, -2.5, 0.0)).with_rotation(Vec3::new(-PI / 2.0, 0.0, 0.0))),
    );

    for (i, base) in layout.motes.iter().enumerate() {
        let fi = i as f32;
        let drift = Vec3::new(cosine_drift(0.005, 0.3, fi, t), sine_drift(0.01, 1.0, fi, t), 0.0);
        primitives.push(
            Primitive::new("leaf", cuboid(0.1, 0.05, 0.02), Material::solid(palette::LEAF).with_opacity(0.8))
                .with_transform(Transform::at(*base + drift).with_rotation(Vec3::new(0.0, t + fi, 0.0))),
        );
    }

    EnvironmentFrame {
        primitives,
        lights: vec![
            Light::ambient(0.6 * inputs.intensity, palette::CORNSILK),
            Light::directional(Vec3::new(10.0, 10.0, 5.0), inputs.intensity, palette::SUNLIGHT),
        ],
        ..EnvironmentFrame::default()
    }
}

fn space(t: f32, inputs: &EnvironmentInputs, layout: &SceneLayout) -> EnvironmentFrame {
    let colors = inputs.palette;
    let mut primitives = Vec::new();

    for (i, (base, radius)) in layout.fixtures.iter().zip(&layout.radii).enumerate() {
        let fi = i as f32;
        primitives.push(
            Primitive::new("asteroid", Shape::Sphere { radius: *radius }, Material::solid(palette::ROCK)).with_transform(
                Transform::at(Vec3::new(base.x, (t + fi).sin() * 0.5, base.z))
                    .with_rotation(Vec3::new(t * 0.3 + fi, t * 0.2 + fi * 0.5, 0.0)),
            ),
        );
    }

    for i in 0..4 {
        let fi = i as f32;
        let (x, z) = ring_point(i, 4, 15.0);
        let color = if i % 2 == 0 { colors.primary } else { colors.secondary };
        primitives.push(
            Primitive::new(
                "nebula",
                Shape::Sphere { radius: 3.0 + fi },
                Material::glowing(color, 0.3).with_opacity(0.3 + (t * 0.8 + fi).sin() * 0.2),
            )
            .with_transform(
                Transform::at(Vec3::new(x, fi.sin() * 5.0, z)).with_uniform_scale(1.0 + (t * 0.5 + fi).sin() * 0.2),
            ),
        );
    }

    EnvironmentFrame {
        primitives,
        lights: vec![
            Light::point(Vec3::ZERO, 0.5 * inputs.intensity, colors.primary),
            Light::point(Vec3::new(10.0, 5.0, -10.0), 0.3 * inputs.intensity, colors.secondary),
            Light::point(Vec3::new(-10.0, -5.0, 10.0), 0.3 * inputs.intensity, colors.accent),
        ],
        particles: vec![ParticleField {
            count: 200,
            scale: 50.0,
            size: 3.0,
            speed: 0.1,
            color: colors.accent,
        }],
        stars: Some(StarField {
            radius: 100.0,
            depth: 50.0,
            count: 1000,
            factor: 4.0,
            speed: 1.0,
        }),
    }
}
