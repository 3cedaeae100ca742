//! Materiaalsoorten en hun oppervlakte-eigenschappen.
//!
//! Every kind maps through [`MaterialKind::spec`], an exhaustive match, so a
//! new finish cannot be added without giving it surface parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WoodSpecies {
    #[default]
    Pine,
    Oak,
    Maple,
    Cherry,
    Plywood,
}

impl WoodSpecies {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pine => "Pine Wood",
            Self::Oak => "Oak Wood",
            Self::Maple => "Maple Wood",
            Self::Cherry => "Cherry Wood",
            Self::Plywood => "Plywood",
        }
    }

    const fn color(self) -> Rgb {
        match self {
            Self::Pine => Rgb::new(0.87, 0.72, 0.53),
            Self::Oak => Rgb::new(0.65, 0.50, 0.39),
            Self::Maple => Rgb::new(0.96, 0.87, 0.70),
            Self::Cherry => Rgb::new(0.80, 0.42, 0.32),
            Self::Plywood => Rgb::new(0.85, 0.75, 0.60),
        }
    }
}

/// Cabinet body finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "species", rename_all = "lowercase")]
pub enum MaterialKind {
    Wood(WoodSpecies),
    Metal,
    Plastic,
}

impl Default for MaterialKind {
    fn default() -> Self {
        Self::Wood(WoodSpecies::default())
    }
}

/// Procedural texture pattern drawn on a body material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TexturePattern {
    /// Sinusoidal grain with noise.
    Grain,
    /// Fine brushed streaks.
    Brushed,
    /// Near-uniform with faint speckle.
    Speckle,
}

/// Surface parameters for one material, as handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialSpec {
    pub name: &'static str,
    pub base_color: Rgb,
    pub roughness: f64,
    pub metalness: f64,
    pub clearcoat: f64,
    pub clearcoat_roughness: f64,
    pub env_map_intensity: f64,
    pub texture_scale: f64,
    pub normal_scale: f64,
    pub pattern: Option<TexturePattern>,
}

/// Metal used for the door handle regardless of the body finish.
pub const HANDLE_METAL: MaterialSpec = MaterialSpec {
    name: "MetalHandle",
    base_color: Rgb::new(0.3, 0.3, 0.3),
    roughness: 0.2,
    metalness: 1.0,
    clearcoat: 1.0,
    clearcoat_roughness: 0.1,
    env_map_intensity: 1.0,
    texture_scale: 1.0,
    normal_scale: 0.0,
    pattern: None,
};

impl MaterialKind {
    pub const ALL: [Self; 7] = [
        Self::Wood(WoodSpecies::Pine),
        Self::Wood(WoodSpecies::Oak),
        Self::Wood(WoodSpecies::Maple),
        Self::Wood(WoodSpecies::Cherry),
        Self::Wood(WoodSpecies::Plywood),
        Self::Metal,
        Self::Plastic,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wood(species) => species.name(),
            Self::Metal => "Metal",
            Self::Plastic => "Plastic",
        }
    }

    #[must_use]
    pub const fn spec(self) -> MaterialSpec {
        match self {
            Self::Wood(species) => MaterialSpec {
                name: species.name(),
                base_color: species.color(),
                roughness: 0.65,
                metalness: 0.1,
                clearcoat: 0.2,
                clearcoat_roughness: 0.8,
                env_map_intensity: 1.2,
                texture_scale: 2.0,
                normal_scale: 0.4,
                pattern: Some(TexturePattern::Grain),
            },
            Self::Metal => MaterialSpec {
                name: "Metal",
                base_color: Rgb::new(0.50, 0.50, 0.50),
                roughness: 0.2,
                metalness: 0.9,
                clearcoat: 0.5,
                clearcoat_roughness: 0.2,
                env_map_intensity: 2.5,
                texture_scale: 1.0,
                normal_scale: 0.3,
                pattern: Some(TexturePattern::Brushed),
            },
            Self::Plastic => MaterialSpec {
                name: "Plastic",
                base_color: Rgb::new(0.94, 0.94, 0.94),
                roughness: 0.3,
                metalness: 0.1,
                clearcoat: 0.8,
                clearcoat_roughness: 0.1,
                env_map_intensity: 1.8,
                texture_scale: 0.5,
                normal_scale: 0.2,
                pattern: Some(TexturePattern::Speckle),
            },
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaterialKind {
    type Err = String;

    /// Accepts display names ("Pine Wood"), bare species ("oak") and the
    /// generic kinds ("wood", "metal", "plastic"). Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let key = normalized.strip_suffix(" wood").unwrap_or(&normalized);
        match key {
            "wood" | "pine" => Ok(Self::Wood(WoodSpecies::Pine)),
            "oak" => Ok(Self::Wood(WoodSpecies::Oak)),
            "maple" => Ok(Self::Wood(WoodSpecies::Maple)),
            "cherry" => Ok(Self::Wood(WoodSpecies::Cherry)),
            "plywood" => Ok(Self::Wood(WoodSpecies::Plywood)),
            "metal" => Ok(Self::Metal),
            "plastic" => Ok(Self::Plastic),
            _ => Err(format!("onbekend materiaal `{}`", s.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_names_and_kinds() {
        assert_eq!("Pine Wood".parse(), Ok(MaterialKind::Wood(WoodSpecies::Pine)));
        assert_eq!("cherry wood".parse(), Ok(MaterialKind::Wood(WoodSpecies::Cherry)));
        assert_eq!("Plywood".parse(), Ok(MaterialKind::Wood(WoodSpecies::Plywood)));
        assert_eq!("wood".parse(), Ok(MaterialKind::Wood(WoodSpecies::Pine)));
        assert_eq!(" METAL ".parse(), Ok(MaterialKind::Metal));
        assert!("granite".parse::<MaterialKind>().is_err());
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in MaterialKind::ALL {
            assert_eq!(kind.name().parse::<MaterialKind>(), Ok(kind));
        }
    }

    #[test]
    fn species_share_wood_surface_but_not_colour() {
        let pine = MaterialKind::Wood(WoodSpecies::Pine).spec();
        let oak = MaterialKind::Wood(WoodSpecies::Oak).spec();
        assert_eq!(pine.roughness, oak.roughness);
        assert_ne!(pine.base_color, oak.base_color);
        assert_eq!(pine.base_color, Rgb::new(0.87, 0.72, 0.53));
    }

    #[test]
    fn metal_is_shinier_than_wood() {
        let metal = MaterialKind::Metal.spec();
        let wood = MaterialKind::default().spec();
        assert!(metal.metalness > wood.metalness);
        assert!(metal.roughness < wood.roughness);
        assert!(HANDLE_METAL.pattern.is_none());
    }
}
