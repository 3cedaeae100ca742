//! Opstartinstellingen van de configurator.

use std::time::Duration;

use serde::Deserialize;

use crate::drawing::DEFAULT_MARGIN;
use crate::export::texture::EXPORT_TEXTURE_CAP;
use crate::model::{CabinetPlacement, DimensionParameters};

/// Start-up settings, deserializable from a partial JS object.
///
/// ```
/// let config: cabinet_engine::config::ConfiguratorConfig =
///     serde_json::from_str(r#"{ "params": { "width": 24 }, "doorDurationSecs": 0.5 }"#).unwrap();
/// assert_eq!(config.params.width, 24.0);
/// assert_eq!(config.params.height, 30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfiguratorConfig {
    pub params: DimensionParameters,
    pub placement: CabinetPlacement,
    pub door_duration_secs: f64,
    pub export_texture_cap: u32,
    /// Total margin in CSS pixels, split evenly over both sides.
    pub view_margin: f64,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            params: DimensionParameters::default(),
            placement: CabinetPlacement::default(),
            door_duration_secs: 1.0,
            export_texture_cap: EXPORT_TEXTURE_CAP,
            view_margin: DEFAULT_MARGIN,
        }
    }
}

impl ConfiguratorConfig {
    /// Negative or non-finite durations fall back to an instant swing.
    #[must_use]
    pub fn door_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.door_duration_secs).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LengthUnit, ReferencePlane};

    #[test]
    fn empty_object_gives_defaults() {
        let config: ConfiguratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConfiguratorConfig::default());
        assert_eq!(config.door_duration(), Duration::from_secs(1));
    }

    #[test]
    fn partial_overrides() {
        let config: ConfiguratorConfig = serde_json::from_str(
            r#"{
                "params": { "unit": "centimeters", "shelves": true },
                "placement": { "reference": "ceiling", "offset": 5 },
                "exportTextureCap": 256
            }"#,
        )
        .unwrap();
        assert_eq!(config.params.unit, LengthUnit::Centimeters);
        assert!(config.params.shelves);
        assert_eq!(config.placement.reference, ReferencePlane::Ceiling);
        assert_eq!(config.export_texture_cap, 256);
    }

    #[test]
    fn bad_duration_is_instant() {
        let config = ConfiguratorConfig {
            door_duration_secs: -1.0,
            ..ConfiguratorConfig::default()
        };
        assert_eq!(config.door_duration(), Duration::ZERO);
    }
}
