use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Plane the vertical offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePlane {
    #[default]
    Floor,
    Ceiling,
}

impl ReferencePlane {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Floor => "Floor",
            Self::Ceiling => "Ceiling",
        }
    }
}

impl fmt::Display for ReferencePlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReferencePlane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floor" => Ok(Self::Floor),
            "ceiling" => Ok(Self::Ceiling),
            other => Err(format!("onbekend referentievlak `{other}`")),
        }
    }
}

/// Reference plane plus offset, in the working unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinetPlacement {
    pub reference: ReferencePlane,
    pub offset: f64,
}

impl CabinetPlacement {
    #[must_use]
    pub const fn new(reference: ReferencePlane, offset: f64) -> Self {
        Self { reference, offset }
    }

    /// Centre height of the cabinet for the given sizes.
    #[must_use]
    pub fn resolve(&self, height: f64, ceiling_height: f64) -> f64 {
        resolve_placement(height, ceiling_height, self.reference, self.offset)
    }
}

/// Vertical translation (cabinet centre) for a reference plane and offset.
///
/// The offset is used as given; callers clamp it with [`clamp_offset`] first.
#[must_use]
pub fn resolve_placement(
    height: f64,
    ceiling_height: f64,
    reference: ReferencePlane,
    offset: f64,
) -> f64 {
    match reference {
        ReferencePlane::Floor => offset + height / 2.0,
        ReferencePlane::Ceiling => ceiling_height - height / 2.0 - offset,
    }
}

/// Clamps an offset into `[0, max(0, ceiling_height - height)]`.
#[must_use]
pub fn clamp_offset(offset: f64, height: f64, ceiling_height: f64) -> f64 {
    let max = (ceiling_height - height).max(0.0);
    offset.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_offset_identities() {
        assert_eq!(resolve_placement(30.0, 96.0, ReferencePlane::Floor, 0.0), 15.0);
        assert_eq!(resolve_placement(30.0, 96.0, ReferencePlane::Ceiling, 0.0), 81.0);
    }

    #[test]
    fn floor_offset_mirrors_ceiling_offset() {
        let (h, ceiling) = (30.0, 96.0);
        for d in [0.0, 1.5, 12.0, 33.3, 66.0] {
            let floor = resolve_placement(h, ceiling, ReferencePlane::Floor, d);
            let from_top = resolve_placement(h, ceiling, ReferencePlane::Ceiling, ceiling - h - d);
            assert!((floor - from_top).abs() < 1e-12, "d = {d}");
        }
    }

    #[test]
    fn resolver_does_not_clamp() {
        assert_eq!(resolve_placement(30.0, 96.0, ReferencePlane::Floor, -5.0), 10.0);
        assert_eq!(resolve_placement(30.0, 96.0, ReferencePlane::Ceiling, 100.0), -19.0);
    }

    #[test]
    fn clamp_keeps_offset_in_room() {
        assert_eq!(clamp_offset(-2.0, 30.0, 96.0), 0.0);
        assert_eq!(clamp_offset(70.0, 30.0, 96.0), 66.0);
        assert_eq!(clamp_offset(12.0, 30.0, 96.0), 12.0);
        assert_eq!(clamp_offset(5.0, 100.0, 96.0), 0.0);
    }

    #[test]
    fn placement_struct_resolves_centre() {
        let placement = CabinetPlacement::new(ReferencePlane::Ceiling, 0.0);
        assert_eq!(placement.resolve(30.0, 96.0), 81.0);
        assert_eq!("Ceiling".parse(), Ok(ReferencePlane::Ceiling));
    }
}
