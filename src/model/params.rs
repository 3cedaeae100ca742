use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::material::MaterialKind;
use super::units::{self, LengthUnit};

/// Length-valued (and flag) fields of a [`DimensionParameters`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionField {
    Width,
    Height,
    Depth,
    PanelThickness,
    CeilingHeight,
    Offset,
}

impl DimensionField {
    pub const LENGTHS: [Self; 6] = [
        Self::Width,
        Self::Height,
        Self::Depth,
        Self::PanelThickness,
        Self::CeilingHeight,
        Self::Offset,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Depth => "depth",
            Self::PanelThickness => "panelThickness",
            Self::CeilingHeight => "ceilingHeight",
            Self::Offset => "offset",
        }
    }
}

impl fmt::Display for DimensionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DimensionField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LENGTHS
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("ongeldige afmeting `{field}`: {reason}")]
    InvalidDimensions { field: DimensionField, reason: String },
}

impl GeometryError {
    pub(crate) fn invalid(field: DimensionField, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            field,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> DimensionField {
        match self {
            Self::InvalidDimensions { field, .. } => *field,
        }
    }

    /// Same violation, reported on `field`.
    #[must_use]
    pub(crate) fn with_field(self, field: DimensionField) -> Self {
        match self {
            Self::InvalidDimensions { reason, .. } => Self::InvalidDimensions { field, reason },
        }
    }
}

/// The root input every consumer derives its geometry from.
///
/// All lengths are in `unit`. The set is only changed by explicit edits and is
/// never mutated while a derivation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimensionParameters {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub panel_thickness: f64,
    pub ceiling_height: f64,
    pub material: MaterialKind,
    pub unit: LengthUnit,
    /// Adds the two interior shelves.
    pub shelves: bool,
}

impl Default for DimensionParameters {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 30.0,
            depth: 20.0,
            panel_thickness: 0.75,
            ceiling_height: 96.0,
            material: MaterialKind::default(),
            unit: LengthUnit::Inches,
            shelves: false,
        }
    }
}

impl DimensionParameters {
    #[must_use]
    pub fn new(width: f64, height: f64, depth: f64, panel_thickness: f64) -> Self {
        Self {
            width,
            height,
            depth,
            panel_thickness,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialKind) -> Self {
        self.material = material;
        self
    }

    #[must_use]
    pub fn with_shelves(mut self, shelves: bool) -> Self {
        self.shelves = shelves;
        self
    }

    #[must_use]
    pub fn with_ceiling_height(mut self, ceiling_height: f64) -> Self {
        self.ceiling_height = ceiling_height;
        self
    }

    /// Value of a length field; `Offset` is not part of this set.
    #[must_use]
    pub fn length(&self, field: DimensionField) -> Option<f64> {
        match field {
            DimensionField::Width => Some(self.width),
            DimensionField::Height => Some(self.height),
            DimensionField::Depth => Some(self.depth),
            DimensionField::PanelThickness => Some(self.panel_thickness),
            DimensionField::CeilingHeight => Some(self.ceiling_height),
            DimensionField::Offset => None,
        }
    }

    pub(crate) fn length_mut(&mut self, field: DimensionField) -> Option<&mut f64> {
        match field {
            DimensionField::Width => Some(&mut self.width),
            DimensionField::Height => Some(&mut self.height),
            DimensionField::Depth => Some(&mut self.depth),
            DimensionField::PanelThickness => Some(&mut self.panel_thickness),
            DimensionField::CeilingHeight => Some(&mut self.ceiling_height),
            DimensionField::Offset => None,
        }
    }

    /// Checks what panel derivation needs: positive finite outer dimensions
    /// and a thickness strictly below half of each of them.
    pub fn validate_box(&self) -> Result<(), GeometryError> {
        for (field, value) in [
            (DimensionField::Width, self.width),
            (DimensionField::Height, self.height),
            (DimensionField::Depth, self.depth),
            (DimensionField::PanelThickness, self.panel_thickness),
        ] {
            if !value.is_finite() {
                return Err(GeometryError::invalid(field, "waarde is niet eindig"));
            }
            if value <= 0.0 {
                return Err(GeometryError::invalid(field, format!("{value} moet groter dan 0 zijn")));
            }
        }

        let t = self.panel_thickness;
        for (field, value) in [
            (DimensionField::Width, self.width),
            (DimensionField::Height, self.height),
            (DimensionField::Depth, self.depth),
        ] {
            if t >= value / 2.0 {
                return Err(GeometryError::invalid(
                    DimensionField::PanelThickness,
                    format!("dikte {t} moet kleiner zijn dan de helft van {field} ({value})"),
                ));
            }
        }
        Ok(())
    }

    /// Full check used by the form layer: the box rules plus the ceiling.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.validate_box()?;
        if !self.ceiling_height.is_finite() || self.ceiling_height <= 0.0 {
            return Err(GeometryError::invalid(
                DimensionField::CeilingHeight,
                "plafondhoogte moet groter dan 0 zijn",
            ));
        }
        if self.ceiling_height < self.height {
            return Err(GeometryError::invalid(
                DimensionField::CeilingHeight,
                format!(
                    "plafondhoogte {} is lager dan de kast ({})",
                    self.ceiling_height, self.height
                ),
            ));
        }
        Ok(())
    }

    /// Returns the same set expressed in `unit`; every length is converted.
    #[must_use]
    pub fn converted(&self, unit: LengthUnit) -> Self {
        let from = self.unit;
        let c = |v: f64| units::convert(v, from, unit);
        Self {
            width: c(self.width),
            height: c(self.height),
            depth: c(self.depth),
            panel_thickness: c(self.panel_thickness),
            ceiling_height: c(self.ceiling_height),
            unit,
            ..self.clone()
        }
    }

    /// Converts a length given in inches into this set's unit.
    #[must_use]
    pub fn from_inches(&self, inches: f64) -> f64 {
        units::convert(inches, LengthUnit::Inches, self.unit)
    }
}
