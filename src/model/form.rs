//! Koppeling met de formulierlaag: platte veldwijzigingen in, uitleeswaarden uit.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::material::MaterialKind;
use super::params::{DimensionField, DimensionParameters, GeometryError};
use super::placement::{CabinetPlacement, ReferencePlane, clamp_offset};
use super::units::{self, LengthUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Numeric,
    Enum,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Numeric => "numeric",
            Self::Enum => "enum",
            Self::Boolean => "boolean",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Number(f64),
    Enum(String),
    Boolean(bool),
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Numeric,
            Self::Enum(_) => ValueKind::Enum,
            Self::Boolean(_) => ValueKind::Boolean,
        }
    }
}

/// One edit coming from the form: field name plus typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub value: FieldValue,
}

impl FieldChange {
    pub fn number(field: impl Into<String>, value: f64) -> Self {
        Self {
            field: field.into(),
            value: FieldValue::Number(value),
        }
    }

    pub fn option(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: FieldValue::Enum(value.into()),
        }
    }

    pub fn flag(field: impl Into<String>, value: bool) -> Self {
        Self {
            field: field.into(),
            value: FieldValue::Boolean(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("onbekend veld `{0}`")]
    UnknownField(String),
    #[error("veld `{field}` verwacht een {expected} waarde")]
    WrongValueKind { field: String, expected: ValueKind },
    #[error("onbekende optie `{value}` voor veld `{field}`")]
    UnknownOption { field: String, value: String },
    #[error("veld `{field}` moet een eindig getal zijn")]
    NonFinite { field: String },
    #[error(transparent)]
    Invalid(#[from] GeometryError),
}

/// What an accepted change requires from the consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeEffect {
    /// Panels, drawings and export artifact are stale.
    Geometry,
    /// Only the vertical placement moved.
    Placement,
    /// Value was already current.
    Unchanged,
}

/// Display strings for every form field in the active unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readouts {
    pub width: String,
    pub height: String,
    pub depth: String,
    pub panel_thickness: String,
    pub ceiling_height: String,
    pub offset: String,
    pub material: String,
    pub unit: String,
    pub offset_from: String,
    pub shelves: String,
}

/// Everything the form edits: the dimension set and the placement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguratorState {
    pub params: DimensionParameters,
    pub placement: CabinetPlacement,
}

impl ConfiguratorState {
    pub fn new(params: DimensionParameters, placement: CabinetPlacement) -> Result<Self, FormError> {
        params.validate()?;
        let offset = clamp_offset(placement.offset, params.height, params.ceiling_height);
        Ok(Self {
            params,
            placement: CabinetPlacement::new(placement.reference, offset),
        })
    }

    /// Applies one edit. On error the state is left exactly as it was.
    pub fn apply_change(&mut self, change: &FieldChange) -> Result<ChangeEffect, FormError> {
        let mut next = self.clone();
        let mut edited = None;
        let key = change.field.trim();
        let effect = match key.to_ascii_lowercase().as_str() {
            "material" | "materialkind" => {
                let name = expect_enum(key, &change.value)?;
                next.params.material = name.parse::<MaterialKind>().map_err(|_| unknown(key, name))?;
                ChangeEffect::Geometry
            }
            "unit" | "units" | "unitsystem" => {
                let name = expect_enum(key, &change.value)?;
                let unit = name.parse::<LengthUnit>().map_err(|_| unknown(key, name))?;
                let from = next.params.unit;
                next.params = next.params.converted(unit);
                next.placement.offset = units::convert(next.placement.offset, from, unit);
                ChangeEffect::Geometry
            }
            "offsetfrom" | "reference" => {
                let name = expect_enum(key, &change.value)?;
                let reference = name.parse::<ReferencePlane>().map_err(|_| unknown(key, name))?;
                if reference != next.placement.reference {
                    next.placement = CabinetPlacement::new(reference, 0.0);
                }
                ChangeEffect::Placement
            }
            "shelves" => {
                next.params.shelves = expect_bool(key, &change.value)?;
                ChangeEffect::Geometry
            }
            _ => {
                let field = key
                    .parse::<DimensionField>()
                    .map_err(|()| FormError::UnknownField(key.to_owned()))?;
                let value = expect_number(key, &change.value)?;
                match next.params.length_mut(field) {
                    Some(slot) => {
                        *slot = value;
                        edited = Some(field);
                        ChangeEffect::Geometry
                    }
                    None => {
                        next.placement.offset = value;
                        ChangeEffect::Placement
                    }
                }
            }
        };

        // de vorige toestand was geldig, dus een overtreding hoort bij het gewijzigde veld
        next.params.validate().map_err(|e| match edited {
            Some(field) => e.with_field(field),
            None => e,
        })?;
        next.placement.offset = clamp_offset(
            next.placement.offset,
            next.params.height,
            next.params.ceiling_height,
        );

        if next == *self {
            return Ok(ChangeEffect::Unchanged);
        }
        *self = next;
        Ok(effect)
    }

    /// Centre height of the cabinet in the working unit.
    #[must_use]
    pub fn y_translation(&self) -> f64 {
        self.placement
            .resolve(self.params.height, self.params.ceiling_height)
    }

    #[must_use]
    pub fn readouts(&self) -> Readouts {
        let p = &self.params;
        let unit = p.unit;
        Readouts {
            width: unit.format(p.width),
            height: unit.format(p.height),
            depth: unit.format(p.depth),
            panel_thickness: unit.format(p.panel_thickness),
            ceiling_height: unit.format(p.ceiling_height),
            offset: unit.format(self.placement.offset),
            material: p.material.name().to_owned(),
            unit: unit.to_string(),
            offset_from: self.placement.reference.label().to_owned(),
            shelves: if p.shelves { "2" } else { "0" }.to_owned(),
        }
    }
}

fn unknown(field: &str, value: &str) -> FormError {
    FormError::UnknownOption {
        field: field.to_owned(),
        value: value.to_owned(),
    }
}

fn wrong_kind(field: &str, expected: ValueKind) -> FormError {
    FormError::WrongValueKind {
        field: field.to_owned(),
        expected,
    }
}

fn expect_number(field: &str, value: &FieldValue) -> Result<f64, FormError> {
    match value {
        FieldValue::Number(v) if v.is_finite() => Ok(*v),
        FieldValue::Number(_) => Err(FormError::NonFinite {
            field: field.to_owned(),
        }),
        _ => Err(wrong_kind(field, ValueKind::Numeric)),
    }
}

fn expect_enum<'a>(field: &str, value: &'a FieldValue) -> Result<&'a str, FormError> {
    match value {
        FieldValue::Enum(v) => Ok(v.as_str()),
        _ => Err(wrong_kind(field, ValueKind::Enum)),
    }
}

fn expect_bool(field: &str, value: &FieldValue) -> Result<bool, FormError> {
    match value {
        FieldValue::Boolean(v) => Ok(*v),
        _ => Err(wrong_kind(field, ValueKind::Boolean)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WoodSpecies;

    fn state() -> ConfiguratorState {
        ConfiguratorState::default()
    }

    #[test]
    fn unit_switch_converts_all_lengths_and_offset() {
        let mut s = state();
        s.apply_change(&FieldChange::number("offset", 10.0)).unwrap();
        let effect = s.apply_change(&FieldChange::option("units", "cm")).unwrap();
        assert_eq!(effect, ChangeEffect::Geometry);
        assert!((s.params.width - 50.8).abs() < 0.01);
        assert!((s.placement.offset - 25.4).abs() < 1e-9);
        assert_eq!(s.readouts().width, "50.8 cm");
    }

    #[test]
    fn invalid_thickness_leaves_state_untouched() {
        let mut s = state();
        let before = s.clone();
        let err = s
            .apply_change(&FieldChange::number("panelThickness", 10.0))
            .unwrap_err();
        match err {
            FormError::Invalid(GeometryError::InvalidDimensions { field, .. }) => {
                assert_eq!(field, DimensionField::PanelThickness)
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(s, before);
    }

    #[test]
    fn switching_reference_resets_offset() {
        let mut s = state();
        s.apply_change(&FieldChange::number("offset", 12.0)).unwrap();
        assert_eq!(s.y_translation(), 27.0);
        let effect = s
            .apply_change(&FieldChange::option("offsetFrom", "ceiling"))
            .unwrap();
        assert_eq!(effect, ChangeEffect::Placement);
        assert_eq!(s.placement.offset, 0.0);
        assert_eq!(s.y_translation(), 81.0);
    }

    #[test]
    fn offset_is_clamped_into_the_room() {
        let mut s = state();
        s.apply_change(&FieldChange::number("offset", 500.0)).unwrap();
        assert_eq!(s.placement.offset, 66.0);
        s.apply_change(&FieldChange::number("height", 60.0)).unwrap();
        assert_eq!(s.placement.offset, 36.0);
    }

    #[test]
    fn rejects_wrong_kinds_and_unknowns() {
        let mut s = state();
        assert!(matches!(
            s.apply_change(&FieldChange::flag("width", true)),
            Err(FormError::WrongValueKind { expected: ValueKind::Numeric, .. })
        ));
        assert!(matches!(
            s.apply_change(&FieldChange::number("colour", 1.0)),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            s.apply_change(&FieldChange::option("material", "granite")),
            Err(FormError::UnknownOption { .. })
        ));
        assert!(matches!(
            s.apply_change(&FieldChange::number("depth", f64::INFINITY)),
            Err(FormError::NonFinite { .. })
        ));
    }

    #[test]
    fn material_and_repeat_edits() {
        let mut s = state();
        assert_eq!(
            s.apply_change(&FieldChange::option("material", "Oak Wood")).unwrap(),
            ChangeEffect::Geometry
        );
        assert_eq!(s.params.material, MaterialKind::Wood(WoodSpecies::Oak));
        assert_eq!(
            s.apply_change(&FieldChange::option("material", "oak")).unwrap(),
            ChangeEffect::Unchanged
        );
        assert_eq!(s.readouts().material, "Oak Wood");
    }

    #[test]
    fn ceiling_below_cabinet_is_reported_on_ceiling_field() {
        let mut s = state();
        let err = s
            .apply_change(&FieldChange::number("ceilingHeight", 20.0))
            .unwrap_err();
        assert!(matches!(
            err,
            FormError::Invalid(GeometryError::InvalidDimensions {
                field: DimensionField::CeilingHeight,
                ..
            })
        ));
    }

    fn invalid_field(result: Result<ChangeEffect, FormError>) -> DimensionField {
        match result {
            Err(FormError::Invalid(e)) => e.field(),
            other => panic!("expected a dimension error, got {other:?}"),
        }
    }

    #[test]
    fn height_above_ceiling_is_reported_on_height() {
        let mut s = state();
        let before = s.clone();
        let field = invalid_field(s.apply_change(&FieldChange::number("height", 100.0)));
        assert_eq!(field, DimensionField::Height);
        assert_eq!(s, before);
    }

    #[test]
    fn shrinking_below_two_thicknesses_is_reported_on_the_edited_length() {
        let mut s = state();
        let before = s.clone();
        for key in ["width", "height", "depth"] {
            let field = invalid_field(s.apply_change(&FieldChange::number(key, 1.0)));
            assert_eq!(field, key.parse::<DimensionField>().unwrap());
        }
        assert_eq!(s, before);
    }
}
