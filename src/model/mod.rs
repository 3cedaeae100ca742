//! Kastmodel: afmetingen, materialen, panelen en plaatsing.
//!
//! Everything here is a pure function of [`DimensionParameters`]; the
//! presenter, the drawing projector and the exporter each derive their own
//! panels from it.

mod form;
mod material;
mod panel;
mod params;
mod placement;
pub mod units;

pub use form::{
    ChangeEffect, ConfiguratorState, FieldChange, FieldValue, FormError, Readouts, ValueKind,
};
pub use material::{HANDLE_METAL, MaterialKind, MaterialSpec, Rgb, TexturePattern, WoodSpecies};
pub use panel::{
    DOOR_CLEARANCE, HANDLE_CAP_RADIUS_IN, HANDLE_LENGTH_IN, HANDLE_RADIUS_IN, HANDLE_STANDOFF_IN,
    Panel, PanelKind, PanelShape, derive_geometry, find_panel, interior_cavity,
};
pub use params::{DimensionField, DimensionParameters, GeometryError};
pub use placement::{CabinetPlacement, ReferencePlane, clamp_offset, resolve_placement};
pub use units::{LengthUnit, convert};
