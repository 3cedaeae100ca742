//! Parametric box-cabinet construction.
//!
//! Cabinet-local frame: origin at the centre of the bottom face, +Y up,
//! +Z towards the front (door side), +X to the right when facing the door.

use std::f64::consts::FRAC_PI_2;

use serde::Serialize;

use crate::geom::{BBox, Vec3};

use super::params::{DimensionField, DimensionParameters, GeometryError};

/// Gap between door and frame opening, in working units.
pub const DOOR_CLEARANCE: f64 = 0.01;

/// Handle hardware, in inches.
pub const HANDLE_RADIUS_IN: f64 = 0.25;
pub const HANDLE_LENGTH_IN: f64 = 4.0;
pub const HANDLE_STANDOFF_IN: f64 = 0.5;
pub const HANDLE_CAP_RADIUS_IN: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    Back,
    Left,
    Right,
    Top,
    Bottom,
    Door,
    HandleShaft,
    HandleCapLeft,
    HandleCapRight,
    Shelf,
}

impl PanelKind {
    /// Handle parts get the handle metal; everything else the body finish.
    #[must_use]
    pub const fn is_hardware(self) -> bool {
        matches!(
            self,
            Self::HandleShaft | Self::HandleCapLeft | Self::HandleCapRight
        )
    }

    /// Parts that move with the door swing.
    #[must_use]
    pub const fn follows_door(self) -> bool {
        matches!(self, Self::Door) || self.is_hardware()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Door => "door",
            Self::HandleShaft => "handle-shaft",
            Self::HandleCapLeft => "handle-cap-left",
            Self::HandleCapRight => "handle-cap-right",
            Self::Shelf => "shelf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelShape {
    /// Rectangular box with full extents.
    Box { size: Vec3 },
    /// Cylinder along its local Y axis.
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
}

/// One rigid cabinet part, positioned in cabinet-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Panel {
    pub kind: PanelKind,
    pub shape: PanelShape,
    pub center: Vec3,
    /// Euler rotation (X, then Y, then Z) applied to the shape before `center`.
    pub rotation: Vec3,
}

impl Panel {
    fn cuboid(kind: PanelKind, size: Vec3, center: Vec3) -> Self {
        Self {
            kind,
            shape: PanelShape::Box { size },
            center,
            rotation: Vec3::ZERO,
        }
    }

    /// Axis-aligned extent of the part in the cabinet frame.
    ///
    /// Only quarter-turn rotations occur in derived geometry, so swapping
    /// axes is exact.
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        let local = match self.shape {
            PanelShape::Box { size } => size,
            PanelShape::Cylinder { radius, length } => Vec3::new(2.0 * radius, length, 2.0 * radius),
            PanelShape::Sphere { radius } => Vec3::splat(2.0 * radius),
        };
        let quarter = |angle: f64| ((angle / FRAC_PI_2).round() as i64).rem_euclid(2) == 1;
        let mut e = local;
        if quarter(self.rotation.x) {
            e = Vec3::new(e.x, e.z, e.y);
        }
        if quarter(self.rotation.y) {
            e = Vec3::new(e.z, e.y, e.x);
        }
        if quarter(self.rotation.z) {
            e = Vec3::new(e.y, e.x, e.z);
        }
        e
    }

    #[must_use]
    pub fn bounds(&self) -> BBox {
        BBox::from_center_size(self.center, self.extent())
    }

    /// Lowest and highest coordinate along one axis (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn span(&self, axis: usize) -> (f64, f64) {
        let b = self.bounds();
        let (lo, hi) = (b.min.to_array(), b.max.to_array());
        (lo[axis], hi[axis])
    }
}

/// Derives every panel of the cabinet from `params`.
///
/// Order: back, left, right, top, bottom, door, handle shaft, left cap,
/// right cap, then the shelves when enabled. Pure: equal inputs produce
/// bit-identical output.
pub fn derive_geometry(params: &DimensionParameters) -> Result<Vec<Panel>, GeometryError> {
    params.validate_box()?;

    let (w, h, d, t) = (
        params.width,
        params.height,
        params.depth,
        params.panel_thickness,
    );
    let (hw, hh, hd) = (w / 2.0, h / 2.0, d / 2.0);

    let door_w = w - 2.0 * t - DOOR_CLEARANCE;
    let door_h = h - 2.0 * t - DOOR_CLEARANCE;
    if door_w <= 0.0 {
        return Err(GeometryError::invalid(
            DimensionField::Width,
            format!("deur wordt {door_w} breed na dikte en speling"),
        ));
    }
    if door_h <= 0.0 {
        return Err(GeometryError::invalid(
            DimensionField::Height,
            format!("deur wordt {door_h} hoog na dikte en speling"),
        ));
    }

    let mut panels = Vec::with_capacity(11);
    panels.push(Panel::cuboid(
        PanelKind::Back,
        Vec3::new(w, h, t),
        Vec3::new(0.0, hh, -hd + t / 2.0),
    ));
    panels.push(Panel::cuboid(
        PanelKind::Left,
        Vec3::new(t, h, d),
        Vec3::new(-(hw - t / 2.0), hh, 0.0),
    ));
    panels.push(Panel::cuboid(
        PanelKind::Right,
        Vec3::new(t, h, d),
        Vec3::new(hw - t / 2.0, hh, 0.0),
    ));
    panels.push(Panel::cuboid(
        PanelKind::Top,
        Vec3::new(w, t, d),
        Vec3::new(0.0, h - t / 2.0, 0.0),
    ));
    panels.push(Panel::cuboid(
        PanelKind::Bottom,
        Vec3::new(w, t, d),
        Vec3::new(0.0, t / 2.0, 0.0),
    ));
    panels.push(Panel::cuboid(
        PanelKind::Door,
        Vec3::new(door_w, door_h, t),
        Vec3::new(0.0, hh, hd - t / 2.0),
    ));
    panels.extend(handle_parts(params, door_w));

    if params.shelves {
        let size = Vec3::new(w - 3.0 * t, t, d - 2.0 * t);
        for y in [hh - h / 4.0, hh + h / 4.0] {
            panels.push(Panel::cuboid(PanelKind::Shelf, size, Vec3::new(0.0, y, 0.0)));
        }
    }

    Ok(panels)
}

/// Horizontal bar on the leading (right) edge at mid-height, capped by two
/// spheres. Narrow doors shorten the bar so it never crosses the door centre.
fn handle_parts(params: &DimensionParameters, door_width: f64) -> [Panel; 3] {
    let (w, h, d, t) = (
        params.width,
        params.height,
        params.depth,
        params.panel_thickness,
    );
    let length = params.from_inches(HANDLE_LENGTH_IN).min(door_width / 2.0);
    let radius = params.from_inches(HANDLE_RADIUS_IN);
    let cap_radius = params.from_inches(HANDLE_CAP_RADIUS_IN);
    let z = d / 2.0 + params.from_inches(HANDLE_STANDOFF_IN);
    let center = Vec3::new(w / 2.0 - t - length / 2.0, h / 2.0, z);

    let cap = |kind, dx: f64| Panel {
        kind,
        shape: PanelShape::Sphere { radius: cap_radius },
        center: center + Vec3::new(dx, 0.0, 0.0),
        rotation: Vec3::ZERO,
    };

    [
        Panel {
            kind: PanelKind::HandleShaft,
            shape: PanelShape::Cylinder { radius, length },
            center,
            rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
        },
        cap(PanelKind::HandleCapLeft, -length / 2.0),
        cap(PanelKind::HandleCapRight, length / 2.0),
    ]
}

/// Interior cavity size measured between the inner faces of the frame:
/// left/right sides, bottom/top, and back panel to door.
#[must_use]
pub fn interior_cavity(panels: &[Panel]) -> Option<Vec3> {
    let find = |kind| panels.iter().find(|p| p.kind == kind);
    let (left, right) = (find(PanelKind::Left)?, find(PanelKind::Right)?);
    let (top, bottom) = (find(PanelKind::Top)?, find(PanelKind::Bottom)?);
    let (back, door) = (find(PanelKind::Back)?, find(PanelKind::Door)?);
    Some(Vec3::new(
        right.span(0).0 - left.span(0).1,
        top.span(1).0 - bottom.span(1).1,
        door.span(2).0 - back.span(2).1,
    ))
}

/// Returns the panel of `kind`, first match.
#[must_use]
pub fn find_panel(panels: &[Panel], kind: PanelKind) -> Option<&Panel> {
    panels.iter().find(|p| p.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LengthUnit;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    fn assert_vec_close(a: Vec3, b: Vec3, tol: f64) {
        assert_close(a.x, b.x, tol);
        assert_close(a.y, b.y, tol);
        assert_close(a.z, b.z, tol);
    }

    fn scenario_a() -> DimensionParameters {
        DimensionParameters::new(20.0, 30.0, 20.0, 0.75)
    }

    #[test]
    fn scenario_a_door_and_back() {
        let panels = derive_geometry(&scenario_a()).unwrap();
        let door = find_panel(&panels, PanelKind::Door).unwrap();
        assert_vec_close(door.extent(), Vec3::new(18.49, 28.49, 0.75), 1e-9);
        assert_vec_close(door.center, Vec3::new(0.0, 15.0, 9.625), 1e-12);
        let back = find_panel(&panels, PanelKind::Back).unwrap();
        assert_vec_close(back.center, Vec3::new(0.0, 15.0, -9.625), 1e-12);
    }

    #[test]
    fn fixed_topology_order() {
        let kinds: Vec<_> = derive_geometry(&scenario_a())
            .unwrap()
            .iter()
            .map(|p| p.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                PanelKind::Back,
                PanelKind::Left,
                PanelKind::Right,
                PanelKind::Top,
                PanelKind::Bottom,
                PanelKind::Door,
                PanelKind::HandleShaft,
                PanelKind::HandleCapLeft,
                PanelKind::HandleCapRight,
            ]
        );
    }

    #[test]
    fn closed_box_boundaries_line_up() {
        for params in [
            scenario_a(),
            DimensionParameters::new(36.0, 84.0, 24.0, 1.0),
            DimensionParameters::new(7.3, 5.1, 3.9, 0.4),
        ] {
            let (w, h, d, t) = (params.width, params.height, params.depth, params.panel_thickness);
            let panels = derive_geometry(&params).unwrap();
            let left = find_panel(&panels, PanelKind::Left).unwrap();
            let right = find_panel(&panels, PanelKind::Right).unwrap();
            assert_close(left.span(0).0, -w / 2.0, 1e-12);
            assert_close(left.span(0).1, -(w / 2.0 - t), 1e-12);
            assert_close(right.span(0).0, w / 2.0 - t, 1e-12);
            assert_close(right.span(0).1, w / 2.0, 1e-12);
            assert_close(left.span(1).1 - left.span(1).0, h, 1e-12);
            assert_close(left.span(2).1 - left.span(2).0, d, 1e-12);

            let back = find_panel(&panels, PanelKind::Back).unwrap();
            assert_close(back.span(2).0, -d / 2.0, 1e-12);

            let cavity = interior_cavity(&panels).unwrap();
            assert_vec_close(cavity, Vec3::new(w - 2.0 * t, h - 2.0 * t, d - 2.0 * t), 1e-9);
        }
    }

    #[test]
    fn derivation_is_bit_identical() {
        let params = scenario_a().with_shelves(true);
        assert_eq!(derive_geometry(&params).unwrap(), derive_geometry(&params).unwrap());
    }

    #[test]
    fn thickness_at_half_width_fails() {
        let params = DimensionParameters::new(20.0, 30.0, 25.0, 10.0);
        let err = derive_geometry(&params).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidDimensions { .. }));
        assert_eq!(err.field(), DimensionField::PanelThickness);
    }

    #[test]
    fn door_swallowed_by_clearance_fails() {
        // 2t + clearance leaves nothing: t just under w/2.
        let params = DimensionParameters::new(1.0, 30.0, 20.0, 0.499);
        let err = derive_geometry(&params).unwrap_err();
        assert_eq!(err.field(), DimensionField::Width);
    }

    #[test]
    fn door_is_centred_in_opening() {
        let panels = derive_geometry(&scenario_a()).unwrap();
        let door = find_panel(&panels, PanelKind::Door).unwrap();
        let left = find_panel(&panels, PanelKind::Left).unwrap();
        let right = find_panel(&panels, PanelKind::Right).unwrap();
        let gap_left = door.span(0).0 - left.span(0).1;
        let gap_right = right.span(0).0 - door.span(0).1;
        assert_close(gap_left, gap_right, 1e-12);
        assert_close(gap_left, DOOR_CLEARANCE / 2.0, 1e-12);
    }

    #[test]
    fn handle_stands_off_the_door_on_the_leading_edge() {
        let panels = derive_geometry(&scenario_a()).unwrap();
        let door = find_panel(&panels, PanelKind::Door).unwrap();
        let (_, door_front) = door.span(2);
        for kind in [PanelKind::HandleShaft, PanelKind::HandleCapLeft, PanelKind::HandleCapRight] {
            let part = find_panel(&panels, kind).unwrap();
            assert!(part.span(2).0 > door_front, "{kind:?} penetrates the door");
            assert!(part.center.x > 0.0, "{kind:?} is not on the leading half");
        }
        let shaft = find_panel(&panels, PanelKind::HandleShaft).unwrap();
        assert_vec_close(shaft.center, Vec3::new(7.25, 15.0, 10.5), 1e-12);
        assert_vec_close(shaft.extent(), Vec3::new(4.0, 0.5, 0.5), 1e-12);
        let cap = find_panel(&panels, PanelKind::HandleCapRight).unwrap();
        assert_close(cap.center.x, 9.25, 1e-12);
    }

    #[test]
    fn handle_hardware_follows_working_unit() {
        let cm = scenario_a().converted(LengthUnit::Centimeters);
        let panels = derive_geometry(&cm).unwrap();
        let shaft = find_panel(&panels, PanelKind::HandleShaft).unwrap();
        assert_close(shaft.extent().x, 10.16, 1e-9);
        assert_close(shaft.center.z, 50.8 / 2.0 + 1.27, 1e-9);
    }

    #[test]
    fn shelves_sit_at_quarter_heights() {
        let panels = derive_geometry(&scenario_a().with_shelves(true)).unwrap();
        let shelves: Vec<_> = panels.iter().filter(|p| p.kind == PanelKind::Shelf).collect();
        assert_eq!(shelves.len(), 2);
        assert_close(shelves[0].center.y, 7.5, 1e-12);
        assert_close(shelves[1].center.y, 22.5, 1e-12);
        assert_vec_close(shelves[0].extent(), Vec3::new(17.75, 0.75, 18.5), 1e-12);
    }
}
