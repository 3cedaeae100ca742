//! Technische tekeningen: zes orthografische aanzichten van dezelfde panelen.
//!
//! Every view projects the derived panel set onto its own image plane,
//! fits it into the canvas with a fixed margin and emits stroke, fill and
//! text operations on a [`DrawingSurface`]. Image coordinates grow to the
//! right and downwards.

pub mod surface;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::geom::{BBox, Vec3};
use crate::model::{DimensionParameters, GeometryError, Panel, PanelKind, derive_geometry, find_panel};

pub use surface::{CommandList, DrawCommand, DrawingSurface, ViewportSize};

/// Total margin (both sides together) around each view, in CSS pixels.
pub const DEFAULT_MARGIN: f64 = 40.0;

const OUTLINE: &str = "#333";
const PANEL_FILL: &str = "#f0f0f0";
const HIDDEN: &str = "#999";
const HARDWARE: &str = "#666";
const LABEL_FONT: &str = "12px Arial";
const DASH: [f64; 2] = [5.0, 5.0];
/// Minimum on-screen thickness of the handle bar.
const HANDLE_MIN_PX: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Front,
    Rear,
    Left,
    Right,
    Top,
    Bottom,
}

impl ViewKind {
    pub const ALL: [Self; 6] = [
        Self::Front,
        Self::Rear,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Maps a cabinet-local point to image-plane model coordinates.
    ///
    /// Bottom shares the top projection.
    #[must_use]
    pub fn project(self, p: Vec3) -> [f64; 2] {
        match self {
            Self::Front => [p.x, -p.y],
            Self::Rear => [-p.x, -p.y],
            Self::Left => [p.z, -p.y],
            Self::Right => [-p.z, -p.y],
            Self::Top | Self::Bottom => [p.x, p.z],
        }
    }

    fn project_box(self, b: BBox) -> Rect {
        let a = self.project(b.min);
        let c = self.project(b.max);
        Rect {
            x0: a[0].min(c[0]),
            y0: a[1].min(c[1]),
            x1: a[0].max(c[0]),
            y1: a[1].max(c[1]),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let key = key.strip_suffix("-view").unwrap_or(&key);
        Self::ALL
            .into_iter()
            .find(|view| view.name() == key || (key == "back" && *view == Self::Rear))
            .ok_or_else(|| format!("onbekend aanzicht `{}`", s.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("canvas voor {view}-aanzicht is te klein om de kast te tekenen")]
    ViewportTooSmall { view: ViewKind },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Scale and centring offset that fit a model extent into a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fit {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// `scale = min((W - margin) / a, (H - margin) / b)`, then centred on both
/// axes. `a` and `b` are the horizontal and vertical model extents.
pub fn fit_to_view(
    view: ViewKind,
    extent_a: f64,
    extent_b: f64,
    viewport: &ViewportSize,
    margin: f64,
) -> Result<Fit, ProjectionError> {
    let (cw, ch) = (viewport.css_width(), viewport.css_height());
    let scale = ((cw - margin) / extent_a).min((ch - margin) / extent_b);
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ProjectionError::ViewportTooSmall { view });
    }
    Ok(Fit {
        scale,
        offset_x: (cw - extent_a * scale) / 2.0,
        offset_y: (ch - extent_b * scale) / 2.0,
    })
}

/// Axis-aligned rectangle in model image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Rect {
    fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Model-to-screen mapping for one view.
struct Canvas<'a, S: DrawingSurface> {
    surface: &'a mut S,
    fit: Fit,
    origin: [f64; 2],
}

impl<S: DrawingSurface> Canvas<'_, S> {
    fn map(&self, u: f64, v: f64) -> [f64; 2] {
        [
            self.fit.offset_x + (u - self.origin[0]) * self.fit.scale,
            self.fit.offset_y + (v - self.origin[1]) * self.fit.scale,
        ]
    }

    fn screen(&self, r: Rect) -> (f64, f64, f64, f64) {
        let [x, y] = self.map(r.x0, r.y0);
        (x, y, r.width() * self.fit.scale, r.height() * self.fit.scale)
    }

    fn fill_rect(&mut self, r: Rect) {
        let (x, y, w, h) = self.screen(r);
        self.surface.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, r: Rect) {
        let (x, y, w, h) = self.screen(r);
        self.surface.stroke_rect(x, y, w, h);
    }

    fn line(&mut self, from: [f64; 2], to: [f64; 2]) {
        let a = self.map(from[0], from[1]);
        let b = self.map(to[0], to[1]);
        self.surface.line(a, b);
    }
}

/// Draws one view of the cabinet described by `params` and returns the fit
/// it was drawn with.
pub fn project_view<S: DrawingSurface>(
    view: ViewKind,
    params: &DimensionParameters,
    viewport: &ViewportSize,
    margin: f64,
    surface: &mut S,
) -> Result<Fit, ProjectionError> {
    let panels = derive_geometry(params)?;
    let frame = frame_bounds(&panels).ok_or(ProjectionError::ViewportTooSmall { view })?;
    let outline = view.project_box(frame);
    let fit = fit_to_view(view, outline.width(), outline.height(), viewport, margin)?;

    surface.clear(viewport.css_width(), viewport.css_height());
    surface.set_stroke(OUTLINE, 2.0);
    surface.set_fill(PANEL_FILL);

    let mut canvas = Canvas {
        surface,
        fit,
        origin: [outline.x0, outline.y0],
    };
    canvas.fill_rect(outline);
    canvas.stroke_rect(outline);

    let panel_rect = |kind| find_panel(&panels, kind).map(|p| view.project_box(p.bounds()));

    match view {
        ViewKind::Front => {
            if let Some(door) = panel_rect(PanelKind::Door) {
                canvas.stroke_rect(door);
            }
            if let Some(handle) = panel_rect(PanelKind::HandleShaft) {
                let min = HANDLE_MIN_PX / fit.scale;
                let handle = Rect {
                    y0: handle.y0.min((handle.y0 + handle.y1 - min) / 2.0),
                    y1: handle.y1.max((handle.y0 + handle.y1 + min) / 2.0),
                    ..handle
                };
                canvas.surface.set_fill(HARDWARE);
                canvas.fill_rect(handle);
            }
        }
        ViewKind::Rear => {
            if let Some(door) = panel_rect(PanelKind::Door) {
                canvas.surface.set_stroke(HIDDEN, 1.0);
                canvas.surface.set_line_dash(&DASH);
                canvas.stroke_rect(door);
                canvas.surface.set_line_dash(&[]);
            }
        }
        ViewKind::Left | ViewKind::Right => {
            canvas.surface.set_stroke(HIDDEN, 1.0);
            canvas.surface.set_line_dash(&DASH);
            let y_lines = [
                find_panel(&panels, PanelKind::Top).map(|p| view.project(Vec3::new(0.0, p.span(1).0, 0.0))[1]),
                find_panel(&panels, PanelKind::Bottom).map(|p| view.project(Vec3::new(0.0, p.span(1).1, 0.0))[1]),
            ];
            for v in y_lines.into_iter().flatten() {
                canvas.line([outline.x0, v], [outline.x1, v]);
            }
            for shelf in panels.iter().filter(|p| p.kind == PanelKind::Shelf) {
                let r = view.project_box(shelf.bounds());
                canvas.stroke_rect(r);
            }
            canvas.surface.set_line_dash(&[]);
        }
        ViewKind::Top | ViewKind::Bottom => {
            canvas.surface.set_stroke(HIDDEN, 1.0);
            for kind in [PanelKind::Left, PanelKind::Right, PanelKind::Back] {
                if let Some(r) = panel_rect(kind) {
                    canvas.stroke_rect(r);
                }
            }
            // deuropening: binnenkant zijpanelen, over de voorste strook van dikte t
            if let (Some(left), Some(right)) = (
                find_panel(&panels, PanelKind::Left),
                find_panel(&panels, PanelKind::Right),
            ) {
                let front = frame.max.z;
                let opening = BBox::new(
                    Vec3::new(left.span(0).1, 0.0, front - params.panel_thickness),
                    Vec3::new(right.span(0).0, 0.0, front),
                );
                canvas.surface.set_stroke(OUTLINE, 1.0);
                canvas.surface.set_line_dash(&DASH);
                canvas.stroke_rect(view.project_box(opening));
                canvas.surface.set_line_dash(&[]);
            }
        }
    }

    let (a, b) = label_values(view, params);
    let unit = params.unit;
    let [x, y] = canvas.map(outline.x0, outline.y0);
    let (w, h) = (outline.width() * fit.scale, outline.height() * fit.scale);
    canvas.surface.set_fill(OUTLINE);
    canvas.surface.set_font(LABEL_FONT);
    canvas
        .surface
        .fill_text(&unit.format(a), x + w / 2.0 - 10.0, y + h + 20.0);
    canvas
        .surface
        .fill_text(&unit.format(b), x - 30.0, y + h / 2.0);

    log::debug!("{view}-aanzicht getekend, schaal {:.3}", fit.scale);
    Ok(fit)
}

/// One recorded view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDrawing {
    pub view: ViewKind,
    pub fit: Fit,
    pub commands: CommandList,
}

/// Records all six views for canvases of the same size.
pub fn project_all(
    params: &DimensionParameters,
    viewport: &ViewportSize,
    margin: f64,
) -> Result<Vec<ViewDrawing>, ProjectionError> {
    ViewKind::ALL
        .into_iter()
        .map(|view| record_view(view, params, viewport, margin))
        .collect()
}

/// Records one view into a [`CommandList`].
pub fn record_view(
    view: ViewKind,
    params: &DimensionParameters,
    viewport: &ViewportSize,
    margin: f64,
) -> Result<ViewDrawing, ProjectionError> {
    let mut commands = CommandList::new();
    let fit = project_view(view, params, viewport, margin, &mut commands)?;
    Ok(ViewDrawing {
        view,
        fit,
        commands,
    })
}

/// Outer box made up by back, sides, top and bottom.
fn frame_bounds(panels: &[Panel]) -> Option<BBox> {
    panels
        .iter()
        .filter(|p| {
            matches!(
                p.kind,
                PanelKind::Back | PanelKind::Left | PanelKind::Right | PanelKind::Top | PanelKind::Bottom
            )
        })
        .map(Panel::bounds)
        .reduce(BBox::union)
}

/// Horizontal and vertical dimension label values, as entered.
fn label_values(view: ViewKind, params: &DimensionParameters) -> (f64, f64) {
    match view {
        ViewKind::Front | ViewKind::Rear => (params.width, params.height),
        ViewKind::Left | ViewKind::Right => (params.depth, params.height),
        ViewKind::Top | ViewKind::Bottom => (params.width, params.depth),
    }
}
