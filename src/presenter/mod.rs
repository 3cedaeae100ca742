//! Interactieve 3D-weergave van de kast.
//!
//! [`Presenter`] maps derived panels onto primitives of a [`SceneHost`] and
//! owns the door and wireframe toggles. Every dimension or material change
//! rebuilds the full primitive set: new primitives are spawned before the old
//! ones are despawned, so a frame never sees a half-built cabinet.

pub mod animation;
pub mod scene;

use std::time::Duration;

use crate::geom::{Transform, Vec3};
use crate::model::{DimensionParameters, GeometryError, Panel, PanelKind, derive_geometry};

pub use animation::{DOOR_SWING, DoorAnimation, DoorPhase, DoorPose, ease_in_out};
pub use scene::{
    EnvironmentKind, MaterialKey, ObjectId, PrimitiveRole, PrimitiveShape, RenderPrimitive,
    RetainedScene, SceneDiff, SceneHost, SceneItem,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresenterError {
    #[error("3D-weergave is niet beschikbaar in deze omgeving")]
    RenderingUnavailable,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// One live primitive and the handle the host gave for it.
struct Spawned<Handle> {
    handle: Handle,
    primitive: RenderPrimitive,
    /// Pose in the cabinet frame before door motion and group offset.
    local: Transform,
}

/// Door-open and wireframe flags plus swing progress.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub door_open: bool,
    pub door_phase: DoorPhase,
    pub door_progress: f64,
    pub wireframe: bool,
}

pub struct Presenter<H: SceneHost> {
    host: Option<H>,
    live: Vec<Spawned<H::Handle>>,
    params: Option<DimensionParameters>,
    /// Cabinet centre height from the placement resolver.
    y_translation: f64,
    door: DoorAnimation,
    wireframe: bool,
}

impl<H: SceneHost> Presenter<H> {
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_door_duration(Some(host), animation::DOOR_SWING)
    }

    /// Presenter without a rendering engine. Every scene operation reports
    /// [`PresenterError::RenderingUnavailable`] and nothing is drawn.
    #[must_use]
    pub fn unavailable() -> Self {
        log::warn!("3D-weergave niet beschikbaar; presenter blijft inert");
        Self::with_door_duration(None, animation::DOOR_SWING)
    }

    #[must_use]
    pub fn with_door_duration(host: Option<H>, duration: Duration) -> Self {
        Self {
            host,
            live: Vec::new(),
            params: None,
            y_translation: 0.0,
            door: DoorAnimation::new(duration),
            wireframe: false,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.host.is_some()
    }

    #[must_use]
    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.live.len()
    }

    pub fn primitives(&self) -> impl Iterator<Item = &RenderPrimitive> {
        self.live.iter().map(|s| &s.primitive)
    }

    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        InteractionState {
            door_open: self.door.phase().is_open_target(),
            door_phase: self.door.phase(),
            door_progress: self.door.progress(),
            wireframe: self.wireframe,
        }
    }

    /// Discards every primitive and builds the cabinet and its room anew.
    ///
    /// On a geometry error the previous primitives stay in place.
    pub fn rebuild(
        &mut self,
        params: &DimensionParameters,
        y_translation: f64,
    ) -> Result<(), PresenterError> {
        let Some(host) = self.host.as_mut() else {
            return Err(PresenterError::RenderingUnavailable);
        };
        let panels = derive_geometry(params)?;

        let group = group_offset(params, y_translation);
        let door = self.door.pose(params).motion();
        let mut next = Vec::with_capacity(panels.len() + 3);

        for panel in &panels {
            let local = panel_transform(panel);
            let primitive = RenderPrimitive {
                role: PrimitiveRole::Cabinet(panel.kind),
                shape: PrimitiveShape::from_panel(panel.shape),
                pose: world_pose(panel.kind, local, door, group),
                material: if panel.kind.is_hardware() {
                    MaterialKey::HandleMetal
                } else {
                    MaterialKey::Body(params.material)
                },
                wireframe: self.wireframe,
            };
            let handle = host.spawn(&primitive);
            next.push(Spawned {
                handle,
                primitive,
                local,
            });
        }

        for (kind, shape, pose, material) in environment(params) {
            let primitive = RenderPrimitive {
                role: PrimitiveRole::Environment(kind),
                shape,
                pose,
                material,
                wireframe: false,
            };
            let handle = host.spawn(&primitive);
            next.push(Spawned {
                handle,
                primitive,
                local: pose,
            });
        }

        for old in std::mem::replace(&mut self.live, next) {
            host.despawn(old.handle);
        }
        log::debug!(
            "kast opnieuw opgebouwd: {} primitieven, y = {y_translation}",
            self.live.len()
        );
        self.params = Some(params.clone());
        self.y_translation = y_translation;
        Ok(())
    }

    /// Moves the cabinet group to a new centre height without rebuilding.
    pub fn set_y_translation(&mut self, y_translation: f64) -> Result<(), PresenterError> {
        if self.host.is_none() {
            return Err(PresenterError::RenderingUnavailable);
        }
        self.y_translation = y_translation;
        self.sync_poses(|_| true);
        Ok(())
    }

    pub fn toggle_door(&mut self) -> Result<DoorPhase, PresenterError> {
        if self.host.is_none() {
            return Err(PresenterError::RenderingUnavailable);
        }
        self.door.toggle();
        Ok(self.door.phase())
    }

    /// Flips the wireframe flag on every cabinet-owned primitive.
    pub fn toggle_wireframe(&mut self) -> Result<bool, PresenterError> {
        let Some(host) = self.host.as_mut() else {
            return Err(PresenterError::RenderingUnavailable);
        };
        self.wireframe = !self.wireframe;
        for spawned in &mut self.live {
            if spawned.primitive.role.is_environment() {
                continue;
            }
            spawned.primitive.wireframe = self.wireframe;
            host.set_wireframe(&spawned.handle, self.wireframe);
        }
        Ok(self.wireframe)
    }

    /// Per-frame step. Returns true while the door is moving.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.host.is_none() {
            return false;
        }
        if !self.door.phase().is_animating() {
            return false;
        }
        let moving = self.door.advance(dt);
        self.sync_poses(|role| matches!(role, PrimitiveRole::Cabinet(kind) if kind.follows_door()));
        moving
    }

    fn sync_poses(&mut self, filter: impl Fn(PrimitiveRole) -> bool) {
        let (Some(host), Some(params)) = (self.host.as_mut(), self.params.as_ref()) else {
            return;
        };
        let group = group_offset(params, self.y_translation);
        let door = self.door.pose(params).motion();
        for spawned in &mut self.live {
            let PrimitiveRole::Cabinet(kind) = spawned.primitive.role else {
                continue;
            };
            if !filter(spawned.primitive.role) {
                continue;
            }
            let pose = world_pose(kind, spawned.local, door, group);
            spawned.primitive.pose = pose;
            host.set_pose(&spawned.handle, pose);
        }
    }
}

/// Panel rotation followed by its placement in the cabinet frame.
#[must_use]
pub fn panel_transform(panel: &Panel) -> Transform {
    Transform::rotate_xyz(panel.rotation).then(Transform::translate(panel.center))
}

/// Lifts the cabinet (local origin at its bottom) to the resolved centre.
fn group_offset(params: &DimensionParameters, y_translation: f64) -> Transform {
    Transform::translate(Vec3::new(0.0, y_translation - params.height / 2.0, 0.0))
}

fn world_pose(kind: PanelKind, local: Transform, door: Transform, group: Transform) -> Transform {
    if kind.follows_door() {
        local.then(door).then(group)
    } else {
        local.then(group)
    }
}

/// Floor, ceiling and back wall sized to frame the cabinet.
fn environment(
    params: &DimensionParameters,
) -> [(EnvironmentKind, PrimitiveShape, Transform, MaterialKey); 3] {
    let span = params.width.max(params.depth).max(params.height) * 4.0;
    let plane = PrimitiveShape::Plane {
        width: span,
        height: span,
    };
    let back_z = -params.depth / 2.0 + params.panel_thickness / 2.0;
    [
        (
            EnvironmentKind::Floor,
            plane,
            Transform::rotate_x(-std::f64::consts::FRAC_PI_2),
            MaterialKey::Floor,
        ),
        (
            EnvironmentKind::Ceiling,
            plane,
            Transform::rotate_x(std::f64::consts::FRAC_PI_2)
                .then(Transform::translate(Vec3::new(0.0, params.ceiling_height, 0.0))),
            MaterialKey::Ceiling,
        ),
        (
            EnvironmentKind::BackWall,
            PrimitiveShape::Plane {
                width: span,
                height: params.ceiling_height,
            },
            Transform::translate(Vec3::new(0.0, params.ceiling_height / 2.0, back_z)),
            MaterialKey::Wall,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::find_panel;

    fn params() -> DimensionParameters {
        DimensionParameters::new(20.0, 30.0, 20.0, 0.75)
    }

    fn presenter() -> Presenter<RetainedScene> {
        let mut p = Presenter::new(RetainedScene::new());
        p.rebuild(&params(), 15.0).unwrap();
        p
    }

    fn pose_of(p: &Presenter<RetainedScene>, kind: PanelKind) -> Transform {
        p.primitives()
            .find(|prim| prim.role == PrimitiveRole::Cabinet(kind))
            .map(|prim| prim.pose)
            .unwrap()
    }

    #[test]
    fn rebuild_spawns_cabinet_and_room() {
        let p = presenter();
        assert_eq!(p.primitive_count(), 9 + 3);
        let host = p.host().unwrap();
        assert_eq!(host.len(), 12);
    }

    #[test]
    fn rebuild_replaces_every_primitive() {
        let mut p = presenter();
        p.host_mut().unwrap().take_diff();
        p.rebuild(&params().with_shelves(true), 15.0).unwrap();
        let diff = p.host_mut().unwrap().take_diff();
        assert_eq!(diff.added.len(), 14);
        assert_eq!(diff.removed.len(), 12);
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn failed_rebuild_keeps_previous_scene() {
        let mut p = presenter();
        p.host_mut().unwrap().take_diff();
        let bad = DimensionParameters::new(20.0, 30.0, 20.0, 10.0);
        assert!(matches!(p.rebuild(&bad, 15.0), Err(PresenterError::Geometry(_))));
        assert_eq!(p.primitive_count(), 12);
        assert!(p.host_mut().unwrap().take_diff().is_empty());
    }

    #[test]
    fn ceiling_placement_lifts_group() {
        let mut p = Presenter::new(RetainedScene::new());
        p.rebuild(&params(), 81.0).unwrap();
        let back = pose_of(&p, PanelKind::Back).translation();
        assert!((back - Vec3::new(0.0, 81.0, -9.625)).length() < 1e-12);
        let top_y = pose_of(&p, PanelKind::Top).translation().y + 0.375;
        assert!((top_y - 96.0).abs() < 1e-12);
    }

    #[test]
    fn wireframe_skips_environment() {
        let mut p = presenter();
        assert!(p.toggle_wireframe().unwrap());
        for prim in p.primitives() {
            assert_eq!(prim.wireframe, !prim.role.is_environment(), "{:?}", prim.role);
        }
        // survives a rebuild
        p.rebuild(&params(), 15.0).unwrap();
        assert!(p.primitives().filter(|prim| !prim.role.is_environment()).all(|prim| prim.wireframe));
        assert!(!p.toggle_wireframe().unwrap());
        assert!(p.primitives().all(|prim| !prim.wireframe));
    }

    #[test]
    fn door_and_handle_move_together() {
        let mut p = presenter();
        let panels = derive_geometry(&params()).unwrap();
        let door_closed = find_panel(&panels, PanelKind::Door).unwrap().center;
        let shaft_closed = find_panel(&panels, PanelKind::HandleShaft).unwrap().center;

        p.toggle_door().unwrap();
        while p.advance(Duration::from_millis(16)) {}
        assert_eq!(p.interaction().door_phase, DoorPhase::Open);

        let door = pose_of(&p, PanelKind::Door).translation();
        let shaft = pose_of(&p, PanelKind::HandleShaft).translation();
        assert!((door - Vec3::new(-9.25, 15.0, 9.625)).length() < 1e-9);
        // rigid: distance door centre to handle is preserved
        let before = (shaft_closed - door_closed).length();
        assert!(((shaft - door).length() - before).abs() < 1e-9);
        // frame does not move
        assert!((pose_of(&p, PanelKind::Left).translation().x + 9.625).abs() < 1e-12);
    }

    #[test]
    fn unavailable_presenter_is_inert() {
        let mut p: Presenter<RetainedScene> = Presenter::unavailable();
        assert!(!p.is_available());
        assert_eq!(p.rebuild(&params(), 15.0), Err(PresenterError::RenderingUnavailable));
        assert_eq!(p.toggle_door(), Err(PresenterError::RenderingUnavailable));
        assert_eq!(p.toggle_wireframe(), Err(PresenterError::RenderingUnavailable));
        assert!(!p.advance(Duration::from_secs(1)));
        assert_eq!(p.primitive_count(), 0);
    }
}
