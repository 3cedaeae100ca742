//! Grens met de render-engine: primitieven beschrijven, handles terugkrijgen.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::geom::{CYLINDER_SEGMENTS, GeomMesh, SPHERE_SEGMENTS, Transform, Vec3};
use crate::model::{MaterialKind, PanelKind, PanelShape};

/// Surface a primitive is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "material", rename_all = "camelCase")]
pub enum MaterialKey {
    Body(MaterialKind),
    HandleMetal,
    Floor,
    Ceiling,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentKind {
    Floor,
    Ceiling,
    BackWall,
}

/// Who owns a primitive. Environment objects never take the wireframe flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "owner", content = "kind", rename_all = "camelCase")]
pub enum PrimitiveRole {
    Cabinet(PanelKind),
    Environment(EnvironmentKind),
}

impl PrimitiveRole {
    #[must_use]
    pub fn is_environment(self) -> bool {
        matches!(self, Self::Environment(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PrimitiveShape {
    Box {
        size: Vec3,
    },
    /// Along local Y.
    Cylinder {
        radius: f64,
        length: f64,
        segments: u32,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    /// In local XY, facing +Z.
    Plane {
        width: f64,
        height: f64,
    },
}

impl PrimitiveShape {
    #[must_use]
    pub fn from_panel(shape: PanelShape) -> Self {
        match shape {
            PanelShape::Box { size } => Self::Box { size },
            PanelShape::Cylinder { radius, length } => Self::Cylinder {
                radius,
                length,
                segments: CYLINDER_SEGMENTS,
            },
            PanelShape::Sphere { radius } => Self::Sphere {
                radius,
                width_segments: SPHERE_SEGMENTS.0,
                height_segments: SPHERE_SEGMENTS.1,
            },
        }
    }

    /// Tessellates the shape centred on its local origin.
    #[must_use]
    pub fn tessellate(&self) -> GeomMesh {
        match *self {
            Self::Box { size } => GeomMesh::cuboid(size),
            Self::Cylinder {
                radius,
                length,
                segments,
            } => GeomMesh::cylinder(radius, length, segments),
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => GeomMesh::uv_sphere(radius, width_segments, height_segments),
            Self::Plane { width, height } => GeomMesh::plane(width, height),
        }
    }
}

/// A drawable thing positioned in the 3D scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPrimitive {
    pub role: PrimitiveRole,
    pub shape: PrimitiveShape,
    pub pose: Transform,
    pub material: MaterialKey,
    pub wireframe: bool,
}

/// What the presenter needs from a rendering engine.
///
/// Handles stay valid until passed to [`SceneHost::despawn`].
pub trait SceneHost {
    type Handle;

    fn spawn(&mut self, primitive: &RenderPrimitive) -> Self::Handle;
    fn set_pose(&mut self, handle: &Self::Handle, pose: Transform);
    fn set_wireframe(&mut self, handle: &Self::Handle, wireframe: bool);
    fn despawn(&mut self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneItem {
    pub id: ObjectId,
    #[serde(flatten)]
    pub primitive: RenderPrimitive,
}

/// Changes since the previous [`RetainedScene::take_diff`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneDiff {
    pub added: Vec<SceneItem>,
    pub updated: Vec<SceneItem>,
    pub removed: Vec<ObjectId>,
}

impl SceneDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Scene host that keeps every live primitive and hands out diffs, for
/// a JS renderer that mirrors the scene graph.
#[derive(Debug, Default)]
pub struct RetainedScene {
    next_id: u32,
    objects: BTreeMap<ObjectId, RenderPrimitive>,
    added: BTreeSet<ObjectId>,
    dirty: BTreeSet<ObjectId>,
    removed: BTreeSet<ObjectId>,
}

impl RetainedScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&RenderPrimitive> {
        self.objects.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &RenderPrimitive)> {
        self.objects.iter().map(|(id, p)| (*id, p))
    }

    /// Full state as a diff where everything is new.
    #[must_use]
    pub fn snapshot(&self) -> SceneDiff {
        SceneDiff {
            added: self
                .objects
                .iter()
                .map(|(id, primitive)| SceneItem {
                    id: *id,
                    primitive: *primitive,
                })
                .collect(),
            ..SceneDiff::default()
        }
    }

    pub fn take_diff(&mut self) -> SceneDiff {
        let item = |id: &ObjectId| {
            self.objects.get(id).map(|primitive| SceneItem {
                id: *id,
                primitive: *primitive,
            })
        };
        let diff = SceneDiff {
            added: self.added.iter().filter_map(item).collect(),
            updated: self
                .dirty
                .difference(&self.added)
                .filter_map(item)
                .collect(),
            removed: self.removed.iter().copied().collect(),
        };
        self.added.clear();
        self.dirty.clear();
        self.removed.clear();
        diff
    }

    fn touch(&mut self, id: ObjectId) {
        if self.objects.contains_key(&id) {
            self.dirty.insert(id);
        }
    }
}

impl SceneHost for RetainedScene {
    type Handle = ObjectId;

    fn spawn(&mut self, primitive: &RenderPrimitive) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.objects.insert(id, *primitive);
        self.added.insert(id);
        id
    }

    fn set_pose(&mut self, handle: &ObjectId, pose: Transform) {
        if let Some(primitive) = self.objects.get_mut(handle) {
            if primitive.pose != pose {
                primitive.pose = pose;
                self.touch(*handle);
            }
        }
    }

    fn set_wireframe(&mut self, handle: &ObjectId, wireframe: bool) {
        if let Some(primitive) = self.objects.get_mut(handle) {
            if primitive.wireframe != wireframe {
                primitive.wireframe = wireframe;
                self.touch(*handle);
            }
        }
    }

    fn despawn(&mut self, handle: ObjectId) {
        if self.objects.remove(&handle).is_some() {
            self.dirty.remove(&handle);
            if !self.added.remove(&handle) {
                self.removed.insert(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive() -> RenderPrimitive {
        RenderPrimitive {
            role: PrimitiveRole::Cabinet(PanelKind::Back),
            shape: PrimitiveShape::Box {
                size: Vec3::new(20.0, 30.0, 0.75),
            },
            pose: Transform::identity(),
            material: MaterialKey::Body(MaterialKind::default()),
            wireframe: false,
        }
    }

    #[test]
    fn diff_reports_added_then_updated_then_removed() {
        let mut scene = RetainedScene::new();
        let id = scene.spawn(&primitive());
        let diff = scene.take_diff();
        assert_eq!(diff.added.len(), 1);
        assert!(diff.updated.is_empty());

        scene.set_wireframe(&id, true);
        scene.set_wireframe(&id, true);
        let diff = scene.take_diff();
        assert!(diff.added.is_empty());
        assert_eq!(diff.updated.len(), 1);
        assert!(diff.updated[0].primitive.wireframe);

        scene.despawn(id);
        let diff = scene.take_diff();
        assert_eq!(diff.removed, vec![id]);
        assert!(scene.is_empty());
    }

    #[test]
    fn spawn_and_despawn_between_diffs_cancel_out() {
        let mut scene = RetainedScene::new();
        let id = scene.spawn(&primitive());
        scene.set_pose(&id, Transform::translate(Vec3::Y));
        scene.despawn(id);
        assert!(scene.take_diff().is_empty());
    }

    #[test]
    fn unchanged_pose_is_not_reported() {
        let mut scene = RetainedScene::new();
        let id = scene.spawn(&primitive());
        scene.take_diff();
        scene.set_pose(&id, Transform::identity());
        assert!(scene.take_diff().is_empty());
        assert_eq!(scene.snapshot().added.len(), 1);
    }

    #[test]
    fn shapes_tessellate_to_valid_meshes() {
        let shapes = [
            primitive().shape,
            PrimitiveShape::from_panel(PanelShape::Cylinder {
                radius: 0.25,
                length: 4.0,
            }),
            PrimitiveShape::from_panel(PanelShape::Sphere { radius: 0.3 }),
            PrimitiveShape::Plane {
                width: 10.0,
                height: 5.0,
            },
        ];
        for shape in shapes {
            assert!(shape.tessellate().validate().is_ok(), "{shape:?}");
        }
    }
}
