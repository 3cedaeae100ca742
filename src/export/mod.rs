//! Export voor AR-weergave: de kast op ware grootte als binaire glTF.
//!
//! The export always stands on the floor at metric scale, independent of the
//! interactive placement. [`ExportSession`] owns the single current artifact
//! and hands out release notices so the host can free old object URLs.

pub mod glb;
pub mod texture;

use crate::geom::{BBox, GeomMesh, Transform};
use crate::model::{DimensionParameters, GeometryError, HANDLE_METAL, MaterialSpec, PanelKind, derive_geometry};
use crate::presenter::{PrimitiveShape, panel_transform};

use glb::{GlbBuilder, GlbMaterial};
use texture::{EXPORT_TEXTURE_CAP, PRESENTER_TEXTURE_SIZE, encode_png, finish_texture};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("export is niet beschikbaar in deze omgeving")]
    ExportUnavailable,
    #[error("export mislukt: {0}")]
    ExportFailed(String),
    #[error("export is vervangen door een nieuwere aanvraag")]
    Superseded,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMaterial {
    Body,
    Handle,
}

/// One panel with its transform baked into the vertices, in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNode {
    pub kind: PanelKind,
    pub mesh: GeomMesh,
    pub material: ExportMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportScene {
    pub nodes: Vec<ExportNode>,
    pub body: MaterialSpec,
    pub handle: MaterialSpec,
}

impl ExportScene {
    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        self.nodes
            .iter()
            .filter_map(|node| node.mesh.bounds())
            .reduce(BBox::union)
    }
}

/// Re-derives the panels and scales them to meters with the bottom at y = 0.
///
/// The door is exported closed.
pub fn build_export_scene(params: &DimensionParameters) -> Result<ExportScene, GeometryError> {
    let panels = derive_geometry(params)?;
    let to_meters = Transform::uniform_scale(params.unit.meters_per_unit());

    let nodes = panels
        .iter()
        .map(|panel| ExportNode {
            kind: panel.kind,
            mesh: PrimitiveShape::from_panel(panel.shape)
                .tessellate()
                .transformed(panel_transform(panel).then(to_meters)),
            material: if panel.kind.is_hardware() {
                ExportMaterial::Handle
            } else {
                ExportMaterial::Body
            },
        })
        .collect();

    Ok(ExportScene {
        nodes,
        body: params.material.spec(),
        handle: HANDLE_METAL,
    })
}

/// Serializes an [`ExportScene`] into some container format.
pub trait ExportBackend {
    type Artifact;

    fn export(&self, scene: &ExportScene) -> Result<Self::Artifact, ExportError>;
}

/// Binary glTF with the body finish texture embedded as PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbBackend {
    pub max_texture_size: u32,
}

impl Default for GlbBackend {
    fn default() -> Self {
        Self {
            max_texture_size: EXPORT_TEXTURE_CAP,
        }
    }
}

impl GlbBackend {
    fn material(spec: &MaterialSpec, texture: Option<usize>) -> GlbMaterial {
        let [r, g, b] = spec.base_color.to_array();
        GlbMaterial {
            name: spec.name.to_owned(),
            // de textuur is al getint
            base_color: if texture.is_some() {
                [1.0, 1.0, 1.0, 1.0]
            } else {
                [r, g, b, 1.0]
            },
            metallic: spec.metalness,
            roughness: spec.roughness,
            clearcoat: (spec.clearcoat > 0.0).then_some((spec.clearcoat, spec.clearcoat_roughness)),
            texture,
        }
    }
}

impl ExportBackend for GlbBackend {
    type Artifact = Vec<u8>;

    fn export(&self, scene: &ExportScene) -> Result<Vec<u8>, ExportError> {
        let mut builder = GlbBuilder::new();

        let body_texture = match scene.body.pattern {
            Some(_) => {
                let image = finish_texture(&scene.body, PRESENTER_TEXTURE_SIZE);
                let png = encode_png(&image, self.max_texture_size)
                    .map_err(|err| ExportError::ExportFailed(err.to_string()))?;
                Some(builder.add_png(&png))
            }
            None => None,
        };
        let body = builder.add_material(&Self::material(&scene.body, body_texture));
        let handle = builder.add_material(&Self::material(&scene.handle, None));

        for node in &scene.nodes {
            let material = match node.material {
                ExportMaterial::Body => body,
                ExportMaterial::Handle => handle,
            };
            builder
                .add_mesh(node.kind.name(), &node.mesh, material)
                .map_err(ExportError::ExportFailed)?;
        }

        builder
            .finish()
            .map_err(|err| ExportError::ExportFailed(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExportTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u32);

/// At most one export in flight and one current artifact.
///
/// A new [`ExportSession::begin`] cancels the pending ticket; completing a
/// stale ticket yields [`ExportError::Superseded`]. Replaced or invalidated
/// artifacts are queued in [`ExportSession::take_released`].
pub struct ExportSession<B: ExportBackend> {
    backend: Option<B>,
    next_ticket: u64,
    pending: Option<ExportTicket>,
    next_artifact: u32,
    current: Option<(ArtifactId, B::Artifact)>,
    released: Vec<ArtifactId>,
}

impl<B: ExportBackend> ExportSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_backend(Some(backend))
    }

    pub fn unavailable() -> Self {
        Self::with_backend(None)
    }

    pub fn with_backend(backend: Option<B>) -> Self {
        Self {
            backend,
            next_ticket: 0,
            pending: None,
            next_artifact: 0,
            current: None,
            released: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn current(&self) -> Option<(ArtifactId, &B::Artifact)> {
        self.current.as_ref().map(|(id, artifact)| (*id, artifact))
    }

    pub fn begin(&mut self) -> Result<ExportTicket, ExportError> {
        if self.backend.is_none() {
            log::warn!("export gevraagd maar niet beschikbaar");
            return Err(ExportError::ExportUnavailable);
        }
        if let Some(previous) = self.pending {
            log::debug!("export {previous:?} geannuleerd");
        }
        let ticket = ExportTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);
        Ok(ticket)
    }

    /// Finishes `ticket`; on failure the previous artifact stays current.
    pub fn complete(
        &mut self,
        ticket: ExportTicket,
        params: &DimensionParameters,
    ) -> Result<(ArtifactId, &B::Artifact), ExportError> {
        if self.pending != Some(ticket) {
            return Err(ExportError::Superseded);
        }
        self.pending = None;
        let Some(backend) = self.backend.as_ref() else {
            return Err(ExportError::ExportUnavailable);
        };

        let artifact = build_export_scene(params)
            .map_err(ExportError::from)
            .and_then(|scene| backend.export(&scene))
            .inspect_err(|err| log::error!("export mislukt: {err}"))?;

        self.release();
        let id = ArtifactId(self.next_artifact);
        self.next_artifact += 1;
        log::debug!("export-artefact {} aangemaakt", id.0);
        let (id, artifact) = self.current.insert((id, artifact));
        Ok((*id, artifact))
    }

    pub fn export_now(
        &mut self,
        params: &DimensionParameters,
    ) -> Result<(ArtifactId, &B::Artifact), ExportError> {
        let ticket = self.begin()?;
        self.complete(ticket, params)
    }

    /// Drops the current artifact; returns whether there was one.
    pub fn release(&mut self) -> bool {
        match self.current.take() {
            Some((id, _)) => {
                self.released.push(id);
                true
            }
            None => false,
        }
    }

    pub fn take_released(&mut self) -> Vec<ArtifactId> {
        std::mem::take(&mut self.released)
    }
}
