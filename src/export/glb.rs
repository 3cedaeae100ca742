//! Binary glTF 2.0 container: JSON chunk plus one BIN chunk.

use serde::Serialize;
use serde_json::Value;

use crate::geom::GeomMesh;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UINT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const MODE_TRIANGLES: u32 = 4;
const FILTER_LINEAR: u32 = 9729;
const FILTER_LINEAR_MIPMAP_LINEAR: u32 = 9987;
const WRAP_REPEAT: u32 = 10497;

const CLEARCOAT_EXT: &str = "KHR_materials_clearcoat";

#[derive(Debug, Clone, PartialEq)]
pub struct GlbMaterial {
    pub name: String,
    pub base_color: [f64; 4],
    pub metallic: f64,
    pub roughness: f64,
    pub clearcoat: Option<(f64, f64)>,
    /// Index into the texture images passed to [`GlbBuilder::add_png`].
    pub texture: Option<usize>,
}

// ─── JSON document ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: Asset,
    scene: usize,
    scenes: Vec<Scene>,
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    textures: Vec<Texture>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    samplers: Vec<Sampler>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
    buffers: Vec<Buffer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions_used: Vec<&'static str>,
}

#[derive(Serialize)]
struct Asset {
    version: &'static str,
    generator: &'static str,
}

#[derive(Serialize)]
struct Scene {
    nodes: Vec<usize>,
}

#[derive(Serialize)]
struct Node {
    name: String,
    mesh: usize,
}

#[derive(Serialize)]
struct Mesh {
    name: String,
    primitives: Vec<Primitive>,
}

#[derive(Serialize)]
struct Primitive {
    attributes: Attributes,
    indices: usize,
    material: usize,
    mode: u32,
}

#[derive(Serialize)]
struct Attributes {
    #[serde(rename = "POSITION")]
    position: usize,
    #[serde(rename = "NORMAL", skip_serializing_if = "Option::is_none")]
    normal: Option<usize>,
    #[serde(rename = "TEXCOORD_0", skip_serializing_if = "Option::is_none")]
    texcoord: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Material {
    name: String,
    pbr_metallic_roughness: Pbr,
    #[serde(skip_serializing_if = "Option::is_none")]
    extensions: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Pbr {
    base_color_factor: [f64; 4],
    metallic_factor: f64,
    roughness_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_color_texture: Option<TextureRef>,
}

#[derive(Serialize)]
struct TextureRef {
    index: usize,
}

#[derive(Serialize)]
struct Texture {
    source: usize,
    sampler: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Image {
    buffer_view: usize,
    mime_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Sampler {
    mag_filter: u32,
    min_filter: u32,
    wrap_s: u32,
    wrap_t: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<Vec<f32>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    byte_length: usize,
}

// ─── builder ─────────────────────────────────────────────────────────────────

/// Accumulates meshes, materials and PNG images into one GLB file.
pub struct GlbBuilder {
    bin: Vec<u8>,
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    images: Vec<Image>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
    uses_clearcoat: bool,
}

impl Default for GlbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GlbBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bin: Vec::new(),
            nodes: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            images: Vec::new(),
            accessors: Vec::new(),
            buffer_views: Vec::new(),
            uses_clearcoat: false,
        }
    }

    /// Embeds a PNG and returns its image index.
    pub fn add_png(&mut self, png: &[u8]) -> usize {
        let view = self.push_view(png, None);
        self.images.push(Image {
            buffer_view: view,
            mime_type: "image/png",
        });
        self.images.len() - 1
    }

    /// Adds a material and returns its index.
    pub fn add_material(&mut self, material: &GlbMaterial) -> usize {
        let extensions = material.clearcoat.map(|(factor, roughness)| {
            self.uses_clearcoat = true;
            serde_json::json!({
                CLEARCOAT_EXT: {
                    "clearcoatFactor": factor,
                    "clearcoatRoughnessFactor": roughness,
                }
            })
        });
        self.materials.push(Material {
            name: material.name.clone(),
            pbr_metallic_roughness: Pbr {
                base_color_factor: material.base_color,
                metallic_factor: material.metallic,
                roughness_factor: material.roughness,
                base_color_texture: material.texture.map(|index| TextureRef { index }),
            },
            extensions,
        });
        self.materials.len() - 1
    }

    /// Adds a node holding `mesh` (already in world space).
    pub fn add_mesh(&mut self, name: &str, mesh: &GeomMesh, material: usize) -> Result<(), String> {
        mesh.validate()?;
        let bounds = mesh.bounds().ok_or_else(|| format!("mesh `{name}` is leeg"))?;

        let positions: Vec<f32> = mesh.positions_flat().iter().map(|v| *v as f32).collect();
        let view = self.push_view(&f32_bytes(&positions), Some(TARGET_ARRAY_BUFFER));
        let position = self.push_accessor(Accessor {
            buffer_view: view,
            component_type: COMPONENT_FLOAT,
            count: mesh.vertex_count(),
            kind: "VEC3",
            min: Some(bounds.min.to_array().map(|v| v as f32).to_vec()),
            max: Some(bounds.max.to_array().map(|v| v as f32).to_vec()),
        });

        let normal = mesh.normals_flat().map(|normals| {
            let data: Vec<f32> = normals.iter().map(|v| *v as f32).collect();
            let view = self.push_view(&f32_bytes(&data), Some(TARGET_ARRAY_BUFFER));
            self.push_accessor(Accessor {
                buffer_view: view,
                component_type: COMPONENT_FLOAT,
                count: mesh.vertex_count(),
                kind: "VEC3",
                min: None,
                max: None,
            })
        });

        let texcoord = mesh.uvs_flat().map(|uvs| {
            let data: Vec<f32> = uvs.iter().map(|v| *v as f32).collect();
            let view = self.push_view(&f32_bytes(&data), Some(TARGET_ARRAY_BUFFER));
            self.push_accessor(Accessor {
                buffer_view: view,
                component_type: COMPONENT_FLOAT,
                count: mesh.vertex_count(),
                kind: "VEC2",
                min: None,
                max: None,
            })
        });

        let index_bytes: Vec<u8> = mesh.indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_view(&index_bytes, Some(TARGET_ELEMENT_ARRAY_BUFFER));
        let indices = self.push_accessor(Accessor {
            buffer_view: view,
            component_type: COMPONENT_UINT,
            count: mesh.indices.len(),
            kind: "SCALAR",
            min: None,
            max: None,
        });

        self.meshes.push(Mesh {
            name: name.to_owned(),
            primitives: vec![Primitive {
                attributes: Attributes {
                    position,
                    normal,
                    texcoord,
                },
                indices,
                material,
                mode: MODE_TRIANGLES,
            }],
        });
        self.nodes.push(Node {
            name: name.to_owned(),
            mesh: self.meshes.len() - 1,
        });
        Ok(())
    }

    /// Serializes the document and wraps it in the GLB container.
    pub fn finish(self) -> Result<Vec<u8>, serde_json::Error> {
        let textures: Vec<Texture> = (0..self.images.len())
            .map(|source| Texture { source, sampler: 0 })
            .collect();
        let samplers = if textures.is_empty() {
            Vec::new()
        } else {
            vec![Sampler {
                mag_filter: FILTER_LINEAR,
                min_filter: FILTER_LINEAR_MIPMAP_LINEAR,
                wrap_s: WRAP_REPEAT,
                wrap_t: WRAP_REPEAT,
            }]
        };

        let document = Document {
            asset: Asset {
                version: "2.0",
                generator: concat!("cabinet-engine ", env!("CARGO_PKG_VERSION")),
            },
            scene: 0,
            scenes: vec![Scene {
                nodes: (0..self.nodes.len()).collect(),
            }],
            nodes: self.nodes,
            meshes: self.meshes,
            materials: self.materials,
            textures,
            images: self.images,
            samplers,
            accessors: self.accessors,
            buffer_views: self.buffer_views,
            buffers: vec![Buffer {
                byte_length: self.bin.len(),
            }],
            extensions_used: if self.uses_clearcoat {
                vec![CLEARCOAT_EXT]
            } else {
                Vec::new()
            },
        };

        let json = serde_json::to_vec(&document)?;
        Ok(write_container(&json, &self.bin))
    }

    fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> usize {
        pad_to_four(&mut self.bin, 0);
        let byte_offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset,
            byte_length: bytes.len(),
            target,
        });
        self.buffer_views.len() - 1
    }

    fn push_accessor(&mut self, accessor: Accessor) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn pad_to_four(buf: &mut Vec<u8>, fill: u8) {
    while buf.len() % 4 != 0 {
        buf.push(fill);
    }
}

/// 12-byte header, JSON chunk padded with spaces, BIN chunk padded with zeros.
#[must_use]
pub fn write_container(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut json = json.to_vec();
    pad_to_four(&mut json, b' ');
    let mut bin = bin.to_vec();
    pad_to_four(&mut bin, 0);

    let has_bin = !bin.is_empty();
    let total = 12 + 8 + json.len() + if has_bin { 8 + bin.len() } else { 0 };
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    if has_bin {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin);
    }
    out
}

/// Splits a GLB file into its parsed JSON document and BIN chunk.
pub fn read_container(bytes: &[u8]) -> Result<(Value, Vec<u8>), String> {
    let word = |at: usize| -> Result<u32, String> {
        bytes
            .get(at..at + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or_else(|| format!("GLB afgekapt bij byte {at}"))
    };
    if word(0)? != GLB_MAGIC {
        return Err("geen glTF-magic".to_owned());
    }
    if word(4)? != GLB_VERSION {
        return Err("alleen glTF 2 wordt ondersteund".to_owned());
    }
    if word(8)? as usize != bytes.len() {
        return Err("GLB-lengte klopt niet".to_owned());
    }

    let json_len = word(12)? as usize;
    if word(16)? != CHUNK_JSON {
        return Err("eerste chunk is geen JSON".to_owned());
    }
    let json_bytes = bytes
        .get(20..20 + json_len)
        .ok_or_else(|| "JSON-chunk afgekapt".to_owned())?;
    let json: Value = serde_json::from_slice(json_bytes).map_err(|err| err.to_string())?;

    let bin_at = 20 + json_len;
    if bin_at == bytes.len() {
        return Ok((json, Vec::new()));
    }
    let bin_len = word(bin_at)? as usize;
    if word(bin_at + 4)? != CHUNK_BIN {
        return Err("tweede chunk is geen BIN".to_owned());
    }
    let bin = bytes
        .get(bin_at + 8..bin_at + 8 + bin_len)
        .ok_or_else(|| "BIN-chunk afgekapt".to_owned())?;
    Ok((json, bin.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;

    fn material() -> GlbMaterial {
        GlbMaterial {
            name: "Pine Wood".to_owned(),
            base_color: [0.87, 0.72, 0.53, 1.0],
            metallic: 0.1,
            roughness: 0.65,
            clearcoat: Some((0.2, 0.8)),
            texture: None,
        }
    }

    #[test]
    fn container_is_aligned_and_parses_back() {
        let mut builder = GlbBuilder::new();
        let m = builder.add_material(&material());
        builder
            .add_mesh("back", &GeomMesh::cuboid(Vec3::new(0.5, 0.76, 0.02)), m)
            .unwrap();
        let bytes = builder.finish().unwrap();

        assert_eq!(&bytes[..4], b"glTF");
        assert_eq!(bytes.len() % 4, 0);
        let json_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        assert_eq!(json_len % 4, 0);

        let (json, bin) = read_container(&bytes).unwrap();
        assert_eq!(json["asset"]["version"], "2.0");
        assert_eq!(json["nodes"][0]["name"], "back");
        assert_eq!(json["accessors"][0]["count"], 24);
        assert_eq!(json["accessors"][0]["max"][0].as_f64().unwrap() as f32, 0.25_f32);
        assert_eq!(json["extensionsUsed"][0], CLEARCOAT_EXT);
        assert_eq!(json["buffers"][0]["byteLength"].as_u64().unwrap() as usize, bin.len());
        for view in json["bufferViews"].as_array().unwrap() {
            assert_eq!(view["byteOffset"].as_u64().unwrap() % 4, 0);
        }
    }

    #[test]
    fn embedded_png_gets_texture_and_sampler() {
        let mut builder = GlbBuilder::new();
        let image = builder.add_png(&[0x89, b'P', b'N', b'G', 1]);
        let m = builder.add_material(&GlbMaterial {
            texture: Some(image),
            clearcoat: None,
            ..material()
        });
        builder
            .add_mesh("door", &GeomMesh::cuboid(Vec3::splat(1.0)), m)
            .unwrap();
        let (json, _) = read_container(&builder.finish().unwrap()).unwrap();
        assert_eq!(json["images"][0]["mimeType"], "image/png");
        assert_eq!(json["textures"][0]["source"], 0);
        assert_eq!(
            json["materials"][0]["pbrMetallicRoughness"]["baseColorTexture"]["index"],
            0
        );
        assert!(json.get("extensionsUsed").is_none());
    }

    #[test]
    fn rejects_invalid_mesh() {
        let mut builder = GlbBuilder::new();
        let bad = GeomMesh::new(vec![[0.0; 3]], vec![0, 1, 2]);
        assert!(builder.add_mesh("bad", &bad, 0).is_err());
    }

    #[test]
    fn read_rejects_garbage() {
        assert!(read_container(b"nope").is_err());
        let mut bytes = write_container(b"{}", &[]);
        bytes[8] = 99;
        assert!(read_container(&bytes).is_err());
    }
}
