use std::f64::consts::{PI, TAU};

use super::{BBox, Transform, Vec3};

/// Segment count used for the handle shaft, matching the interactive view.
pub const CYLINDER_SEGMENTS: u32 = 16;
/// Longitude/latitude segment counts used for the handle caps.
pub const SPHERE_SEGMENTS: (u32, u32) = (16, 12);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
        }
    }

    /// Axis-aligned box of the given full size, centred on the origin.
    ///
    /// Every face gets its own four vertices so normals and UVs stay flat.
    #[must_use]
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        // (normal, u, v) with u x v == normal, so (0,1,2)/(0,2,3) wind outward.
        let faces = [
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
        ];

        let mut builder = MeshBuilder::with_capacity(24, 36);
        for (normal, u, v) in faces {
            let center = normal * axis_extent(normal, half);
            let du = u * axis_extent(u, half);
            let dv = v * axis_extent(v, half);
            let base = builder.vertex_count();
            builder.push(center - du - dv, normal, [0.0, 0.0]);
            builder.push(center + du - dv, normal, [1.0, 0.0]);
            builder.push(center + du + dv, normal, [1.0, 1.0]);
            builder.push(center - du + dv, normal, [0.0, 1.0]);
            builder.triangle(base, base + 1, base + 2);
            builder.triangle(base, base + 2, base + 3);
        }
        builder.finish()
    }

    /// Capped cylinder along the Y axis, centred on the origin.
    #[must_use]
    pub fn cylinder(radius: f64, length: f64, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = length * 0.5;
        let ring = segments + 1;
        let mut builder = MeshBuilder::with_capacity(
            (ring * 2 + (segments + 1) * 2) as usize,
            (segments * 12) as usize,
        );

        for i in 0..=segments {
            let u = f64::from(i) / f64::from(segments);
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin, 0.0, cos);
            builder.push(Vec3::new(radius * sin, half, radius * cos), normal, [u, 1.0]);
            builder.push(Vec3::new(radius * sin, -half, radius * cos), normal, [u, 0.0]);
        }
        for i in 0..segments {
            let top = i * 2;
            let bottom = top + 1;
            let next_top = top + 2;
            let next_bottom = top + 3;
            builder.triangle(bottom, next_bottom, next_top);
            builder.triangle(bottom, next_top, top);
        }

        for (y, normal) in [(half, Vec3::Y), (-half, -Vec3::Y)] {
            let center = builder.vertex_count();
            builder.push(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5]);
            for i in 0..segments {
                let (sin, cos) = (f64::from(i) / f64::from(segments) * TAU).sin_cos();
                builder.push(
                    Vec3::new(radius * sin, y, radius * cos),
                    normal,
                    [sin * 0.5 + 0.5, cos * 0.5 + 0.5],
                );
            }
            for i in 0..segments {
                let a = center + 1 + i;
                let b = center + 1 + (i + 1) % segments;
                if normal.y > 0.0 {
                    builder.triangle(center, a, b);
                } else {
                    builder.triangle(center, b, a);
                }
            }
        }

        builder.finish()
    }

    /// UV sphere centred on the origin.
    #[must_use]
    pub fn uv_sphere(radius: f64, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut builder =
            MeshBuilder::with_capacity(((ws + 1) * (hs + 1)) as usize, (ws * hs * 6) as usize);

        for iy in 0..=hs {
            let v = f64::from(iy) / f64::from(hs);
            let (sin_v, cos_v) = (v * PI).sin_cos();
            for ix in 0..=ws {
                let u = f64::from(ix) / f64::from(ws);
                let (sin_u, cos_u) = (u * TAU).sin_cos();
                let normal = Vec3::new(-cos_u * sin_v, cos_v, sin_u * sin_v);
                builder.push(normal * radius, normal, [u, 1.0 - v]);
            }
        }

        let stride = ws + 1;
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * stride + ix + 1;
                let b = iy * stride + ix;
                let c = (iy + 1) * stride + ix;
                let d = (iy + 1) * stride + ix + 1;
                if iy != 0 {
                    builder.triangle(a, b, d);
                }
                if iy != hs - 1 {
                    builder.triangle(b, c, d);
                }
            }
        }

        builder.finish()
    }

    /// Flat rectangle in the XY plane facing +Z.
    #[must_use]
    pub fn plane(width: f64, height: f64) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let mut builder = MeshBuilder::with_capacity(4, 6);
        builder.push(Vec3::new(-hw, -hh, 0.0), Vec3::Z, [0.0, 0.0]);
        builder.push(Vec3::new(hw, -hh, 0.0), Vec3::Z, [1.0, 0.0]);
        builder.push(Vec3::new(hw, hh, 0.0), Vec3::Z, [1.0, 1.0]);
        builder.push(Vec3::new(-hw, hh, 0.0), Vec3::Z, [0.0, 1.0]);
        builder.triangle(0, 1, 2);
        builder.triangle(0, 2, 3);
        builder.finish()
    }

    /// Returns a copy with positions moved by `transform` and normals rotated.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|p| transform.apply_point(Vec3::from(*p)).to_array())
            .collect();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|n| {
                    let rotated = transform.apply_vec(Vec3::from(*n));
                    rotated.normalized().unwrap_or(rotated).to_array()
                })
                .collect()
        });
        Self {
            positions,
            indices: self.indices.clone(),
            uvs: self.uvs.clone(),
            normals,
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(self.positions.iter().map(|p| Vec3::from(*p)))
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Returns true if all optional vertex attribute buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    ///
    /// Zero-copy view over `positions`, handed to JS as a packed buffer.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_f64_array_slice::<3>(&self.positions)
    }

    /// Returns the normal buffer as a flat slice when present.
    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(flatten_f64_array_slice::<3>)
    }

    /// Returns the UV buffer as a flat slice when present.
    #[must_use]
    pub fn uvs_flat(&self) -> Option<&[f64]> {
        self.uvs.as_deref().map(flatten_f64_array_slice::<2>)
    }
}

fn flatten_f64_array_slice<const N: usize>(data: &[[f64; N]]) -> &[f64] {
    let count = data.len().checked_mul(N).unwrap_or(0);
    let ptr = data.as_ptr().cast::<f64>();
    // SAFETY: `[[f64; N]]` is stored contiguously, and we compute the element count as `len * N`.
    unsafe { std::slice::from_raw_parts(ptr, count) }
}

/// Half extent of `half` measured along a signed unit axis.
fn axis_extent(axis: Vec3, half: Vec3) -> f64 {
    axis.x.abs() * half.x + axis.y.abs() * half.y + axis.z.abs() * half.z
}

struct MeshBuilder {
    positions: Vec<[f64; 3]>,
    normals: Vec<[f64; 3]>,
    uvs: Vec<[f64; 2]>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: [f64; 2]) {
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv);
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn finish(self) -> GeomMesh {
        GeomMesh {
            positions: self.positions,
            indices: self.indices,
            uvs: Some(self.uvs),
            normals: Some(self.normals),
        }
    }
}
