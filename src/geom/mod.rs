//! Primitive mesh math shared by the presenter and the exporter.

mod core;
mod mesh;

pub use core::{BBox, Tolerance, Transform, Vec3};
pub use mesh::{CYLINDER_SEGMENTS, GeomMesh, SPHERE_SEGMENTS};

#[cfg(test)]
mod tests;
