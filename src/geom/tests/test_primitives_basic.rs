use std::f64::consts::FRAC_PI_2;

use crate::geom::{
    CYLINDER_SEGMENTS, GeomMesh, SPHERE_SEGMENTS, Tolerance, Transform, Vec3,
};

/// Sum of `(a x b) . c` over all triangles; six times the enclosed volume
/// for a closed, outward-wound mesh.
fn signed_volume6(mesh: &GeomMesh) -> f64 {
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let a = Vec3::from(mesh.positions[tri[0] as usize]);
            let b = Vec3::from(mesh.positions[tri[1] as usize]);
            let c = Vec3::from(mesh.positions[tri[2] as usize]);
            let cross = Vec3::new(
                a.y * b.z - a.z * b.y,
                a.z * b.x - a.x * b.z,
                a.x * b.y - a.y * b.x,
            );
            cross.dot(c)
        })
        .sum()
}

#[test]
fn cuboid_bounds_match_requested_size() {
    let mesh = GeomMesh::cuboid(Vec3::new(20.0, 30.0, 0.75));
    let bounds = mesh.bounds().expect("bounds");
    assert!(Tolerance::DEFAULT.approx_eq_vec3(bounds.size(), Vec3::new(20.0, 30.0, 0.75)));
    assert!(Tolerance::DEFAULT.approx_eq_vec3(bounds.center(), Vec3::ZERO));
}

#[test]
fn cuboid_is_wound_outward() {
    let mesh = GeomMesh::cuboid(Vec3::new(2.0, 3.0, 4.0));
    let volume = signed_volume6(&mesh) / 6.0;
    assert!((volume - 24.0).abs() < 1e-9, "volume was {volume}");
}

#[test]
fn cuboid_normals_point_away_from_center() {
    let mesh = GeomMesh::cuboid(Vec3::new(1.0, 2.0, 3.0));
    let normals = mesh.normals.as_ref().unwrap();
    for (p, n) in mesh.positions.iter().zip(normals) {
        assert!(Vec3::from(*p).dot(Vec3::from(*n)) > 0.0);
    }
}

#[test]
fn cylinder_is_closed_and_wound_outward() {
    let mesh = GeomMesh::cylinder(0.25, 4.0, CYLINDER_SEGMENTS);
    mesh.validate().expect("cylinder validate");

    let volume = signed_volume6(&mesh) / 6.0;
    // Inscribed polygon area: n/2 * r^2 * sin(2pi/n).
    let n = f64::from(CYLINDER_SEGMENTS);
    let expected = n / 2.0 * 0.25 * 0.25 * (std::f64::consts::TAU / n).sin() * 4.0;
    assert!((volume - expected).abs() < 1e-9, "volume {volume} vs {expected}");

    let bounds = mesh.bounds().unwrap();
    assert!((bounds.size().y - 4.0).abs() < 1e-12);
}

#[test]
fn sphere_vertices_lie_on_radius() {
    let (ws, hs) = SPHERE_SEGMENTS;
    let mesh = GeomMesh::uv_sphere(0.3, ws, hs);
    mesh.validate().expect("sphere validate");
    for p in &mesh.positions {
        assert!((Vec3::from(*p).length() - 0.3).abs() < 1e-12);
    }
    assert!(signed_volume6(&mesh) > 0.0);
}

#[test]
fn transformed_rotates_normals_with_positions() {
    let shaft = GeomMesh::cylinder(0.25, 4.0, 8)
        .transformed(Transform::rotate_z(FRAC_PI_2).then(Transform::translate(Vec3::new(1.0, 2.0, 3.0))));
    let bounds = shaft.bounds().unwrap();

    assert!((bounds.size().x - 4.0).abs() < 1e-9);
    assert!(Tolerance::LOOSE.approx_eq_vec3(bounds.center(), Vec3::new(1.0, 2.0, 3.0)));
    for n in shaft.normals.as_ref().unwrap() {
        assert!((Vec3::from(*n).length() - 1.0).abs() < 1e-9);
    }
}
