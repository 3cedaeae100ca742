use crate::geom::{GeomMesh, Vec3};

#[test]
fn cuboid_has_finite_vertices_and_valid_indices() {
    let mesh = GeomMesh::cuboid(Vec3::new(2.0, 3.0, 0.75));

    mesh.validate().expect("mesh validate");
    assert_eq!(mesh.positions_flat().len(), mesh.positions.len() * 3);
    assert_eq!(mesh.uvs_flat().unwrap().len(), mesh.positions.len() * 2);
    assert_eq!(mesh.normals_flat().unwrap().len(), mesh.positions.len() * 3);

    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_count(), 12);

    for p in &mesh.positions {
        assert!(p[0].is_finite());
        assert!(p[1].is_finite());
        assert!(p[2].is_finite());
    }
}

#[test]
fn geom_mesh_validate_rejects_bad_buffers() {
    let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![0]);
    assert!(mesh.validate().is_err());

    let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![0, 1, 0]);
    assert!(mesh.validate().is_err());

    let mut mesh = GeomMesh::plane(1.0, 1.0);
    mesh.uvs.as_mut().unwrap().pop();
    assert!(mesh.validate().is_err());

    let mesh = GeomMesh::new(vec![[f64::NAN, 0.0, 0.0]; 3], vec![0, 1, 2]);
    assert!(mesh.validate().is_err());
}
