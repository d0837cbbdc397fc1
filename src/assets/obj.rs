//! Wavefront OBJ payloads, parsed with `tobj`.
//!
//! Material libraries are never fetched; every mesh is drawn with the viewer's
//! surface material anyway.

use crate::gfx::scene::{Mesh, MeshGroup};

use super::AssetError;

/// Parses OBJ text into a group with one child per OBJ object.
///
/// Faces are triangulated and re-indexed so positions and normals share one
/// index buffer. Missing normals are computed from the faces.
pub fn parse_obj(bytes: &[u8], location: &str) -> Result<MeshGroup, AssetError> {
    let mut reader = bytes;
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_mtl_path| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|err| AssetError::Parse {
        location: location.to_string(),
        message: err.to_string(),
    })?;

    let children: Vec<Mesh> = models
        .iter()
        .filter(|model| !model.mesh.positions.is_empty())
        .map(|model| {
            let mesh = &model.mesh;
            Mesh::new(&model.name, &mesh.positions, &mesh.normals, mesh.indices.clone())
        })
        .collect();

    if children.is_empty() {
        return Err(AssetError::EmptyGeometry(location.to_string()));
    }

    log::debug!(
        "parsed {} OBJ object(s) from {}",
        children.len(),
        location
    );

    Ok(MeshGroup::new(group_name(location), children))
}

/// File stem of a location, used to name loaded groups
pub(crate) fn group_name(location: &str) -> String {
    std::path::Path::new(location)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(location)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_OBJ: &str = "\
o box
v -2.0 -1.0 -1.0
v  2.0 -1.0 -1.0
v  2.0  1.0 -1.0
v -2.0  1.0 -1.0
v -2.0 -1.0  1.0
v  2.0 -1.0  1.0
v  2.0  1.0  1.0
v -2.0  1.0  1.0
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 5 1 4 8
";

    #[test]
    fn test_parse_box() {
        let group = parse_obj(BOX_OBJ.as_bytes(), "models/valid.obj").unwrap();
        assert_eq!(group.name, "valid");
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.triangle_count(), 12);

        let bounds = group.local_bounds();
        assert_eq!(bounds.size(), cgmath::Vector3::new(4.0, 2.0, 2.0));

        // No normals in the file, so they are computed
        assert!(group.children[0]
            .vertices()
            .iter()
            .all(|v| v.normal != [0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_multiple_objects_become_children() {
        let obj = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n";
        let group = parse_obj(obj.as_bytes(), "pair.obj").unwrap();
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[1].name, "b");
    }

    #[test]
    fn test_mtllib_is_ignored() {
        let obj = "mtllib missing.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let group = parse_obj(obj.as_bytes(), "tri.obj").unwrap();
        assert_eq!(group.triangle_count(), 1);
    }

    #[test]
    fn test_no_geometry_is_an_error() {
        let err = parse_obj(b"# only a comment\n", "empty.obj").unwrap_err();
        assert!(matches!(err, AssetError::EmptyGeometry(_)));
    }
}
