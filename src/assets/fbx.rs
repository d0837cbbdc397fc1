//! Binary FBX payloads.
//!
//! Documents are loaded with `fbxcel-dom`; only the mesh geometry under
//! `Objects` is read from the node tree: `Vertices` and `PolygonVertexIndex`
//! of every `Geometry` node. Polygons are fan-triangulated and normals are
//! computed from the faces, so files without a normal layer look the same as
//! files with one. Model transforms, materials and animation are ignored; the
//! viewer re-centers and re-scales whatever it gets.

use std::io::Cursor;

use fbxcel::{low::v7400::AttributeValue, tree::v7400::NodeHandle};
use fbxcel_dom::any::AnyDocument;
use thiserror::Error;

use crate::gfx::scene::{Mesh, MeshGroup};

use super::{obj::group_name, AssetError};

/// Deepest node nesting accepted; real exports stay below ten levels
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum FbxError {
    #[error("ASCII FBX files are not supported")]
    Ascii,
    #[error("{0}")]
    Document(String),
    #[error("unsupported FBX version")]
    UnsupportedVersion,
    #[error("nodes nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
    #[error("geometry {geometry:?} references vertex {index} of {count}")]
    IndexOutOfRange {
        geometry: String,
        index: usize,
        count: usize,
    },
}

/// Parses a binary FBX payload into a group with one child per geometry
pub fn parse_fbx(bytes: &[u8], location: &str) -> Result<MeshGroup, AssetError> {
    let parse_error = |err: FbxError| AssetError::Parse {
        location: location.to_string(),
        message: err.to_string(),
    };

    if bytes.starts_with(b"; FBX") || bytes.starts_with(b"FBXHeaderExtension") {
        return Err(parse_error(FbxError::Ascii));
    }

    let document = AnyDocument::from_seekable_reader(Cursor::new(bytes))
        .map_err(|err| parse_error(FbxError::Document(err.to_string())))?;
    let (version, document) = match document {
        AnyDocument::V7400(version, document) => (version, document),
        _ => return Err(parse_error(FbxError::UnsupportedVersion)),
    };

    let root = document.tree().root();
    check_depth(root).map_err(parse_error)?;
    let children = extract_meshes(root).map_err(parse_error)?;

    if children.is_empty() {
        return Err(AssetError::EmptyGeometry(location.to_string()));
    }

    log::debug!(
        "parsed {} FBX geometr{} from {} ({:?})",
        children.len(),
        if children.len() == 1 { "y" } else { "ies" },
        location,
        version
    );

    Ok(MeshGroup::new(group_name(location), children))
}

/// Rejects documents nested deeper than [`MAX_DEPTH`], without recursing
fn check_depth(root: NodeHandle<'_>) -> Result<(), FbxError> {
    let mut pending = vec![(root, 0usize)];
    while let Some((node, depth)) = pending.pop() {
        if depth > MAX_DEPTH {
            return Err(FbxError::TooDeep);
        }
        pending.extend(node.children().map(|child| (child, depth + 1)));
    }
    Ok(())
}

fn extract_meshes(root: NodeHandle<'_>) -> Result<Vec<Mesh>, FbxError> {
    let Some(objects) = root.first_child_by_name("Objects") else {
        return Ok(Vec::new());
    };

    let mut meshes = Vec::new();
    for geometry in objects.children_by_name("Geometry") {
        let name = geometry_name(geometry);

        let positions = geometry
            .first_child_by_name("Vertices")
            .map(|n| float_array(n.attributes()))
            .unwrap_or_default();
        let polygon_indices = geometry
            .first_child_by_name("PolygonVertexIndex")
            .map(|n| index_array(n.attributes()))
            .unwrap_or_default();

        let vertex_count = positions.len() / 3;
        if vertex_count == 0 {
            continue;
        }

        let indices = triangulate(&polygon_indices, vertex_count).map_err(|index| {
            FbxError::IndexOutOfRange {
                geometry: name.clone(),
                index,
                count: vertex_count,
            }
        })?;
        meshes.push(Mesh::new(&name, &positions, &[], indices));
    }
    Ok(meshes)
}

/// First attribute as coordinates, whichever float width the exporter chose
fn float_array(attributes: &[AttributeValue]) -> Vec<f32> {
    match attributes.first() {
        Some(AttributeValue::ArrF64(values)) => values.iter().map(|&v| v as f32).collect(),
        Some(AttributeValue::ArrF32(values)) => values.clone(),
        _ => Vec::new(),
    }
}

fn index_array(attributes: &[AttributeValue]) -> Vec<i64> {
    match attributes.first() {
        Some(AttributeValue::ArrI32(values)) => values.iter().map(|&v| v as i64).collect(),
        Some(AttributeValue::ArrI64(values)) => values.clone(),
        _ => Vec::new(),
    }
}

/// `Geometry::Brain\0\x01Geometry` style names become `Brain`
fn geometry_name(geometry: NodeHandle<'_>) -> String {
    let raw = match geometry.attributes().get(1) {
        Some(AttributeValue::String(name)) => name.as_str(),
        _ => "Geometry",
    };
    let name = raw.split("\u{0}\u{1}").next().unwrap_or(raw);
    name.strip_prefix("Geometry::").unwrap_or(name).to_string()
}

/// Fan-triangulates FBX polygon indices, where a negative entry `v` is the
/// last corner of its polygon and stands for index `!v`.
///
/// Returns the first out-of-range index as the error.
fn triangulate(polygon_indices: &[i64], vertex_count: usize) -> Result<Vec<u32>, usize> {
    let mut triangles = Vec::with_capacity(polygon_indices.len() * 2);
    let mut polygon: Vec<u32> = Vec::with_capacity(4);

    for &raw in polygon_indices {
        let closes = raw < 0;
        let index = (if closes { !raw } else { raw }) as usize;
        if index >= vertex_count {
            return Err(index);
        }
        polygon.push(index as u32);

        if closes {
            for i in 1..polygon.len().saturating_sub(1) {
                triangles.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
            }
            polygon.clear();
        }
    }
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MAGIC: &[u8] = b"Kaydara FBX Binary  \0";
    const FOOTER_ID: [u8; 16] = [
        0xfa, 0xbc, 0xab, 0x09, 0xd0, 0xc8, 0xd4, 0x66, 0xb1, 0x76, 0xfb, 0x83, 0x1c, 0xf7, 0x26, 0x7e,
    ];
    const FOOTER_MAGIC: [u8; 16] = [
        0xf8, 0x5a, 0x8c, 0x6a, 0xde, 0xf5, 0xd9, 0x7e, 0xec, 0xe9, 0x0c, 0xe3, 0x75, 0x8f, 0x29, 0x0b,
    ];

    struct TestNode {
        name: String,
        properties: Vec<Vec<u8>>,
        children: Vec<TestNode>,
    }

    fn node(name: &str, properties: Vec<Vec<u8>>, children: Vec<TestNode>) -> TestNode {
        TestNode {
            name: name.to_string(),
            properties,
            children,
        }
    }

    fn is_wide(version: u32) -> bool {
        version >= 7500
    }

    fn null_record(wide: bool) -> usize {
        if wide {
            25
        } else {
            13
        }
    }

    fn write_field(out: &mut Vec<u8>, value: u64, wide: bool) {
        if wide {
            out.extend_from_slice(&value.to_le_bytes());
        } else {
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
    }

    fn patch_field(out: &mut [u8], at: usize, value: u64, wide: bool) {
        if wide {
            out[at..at + 8].copy_from_slice(&value.to_le_bytes());
        } else {
            out[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes());
        }
    }

    fn write_node(out: &mut Vec<u8>, node: &TestNode, wide: bool) {
        let start = out.len();
        write_field(out, 0, wide);
        write_field(out, node.properties.len() as u64, wide);
        write_field(out, node.properties.iter().map(Vec::len).sum::<usize>() as u64, wide);
        out.push(node.name.len() as u8);
        out.extend_from_slice(node.name.as_bytes());
        for property in &node.properties {
            out.extend_from_slice(property);
        }
        if !node.children.is_empty() {
            for child in &node.children {
                write_node(out, child, wide);
            }
            out.extend(std::iter::repeat(0u8).take(null_record(wide)));
        }
        let end = out.len() as u64;
        patch_field(out, start, end, wide);
    }

    fn header(version: u32) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[0x1a, 0x00]);
        out.extend_from_slice(&version.to_le_bytes());
        out
    }

    /// Closes the top-level node list and appends the standard footer
    fn finish(mut out: Vec<u8>, version: u32) -> Vec<u8> {
        out.extend(std::iter::repeat(0u8).take(null_record(is_wide(version))));
        out.extend_from_slice(&FOOTER_ID);
        let padding = match (16 - out.len() % 16) % 16 {
            0 => 16,
            n => n,
        };
        out.extend(std::iter::repeat(0u8).take(padding));
        out.extend_from_slice(&version.to_le_bytes());
        out.extend(std::iter::repeat(0u8).take(120));
        out.extend_from_slice(&FOOTER_MAGIC);
        out
    }

    fn document(version: u32, nodes: &[TestNode]) -> Vec<u8> {
        let mut out = header(version);
        for n in nodes {
            write_node(&mut out, n, is_wide(version));
        }
        finish(out, version)
    }

    fn string_property(value: &str) -> Vec<u8> {
        let mut out = vec![b'S'];
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
        out
    }

    fn i64_property(value: i64) -> Vec<u8> {
        let mut out = vec![b'L'];
        out.extend_from_slice(&value.to_le_bytes());
        out
    }

    fn array_property(code: u8, len: usize, payload: Vec<u8>, compress: bool) -> Vec<u8> {
        let (encoding, stored) = if compress {
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&payload).unwrap();
            (1u32, encoder.finish().unwrap())
        } else {
            (0u32, payload)
        };
        let mut out = vec![code];
        out.extend_from_slice(&(len as u32).to_le_bytes());
        out.extend_from_slice(&encoding.to_le_bytes());
        out.extend_from_slice(&(stored.len() as u32).to_le_bytes());
        out.extend_from_slice(&stored);
        out
    }

    fn f64_array(values: &[f64], compress: bool) -> Vec<u8> {
        let payload = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        array_property(b'd', values.len(), payload, compress)
    }

    fn i32_array(values: &[i32], compress: bool) -> Vec<u8> {
        let payload = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        array_property(b'i', values.len(), payload, compress)
    }

    fn geometry(id: i64, name: &str, vertices: &[f64], polygons: &[i32], compress: bool) -> TestNode {
        let name = format!("Geometry::{name}\u{0}\u{1}Geometry");
        node(
            "Geometry",
            vec![i64_property(id), string_property(&name), string_property("Mesh")],
            vec![
                node("Vertices", vec![f64_array(vertices, compress)], vec![]),
                node("PolygonVertexIndex", vec![i32_array(polygons, compress)], vec![]),
            ],
        )
    }

    fn scene(version: u32, objects: Vec<TestNode>) -> Vec<u8> {
        document(
            version,
            &[
                node("FBXHeaderExtension", vec![], vec![node("FBXVersion", vec![], vec![])]),
                node("Objects", vec![], objects),
                node("Connections", vec![], vec![]),
            ],
        )
    }

    /// A unit quad plus a triangle, as one geometry
    fn quad_and_triangle(version: u32, compress: bool) -> Vec<u8> {
        let vertices = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.5, 0.5, 2.0,
        ];
        // Quad 0-1-2-3, then triangle 0-1-4
        let polygons = [0, 1, 2, !3, 0, 1, !4];
        scene(version, vec![geometry(42, "Brain", &vertices, &polygons, compress)])
    }

    /// `depth` records, each the only child of the one before
    fn nested_document(version: u32, depth: usize) -> Vec<u8> {
        let wide = is_wide(version);
        let sentinel = null_record(wide);
        let record = sentinel + 1;
        let mut out = header(version);
        let base = out.len();

        for i in 0..depth {
            // Innermost record has no children and so no closing null record
            let end = base + record * depth + sentinel * (depth - 1 - i);
            write_field(&mut out, end as u64, wide);
            write_field(&mut out, 0, wide);
            write_field(&mut out, 0, wide);
            out.push(1);
            out.push(b'N');
        }
        for _ in 1..depth {
            out.extend(std::iter::repeat(0u8).take(sentinel));
        }
        finish(out, version)
    }

    #[test]
    fn test_parse_legacy_records() {
        let group = parse_fbx(&quad_and_triangle(7400, false), "models/brain.fbx").unwrap();
        assert_eq!(group.name, "brain");
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].name, "Brain");
        assert_eq!(group.children[0].vertex_count(), 5);
        assert_eq!(group.triangle_count(), 3);
        assert_eq!(group.children[0].indices(), &[0, 1, 2, 0, 2, 3, 0, 1, 4]);
    }

    #[test]
    fn test_parse_wide_compressed_records() {
        let group = parse_fbx(&quad_and_triangle(7500, true), "brain.fbx").unwrap();
        assert_eq!(group.triangle_count(), 3);
        assert_eq!(group.local_bounds().max_dimension(), 2.0);
    }

    #[test]
    fn test_one_child_per_geometry() {
        let triangle = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bytes = scene(
            7400,
            vec![
                geometry(1, "Left", &triangle, &[0, 1, !2], false),
                geometry(2, "Right", &triangle, &[2, 1, !0], false),
            ],
        );
        let group = parse_fbx(&bytes, "pair.fbx").unwrap();
        let names: Vec<&str> = group.children.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Left", "Right"]);
    }

    #[test]
    fn test_ascii_and_garbage_rejected() {
        let ascii = parse_fbx(b"; FBX 7.4.0 project file\n", "a.fbx").unwrap_err();
        assert!(matches!(ascii, AssetError::Parse { ref message, .. } if message.contains("ASCII")));

        let garbage = parse_fbx(b"not an fbx", "b.fbx").unwrap_err();
        assert!(matches!(garbage, AssetError::Parse { .. }));
    }

    #[test]
    fn test_truncated_document() {
        let bytes = quad_and_triangle(7400, false);
        let cut = &bytes[..bytes.len() / 2];
        assert!(matches!(parse_fbx(cut, "cut.fbx"), Err(AssetError::Parse { .. })));
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let bytes = nested_document(7400, 300_000);
        let err = parse_fbx(&bytes, "deep.fbx").unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }), "got {err:?}");

        let shallow = nested_document(7400, MAX_DEPTH + 2);
        assert!(matches!(parse_fbx(&shallow, "nested.fbx"), Err(AssetError::Parse { .. })));
    }

    #[test]
    fn test_out_of_range_index() {
        let bytes = scene(7400, vec![geometry(1, "Bad", &[0.0; 9], &[0, 1, !7], false)]);
        let err = parse_fbx(&bytes, "bad.fbx").unwrap_err();
        assert!(err.to_string().contains("vertex 7"));
    }

    #[test]
    fn test_no_geometry() {
        let bytes = scene(7400, vec![]);
        assert!(matches!(
            parse_fbx(&bytes, "empty.fbx"),
            Err(AssetError::EmptyGeometry(_))
        ));
    }

    #[test]
    fn test_triangulate_fans() {
        assert_eq!(triangulate(&[0, 1, 2, 3, !4], 5).unwrap().len(), 9);
        // Degenerate two-corner polygon yields nothing
        assert!(triangulate(&[0, !1], 2).unwrap().is_empty());
        assert_eq!(triangulate(&[0, 1, !2], 2), Err(2));
    }
}
