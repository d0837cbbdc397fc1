use cgmath::{Angle, Euler, Matrix4, Point3, Rad, Transform as _, Vector3, Zero};

use super::{bounds::Aabb, vertex::Vertex3D};

/// CPU-side triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Builds a mesh from flat `[x, y, z, x, y, z, ...]` arrays as produced by OBJ loaders.
    ///
    /// When `normals` is empty or does not match `positions`, smooth normals are
    /// computed from the triangles.
    pub fn new(name: &str, positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let computed;
        let normals = if !normals.is_empty() && normals.len() == positions.len() {
            normals
        } else {
            computed = Self::calculate_face_normals(positions, &indices);
            &computed
        };

        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D::new([p[0], p[1], p[2]], [n[0], n[1], n[2]]))
            .collect();

        Self {
            name: name.to_string(),
            vertices,
            indices,
        }
    }

    /// Builds a mesh from per-vertex position and normal arrays
    pub fn from_arrays(
        name: &str,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        indices: Vec<u32>,
    ) -> Self {
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex3D::new(*p, normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0])))
            .collect();

        Self {
            name: name.to_string(),
            vertices,
            indices,
        }
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Averages the face normals touching each vertex.
    ///
    /// Vertices not referenced by any triangle keep a zero normal.
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; positions.len()];
        let position = |i: usize| Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let v0 = position(i0);
            let face_normal = (position(i1) - v0).cross(position(i2) - v0);

            for vertex_idx in [i0, i1, i2] {
                normals[vertex_idx * 3] += face_normal.x;
                normals[vertex_idx * 3 + 1] += face_normal.y;
                normals[vertex_idx * 3 + 2] += face_normal.z;
            }
        }

        for normal in normals.chunks_exact_mut(3) {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|c| *c /= length);
            }
        }

        normals
    }
}

/// Placement of a mesh group in the viewport.
///
/// The model matrix is `R * T * S`: the framing translation and scale are
/// applied first, then the spin, so the group rotates about the framed centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::zero(),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation)
            * Matrix4::from_translation(self.translation)
            * Matrix4::from_scale(self.scale)
    }

    /// Advances the rotation by per-axis increments, wrapping each angle into `[0, 2π)`
    pub fn rotate_by(&mut self, delta: Vector3<f32>) {
        self.rotation.x = (self.rotation.x + Rad(delta.x)).normalize();
        self.rotation.y = (self.rotation.y + Rad(delta.y)).normalize();
        self.rotation.z = (self.rotation.z + Rad(delta.z)).normalize();
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite()
            && self.translation.x.is_finite()
            && self.translation.y.is_finite()
            && self.translation.z.is_finite()
            && self.rotation.x.0.is_finite()
            && self.rotation.y.0.is_finite()
            && self.rotation.z.0.is_finite()
    }
}

/// A renderable hierarchy: one or more child meshes sharing a transform.
///
/// Loaded assets arrive as groups (one child per OBJ object or FBX geometry);
/// procedural shapes are single-child groups.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    pub name: String,
    pub children: Vec<Mesh>,
    pub transform: Transform,
}

impl MeshGroup {
    pub fn new(name: impl Into<String>, children: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            children,
            transform: Transform::default(),
        }
    }

    /// Merges several groups into one, keeping every child mesh.
    ///
    /// Child transforms are discarded; the merged group starts at identity.
    pub fn merge(name: impl Into<String>, groups: impl IntoIterator<Item = MeshGroup>) -> Self {
        let children = groups.into_iter().flat_map(|g| g.children).collect();
        Self::new(name, children)
    }

    pub fn vertex_count(&self) -> usize {
        self.children.iter().map(Mesh::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.children.iter().map(Mesh::triangle_count).sum()
    }

    /// Bounds of the raw geometry, ignoring the transform
    pub fn local_bounds(&self) -> Aabb {
        self.points().fold(Aabb::empty(), |b, p| b.including(p))
    }

    /// Bounds of the geometry after the group transform is applied
    pub fn world_bounds(&self) -> Aabb {
        let matrix = self.transform.matrix();
        self.points()
            .fold(Aabb::empty(), |b, p| b.including(matrix.transform_point(p)))
    }

    fn points(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.children
            .iter()
            .flat_map(|m| m.vertices().iter())
            .map(|v| Point3::from(v.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_face_normals_for_triangle() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = Mesh::calculate_face_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mesh_keeps_matching_normals() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::new("tri", &positions, &normals, vec![0, 1, 2]);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.vertices().iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_rotation_wraps() {
        let mut transform = Transform::default();
        transform.rotate_by(Vector3::new(0.0, TAU - 0.1, 0.0));
        transform.rotate_by(Vector3::new(0.0, 0.3, 0.0));
        assert!((transform.rotation.y.0 - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let mesh = Mesh::from_arrays("p", &[[1.0, 1.0, 1.0], [3.0, 1.0, 1.0]], &[], vec![]);
        let mut group = MeshGroup::new("g", vec![mesh]);
        group.transform.scale = 2.0;
        group.transform.translation = Vector3::new(-4.0, 0.0, 0.0);
        let bounds = group.world_bounds();
        assert_eq!(bounds.min, Point3::new(-2.0, 2.0, 2.0));
        assert_eq!(bounds.max, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_merge_keeps_children() {
        let a = MeshGroup::new("a", vec![Mesh::from_arrays("a", &[[0.0; 3]], &[], vec![])]);
        let b = MeshGroup::new("b", vec![Mesh::from_arrays("b", &[[1.0; 3]], &[], vec![])]);
        let merged = MeshGroup::merge("ab", [a, b]);
        assert_eq!(merged.children.len(), 2);
        assert_eq!(merged.vertex_count(), 2);
    }
}
