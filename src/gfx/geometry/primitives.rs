//! # Primitive Shape Generation
//!
//! Functions generating the built-in shapes. All shapes are centered at the
//! origin and carry outward-facing normals.

use super::GeometryData;
use cgmath::{InnerSpace, Vector3, VectorSpace};
use std::f32::consts::PI;

/// Corner positions of the regular icosahedron before projection
#[rustfmt::skip]
const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = {
    const T: f32 = 1.618_034; // golden ratio
    [
        [-1.0,  T, 0.0], [ 1.0,  T, 0.0], [-1.0, -T, 0.0], [ 1.0, -T, 0.0],
        [0.0, -1.0,  T], [0.0,  1.0,  T], [0.0, -1.0, -T], [0.0,  1.0, -T],
        [ T, 0.0, -1.0], [ T, 0.0,  1.0], [-T, 0.0, -1.0], [-T, 0.0,  1.0],
    ]
};

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// Generate a geodesic icosahedron
///
/// Every face is split into `(detail + 1)^2` triangles and the new vertices
/// are pushed out onto the sphere of the given radius. Detail 0 is the plain
/// 20-face solid. Each triangle owns its three vertices so faceting stays
/// visible under lighting.
pub fn generate_icosahedron(radius: f32, detail: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let cols = detail as usize + 1;

    for face in ICOSAHEDRON_FACES {
        let a = Vector3::from(ICOSAHEDRON_VERTICES[face[0]]);
        let b = Vector3::from(ICOSAHEDRON_VERTICES[face[1]]);
        let c = Vector3::from(ICOSAHEDRON_VERTICES[face[2]]);

        // Rows of points running from edge a-b towards corner c
        let mut grid: Vec<Vec<Vector3<f32>>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let aj = a.lerp(c, i as f32 / cols as f32);
            let bj = b.lerp(c, i as f32 / cols as f32);
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect();
            grid.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                let triangle = if j % 2 == 0 {
                    [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                } else {
                    [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                };
                for corner in triangle {
                    let normal = corner.normalize();
                    let position = normal * radius;
                    data.indices.push(data.vertices.len() as u32);
                    data.vertices.push(position.into());
                    data.normals.push(normal.into());
                }
            }
        }
    }

    data
}

/// Generate a cube centered at the origin
///
/// Returns a cube with vertices from `-size/2` to `size/2` on all axes.
/// Each face has its own four vertices so normals stay flat.
pub fn generate_cube(size: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let h = size * 0.5;

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-h, -h,  h], [ h, -h,  h], [ h,  h,  h], [-h,  h,  h],
        // Back face
        [-h, -h, -h], [-h,  h, -h], [ h,  h, -h], [ h, -h, -h],
        // Left face
        [-h, -h, -h], [-h, -h,  h], [-h,  h,  h], [-h,  h, -h],
        // Right face
        [ h, -h,  h], [ h, -h, -h], [ h,  h, -h], [ h,  h,  h],
        // Top face
        [-h,  h,  h], [ h,  h,  h], [ h,  h, -h], [-h,  h, -h],
        // Bottom face
        [-h, -h, -h], [ h, -h, -h], [ h, -h,  h], [-h, -h,  h],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4))
        .collect();

    // Two triangles per face, counter-clockwise
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(radius: f32, longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let (sin_phi, cos_phi) = phi.sin_cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            data.vertices.push([x * radius, y * radius, z * radius]);
            data.normals.push([x, y, z]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a plane in the XY plane facing the camera (+Z)
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
pub fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let pos_y = (y as f32 / h_segs as f32 - 0.5) * height;

        for x in 0..=w_segs {
            let pos_x = (x as f32 / w_segs as f32 - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[next_row, i + 1, next_row + 1]);
        }
    }

    data
}

/// Generate a capped cylinder
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Height of the cylinder (along Z-axis)
/// * `segments` - Number of circular segments
///
/// Returns a cylinder extending from -height/2 to height/2 in Z.
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;

    // Side vertices, bottom/top pairs
    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let x = radius * cos_a;
        let y = radius * sin_a;

        data.vertices.push([x, y, -half_height]);
        data.normals.push([cos_a, sin_a, 0.0]);

        data.vertices.push([x, y, half_height]);
        data.normals.push([cos_a, sin_a, 0.0]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = (i + 1) * 2;
        let top_next = bottom_next + 1;

        data.indices
            .extend_from_slice(&[bottom_current, bottom_next, top_current]);
        data.indices
            .extend_from_slice(&[top_current, bottom_next, top_next]);
    }

    // Caps get their own vertices so their normals point along Z
    for (z, normal_z) in [(-half_height, -1.0f32), (half_height, 1.0)] {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, 0.0, z]);
        data.normals.push([0.0, 0.0, normal_z]);

        let ring_start = data.vertices.len() as u32;
        for i in 0..=segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            data.vertices.push([radius * angle.cos(), radius * angle.sin(), z]);
            data.normals.push([0.0, 0.0, normal_z]);
        }

        for i in 0..segs {
            let current = ring_start + i;
            let next = current + 1;
            if normal_z < 0.0 {
                data.indices.extend_from_slice(&[center, next, current]);
            } else {
                data.indices.extend_from_slice(&[center, current, next]);
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_icosahedron_generation() {
        for detail in 0..4 {
            let ico = generate_icosahedron(0.9, detail);
            let per_face = (detail as usize + 1).pow(2);
            assert_eq!(ico.triangle_count(), 20 * per_face);
            assert_eq!(ico.vertex_count(), ico.indices.len());
            for v in &ico.vertices {
                assert!((length(*v) - 0.9).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_icosahedron_is_deterministic() {
        let a = generate_icosahedron(0.9, 2);
        let b = generate_icosahedron(0.9, 2);
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube(2.0);
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), 24);
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.iter().all(|c| c.abs() == 1.0)));
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(2.0, 8, 6);
        assert_eq!(sphere.vertex_count(), 9 * 7);
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        for v in &sphere.vertices {
            assert!((length(*v) - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertex_count(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
    }

    #[test]
    fn test_cylinder_indices_in_range() {
        let cylinder = generate_cylinder(0.5, 1.0, 12);
        let count = cylinder.vertex_count() as u32;
        assert!(cylinder.indices.iter().all(|&i| i < count));
        assert_eq!(cylinder.triangle_count(), 12 * 2 + 12 * 2);
    }
}
