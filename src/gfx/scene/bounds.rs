//! Axis-aligned bounds and the framing transform that fits any mesh group
//! into the same normalized view.

use cgmath::{EuclideanSpace, Point3, Vector3, Zero};

use super::object::MeshGroup;

/// Axis-aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Self {
        points.into_iter().fold(Self::empty(), Self::including)
    }

    /// Returns the box grown to contain `point`
    pub fn including(self, point: Point3<f32>) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Point3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest extent along any axis; non-finite for an empty box
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// Outcome of fitting a group into the normalized view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Centered and uniformly scaled so the largest dimension equals the target
    Applied { scale: f32, center: Point3<f32> },
    /// Zero-extent geometry: recentered when possible, left at native scale
    Degenerate { center: Option<Point3<f32>> },
}

/// Centers `group` on the origin and scales it so its largest bounding-box
/// dimension equals `target_size`.
///
/// Framing is computed from the raw geometry, so earlier transforms on the
/// group are replaced rather than compounded. Geometry whose largest dimension
/// is zero or non-finite keeps scale 1; no NaN or infinite value ever reaches
/// the transform.
pub fn normalize(group: &mut MeshGroup, target_size: f32) -> Normalization {
    let bounds = group.local_bounds();
    let center = bounds.center();
    let center_is_finite = center.x.is_finite() && center.y.is_finite() && center.z.is_finite();
    let max_dimension = bounds.max_dimension();

    group.transform.scale = 1.0;
    group.transform.translation = Vector3::zero();

    // Subnormal extents overflow the scale even though they are non-zero
    let scale = target_size / max_dimension;
    let translation = -center.to_vec() * scale;
    let fits = max_dimension.is_finite()
        && max_dimension > 0.0
        && scale.is_finite()
        && scale > 0.0
        && translation.x.is_finite()
        && translation.y.is_finite()
        && translation.z.is_finite();

    if !fits {
        if center_is_finite {
            group.transform.translation = -center.to_vec();
        }
        return Normalization::Degenerate {
            center: center_is_finite.then_some(center),
        };
    }

    group.transform.scale = scale;
    group.transform.translation = translation;

    Normalization::Applied { scale, center }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::object::Mesh;

    fn group_from_points(points: &[[f32; 3]]) -> MeshGroup {
        MeshGroup::new("test", vec![Mesh::from_arrays("m", points, &[], vec![])])
    }

    #[test]
    fn test_empty_box() {
        let bounds = Aabb::empty();
        assert!(bounds.is_empty());
        assert!(!bounds.max_dimension().is_finite());
    }

    #[test]
    fn test_box_dimensions() {
        let bounds = Aabb::from_points([Point3::new(-2.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0)]);
        assert_eq!(bounds.center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.size(), Vector3::new(4.0, 2.0, 2.0));
        assert_eq!(bounds.max_dimension(), 4.0);
    }

    #[test]
    fn test_normalize_offset_box() {
        let mut group = group_from_points(&[[10.0, 0.0, 0.0], [12.0, 1.0, 0.5]]);
        let result = normalize(&mut group, 1.0);
        assert_eq!(
            result,
            Normalization::Applied {
                scale: 0.5,
                center: Point3::new(11.0, 0.5, 0.25)
            }
        );

        let world = group.world_bounds();
        let center = world.center();
        assert!(center.x.abs() < 1e-5 && center.y.abs() < 1e-5 && center.z.abs() < 1e-5);
        assert!((world.max_dimension() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_is_not_compounded() {
        let mut group = group_from_points(&[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]]);
        normalize(&mut group, 2.0);
        let first = group.transform;
        normalize(&mut group, 2.0);
        assert_eq!(group.transform, first);
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let mut group = group_from_points(&[[3.0, -2.0, 1.0]]);
        let result = normalize(&mut group, 2.2);
        assert_eq!(
            result,
            Normalization::Degenerate {
                center: Some(Point3::new(3.0, -2.0, 1.0))
            }
        );
        assert_eq!(group.transform.scale, 1.0);
        assert!(group.transform.is_finite());
    }

    #[test]
    fn test_subnormal_extent_is_degenerate() {
        let mut group = group_from_points(&[[0.0, 0.0, 0.0], [1e-39, 0.0, 0.0]]);
        let result = normalize(&mut group, 2.2);
        assert!(matches!(result, Normalization::Degenerate { center: Some(_) }));
        assert_eq!(group.transform.scale, 1.0);
        assert!(group.transform.is_finite());

        let mut far = group_from_points(&[[1e30, 0.0, 0.0], [1e30, 1e-8, 0.0]]);
        normalize(&mut far, 2.2);
        assert!(far.transform.is_finite());
    }

    #[test]
    fn test_empty_group_is_degenerate() {
        let mut group = MeshGroup::new("empty", Vec::new());
        let result = normalize(&mut group, 2.2);
        assert_eq!(result, Normalization::Degenerate { center: None });
        assert!(group.transform.is_finite());
    }
}
