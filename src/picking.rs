//! Ray casting against node bounds.
//!
//! - [`Ray`]: origin plus normalized direction
//! - [`BoundingBox`]: axis-aligned box in some coordinate space
//! - [`HitTestResult`]: a node struck by a ray and where

use glam::{Mat4, Vec3};

use crate::node::NodeRef;

/// A ray in 3D space.
///
/// ```
/// use parallax::{Ray, Vec3};
///
/// let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
/// assert_eq!(ray.point_at(3.0), Vec3::new(0.0, 0.0, -3.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3,
    /// The normalized direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Carry the ray into another space, e.g. a node's local space via the
    /// inverse of its world transform.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Returns the distance to the nearest intersection in front of the
    /// origin, or `None` on a miss.
    pub fn intersect_aabb(&self, bounds: &BoundingBox) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            let origin = self.origin[i];
            let dir = self.direction[i];

            if dir.abs() < f32::EPSILON {
                if origin < bounds.min[i] || origin > bounds.max[i] {
                    return None;
                }
            } else {
                let inv_dir = 1.0 / dir;
                let mut t1 = (bounds.min[i] - origin) * inv_dir;
                let mut t2 = (bounds.max[i] - origin) * inv_dir;

                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }

                t_min = t_min.max(t1);
                t_max = t_max.min(t2);

                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_min > 0.0 {
            Some(t_min)
        } else if t_max > 0.0 {
            Some(t_max)
        } else {
            None
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of full dimensions `size` centered on `center`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Unit cube centered on the origin.
    pub fn unit() -> Self {
        Self::from_center_size(Vec3::ZERO, Vec3::ONE)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box after `matrix` is applied.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        let (min, max) = corners.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), &c| (min.min(c), max.max(c)),
        );
        Self { min, max }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::unit()
    }
}

/// A node intersected by a hit-test ray.
#[derive(Clone, Debug)]
pub struct HitTestResult {
    /// The node that was hit.
    pub node: NodeRef,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit location.
    pub point: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ray_hits_box_in_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = ray.intersect_aabb(&BoundingBox::unit());
        assert_relative_eq!(hit.unwrap_or_default(), 4.5);
    }

    #[test]
    fn ray_misses_box_behind_or_aside() {
        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(behind.intersect_aabb(&BoundingBox::unit()), None);

        let aside = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(aside.intersect_aabb(&BoundingBox::unit()), None);
    }

    #[test]
    fn origin_inside_box_reports_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_relative_eq!(ray.intersect_aabb(&BoundingBox::unit()).unwrap_or_default(), 0.5);
    }

    #[test]
    fn transformed_box_encloses_rotated_corners() {
        let rotate = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let bounds = BoundingBox::unit().transformed(&rotate);
        let half_diagonal = std::f32::consts::SQRT_2 * 0.5;
        assert_relative_eq!(bounds.max.x, half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(bounds.min.z, -half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(bounds.max.y, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn box_center_survives_translation() {
        let bounds = BoundingBox::from_center_size(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(2.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 2.0, 3.0));

        let moved = bounds.transformed(&Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)));
        assert_relative_eq!(moved.center(), Vec3::new(1.0, 0.0, 3.0), epsilon = 1e-6);
        assert_eq!(BoundingBox::default().center(), Vec3::ZERO);
    }
}
