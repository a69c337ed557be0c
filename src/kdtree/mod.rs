// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

mod build;
mod edge;
mod gpu;
mod split;
mod stats;
mod traverse;

pub use build::{
    BuildError,
    KdNode,
    KdTree,
    KdTreeBuilder,
    NodeKind,
};
pub use gpu::{
    node_bytes,
    GpuKdNode,
};
use glam::Vec3A;
pub use stats::TreeStats;

use crate::ray::Ray;

/// Axis-aligned box with closed bounds on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBox {
    pub lower: Vec3A,
    pub upper: Vec3A,
}

impl Default for AxisBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl AxisBox {
    /// Growing this box by any point yields a valid box around that point.
    pub const EMPTY: Self = Self {
        lower: Vec3A::splat(f32::INFINITY),
        upper: Vec3A::splat(f32::NEG_INFINITY),
    };

    pub const fn new(
        lower: Vec3A,
        upper: Vec3A,
    ) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn grow(
        &mut self,
        point: Vec3A,
    ) {
        self.lower = self.lower.min(point);
        self.upper = self.upper.max(point);
    }

    #[inline]
    pub fn grow_box(
        &mut self,
        other: &Self,
    ) {
        self.grow(other.lower);
        self.grow(other.upper);
    }

    /// Touching boxes count as overlapping.
    #[inline]
    pub fn overlaps(
        &self,
        other: &Self,
    ) -> bool {
        self.lower.cmple(other.upper).all() && self.upper.cmpge(other.lower).all()
    }

    #[inline]
    pub fn contains(
        &self,
        point: Vec3A,
    ) -> bool {
        point.cmpge(self.lower).all() && point.cmple(self.upper).all()
    }

    #[inline]
    pub fn extent(&self) -> Vec3A {
        self.upper - self.lower
    }

    /// Only meaningful relative to another box's area; flat boxes report
    /// partial or zero area and inverted boxes may go negative.
    pub fn surface_area(&self) -> f32 {
        let size = self.extent();
        2.0 * (size.y * size.z + size.x * size.z + size.x * size.y)
    }

    /// Cuts the box with the plane `axis = position`. The halves share that face.
    #[inline]
    pub fn clipped(
        &self,
        axis: usize,
        position: f32,
    ) -> (Self, Self) {
        let mut left = *self;
        let mut right = *self;
        left.upper[axis] = position;
        right.lower[axis] = position;
        (left, right)
    }

    /// Slab test returning the entry and exit distances along the ray.
    ///
    /// A zero direction component turns that slab into `±inf`, which still
    /// brackets correctly. The `0/0` case (origin exactly on a slab plane of a
    /// parallel ray) is reported as a miss rather than leaking NaN.
    #[inline]
    pub fn ray_intersect(
        &self,
        ray: &Ray,
    ) -> Option<(f32, f32)> {
        let to_lower = (self.lower - ray.origin) * ray.inv_dir;
        let to_upper = (self.upper - ray.origin) * ray.inv_dir;
        if to_lower.is_nan() || to_upper.is_nan() {
            return None;
        }

        let near = to_lower.min(to_upper).max_element();
        let far = to_lower.max(to_upper).min_element();

        (near < far).then_some((near, far))
    }

    /// Closed slab test for pruning. A parallel ray lying in a face plane
    /// counts as inside that slab, since neighbouring nodes share the face.
    #[inline]
    pub fn ray_touches(
        &self,
        ray: &Ray,
    ) -> bool {
        let to_lower = (self.lower - ray.origin) * ray.inv_dir;
        let to_upper = (self.upper - ray.origin) * ray.inv_dir;
        let on_face = to_lower.is_nan_mask() | to_upper.is_nan_mask();

        let near = Vec3A::select(on_face, Vec3A::NEG_INFINITY, to_lower.min(to_upper)).max_element();
        let far = Vec3A::select(on_face, Vec3A::INFINITY, to_lower.max(to_upper)).min_element();

        near <= far
    }
}


#[cfg(test)]
mod tests {
    use glam::Vec3A;

    use super::AxisBox;
    use crate::ray::Ray;

    fn unit() -> AxisBox {
        AxisBox::new(Vec3A::ZERO, Vec3A::ONE)
    }

    #[test]
    fn empty_box_grows_around_first_point() {
        let mut bounds = AxisBox::EMPTY;
        bounds.grow(Vec3A::new(1.0, -2.0, 3.0));
        assert_eq!(bounds.lower, Vec3A::new(1.0, -2.0, 3.0));
        assert_eq!(bounds.upper, Vec3A::new(1.0, -2.0, 3.0));

        bounds.grow(Vec3A::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.lower, Vec3A::new(0.0, -2.0, 0.0));
        assert_eq!(bounds.upper, Vec3A::new(1.0, 0.0, 3.0));

        let before = bounds;
        bounds.grow(Vec3A::new(0.5, -1.0, 1.0));
        assert_eq!(bounds, before);
    }

    #[test]
    fn overlap_is_closed() {
        let touching = AxisBox::new(Vec3A::new(1.0, 0.0, 0.0), Vec3A::new(2.0, 1.0, 1.0));
        let apart = AxisBox::new(Vec3A::new(1.5, 0.0, 0.0), Vec3A::new(2.0, 1.0, 1.0));
        let shifted = AxisBox::new(Vec3A::new(0.5, 0.5, 2.0), Vec3A::new(0.7, 0.7, 3.0));

        assert!(unit().overlaps(&touching));
        assert!(touching.overlaps(&unit()));
        assert!(!unit().overlaps(&apart));
        assert!(!unit().overlaps(&shifted));
    }

    #[test]
    fn surface_area_of_boxes() {
        assert!((unit().surface_area() - 6.0).abs() < 1e-6);

        let slab = AxisBox::new(Vec3A::ZERO, Vec3A::new(2.0, 3.0, 0.0));
        assert!((slab.surface_area() - 12.0).abs() < 1e-6);

        let line = AxisBox::new(Vec3A::ZERO, Vec3A::new(2.0, 0.0, 0.0));
        assert!(line.surface_area().abs() < 1e-6);
    }

    #[test]
    fn containment_includes_faces() {
        assert!(unit().contains(Vec3A::splat(0.5)));
        assert!(unit().contains(Vec3A::ONE));
        assert!(unit().contains(Vec3A::new(0.0, 1.0, 0.3)));
        assert!(!unit().contains(Vec3A::new(1.01, 0.5, 0.5)));
    }

    #[test]
    fn clipping_shares_the_plane() {
        let (left, right) = unit().clipped(1, 0.25);
        assert_eq!(left.upper, Vec3A::new(1.0, 0.25, 1.0));
        assert_eq!(right.lower, Vec3A::new(0.0, 0.25, 0.0));
        assert_eq!(left.lower, unit().lower);
        assert_eq!(right.upper, unit().upper);
    }

    #[test]
    fn ray_through_box() {
        let ray = Ray::new(Vec3A::new(-1.0, 0.5, 0.5), Vec3A::new(1.0, 0.0, 0.0));
        let (near, far) = unit().ray_intersect(&ray).expect("ray should hit");
        assert!((near - 1.0).abs() < 1e-6);
        assert!((far - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ray_from_inside_has_negative_entry() {
        let ray = Ray::new(Vec3A::splat(0.5), Vec3A::new(0.0, 0.0, -2.0));
        let (near, far) = unit().ray_intersect(&ray).expect("ray should hit");
        assert!(near < 0.0);
        assert!((far - 0.25).abs() < 1e-6);
    }

    #[test]
    fn ray_missing_box_or_behind() {
        let parallel = Ray::new(Vec3A::new(-1.0, 2.0, 0.5), Vec3A::new(1.0, 0.0, 0.0));
        assert_eq!(unit().ray_intersect(&parallel), None);

        // The slab test works on the whole line, so a box behind the origin
        // reports negative distances.
        let away = Ray::new(Vec3A::new(-1.0, 0.5, 0.5), Vec3A::new(-1.0, 0.0, 0.0));
        let (near, far) = unit().ray_intersect(&away).expect("line should hit");
        assert!(near < far && far < 0.0);

        let diagonal = Ray::new(Vec3A::new(-1.0, 1.5, 0.5), Vec3A::new(1.0, 1.0, 0.0));
        assert_eq!(unit().ray_intersect(&diagonal), None);
    }

    #[test]
    fn ray_on_slab_plane_is_a_miss_not_nan() {
        let grazing = Ray::new(Vec3A::new(-1.0, 1.0, 0.5), Vec3A::new(1.0, 0.0, 0.0));
        assert_eq!(unit().ray_intersect(&grazing), None);
    }

    #[test]
    fn ray_on_face_plane_touches_the_closed_box() {
        let grazing = Ray::new(Vec3A::new(-1.0, 1.0, 0.5), Vec3A::new(1.0, 0.0, 0.0));
        assert!(unit().ray_touches(&grazing));

        let (left, right) = unit().clipped(0, 0.5);
        let in_plane = Ray::new(Vec3A::new(0.5, -5.0, 0.5), Vec3A::new(0.0, 1.0, 0.0));
        assert!(left.ray_touches(&in_plane));
        assert!(right.ray_touches(&in_plane));

        let through = Ray::new(Vec3A::new(-1.0, 0.5, 0.5), Vec3A::new(1.0, 0.0, 0.0));
        assert!(unit().ray_touches(&through));

        let parallel = Ray::new(Vec3A::new(-1.0, 2.0, 0.5), Vec3A::new(1.0, 0.0, 0.0));
        assert!(!unit().ray_touches(&parallel));
        let diagonal = Ray::new(Vec3A::new(-1.0, 1.5, 0.5), Vec3A::new(1.0, 1.0, 0.0));
        assert!(!unit().ray_touches(&diagonal));
    }
}
