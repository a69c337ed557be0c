// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::Vec3A;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin:    Vec3A,
    pub direction: Vec3A,
    pub inv_dir:   Vec3A,
}

impl Ray {
    /// Zero direction components produce infinite `inv_dir` entries, which
    /// the slab test relies on.
    pub fn new(
        origin: Vec3A,
        direction: Vec3A,
    ) -> Self {
        Self {
            origin,
            direction,
            inv_dir: 1.0 / direction,
        }
    }

    /// Ray aimed from `origin` through `target`.
    pub fn towards(
        origin: Vec3A,
        target: Vec3A,
    ) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn at(
        &self,
        along: f32,
    ) -> Vec3A {
        self.origin + self.direction * along
    }
}
