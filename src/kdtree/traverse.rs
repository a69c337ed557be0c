// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::Vec3A;

use super::{
    KdTree,
    NodeKind,
};
use crate::ray::Ray;

impl KdTree {
    /// Leaf whose box holds `point`. Points on a split plane go left.
    pub fn leaf_at(
        &self,
        point: Vec3A,
    ) -> Option<usize> {
        if !self.bounds.contains(point) {
            return None;
        }

        let mut index = 0;
        loop {
            match self.nodes[index].kind {
                NodeKind::Leaf { .. } => return Some(index),
                NodeKind::Internal {
                    axis,
                    position,
                    right_child,
                } => {
                    index = if point[axis as usize] <= position {
                        index + 1
                    } else {
                        right_child as usize
                    };
                },
            }
        }
    }

    /// Elements listed by every leaf the ray passes through, each once, in
    /// the order they were first met.
    pub fn candidates(
        &self,
        ray: &Ray,
    ) -> Vec<u32> {
        let mut seen = vec![false; self.element_count];
        let mut found = Vec::new();

        let mut search_space = vec![0];
        while let Some(index) = search_space.pop() {
            let node = &self.nodes[index];
            if !node.bounds.ray_touches(ray) {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { .. } => {
                    for &element in self.leaf(index) {
                        if !std::mem::replace(&mut seen[element as usize], true) {
                            found.push(element);
                        }
                    }
                },
                NodeKind::Internal { right_child, .. } => {
                    // left popped first
                    search_space.push(right_child as usize);
                    search_space.push(index + 1);
                },
            }
        }

        found
    }
}
