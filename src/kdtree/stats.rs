// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::fmt;

use super::{
    KdTree,
    NodeKind,
};

/// Structural quality of a built tree. The root sits at depth 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeStats {
    pub node_count:         usize,
    pub leaf_count:         usize,
    /// Sum of all leaf element counts, duplicates included.
    pub overlap_count:      usize,
    pub mean_leaf_overlaps: f32,
    pub mean_depth:         f32,
    pub max_leaf_overlaps:  usize,
    pub max_depth:          usize,
}

impl TreeStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn collect(tree: &KdTree) -> Self {
        let mut stats = Self {
            node_count: tree.nodes.len(),
            ..Self::default()
        };
        let mut depth_sum = 0;
        stats.walk(tree, 0, 0, &mut depth_sum);

        // a built tree always has a root, and recursion ends in leaves
        debug_assert!(stats.leaf_count > 0, "k-d tree without leaves");
        stats.mean_leaf_overlaps = stats.overlap_count as f32 / stats.leaf_count as f32;
        stats.mean_depth = depth_sum as f32 / stats.leaf_count as f32;
        stats
    }

    fn walk(
        &mut self,
        tree: &KdTree,
        node: usize,
        depth: usize,
        depth_sum: &mut usize,
    ) {
        match tree.nodes[node].kind {
            NodeKind::Leaf { count, .. } => {
                let count = count as usize;
                self.leaf_count += 1;
                self.overlap_count += count;
                *depth_sum += depth;
                self.max_leaf_overlaps = self.max_leaf_overlaps.max(count);
                self.max_depth = self.max_depth.max(depth);
            },
            NodeKind::Internal { right_child, .. } => {
                self.walk(tree, node + 1, depth + 1, depth_sum);
                self.walk(tree, right_child as usize, depth + 1, depth_sum);
            },
        }
    }
}

impl fmt::Display for TreeStats {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "  nodes              | {}", self.node_count)?;
        writeln!(f, "  leaf nodes         | {}", self.leaf_count)?;
        writeln!(f, "  leaf overlaps      | {}", self.overlap_count)?;
        writeln!(f, "  mean leaf overlaps | {:.3}", self.mean_leaf_overlaps)?;
        writeln!(f, "  mean depth         | {:.3}", self.mean_depth)?;
        writeln!(f, "  max leaf overlaps  | {}", self.max_leaf_overlaps)?;
        write!(f, "  max depth          | {}", self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3A;

    use super::TreeStats;
    use crate::{
        kdtree::{
            testing::lattice_boxes,
            AxisBox,
            KdTreeBuilder,
        },
        mesh::ElementBoxSet,
    };

    #[test]
    fn single_leaf_tree() {
        let boxes = ElementBoxSet::from_boxes(vec![AxisBox::new(Vec3A::ZERO, Vec3A::ONE)]);
        let tree = KdTreeBuilder::new(&boxes).build().expect("tree should build");
        let stats = TreeStats::collect(&tree);

        assert_eq!(stats, TreeStats {
            node_count:         1,
            leaf_count:         1,
            overlap_count:      1,
            mean_leaf_overlaps: 1.0,
            mean_depth:         0.0,
            max_leaf_overlaps:  1,
            max_depth:          0,
        });
    }

    #[test]
    fn disjoint_pair() {
        let boxes = ElementBoxSet::from_boxes(vec![
            AxisBox::new(Vec3A::ZERO, Vec3A::ONE),
            AxisBox::new(Vec3A::new(10.0, 0.0, 0.0), Vec3A::new(11.0, 1.0, 1.0)),
        ]);
        let tree = KdTreeBuilder::new(&boxes).build().expect("tree should build");
        let stats = TreeStats::collect(&tree);

        // leaves [0] at depth 1, then the empty gap and [1] at depth 2
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.overlap_count, 2);
        assert_eq!(stats.max_leaf_overlaps, 1);
        assert_eq!(stats.max_depth, 2);
        assert!((stats.mean_depth - 5.0 / 3.0).abs() < 1e-6);
        assert!((stats.mean_leaf_overlaps - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn consistent_with_the_node_array() {
        let boxes = lattice_boxes(41, 400);
        let tree = KdTreeBuilder::new(&boxes).build().expect("tree should build");
        let stats = TreeStats::collect(&tree);

        let leaves: Vec<_> = tree.nodes().iter().filter(|node| node.is_leaf()).collect();
        assert_eq!(stats.leaf_count, leaves.len());
        assert_eq!(stats.node_count, tree.nodes().len());
        assert_eq!(stats.overlap_count, tree.leaf_elements().len());
        assert_eq!(
            stats.overlap_count,
            leaves
                .iter()
                .map(|node| node.leaf_range().map_or(0, |range| range.len()))
                .sum::<usize>()
        );
        assert_eq!(
            stats.max_leaf_overlaps,
            leaves
                .iter()
                .map(|node| node.leaf_range().map_or(0, |range| range.len()))
                .max()
                .unwrap_or_default()
        );
        assert!(stats.max_depth <= KdTreeBuilder::MAX_DEPTH);
        assert!(stats.mean_depth >= 0.0);
        assert!(stats.mean_depth <= stats.max_depth as f32);
        // binary tree: one more leaf than internal node
        assert_eq!(stats.node_count, 2 * stats.leaf_count - 1);
    }

    #[test]
    fn table_lists_every_figure() {
        let stats = TreeStats {
            node_count:         5,
            leaf_count:         3,
            overlap_count:      7,
            mean_leaf_overlaps: 7.0 / 3.0,
            mean_depth:         5.0 / 3.0,
            max_leaf_overlaps:  4,
            max_depth:          2,
        };
        let table = stats.to_string();
        assert!(table.contains("nodes              | 5"));
        assert!(table.contains("mean leaf overlaps | 2.333"));
        assert!(table.contains("mean depth         | 1.667"));
        assert!(table.contains("max depth          | 2"));
        assert_eq!(table.lines().count(), 7);
    }
}
