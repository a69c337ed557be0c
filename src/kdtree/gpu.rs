// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use bytemuck::{
    Pod,
    Zeroable,
};

use super::{
    KdNode,
    KdTree,
    NodeKind,
};

/// Sentinel for unset signed fields.
pub const NONE: i32 = -1;

/// Device-side node, 64 bytes with both corners padded to 16-byte vectors.
///
/// Internal nodes carry `axis`, `split` and `child_r` with `offset = -1`;
/// leaves carry `offset` and `count` with `axis = -1`. The left child of an
/// internal node is the node right after it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuKdNode {
    pub lower:   [f32; 3],
    pub _pad0:   u32,
    pub upper:   [f32; 3],
    pub _pad1:   u32,
    pub axis:    i32,
    pub split:   f32,
    pub parent:  i32,
    pub child_r: i32,
    pub offset:  i32,
    pub count:   u32,
    pub _pad2:   [u32; 2],
}

// Indices are capped at `i32::MAX` by the builder.
#[allow(clippy::cast_possible_wrap)]
impl From<&KdNode> for GpuKdNode {
    fn from(node: &KdNode) -> Self {
        let (axis, split, child_r, offset, count) = match node.kind {
            NodeKind::Internal {
                axis,
                position,
                right_child,
            } => (i32::from(axis), position, right_child as i32, NONE, 0),
            NodeKind::Leaf { offset, count } => (NONE, 0.0, NONE, offset as i32, count),
        };

        Self {
            lower: node.bounds.lower.to_array(),
            _pad0: 0,
            upper: node.bounds.upper.to_array(),
            _pad1: 0,
            axis,
            split,
            parent: node.parent.map_or(NONE, |parent| parent as i32),
            child_r,
            offset,
            count,
            _pad2: [0; 2],
        }
    }
}

impl KdTree {
    pub fn gpu_nodes(&self) -> Vec<GpuKdNode> {
        self.nodes.iter().map(GpuKdNode::from).collect()
    }

    pub fn leaf_element_bytes(&self) -> &[u8] {
        bytemuck::must_cast_slice(self.leaf_elements.as_slice())
    }
}

pub fn node_bytes(nodes: &[GpuKdNode]) -> &[u8] {
    bytemuck::cast_slice(nodes)
}
