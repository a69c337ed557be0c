// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::ops::Range;

use tracing::{
    info,
    instrument,
    trace,
    warn,
};

use super::{
    edge,
    split::best_split,
    AxisBox,
};
use crate::mesh::ElementBoxSet;

/// Largest index the signed fields of the device layout can carry.
const MAX_DEVICE_INDEX: u32 = i32::MAX.unsigned_abs();

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("{what} index does not fit the 32-bit device layout")]
    IndexOverflow { what: &'static str },
}

fn device_index(
    value: usize,
    what: &'static str,
) -> Result<u32, BuildError> {
    u32::try_from(value)
        .ok()
        .filter(|&index| index <= MAX_DEVICE_INDEX)
        .ok_or(BuildError::IndexOverflow { what })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// The left child always sits at the next index.
    Internal {
        axis:        u8,
        position:    f32,
        right_child: u32,
    },
    /// Range into [`KdTree::leaf_elements`].
    Leaf { offset: u32, count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KdNode {
    pub bounds: AxisBox,
    pub parent: Option<u32>,
    pub kind:   NodeKind,
}

impl KdNode {
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub const fn leaf_range(&self) -> Option<Range<usize>> {
        match self.kind {
            NodeKind::Leaf { offset, count } => {
                Some(offset as usize..offset as usize + count as usize)
            },
            NodeKind::Internal { .. } => None,
        }
    }
}

/// Flattened k-d tree, root at index 0.
///
/// Elements whose boxes straddle a split plane are listed in the leaves on
/// both sides, so `leaf_elements` may be longer than the element count.
#[derive(Clone, Debug, PartialEq)]
pub struct KdTree {
    pub(super) bounds:        AxisBox,
    pub(super) nodes:         Vec<KdNode>,
    pub(super) leaf_elements: Vec<u32>,
    pub(super) element_count: usize,
}

impl KdTree {
    pub const fn bounds(&self) -> &AxisBox {
        &self.bounds
    }

    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    pub fn leaf_elements(&self) -> &[u32] {
        &self.leaf_elements
    }

    pub const fn element_count(&self) -> usize {
        self.element_count
    }

    /// Elements referenced by a leaf node, empty for internal nodes.
    pub fn leaf(
        &self,
        node: usize,
    ) -> &[u32] {
        match self.nodes[node].leaf_range() {
            Some(range) => &self.leaf_elements[range],
            None => &[],
        }
    }
}

/// Top-down surface area heuristic construction over element boxes.
pub struct KdTreeBuilder<'a> {
    boxes:         &'a ElementBoxSet,
    nodes:         Vec<KdNode>,
    leaf_elements: Vec<u32>,
}

impl<'a> KdTreeBuilder<'a> {
    /// Nodes at this depth become leaves whatever their cost.
    pub const MAX_DEPTH: usize = 21;
    /// Edge positions closer than this are ordered as coincident.
    pub const EDGE_TOLERANCE: f32 = edge::EDGE_TOLERANCE;

    pub const fn new(boxes: &'a ElementBoxSet) -> Self {
        Self {
            boxes,
            nodes: Vec::new(),
            leaf_elements: Vec::new(),
        }
    }

    #[instrument(skip_all, fields(elements = self.boxes.len()))]
    pub fn build(mut self) -> Result<KdTree, BuildError> {
        let begin_time = std::time::Instant::now();
        if self.boxes.is_empty() {
            warn!("building k-d tree without elements");
        }

        let element_count = device_index(self.boxes.len(), "element")?;
        let elements = (0..element_count).collect();
        self.build_node(self.boxes.domain, None, elements, 0)?;

        info!(
            nodes = self.nodes.len(),
            leaf_elements = self.leaf_elements.len(),
            "k-d tree built in {:.1}ms",
            begin_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(KdTree {
            bounds:        self.boxes.domain,
            nodes:         self.nodes,
            leaf_elements: self.leaf_elements,
            element_count: self.boxes.len(),
        })
    }

    /// Appends the subtree for `elements` and returns its root index.
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_possible_truncation)]
    fn build_node(
        &mut self,
        bounds: AxisBox,
        parent: Option<u32>,
        elements: Vec<u32>,
        depth: usize,
    ) -> Result<u32, BuildError> {
        let index = device_index(self.nodes.len(), "node")?;

        let split = (depth < Self::MAX_DEPTH)
            .then(|| best_split(&bounds, &elements, &self.boxes.elements))
            .filter(|sweep| sweep.best.cost < elements.len() as f32);

        let Some(sweep) = split else {
            let offset = device_index(self.leaf_elements.len(), "leaf element")?;
            let count = device_index(elements.len(), "leaf element")?;
            trace!(index, depth, count, "leaf");

            self.leaf_elements.extend_from_slice(&elements);
            self.nodes.push(KdNode {
                bounds,
                parent,
                kind: NodeKind::Leaf { offset, count },
            });
            return Ok(index);
        };

        let axis = sweep.best.axis;
        let position = sweep.position();
        let (left, right) = sweep.partition();
        drop(sweep);
        drop(elements);
        trace!(
            index,
            depth,
            axis,
            position,
            left = left.len(),
            right = right.len(),
            "split"
        );

        self.nodes.push(KdNode {
            bounds,
            parent,
            kind: NodeKind::Internal {
                axis: axis as u8,
                position,
                right_child: 0,
            },
        });

        let (left_bounds, right_bounds) = bounds.clipped(axis, position);
        self.build_node(left_bounds, Some(index), left, depth + 1)?;
        let right_index = self.build_node(right_bounds, Some(index), right, depth + 1)?;

        if let NodeKind::Internal { right_child, .. } = &mut self.nodes[index as usize].kind {
            *right_child = right_index;
        }
        Ok(index)
    }
}
