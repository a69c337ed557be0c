// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::Vec3A;
use rayon::{
    iter::ParallelIterator,
    slice::ParallelSlice,
};

use crate::kdtree::AxisBox;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh has no elements")]
    Empty,
    #[error("polynomial order {0} cannot describe a hexahedron")]
    UnsupportedOrder(usize),
    #[error("{nodes} nodes do not split into elements of {per_element} nodes")]
    RaggedNodes { nodes: usize, per_element: usize },
}

/// High-order hexahedral elements, `(order + 1)^3` nodes each, stored element
/// by element with x varying fastest. Nodes are not shared between elements.
#[derive(Clone, Debug)]
pub struct HexMesh {
    order: usize,
    nodes: Vec<Vec3A>,
}

impl HexMesh {
    pub fn new(
        order: usize,
        nodes: Vec<Vec3A>,
    ) -> Result<Self, MeshError> {
        if order == 0 {
            return Err(MeshError::UnsupportedOrder(order));
        }
        let per_element = Self::nodes_for_order(order);
        if nodes.is_empty() {
            return Err(MeshError::Empty);
        }
        if nodes.len() % per_element != 0 {
            return Err(MeshError::RaggedNodes {
                nodes: nodes.len(),
                per_element,
            });
        }

        Ok(Self { order, nodes })
    }

    /// Regular grid of `cells` elements filling `domain`, with equispaced
    /// nodes inside each element.
    #[allow(clippy::cast_precision_loss)]
    pub fn structured(
        cells: [usize; 3],
        order: usize,
        domain: &AxisBox,
    ) -> Result<Self, MeshError> {
        if order == 0 {
            return Err(MeshError::UnsupportedOrder(order));
        }
        let cell_size = domain.extent() / Vec3A::new(cells[0] as f32, cells[1] as f32, cells[2] as f32);
        let node_step = cell_size / order as f32;

        let mut nodes = Vec::with_capacity(cells.iter().product::<usize>() * Self::nodes_for_order(order));
        for k in 0..cells[2] {
            for j in 0..cells[1] {
                for i in 0..cells[0] {
                    let corner = domain.lower + cell_size * Vec3A::new(i as f32, j as f32, k as f32);
                    for c in 0..=order {
                        for b in 0..=order {
                            for a in 0..=order {
                                nodes.push(corner + node_step * Vec3A::new(a as f32, b as f32, c as f32));
                            }
                        }
                    }
                }
            }
        }

        Self::new(order, nodes)
    }

    pub const fn nodes_for_order(order: usize) -> usize {
        (order + 1) * (order + 1) * (order + 1)
    }

    pub const fn order(&self) -> usize {
        self.order
    }

    pub const fn nodes_per_element(&self) -> usize {
        Self::nodes_for_order(self.order)
    }

    pub fn element_count(&self) -> usize {
        self.nodes.len() / self.nodes_per_element()
    }

    pub fn element(
        &self,
        index: usize,
    ) -> &[Vec3A] {
        let per_element = self.nodes_per_element();
        &self.nodes[index * per_element..(index + 1) * per_element]
    }

    /// Node positions may move, the element layout may not.
    pub fn nodes_mut(&mut self) -> &mut [Vec3A] {
        &mut self.nodes
    }
}

/// Per-element boxes and the domain box around all of them, the only input
/// the k-d tree builder needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementBoxSet {
    pub domain:   AxisBox,
    pub elements: Vec<AxisBox>,
}

impl ElementBoxSet {
    pub fn from_boxes(elements: Vec<AxisBox>) -> Self {
        let domain = elements.iter().fold(AxisBox::EMPTY, |mut domain, bounds| {
            domain.grow_box(bounds);
            domain
        });
        Self { domain, elements }
    }

    /// Element boxes enclose every node of the element.
    pub fn from_mesh(mesh: &HexMesh) -> Self {
        let elements = mesh
            .nodes
            .par_chunks(mesh.nodes_per_element())
            .map(|nodes| {
                nodes.iter().fold(AxisBox::EMPTY, |mut bounds, &node| {
                    bounds.grow(node);
                    bounds
                })
            })
            .collect();
        Self::from_boxes(elements)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
