// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::cmp::Reverse;

use super::AxisBox;

/// Edges closer than this along an axis are ordered as if coincident.
pub const EDGE_TOLERANCE: f32 = 1e-5;

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeKind {
    Low = 0,
    High = 1,
}

/// One side of an element's box projected onto the sweep axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxEdge {
    pub position: f32,
    pub element:  u32,
    pub kind:     EdgeKind,
}

/// Builds the low and high edge of every element on `axis`, in sweep order.
///
/// Edges are sorted by position, then every run of edges lying within
/// [`EDGE_TOLERANCE`] of the run's first edge puts its high edges ahead of its
/// low edges. Both passes are stable, so equal input gives equal output.
pub fn sorted_edges(
    axis: usize,
    elements: &[u32],
    boxes: &[AxisBox],
) -> Vec<BoxEdge> {
    let mut edges = Vec::with_capacity(2 * elements.len());
    for &element in elements {
        let bounds = &boxes[element as usize];
        edges.push(BoxEdge {
            position: bounds.lower[axis],
            element,
            kind: EdgeKind::Low,
        });
        edges.push(BoxEdge {
            position: bounds.upper[axis],
            element,
            kind: EdgeKind::High,
        });
    }

    edges.sort_by(|a, b| a.position.total_cmp(&b.position));
    order_coincident(&mut edges);
    edges
}

fn order_coincident(edges: &mut [BoxEdge]) {
    let mut start = 0;
    while start < edges.len() {
        let anchor = edges[start].position;
        let run = edges[start..]
            .iter()
            .take_while(|edge| (edge.position - anchor).abs() < EDGE_TOLERANCE)
            .count()
            .max(1);

        edges[start..start + run].sort_by_key(|edge| Reverse(edge.kind));
        start += run;
    }
}
