// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use super::{
    edge::{
        sorted_edges,
        BoxEdge,
        EdgeKind,
    },
    AxisBox,
};

/// Cheapest split found by one sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitCandidate {
    pub axis: usize,
    pub edge: usize,
    pub cost: f32,
}

/// Sorted edges of one axis together with the cheapest split among them.
#[derive(Debug)]
pub struct AxisSweep {
    pub edges: Vec<BoxEdge>,
    pub best:  SplitCandidate,
}

impl AxisSweep {
    pub fn evaluate(
        axis: usize,
        bounds: &AxisBox,
        elements: &[u32],
        boxes: &[AxisBox],
    ) -> Self {
        let edges = sorted_edges(axis, elements, boxes);
        let best = sweep(axis, bounds, &edges);
        Self { edges, best }
    }

    /// Plane position of the winning edge. Only valid when there are edges.
    pub fn position(&self) -> f32 {
        self.edges[self.best.edge].position
    }

    /// Elements opening before the winning edge go left, elements closing
    /// after it go right. Elements straddling the plane land in both.
    pub fn partition(&self) -> (Vec<u32>, Vec<u32>) {
        let (before, rest) = self.edges.split_at(self.best.edge.min(self.edges.len()));
        let after = rest.get(1..).unwrap_or_default();

        let left = before
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Low)
            .map(|edge| edge.element)
            .collect();
        let right = after
            .iter()
            .filter(|edge| edge.kind == EdgeKind::High)
            .map(|edge| edge.element)
            .collect();
        (left, right)
    }
}

/// Runs the surface area heuristic over every edge of one axis.
///
/// The cost at an edge is `p_left * n_left + p_right * n_right`, where the
/// probabilities are the halves' surface areas relative to `bounds`. An
/// element leaves the right count at its high edge and joins the left count
/// after its low edge. The first minimum wins. Without edges the cost stays
/// at `f32::MAX`.
#[allow(clippy::cast_precision_loss)]
pub fn sweep(
    axis: usize,
    bounds: &AxisBox,
    edges: &[BoxEdge],
) -> SplitCandidate {
    let parent_area = bounds.surface_area();

    let mut best = SplitCandidate {
        axis,
        edge: 0,
        cost: f32::MAX,
    };
    let mut n_left = 0usize;
    let mut n_right = edges.len() / 2;

    for (i, edge) in edges.iter().enumerate() {
        if edge.kind == EdgeKind::High {
            n_right -= 1;
        }

        let (left, right) = bounds.clipped(axis, edge.position);
        let p_left = left.surface_area() / parent_area;
        let p_right = right.surface_area() / parent_area;

        let cost = p_left * n_left as f32 + p_right * n_right as f32;
        if cost < best.cost {
            best.cost = cost;
            best.edge = i;
        }

        if edge.kind == EdgeKind::Low {
            n_left += 1;
        }
    }

    best
}

/// Evaluates the axes in order x, y, z and keeps the first strictly cheapest.
pub fn best_split(
    bounds: &AxisBox,
    elements: &[u32],
    boxes: &[AxisBox],
) -> AxisSweep {
    let mut winner = AxisSweep::evaluate(0, bounds, elements, boxes);
    for axis in 1..3 {
        let sweep = AxisSweep::evaluate(axis, bounds, elements, boxes);
        if sweep.best.cost < winner.best.cost {
            winner = sweep;
        }
    }
    winner
}
