// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

//! Surface area heuristic k-d tree over the element bounding boxes of a
//! discontinuous-Galerkin hexahedral mesh, flattened for a GPU raycaster.
//!
//! - [`mesh`] turns element nodes into per-element boxes and a domain box
//! - [`kdtree`] builds the tree, reports its statistics and packs it for upload
//! - [`ray`] is the ray used by the slab test and the reference traversal

pub mod kdtree;
pub mod mesh;
pub mod ray;
