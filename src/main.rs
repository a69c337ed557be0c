// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use dgkd::{
    kdtree::{
        node_bytes,
        AxisBox,
        KdTreeBuilder,
        TreeStats,
    },
    mesh::{
        ElementBoxSet,
        HexMesh,
    },
    ray::Ray,
};
use glam::Vec3A;
use rand::{
    rngs::ThreadRng,
    Rng,
};
use tracing::{
    debug,
    info,
};
use tracing_subscriber::EnvFilter;

pub const CELLS: [usize; 3] = [24, 16, 12];
pub const ORDER: usize = 3;
/// Node displacement as a fraction of the node spacing.
pub const JITTER: f32 = 0.3;

pub const SAMPLE_RAYS: usize = 64;

#[inline]
pub fn random_unit_vector(rng: &mut ThreadRng) -> Vec3A {
    loop {
        // Rejection sampling
        let x = rng.gen_range(-1f32..1f32);
        let y = rng.gen_range(-1f32..1f32);
        let z = rng.gen_range(-1f32..1f32);

        let vector = Vec3A::new(x, y, z);
        let length_squared = vector.length_squared();
        if length_squared > 1e-6 && length_squared <= 1f32 {
            return vector.normalize_or_zero();
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(fmt_subscriber)?;

    let mut rng = rand::thread_rng();
    let domain = AxisBox::new(Vec3A::new(-1.5, -1.0, -0.75), Vec3A::new(1.5, 1.0, 0.75));

    info!("Generating mesh...");
    let mut mesh = HexMesh::structured(CELLS, ORDER, &domain)?;
    let spacing = domain.extent()
        / (Vec3A::new(CELLS[0] as f32, CELLS[1] as f32, CELLS[2] as f32) * ORDER as f32);
    for node in mesh.nodes_mut() {
        let offset = Vec3A::new(
            rng.gen_range(-1f32..1f32),
            rng.gen_range(-1f32..1f32),
            rng.gen_range(-1f32..1f32),
        );
        *node += spacing * JITTER * offset;
    }
    info!(
        elements = mesh.element_count(),
        order = mesh.order(),
        nodes_per_element = mesh.nodes_per_element(),
        "mesh generated"
    );

    let begin_time = std::time::Instant::now();
    let boxes = ElementBoxSet::from_mesh(&mesh);
    info!(
        "metadata computed in {:.1}ms",
        begin_time.elapsed().as_secs_f64() * 1000.0
    );
    let (lower, upper) = (boxes.domain.lower, boxes.domain.upper);
    info!(
        "domain bounds: {:+.3} {:+.3} {:+.3} | {:+.3} {:+.3} {:+.3}",
        lower.x, lower.y, lower.z, upper.x, upper.y, upper.z
    );

    let tree = KdTreeBuilder::new(&boxes).build()?;
    let stats = TreeStats::collect(&tree);
    info!("k-d tree stats:\n{stats}");

    let nodes = tree.gpu_nodes();
    info!(
        nodes = nodes.len(),
        node_bytes = node_bytes(&nodes).len(),
        leaf_elements = tree.leaf_elements().len(),
        leaf_element_bytes = tree.leaf_element_bytes().len(),
        "k-d tree packed for upload"
    );

    let center = (tree.bounds().lower + tree.bounds().upper) * 0.5;
    if let Some(leaf) = tree.leaf_at(center) {
        let bounds = tree.nodes()[leaf].bounds;
        let overlapping = boxes
            .elements
            .iter()
            .filter(|element| element.overlaps(&bounds))
            .count();
        debug!(
            leaf,
            listed = tree.leaf(leaf).len(),
            overlapping,
            "leaf at domain center"
        );
    }

    let reach = tree.bounds().extent().length() * 2.0;
    let mut candidate_sum = 0;
    for _ in 0..SAMPLE_RAYS {
        let origin = center + random_unit_vector(&mut rng) * reach;
        let target = domain.lower
            + domain.extent() * Vec3A::new(rng.gen(), rng.gen(), rng.gen());
        let ray = Ray::towards(origin, target);

        let candidates = tree.candidates(&ray);
        let entry = tree.bounds().ray_intersect(&ray).map(|(near, _)| ray.at(near));
        debug!(candidates = candidates.len(), ?entry, "sample ray");
        candidate_sum += candidates.len();
    }
    info!(
        "{:.1} candidates per ray on average out of {} elements",
        candidate_sum as f64 / SAMPLE_RAYS as f64,
        tree.element_count()
    );

    Ok(())
}
