mod forces;

use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::kinship::EdgeKind;

use super::SimContext;
use forces::{centering, cohesion, repulsion, spring};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimulationConfig {
    pub repulsion: f32,
    /// Closed squared-distance band; repulsion applies at both endpoints.
    pub repulsion_band: (f32, f32),
    pub spring_stiffness: f32,
    pub spouse_length: f32,
    pub parent_length: f32,
    pub family_cohesion: f32,
    pub centering: f32,
    pub velocity_damping: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub drag_alpha: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            repulsion: 600.0,
            repulsion_band: (1.0, 50_000.0),
            spring_stiffness: 0.025,
            spouse_length: 45.0,
            parent_length: 65.0,
            family_cohesion: 0.002,
            centering: 0.0003,
            velocity_damping: 0.6,
            alpha_decay: 0.995,
            alpha_min: 0.001,
            drag_alpha: 0.3,
        }
    }
}

impl SimulationConfig {
    fn rest_length(&self, kind: EdgeKind) -> f32 {
        match kind {
            EdgeKind::SpouseOf => self.spouse_length,
            EdgeKind::ParentOf => self.parent_length,
        }
    }
}

#[derive(Default)]
pub(super) struct PhysicsScratch {
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
    family_sums: HashMap<String, (Vec2, usize)>,
    springs: Vec<(usize, usize, f32)>,
}

/// Advances the simulation by one tick. Returns `false` without touching
/// anything once alpha has cooled below the settle threshold.
pub(super) fn step_physics(sim: &mut SimContext, config: &SimulationConfig) -> bool {
    let node_count = sim.nodes.len();
    if node_count == 0 || sim.alpha < config.alpha_min {
        return false;
    }

    let scratch = &mut sim.scratch;
    scratch.positions.clear();
    scratch.positions.extend(sim.nodes.iter().map(|node| node.pos));
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);

    scratch.family_sums.clear();
    for node in &sim.nodes {
        let entry = scratch
            .family_sums
            .entry(node.family_id.clone())
            .or_insert((Vec2::ZERO, 0));
        entry.0 += node.pos;
        entry.1 += 1;
    }

    // Edges pointing outside the visible set are expected after filtering.
    scratch.springs.clear();
    for edge in &sim.edges {
        let (Some(&source), Some(&target)) = (
            sim.index_by_id.get(&edge.source),
            sim.index_by_id.get(&edge.target),
        ) else {
            continue;
        };
        if source != target {
            scratch
                .springs
                .push((source, target, config.rest_length(edge.kind)));
        }
    }

    let positions = &scratch.positions;
    let forces = &mut scratch.forces;

    for (index, force) in forces.iter_mut().enumerate() {
        *force += repulsion(index, positions, config);
    }

    for &(source, target, rest_length) in &scratch.springs {
        forces[source] += spring(
            positions[source],
            positions[target],
            rest_length,
            config.spring_stiffness,
        );
        forces[target] += spring(
            positions[target],
            positions[source],
            rest_length,
            config.spring_stiffness,
        );
    }

    for (index, node) in sim.nodes.iter().enumerate() {
        if let Some(&(sum, count)) = scratch.family_sums.get(&node.family_id)
            && count > 1
        {
            let centroid = (sum - node.pos) / (count - 1) as f32;
            forces[index] += cohesion(node.pos, centroid, config.family_cohesion);
        }
        forces[index] += centering(node.pos, config.centering);
    }

    let alpha = sim.alpha;
    for (index, node) in sim.nodes.iter_mut().enumerate() {
        if sim.pinned == Some(index) {
            continue;
        }
        node.velocity = (node.velocity + forces[index] * alpha) * config.velocity_damping;
        node.pos += node.velocity;
    }

    sim.alpha *= config.alpha_decay;
    true
}
