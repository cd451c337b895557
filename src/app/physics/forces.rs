use eframe::egui::Vec2;

use super::SimulationConfig;

pub(super) fn repulsion(index: usize, positions: &[Vec2], config: &SimulationConfig) -> Vec2 {
    let point = positions[index];
    let (min_sq, max_sq) = config.repulsion_band;
    let mut force = Vec2::ZERO;

    for (other, &other_pos) in positions.iter().enumerate() {
        if other == index {
            continue;
        }
        let delta = point - other_pos;
        let distance_sq = delta.length_sq();
        if distance_sq < min_sq || distance_sq > max_sq {
            continue;
        }
        let distance = distance_sq.sqrt();
        force += (delta / distance) * (config.repulsion / distance_sq);
    }

    force
}

pub(super) fn spring(point: Vec2, other: Vec2, rest_length: f32, stiffness: f32) -> Vec2 {
    let delta = other - point;
    let mut distance = delta.length();
    if distance <= 0.0 {
        distance = 1.0;
    }
    (delta / distance) * ((distance - rest_length) * stiffness)
}

pub(super) fn cohesion(point: Vec2, centroid: Vec2, strength: f32) -> Vec2 {
    (centroid - point) * strength
}

pub(super) fn centering(point: Vec2, strength: f32) -> Vec2 {
    -point * strength
}
