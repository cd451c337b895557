use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::SimNode;

const MAX_CLUSTER_RADIUS: f32 = 350.0;
const MEMBER_RING_MIN: f32 = 40.0;
const MEMBER_RING_SPREAD: f32 = 40.0;

pub(super) fn cluster_radius(family_count: usize) -> f32 {
    (80.0 * ((family_count + 1) as f32).sqrt()).min(MAX_CLUSTER_RADIUS)
}

/// Seeds positions: one cluster per family on a large circle, members on a
/// jittered ring around the cluster center. Families are ordered by first
/// appearance in `nodes`.
pub(super) fn place_initial<R: Rng + ?Sized>(nodes: &mut [SimNode], rng: &mut R) {
    let mut family_order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, usize> = HashMap::new();
    for node in nodes.iter() {
        let count = members.entry(node.family_id.as_str()).or_insert(0);
        if *count == 0 {
            family_order.push(node.family_id.as_str());
        }
        *count += 1;
    }

    let family_index = family_order
        .iter()
        .enumerate()
        .map(|(index, family)| ((*family).to_owned(), index))
        .collect::<HashMap<_, _>>();
    let family_sizes = members
        .into_iter()
        .map(|(family, count)| (family.to_owned(), count))
        .collect::<HashMap<_, _>>();

    let family_count = family_index.len().max(1);
    let radius = cluster_radius(family_index.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for node in nodes.iter_mut() {
        let family = family_index.get(&node.family_id).copied().unwrap_or(0);
        let size = family_sizes.get(&node.family_id).copied().unwrap_or(1).max(1);
        let slot = seen.entry(node.family_id.clone()).or_insert(0);
        let member = *slot;
        *slot += 1;

        let family_angle = TAU * family as f32 / family_count as f32;
        let member_angle = TAU * member as f32 / size as f32;
        let ring = MEMBER_RING_MIN + rng.gen_range(0.0..MEMBER_RING_SPREAD);

        node.pos = vec2(family_angle.cos(), family_angle.sin()) * radius
            + vec2(member_angle.cos(), member_angle.sin()) * ring;
        node.velocity = Vec2::ZERO;
    }
}
