use std::collections::{HashMap, VecDeque};

use super::types::{Edge, EdgeKind, PersonId};

pub const DEFAULT_FOCUS_DEPTH: usize = 2;
pub const MAX_FOCUS_DEPTH: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRequest<'a> {
    pub center: &'a str,
    pub depth: usize,
    pub include_ancestors: bool,
    pub include_descendants: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    Child,
    Parent,
    Spouse,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reached {
    pub id: PersonId,
    pub level: usize,
    pub is_focus: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    pub people: Vec<Reached>,
    pub edges: Vec<Edge>,
}

#[cfg(test)]
impl Neighborhood {
    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.people
            .iter()
            .find(|reached| reached.id == id)
            .map(|reached| reached.level)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.level_of(id).is_some()
    }
}

fn directed_links<'a>(
    edges: &'a [Edge],
    include_ancestors: bool,
    include_descendants: bool,
) -> HashMap<&'a str, Vec<(&'a str, Link)>> {
    let mut links: HashMap<&str, Vec<(&str, Link)>> = HashMap::new();

    for edge in edges {
        match edge.kind {
            EdgeKind::ParentOf => {
                if include_descendants {
                    links
                        .entry(edge.from.as_str())
                        .or_default()
                        .push((edge.to.as_str(), Link::Child));
                }
                if include_ancestors {
                    links
                        .entry(edge.to.as_str())
                        .or_default()
                        .push((edge.from.as_str(), Link::Parent));
                }
            }
            EdgeKind::SpouseOf => {
                links
                    .entry(edge.from.as_str())
                    .or_default()
                    .push((edge.to.as_str(), Link::Spouse));
                links
                    .entry(edge.to.as_str())
                    .or_default()
                    .push((edge.from.as_str(), Link::Spouse));
            }
        }
    }

    links
}

/// Collects everyone within `depth` hops of the center. Spouse links are always
/// followed; parent and child links only when the matching flag is set. Every
/// edge with both endpoints inside the result is returned, whatever its kind.
pub fn extract_neighborhood(edges: &[Edge], request: FocusRequest<'_>) -> Neighborhood {
    let links = directed_links(
        edges,
        request.include_ancestors,
        request.include_descendants,
    );

    let mut levels: HashMap<&str, usize> = HashMap::from([(request.center, 0)]);
    let mut order = vec![request.center];
    let mut queue = VecDeque::from([(request.center, 0usize)]);

    while let Some((id, level)) = queue.pop_front() {
        if level >= request.depth {
            continue;
        }

        let Some(neighbors) = links.get(id) else {
            continue;
        };
        for &(next, _link) in neighbors {
            if levels.contains_key(next) {
                continue;
            }
            levels.insert(next, level + 1);
            order.push(next);
            queue.push_back((next, level + 1));
        }
    }

    let people = order
        .iter()
        .map(|&id| Reached {
            id: id.to_owned(),
            level: levels.get(id).copied().unwrap_or_default(),
            is_focus: id == request.center,
        })
        .collect();

    let edges = edges
        .iter()
        .filter(|edge| {
            levels.contains_key(edge.from.as_str()) && levels.contains_key(edge.to.as_str())
        })
        .cloned()
        .collect();

    Neighborhood { people, edges }
}
