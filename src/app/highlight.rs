use std::collections::HashSet;

use crate::kinship::PersonId;

use super::SimContext;

fn pair_key(a: &str, b: &str) -> (PersonId, PersonId) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

#[derive(Clone, Debug, Default)]
pub(super) struct Highlights {
    path_nodes: HashSet<PersonId>,
    path_edges: HashSet<(PersonId, PersonId)>,
    focus: Option<PersonId>,
}

impl Highlights {
    pub(super) fn set_path(&mut self, chain: Vec<PersonId>) {
        self.path_nodes = chain.iter().cloned().collect();
        self.path_edges = chain
            .windows(2)
            .filter_map(|pair| match pair {
                [a, b] => Some(pair_key(a, b)),
                _ => None,
            })
            .collect();
    }

    pub(super) fn clear_path(&mut self) {
        self.set_path(Vec::new());
    }

    pub(super) fn has_path(&self) -> bool {
        !self.path_nodes.is_empty()
    }

    pub(super) fn on_path(&self, id: &str) -> bool {
        self.path_nodes.contains(id)
    }

    pub(super) fn edge_on_path(&self, a: &str, b: &str) -> bool {
        self.path_edges.contains(&pair_key(a, b))
    }

    pub(super) fn set_focus(&mut self, focus: Option<PersonId>) {
        self.focus = focus;
    }

    pub(super) fn is_focus(&self, id: &str) -> bool {
        self.focus.as_deref() == Some(id)
    }
}

pub(super) fn connected_to(sim: &SimContext, index: usize) -> HashSet<usize> {
    let Some(node) = sim.nodes.get(index) else {
        return HashSet::new();
    };

    sim.edges
        .iter()
        .filter_map(|edge| {
            if edge.source == node.id {
                sim.index_by_id.get(&edge.target).copied()
            } else if edge.target == node.id {
                sim.index_by_id.get(&edge.source).copied()
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::app::test_support::{sim_edge, sim_node, sim_with};
    use crate::kinship::EdgeKind;

    #[test]
    fn path_edges_follow_the_chain_only() {
        let mut highlights = Highlights::default();
        highlights.set_path(vec!["a".into(), "b".into(), "c".into()]);

        assert!(highlights.on_path("b"));
        assert!(highlights.edge_on_path("b", "a"));
        assert!(highlights.edge_on_path("b", "c"));
        assert!(!highlights.edge_on_path("a", "c"));

        highlights.clear_path();
        assert!(!highlights.has_path());
        assert!(!highlights.on_path("a"));
    }

    #[test]
    fn connected_ignores_hidden_neighbors() {
        let sim = sim_with(
            vec![
                sim_node("a", "f", vec2(0.0, 0.0)),
                sim_node("b", "f", vec2(1.0, 0.0)),
                sim_node("c", "f", vec2(2.0, 0.0)),
            ],
            vec![
                sim_edge("a", "b", EdgeKind::ParentOf),
                sim_edge("c", "a", EdgeKind::SpouseOf),
                sim_edge("a", "ghost", EdgeKind::ParentOf),
            ],
        );
        let connected = connected_to(&sim, 0);
        assert_eq!(connected, HashSet::from([1, 2]));
        assert!(connected_to(&sim, 7).is_empty());
    }
}
