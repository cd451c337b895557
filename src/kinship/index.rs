use std::collections::HashMap;

use super::types::{Direction, Edge, EdgeKind, PersonId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacent {
    pub neighbor: PersonId,
    pub kind: EdgeKind,
    pub direction: Direction,
}

#[derive(Debug, Default)]
pub struct GraphIndex {
    adjacency: HashMap<PersonId, Vec<Adjacent>>,
    edge_count: usize,
}

impl GraphIndex {
    pub fn build(edges: &[Edge]) -> Self {
        let mut adjacency: HashMap<PersonId, Vec<Adjacent>> = HashMap::new();

        for edge in edges {
            adjacency
                .entry(edge.from.clone())
                .or_default()
                .push(Adjacent {
                    neighbor: edge.to.clone(),
                    kind: edge.kind,
                    direction: Direction::Forward,
                });
            adjacency
                .entry(edge.to.clone())
                .or_default()
                .push(Adjacent {
                    neighbor: edge.from.clone(),
                    kind: edge.kind,
                    direction: Direction::Reverse,
                });
        }

        Self {
            adjacency,
            edge_count: edges.len(),
        }
    }

    /// People without edges are absent from the index; they simply have no
    /// neighbors.
    pub fn neighbors(&self, id: &str) -> &[Adjacent] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn person_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
