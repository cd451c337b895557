use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::index::GraphIndex;
use super::types::{Direction, EdgeKind, PersonId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    #[serde(rename = "spouse of")]
    SpouseOf,
    #[serde(rename = "child of")]
    ChildOf,
    #[serde(rename = "parent of")]
    ParentOf,
}

impl Relationship {
    /// Label for stepping from one person to the next along `kind`, traversed in
    /// `direction`. Walking a `ParentOf` edge forward lands on the child.
    pub fn for_hop(kind: EdgeKind, direction: Direction) -> Self {
        match (kind, direction) {
            (EdgeKind::SpouseOf, _) => Self::SpouseOf,
            (EdgeKind::ParentOf, Direction::Forward) => Self::ChildOf,
            (EdgeKind::ParentOf, Direction::Reverse) => Self::ParentOf,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SpouseOf => "spouse of",
            Self::ChildOf => "child of",
            Self::ParentOf => "parent of",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub from: PersonId,
    pub to: PersonId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub direction: Direction,
}

impl Hop {
    pub fn relationship(&self) -> Relationship {
        Relationship::for_hop(self.kind, self.direction)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    Found {
        chain: Vec<PersonId>,
        hops: Vec<Hop>,
    },
    NotFound,
}

#[cfg(test)]
impl PathOutcome {
    pub fn degrees(&self) -> Option<usize> {
        match self {
            Self::Found { hops, .. } => Some(hops.len()),
            Self::NotFound => None,
        }
    }
}

/// Breadth-first search over the undirected view of `index`. Nodes are marked
/// visited on enqueue, so the first time `to` is discovered the chain is a
/// shortest one. Equal-length alternatives are resolved by neighbor order.
pub fn shortest_path(index: &GraphIndex, from: &str, to: &str) -> PathOutcome {
    if from == to {
        return PathOutcome::Found {
            chain: vec![from.to_owned()],
            hops: Vec::new(),
        };
    }

    let mut queue = VecDeque::from([from]);
    let mut visited = HashSet::from([from]);
    let mut parent: HashMap<&str, (&str, EdgeKind, Direction)> = HashMap::new();
    let mut reached = false;

    'search: while let Some(current) = queue.pop_front() {
        for adjacent in index.neighbors(current) {
            let next = adjacent.neighbor.as_str();
            if !visited.insert(next) {
                continue;
            }

            parent.insert(next, (current, adjacent.kind, adjacent.direction));
            if next == to {
                reached = true;
                break 'search;
            }
            queue.push_back(next);
        }
    }

    if !reached {
        return PathOutcome::NotFound;
    }

    let mut chain = vec![to.to_owned()];
    let mut hops = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let Some(&(previous, kind, direction)) = parent.get(cursor) else {
            return PathOutcome::NotFound;
        };
        hops.push(Hop {
            from: previous.to_owned(),
            to: cursor.to_owned(),
            kind,
            direction,
        });
        chain.push(previous.to_owned());
        cursor = previous;
    }

    chain.reverse();
    hops.reverse();
    PathOutcome::Found { chain, hops }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinship::types::Edge;

    fn line() -> GraphIndex {
        GraphIndex::build(&[
            Edge::new("a", "b", EdgeKind::ParentOf),
            Edge::new("b", "c", EdgeKind::ParentOf),
            Edge::new("c", "d", EdgeKind::ParentOf),
        ])
    }

    fn labels(outcome: &PathOutcome) -> Vec<Relationship> {
        match outcome {
            PathOutcome::Found { hops, .. } => hops.iter().map(Hop::relationship).collect(),
            PathOutcome::NotFound => Vec::new(),
        }
    }

    #[test]
    fn line_of_four_is_three_degrees() {
        let outcome = shortest_path(&line(), "a", "d");
        assert_eq!(outcome.degrees(), Some(3));
        let PathOutcome::Found { chain, .. } = outcome else {
            panic!("expected a path");
        };
        assert_eq!(chain, ["a", "b", "c", "d"]);
    }

    #[test]
    fn same_person_is_zero_degrees() {
        let outcome = shortest_path(&line(), "b", "b");
        assert_eq!(
            outcome,
            PathOutcome::Found {
                chain: vec!["b".to_owned()],
                hops: Vec::new(),
            }
        );
    }

    #[test]
    fn degrees_do_not_depend_on_direction() {
        let index = GraphIndex::build(&[
            Edge::new("gp", "p", EdgeKind::ParentOf),
            Edge::new("p", "k", EdgeKind::ParentOf),
            Edge::new("k", "spouse", EdgeKind::SpouseOf),
        ]);

        let forward = shortest_path(&index, "gp", "spouse");
        let backward = shortest_path(&index, "spouse", "gp");
        assert_eq!(forward.degrees(), Some(3));
        assert_eq!(forward.degrees(), backward.degrees());

        assert_eq!(
            labels(&forward),
            [
                Relationship::ChildOf,
                Relationship::ChildOf,
                Relationship::SpouseOf
            ]
        );
        assert_eq!(
            labels(&backward),
            [
                Relationship::SpouseOf,
                Relationship::ParentOf,
                Relationship::ParentOf
            ]
        );
    }

    #[test]
    fn disconnected_people_are_not_found() {
        let index = GraphIndex::build(&[
            Edge::new("a", "b", EdgeKind::ParentOf),
            Edge::new("x", "y", EdgeKind::SpouseOf),
        ]);
        assert_eq!(shortest_path(&index, "a", "y"), PathOutcome::NotFound);
    }

    #[test]
    fn unknown_person_reads_as_not_found() {
        assert_eq!(shortest_path(&line(), "a", "ghost"), PathOutcome::NotFound);
        assert_eq!(shortest_path(&line(), "ghost", "a"), PathOutcome::NotFound);
    }

    #[test]
    fn prefers_the_shorter_route_in_a_cycle() {
        let index = GraphIndex::build(&[
            Edge::new("a", "b", EdgeKind::ParentOf),
            Edge::new("b", "c", EdgeKind::ParentOf),
            Edge::new("c", "d", EdgeKind::ParentOf),
            Edge::new("d", "e", EdgeKind::ParentOf),
            Edge::new("a", "e", EdgeKind::SpouseOf),
        ]);
        assert_eq!(shortest_path(&index, "b", "e").degrees(), Some(2));
        assert_eq!(shortest_path(&index, "a", "d").degrees(), Some(2));
    }

    #[test]
    fn spouse_label_ignores_storage_order() {
        let index = GraphIndex::build(&[Edge::new("x", "y", EdgeKind::SpouseOf)]);
        assert_eq!(labels(&shortest_path(&index, "x", "y")), [Relationship::SpouseOf]);
        assert_eq!(labels(&shortest_path(&index, "y", "x")), [Relationship::SpouseOf]);
    }
}
