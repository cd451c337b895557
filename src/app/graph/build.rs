use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Vec2};
use rand::Rng;
use tracing::debug;

use crate::kinship::{Edge, FamilyId, FocusGraph, FocusNode, GraphSnapshot, PersonView};

use super::super::highlight::Highlights;
use super::super::layout::place_initial;
use super::super::render_utils::family_color;
use super::super::{SimContext, SimEdge, SimNode, ViewModel};

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct VisiblePerson<'a> {
    pub person: &'a PersonView,
    pub level: Option<usize>,
    pub is_focus: bool,
}

pub(in crate::app) fn visible_people<'a>(
    graph: &'a GraphSnapshot,
    focus: Option<&'a FocusGraph>,
    family: Option<&str>,
    city: Option<&str>,
) -> Vec<VisiblePerson<'a>> {
    if let Some(focus) = focus {
        return focus
            .nodes
            .iter()
            .map(|node: &FocusNode| VisiblePerson {
                person: &node.person,
                level: Some(node.level),
                is_focus: node.is_focus,
            })
            .collect();
    }

    graph
        .nodes
        .iter()
        .filter(|person| family.is_none_or(|family| person.family_id == family))
        .filter(|person| {
            city.is_none_or(|city| {
                person
                    .city
                    .as_deref()
                    .is_some_and(|own| own.eq_ignore_ascii_case(city))
            })
        })
        .map(|person| VisiblePerson {
            person,
            level: None,
            is_focus: false,
        })
        .collect()
}

pub(in crate::app) fn family_colors<'a>(
    family_ids: impl IntoIterator<Item = &'a FamilyId>,
) -> HashMap<FamilyId, Color32> {
    family_ids
        .into_iter()
        .enumerate()
        .map(|(index, id)| (id.clone(), family_color(index)))
        .collect()
}

pub(in crate::app) fn build_simulation<R: Rng + ?Sized>(
    people: &[VisiblePerson<'_>],
    edges: &[Edge],
    colors: &HashMap<FamilyId, Color32>,
    highlights: &Highlights,
    rng: &mut R,
) -> SimContext {
    let mut nodes = people
        .iter()
        .map(|visible| {
            let person = visible.person;
            SimNode {
                id: person.id.clone(),
                label: person.name.clone(),
                family_id: person.family_id.clone(),
                family_name: person.family_name.clone(),
                city: person.city.clone(),
                can_edit: person.can_edit,
                color: colors
                    .get(&person.family_id)
                    .copied()
                    .unwrap_or(Color32::GRAY),
                pos: Vec2::ZERO,
                velocity: Vec2::ZERO,
                radius: SimNode::RADIUS,
                level: visible.level,
                is_focus: visible.is_focus || highlights.is_focus(&person.id),
                is_path: highlights.on_path(&person.id),
            }
        })
        .collect::<Vec<_>>();
    place_initial(&mut nodes, rng);

    let ids = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();
    let edges = edges
        .iter()
        .filter(|edge| ids.contains(edge.from.as_str()) && ids.contains(edge.to.as_str()))
        .map(|edge| SimEdge {
            source: edge.from.clone(),
            target: edge.to.clone(),
            kind: edge.kind,
            is_path: highlights.edge_on_path(&edge.from, &edge.to),
        })
        .collect::<Vec<_>>();

    SimContext::new(nodes, edges)
}

impl ViewModel {
    pub(in crate::app) fn rebuild_simulation(&mut self) {
        let focus = self.focus.graph.as_ref();
        let people = visible_people(
            &self.graph,
            focus,
            self.filter_family.as_deref(),
            self.filter_city.as_deref(),
        );
        let edges = focus.map_or(self.graph.edges.as_slice(), |focus| focus.edges.as_slice());

        let selected_id = self.selected_id().map(str::to_owned);
        let sim = build_simulation(
            &people,
            edges,
            &self.family_colors,
            &self.highlights,
            &mut rand::thread_rng(),
        );
        debug!(
            nodes = sim.nodes.len(),
            edges = sim.edges.len(),
            focus = focus.is_some(),
            "rebuilt simulation"
        );

        self.sim = sim;
        self.controller.reset(&mut self.sim);
        self.selected = selected_id.and_then(|id| self.sim.index_by_id.get(&id).copied());
        self.graph_dirty = false;
    }

    pub(in crate::app) fn refresh_path_flags(&mut self) {
        for node in &mut self.sim.nodes {
            node.is_path = self.highlights.on_path(&node.id);
            node.is_focus = self.highlights.is_focus(&node.id)
                || self
                    .focus
                    .graph
                    .as_ref()
                    .is_some_and(|focus| focus.focus_person == node.id);
        }
        for edge in &mut self.sim.edges {
            edge.is_path = self.highlights.edge_on_path(&edge.source, &edge.target);
        }
    }

    pub(in crate::app) fn selected_id(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.sim.nodes.get(index))
            .map(|node| node.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::kinship::EdgeKind;

    fn person(id: &str, family: &str, city: Option<&str>) -> PersonView {
        PersonView {
            id: id.to_owned(),
            name: format!("{id} Test"),
            family_id: family.to_owned(),
            family_name: family.to_uppercase(),
            city: city.map(str::to_owned),
            can_edit: family == "f1",
        }
    }

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![
                person("a", "f1", Some("Lima")),
                person("b", "f1", Some("Roma")),
                person("c", "f2", Some("lima")),
                person("d", "f2", None),
            ],
            edges: vec![
                Edge::new("a", "b", EdgeKind::ParentOf),
                Edge::new("b", "c", EdgeKind::SpouseOf),
                Edge::new("c", "d", EdgeKind::ParentOf),
            ],
        }
    }

    fn ids(people: &[VisiblePerson<'_>]) -> Vec<String> {
        people.iter().map(|visible| visible.person.id.clone()).collect()
    }

    #[test]
    fn filters_by_family_and_city() {
        let graph = snapshot();
        assert_eq!(ids(&visible_people(&graph, None, None, None)).len(), 4);
        assert_eq!(ids(&visible_people(&graph, None, Some("f2"), None)), ["c", "d"]);
        assert_eq!(ids(&visible_people(&graph, None, None, Some("LIMA"))), ["a", "c"]);
        assert_eq!(
            ids(&visible_people(&graph, None, Some("f1"), Some("lima"))),
            ["a"]
        );
        assert!(visible_people(&graph, None, Some("nobody"), None).is_empty());
    }

    #[test]
    fn focus_mode_ignores_filters() {
        let graph = snapshot();
        let focus = FocusGraph {
            focus_person: "b".to_owned(),
            depth: 1,
            nodes: vec![
                FocusNode {
                    person: person("b", "f1", None),
                    level: 0,
                    is_focus: true,
                },
                FocusNode {
                    person: person("c", "f2", None),
                    level: 1,
                    is_focus: false,
                },
            ],
            edges: vec![Edge::new("b", "c", EdgeKind::SpouseOf)],
        };

        let people = visible_people(&graph, Some(&focus), Some("f2"), Some("Lima"));
        assert_eq!(ids(&people), ["b", "c"]);
        assert!(people[0].is_focus);
        assert_eq!(people[1].level, Some(1));
    }

    #[test]
    fn simulation_keeps_only_visible_edges() {
        let graph = snapshot();
        let people = visible_people(&graph, None, Some("f1"), None);
        let colors = family_colors([&"f1".to_owned(), &"f2".to_owned()]);
        let sim = build_simulation(
            &people,
            &graph.edges,
            &colors,
            &Highlights::default(),
            &mut StdRng::seed_from_u64(3),
        );

        assert_eq!(sim.nodes.len(), 2);
        assert_eq!(sim.edges.len(), 1);
        assert_eq!(sim.edges[0].source, "a");
        assert_eq!(sim.nodes[0].color, family_color(0));
        assert!((sim.alpha - 1.0).abs() < f32::EPSILON);
        assert!(sim.nodes.iter().all(|node| node.pos.length() > 0.0));
    }

    #[test]
    fn highlights_are_stamped_on_new_nodes() {
        let graph = snapshot();
        let people = visible_people(&graph, None, None, None);
        let mut highlights = Highlights::default();
        highlights.set_path(vec!["a".into(), "b".into(), "c".into()]);
        highlights.set_focus(Some("d".into()));

        let sim = build_simulation(
            &people,
            &graph.edges,
            &HashMap::new(),
            &highlights,
            &mut StdRng::seed_from_u64(9),
        );

        let flags = sim
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.is_path, node.is_focus))
            .collect::<Vec<_>>();
        assert_eq!(
            flags,
            [
                ("a", true, false),
                ("b", true, false),
                ("c", true, false),
                ("d", false, true)
            ]
        );
        assert_eq!(
            sim.edges.iter().map(|edge| edge.is_path).collect::<Vec<_>>(),
            [true, true, false]
        );
        assert!(sim.nodes.iter().all(|node| node.color == Color32::GRAY));
    }

    #[test]
    fn empty_snapshot_builds_empty_simulation() {
        let graph = GraphSnapshot::default();
        let people = visible_people(&graph, None, None, None);
        let sim = build_simulation(
            &people,
            &graph.edges,
            &HashMap::new(),
            &Highlights::default(),
            &mut StdRng::seed_from_u64(1),
        );
        assert!(sim.nodes.is_empty());
        assert!(sim.edges.is_empty());
    }
}
