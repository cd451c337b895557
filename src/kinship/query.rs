use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::store::KinshipStore;

use super::error::{KinshipError, Result};
use super::focus::{DEFAULT_FOCUS_DEPTH, FocusRequest, extract_neighborhood};
use super::index::GraphIndex;
use super::path::{Hop, PathOutcome, Relationship, shortest_path};
use super::search::{DEFAULT_SEARCH_LIMIT, rank_people};
use super::types::{Edge, Family, FamilyId, Person, PersonId, PersonView};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub family_id: FamilyId,
}

/// Which person details leave the service for people outside the viewer's
/// family. Traversal always spans every family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailPolicy {
    #[default]
    Full,
    OwnFamilyOnly,
}

#[derive(Clone, Debug, Serialize)]
pub struct PathStep {
    pub person_id: PersonId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PathReport {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degrees: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathStep>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Hop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PathReport {
    fn not_found() -> Self {
        Self {
            found: false,
            degrees: None,
            path: Vec::new(),
            edges: Vec::new(),
            message: Some("No path found between these people".to_owned()),
        }
    }

    pub fn person_ids(&self) -> Vec<PersonId> {
        self.path.iter().map(|step| step.person_id.clone()).collect()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FocusNode {
    pub person: PersonView,
    pub level: usize,
    pub is_focus: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct FocusGraph {
    pub focus_person: PersonId,
    pub depth: usize,
    pub nodes: Vec<FocusNode>,
    pub edges: Vec<Edge>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphFilter {
    pub family_id: Option<FamilyId>,
    pub city: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<PersonView>,
    pub edges: Vec<Edge>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FocusParams<'a> {
    pub person_id: Option<&'a str>,
    pub depth: Option<usize>,
    pub include_ancestors: Option<bool>,
    pub include_descendants: Option<bool>,
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| KinshipError::invalid(format!("{name} is required")))
}

pub struct KinshipService<S> {
    store: Arc<S>,
    principal: Principal,
    policy: DetailPolicy,
}

impl<S> Clone for KinshipService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            principal: self.principal.clone(),
            policy: self.policy,
        }
    }
}

impl<S: KinshipStore> KinshipService<S> {
    pub fn new(store: Arc<S>, principal: Principal, policy: DetailPolicy) -> Self {
        Self {
            store,
            principal,
            policy,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    fn decorate(&self, person: Person, can_edit: bool) -> PersonView {
        let city = match self.policy {
            DetailPolicy::Full => person.city,
            DetailPolicy::OwnFamilyOnly if can_edit => person.city,
            DetailPolicy::OwnFamilyOnly => None,
        };

        PersonView {
            id: person.id,
            name: person.name,
            family_id: person.family_id,
            family_name: person.family_name,
            city,
            can_edit,
        }
    }

    fn owns(&self, family_id: &str) -> bool {
        family_id == self.principal.family_id
    }

    pub fn find_path(&self, from: Option<&str>, to: Option<&str>) -> Result<PathReport> {
        let (from, to) = match (from, to) {
            (Some(_), Some(_)) => (required(from, "fromId")?, required(to, "toId")?),
            _ => {
                return Err(KinshipError::invalid("fromId and toId are required"));
            }
        };

        let edges = self.store.edges()?;
        let index = GraphIndex::build(&edges);
        debug!(
            people = index.person_count(),
            edges = index.edge_count(),
            "built kinship index"
        );
        if !index.contains(from) || !index.contains(to) {
            // Unknown ids and edgeless people are indistinguishable here and
            // both end up as "not found".
            debug!(from, to, "path endpoint has no edges");
        }

        let PathOutcome::Found { chain, hops } = shortest_path(&index, from, to) else {
            info!(from, to, "no relationship path");
            return Ok(PathReport::not_found());
        };

        let mut people = self
            .store
            .people(&chain)?
            .into_iter()
            .map(|person| (person.id.clone(), person))
            .collect::<HashMap<_, _>>();

        let path = chain
            .iter()
            .enumerate()
            .map(|(position, id)| {
                let person = people.remove(id).map(|person| {
                    let can_edit = self.owns(&person.family_id);
                    self.decorate(person, can_edit)
                });
                let relationship = position
                    .checked_sub(1)
                    .and_then(|hop| hops.get(hop))
                    .map(Hop::relationship);
                PathStep {
                    person_id: id.clone(),
                    person,
                    relationship,
                }
            })
            .collect::<Vec<_>>();

        info!(from, to, degrees = hops.len(), "relationship path found");
        Ok(PathReport {
            found: true,
            degrees: Some(hops.len()),
            path,
            edges: hops,
            message: None,
        })
    }

    pub fn focus_graph(&self, params: FocusParams<'_>) -> Result<FocusGraph> {
        let center = required(params.person_id, "personId")?;
        let depth = params.depth.unwrap_or(DEFAULT_FOCUS_DEPTH);

        let edges = self.store.edges()?;
        let neighborhood = extract_neighborhood(
            &edges,
            FocusRequest {
                center,
                depth,
                include_ancestors: params.include_ancestors.unwrap_or(true),
                include_descendants: params.include_descendants.unwrap_or(true),
            },
        );

        let ids = neighborhood
            .people
            .iter()
            .map(|reached| reached.id.clone())
            .collect::<Vec<_>>();
        let mut people = self
            .store
            .people(&ids)?
            .into_iter()
            .map(|person| (person.id.clone(), person))
            .collect::<HashMap<_, _>>();

        let mut nodes = Vec::with_capacity(neighborhood.people.len());
        for reached in &neighborhood.people {
            let Some(person) = people.remove(&reached.id) else {
                continue;
            };
            let can_edit = self
                .store
                .person_family(&reached.id)?
                .is_some_and(|family| self.owns(&family));
            nodes.push(FocusNode {
                person: self.decorate(person, can_edit),
                level: reached.level,
                is_focus: reached.is_focus,
            });
        }

        let known = nodes
            .iter()
            .map(|node| node.person.id.as_str())
            .collect::<HashSet<_>>();
        let edges = neighborhood
            .edges
            .into_iter()
            .filter(|edge| known.contains(edge.from.as_str()) && known.contains(edge.to.as_str()))
            .collect();

        info!(center, depth, nodes = nodes.len(), "focus graph extracted");
        Ok(FocusGraph {
            focus_person: center.to_owned(),
            depth,
            nodes,
            edges,
        })
    }

    pub fn search_people(&self, query: &str, limit: Option<usize>) -> Result<Vec<PersonView>> {
        let people = self.store.all_people()?;
        let ranked = rank_people(
            people,
            query,
            &self.principal.family_id,
            limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        );
        debug!(query, matches = ranked.len(), "people search");

        Ok(ranked
            .into_iter()
            .map(|person| {
                let can_edit = self.owns(&person.family_id);
                self.decorate(person, can_edit)
            })
            .collect())
    }

    pub fn tree_graph(&self, filter: &GraphFilter) -> Result<GraphSnapshot> {
        let city = filter.city.as_deref().map(str::to_lowercase);
        let mut people = self
            .store
            .all_people()?
            .into_iter()
            .filter(|person| {
                filter
                    .family_id
                    .as_deref()
                    .is_none_or(|family| person.family_id == family)
            })
            .filter(|person| {
                city.as_deref().is_none_or(|city| {
                    person
                        .city
                        .as_deref()
                        .is_some_and(|own| own.to_lowercase() == city)
                })
            })
            .collect::<Vec<_>>();
        people.sort_by(|a, b| {
            a.family_name
                .cmp(&b.family_name)
                .then_with(|| a.name.cmp(&b.name))
        });

        let visible = people
            .iter()
            .map(|person| person.id.clone())
            .collect::<HashSet<_>>();
        let edges = self
            .store
            .edges()?
            .into_iter()
            .filter(|edge| visible.contains(&edge.from) && visible.contains(&edge.to))
            .collect::<Vec<_>>();

        let nodes = people
            .into_iter()
            .map(|person| {
                let can_edit = self.owns(&person.family_id);
                self.decorate(person, can_edit)
            })
            .collect::<Vec<_>>();

        debug!(nodes = nodes.len(), edges = edges.len(), "tree graph built");
        Ok(GraphSnapshot { nodes, edges })
    }

    pub fn families(&self) -> Result<Vec<Family>> {
        Ok(self.store.families()?)
    }

    pub fn cities(&self) -> Result<Vec<String>> {
        Ok(self.store.cities()?)
    }
}
