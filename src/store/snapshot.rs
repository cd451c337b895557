use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::kinship::{Edge, Family, FamilyId, Person, PersonId};
use crate::util::display_name;

use super::{KinshipStore, StoreError};

#[derive(Clone, Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    families: Vec<Family>,
    #[serde(default)]
    people: Vec<RawPerson>,
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawPerson {
    id: PersonId,
    first_name: String,
    #[serde(default, alias = "last_name_raw")]
    last_name: Option<String>,
    family_id: FamilyId,
    #[serde(default)]
    current_city: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    families: Vec<Family>,
    people: Vec<Person>,
    people_index: HashMap<PersonId, usize>,
    edges: Vec<Edge>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(raw).context("invalid snapshot JSON")?;
        Self::from_parts(raw.families, raw.people, raw.edges)
    }

    fn from_parts(families: Vec<Family>, people: Vec<RawPerson>, edges: Vec<Edge>) -> Result<Self> {
        let family_names = families
            .iter()
            .map(|family| (family.id.as_str(), family.name.as_str()))
            .collect::<HashMap<_, _>>();

        let mut people_index = HashMap::with_capacity(people.len());
        let mut records = Vec::with_capacity(people.len());
        for raw in people {
            if people_index.contains_key(&raw.id) {
                return Err(anyhow!("duplicate person id {}", raw.id));
            }

            let family_name = family_names
                .get(raw.family_id.as_str())
                .map(|name| (*name).to_owned())
                .unwrap_or_else(|| "Unknown".to_owned());
            let city = raw
                .current_city
                .map(|city| city.trim().to_owned())
                .filter(|city| !city.is_empty());

            people_index.insert(raw.id.clone(), records.len());
            records.push(Person {
                name: display_name(&raw.first_name, raw.last_name.as_deref()),
                id: raw.id,
                family_id: raw.family_id,
                family_name,
                city,
            });
        }

        let mut seen = HashSet::with_capacity(edges.len());
        let mut kept = Vec::with_capacity(edges.len());
        for edge in edges {
            if edge.from == edge.to {
                warn!(person = %edge.from, kind = %edge.kind, "dropping self-loop edge");
                continue;
            }
            if !seen.insert(edge.clone()) {
                debug!(from = %edge.from, to = %edge.to, kind = %edge.kind, "dropping duplicate edge");
                continue;
            }
            kept.push(edge);
        }

        let mut families = families;
        families.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            families = families.len(),
            people = records.len(),
            edges = kept.len(),
            "snapshot loaded"
        );

        Ok(Self {
            families,
            people: records,
            people_index,
            edges: kept,
        })
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people_index.get(id).map(|&index| &self.people[index])
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl KinshipStore for Snapshot {
    fn edges(&self) -> Result<Vec<Edge>, StoreError> {
        Ok(self.edges.clone())
    }

    fn people(&self, ids: &[PersonId]) -> Result<Vec<Person>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.person(id).cloned())
            .collect())
    }

    fn person_family(&self, id: &str) -> Result<Option<FamilyId>, StoreError> {
        Ok(self.person(id).map(|person| person.family_id.clone()))
    }

    fn all_people(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.people.clone())
    }

    fn families(&self) -> Result<Vec<Family>, StoreError> {
        Ok(self.families.clone())
    }

    fn cities(&self) -> Result<Vec<String>, StoreError> {
        let cities = self
            .people
            .iter()
            .filter_map(|person| person.city.clone())
            .collect::<BTreeSet<_>>();
        Ok(cities.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::kinship::EdgeKind;

    const SAMPLE: &str = r#"{
        "families": [
            {"id": "f2", "name": "Rossi"},
            {"id": "f1", "name": "Lopez"}
        ],
        "people": [
            {"id": "p1", "first_name": "Maria", "last_name": "Lopez", "family_id": "f1", "current_city": "Lima"},
            {"id": "p2", "first_name": "Luis", "family_id": "f1", "current_city": " "},
            {"id": "p3", "first_name": "Marco", "last_name_raw": "Rossi", "family_id": "f2", "current_city": "Roma"}
        ],
        "edges": [
            {"from": "p1", "to": "p2", "type": "PARENT_OF"},
            {"from": "p1", "to": "p2", "type": "PARENT_OF"},
            {"from": "p3", "to": "p3", "type": "SPOUSE_OF"},
            {"from": "p1", "to": "p3", "type": "SPOUSE_OF"}
        ]
    }"#;

    #[test]
    fn builds_display_names_and_family_names() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        let maria = snapshot.person("p1").unwrap();
        assert_eq!(maria.name, "Maria Lopez");
        assert_eq!(maria.family_name, "Lopez");
        assert_eq!(snapshot.person("p2").unwrap().name, "Luis");
        assert_eq!(snapshot.person("p3").unwrap().name, "Marco Rossi");
    }

    #[test]
    fn drops_self_loops_and_duplicates() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        assert_eq!(
            snapshot.edges().unwrap(),
            [
                Edge::new("p1", "p2", EdgeKind::ParentOf),
                Edge::new("p1", "p3", EdgeKind::SpouseOf),
            ]
        );
    }

    #[test]
    fn cities_are_distinct_sorted_and_non_blank() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        assert_eq!(snapshot.cities().unwrap(), ["Lima", "Roma"]);
    }

    #[test]
    fn families_are_sorted_by_name() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        let names = snapshot
            .families()
            .unwrap()
            .into_iter()
            .map(|family| family.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["Lopez", "Rossi"]);
    }

    #[test]
    fn people_lookup_skips_unknown_ids() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        let found = snapshot
            .people(&["p3".to_owned(), "nobody".to_owned()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(snapshot.person_family("p3").unwrap().as_deref(), Some("f2"));
        assert_eq!(snapshot.person_family("nobody").unwrap(), None);
    }

    #[test]
    fn rejects_unknown_edge_types() {
        let raw = r#"{"people": [], "edges": [{"from": "a", "to": "b", "type": "COUSIN_OF"}]}"#;
        assert!(Snapshot::from_json(raw).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let snapshot = Snapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.person_count(), 3);
        assert_eq!(snapshot.edge_count(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let error = Snapshot::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
