use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kinship::{FamilyId, PersonId, Principal};

use super::StoreError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<FamilyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_person_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_ancestors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_descendants: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedView {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub filters: ViewFilters,
    #[serde(default)]
    pub is_shared: bool,
    pub owner: String,
    pub family_id: FamilyId,
}

#[derive(Clone, Debug)]
pub struct ViewStore {
    path: PathBuf,
}

impl ViewStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<SavedView>, StoreError> {
        if self.path.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is a directory",
                self.path.display()
            )));
        }
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_all(&self, views: &[SavedView]) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(views)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn list(&self, principal: &Principal) -> Result<Vec<SavedView>, StoreError> {
        let mut views = self
            .read_all()?
            .into_iter()
            .filter(|view| {
                view.owner == principal.user_id
                    || (view.is_shared && view.family_id == principal.family_id)
            })
            .collect::<Vec<_>>();
        views.reverse();
        Ok(views)
    }

    pub fn save(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<String>,
        filters: ViewFilters,
        is_shared: bool,
    ) -> Result<SavedView, StoreError> {
        let mut views = self.read_all()?;
        let next_id = views
            .iter()
            .filter_map(|view| view.id.strip_prefix("view-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let view = SavedView {
            id: format!("view-{next_id}"),
            name: name.trim().to_owned(),
            description,
            filters,
            is_shared,
            owner: principal.user_id.clone(),
            family_id: principal.family_id.clone(),
        };
        views.push(view.clone());
        self.write_all(&views)?;
        debug!(id = %view.id, path = %self.path.display(), "saved view written");
        Ok(view)
    }

    pub fn delete(&self, principal: &Principal, id: &str) -> Result<(), StoreError> {
        let mut views = self.read_all()?;
        let position = views
            .iter()
            .position(|view| view.id == id)
            .ok_or_else(|| StoreError::ViewNotFound(id.to_owned()))?;
        if views[position].owner != principal.user_id {
            return Err(StoreError::NotViewOwner(id.to_owned()));
        }

        views.remove(position);
        self.write_all(&views)
    }
}
