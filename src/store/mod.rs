mod error;
mod snapshot;
mod views;

use crate::kinship::{Edge, Family, FamilyId, Person, PersonId};

pub use error::StoreError;
pub use snapshot::Snapshot;
pub use views::{SavedView, ViewFilters, ViewStore};

pub trait KinshipStore: Send + Sync {
    fn edges(&self) -> Result<Vec<Edge>, StoreError>;

    /// People with the given ids. Unknown ids are skipped.
    fn people(&self, ids: &[PersonId]) -> Result<Vec<Person>, StoreError>;

    fn person_family(&self, id: &str) -> Result<Option<FamilyId>, StoreError>;

    fn all_people(&self) -> Result<Vec<Person>, StoreError>;

    fn families(&self) -> Result<Vec<Family>, StoreError>;

    fn cities(&self) -> Result<Vec<String>, StoreError>;
}
