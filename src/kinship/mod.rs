//! Relationship-graph queries: shortest kinship paths, focus neighborhoods and
//! people search over a store snapshot.

mod error;
mod focus;
mod index;
mod path;
mod query;
mod search;
mod types;

pub use error::KinshipError;
pub use focus::{DEFAULT_FOCUS_DEPTH, MAX_FOCUS_DEPTH};
pub use query::{
    DetailPolicy, FocusGraph, FocusNode, FocusParams, GraphFilter, GraphSnapshot,
    KinshipService, PathReport, Principal,
};
pub use search::MIN_QUERY_CHARS;
pub use types::{Edge, EdgeKind, Family, FamilyId, Person, PersonId, PersonView};
