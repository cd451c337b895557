use std::fmt;

use serde::{Deserialize, Serialize};

pub type PersonId = String;
pub type FamilyId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "PARENT_OF")]
    ParentOf,
    #[serde(rename = "SPOUSE_OF")]
    SpouseOf,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParentOf => "PARENT_OF",
            Self::SpouseOf => "SPOUSE_OF",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

/// A stored relationship. For `ParentOf`, `from` is the parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: PersonId,
    pub to: PersonId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

#[cfg(test)]
impl Edge {
    pub fn new(from: impl Into<PersonId>, to: impl Into<PersonId>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub family_id: FamilyId,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonView {
    pub id: PersonId,
    pub name: String,
    pub family_id: FamilyId,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub can_edit: bool,
}
