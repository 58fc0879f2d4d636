//! Core data structures and types
//!
//! Two layers live here: the JSON:API document shapes the Services API
//! speaks, and the flat domain types the rest of the crate works with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// JSON:API documents
// ============================================================================

/// A single JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,

    #[serde(default)]
    pub links: Map<String, Value>,
}

impl Resource {
    /// String attribute by name
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Id of a to-one relationship, if linked
    pub fn related_id(&self, name: &str) -> Option<&str> {
        match self.relationships.get(name)?.data.as_ref()? {
            Linkage::One(identifier) => Some(identifier.id.as_str()),
            Linkage::Many(_) => None,
        }
    }
}

/// Relationship entry of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<Linkage>,
}

/// Resource linkage: either one identifier or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// `{ "type": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
}

/// Primary data that may be a single object or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

impl OneOrMany {
    /// Normalize to a list
    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            Self::Many(list) => list,
            Self::One(resource) => vec![*resource],
        }
    }
}

/// Top-level JSON:API document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,

    #[serde(default)]
    pub included: Vec<Resource>,
}

/// Live-session document returned by the navigation endpoints
pub type LiveSessionResponse = Document<Resource>;

// ============================================================================
// Domain types
// ============================================================================

/// A named grouping of plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: String,
    pub name: String,
}

impl ServiceType {
    /// Build from a `ServiceType` resource
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            name: resource.attr_str("name").unwrap_or_default().to_string(),
        }
    }
}

/// A scheduled plan belonging to exactly one service type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub service_type_id: String,
    pub dates: String,
    pub label: String,
}

impl Plan {
    /// Label disambiguating identically-dated plans
    pub fn make_label(service_type_name: &str, dates: &str, plan_id: &str) -> String {
        format!("{service_type_name} - {dates} ({plan_id})")
    }
}

/// Choice-list entry (id + display label)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Opaque identifier of a live session's controller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlToken(String);

impl ControlToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One item of a plan's live sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveItem {
    pub id: String,
    pub title: Option<String>,
}

/// Navigation direction for a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Endpoint name of the mutation
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Next => "go_to_next_item",
            Self::Previous => "go_to_previous_item",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
        }
    }
}

/// Host variable ids for the navigation summary
pub const VAR_PLAN_INDEX: &str = "plan_index";
pub const VAR_PLAN_LENGTH: &str = "plan_length";
pub const VAR_PLAN_CURRENT_ITEM: &str = "plan_currentitem";
pub const VAR_PLAN_NEXT_ITEM: &str = "plan_nextitem";

/// Flat summary of where a live session stands
///
/// `index` is only meaningful against the item sequence it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub index: usize,
    pub length: usize,
    pub current_item_title: String,
    pub next_item_title: Option<String>,
}

impl NavigationState {
    /// Render the host variables
    pub fn variables(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (VAR_PLAN_INDEX, self.index.to_string()),
            (VAR_PLAN_LENGTH, self.length.to_string()),
            (VAR_PLAN_CURRENT_ITEM, self.current_item_title.clone()),
            (
                VAR_PLAN_NEXT_ITEM,
                self.next_item_title.clone().unwrap_or_default(),
            ),
        ])
    }

    /// Host variables when there is no current item
    pub fn empty_variables() -> BTreeMap<&'static str, String> {
        [
            VAR_PLAN_INDEX,
            VAR_PLAN_LENGTH,
            VAR_PLAN_CURRENT_ITEM,
            VAR_PLAN_NEXT_ITEM,
        ]
        .into_iter()
        .map(|id| (id, String::new()))
        .collect()
    }
}
