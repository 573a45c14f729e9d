use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The three per-user collections the dashboard observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Expenses,
    Subscriptions,
    Investments,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Expenses,
        Collection::Subscriptions,
        Collection::Investments,
    ];

    /// Collection name as known to the document store.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Expenses => "expenses",
            Collection::Subscriptions => "subscriptions",
            Collection::Investments => "investments",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A document as delivered by the store: identifier plus untyped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,

    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a document from a JSON object literal. Non-object values yield no fields.
    pub fn from_json(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A complete, point-in-time listing of one collection for one user.
///
/// Each snapshot replaces the previous one; a document missing here has
/// been removed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub collection: Collection,
    pub documents: Vec<RawDocument>,
}

impl Snapshot {
    pub fn new(collection: Collection, documents: Vec<RawDocument>) -> Self {
        Self {
            collection,
            documents,
        }
    }

    pub fn empty(collection: Collection) -> Self {
        Self::new(collection, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.id.as_str())
    }
}

/// One delivery from the change source. Errors arrive as their own
/// variant; they do not end the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Snapshot(Snapshot),
    Error(String),
}
