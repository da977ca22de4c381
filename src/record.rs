//! Document and item models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document as persisted by the store and delivered in snapshots.
///
/// Documents are schema-less: apart from the store-assigned `id` and the
/// producer-assigned `createdAt`, every field is kept verbatim.
///
/// ```json
/// {
///   "id": "3f2a9c41d0b7e65a18c2",
///   "createdAt": "2025-02-01T09:30:00.000Z",
///   "title": "Phishing Awareness Workshop",
///   "location": "Margao",
///   "status": "upcoming"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document {
    /// Identifier assigned by the store (truncated SHA-256 hex).
    #[serde(default)]
    pub id: String,
    /// Sortable ISO-8601 timestamp captured by the producer at write time.
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    /// Remaining free-form fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Leniently decode one snapshot entry, skipping anything that is not an object.
    pub fn from_value(val: Value) -> Option<Self> {
        match val {
            Value::Object(_) => serde_json::from_value(val).ok(),
            _ => None,
        }
    }
}

/// Raw, loosely typed record handed to the normalizer.
///
/// Any field may be missing or have the wrong shape. Nothing but
/// [`crate::normalize::normalize`] is supposed to look inside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialItem(pub Map<String, Value>);

impl PartialItem {
    /// Borrow a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Document> for PartialItem {
    fn from(doc: Document) -> Self {
        let mut map = doc.fields;
        map.insert("id".into(), Value::String(doc.id));
        map.insert("createdAt".into(), Value::String(doc.created_at));
        PartialItem(map)
    }
}

impl From<Value> for PartialItem {
    fn from(val: Value) -> Self {
        match val {
            Value::Object(map) => PartialItem(map),
            _ => PartialItem::default(),
        }
    }
}

/// Organizer contact block shown on event cards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Contact {
    pub organizer: String,
    pub phone: String,
    pub email: String,
}

/// Fully normalized display record: an event, a news article, a tool
/// directory entry, a course or an information card.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    /// `title`, or a tool's `action`.
    pub title: String,
    pub location: String,
    pub region: String,
    /// The record's `type` field (workshop, seminar, impersonation, ...).
    pub kind: String,
    pub status: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub capacity: String,
    /// Tool directory section (Financial Safety, Telecom Hub, ...).
    pub category: String,
    /// Badge shown on tool cards.
    pub tag: Option<String>,
    pub duration: String,
    pub level: String,
    /// `summary`, or a tool's `description`.
    pub summary: String,
    /// Event `details`, news `tips`, course `topics` or card `features`.
    pub details: Vec<String>,
    /// Extra search terms.
    pub keywords: Vec<String>,
    pub contact: Contact,
    pub created_at: String,
    pub poster_url: Option<String>,
    pub image_alt: String,
    /// Reference URL (`reference`, `reference.link` or a tool's `link`).
    pub reference: Option<String>,
    /// Link text from `reference.text`.
    pub reference_label: Option<String>,
}
