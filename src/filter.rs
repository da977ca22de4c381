//! Filter and search predicates applied to a merged collection.

use serde::{Deserialize, Serialize};

use crate::{normalize::PLACEHOLDER, record::Item};

/// Status values that filter chips treat as status filters rather than
/// category filters.
pub const STATUS_TOKENS: [&str; 3] = ["upcoming", "ongoing", "completed"];

/// The single active filter or search predicate of a view.
///
/// Applying a new spec replaces the previous one; specs never compose.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSpec {
    /// Identity.
    #[default]
    All,
    /// Case-insensitive exact match on the normalized status.
    Status(String),
    /// Case-insensitive substring match on the view's category field.
    Category(String),
    /// Case-insensitive substring match on title, summary, the category
    /// field, type, tool section or any keyword. A blank term behaves like
    /// [`FilterSpec::All`].
    Search(String),
}

impl FilterSpec {
    /// Translate a filter chip token (`all`, a status, or a category value).
    pub fn from_token(token: &str) -> Self {
        let t = token.trim().to_lowercase();
        if t.is_empty() || t == "all" {
            FilterSpec::All
        } else if STATUS_TOKENS.contains(&t.as_str()) {
            FilterSpec::Status(t)
        } else {
            FilterSpec::Category(t)
        }
    }

    /// Chip token that should be shown as active, if a chip drives this spec.
    pub fn token(&self) -> Option<String> {
        match self {
            FilterSpec::All => Some("all".into()),
            FilterSpec::Status(v) | FilterSpec::Category(v) => Some(v.to_lowercase()),
            FilterSpec::Search(_) => None,
        }
    }

    /// True when the spec lets every item through.
    pub fn is_identity(&self) -> bool {
        match self {
            FilterSpec::All => true,
            FilterSpec::Search(term) => term.trim().is_empty(),
            _ => false,
        }
    }

    fn matches(&self, item: &Item, field: CategoryField) -> bool {
        match self {
            FilterSpec::All => true,
            FilterSpec::Status(v) => item.status.trim().eq_ignore_ascii_case(v.trim()),
            FilterSpec::Category(v) => contains(field.value(item), v.trim()),
            FilterSpec::Search(term) => {
                let term = term.trim();
                term.is_empty()
                    || contains(&item.title, term)
                    || contains(&item.summary, term)
                    || contains(field.value(item), term)
                    || contains(&item.kind, term)
                    || contains(&item.category, term)
                    || item.keywords.iter().any(|k| contains(k, term))
            }
        }
    }
}

/// Which item field a view treats as its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryField {
    /// Events filter by town.
    #[default]
    Location,
    /// News filters by region (Goa / India).
    Region,
    Type,
    /// Tool directory sections.
    Category,
}

impl CategoryField {
    pub fn value<'a>(&self, item: &'a Item) -> &'a str {
        match self {
            CategoryField::Location => &item.location,
            CategoryField::Region => &item.region,
            CategoryField::Type => &item.kind,
            CategoryField::Category => &item.category,
        }
    }
}

/// Keep the items matching `spec`, preserving order.
pub fn apply(items: &[Item], spec: &FilterSpec, field: CategoryField) -> Vec<Item> {
    if spec.is_identity() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| spec.matches(item, field))
        .cloned()
        .collect()
}

/// Distinct lowercase category values in first-seen order, used to build the
/// dynamic filter chips. The placeholder value is skipped.
pub fn category_tokens(items: &[Item], field: CategoryField) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let value = field.value(item).trim();
        if value.is_empty() || value == PLACEHOLDER {
            continue;
        }
        let token = value.to_lowercase();
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
