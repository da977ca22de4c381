//! Record normalizer: turns a [`PartialItem`] into a fully populated [`Item`].
//!
//! Remote documents are externally editable and schema-less, so nothing here
//! fails. Missing fields and wrong shapes fall back to the defaults below.

use serde_json::Value;

use crate::record::{Contact, Item, PartialItem};

pub const UNTITLED: &str = "Untitled";
/// Placeholder for absent category and meta fields.
pub const PLACEHOLDER: &str = "—";
pub const DEFAULT_STATUS: &str = "upcoming";
pub const DEFAULT_SUMMARY: &str = "No description provided.";
pub const DEFAULT_DETAIL: &str = "Details will be announced soon.";
pub const DEFAULT_ORGANIZER: &str = "Cyber Ranger Team";

/// Normalize a raw record. Total: every field of the result is populated.
pub fn normalize(raw: &PartialItem) -> Item {
    let title = text(raw.get("title"))
        .or_else(|| text(raw.get("action")))
        .unwrap_or_else(|| UNTITLED.to_string());
    let poster_url = text(raw.get("posterUrl")).or_else(|| text(raw.get("image")));
    let image_alt = text(raw.get("imageAlt")).unwrap_or_else(|| title.clone());
    Item {
        id: text(raw.get("id")).unwrap_or_default(),
        location: or_placeholder(raw.get("location")),
        region: or_placeholder(raw.get("region")),
        kind: or_placeholder(raw.get("type")),
        status: text(raw.get("status"))
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        date: text(raw.get("date")).unwrap_or_default(),
        time: or_placeholder(raw.get("time")),
        venue: or_placeholder(raw.get("venue")),
        capacity: or_placeholder(raw.get("capacity")),
        category: or_placeholder(raw.get("category")),
        tag: text(raw.get("categoryTag")),
        duration: or_placeholder(raw.get("duration")),
        level: or_placeholder(raw.get("level")),
        summary: text(raw.get("summary"))
            .or_else(|| text(raw.get("description")))
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        details: ["details", "tips", "topics", "features"]
            .iter()
            .find_map(|key| lines(raw.get(key)))
            .unwrap_or_else(|| vec![DEFAULT_DETAIL.to_string()]),
        keywords: lines(raw.get("keywords")).unwrap_or_default(),
        contact: contact(raw.get("contact")),
        created_at: text(raw.get("createdAt")).unwrap_or_default(),
        poster_url,
        image_alt,
        reference: text(raw.get("reference"))
            .or_else(|| raw.get("reference").and_then(|r| text(r.get("link"))))
            .or_else(|| text(raw.get("link"))),
        reference_label: raw.get("reference").and_then(|r| text(r.get("text"))),
        title,
    }
}

/// Normalize a batch, keeping order.
pub fn normalize_all<I>(raws: I) -> Vec<Item>
where
    I: IntoIterator,
    I::Item: Into<PartialItem>,
{
    raws.into_iter().map(|r| normalize(&r.into())).collect()
}

/// Trimmed, non-empty text. Numbers and booleans are rendered as text.
fn text(val: Option<&Value>) -> Option<String> {
    let s = match val? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn or_placeholder(val: Option<&Value>) -> String {
    text(val).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Ordered list of strings. A plain string is a one-element list; non-text
/// entries are dropped and an empty result counts as absent.
fn lines(val: Option<&Value>) -> Option<Vec<String>> {
    let out: Vec<String> = match val? {
        Value::Array(arr) => arr.iter().filter_map(|v| text(Some(v))).collect(),
        other => text(Some(other)).into_iter().collect(),
    };
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn contact(val: Option<&Value>) -> Contact {
    let field = |key: &str| val.and_then(|v| v.get(key)).and_then(|v| text(Some(v)));
    Contact {
        organizer: field("organizer").unwrap_or_else(|| DEFAULT_ORGANIZER.to_string()),
        phone: field("phone").unwrap_or_else(|| PLACEHOLDER.to_string()),
        email: field("email").unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn populated(item: &Item) -> bool {
        !item.title.is_empty()
            && !item.location.is_empty()
            && !item.region.is_empty()
            && !item.kind.is_empty()
            && !item.status.is_empty()
            && !item.time.is_empty()
            && !item.venue.is_empty()
            && !item.capacity.is_empty()
            && !item.category.is_empty()
            && !item.duration.is_empty()
            && !item.level.is_empty()
            && !item.summary.is_empty()
            && !item.details.is_empty()
            && item.details.iter().all(|d| !d.is_empty())
            && !item.contact.organizer.is_empty()
            && !item.contact.phone.is_empty()
            && !item.contact.email.is_empty()
            && !item.image_alt.is_empty()
    }

    #[test]
    fn malformed_inputs_are_fully_populated() {
        let inputs = [
            json!(null),
            json!({}),
            json!([1, 2, 3]),
            json!("just text"),
            json!({ "title": null, "details": "not a list", "contact": "nobody" }),
            json!({ "title": "", "details": [], "tips": [null, 4], "contact": { "phone": 7 } }),
            json!({ "title": "   ", "status": 3, "location": ["Panjim"], "date": {} }),
            json!({ "summary": { "nested": true }, "details": [[], {}, ""], "contact": [] }),
        ];
        for input in inputs {
            let item = normalize(&PartialItem::from(input.clone()));
            assert!(populated(&item), "not populated for {input}: {item:?}");
        }
    }

    #[test]
    fn applies_documented_defaults() {
        let item = normalize(&PartialItem::default());
        assert_eq!(item.title, UNTITLED);
        assert_eq!(item.location, PLACEHOLDER);
        assert_eq!(item.status, DEFAULT_STATUS);
        assert_eq!(item.date, "");
        assert_eq!(item.details, vec![DEFAULT_DETAIL.to_string()]);
        assert_eq!(item.contact.organizer, DEFAULT_ORGANIZER);
        assert_eq!(item.poster_url, None);
        assert_eq!(item.image_alt, UNTITLED);
    }

    #[test]
    fn keeps_well_formed_fields() {
        let raw = PartialItem::from(json!({
            "id": "r1",
            "title": "  Live Seminar ",
            "location": "Margao",
            "type": "Seminar",
            "status": "ONGOING",
            "date": "2025-02-20",
            "details": ["UPI safety", 12, "Fake apps"],
            "contact": { "organizer": "Goa Police Cyber Cell", "email": "picyber@goapolice.gov.in" },
            "posterUrl": "https://example.org/poster.png",
            "createdAt": "2025-01-05T10:00:00.000Z"
        }));
        let item = normalize(&raw);
        assert_eq!(item.id, "r1");
        assert_eq!(item.title, "Live Seminar");
        assert_eq!(item.kind, "Seminar");
        assert_eq!(item.status, "ongoing");
        assert_eq!(item.details, vec!["UPI safety", "12", "Fake apps"]);
        assert_eq!(item.contact.organizer, "Goa Police Cyber Cell");
        assert_eq!(item.contact.phone, PLACEHOLDER);
        assert_eq!(item.poster_url.as_deref(), Some("https://example.org/poster.png"));
        assert_eq!(item.created_at, "2025-01-05T10:00:00.000Z");
    }

    #[test]
    fn tips_and_image_cover_news_records() {
        let item = normalize(&PartialItem::from(json!({
            "title": "Fake SIMs",
            "region": "India",
            "tips": "Never share Aadhaar photos.",
            "image": "https://example.org/sim.jpg",
            "imageAlt": "SIM cards"
        })));
        assert_eq!(item.details, vec!["Never share Aadhaar photos."]);
        assert_eq!(item.poster_url.as_deref(), Some("https://example.org/sim.jpg"));
        assert_eq!(item.image_alt, "SIM cards");
        assert_eq!(item.region, "India");
    }

    #[test]
    fn tool_entries_map_onto_item_fields() {
        let item = normalize(&PartialItem::from(json!({
            "action": "Block Stolen Phone",
            "category": "Telecom Hub",
            "categoryTag": "Government Official",
            "description": "Block a lost handset through CEIR.",
            "link": "https://www.ceir.gov.in/Home/index.jsp",
            "keywords": ["phone", "ceir", 3, ""]
        })));
        assert_eq!(item.title, "Block Stolen Phone");
        assert_eq!(item.category, "Telecom Hub");
        assert_eq!(item.tag.as_deref(), Some("Government Official"));
        assert_eq!(item.summary, "Block a lost handset through CEIR.");
        assert_eq!(item.reference.as_deref(), Some("https://www.ceir.gov.in/Home/index.jsp"));
        assert_eq!(item.keywords, ["phone", "ceir", "3"]);
    }

    #[test]
    fn course_topics_and_reference_object() {
        let item = normalize(&PartialItem::from(json!({
            "title": "Mobile Security Essentials",
            "duration": "2 hours",
            "level": "Beginner",
            "topics": ["App permissions"],
            "reference": { "text": "Guide", "link": "https://www.csk.gov.in/alerts.html" }
        })));
        assert_eq!(item.details, ["App permissions"]);
        assert_eq!(item.duration, "2 hours");
        assert_eq!(item.level, "Beginner");
        assert_eq!(item.reference.as_deref(), Some("https://www.csk.gov.in/alerts.html"));
        assert_eq!(item.reference_label.as_deref(), Some("Guide"));
        assert!(item.keywords.is_empty());
    }

    #[test]
    fn unparseable_date_is_kept_verbatim() {
        let item = normalize(&PartialItem::from(json!({ "date": "sometime in March" })));
        assert_eq!(item.date, "sometime in March");
    }
}
