//! Full-replace rendering of normalized items into HTML card nodes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::Item;

/// Text of the node shown when a filter leaves nothing to display.
pub const NO_RESULTS: &str = "No results found.";

/// Everything a reconciler needs for one repaint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub items: Vec<Item>,
    /// Non-blocking notice shown ahead of the cards (subscription failures).
    pub notice: Option<String>,
}

/// Repaints a view from scratch on every frame.
pub trait Reconciler {
    fn render(&mut self, frame: &Frame);
}

/// Entrance-reveal state of a card node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reveal {
    Hidden,
    Visible,
}

impl Reveal {
    pub fn style(self) -> &'static str {
        match self {
            Reveal::Hidden => "opacity: 0; transform: translateY(20px)",
            Reveal::Visible => "opacity: 1; transform: translateY(0)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub html: String,
    pub reveal: Reveal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum Node {
    Card(Card),
    NoResults { text: String },
    Notice { text: String },
}

/// Card layout used by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTemplate {
    #[default]
    Event,
    News,
    /// Action Hub directory entry with a call-to-action link.
    Tool,
    Course,
    /// Key-point card (Sanchar Saathi pages).
    Info,
}

impl CardTemplate {
    pub fn card_html(self, item: &Item) -> String {
        match self {
            CardTemplate::Event => event_card(item),
            CardTemplate::News => news_card(item),
            CardTemplate::Tool => tool_card(item),
            CardTemplate::Course => course_card(item),
            CardTemplate::Info => info_card(item),
        }
    }
}

/// Play Store and App Store pages linked from a `Download` info card.
pub const APP_DOWNLOADS: [(&str, &str); 2] = [
    (
        "Download for Android",
        "https://play.google.com/store/apps/details?id=com.dot.app.sancharsaathi",
    ),
    (
        "Download for iOS",
        "https://apps.apple.com/in/app/sanchar-saathi/id6739700695",
    ),
];

/// In-memory reconciler producing escaped HTML nodes.
#[derive(Debug, Default)]
pub struct HtmlReconciler {
    template: CardTemplate,
    nodes: Vec<Node>,
    renders: usize,
}

impl HtmlReconciler {
    pub fn new(template: CardTemplate) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Card(c) => Some(c),
            _ => None,
        })
    }

    pub fn titles(&self) -> Vec<&str> {
        self.cards().map(|c| c.title.as_str()).collect()
    }

    pub fn has_no_results(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::NoResults { .. }))
    }

    pub fn notice(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match n {
            Node::Notice { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of frames rendered so far.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Mark the `index`-th card as having entered the viewport. Returns
    /// `true` only the first time a given card is revealed.
    pub fn reveal(&mut self, index: usize) -> bool {
        match self.cards_mut().nth(index) {
            Some(card) if card.reveal == Reveal::Hidden => {
                card.reveal = Reveal::Visible;
                true
            }
            _ => false,
        }
    }

    fn cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.nodes.iter_mut().filter_map(|n| match n {
            Node::Card(c) => Some(c),
            _ => None,
        })
    }

    /// Serialize the current nodes as an HTML fragment.
    pub fn html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Card(card) => out.push_str(&format!(
                    "<article class=\"card\" data-id=\"{}\" style=\"{}\">{}</article>\n",
                    escape_html(&card.id),
                    card.reveal.style(),
                    card.html
                )),
                Node::NoResults { text } => out.push_str(&format!(
                    "<div class=\"no-results\">{}</div>\n",
                    escape_html(text)
                )),
                Node::Notice { text } => out.push_str(&format!(
                    "<div class=\"notice\" role=\"status\">{}</div>\n",
                    escape_html(text)
                )),
            }
        }
        out
    }
}

impl Reconciler for HtmlReconciler {
    fn render(&mut self, frame: &Frame) {
        self.renders += 1;
        self.nodes.clear();
        if let Some(notice) = &frame.notice {
            self.nodes.push(Node::Notice {
                text: notice.clone(),
            });
        }
        if frame.items.is_empty() {
            self.nodes.push(Node::NoResults {
                text: NO_RESULTS.to_string(),
            });
            return;
        }
        for item in &frame.items {
            self.nodes.push(Node::Card(Card {
                id: item.id.clone(),
                title: item.title.clone(),
                html: self.template.card_html(item),
                reveal: Reveal::Hidden,
            }));
        }
    }
}

/// Escape text for HTML element and attribute contexts.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `2025-02-15` becomes `Feb 15, 2025`; anything unparseable is shown as is.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Human label for a news `type` slug.
pub fn type_label(kind: &str) -> &str {
    match kind {
        "impersonation" => "Impersonation Scam",
        "website-defacement" => "Website Hack",
        "financial-fraud" => "Financial Fraud",
        "sim-aadhaar-misuse" => "SIM / Aadhaar Misuse",
        "ai-phishing-trend" => "AI / Phishing Trend",
        "senior-targeted" => "Seniors Targeted",
        other => other,
    }
}

fn list(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| format!("<li>{}</li>", escape_html(l)))
        .collect()
}

fn poster(item: &Item) -> String {
    match &item.poster_url {
        Some(url) => format!(
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            escape_html(url),
            escape_html(&item.image_alt)
        ),
        None => String::new(),
    }
}

fn event_card(item: &Item) -> String {
    let e = |s: &str| escape_html(s);
    let c = &item.contact;
    format!(
        concat!(
            "{poster}",
            "<div class=\"card-header\"><h3>{title}</h3><div class=\"event-type\">{kind}</div></div>",
            "<div class=\"meta\">",
            "<span class=\"event-date\">{date}</span>",
            "<span class=\"event-time\">{time}</span>",
            "<span class=\"event-location\">{location}</span>",
            "<span class=\"event-capacity\">{capacity}</span>",
            "<span class=\"event-status status-{status}\">{status}</span>",
            "</div>",
            "<div class=\"summary\">{summary}</div>",
            "<div class=\"event-details\"><strong>What You'll Learn:</strong><ul>{details}</ul></div>",
            "<div class=\"event-contact\"><strong>Contact:</strong> <span>{organizer}</span><br>",
            "<a href=\"tel:{phone}\">{phone}</a> | <a href=\"mailto:{email}\">{email}</a></div>",
            "<div class=\"event-contact\"><strong>Venue:</strong> {venue}</div>",
        ),
        poster = poster(item),
        title = e(&item.title),
        kind = e(&item.kind),
        date = e(&format_date(&item.date)),
        time = e(&item.time),
        location = e(&item.location),
        capacity = e(&item.capacity),
        status = e(&item.status),
        summary = e(&item.summary),
        details = list(&item.details),
        organizer = e(&c.organizer),
        phone = e(&c.phone),
        email = e(&c.email),
        venue = e(&item.venue),
    )
}

fn news_card(item: &Item) -> String {
    let e = |s: &str| escape_html(s);
    let reference = match &item.reference {
        Some(url) => format!(
            "<div class=\"reference\"><strong>Source:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Read full article</a></div>",
            e(url)
        ),
        None => String::new(),
    };
    format!(
        concat!(
            "<div class=\"card-image\">{poster}<div class=\"card-type-overlay\">{overlay}</div></div>",
            "<div class=\"card-content\"><div class=\"card-header\"><h3>{title}</h3>",
            "<div class=\"meta\"><span>{region}</span><span>•</span><span>{date}</span>",
            "<span class=\"tag\">{label}</span></div></div>",
            "<p class=\"summary\">{summary}</p>",
            "<div class=\"tips\"><strong>How to protect</strong><ul>{tips}</ul></div>",
            "{reference}</div>",
        ),
        poster = poster(item),
        overlay = e(&item.kind.to_uppercase()),
        title = e(&item.title),
        region = e(&item.region),
        date = e(&format_date(&item.date)),
        label = e(type_label(&item.kind)),
        summary = e(&item.summary),
        tips = list(&item.details),
        reference = reference,
    )
}

/// Icon colour class for a tool directory section.
fn tool_color(category: &str) -> &'static str {
    match category {
        "Financial Safety" => "gold",
        "Telecom Hub" => "cyan",
        "Reporting" => "red",
        _ => "blue",
    }
}

fn reference_link(item: &Item, fallback: &str) -> String {
    match &item.reference {
        Some(url) => format!(
            "<div class=\"reference\"><strong>Reference:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></div>",
            escape_html(url),
            escape_html(item.reference_label.as_deref().unwrap_or(fallback))
        ),
        None => String::new(),
    }
}

fn tool_card(item: &Item) -> String {
    let e = |s: &str| escape_html(s);
    let color = tool_color(&item.category);
    let cta = match &item.reference {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"tool-cta\"><span>Take Action</span></a>",
            e(url)
        ),
        None => String::new(),
    };
    format!(
        concat!(
            "<div class=\"tool-header\"><div class=\"tool-icon icon-{color}\"></div>",
            "<div class=\"tool-meta\"><span class=\"category-tag category-{color}\">{tag}</span></div></div>",
            "<div class=\"tool-content\"><h3 class=\"tool-action\">{title}</h3>",
            "<p class=\"tool-description\">{summary}</p>{cta}</div>",
        ),
        color = color,
        tag = e(item.tag.as_deref().unwrap_or(&item.category)),
        title = e(&item.title),
        summary = e(&item.summary),
        cta = cta,
    )
}

fn course_card(item: &Item) -> String {
    let e = |s: &str| escape_html(s);
    format!(
        concat!(
            "<div class=\"card-header\"><h3>{title}</h3><div class=\"meta\">",
            "<span class=\"card-type\">{kind}</span>",
            "<span class=\"course-duration\">{duration}</span>",
            "<span class=\"course-level\">{level}</span></div></div>",
            "<div class=\"summary\">{summary}</div>",
            "<div class=\"course-topics\"><strong>What You'll Learn:</strong><ul>{topics}</ul></div>",
            "{reference}",
        ),
        title = e(&item.title),
        kind = e(&item.kind),
        duration = e(&item.duration),
        level = e(&item.level),
        summary = e(&item.summary),
        topics = list(&item.details),
        reference = reference_link(item, "Learn more"),
    )
}

fn info_card(item: &Item) -> String {
    let e = |s: &str| escape_html(s);
    let downloads = if item.kind == "Download" {
        let buttons: String = APP_DOWNLOADS
            .iter()
            .map(|(label, url)| {
                format!("<a href=\"{url}\" target=\"_blank\" class=\"download-btn\">{label}</a>")
            })
            .collect();
        format!("<div class=\"download-buttons\">{buttons}</div>")
    } else {
        String::new()
    };
    format!(
        concat!(
            "<div class=\"card-header\"><h3>{title}</h3><div class=\"meta\">",
            "<span class=\"card-type\">{kind}</span></div></div>",
            "<div class=\"summary\">{summary}</div>",
            "<div class=\"tips\"><strong>Key Points:</strong><ul>{points}</ul></div>",
            "{downloads}{reference}",
        ),
        title = e(&item.title),
        kind = e(&item.kind),
        summary = e(&item.summary),
        points = list(&item.details),
        downloads = downloads,
        reference = reference_link(item, "Official portal"),
    )
}
