//! Canned-response FAQ assistant.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::render::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    Greeting,
    Passwords,
    Threats,
    Reporting,
    Events,
    Resources,
    SancharSaathi,
    Help,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub topic: Topic,
    /// Reply body as an HTML fragment.
    pub html: String,
}

/// Keyword groups, checked in order; the first group with a match answers.
const GROUPS: &[(Topic, &[&str])] = &[
    (
        Topic::Greeting,
        &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"],
    ),
    (
        Topic::Passwords,
        &["password", "passwords", "strong password", "password tips", "create password"],
    ),
    (
        Topic::Threats,
        &["threats", "cyber threats", "malware", "virus", "phishing", "scam"],
    ),
    (
        Topic::Reporting,
        &["report", "cybercrime", "fraud", "helpline", "police"],
    ),
    (
        Topic::Events,
        &["events", "event", "workshop", "training", "seminar", "show me events"],
    ),
    (
        Topic::Resources,
        &["resources", "learn", "education", "courses", "tools"],
    ),
    (
        Topic::SancharSaathi,
        &["sanchar saathi", "mobile app", "phone security", "sim card"],
    ),
    (
        Topic::Help,
        &["help", "support", "what can you do", "assist"],
    ),
];

/// One whole-word matcher per group, so `hi` does not fire on `phishing`.
static MATCHERS: Lazy<Vec<(Topic, Regex)>> = Lazy::new(|| {
    GROUPS
        .iter()
        .filter_map(|(topic, words)| {
            let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
                .ok()
                .map(|re| (*topic, re))
        })
        .collect()
});

/// URLs stop at whitespace, quotes and angle brackets of the raw text.
static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<url>https?://[^\s<>"']+)|(?P<email>[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})"#)
        .unwrap()
});

pub fn classify(message: &str) -> Topic {
    MATCHERS
        .iter()
        .find(|(_, re)| re.is_match(message))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::Unknown)
}

/// Answer a visitor question. Blank input gets no reply.
pub fn respond(message: &str) -> Option<Reply> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    let topic = classify(message);
    let html = match topic {
        Topic::Unknown => format!(
            "I understand you're asking about \"{}\". While I'm still learning, I can help you with:{}Could you rephrase your question or try one of the quick action buttons above?",
            escape_html(message),
            bullets(&[
                "Password security tips",
                "Common cyber threats",
                "How to report cybercrimes",
                "Our educational resources",
                "Upcoming events",
            ])
        ),
        known => canned(known),
    };
    Some(Reply { topic, html })
}

/// Escape a visitor message for display and turn URLs and email addresses
/// into links. Links are found in the raw text and every piece is escaped on
/// its own.
pub fn format_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in LINK.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&escape_html(&text[last..m.start()]));
        let shown = escape_html(m.as_str());
        if caps.name("url").is_some() {
            out.push_str(&format!(
                "<a href=\"{shown}\" target=\"_blank\" rel=\"noopener\">{shown}</a>"
            ));
        } else {
            out.push_str(&format!("<a href=\"mailto:{shown}\">{shown}</a>"));
        }
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

fn bullets(lines: &[&str]) -> String {
    let items: String = lines.iter().map(|l| format!("<li>{l}</li>")).collect();
    format!("<ul>{items}</ul>")
}

fn canned(topic: Topic) -> String {
    match topic {
        Topic::Greeting => {
            "Hello! I'm your Cyber Ranger Assistant. How can I help you stay safe online today?".into()
        }
        Topic::Passwords => format!(
            "Here are some password security tips:{}You can also use our <a href=\"password-checker.html\">Password Checker Tool</a> to test your password strength!",
            bullets(&[
                "Use at least 12 characters with a mix of letters, numbers, and symbols",
                "Avoid common words, personal information, or patterns",
                "Use unique passwords for each account",
                "Consider using a password manager",
                "Enable two-factor authentication when available",
            ])
        ),
        Topic::Threats => format!(
            "Common cyber threats include:{}Stay alert and verify before you click or pay.",
            bullets(&[
                "<strong>Phishing:</strong> Fake emails/messages trying to steal your information",
                "<strong>Malware:</strong> Malicious software that can damage your device",
                "<strong>Ransomware:</strong> Software that locks your files until you pay",
                "<strong>Social Engineering:</strong> Manipulation to trick you into revealing information",
                "<strong>Identity Theft:</strong> Using your personal information fraudulently",
            ])
        ),
        Topic::Reporting => format!(
            "To report cybercrime in Goa:{}Remember to save evidence like screenshots, emails, or messages before reporting!",
            bullets(&[
                "<strong>Emergency:</strong> Dial 1930 (National Cyber Crime Helpline)",
                "<strong>Goa Police Cyber Cell:</strong> 0832 244 3201",
                "<strong>Email:</strong> picyber@goapolice.gov.in",
                "<strong>Location:</strong> Cyber Crime Police Station, Ribandar, Goa",
                "<strong>Online:</strong> Visit <a href=\"https://cybercrime.gov.in/\" target=\"_blank\">cybercrime.gov.in</a>",
            ])
        ),
        Topic::Events => format!(
            "We have several cybersecurity events coming up! Check out our <a href=\"events.html\">Events page</a> for:{}All events are free and open to the public. Register early as spaces are limited!",
            bullets(&[
                "Cybersecurity workshops across Goa",
                "Digital banking security seminars",
                "Senior citizen cyber safety programs",
                "Student awareness workshops",
                "Small business training sessions",
            ])
        ),
        Topic::Resources => format!(
            "We offer various cybersecurity resources:{}All resources are free and designed to help you stay safe online!",
            bullets(&[
                "<a href=\"courses.html\">Learning Center</a> - Free cybersecurity courses",
                "<a href=\"Sanchar_saathi.html\">Sanchar Saathi</a> - Mobile security app",
                "<a href=\"cyber-news.html\">Cyber News</a> - Latest threat updates",
                "<a href=\"cyber-myths.html\">Cyber Myths</a> - Debunking false information",
                "<a href=\"password-checker.html\">Password Checker</a> - Test your password strength",
            ])
        ),
        Topic::SancharSaathi => format!(
            "Sanchar Saathi is a mobile security app by the Department of Telecommunications:{}Learn more about it on our <a href=\"Sanchar_saathi.html\">Sanchar Saathi page</a>!",
            bullets(&[
                "Block lost or stolen phones",
                "Verify mobile connections",
                "Report suspicious activities",
                "Get security alerts",
            ])
        ),
        Topic::Help => format!(
            "I can help you with:{}Just ask me anything about cybersecurity!",
            bullets(&[
                "Cybersecurity questions and advice",
                "Password security tips",
                "How to report cybercrimes",
                "Finding educational resources",
                "Information about our events",
                "General online safety guidance",
            ])
        ),
        Topic::Unknown => String::new(),
    }
}
