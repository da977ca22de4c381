//! Heuristic password strength scoring.
//!
//! Nothing here ever leaves the process; the analyzer only looks at the
//! shape of the password.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").unwrap());
static LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").unwrap());
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());
static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]"#).unwrap());
static COMMON_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)123456|password|qwerty|abc123|admin|letmein|welcome|monkey|dragon|master")
        .unwrap()
});

const SEQUENCES: [&str; 4] = ["abcdefghijklmnopqrstuvwxyz", "0123456789", "qwertyuiop", "asdfghjkl"];
const COMMON_WORDS: [&str; 8] = ["password", "admin", "user", "login", "welcome", "hello", "test", "demo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strength {
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
}

impl Strength {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Strength::Strong,
            70..=89 => Strength::Good,
            50..=69 => Strength::Fair,
            30..=49 => Strength::Weak,
            _ => Strength::VeryWeak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::VeryWeak => "Very Weak",
            Strength::Weak => "Weak",
            Strength::Fair => "Fair",
            Strength::Good => "Good",
            Strength::Strong => "Strong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub length: usize,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_numbers: bool,
    pub has_symbols: bool,
    pub has_common_patterns: bool,
    pub has_repeated_chars: bool,
    pub has_sequential_chars: bool,
    pub has_common_words: bool,
    pub score: u32,
    pub strength: Strength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub label: &'static str,
    pub valid: bool,
}

pub fn analyze(password: &str) -> Analysis {
    let length = password.chars().count();
    let mut a = Analysis {
        length,
        has_uppercase: UPPER.is_match(password),
        has_lowercase: LOWER.is_match(password),
        has_numbers: DIGIT.is_match(password),
        has_symbols: SYMBOL.is_match(password),
        has_common_patterns: COMMON_PATTERN.is_match(password),
        has_repeated_chars: has_run(password, 3),
        has_sequential_chars: has_sequence(password),
        has_common_words: has_common_word(password),
        score: 0,
        strength: Strength::VeryWeak,
    };
    let bonus = |cond: bool, points: u32| if cond { points } else { 0 };
    a.score = bonus(length >= 8, 20)
        + bonus(length >= 12, 10)
        + bonus(length >= 16, 10)
        + bonus(a.has_uppercase, 15)
        + bonus(a.has_lowercase, 15)
        + bonus(a.has_numbers, 15)
        + bonus(a.has_symbols, 15)
        + bonus(!a.has_common_patterns, 10)
        + bonus(!a.has_repeated_chars, 10)
        + bonus(!a.has_sequential_chars, 10)
        + bonus(!a.has_common_words, 10);
    a.strength = Strength::from_score(a.score);
    a
}

impl Analysis {
    /// The checklist shown under the meter.
    pub fn checks(&self) -> Vec<Check> {
        vec![
            Check { label: "Length (8+ chars)", valid: self.length >= 8 },
            Check { label: "Uppercase Letters", valid: self.has_uppercase },
            Check { label: "Lowercase Letters", valid: self.has_lowercase },
            Check { label: "Numbers", valid: self.has_numbers },
            Check { label: "Special Characters", valid: self.has_symbols },
            Check { label: "No Common Patterns", valid: !self.has_common_patterns },
        ]
    }

    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut recs = vec![];
        if self.length < 8 {
            recs.push("Use at least 8 characters for better security");
        }
        if self.length < 12 {
            recs.push("Consider using 12+ characters for maximum security");
        }
        if !self.has_uppercase {
            recs.push("Include uppercase letters (A-Z)");
        }
        if !self.has_lowercase {
            recs.push("Include lowercase letters (a-z)");
        }
        if !self.has_numbers {
            recs.push("Add numbers (0-9) to your password");
        }
        if !self.has_symbols {
            recs.push("Include special characters (!@#$%^&*)");
        }
        if self.has_common_patterns {
            recs.push("Avoid common patterns like \"123456\" or \"password\"");
        }
        if self.has_repeated_chars {
            recs.push("Avoid repeating characters (aaa, 111)");
        }
        if self.has_sequential_chars {
            recs.push("Avoid sequential characters (abc, 123)");
        }
        if self.has_common_words {
            recs.push("Avoid common dictionary words");
        }
        if recs.is_empty() {
            recs.push("Excellent! Your password meets all security requirements");
        }
        recs
    }
}

/// Same character `n` or more times in a row.
fn has_run(s: &str, n: usize) -> bool {
    let mut prev = None;
    let mut run = 0;
    for c in s.chars() {
        run = if Some(c) == prev { run + 1 } else { 1 };
        if run >= n {
            return true;
        }
        prev = Some(c);
    }
    false
}

/// Any three consecutive characters of a keyboard or alphabet sequence.
fn has_sequence(s: &str) -> bool {
    let lower = s.to_lowercase();
    SEQUENCES.iter().any(|seq| {
        let seq = seq.as_bytes();
        seq.windows(3)
            .filter_map(|w| std::str::from_utf8(w).ok())
            .any(|w| lower.contains(w))
    })
}

fn has_common_word(s: &str) -> bool {
    let lower = s.to_lowercase();
    COMMON_WORDS.iter().any(|w| lower.contains(w))
}
