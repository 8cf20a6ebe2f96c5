//! Vendor-analyst meeting classification policy.
//!
//! Everything heuristic about "is this a Gartner call, what kind, with whom"
//! lives here so the rules can be tuned without touching aggregation.
//!
//! Precedence:
//! 1. An event is a vendor meeting when the summary or the description
//!    contains the vendor keyword (case-insensitive), or when any surviving
//!    attendee is a configured analyst.
//! 2. The sub-type is the first `inquiry` / `briefing` token in the summary;
//!    the description is only consulted when the summary has neither.
//! 3. The analyst name is the rest of the first `analyst:` line in the
//!    description, trimmed, or [`UNKNOWN_ANALYST`].

use std::collections::HashSet;

use regex::Regex;

use crate::models::{VendorClassification, VendorType};

/// Default vendor keyword.
pub const DEFAULT_VENDOR_KEYWORD: &str = "gartner";

/// Analyst name used when the description carries no `analyst:` line.
pub const UNKNOWN_ANALYST: &str = "Unknown";

/// Text and attendee facts a classifier may inspect.
#[derive(Debug, Clone, Copy)]
pub struct MeetingFacts<'a> {
    pub summary: Option<&'a str>,
    pub description: Option<&'a str>,
    /// Lower-cased, decline-filtered attendee emails.
    pub attendee_emails: &'a [String],
}

/// Decides whether an event is a vendor meeting and how to label it.
pub trait MeetingClassifier {
    /// Return `Some` for vendor meetings, `None` otherwise.
    fn classify(&self, facts: &MeetingFacts<'_>) -> Option<VendorClassification>;
}

// ── GartnerClassifier ─────────────────────────────────────────────────────────

/// Keyword + analyst-roster classifier.
#[derive(Debug, Clone)]
pub struct GartnerClassifier {
    keyword: String,
    analysts: HashSet<String>,
    type_re: Regex,
    analyst_re: Regex,
}

impl GartnerClassifier {
    /// Build a classifier for `keyword`, treating any attendee in `analysts`
    /// as a vendor participant. Both are compared lower-cased.
    pub fn new<I, S>(keyword: &str, analysts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keyword: keyword.trim().to_lowercase(),
            analysts: analysts
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
            type_re: Regex::new(r"(?i)inquiry|briefing").expect("regex is valid"),
            analyst_re: Regex::new(r"(?i)analyst:[^\S\r\n]*([^\r\n]*)").expect("regex is valid"),
        }
    }

    /// Classifier for the default keyword.
    pub fn with_analysts<I, S>(analysts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(DEFAULT_VENDOR_KEYWORD, analysts)
    }

    /// Rule 1: keyword in summary/description, or a rostered analyst attends.
    pub fn is_vendor_meeting(&self, facts: &MeetingFacts<'_>) -> bool {
        self.mentions_keyword(facts.summary)
            || self.mentions_keyword(facts.description)
            || facts
                .attendee_emails
                .iter()
                .any(|email| self.analysts.contains(email))
    }

    /// Rule 2: summary first, then description, else [`VendorType::Other`].
    pub fn vendor_type(&self, summary: Option<&str>, description: Option<&str>) -> VendorType {
        [summary, description]
            .into_iter()
            .flatten()
            .find_map(|text| self.first_type_token(text))
            .unwrap_or(VendorType::Other)
    }

    /// Rule 3: text after `analyst:` up to end of line, trimmed.
    pub fn analyst_name(&self, description: Option<&str>) -> String {
        description
            .and_then(|text| self.analyst_re.captures(text))
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_ANALYST)
            .to_string()
    }

    fn mentions_keyword(&self, text: Option<&str>) -> bool {
        if self.keyword.is_empty() {
            return false;
        }
        text.is_some_and(|t| t.to_lowercase().contains(&self.keyword))
    }

    fn first_type_token(&self, text: &str) -> Option<VendorType> {
        let m = self.type_re.find(text)?;
        if m.as_str().eq_ignore_ascii_case("inquiry") {
            Some(VendorType::Inquiry)
        } else {
            Some(VendorType::Briefing)
        }
    }
}

impl Default for GartnerClassifier {
    fn default() -> Self {
        Self::with_analysts(std::iter::empty::<&str>())
    }
}

impl MeetingClassifier for GartnerClassifier {
    fn classify(&self, facts: &MeetingFacts<'_>) -> Option<VendorClassification> {
        if !self.is_vendor_meeting(facts) {
            return None;
        }
        Some(VendorClassification {
            kind: self.vendor_type(facts.summary, facts.description),
            analyst_name: self.analyst_name(facts.description),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
