//! Canonical content records shared by the resolver, renderers and admin.
//!
//! Remote rows and fallback documents use different field names; both are
//! mapped into these types by [`crate::normalize`] so nothing downstream ever
//! branches on where a record came from. [`Provenance`] is carried along for
//! reporting only.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Which source produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Rows returned by the hosted backend.
    Remote,
    /// Bundled read-only JSON documents.
    Fallback,
    /// The default announcement from `config.toml`.
    Configured,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Remote => f.write_str("remote"),
            Provenance::Fallback => f.write_str("fallback"),
            Provenance::Configured => f.write_str("config"),
        }
    }
}

/// Identity assigned by the remote store. Backends hand these out either as
/// UUID strings or as integers; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Int(n) => RecordId(n.to_string()),
        })
    }
}

/// A date as stored, plus its parsed calendar day when recognisable.
///
/// Accepted inputs: `2025-01-01`, RFC 3339 timestamps, and already-formatted
/// `January 1, 2025`. Anything else is displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDate {
    raw: String,
    day: Option<NaiveDate>,
}

impl ContentDate {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let day = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
            .or_else(|| NaiveDate::parse_from_str(trimmed, "%B %d, %Y").ok());
        Self {
            raw: trimmed.to_string(),
            day,
        }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }

    /// Long US form, e.g. `January 1, 2025`.
    pub fn display(&self) -> String {
        match self.day {
            Some(day) => day.format("%B %-d, %Y").to_string(),
            None => self.raw.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Anything other than `high` (case-insensitive) is normal priority.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("high") {
            Priority::High
        } else {
            Priority::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sermon {
    /// Absent for fallback records, which are never mutated.
    pub id: Option<RecordId>,
    pub title: String,
    pub date: ContentDate,
    pub pastor: String,
    pub scripture: Option<String>,
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub provenance: Provenance,
}

/// Optional contact fields attached to an announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub whatsapp: Option<String>,
    pub web: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub id: Option<RecordId>,
    pub title: String,
    /// The configured default announcement carries no date.
    pub date: Option<ContentDate>,
    pub text: String,
    pub priority: Priority,
    pub is_active: bool,
    pub show_popup: bool,
    pub contact: ContactFields,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryPhoto {
    pub id: Option<RecordId>,
    pub image_url: String,
    pub caption: Option<String>,
    /// Object name inside the bucket folder; needed to delete the binary.
    pub file_name: Option<String>,
    pub created_at: Option<ContentDate>,
    pub provenance: Provenance,
}

impl GalleryPhoto {
    pub fn alt_text(&self) -> &str {
        self.caption.as_deref().unwrap_or("Church Photo")
    }
}

// ============================================================================
// Contact links
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    WhatsApp,
    Website,
    Call,
    Email,
}

impl ContactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContactKind::WhatsApp => "WhatsApp",
            ContactKind::Website => "Website",
            ContactKind::Call => "Call",
            ContactKind::Email => "Email",
        }
    }

    /// Long call-to-action text used on announcement cards.
    pub fn action_text(&self) -> &'static str {
        match self {
            ContactKind::WhatsApp => "Join WhatsApp Group",
            ContactKind::Website => "Visit Website",
            ContactKind::Call => "Call Us",
            ContactKind::Email => "Email Us",
        }
    }

    /// External destinations open in a new tab; `tel:`/`mailto:` do not.
    pub fn opens_new_tab(&self) -> bool {
        matches!(self, ContactKind::WhatsApp | ContactKind::Website)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLink {
    pub kind: ContactKind,
    pub href: String,
}

/// Project contact fields into actionable links, in the fixed order
/// WhatsApp, Website, Call, Email. Blank fields are skipped.
pub fn contact_links(fields: &ContactFields) -> Vec<ContactLink> {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut links = Vec::new();
    if let Some(href) = present(&fields.whatsapp) {
        links.push(ContactLink {
            kind: ContactKind::WhatsApp,
            href,
        });
    }
    if let Some(href) = present(&fields.web) {
        links.push(ContactLink {
            kind: ContactKind::Website,
            href,
        });
    }
    if let Some(phone) = present(&fields.phone) {
        links.push(ContactLink {
            kind: ContactKind::Call,
            href: with_scheme(&phone, "tel:"),
        });
    }
    if let Some(email) = present(&fields.email) {
        links.push(ContactLink {
            kind: ContactKind::Email,
            href: with_scheme(&email, "mailto:"),
        });
    }
    links
}

fn with_scheme(value: &str, scheme: &str) -> String {
    if value.starts_with(scheme) {
        value.to_string()
    } else {
        format!("{scheme}{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_date_displays_long_form() {
        let date = ContentDate::parse("2025-01-01");
        assert_eq!(date.display(), "January 1, 2025");
    }

    #[test]
    fn rfc3339_timestamp_displays_day() {
        let date = ContentDate::parse("2024-11-28T10:00:00+00:00");
        assert_eq!(date.display(), "November 28, 2024");
    }

    #[test]
    fn formatted_date_is_recognised() {
        let date = ContentDate::parse("March 9, 2025");
        assert_eq!(date.day(), NaiveDate::from_ymd_opt(2025, 3, 9));
        assert_eq!(date.display(), "March 9, 2025");
    }

    #[test]
    fn unparseable_date_shown_verbatim() {
        let date = ContentDate::parse("Easter Sunday");
        assert_eq!(date.day(), None);
        assert_eq!(date.display(), "Easter Sunday");
    }

    #[test]
    fn record_id_accepts_strings_and_integers() {
        let a: RecordId = serde_json::from_str(r#""a1""#).unwrap();
        let b: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(a.as_str(), "a1");
        assert_eq!(b.as_str(), "42");
    }

    #[test]
    fn priority_from_label() {
        assert_eq!(Priority::from_label("high"), Priority::High);
        assert_eq!(Priority::from_label("HIGH"), Priority::High);
        assert_eq!(Priority::from_label("normal"), Priority::Normal);
        assert_eq!(Priority::from_label("urgent"), Priority::Normal);
    }

    #[test]
    fn contact_links_fixed_order_and_skips_absent() {
        let fields = ContactFields {
            whatsapp: None,
            web: Some("https://example.org".into()),
            phone: Some("+15551234".into()),
            email: Some("office@example.org".into()),
        };
        let links = contact_links(&fields);
        let kinds: Vec<_> = links.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![ContactKind::Website, ContactKind::Call, ContactKind::Email]
        );
        assert_eq!(links[1].href, "tel:+15551234");
        assert_eq!(links[2].href, "mailto:office@example.org");
    }

    #[test]
    fn contact_links_keep_existing_scheme() {
        let fields = ContactFields {
            phone: Some("tel:555".into()),
            email: Some("mailto:a@b.c".into()),
            ..Default::default()
        };
        let links = contact_links(&fields);
        assert_eq!(links[0].href, "tel:555");
        assert_eq!(links[1].href, "mailto:a@b.c");
    }

    #[test]
    fn blank_contact_fields_are_absent() {
        let fields = ContactFields {
            whatsapp: Some("   ".into()),
            ..Default::default()
        };
        assert!(contact_links(&fields).is_empty());
    }
}
