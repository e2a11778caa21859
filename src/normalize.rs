//! Mapping of source-specific shapes onto the canonical records.
//!
//! Remote rows use snake_case columns (`video_url`, `is_active`) and carry
//! ids; fallback documents use the hand-written file names (`videoUrl`) and
//! never carry ids. This is the only module that knows about either shape.
//! Blank optional strings become `None` on both paths.

use crate::config::DefaultAnnouncement;
use crate::fallback::{AnnouncementDoc, GalleryDoc, SermonDoc};
use crate::gateway::Record;
use crate::types::{
    Announcement, ContactFields, ContentDate, GalleryPhoto, Priority, Provenance, RecordId, Sermon,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SermonRow {
    id: RecordId,
    title: String,
    date: String,
    #[serde(default)]
    pastor: Option<String>,
    #[serde(default)]
    scripture: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnnouncementRow {
    id: RecordId,
    title: String,
    date: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    show_popup: Option<bool>,
    #[serde(default)]
    whatsapp_link: Option<String>,
    #[serde(default)]
    web_link: Option<String>,
    #[serde(default)]
    phone_link: Option<String>,
    #[serde(default)]
    email_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GalleryRow {
    id: RecordId,
    image_url: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Decode every entry, dropping (and logging) entries that do not fit the
/// shape. Shared by remote rows and fallback documents.
pub(crate) fn decode_each<T: DeserializeOwned>(
    source: &str,
    entries: impl IntoIterator<Item = Value>,
) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::warn!("{source}: skipping malformed record: {e}");
                None
            }
        })
        .collect()
}

fn decode_rows<T: DeserializeOwned>(collection: &str, rows: Vec<Record>) -> Vec<T> {
    decode_each(collection, rows.into_iter().map(Value::Object))
}

// ============================================================================
// Remote rows
// ============================================================================

pub fn sermons_from_rows(rows: Vec<Record>) -> Vec<Sermon> {
    decode_rows::<SermonRow>("sermons", rows)
        .into_iter()
        .map(|row| Sermon {
            id: Some(row.id),
            title: row.title,
            date: ContentDate::parse(&row.date),
            pastor: non_empty(row.pastor).unwrap_or_default(),
            scripture: non_empty(row.scripture),
            video_url: non_empty(row.video_url),
            description: non_empty(row.description),
            provenance: Provenance::Remote,
        })
        .collect()
}

pub fn announcements_from_rows(rows: Vec<Record>) -> Vec<Announcement> {
    decode_rows::<AnnouncementRow>("announcements", rows)
        .into_iter()
        .map(|row| Announcement {
            id: Some(row.id),
            title: row.title,
            date: Some(ContentDate::parse(&row.date)),
            text: row.text.unwrap_or_default(),
            priority: row
                .priority
                .as_deref()
                .map(Priority::from_label)
                .unwrap_or_default(),
            is_active: row.is_active.unwrap_or(false),
            show_popup: row.show_popup.unwrap_or(false),
            contact: ContactFields {
                whatsapp: non_empty(row.whatsapp_link),
                web: non_empty(row.web_link),
                phone: non_empty(row.phone_link),
                email: non_empty(row.email_link),
            },
            provenance: Provenance::Remote,
        })
        .collect()
}

pub fn photos_from_rows(rows: Vec<Record>) -> Vec<GalleryPhoto> {
    decode_rows::<GalleryRow>("gallery", rows)
        .into_iter()
        .map(|row| GalleryPhoto {
            id: Some(row.id),
            image_url: row.image_url,
            caption: non_empty(row.caption),
            file_name: non_empty(row.file_name),
            created_at: row.created_at.as_deref().map(ContentDate::parse),
            provenance: Provenance::Remote,
        })
        .collect()
}

// ============================================================================
// Fallback documents
// ============================================================================

pub fn sermon_from_doc(doc: SermonDoc) -> Sermon {
    Sermon {
        id: None,
        title: doc.title,
        date: ContentDate::parse(&doc.date),
        pastor: doc.pastor,
        scripture: non_empty(doc.scripture),
        video_url: non_empty(doc.video_url),
        description: non_empty(doc.description),
        provenance: Provenance::Fallback,
    }
}

pub fn announcement_from_doc(doc: AnnouncementDoc) -> Announcement {
    Announcement {
        id: None,
        title: doc.title,
        date: Some(ContentDate::parse(&doc.date)),
        text: doc.text,
        priority: doc
            .priority
            .as_deref()
            .map(Priority::from_label)
            .unwrap_or_default(),
        is_active: false,
        show_popup: false,
        contact: ContactFields {
            whatsapp: non_empty(doc.whatsapp_link),
            web: non_empty(doc.web_link),
            phone: non_empty(doc.phone_link),
            email: non_empty(doc.email_link),
        },
        provenance: Provenance::Fallback,
    }
}

pub fn photo_from_doc(doc: GalleryDoc) -> GalleryPhoto {
    GalleryPhoto {
        id: None,
        image_url: doc.image_url,
        caption: non_empty(doc.caption),
        file_name: None,
        created_at: None,
        provenance: Provenance::Fallback,
    }
}

/// The configured default announcement, if enabled. It is always eligible
/// for the popup banner.
pub fn announcement_from_config(config: &DefaultAnnouncement) -> Option<Announcement> {
    if !config.show || config.title.trim().is_empty() {
        return None;
    }
    Some(Announcement {
        id: None,
        title: config.title.clone(),
        date: None,
        text: config.text.clone(),
        priority: Priority::Normal,
        is_active: false,
        show_popup: true,
        contact: ContactFields::default(),
        provenance: Provenance::Configured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::record;
    use serde_json::json;

    #[test]
    fn remote_and_fallback_sermons_normalize_alike() {
        let remote = sermons_from_rows(vec![record([
            ("id", json!(3)),
            ("title", json!("Grace")),
            ("date", json!("2025-01-05")),
            ("pastor", json!("Pastor John")),
            ("video_url", json!("https://youtu.be/dQw4w9WgXcQ")),
            ("scripture", json!("")),
        ])]);
        let fallback = sermon_from_doc(SermonDoc {
            title: "Grace".into(),
            date: "2025-01-05".into(),
            pastor: "Pastor John".into(),
            scripture: None,
            video_url: Some("https://youtu.be/dQw4w9WgXcQ".into()),
            description: None,
        });

        let r = &remote[0];
        assert_eq!(r.id, Some(RecordId::new("3")));
        assert_eq!(r.provenance, Provenance::Remote);
        assert_eq!(fallback.provenance, Provenance::Fallback);
        assert_eq!(r.title, fallback.title);
        assert_eq!(r.date, fallback.date);
        assert_eq!(r.video_url, fallback.video_url);
        assert_eq!(r.scripture, None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![
            record([("id", json!("a1")), ("title", json!("T")), ("date", json!("2025-01-01"))]),
            record([("id", json!("a2"))]),
        ];
        let list = announcements_from_rows(rows);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "T");
        assert_eq!(list[0].text, "");
    }

    #[test]
    fn announcement_row_flags_and_links() {
        let list = announcements_from_rows(vec![record([
            ("id", json!("a1")),
            ("title", json!("T")),
            ("date", json!("2025-01-01")),
            ("text", json!("...")),
            ("priority", json!("high")),
            ("is_active", json!(true)),
            ("show_popup", json!(true)),
            ("phone_link", json!("+1555")),
            ("web_link", json!(null)),
        ])]);
        let a = &list[0];
        assert!(a.is_active);
        assert!(a.show_popup);
        assert_eq!(a.priority, Priority::High);
        assert_eq!(a.contact.phone.as_deref(), Some("+1555"));
        assert_eq!(a.contact.web, None);
        assert_eq!(a.date.as_ref().map(ContentDate::display).as_deref(), Some("January 1, 2025"));
    }

    #[test]
    fn gallery_row_keeps_file_name() {
        let photos = photos_from_rows(vec![record([
            ("id", json!("g1")),
            ("image_url", json!("https://cdn/x.jpg")),
            ("file_name", json!("1700000000000-abcd1234.jpg")),
            ("created_at", json!("2025-03-01T12:00:00+00:00")),
        ])]);
        assert_eq!(photos[0].file_name.as_deref(), Some("1700000000000-abcd1234.jpg"));
        assert_eq!(photos[0].alt_text(), "Church Photo");
    }

    #[test]
    fn disabled_default_announcement_is_none() {
        let mut config = DefaultAnnouncement::default();
        assert!(announcement_from_config(&config).unwrap().show_popup);
        config.show = false;
        assert!(announcement_from_config(&config).is_none());
    }
}
