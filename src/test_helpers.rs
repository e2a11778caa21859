//! Shared test utilities for the church-site test suite.
//!
//! Provides the on-disk site fixture, sample remote rows shaped like the
//! hosted tables, and canonical records for renderer and output tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (_tmp, store) = fallback_fixture();
//! let gw = MemoryGateway::new().with_rows(
//!     Collection::Announcements,
//!     vec![announcement_row("a1", "T", "2025-01-01", true)],
//! );
//! let resolver = Resolver::new(&gw, &store);
//! ```

use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

use crate::fallback::FallbackStore;
use crate::gateway::{Record, record};
use crate::types::{
    Announcement, ContactFields, ContentDate, GalleryPhoto, Priority, Provenance, RecordId, Sermon,
};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The fixture site plus a fallback store over its `data/` directory.
pub fn fallback_fixture() -> (TempDir, FallbackStore) {
    let tmp = setup_fixtures();
    let store = FallbackStore::new(tmp.path().join("data"));
    (tmp, store)
}

// =========================================================================
// Remote rows
// =========================================================================

pub fn sermon_row(id: &str, title: &str, date: &str) -> Record {
    record([
        ("id", json!(id)),
        ("title", json!(title)),
        ("date", json!(date)),
        ("pastor", json!("Pastor John")),
        ("scripture", json!("John 3:16")),
        ("video_url", json!("https://www.youtube.com/watch?v=dQw4w9WgXcQ")),
        ("description", json!(null)),
    ])
}

pub fn announcement_row(id: &str, title: &str, date: &str, active: bool) -> Record {
    record([
        ("id", json!(id)),
        ("title", json!(title)),
        ("date", json!(date)),
        ("text", json!(format!("{title} details"))),
        ("priority", json!("normal")),
        ("is_active", json!(active)),
        ("show_popup", json!(false)),
    ])
}

pub fn photo_row(id: &str, created_at: &str) -> Record {
    record([
        ("id", json!(id)),
        ("image_url", json!(format!("https://cdn.example.org/{id}.jpg"))),
        ("caption", json!(null)),
        ("file_name", json!(format!("{id}.jpg"))),
        ("created_at", json!(created_at)),
    ])
}

// =========================================================================
// Canonical records
// =========================================================================

pub fn announcement(title: &str, date: &str) -> Announcement {
    Announcement {
        id: None,
        title: title.to_string(),
        date: Some(ContentDate::parse(date)),
        text: format!("{title} details"),
        priority: Priority::Normal,
        is_active: false,
        show_popup: false,
        contact: ContactFields::default(),
        provenance: Provenance::Fallback,
    }
}

pub fn photo(id: &str) -> GalleryPhoto {
    GalleryPhoto {
        id: Some(RecordId::new(id)),
        image_url: format!("https://cdn.example.org/{id}.jpg"),
        caption: None,
        file_name: None,
        created_at: None,
        provenance: Provenance::Remote,
    }
}

/// A sermon; an empty `video_url` means none.
pub fn sermon_with_video(title: &str, video_url: &str) -> Sermon {
    Sermon {
        id: Some(RecordId::new("s1")),
        title: title.to_string(),
        date: ContentDate::parse("2025-01-05"),
        pastor: "Pastor John".to_string(),
        scripture: None,
        video_url: (!video_url.is_empty()).then(|| video_url.to_string()),
        description: None,
        provenance: Provenance::Remote,
    }
}

/// Bytes that sniff as PNG.
pub fn tiny_png() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 1, 0, 0, 0, 1]);
    bytes
}
