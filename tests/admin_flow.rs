//! Admin operations against the in-memory backend, plus the link and viewer
//! behaviour the admin relies on when publishing.

use church_site::admin::{self, AdminError, AnnouncementForm, AssumeYes, SermonForm, UploadSettings};
use church_site::embed;
use church_site::gateway::memory::{MemoryGateway, Operation};
use church_site::gateway::Collection;
use church_site::lightbox::{Input, Key, Lightbox, Slide};
use church_site::types::{ContactFields, Priority};
use std::fs;
use tempfile::TempDir;

fn announcement_form(title: &str, date: &str, active: bool) -> AnnouncementForm {
    AnnouncementForm {
        title: title.to_string(),
        date: date.to_string(),
        text: format!("{title} details"),
        priority: Priority::Normal,
        is_active: active,
        show_popup: false,
        contact: ContactFields::default(),
    }
}

fn active_ids(gw: &MemoryGateway) -> Vec<String> {
    gw.rows(Collection::Announcements)
        .iter()
        .filter(|r| r.get("is_active").and_then(|v| v.as_bool()) == Some(true))
        .filter_map(|r| r.get("id").and_then(|v| v.as_str()).map(String::from))
        .collect()
}

fn settings() -> UploadSettings {
    UploadSettings {
        bucket: "gallery".to_string(),
        object_prefix: "photos".to_string(),
        max_bytes: 1024 * 1024,
    }
}

#[test]
fn activation_keeps_one_announcement_active() {
    let gw = MemoryGateway::new();
    let first = admin::add_announcement(&gw, &announcement_form("First", "2025-01-01", true)).unwrap();
    let second =
        admin::add_announcement(&gw, &announcement_form("Second", "2025-01-02", true)).unwrap();
    let second_id = second.id.unwrap().as_str().to_string();
    assert_eq!(active_ids(&gw), vec![second_id]);

    let first_id = first.id.unwrap().as_str().to_string();
    let activated = admin::set_active_announcement(&gw, &first_id).unwrap();
    assert!(activated.is_active);
    assert_eq!(active_ids(&gw), vec![first_id]);
}

#[test]
fn interrupted_activation_is_reported() {
    let gw = MemoryGateway::new();
    admin::add_announcement(&gw, &announcement_form("A", "2025-01-01", true)).unwrap();
    let b = admin::add_announcement(&gw, &announcement_form("B", "2025-01-02", false)).unwrap();
    let b_id = b.id.unwrap().as_str().to_string();
    assert_eq!(active_ids(&gw).len(), 1);

    // Second update of this activation is the one that sets the flag.
    let updates_so_far = gw.calls().iter().filter(|c| **c == Operation::Update).count();
    gw.fail_nth(Operation::Update, updates_so_far + 1);

    let err = admin::set_active_announcement(&gw, &b_id).unwrap_err();
    assert!(matches!(err, AdminError::ActivationIncomplete { .. }));
    assert!(active_ids(&gw).is_empty());
}

#[test]
fn sermon_with_foreign_video_is_rejected() {
    let gw = MemoryGateway::new();
    let form = SermonForm {
        title: "Grace".to_string(),
        date: "2025-02-02".to_string(),
        pastor: "Pastor John".to_string(),
        scripture: None,
        video_url: Some("https://vimeo.com/123456".to_string()),
        description: None,
    };
    assert!(matches!(
        admin::add_sermon(&gw, &form),
        Err(AdminError::Validation(_))
    ));
    assert!(gw.calls().is_empty());
}

#[test]
fn uploaded_photo_can_be_deleted_despite_storage_failure() {
    let gw = MemoryGateway::new();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("choir.png");
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
    fs::write(&path, png).unwrap();

    let files = admin::collect_upload_files(&[dir.path().to_path_buf()]).unwrap();
    let report = admin::upload_photos(&gw, &settings(), &files, Some("Choir"));
    assert_eq!(report.succeeded(), 1);
    assert_eq!(gw.object_keys().len(), 1);

    let photo = admin::list_photos(&gw).unwrap().remove(0);
    let id = photo.id.unwrap().as_str().to_string();
    let file_name = photo.file_name.unwrap();

    gw.fail(Operation::RemoveObject);
    let deletion = admin::delete_photo(&gw, &settings(), &id, &file_name, &AssumeYes).unwrap();
    assert!(!deletion.storage_removed());
    assert!(gw.rows(Collection::Gallery).is_empty());
}

#[test]
fn youtube_link_forms() {
    let expected = Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string());
    for url in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
    ] {
        assert_eq!(embed::embed_url(url), expected, "{url}");
    }
    assert_eq!(embed::embed_url("https://youtu.be/short"), None);
    assert_eq!(embed::embed_url("not a link"), None);
}

#[test]
fn lightbox_wraps_in_both_directions() {
    let slides: Vec<Slide> = ["a", "b", "c"]
        .iter()
        .map(|u| Slide {
            url: format!("/img/{u}.jpg"),
            caption: None,
        })
        .collect();

    let (lb, _) = Lightbox::new().open(slides, 2);
    let (lb, _) = lb.handle(Input::Next, 50.0);
    assert_eq!(lb.index(), Some(0));
    let (lb, _) = lb.handle(Input::Key(Key::ArrowLeft), 50.0);
    assert_eq!(lb.index(), Some(2));
    let (lb, _) = lb.handle(Input::Key(Key::Escape), 50.0);
    assert!(!lb.is_open());
}
