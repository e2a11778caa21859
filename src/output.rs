//! CLI output formatting for builds and admin commands.
//!
//! Output is **content-centric**: every record is listed by position and
//! title, with ids, dates and other details on indented context lines. Ids
//! are what the admin commands take as arguments, so they are always shown.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Content
//!     sermons: 3 (remote)
//!     announcements: 2 (fallback)
//!     gallery: none
//!     featured: most recent announcement
//!
//! Pages
//!     index.html
//!     sermons.html
//!
//! Generated 2 pages in dist
//! ```
//!
//! ## Admin listings
//!
//! ```text
//! 001 Potluck Sunday [active] [popup]
//!     Id: 7
//!     Date: January 5, 2025
//!     Text: Bring a dish to share after the service...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::admin::{PhotoDeletion, UploadReport};
use crate::auth::Session;
use crate::embed;
use crate::generate::BuildReport;
use crate::render::truncate;
use crate::resolve::FeaturedTier;
use crate::types::{Announcement, GalleryPhoto, Priority, Sermon, contact_links};
use chrono::DateTime;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn context(label: &str, value: &str) -> String {
    format!("{}{}: {}", indent(1), label, value)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Content".to_string()];
    for section in &report.sections {
        let status = match section.provenance {
            Some(source) => format!("{} ({})", section.count, source),
            None => "none".to_string(),
        };
        lines.push(context(section.name, &status));
    }
    let featured = match report.featured {
        Some(FeaturedTier::Active) => "active announcement",
        Some(FeaturedTier::MostRecent) => "most recent announcement",
        Some(FeaturedTier::Configured) => "configured default",
        None => "none",
    };
    lines.push(context("featured", featured));

    lines.push(String::new());
    lines.push("Pages".to_string());
    for page in &report.pages {
        lines.push(format!("{}{}", indent(1), page));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} in {}",
        plural(report.pages.len(), "page", "pages"),
        output_dir.display()
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    print_lines(format_build_output(report, output_dir));
}

// ============================================================================
// Admin listings
// ============================================================================

fn id_line(id: Option<&crate::types::RecordId>) -> String {
    context("Id", id.map(|i| i.as_str()).unwrap_or("-"))
}

pub fn format_sermon_list(sermons: &[Sermon]) -> Vec<String> {
    if sermons.is_empty() {
        return vec!["No sermons".to_string()];
    }
    let mut lines = Vec::new();
    for (i, sermon) in sermons.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), sermon.title));
        lines.push(id_line(sermon.id.as_ref()));
        lines.push(context(
            "Date",
            &format!("{} · {}", sermon.date.display(), sermon.pastor),
        ));
        if let Some(scripture) = &sermon.scripture {
            lines.push(context("Scripture", scripture));
        }
        if let Some(url) = &sermon.video_url {
            match embed::embed_url(url) {
                Some(embed) => lines.push(context("Video", &embed)),
                None => lines.push(context("Video", &format!("{url} (not embeddable)"))),
            }
        }
    }
    lines
}

pub fn print_sermon_list(sermons: &[Sermon]) {
    print_lines(format_sermon_list(sermons));
}

fn announcement_header(pos: usize, a: &Announcement) -> String {
    let mut header = format!("{} {}", format_index(pos), a.title);
    if a.is_active {
        header.push_str(" [active]");
    }
    if a.show_popup {
        header.push_str(" [popup]");
    }
    if a.priority == Priority::High {
        header.push_str(" [high]");
    }
    header
}

pub fn format_announcement_list(announcements: &[Announcement]) -> Vec<String> {
    if announcements.is_empty() {
        return vec!["No announcements".to_string()];
    }
    let mut lines = Vec::new();
    for (i, a) in announcements.iter().enumerate() {
        lines.push(announcement_header(i + 1, a));
        lines.push(id_line(a.id.as_ref()));
        if let Some(date) = &a.date {
            lines.push(context("Date", &date.display()));
        }
        lines.push(context("Text", &truncate(&a.text, 60)));
        for link in contact_links(&a.contact) {
            lines.push(context(link.kind.label(), &link.href));
        }
    }
    lines
}

pub fn print_announcement_list(announcements: &[Announcement]) {
    print_lines(format_announcement_list(announcements));
}

pub fn format_photo_list(photos: &[GalleryPhoto]) -> Vec<String> {
    if photos.is_empty() {
        return vec!["No photos".to_string()];
    }
    let mut lines = Vec::new();
    for (i, photo) in photos.iter().enumerate() {
        // Untitled photos are identified by their object name
        let title = match (&photo.caption, &photo.file_name) {
            (Some(caption), _) => caption.clone(),
            (None, Some(file)) => format!("({file})"),
            (None, None) => "(untitled)".to_string(),
        };
        lines.push(format!("{} {}", format_index(i + 1), title));
        lines.push(id_line(photo.id.as_ref()));
        if let Some(file) = &photo.file_name {
            lines.push(context("File", file));
        }
        lines.push(context("Url", &photo.image_url));
    }
    lines
}

pub fn print_photo_list(photos: &[GalleryPhoto]) {
    print_lines(format_photo_list(photos));
}

// ============================================================================
// Admin results
// ============================================================================

pub fn format_upload_report(report: &UploadReport) -> Vec<String> {
    let mut lines = Vec::new();
    for item in &report.items {
        match &item.result {
            Ok(photo) => lines.push(format!(
                "uploaded {} → {}",
                item.path.display(),
                photo.file_name.as_deref().unwrap_or(&photo.image_url)
            )),
            Err(e) => lines.push(format!(
                "failed   {}: {}",
                item.path.display(),
                e.user_message()
            )),
        }
    }
    let mut summary = format!(
        "Uploaded {} of {}",
        report.succeeded(),
        plural(report.items.len(), "photo", "photos")
    );
    if report.failed() > 0 {
        summary.push_str(&format!(" ({} failed)", report.failed()));
    }
    lines.push(summary);
    lines
}

pub fn print_upload_report(report: &UploadReport) {
    print_lines(format_upload_report(report));
}

pub fn format_photo_deletion(id: &str, deletion: &PhotoDeletion) -> Vec<String> {
    let mut lines = vec![format!("Deleted photo {id}")];
    if let Some(err) = &deletion.storage_error {
        lines.push(context("Warning", &format!("stored file was not removed: {err}")));
    }
    lines
}

pub fn print_photo_deletion(id: &str, deletion: &PhotoDeletion) {
    print_lines(format_photo_deletion(id, deletion));
}

pub fn format_session(session: Option<&Session>, now: i64) -> Vec<String> {
    let Some(session) = session else {
        return vec!["Not signed in".to_string()];
    };
    let who = session.email.as_deref().unwrap_or("(unknown account)");
    let expiry = DateTime::from_timestamp(session.expires_at, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| session.expires_at.to_string());
    let state = if session.expires_at <= now {
        "expired, refreshed on next use"
    } else {
        "valid"
    };
    vec![
        format!("Signed in as {who}"),
        context("Session", &format!("{state} until {expiry}")),
    ]
}

pub fn print_session(session: Option<&Session>, now: i64) {
    print_lines(format_session(session, now));
}
