//! Admin CRUD controllers.
//!
//! Thin wrappers over the [`ContentGateway`]: validate a form, then insert;
//! ask for confirmation, then delete. The only cross-row rule is that at most
//! one announcement is active, kept by deactivating every active row before
//! activating the target. The two writes are separate round-trips with no
//! transaction, so a failure between them leaves zero active rows.
//!
//! Admin listings show remote rows only; fallback records are read-only and
//! never offered for mutation.

use crate::embed;
use crate::gateway::{Collection, ContentGateway, Filter, GatewayError, Query, Record};
use crate::normalize;
use crate::types::{Announcement, ContactFields, ContentDate, GalleryPhoto, Priority, Sermon};
use chrono::Utc;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),
    #[error("cancelled")]
    Cancelled,
    #[error("{collection} {id} not found")]
    NotFound { collection: Collection, id: String },
    #[error("all announcements were deactivated but {id} could not be activated: {source}")]
    ActivationIncomplete { id: String, source: GatewayError },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdminError {
    /// One-line text for the admin's notification line.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Gateway(e) => e.user_message(),
            AdminError::ActivationIncomplete { id, source } => format!(
                "No announcement is active: {id} could not be activated ({})",
                source.user_message()
            ),
            other => other.to_string(),
        }
    }
}

/// Gate in front of every destructive call.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

fn require(field: &str, value: &str) -> Result<(), AdminError> {
    if value.trim().is_empty() {
        return Err(AdminError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_date(value: &str) -> Result<(), AdminError> {
    require("date", value)?;
    if ContentDate::parse(value).day().is_none() {
        return Err(AdminError::Validation(format!(
            "date must look like 2025-01-31, got {value:?}"
        )));
    }
    Ok(())
}

/// `null` for absent or blank optional fields.
fn optional(value: &Option<String>) -> Value {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => json!(v),
        _ => Value::Null,
    }
}

fn confirm_delete(confirm: &dyn Confirm, what: &str) -> Result<(), AdminError> {
    if confirm.confirm(&format!("Delete {what}? This cannot be undone.")) {
        Ok(())
    } else {
        Err(AdminError::Cancelled)
    }
}

// ============================================================================
// Sermons
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SermonForm {
    pub title: String,
    pub date: String,
    pub pastor: String,
    pub scripture: Option<String>,
    pub video_url: Option<String>,
    pub description: Option<String>,
}

impl SermonForm {
    pub fn validate(&self) -> Result<(), AdminError> {
        require("title", &self.title)?;
        require_date(&self.date)?;
        require("pastor", &self.pastor)?;
        if let Some(url) = self.video_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if embed::embed_url(url).is_none() {
                return Err(AdminError::Validation(format!(
                    "video URL is not a YouTube link: {url}"
                )));
            }
        }
        Ok(())
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("title".into(), json!(self.title.trim()));
        record.insert("date".into(), json!(self.date.trim()));
        record.insert("pastor".into(), json!(self.pastor.trim()));
        record.insert("scripture".into(), optional(&self.scripture));
        record.insert("video_url".into(), optional(&self.video_url));
        record.insert("description".into(), optional(&self.description));
        record
    }
}

pub fn list_sermons(gateway: &dyn ContentGateway) -> Result<Vec<Sermon>, AdminError> {
    let query = Query::new().order(Collection::Sermons.default_order());
    let rows = gateway.list(Collection::Sermons, &query)?;
    Ok(normalize::sermons_from_rows(rows))
}

/// Validate, then insert. Nothing is sent when validation fails.
pub fn add_sermon(gateway: &dyn ContentGateway, form: &SermonForm) -> Result<Sermon, AdminError> {
    form.validate()?;
    let row = gateway.insert(Collection::Sermons, form.to_record())?;
    first_normalized(Collection::Sermons, row, normalize::sermons_from_rows)
}

pub fn delete_sermon(
    gateway: &dyn ContentGateway,
    id: &str,
    confirm: &dyn Confirm,
) -> Result<(), AdminError> {
    confirm_delete(confirm, &format!("sermon {id}"))?;
    gateway.remove(Collection::Sermons, id)?;
    Ok(())
}

// ============================================================================
// Announcements
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnouncementForm {
    pub title: String,
    pub date: String,
    pub text: String,
    pub priority: Priority,
    pub is_active: bool,
    pub show_popup: bool,
    pub contact: ContactFields,
}

impl AnnouncementForm {
    pub fn validate(&self) -> Result<(), AdminError> {
        require("title", &self.title)?;
        require_date(&self.date)?;
        require("text", &self.text)
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("title".into(), json!(self.title.trim()));
        record.insert("date".into(), json!(self.date.trim()));
        record.insert("text".into(), json!(self.text.trim()));
        record.insert("priority".into(), json!(self.priority.as_str()));
        record.insert("is_active".into(), json!(self.is_active));
        record.insert("show_popup".into(), json!(self.show_popup));
        record.insert("whatsapp_link".into(), optional(&self.contact.whatsapp));
        record.insert("web_link".into(), optional(&self.contact.web));
        record.insert("phone_link".into(), optional(&self.contact.phone));
        record.insert("email_link".into(), optional(&self.contact.email));
        record
    }
}

pub fn list_announcements(gateway: &dyn ContentGateway) -> Result<Vec<Announcement>, AdminError> {
    let query = Query::new().order(Collection::Announcements.default_order());
    let rows = gateway.list(Collection::Announcements, &query)?;
    Ok(normalize::announcements_from_rows(rows))
}

/// Validate, then insert. An announcement created active first deactivates
/// every other row.
pub fn add_announcement(
    gateway: &dyn ContentGateway,
    form: &AnnouncementForm,
) -> Result<Announcement, AdminError> {
    form.validate()?;
    if form.is_active {
        deactivate_all(gateway)?;
    }
    let row = gateway.insert(Collection::Announcements, form.to_record())?;
    first_normalized(
        Collection::Announcements,
        row,
        normalize::announcements_from_rows,
    )
}

pub fn delete_announcement(
    gateway: &dyn ContentGateway,
    id: &str,
    confirm: &dyn Confirm,
) -> Result<(), AdminError> {
    confirm_delete(confirm, &format!("announcement {id}"))?;
    gateway.remove(Collection::Announcements, id)?;
    Ok(())
}

fn deactivate_all(gateway: &dyn ContentGateway) -> Result<usize, AdminError> {
    let rows = gateway.update(
        Collection::Announcements,
        &Filter::eq("is_active", true),
        Record::from_iter([("is_active".to_string(), json!(false))]),
    )?;
    Ok(rows.len())
}

/// Make `id` the single active announcement.
///
/// Checks that `id` exists, deactivates every active row, then activates
/// `id`. An unknown id is [`AdminError::NotFound`] and changes nothing. If
/// the deactivation fails nothing has changed. If the activation fails, or
/// the row vanished in between, no row is active, which is reported as
/// [`AdminError::ActivationIncomplete`].
pub fn set_active_announcement(
    gateway: &dyn ContentGateway,
    id: &str,
) -> Result<Announcement, AdminError> {
    let target = Query::new().filter(Filter::eq("id", id)).limit(1);
    if gateway.list(Collection::Announcements, &target)?.is_empty() {
        return Err(AdminError::NotFound {
            collection: Collection::Announcements,
            id: id.to_string(),
        });
    }

    let deactivated = deactivate_all(gateway)?;
    log::debug!("deactivated {deactivated} announcement(s)");

    let incomplete = |source| AdminError::ActivationIncomplete {
        id: id.to_string(),
        source,
    };
    let rows = gateway
        .update(
            Collection::Announcements,
            &Filter::eq("id", id),
            Record::from_iter([("is_active".to_string(), json!(true))]),
        )
        .map_err(incomplete)?;
    normalize::announcements_from_rows(rows)
        .into_iter()
        .next()
        .ok_or_else(|| {
            incomplete(GatewayError::Service {
                status: 404,
                code: Some("PGRST116".to_string()),
                message: format!("announcement {id} no longer exists"),
            })
        })
}

/// Switch the popup banner on or off for one announcement.
pub fn toggle_popup(
    gateway: &dyn ContentGateway,
    id: &str,
    show: bool,
) -> Result<Announcement, AdminError> {
    let rows = gateway.update(
        Collection::Announcements,
        &Filter::eq("id", id),
        Record::from_iter([("show_popup".to_string(), json!(show))]),
    )?;
    single_updated(Collection::Announcements, id, rows)
}

fn single_updated(
    collection: Collection,
    id: &str,
    rows: Vec<Record>,
) -> Result<Announcement, AdminError> {
    normalize::announcements_from_rows(rows)
        .into_iter()
        .next()
        .ok_or_else(|| AdminError::NotFound {
            collection,
            id: id.to_string(),
        })
}

fn first_normalized<T>(
    collection: Collection,
    row: Record,
    decode: fn(Vec<Record>) -> Vec<T>,
) -> Result<T, AdminError> {
    decode(vec![row]).into_iter().next().ok_or_else(|| {
        AdminError::Gateway(GatewayError::Decode(format!(
            "inserted {collection} row has an unexpected shape"
        )))
    })
}

// ============================================================================
// Gallery
// ============================================================================

/// Where uploads go and how big they may be.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSettings {
    pub bucket: String,
    /// Folder inside the bucket
    pub object_prefix: String,
    pub max_bytes: u64,
}

impl UploadSettings {
    fn object_path(&self, file_name: &str) -> String {
        if self.object_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.object_prefix.trim_matches('/'), file_name)
        }
    }
}

pub fn list_photos(gateway: &dyn ContentGateway) -> Result<Vec<GalleryPhoto>, AdminError> {
    let query = Query::new().order(Collection::Gallery.default_order());
    let rows = gateway.list(Collection::Gallery, &query)?;
    Ok(normalize::photos_from_rows(rows))
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand upload arguments: files are kept as given, directories are walked
/// for image files (sorted by path).
pub fn collect_upload_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AdminError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry.map_err(std::io::Error::from)?;
                if entry.file_type().is_file() && has_image_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Object name for uploaded bytes: `{unix_millis}-{8 hex of sha256}.{ext}`.
pub fn object_name(bytes: &[u8], extension: &str, unix_millis: i64) -> String {
    let hex = format!("{:x}", Sha256::digest(bytes));
    format!("{unix_millis}-{}.{extension}", &hex[..8])
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub path: PathBuf,
    pub result: Result<GalleryPhoto, AdminError>,
}

/// Per-file results of a batch upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub items: Vec<UploadOutcome>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// Upload every file; a failing file is recorded and the batch continues.
pub fn upload_photos(
    gateway: &dyn ContentGateway,
    settings: &UploadSettings,
    files: &[PathBuf],
    caption: Option<&str>,
) -> UploadReport {
    let items = files
        .iter()
        .map(|path| {
            let result = upload_one(gateway, settings, path, caption);
            if let Err(e) = &result {
                log::warn!("upload failed for {}: {e}", path.display());
            }
            UploadOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();
    UploadReport { items }
}

fn upload_one(
    gateway: &dyn ContentGateway,
    settings: &UploadSettings,
    path: &Path,
    caption: Option<&str>,
) -> Result<GalleryPhoto, AdminError> {
    let size = fs::metadata(path)?.len();
    if size > settings.max_bytes {
        return Err(AdminError::Validation(format!(
            "{} is {size} bytes; the limit is {} bytes",
            path.display(),
            settings.max_bytes
        )));
    }
    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes).map_err(|_| {
        AdminError::Validation(format!("{} is not an image", path.display()))
    })?;
    let extension = format.extensions_str().first().copied().unwrap_or("img");

    let file_name = object_name(&bytes, extension, Utc::now().timestamp_millis());
    let object_path = settings.object_path(&file_name);
    let image_url = gateway.upload(
        &settings.bucket,
        &object_path,
        &bytes,
        format.to_mime_type(),
    )?;

    let mut row = Record::new();
    row.insert("image_url".into(), json!(image_url));
    row.insert(
        "caption".into(),
        optional(&caption.map(str::to_string)),
    );
    row.insert("file_name".into(), json!(file_name));

    match gateway.insert(Collection::Gallery, row) {
        Ok(stored) => first_normalized(Collection::Gallery, stored, normalize::photos_from_rows),
        Err(e) => {
            // Row failed: drop the orphaned object so the bucket matches the table
            if let Err(cleanup) = gateway.remove_object(&settings.bucket, &object_path) {
                log::warn!("orphaned object {object_path} left in storage: {cleanup}");
            }
            Err(e.into())
        }
    }
}

/// Result of a photo deletion. The row is always gone when this is returned.
#[derive(Debug, PartialEq)]
pub struct PhotoDeletion {
    /// Set when the stored binary could not be removed.
    pub storage_error: Option<String>,
}

impl PhotoDeletion {
    pub fn storage_removed(&self) -> bool {
        self.storage_error.is_none()
    }
}

/// Delete the metadata row, then the stored object.
///
/// A failure removing the object is logged and reported in the result but
/// does not fail the deletion.
pub fn delete_photo(
    gateway: &dyn ContentGateway,
    settings: &UploadSettings,
    id: &str,
    file_name: &str,
    confirm: &dyn Confirm,
) -> Result<PhotoDeletion, AdminError> {
    require("file name", file_name)?;
    confirm_delete(confirm, &format!("photo {id}"))?;

    gateway.remove(Collection::Gallery, id)?;

    let object_path = settings.object_path(file_name);
    let storage_error = match gateway.remove_object(&settings.bucket, &object_path) {
        Ok(()) => None,
        Err(e) => {
            log::warn!("photo {id} deleted but {object_path} remains in storage: {e}");
            Some(e.user_message())
        }
    };
    Ok(PhotoDeletion { storage_error })
}
