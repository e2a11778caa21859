//! Static fallback store.
//!
//! Read-only JSON documents bundled with the site source, mirroring the
//! remote collections:
//!
//! ```text
//! data/sermons.json        { "sermons":       [ {title, date, pastor, scripture, videoUrl, description} ] }
//! data/announcements.json  { "announcements": [ {title, date, text, priority, whatsapp_link, web_link, phone_link, email_link} ] }
//! data/gallery.json        { "gallery":       [ {image_url, caption} ] }
//! ```
//!
//! Field names follow the original hand-written files (`videoUrl` is camel
//! case); [`crate::normalize`] maps them onto the canonical records.
//!
//! Entries are decoded one at a time: an entry missing `title` or `date` is
//! logged and skipped, the rest of the document still counts. `null` is
//! accepted wherever a string may be blank.

use crate::normalize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("fallback document not found: {0}")]
    Missing(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid fallback document {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SermonDoc {
    pub title: String,
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pastor: String,
    #[serde(default)]
    pub scripture: Option<String>,
    #[serde(default, rename = "videoUrl", alias = "video_url")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnnouncementDoc {
    pub title: String,
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub whatsapp_link: Option<String>,
    #[serde(default)]
    pub web_link: Option<String>,
    #[serde(default)]
    pub phone_link: Option<String>,
    #[serde(default)]
    pub email_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GalleryDoc {
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct SermonsFile {
    #[serde(default)]
    sermons: Vec<Value>,
}

#[derive(Deserialize)]
struct AnnouncementsFile {
    #[serde(default)]
    announcements: Vec<Value>,
}

#[derive(Deserialize)]
struct GalleryFile {
    #[serde(default)]
    gallery: Vec<Value>,
}

/// Reads fallback documents from one directory.
#[derive(Debug, Clone)]
pub struct FallbackStore {
    dir: PathBuf,
}

impl FallbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sermons(&self) -> Result<Vec<SermonDoc>, FallbackError> {
        let file = self.read::<SermonsFile>("sermons.json")?;
        Ok(normalize::decode_each("sermons.json", file.sermons))
    }

    pub fn announcements(&self) -> Result<Vec<AnnouncementDoc>, FallbackError> {
        let file = self.read::<AnnouncementsFile>("announcements.json")?;
        Ok(normalize::decode_each("announcements.json", file.announcements))
    }

    pub fn gallery(&self) -> Result<Vec<GalleryDoc>, FallbackError> {
        let file = self.read::<GalleryFile>("gallery.json")?;
        Ok(normalize::decode_each("gallery.json", file.gallery))
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T, FallbackError> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FallbackError::Missing(path));
            }
            Err(source) => return Err(FallbackError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| FallbackError::Json { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_sermons_with_camel_case_video() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("sermons.json"),
            r#"{"sermons":[{"title":"Grace","date":"2024-11-10","pastor":"Pastor John",
                "scripture":"John 3:16","videoUrl":"https://youtu.be/dQw4w9WgXcQ"}]}"#,
        )
        .unwrap();

        let sermons = FallbackStore::new(tmp.path()).sermons().unwrap();
        assert_eq!(sermons.len(), 1);
        assert_eq!(
            sermons[0].video_url.as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
        assert_eq!(sermons[0].description, None);
    }

    #[test]
    fn missing_document_is_reported() {
        let tmp = TempDir::new().unwrap();
        let result = FallbackStore::new(tmp.path()).gallery();
        assert!(matches!(result, Err(FallbackError::Missing(_))));
    }

    #[test]
    fn document_without_list_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("announcements.json"), "{}").unwrap();
        let list = FallbackStore::new(tmp.path()).announcements().unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn bad_entries_are_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("sermons.json"),
            r#"{"sermons":[
                {"title":"Grace","date":"2024-11-10","pastor":"Pastor John"},
                {"title":"Hope","date":"2024-11-03","pastor":null,"scripture":null},
                {"title":"No date","pastor":"Pastor John"}
            ]}"#,
        )
        .unwrap();

        let sermons = FallbackStore::new(tmp.path()).sermons().unwrap();
        let titles: Vec<_> = sermons.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Grace", "Hope"]);
        assert_eq!(sermons[1].pastor, "");
    }

    #[test]
    fn null_announcement_text_is_blank() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("announcements.json"),
            r#"{"announcements":[{"title":"Picnic","date":"2024-06-01","text":null}]}"#,
        )
        .unwrap();
        let list = FallbackStore::new(tmp.path()).announcements().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].text, "");
    }

    #[test]
    fn malformed_document_is_json_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sermons.json"), "{\"sermons\": [").unwrap();
        assert!(matches!(
            FallbackStore::new(tmp.path()).sermons(),
            Err(FallbackError::Json { .. })
        ));
    }
}
