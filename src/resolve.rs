//! Content resolution: remote first, static fallback second, "no content" last.
//!
//! For every content type the resolver:
//!
//! 1. lists the remote collection in its default order (newest first);
//! 2. if that call fails **or returns no rows**, reads the matching fallback
//!    document;
//! 3. if the fallback is missing, unreadable or empty, reports
//!    [`Resolution::NoContent`], which is a state, not an error.
//!
//! An empty remote result and an unreachable remote are deliberately treated
//! the same way. Records are normalized before they leave this module, and
//! the two sources are never merged within one resolution.

use crate::config::DefaultAnnouncement;
use crate::fallback::{FallbackError, FallbackStore};
use crate::gateway::{Collection, ContentGateway, Query, Record};
use crate::normalize;
use crate::types::{Announcement, GalleryPhoto, Provenance, Sermon};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Found {
        records: Vec<T>,
        provenance: Provenance,
    },
    NoContent,
}

impl<T> Resolution<T> {
    pub fn records(&self) -> &[T] {
        match self {
            Resolution::Found { records, .. } => records,
            Resolution::NoContent => &[],
        }
    }

    pub fn provenance(&self) -> Option<Provenance> {
        match self {
            Resolution::Found { provenance, .. } => Some(*provenance),
            Resolution::NoContent => None,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.records().first()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

pub struct Resolver<'a> {
    gateway: &'a dyn ContentGateway,
    fallback: &'a FallbackStore,
}

impl<'a> Resolver<'a> {
    pub fn new(gateway: &'a dyn ContentGateway, fallback: &'a FallbackStore) -> Self {
        Self { gateway, fallback }
    }

    pub fn sermons(&self) -> Resolution<Sermon> {
        self.resolve(Collection::Sermons, normalize::sermons_from_rows, || {
            Ok(self
                .fallback
                .sermons()?
                .into_iter()
                .map(normalize::sermon_from_doc)
                .collect())
        })
    }

    pub fn announcements(&self) -> Resolution<Announcement> {
        self.resolve(
            Collection::Announcements,
            normalize::announcements_from_rows,
            || {
                Ok(self
                    .fallback
                    .announcements()?
                    .into_iter()
                    .map(normalize::announcement_from_doc)
                    .collect())
            },
        )
    }

    pub fn gallery(&self) -> Resolution<GalleryPhoto> {
        self.resolve(Collection::Gallery, normalize::photos_from_rows, || {
            Ok(self
                .fallback
                .gallery()?
                .into_iter()
                .map(normalize::photo_from_doc)
                .collect())
        })
    }

    fn resolve<T>(
        &self,
        collection: Collection,
        from_rows: fn(Vec<Record>) -> Vec<T>,
        from_fallback: impl FnOnce() -> Result<Vec<T>, FallbackError>,
    ) -> Resolution<T> {
        let query = Query::new().order(collection.default_order());
        match self.gateway.list(collection, &query) {
            Ok(rows) if !rows.is_empty() => {
                let records = from_rows(rows);
                if !records.is_empty() {
                    return Resolution::Found {
                        records,
                        provenance: Provenance::Remote,
                    };
                }
                log::warn!("{collection}: no usable remote rows, using fallback");
            }
            Ok(_) => log::info!("{collection}: remote is empty, using fallback"),
            Err(e) => log::warn!("{collection}: remote unavailable ({e}), using fallback"),
        }

        match from_fallback() {
            Ok(records) if !records.is_empty() => Resolution::Found {
                records,
                provenance: Provenance::Fallback,
            },
            Ok(_) => {
                log::info!("{collection}: fallback is empty, no content");
                Resolution::NoContent
            }
            Err(e) => {
                log::info!("{collection}: {e}, no content");
                Resolution::NoContent
            }
        }
    }
}

// ============================================================================
// Featured announcement
// ============================================================================

/// Which tier produced the featured announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturedTier {
    /// The row flagged `is_active`.
    Active,
    /// No active row: the most recent announcement by date.
    MostRecent,
    /// Nothing resolved: the default from `config.toml`.
    Configured,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Featured {
    pub announcement: Announcement,
    pub tier: FeaturedTier,
}

/// Pick the announcement to feature on the home page.
///
/// Prefers the active row, then the most recent row by date, then the
/// configured default (if enabled).
pub fn select_featured(
    announcements: &Resolution<Announcement>,
    default: &DefaultAnnouncement,
) -> Option<Featured> {
    let records = announcements.records();
    if let Some(active) = records.iter().find(|a| a.is_active) {
        return Some(Featured {
            announcement: active.clone(),
            tier: FeaturedTier::Active,
        });
    }
    if let Some(recent) = most_recent(records) {
        return Some(Featured {
            announcement: recent.clone(),
            tier: FeaturedTier::MostRecent,
        });
    }
    normalize::announcement_from_config(default).map(|announcement| Featured {
        announcement,
        tier: FeaturedTier::Configured,
    })
}

/// Latest parseable date wins; ties and undated records keep list order.
fn most_recent(records: &[Announcement]) -> Option<&Announcement> {
    let key = |a: &Announcement| a.date.as_ref().and_then(|d| d.day());
    records
        .iter()
        .fold(None, |best: Option<&Announcement>, candidate| match best {
            Some(b) if key(candidate) <= key(b) => Some(b),
            _ => Some(candidate),
        })
}

/// The newest `count` photos of a resolved gallery.
pub fn gallery_preview(gallery: &Resolution<GalleryPhoto>, count: usize) -> &[GalleryPhoto] {
    let records = gallery.records();
    &records[..count.min(records.len())]
}
