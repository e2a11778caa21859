//! # Church Site
//!
//! Content pipeline and admin tool for a small church website: sermons with
//! embedded video, announcements with one featured item and a popup banner,
//! and a photo gallery with a lightbox viewer.
//!
//! # Architecture: Resolve, Then Render
//!
//! Every content section is resolved independently through the same chain:
//!
//! ```text
//! hosted backend  →  bundled data/*.json  →  "no content" placeholder
//!   (Remote)            (Fallback)              (NoContent)
//! ```
//!
//! The backend wins when it answers with at least one usable row. A failed or
//! empty answer falls through to the bundled documents, and only when those are
//! missing or empty does the section render its placeholder. Resolution never
//! fails the build: the worst case is a site of placeholders.
//!
//! Rows from both sources are normalized into one canonical shape per kind
//! ([`types::Sermon`], [`types::Announcement`], [`types::GalleryPhoto`]) so the
//! renderers never see source-specific field names.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gateway`] | Table and object-store access: REST client and in-memory double |
//! | [`fallback`] | Reads the bundled `sermons.json`, `announcements.json`, `gallery.json` |
//! | [`normalize`] | Remote rows and fallback documents → canonical records |
//! | [`resolve`] | Per-section source chain, featured announcement, gallery preview |
//! | [`render`] | Maud fragments: sermon and announcement cards, banners, gallery tiles |
//! | [`generate`] | Writes the HTML site from resolved content |
//! | [`lightbox`] | Viewer state machine: navigation, wrap-around, load probes |
//! | [`banner`] | Popup banner visibility and per-session dismissal |
//! | [`embed`] | YouTube link → embeddable player URL |
//! | [`admin`] | Validated create, delete, activation and photo upload operations |
//! | [`auth`] | Admin sign-in and the persisted session |
//! | [`kv`] | String key-value stores (memory, JSON file) |
//! | [`config`] | `config.toml` loading merged over stock defaults |
//! | [`types`] | Canonical record types shared by every stage |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Single Active Announcement
//!
//! Activating an announcement is two backend calls: deactivate every active
//! row, then activate the chosen one. There is no transaction across them, so
//! a failure in the second step leaves no announcement active. That state is
//! reported as [`admin::AdminError::ActivationIncomplete`] rather than hidden;
//! the featured section falls back to the most recent announcement until an
//! admin retries.
//!
//! ## Static Lightbox
//!
//! The gallery viewer is generated as one page per photo with previous and
//! next links that wrap around. Those links come from the index arithmetic in
//! [`lightbox`] (`next_index`, `prev_index`); the embedded script only maps
//! keys and swipes onto them. The full state machine in [`lightbox`] models
//! the interactive viewer and its load probes.

pub mod admin;
pub mod auth;
pub mod banner;
pub mod config;
pub mod embed;
pub mod fallback;
pub mod gateway;
pub mod generate;
pub mod kv;
pub mod lightbox;
pub mod normalize;
pub mod output;
pub mod render;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
