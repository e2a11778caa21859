//! HTML site generation.
//!
//! Takes resolved content (see [`crate::resolve`]) and writes the static
//! church site. Every section renders from canonical records, so the same
//! pages come out whether content came from the backend or from the
//! bundled fallback documents.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): service times, announcement banners, featured
//!   announcement, latest sermon video, gallery preview
//! - **Sermons** (`/sermons.html`): every sermon, newest first
//! - **Announcements** (`/announcements.html`): every announcement card
//! - **Gallery** (`/gallery.html`): photo grid
//! - **Photo viewer** (`/gallery/{n}.html`): one page per photo with
//!   wrap-around previous/next, keyboard and swipe navigation
//! - **About / Contact** (`/about.html`, `/contact.html`): optional markdown
//!   pages from `about.md` and `contact.md`
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── sermons.html
//! ├── announcements.html
//! ├── gallery.html
//! ├── gallery/
//! │   ├── 1.html
//! │   └── 2.html
//! ├── about.html       # if about.md exists
//! └── contact.html     # if contact.md exists
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/site.js`: Banner dismissal, viewer keyboard/touch navigation

use crate::banner;
use crate::config::{self, SiteConfig, SiteInfo};
use crate::kv::KeyValueStore;
use crate::lightbox::{self, LOAD_ERROR_TEXT};
use crate::render::{self, BannerLayout};
use crate::resolve::{self, Featured, FeaturedTier, Resolution, Resolver};
use crate::types::{Announcement, GalleryPhoto, Provenance, Sermon};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A markdown page from the site source directory.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownPage {
    /// First `# ` heading, or the page's default title
    pub title: String,
    pub body: String,
}

impl MarkdownPage {
    pub fn from_markdown(body: &str, default_title: &str) -> Self {
        let title = body
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_title.to_string());
        Self {
            title,
            body: body.to_string(),
        }
    }
}

/// Everything one build renders.
#[derive(Debug, Clone)]
pub struct SiteContent {
    pub sermons: Resolution<Sermon>,
    pub announcements: Resolution<Announcement>,
    pub gallery: Resolution<GalleryPhoto>,
    pub featured: Option<Featured>,
    pub about: Option<MarkdownPage>,
    pub contact: Option<MarkdownPage>,
}

/// Resolve every content type and read the markdown pages.
pub fn resolve_site(
    resolver: &Resolver,
    config: &SiteConfig,
    source_dir: &Path,
) -> Result<SiteContent, GenerateError> {
    let sermons = resolver.sermons();
    let announcements = resolver.announcements();
    let gallery = resolver.gallery();
    let featured = resolve::select_featured(&announcements, &config.announcement);

    Ok(SiteContent {
        sermons,
        announcements,
        gallery,
        featured,
        about: read_markdown(&source_dir.join("about.md"), "About")?,
        contact: read_markdown(&source_dir.join("contact.md"), "Contact")?,
    })
}

fn read_markdown(path: &Path, default_title: &str) -> Result<Option<MarkdownPage>, GenerateError> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(MarkdownPage::from_markdown(&body, default_title))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Where one section's records came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSummary {
    pub name: &'static str,
    /// `None` when the section resolved to no content.
    pub provenance: Option<Provenance>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub sections: Vec<SectionSummary>,
    pub featured: Option<FeaturedTier>,
    /// Written files, relative to the output directory.
    pub pages: Vec<String>,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

pub fn generate(
    site: &SiteContent,
    config: &SiteConfig,
    session: &dyn KeyValueStore,
    output_dir: &Path,
) -> Result<BuildReport, GenerateError> {
    // Generate CSS with colors from config
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    let chrome = Chrome {
        site: &config.site,
        css: &css,
        has_about: site.about.is_some(),
        has_contact: site.contact.is_some(),
    };

    let mut report = BuildReport {
        sections: vec![
            summary("sermons", &site.sermons),
            summary("announcements", &site.announcements),
            summary("gallery", &site.gallery),
        ],
        featured: site.featured.as_ref().map(|f| f.tier),
        pages: Vec::new(),
    };

    fs::create_dir_all(output_dir)?;
    let mut write = |name: String, page: Markup| -> Result<(), GenerateError> {
        fs::write(output_dir.join(&name), page.into_string())?;
        report.pages.push(name);
        Ok(())
    };

    let banners = visible_banners(site.featured.as_ref(), session);
    write(
        "index.html".into(),
        render_index(&chrome, site, &banners, config.gallery.preview_count),
    )?;
    write("sermons.html".into(), render_sermons_page(&chrome, &site.sermons))?;
    write(
        "announcements.html".into(),
        render_announcements_page(&chrome, &site.announcements),
    )?;
    write("gallery.html".into(), render_gallery_page(&chrome, &site.gallery))?;

    // Photo viewer pages
    let photos = site.gallery.records();
    if !photos.is_empty() {
        fs::create_dir_all(output_dir.join("gallery"))?;
    }
    for idx in 0..photos.len() {
        let page = render_viewer_page(&chrome, photos, idx, config.gallery.swipe_threshold);
        write(format!("gallery/{}.html", idx + 1), page)?;
    }

    if let Some(about) = &site.about {
        write("about.html".into(), render_markdown_page(&chrome, about, "about"))?;
    }
    if let Some(contact) = &site.contact {
        write(
            "contact.html".into(),
            render_markdown_page(&chrome, contact, "contact"),
        )?;
    }

    Ok(report)
}

fn summary<T>(name: &'static str, resolution: &Resolution<T>) -> SectionSummary {
    SectionSummary {
        name,
        provenance: resolution.provenance(),
        count: resolution.len(),
    }
}

/// Banner layouts to render for the featured announcement this session.
fn visible_banners(featured: Option<&Featured>, session: &dyn KeyValueStore) -> Vec<BannerLayout> {
    match featured {
        Some(f) => BannerLayout::ALL
            .into_iter()
            .filter(|layout| banner::should_show(f, session, *layout))
            .collect(),
        None => Vec::new(),
    }
}

/// Viewer page path for the 0-based photo `idx`.
fn viewer_href(idx: usize) -> String {
    format!("/gallery/{}.html", idx + 1)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Shared page chrome: document head, header and navigation.
struct Chrome<'a> {
    site: &'a SiteInfo,
    css: &'a str,
    has_about: bool,
    has_contact: bool,
}

impl Chrome<'_> {
    fn page(&self, title: &str, current: &str, body_class: Option<&str>, content: Markup) -> Markup {
        let full_title = if title.is_empty() {
            self.site.name.clone()
        } else {
            format!("{} - {}", title, self.site.name)
        };
        let body = html! {
            (site_header(&self.site.name, render_nav(&self.nav_items(), current)))
            (content)
            script { (PreEscaped(JS)) }
        };
        base_document(&full_title, self.css, body_class, body)
    }

    fn nav_items(&self) -> Vec<NavItem> {
        let mut items = vec![
            NavItem::new("Home", "/", ""),
            NavItem::new("Sermons", "/sermons.html", "sermons"),
            NavItem::new("Announcements", "/announcements.html", "announcements"),
            NavItem::new("Gallery", "/gallery.html", "gallery"),
        ];
        if self.has_about {
            items.push(NavItem::new("About", "/about.html", "about"));
        }
        if self.has_contact {
            items.push(NavItem::new("Contact", "/contact.html", "contact"));
        }
        items
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
    /// Page key matched against the current page
    pub key: &'static str,
}

impl NavItem {
    fn new(title: &'static str, href: &'static str, key: &'static str) -> Self {
        Self { title, href, key }
    }
}

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with site name and navigation
fn site_header(site_name: &str, nav: Markup) -> Markup {
    html! {
        header.site-header {
            a.site-name href="/" { (site_name) }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Renders the navigation menu (hamburger style, slides from right)
pub fn render_nav(items: &[NavItem], current: &str) -> Markup {
    html! {
        input.nav-toggle type="checkbox" id="nav-toggle";
        label.nav-hamburger for="nav-toggle" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        div.nav-panel {
            label.nav-close for="nav-toggle" { "×" }
            ul {
                @for item in items {
                    li class=[(item.key == current).then_some("current")] {
                        a href=(item.href) { (item.title) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_index(
    chrome: &Chrome,
    site: &SiteContent,
    banners: &[BannerLayout],
    preview_count: usize,
) -> Markup {
    let info = chrome.site;
    let latest = site
        .sermons
        .first()
        .filter(|s| s.video_url.as_deref().and_then(crate::embed::embed_url).is_some());
    let preview = resolve::gallery_preview(&site.gallery, preview_count);

    let content = html! {
        @if let Some(featured) = &site.featured {
            @for layout in banners {
                (render::banner(&featured.announcement, *layout, &banner::dismiss_key(*layout)))
            }
        }
        main.home-page {
            section.hero {
                h1 { (info.name) }
                @if !info.tagline.is_empty() {
                    p.tagline { (info.tagline) }
                }
                @if !info.service_times.is_empty() {
                    ul.service-times {
                        @for time in &info.service_times {
                            li { (time) }
                        }
                    }
                }
            }
            @if let Some(featured) = &site.featured {
                (render::featured_section(featured))
            }
            section.latest-sermon {
                h2 { "Latest Sermon" }
                @if let Some(sermon) = latest {
                    (render::sermon_card(sermon))
                } @else {
                    (render::no_content("No sermon video available yet."))
                }
                a.more-link href="/sermons.html" { "All sermons" }
            }
            section.gallery-preview {
                h2 { "Gallery" }
                @if preview.is_empty() {
                    (render::no_content("No photos yet."))
                } @else {
                    div.gallery-grid {
                        @for (idx, photo) in preview.iter().enumerate() {
                            (render::gallery_tile(photo, &viewer_href(idx)))
                        }
                    }
                }
                a.more-link href="/gallery.html" { "View all photos" }
            }
        }
    };

    chrome.page("", "", None, content)
}

fn render_sermons_page(chrome: &Chrome, sermons: &Resolution<Sermon>) -> Markup {
    let content = html! {
        main.sermons-page {
            h1 { "Sermons" }
            @if sermons.is_empty() {
                (render::no_content("No sermons available yet."))
            } @else {
                div.sermon-list {
                    @for sermon in sermons.records() {
                        (render::sermon_card(sermon))
                    }
                }
            }
        }
    };
    chrome.page("Sermons", "sermons", None, content)
}

fn render_announcements_page(chrome: &Chrome, announcements: &Resolution<Announcement>) -> Markup {
    let content = html! {
        main.announcements-page {
            h1 { "Announcements" }
            @if announcements.is_empty() {
                (render::no_content("No announcements at this time."))
            } @else {
                div.announcement-list {
                    @for announcement in announcements.records() {
                        (render::announcement_card(announcement))
                    }
                }
            }
        }
    };
    chrome.page("Announcements", "announcements", None, content)
}

fn render_gallery_page(chrome: &Chrome, gallery: &Resolution<GalleryPhoto>) -> Markup {
    let content = html! {
        main.gallery-page {
            h1 { "Gallery" }
            @if gallery.is_empty() {
                (render::no_content("No photos yet."))
            } @else {
                div.gallery-grid {
                    @for (idx, photo) in gallery.records().iter().enumerate() {
                        (render::gallery_tile(photo, &viewer_href(idx)))
                    }
                }
            }
        }
    };
    chrome.page("Gallery", "gallery", None, content)
}

/// Renders a photo viewer page. Previous/next wrap around the gallery.
fn render_viewer_page(
    chrome: &Chrome,
    photos: &[GalleryPhoto],
    idx: usize,
    swipe_threshold: u32,
) -> Markup {
    let photo = &photos[idx];
    let prev_url = viewer_href(lightbox::prev_index(idx, photos.len()));
    let next_url = viewer_href(lightbox::next_index(idx, photos.len()));
    let title = format!("Photo {} of {}", idx + 1, photos.len());

    let content = html! {
        main.viewer-page {
            figure.viewer-frame {
                img.viewer-image src=(photo.image_url) alt=(photo.alt_text());
                figcaption.viewer-caption data-error=(LOAD_ERROR_TEXT) {
                    @if let Some(caption) = &photo.caption {
                        (caption)
                    }
                }
            }
            div.viewer-controls {
                a.viewer-prev href=(prev_url) aria-label="Previous photo" { "‹" }
                span.viewer-counter { (idx + 1) " / " (photos.len()) }
                a.viewer-next href=(next_url) aria-label="Next photo" { "›" }
            }
            a.viewer-close href="/gallery.html" aria-label="Close" { "×" }
        }
        div.nav-zones data-prev=(prev_url) data-next=(next_url) data-close="/gallery.html"
            data-swipe-threshold=(swipe_threshold) {}
    };

    chrome.page(&title, "gallery", Some("image-view"), content)
}

/// Renders a markdown page (about, contact)
fn render_markdown_page(chrome: &Chrome, page: &MarkdownPage, key: &str) -> Markup {
    // Convert markdown to HTML
    let parser = Parser::new(&page.body);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    let content = html! {
        main.text-page {
            article.text-content {
                (PreEscaped(body_html))
            }
        }
    };

    chrome.page(&page.title, key, None, content)
}

// ============================================================================
// Tests
// ============================================================================
