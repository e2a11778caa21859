//! HTML fragments for content records.
//!
//! Every function here is pure: canonical record in, [`Markup`] out. None of
//! them look at [`Provenance`](crate::types::Provenance); remote and
//! fallback records render identically. Page chrome lives in
//! [`crate::generate`].

use crate::embed;
use crate::resolve::Featured;
use crate::types::{Announcement, ContactLink, GalleryPhoto, Priority, Sermon, contact_links};
use maud::{Markup, html};

/// Banner text longer than this is cut and suffixed with `...`.
pub const BANNER_TEXT_LIMIT: usize = 100;

/// Cut `text` to at most `limit` characters, appending `...` when cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", text[..byte_idx].trim_end()),
        None => text.to_string(),
    }
}

/// Placeholder shown when a section resolved to no content.
pub fn no_content(message: &str) -> Markup {
    html! {
        p.no-content { (message) }
    }
}

pub fn sermon_card(sermon: &Sermon) -> Markup {
    let embed = sermon.video_url.as_deref().and_then(embed::embed_url);
    html! {
        article.sermon-card {
            @if let Some(src) = embed {
                div.video-wrapper {
                    iframe src=(src) title=(sermon.title) frameborder="0"
                        allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                        allowfullscreen {}
                }
            }
            div.sermon-info {
                h3 { (sermon.title) }
                p.sermon-meta {
                    span.sermon-date { (sermon.date.display()) }
                    @if !sermon.pastor.is_empty() {
                        " · "
                        span.sermon-pastor { (sermon.pastor) }
                    }
                }
                @if let Some(scripture) = &sermon.scripture {
                    p.sermon-scripture { (scripture) }
                }
                @if let Some(description) = &sermon.description {
                    p.sermon-description { (description) }
                }
            }
        }
    }
}

/// Contact links as buttons. `compact` uses the short labels of the banner.
pub fn contact_actions(links: &[ContactLink], compact: bool) -> Markup {
    html! {
        @if !links.is_empty() {
            div.contact-actions {
                @for link in links {
                    @let class = format!("contact-link contact-{}", link.kind.label().to_lowercase());
                    @let text = if compact { link.kind.label() } else { link.kind.action_text() };
                    @if link.kind.opens_new_tab() {
                        a class=(class) href=(link.href) target="_blank" rel="noopener noreferrer" { (text) }
                    } @else {
                        a class=(class) href=(link.href) { (text) }
                    }
                }
            }
        }
    }
}

pub fn announcement_card(announcement: &Announcement) -> Markup {
    let high = announcement.priority == Priority::High;
    let links = contact_links(&announcement.contact);
    html! {
        article.announcement-card.priority-high[high] {
            header {
                h3 { (announcement.title) }
                @if let Some(date) = &announcement.date {
                    time.announcement-date { (date.display()) }
                }
            }
            p.announcement-text { (announcement.text) }
            (contact_actions(&links, false))
        }
    }
}

/// The featured announcement, inline on the home page.
pub fn featured_section(featured: &Featured) -> Markup {
    let announcement = &featured.announcement;
    let links = contact_links(&announcement.contact);
    html! {
        section.featured-announcement {
            h2 { (announcement.title) }
            @if let Some(date) = &announcement.date {
                p.featured-date { (date.display()) }
            }
            p.featured-text { (announcement.text) }
            (contact_actions(&links, false))
        }
    }
}

/// Where a banner is placed. Each layout is dismissed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLayout {
    /// Top-of-page strip on narrow screens.
    Mobile,
    /// Sticky sidebar card on wide screens.
    Desktop,
}

impl BannerLayout {
    pub const ALL: [BannerLayout; 2] = [BannerLayout::Mobile, BannerLayout::Desktop];

    pub fn as_str(&self) -> &'static str {
        match self {
            BannerLayout::Mobile => "mobile",
            BannerLayout::Desktop => "desktop",
        }
    }
}

/// Dismissible announcement banner. `dismiss_key` is written to session
/// storage by the page script when the close button is pressed.
pub fn banner(announcement: &Announcement, layout: BannerLayout, dismiss_key: &str) -> Markup {
    let links = contact_links(&announcement.contact);
    let class = format!("announcement-banner banner-{}", layout.as_str());
    html! {
        aside class=(class) data-dismiss-key=(dismiss_key) {
            button.banner-close type="button" aria-label="Dismiss announcement" { "×" }
            strong.banner-title { (announcement.title) }
            p.banner-text { (truncate(&announcement.text, BANNER_TEXT_LIMIT)) }
            (contact_actions(&links, true))
        }
    }
}

/// A gallery thumbnail linking to its viewer page.
pub fn gallery_tile(photo: &GalleryPhoto, href: &str) -> Markup {
    html! {
        a.gallery-item href=(href) {
            img src=(photo.image_url) alt=(photo.alt_text()) loading="lazy";
            @if let Some(caption) = &photo.caption {
                span.gallery-caption { (caption) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::FeaturedTier;
    use crate::types::{ContactFields, ContentDate, Provenance, RecordId};

    fn sermon(video_url: Option<&str>) -> Sermon {
        Sermon {
            id: Some(RecordId::new("s1")),
            title: "Walking in Faith".into(),
            date: ContentDate::parse("2025-01-05"),
            pastor: "Pastor John".into(),
            scripture: Some("Hebrews 11:1".into()),
            video_url: video_url.map(str::to_string),
            description: None,
            provenance: Provenance::Remote,
        }
    }

    fn announcement(text: &str) -> Announcement {
        Announcement {
            id: Some(RecordId::new("a1")),
            title: "T".into(),
            date: Some(ContentDate::parse("2025-01-01")),
            text: text.into(),
            priority: Priority::Normal,
            is_active: true,
            show_popup: true,
            contact: ContactFields::default(),
            provenance: Provenance::Remote,
        }
    }

    #[test]
    fn sermon_card_embeds_video() {
        let html = sermon_card(&sermon(Some("https://youtu.be/dQw4w9WgXcQ"))).into_string();
        assert!(html.contains(r#"src="https://www.youtube.com/embed/dQw4w9WgXcQ""#));
        assert!(html.contains("January 5, 2025"));
        assert!(html.contains("Hebrews 11:1"));
    }

    #[test]
    fn sermon_card_without_video_has_no_iframe() {
        let html = sermon_card(&sermon(Some("https://vimeo.com/1"))).into_string();
        assert!(!html.contains("<iframe"));
        assert!(html.contains("Walking in Faith"));
    }

    #[test]
    fn high_priority_card_is_marked() {
        let mut a = announcement("Bring a dish");
        a.priority = Priority::High;
        let html = announcement_card(&a).into_string();
        assert!(html.contains("priority-high"));

        a.priority = Priority::Normal;
        assert!(!announcement_card(&a).into_string().contains("priority-high"));
    }

    #[test]
    fn card_contact_actions_in_order() {
        let mut a = announcement("x");
        a.contact = ContactFields {
            whatsapp: Some("https://chat.whatsapp.com/abc".into()),
            email: Some("office@example.org".into()),
            ..Default::default()
        };
        let html = announcement_card(&a).into_string();
        let whatsapp = html.find("Join WhatsApp Group").unwrap();
        let email = html.find("mailto:office@example.org").unwrap();
        assert!(whatsapp < email);
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn featured_section_shows_title_and_formatted_date() {
        let featured = Featured {
            announcement: announcement("..."),
            tier: FeaturedTier::Active,
        };
        let html = featured_section(&featured).into_string();
        assert!(html.contains("<h2>T</h2>"));
        assert!(html.contains("January 1, 2025"));
    }

    #[test]
    fn banner_truncates_long_text() {
        let long = "a".repeat(150);
        let html = banner(&announcement(&long), BannerLayout::Mobile, "k").into_string();
        assert!(html.contains(&format!("{}...", "a".repeat(100))));
        assert!(!html.contains(&"a".repeat(101)));
        assert!(html.contains(r#"data-dismiss-key="k""#));
    }

    #[test]
    fn truncate_is_char_aware() {
        assert_eq!(truncate("héllo", 3), "hél...");
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn gallery_tile_uses_default_alt() {
        let photo = GalleryPhoto {
            id: None,
            image_url: "https://cdn/x.jpg".into(),
            caption: None,
            file_name: None,
            created_at: None,
            provenance: Provenance::Fallback,
        };
        let html = gallery_tile(&photo, "gallery/1.html").into_string();
        assert!(html.contains(r#"alt="Church Photo""#));
        assert!(html.contains(r#"href="gallery/1.html""#));
    }

    #[test]
    fn text_is_escaped() {
        let html = announcement_card(&announcement("<script>")).into_string();
        assert!(html.contains("&lt;script&gt;"));
    }
}
