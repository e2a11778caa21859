//! YouTube embed-URL extraction.
//!
//! Accepts the usual share forms and returns the canonical embed URL:
//!
//! ```text
//! https://www.youtube.com/watch?v=dQw4w9WgXcQ   -> https://www.youtube.com/embed/dQw4w9WgXcQ
//! https://youtu.be/dQw4w9WgXcQ                  -> https://www.youtube.com/embed/dQw4w9WgXcQ
//! https://www.youtube.com/embed/dQw4w9WgXcQ     -> https://www.youtube.com/embed/dQw4w9WgXcQ
//! ```
//!
//! Anything without an 11-character video id yields `None`.

use regex::Regex;
use std::sync::LazyLock;

const VIDEO_ID_LEN: usize = 11;

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("video id pattern is valid")
});

/// The 11-character video id, if `url` is a recognised YouTube link.
pub fn video_id(url: &str) -> Option<&str> {
    let captures = VIDEO_ID.captures(url.trim())?;
    let id = captures.get(2)?.as_str();
    (id.len() == VIDEO_ID_LEN).then_some(id)
}

/// Canonical `https://www.youtube.com/embed/{id}` URL for `url`.
pub fn embed_url(url: &str) -> Option<String> {
    video_id(url).map(|id| format!("https://www.youtube.com/embed/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ";

    #[test]
    fn watch_url() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn watch_url_with_extra_params() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some(CANONICAL)
        );
        assert_eq!(
            embed_url("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn short_url() {
        assert_eq!(
            embed_url("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn already_embed_url() {
        assert_eq!(embed_url(CANONICAL).as_deref(), Some(CANONICAL));
    }

    #[test]
    fn unparseable_urls_are_none() {
        assert_eq!(embed_url(""), None);
        assert_eq!(embed_url("not a url"), None);
        assert_eq!(embed_url("https://vimeo.com/123456"), None);
        // Wrong id length
        assert_eq!(embed_url("https://youtu.be/short"), None);
    }
}
