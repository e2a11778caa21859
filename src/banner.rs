//! Announcement banner visibility.
//!
//! A banner is shown for the featured announcement when it is popup-eligible
//! and the visitor has not dismissed that layout during the current session.
//! Dismissal flags live in an injected [`KeyValueStore`]; the generated page
//! script writes the same keys to browser session storage.

use crate::kv::{KeyValueStore, KvError};
use crate::render::BannerLayout;
use crate::resolve::Featured;

/// Session key recording that `layout`'s banner was dismissed.
pub fn dismiss_key(layout: BannerLayout) -> String {
    format!("banner.{}.dismissed", layout.as_str())
}

pub fn is_dismissed(store: &dyn KeyValueStore, layout: BannerLayout) -> Result<bool, KvError> {
    Ok(store.get(&dismiss_key(layout))?.as_deref() == Some("true"))
}

pub fn dismiss(store: &dyn KeyValueStore, layout: BannerLayout) -> Result<(), KvError> {
    store.set(&dismiss_key(layout), "true")
}

/// Whether to render `layout`'s banner for `featured`.
///
/// An unreadable store counts as "not dismissed".
pub fn should_show(featured: &Featured, store: &dyn KeyValueStore, layout: BannerLayout) -> bool {
    if !featured.announcement.show_popup {
        return false;
    }
    match is_dismissed(store, layout) {
        Ok(dismissed) => !dismissed,
        Err(e) => {
            log::warn!("banner state unreadable: {e}");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultAnnouncement;
    use crate::kv::MemoryStore;
    use crate::normalize::announcement_from_config;
    use crate::resolve::FeaturedTier;

    fn configured() -> Featured {
        Featured {
            announcement: announcement_from_config(&DefaultAnnouncement::default()).unwrap(),
            tier: FeaturedTier::Configured,
        }
    }

    #[test]
    fn configured_default_is_always_eligible() {
        let store = MemoryStore::new();
        assert!(should_show(&configured(), &store, BannerLayout::Mobile));
    }

    #[test]
    fn popup_flag_off_hides_banner() {
        let mut featured = configured();
        featured.announcement.show_popup = false;
        assert!(!should_show(&featured, &MemoryStore::new(), BannerLayout::Desktop));
    }

    #[test]
    fn layouts_are_dismissed_independently() {
        let store = MemoryStore::new();
        dismiss(&store, BannerLayout::Mobile).unwrap();

        assert!(!should_show(&configured(), &store, BannerLayout::Mobile));
        assert!(should_show(&configured(), &store, BannerLayout::Desktop));
    }

    #[test]
    fn keys_differ_per_layout() {
        assert_ne!(
            dismiss_key(BannerLayout::Mobile),
            dismiss_key(BannerLayout::Desktop)
        );
    }
}
