//! Gallery lightbox state machine.
//!
//! ```text
//!            open(list, i)
//!  Closed ─────────────────▶ Open { list, index, display }
//!    ▲                         │  next / prev (wrap around)
//!    └──── close ◀─────────────┘  probe loaded / probe failed
//! ```
//!
//! Transitions are pure: each takes the current [`Lightbox`] by value and
//! returns the next one, plus a [`Probe`] when an image must be loaded. The
//! caller performs the load and reports back with the probe's [`Ticket`].
//! Only the ticket of the most recent navigation is honoured, so a slow probe
//! for a photo the user has already moved past can never swap the image.

use crate::types::GalleryPhoto;

/// Caption shown when a photo fails to load.
pub const LOAD_ERROR_TEXT: &str = "Image could not be loaded";

/// Index after `index` in a list of `len`, wrapping to 0.
pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}

/// Index before `index` in a list of `len`, wrapping to `len - 1`.
pub fn prev_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + len - 1) % len
    }
}

/// Identifies one image load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// An image load the caller should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub ticket: Ticket,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub url: String,
    pub caption: Option<String>,
}

impl From<&GalleryPhoto> for Slide {
    fn from(photo: &GalleryPhoto) -> Self {
        Slide {
            url: photo.image_url.clone(),
            caption: photo.caption.clone(),
        }
    }
}

/// What the open lightbox currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    /// First probe still pending; nothing shown yet.
    Loading,
    Image { url: String, caption: Option<String> },
    /// The image stays as it was; the caption is replaced by an error.
    Failed { url: Option<String>, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Closed,
    Open {
        slides: Vec<Slide>,
        index: usize,
        display: Display,
        pending: Ticket,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// User input routed to the lightbox while it is open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Next,
    Prev,
    CloseButton,
    /// Click on the dark background around the image.
    Overlay,
    Key(Key),
    /// Horizontal touch gesture; `dx` is start minus end, in pixels.
    Swipe { dx: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lightbox {
    state: State,
    issued: u64,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lightbox {
    pub fn new() -> Self {
        Self {
            state: State::Closed,
            issued: 0,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match &self.state {
            State::Open { index, .. } => Some(*index),
            State::Closed => None,
        }
    }

    pub fn display(&self) -> Option<&Display> {
        match &self.state {
            State::Open { display, .. } => Some(display),
            State::Closed => None,
        }
    }

    /// Open on `index`. An empty list or out-of-range index leaves the
    /// lightbox closed.
    pub fn open(self, slides: Vec<Slide>, index: usize) -> (Self, Option<Probe>) {
        if index >= slides.len() {
            return (self, None);
        }
        let issued = self.issued;
        let display = match self.state {
            State::Open { display, .. } => display,
            State::Closed => Display::Loading,
        };
        Self {
            state: State::Closed,
            issued,
        }
        .show(slides, index, display)
    }

    pub fn next(self) -> (Self, Option<Probe>) {
        self.step(next_index)
    }

    pub fn prev(self) -> (Self, Option<Probe>) {
        self.step(prev_index)
    }

    pub fn close(self) -> Self {
        Self {
            state: State::Closed,
            issued: self.issued,
        }
    }

    /// Route one input. Swipes shorter than `swipe_threshold` close the
    /// lightbox; longer ones navigate (left swipe is next).
    pub fn handle(self, input: Input, swipe_threshold: f64) -> (Self, Option<Probe>) {
        if !self.is_open() {
            return (self, None);
        }
        match input {
            Input::Next | Input::Key(Key::ArrowRight) => self.next(),
            Input::Prev | Input::Key(Key::ArrowLeft) => self.prev(),
            Input::CloseButton | Input::Overlay | Input::Key(Key::Escape) => (self.close(), None),
            Input::Swipe { dx } if dx.abs() > swipe_threshold => {
                if dx > 0.0 {
                    self.next()
                } else {
                    self.prev()
                }
            }
            Input::Swipe { .. } => (self.close(), None),
        }
    }

    /// The probe `ticket` finished loading. Stale tickets are ignored.
    pub fn probe_loaded(mut self, ticket: Ticket) -> Self {
        if let State::Open {
            slides,
            index,
            display,
            pending,
        } = &mut self.state
        {
            if *pending == ticket {
                let slide = &slides[*index];
                *display = Display::Image {
                    url: slide.url.clone(),
                    caption: slide.caption.clone(),
                };
            }
        }
        self
    }

    /// The probe `ticket` failed. Stale tickets are ignored.
    pub fn probe_failed(mut self, ticket: Ticket) -> Self {
        if let State::Open {
            display, pending, ..
        } = &mut self.state
        {
            if *pending == ticket {
                let url = match display {
                    Display::Image { url, .. } => Some(url.clone()),
                    Display::Failed { url, .. } => url.clone(),
                    Display::Loading => None,
                };
                *display = Display::Failed {
                    url,
                    error: LOAD_ERROR_TEXT.to_string(),
                };
            }
        }
        self
    }

    fn step(self, advance: fn(usize, usize) -> usize) -> (Self, Option<Probe>) {
        let issued = self.issued;
        let closed = Self {
            state: State::Closed,
            issued,
        };
        match self.state {
            State::Open {
                slides,
                index,
                display,
                ..
            } => {
                let target = advance(index, slides.len());
                closed.show(slides, target, display)
            }
            State::Closed => (closed, None),
        }
    }

    /// Enter `index`, keeping the current display until the new probe lands.
    fn show(self, slides: Vec<Slide>, index: usize, display: Display) -> (Self, Option<Probe>) {
        let ticket = Ticket(self.issued + 1);
        let probe = Probe {
            ticket,
            url: slides[index].url.clone(),
        };
        let next = Self {
            state: State::Open {
                slides,
                index,
                display,
                pending: ticket,
            },
            issued: ticket.0,
        };
        (next, Some(probe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(n: usize) -> Vec<Slide> {
        (0..n)
            .map(|i| Slide {
                url: format!("https://cdn/{i}.jpg"),
                caption: Some(format!("Photo {i}")),
            })
            .collect()
    }

    #[test]
    fn index_arithmetic_wraps_both_ways() {
        assert_eq!(next_index(4, 5), 0);
        assert_eq!(prev_index(0, 5), 4);
        assert_eq!(next_index(1, 5), 2);
        assert_eq!(prev_index(3, 5), 2);
        assert_eq!(next_index(0, 1), 0);
        assert_eq!(prev_index(0, 0), 0);
    }

    #[test]
    fn open_issues_probe_for_index() {
        let (lb, probe) = Lightbox::new().open(slides(3), 2);
        assert_eq!(lb.index(), Some(2));
        assert_eq!(lb.display(), Some(&Display::Loading));
        assert_eq!(probe.unwrap().url, "https://cdn/2.jpg");
    }

    #[test]
    fn open_out_of_range_stays_closed() {
        let (lb, probe) = Lightbox::new().open(slides(2), 5);
        assert!(!lb.is_open());
        assert!(probe.is_none());
        assert!(!Lightbox::new().open(Vec::new(), 0).0.is_open());
    }

    #[test]
    fn next_from_last_wraps_to_first() {
        let (lb, _) = Lightbox::new().open(slides(4), 3);
        let (lb, probe) = lb.next();
        assert_eq!(lb.index(), Some(0));
        assert_eq!(probe.unwrap().url, "https://cdn/0.jpg");
    }

    #[test]
    fn prev_from_first_wraps_to_last() {
        let (lb, _) = Lightbox::new().open(slides(4), 0);
        let (lb, _) = lb.prev();
        assert_eq!(lb.index(), Some(3));
    }

    #[test]
    fn loaded_probe_swaps_image() {
        let (lb, probe) = Lightbox::new().open(slides(3), 1);
        let lb = lb.probe_loaded(probe.unwrap().ticket);
        assert_eq!(
            lb.display(),
            Some(&Display::Image {
                url: "https://cdn/1.jpg".into(),
                caption: Some("Photo 1".into()),
            })
        );
    }

    #[test]
    fn stale_probe_is_ignored() {
        let (lb, first) = Lightbox::new().open(slides(3), 0);
        let (lb, second) = lb.next();
        let (lb, third) = lb.next();

        // Earlier probes resolve late; the display must not change
        let lb = lb.probe_loaded(second.unwrap().ticket);
        let lb = lb.probe_loaded(first.unwrap().ticket);
        assert_eq!(lb.display(), Some(&Display::Loading));

        let lb = lb.probe_loaded(third.unwrap().ticket);
        assert!(matches!(lb.display(), Some(Display::Image { url, .. }) if url == "https://cdn/2.jpg"));
    }

    #[test]
    fn failed_probe_replaces_caption_with_error() {
        let (lb, p0) = Lightbox::new().open(slides(2), 0);
        let lb = lb.probe_loaded(p0.unwrap().ticket);
        let (lb, p1) = lb.next();
        let lb = lb.probe_failed(p1.unwrap().ticket);
        assert_eq!(
            lb.display(),
            Some(&Display::Failed {
                url: Some("https://cdn/0.jpg".into()),
                error: LOAD_ERROR_TEXT.into(),
            })
        );
        assert_eq!(lb.index(), Some(1));
    }

    #[test]
    fn stale_failure_is_ignored() {
        let (lb, p0) = Lightbox::new().open(slides(2), 0);
        let (lb, _) = lb.next();
        let lb = lb.probe_failed(p0.unwrap().ticket);
        assert_eq!(lb.display(), Some(&Display::Loading));
    }

    #[test]
    fn close_inputs() {
        for input in [Input::CloseButton, Input::Overlay, Input::Key(Key::Escape)] {
            let (lb, _) = Lightbox::new().open(slides(2), 0);
            let (lb, probe) = lb.handle(input, 50.0);
            assert!(!lb.is_open(), "{input:?} should close");
            assert!(probe.is_none());
        }
    }

    #[test]
    fn keys_navigate() {
        let (lb, _) = Lightbox::new().open(slides(3), 0);
        let (lb, _) = lb.handle(Input::Key(Key::ArrowLeft), 50.0);
        assert_eq!(lb.index(), Some(2));
        let (lb, _) = lb.handle(Input::Key(Key::ArrowRight), 50.0);
        assert_eq!(lb.index(), Some(0));
    }

    #[test]
    fn swipe_past_threshold_navigates_short_swipe_closes() {
        let (lb, _) = Lightbox::new().open(slides(3), 1);
        let (lb, _) = lb.handle(Input::Swipe { dx: 80.0 }, 50.0);
        assert_eq!(lb.index(), Some(2));
        let (lb, _) = lb.handle(Input::Swipe { dx: -80.0 }, 50.0);
        assert_eq!(lb.index(), Some(1));
        let (lb, _) = lb.handle(Input::Swipe { dx: 10.0 }, 50.0);
        assert!(!lb.is_open());
    }

    #[test]
    fn input_while_closed_is_ignored() {
        let (lb, probe) = Lightbox::new().handle(Input::Next, 50.0);
        assert!(!lb.is_open());
        assert!(probe.is_none());
    }

    #[test]
    fn tickets_keep_increasing_across_close() {
        let (lb, a) = Lightbox::new().open(slides(2), 0);
        let (_, b) = lb.close().open(slides(2), 1);
        assert!(b.unwrap().ticket > a.unwrap().ticket);
    }
}
