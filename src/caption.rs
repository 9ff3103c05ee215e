use std::sync::Arc;

use crate::style::Style;
use crate::time::Time;

/// A single timed cue.
///
/// `content` is kept as the source format wrote it, with line breaks
/// normalised to `\n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub start: Time,
    pub end: Time,
    pub style: Option<Arc<Style>>,
    pub content: String,
}

impl Caption {
    pub fn new<S: Into<String>>(start: Time, end: Time, content: S) -> Self {
        Caption {
            start,
            end,
            style: None,
            content: content.into(),
        }
    }

    pub fn with_style(mut self, style: Arc<Style>) -> Self {
        self.style = Some(style);
        self
    }

    /// Whether the caption is on screen at `time`: `start <= time < end`.
    pub fn is_appropriate_for(&self, time: Time) -> bool {
        self.start <= time && time < self.end
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub fn style_id(&self) -> Option<&str> {
        self.style.as_deref().map(|s| s.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appropriate_on_half_open_interval() {
        let caption = Caption::new(Time::from_millis(1000), Time::from_millis(2000), "Hi");
        assert!(!caption.is_appropriate_for(Time::from_millis(999)));
        assert!(caption.is_appropriate_for(Time::from_millis(1000)));
        assert!(caption.is_appropriate_for(Time::from_millis(1999)));
        assert!(!caption.is_appropriate_for(Time::from_millis(2000)));
    }

    #[test]
    fn inverted_interval_is_never_appropriate() {
        let caption = Caption::new(Time::from_millis(2000), Time::from_millis(1000), "Hi");
        assert!(!caption.is_appropriate_for(Time::from_millis(1500)));
        assert!(!caption.is_appropriate_for(Time::from_millis(2000)));
    }

    #[test]
    fn styles_are_shared() {
        let style = Arc::new(Style::new("Main"));
        let a = Caption::new(Time::ZERO, Time::from_millis(10), "a").with_style(Arc::clone(&style));
        let b = Caption::new(Time::ZERO, Time::from_millis(10), "b").with_style(Arc::clone(&style));
        assert_eq!(a.style_id(), Some("Main"));
        assert!(Arc::ptr_eq(a.style.as_ref().unwrap(), b.style.as_ref().unwrap()));
        assert_eq!(Arc::strong_count(&style), 3);
    }
}
