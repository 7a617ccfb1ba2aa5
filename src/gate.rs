//! Admission checks applied before anything is queued.

use std::collections::HashSet;

use tracing::debug;

use crate::notify::{Message, Notice, Notifier};
use crate::queue::CandidateItem;

/// Returns false, after one "no items" notification, when both sets are empty.
///
/// Content is not inspected; any non-empty input passes.
pub fn sanity(links: &[CandidateItem], media: &[CandidateItem], notifier: &dyn Notifier) -> bool {
    if links.is_empty() && media.is_empty() {
        debug!("no candidates offered");
        notifier.notify(Notice::new(Message::NoItems));
        return false;
    }
    true
}

/// Merges `sequences` into one list without duplicates.
///
/// The first occurrence of each item wins and keeps its position; identity is
/// [`CandidateItem::identity`].
#[must_use]
pub fn make_unique(sequences: &[&[CandidateItem]]) -> Vec<CandidateItem> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in sequences.iter().flat_map(|sequence| sequence.iter()) {
        if seen.insert(item.identity()) {
            unique.push(item.clone());
        }
    }
    unique
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notice>>);

    impl Notifier for Recorder {
        fn notify(&self, notice: Notice) {
            self.0.lock().unwrap().push(notice);
        }
    }

    fn link(url: &str) -> CandidateItem {
        CandidateItem::link(url)
    }

    #[test]
    fn test_sanity_empty_fails_with_one_notice() {
        let notifier = Recorder::default();
        assert!(!sanity(&[], &[], &notifier));
        let notices = notifier.0.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, Message::NoItems);
    }

    #[test]
    fn test_sanity_non_empty_passes_silently() {
        let notifier = Recorder::default();
        let x = [link("https://example.com/x")];
        let y = [CandidateItem::media("https://example.com/y.png")];
        assert!(sanity(&x, &[], &notifier));
        assert!(sanity(&[], &y, &notifier));
        assert!(sanity(&x, &y, &notifier));
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sanity_does_not_validate_content() {
        let notifier = Recorder::default();
        assert!(sanity(&[link("")], &[], &notifier));
    }

    #[test]
    fn test_make_unique_keeps_first_occurrence_order() {
        let first = [
            link("https://example.com/b"),
            link("https://example.com/a"),
            link("https://example.com/b#frag"),
        ];
        let second = [link("https://example.com/c"), link("https://example.com/a")];

        let unique = make_unique(&[&first, &second]);
        let urls: Vec<_> = unique.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/b",
                "https://example.com/a",
                "https://example.com/c"
            ]
        );
    }

    #[test]
    fn test_make_unique_never_drops_distinct_items() {
        let items: Vec<_> = (0..50)
            .map(|n| link(&format!("https://example.com/{n}.zip")))
            .collect();
        assert_eq!(make_unique(&[items.as_slice()]), items);
    }
}
