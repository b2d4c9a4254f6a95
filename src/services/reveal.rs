use std::sync::Arc;

use crate::config::RevealConfig;

/// Window over an already-fetched collection.
///
/// `visible_count` only grows between two [`reset`](Self::reset) calls and is
/// always clamped to the collection length the caller passes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementalReveal {
    page_size: usize,
    increment: usize,
    visible: usize,
}

impl IncrementalReveal {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            page_size: config.page_size,
            increment: config.increment,
            visible: 0,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    /// Start over for a freshly fetched collection of `total` items.
    pub fn reset(&mut self, total: usize) {
        self.visible = self.page_size.min(total);
    }

    /// Grow the window by one increment. Returns `false` (and changes
    /// nothing) once everything is visible.
    pub fn reveal_more(&mut self, total: usize) -> bool {
        if self.visible >= total {
            return false;
        }
        self.visible = (self.visible + self.increment).min(total);
        true
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }
}

/// Viewport intersection facility of the host UI.
pub trait ViewportObserver: Send + Sync {
    fn observe(&self, element: &str);
    fn unobserve(&self, element: &str);
}

/// A live observation of one element. Dropping it stops the observation.
pub struct ObserverGuard {
    observer: Arc<dyn ViewportObserver>,
    element: String,
}

impl ObserverGuard {
    pub fn acquire(observer: Arc<dyn ViewportObserver>, element: &str) -> Self {
        observer.observe(element);
        Self {
            observer,
            element: element.to_string(),
        }
    }

    pub fn element(&self) -> &str {
        &self.element
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.observer.unobserve(&self.element);
    }
}

/// Keeps exactly one observation bound to the last rendered element.
pub struct SentinelTrigger {
    observer: Arc<dyn ViewportObserver>,
    bound: Option<ObserverGuard>,
}

impl SentinelTrigger {
    pub fn new(observer: Arc<dyn ViewportObserver>) -> Self {
        Self {
            observer,
            bound: None,
        }
    }

    /// Point the trigger at `element`, releasing the previous observation.
    /// Passing `None` (nothing rendered, or nothing left to reveal) detaches.
    pub fn bind(&mut self, element: Option<&str>) {
        if self.bound_element() == element {
            return;
        }
        // Old guard must be released before the new element is observed.
        self.bound = None;
        self.bound = element.map(|e| ObserverGuard::acquire(self.observer.clone(), e));
    }

    pub fn detach(&mut self) {
        self.bound = None;
    }

    pub fn bound_element(&self) -> Option<&str> {
        self.bound.as_ref().map(ObserverGuard::element)
    }

    /// Only the currently bound element may fire the trigger; events from
    /// elements that were replaced are ignored.
    pub fn is_sentinel(&self, element: &str) -> bool {
        self.bound_element() == Some(element)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ViewportObserver;
    use parking_lot::Mutex;

    /// Records observe/unobserve calls in order.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().clone()
        }

        pub fn active(&self) -> Vec<String> {
            let mut active = Vec::new();
            for event in self.events.lock().iter() {
                if let Some(el) = event.strip_prefix("observe:") {
                    active.push(el.to_string());
                } else if let Some(el) = event.strip_prefix("unobserve:") {
                    active.retain(|a| a != el);
                }
            }
            active
        }
    }

    impl ViewportObserver for RecordingObserver {
        fn observe(&self, element: &str) {
            self.events.lock().push(format!("observe:{element}"));
        }

        fn unobserve(&self, element: &str) {
            self.events.lock().push(format!("unobserve:{element}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingObserver;
    use super::*;

    fn reveal(page_size: usize, increment: usize) -> IncrementalReveal {
        IncrementalReveal::new(RevealConfig { page_size, increment })
    }

    #[test]
    fn test_reveal_sequence_is_clamped() {
        let mut r = reveal(7, 6);
        r.reset(20);

        let mut seen = vec![r.visible_count()];
        for _ in 0..4 {
            r.reveal_more(20);
            seen.push(r.visible_count());
        }
        assert_eq!(seen, vec![7, 13, 19, 20, 20]);
    }

    #[test]
    fn test_reveal_more_is_noop_when_exhausted() {
        let mut r = reveal(7, 6);
        r.reset(3);
        assert_eq!(r.visible_count(), 3);
        assert!(!r.has_more(3));

        for _ in 0..5 {
            assert!(!r.reveal_more(3));
        }
        assert_eq!(r.visible_count(), 3);
    }

    #[test]
    fn test_reset_for_empty_collection() {
        let mut r = reveal(7, 6);
        r.reset(0);
        assert_eq!(r.visible_count(), 0);
        assert!(!r.reveal_more(0));
    }

    #[test]
    fn test_trigger_rebinds_and_releases() {
        let observer = Arc::new(RecordingObserver::default());
        let mut trigger = SentinelTrigger::new(observer.clone());

        trigger.bind(Some("a"));
        trigger.bind(Some("a"));
        trigger.bind(Some("b"));
        assert!(trigger.is_sentinel("b"));
        assert!(!trigger.is_sentinel("a"));

        assert_eq!(observer.events(), vec!["observe:a", "unobserve:a", "observe:b"]);
        assert_eq!(observer.active(), vec!["b"]);

        trigger.bind(None);
        assert!(observer.active().is_empty());
        assert_eq!(trigger.bound_element(), None);
    }

    #[test]
    fn test_trigger_releases_on_drop() {
        let observer = Arc::new(RecordingObserver::default());
        {
            let mut trigger = SentinelTrigger::new(observer.clone());
            trigger.bind(Some("last"));
            assert_eq!(observer.active(), vec!["last"]);
        }
        assert!(observer.active().is_empty());
    }
}
