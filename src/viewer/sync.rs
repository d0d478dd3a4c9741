//! Page-state synchronization.
//!
//! [`ViewState`] follows a monotonic-knowledge policy: once a page number or
//! count is known for a session, an ambiguous later reading never regresses
//! it to unknown. Only a session rebuild resets the state.

use std::time::{Duration, Instant};

use crate::engine::{PageInfo, read_page_info};

use super::session::ViewerController;

/// How long to wait for engines that report their page count a moment after
/// the ready signal. One re-read per ready event, never a polling loop.
pub const PAGE_COUNT_RECHECK: Duration = Duration::from_millis(250);

/// Displayed navigation state, owned by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    current_page: Option<u32>,
    page_count: Option<u32>,
}

/// Result of absorbing one engine reading.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Absorbed {
    pub changed: bool,
    /// Set when the engine confirmed a page different from the displayed one.
    pub confirmed_page: Option<u32>,
}

impl ViewState {
    #[must_use]
    pub fn current_page(&self) -> Option<u32> {
        self.current_page
    }

    #[must_use]
    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    /// Clamp a requested page to `[1, page_count]`, or `[1, ∞)` while the
    /// count is unknown.
    #[must_use]
    pub fn clamp_page(&self, page: u32) -> u32 {
        let page = page.max(1);
        match self.page_count {
            Some(total) if total >= 1 => page.min(total),
            _ => page,
        }
    }

    /// Immediate page update issued by the command surface before the engine
    /// confirms. Not reported to the observer.
    pub(crate) fn note_optimistic_page(&mut self, page: u32) {
        self.current_page = Some(page);
    }

    pub(crate) fn absorb(&mut self, info: PageInfo) -> Absorbed {
        let mut outcome = Absorbed::default();

        if let Some(page) = info.page {
            if self.current_page != Some(page) {
                self.current_page = Some(page);
                outcome.changed = true;
                outcome.confirmed_page = Some(page);
            }
        }
        if let Some(total) = info.total {
            if self.page_count != Some(total) {
                self.page_count = Some(total);
                outcome.changed = true;
            }
        }

        outcome
    }
}

impl ViewerController {
    /// Tolerant re-read of the active engine's state; updates the view and
    /// notifies the page observer on confirmed changes.
    pub(crate) fn absorb_reading(&mut self) -> bool {
        let Some(handle) = &self.handle else {
            return false;
        };
        let info = read_page_info(&handle.engine.reading());
        let outcome = self.view.absorb(info);

        if let Some(page) = outcome.confirmed_page {
            if let Some(observer) = &mut self.observer {
                observer(page);
            }
        }
        outcome.changed
    }

    /// Run the deferred page-count re-read if its deadline passed. Single
    /// shot: scheduling happens only on a ready event.
    pub(crate) fn run_recheck(&mut self, now: Instant) -> bool {
        match self.recheck_at {
            Some(deadline) if now >= deadline => {
                self.recheck_at = None;
                self.absorb_reading()
            }
            _ => false,
        }
    }

    /// Run the re-read a navigation command scheduled for the next tick.
    pub(crate) fn consume_reread(&mut self) -> bool {
        if self.reread_scheduled {
            self.reread_scheduled = false;
            self.absorb_reading()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_updates_from_unknown() {
        let mut view = ViewState::default();
        let outcome = view.absorb(PageInfo {
            page: Some(1),
            total: Some(10),
        });

        assert!(outcome.changed);
        assert_eq!(outcome.confirmed_page, Some(1));
        assert_eq!(view.current_page(), Some(1));
        assert_eq!(view.page_count(), Some(10));
    }

    #[test]
    fn absorb_ignores_unknown_readings_once_known() {
        let mut view = ViewState::default();
        view.absorb(PageInfo {
            page: Some(3),
            total: Some(10),
        });

        let outcome = view.absorb(PageInfo::default());
        assert_eq!(outcome, Absorbed::default());
        assert_eq!(view.current_page(), Some(3));
        assert_eq!(view.page_count(), Some(10));
    }

    #[test]
    fn absorb_same_page_confirms_nothing() {
        let mut view = ViewState::default();
        view.note_optimistic_page(5);

        let outcome = view.absorb(PageInfo {
            page: Some(5),
            total: None,
        });
        assert!(!outcome.changed);
        assert_eq!(outcome.confirmed_page, None);
    }

    #[test]
    fn clamp_page_with_and_without_count() {
        let mut view = ViewState::default();
        assert_eq!(view.clamp_page(0), 1);
        assert_eq!(view.clamp_page(500), 500);

        view.absorb(PageInfo {
            page: Some(1),
            total: Some(10),
        });
        assert_eq!(view.clamp_page(25), 10);
        assert_eq!(view.clamp_page(7), 7);
    }
}
