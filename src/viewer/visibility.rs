//! One-shot viewport-proximity activation.
//!
//! Heavy engines are only worth constructing for content the user actually
//! scrolls to. The gate watches an anchor's row span against the visible
//! window (both in the same virtual coordinate space), fires exactly once
//! when they come within the margin of each other, and is inert afterwards.
//! The first check counts: an anchor that is already visible on mount fires
//! immediately, not only on a transition.

#[derive(Debug)]
pub struct VisibilityGate {
    margin_rows: u16,
    fired: bool,
}

impl VisibilityGate {
    #[must_use]
    pub fn new(margin_rows: u16) -> Self {
        Self {
            margin_rows,
            fired: false,
        }
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Check the anchor rows `[anchor_top, anchor_bottom)` against the
    /// visible rows `[view_top, view_bottom)`. Returns true on the single
    /// activation; every later call returns false.
    pub fn check(
        &mut self,
        anchor_top: i32,
        anchor_bottom: i32,
        view_top: i32,
        view_bottom: i32,
    ) -> bool {
        if self.fired {
            return false;
        }

        let margin = i32::from(self.margin_rows);
        let near = anchor_bottom > view_top.saturating_sub(margin)
            && anchor_top < view_bottom.saturating_add(margin);
        if near {
            self.fired = true;
        }
        near
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_first_check_when_already_visible() {
        let mut gate = VisibilityGate::new(0);
        assert!(gate.check(2, 10, 0, 20));
        assert!(gate.has_fired());
    }

    #[test]
    fn fires_exactly_once() {
        let mut gate = VisibilityGate::new(0);
        assert!(gate.check(0, 5, 0, 10));
        // anchor leaves and re-enters the viewport: no further signals
        assert!(!gate.check(100, 105, 0, 10));
        assert!(!gate.check(0, 5, 0, 10));
    }

    #[test]
    fn margin_extends_the_window() {
        let mut below = VisibilityGate::new(0);
        assert!(!below.check(25, 30, 0, 20));

        let mut near = VisibilityGate::new(10);
        assert!(near.check(25, 30, 0, 20));
    }

    #[test]
    fn stays_silent_while_out_of_range() {
        let mut gate = VisibilityGate::new(2);
        assert!(!gate.check(50, 60, 0, 20));
        assert!(!gate.check(50, 60, 10, 30));
        assert!(!gate.has_fired());
        // scrolled close enough now
        assert!(gate.check(50, 60, 40, 49));
    }
}
