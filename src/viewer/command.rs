//! Command surface.
//!
//! The imperative actions a host UI may issue against the active engine.
//! Every command no-ops safely when no ready engine exists, and treats an
//! engine that does not implement it as "nothing to do" rather than an
//! error. Navigation commands schedule a state re-read on the next tick
//! because engines may confirm asynchronously.

use crate::engine::ZoomDirection;

use super::session::ViewerController;

/// What `toggle_fullscreen` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenOutcome {
    /// The engine has a native fullscreen toggle and handled it.
    EngineHandled,
    /// The engine has none; the host should run its own fullscreen path.
    HostFallback,
    /// No ready engine; nothing to do.
    Inactive,
}

impl ViewerController {
    pub fn next_page(&mut self) -> bool {
        if !self.status.is_ready() {
            return false;
        }
        let Some(handle) = &mut self.handle else {
            return false;
        };
        if handle.engine.next_page() {
            self.reread_scheduled = true;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.status.is_ready() {
            return false;
        }
        let Some(handle) = &mut self.handle else {
            return false;
        };
        if handle.engine.prev_page() {
            self.reread_scheduled = true;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped against the known page count. When the engine
    /// supports direct jumps the displayed page updates optimistically,
    /// before the engine confirms.
    pub fn jump_to(&mut self, page: u32) -> bool {
        if !self.status.is_ready() {
            return false;
        }
        let clamped = self.view.clamp_page(page);
        let Some(handle) = &mut self.handle else {
            return false;
        };
        if handle.engine.goto_page(clamped) {
            self.view.note_optimistic_page(clamped);
            self.reread_scheduled = true;
            true
        } else {
            false
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom(ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom(ZoomDirection::Out)
    }

    fn zoom(&mut self, direction: ZoomDirection) -> bool {
        if !self.status.is_ready() {
            return false;
        }
        match &mut self.handle {
            Some(handle) => handle.engine.zoom(direction),
            None => false,
        }
    }

    #[must_use]
    pub fn toggle_fullscreen(&mut self) -> FullscreenOutcome {
        if !self.status.is_ready() {
            return FullscreenOutcome::Inactive;
        }
        let Some(handle) = &mut self.handle else {
            return FullscreenOutcome::Inactive;
        };
        if handle.engine.toggle_fullscreen() {
            FullscreenOutcome::EngineHandled
        } else {
            FullscreenOutcome::HostFallback
        }
    }
}
