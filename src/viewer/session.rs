//! Engine session lifecycle.
//!
//! [`ViewerController`] is the only owner of a live engine handle. The rules
//! it enforces:
//!
//! - at most one non-disposed engine per controller, keyed by
//!   `(document source, retry nonce)`;
//! - dispose the old engine and clear the mount region strictly before
//!   constructing a new one;
//! - construction failures become [`LoadStatus::Failed`] and never propagate;
//! - events from an engine that is no longer the active generation are
//!   dropped on the floor.

use std::time::Instant;

use ratatui::layout::Rect;

use crate::engine::{
    EngineConfig, EngineEvent, EngineEventKind, EngineFactory, EngineId, EventSender, MountRegion,
    RenderingEngine, VisualQuality,
};
use crate::library::DocumentSource;

use super::sync::{PAGE_COUNT_RECHECK, ViewState};

/// One document open in one UI slot.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    pub source: DocumentSource,
    pub display_title: String,
    /// Deep-link page supplied by the host, e.g. the last read page.
    pub requested_initial_page: Option<u32>,
}

impl ViewerSession {
    #[must_use]
    pub fn new(source: DocumentSource, display_title: impl Into<String>) -> Self {
        Self {
            source,
            display_title: display_title.into(),
            requested_initial_page: None,
        }
    }

    #[must_use]
    pub fn with_initial_page(mut self, page: Option<u32>) -> Self {
        self.requested_initial_page = page;
        self
    }

    /// Start page for the engine: caller-requested, clamped to >= 1.
    #[must_use]
    pub fn start_page(&self) -> u32 {
        self.requested_initial_page.unwrap_or(1).max(1)
    }
}

/// Shell/controller lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Visibility gate has not fired yet; no engine cost paid.
    #[default]
    NotActivated,
    /// Engine constructed, ready event not yet received.
    Pending,
    Ready,
    Failed(String),
}

impl LoadStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub(crate) struct EngineHandle {
    pub(crate) id: EngineId,
    pub(crate) engine: Box<dyn RenderingEngine>,
}

/// Identity of one build attempt. A failed build keeps its key recorded so
/// `ensure_session` stays idempotent until the user bumps the retry nonce or
/// changes the source. That is what "no automatic retry" means here.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionKey {
    source: DocumentSource,
    nonce: u64,
}

type PageObserver = Box<dyn FnMut(u32)>;

pub struct ViewerController {
    pub(crate) status: LoadStatus,
    pub(crate) handle: Option<EngineHandle>,
    pub(crate) region: MountRegion,
    pub(crate) view: ViewState,
    pub(crate) observer: Option<PageObserver>,
    /// One-shot deadline for the delayed page-count re-read.
    pub(crate) recheck_at: Option<Instant>,
    /// Re-read requested by a navigation command, consumed next tick.
    pub(crate) reread_scheduled: bool,
    active_key: Option<SessionKey>,
    retry_nonce: u64,
    next_generation: u64,
    events_tx: flume::Sender<EngineEvent>,
    events_rx: flume::Receiver<EngineEvent>,
}

impl ViewerController {
    #[must_use]
    pub fn new() -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        Self {
            status: LoadStatus::default(),
            handle: None,
            region: MountRegion::default(),
            view: ViewState::default(),
            observer: None,
            recheck_at: None,
            reread_scheduled: false,
            active_key: None,
            retry_nonce: 0,
            next_generation: 1,
            events_tx,
            events_rx,
        }
    }

    /// Host callback invoked with every newly confirmed page number.
    pub fn set_page_observer(&mut self, observer: PageObserver) {
        self.observer = Some(observer);
    }

    #[must_use]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn region(&self) -> &MountRegion {
        &self.region
    }

    #[must_use]
    pub fn has_engine(&self) -> bool {
        self.handle.is_some()
    }

    /// Build an engine for `session` unless one already exists for the same
    /// source and retry nonce. Idempotent on unchanged input; a changed
    /// source disposes the old engine and clears the region before the new
    /// construction.
    pub fn ensure_session(
        &mut self,
        session: &ViewerSession,
        factory: &dyn EngineFactory,
        quality: VisualQuality,
    ) {
        let key = SessionKey {
            source: session.source.clone(),
            nonce: self.retry_nonce,
        };
        if self.active_key.as_ref() == Some(&key) {
            return;
        }

        self.teardown_engine();
        self.view = ViewState::default();
        self.active_key = Some(key);
        self.status = LoadStatus::Pending;

        let id = EngineId::new(self.next_generation);
        self.next_generation += 1;

        let config = EngineConfig {
            source: session.source.clone(),
            start_page: session.start_page(),
            quality,
            events: EventSender::new(id, self.events_tx.clone()),
        };

        match factory.build(config) {
            Ok(engine) => {
                log::info!(
                    "{} engine #{} built for {}",
                    factory.label(),
                    id.raw(),
                    session.source.path.display()
                );
                self.handle = Some(EngineHandle { id, engine });
            }
            Err(err) => {
                log::error!(
                    "{} engine build failed for {}: {err}",
                    factory.label(),
                    session.source.path.display()
                );
                self.status = LoadStatus::Failed(err.to_string());
            }
        }
    }

    /// User-triggered retry: invalidates the current session key so the next
    /// `ensure_session` call performs exactly one fresh build attempt.
    pub fn retry(&mut self) {
        self.retry_nonce += 1;
    }

    /// Tear down everything. Safe in every lifecycle state; runs the same
    /// path on drop.
    pub fn unmount(&mut self) {
        self.teardown_engine();
        self.view = ViewState::default();
        self.active_key = None;
        self.status = LoadStatus::NotActivated;
    }

    /// Pump engine events, run due deferred work. Returns true when visible
    /// state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(handle) = &mut self.handle {
            handle.engine.tick(now);
        }

        let mut changed = self.pump_events(now);
        changed |= self.run_recheck(now);
        changed |= self.consume_reread();
        changed
    }

    /// Let the active engine draw into the mount region. No-op unless ready.
    pub fn paint(&mut self, area: Rect) {
        if !self.status.is_ready() {
            return;
        }
        if let Some(handle) = &mut self.handle {
            handle.engine.paint(&mut self.region, area);
        }
    }

    fn pump_events(&mut self, now: Instant) -> bool {
        let mut changed = false;

        while let Ok(event) = self.events_rx.try_recv() {
            let active = self.handle.as_ref().map(|h| h.id);
            if active != Some(event.engine) {
                log::debug!(
                    "dropping {:?} from stale engine #{}",
                    event.kind,
                    event.engine.raw()
                );
                continue;
            }

            match event.kind {
                EngineEventKind::Ready => {
                    if self.status == LoadStatus::Pending {
                        self.status = LoadStatus::Ready;
                        changed = true;
                    }
                    changed |= self.absorb_reading();
                    // Some engines report the count a beat after ready.
                    if self.view.page_count().is_none() && self.recheck_at.is_none() {
                        self.recheck_at = Some(now + PAGE_COUNT_RECHECK);
                    }
                }
                EngineEventKind::Navigated => {
                    changed |= self.absorb_reading();
                }
                EngineEventKind::LoadFailed(message) => {
                    log::error!("engine load failure: {message}");
                    self.teardown_engine();
                    self.status = LoadStatus::Failed(message);
                    changed = true;
                }
            }
        }

        changed
    }

    /// Dispose-then-clear, in that order, on every exit path.
    fn teardown_engine(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.engine.dispose();
        }
        self.region.clear();
        self.recheck_at = None;
        self.reread_scheduled = false;
    }
}

impl Default for ViewerController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewerController {
    fn drop(&mut self) {
        self.teardown_engine();
    }
}
