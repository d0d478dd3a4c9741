//! Rendering engine contract.
//!
//! Engines are opaque to the rest of folio: the viewer controller constructs
//! them through an [`EngineFactory`], forwards commands, and learns about
//! their state only through [`EngineEvent`]s and tolerant reads of
//! [`EngineReading`]. Two engines ship: the spread-based flipbook engine for
//! plain-text sources, and the PDF engine behind the `pdf` cargo feature.

pub mod flipbook;
pub mod pdf;
mod reading;

pub use reading::{EngineReading, PageInfo, read_page_info};

use std::rc::Rc;
use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::text::Line;
use thiserror::Error;

use crate::library::{DocumentKind, DocumentSource};

/// Identifies one constructed engine instance. Generations are assigned by
/// the controller; events carrying an older generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Engine failure taxonomy.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine's backing library is not present in this build.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    /// The engine threw while being constructed.
    #[error("engine construction failed: {0}")]
    Construction(String),
    /// The engine reported a document load failure after construction.
    #[error("engine failed to load document: {0}")]
    Load(String),
}

/// Events an engine emits back to its controller.
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub engine: EngineId,
    pub kind: EngineEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    /// The engine finished initializing and can accept commands.
    Ready,
    /// The engine's current page changed.
    Navigated,
    /// The document could not be loaded inside the engine.
    LoadFailed(String),
}

/// Generation-tagged sender handed to each engine at construction time.
///
/// Sends are fire-and-forget: a dropped receiver means the hosting shell is
/// gone, and the event is irrelevant by definition.
#[derive(Clone)]
pub struct EventSender {
    engine: EngineId,
    tx: flume::Sender<EngineEvent>,
}

impl EventSender {
    #[must_use]
    pub fn new(engine: EngineId, tx: flume::Sender<EngineEvent>) -> Self {
        Self { engine, tx }
    }

    #[must_use]
    pub fn engine(&self) -> EngineId {
        self.engine
    }

    pub fn ready(&self) {
        self.send(EngineEventKind::Ready);
    }

    pub fn navigated(&self) {
        self.send(EngineEventKind::Navigated);
    }

    pub fn load_failed(&self, message: impl Into<String>) {
        self.send(EngineEventKind::LoadFailed(message.into()));
    }

    fn send(&self, kind: EngineEventKind) {
        let _ = self.tx.send(EngineEvent {
            engine: self.engine,
            kind,
        });
    }
}

/// The text surface an engine paints into. Exclusively owned by the
/// controller; cleared before every rebuild and on teardown so a disposed
/// engine can never leave content behind.
#[derive(Default)]
pub struct MountRegion {
    lines: Vec<Line<'static>>,
}

impl MountRegion {
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn set_lines(&mut self, lines: Vec<Line<'static>>) {
        self.lines = lines;
    }

    #[must_use]
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }
}

/// Device-tier rendering flags. Narrow panes skip the decorative effects the
/// flipbook engine would otherwise draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualQuality {
    /// Shade the spread gutter and page edges.
    pub flip_shading: bool,
    /// Draw the paper texture margin around pages.
    pub page_texture: bool,
}

impl VisualQuality {
    /// Panes narrower than this get the reduced tier.
    pub const NARROW_WIDTH: u16 = 70;

    #[must_use]
    pub fn full() -> Self {
        Self {
            flip_shading: true,
            page_texture: true,
        }
    }

    #[must_use]
    pub fn reduced() -> Self {
        Self {
            flip_shading: false,
            page_texture: false,
        }
    }

    #[must_use]
    pub fn for_width(width: u16) -> Self {
        if width < Self::NARROW_WIDTH {
            Self::reduced()
        } else {
            Self::full()
        }
    }
}

/// Zoom command direction forwarded to engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Everything an engine receives at construction time.
pub struct EngineConfig {
    pub source: DocumentSource,
    /// 1-based, already clamped to >= 1 by the controller.
    pub start_page: u32,
    pub quality: VisualQuality,
    pub events: EventSender,
}

/// An opaque rendering engine.
///
/// Command methods return `true` when the engine implements and handled the
/// command; `false` means "not supported", which callers never treat as an
/// error. Confirmation of navigation arrives later through events, not
/// through the return value.
pub trait RenderingEngine {
    /// Raw navigation state as the engine currently reports it.
    fn reading(&self) -> EngineReading;

    /// Draw current content into the mount region sized to `area`.
    fn paint(&mut self, region: &mut MountRegion, area: Rect);

    /// Cooperative timeslice for engines with deferred internal work.
    fn tick(&mut self, _now: Instant) {}

    fn next_page(&mut self) -> bool {
        false
    }

    fn prev_page(&mut self) -> bool {
        false
    }

    fn goto_page(&mut self, _page: u32) -> bool {
        false
    }

    fn zoom(&mut self, _direction: ZoomDirection) -> bool {
        false
    }

    fn toggle_fullscreen(&mut self) -> bool {
        false
    }

    /// Release engine resources. The controller calls this exactly once,
    /// before dropping the handle.
    fn dispose(&mut self) {}
}

/// Builds engines for one document kind.
pub trait EngineFactory {
    fn label(&self) -> &'static str;

    fn build(&self, config: EngineConfig) -> Result<Box<dyn RenderingEngine>, EngineError>;
}

/// The factories folio ships, keyed by document kind.
pub struct EngineSet {
    flipbook: Rc<dyn EngineFactory>,
    pdf: Rc<dyn EngineFactory>,
}

impl EngineSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flipbook: Rc::new(flipbook::FlipbookFactory),
            pdf: Rc::new(pdf::PdfFactory),
        }
    }

    #[must_use]
    pub fn factory_for(&self, kind: DocumentKind) -> Rc<dyn EngineFactory> {
        match kind {
            DocumentKind::Text => Rc::clone(&self.flipbook),
            DocumentKind::Pdf => Rc::clone(&self.pdf),
        }
    }
}

impl Default for EngineSet {
    fn default() -> Self {
        Self::new()
    }
}
