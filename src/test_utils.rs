//! Test doubles for the engine contract.
//!
//! `FakeFactory`/`FakeProbe` let tests script engine behavior (readings,
//! events, supported commands, construction failures) and observe every call
//! the controller makes, without any real document backend.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::engine::{
    EngineConfig, EngineError, EngineFactory, EngineReading, EventSender, MountRegion,
    RenderingEngine, VisualQuality, ZoomDirection,
};

/// Which commands the fake engine claims to implement.
#[derive(Debug, Clone, Copy)]
pub struct FakeSupports {
    pub next: bool,
    pub prev: bool,
    pub goto: bool,
    pub zoom: bool,
    pub fullscreen: bool,
}

impl Default for FakeSupports {
    fn default() -> Self {
        Self {
            next: true,
            prev: true,
            goto: true,
            zoom: false,
            fullscreen: false,
        }
    }
}

#[derive(Default)]
pub struct ProbeState {
    pub builds: u32,
    pub disposes: u32,
    /// Ordered record of factory/engine calls: `build`, `dispose`, `next`,
    /// `prev`, `goto:<n>`, `zoom`, `fullscreen`, `paint`.
    pub call_log: Vec<String>,
    pub last_start_page: Option<u32>,
    pub last_quality: Option<VisualQuality>,
    /// Event senders handed out per build, oldest first. Tests use these to
    /// fire events, including from stale generations.
    pub senders: Vec<EventSender>,
    pub reading: EngineReading,
    pub supports: FakeSupports,
}

/// Shared observation handle into every engine a [`FakeFactory`] builds.
#[derive(Clone, Default)]
pub struct FakeProbe(Rc<RefCell<ProbeState>>);

impl FakeProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, ProbeState> {
        self.0.borrow()
    }

    #[must_use]
    pub fn builds(&self) -> u32 {
        self.0.borrow().builds
    }

    #[must_use]
    pub fn disposes(&self) -> u32 {
        self.0.borrow().disposes
    }

    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.0.borrow().call_log.clone()
    }

    pub fn set_reading(&self, reading: EngineReading) {
        self.0.borrow_mut().reading = reading;
    }

    pub fn set_supports(&self, supports: FakeSupports) {
        self.0.borrow_mut().supports = supports;
    }

    /// Sender belonging to build number `index` (0-based).
    #[must_use]
    pub fn sender(&self, index: usize) -> EventSender {
        self.0.borrow().senders[index].clone()
    }

    #[must_use]
    pub fn latest_sender(&self) -> EventSender {
        self.0
            .borrow()
            .senders
            .last()
            .expect("no engine built yet")
            .clone()
    }

    pub fn fire_ready(&self) {
        self.latest_sender().ready();
    }

    pub fn fire_navigated(&self) {
        self.latest_sender().navigated();
    }

    pub fn fire_load_failed(&self, message: &str) {
        self.latest_sender().load_failed(message);
    }

    fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().call_log.push(entry.into());
    }
}

/// Factory building scripted engines against a shared probe.
pub struct FakeFactory {
    probe: FakeProbe,
    pub fail_next_build: Cell<bool>,
}

impl FakeFactory {
    #[must_use]
    pub fn new(probe: FakeProbe) -> Self {
        Self {
            probe,
            fail_next_build: Cell::new(false),
        }
    }
}

impl EngineFactory for FakeFactory {
    fn label(&self) -> &'static str {
        "fake"
    }

    fn build(&self, config: EngineConfig) -> Result<Box<dyn RenderingEngine>, EngineError> {
        if self.fail_next_build.take() {
            self.probe.record("build_failed");
            return Err(EngineError::Construction(
                "scripted construction failure".into(),
            ));
        }

        {
            let mut state = self.probe.0.borrow_mut();
            state.builds += 1;
            state.last_start_page = Some(config.start_page);
            state.last_quality = Some(config.quality);
            state.senders.push(config.events.clone());
        }
        self.probe.record("build");

        Ok(Box::new(FakeEngine {
            probe: self.probe.clone(),
        }))
    }
}

struct FakeEngine {
    probe: FakeProbe,
}

impl RenderingEngine for FakeEngine {
    fn reading(&self) -> EngineReading {
        self.probe.0.borrow().reading.clone()
    }

    fn paint(&mut self, region: &mut MountRegion, area: Rect) {
        self.probe.record("paint");
        let page = crate::engine::read_page_info(&self.reading())
            .page
            .unwrap_or(0);
        region.set_lines(vec![Line::from(format!(
            "fake page {page} ({}x{})",
            area.width, area.height
        ))]);
    }

    fn next_page(&mut self) -> bool {
        if self.probe.0.borrow().supports.next {
            self.probe.record("next");
            true
        } else {
            false
        }
    }

    fn prev_page(&mut self) -> bool {
        if self.probe.0.borrow().supports.prev {
            self.probe.record("prev");
            true
        } else {
            false
        }
    }

    fn goto_page(&mut self, page: u32) -> bool {
        if self.probe.0.borrow().supports.goto {
            self.probe.record(format!("goto:{page}"));
            true
        } else {
            false
        }
    }

    fn zoom(&mut self, _direction: ZoomDirection) -> bool {
        if self.probe.0.borrow().supports.zoom {
            self.probe.record("zoom");
            true
        } else {
            false
        }
    }

    fn toggle_fullscreen(&mut self) -> bool {
        if self.probe.0.borrow().supports.fullscreen {
            self.probe.record("fullscreen");
            true
        } else {
            false
        }
    }

    fn dispose(&mut self) {
        self.probe.0.borrow_mut().disposes += 1;
        self.probe.record("dispose");
    }
}
