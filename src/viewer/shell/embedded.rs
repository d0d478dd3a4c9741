//! Embedded viewer shell.
//!
//! A scrollable detail pane: intro text on top, the viewer region below it.
//! The engine is only constructed once the viewer region scrolls within the
//! activation margin of the visible window.

use std::rc::Rc;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::engine::{EngineFactory, VisualQuality};
use crate::hud::HudMessage;
use crate::theme::Palette;
use crate::viewer::command::FullscreenOutcome;
use crate::viewer::session::{LoadStatus, ViewerController, ViewerSession};
use crate::viewer::visibility::VisibilityGate;

use super::{ShellAction, body_lines};

use crossterm::event::{KeyCode, KeyEvent};

pub struct EmbeddedShell {
    controller: ViewerController,
    gate: VisibilityGate,
    session: Option<ViewerSession>,
    factory: Option<Rc<dyn EngineFactory>>,
    intro: Vec<String>,
    scroll: u16,
    hud: Option<HudMessage>,
    reduce_effects: Option<bool>,
    last_width: u16,
}

impl EmbeddedShell {
    #[must_use]
    pub fn new(activation_margin: u16, reduce_effects: Option<bool>) -> Self {
        Self {
            controller: ViewerController::new(),
            gate: VisibilityGate::new(activation_margin),
            session: None,
            factory: None,
            intro: Vec::new(),
            scroll: 0,
            hud: None,
            reduce_effects,
            last_width: 80,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &ViewerController {
        &self.controller
    }

    #[must_use]
    pub fn session(&self) -> Option<&ViewerSession> {
        self.session.as_ref()
    }

    /// Show a document in this shell. A changed source rebuilds the engine
    /// (if the gate has fired); the same source is a no-op.
    pub fn open_document(
        &mut self,
        session: ViewerSession,
        factory: Rc<dyn EngineFactory>,
        observer: Box<dyn FnMut(u32)>,
        intro: Vec<String>,
    ) {
        self.controller.set_page_observer(observer);
        self.session = Some(session);
        self.factory = Some(factory);
        self.intro = intro;
        self.hud = None;
        if self.gate.has_fired() {
            self.ensure_now();
        }
    }

    pub fn close_document(&mut self) {
        self.controller.unmount();
        self.session = None;
        self.factory = None;
        self.intro.clear();
        self.hud = None;
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        if self.gate.has_fired() {
            self.ensure_now();
        }
        let mut changed = self.controller.tick(now);
        if self.hud.as_ref().is_some_and(HudMessage::is_expired) {
            self.hud = None;
            changed = true;
        }
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ShellAction {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => {
                if self.controller.next_page() {
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.controller.prev_page() {
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if self.controller.zoom_in() {
                    self.hud = Some(HudMessage::new("Zoom in"));
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::Char('-') => {
                if self.controller.zoom_out() {
                    self.hud = Some(HudMessage::new("Zoom out"));
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::Home => {
                if self.controller.jump_to(1) {
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::End => {
                let last = self.controller.view().page_count().unwrap_or(u32::MAX);
                if self.controller.jump_to(last) {
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::Char('f') => match self.controller.toggle_fullscreen() {
                FullscreenOutcome::EngineHandled => ShellAction::Redraw,
                FullscreenOutcome::HostFallback => match self.fullscreen_session() {
                    Some(session) => ShellAction::OpenFullscreen(session),
                    None => ShellAction::None,
                },
                FullscreenOutcome::Inactive => ShellAction::None,
            },
            KeyCode::Char('r') => {
                if self.controller.status().is_failed() {
                    self.controller.retry();
                    self.ensure_now();
                    ShellAction::Redraw
                } else {
                    ShellAction::None
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                ShellAction::Redraw
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ShellAction::Redraw
            }
            _ => ShellAction::None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, palette: &Palette, is_focused: bool) {
        let border = if is_focused {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.muted)
        };
        let title = self
            .session
            .as_ref()
            .map(|s| format!(" {} ", s.display_title))
            .unwrap_or_else(|| " Reader ".to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }
        self.last_width = inner.width;

        if self.session.is_none() {
            let hint = Paragraph::new(
                Line::from("Select a document from the library")
                    .style(Style::default().fg(palette.muted))
                    .centered(),
            );
            frame.render_widget(hint, inner);
            return;
        }

        let viewer_height = inner.height;
        let intro_rows = self.intro.len() as u16;
        let total_rows = intro_rows + viewer_height;
        let max_scroll = total_rows.saturating_sub(inner.height);
        self.scroll = self.scroll.min(max_scroll);

        let fired = self.gate.check(
            i32::from(intro_rows),
            i32::from(total_rows),
            i32::from(self.scroll),
            i32::from(self.scroll) + i32::from(inner.height),
        );
        if fired {
            self.ensure_now();
        }

        // footer row is the shell's, the rest belongs to the engine
        let body_height = viewer_height.saturating_sub(1);
        self.controller
            .paint(Rect::new(0, 0, inner.width, body_height));

        let mut lines: Vec<Line<'static>> = self
            .intro
            .iter()
            .map(|text| Line::from(text.clone()).style(Style::default().fg(palette.fg)))
            .collect();
        lines.extend(body_lines(
            self.controller.status(),
            self.controller.region(),
            body_height,
            palette,
        ));
        lines.push(self.footer_line(palette));

        let paragraph = Paragraph::new(Text::from(lines)).scroll((self.scroll, 0));
        frame.render_widget(paragraph, inner);
    }

    fn footer_line(&self, palette: &Palette) -> Line<'static> {
        if let Some(hud) = &self.hud {
            return hud.styled_line(palette);
        }
        match self.controller.status() {
            LoadStatus::Ready => {
                let view = self.controller.view();
                let page = view
                    .current_page()
                    .map_or_else(|| "–".to_string(), |p| p.to_string());
                let total = view
                    .page_count()
                    .map_or_else(|| "?".to_string(), |t| t.to_string());
                Line::from(format!(
                    " Page {page} / {total}   ←/→ flip · f fullscreen · +/- zoom "
                ))
                .style(Style::default().fg(palette.accent))
            }
            _ => Line::default(),
        }
    }

    fn fullscreen_session(&self) -> Option<ViewerSession> {
        let session = self.session.as_ref()?;
        let page = self
            .controller
            .view()
            .current_page()
            .or(session.requested_initial_page);
        Some(session.clone().with_initial_page(page))
    }

    fn ensure_now(&mut self) {
        let (Some(session), Some(factory)) = (&self.session, &self.factory) else {
            return;
        };
        let quality = match self.reduce_effects {
            Some(true) => VisualQuality::reduced(),
            Some(false) => VisualQuality::full(),
            None => VisualQuality::for_width(self.last_width),
        };
        self.controller
            .ensure_session(session, factory.as_ref(), quality);
    }
}
