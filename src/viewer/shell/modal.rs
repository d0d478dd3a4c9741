//! Modal (fullscreen) viewer shell.
//!
//! Orthogonal open/closed state around the same controller. Opening the
//! modal is itself the activation signal, so there is no visibility gate;
//! closing always tears the engine down, so a reopened modal is a fresh
//! session starting from whatever page the host asks for.

use std::rc::Rc;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::engine::{EngineFactory, VisualQuality};
use crate::hud::HudMessage;
use crate::theme::Palette;
use crate::viewer::session::{LoadStatus, ViewerController, ViewerSession};

use super::{ShellAction, body_lines};

use crossterm::event::{KeyCode, KeyEvent};

pub struct ModalShell {
    controller: ViewerController,
    session: Option<ViewerSession>,
    factory: Option<Rc<dyn EngineFactory>>,
    hud: Option<HudMessage>,
    reduce_effects: Option<bool>,
    last_width: u16,
}

impl ModalShell {
    #[must_use]
    pub fn new(reduce_effects: Option<bool>) -> Self {
        Self {
            controller: ViewerController::new(),
            session: None,
            factory: None,
            hud: None,
            reduce_effects,
            last_width: 100,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn controller(&self) -> &ViewerController {
        &self.controller
    }

    /// Open the modal over `session`. Construction starts immediately.
    pub fn open(
        &mut self,
        session: ViewerSession,
        factory: Rc<dyn EngineFactory>,
        observer: Box<dyn FnMut(u32)>,
    ) {
        self.controller.unmount();
        self.controller.set_page_observer(observer);
        self.session = Some(session);
        self.factory = Some(factory);
        self.hud = None;
        self.ensure_now();
    }

    /// Close and tear down. Safe to call when already closed.
    pub fn close(&mut self) {
        self.controller.unmount();
        self.session = None;
        self.factory = None;
        self.hud = None;
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.is_open() {
            return false;
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
            KeyCode::Esc | KeyCode::Char('q') => {
                self.close();
                ShellAction::ClosedModal
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.controller.next_page();
                ShellAction::Redraw
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.controller.prev_page();
                ShellAction::Redraw
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if self.controller.zoom_in() {
                    self.hud = Some(HudMessage::new("Zoom in"));
                }
                ShellAction::Redraw
            }
            KeyCode::Char('-') => {
                if self.controller.zoom_out() {
                    self.hud = Some(HudMessage::new("Zoom out"));
                }
                ShellAction::Redraw
            }
            KeyCode::Home => {
                self.controller.jump_to(1);
                ShellAction::Redraw
            }
            KeyCode::End => {
                let last = self.controller.view().page_count().unwrap_or(u32::MAX);
                self.controller.jump_to(last);
                ShellAction::Redraw
            }
            KeyCode::Char('r') => {
                if self.controller.status().is_failed() {
                    self.controller.retry();
                    self.ensure_now();
                }
                ShellAction::Redraw
            }
            _ => ShellAction::None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(session) = &self.session else {
            return;
        };

        let popup = centered_rect(92, 90, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(format!(" {} · fullscreen (Esc to close) ", session.display_title));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        if inner.width == 0 || inner.height == 0 {
            return;
        }
        self.last_width = inner.width;

        let body_height = inner.height.saturating_sub(1);
        self.controller
            .paint(Rect::new(0, 0, inner.width, body_height));

        let mut lines = body_lines(
            self.controller.status(),
            self.controller.region(),
            body_height,
            palette,
        );
        lines.push(self.footer_line(palette));
        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
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
                Line::from(format!(" Page {page} / {total}   ←/→ flip · +/- zoom "))
                    .style(Style::default().fg(palette.accent))
            }
            _ => Line::default(),
        }
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

/// Centered sub-rect by percentage.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside_very_wide_areas() {
        let area = Rect::new(0, 0, 4000, 2000);
        let popup = centered_rect(92, 90, area);

        assert!(popup.right() <= area.right());
        assert!(popup.bottom() <= area.bottom());
        assert!(popup.width >= area.width * 9 / 10);
    }

    #[test]
    fn centered_rect_centers_within_the_area() {
        let area = Rect::new(10, 5, 100, 40);
        let popup = centered_rect(50, 50, area);

        assert!(popup.x > area.x);
        assert!(popup.y > area.y);
        assert!(popup.right() < area.right());
        assert!(popup.bottom() < area.bottom());
    }
}
