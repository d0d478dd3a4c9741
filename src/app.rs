//! Host application: library panel on the left, reader pane on the right,
//! fullscreen modal on demand.
//!
//! Key routing is scoped: while the modal is open it owns every key; the
//! embedded shell only sees keys while the reader pane has focus. Nothing
//! here installs a listener that outlives its shell.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::engine::EngineSet;
use crate::event_source::{EventSource, KeyCode};
use crate::history::ReadingHistory;
use crate::library::{Library, LibraryEntry};
use crate::settings::Settings;
use crate::theme::Palette;
use crate::viewer::session::ViewerSession;
use crate::viewer::shell::{EmbeddedShell, ModalShell, ShellAction};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Library,
    Reader,
}

pub struct App {
    library: Library,
    list_state: ListState,
    focused: FocusedPanel,
    reader: EmbeddedShell,
    modal: ModalShell,
    engines: EngineSet,
    history: Rc<RefCell<ReadingHistory>>,
    palette: Palette,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(library: Library, settings: &Settings, history: ReadingHistory) -> Self {
        let mut list_state = ListState::default();
        if !library.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            library,
            list_state,
            focused: FocusedPanel::default(),
            reader: EmbeddedShell::new(settings.activation_margin, settings.reduce_effects),
            modal: ModalShell::new(settings.reduce_effects),
            engines: EngineSet::new(),
            history: Rc::new(RefCell::new(history)),
            palette: Palette::default(),
            should_quit: false,
        }
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn focused(&self) -> FocusedPanel {
        self.focused
    }

    #[must_use]
    pub fn reader(&self) -> &EmbeddedShell {
        &self.reader
    }

    #[must_use]
    pub fn modal(&self) -> &ModalShell {
        &self.modal
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.modal.is_open() {
            let _ = self.modal.handle_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.focused = match self.focused {
                    FocusedPanel::Library => FocusedPanel::Reader,
                    FocusedPanel::Reader => FocusedPanel::Library,
                };
            }
            _ => match self.focused {
                FocusedPanel::Library => self.handle_library_key(key),
                FocusedPanel::Reader => {
                    if let ShellAction::OpenFullscreen(session) = self.reader.handle_key(key) {
                        self.open_modal(session);
                    }
                }
            },
        }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let reader_changed = self.reader.tick(now);
        let modal_changed = self.modal.tick(now);
        reader_changed || modal_changed
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(frame.area());

        self.render_library(frame, chunks[0]);
        self.reader.render(
            frame,
            chunks[1],
            &self.palette,
            self.focused == FocusedPanel::Reader && !self.modal.is_open(),
        );

        if self.modal.is_open() {
            let area = frame.area();
            self.modal.render(frame, area, &self.palette);
        }
    }

    fn handle_library_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.select_offset(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_offset(-1),
            KeyCode::Enter => self.open_selected(),
            _ => {}
        }
    }

    fn select_offset(&mut self, delta: i64) {
        if self.library.is_empty() {
            return;
        }
        let last = self.library.len() - 1;
        let current = self.list_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, last as i64) as usize;
        self.list_state.select(Some(next));
    }

    fn open_selected(&mut self) {
        let Some(entry) = self
            .list_state
            .selected()
            .and_then(|i| self.library.get(i))
            .cloned()
        else {
            return;
        };

        let initial_page = self.history.borrow().last_page(&entry.source.path);
        let session = ViewerSession::new(entry.source.clone(), entry.title.clone())
            .with_initial_page(initial_page);
        let factory = self.engines.factory_for(entry.source.kind);
        let observer = self.observer_for(&entry.source.path);

        self.reader
            .open_document(session, factory, observer, intro_lines(&entry));
        self.focused = FocusedPanel::Reader;
    }

    fn open_modal(&mut self, session: ViewerSession) {
        let factory = self.engines.factory_for(session.source.kind);
        let observer = self.observer_for(&session.source.path);
        self.modal.open(session, factory, observer);
    }

    /// Persist confirmed page changes as "last read" for this document.
    fn observer_for(&self, path: &Path) -> Box<dyn FnMut(u32)> {
        let history = Rc::clone(&self.history);
        let path = path.to_path_buf();
        Box::new(move |page| {
            history.borrow_mut().record_page(&path, page, None);
        })
    }

    fn render_library(&mut self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let border = if self.focused == FocusedPanel::Library && !self.modal.is_open() {
            Style::default().fg(self.palette.accent)
        } else {
            Style::default().fg(self.palette.muted)
        };

        let items: Vec<ListItem> = self
            .library
            .entries()
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(format!(
                    "{}  [{}]",
                    entry.title,
                    entry.source.kind.label()
                )))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(" Library "),
            )
            .style(Style::default().fg(self.palette.fg))
            .highlight_style(
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

fn intro_lines(entry: &LibraryEntry) -> Vec<String> {
    vec![
        entry.title.to_uppercase(),
        format!("{} edition", entry.source.kind.label()),
        String::new(),
        "Scroll down (j) to the embedded reader.".to_string(),
        String::new(),
    ]
}

/// Main loop, driven by an injectable event source.
pub fn run_app_with_event_source<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if events.poll(EVENT_POLL_TIMEOUT)? {
            match events.read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
        app.tick(Instant::now());

        if app.should_quit() {
            return Ok(());
        }
    }
}
