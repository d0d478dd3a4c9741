use anyhow::Result;
pub use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

/// Abstracts the terminal event stream so the app loop is drivable from
/// tests.
pub trait EventSource {
    /// Poll for events with a timeout.
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event.
    fn read(&mut self) -> Result<Event>;
}

/// Real terminal events via crossterm.
pub struct TerminalEventSource;

impl EventSource for TerminalEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Scripted event source for tests.
pub struct ScriptedEventSource {
    events: Vec<Event>,
    next: usize,
}

impl ScriptedEventSource {
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { events, next: 0 }
    }

    #[must_use]
    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: crossterm::event::KeyEventState::empty(),
        })
    }

    #[must_use]
    pub fn key(code: KeyCode) -> Event {
        Self::key_event(code, KeyModifiers::empty())
    }

    #[must_use]
    pub fn char_key(c: char) -> Event {
        Self::key(KeyCode::Char(c))
    }
}

impl EventSource for ScriptedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.next < self.events.len())
    }

    fn read(&mut self) -> Result<Event> {
        if self.next < self.events.len() {
            let event = self.events[self.next].clone();
            self.next += 1;
            Ok(event)
        } else {
            // Exhausted scripts quit the app.
            Ok(Self::char_key('q'))
        }
    }
}
