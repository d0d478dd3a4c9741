//! Transient HUD message shown in the viewer footer.

use std::time::{Duration, Instant};

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::Palette;

#[derive(Debug, Clone)]
pub struct HudMessage {
    pub message: String,
    pub expires_at: Instant,
}

impl HudMessage {
    pub const DURATION: Duration = Duration::from_secs(2);

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expires_at: Instant::now() + Self::DURATION,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    #[must_use]
    pub fn styled_line(&self, palette: &Palette) -> Line<'static> {
        let style = Style::default()
            .fg(palette.fg)
            .bg(palette.surface)
            .add_modifier(Modifier::BOLD);

        Line::from(vec![Span::styled(format!(" {} ", self.message), style)]).centered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_message_is_not_expired() {
        let hud = HudMessage::new("Zoom in");
        assert!(!hud.is_expired());
    }

    #[test]
    fn message_expires_at_its_deadline() {
        let mut hud = HudMessage::new("Zoom in");
        hud.expires_at = Instant::now();
        assert!(hud.is_expired());
    }

    #[test]
    fn styled_line_wraps_the_message_in_padding() {
        let hud = HudMessage::new("Zoom out");
        let line = hud.styled_line(&Palette::default());
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered, " Zoom out ");
    }
}
