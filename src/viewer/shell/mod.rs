//! Viewer shells: the embedded pane and the modal overlay.
//!
//! Both compose the same controller, gate, and command surface; they differ
//! in layout and in how activation happens (scroll proximity vs. opening the
//! modal).

pub mod embedded;
pub mod modal;

pub use embedded::EmbeddedShell;
pub use modal::ModalShell;

use ratatui::style::Style;
use ratatui::text::Line;

use super::session::{LoadStatus, ViewerSession};
use crate::engine::MountRegion;
use crate::theme::Palette;

/// What a shell wants the host to do after handling a key.
pub enum ShellAction {
    None,
    Redraw,
    /// Host-side fullscreen fallback: open the modal shell for this session.
    OpenFullscreen(ViewerSession),
    /// The modal shell closed itself.
    ClosedModal,
}

/// Body rows for the current lifecycle state. `height` rows, exactly.
fn body_lines(
    status: &LoadStatus,
    region: &MountRegion,
    height: u16,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let height = usize::from(height);

    let centered = |rows: Vec<Line<'static>>| -> Vec<Line<'static>> {
        let pad = height.saturating_sub(rows.len()) / 2;
        let mut lines = vec![Line::default(); pad];
        lines.extend(rows);
        lines.resize(height, Line::default());
        lines
    };

    match status {
        LoadStatus::NotActivated => centered(vec![
            Line::from("· the viewer loads when scrolled into view ·")
                .style(Style::default().fg(palette.muted))
                .centered(),
        ]),
        LoadStatus::Pending => centered(vec![
            Line::from("Loading viewer…")
                .style(Style::default().fg(palette.muted))
                .centered(),
        ]),
        LoadStatus::Failed(message) => centered(vec![
            Line::from(format!("Viewer failed: {message}"))
                .style(Style::default().fg(palette.error))
                .centered(),
            Line::default(),
            Line::from("press r to retry")
                .style(Style::default().fg(palette.muted))
                .centered(),
        ]),
        LoadStatus::Ready => {
            let mut lines: Vec<Line<'static>> = region.lines().to_vec();
            lines.truncate(height);
            lines.resize(height, Line::default());
            lines
        }
    }
}
