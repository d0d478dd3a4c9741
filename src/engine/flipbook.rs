//! Spread-based "flipbook" engine for plain-text documents.
//!
//! Presents two pages side by side and flips one leaf at a time. Pagination
//! depends on the pane geometry, so it runs lazily on the first paint; until
//! then the engine reports no page count, which is exactly the case the
//! controller's deferred re-check exists for.
//!
//! Quirk kept on purpose: this engine reports its navigation state under a
//! nested `target` object, not as top-level fields.

use ratatui::layout::Rect;
use ratatui::text::Line;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use super::{
    EngineConfig, EngineError, EngineFactory, EngineReading, EventSender, MountRegion,
    RenderingEngine, VisualQuality,
};

/// Builds [`FlipbookEngine`]s for text sources.
pub struct FlipbookFactory;

impl EngineFactory for FlipbookFactory {
    fn label(&self) -> &'static str {
        "flipbook"
    }

    fn build(&self, config: EngineConfig) -> Result<Box<dyn RenderingEngine>, EngineError> {
        let text = std::fs::read_to_string(&config.source.path)
            .map_err(|e| EngineError::Construction(format!(
                "cannot read {}: {e}",
                config.source.path.display()
            )))?;

        let engine = FlipbookEngine {
            text,
            quality: config.quality,
            events: config.events,
            page: config.start_page.max(1),
            pages: None,
            layout: None,
            load_failure_sent: false,
        };
        // Ready fires before pagination: page count follows once geometry
        // is known.
        engine.events.ready();

        Ok(Box::new(engine))
    }
}

struct FlipbookEngine {
    text: String,
    quality: VisualQuality,
    events: EventSender,
    /// 1-based left page of the current spread.
    page: u32,
    pages: Option<Vec<Vec<String>>>,
    /// Geometry the current pagination was computed for.
    layout: Option<(u16, u16)>,
    load_failure_sent: bool,
}

const GUTTER_WIDTH: u16 = 3;
const MIN_COLUMN_WIDTH: u16 = 10;

impl FlipbookEngine {
    fn ensure_layout(&mut self, area: Rect) {
        if self.layout == Some((area.width, area.height)) {
            return;
        }

        let column = column_width(area.width, self.quality);
        let rows = usize::from(area.height.max(1));
        let pages = paginate(&self.text, usize::from(column), rows);

        if pages.is_empty() && !self.load_failure_sent {
            self.load_failure_sent = true;
            self.events.load_failed("document has no printable content");
        }

        if let Some(last) = pages.len().try_into().ok().filter(|&n: &u32| n > 0) {
            self.page = self.page.min(last);
        }
        self.layout = Some((area.width, area.height));
        self.pages = Some(pages);
    }

    fn page_count(&self) -> Option<u32> {
        self.pages.as_ref().map(|p| p.len() as u32)
    }

    fn flip(&mut self, delta: i64) -> bool {
        let mut target = i64::from(self.page) + delta;
        if let Some(last) = self.page_count() {
            target = target.min(i64::from(last));
        }
        let target = target.max(1) as u32;

        if target != self.page {
            self.page = target;
            self.events.navigated();
        }
        true
    }

    fn spread_lines(&self, area: Rect) -> Vec<Line<'static>> {
        let Some(pages) = &self.pages else {
            return vec![];
        };
        if pages.is_empty() {
            return vec![];
        }

        let column = usize::from(column_width(area.width, self.quality));
        let left_idx = (self.page as usize).saturating_sub(1);
        let left = pages.get(left_idx).map(Vec::as_slice).unwrap_or(&[]);
        let right = pages.get(left_idx + 1).map(Vec::as_slice).unwrap_or(&[]);

        let gutter = if self.quality.flip_shading {
            " ┃ "
        } else {
            " │ "
        };
        let (margin_l, margin_r) = if self.quality.page_texture {
            ("▏", "▕")
        } else {
            ("", "")
        };

        let rows = usize::from(area.height.max(1));
        (0..rows)
            .map(|row| {
                let l = pad_to_width(left.get(row).map(String::as_str).unwrap_or(""), column);
                let r = pad_to_width(right.get(row).map(String::as_str).unwrap_or(""), column);
                Line::from(format!("{margin_l}{l}{gutter}{r}{margin_r}"))
            })
            .collect()
    }
}

impl RenderingEngine for FlipbookEngine {
    fn reading(&self) -> EngineReading {
        EngineReading::nested(Some(f64::from(self.page)), self.page_count().map(f64::from))
    }

    fn paint(&mut self, region: &mut MountRegion, area: Rect) {
        self.ensure_layout(area);
        region.set_lines(self.spread_lines(area));
    }

    fn next_page(&mut self) -> bool {
        self.flip(2)
    }

    fn prev_page(&mut self) -> bool {
        self.flip(-2)
    }

    fn goto_page(&mut self, page: u32) -> bool {
        let delta = i64::from(page) - i64::from(self.page);
        self.flip(delta)
    }

    fn dispose(&mut self) {
        log::debug!("flipbook engine disposed (page {})", self.page);
        self.pages = None;
    }
}

/// Pad by display width, not char count, so CJK and other wide glyphs keep
/// the gutter aligned.
fn pad_to_width(text: &str, width: usize) -> String {
    let used = text.width();
    let mut padded = String::with_capacity(text.len() + width.saturating_sub(used));
    padded.push_str(text);
    for _ in used..width {
        padded.push(' ');
    }
    padded
}

fn column_width(total: u16, quality: VisualQuality) -> u16 {
    let margins = if quality.page_texture { 2 } else { 0 };
    total
        .saturating_sub(GUTTER_WIDTH + margins)
        .max(MIN_COLUMN_WIDTH * 2)
        / 2
}

/// Wrap `text` to `width` columns and slice it into pages of `height` lines.
/// Blank-line separated paragraphs keep one blank line between them.
fn paginate(text: &str, width: usize, height: usize) -> Vec<Vec<String>> {
    let width = width.max(1);
    let height = height.max(1);

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        for wrapped in wrap(paragraph, width) {
            lines.push(wrapped.into_owned());
        }
    }

    lines
        .chunks(height)
        .map(<[String]>::to_vec)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_splits_into_fixed_height_pages() {
        let text = "one two three four five six seven eight nine ten";
        let pages = paginate(text, 10, 2);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.len() <= 2);
        }
        let total_lines: usize = pages.iter().map(Vec::len).sum();
        assert!(total_lines >= 5, "short wrap width must produce many lines");
    }

    #[test]
    fn paginate_keeps_paragraph_breaks() {
        let pages = paginate("alpha\n\nbeta", 20, 10);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], vec!["alpha", "", "beta"]);
    }

    #[test]
    fn paginate_empty_document_yields_no_pages() {
        assert!(paginate("", 20, 10).is_empty());
        assert!(paginate("\n\n  \n", 20, 10).is_empty());
    }

    #[test]
    fn padding_uses_display_width_for_wide_glyphs() {
        let wide = pad_to_width("日本語", 10);
        assert_eq!(wide.width(), 10);
        // char-count padding would leave the gutter 3 cells off
        assert_eq!(wide.chars().count(), 7);

        let ascii = pad_to_width("abc", 10);
        assert_eq!(ascii, "abc       ");

        // already at or over the column width: untouched
        assert_eq!(pad_to_width("longer than", 5), "longer than");
    }

    #[test]
    fn column_width_never_collapses() {
        for w in 0..=200u16 {
            assert!(column_width(w, VisualQuality::full()) >= MIN_COLUMN_WIDTH);
            assert!(column_width(w, VisualQuality::reduced()) >= MIN_COLUMN_WIDTH);
        }
    }
}
