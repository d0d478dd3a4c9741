//! Single-page PDF engine.
//!
//! Text rendition of one PDF page at a time, backed by mupdf behind the
//! `pdf` cargo feature. Built without the feature, the factory reports the
//! engine as unavailable; construction never partially succeeds.
//!
//! Unlike the flipbook engine, this one reports its state through top-level
//! fields and knows its page count at ready time.

#[cfg(feature = "pdf")]
pub use enabled::PdfFactory;

#[cfg(not(feature = "pdf"))]
pub use disabled::PdfFactory;

#[cfg(feature = "pdf")]
mod enabled {
    use std::num::NonZeroUsize;

    use lru::LruCache;
    use mupdf::text_page::TextBlockType;
    use mupdf::{Document, TextPageFlags};
    use ratatui::layout::Rect;
    use ratatui::text::Line;
    use textwrap::wrap;

    use crate::engine::{
        EngineConfig, EngineError, EngineFactory, EngineReading, EventSender, MountRegion,
        RenderingEngine, ZoomDirection,
    };

    /// Extracted pages kept per engine instance.
    const PAGE_CACHE_SIZE: usize = 16;

    /// Builds [`PdfEngine`]s.
    pub struct PdfFactory;

    impl EngineFactory for PdfFactory {
        fn label(&self) -> &'static str {
            "pdf"
        }

        fn build(&self, config: EngineConfig) -> Result<Box<dyn RenderingEngine>, EngineError> {
            let path = config.source.path.to_string_lossy().to_string();
            let doc = Document::open(&path)
                .map_err(|e| EngineError::Construction(format!("cannot open {path}: {e}")))?;
            let page_count = doc
                .page_count()
                .map_err(|e| EngineError::Construction(format!("cannot read {path}: {e}")))?;
            let page_count = u32::try_from(page_count)
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| EngineError::Construction(format!("{path} has no pages")))?;

            let engine = PdfEngine {
                doc,
                page_count,
                page: config.start_page.clamp(1, page_count),
                scale: 1.0,
                cache: LruCache::new(
                    NonZeroUsize::new(PAGE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
                ),
                events: config.events,
            };
            engine.events.ready();

            Ok(Box::new(engine))
        }
    }

    struct PdfEngine {
        doc: Document,
        page_count: u32,
        /// 1-based.
        page: u32,
        scale: f32,
        cache: LruCache<u32, Vec<String>>,
        events: EventSender,
    }

    impl PdfEngine {
        const ZOOM_STEP: f32 = 1.1;
        const MIN_SCALE: f32 = 0.5;
        const MAX_SCALE: f32 = 3.0;

        fn go_to(&mut self, page: u32) -> bool {
            let target = page.clamp(1, self.page_count);
            if target != self.page {
                self.page = target;
                self.events.navigated();
            }
            true
        }

        fn page_text(&mut self, page: u32) -> Vec<String> {
            if let Some(lines) = self.cache.get(&page) {
                return lines.clone();
            }

            let lines = match extract_page_text(&self.doc, page) {
                Ok(lines) => lines,
                Err(e) => {
                    self.events
                        .load_failed(format!("page {page} extraction failed: {e}"));
                    return vec![];
                }
            };
            self.cache.put(page, lines.clone());
            lines
        }
    }

    impl RenderingEngine for PdfEngine {
        fn reading(&self) -> EngineReading {
            EngineReading::direct(Some(f64::from(self.page)), Some(f64::from(self.page_count)))
        }

        fn paint(&mut self, region: &mut MountRegion, area: Rect) {
            // Zoom narrows the column to emulate magnification in cells.
            let usable = (f32::from(area.width.max(20)) / self.scale).round() as usize;
            let raw = self.page_text(self.page);

            let mut lines = Vec::new();
            for text_line in &raw {
                if text_line.is_empty() {
                    lines.push(Line::from(String::new()));
                    continue;
                }
                for wrapped in wrap(text_line, usable.max(20)) {
                    lines.push(Line::from(wrapped.into_owned()));
                }
            }
            lines.truncate(usize::from(area.height.max(1)));
            region.set_lines(lines);
        }

        fn next_page(&mut self) -> bool {
            self.go_to(self.page.saturating_add(1))
        }

        fn prev_page(&mut self) -> bool {
            self.go_to(self.page.saturating_sub(1).max(1))
        }

        fn goto_page(&mut self, page: u32) -> bool {
            self.go_to(page)
        }

        fn zoom(&mut self, direction: ZoomDirection) -> bool {
            self.scale = match direction {
                ZoomDirection::In => self.scale * Self::ZOOM_STEP,
                ZoomDirection::Out => self.scale / Self::ZOOM_STEP,
            }
            .clamp(Self::MIN_SCALE, Self::MAX_SCALE);
            true
        }

        fn dispose(&mut self) {
            log::debug!("pdf engine disposed (page {}/{})", self.page, self.page_count);
            self.cache.clear();
        }
    }

    fn extract_page_text(doc: &Document, page: u32) -> Result<Vec<String>, mupdf::Error> {
        let loaded = doc.load_page((page - 1) as i32)?;
        let text_page = loaded.to_text_page(TextPageFlags::empty())?;

        let mut lines = Vec::new();
        for block in text_page.blocks() {
            if block.r#type() != TextBlockType::Text {
                continue;
            }
            for line in block.lines() {
                let text: String = line.chars().filter_map(|ch| ch.char()).collect();
                lines.push(text);
            }
            lines.push(String::new());
        }
        Ok(lines)
    }
}

#[cfg(not(feature = "pdf"))]
mod disabled {
    use crate::engine::{EngineConfig, EngineError, EngineFactory, RenderingEngine};

    /// Stand-in factory for builds without the `pdf` feature. Every build
    /// attempt reports the engine as unavailable, which the controller
    /// surfaces as a retryable failure.
    pub struct PdfFactory;

    impl EngineFactory for PdfFactory {
        fn label(&self) -> &'static str {
            "pdf"
        }

        fn build(&self, _config: EngineConfig) -> Result<Box<dyn RenderingEngine>, EngineError> {
            Err(EngineError::Unavailable(
                "folio was built without the `pdf` feature".into(),
            ))
        }
    }
}
