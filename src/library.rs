//! Document library: what can be opened in the viewer.
//!
//! Scans a directory for supported sources. The library only resolves paths
//! and display titles; byte formats are entirely the engines' concern.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// How deep the scan descends below the library root.
const SCAN_DEPTH: usize = 2;

/// Which engine family a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Plain-text sources, presented by the flipbook engine.
    Text,
    /// PDF sources, presented by the PDF engine.
    Pdf,
}

impl DocumentKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "txt" | "md" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "flipbook",
            Self::Pdf => "pdf",
        }
    }
}

/// A resolved, ready-to-open document reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentSource {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub source: DocumentSource,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct Library {
    entries: Vec<LibraryEntry>,
}

impl Library {
    /// Scan `root` for supported documents, sorted by title.
    #[must_use]
    pub fn scan(root: &Path) -> Self {
        let mut entries: Vec<LibraryEntry> = WalkDir::new(root)
            .max_depth(SCAN_DEPTH)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.into_path();
                let kind = DocumentKind::from_path(&path)?;
                let title = display_title(&path);
                Some(LibraryEntry {
                    source: DocumentSource { path, kind },
                    title,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.title.cmp(&b.title));
        log::info!("library scan of {} found {} documents", root.display(), entries.len());
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LibraryEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn display_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
