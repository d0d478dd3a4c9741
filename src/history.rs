//! Last-read-page persistence.
//!
//! The host wires this into the viewer's page observer: every confirmed page
//! change is recorded here, and reopening a document seeds the viewer's
//! requested initial page from it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub page: u32,
    #[serde(default)]
    pub page_count: Option<u32>,
    pub last_read: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadingHistory {
    documents: HashMap<String, HistoryEntry>,
    #[serde(skip)]
    file_path: Option<PathBuf>,
}

impl ReadingHistory {
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            documents: HashMap::new(),
            file_path: None,
        }
    }

    #[must_use]
    pub fn with_file(file_path: PathBuf) -> Self {
        Self {
            documents: HashMap::new(),
            file_path: Some(file_path),
        }
    }

    /// Load history from disk, falling back to an empty store on any error.
    /// A broken history file must never stop the app from starting.
    #[must_use]
    pub fn load_or_ephemeral(file_path: Option<PathBuf>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(&path).unwrap_or_else(|e| {
                log::error!("failed to load history from {}: {e}", path.display());
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &Path) -> anyhow::Result<Self> {
        if file_path.exists() {
            let content = fs::read_to_string(file_path)?;
            let mut history: Self = serde_json::from_str(&content)?;
            history.file_path = Some(file_path.to_path_buf());
            Ok(history)
        } else {
            Ok(Self::with_file(file_path.to_path_buf()))
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.file_path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(path, content)?;
        }
        Ok(())
    }

    /// Last confirmed page for a document, if any.
    #[must_use]
    pub fn last_page(&self, path: &Path) -> Option<u32> {
        self.documents
            .get(&key_for(path))
            .map(|entry| entry.page)
    }

    /// Record a confirmed page. Saves eagerly; a failed save is logged and
    /// otherwise ignored.
    pub fn record_page(&mut self, path: &Path, page: u32, page_count: Option<u32>) {
        self.documents.insert(
            key_for(path),
            HistoryEntry {
                page,
                page_count,
                last_read: Utc::now(),
            },
        );
        if let Err(e) = self.save() {
            log::error!("failed to save reading history: {e}");
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HistoryEntry)> {
        self.documents.iter()
    }
}

fn key_for(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_reload_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("history.json");

        let mut history = ReadingHistory::with_file(file.clone());
        history.record_page(Path::new("a.txt"), 7, Some(12));
        history.record_page(Path::new("b.pdf"), 3, None);

        let reloaded = ReadingHistory::load_from_file(&file).expect("reload");
        assert_eq!(reloaded.last_page(Path::new("a.txt")), Some(7));
        assert_eq!(reloaded.last_page(Path::new("b.pdf")), Some(3));
        assert_eq!(reloaded.last_page(Path::new("c.txt")), None);
    }

    #[test]
    fn ephemeral_never_touches_disk() {
        let mut history = ReadingHistory::ephemeral();
        history.record_page(Path::new("a.txt"), 2, None);
        assert_eq!(history.last_page(Path::new("a.txt")), Some(2));
        assert!(history.save().is_ok());
    }

    #[test]
    fn corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("history.json");
        std::fs::write(&file, "{not json").unwrap();

        let history = ReadingHistory::load_or_ephemeral(Some(file));
        assert_eq!(history.iter().count(), 0);
    }
}
