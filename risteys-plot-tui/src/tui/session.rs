use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the viewer restores when the same page is opened again.
/// Display modes are not kept: a fresh load starts every panel per-period.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub page_path: String,
    pub selected_mount: Option<String>,
    #[serde(default)]
    pub debug_grid: bool,
}

impl Session {
    pub fn cache_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("risteys-plot")
            .join("session.json")
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::cache_path();
        if let Some(parent) = path.parent() { std::fs::create_dir_all(parent)?; }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
    pub fn load() -> Option<Self> {
        let path = Self::cache_path();
        serde_json::from_str(&std::fs::read_to_string(&path).ok()?).ok()
    }
}
