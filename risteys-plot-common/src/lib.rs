pub mod config;
pub use config::{Config, Generation, PlotConfig, TailPolicy};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RisteysPlotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("empty distribution: {0}")]
    EmptyDistribution(String),
    #[error("interval open on both sides at bin {0}")]
    OpenInterval(usize),
    #[error("unknown mount point: {0}")]
    UnknownMount(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RisteysPlotError>;

/// Hex colours shared by every generation (Tailwind palettes the browsers used).
pub mod palette {
    pub const BLACK: &str = "#22292F";
    pub const BLUE_BASE: &str = "#3490DC";
    pub const TEAL_500: &str = "#14b8a6";
    pub const GREEN_DARK: &str = "#0b592f";
    pub const STEELBLUE: &str = "#4682b4";
    pub const BLUE_R8: &str = "#2779bd";
    pub const SUPPRESSED: &str = "#cacaca";
    pub const HOVER_BG: &str = "#eee";
}
