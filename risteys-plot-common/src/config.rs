use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Product generation whose dimensions and colours a plot follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    #[default]
    Risteys,
    FinregistryR8,
    FinngenR4,
}

/// How suppressed bins are removed before plotting.
///
/// Both behaviours shipped in different browser generations, so neither is
/// treated as the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Drop every suppressed bin, wherever it sits.
    StripAny,
    /// Drop only the contiguous suppressed prefix and suffix.
    #[default]
    StripEdges,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub debug_grid: bool,
}

fn default_theme() -> String {
    "dark".into()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            debug_grid: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub tail_policy: TailPolicy,
    #[serde(default = "default_duration")]
    pub default_duration: f64, // span given to open-ended intervals, e.g. "90+" drawn as 90..100
    #[serde(default)]
    pub band_padding: Option<f64>, // falls back to the generation's padding when None
    #[serde(default)]
    pub canvas_width: Option<f64>,
    #[serde(default)]
    pub canvas_height: Option<f64>,
}

fn default_duration() -> f64 {
    10.0
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            tail_policy: TailPolicy::default(),
            default_duration: default_duration(),
            band_padding: None,
            canvas_width: None,
            canvas_height: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_shortcut")]
    pub shortcut: char,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_shortcut() -> char {
    's'
}
fn default_max_results() -> usize {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            shortcut: default_shortcut(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("risteys-plot")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("RISTEYS_PLOT_CONFIG") {
            PathBuf::from(env_path) // $RISTEYS_PLOT_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self =
            toml::from_str(&content).map_err(|e| crate::RisteysPlotError::Config(e.to_string()))?;
        if !(cfg.plot.default_duration > 0.0) {
            return Err(crate::RisteysPlotError::Config(format!(
                "plot.default_duration must be positive, got {}",
                cfg.plot.default_duration
            )));
        }
        for (key, v) in [("canvas_width", cfg.plot.canvas_width), ("canvas_height", cfg.plot.canvas_height)] {
            if let Some(v) = v.filter(|v| !(*v > 0.0)) {
                return Err(crate::RisteysPlotError::Config(format!("plot.{key} must be positive, got {v}")));
            }
        }
        if let Some(p) = cfg.plot.band_padding.filter(|p| !(0.0..1.0).contains(p)) {
            return Err(crate::RisteysPlotError::Config(format!("plot.band_padding must be in [0, 1), got {p}")));
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.plot.generation, Generation::Risteys);
        assert_eq!(cfg.plot.tail_policy, TailPolicy::StripEdges);
        assert_eq!(cfg.plot.default_duration, 10.0);
        assert_eq!(cfg.search.shortcut, 's');
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[plot]\ngeneration = \"finregistry_r8\"\ntail_policy = \"strip_any\"\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.plot.generation, Generation::FinregistryR8);
        assert_eq!(cfg.plot.tail_policy, TailPolicy::StripAny);
        assert_eq!(cfg.plot.default_duration, 10.0);
        assert_eq!(cfg.display.theme, "dark");
    }

    #[test]
    fn non_positive_duration_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[plot]\ndefault_duration = 0.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn canvas_overrides_must_be_positive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        for body in ["[plot]\ncanvas_width = 0.0\n", "[plot]\ncanvas_height = -20.0\n", "[plot]\nband_padding = 1.5\n"] {
            std::fs::write(&path, body).unwrap();
            assert!(Config::load_from(&path).is_err(), "{body}");
        }
        std::fs::write(&path, "[plot]\ncanvas_width = 800.0\nband_padding = 0.3\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.plot.canvas_width, Some(800.0));
        assert_eq!(cfg.plot.band_padding, Some(0.3));
    }
}
