//! archview configuration loading from `.archviewrc.toml`.
//!
//! Configuration is optional. archview looks for `.archviewrc.toml` in the
//! working directory first, then for `archview/config.toml` in the user's
//! config directory, and falls back to defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! [render]
//! line_numbers = true
//! demangler = "c++filt"
//! theme = "base16-ocean.dark"
//!
//! [output]
//! format = "table"
//! color = true
//!
//! [results]
//! skip = 1
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use archview_core::demangle::DEFAULT_DEMANGLER;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = ".archviewrc.toml";

/// Default syntect theme for highlighted code.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Root configuration structure.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct ArchviewConfig {
    /// Code rendering preferences.
    #[serde(default)]
    pub render: RenderConfig,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,

    /// Result loading defaults.
    #[serde(default)]
    pub results: ResultsConfig,

    /// Where the configuration was loaded from, if anywhere.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Code rendering preferences.
#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    /// Show a line number gutter in table output.
    ///
    /// Default: `true`
    #[serde(default = "default_true")]
    pub line_numbers: bool,

    /// Command used to demangle assembly listings.
    ///
    /// Default: `c++filt`
    #[serde(default = "default_demangler")]
    pub demangler: String,

    /// syntect theme name for highlighting.
    ///
    /// Default: `base16-ocean.dark`
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            demangler: default_demangler(),
            theme: default_theme(),
        }
    }
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json`, `csv` or `raw`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output. Defaults to auto-detection.
    #[serde(default)]
    pub color: Option<bool>,
}

/// Result loading defaults.
#[derive(Debug, Deserialize, Default)]
pub struct ResultsConfig {
    /// Leading rows to drop (warm-up runs). Default: `0`.
    #[serde(default)]
    pub skip: usize,
}

fn default_true() -> bool {
    true
}

fn default_demangler() -> String {
    DEFAULT_DEMANGLER.to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl ArchviewConfig {
    /// Load configuration for the project rooted at `root`.
    ///
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        let candidates = [
            Some(root.join(CONFIG_FILE)),
            dirs::config_dir().map(|d| d.join("archview").join("config.toml")),
        ];

        for path in candidates.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<ArchviewConfig>(&content) {
                    Ok(mut config) => {
                        tracing::debug!("Loaded configuration from {}", path.display());
                        config.source = Some(path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Colored output override, or `None` to auto-detect.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ArchviewConfig::default();
        assert!(config.render.line_numbers);
        assert_eq!(config.render.demangler, "c++filt");
        assert_eq!(config.render.theme, DEFAULT_THEME);
        assert!(config.output.format.is_none());
        assert_eq!(config.results.skip, 0);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[render]
line_numbers = false
demangler = "llvm-cxxfilt"
theme = "InspiredGitHub"

[output]
format = "json"
color = false

[results]
skip = 2
"#;
        let config: ArchviewConfig = toml::from_str(toml_content).unwrap();

        assert!(!config.render.line_numbers);
        assert_eq!(config.render.demangler, "llvm-cxxfilt");
        assert_eq!(config.render.theme, "InspiredGitHub");
        assert_eq!(config.default_format(), Some("json"));
        assert_eq!(config.use_color(), Some(false));
        assert_eq!(config.results.skip, 2);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: ArchviewConfig = toml::from_str("[render]\ntheme = \"x\"\n").unwrap();
        assert!(config.render.line_numbers);
        assert_eq!(config.render.demangler, "c++filt");
    }

    #[test]
    fn test_load_from_project_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[results]\nskip = 3\n").unwrap();

        let config = ArchviewConfig::load(dir.path());
        assert_eq!(config.results.skip, 3);
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_invalid_project_config_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[results\nskip = ").unwrap();

        let config = ArchviewConfig::load(dir.path());
        assert_ne!(config.source, Some(dir.path().join(CONFIG_FILE)));
    }
}
