//! Site configuration module.
//!
//! Loads and validates `config.toml` from the site directory. Every field has
//! a default, so a config file only names what it changes. The API
//! connection can also be set from the environment, which wins over the
//! file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SIMPLE_BLOG_PROJECT_ID` | `api.project_id` |
//! | `SIMPLE_BLOG_DATASET` | `api.dataset` |
//! | `SIMPLE_BLOG_API_VERSION` | `api.api_version` |
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! project_id = ""              # Content project id (required for API fetches)
//! dataset = "production"
//! api_version = "2023-06-21"   # Dated API version, or "1" / "X"
//! host = "sanity.io"
//! use_cdn = true               # Only applies to unauthenticated fetches
//! token_env = "CONTENT_READ_TOKEN"
//! timeout_ms = 10000
//!
//! [site]
//! lang = "en"
//! posts_path = "posts"         # Post pages land in dist/<posts_path>/<slug>/
//! more_stories = 2             # Stories listed under a post
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//! accent = "#000000"           # Draft-mode banner
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//! accent = "#eeeeee"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content API connection.
    pub api: ApiConfig,
    /// Page layout settings.
    pub site: SiteSection,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.dataset.is_empty() {
            return Err(ConfigError::Validation(
                "api.dataset must not be empty".into(),
            ));
        }
        if !valid_api_version(&self.api.api_version) {
            return Err(ConfigError::Validation(format!(
                "api.api_version must be a YYYY-MM-DD date, \"1\" or \"X\" (got {:?})",
                self.api.api_version
            )));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_ms must be greater than zero".into(),
            ));
        }
        if self.site.posts_path.is_empty() || self.site.posts_path.contains('/') {
            return Err(ConfigError::Validation(
                "site.posts_path must be a single non-empty path segment".into(),
            ));
        }
        for (mode, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            for (name, value) in scheme.properties() {
                if value.is_empty() || value.contains([';', '{', '}', '<', '>']) {
                    return Err(ConfigError::Validation(format!(
                        "colors.{mode}: {value:?} is not a CSS color (--color-{name})"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Override API connection fields from environment variables.
    ///
    /// `lookup` maps a variable name to its value; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            ("SIMPLE_BLOG_PROJECT_ID", &mut self.api.project_id),
            ("SIMPLE_BLOG_DATASET", &mut self.api.dataset),
            ("SIMPLE_BLOG_API_VERSION", &mut self.api.api_version),
        ];
        for (var, field) in fields {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                tracing::debug!(var, "config overridden from environment");
                *field = value;
            }
        }
    }
}

fn valid_api_version(version: &str) -> bool {
    matches!(version, "1" | "X")
        || chrono::NaiveDate::parse_from_str(version, "%Y-%m-%d").is_ok()
}

/// Content API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Project id, the first label of the API hostname.
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Base domain of the API (`<project>.api.<host>`).
    pub host: String,
    /// Read published content through the CDN. Authenticated reads never do.
    pub use_cdn: bool,
    /// Environment variable holding the read token used in draft mode.
    pub token_env: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2023-06-21".to_string(),
            host: "sanity.io".to_string(),
            use_cdn: true,
            token_env: "CONTENT_READ_TOKEN".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Page layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// `lang` attribute of every page.
    pub lang: String,
    /// Directory under the output root holding one directory per post.
    pub posts_path: String,
    /// Number of other stories listed under a post.
    pub more_stories: usize,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            posts_path: "posts".to_string(),
            more_stories: 2,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, excerpts, the description column.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Draft-mode banner background.
    pub accent: String,
}

impl ColorScheme {
    /// `(custom property suffix, value)` pairs, in stylesheet order.
    fn properties(&self) -> [(&'static str, &str); 7] {
        [
            ("bg", self.background.as_str()),
            ("text", self.text.as_str()),
            ("text-muted", self.text_muted.as_str()),
            ("border", self.border.as_str()),
            ("link", self.link.as_str()),
            ("link-hover", self.link_hover.as_str()),
            ("accent", self.accent.as_str()),
        ]
    }

    fn declarations(&self, indent: &str) -> String {
        self.properties()
            .iter()
            .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
            .collect()
    }

    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
            accent: "#000000".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
            accent: "#eeeeee".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load `config.toml` from the site directory, apply environment overrides
/// and validate. A missing file means all defaults.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let mut config = read_config_file(&dir.join("config.toml"))?;
    config.apply_env(|var| std::env::var(var).ok());
    config.validate()?;
    tracing::debug!(dir = %dir.display(), dataset = %config.api.dataset, "loaded config");
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Returns a fully-commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Blog Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content API
# ---------------------------------------------------------------------------
[api]
# Project id: the first label of the API hostname. Required unless you
# build from a local export with --export-dir.
# SIMPLE_BLOG_PROJECT_ID, SIMPLE_BLOG_DATASET and SIMPLE_BLOG_API_VERSION
# override the matching fields from the environment.
project_id = ""

dataset = "production"

# Dated API version (YYYY-MM-DD), or "1" / "X".
api_version = "2023-06-21"

# Base domain: requests go to https://<project_id>.api.<host>/...
host = "sanity.io"

# Read published content through the CDN. Draft builds always bypass it.
use_cdn = true

# Environment variable holding the read token for `--draft` builds.
token_env = "CONTENT_READ_TOKEN"

# Per-request timeout in milliseconds.
timeout_ms = 10000

# ---------------------------------------------------------------------------
# Pages
# ---------------------------------------------------------------------------
[site]
# lang attribute of every page.
lang = "en"

# Post pages are written to <output>/<posts_path>/<slug>/index.html.
posts_path = "posts"

# Number of other stories listed below each post.
more_stories = 2

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Dates, excerpts, site description
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"
accent = "#000000"        # Draft-mode banner

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
accent = "#eeeeee"
"##
}

/// `:root` custom properties for both color schemes. Dark values apply
/// under `prefers-color-scheme: dark`.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        colors.light.declarations("    "),
        colors.dark.declarations("        "),
    )
}
