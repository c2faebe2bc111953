//! Configuration type definitions.
//!
//! This module contains all the data structures used in `folio.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::ProjectRecord;

// =============================================================================
// Top-level config
// =============================================================================

/// The full portfolio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioConfig {
    pub site: SiteConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    /// Copy button feedback timings
    #[serde(default)]
    pub copy: CopyConfig,
    /// Where UI preferences (the theme) are persisted
    #[serde(default)]
    pub preferences: PreferencesConfig,
    /// The project registry, in display order
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
}

impl FolioConfig {
    /// Resolve every relative filesystem path against `base_path`
    /// (typically the config file's directory).
    pub fn resolve_paths(&mut self, base_path: &Path) {
        if let DocsLocation::Path { path } = &mut self.site.docs {
            *path = resolve_against(path, base_path);
        }
        if let Some(theme_dir) = &mut self.site.theme_dir {
            *theme_dir = resolve_against(theme_dir, base_path);
        }
        self.preferences.path = resolve_against(&self.preferences.path, base_path);
    }
}

fn resolve_against(path: &Path, base_path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Where project markdown documents are fetched from
    pub docs: DocsLocation,
    /// Directory holding custom page templates (`templates/**/*.html`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_dir: Option<PathBuf>,
}

/// Where project documents live.
///
/// YAML formats:
/// ```yaml
/// # Served over HTTP, `md_path` is joined onto the base URL
/// docs:
///   url: https://example.com/
///
/// # A local directory, `md_path` is relative to it
/// docs:
///   path: ./site
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocsLocation {
    /// A base URL documents are fetched from
    Url { url: String },
    /// A local directory documents are read from
    Path { path: PathBuf },
}

impl DocsLocation {
    /// Check if documents are fetched over HTTP
    pub fn is_url(&self) -> bool {
        matches!(self, DocsLocation::Url { .. })
    }

    /// Human-readable form for logs and listings
    pub fn describe(&self) -> String {
        match self {
            DocsLocation::Url { url } => url.clone(),
            DocsLocation::Path { path } => path.display().to_string(),
        }
    }
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}

// =============================================================================
// Highlighting and copy feedback
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Highlighting theme used to generate the page's code CSS
    #[serde(default = "default_highlight_theme")]
    pub theme: String,
}

fn default_highlight_theme() -> String {
    "github-dark".to_string()
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: default_highlight_theme(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// How long "Copied!" stays on a copy button, in milliseconds
    #[serde(default = "default_copied_ms")]
    pub copied_ms: u64,
    /// How long "Failed" stays on a copy button, in milliseconds
    #[serde(default = "default_failed_ms")]
    pub failed_ms: u64,
}

fn default_copied_ms() -> u64 {
    1400
}

fn default_failed_ms() -> u64 {
    1200
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            copied_ms: default_copied_ms(),
            failed_ms: default_failed_ms(),
        }
    }
}

// =============================================================================
// Preferences
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// JSON file holding persisted UI preferences
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from(".folio/preferences.json")
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}
