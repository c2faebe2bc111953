//! The persisted colour theme preference.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::page::{self, Page, dom};

/// Key the theme is stored under.
pub const THEME_KEY: &str = "theme";

#[derive(thiserror::Error, Debug)]
pub enum PreferenceError {
    #[error("failed to read preferences from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write preferences to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file {} is not a JSON object of strings: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown theme '{0}' (expected 'dark' or 'light')")]
    UnknownTheme(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Label of the toggle button, naming the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light",
            Theme::Light => "Dark",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PreferenceError;

    /// Older pages stored light mode as an empty string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" | "" => Ok(Theme::Light),
            other => Err(PreferenceError::UnknownTheme(other.to_string())),
        }
    }
}

/// A persistent string key-value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// A store that lives only as long as the process.
///
/// Injected where preferences must not be persisted; the CLI itself
/// always uses [`FileStore`].
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in a JSON object file. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PreferenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| PreferenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        let write_error = |source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let text = serde_json::to_string_pretty(&values).map_err(|source| PreferenceError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, text).map_err(write_error)
    }
}

/// The theme preference over a persistent store.
pub struct ThemePreference<S> {
    store: S,
}

impl<S: PreferenceStore> ThemePreference<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored theme. The first visit stores and returns dark.
    pub fn get(&mut self) -> Result<Theme, PreferenceError> {
        match self.store.get(THEME_KEY)? {
            Some(value) => value.parse(),
            None => {
                debug!("no theme stored, defaulting to dark");
                self.set(Theme::Dark)?;
                Ok(Theme::Dark)
            }
        }
    }

    pub fn set(&mut self, theme: Theme) -> Result<(), PreferenceError> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Switch to the other theme and persist it.
    pub fn toggle(&mut self) -> Result<Theme, PreferenceError> {
        let next = self.get()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}

/// Reflect a theme on the page: `data-theme` on `<html>` and the toggle
/// button label.
pub fn apply(page: &Page, theme: Theme) {
    if let Some(html) = dom::select_first(page.document(), "html") {
        match theme {
            Theme::Dark => dom::set_attr(&html, "data-theme", "dark"),
            Theme::Light => dom::remove_attr(&html, "data-theme"),
        }
    }
    if let Some(button) = page.element(page::THEME_TOGGLE_ID) {
        dom::set_text(&button, theme.toggle_label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TEST_PAGE;

    #[test]
    fn test_first_visit_defaults_to_dark() {
        let mut preference = ThemePreference::new(MemoryStore::default());

        assert_eq!(preference.get().unwrap(), Theme::Dark);
        assert_eq!(
            preference.store.get(THEME_KEY).unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn test_toggle() {
        let mut preference = ThemePreference::new(MemoryStore::default());

        assert_eq!(preference.toggle().unwrap(), Theme::Light);
        assert_eq!(preference.get().unwrap(), Theme::Light);
        assert_eq!(preference.toggle().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_empty_value_reads_as_light() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "").unwrap();

        assert_eq!(ThemePreference::new(store).get().unwrap(), Theme::Light);
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
        assert!(matches!(
            "sepia".parse::<Theme>(),
            Err(PreferenceError::UnknownTheme(_))
        ));
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/preferences.json");

        let mut preference = ThemePreference::new(FileStore::new(&path));
        assert_eq!(preference.toggle().unwrap(), Theme::Light);

        let mut reopened = ThemePreference::new(FileStore::new(&path));
        assert_eq!(reopened.get().unwrap(), Theme::Light);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["theme"], "light");
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileStore::new(&path).get(THEME_KEY);
        assert!(matches!(result, Err(PreferenceError::Parse { .. })));
    }

    #[test]
    fn test_apply() {
        let page = Page::parse(TEST_PAGE).unwrap();
        let html = dom::select_first(page.document(), "html").unwrap();
        let button = page.element(page::THEME_TOGGLE_ID).unwrap();

        apply(&page, Theme::Dark);
        assert_eq!(dom::attr(&html, "data-theme").as_deref(), Some("dark"));
        assert_eq!(button.text_contents(), "Light");

        apply(&page, Theme::Light);
        assert_eq!(dom::attr(&html, "data-theme"), None);
        assert_eq!(button.text_contents(), "Dark");
    }
}
