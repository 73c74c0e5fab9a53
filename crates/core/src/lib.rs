//! Core domain types for book import.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Config key holding the granted storage location.
pub const DEFAULT_BOOK_TREE_KEY: &str = "default_book_tree";
/// Config key holding the JSON encoded [`Settings`].
pub const SETTINGS_KEY: &str = "import_settings";

pub const DEFAULT_BOOK_FILE_PATTERN: &str = r"(?i).*\.(txt|epub|umd|pdf|mobi|azw3|azw)";
pub const DEFAULT_PICKER_TITLE: &str = "Select book folder";
pub const DEFAULT_SELECTOR_TITLE: &str = "Start reading";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub handle: String,
}

impl StorageLocation {
    /// Builds a location from a stored value, ignoring blank handles.
    pub fn from_stored(value: Option<String>) -> Option<Self> {
        let handle = value?;
        if handle.trim().is_empty() {
            None
        } else {
            Some(Self { handle })
        }
    }

    pub fn granted(&self) -> bool {
        !self.handle.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateEntry {
    pub name: String,
}

impl CandidateEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub file_name: String,
    pub book_url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(String),
    NotFound,
    NoCandidates,
    AwaitingChoice(Vec<CandidateEntry>),
}

impl ResolutionOutcome {
    pub fn book_url(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::Resolved(url) => Some(url),
            _ => None,
        }
    }
}

/// Result of one archive click, as reported to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClickOutcome {
    Opened(String),
    NotFound,
    NoCandidates,
    ScanFailed,
    Dismissed,
}

/// Transient, informational user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    NoBookInLibrary,
    UnsupportedArchiveEntries,
    ArchiveUnreadable,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoBookInLibrary => "no book found in library",
            Notice::UnsupportedArchiveEntries => "archive has no supported book entries",
            Notice::ArchiveUnreadable => "archive could not be read",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Full-match, book file name predicate.
#[derive(Debug, Clone)]
pub struct BookNamePattern {
    regex: Regex,
}

impl BookNamePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl Default for BookNamePattern {
    fn default() -> Self {
        Self::new(DEFAULT_BOOK_FILE_PATTERN).expect("default book pattern is valid")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub book_file_pattern: String,
    pub picker_title: String,
    pub selector_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            book_file_pattern: DEFAULT_BOOK_FILE_PATTERN.to_string(),
            picker_title: DEFAULT_PICKER_TITLE.to_string(),
            selector_title: DEFAULT_SELECTOR_TITLE.to_string(),
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        self.picker_title = normalize_text(&self.picker_title, DEFAULT_PICKER_TITLE);
        self.selector_title = normalize_text(&self.selector_title, DEFAULT_SELECTOR_TITLE);
        self.book_file_pattern =
            normalize_text(&self.book_file_pattern, DEFAULT_BOOK_FILE_PATTERN);
        if BookNamePattern::new(&self.book_file_pattern).is_err() {
            self.book_file_pattern = DEFAULT_BOOK_FILE_PATTERN.to_string();
        }
    }

    pub fn book_name_pattern(&self) -> BookNamePattern {
        BookNamePattern::new(&self.book_file_pattern).unwrap_or_default()
    }
}

fn normalize_text(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Persisted key/value store.
pub trait ConfigStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Exact-match lookup of catalog records by book file name.
pub trait CatalogRepository {
    fn find_by_file_name(&self, name: &str) -> anyhow::Result<Option<CatalogRecord>>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).set(key, value)
    }
}

impl<T: CatalogRepository + ?Sized> CatalogRepository for &T {
    fn find_by_file_name(&self, name: &str) -> anyhow::Result<Option<CatalogRecord>> {
        (**self).find_by_file_name(name)
    }
}
