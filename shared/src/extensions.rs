// Filename extensions: free-text parsing and the user's custom list.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::store::KeyValueStore;

/// Preference key holding the custom extension list (JSON array of strings).
pub const CUSTOM_EXTENSIONS_KEY: &str = "DefaultOpener.customExtensions.v1";

/// Extensions offered out of the box.
pub const PRESET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "heic", "tiff", "svg",
    "pdf",
    "txt", "md",
    "json", "yaml", "yml",
    "zip",
    "mp4", "mov",
];

/// A canonical extension: non-empty, lowercase ASCII letters and digits,
/// no leading dot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ExtensionToken(String);

impl ExtensionToken {
    /// Canonicalize a single piece of user input.
    ///
    /// Trims, drops one leading `.`, lowercases, then accepts only
    /// `^[a-z0-9]+$`. Anything else is rejected whole.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
        let lowered = bare.to_lowercase();

        let valid = !lowered.is_empty()
            && lowered
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        valid.then_some(Self(lowered))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_preset(&self) -> bool {
        PRESET_EXTENSIONS.contains(&self.0.as_str())
    }
}

impl fmt::Display for ExtensionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split free text on commas, newlines, tabs and spaces and keep every piece
/// that canonicalizes to a valid token. Invalid pieces are dropped silently.
pub fn parse_extensions(input: &str) -> BTreeSet<ExtensionToken> {
    input
        .split(|c: char| matches!(c, ',' | '\n' | '\t' | ' '))
        .filter(|piece| !piece.is_empty())
        .filter_map(ExtensionToken::new)
        .collect()
}

/// `.a, .b` formatting used in log lines.
pub fn dotted_list(tokens: &[ExtensionToken]) -> String {
    tokens
        .iter()
        .map(|t| format!(".{}", t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Presets plus the user's persisted custom extensions.
///
/// Custom entries are kept sorted, unique, and disjoint from the presets; the
/// whole list is written back after every change.
pub struct ExtensionLibrary<S: KeyValueStore> {
    store: S,
    custom: Vec<ExtensionToken>,
}

impl<S: KeyValueStore> ExtensionLibrary<S> {
    /// Load the custom list. Missing or undecodable data yields an empty list.
    pub fn load(store: S) -> Self {
        let custom = match store.get(CUSTOM_EXTENSIONS_KEY) {
            Ok(Some(data)) => decode_custom(&data),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read custom extensions: {}", e);
                Vec::new()
            }
        };
        Self { store, custom }
    }

    pub fn presets(&self) -> &'static [&'static str] {
        PRESET_EXTENSIONS
    }

    pub fn custom(&self) -> &[ExtensionToken] {
        &self.custom
    }

    /// Presets first, then custom entries.
    pub fn all(&self) -> impl Iterator<Item = &str> + '_ {
        let presets: &[&str] = PRESET_EXTENSIONS;
        presets
            .iter()
            .copied()
            .chain(self.custom.iter().map(ExtensionToken::as_str))
    }

    pub fn contains(&self, ext: &ExtensionToken) -> bool {
        ext.is_preset() || self.custom.contains(ext)
    }

    /// Parse `input` and add every new, non-preset token.
    ///
    /// Returns the tokens actually added (sorted). Nothing is written when
    /// nothing is new.
    pub fn add_from_input(&mut self, input: &str) -> Vec<ExtensionToken> {
        let added: Vec<ExtensionToken> = parse_extensions(input)
            .into_iter()
            .filter(|t| !self.contains(t))
            .collect();
        if added.is_empty() {
            return added;
        }

        self.custom.extend(added.iter().cloned());
        self.custom.sort();
        self.save();
        added
    }

    /// Remove one custom entry. Presets cannot be removed.
    pub fn remove(&mut self, ext: &ExtensionToken) -> bool {
        let Some(idx) = self.custom.iter().position(|t| t == ext) else {
            return false;
        };
        self.custom.remove(idx);
        self.save();
        true
    }

    /// Remove the custom entries at `indices`; out-of-range indices are ignored.
    pub fn remove_at(&mut self, indices: &[usize]) -> Vec<ExtensionToken> {
        let doomed: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.custom.len())
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(doomed.len());
        let mut kept = Vec::with_capacity(self.custom.len() - doomed.len());
        for (i, token) in self.custom.drain(..).enumerate() {
            if doomed.contains(&i) {
                removed.push(token);
            } else {
                kept.push(token);
            }
        }
        self.custom = kept;
        self.save();
        removed
    }

    fn save(&mut self) {
        let data = match serde_json::to_string(&self.custom) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!("Failed to encode custom extensions: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(CUSTOM_EXTENSIONS_KEY, data) {
            tracing::error!("Failed to save custom extensions: {}", e);
        }
    }
}

/// Decode the persisted list, dropping entries that are invalid, presets, or
/// duplicates.
fn decode_custom(data: &str) -> Vec<ExtensionToken> {
    let raw: Vec<String> = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Custom extension list is corrupt, starting empty: {}", e);
            return Vec::new();
        }
    };
    let tokens: BTreeSet<ExtensionToken> = raw
        .iter()
        .filter_map(|s| ExtensionToken::new(s))
        .filter(|t| !t.is_preset())
        .collect();
    tokens.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tokens(list: &[&str]) -> Vec<ExtensionToken> {
        list.iter().map(|s| ExtensionToken::new(s).unwrap()).collect()
    }

    fn stored(lib: &ExtensionLibrary<MemoryStore>) -> Option<String> {
        lib.store.get(CUSTOM_EXTENSIONS_KEY).unwrap()
    }

    #[test]
    fn parse_collapses_delimiters_and_rejects_punctuation() {
        let parsed = parse_extensions(" foo, .BAR  baz! qux");
        let expected: BTreeSet<_> = tokens(&["foo", "bar", "qux"]).into_iter().collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_empty_and_delimiter_only_input() {
        assert!(parse_extensions("").is_empty());
        assert!(parse_extensions("   ,,  ").is_empty());
        assert!(parse_extensions("\n\t, \n").is_empty());
    }

    #[test]
    fn parse_rejects_inner_dots_and_bare_dot() {
        assert!(parse_extensions("a.b").is_empty());
        assert!(parse_extensions(".").is_empty());
        assert!(parse_extensions("..md").is_empty());
        assert_eq!(parse_extensions("\r\nraw\r\n").len(), 1);
    }

    #[test]
    fn token_rejects_non_ascii() {
        assert_eq!(ExtensionToken::new("é"), None);
        assert_eq!(ExtensionToken::new("MP3").unwrap().as_str(), "mp3");
    }

    #[test]
    fn add_skips_presets_and_existing() {
        let mut lib = ExtensionLibrary::load(MemoryStore::new());

        let added = lib.add_from_input("rs, PDF, toml");
        assert_eq!(added, tokens(&["rs", "toml"]));
        assert_eq!(lib.custom(), tokens(&["rs", "toml"]).as_slice());

        let added = lib.add_from_input(".rs .go");
        assert_eq!(added, tokens(&["go"]));
        assert_eq!(lib.custom(), tokens(&["go", "rs", "toml"]).as_slice());
        assert_eq!(stored(&lib).as_deref(), Some(r#"["go","rs","toml"]"#));
    }

    #[test]
    fn add_nothing_new_does_not_write() {
        let mut lib = ExtensionLibrary::load(MemoryStore::new());
        assert!(lib.add_from_input("png jpg !!").is_empty());
        assert_eq!(stored(&lib), None);
    }

    #[test]
    fn remove_persists() {
        let mut lib = ExtensionLibrary::load(MemoryStore::new());
        lib.add_from_input("a b c d");

        assert!(lib.remove(&ExtensionToken::new("b").unwrap()));
        assert!(!lib.remove(&ExtensionToken::new("png").unwrap()));

        let removed = lib.remove_at(&[0, 2, 9]);
        assert_eq!(removed, tokens(&["a", "d"]));
        assert_eq!(lib.custom(), tokens(&["c"]).as_slice());
        assert_eq!(stored(&lib).as_deref(), Some(r#"["c"]"#));
    }

    #[test]
    fn load_sanitizes_persisted_list() {
        let mut store = MemoryStore::new();
        store
            .set(CUSTOM_EXTENSIONS_KEY, r#"["zz","PNG","bad!","aa","zz"]"#.into())
            .unwrap();
        let lib = ExtensionLibrary::load(store);
        assert_eq!(lib.custom(), tokens(&["aa", "zz"]).as_slice());
    }

    #[test]
    fn load_corrupt_list_is_empty() {
        let mut store = MemoryStore::new();
        store.set(CUSTOM_EXTENSIONS_KEY, "{oops".into()).unwrap();
        let lib = ExtensionLibrary::load(store);
        assert!(lib.custom().is_empty());
        assert_eq!(lib.all().count(), PRESET_EXTENSIONS.len());
    }

    #[test]
    fn dotted_list_format() {
        assert_eq!(dotted_list(&tokens(&["md", "rs"])), ".md, .rs");
    }
}
