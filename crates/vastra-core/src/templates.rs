//! Response templates — language-keyed canned bodies per intent.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, VastraError};

const BUILTIN: &str = include_str!("../templates/responses.toml");

/// Keys every catalog must carry.
pub const REQUIRED_KEYS: &[&str] = &["out_of_scope", "greeting", "gratitude", "general", "empty_message"];

/// Final fallback key.
pub const GENERAL_KEY: &str = "general";

/// A source of response bodies.
pub trait TemplateCatalog: Send + Sync {
    /// Language used when the requested one has no body.
    fn default_language(&self) -> &str;

    /// Body stored for exactly `key` and `lang`.
    fn body(&self, key: &str, lang: &str) -> Option<&str>;

    /// Key that `key` borrows its body from, if any.
    fn alias(&self, key: &str) -> Option<&str>;

    /// Resolve a body through the fallback chain: the key in `lang`, then
    /// in the default language, then its alias, then the key without a
    /// `.variant` suffix, then without `_continue`, then `general`.
    fn lookup(&self, key: &str, lang: &str) -> Option<&str> {
        let mut candidates = Vec::with_capacity(6);
        let mut push = |k: &str| {
            if !candidates.iter().any(|c: &String| c == k) {
                candidates.push(k.to_string());
            }
        };

        push(key);
        if let Some(target) = self.alias(key) {
            push(target);
        }
        let base = key.split_once('.').map_or(key, |(base, _)| base);
        push(base);
        if let Some(target) = self.alias(base) {
            push(target);
        }
        if let Some(topic) = base.strip_suffix("_continue") {
            push(topic);
            if let Some(target) = self.alias(topic) {
                push(target);
            }
        }
        push(GENERAL_KEY);

        candidates.iter().find_map(|k| {
            self.body(k, lang)
                .or_else(|| self.body(k, self.default_language()))
                .inspect(|_| {
                    if k != key {
                        debug!(requested = key, resolved = %k, "template fallback");
                    }
                })
        })
    }
}

/// Replace `{name}` placeholders in `body`.
pub fn fill(body: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(body.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    default_language: Option<String>,
    #[serde(default)]
    aliases: HashMap<String, String>,
    #[serde(default)]
    responses: HashMap<String, HashMap<String, String>>,
}

/// Catalog loaded from TOML documents.
#[derive(Debug, Clone)]
pub struct TomlCatalog {
    default_language: String,
    aliases: HashMap<String, String>,
    responses: HashMap<String, HashMap<String, String>>,
}

impl TomlCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN)
    }

    /// Parse and validate a standalone catalog.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let catalog = Self {
            default_language: file.default_language.unwrap_or_else(|| "en".to_string()),
            aliases: file.aliases,
            responses: file.responses,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The built-in catalog with bodies from `path` layered on top.
    pub fn with_overrides(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let overlay: CatalogFile = toml::from_str(&content)?;
        let mut catalog = Self::builtin()?;

        if let Some(lang) = overlay.default_language {
            catalog.default_language = lang;
        }
        catalog.aliases.extend(overlay.aliases);
        for (key, bodies) in overlay.responses {
            catalog.responses.entry(key).or_default().extend(bodies);
        }

        catalog.validate()?;
        debug!(path = %path.display(), keys = catalog.responses.len(), "loaded template overrides");
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        for key in REQUIRED_KEYS {
            if !self.responses.contains_key(*key) {
                return Err(VastraError::Template(format!("missing required template '{key}'")));
            }
        }
        for (key, bodies) in &self.responses {
            if !bodies.contains_key(&self.default_language) {
                return Err(VastraError::Template(format!(
                    "template '{key}' has no '{}' body",
                    self.default_language
                )));
            }
        }
        for (from, to) in &self.aliases {
            if !self.responses.contains_key(to) {
                return Err(VastraError::Template(format!(
                    "alias '{from}' points at unknown template '{to}'"
                )));
            }
        }
        Ok(())
    }

    /// All template keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.responses.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl TemplateCatalog for TomlCatalog {
    fn default_language(&self) -> &str {
        &self.default_language
    }

    fn body(&self, key: &str, lang: &str) -> Option<&str> {
        self.responses.get(key)?.get(lang).map(String::as_str)
    }

    fn alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Topic;
    use std::io::Write;

    fn catalog() -> TomlCatalog {
        TomlCatalog::builtin().unwrap()
    }

    #[test]
    fn test_builtin_is_valid() {
        let c = catalog();
        assert_eq!(c.default_language(), "en");
        for key in REQUIRED_KEYS {
            assert!(c.body(key, "en").is_some(), "{key}");
        }
    }

    #[test]
    fn test_every_topic_resolves_to_its_own_or_alias() {
        let c = catalog();
        let general = c.body(GENERAL_KEY, "en");
        for topic in Topic::ALL {
            let body = c.lookup(topic.label(), "en");
            assert!(body.is_some());
            if topic != Topic::General {
                assert_ne!(body, general, "{topic} fell through to general");
            }
        }
    }

    #[test]
    fn test_language_selection_and_fallback() {
        let c = catalog();
        let kn = c.lookup("greeting", "kn").unwrap();
        assert!(kn.contains("ನಮಸ್ಕಾರ"));
        // no Kannada body: default language
        assert_eq!(
            c.lookup("empty_message", "kn"),
            Some("Please ask me something about fashion or beauty!")
        );
        // unknown language
        assert_eq!(c.lookup("greeting", "fr"), c.body("greeting", "en"));
    }

    #[test]
    fn test_alias_variant_and_continue() {
        let c = catalog();
        assert_eq!(c.lookup("men_casual", "en"), c.body("casual_wear", "en"));
        assert_eq!(c.lookup("kanchipuram_saree.blue", "en"), c.body("kanchipuram_saree", "en"));
        assert_eq!(c.lookup("wedding_continue", "kn"), c.body("wedding", "kn"));
        assert_eq!(c.lookup("men_casual_continue", "en"), c.body("casual_wear", "en"));
        assert_eq!(c.lookup("no_such_thing", "en"), c.body("general", "en"));
    }

    #[test]
    fn test_fill_placeholders() {
        let body = catalog().lookup("saree_color_change", "en").unwrap().to_string();
        let out = fill(&body, &[("color", "green"), ("color_title", "Green")]);
        assert!(out.starts_with("**Green Kanchipuram Saree"));
        assert!(out.contains("Rich green color"));
        assert!(!out.contains('{'));
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let err = TomlCatalog::from_toml_str(
            r#"
            [responses.general]
            en = "hi"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, VastraError::Template(_)));
    }

    #[test]
    fn test_missing_default_body_rejected() {
        let mut doc = String::new();
        for key in REQUIRED_KEYS {
            doc.push_str(&format!("[responses.{key}]\nen = \"x\"\n"));
        }
        doc.push_str("[responses.party]\nkn = \"x\"\n");
        assert!(TomlCatalog::from_toml_str(&doc).is_err());
    }

    #[test]
    fn test_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [responses.greeting]
            en = "Namaskara! Ready to style you."

            [responses.party]
            hi = "पार्टी"
            "#
        )
        .unwrap();

        let c = TomlCatalog::with_overrides(file.path()).unwrap();
        assert_eq!(c.lookup("greeting", "en"), Some("Namaskara! Ready to style you."));
        assert_eq!(c.lookup("party", "hi"), Some("पार्टी"));
        // untouched bodies survive
        assert!(c.lookup("party", "en").unwrap().contains("Party Outfit Ideas"));
    }
}
