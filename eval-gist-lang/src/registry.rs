use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

/// The languages known to the sandbox backend: identifier, image and whether it's enabled.
const BUILTIN_LANGUAGES: &[(&str, &str, bool)] = &[
    ("assembly", "", false),
    ("bash", "", false),
    ("c", "", false),
    ("clojure", "", false),
    ("coffeescript", "", false),
    ("csharp", "", false),
    ("d", "", false),
    ("elixir", "", false),
    ("cpp", "glot/clang", true),
    ("erlang", "", false),
    ("fsharp", "", false),
    ("haskell", "", false),
    ("idris", "", false),
    ("go", "glot/golang", true),
    ("java", "glot/java", false),
    ("javascript", "glot/javascript", true),
    ("julia", "", false),
    ("lua", "", false),
    ("nim", "", false),
    ("ocaml", "", false),
    ("perl", "", false),
    ("php", "", false),
    ("python", "glot/python", true),
    ("ruby", "", false),
    ("rust", "", false),
    ("scala", "", false),
    ("swift", "", false),
];

lazy_static! {
    /// The registry built from `BUILTIN_LANGUAGES`.
    static ref BUILTIN_REGISTRY: LanguageRegistry = LanguageRegistry::new(
        BUILTIN_LANGUAGES
            .iter()
            .map(|(name, image, enabled)| (*name, LanguageConfig::new(*image, *enabled))),
    );
}

/// How the sandbox backend runs a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// The image of the backend that runs the programs of this language. An empty image means
    /// that the language is not available, even if enabled.
    #[serde(default)]
    pub image: String,
    /// Whether the language is enabled.
    #[serde(default)]
    pub enabled: bool,
}

impl LanguageConfig {
    /// Make a new `LanguageConfig`.
    pub fn new<S: Into<String>>(image: S, enabled: bool) -> LanguageConfig {
        LanguageConfig {
            image: image.into(),
            enabled,
        }
    }

    /// Whether a program in this language can be dispatched to the backend.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.image.is_empty()
    }
}

/// Read-only mapping from the language identifier to its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageRegistry {
    /// The known languages, indexed by identifier.
    languages: HashMap<String, LanguageConfig>,
}

impl LanguageRegistry {
    /// Build a registry from a list of `(identifier, configuration)` pairs. Later pairs override
    /// earlier ones with the same identifier.
    pub fn new<I, S>(languages: I) -> LanguageRegistry
    where
        I: IntoIterator<Item = (S, LanguageConfig)>,
        S: Into<String>,
    {
        LanguageRegistry {
            languages: languages
                .into_iter()
                .map(|(name, config)| (name.into(), config))
                .collect(),
        }
    }

    /// The registry with the languages built into the tool.
    pub fn builtin() -> LanguageRegistry {
        BUILTIN_REGISTRY.clone()
    }

    /// Load a registry from a JSON file in the form `{"lang": {"image": "...", "enabled": true}}`.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<LanguageRegistry, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read language registry {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid language registry {}", path.display()))
    }

    /// The configuration of a language, if known.
    pub fn get<S: AsRef<str>>(&self, language: S) -> Option<&LanguageConfig> {
        self.languages.get(language.as_ref())
    }

    /// Check whether `language` can be dispatched to the backend: it must be known, enabled and
    /// with a configured image.
    pub fn is_supported<S: AsRef<str>>(&self, language: S) -> bool {
        self.get(language).map_or(false, LanguageConfig::is_usable)
    }

    /// The identifiers of the usable languages, sorted.
    pub fn supported_languages(&self) -> Vec<&str> {
        let mut languages: Vec<_> = self
            .languages
            .iter()
            .filter(|(_, config)| config.is_usable())
            .map(|(name, _)| name.as_str())
            .collect();
        languages.sort_unstable();
        languages
    }
}
