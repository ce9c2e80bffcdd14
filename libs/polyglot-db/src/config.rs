//! Configuration for the translation layer.
//!
//! Loading is lenient: a missing `translations` section yields
//! [`TranslationConfig::default()`], while a present but malformed section
//! is an error.
//!
//! ```yaml
//! translations:
//!   default_language: de
//!   max_get_results: 21
//! ```
//!
//! Environment overrides use the `POLYGLOT_` prefix with `__` as the
//! section separator, e.g. `POLYGLOT_TRANSLATIONS__DEFAULT_LANGUAGE=fr`.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the configuration section read by [`TranslationConfig::from_figment`].
pub const CONFIG_SECTION: &str = "translations";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "POLYGLOT_";

/// Fewest rows `get()` can fetch and still tell one match from many.
pub const MIN_GET_RESULTS: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Language used when neither the caller nor the query names one.
    pub default_language: String,
    /// Upper bound of rows fetched by `get()` to report ambiguous matches.
    pub max_get_results: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_owned(),
            max_get_results: 21,
        }
    }
}

impl TranslationConfig {
    /// Extract the `translations` section from an existing figment.
    ///
    /// # Errors
    /// Returns `TranslationError::Config` if the section exists but cannot be
    /// deserialized, or sets `max_get_results` below [`MIN_GET_RESULTS`].
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        if !figment.contains(CONFIG_SECTION) {
            return Ok(Self::default());
        }
        let config: Self = figment.extract_inner(CONFIG_SECTION)?;
        if config.max_get_results < MIN_GET_RESULTS {
            return Err(figment::Error::from(format!(
                "{CONFIG_SECTION}.max_get_results must be at least {MIN_GET_RESULTS}, got {}",
                config.max_get_results
            ))
            .into());
        }
        Ok(config)
    }

    /// Rows `get()` fetches: `max_get_results`, raised to [`MIN_GET_RESULTS`]
    /// for configs built in code.
    #[must_use]
    pub fn get_fetch_limit(&self) -> u64 {
        self.max_get_results.max(MIN_GET_RESULTS)
    }

    /// Build the configuration from defaults, an optional YAML file and
    /// `POLYGLOT_`-prefixed environment variables, in that order of precedence.
    ///
    /// # Errors
    /// Returns `TranslationError::Config` if any source holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment =
            Figment::new().merge(Serialized::default(CONFIG_SECTION, Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = Self::from_figment(&figment)?;
        tracing::debug!(
            default_language = %config.default_language,
            max_get_results = config.max_get_results,
            "Loaded translation config"
        );
        Ok(config)
    }
}
