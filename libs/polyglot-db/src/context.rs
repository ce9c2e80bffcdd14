use crate::config::TranslationConfig;

/// The active language of the current request or task.
///
/// Passed explicitly into every manager call that may need a default
/// language. The process-wide fallback lives in [`TranslationConfig`] and is
/// only consulted when a context is built with [`LanguageCtx::from_config`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LanguageCtx {
    active: String,
}

impl LanguageCtx {
    #[must_use]
    pub fn new(active: impl Into<String>) -> Self {
        Self {
            active: active.into(),
        }
    }

    /// Context using the configured default language.
    #[must_use]
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.default_language.clone())
    }

    #[inline]
    #[must_use]
    pub fn active_language(&self) -> &str {
        &self.active
    }
}

impl Default for LanguageCtx {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default())
    }
}
