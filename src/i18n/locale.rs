//! Locale type: a value that is always a member of the registry.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocaleError {
    #[error("Unsupported locale: '{0}'")]
    Invalid(String),
}

/// A validated locale.
///
/// The only ways to obtain one are `from_code` (strict), `resolve` (falls
/// back to the default) and the constants, so holding a `Locale` means the
/// code is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };
    pub const SPANISH: Locale = Locale { code: "es" };

    /// Create a Locale from a registered code.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code is registered
    /// * `Err(LocaleError::Invalid)` otherwise
    pub fn from_code(code: &str) -> Result<Locale, LocaleError> {
        LocaleRegistry::get()
            .get_by_code(code)
            .map(|config| Locale { code: config.code })
            .ok_or_else(|| LocaleError::Invalid(code.to_string()))
    }

    /// Pick the locale to serve for a requested route segment.
    ///
    /// Returns the candidate unchanged when it is registered, otherwise the
    /// registry default. Never fails.
    pub fn resolve(candidate: Option<&str>) -> Locale {
        match candidate.map(Locale::from_code) {
            Some(Ok(locale)) => locale,
            Some(Err(e)) => {
                tracing::debug!("{}, falling back to default", e);
                Locale::default()
            }
            None => Locale::default(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Never in practice: every constructor checks the registry.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be registered")
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale {
            code: LocaleRegistry::get().default_locale().code,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
