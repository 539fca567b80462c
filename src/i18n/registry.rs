//! Locale registry: the closed set of locales the site is published in.
//!
//! The registry is built once on first access (`OnceLock`) and is immutable
//! afterwards. Exactly one locale is the default; it is what every invalid or
//! missing route segment falls back to.

use std::sync::OnceLock;

/// Metadata for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Route segment and message source key (e.g., "en", "es")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Native name, as shown by the language switch (e.g., "Español")
    pub native_name: &'static str,

    /// Whether this is the fallback locale (exactly one should be true)
    pub is_default: bool,
}

/// Global locale registry singleton.
#[derive(Debug)]
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: supported_locales(),
        })
    }

    /// Look up a locale by its exact code.
    ///
    /// Matching is case-sensitive: "EN" is not a registered locale.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// All registered locales, in declaration order.
    pub fn list(&self) -> &[LocaleConfig] {
        &self.locales
    }

    /// The fallback locale.
    ///
    /// # Panics
    /// Panics if the registry does not declare exactly one default locale.
    /// `supported_locales` is static data, so this is a programming error.
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self.locales.iter().filter(|l| l.is_default).collect();

        match defaults.len() {
            0 => panic!("No default locale found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default locales found in registry"),
        }
    }

    /// Check if a code names a registered locale.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn supported_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
        },
        LocaleConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_default: false,
        },
    ]
}
