//! Internationalization: which locale to serve and the messages to serve it with.
//!
//! # Architecture
//!
//! - `registry`: the closed set of supported locales and the default
//! - `locale`: validated `Locale` type and the fallback resolver
//! - `messages`: the key-to-string mapping for one locale
//! - `cache`: TTL-bounded cache of fetched mappings
//! - `fetcher`: retrieves mappings from the remote API or bundled JSON files
//! - `metrics`: cache and request counters for the fetcher
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_site::i18n::{Locale, MessageFetcher};
//!
//! let locale = Locale::resolve(Some("fr")); // falls back to "en"
//! let messages = fetcher.fetch(locale).await?;
//! let title = messages.text("about.title");
//! ```

mod cache;
mod fetcher;
mod locale;
mod messages;
mod metrics;
mod registry;

pub use cache::{CacheEntry, MessageCache};
pub use fetcher::{FetchFailure, MessageFetchError, MessageFetcher, MessageSource};
pub use locale::{Locale, LocaleError};
pub use messages::{MessageMapping, MessageMappingError};
pub use metrics::{FetchMetrics, MetricsReport};
pub use registry::{LocaleConfig, LocaleRegistry};
