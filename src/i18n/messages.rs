//! Message mapping: the localized strings for one locale.
//!
//! A mapping is a JSON object whose leaves are literal strings or templates.
//! Templates use `{name}` placeholders; rich-text markers such as `<b>…</b>`
//! are left untouched for the renderer.

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageMappingError {
    #[error("Message mapping must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MessageMapping(Map<String, Value>);

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl MessageMapping {
    pub fn from_value(value: Value) -> Result<Self, MessageMappingError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(MessageMappingError::NotAnObject(json_kind(&other))),
        }
    }

    /// Resolve a dotted key path, e.g. `"hola.title"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = self.0.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.as_object()?.get(segment))
    }

    /// The nested mapping a single page reads from.
    pub fn namespace(&self, name: &str) -> Option<MessageMapping> {
        self.get(name)
            .and_then(Value::as_object)
            .map(|map| MessageMapping(map.clone()))
    }

    /// A literal string at `path`; `None` for missing keys and non-string nodes.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Render the template at `path`, substituting `{name}` placeholders.
    ///
    /// Placeholders without a matching argument are kept verbatim.
    pub fn format(&self, path: &str, args: &HashMap<&str, String>) -> Option<String> {
        let template = self.text(path)?;
        let rendered = placeholder_regex().replace_all(template, |caps: &Captures<'_>| {
            args.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        });
        Some(rendered.into_owned())
    }

    pub fn top_level_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
