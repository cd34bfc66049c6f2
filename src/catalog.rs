//! Localized message lookup.
//!
//! The store never formats user-facing text itself: it asks a
//! [`MessageCatalog`] and falls back to the raw key when the catalog has no
//! entry.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use serde_json::{Map, Value};

pub type MessageArgs = Map<String, Value>;

pub trait MessageCatalog: Send + Sync {
    fn set_locale(&self, locale: &str);

    /// `None` when the key is unknown in both the active and fallback locale.
    fn format(&self, key: &str, args: &MessageArgs) -> Option<String>;
}

/// In-memory catalog of `{ $name }` templates, one table per locale, with a
/// fixed fallback locale.
#[derive(Debug)]
pub struct Templates {
    tables: HashMap<String, HashMap<String, String>>,
    fallback: String,
    locale: RwLock<String>,
}

impl Templates {
    pub fn new(fallback: impl Into<String>) -> Self {
        let fallback = fallback.into();
        Templates { tables: HashMap::new(), locale: RwLock::new(fallback.clone()), fallback }
    }

    pub fn with_message(mut self, locale: &str, key: &str, template: &str) -> Self {
        self.tables.entry(locale.to_string()).or_default().insert(key.to_string(), template.to_string());
        self
    }

    pub fn locale(&self) -> String {
        self.locale.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn lookup(&self, key: &str) -> Option<&String> {
        let locale = self.locale();
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .or_else(|| self.tables.get(&self.fallback).and_then(|table| table.get(key)))
    }
}

impl Default for Templates {
    fn default() -> Self {
        Templates::new("en")
    }
}

impl MessageCatalog for Templates {
    fn set_locale(&self, locale: &str) {
        *self.locale.write().unwrap_or_else(PoisonError::into_inner) = locale.to_string();
    }

    fn format(&self, key: &str, args: &MessageArgs) -> Option<String> {
        let mut text = self.lookup(key)?.clone();
        for (name, value) in args {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("{{ ${name} }}"), &value).replace(&format!("{{${name}}}"), &value);
        }
        Some(text)
    }
}
