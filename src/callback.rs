//! Per-key transforms that replace the structural merge for their key.
//!
//! A callback receives a [`CallbackContext`] describing everything the
//! engine knows about its key, and returns the key's final value. Whatever
//! it returns is used verbatim. [`merged_value`](CallbackContext::merged_value)
//! is always `deep_merge(default, new)`, so for a command-line key it
//! concatenates arrays where the engine alone would have replaced.

use std::fmt;

use indexmap::IndexMap;

use crate::error::BoxError;
use crate::resolve::Source;
use crate::value::{Table, Value};

/// Signature of a per-key transform.
pub type CallbackFn = dyn Fn(&CallbackContext<'_>) -> Result<Value, BoxError>;

/// What a callback gets to see for its key.
#[derive(Debug, Clone, Copy)]
pub struct CallbackContext<'a> {
    /// The key being resolved.
    pub key: &'a str,
    /// Baseline value for the key.
    pub default_value: Option<&'a Value>,
    /// `deep_merge(default_value, new_value)`, regardless of `source`.
    pub merged_value: Option<&'a Value>,
    /// Precedence-resolved incoming value (CLI, then override).
    pub new_value: Option<&'a Value>,
    /// Where `new_value` came from.
    pub source: Source,
    /// All CLI arguments of this merge; `None` when CLI access is disabled.
    pub cli_args: Option<&'a Table>,
    /// The whole override table, for consulting sibling keys.
    pub overrides: Option<&'a Table>,
}

impl<'a> CallbackContext<'a> {
    /// A CLI argument by name, if CLI access is enabled and it was given.
    pub fn cli_arg(&self, name: &str) -> Option<&'a Value> {
        self.cli_args.and_then(|args| args.get(name))
    }

    /// A sibling key of the override table.
    pub fn override_value(&self, name: &str) -> Option<&'a Value> {
        self.overrides.and_then(|o| o.get(name))
    }
}

/// Registry of per-key transforms.
///
/// ```ignore
/// let callbacks = Callbacks::new().on("proxy", |ctx| match ctx.new_value {
///     Some(Value::String(s)) => Ok(parse_proxy(s)),
///     _ => Ok(ctx.default_value.cloned().unwrap_or(Value::Boolean(false))),
/// });
/// ```
#[derive(Default)]
pub struct Callbacks {
    entries: IndexMap<String, Box<CallbackFn>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for `key`, replacing any earlier one.
    pub fn on<F>(mut self, key: &str, callback: F) -> Self
    where
        F: Fn(&CallbackContext<'_>) -> Result<Value, BoxError> + 'static,
    {
        self.insert(key, callback);
        self
    }

    /// Register a transform for `key` in place.
    pub fn insert<F>(&mut self, key: &str, callback: F)
    where
        F: Fn(&CallbackContext<'_>) -> Result<Value, BoxError> + 'static,
    {
        self.entries.insert(key.to_string(), Box::new(callback));
    }

    pub fn get(&self, key: &str) -> Option<&CallbackFn> {
        self.entries.get(key).map(|cb| cb.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::table;

    fn context<'a>(
        default_value: Option<&'a Value>,
        new_value: Option<&'a Value>,
        cli_args: Option<&'a Table>,
        overrides: Option<&'a Table>,
    ) -> CallbackContext<'a> {
        CallbackContext {
            key: "k",
            default_value,
            merged_value: new_value.or(default_value),
            new_value,
            source: Source::Override,
            cli_args,
            overrides,
        }
    }

    #[test]
    fn registry_lookup() {
        let callbacks = Callbacks::new()
            .on("proxy", |_| Ok(Value::Boolean(true)))
            .on("open", |_| Ok(Value::from("fromFunc")));
        assert_eq!(callbacks.len(), 2);
        assert!(callbacks.contains("proxy"));
        assert!(!callbacks.contains("name"));
        assert_eq!(callbacks.keys().collect::<Vec<_>>(), ["proxy", "open"]);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let callbacks = Callbacks::new()
            .on("open", |_| Ok(Value::Integer(1)))
            .on("open", |_| Ok(Value::Integer(2)));
        assert_eq!(callbacks.len(), 1);
        let cb = callbacks.get("open").unwrap();
        let ctx = context(None, None, None, None);
        assert_eq!(cb(&ctx).unwrap(), Value::Integer(2));
    }

    #[test]
    fn context_reaches_sibling_keys() {
        let cli = table(r#"startPath = "app""#);
        let overrides = table(r#"exclude = "*.html""#);
        let ctx = context(None, None, Some(&cli), Some(&overrides));
        assert_eq!(ctx.cli_arg("startPath").and_then(Value::as_str), Some("app"));
        assert_eq!(
            ctx.override_value("exclude").and_then(Value::as_str),
            Some("*.html")
        );
        assert_eq!(ctx.cli_arg("missing"), None);
    }

    #[test]
    fn disabled_cli_hides_all_args() {
        let ctx = context(None, None, None, None);
        assert_eq!(ctx.cli_arg("proxy"), None);
    }

    #[test]
    fn debug_lists_keys() {
        let callbacks = Callbacks::new().on("files", |ctx| {
            Ok(ctx.merged_value.cloned().unwrap_or(Value::Boolean(false)))
        });
        assert_eq!(format!("{callbacks:?}"), r#"{"files"}"#);
    }
}
