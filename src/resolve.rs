//! Precedence resolution: decide, per key, which source supplies the
//! incoming value.
//!
//! Operates on borrowed, already-fetched data and performs no I/O. For each
//! key of baseline ∪ overrides ∪ CLI the ladder is, highest first:
//!
//! 1. CLI argument (only when CLI arguments were fetched for this merge)
//! 2. Override table
//! 3. Baseline (no incoming value; the default stands)

use std::fmt;

use indexmap::IndexSet;

use crate::value::{Table, Value};

/// Which rung of the precedence ladder supplied a key's incoming value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    CommandLine,
    Override,
    Baseline,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::CommandLine => "command line",
            Source::Override => "override",
            Source::Baseline => "baseline",
        })
    }
}

/// The three sources of one merge call. No I/O happens here.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    pub baseline: &'a Table,
    /// `None` means no override was given.
    pub overrides: Option<&'a Table>,
    /// `None` means CLI access is disabled for this merge.
    pub cli_args: Option<&'a Table>,
}

/// Outcome of resolving a single key.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub key: &'a str,
    /// The baseline value, if the baseline has the key.
    pub default_value: Option<&'a Value>,
    /// The incoming value from the highest-precedence source that has the key.
    pub new_value: Option<&'a Value>,
    pub source: Source,
}

/// Resolve every key of baseline ∪ overrides ∪ CLI.
///
/// Keys come out in baseline order, then override-only keys, then CLI-only
/// keys.
pub fn resolve<'a>(input: &ResolveInput<'a>) -> Vec<Resolution<'a>> {
    let keys: IndexSet<&'a str> = [Some(input.baseline), input.overrides, input.cli_args]
        .into_iter()
        .flatten()
        .flat_map(|table| table.keys().map(String::as_str))
        .collect();

    keys.into_iter().map(|key| resolve_key(input, key)).collect()
}

/// Resolve one key against the precedence ladder.
pub fn resolve_key<'a>(input: &ResolveInput<'a>, key: &'a str) -> Resolution<'a> {
    let default_value = input.baseline.get(key);

    let (new_value, source) = if let Some(value) = input.cli_args.and_then(|args| args.get(key)) {
        (Some(value), Source::CommandLine)
    } else if let Some(value) = input.overrides.and_then(|o| o.get(key)) {
        (Some(value), Source::Override)
    } else {
        (None, Source::Baseline)
    };

    Resolution {
        key,
        default_value,
        new_value,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::table;

    #[test]
    fn baseline_only_has_no_new_value() {
        let baseline = table("open = true");
        let input = ResolveInput {
            baseline: &baseline,
            overrides: None,
            cli_args: None,
        };
        let resolved = resolve(&input);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].source, Source::Baseline);
        assert_eq!(resolved[0].new_value, None);
        assert_eq!(resolved[0].default_value, Some(&Value::Boolean(true)));
    }

    #[test]
    fn override_beats_baseline() {
        let baseline = table("open = true");
        let overrides = table("open = false");
        let input = ResolveInput {
            baseline: &baseline,
            overrides: Some(&overrides),
            cli_args: None,
        };
        let r = resolve_key(&input, "open");
        assert_eq!(r.source, Source::Override);
        assert_eq!(r.new_value, Some(&Value::Boolean(false)));
    }

    #[test]
    fn cli_beats_override() {
        let baseline = table("proxy = false");
        let overrides = table(r#"proxy = "X""#);
        let cli = table(r#"proxy = "Y""#);
        let input = ResolveInput {
            baseline: &baseline,
            overrides: Some(&overrides),
            cli_args: Some(&cli),
        };
        let r = resolve_key(&input, "proxy");
        assert_eq!(r.source, Source::CommandLine);
        assert_eq!(r.new_value.and_then(Value::as_str), Some("Y"));
        assert_eq!(r.default_value, Some(&Value::Boolean(false)));
    }

    #[test]
    fn missing_cli_key_falls_through_to_override() {
        let baseline = table("proxy = false\nopen = true");
        let overrides = table("open = false");
        let cli = table(r#"proxy = "Y""#);
        let input = ResolveInput {
            baseline: &baseline,
            overrides: Some(&overrides),
            cli_args: Some(&cli),
        };
        assert_eq!(resolve_key(&input, "open").source, Source::Override);
    }

    #[test]
    fn key_union_keeps_source_order() {
        let baseline = table("b = 1\na = 2");
        let overrides = table("a = 3\nc = 4");
        let cli = table("d = 5\nc = 6\nb = 7");
        let input = ResolveInput {
            baseline: &baseline,
            overrides: Some(&overrides),
            cli_args: Some(&cli),
        };
        let keys: Vec<&str> = resolve(&input).iter().map(|r| r.key).collect();
        assert_eq!(keys, ["b", "a", "c", "d"]);
    }

    #[test]
    fn wide_key_union_is_deduplicated_in_order() {
        let baseline: Table = (0..2000).map(|i| (format!("b{i}"), Value::Integer(i))).collect();
        let overrides: Table = (1000..3000)
            .map(|i| (format!("{}{i}", if i < 2000 { "b" } else { "o" }), Value::Integer(i)))
            .collect();
        let cli: Table = (2500..3500).map(|i| (format!("o{i}"), Value::Integer(-i))).collect();
        let input = ResolveInput {
            baseline: &baseline,
            overrides: Some(&overrides),
            cli_args: Some(&cli),
        };
        let resolved = resolve(&input);
        assert_eq!(resolved.len(), 3500);
        assert_eq!(resolved[0].key, "b0");
        assert_eq!(resolved[1999].key, "b1999");
        assert_eq!(resolved[2000].key, "o2000");
        assert_eq!(resolved[3499].key, "o3499");
        assert_eq!(resolved[1500].source, Source::Override);
        assert_eq!(resolved[3000].source, Source::CommandLine);
    }

    #[test]
    fn override_only_key_has_no_default() {
        let baseline = Table::new();
        let overrides = table("exclude = \"*.html\"");
        let input = ResolveInput {
            baseline: &baseline,
            overrides: Some(&overrides),
            cli_args: None,
        };
        let resolved = resolve(&input);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].default_value, None);
        assert_eq!(resolved[0].source, Source::Override);
    }

    #[test]
    fn source_display() {
        assert_eq!(Source::CommandLine.to_string(), "command line");
        assert_eq!(Source::Override.to_string(), "override");
    }
}
