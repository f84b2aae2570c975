//! Command-line argument sources.
//!
//! The engine never parses argument syntax. It asks an [`ArgSource`] for an
//! already-parsed, flat table of `name -> value` pairs, at most once per
//! merge. Stock sources:
//!
//! - [`NoArgs`]: no command line at all (the default engine uses this).
//! - [`StaticArgs`]: a fixed table, handy in tests and for values gathered
//!   elsewhere.
//! - [`from_fn`]: wrap a closure.
//! - [`from_serialize`]: snapshot any `Serialize` value, e.g. a clap derive
//!   struct. `None` fields are skipped; nested structs are rejected.
//! - `ClapArgs`: a clap parse, with the `clap` feature.

use serde::Serialize;

use crate::error::{BoxError, MergeError};
use crate::value::{Table, Value};

/// A provider of parsed command-line arguments.
///
/// Failure is reported, never papered over: an `Err` aborts the merge. A
/// source with nothing to offer returns an empty table.
pub trait ArgSource {
    fn fetch(&self) -> Result<Table, BoxError>;
}

impl<S: ArgSource + ?Sized> ArgSource for Box<S> {
    fn fetch(&self) -> Result<Table, BoxError> {
        (**self).fetch()
    }
}

impl<S: ArgSource + ?Sized> ArgSource for &S {
    fn fetch(&self) -> Result<Table, BoxError> {
        (**self).fetch()
    }
}

/// A source with no arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArgs;

impl ArgSource for NoArgs {
    fn fetch(&self) -> Result<Table, BoxError> {
        Ok(Table::new())
    }
}

/// A fixed set of arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticArgs(pub Table);

impl ArgSource for StaticArgs {
    fn fetch(&self) -> Result<Table, BoxError> {
        Ok(self.0.clone())
    }
}

impl From<Table> for StaticArgs {
    fn from(table: Table) -> Self {
        StaticArgs(table)
    }
}

/// An argument source backed by a closure. Build with [`from_fn`].
pub struct FnArgs<F>(F);

/// Wrap a closure as an argument source.
pub fn from_fn<F>(f: F) -> FnArgs<F>
where
    F: Fn() -> Result<Table, BoxError>,
{
    FnArgs(f)
}

impl<F> ArgSource for FnArgs<F>
where
    F: Fn() -> Result<Table, BoxError>,
{
    fn fetch(&self) -> Result<Table, BoxError> {
        (self.0)()
    }
}

/// Snapshot a serializable value as a flat argument table.
///
/// Top-level `None` fields are skipped, so optional flags the user did not
/// pass do not shadow lower layers. Arguments are flat: a field that
/// serializes to a table (a `#[command(flatten)]` group, a nested struct) is
/// a [`MergeError::NestedArgument`]. Arrays and scalars are fine.
pub fn from_serialize<S: Serialize>(source: &S) -> Result<StaticArgs, MergeError> {
    let json = serde_json::to_value(source)?;
    let table = Value::from_json(json)?.into_table()?;
    if let Some((key, value)) = table.iter().find(|(_, v)| v.as_table().is_some()) {
        return Err(MergeError::NestedArgument {
            key: key.clone(),
            found: value.type_name(),
        });
    }
    Ok(StaticArgs(table))
}

/// Interpret a raw argument string.
/// Tries: bool → integer → float → string.
pub fn parse_arg_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    // Require a dot so "NaN" and "inf" stay strings.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

/// Build an argument table from raw `(name, value)` string pairs.
///
/// Values go through [`parse_arg_value`]. A repeated name collects its values
/// into an array in the order given.
pub fn args_from_pairs<I, K, V>(pairs: I) -> Table
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let mut table = Table::new();
    for (name, raw) in pairs {
        let value = parse_arg_value(raw.as_ref());
        match table.entry(name.into()) {
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value);
            }
            indexmap::map::Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, Value::Boolean(false));
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }
    table
}
