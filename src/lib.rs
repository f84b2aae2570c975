//! Deep-merge configuration objects with per-key callbacks and command-line
//! precedence.
//!
//! optmerge takes a baseline configuration (your defaults), an optional
//! override table (typically a parsed config file), optional per-key
//! callbacks, and the command line, and returns one resolved table:
//!
//! ```ignore
//! let merged = optmerge::merge(&defaults, Some(&file_config), None)?;
//! ```
//!
//! The engine does no I/O. It reads in-memory [`Table`]s and returns a new
//! one; the inputs are never modified.
//!
//! # Merge rules
//!
//! Two values for the same key combine by shape:
//!
//! | baseline | incoming | result |
//! |----------|----------|--------|
//! | table | table | key-by-key recursive merge |
//! | array | array | baseline elements, then incoming elements |
//! | anything | scalar, callable, or mismatched shape | incoming replaces |
//! | value | absent | copy of baseline |
//!
//! Arrays concatenate rather than replace. Configuration lists (watch
//! paths, plugins, file globs) are usually additive, so a config file that
//! lists one extra plugin keeps the defaults:
//!
//! ```text
//! defaults  { name = "shane",  numbers = [1, 2, 3] }
//! config    { name = "kittie", numbers = [4] }
//! merged    { name = "kittie", numbers = [1, 2, 3, 4] }
//! ```
//!
//! # Precedence
//!
//! ```text
//! Baseline              defaults passed to merge()
//!        ↑ overridden by
//! Override table        e.g. a parsed config file
//!        ↑ overridden by
//! Command line          ArgSource, unless ignore_cli is set
//! ```
//!
//! For every key in baseline ∪ overrides ∪ command line, the highest source
//! that has the key supplies the incoming value. Override values
//! deep-merge with the baseline as above. Command-line values **replace**:
//! `--names kittie` turns a baseline `names = ["shane"]` into `"kittie"`,
//! and the override table's value for `names` is not consulted. A flag
//! typed on the command line is a one-shot override, not another layer.
//!
//! # Callbacks
//!
//! Some keys need more than structural merging: a `proxy = "host:port"`
//! string that should become `{ host, port }`, or a `files` list that must
//! honor a sibling `exclude` key. Register a callback for such a key with
//! [`Callbacks`]; its return value becomes the key's final value, verbatim.
//! The callback gets a [`CallbackContext`] with the baseline value, the deep
//! merge of baseline and incoming value (computed even for command-line
//! values, which would otherwise replace), the resolved incoming value and
//! its [`Source`], the whole command-line table, and the whole override
//! table.
//!
//! # Command-line arguments
//!
//! The engine never parses argv. It asks an [`ArgSource`] once per merge for
//! a flat table of already-parsed values. [`args`] has stock sources (none,
//! fixed, closure, any `Serialize` struct); with the `clap` feature (on by
//! default) [`ClapArgs`] reads a clap parse.
//!
//! The free [`merge`] function uses an engine with no argument source.
//! Build a [`Merger`] to plug one in, or to switch the command line off:
//!
//! ```ignore
//! let merger = Merger::builder()
//!     .arg_source(ClapArgs::new(&command, matches))
//!     .ignore_cli(false)
//!     .build();
//! ```
//!
//! [`configure`] builds an engine from [`MergeOptions`], which can in turn be
//! loaded from `OPTMERGE_IGNORE_CLI` or an options file.
//!
//! # Error handling
//!
//! All fallible operations return [`MergeError`]. Shape conflicts are never
//! errors. A failing callback or argument source aborts the merge and is
//! reported as-is; nothing is retried and nothing falls back silently.

pub mod args;
pub mod error;
pub mod value;

mod builder;
mod callback;
#[cfg(feature = "clap")]
mod cli;
pub(crate) mod merge;
mod options;
mod resolve;

#[cfg(test)]
mod fixtures;

pub use args::ArgSource;
pub use builder::{Merger, MergerBuilder};
pub use callback::{CallbackContext, CallbackFn, Callbacks};
#[cfg(feature = "clap")]
pub use cli::ClapArgs;
pub use error::{BoxError, MergeError};
pub use merge::{deep_merge, merge_tables};
pub use options::MergeOptions;
pub use resolve::Source;
pub use value::{Callable, Table, Value, table_from_json, table_from_toml};

/// Merge with the default engine: no command-line source, `ignore_cli` off.
pub fn merge(
    baseline: &Table,
    overrides: Option<&Table>,
    callbacks: Option<&Callbacks>,
) -> Result<Table, MergeError> {
    Merger::default().merge(baseline, overrides, callbacks)
}

/// Build an engine from options.
pub fn configure(options: MergeOptions) -> Merger {
    Merger::configure(options)
}
