use std::fmt;

use crate::args::{ArgSource, NoArgs};
use crate::callback::{CallbackContext, Callbacks};
use crate::error::MergeError;
use crate::merge::deep_merge;
use crate::options::MergeOptions;
use crate::resolve::{self, Resolution, ResolveInput, Source};
use crate::value::{Table, Value};

/// A configured merge engine.
///
/// Holds the argument source and the `ignore_cli` toggle. The toggle applies
/// to every merge made through this handle until changed with
/// [`set_ignore_cli`](Self::set_ignore_cli).
pub struct Merger {
    arg_source: Box<dyn ArgSource + Send + Sync>,
    ignore_cli: bool,
}

impl Default for Merger {
    fn default() -> Self {
        Merger::builder().build()
    }
}

impl fmt::Debug for Merger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merger")
            .field("ignore_cli", &self.ignore_cli)
            .finish_non_exhaustive()
    }
}

impl Merger {
    pub fn builder() -> MergerBuilder {
        MergerBuilder::new()
    }

    /// An engine with the given options and no argument source.
    pub fn configure(options: MergeOptions) -> Merger {
        Merger::builder().options(options).build()
    }

    pub fn ignore_cli(&self) -> bool {
        self.ignore_cli
    }

    /// Turn command-line consultation off (`true`) or back on (`false`) for
    /// all later merges through this handle.
    pub fn set_ignore_cli(&mut self, ignore: bool) {
        self.ignore_cli = ignore;
    }

    /// Merge `overrides` and command-line arguments onto `baseline`.
    ///
    /// 1. Fetch CLI arguments once (skipped when `ignore_cli` is set)
    /// 2. Resolve every key of baseline ∪ overrides ∪ CLI to its incoming value
    /// 3. Structural result: CLI values replace, override values deep-merge
    /// 4. Keys with a callback take the callback's return value instead. The
    ///    callback's `merged_value` is always `deep_merge(default, new)`,
    ///    whatever the source
    ///
    /// `None` and an empty table both mean "no overrides". The baseline and
    /// overrides are only read; the result is a new table.
    pub fn merge(
        &self,
        baseline: &Table,
        overrides: Option<&Table>,
        callbacks: Option<&Callbacks>,
    ) -> Result<Table, MergeError> {
        let cli_args = self.fetch_cli_args()?;
        let input = ResolveInput {
            baseline,
            overrides: overrides.filter(|o| !o.is_empty()),
            cli_args: cli_args.as_ref(),
        };

        tracing::debug!(
            baseline_keys = baseline.len(),
            override_keys = input.overrides.map_or(0, Table::len),
            cli_keys = input.cli_args.map_or(0, Table::len),
            "merging configuration"
        );

        let mut merged = Table::new();
        for resolution in resolve::resolve(&input) {
            tracing::trace!(key = resolution.key, source = %resolution.source, "resolved key");
            let value = match callbacks.and_then(|c| c.get(resolution.key)) {
                Some(callback) => {
                    tracing::debug!(key = resolution.key, "dispatching callback");
                    let merged_value = deep_merge(resolution.default_value, resolution.new_value);
                    let ctx = CallbackContext {
                        key: resolution.key,
                        default_value: resolution.default_value,
                        merged_value: merged_value.as_ref(),
                        new_value: resolution.new_value,
                        source: resolution.source,
                        cli_args: input.cli_args,
                        overrides: input.overrides,
                    };
                    Some(callback(&ctx).map_err(|source| MergeError::Callback {
                        key: resolution.key.to_string(),
                        source,
                    })?)
                }
                None => structural_value(&resolution),
            };
            if let Some(value) = value {
                merged.insert(resolution.key.to_string(), value);
            }
        }

        tracing::debug!(keys = merged.len(), "merge complete");
        Ok(merged)
    }

    fn fetch_cli_args(&self) -> Result<Option<Table>, MergeError> {
        if self.ignore_cli {
            tracing::debug!("command-line arguments ignored");
            return Ok(None);
        }
        self.arg_source
            .fetch()
            .map(Some)
            .map_err(MergeError::ArgSource)
    }
}

/// Structural result for one key: replacement for CLI values, deep merge
/// otherwise.
fn structural_value(resolution: &Resolution<'_>) -> Option<Value> {
    match resolution.source {
        Source::CommandLine => resolution.new_value.cloned(),
        Source::Override | Source::Baseline => {
            deep_merge(resolution.default_value, resolution.new_value)
        }
    }
}

/// Builder for a [`Merger`].
pub struct MergerBuilder {
    arg_source: Option<Box<dyn ArgSource + Send + Sync>>,
    ignore_cli: bool,
}

impl MergerBuilder {
    fn new() -> Self {
        Self {
            arg_source: None,
            ignore_cli: false,
        }
    }

    /// Where command-line arguments come from (default: none).
    ///
    /// The source must be `Send + Sync` so a `Merger` can be shared across
    /// threads.
    pub fn arg_source<S: ArgSource + Send + Sync + 'static>(mut self, source: S) -> Self {
        self.arg_source = Some(Box::new(source));
        self
    }

    /// Suppress the argument source for every merge (default: `false`).
    pub fn ignore_cli(mut self, ignore: bool) -> Self {
        self.ignore_cli = ignore;
        self
    }

    /// Apply a [`MergeOptions`] block.
    pub fn options(mut self, options: MergeOptions) -> Self {
        self.ignore_cli = options.ignore_cli;
        self
    }

    pub fn build(self) -> Merger {
        Merger {
            arg_source: self.arg_source.unwrap_or_else(|| Box::new(NoArgs)),
            ignore_cli: self.ignore_cli,
        }
    }
}
