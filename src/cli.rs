//! Clap adapter.
//!
//! Compiled only with the `clap` Cargo feature (on by default). [`ClapArgs`]
//! pairs a parsed [`ArgMatches`] with the [`Command`] that produced it and
//! acts as the engine's [`ArgSource`]:
//!
//! ```ignore
//! let command = Cli::command();
//! let matches = command.clone().get_matches();
//! let merger = Merger::builder()
//!     .arg_source(ClapArgs::new(&command, matches))
//!     .build();
//! let config = merger.merge(&defaults, Some(&file_config), Some(&callbacks))?;
//! ```
//!
//! Only values the user actually typed count. Arguments filled from a
//! `default_value` or left unset are skipped so they cannot shadow the
//! override table. Raw values are interpreted with
//! [`parse_arg_value`](crate::args::parse_arg_value); an argument given
//! several values becomes an array. Keys are clap argument ids, so a
//! `start_path` field shows up as `start_path`.
//!
//! The command is needed because `ArgMatches` also records argument groups
//! (clap's derive adds one per struct), which are not configuration keys.
//! Subcommand arguments are not included; pass the subcommand and its own
//! matches if that is where the configuration flags live.

use clap::parser::ValueSource;
use clap::{ArgMatches, Command};

use crate::args::{ArgSource, parse_arg_value};
use crate::error::BoxError;
use crate::value::{Table, Value};

/// Command-line values from a clap parse.
#[derive(Debug, Clone)]
pub struct ClapArgs {
    ids: Vec<String>,
    matches: ArgMatches,
}

impl ClapArgs {
    pub fn new(command: &Command, matches: ArgMatches) -> Self {
        let ids = command
            .get_arguments()
            .map(|arg| arg.get_id().as_str().to_string())
            .collect();
        ClapArgs { ids, matches }
    }
}

impl ArgSource for ClapArgs {
    fn fetch(&self) -> Result<Table, BoxError> {
        let mut args = Table::new();
        for name in &self.ids {
            if self.matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }
            let Some(raw) = self.matches.try_get_raw(name)? else {
                continue;
            };
            let mut values: Vec<Value> = raw
                .map(|v| parse_arg_value(&v.to_string_lossy()))
                .collect();
            let value = match values.len() {
                0 => continue,
                1 => values.remove(0),
                _ => Value::Array(values),
            };
            args.insert(name.clone(), value);
        }
        Ok(args)
    }
}
