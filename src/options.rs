use std::path::Path;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// Engine options.
///
/// Construct directly, take [`Default`], or [`load`](Self::load) them from
/// an options file and the environment.
#[derive(Config, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Never consult the command-line argument source. Every merge then
    /// resolves keys from the override table and the baseline only.
    #[config(default = false, env = "OPTMERGE_IGNORE_CLI")]
    pub ignore_cli: bool,
}

impl MergeOptions {
    /// Load options: `OPTMERGE_*` environment variables over an optional
    /// TOML file over compiled defaults. A missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self, MergeError> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder.load().map_err(MergeError::from)
    }
}
