//! Tracing and logging infrastructure for Laneway.

use std::{
    io::IsTerminal,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

mod component;

pub use component::Tracing;

#[cfg(test)]
mod tests;

/// Tracing configuration section.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Whether to use colored terminal output, if available.
    ///
    /// Colored terminal output is automatically disabled if an output stream
    /// is connected to a file. (Or another non-terminal device.)
    ///
    /// Defaults to `true`, which automatically enables colored output to
    /// terminals.
    pub use_color: bool,

    /// Whether to force the use of colored terminal output, even if it's not available.
    ///
    /// Will force Laneway to use colored terminal output even if it does not detect that the output
    /// is a terminal that supports colors.
    ///
    /// Defaults to `false`, which keeps the behavior of `use_color`.
    pub force_use_color: bool,

    /// The filter used for tracing events.
    ///
    /// The filter is used to create a `tracing-subscriber`
    /// [`EnvFilter`](https://docs.rs/tracing-subscriber/0.3.10/tracing_subscriber/filter/struct.EnvFilter.html#directives),
    /// and more details on the syntax can be found there or in the examples
    /// below.
    ///
    /// If no filter is specified (`None`), the filter is set to `info` if the
    /// `-v` flag is given and `warn` if it is not given.
    ///
    /// # Examples
    ///
    /// `warn,lanewayd=info,laneway_consensus=debug` will warn on all events, but
    /// show info level events from `lanewayd` and debug level events from the
    /// lane and auction rules.
    ///
    /// `[{tx_id}]=trace` will turn on detailed tracing of every event that
    /// has a `tx_id` field.
    pub filter: Option<String>,

    /// If set to a path, write the tracing logs to that path.
    ///
    /// By default, logs are sent to the terminal standard output.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Returns `true` if standard output should use color escapes.
    /// Automatically checks if Laneway is running in a terminal.
    pub fn use_color_stdout(&self) -> bool {
        self.force_use_color || (self.use_color && std::io::stdout().is_terminal())
    }

    /// Returns `true` if output that could go to standard output or standard error
    /// should use color escapes. Automatically checks if Laneway is running in a terminal.
    pub fn use_color_stdout_and_stderr(&self) -> bool {
        self.force_use_color
            || (self.use_color
                && std::io::stdout().is_terminal()
                && std::io::stderr().is_terminal())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_color: true,
            force_use_color: false,
            filter: None,
            log_file: None,
        }
    }
}
