//! Lanewayd EntryPoint
//!
//! Handles command-line argument parsing and config file path resolution.

use std::path::PathBuf;

use super::{default_config_path, LanewaydCmd};

/// Toplevel entrypoint command.
///
/// Handles obtaining toplevel help as well as verbosity settings.
///
/// # Configuration Loading
///
/// Configuration is loaded with the following precedence:
/// 1. **Defaults**: Sensible defaults for all fields
/// 2. **TOML File**: Config file specified via `-c`/`--config`, or `lanewayd.toml` in the current directory
/// 3. **Environment Variables**: `LANEWAY_` prefixed vars with `__` for nesting (e.g., `LANEWAY_TRACING__FILTER`)
#[derive(Debug, clap::Parser)]
#[clap(
    version = clap::crate_version!(),
    author = "Laneway Contributors",
    help_template = "\
{name} {version}\n
{author}\n
{usage-heading} {usage}\n
{all-args}\
"
)]
pub struct EntryPoint {
    /// Subcommand to execute.
    #[clap(subcommand)]
    pub cmd: LanewaydCmd,

    /// Path to the configuration file.
    ///
    /// All config fields can also be overridden with environment variables
    /// using the `LANEWAY_` prefix and double underscores for nesting.
    #[clap(long, short, global = true, help = "path to configuration file")]
    pub config: Option<PathBuf>,

    /// Increase verbosity setting
    #[clap(long, short, global = true, help = "be verbose")]
    pub verbose: bool,
}

impl EntryPoint {
    /// Returns the path of the config file to load, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            // Use explicit `-c`/`--config` argument if passed
            Some(cfg) => Some(cfg.clone()),
            // Otherwise look in the current directory
            None => default_config_path(),
        }
    }

    /// Runs the selected subcommand.
    pub fn run(&self) -> color_eyre::Result<()> {
        self.cmd.run(self.config_path(), self.verbose)
    }
}
