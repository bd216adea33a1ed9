//! Lanewayd Subcommands

use std::path::PathBuf;

mod check_config;
mod entry_point;
mod generate;


pub use self::{check_config::CheckConfigCmd, entry_point::EntryPoint, generate::GenerateCmd};

/// Lanewayd Configuration Filename
pub const CONFIG_FILE: &str = "lanewayd.toml";

/// Lanewayd Subcommands
#[derive(Debug, clap::Subcommand)]
pub enum LanewaydCmd {
    /// Generate a default config
    Generate(GenerateCmd),

    /// Load a config, and check that its lane layout is valid
    CheckConfig(CheckConfigCmd),
}

impl LanewaydCmd {
    /// Runs the subcommand, using the config at `config_path` if it needs a config.
    pub fn run(&self, config_path: Option<PathBuf>, verbose: bool) -> color_eyre::Result<()> {
        match self {
            LanewaydCmd::Generate(cmd) => cmd.run(),
            LanewaydCmd::CheckConfig(cmd) => cmd.run(config_path, verbose),
        }
    }
}

/// Returns the path of the config file in the current directory, if there is one.
pub fn default_config_path() -> Option<PathBuf> {
    let filename = std::env::current_dir().ok().map(|mut dir_path| {
        dir_path.push(CONFIG_FILE);
        dir_path
    });

    filename.filter(|path| path.exists())
}
