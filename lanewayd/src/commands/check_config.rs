//! `check-config` subcommand - loads a config, and checks its lane layout.

use std::path::PathBuf;

use color_eyre::eyre::WrapErr;

use laneway_consensus::LaneRules;

use crate::{components::tracing::Tracing, config::LanewaydConfig};

/// Load a config, and check that its lane layout is valid
#[derive(Debug, Default, clap::Parser)]
pub struct CheckConfigCmd {}

impl CheckConfigCmd {
    /// Loads the config at `config_path`, and the `LANEWAY_` environment variables.
    ///
    /// Returns an error if the config can't be loaded, or its lane layout is invalid.
    pub fn run(&self, config_path: Option<PathBuf>, verbose: bool) -> color_eyre::Result<()> {
        let config = LanewaydConfig::load(config_path.clone())
            .wrap_err_with(|| format!("failed to load config from {config_path:?}"))?;

        let _tracing = Tracing::init(&config.tracing, verbose)?;

        let rules = check(&config)?;

        info!(
            lanes = ?rules.lanes(),
            fee_denom = rules.fee_denom(),
            block_budget = ?rules.block_budget(),
            auction = ?rules.auction(),
            "config is valid",
        );

        Ok(())
    }
}

/// Checks that the lane layout in `config` is valid, and returns its rules.
pub fn check(config: &LanewaydConfig) -> color_eyre::Result<LaneRules> {
    LaneRules::new(&config.consensus).wrap_err("invalid lane layout in the consensus config")
}
