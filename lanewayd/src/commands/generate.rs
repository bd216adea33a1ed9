//! `generate` subcommand - generates a default `lanewayd.toml` config.

use std::{fs::File, io::Write, path::PathBuf};

use crate::config::LanewaydConfig;

/// The comment at the top of generated config files.
const CONFIG_HEADER: &str = r"# Default configuration for lanewayd.
#
# This file can be used as a skeleton for custom configs.
#
# Unspecified fields use default values. Optional fields are Some(field) if the
# field is present and None if it is absent.
#
# This file is generated as an example using lanewayd's current defaults.
# You should set only the config options you want to keep, and delete the rest.
# Only a subset of fields are present in the skeleton, since optional values
# whose default is None are omitted.
#
# Every validator must use the same [consensus] section, including the lane
# order, or validators will reject each other's blocks.
#
# CONFIGURATION SOURCES (in order of precedence, highest to lowest):
#
# 1. Environment variables with LANEWAY_ prefix (highest precedence)
#    - Format: LANEWAY_SECTION__KEY (double underscore for nested keys)
#    - Examples:
#      - LANEWAY_TRACING__FILTER=debug
#      - LANEWAY_MEMPOOL__EVICTION_MEMORY_TIME=30m
#      - LANEWAY_CONSENSUS__AUCTION__RESERVE_FEE=1000
#
# 2. Configuration file (TOML format)
#    - At the path specified via -c flag, e.g. `lanewayd -c myconfig.toml check-config`, or
#    - At `lanewayd.toml` in the current directory
#
# 3. Hard-coded defaults (lowest precedence)

";

/// Generate a default `lanewayd.toml` configuration
#[derive(Debug, Default, clap::Parser)]
pub struct GenerateCmd {
    /// The file to write the generated config to.
    #[clap(
        long,
        short,
        help = "The file to write the generated config to (stdout if unspecified)"
    )]
    pub output_file: Option<PathBuf>,
}

impl GenerateCmd {
    /// Writes the default config.
    #[allow(clippy::print_stdout)]
    pub fn run(&self) -> color_eyre::Result<()> {
        let output = default_config_toml()?;

        match self.output_file {
            Some(ref output_file) => {
                File::create(output_file)?.write_all(output.as_bytes())?;
            }
            None => {
                println!("{output}");
            }
        }

        Ok(())
    }
}

/// Returns the default config as commented TOML.
pub fn default_config_toml() -> Result<String, toml::ser::Error> {
    let mut output = CONFIG_HEADER.to_owned();

    // this avoids a ValueAfterTable error
    // https://github.com/alexcrichton/toml-rs/issues/145
    let conf = toml::Value::try_from(LanewaydConfig::default())?;
    output += &toml::to_string_pretty(&conf)?;

    Ok(output)
}
