//! Lanewayd Config
//!
//! See instructions in `commands.rs` to specify the path to your
//! application's configuration file and/or command-line options
//! for specifying it.

use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

/// The prefix of environment variables that override config values.
pub const ENV_PREFIX: &str = "LANEWAY";

/// Returns true if a leaf key name should be considered sensitive and blocked
/// from environment variable overrides.
fn is_sensitive_leaf_key(leaf_key: &str) -> bool {
    let lower = leaf_key.to_ascii_lowercase();

    lower.ends_with("password")
        || lower.ends_with("secret")
        || lower.ends_with("token")
        || lower.ends_with("private_key")
}

/// Configuration for `lanewayd`.
///
/// The `lanewayd` config is a TOML-encoded version of this structure. The meaning
/// of each field is described in the documentation, although it may be necessary
/// to click through to the sub-structures for each section.
///
/// The path to the configuration file can be specified with the `--config` flag.
///
/// Every validator must use the same `consensus` section, or they will reject
/// each other's blocks. The other sections only affect the local node.
#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct LanewaydConfig {
    /// Lane and auction rules
    pub consensus: laneway_consensus::config::Config,

    /// Mempool configuration
    pub mempool: crate::components::mempool::Config,

    /// Tracing configuration
    pub tracing: crate::components::tracing::Config,
}

impl LanewaydConfig {
    /// Loads the configuration from the conventional sources.
    ///
    /// Configuration is loaded from three sources, in order of precedence:
    /// 1. Hard-coded defaults (lowest precedence)
    /// 2. TOML configuration file (if provided)
    /// 3. Environment variables with `LANEWAY_` prefix (highest precedence)
    ///
    /// Environment variables use the format `LANEWAY_SECTION__KEY` where:
    /// - `SECTION` is the configuration section (e.g., `mempool`, `tracing`)
    /// - `KEY` is the configuration key within that section
    /// - Double underscores (`__`) separate nested keys
    ///
    /// # Security
    ///
    /// Environment variables whose leaf key names end with sensitive suffixes (case-insensitive)
    /// cause configuration loading to fail: `password`, `secret`, `token`, `private_key`.
    ///
    /// # Examples
    ///
    /// - `LANEWAY_TRACING__FILTER=debug` sets `tracing.filter = "debug"`
    /// - `LANEWAY_CONSENSUS__AUCTION__RESERVE_FEE=1000` sets `consensus.auction.reserve_fee = 1000`
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, config::ConfigError> {
        Self::load_from(config_path, std::env::vars())
    }

    /// Loads the configuration from `config_path` and the environment variables in `vars`.
    pub fn load_from(
        config_path: Option<PathBuf>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        // Filter the raw environment first, then let config-rs parse types via try_parsing(true).
        let prefix = format!("{ENV_PREFIX}_");
        let mut filtered_env = HashMap::new();

        for (key, value) in vars {
            let Some(without_prefix) = key.strip_prefix(&prefix) else {
                continue;
            };

            if let Some(leaf) = without_prefix.split("__").last() {
                if is_sensitive_leaf_key(leaf) {
                    return Err(config::ConfigError::Message(format!(
                        "Environment variable '{key}' contains sensitive key '{leaf}' which cannot be \
                         overridden via environment variables. Use the configuration file instead."
                    )));
                }
            }

            filtered_env.insert(key, value);
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(filtered_env)),
        );

        // Missing fields use the Default implementations
        builder.build()?.try_deserialize()
    }
}
