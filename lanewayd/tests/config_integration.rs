//! Tests for config loading
//!
//! Note: Tests that change the process environment use a mutex, so they run
//! sequentially and don't interfere with each other.

use std::{env, fs, sync::Mutex, time::Duration};

use tempfile::TempDir;

use laneway_chain::amount::{Amount, NonNegative};
use laneway_consensus::LaneKind;
use lanewayd::config::LanewaydConfig;

// Global mutex to ensure tests run sequentially and don't interfere with each other
static TEST_MUTEX: Mutex<()> = Mutex::new(());

/// Helper struct to manage environment variables in tests
struct EnvGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
    original_vars: Vec<(String, String)>,
}

impl EnvGuard {
    /// Create a new EnvGuard, clearing all LANEWAY_ environment variables
    fn new() -> Self {
        let guard = TEST_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let original_vars: Vec<(String, String)> = env::vars()
            .filter(|(key, _)| key.starts_with("LANEWAY_"))
            .collect();

        for (key, _) in &original_vars {
            env::remove_var(key);
        }

        Self {
            _guard: guard,
            original_vars,
        }
    }

    /// Set a LANEWAY_ environment variable for testing
    fn set_var(&self, key: &str, value: &str) {
        env::set_var(key, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // Clear any LANEWAY_ vars that might have been set during the test
        let current_vars: Vec<String> = env::vars()
            .filter(|(key, _)| key.starts_with("LANEWAY_"))
            .map(|(key, _)| key)
            .collect();

        for key in current_vars {
            env::remove_var(&key);
        }

        // Restore original environment variables
        for (key, value) in &self.original_vars {
            env::set_var(key, value);
        }
    }
}

/// Test that loading a config with defaults works
#[test]
fn config_load_defaults() {
    laneway_test::init();
    let _env_guard = EnvGuard::new();

    let config = LanewaydConfig::load(None).expect("Should load default config");

    assert_eq!(config, LanewaydConfig::default());
    assert_eq!(config.consensus.lanes[0].kind, LaneKind::Mev);
}

/// Test that loading a config from a TOML file works
#[test]
fn config_load_from_file() {
    laneway_test::init();
    let _env_guard = EnvGuard::new();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("test_config.toml");

    let test_config = r#"
[consensus]
fee_denom = "uatom"

[[consensus.lanes]]
kind = "free"
max_block_space_percent = 25

[[consensus.lanes]]
kind = "default"

[consensus.auction]
reserve_fee = 500

[mempool]
eviction_memory_time = "30m"

[mempool.free_lane]
max_txs = 50

[tracing]
filter = "debug"
"#;

    fs::write(&config_path, test_config).expect("Failed to write test config");

    let config = LanewaydConfig::load(Some(config_path)).expect("Should load config from file");

    assert_eq!(config.consensus.fee_denom, "uatom");
    assert_eq!(config.consensus.lanes.len(), 2);
    assert_eq!(config.consensus.lanes[0].kind, LaneKind::Free);
    assert_eq!(config.consensus.lanes[0].max_block_space_percent, 25);
    assert_eq!(
        config.consensus.auction.reserve_fee,
        Amount::<NonNegative>::new(500)
    );
    assert_eq!(
        config.mempool.eviction_memory_time,
        Duration::from_secs(30 * 60)
    );
    assert_eq!(config.mempool.free_lane.max_txs, 50);
    assert_eq!(config.tracing.filter.as_deref(), Some("debug"));

    // Unspecified fields use defaults
    assert_eq!(
        config.consensus.block,
        LanewaydConfig::default().consensus.block
    );
}

/// Test that environment variables override the config file
#[test]
fn config_env_overrides_file() {
    laneway_test::init();
    let env_guard = EnvGuard::new();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("test_config.toml");

    fs::write(&config_path, "[tracing]\nfilter = \"warn\"\n").expect("Failed to write test config");

    env_guard.set_var("LANEWAY_TRACING__FILTER", "lanewayd=trace");
    env_guard.set_var("LANEWAY_CONSENSUS__AUCTION__RESERVE_FEE", "1000");
    env_guard.set_var("LANEWAY_CONSENSUS__AUCTION__FRONT_RUNNING_PROTECTION", "false");

    let config = LanewaydConfig::load(Some(config_path)).expect("Should load config");

    assert_eq!(config.tracing.filter.as_deref(), Some("lanewayd=trace"));
    assert_eq!(
        config.consensus.auction.reserve_fee,
        Amount::<NonNegative>::new(1000)
    );
    assert!(!config.consensus.auction.front_running_protection);
}

/// Test that sensitive keys can't be set from the environment
#[test]
fn config_env_rejects_sensitive_keys() {
    laneway_test::init();

    let vars = [(
        "LANEWAY_APP__API_TOKEN".to_string(),
        "hunter2".to_string(),
    )];

    let error = LanewaydConfig::load_from(None, vars).expect_err("sensitive keys are refused");
    assert!(error.to_string().contains("API_TOKEN"));

    // Other prefixes are ignored
    let vars = [("OTHER_TRACING__FILTER".to_string(), "debug".to_string())];
    let config = LanewaydConfig::load_from(None, vars).expect("Should load default config");
    assert_eq!(config, LanewaydConfig::default());
}

/// Test that invalid config files produce errors
#[test]
fn config_invalid_file_is_an_error() {
    laneway_test::init();
    let _env_guard = EnvGuard::new();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("test_config.toml");

    fs::write(&config_path, "[consensus]\nlane_count = 3\n").expect("Failed to write test config");

    assert!(LanewaydConfig::load(Some(config_path)).is_err());

    let missing = temp_dir.path().join("missing.toml");
    assert!(LanewaydConfig::load(Some(missing)).is_err());
}
