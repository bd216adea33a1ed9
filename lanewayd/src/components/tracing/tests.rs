//! Tests for tracing configuration.

use color_eyre::eyre::Result;

use super::Config;

#[test]
fn forced_color_ignores_the_terminal() {
    laneway_test::init();

    let config = Config {
        use_color: false,
        force_use_color: true,
        ..Config::default()
    };

    assert!(config.use_color_stdout());
    assert!(config.use_color_stdout_and_stderr());

    let config = Config {
        use_color: false,
        ..Config::default()
    };

    assert!(!config.use_color_stdout());
}

#[test]
fn tracing_config_uses_defaults() -> Result<()> {
    laneway_test::init();

    let config: Config = toml::from_str(r#"filter = "warn,lanewayd=debug""#)?;

    assert_eq!(config.filter.as_deref(), Some("warn,lanewayd=debug"));
    assert!(config.use_color);
    assert_eq!(config.log_file, None);

    Ok(())
}
