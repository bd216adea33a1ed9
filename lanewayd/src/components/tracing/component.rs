//! The tracing component for `lanewayd`.

use std::{
    fs::{self, File},
    io,
    sync::Mutex,
};

use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use super::Config;

/// The filter used when the config doesn't have one.
const DEFAULT_FILTER: &str = "info";

/// The filter used when the config doesn't have one, and the `--verbose` flag isn't set.
const DEFAULT_QUIET_FILTER: &str = "warn";

/// The installed `tracing` subscriber.
#[derive(Debug)]
pub struct Tracing {
    /// The configured filter.
    filter: String,
}

impl Tracing {
    /// Installs the global `tracing` subscriber, configured by `config`.
    ///
    /// `verbose` chooses the filter if `config` doesn't have one.
    ///
    /// Returns an error if the log file can't be opened, or a global subscriber
    /// is already installed.
    //
    // This method should only print to stderr, because stdout is for tracing logs.
    #[allow(clippy::print_stderr)]
    pub fn init(config: &Config, verbose: bool) -> Result<Self, color_eyre::Report> {
        let use_color = config.use_color_stdout();

        let filter = config.filter.clone().unwrap_or_else(|| {
            if verbose {
                DEFAULT_FILTER.to_string()
            } else {
                DEFAULT_QUIET_FILTER.to_string()
            }
        });

        let (writer, use_color) = if let Some(log_file) = config.log_file.as_ref() {
            // Make sure the directory for the log file exists.
            // If the log is configured in the current directory, it won't have a parent directory.
            if let Some(log_file_dir) = log_file.parent() {
                if !log_file_dir.as_os_str().is_empty() && !log_file_dir.exists() {
                    eprintln!("Directory for log file {log_file:?} does not exist, trying to create it...");

                    if let Err(create_dir_error) = fs::create_dir_all(log_file_dir) {
                        eprintln!("Failed to create directory for log file: {create_dir_error}");
                        eprintln!("Trying log file anyway...");
                    }
                }
            }

            let log_file = File::options().append(true).create(true).open(log_file)?;

            // Color escapes are unreadable in log files.
            (BoxMakeWriter::new(Mutex::new(log_file)), false)
        } else {
            (BoxMakeWriter::new(io::stdout), use_color)
        };

        // Construct a format subscriber with the supplied global logging filter.
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_ansi(use_color)
            .with_writer(writer)
            .with_env_filter(&filter)
            .finish()
            .with(ErrorLayer::default());

        // Initialise the global tracing subscriber
        subscriber.try_init()?;

        // Log the tracing stack we just created
        tracing::info!(
            ?filter,
            TRACING_STATIC_MAX_LEVEL = ?tracing::level_filters::STATIC_MAX_LEVEL,
            log_file = ?config.log_file,
            "started tracing component",
        );

        Ok(Self { filter })
    }

    /// Returns the filter used by the subscriber.
    pub fn filter(&self) -> &str {
        &self.filter
    }
}
