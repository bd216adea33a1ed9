//! Shared test setup for the Laneway crates.
#![doc(html_root_url = "https://docs.rs/laneway_test")]
#![warn(missing_docs)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

use std::{collections::HashSet, fmt, panic::PanicInfo, sync::Once};

use color_eyre::{config::Frame, section::PanicMessage};
use owo_colors::OwoColorize;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Backtrace frames from the test harness and async plumbing, rather than Laneway code.
const NOISY_FRAMES: &[&str] = &[
    "std::",
    "core::",
    "tokio::",
    "test::",
    "<alloc::boxed::Box",
    "<core::",
    "<std::panic::AssertUnwindSafe",
    "<futures_util::",
    "<T as futures_util",
    "<tower::util::",
    "<tracing::instrument::Instrumented",
];

/// Installs the tracing subscriber and the error report hooks.
///
/// Call this at the start of every test. Later calls do nothing.
///
/// Logs go to the test output at `warn`, unless `RUST_LOG` is set. Mempool and
/// proposal rejections are expected in tests, so those crates only log errors.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,laneway_consensus=error,lanewayd=error")
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(log_fmt::layer().with_target(false))
            .with(ErrorLayer::default())
            .init();

        color_eyre::config::HookBuilder::default()
            .add_frame_filter(Box::new(hide_noisy_frames))
            .panic_message(TestPanicMessage)
            .install()
            .expect("error report hooks are only installed once");
    })
}

/// Calls [`init`], then returns a single-threaded Tokio runtime.
///
/// Proptests can't use `#[tokio::test]`, so they run their async code on this runtime.
pub fn init_async() -> tokio::runtime::Runtime {
    init();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime builds")
}

/// Removes duplicate frames, and frames that aren't from Laneway code.
fn hide_noisy_frames(frames: &mut Vec<&Frame>) {
    let mut seen = HashSet::new();

    frames.retain(|frame| {
        let Some(name) = frame.name.as_deref() else {
            return false;
        };

        seen.insert((frame.lineno, &frame.filename))
            && !NOISY_FRAMES.iter().any(|noisy| name.starts_with(noisy))
    });
}

/// Prints panics in color, and skips the panic that follows a test returning `Err`.
struct TestPanicMessage;

impl PanicMessage for TestPanicMessage {
    fn display(&self, info: &PanicInfo<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = info
            .payload()
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| info.payload().downcast_ref::<&str>().copied())
            .unwrap_or("<non string panic payload>");

        // The test harness has already printed the returned error.
        if payload.contains("the test returned a termination value with a non-zero status code") {
            return write!(f, "---- end of test output ----");
        }

        writeln!(f, "{}", "\nThe test panicked.".red())?;
        writeln!(f, "Message:  {}", payload.cyan())?;

        match info.location() {
            Some(location) => write!(
                f,
                "Location: {}:{}",
                location.file().purple(),
                location.line().purple()
            ),
            None => write!(f, "Location: <unknown>"),
        }
    }
}
