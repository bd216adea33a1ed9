//! Main entry point for Lanewayd

#![deny(missing_docs, trivial_casts, unused_qualifications)]
#![forbid(unsafe_code)]

use clap::Parser;

use lanewayd::commands::EntryPoint;

/// Boot Lanewayd
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    EntryPoint::parse().run()
}
