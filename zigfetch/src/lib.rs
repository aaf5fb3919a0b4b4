//! A library for downloading the latest master build of the Zig compiler.
//!
//! `zigfetch` asks the public download index which master build is
//! current, downloads the archive for the platform it is running on, and
//! can unpack that archive afterwards. Windows builds ship as zip files
//! and are unpacked in-process; Linux and macOS builds ship as `.tar.xz`
//! files and are handed to the system `tar`.
//!
//! This project also ships a CLI tool named `zigfetch`, which adds a
//! yes/no prompt between the download and the extraction.
//!
//! The main entry point for programmatic use is the [`ZigFetchBuilder`]
//! struct. Here is an example of its usage:
//!
//! ```ignore
//! use zigfetch::ZigFetchBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let zigfetch = ZigFetchBuilder::new().build()?;
//!
//!     let download = zigfetch.download().await?;
//!     zigfetch.extract(&download)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! There is deliberately no caching, no checksum verification, no retry
//! logic, and no version selection beyond "whatever the index calls
//! master right now". The downloaded file lands in the current directory
//! (or the directory given to [`ZigFetchBuilder::download_dir`]) under
//! the same name the index uses, `zig-<os>-<arch>-<version><extension>`.
//!
//! ## Features
//!
//! This crate offers several features to control the TLS dependency used by `reqwest`:
//!
#![doc = document_features::document_features!()]

mod archiver;
mod builder;
mod extension;
mod index;
mod platform;
mod zigfetch;

pub use crate::{
    builder::ZigFetchBuilder,
    platform::{Arch, Os, Platform, PlatformError},
    zigfetch::{DownloadedArchive, ZigFetch},
};

// The version of the `zigfetch` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "logging")]
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};

/// This function initializes logging for the application. It's public for
/// the sake of the `zigfetch` binary, but it lives in the library crate so
/// that test code can also enable logging.
///
/// # Errors
///
/// This can return a `log::SetLoggerError` error.
#[cfg(feature = "logging")]
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    let line_colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::BrightBlack)
        .debug(Color::BrightBlack)
        .trace(Color::BrightBlack);
    let level_colors = line_colors.info(Color::Green).debug(Color::Black);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{color_line}[{target}][{level}{color_line}] {message}\x1B[0m",
                color_line = format_args!(
                    "\x1B[{}m",
                    line_colors.get_color(&record.level()).to_fg_str()
                ),
                target = record.target(),
                level = level_colors.color(record.level()),
                message = message,
            ));
        })
        .level(level)
        // This is very noisy.
        .level_for("hyper", log::LevelFilter::Error)
        .chain(std::io::stderr())
        .apply()
}
