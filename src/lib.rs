//! # SweatShares
//!
//! Signature field placement for the SweatShares document vault. A sender
//! opens a PDF, drops one signature field per page, adjusts it, and sends a
//! signature request to a chosen receiver.
//!
//! ## Architecture
//!
//! The workspace is split into crates:
//!
//! 1. **sweatshares-settings** - Editor configuration (zoom range, field defaults, request limits)
//! 2. **sweatshares-signing** - Coordinate mapping, page rendering control, field store,
//!    pointer interaction and request assembly
//! 3. **sweatshares** - This crate: logging setup and the `replay` command that drives an
//!    editor session from a JSON script
//!
//! ## Features
//!
//! - **Two coordinate spaces**: fields live in PDF space and are projected to the viewer
//!   on demand, so zoom and resize never move them on the page
//! - **Direct manipulation**: click to place, drag to move, corner handles to resize
//! - **Render control**: fit-to-container scale, zoom, stale render suppression, retry
//! - **Request validation**: receiver, field count, message length, expiration

pub mod replay;

pub use sweatshares_settings as settings;
pub use sweatshares_signing as signing;

pub use sweatshares_settings::{EditorSettings, SettingsError};
pub use sweatshares_signing::{
    BlankDocument, DocumentSource, EditorError, SignatureEditor, SignatureRequest,
    SubmissionError, SubmissionTarget,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so stdout stays free for command output
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(LogFormat::Pretty)
}

/// Initialize logging in the given format.
pub fn init_logging_with(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
