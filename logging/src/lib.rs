//! Decorated logging for the observing utilities.
//!
//! Library crates only emit `tracing` events. Binaries call [`init`] once to
//! route them to stdout through the [`DecoratedFormatter`].

pub mod color;
pub mod format;

use std::io;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub use color::{Color, RESET_SEQ, color_format, level_color};
pub use format::{DATE_FORMAT, DecoratedFormatter};

pub const DEFAULT_FILTER: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub use_colors: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            use_colors: true,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

/// A fmt layer that renders events with the [`DecoratedFormatter`].
pub fn layer<S, W>(use_colors: bool, make_writer: W) -> impl Layer<S> + Send + Sync + 'static
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .event_format(DecoratedFormatter::new(use_colors))
        .with_ansi(use_colors)
        .with_writer(make_writer)
}

/// Install the decorated stdout subscriber as the global default.
///
/// `RUST_LOG` wins over `settings.filter`. Returns `false` when a global
/// subscriber was already installed, in which case that one stays in place.
pub fn init(settings: &LogSettings) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(layer(settings.use_colors, io::stdout))
        .with(env_filter)
        .try_init()
        .is_ok()
}
