//! Decorated event formatter.
//!
//! Renders each event as
//!
//! ```text
//!  [I 2020-02-19 21:04:11 observing_poller::poll.retrieve] Fetched LATISS/20200219/000212/det000
//! ```
//!
//! The bracketed header holds the first letter of the level, local time and
//! the event target followed by the names of the enclosing spans. With colors
//! enabled the header is wrapped in the level's ANSI color.

use std::fmt;

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::color::color_format;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy)]
pub struct DecoratedFormatter {
    use_colors: bool,
}

impl DecoratedFormatter {
    #[must_use]
    pub const fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    #[must_use]
    pub const fn use_colors(&self) -> bool {
        self.use_colors
    }
}

impl Default for DecoratedFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<S, N> FormatEvent<S, N> for DecoratedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let level = *meta.level();

        let mut name = meta.target().to_string();
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                name.push('.');
                name.push_str(span.name());
            }
        }

        let letter = level.as_str().chars().next().unwrap_or('?');
        let timestamp = Local::now().format(DATE_FORMAT);
        let mut header = format!(" [{letter} {timestamp} {name}]");
        if self.use_colors {
            header = color_format(&header, level, "[", "]");
        }

        write!(writer, "{header} ")?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
