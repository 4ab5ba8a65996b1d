//! Log setup: bare messages on stderr
//!
//! Single-line warnings and errors get a `LEVEL: ` prefix; everything else
//! is printed as-is so multi-line debug dumps stay readable.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event formatter printing only the message
#[derive(Debug, Clone, Copy)]
pub struct MessageFormat {
    level_prefix: bool,
}

impl MessageFormat {
    pub fn new(level_prefix: bool) -> Self {
        Self { level_prefix }
    }
}

impl<S, N> FormatEvent<S, N> for MessageFormat
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
        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;

        let level = *event.metadata().level();
        if self.level_prefix && level <= Level::WARN && !message.contains('\n') {
            write!(writer, "{level}: ")?;
        }
        writeln!(writer, "{message}")
    }
}

/// Build the filter: `RUST_LOG` wins, then the given directive
pub fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Install the global subscriber writing to stderr
pub fn init(directive: &str, level_prefix: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directive))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .event_format(MessageFormat::new(level_prefix))
        .init();
}
