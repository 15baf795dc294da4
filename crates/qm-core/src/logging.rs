use std::{fs::OpenOptions, io, path::Path, sync::Arc};

use tracing_subscriber::{
    fmt::{format::Writer, time::FormatTime, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::{errors::Error, Result};

/// Local time in `YYYY-MM-DD HH:MM:SS`.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Initialize logging for the bot.
///
/// Every line goes to stdout and is appended to `log_file`, formatted as
/// `YYYY-MM-DD HH:MM:SS LEVEL message`. The filter defaults to `info` for
/// everything and can be overridden with `RUST_LOG`. Records emitted through
/// the `log` crate (teloxide) are captured as well.
pub fn init(service_name: &str, log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    let file = Arc::new(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{service_name}=info")));

    let event_format = tracing_subscriber::fmt::format()
        .with_timer(LocalTimer)
        .with_level(true)
        .with_target(false);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout.and(file))
        .event_format(event_format)
        .with_ansi(false);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::External(format!("failed to install log subscriber: {e}")))?;

    Ok(())
}
