use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";

const LOG_FILES_KEPT: usize = 7;

/// Logs go into `<application_data_path>/logs`, one file per day. With `show_std` they are also
/// written to stderr. Stdout carries reports and exports, so logs never go there.
///
/// An explicit `log_level` applies to this crate only. Without it `RUST_LOG` is used as is,
/// falling back to `info`.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(application_data_path.join("logs"))?;

    let crate_target = env!("CARGO_CRATE_NAME");
    let filter = match log_level {
        Some(level) => EnvFilter::new(format!("{crate_target}={level}")),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{crate_target}=info"))),
    };

    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(appender);
    let stderr = show_std.then(|| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file)
        .with(stderr)
        .try_init()?;
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{enable_logging, CLI_PREFIX};

    #[test]
    fn test_second_subscriber_is_an_error() {
        // Test logging is installed first, so the CLI subscriber can't replace it.
        *super::TEST_LOGGING;
        let dir = tempdir().unwrap();
        assert!(enable_logging(CLI_PREFIX, dir.path(), None, false).is_err());
    }
}
