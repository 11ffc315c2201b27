//! Logging Infrastructure
//!
//! `tracing-subscriber` with an `EnvFilter`; optional daily-rolling file output.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "admin_server=info,tower_http=info";

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `log_level`. When `log_dir` exists, output goes to a
/// daily-rolling `admin-server.<date>` file instead of stdout.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = match log_level {
            Some(level) => format!("admin_server={level},tower_http={level}"),
            None => DEFAULT_FILTER.to_string(),
        };
        EnvFilter::new(directive)
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "admin-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
