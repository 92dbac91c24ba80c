use chrono::Utc;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Where the log goes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Console, the default choice.
    #[default]
    Stdout,

    /// A file in the temporary directory named `satsuma-<timestamp>.log`.
    File,
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// The returned guard flushes the file sink on drop and has to live as long
/// as logging is needed.
pub fn init(kind: LogKind, level: &str) -> Result<Option<WorkerGuard>, ParseError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    match kind {
        LogKind::Stdout => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
        LogKind::File => {
            let file_name = format!("satsuma-{}.log", Utc::now().timestamp());
            let directory = std::env::temp_dir();
            println!("Logging to file: {}", directory.join(&file_name).display());

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();

            Ok(Some(guard))
        }
    }
}
