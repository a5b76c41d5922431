//! Logging and tracing initialization.

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match (&config.file, config.json) {
        (Some(path), json) => match std::fs::File::create(path) {
            Ok(file) => {
                let writer = std::sync::Mutex::new(file);
                if json {
                    let subscriber = fmt::Subscriber::builder()
                        .with_env_filter(env_filter)
                        .with_writer(writer)
                        .json()
                        .finish();
                    tracing::subscriber::set_global_default(subscriber).ok();
                } else {
                    let subscriber = fmt::Subscriber::builder()
                        .with_env_filter(env_filter)
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true)
                        .finish();
                    tracing::subscriber::set_global_default(subscriber).ok();
                }
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {e}", path.display());
                init_logging(&LoggingConfig {
                    file: None,
                    ..config.clone()
                });
            }
        },
        (None, true) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (None, false) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }
}
