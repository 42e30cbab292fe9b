//! Tracing subscriber setup for the `diagram` binary.

/// How much to log and in which format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Default level, raised to `debug` for this crate when `debug` is set.
    pub fn with_debug(debug: bool) -> Self {
        Self {
            level: if debug { "info,diagram=debug" } else { "info" }.to_owned(),
            json: false,
        }
    }
}

/// Install a global stderr subscriber. `RUST_LOG` takes precedence over `config.level`.
///
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
