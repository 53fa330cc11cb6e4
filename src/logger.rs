use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::args::LogLevel;

/// Initializes tracing at `level`.
///
/// `RUST_LOG`, when set and valid, takes precedence over `level`. Returns an
/// error if a global subscriber is already installed, so tests can call it
/// freely.
pub fn try_init(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_without_panicking() {
        let _ = try_init(LogLevel::Warn);
        assert!(try_init(LogLevel::Debug).is_err());
    }
}
