//! Process-level initialization helpers: logger, HTTP client, semaphore.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use log::LevelFilter;
use reqwest::ClientBuilder;
use tokio::sync::Semaphore;

use crate::config::{LogFormat, HTTP_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes the global logger with the given level and format.
///
/// The plain format is env_logger's default human-readable output; the JSON
/// format emits one object per line for machine parsing. Calling this twice
/// returns an error from the second call (the global logger is set once per
/// process).
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let LogFormat::Json = format {
        builder.format(|buf, record| {
            let line = serde_json::json!({
                "ts": chrono::Utc::now().to_rfc3339(),
                "level": record.level().to_string(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        });
    }

    builder.try_init()?;
    Ok(())
}

/// Builds the shared HTTP client used for all remote geocode fetches.
pub fn init_client() -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    Ok(Arc::new(client))
}

/// Creates the semaphore bounding concurrent resolutions.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_builds() {
        let client = init_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_init_semaphore_permits() {
        let semaphore = init_semaphore(3);
        assert_eq!(semaphore.available_permits(), 3);
    }
}
