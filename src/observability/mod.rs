use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with the configured log level.
///
/// Maps config log levels to tracing levels:
/// - "DISABLED" -> no subscriber installed
/// - "WARNING" -> WARN
/// - "CRITICAL" -> ERROR
/// - Others map directly (DEBUG, INFO, ERROR)
pub fn init_tracing(log_level: &str) {
    let Some(directive) = tracing_directive(log_level) else {
        return;
    };

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("INFO"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn tracing_directive(log_level: &str) -> Option<String> {
    let level = log_level.to_uppercase();
    match level.as_str() {
        "DISABLED" => None,
        "WARNING" => Some("WARN".to_string()),
        "CRITICAL" => Some("ERROR".to_string()),
        _ => Some(level),
    }
}

/// Summary of one translated response, logged when its stream ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamStats {
    pub content_chunks: u64,
    pub reasoning_chunks: u64,
    pub error_chunks: u64,
}

impl StreamStats {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.content_chunks + self.reasoning_chunks + self.error_chunks
    }
}

/// Log a finished translation with its duration.
pub fn log_stream_complete(request_id: &str, model: &str, stats: &StreamStats, elapsed: Duration) {
    tracing::info!(
        request_id,
        model,
        chunks = stats.total(),
        content_chunks = stats.content_chunks,
        reasoning_chunks = stats.reasoning_chunks,
        error_chunks = stats.error_chunks,
        elapsed_ms = elapsed_millis(elapsed),
        "stream complete"
    );
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_directive_mapping() {
        assert_eq!(tracing_directive("disabled"), None);
        assert_eq!(tracing_directive("WARNING").as_deref(), Some("WARN"));
        assert_eq!(tracing_directive("critical").as_deref(), Some("ERROR"));
        assert_eq!(tracing_directive("debug").as_deref(), Some("DEBUG"));
    }

    #[test]
    fn test_elapsed_millis_saturates() {
        assert_eq!(elapsed_millis(Duration::from_millis(1_250)), 1_250);
        assert_eq!(elapsed_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_stream_stats_total() {
        let stats = StreamStats {
            content_chunks: 3,
            reasoning_chunks: 2,
            error_chunks: 1,
        };
        assert_eq!(stats.total(), 6);
    }
}
