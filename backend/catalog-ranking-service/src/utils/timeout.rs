/// Deadline wrapper for storage calls
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{AppError, Result};

/// Run a fallible storage future under `duration`
///
/// Elapsed deadlines become `AppError::Timeout` naming `operation`. Errors
/// produced by the future itself pass through unchanged.
pub async fn with_deadline<F, T>(duration: Duration, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation,
                timeout_ms = duration.as_millis() as u64,
                "Storage call exceeded deadline"
            );
            Err(AppError::Timeout(format!(
                "{operation} after {}ms",
                duration.as_millis()
            )))
        }
    }
}
