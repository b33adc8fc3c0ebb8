//! Usage: Run blocking work (terminal prompts) on the tokio blocking pool with a stable label.

use crate::shared::error::{AppError, AppResult, ErrorCode};

pub async fn run<T, E>(
    label: &'static str,
    f: impl FnOnce() -> Result<T, E> + Send + 'static,
) -> AppResult<T>
where
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(Into::into),
        Err(join_err) => {
            // Panic payloads may echo operator input; keep them out of the message.
            if join_err.is_panic() {
                tracing::error!(label, "blocking task panicked");
                return Err(AppError::with_code(
                    ErrorCode::Internal,
                    format!("{label}: task panicked"),
                ));
            }

            tracing::warn!(label, "blocking task cancelled");
            Err(AppError::with_code(
                ErrorCode::Internal,
                format!("{label}: task cancelled"),
            ))
        }
    }
}
