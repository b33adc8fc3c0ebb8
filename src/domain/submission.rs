//! Usage: Single bulk freeze submission through the freeze service client.

use super::freeze::FreezeRequest;
use crate::api::client::ApiClient;
use crate::shared::error::{AppError, AppResult, ErrorCode};

pub const BULK_FREEZE_PATH: &str = "/freezes/compensation/bulk";
const BODY_SNIPPET_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub status: u16,
    pub body: String,
}

/// Posts the request once. There is no retry beyond the client's 401 refresh.
pub async fn submit_freeze(
    client: &ApiClient,
    request: &FreezeRequest,
) -> AppResult<SubmissionOutcome> {
    let payload = request.for_submission();
    tracing::info!(
        service = %client.name(),
        users = payload.user_ids.len(),
        "submitting bulk freeze"
    );

    let response = client.post(BULK_FREEZE_PATH, &payload).await?;
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        AppError::with_code(
            ErrorCode::Transport,
            format!(
                "service={} bulk freeze response read failed: {e}",
                client.name()
            ),
        )
    })?;

    if !status.is_success() {
        return Err(AppError::with_code(
            ErrorCode::Submission,
            format!(
                "service={} bulk freeze returned status={} body={}",
                client.name(),
                status.as_u16(),
                body.chars().take(BODY_SNIPPET_CHARS).collect::<String>()
            ),
        ));
    }

    tracing::info!(service = %client.name(), status = status.as_u16(), "bulk freeze accepted");
    Ok(SubmissionOutcome {
        status: status.as_u16(),
        body,
    })
}
