use reqwest::StatusCode;

use crate::app_error::AppError;

pub mod action_network;
pub mod gmail;
pub mod slack;

pub(crate) fn http_error(e: reqwest::Error) -> AppError {
    AppError::Http(e.to_string())
}

pub(crate) fn upstream_status(status: StatusCode) -> AppError {
    AppError::UpstreamStatus {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
    }
}
