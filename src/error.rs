use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum CooldownError {
    #[error("invalid scope type: {0} (expected global/group/normal/user)")]
    InvalidScope(String),
    #[error("invalid time preset: {0} (expected std/zh)")]
    InvalidPreset(String),
    #[error("invalid config {key}: {reason}")]
    Config { key: &'static str, reason: String },
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot {}: {source}", .path.display())]
    MalformedSnapshot {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("snapshot serialization failed: {0}")]
    Serialize(serde_json::Error),
}

pub type CooldownResult<T> = Result<T, CooldownError>;

impl CooldownError {
    /// 是否为调用方输入错误
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CooldownError::InvalidScope(_) | CooldownError::InvalidPreset(_)
        )
    }
}

impl IntoResponse for CooldownError {
    fn into_response(self) -> Response {
        let (status, code) = if self.is_validation() {
            (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
        };

        (status, error_to_api_response::<()>(code, self.to_string())).into_response()
    }
}
