//! JSON 请求体提取：解析失败统一返回 `400 {error}`。

use axum::extract::{FromRequest, rejection::JsonRejection};

use super::error::ApiError;

/// 替代 `axum::Json` 的提取器，拒绝体与其他错误同形。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
