//! API 错误定义与响应转换。

use ag_shared_protocol::{ErrorBody, NOT_AUTHENTICATED, PERMISSION_DENIED};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::storage::StorageError;

/// 对外接口错误：仅携带状态码与一句简短说明。
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 输入错误（请求体、参数不合法）。
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 登录失败：账号不存在与密码错误共用同一信号。
    pub(crate) fn not_authenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, NOT_AUTHENTICATED)
    }

    /// 鉴权网关统一拒绝。
    pub(crate) fn permission_denied() -> Self {
        Self::new(StatusCode::FORBIDDEN, PERMISSION_DENIED)
    }

    /// 协作方故障，细节只进日志。
    pub(crate) fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::new(StatusCode::NOT_FOUND, "account not found"),
            StorageError::NumberTaken(_) => Self::new(StatusCode::CONFLICT, "account number taken"),
            StorageError::Persist(detail) => {
                tracing::error!("storage failure: {detail}");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}
