// 文件职责：
// 1) 定义 api 服务与客户端共用的 HTTP 请求/响应结构。
// 2) 固定鉴权头名称与统一错误文案，保证各端一致。
// 3) 作为 Rust 侧协议唯一代码源，供服务端与测试复用。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 携带访问令牌的请求头。
pub const TOKEN_HEADER: &str = "x-jwt-token";
/// 鉴权网关统一拒绝文案。
pub const PERMISSION_DENIED: &str = "permission denied";
/// 登录失败统一文案（不区分账号不存在与密码错误）。
pub const NOT_AUTHENTICATED: &str = "not authenticated";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    // 账户公开编号。
    pub number: i64,
    // 明文密码，仅在本次请求内存在。
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    // 签名访问令牌。
    pub token: String,
    // 令牌绑定的账户编号。
    pub number: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    // 目标账户编号。
    pub to_account: i64,
    // 转账金额（占位，不做记账）。
    pub amount: i64,
}

/// 账户对外视图：不含密码派生值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    // 内部自增 ID。
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    // 公开账户编号，令牌授权锚点。
    pub number: i64,
    pub balance: i64,
    // 创建时间（UTC）。
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedResponse {
    // 已删除账户 ID。
    pub deleted: i64,
}

/// 统一错误响应体。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
