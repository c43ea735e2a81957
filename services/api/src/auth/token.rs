//! 访问令牌：HS256 紧凑签名格式的签发与校验。
//!
//! 令牌结构为 `b64url(header).b64url(claims).b64url(HMAC-SHA256)`，
//! header 固定为 `{"alg":"HS256","typ":"JWT"}`，claims 仅含
//! `accountNumber` 与 `expiresAt` 两个字段。令牌无状态，到期前始终有效。

use std::{fmt, sync::Arc, time::Duration};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::api::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// 唯一允许的签名算法。
pub(crate) const ALGORITHM: &str = "HS256";

/// 当前 unix 秒。
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 进程级签名密钥，启动后只读。
#[derive(Clone)]
pub(crate) struct SigningSecret(Arc<[u8]>);

/// 签名密钥为空。
#[derive(Debug, Error)]
#[error("signing secret must not be empty")]
pub(crate) struct EmptySecret;

impl SigningSecret {
    /// 全空白密钥直接拒绝；其余按原始字节使用，不做裁剪。
    pub(crate) fn new(raw: &str) -> Result<Self, EmptySecret> {
        if raw.trim().is_empty() {
            return Err(EmptySecret);
        }
        Ok(Self(Arc::from(raw.as_bytes())))
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.0).ok()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// 令牌 claims：解码时严格校验字段集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct TokenClaims {
    /// 令牌主体：账户公开编号。
    pub(crate) account_number: i64,
    /// 截止时间（unix 秒），到点即失效。
    pub(crate) expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// 令牌拒绝原因，仅用于内部日志。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum TokenRejection {
    #[error("token is malformed")]
    Malformed,
    #[error("token algorithm {0:?} is not allowed")]
    UnsupportedAlgorithm(String),
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token claims are invalid")]
    InvalidClaims,
    #[error("token expired at {0}")]
    Expired(i64),
}

/// 令牌签发器：密钥与 TTL 在构造时注入。
#[derive(Debug, Clone)]
pub(crate) struct TokenIssuer {
    secret: SigningSecret,
    ttl_sec: i64,
}

impl TokenIssuer {
    pub(crate) fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self {
            secret,
            ttl_sec: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// 以当前时间签发。
    pub(crate) fn issue(&self, account_number: i64) -> Result<String, ApiError> {
        self.issue_at(account_number, unix_now())
    }

    /// 以给定时间签发：`expiresAt = now + ttl`。
    pub(crate) fn issue_at(&self, account_number: i64, now: i64) -> Result<String, ApiError> {
        let claims = TokenClaims {
            account_number,
            expires_at: now.saturating_add(self.ttl_sec),
        };
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let header_b64 = encode_json(&header)?;
        let claims_b64 = encode_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let Some(mut mac) = self.secret.mac() else {
            tracing::error!("signing key rejected by hmac");
            return Err(ApiError::internal());
        };
        mac.update(signing_input.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{sig_b64}"))
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    let raw = serde_json::to_vec(value).map_err(|err| {
        tracing::error!("encode token segment failed: {err}");
        ApiError::internal()
    })?;
    Ok(URL_SAFE_NO_PAD.encode(raw))
}

/// 令牌校验器：纯函数，只依赖令牌与密钥。
#[derive(Debug, Clone)]
pub(crate) struct TokenVerifier {
    secret: SigningSecret,
}

impl TokenVerifier {
    pub(crate) fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// 以当前时间校验。
    pub(crate) fn verify(&self, raw: &str) -> Result<TokenClaims, TokenRejection> {
        self.verify_at(raw, unix_now())
    }

    /// 依次校验结构、算法、签名、claims 与截止时间；`now` 由调用方注入。
    pub(crate) fn verify_at(&self, raw: &str, now: i64) -> Result<TokenClaims, TokenRejection> {
        let mut parts = raw.trim().split('.');
        let header_b64 = parts.next().unwrap_or_default();
        let claims_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if header_b64.is_empty()
            || claims_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err(TokenRejection::Malformed);
        }

        let header_raw = URL_SAFE_NO_PAD
            .decode(header_b64.as_bytes())
            .map_err(|_| TokenRejection::Malformed)?;
        let header: TokenHeader =
            serde_json::from_slice(&header_raw).map_err(|_| TokenRejection::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenRejection::UnsupportedAlgorithm(header.alg));
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| TokenRejection::Malformed)?;
        let mut mac = self.secret.mac().ok_or(TokenRejection::BadSignature)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| TokenRejection::BadSignature)?;

        let claims_raw = URL_SAFE_NO_PAD
            .decode(claims_b64.as_bytes())
            .map_err(|_| TokenRejection::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&claims_raw).map_err(|_| TokenRejection::InvalidClaims)?;

        if claims.expires_at <= now {
            return Err(TokenRejection::Expired(claims.expires_at));
        }
        Ok(claims)
    }
}
