//! 按账户授权网关。
//!
//! 请求依次经过：取令牌头 -> 校验令牌 -> 解析路径 ID -> 查询目标账户 ->
//! 比对 `number` 与令牌主体。任一步失败都短路为同一个
//! `403 {"error":"permission denied"}`，具体原因只进日志。

use std::sync::Arc;

use ag_shared_protocol::TOKEN_HEADER;
use axum::{
    extract::{Path, Request, State, rejection::PathRejection},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    accounts::model::Account,
    api::error::ApiError,
    auth::token::{TokenClaims, TokenRejection, TokenVerifier},
    storage::{Storage, StorageError},
};

/// 通过网关的请求上下文，挂在 request extensions 上。
#[derive(Debug, Clone)]
pub(crate) struct AuthorizedAccount {
    pub(crate) account: Account,
    pub(crate) claims: TokenClaims,
}

/// 拒绝原因（内部）。
#[derive(Debug, Error)]
pub(crate) enum Denial {
    #[error("missing x-jwt-token header")]
    MissingToken,
    #[error(transparent)]
    InvalidToken(#[from] TokenRejection),
    #[error("path id {0:?} is not a valid account id")]
    MalformedId(String),
    #[error("account {0} not found")]
    AccountUnresolved(i64),
    #[error("resolve account {id} failed: {detail}")]
    StorageFailure { id: i64, detail: String },
    #[error("token subject {claimed} does not own account {id}")]
    OwnerMismatch { claimed: i64, id: i64 },
}

/// 授权网关：令牌校验器 + 账户解析。
#[derive(Clone)]
pub(crate) struct AuthorizationGate {
    verifier: TokenVerifier,
    store: Arc<dyn Storage>,
}

impl AuthorizationGate {
    pub(crate) fn new(verifier: TokenVerifier, store: Arc<dyn Storage>) -> Self {
        Self { verifier, store }
    }

    /// 以当前时间判定。
    pub(crate) async fn authorize(
        &self,
        token: Option<&str>,
        raw_id: &str,
    ) -> Result<AuthorizedAccount, Denial> {
        let claims = self.verifier.verify(present(token)?)?;
        self.resolve_owner(claims, raw_id).await
    }

    /// 判定请求是否可以访问路径指向的账户。
    pub(crate) async fn authorize_at(
        &self,
        token: Option<&str>,
        raw_id: &str,
        now: i64,
    ) -> Result<AuthorizedAccount, Denial> {
        let claims = self.verifier.verify_at(present(token)?, now)?;
        self.resolve_owner(claims, raw_id).await
    }

    /// 令牌已通过校验后：解析路径 ID、查询账户、比对主体。
    async fn resolve_owner(
        &self,
        claims: TokenClaims,
        raw_id: &str,
    ) -> Result<AuthorizedAccount, Denial> {
        let id = raw_id
            .trim()
            .parse::<i64>()
            .map_err(|_| Denial::MalformedId(raw_id.to_string()))?;

        let account = match self.store.get_account_by_id(id).await {
            Ok(account) => account,
            Err(StorageError::NotFound) => return Err(Denial::AccountUnresolved(id)),
            Err(err) => {
                return Err(Denial::StorageFailure {
                    id,
                    detail: err.to_string(),
                });
            }
        };

        if account.number != claims.account_number {
            return Err(Denial::OwnerMismatch {
                claimed: claims.account_number,
                id,
            });
        }
        Ok(AuthorizedAccount { account, claims })
    }
}

fn present(token: Option<&str>) -> Result<&str, Denial> {
    token
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(Denial::MissingToken)
}

/// 路由中间件：包在每个按账户访问的路由上。
pub(crate) async fn require_account_owner(
    State(gate): State<AuthorizationGate>,
    path: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let raw_id = match path {
        Ok(Path(raw)) => raw,
        Err(rejection) => {
            warn!("permission denied: {}", rejection.body_text());
            return ApiError::permission_denied().into_response();
        }
    };

    // 非可见 ASCII 的头值按格式错误处理，而不是视为缺失。
    let header = request
        .headers()
        .get(TOKEN_HEADER)
        .map(|value| value.to_str().unwrap_or("?").to_string());

    let decision = gate.authorize(header.as_deref(), &raw_id).await;
    match decision {
        Ok(authorized) => {
            debug!(
                "account {} authorized for number {}",
                authorized.account.id, authorized.claims.account_number
            );
            request.extensions_mut().insert(authorized);
            next.run(request).await
        }
        Err(denial) => {
            match &denial {
                Denial::StorageFailure { .. } => error!("permission denied: {denial}"),
                _ => warn!("permission denied: {denial}"),
            }
            ApiError::permission_denied().into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{AuthorizationGate, Denial};
    use crate::{
        accounts::model::{Account, NewAccount},
        auth::token::{
            SigningSecret, TokenIssuer, TokenRejection, TokenVerifier, tests::forge, unix_now,
        },
        storage::{Storage, StorageError},
    };

    const NOW: i64 = 1_700_000_000;
    const SECRET: &str = "gate-secret";

    /// 固定数据的假存储；`broken` 时所有读取都失败。
    struct FixedStore {
        accounts: HashMap<i64, Account>,
        broken: bool,
    }

    #[async_trait]
    impl Storage for FixedStore {
        async fn get_account_by_id(&self, id: i64) -> Result<Account, StorageError> {
            if self.broken {
                return Err(StorageError::Persist("disk on fire".to_string()));
            }
            self.accounts.get(&id).cloned().ok_or(StorageError::NotFound)
        }

        async fn get_account_by_number(&self, number: i64) -> Result<Account, StorageError> {
            self.accounts
                .values()
                .find(|a| a.number == number)
                .cloned()
                .ok_or(StorageError::NotFound)
        }

        async fn create_account(&self, _account: NewAccount) -> Result<Account, StorageError> {
            Err(StorageError::Persist("read only".to_string()))
        }

        async fn delete_account(&self, _id: i64) -> Result<(), StorageError> {
            Err(StorageError::Persist("read only".to_string()))
        }

        async fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
            Ok(self.accounts.values().cloned().collect())
        }
    }

    fn account(id: i64, number: i64) -> Account {
        Account {
            id,
            number,
            first_name: "Jaay".to_string(),
            last_name: "lastname".to_string(),
            encrypted_password: String::new(),
            balance: 0,
            created_at: Utc::now(),
        }
    }

    fn gate(broken: bool) -> AuthorizationGate {
        let accounts = HashMap::from([(7, account(7, 12345678)), (8, account(8, 999))]);
        let secret = SigningSecret::new(SECRET).unwrap();
        AuthorizationGate::new(
            TokenVerifier::new(secret),
            Arc::new(FixedStore { accounts, broken }),
        )
    }

    fn token_for(number: i64, issued_at: i64) -> String {
        let secret = SigningSecret::new(SECRET).unwrap();
        TokenIssuer::new(secret, Duration::from_secs(60))
            .issue_at(number, issued_at)
            .unwrap()
    }

    #[tokio::test]
    async fn owner_with_valid_token_is_authorized() {
        let token = token_for(12345678, NOW);
        let authorized = gate(false)
            .authorize_at(Some(&token), "7", NOW)
            .await
            .unwrap();
        assert_eq!(authorized.account.id, 7);
        assert_eq!(authorized.claims.account_number, 12345678);
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_denied() {
        let gate = gate(false);
        for header in [None, Some(""), Some("   ")] {
            let denial = gate.authorize_at(header, "7", NOW).await.unwrap_err();
            assert!(matches!(denial, Denial::MissingToken));
        }
    }

    #[tokio::test]
    async fn token_for_other_number_is_denied() {
        let token = token_for(999, NOW);
        let denial = gate(false)
            .authorize_at(Some(&token), "7", NOW)
            .await
            .unwrap_err();
        assert!(matches!(
            denial,
            Denial::OwnerMismatch {
                claimed: 999,
                id: 7
            }
        ));
    }

    #[tokio::test]
    async fn token_expired_one_second_ago_is_denied() {
        let token = token_for(12345678, NOW - 61);
        let denial = gate(false)
            .authorize_at(Some(&token), "7", NOW)
            .await
            .unwrap_err();
        assert!(matches!(
            denial,
            Denial::InvalidToken(TokenRejection::Expired(exp)) if exp == NOW - 1
        ));
    }

    #[tokio::test]
    async fn foreign_secret_and_algorithm_are_denied() {
        let gate = gate(false);
        let claims = format!(r#"{{"accountNumber":12345678,"expiresAt":{}}}"#, NOW + 60);

        let other_secret = forge("not-the-secret", r#"{"alg":"HS256"}"#, &claims);
        let denial = gate
            .authorize_at(Some(&other_secret), "7", NOW)
            .await
            .unwrap_err();
        assert!(matches!(
            denial,
            Denial::InvalidToken(TokenRejection::BadSignature)
        ));

        let other_alg = forge(SECRET, r#"{"alg":"HS384"}"#, &claims);
        let denial = gate
            .authorize_at(Some(&other_alg), "7", NOW)
            .await
            .unwrap_err();
        assert!(matches!(
            denial,
            Denial::InvalidToken(TokenRejection::UnsupportedAlgorithm(_))
        ));
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_denied() {
        let gate = gate(false);
        let token = token_for(12345678, NOW);

        for raw in ["abc", "7.0", "", "99999999999999999999"] {
            let denial = gate.authorize_at(Some(&token), raw, NOW).await.unwrap_err();
            assert!(matches!(denial, Denial::MalformedId(_)), "{raw}");
        }

        let denial = gate
            .authorize_at(Some(&token), "42", NOW)
            .await
            .unwrap_err();
        assert!(matches!(denial, Denial::AccountUnresolved(42)));
    }

    #[tokio::test]
    async fn storage_failure_is_denied() {
        let token = token_for(12345678, NOW);
        let denial = gate(true)
            .authorize_at(Some(&token), "7", NOW)
            .await
            .unwrap_err();
        assert!(matches!(denial, Denial::StorageFailure { id: 7, .. }));
    }

    #[tokio::test]
    async fn token_is_checked_before_path_id() {
        let denial = gate(false)
            .authorize_at(Some("garbage"), "abc", NOW)
            .await
            .unwrap_err();
        assert!(matches!(
            denial,
            Denial::InvalidToken(TokenRejection::Malformed)
        ));
    }

    #[tokio::test]
    async fn authorize_reads_the_clock() {
        let gate = gate(false);
        let fresh = token_for(12345678, unix_now());
        let authorized = gate.authorize(Some(&fresh), "7").await.unwrap();
        assert_eq!(authorized.account.id, 7);

        let stale = token_for(12345678, unix_now() - 61);
        let denial = gate.authorize(Some(&stale), "7").await.unwrap_err();
        assert!(matches!(
            denial,
            Denial::InvalidToken(TokenRejection::Expired(_))
        ));
    }
}
