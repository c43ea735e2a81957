//! 账户身份模型。

use ag_shared_protocol::AccountView;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{api::error::ApiError, auth::password};

/// 账户编号取值范围（8 位）。
const NUMBER_RANGE: std::ops::RangeInclusive<i64> = 10_000_000..=99_999_999;

/// 已落库账户。`number` 创建后不可变，是令牌唯一授权锚点。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Account {
    pub(crate) id: i64,
    pub(crate) number: i64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    /// argon2 PHC 串，只用于持久化，绝不进入响应。
    pub(crate) encrypted_password: String,
    pub(crate) balance: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl Account {
    /// 对外视图（去掉密码派生值）。
    pub(crate) fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            number: self.number,
            balance: self.balance,
            created_at: self.created_at,
        }
    }

    /// 校验明文密码。
    pub(crate) fn validate_password(&self, plaintext: &str) -> bool {
        password::verify(&self.encrypted_password, plaintext)
    }
}

/// 待创建账户：ID 由存储分配。
#[derive(Debug, Clone)]
pub(crate) struct NewAccount {
    pub(crate) number: i64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) encrypted_password: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl NewAccount {
    /// 校验输入、派生密码并抽取随机编号。
    pub(crate) fn new(first_name: &str, last_name: &str, plaintext: &str) -> Result<Self, ApiError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(ApiError::bad_request("firstName and lastName are required"));
        }
        if plaintext.is_empty() {
            return Err(ApiError::bad_request("password is required"));
        }
        let encrypted_password = password::derive(plaintext).map_err(|err| {
            tracing::error!("derive password failed: {err}");
            ApiError::internal()
        })?;

        Ok(Self {
            number: random_number(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            encrypted_password,
            created_at: Utc::now(),
        })
    }

    /// 编号冲突时换一个新编号重试。
    pub(crate) fn reroll_number(&mut self) {
        self.number = random_number();
    }

    /// 绑定存储分配的 ID。
    pub(crate) fn into_account(self, id: i64) -> Account {
        Account {
            id,
            number: self.number,
            first_name: self.first_name,
            last_name: self.last_name,
            encrypted_password: self.encrypted_password,
            balance: 0,
            created_at: self.created_at,
        }
    }
}

fn random_number() -> i64 {
    rand::thread_rng().gen_range(NUMBER_RANGE)
}
