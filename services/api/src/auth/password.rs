//! 密码派生与校验（argon2id，PHC 串存储）。
//!
//! 校验失败不是错误：调用方拿到 `false` 后统一转换为 "not authenticated"，
//! 不区分账号不存在与密码错误。

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// 未知账号登录时用于消耗同等哈希开销的占位值。
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| derive("ag-dummy-credential").ok());

/// 密码派生失败。
#[derive(Debug, Error)]
#[error("derive password failed: {0}")]
pub(crate) struct PasswordError(String);

/// 单向派生：每次生成新随机盐，输出 PHC 串。
pub(crate) fn derive(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError(err.to_string()))
}

/// 校验明文是否与存储值匹配。
///
/// 摘要比较为常量时间（`password-hash` 的输出比较契约），耗时不随
/// 匹配前缀长度变化。存储值无法解析时返回 `false`。
pub(crate) fn verify(encrypted: &str, plaintext: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(encrypted) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// 启动时预先派生占位哈希，避免首个未知账号登录多付一次派生开销。
pub(crate) fn warm_up() {
    LazyLock::force(&DUMMY_HASH);
}

/// 对占位哈希做一次校验，结果丢弃。
pub(crate) fn burn_verification(plaintext: &str) {
    if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = verify(dummy, plaintext);
    }
}

#[cfg(test)]
mod tests {
    use super::{DUMMY_HASH, derive, verify, warm_up};

    #[test]
    fn derived_hash_verifies_only_the_same_password() {
        let hash = derive("password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify(&hash, "password"));
        assert!(!verify(&hash, "passwore"));
        assert!(!verify(&hash, ""));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = derive("hunter2").unwrap();
        let b = derive("hunter2").unwrap();
        assert_ne!(a, b);
        assert!(verify(&a, "hunter2"));
        assert!(verify(&b, "hunter2"));
    }

    #[test]
    fn unparsable_stored_value_never_verifies() {
        assert!(!verify("", "password"));
        assert!(!verify("password", "password"));
        assert!(!verify("$argon2id$v=19$garbage", "password"));
    }

    #[test]
    fn warm_up_prepares_dummy_hash() {
        warm_up();
        let dummy = DUMMY_HASH.as_deref().unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        assert!(!verify(dummy, "password"));
    }
}
