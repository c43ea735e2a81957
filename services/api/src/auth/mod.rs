//! 鉴权模块：密码派生、令牌签发/校验与按账户授权网关。

pub(crate) mod gate;
pub(crate) mod password;
pub(crate) mod token;
