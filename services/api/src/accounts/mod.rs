//! 账户模块：身份模型与账户接口处理。

pub(crate) mod handlers;
pub(crate) mod model;
