//! HTTP 边界：统一错误与 JSON 提取。

pub(crate) mod error;
pub(crate) mod json;
