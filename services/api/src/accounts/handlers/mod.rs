//! 账户 HTTP 接口处理模块。

mod http;
mod login;
mod manage;

pub(crate) use http::{
    create_account_handler, delete_account_handler, get_account_handler, list_accounts_handler,
    login_handler, transfer_handler,
};
