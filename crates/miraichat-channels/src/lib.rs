//! miraichat Channels - 出站传输
//!
//! - `MessageTransport`：与网关之间的传输抽象
//! - `reply`：回复聊天消息（可选引用原消息）
//! - `MiraiHttpTransport`：mirai-api-http HTTP 接口实现

pub mod base;
pub mod mirai_http;
pub mod reply;
pub mod types;

pub use base::*;
pub use mirai_http::*;
pub use reply::*;
pub use types::*;
