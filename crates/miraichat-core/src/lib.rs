//! miraichat Core - 消息模型
//!
//! 与 mirai-api-http 线上格式一致的消息段、消息链、聊天消息，以及引用回复与错误处理。

pub mod chain;
pub mod config;
pub mod contact;
pub mod error;
pub mod event;
pub mod message;
pub mod poke;
pub mod quote;
pub mod segment;

pub use chain::*;
pub use config::*;
pub use contact::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use poke::*;
pub use quote::*;
pub use segment::*;
