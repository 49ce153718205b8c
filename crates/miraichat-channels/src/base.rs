//! 消息传输 Trait

use async_trait::async_trait;
use miraichat_core::{MessageChain, PokeKind, Result};

use crate::types::{ReplyTarget, SendReceipt};

/// 与网关之间的出站传输
///
/// 实现方负责网络往返；错误原样返回给调用方。
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// 传输名称
    fn name(&self) -> &str;

    /// 发送消息链
    async fn send_message(&self, target: &ReplyTarget, chain: MessageChain) -> Result<SendReceipt>;

    /// 发送戳一戳
    async fn send_poke(&self, target: &ReplyTarget, kind: PokeKind) -> Result<SendReceipt>;
}
