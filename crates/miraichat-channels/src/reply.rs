//! 回复消息

use miraichat_core::{ChatMessage, MessageChain, Result};

use crate::base::MessageTransport;
use crate::types::{ReplyTarget, SendReceipt};

/// 回复一条聊天消息
///
/// `quote` 为 true 时先构造引用本消息的消息链，否则原样发送 `payload`。
/// 发往与原消息相同的会话；传输层的错误不做任何转换。
pub async fn reply(
    transport: &dyn MessageTransport,
    message: &ChatMessage,
    payload: impl Into<MessageChain>,
    quote: bool,
) -> Result<SendReceipt> {
    let payload = payload.into();
    let chain = if quote {
        message.quote(payload)?
    } else {
        payload
    };
    let target = ReplyTarget::for_message(message);

    tracing::debug!(
        transport = transport.name(),
        ?target,
        quote,
        in_reply_to = message.message_id(),
        "发送回复"
    );

    transport.send_message(&target, chain).await
}
