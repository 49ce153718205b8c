//! 引用回复

use crate::chain::MessageChain;
use crate::error::ChainError;
use crate::segment::{Quote, Segment};

/// 引用时可附带的来源信息，由原消息的上下文决定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteContext {
    pub group_id: Option<i64>,
    pub sender_id: Option<i64>,
    pub target_id: Option<i64>,
}

/// 构造一条引用 `origin` 的新消息链：`[Quote, payload...]`
///
/// `origin` 必须带有 Source，否则返回 [`ChainError::NotQuotable`]。
/// 嵌入的原消息链去掉了 Source，与网关下发的 Quote 一致。
pub fn quote_reply(
    origin: &MessageChain,
    context: QuoteContext,
    payload: impl Into<MessageChain>,
) -> Result<MessageChain, ChainError> {
    let source = origin.find_source().ok_or(ChainError::NotQuotable)?;

    let quote = Segment::Quote(Quote {
        id: source.id,
        group_id: context.group_id,
        sender_id: context.sender_id,
        target_id: context.target_id,
        origin: Some(origin.without_source()),
    });

    Ok(MessageChain::from(quote).concat(payload.into()))
}
