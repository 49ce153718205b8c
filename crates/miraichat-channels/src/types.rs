//! 发送目标与回执

use serde::{Deserialize, Serialize};

use miraichat_core::{ChatContext, ChatMessage, Sender};

/// 消息发送目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyTarget {
    /// 好友 QQ 号
    Friend { qq: i64 },
    /// 群号
    Group { group: i64 },
    /// 通过某个群发起的临时会话
    Temp { qq: i64, group: i64 },
}

impl ReplyTarget {
    /// 回复一条消息时应发往的目标
    pub fn for_message(message: &ChatMessage) -> Self {
        match (message.context(), message.sender()) {
            (ChatContext::Group, Sender::Member(member)) => ReplyTarget::Group {
                group: member.group.id,
            },
            (ChatContext::Transient, Sender::Member(member)) => ReplyTarget::Temp {
                qq: member.id,
                group: member.group.id,
            },
            (_, sender) => ReplyTarget::Friend { qq: sender.id() },
        }
    }
}

impl From<&ChatMessage> for ReplyTarget {
    fn from(message: &ChatMessage) -> Self {
        ReplyTarget::for_message(message)
    }
}

/// 网关确认提交后的回执
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// 网关为新消息分配的 Source id
    pub message_id: Option<i64>,
}
