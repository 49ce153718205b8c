//! 聊天消息（好友消息 / 群消息 / 临时消息）

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::MessageChain;
use crate::contact::Sender;
use crate::error::{ChainError, MiraiChatError, Result};
use crate::quote::{QuoteContext, quote_reply};
use crate::segment::Source;

/// 消息来源上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatContext {
    /// 好友私聊
    #[serde(rename = "FriendMessage")]
    Direct,
    /// 群聊
    #[serde(rename = "GroupMessage")]
    Group,
    /// 通过群发起的临时会话
    #[serde(rename = "TempMessage")]
    Transient,
}

impl ChatContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatContext::Direct => "FriendMessage",
            ChatContext::Group => "GroupMessage",
            ChatContext::Transient => "TempMessage",
        }
    }

    /// 好友消息只接受好友形态，其余只接受群成员形态
    pub fn accepts(&self, sender: &Sender) -> bool {
        matches!(
            (self, sender),
            (ChatContext::Direct, Sender::Friend(_))
                | (ChatContext::Group | ChatContext::Transient, Sender::Member(_))
        )
    }
}

impl fmt::Display for ChatContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 聊天消息
///
/// 构造后不可变；回复会产生新的消息链，而不是修改本消息。
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    context: ChatContext,
    chain: MessageChain,
    sender: Sender,
    source: Source,
    plain: String,
}

impl ChatMessage {
    pub fn wrap(
        chain: MessageChain,
        sender: Sender,
        context: ChatContext,
    ) -> std::result::Result<Self, ChainError> {
        let chain = chain.validate_received()?;
        let source = chain
            .find_source()
            .cloned()
            .ok_or(ChainError::MissingSourceMarker)?;

        if !context.accepts(&sender) {
            return Err(ChainError::SenderContextMismatch {
                context: context.to_string(),
                sender: sender.shape().to_string(),
            });
        }

        let plain = chain.plain_text();
        Ok(Self {
            context,
            chain,
            sender,
            source,
            plain,
        })
    }

    /// 解码网关推送的 `{type, messageChain, sender}`，同时返回被降级的消息段
    pub fn decode(value: Value) -> Result<(Self, Vec<ChainError>)> {
        let Value::Object(mut object) = value else {
            return Err(MiraiChatError::Serialization(de::Error::custom(
                "聊天消息必须是 JSON 对象",
            )));
        };

        let context: ChatContext =
            serde_json::from_value(object.remove("type").unwrap_or(Value::Null))?;
        let (chain, issues) =
            MessageChain::decode(object.remove("messageChain").unwrap_or(Value::Null))?;
        let sender = Sender::from_value(object.remove("sender").unwrap_or(Value::Null))?;

        let message = Self::wrap(chain, sender, context)?;
        Ok((message, issues))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Self::decode(value).map(|(message, _)| message)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn context(&self) -> ChatContext {
        self.context
    }

    pub fn chain(&self) -> &MessageChain {
        &self.chain
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn message_id(&self) -> i64 {
        self.source.id
    }

    /// 所有 Plain 文本按顺序拼接
    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// 群号：群消息和临时消息来自发送者所在的群
    pub fn group_id(&self) -> Option<i64> {
        self.sender.as_member().map(|member| member.group.id)
    }

    pub fn quote_context(&self) -> QuoteContext {
        match (&self.context, &self.sender) {
            (ChatContext::Group, Sender::Member(member)) => QuoteContext {
                group_id: Some(member.group.id),
                sender_id: Some(member.id),
                target_id: Some(member.group.id),
            },
            (ChatContext::Transient, Sender::Member(member)) => QuoteContext {
                group_id: Some(member.group.id),
                sender_id: Some(member.id),
                target_id: None,
            },
            (_, sender) => QuoteContext {
                group_id: Some(0),
                sender_id: Some(sender.id()),
                target_id: None,
            },
        }
    }

    /// 构造引用本消息的新消息链
    pub fn quote(
        &self,
        payload: impl Into<MessageChain>,
    ) -> std::result::Result<MessageChain, ChainError> {
        quote_reply(&self.chain, self.quote_context(), payload)
    }

    pub fn into_parts(self) -> (ChatContext, MessageChain, Sender) {
        (self.context, self.chain, self.sender)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage<'a> {
    #[serde(rename = "type")]
    context: ChatContext,
    message_chain: &'a MessageChain,
    sender: &'a Sender,
}

impl Serialize for ChatMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireMessage {
            context: self.context,
            message_chain: &self.chain,
            sender: &self.sender,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChatMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ChatMessage::from_value(value).map_err(de::Error::custom)
    }
}
