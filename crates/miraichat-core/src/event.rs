//! 消息事件订阅键

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MiraiChatError;
use crate::message::{ChatContext, ChatMessage};

/// `message` 匹配所有聊天消息，其余只匹配对应类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageEvent {
    #[serde(rename = "message")]
    Message,
    FriendMessage,
    GroupMessage,
    TempMessage,
}

impl MessageEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageEvent::Message => "message",
            MessageEvent::FriendMessage => "FriendMessage",
            MessageEvent::GroupMessage => "GroupMessage",
            MessageEvent::TempMessage => "TempMessage",
        }
    }

    pub fn matches(&self, message: &ChatMessage) -> bool {
        match self {
            MessageEvent::Message => true,
            specific => *specific == MessageEvent::from(message.context()),
        }
    }
}

impl From<ChatContext> for MessageEvent {
    fn from(context: ChatContext) -> Self {
        match context {
            ChatContext::Direct => MessageEvent::FriendMessage,
            ChatContext::Group => MessageEvent::GroupMessage,
            ChatContext::Transient => MessageEvent::TempMessage,
        }
    }
}

impl fmt::Display for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageEvent {
    type Err = MiraiChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageEvent::Message),
            "FriendMessage" => Ok(MessageEvent::FriendMessage),
            "GroupMessage" => Ok(MessageEvent::GroupMessage),
            "TempMessage" => Ok(MessageEvent::TempMessage),
            _ => Err(MiraiChatError::Parse(format!("未知的消息事件: {}", s))),
        }
    }
}
