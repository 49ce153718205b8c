//! 统一错误处理

use thiserror::Error;

/// 消息链 / 消息信封层面的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// 已识别的消息类型缺少必需字段（或字段类型不符）
    #[error("消息段格式错误: {kind} 缺少字段 `{field}`")]
    MalformedSegment { kind: String, field: String },

    /// 来自网关的消息链首元素不是 Source
    #[error("消息链缺少 Source 标记")]
    MissingSourceMarker,

    /// 发送者形态与消息上下文不一致
    #[error("发送者与消息上下文不匹配: {context} 消息不能携带 {sender} 发送者")]
    SenderContextMismatch { context: String, sender: String },

    /// 没有 Source 的消息链无法被引用
    #[error("消息链没有可引用的消息 ID")]
    NotQuotable,

    /// 数组元素不是带 `type` 字符串的对象
    #[error("第 {index} 个元素不是消息段")]
    NotASegment { index: usize },
}

#[derive(Error, Debug)]
pub enum MiraiChatError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP 请求错误: {0}")]
    Http(String),

    #[error("网关返回错误 (code {code}): {msg}")]
    Gateway { code: i64, msg: String },

    #[error("消息通道错误: {0}")]
    Channel(String),

    #[error("解析错误: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, MiraiChatError>;
