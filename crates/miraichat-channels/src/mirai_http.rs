//! mirai-api-http 传输实现

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use miraichat_core::{GatewayConfig, MessageChain, MiraiChatError, PokeKind, Result, Segment};

use crate::base::MessageTransport;
use crate::types::{ReplyTarget, SendReceipt};

/// 通过 mirai-api-http 的 HTTP 接口发送消息
pub struct MiraiHttpTransport {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl MiraiHttpTransport {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MiraiChatError::Http(format!("创建 HTTP 客户端失败: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn session_key(&self) -> Result<&str> {
        self.config
            .session_key
            .as_deref()
            .ok_or_else(|| MiraiChatError::Config("未配置 session_key".into()))
    }

    async fn post(&self, command: &str, body: Value) -> Result<SendReceipt> {
        let response = self
            .client
            .post(self.config.endpoint(command))
            .json(&body)
            .send()
            .await
            .map_err(|e| MiraiChatError::Http(format!("mirai-api-http 错误: {}", e)))?;

        check_status(response.status())?;

        let result: SendResponse = response
            .json()
            .await
            .map_err(|e| MiraiChatError::Http(format!("解析响应失败: {}", e)))?;

        result.into_receipt()
    }
}

#[async_trait]
impl MessageTransport for MiraiHttpTransport {
    fn name(&self) -> &str {
        "mirai-api-http"
    }

    async fn send_message(&self, target: &ReplyTarget, chain: MessageChain) -> Result<SendReceipt> {
        let (command, body) = send_request(self.session_key()?, target, chain)?;
        tracing::debug!(command, ?target, "发送消息");
        self.post(command, body).await
    }

    async fn send_poke(&self, target: &ReplyTarget, kind: PokeKind) -> Result<SendReceipt> {
        let (command, body) = poke_request(self.session_key()?, target, kind)?;
        tracing::debug!(command, ?target, %kind, "发送戳一戳");
        self.post(command, body).await
    }
}

/// 构造发送请求，返回 `(接口名, 请求体)`
///
/// 开头的 Quote 消息段会被提取为 `quote` 参数，网关按消息 id 引用。
pub fn send_request(
    session_key: &str,
    target: &ReplyTarget,
    chain: MessageChain,
) -> Result<(&'static str, Value)> {
    let (quote, chain) = split_quote(chain);
    let message_chain = serde_json::to_value(&chain)?;
    let (command, mut body) = request_body(session_key, target, message_chain);

    if let Some(id) = quote {
        body["quote"] = json!(id);
    }

    Ok((command, body))
}

/// 戳一戳以单元素消息链发送，临时会话不支持
pub fn poke_request(
    session_key: &str,
    target: &ReplyTarget,
    kind: PokeKind,
) -> Result<(&'static str, Value)> {
    if let ReplyTarget::Temp { .. } = target {
        return Err(MiraiChatError::Channel("临时会话不支持戳一戳".into()));
    }
    Ok(request_body(
        session_key,
        target,
        Value::Array(vec![kind.to_value()]),
    ))
}

fn request_body(session_key: &str, target: &ReplyTarget, message_chain: Value) -> (&'static str, Value) {
    match target {
        ReplyTarget::Friend { qq } => (
            "sendFriendMessage",
            json!({
                "sessionKey": session_key,
                "target": qq,
                "messageChain": message_chain,
            }),
        ),
        ReplyTarget::Group { group } => (
            "sendGroupMessage",
            json!({
                "sessionKey": session_key,
                "target": group,
                "messageChain": message_chain,
            }),
        ),
        ReplyTarget::Temp { qq, group } => (
            "sendTempMessage",
            json!({
                "sessionKey": session_key,
                "qq": qq,
                "group": group,
                "messageChain": message_chain,
            }),
        ),
    }
}

fn split_quote(chain: MessageChain) -> (Option<i64>, MessageChain) {
    let quote_id = match chain.first() {
        Some(Segment::Quote(quote)) => Some(quote.id),
        _ => None,
    };
    match quote_id {
        Some(id) => (Some(id), chain.into_iter().skip(1).collect()),
        None => (None, chain),
    }
}

// ============== mirai-api-http 响应 ==============

fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(MiraiChatError::Http(format!("mirai-api-http 返回 HTTP {}", status)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    message_id: Option<i64>,
}

impl SendResponse {
    fn into_receipt(self) -> Result<SendReceipt> {
        if self.code != 0 {
            return Err(MiraiChatError::Gateway {
                code: self.code,
                msg: self.msg,
            });
        }
        Ok(SendReceipt {
            message_id: self.message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miraichat_core::{QuoteContext, Source, quote_reply};

    #[test]
    fn test_group_request_lifts_quote() {
        let origin = MessageChain::new(vec![Segment::Source(Source::new(42, 1)), Segment::plain("ping")]);
        let context = QuoteContext {
            group_id: Some(100),
            sender_id: Some(7),
            target_id: Some(100),
        };
        let chain = quote_reply(&origin, context, "ok").unwrap();

        let (command, body) = send_request("KEY", &ReplyTarget::Group { group: 100 }, chain).unwrap();

        assert_eq!(command, "sendGroupMessage");
        assert_eq!(
            body,
            json!({
                "sessionKey": "KEY",
                "target": 100,
                "messageChain": [{"type": "Plain", "text": "ok"}],
                "quote": 42
            })
        );
    }

    #[test]
    fn test_friend_request_without_quote() {
        let chain = MessageChain::new(vec![Segment::plain("hi "), Segment::face_id(14)]);
        let (command, body) = send_request("KEY", &ReplyTarget::Friend { qq: 8 }, chain).unwrap();

        assert_eq!(command, "sendFriendMessage");
        assert_eq!(body["target"], 8);
        assert!(body.get("quote").is_none());
        assert_eq!(body["messageChain"][1], json!({"type": "Face", "faceId": 14}));
    }

    #[test]
    fn test_temp_request() {
        let (command, body) =
            send_request("KEY", &ReplyTarget::Temp { qq: 7, group: 100 }, MessageChain::from("psst")).unwrap();

        assert_eq!(command, "sendTempMessage");
        assert_eq!(body["qq"], 7);
        assert_eq!(body["group"], 100);
        assert!(body.get("target").is_none());
    }

    #[test]
    fn test_quote_later_in_chain_is_left_alone() {
        let chain = MessageChain::new(vec![
            Segment::plain("see "),
            Segment::Quote(miraichat_core::Quote {
                id: 3,
                group_id: None,
                sender_id: None,
                target_id: None,
                origin: None,
            }),
        ]);
        let (quote, rest) = split_quote(chain.clone());
        assert_eq!(quote, None);
        assert_eq!(rest, chain);
    }

    #[test]
    fn test_poke_request() {
        let (command, body) = poke_request("KEY", &ReplyTarget::Group { group: 100 }, PokeKind::Like).unwrap();
        assert_eq!(command, "sendGroupMessage");
        assert_eq!(body["messageChain"], json!([{"type": "Poke", "name": "Like"}]));

        let err = poke_request("KEY", &ReplyTarget::Temp { qq: 1, group: 2 }, PokeKind::Poke).unwrap_err();
        assert!(matches!(err, MiraiChatError::Channel(_)));
    }

    #[test]
    fn test_response_mapping() {
        let ok: SendResponse = serde_json::from_value(json!({"code": 0, "msg": "success", "messageId": 1234})).unwrap();
        assert_eq!(ok.into_receipt().unwrap().message_id, Some(1234));

        let failed: SendResponse = serde_json::from_value(json!({"code": 3, "msg": "Session失效或不存在"})).unwrap();
        let err = failed.into_receipt().unwrap_err();
        assert!(matches!(err, MiraiChatError::Gateway { code: 3, .. }));
    }

    #[test]
    fn test_http_status_is_reported() {
        assert!(check_status(reqwest::StatusCode::OK).is_ok());

        let err = check_status(reqwest::StatusCode::NOT_FOUND).unwrap_err();
        match err {
            MiraiChatError::Http(msg) => assert!(msg.contains("404")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_session_key_is_config_error() {
        let transport = MiraiHttpTransport::new(GatewayConfig::default()).unwrap();
        let err = transport
            .send_message(&ReplyTarget::Friend { qq: 1 }, MessageChain::from("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, MiraiChatError::Config(_)));
    }
}
