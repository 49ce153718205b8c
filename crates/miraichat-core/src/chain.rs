//! 消息链

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChainError, MiraiChatError, Result};
use crate::segment::{Segment, Source};

/// 有序的消息段序列，构成一条完整消息
///
/// 来自网关的消息链以 [`Source`] 开头；本地新组装、尚未发送的消息链不需要。
/// 构造后不可变，所有变换都返回新的消息链。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MessageChain(Vec<Segment>);

impl MessageChain {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// 宽松解码：缺字段的已知消息段、不带 `type` 的元素均按未知类型原样保留，
    /// 并在第二个返回值中报告
    pub fn decode(value: Value) -> Result<(Self, Vec<ChainError>)> {
        let Value::Array(items) = value else {
            return Err(MiraiChatError::Serialization(de::Error::custom(
                "消息链必须是 JSON 数组",
            )));
        };
        let (segments, issues) = decode_items(items);
        Ok((Self(segments), issues))
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// 校验网关消息链：首元素必须是 Source
    pub fn validate_received(self) -> std::result::Result<Self, ChainError> {
        if self.find_source().is_some() {
            Ok(self)
        } else {
            Err(ChainError::MissingSourceMarker)
        }
    }

    /// 仅当首元素是 Source 时返回它
    pub fn find_source(&self) -> Option<&Source> {
        match self.0.first() {
            Some(Segment::Source(source)) => Some(source),
            _ => None,
        }
    }

    pub fn message_id(&self) -> Option<i64> {
        self.find_source().map(|source| source.id)
    }

    /// 按顺序拼接所有 Plain 文本
    pub fn plain_text(&self) -> String {
        self.0.iter().filter_map(Segment::as_plain).collect()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 去掉开头的 Source 后的新消息链
    pub fn without_source(&self) -> Self {
        let skip = usize::from(self.find_source().is_some());
        Self(self.0[skip..].to_vec())
    }

    pub fn concat(self, other: MessageChain) -> Self {
        let mut segments = self.0;
        segments.extend(other.0);
        Self(segments)
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.0
    }
}

fn decode_items(items: Vec<Value>) -> (Vec<Segment>, Vec<ChainError>) {
    let mut segments = Vec::with_capacity(items.len());
    let mut issues = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match Segment::decode(item) {
            Ok(segment) => segments.push(segment),
            Err(failure) => {
                let error = match failure.error {
                    ChainError::NotASegment { .. } => ChainError::NotASegment { index },
                    other => other,
                };
                tracing::warn!(index, error = %error, "消息段解析失败，按未知类型保留");
                segments.push(Segment::Unknown(failure.fallback));
                issues.push(error);
            }
        }
    }

    (segments, issues)
}

impl<'de> Deserialize<'de> for MessageChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<Value>::deserialize(deserializer)?;
        let (segments, _) = decode_items(items);
        Ok(Self(segments))
    }
}

impl From<Vec<Segment>> for MessageChain {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl From<Segment> for MessageChain {
    fn from(segment: Segment) -> Self {
        Self(vec![segment])
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self(vec![Segment::plain(text)])
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self(vec![Segment::plain(text)])
    }
}

impl FromIterator<Segment> for MessageChain {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MessageChain {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageChain {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{At, Quote};
    use serde_json::json;

    fn received() -> MessageChain {
        MessageChain::new(vec![
            Segment::Source(Source::new(42, 1_600_000_000)),
            Segment::plain("hello "),
            Segment::At(At {
                target: 123,
                display: Some("x".to_string()),
            }),
            Segment::plain("world"),
        ])
    }

    #[test]
    fn test_plain_text_projection() {
        assert_eq!(received().plain_text(), "hello world");
        assert_eq!(MessageChain::default().plain_text(), "");
        assert_eq!(MessageChain::from(Segment::AtAll).plain_text(), "");
    }

    #[test]
    fn test_validate_received() {
        let chain = received();
        let validated = chain.clone().validate_received().unwrap();
        assert_eq!(validated, chain);
        // 可重复校验
        assert!(validated.validate_received().is_ok());

        let composed = MessageChain::from("hi");
        assert_eq!(composed.validate_received(), Err(ChainError::MissingSourceMarker));
        assert_eq!(MessageChain::default().validate_received(), Err(ChainError::MissingSourceMarker));
    }

    #[test]
    fn test_source_not_first_is_not_found() {
        let chain = MessageChain::new(vec![Segment::plain("hi"), Segment::Source(Source::new(1, 2))]);
        assert!(chain.find_source().is_none());
        assert_eq!(chain.validate_received(), Err(ChainError::MissingSourceMarker));
    }

    #[test]
    fn test_decoded_chain_finds_leading_source() {
        let (chain, issues) = MessageChain::decode(json!([
            {"type": "Source", "id": 42, "time": 1600000000},
            {"type": "Plain", "text": "hi"}
        ]))
        .unwrap();
        assert!(issues.is_empty());
        assert_eq!(chain.find_source(), Some(&Source::new(42, 1600000000)));
        assert_eq!(chain.message_id(), Some(42));
        assert!(chain.validate_received().is_ok());
    }

    #[test]
    fn test_round_trip_known_segments() {
        let chain = MessageChain::new(vec![
            Segment::Source(Source::new(42, 1_600_000_000)),
            Segment::Quote(Quote {
                id: 41,
                group_id: Some(100),
                sender_id: Some(200),
                target_id: Some(100),
                origin: Some(MessageChain::from("earlier")),
            }),
            Segment::at(200),
            Segment::AtAll,
            Segment::face_id(14),
            Segment::plain("look"),
            Segment::image_url("https://example.com/a.png"),
            Segment::flash_image_id("{ABC}.png"),
            Segment::xml("<msg/>"),
            Segment::json("{\"a\":1}"),
            Segment::app("{}"),
        ]);
        let value = chain.to_value().unwrap();
        let (decoded, issues) = MessageChain::decode(value).unwrap();
        assert!(issues.is_empty());
        assert_eq!(decoded, chain);
    }

    #[test]
    fn test_unknown_segment_round_trips_among_siblings() {
        let raw = r#"[{"type":"Source","id":1,"time":2},{"type":"Plain","text":"a"},{"type":"Dice","value":6,"meta":{"z":1,"a":2}},{"type":"Plain","text":"b"}]"#;
        let chain: MessageChain = serde_json::from_str(raw).unwrap();
        assert_eq!(chain.len(), 4);
        assert!(chain.segments()[2].is_unknown());
        assert_eq!(chain.plain_text(), "ab");
        assert_eq!(serde_json::to_string(&chain).unwrap(), raw);
    }

    #[test]
    fn test_malformed_segment_falls_back_and_continues() {
        let (chain, issues) = MessageChain::decode(json!([
            {"type": "Source", "id": 1, "time": 2},
            {"type": "At", "display": "@nobody"},
            {"type": "Plain", "text": "still here"}
        ]))
        .unwrap();

        assert_eq!(
            issues,
            vec![ChainError::MalformedSegment {
                kind: "At".to_string(),
                field: "target".to_string()
            }]
        );
        assert_eq!(chain.len(), 3);
        assert!(chain.segments()[1].is_unknown());
        assert_eq!(chain.segments()[1].kind(), "At");
        assert_eq!(chain.plain_text(), "still here");
        assert_eq!(
            chain.to_value().unwrap()[1],
            json!({"type": "At", "display": "@nobody"})
        );
    }

    #[test]
    fn test_non_segment_elements_are_kept_verbatim() {
        let (chain, issues) = MessageChain::decode(json!([
            {"type": "Plain", "text": "a"},
            5,
            {"text": "no discriminator"},
            {"type": "Plain", "text": "b"}
        ]))
        .unwrap();

        assert_eq!(
            issues,
            vec![
                ChainError::NotASegment { index: 1 },
                ChainError::NotASegment { index: 2 }
            ]
        );
        assert_eq!(chain.len(), 4);
        assert!(chain.segments()[1].is_unknown());
        assert_eq!(chain.segments()[2].kind(), "");
        assert_eq!(chain.plain_text(), "ab");
        assert_eq!(
            chain.to_value().unwrap(),
            json!([
                {"type": "Plain", "text": "a"},
                5,
                {"text": "no discriminator"},
                {"type": "Plain", "text": "b"}
            ])
        );
    }

    #[test]
    fn test_non_array_payload_fails() {
        let err = MessageChain::decode(json!({"type": "Plain"})).unwrap_err();
        assert!(matches!(err, MiraiChatError::Serialization(_)));
    }

    #[test]
    fn test_without_source_and_concat() {
        let chain = received();
        let rest = chain.without_source();
        assert_eq!(rest.len(), 3);
        assert!(rest.find_source().is_none());

        let joined = MessageChain::from("a").concat(MessageChain::from("b"));
        assert_eq!(joined.plain_text(), "ab");
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(received(), received());
        let reordered = MessageChain::new(received().into_segments().into_iter().rev().collect());
        assert_ne!(reordered, received());
    }
}
