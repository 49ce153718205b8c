//! 单条消息（消息段）
//!
//! 与 mirai-api-http 的消息类型一一对应，`type` 字段作为判别符。
//! 无法识别的类型以 [`UnknownSegment`] 原样保留，重新编码时不丢失任何字段。

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chain::MessageChain;
use crate::error::ChainError;

/// 消息的识别号，网关下发的消息链中永远是第一个元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    /// 秒级时间戳
    pub time: i64,
}

impl Source {
    pub fn new(id: i64, time: i64) -> Self {
        Self { id, time }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.time, 0).single()
    }
}

/// 引用回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// 被引用消息的 Source id
    pub id: i64,
    /// 被引用消息所在的群号，好友消息为 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,
    /// 被引用消息的接收者（QQ 号或群号）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<MessageChain>,
}

/// 艾特某人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct At {
    pub target: i64,
    /// 显示文字，发送时无效，网关自动使用群名片
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// 原生表情
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceRef<'a> {
    Id(i64),
    Name(&'a str),
}

impl Face {
    /// 编号优先于名称
    pub fn resolve(&self) -> Option<FaceRef<'_>> {
        match (&self.face_id, &self.name) {
            (Some(id), _) => Some(FaceRef::Id(*id)),
            (None, Some(name)) => Some(FaceRef::Name(name)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plain {
    pub text: String,
}

/// 图片与闪照共用的字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 本地路径，相对于网关插件的图片目录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Id(&'a str),
    Url(&'a str),
    Path(&'a str),
}

impl Image {
    pub fn from_id(image_id: impl Into<String>) -> Self {
        Self {
            image_id: Some(image_id.into()),
            ..Default::default()
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// 网关实际采用的来源：imageId 存在时忽略 url，url 存在时忽略 path
    pub fn source(&self) -> Option<ImageSource<'_>> {
        if let Some(id) = &self.image_id {
            Some(ImageSource::Id(id))
        } else if let Some(url) = &self.url {
            Some(ImageSource::Url(url))
        } else {
            self.path.as_deref().map(ImageSource::Path)
        }
    }
}

/// 富文本消息（譬如合并转发）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xml {
    pub xml: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Json {
    pub json: String,
}

/// 小程序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub content: String,
}

/// 未识别的消息段，`raw` 为包括 `type` 在内的完整原始值
///
/// 不带 `type` 字符串的元素同样原样保留，此时 `kind` 为空。
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownSegment {
    pub kind: String,
    pub raw: Value,
}

/// 单条消息
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Source(Source),
    Quote(Quote),
    At(At),
    AtAll,
    Face(Face),
    Plain(Plain),
    Image(Image),
    FlashImage(Image),
    Xml(Xml),
    Json(Json),
    App(App),
    Unknown(UnknownSegment),
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Segment::Plain(Plain { text: text.into() })
    }

    pub fn at(target: i64) -> Self {
        Segment::At(At {
            target,
            display: None,
        })
    }

    pub fn at_all() -> Self {
        Segment::AtAll
    }

    pub fn face_id(face_id: i64) -> Self {
        Segment::Face(Face {
            face_id: Some(face_id),
            name: None,
        })
    }

    pub fn face_name(name: impl Into<String>) -> Self {
        Segment::Face(Face {
            face_id: None,
            name: Some(name.into()),
        })
    }

    pub fn image_id(image_id: impl Into<String>) -> Self {
        Segment::Image(Image::from_id(image_id))
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Segment::Image(Image::from_url(url))
    }

    pub fn image_path(path: impl Into<String>) -> Self {
        Segment::Image(Image::from_path(path))
    }

    pub fn flash_image_id(image_id: impl Into<String>) -> Self {
        Segment::FlashImage(Image::from_id(image_id))
    }

    pub fn flash_image_url(url: impl Into<String>) -> Self {
        Segment::FlashImage(Image::from_url(url))
    }

    pub fn flash_image_path(path: impl Into<String>) -> Self {
        Segment::FlashImage(Image::from_path(path))
    }

    pub fn xml(xml: impl Into<String>) -> Self {
        Segment::Xml(Xml { xml: xml.into() })
    }

    pub fn json(json: impl Into<String>) -> Self {
        Segment::Json(Json { json: json.into() })
    }

    pub fn app(content: impl Into<String>) -> Self {
        Segment::App(App {
            content: content.into(),
        })
    }

    /// 判别符，即线上格式的 `type`
    pub fn kind(&self) -> &str {
        match self {
            Segment::Source(_) => "Source",
            Segment::Quote(_) => "Quote",
            Segment::At(_) => "At",
            Segment::AtAll => "AtAll",
            Segment::Face(_) => "Face",
            Segment::Plain(_) => "Plain",
            Segment::Image(_) => "Image",
            Segment::FlashImage(_) => "FlashImage",
            Segment::Xml(_) => "Xml",
            Segment::Json(_) => "Json",
            Segment::App(_) => "App",
            Segment::Unknown(unknown) => &unknown.kind,
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Segment::Plain(plain) => Some(&plain.text),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Segment::Unknown(_))
    }

    /// 严格解码单个消息段：未知类型依然成功，已知类型缺字段时报错
    pub fn from_value(value: Value) -> Result<Self, ChainError> {
        Self::decode(value).map_err(|failure| failure.error)
    }

    /// 解码失败时附带可原样保留的 [`UnknownSegment`]
    pub(crate) fn decode(value: Value) -> Result<Self, DecodeFailure> {
        let raw = match value {
            Value::Object(raw) if raw.get("type").is_some_and(Value::is_string) => raw,
            other => {
                return Err(DecodeFailure {
                    error: ChainError::NotASegment { index: 0 },
                    fallback: UnknownSegment {
                        kind: String::new(),
                        raw: other,
                    },
                });
            }
        };
        let kind = raw["type"].as_str().unwrap_or_default().to_owned();

        let Some(specs) = field_specs(&kind) else {
            return Ok(Segment::Unknown(UnknownSegment {
                kind,
                raw: Value::Object(raw),
            }));
        };

        if let Some(field) = first_invalid_field(&raw, specs) {
            return Err(DecodeFailure {
                error: ChainError::MalformedSegment {
                    kind: kind.clone(),
                    field: field.to_string(),
                },
                fallback: UnknownSegment {
                    kind,
                    raw: Value::Object(raw),
                },
            });
        }

        let mut fields = raw.clone();
        fields.retain(|_, field| !field.is_null());
        let value = Value::Object(fields);
        let decoded = match kind.as_str() {
            "Source" => Source::deserialize(&value).map(Segment::Source),
            "Quote" => Quote::deserialize(&value).map(Segment::Quote),
            "At" => At::deserialize(&value).map(Segment::At),
            "AtAll" => Ok(Segment::AtAll),
            "Face" => Face::deserialize(&value).map(Segment::Face),
            "Plain" => Plain::deserialize(&value).map(Segment::Plain),
            "Image" => Image::deserialize(&value).map(Segment::Image),
            "FlashImage" => Image::deserialize(&value).map(Segment::FlashImage),
            "Xml" => Xml::deserialize(&value).map(Segment::Xml),
            "Json" => Json::deserialize(&value).map(Segment::Json),
            "App" => App::deserialize(&value).map(Segment::App),
            _ => {
                return Ok(Segment::Unknown(UnknownSegment {
                    kind: kind.clone(),
                    raw: Value::Object(raw),
                }));
            }
        };

        decoded.map_err(|_| DecodeFailure {
            error: ChainError::MalformedSegment {
                kind: kind.clone(),
                field: "type".to_string(),
            },
            fallback: UnknownSegment {
                kind,
                raw: Value::Object(raw),
            },
        })
    }
}

#[derive(Debug)]
pub(crate) struct DecodeFailure {
    pub(crate) error: ChainError,
    pub(crate) fallback: UnknownSegment,
}

#[derive(Debug, Clone, Copy)]
enum FieldType {
    Int,
    Str,
    Chain,
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    ty: FieldType,
    required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

const SOURCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldType::Int),
    FieldSpec::required("time", FieldType::Int),
];

const QUOTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldType::Int),
    FieldSpec::optional("groupId", FieldType::Int),
    FieldSpec::optional("senderId", FieldType::Int),
    FieldSpec::optional("targetId", FieldType::Int),
    FieldSpec::optional("origin", FieldType::Chain),
];

const AT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("target", FieldType::Int),
    FieldSpec::optional("display", FieldType::Str),
];

const FACE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("faceId", FieldType::Int),
    FieldSpec::optional("name", FieldType::Str),
];

const PLAIN_FIELDS: &[FieldSpec] = &[FieldSpec::required("text", FieldType::Str)];

const IMAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("imageId", FieldType::Str),
    FieldSpec::optional("url", FieldType::Str),
    FieldSpec::optional("path", FieldType::Str),
];

const XML_FIELDS: &[FieldSpec] = &[FieldSpec::required("xml", FieldType::Str)];

const JSON_FIELDS: &[FieldSpec] = &[FieldSpec::required("json", FieldType::Str)];

const APP_FIELDS: &[FieldSpec] = &[FieldSpec::required("content", FieldType::Str)];

fn field_specs(kind: &str) -> Option<&'static [FieldSpec]> {
    let specs: &'static [FieldSpec] = match kind {
        "Source" => SOURCE_FIELDS,
        "Quote" => QUOTE_FIELDS,
        "At" => AT_FIELDS,
        "AtAll" => &[],
        "Face" => FACE_FIELDS,
        "Plain" => PLAIN_FIELDS,
        "Image" | "FlashImage" => IMAGE_FIELDS,
        "Xml" => XML_FIELDS,
        "Json" => JSON_FIELDS,
        "App" => APP_FIELDS,
        _ => return None,
    };
    Some(specs)
}

/// 必需字段缺失或任一字段类型不符时返回该字段名；`null` 视同缺省
fn first_invalid_field(raw: &Map<String, Value>, specs: &[FieldSpec]) -> Option<&'static str> {
    specs.iter().find_map(|spec| {
        let valid = match raw.get(spec.name) {
            None | Some(Value::Null) => !spec.required,
            Some(value) => match spec.ty {
                FieldType::Int => value.as_i64().is_some(),
                FieldType::Str => value.is_string(),
                FieldType::Chain => value.is_array(),
            },
        };
        (!valid).then_some(spec.name)
    })
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum Tagged<'a> {
    Source(&'a Source),
    Quote(&'a Quote),
    At(&'a At),
    AtAll,
    Face(&'a Face),
    Plain(&'a Plain),
    Image(&'a Image),
    FlashImage(&'a Image),
    Xml(&'a Xml),
    Json(&'a Json),
    App(&'a App),
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tagged = match self {
            Segment::Source(source) => Tagged::Source(source),
            Segment::Quote(quote) => Tagged::Quote(quote),
            Segment::At(at) => Tagged::At(at),
            Segment::AtAll => Tagged::AtAll,
            Segment::Face(face) => Tagged::Face(face),
            Segment::Plain(plain) => Tagged::Plain(plain),
            Segment::Image(image) => Tagged::Image(image),
            Segment::FlashImage(image) => Tagged::FlashImage(image),
            Segment::Xml(xml) => Tagged::Xml(xml),
            Segment::Json(json) => Tagged::Json(json),
            Segment::App(app) => Tagged::App(app),
            Segment::Unknown(unknown) => return unknown.raw.serialize(serializer),
        };
        tagged.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Segment::from_value(value).map_err(de::Error::custom)
    }
}

impl From<Plain> for Segment {
    fn from(plain: Plain) -> Self {
        Segment::Plain(plain)
    }
}

impl From<At> for Segment {
    fn from(at: At) -> Self {
        Segment::At(at)
    }
}

impl From<Face> for Segment {
    fn from(face: Face) -> Self {
        Segment::Face(face)
    }
}

impl From<Quote> for Segment {
    fn from(quote: Quote) -> Self {
        Segment::Quote(quote)
    }
}

impl From<Source> for Segment {
    fn from(source: Source) -> Self {
        Segment::Source(source)
    }
}
