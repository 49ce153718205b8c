//! 戳一戳
//!
//! 不属于可组合进消息链的消息段，只能单独发送。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::MiraiChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PokeKind {
    /// 戳一戳
    Poke,
    /// 比心
    ShowLove,
    /// 点赞
    Like,
    /// 心碎
    Heartbroken,
    /// 666
    SixSixSix,
    /// 放大招
    FangDaZhao,
}

impl PokeKind {
    pub const ALL: [PokeKind; 6] = [
        PokeKind::Poke,
        PokeKind::ShowLove,
        PokeKind::Like,
        PokeKind::Heartbroken,
        PokeKind::SixSixSix,
        PokeKind::FangDaZhao,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PokeKind::Poke => "Poke",
            PokeKind::ShowLove => "ShowLove",
            PokeKind::Like => "Like",
            PokeKind::Heartbroken => "Heartbroken",
            PokeKind::SixSixSix => "SixSixSix",
            PokeKind::FangDaZhao => "FangDaZhao",
        }
    }

    /// 线上格式 `{"type":"Poke","name":...}`
    pub fn to_value(&self) -> Value {
        json!({ "type": "Poke", "name": self.as_str() })
    }
}

impl fmt::Display for PokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PokeKind {
    type Err = MiraiChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poke" => Ok(PokeKind::Poke),
            "showlove" | "show_love" => Ok(PokeKind::ShowLove),
            "like" => Ok(PokeKind::Like),
            "heartbroken" => Ok(PokeKind::Heartbroken),
            "sixsixsix" | "666" => Ok(PokeKind::SixSixSix),
            "fangdazhao" => Ok(PokeKind::FangDaZhao),
            _ => Err(MiraiChatError::Parse(format!("未知的戳一戳类型: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poke_wire_format() {
        assert_eq!(
            PokeKind::SixSixSix.to_value(),
            json!({"type": "Poke", "name": "SixSixSix"})
        );
        for kind in PokeKind::ALL {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_poke_from_str() {
        assert_eq!("like".parse::<PokeKind>().unwrap(), PokeKind::Like);
        assert_eq!("ShowLove".parse::<PokeKind>().unwrap(), PokeKind::ShowLove);
        assert_eq!("666".parse::<PokeKind>().unwrap(), PokeKind::SixSixSix);
        assert!("slap".parse::<PokeKind>().is_err());
    }
}
