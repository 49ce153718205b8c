//! 联系人与发送者

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 群权限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Owner,
    Administrator,
    Member,
}

/// 好友
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub remark: String,
}

/// 群，`permission` 为 bot 在该群中的权限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub permission: Permission,
}

/// 群成员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub member_name: String,
    pub permission: Permission,
    pub group: Group,
}

/// 消息发送者：好友消息为好友形态，群消息与临时消息为群成员形态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Sender {
    Friend(Friend),
    Member(Member),
}

impl Sender {
    /// 按结构判断形态：带 `group` 对象的是群成员
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        if value.get("group").is_some_and(Value::is_object) {
            serde_json::from_value(value).map(Sender::Member)
        } else {
            serde_json::from_value(value).map(Sender::Friend)
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Sender::Friend(friend) => friend.id,
            Sender::Member(member) => member.id,
        }
    }

    /// 显示名：好友备注优先于昵称，群成员使用群名片
    pub fn display_name(&self) -> &str {
        match self {
            Sender::Friend(friend) if !friend.remark.is_empty() => &friend.remark,
            Sender::Friend(friend) => &friend.nickname,
            Sender::Member(member) => &member.member_name,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Sender::Friend(_) => "friend",
            Sender::Member(_) => "member",
        }
    }

    pub fn as_friend(&self) -> Option<&Friend> {
        match self {
            Sender::Friend(friend) => Some(friend),
            Sender::Member(_) => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Sender::Member(member) => Some(member),
            Sender::Friend(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for Sender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Sender::from_value(value).map_err(de::Error::custom)
    }
}

impl From<Friend> for Sender {
    fn from(friend: Friend) -> Self {
        Sender::Friend(friend)
    }
}

impl From<Member> for Sender {
    fn from(member: Member) -> Self {
        Sender::Member(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sender_shape_detection() {
        let friend = Sender::from_value(json!({"id": 1, "nickname": "alice", "remark": ""})).unwrap();
        assert_eq!(friend.shape(), "friend");
        assert_eq!(friend.display_name(), "alice");

        let member = Sender::from_value(json!({
            "id": 2,
            "memberName": "bob",
            "permission": "ADMINISTRATOR",
            "group": {"id": 100, "name": "rustaceans", "permission": "MEMBER"}
        }))
        .unwrap();
        assert_eq!(member.shape(), "member");
        let member = member.as_member().unwrap();
        assert_eq!(member.permission, Permission::Administrator);
        assert_eq!(member.group.id, 100);
    }

    #[test]
    fn test_friend_remark_preferred() {
        let friend = Sender::Friend(Friend {
            id: 1,
            nickname: "alice".to_string(),
            remark: "Alice (work)".to_string(),
        });
        assert_eq!(friend.display_name(), "Alice (work)");
    }

    #[test]
    fn test_sender_serializes_without_tag() {
        let friend = Sender::Friend(Friend {
            id: 1,
            nickname: "alice".to_string(),
            remark: String::new(),
        });
        assert_eq!(
            serde_json::to_value(&friend).unwrap(),
            json!({"id": 1, "nickname": "alice", "remark": ""})
        );
    }
}
