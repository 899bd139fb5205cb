//! Mapping of the upstream payload into the stable profile schema.
//!
//! | output         | upstream field             | default          |
//! |----------------|----------------------------|------------------|
//! | `steamid`      | `steamid`                  | `""`             |
//! | `username`     | `personaname`              | `"unknown user"` |
//! | `realname`     | `realname`                 | `"not public"`   |
//! | `profile_url`  | `profileurl`               | `""`             |
//! | `avatar`       | `avatarfull`               | `""`             |
//! | `status`       | `personastate`             | `"offline"`      |
//! | `created_date` | `timecreated_str`          | `"unknown"`      |
//! | `country`      | `loccountrycode`           | `"unknown"`      |
//! | `visibility`   | `communityvisibilitystate` | `"private"`      |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Online state reported by the upstream `personastate` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaState {
    Offline,
    Online,
    Busy,
    Away,
    Snooze,
    LookingToTrade,
    LookingToPlay,
}

impl PersonaState {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PersonaState::Offline),
            1 => Some(PersonaState::Online),
            2 => Some(PersonaState::Busy),
            3 => Some(PersonaState::Away),
            4 => Some(PersonaState::Snooze),
            5 => Some(PersonaState::LookingToTrade),
            6 => Some(PersonaState::LookingToPlay),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PersonaState::Offline => "offline",
            PersonaState::Online => "online",
            PersonaState::Busy => "busy",
            PersonaState::Away => "away",
            PersonaState::Snooze => "snooze",
            PersonaState::LookingToTrade => "looking-to-trade",
            PersonaState::LookingToPlay => "looking-to-play",
        }
    }
}

/// Label for states outside the known table.
pub const UNKNOWN_STATUS: &str = "unknown";

/// The stable output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub steamid: String,
    pub username: String,
    pub realname: String,
    pub profile_url: String,
    pub avatar: String,
    pub status: String,
    pub created_date: String,
    pub country: String,
    pub visibility: String,
    pub version: String,
}

/// Turns upstream payloads into [`NormalizedProfile`]s. Pure.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    version: String,
}

impl ResponseNormalizer {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn normalize(&self, payload: &Map<String, Value>) -> NormalizedProfile {
        let state = integer_field(payload, "personastate").unwrap_or(0);
        let status = PersonaState::from_code(state)
            .map(PersonaState::label)
            .unwrap_or(UNKNOWN_STATUS);

        let visibility = if integer_field(payload, "communityvisibilitystate") == Some(3) {
            "public"
        } else {
            "private"
        };

        NormalizedProfile {
            steamid: text_field(payload, "steamid", ""),
            username: text_field(payload, "personaname", "unknown user"),
            realname: text_field(payload, "realname", "not public"),
            profile_url: text_field(payload, "profileurl", ""),
            avatar: text_field(payload, "avatarfull", ""),
            status: status.to_string(),
            created_date: text_field(payload, "timecreated_str", "unknown"),
            country: text_field(payload, "loccountrycode", "unknown"),
            visibility: visibility.to_string(),
            version: self.version.clone(),
        }
    }
}

/// Strings pass through, other scalars are stringified, null/absent fall back.
fn text_field(payload: &Map<String, Value>, key: &str, default: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Integers or numeric strings. `None` for null/absent.
///
/// Any other present value yields `Some(-1)` so it never matches a table entry.
fn integer_field(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    match payload.get(key) {
        Some(Value::Null) | None => None,
        Some(Value::Number(n)) => Some(n.as_i64().unwrap_or(-1)),
        Some(Value::String(s)) => Some(s.trim().parse().unwrap_or(-1)),
        Some(_) => Some(-1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> NormalizedProfile {
        let payload = match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        };
        ResponseNormalizer::new("5.0.0").normalize(&payload)
    }

    #[test]
    fn test_empty_payload_uses_defaults() {
        assert_eq!(
            normalize(json!({})),
            NormalizedProfile {
                steamid: String::new(),
                username: "unknown user".to_string(),
                realname: "not public".to_string(),
                profile_url: String::new(),
                avatar: String::new(),
                status: "offline".to_string(),
                created_date: "unknown".to_string(),
                country: "unknown".to_string(),
                visibility: "private".to_string(),
                version: "5.0.0".to_string(),
            }
        );
    }

    #[test]
    fn test_full_payload() {
        let profile = normalize(json!({
            "steamid": "76561198000000000",
            "personaname": "Alice",
            "realname": "Alice A.",
            "profileurl": "https://steamcommunity.com/id/alice/",
            "avatarfull": "https://avatars.example/alice_full.jpg",
            "personastate": 1,
            "timecreated_str": "2010-01-01",
            "loccountrycode": "SE",
            "communityvisibilitystate": 3
        }));

        assert_eq!(profile.username, "Alice");
        assert_eq!(profile.realname, "Alice A.");
        assert_eq!(profile.avatar, "https://avatars.example/alice_full.jpg");
        assert_eq!(profile.status, "online");
        assert_eq!(profile.country, "SE");
        assert_eq!(profile.visibility, "public");
    }

    #[test]
    fn test_status_table() {
        let expected = [
            "offline",
            "online",
            "busy",
            "away",
            "snooze",
            "looking-to-trade",
            "looking-to-play",
        ];
        for (code, label) in expected.iter().enumerate() {
            assert_eq!(normalize(json!({ "personastate": code })).status, *label);
        }
        assert_eq!(normalize(json!({"personastate": 99})).status, "unknown");
        assert_eq!(normalize(json!({"personastate": -1})).status, "unknown");
        assert_eq!(normalize(json!({"personastate": "5"})).status, "looking-to-trade");
        assert_eq!(normalize(json!({"personastate": null})).status, "offline");
    }

    #[test]
    fn test_visibility() {
        assert_eq!(normalize(json!({"communityvisibilitystate": 3})).visibility, "public");
        assert_eq!(normalize(json!({"communityvisibilitystate": "3"})).visibility, "public");
        assert_eq!(normalize(json!({"communityvisibilitystate": 1})).visibility, "private");
    }

    #[test]
    fn test_non_string_scalars_are_stringified() {
        let profile = normalize(json!({"steamid": 76561198000000000u64, "realname": null}));
        assert_eq!(profile.steamid, "76561198000000000");
        assert_eq!(profile.realname, "not public");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let payload = json!({"personaname": "Carol", "personastate": 4});
        assert_eq!(normalize(payload.clone()), normalize(payload));
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(normalize(json!({}))).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        for key in [
            "steamid",
            "username",
            "realname",
            "profile_url",
            "avatar",
            "status",
            "created_date",
            "country",
            "visibility",
            "version",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {}", key);
        }
    }
}
