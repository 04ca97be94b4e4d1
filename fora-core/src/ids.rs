//! Opaque identifiers for interviews, topics and answers.
//!
//! The analysis service emits integer primary keys, but excerpt maps key answers
//! by their string form. Every identifier here therefore deserializes from either
//! a JSON number or a JSON string and is held as a string from then on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire form accepted for any identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

macro_rules! wire_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "RawId", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<RawId> for $name {
            fn from(value: RawId) -> Self {
                Self(String::from(value))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

wire_id!(
    /// The interview (survey) whose topics the dashboard shows.
    InterviewId
);
wire_id!(
    /// One analysed topic within an interview.
    TopicId
);
wire_id!(
    /// One respondent answer.
    AnswerId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn numeric_and_string_ids_decode_to_the_same_value() {
        let from_int: TopicId = serde_json::from_str("42").unwrap();
        let from_str: TopicId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_int, from_str);
        assert_eq!(from_int.to_string(), "42");
    }

    #[test]
    fn answer_ids_work_as_map_keys() {
        let map: BTreeMap<AnswerId, String> =
            serde_json::from_str(r#"{"7": "short wait", "12": "friendly staff"}"#).unwrap();
        assert_eq!(map.get(&AnswerId::from(7)).map(String::as_str), Some("short wait"));
        assert_eq!(map.get(&AnswerId::from("12")).map(String::as_str), Some("friendly staff"));
    }
}
