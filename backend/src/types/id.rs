//! Typed ID wrappers for compile-time type safety.
//!
//! Every entity is keyed by a snowflake `BIGINT`. The wrappers keep user,
//! session and organization IDs from being mixed up, and serialize as decimal
//! strings so JavaScript clients do not lose precision.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::types::snowflake::SnowflakeGenerator;

macro_rules! typed_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Allocates a fresh ID from the generator.
            pub fn generate(ids: &SnowflakeGenerator) -> Self {
                Self(ids.next_id())
            }

            pub const fn from_i64(value: i64) -> Self {
                Self(value)
            }

            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(IdVisitor).map(Self)
            }
        }
    };
}

/// Accepts `"123"` as well as `123`.
struct IdVisitor;

impl<'de> de::Visitor<'de> for IdVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 64-bit identifier as a string or integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom("identifier out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        v.trim()
            .parse::<i64>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(SessionId, "Unique identifier for a login session.");
typed_id!(AccountId, "Unique identifier for a credential account.");
typed_id!(OrganizationId, "Unique identifier for an organization.");
typed_id!(RoleId, "Unique identifier for an organization role.");
typed_id!(PermissionId, "Unique identifier for a permission.");
typed_id!(MembershipId, "Unique identifier for an organization membership.");
typed_id!(JobListingId, "Unique identifier for a job listing.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_decimal_string() {
        let id = UserId::from_i64(9_007_199_254_740_993);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"9007199254740993\""
        );
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_str: OrganizationId = serde_json::from_str("\"42\"").unwrap();
        let from_num: OrganizationId = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<OrganizationId>("\"abc\"").is_err());
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("7".parse::<SessionId>().unwrap(), SessionId::from_i64(7));
        assert!("x7".parse::<SessionId>().is_err());
    }
}
