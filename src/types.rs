//! Shared enumerations used by the schema, the stores and the auth layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A text value that does not name any variant of a closed enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements the exact, case-sensitive text form of a closed enumeration.
/// The same text is used on the wire, in headers and in database columns.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Role held by a principal and required by guarded operations.
/// Roles are flat: no role implies another.
#[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Employee,
    TeamLead,
    Manager,
}

text_enum!(Role, "role", {
    Admin => "ADMIN",
    Employee => "EMPLOYEE",
    TeamLead => "TEAM_LEAD",
    Manager => "MANAGER",
});

/// Work status shared by projects, tickets and tasks
#[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

text_enum!(Status, "status", {
    NotStarted => "NOT_STARTED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    OnHold => "ON_HOLD",
    Cancelled => "CANCELLED",
});

impl Default for Status {
    fn default() -> Self {
        Status::NotStarted
    }
}

#[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

text_enum!(Priority, "priority", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Info,
    Warning,
    Alert,
}

text_enum!(NotificationKind, "notification kind", {
    Info => "INFO",
    Warning => "WARNING",
    Alert => "ALERT",
});

impl Default for NotificationKind {
    fn default() -> Self {
        NotificationKind::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_is_exact_and_case_sensitive() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("TEAM_LEAD".parse::<Role>(), Ok(Role::TeamLead));
        assert!("manager".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!(" ADMIN".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn every_variant_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().as_ref(), Ok(role));
        }
        for status in Status::ALL {
            assert_eq!(Status::try_from(status.to_string()).as_ref(), Ok(status));
        }
    }

    #[test]
    fn parse_error_names_kind_and_value() {
        let err = "DONE".parse::<Status>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status 'DONE'");
    }

    #[test]
    fn defaults_match_column_defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(NotificationKind::default(), NotificationKind::Info);
        assert_eq!(Status::default(), Status::NotStarted);
    }
}
