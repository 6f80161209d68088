//! Opaque identifiers assigned by the remote API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when an identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: must not be empty")]
pub struct InvalidId {
    kind: &'static str,
}

/// Identity of a provider (one monitored route).
///
/// Provider ids are opaque to this service; the API hands out UUIDs but the
/// only thing we rely on is that they are non-empty and stable.
///
/// # Examples
///
/// ```
/// use delay_notifier::domain::ProviderId;
///
/// let id = ProviderId::new("5f1c2a".to_string()).unwrap();
/// assert_eq!(id.as_str(), "5f1c2a");
///
/// assert!(ProviderId::new("".to_string()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a provider id, rejecting empty or blank strings.
    pub fn new(s: String) -> Result<Self, InvalidId> {
        if s.trim().is_empty() {
            return Err(InvalidId { kind: "provider" });
        }
        Ok(ProviderId(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderId({})", self.0)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a notification, assigned by the store on creation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NotificationId(String);

impl NotificationId {
    /// Create a notification id, rejecting empty or blank strings.
    pub fn new(s: String) -> Result<Self, InvalidId> {
        if s.trim().is_empty() {
            return Err(InvalidId {
                kind: "notification",
            });
        }
        Ok(NotificationId(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NotificationId {
    type Error = InvalidId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        NotificationId::new(s)
    }
}

impl From<NotificationId> for String {
    fn from(id: NotificationId) -> Self {
        id.0
    }
}

impl fmt::Debug for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationId({})", self.0)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_blank() {
        assert!(ProviderId::new("".to_string()).is_err());
        assert!(ProviderId::new("  ".to_string()).is_err());
        assert!(NotificationId::new("".to_string()).is_err());
    }

    #[test]
    fn error_names_the_kind() {
        let err = NotificationId::new(String::new()).unwrap_err();
        assert_eq!(err.to_string(), "invalid notification id: must not be empty");
    }

    #[test]
    fn display_and_debug() {
        let id = ProviderId::new("abc".to_string()).unwrap();
        assert_eq!(format!("{}", id), "abc");
        assert_eq!(format!("{:?}", id), "ProviderId(abc)");

        let id = NotificationId::new("n-1".to_string()).unwrap();
        assert_eq!(format!("{:?}", id), "NotificationId(n-1)");
    }

    #[test]
    fn notification_id_serde_is_a_plain_string() {
        let id: NotificationId = serde_json::from_str("\"n-42\"").unwrap();
        assert_eq!(id.as_str(), "n-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"n-42\"");
        assert!(serde_json::from_str::<NotificationId>("\"\"").is_err());
    }
}
