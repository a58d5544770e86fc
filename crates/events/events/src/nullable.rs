//! Tri-state field values.
//!
//! Some producers always send a key but may leave its value `null`. A plain
//! `Option<T>` folds "missing" and "null" together; [`Nullable`] keeps them
//! apart so the wire form survives a decode/encode cycle.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that may be missing, present with `null`, or present with a value.
///
/// Fields of this type must be declared with
/// `#[serde(default, skip_serializing_if = "Nullable::is_absent")]` so that a
/// missing key decodes to [`Nullable::Absent`] and is omitted again on encode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Nullable<T> {
    /// The key was not present.
    #[default]
    Absent,
    /// The key was present with a `null` value.
    Null,
    /// The key was present with a value.
    Present(T),
}

impl<T> Nullable<T> {
    /// Returns `true` if the key was missing.
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    /// Returns `true` if the key was present with `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    /// Returns `true` if the key was present, either `null` or with a value.
    pub fn is_key_present(&self) -> bool {
        !self.is_absent()
    }

    /// Returns the value, if any.
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Nullable::Present(value) => Some(value),
            Nullable::Absent | Nullable::Null => None,
        }
    }

    /// Converts into an `Option`, folding `Absent` and `Null` into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Present(value) => Some(value),
            Nullable::Absent | Nullable::Null => None,
        }
    }
}

impl Nullable<String> {
    /// Returns the value as a string slice, if any.
    pub fn as_deref(&self) -> Option<&str> {
        self.as_ref().map(String::as_str)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    /// `None` maps to `Null`: a value built in code always carries its key.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Present(v),
            None => Nullable::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Present(value) => value.serialize(serializer),
            // Absent is normally skipped by the field attribute; if it is not,
            // the closest wire form is null.
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the key exists; a missing key takes the Default.
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Nullable::is_absent")]
        user: Nullable<String>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(probe.user.is_absent());
        assert!(!probe.user.is_key_present());
    }

    #[test]
    fn test_null_value_is_null() {
        let probe: Probe = serde_json::from_value(json!({ "user": null })).unwrap();
        assert!(probe.user.is_null());
        assert!(probe.user.is_key_present());
        assert_eq!(probe.user.as_deref(), None);
    }

    #[test]
    fn test_present_value() {
        let probe: Probe = serde_json::from_value(json!({ "user": "alice" })).unwrap();
        assert_eq!(probe.user, Nullable::Present("alice".to_string()));
        assert_eq!(probe.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_wire_form_is_preserved() {
        for value in [json!({}), json!({ "user": null }), json!({ "user": "bob" })] {
            let probe: Probe = serde_json::from_value(value.clone()).unwrap();
            assert_eq!(serde_json::to_value(&probe).unwrap(), value);
        }
    }
}
