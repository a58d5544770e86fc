//! Single- and multi-value header maps.
//!
//! API Gateway sends `headers` and `multiValueHeaders` as two independent
//! keys. Depending on the integration version either, both, or neither may
//! be present; the presence of one says nothing about the other.

use crate::nullable::Nullable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header name to single value.
pub type HeaderMap<V = String> = HashMap<String, V>;

/// Header name to every value sent for it.
pub type MultiValueHeaderMap<V = String> = HashMap<String, Vec<V>>;

/// How a header key that carries no map appeared on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Missing {
    /// The key was not sent.
    #[default]
    Absent,
    /// The key was sent as `null`.
    Null,
}

impl Missing {
    fn into_nullable<T>(self) -> Nullable<T> {
        match self {
            Missing::Absent => Nullable::Absent,
            Missing::Null => Nullable::Null,
        }
    }
}

/// The header representation carried by an envelope or result.
///
/// Flattened onto its parent, it reads and writes the `headers` and
/// `multiValueHeaders` keys. A side without a map remembers whether its
/// key was missing or `null`, so either form is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RawHeaders<V>",
    into = "RawHeaders<V>",
    bound(
        serialize = "V: Serialize + Clone",
        deserialize = "V: Deserialize<'de>"
    )
)]
pub enum Headers<V = String> {
    /// Neither key carried a map.
    None { single: Missing, multi: Missing },
    /// Only `headers` carried a map.
    Single {
        single: HeaderMap<V>,
        multi: Missing,
    },
    /// Only `multiValueHeaders` carried a map.
    Multi {
        single: Missing,
        multi: MultiValueHeaderMap<V>,
    },
    /// Both keys carried a map.
    Both {
        single: HeaderMap<V>,
        multi: MultiValueHeaderMap<V>,
    },
}

impl<V> Default for Headers<V> {
    fn default() -> Self {
        Headers::empty()
    }
}

impl<V> Headers<V> {
    /// Neither key sent.
    pub fn empty() -> Self {
        Headers::None {
            single: Missing::Absent,
            multi: Missing::Absent,
        }
    }

    /// Builds the representation from the two wire keys.
    pub fn from_parts(
        single: Nullable<HeaderMap<V>>,
        multi: Nullable<MultiValueHeaderMap<V>>,
    ) -> Self {
        match (split(single), split(multi)) {
            (Err(single), Err(multi)) => Headers::None { single, multi },
            (Ok(single), Err(multi)) => Headers::Single { single, multi },
            (Err(single), Ok(multi)) => Headers::Multi { single, multi },
            (Ok(single), Ok(multi)) => Headers::Both { single, multi },
        }
    }

    /// Splits the representation back into the two wire keys.
    pub fn into_parts(self) -> (Nullable<HeaderMap<V>>, Nullable<MultiValueHeaderMap<V>>) {
        match self {
            Headers::None { single, multi } => (single.into_nullable(), multi.into_nullable()),
            Headers::Single { single, multi } => (Nullable::Present(single), multi.into_nullable()),
            Headers::Multi { single, multi } => (single.into_nullable(), Nullable::Present(multi)),
            Headers::Both { single, multi } => (Nullable::Present(single), Nullable::Present(multi)),
        }
    }

    /// Returns the single-value map, if that key carried one.
    pub fn single(&self) -> Option<&HeaderMap<V>> {
        match self {
            Headers::Single { single, .. } | Headers::Both { single, .. } => Some(single),
            Headers::None { .. } | Headers::Multi { .. } => None,
        }
    }

    /// Returns the multi-value map, if that key carried one.
    pub fn multi(&self) -> Option<&MultiValueHeaderMap<V>> {
        match self {
            Headers::Multi { multi, .. } | Headers::Both { multi, .. } => Some(multi),
            Headers::None { .. } | Headers::Single { .. } => None,
        }
    }

    /// Looks up a header (case-insensitive), preferring the single-value map.
    pub fn get_first(&self, name: &str) -> Option<&V> {
        if let Some(value) = self.single().and_then(|m| lookup(m, name)) {
            return Some(value);
        }
        self.multi()
            .and_then(|m| lookup(m, name))
            .and_then(|values| values.first())
    }

    /// Returns every value for a header (case-insensitive) from the
    /// multi-value map, falling back to the single-value map.
    pub fn get_all(&self, name: &str) -> Vec<&V> {
        if let Some(values) = self.multi().and_then(|m| lookup(m, name)) {
            return values.iter().collect();
        }
        self.single()
            .and_then(|m| lookup(m, name))
            .into_iter()
            .collect()
    }

    /// Returns `true` if neither key carried a map.
    pub fn is_none(&self) -> bool {
        matches!(self, Headers::None { .. })
    }
}

fn split<T>(value: Nullable<T>) -> Result<T, Missing> {
    match value {
        Nullable::Present(value) => Ok(value),
        Nullable::Null => Err(Missing::Null),
        Nullable::Absent => Err(Missing::Absent),
    }
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, name: &str) -> Option<&'a T> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Wire form of [`Headers`].
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "V: Serialize", deserialize = "V: Deserialize<'de>"))]
struct RawHeaders<V> {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    headers: Nullable<HeaderMap<V>>,
    #[serde(
        rename = "multiValueHeaders",
        default,
        skip_serializing_if = "Nullable::is_absent"
    )]
    multi_value_headers: Nullable<MultiValueHeaderMap<V>>,
}

impl<V> From<RawHeaders<V>> for Headers<V> {
    fn from(raw: RawHeaders<V>) -> Self {
        Headers::from_parts(raw.headers, raw.multi_value_headers)
    }
}

impl<V> From<Headers<V>> for RawHeaders<V> {
    fn from(headers: Headers<V>) -> Self {
        let (headers, multi_value_headers) = headers.into_parts();
        RawHeaders {
            headers,
            multi_value_headers,
        }
    }
}
