//! Domain entities mirrored from persistent storage.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

const TODO_ID_LEN: usize = 12;

/// Store-assigned identity of a todo: twelve bytes, written as 24 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId([u8; TODO_ID_LEN]);

impl TodoId {
    pub fn from_bytes(bytes: [u8; TODO_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; TODO_ID_LEN] {
        self.0
    }

    /// Parse the hex form used in URLs and payloads.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() != TODO_ID_LEN * 2 {
            return Err(DomainError::invalid_id(value));
        }

        let mut bytes = [0u8; TODO_ID_LEN];
        hex::decode_to_slice(value, &mut bytes).map_err(|_| DomainError::invalid_id(value))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TodoId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TodoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(rename = "type")]
    pub todo_type: String,
}

impl Todo {
    pub fn new(id: TodoId, todo_type: impl Into<String>) -> Self {
        Self {
            id,
            todo_type: todo_type.into(),
        }
    }
}
