//! Storage row keys
//!
//! A row key is the 8-byte big-endian stream id followed by the 8-byte
//! big-endian epoch second. Byte order equals (stream, epoch) order for
//! non-negative epochs, which is what the log archive stores.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ROW_KEY_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey([u8; ROW_KEY_LEN]);

impl RowKey {
    pub fn new(stream_id: u64, epoch: i64) -> Self {
        let mut bytes = [0u8; ROW_KEY_LEN];
        bytes[..8].copy_from_slice(&stream_id.to_be_bytes());
        bytes[8..].copy_from_slice(&epoch.to_be_bytes());
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; ROW_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ROW_KEY_LEN] {
        &self.0
    }

    pub fn stream_id(&self) -> u64 {
        let mut id = [0u8; 8];
        id.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(id)
    }

    pub fn epoch(&self) -> i64 {
        let mut epoch = [0u8; 8];
        epoch.copy_from_slice(&self.0[8..]);
        i64::from_be_bytes(epoch)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stream_id(), self.epoch())
    }
}

/// Opaque token naming the stream filter a range came from.
/// Ranges only combine when their tokens are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterToken(String);

impl FilterToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open key range `[start, stop)` plus the filter that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    pub start: RowKey,
    pub stop: RowKey,
    pub filter: FilterToken,
}

impl ScanRequest {
    pub fn contains(&self, key: &RowKey) -> bool {
        self.start <= *key && *key < self.stop
    }
}
