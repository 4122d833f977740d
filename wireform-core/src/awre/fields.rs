//! Protocol field model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic label of an induced protocol field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLabel {
    Preamble,
    Sync,
    Length,
    Address,
    SequenceNumber,
    Data,
    Checksum,
    Unknown,
}

impl FieldLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldLabel::Preamble => "preamble",
            FieldLabel::Sync => "sync",
            FieldLabel::Length => "length",
            FieldLabel::Address => "address",
            FieldLabel::SequenceNumber => "sequence_number",
            FieldLabel::Data => "data",
            FieldLabel::Checksum => "checksum",
            FieldLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One induced field: a half-open bit range `[start, end)` within the
/// messages of one message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolField {
    #[serde(rename = "name")]
    pub label: FieldLabel,
    pub start: usize,
    pub end: usize,
    pub message_type: String,
}

impl ProtocolField {
    pub fn new(label: FieldLabel, start: usize, end: usize, message_type: &str) -> Self {
        debug_assert!(end > start);
        Self {
            label,
            start,
            end,
            message_type: message_type.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
