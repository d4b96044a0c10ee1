//! Stream message model and its wire representation.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A message emitted by a plan's producer and fanned out to subscribers.
///
/// Serialized as a tagged JSON object, e.g. `{"type":"chunk","text":"Hello"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessage {
    /// The producer started streaming
    Start,

    /// An incremental piece of reply content
    Chunk { text: String },

    /// The producer is describing the changes it made
    Describing,

    /// Progress of the build for one path
    #[serde(rename_all = "camelCase")]
    BuildInfo {
        path: String,
        num_tokens: usize,
        finished: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// The producer will emit no further reply chunks
    RepliesFinished,

    /// A producer-side error surfaced to subscribers
    Error { error: ApiError },

    /// The producer gave up before finishing
    Aborted,

    /// Terminal marker; its delivery completes the stream
    Finished,
}

impl StreamMessage {
    /// Creates a chunk message.
    pub fn chunk(text: impl Into<String>) -> Self {
        StreamMessage::Chunk { text: text.into() }
    }

    /// Stable wire tag of the message.
    pub fn type_name(&self) -> &'static str {
        match self {
            StreamMessage::Start => "start",
            StreamMessage::Chunk { .. } => "chunk",
            StreamMessage::Describing => "describing",
            StreamMessage::BuildInfo { .. } => "buildInfo",
            StreamMessage::RepliesFinished => "repliesFinished",
            StreamMessage::Error { .. } => "error",
            StreamMessage::Aborted => "aborted",
            StreamMessage::Finished => "finished",
        }
    }
}

/// Anything a plan can emit: it knows its own wire form and whether it ends
/// the stream.
pub trait WireMessage {
    /// Serializes the message to the text sent to subscribers.
    fn to_wire(&self) -> serde_json::Result<String>;

    /// Whether delivering this message completes the stream.
    fn is_terminal(&self) -> bool;
}

impl WireMessage for StreamMessage {
    fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn is_terminal(&self) -> bool {
        matches!(self, StreamMessage::Finished)
    }
}
