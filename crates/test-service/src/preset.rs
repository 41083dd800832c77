use jdbias_service::{AnalysisReply, ErrorKind};
use serde::{Deserialize, Serialize};

/// How a scripted request should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFailure {
    /// The service looks unreachable.
    Transport,
    /// The service answers with an error status.
    Server,
    /// The service answers with something that isn't a reply.
    InvalidReply,
}

impl PresetFailure {
    pub(crate) fn kind(self) -> ErrorKind {
        match self {
            PresetFailure::Transport => ErrorKind::Transport,
            PresetFailure::Server => ErrorKind::Server,
            PresetFailure::InvalidReply => ErrorKind::InvalidReply,
        }
    }
}

/// The preset outcome of one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    #[serde(rename = "reply")]
    Reply(AnalysisReply),
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

impl PresetReply {
    /// Creates a successful preset.
    #[inline]
    pub fn reply<I: Into<String>, S: Into<String>>(
        conversation_id: I,
        response: S,
    ) -> Self {
        Self::Reply(AnalysisReply::new(conversation_id, response))
    }

    /// Creates a failing preset.
    #[inline]
    pub fn failure(failure: PresetFailure) -> Self {
        Self::Failure(failure)
    }
}
