use serde::{Deserialize, Serialize};

/// A request to be sent to the analysis service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The submitted text, already trimmed and never empty.
    pub message: String,
    /// The conversation this request continues, `None` for the first
    /// request of a session.
    pub conversation_id: Option<String>,
}

impl AnalysisRequest {
    /// Creates a request that starts a new conversation.
    #[inline]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    /// Attaches the conversation this request belongs to.
    #[inline]
    pub fn with_conversation_id(mut self, id: Option<String>) -> Self {
        self.conversation_id = id;
        self
    }
}
