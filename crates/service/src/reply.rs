use serde::{Deserialize, Serialize};

/// A successful reply from the analysis service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisReply {
    /// The conversation the service associated with the request.
    pub conversation_id: String,
    /// The assistant's reply text.
    pub response: String,
    /// Whether the service is waiting for more details from the user
    /// before it can finish the analysis.
    #[serde(default)]
    pub requires_clarification: bool,
}

impl AnalysisReply {
    /// Creates a reply that doesn't ask for clarification.
    #[inline]
    pub fn new<I: Into<String>, S: Into<String>>(
        conversation_id: I,
        response: S,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            response: response.into(),
            requires_clarification: false,
        }
    }

    /// Marks the reply as asking for clarification.
    #[inline]
    pub fn with_clarification(mut self, requires_clarification: bool) -> Self {
        self.requires_clarification = requires_clarification;
        self
    }
}
