use jdbias_service::{AnalysisReply, AnalysisRequest};
use serde::{Deserialize, Serialize};

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatMessage<'a> {
    pub message: &'a str,
    pub conversation_id: Option<&'a str>,
}

impl<'a> From<&'a AnalysisRequest> for ChatMessage<'a> {
    fn from(req: &'a AnalysisRequest) -> Self {
        Self {
            message: &req.message,
            conversation_id: req.conversation_id.as_deref(),
        }
    }
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    // The server sends `null` as often as it omits the field.
    #[serde(default)]
    pub requires_clarification: Option<bool>,
}

impl From<ChatResponse> for AnalysisReply {
    fn from(resp: ChatResponse) -> Self {
        AnalysisReply::new(resp.conversation_id, resp.response)
            .with_clarification(resp.requires_clarification.unwrap_or(false))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_first_message_has_null_conversation() {
        let req = AnalysisRequest::new("Software engineer wanted");
        let value = serde_json::to_value(ChatMessage::from(&req)).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "Software engineer wanted",
                "conversation_id": null
            })
        );
    }

    #[test]
    fn test_parse_response() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "response": "Detected masculine-coded language...",
            "conversation_id": "c1",
            "requires_clarification": null
        }))
        .unwrap();
        let reply = AnalysisReply::from(resp);
        assert_eq!(reply.conversation_id, "c1");
        assert_eq!(reply.response, "Detected masculine-coded language...");
        assert!(!reply.requires_clarification);

        let resp: ChatResponse = serde_json::from_value(json!({
            "response": "Could you paste the full posting?",
            "conversation_id": "c1",
            "requires_clarification": true
        }))
        .unwrap();
        assert!(AnalysisReply::from(resp).requires_clarification);
    }

    #[test]
    fn test_missing_fields() {
        let result: Result<ChatResponse, _> =
            serde_json::from_value(json!({ "response": "no id" }));
        assert!(result.is_err());
    }
}
