use crate::transcript::Message;

/// A copy of everything the presentation layer shows, taken right after a
/// mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Messages in the order they were appended.
    pub transcript: Vec<Message>,
    /// The conversation latched from the first successful reply.
    pub conversation_id: Option<String>,
    /// Whether a request is outstanding.
    pub is_sending: bool,
    /// The banner message of the last failed request.
    pub last_error: Option<String>,
    /// Whether the last reply asked the user for more details.
    pub awaiting_clarification: bool,
    /// The text in the input.
    pub draft: String,
    /// Rows needed to show the whole draft.
    pub input_height: usize,
    /// Whether the input accepts edits.
    pub input_enabled: bool,
    /// Whether an explicit submit action is available.
    pub can_submit: bool,
}

impl Snapshot {
    /// Returns messages appended after the first `seen` ones.
    #[inline]
    pub fn messages_since(&self, seen: usize) -> &[Message] {
        self.transcript.get(seen..).unwrap_or_default()
    }
}
