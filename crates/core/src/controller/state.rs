use std::sync::Arc;

use jdbias_service::AnalysisRequest;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::mailbox::{Command, Mailbox};
use super::service_client::{SendResult, ServiceClient};
use crate::continuity::ConversationLatch;
use crate::input::{InputSurface, KeyOutcome};
use crate::snapshot::Snapshot;
use crate::transcript::{Message, Transcript};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Stage {
    #[default]
    Idle,
    Sending {
        request_id: u64,
    },
}

pub(crate) struct ControllerState {
    pub service: ServiceClient,
    pub transcript: Transcript,
    pub latch: ConversationLatch,
    pub input: InputSurface,
    pub stage: Stage,
    pub last_error: Option<String>,
    pub awaiting_clarification: bool,
    pub failure_message: String,
    pub outstanding: Option<JoinHandle<()>>,
    pub next_request_id: u64,
    pub snapshot_tx: watch::Sender<Snapshot>,
}

impl ControllerState {
    pub fn handle(&mut self, cmd: Command, mailbox: &Arc<Mailbox>) {
        let changed = match cmd {
            Command::Submit => self.submit(mailbox),
            Command::SubmitText(text) => self.submit_text(text, mailbox),
            Command::SetDraft(text) => {
                self.input.set_draft(text) == KeyOutcome::Edited
            }
            Command::Key(key) => match self.input.handle_key(key) {
                KeyOutcome::Edited => true,
                KeyOutcome::Submit => self.submit(mailbox),
                KeyOutcome::Ignored => false,
            },
            Command::Remeasure => {
                let height = self.input.height();
                self.input.remeasure();
                height != self.input.height()
            }
            Command::Sync(reply_tx) => {
                reply_tx.send(self.snapshot()).ok();
                false
            }
            Command::Settled { request_id, result } => {
                self.settle(request_id, result)
            }
        };
        if changed {
            self.publish();
        }
    }

    #[inline]
    fn is_sending(&self) -> bool {
        self.stage != Stage::Idle
    }

    fn submit_text(&mut self, text: String, mailbox: &Arc<Mailbox>) -> bool {
        if self.is_sending() {
            debug!("rejected submission: a request is in flight");
            return false;
        }
        let edited = self.input.set_draft(text) == KeyOutcome::Edited;
        self.submit(mailbox) || edited
    }

    /// Validates the draft and, if it passes, dispatches it.
    ///
    /// Everything the user sees change on acceptance happens here, before
    /// the request is spawned: the user message, the cleared draft and
    /// the disabled input.
    fn submit(&mut self, mailbox: &Arc<Mailbox>) -> bool {
        if self.is_sending() {
            debug!("rejected submission: a request is in flight");
            return false;
        }
        let message = self.input.draft().trim().to_owned();
        if message.is_empty() {
            trace!("rejected submission: blank draft");
            return false;
        }

        self.last_error = None;
        self.awaiting_clarification = false;
        self.transcript.append(Message::user(message.clone()));
        self.input.clear();
        self.input.set_enabled(false);

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.stage = Stage::Sending { request_id };

        let conversation_id = self.latch.get().map(ToOwned::to_owned);
        debug!(request_id, ?conversation_id, "dispatching analysis request");
        let request =
            AnalysisRequest::new(message).with_conversation_id(conversation_id);
        let fut = self.service.send(request);

        let mailbox = Arc::downgrade(mailbox);
        self.outstanding = Some(tokio::spawn(async move {
            let result = fut.await;
            let Some(mailbox) = mailbox.upgrade() else {
                return;
            };
            mailbox.send(Command::Settled { request_id, result }).ok();
        }));
        true
    }

    fn settle(&mut self, request_id: u64, result: SendResult) -> bool {
        if self.stage != (Stage::Sending { request_id }) {
            warn!(request_id, "discarding the result of a stale request");
            return false;
        }
        self.outstanding = None;

        match result {
            Ok(reply) => {
                if self.latch.observe(Some(&reply.conversation_id)) {
                    info!(
                        conversation_id = %reply.conversation_id,
                        "conversation established"
                    );
                } else if !reply.conversation_id.is_empty()
                    && self.latch.get() != Some(reply.conversation_id.as_str())
                {
                    debug!(
                        conversation_id = %reply.conversation_id,
                        "ignoring a different conversation id"
                    );
                }
                self.awaiting_clarification = reply.requires_clarification;
                self.transcript.append(Message::assistant(reply.response));
            }
            Err(err) => {
                warn!(
                    request_id,
                    kind = %err.kind(),
                    "analysis request failed: {err}"
                );
                self.last_error = Some(self.failure_message.clone());
            }
        }

        self.stage = Stage::Idle;
        self.input.set_enabled(true);
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            transcript: self.transcript.all().to_vec(),
            conversation_id: self.latch.get().map(ToOwned::to_owned),
            is_sending: self.is_sending(),
            last_error: self.last_error.clone(),
            awaiting_clarification: self.awaiting_clarification,
            draft: self.input.draft().to_owned(),
            input_height: self.input.height(),
            input_enabled: self.input.is_enabled(),
            can_submit: self.input.can_submit(),
        }
    }

    #[inline]
    pub fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    pub fn abandon_outstanding(&mut self) {
        if let Some(task) = self.outstanding.take() {
            debug!("abandoning the outstanding request");
            task.abort();
        }
    }
}
