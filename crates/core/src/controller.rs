mod builder;
mod mailbox;
mod service_client;
mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::Instrument;

use crate::input::{InputSurface, KeyInput};
use crate::scroll;
use crate::snapshot::Snapshot;
use crate::transcript::Transcript;
pub use builder::ChatControllerBuilder;
use mailbox::{Command, Mailbox, MailboxParts, run_controller};
pub use mailbox::ControllerGoneError;
use state::ControllerState;

/// A handle to a running conversation.
///
/// The conversation runs as its own task and handles commands one at a
/// time, in the order they were sent. Every method here only enqueues a
/// command and returns immediately; the effects become visible through
/// [`ChatController::subscribe`] once the command is handled.
///
/// At most one analysis request is in flight at any time. Submissions made
/// while one is outstanding are dropped, and so are edits, since the input
/// is disabled until the request settles.
#[derive(Clone)]
pub struct ChatController {
    mailbox: Arc<Mailbox>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl ChatController {
    /// Submits the current draft.
    #[inline]
    pub fn submit(&self) -> Result<(), ControllerGoneError> {
        self.mailbox.send(Command::Submit)
    }

    /// Replaces the draft with `text` and submits it.
    ///
    /// Does nothing at all, not even replacing the draft, while a request
    /// is in flight.
    #[inline]
    pub fn submit_text<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), ControllerGoneError> {
        self.mailbox.send(Command::SubmitText(text.into()))
    }

    /// Replaces the draft.
    #[inline]
    pub fn set_draft<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), ControllerGoneError> {
        self.mailbox.send(Command::SetDraft(text.into()))
    }

    /// Delivers a key press to the input.
    #[inline]
    pub fn press_key(&self, key: KeyInput) -> Result<(), ControllerGoneError> {
        self.mailbox.send(Command::Key(key))
    }

    /// Recomputes the input height, e.g. after the view was resized.
    #[inline]
    pub fn remeasure(&self) -> Result<(), ControllerGoneError> {
        self.mailbox.send(Command::Remeasure)
    }

    /// Returns the latest published snapshot.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a receiver that is notified after every mutation.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Returns the snapshot after every command sent before this call has
    /// been handled.
    pub async fn current(&self) -> Result<Snapshot, ControllerGoneError> {
        let (tx, rx) = oneshot::channel();
        self.mailbox.send(Command::Sync(tx))?;
        rx.await.map_err(|_| ControllerGoneError)
    }

    /// Stops the conversation.
    ///
    /// An outstanding request is abandoned and its result discarded.
    #[inline]
    pub fn shutdown(&self) {
        self.mailbox.try_kill();
    }
}

impl ChatController {
    fn spawn_from_builder(builder: ChatControllerBuilder) -> Self {
        let ChatControllerBuilder {
            service,
            greeting,
            failure_message,
            scroll_anchor,
            measure,
        } = builder;

        let mut transcript = Transcript::seeded(greeting);
        if let Some(anchor) = scroll_anchor {
            scroll::follow_transcript(&mut transcript, anchor);
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let state = ControllerState {
            service,
            transcript,
            latch: Default::default(),
            input: InputSurface::new(measure),
            stage: Default::default(),
            last_error: None,
            awaiting_clarification: false,
            failure_message,
            outstanding: None,
            next_request_id: 1,
            snapshot_tx,
        };
        state.publish();

        let MailboxParts {
            mailbox,
            cmd_rx,
            kill_rx,
        } = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_controller(Arc::downgrade(&mailbox), state, cmd_rx, kill_rx)
                .instrument(debug_span!("controller")),
        );

        Self {
            mailbox,
            snapshot_rx,
        }
    }
}
