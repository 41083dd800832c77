use std::error::Error;
use std::fmt;
use std::sync::Weak;

use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};

use super::service_client::SendResult;
use super::state::ControllerState;
use crate::input::KeyInput;
use crate::snapshot::Snapshot;

/// A type of error which can be returned whenever commands are sent to a
/// controller that has stopped.
pub struct ControllerGoneError;

impl fmt::Debug for ControllerGoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerGoneError").finish()
    }
}

impl fmt::Display for ControllerGoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the controller has stopped".fmt(f)
    }
}

impl Error for ControllerGoneError {}

#[derive(Debug)]
pub(crate) enum Command {
    Submit,
    SubmitText(String),
    SetDraft(String),
    Key(KeyInput),
    Remeasure,
    Sync(oneshot::Sender<Snapshot>),
    Settled { request_id: u64, result: SendResult },
}

pub(crate) struct MailboxParts {
    pub mailbox: Mailbox,
    pub cmd_rx: mpsc::UnboundedReceiver<Command>,
    pub kill_rx: watch::Receiver<bool>,
}

pub(crate) struct Mailbox {
    cmd_tx: mpsc::UnboundedSender<Command>,
    kill_tx: watch::Sender<bool>,
}

impl Mailbox {
    #[inline]
    pub fn new() -> MailboxParts {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        MailboxParts {
            mailbox: Mailbox { cmd_tx, kill_tx },
            cmd_rx,
            kill_rx,
        }
    }

    #[inline]
    pub fn send(&self, cmd: Command) -> Result<(), ControllerGoneError> {
        self.cmd_tx.send(cmd).map_err(|_| ControllerGoneError)
    }

    #[inline]
    pub fn try_kill(&self) {
        self.kill_tx.send(true).ok();
    }
}

pub(crate) async fn run_controller(
    mailbox: Weak<Mailbox>,
    mut state: ControllerState,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    mut kill_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let cmd = select! {
            biased;

            _ = kill_rx.changed() => {
                break;
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                cmd
            }
        };
        trace!("received command: {cmd:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("last handle has been dropped, discard the command");
            break;
        };
        let proc_span = trace_span!("proc cmd");
        proc_span.in_scope(|| {
            state.handle(cmd, &mailbox);
            trace!("finished");
        });
    }
    state.abandon_outstanding();
    debug!("will terminate");
}
