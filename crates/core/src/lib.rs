//! Core logic of the conversation: the transcript, the request lifecycle,
//! conversation continuity and the input and scroll affordances driven by
//! them.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod continuity;
mod controller;
pub mod input;
pub mod scroll;
mod snapshot;
pub mod transcript;

pub use continuity::ConversationLatch;
pub use controller::{
    ChatController, ChatControllerBuilder, ControllerGoneError,
};
pub use snapshot::Snapshot;
