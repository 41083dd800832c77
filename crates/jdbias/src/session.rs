use std::sync::Arc;

use jdbias_core::input::{ContentMeasure, KeyInput};
use jdbias_core::scroll::ScrollAnchor;
use jdbias_core::{
    ChatController, ChatControllerBuilder, ControllerGoneError, Snapshot,
};
use jdbias_service::AnalysisService;
use tokio::sync::watch;

/// The heading shown above the transcript.
pub const TITLE: &str = "Job Description Bias Analyzer";
/// The line shown under [`TITLE`].
pub const SUBTITLE: &str = "AI-powered analysis for inclusive hiring";
/// The hint shown in an empty input.
pub const PLACEHOLDER: &str = "Paste or type a job description here...";
/// The assistant message every session starts with.
pub const GREETING: &str = "Hello! Please paste or type a job description, \
and I'll analyze it for gender bias in language.";
/// The banner shown when an analysis request fails.
pub const FAILURE_MESSAGE: &str =
    "Failed to send message. Please check your connection and try again.";

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    controller_builder: ChatControllerBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified analysis service.
    pub fn with_service<S: AnalysisService + 'static>(service: S) -> Self {
        let controller_builder = ChatControllerBuilder::with_service(service)
            .with_greeting(GREETING)
            .with_failure_message(FAILURE_MESSAGE);
        Self { controller_builder }
    }

    /// Attaches the view that should follow new messages.
    #[inline]
    pub fn with_scroll_anchor<A: ScrollAnchor + 'static>(
        mut self,
        anchor: Arc<A>,
    ) -> Self {
        self.controller_builder =
            self.controller_builder.with_scroll_anchor(anchor);
        self
    }

    /// Sets how the input height is measured.
    #[inline]
    pub fn with_content_measure<M: ContentMeasure + 'static>(
        mut self,
        measure: M,
    ) -> Self {
        self.controller_builder =
            self.controller_builder.with_content_measure(measure);
        self
    }

    /// Builds a new session. Must be called within a tokio runtime.
    pub fn build(self) -> Session {
        Session {
            controller: self.controller_builder.build(),
        }
    }
}

/// A chat session, like a window that displays messages and has a input box.
///
/// The session holds a fully configured controller that you can use
/// directly, and it is basically a wrapper around [`ChatController`].
#[derive(Clone)]
pub struct Session {
    controller: ChatController,
}

impl Session {
    /// Sends a message to the session, as if it had been typed and
    /// submitted.
    #[inline]
    pub fn send_message(
        &self,
        message: &str,
    ) -> Result<(), ControllerGoneError> {
        self.controller.submit_text(message)
    }

    /// Delivers a key press to the input.
    #[inline]
    pub fn press_key(&self, key: KeyInput) -> Result<(), ControllerGoneError> {
        self.controller.press_key(key)
    }

    /// Recomputes the input height after the view changed size.
    #[inline]
    pub fn remeasure(&self) -> Result<(), ControllerGoneError> {
        self.controller.remeasure()
    }

    /// Returns the latest snapshot.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    /// Returns a receiver that is notified after every change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.controller.subscribe()
    }

    /// Returns the snapshot after all previously sent input was handled.
    #[inline]
    pub async fn current(&self) -> Result<Snapshot, ControllerGoneError> {
        self.controller.current().await
    }

    /// Returns the underlying controller.
    #[inline]
    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Ends the session.
    #[inline]
    pub fn close(&self) {
        self.controller.shutdown();
    }
}
