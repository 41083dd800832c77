use std::sync::Arc;

use jdbias_service::AnalysisService;

use super::ChatController;
use super::service_client::ServiceClient;
use crate::input::{ContentMeasure, LineCountMeasure};
use crate::scroll::ScrollAnchor;

const DEFAULT_GREETING: &str = "Hello! How can I help you today?";
const DEFAULT_FAILURE_MESSAGE: &str =
    "Failed to send message. Please check your connection and try again.";

/// [`ChatController`] builder.
pub struct ChatControllerBuilder {
    pub(crate) service: ServiceClient,
    pub(crate) greeting: String,
    pub(crate) failure_message: String,
    pub(crate) scroll_anchor: Option<Arc<dyn ScrollAnchor>>,
    pub(crate) measure: Box<dyn ContentMeasure>,
}

impl ChatControllerBuilder {
    /// Creates a new builder with the specified analysis service.
    #[inline]
    pub fn with_service<S: AnalysisService + 'static>(service: S) -> Self {
        Self {
            service: ServiceClient::new(service),
            greeting: DEFAULT_GREETING.to_owned(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_owned(),
            scroll_anchor: None,
            measure: Box::new(LineCountMeasure),
        }
    }

    /// Sets the assistant message the transcript starts with.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, greeting: S) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the banner message shown when a request fails.
    #[inline]
    pub fn with_failure_message<S: Into<String>>(mut self, message: S) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Attaches the transcript view to keep scrolled to the newest entry.
    #[inline]
    pub fn with_scroll_anchor<A: ScrollAnchor + 'static>(
        mut self,
        anchor: Arc<A>,
    ) -> Self {
        self.scroll_anchor = Some(anchor);
        self
    }

    /// Sets how the input height is measured. Defaults to
    /// [`LineCountMeasure`].
    #[inline]
    pub fn with_content_measure<M: ContentMeasure + 'static>(
        mut self,
        measure: M,
    ) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Builds the controller and starts it on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[inline]
    pub fn build(self) -> ChatController {
        ChatController::spawn_from_builder(self)
    }
}
