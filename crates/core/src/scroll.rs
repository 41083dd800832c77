//! Keeping the newest transcript entry in view.

use std::sync::Arc;

use crate::transcript::Transcript;

/// How a scroll should be performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollBehavior {
    /// Animate towards the target.
    #[default]
    Smooth,
    /// Jump straight to the target.
    Instant,
}

/// A handle to the widget that shows the transcript.
pub trait ScrollAnchor: Send + Sync {
    /// Scrolls so that the entry at `index` is visible.
    fn scroll_into_view(&self, index: usize, behavior: ScrollBehavior);
}

/// Makes `anchor` follow every message appended to `transcript`.
pub(crate) fn follow_transcript(
    transcript: &mut Transcript,
    anchor: Arc<dyn ScrollAnchor>,
) {
    transcript.subscribe(move |_, index| {
        trace!("scrolling entry {index} into view");
        anchor.scroll_into_view(index, ScrollBehavior::Smooth);
    });
}
