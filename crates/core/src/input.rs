//! The text entry affordance.

/// Measures how tall the draft needs to be to show all of its content.
///
/// Implemented by the presentation layer, which knows how text wraps.
pub trait ContentMeasure: Send + Sync {
    /// Returns the number of rows `content` occupies.
    fn measure_content_height(&self, content: &str) -> usize;
}

/// Measures content by its logical lines, ignoring wrapping.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineCountMeasure;

impl ContentMeasure for LineCountMeasure {
    #[inline]
    fn measure_content_height(&self, content: &str) -> usize {
        // `lines` drops a trailing empty line, but the cursor sits there.
        let lines =
            content.lines().count() + usize::from(content.ends_with('\n'));
        lines.max(1)
    }
}

/// A key press, or something that behaves like one, delivered to the input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyInput {
    /// A printable character.
    Char(char),
    /// Removes the last character.
    Backspace,
    /// The Enter key. A plain Enter submits, Shift+Enter inserts a newline.
    Enter {
        /// Whether Shift was held.
        shift: bool,
    },
    /// Text pasted as a whole.
    Paste(String),
}

/// What a key press amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyOutcome {
    /// The draft changed.
    Edited,
    /// The user asked to submit the draft.
    Submit,
    /// Nothing happened, the input is disabled or the key was a no-op.
    Ignored,
}

/// The draft being typed, plus the height it needs to be shown in full.
///
/// The input is disabled while a request is in flight: edits and keys are
/// ignored until it is enabled again.
pub(crate) struct InputSurface {
    draft: String,
    height: usize,
    enabled: bool,
    measure: Box<dyn ContentMeasure>,
}

impl InputSurface {
    pub fn new(measure: Box<dyn ContentMeasure>) -> Self {
        let mut surface = Self {
            draft: String::new(),
            height: 1,
            enabled: true,
            measure,
        };
        surface.remeasure();
        surface
    }

    #[inline]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn can_submit(&self) -> bool {
        self.enabled && !self.draft.trim().is_empty()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Replaces the whole draft.
    pub fn set_draft(&mut self, text: String) -> KeyOutcome {
        if !self.enabled {
            return KeyOutcome::Ignored;
        }
        self.draft = normalize_line_endings(text);
        self.remeasure();
        KeyOutcome::Edited
    }

    pub fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        if !self.enabled {
            return KeyOutcome::Ignored;
        }
        match key {
            KeyInput::Enter { shift: false } => return KeyOutcome::Submit,
            KeyInput::Enter { shift: true } => self.draft.push('\n'),
            KeyInput::Char(c) => self.draft.push(c),
            KeyInput::Paste(text) => {
                self.draft.push_str(&normalize_line_endings(text));
            }
            KeyInput::Backspace => {
                if self.draft.pop().is_none() {
                    return KeyOutcome::Ignored;
                }
            }
        }
        self.remeasure();
        KeyOutcome::Edited
    }

    /// Empties the draft, regardless of whether the input is enabled.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.remeasure();
    }

    /// Recomputes the height from scratch.
    pub fn remeasure(&mut self) {
        self.height = self.measure.measure_content_height(&self.draft);
    }
}

/// Turns `\r\n` and lone `\r` into `\n`. Terminals paste with either.
fn normalize_line_endings(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> InputSurface {
        InputSurface::new(Box::new(LineCountMeasure))
    }

    #[test]
    fn test_line_count_measure() {
        let measure = LineCountMeasure;
        assert_eq!(measure.measure_content_height(""), 1);
        assert_eq!(measure.measure_content_height("one"), 1);
        assert_eq!(measure.measure_content_height("one\ntwo"), 2);
        assert_eq!(measure.measure_content_height("one\n"), 2);
    }

    #[test]
    fn test_height_follows_content() {
        let mut input = surface();
        assert_eq!(input.height(), 1);

        for key in [
            KeyInput::Char('a'),
            KeyInput::Enter { shift: true },
            KeyInput::Char('b'),
            KeyInput::Enter { shift: true },
            KeyInput::Char('c'),
        ] {
            assert_eq!(input.handle_key(key), KeyOutcome::Edited);
        }
        assert_eq!(input.draft(), "a\nb\nc");
        assert_eq!(input.height(), 3);

        input.handle_key(KeyInput::Backspace);
        input.handle_key(KeyInput::Backspace);
        assert_eq!(input.draft(), "a\nb");
        assert_eq!(input.height(), 2);

        input.set_draft("short".to_owned());
        assert_eq!(input.height(), 1);
    }

    #[test]
    fn test_pasted_carriage_returns_become_newlines() {
        let mut input = surface();
        let pasted =
            "Senior engineer\rMust be aggressive\rRockstar wanted".to_owned();
        assert_eq!(
            input.handle_key(KeyInput::Paste(pasted)),
            KeyOutcome::Edited
        );
        assert_eq!(
            input.draft(),
            "Senior engineer\nMust be aggressive\nRockstar wanted"
        );
        assert_eq!(input.height(), 3);

        input.set_draft("one\r\ntwo\r\n".to_owned());
        assert_eq!(input.draft(), "one\ntwo\n");
        assert_eq!(input.height(), 3);
    }

    #[test]
    fn test_enter_submits_without_newline() {
        let mut input = surface();
        input.set_draft("Senior rockstar ninja".to_owned());
        assert_eq!(
            input.handle_key(KeyInput::Enter { shift: false }),
            KeyOutcome::Submit
        );
        assert_eq!(input.draft(), "Senior rockstar ninja");
    }

    #[test]
    fn test_disabled_input_ignores_keys() {
        let mut input = surface();
        input.set_draft("keep".to_owned());
        input.set_enabled(false);

        assert!(!input.can_submit());
        assert_eq!(input.handle_key(KeyInput::Char('x')), KeyOutcome::Ignored);
        assert_eq!(
            input.handle_key(KeyInput::Enter { shift: false }),
            KeyOutcome::Ignored
        );
        assert_eq!(input.set_draft("other".to_owned()), KeyOutcome::Ignored);
        assert_eq!(input.draft(), "keep");

        input.set_enabled(true);
        assert!(input.can_submit());
    }

    #[test]
    fn test_blank_draft_cannot_submit() {
        let mut input = surface();
        assert!(!input.can_submit());
        input.set_draft(" \n\t ".to_owned());
        assert!(!input.can_submit());
        assert_eq!(input.handle_key(KeyInput::Backspace), KeyOutcome::Edited);
    }
}
