/// A set-once holder for the conversation identifier issued by the
/// analysis service.
///
/// The first identifier observed is kept for the rest of the session;
/// anything reported afterwards is ignored, even if it differs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversationLatch {
    id: Option<String>,
}

impl ConversationLatch {
    /// Offers an identifier to the latch.
    ///
    /// Returns `true` if this call latched it. Empty identifiers are
    /// treated as absent.
    pub fn observe(&mut self, id: Option<&str>) -> bool {
        if self.id.is_some() {
            return false;
        }
        match id {
            Some(id) if !id.is_empty() => {
                self.id = Some(id.to_owned());
                true
            }
            _ => false,
        }
    }

    /// Returns the latched identifier.
    #[inline]
    pub fn get(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_once() {
        let mut latch = ConversationLatch::default();
        assert_eq!(latch.get(), None);

        assert!(!latch.observe(None));
        assert!(!latch.observe(Some("")));
        assert_eq!(latch.get(), None);

        assert!(latch.observe(Some("c1")));
        assert!(!latch.observe(Some("c2")));
        assert!(!latch.observe(None));
        assert_eq!(latch.get(), Some("c1"));
    }
}
