//! Transcript-related types.

use std::fmt::{self, Debug, Formatter};

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing into the input.
    User,
    /// The analysis service.
    Assistant,
}

/// A message in the transcript.
///
/// Messages can't be changed once they are created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Creates a message written by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a message written by the assistant.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Returns who wrote this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this message.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

type Observer = Box<dyn FnMut(&Message, usize) + Send>;

/// An append-only log of the messages exchanged in a session.
///
/// Observers registered with [`Transcript::subscribe`] run synchronously
/// after every append, with the new message and its index.
pub struct Transcript {
    messages: Vec<Message>,
    observers: Vec<Observer>,
}

impl Transcript {
    /// Creates a transcript that starts with an assistant greeting.
    pub fn seeded<S: Into<String>>(greeting: S) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
            observers: vec![],
        }
    }

    /// Returns all messages in the order they were appended.
    #[inline]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages, including the greeting.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn append(&mut self, message: Message) {
        let index = self.messages.len();
        self.messages.push(message);
        let message = &self.messages[index];
        for observer in &mut self.observers {
            observer(message, index);
        }
    }

    pub(crate) fn subscribe(
        &mut self,
        observer: impl FnMut(&Message, usize) + Send + 'static,
    ) {
        self.observers.push(Box::new(observer));
    }
}

impl Debug for Transcript {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript")
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .finish()
    }
}
