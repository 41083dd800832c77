use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service could not be reached, or the connection broke.
    Transport,
    /// The service answered with an error status.
    Server,
    /// The reply could not be understood.
    InvalidReply,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Server => write!(f, "server error"),
            ErrorKind::InvalidReply => write!(f, "invalid reply"),
            ErrorKind::Other => write!(f, "other error"),
        }
    }
}
