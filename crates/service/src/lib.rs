//! The contract between the conversation controller and the remote
//! analysis service.
//!
//! The controller only ever needs one round trip: send the submitted text
//! together with the conversation it belongs to, and get back the reply
//! text and the conversation identifier the service is tracking. Anything
//! beyond that (transport, wire format, timeouts) is up to the
//! implementors of [`AnalysisService`].
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod reply;
mod request;

pub use error::*;
pub use provider::*;
pub use reply::*;
pub use request::*;
