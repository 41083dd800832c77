//! A terminal client for the job description bias analyzer.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to drive the same conversation from your own front
//! end.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod config;
#[cfg(feature = "cli")]
pub mod frontend;
mod session;

pub use config::{AppConfig, ConfigError};
pub use session::{
    FAILURE_MESSAGE, GREETING, PLACEHOLDER, SUBTITLE, Session, SessionBuilder,
    TITLE,
};

/// Re-exports of [`jdbias_core`] crate.
pub mod core {
    pub use jdbias_core::*;
}
