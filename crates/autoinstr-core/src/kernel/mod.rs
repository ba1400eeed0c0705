//! # Kernel
//!
//! Process-level pieces shared by every subsystem: the one-shot
//! [`initialize`](bootstrap::initialize) entry point, constants, and the
//! crate-wide [`Error`](error::Error) with its `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{initialize, InitializeOptions};
pub use error::{Error, Result};
