//! santa core library
//!
//! This crate provides the core functionality for santa, including:
//! - Participant loading and validation
//! - Constrained random draw (rejection sampling)
//! - Letter templates
//! - Notification channels (file output, HTTP mail relay)
//! - Configuration

pub mod commands;
pub mod config;
pub mod draw;
pub mod error;
pub mod notify;
pub mod roster;
pub mod template;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::draw::{Assignment, DrawEngine};
    pub use crate::error::{Error, Result};
    pub use crate::roster::{Participant, Roster};
}
