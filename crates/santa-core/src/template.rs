//! Letter template
//!
//! `^` is replaced by the giver's name and `*` by the receiver's name. A
//! template without markers is sent as-is.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Marker replaced by the giver's name
pub const GIVER_MARKER: char = '^';

/// Marker replaced by the receiver's name
pub const RECEIVER_MARKER: char = '*';

/// A loaded message template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
}

impl MessageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read a template from disk; empty files are rejected
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        if source.trim().is_empty() {
            return Err(Error::TemplateError(format!(
                "{} is empty",
                path.display()
            )));
        }
        debug!(path = %path.display(), bytes = source.len(), "Message template loaded");
        Ok(Self { source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template mentions the receiver at all
    pub fn names_receiver(&self) -> bool {
        self.source.contains(RECEIVER_MARKER)
    }

    /// Render for a single giver/receiver pair
    pub fn render(&self, giver: &str, receiver: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + giver.len() + receiver.len());
        for c in self.source.chars() {
            match c {
                GIVER_MARKER => out.push_str(giver),
                RECEIVER_MARKER => out.push_str(receiver),
                other => out.push(other),
            }
        }
        out
    }
}
