//! Participant loading and validation
//!
//! The participant list is a JSON array in the historical format:
//!
//! ```json
//! [{"name": "Ann", "not_allowed": ["Bob"], "email": "ann@example.com"}]
//! ```
//!
//! A [`Roster`] is only ever built from a list that passed validation, so
//! the draw can assume unique names and exclusions that point at real people.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A single person taking part in the draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique display name, used as both giver and receiver key
    pub name: String,
    /// Names this person must not buy a gift for
    #[serde(default, rename = "not_allowed", alias = "excluded")]
    pub excluded: BTreeSet<String>,
    /// Delivery address; `None` means file output only
    #[serde(default, rename = "email", alias = "contact")]
    pub contact: Option<String>,
}

impl Participant {
    /// Create a participant with no exclusions and no contact
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            excluded: BTreeSet::new(),
            contact: None,
        }
    }

    /// Add names this participant may not draw
    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the delivery address
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Whether this participant may buy for `receiver`
    ///
    /// Self-assignment is always forbidden, listed or not.
    pub fn may_give_to(&self, receiver: &str) -> bool {
        receiver != self.name && !self.excluded.contains(receiver)
    }
}

/// Validated, ordered participant list
#[derive(Debug, Clone)]
pub struct Roster {
    participants: Vec<Participant>,
    index: HashMap<String, usize>,
}

impl Roster {
    /// Validate participants and build a roster
    ///
    /// Rejects blank names, duplicate names, and exclusions naming someone
    /// who is not in the list. Blank contacts are normalised to `None`.
    pub fn new(participants: Vec<Participant>) -> Result<Self> {
        let mut index = HashMap::with_capacity(participants.len());
        let mut normalized = Vec::with_capacity(participants.len());

        for (position, mut participant) in participants.into_iter().enumerate() {
            if participant.name.trim().is_empty() {
                return Err(Error::MalformedInput(format!(
                    "participant #{} has an empty name",
                    position + 1
                )));
            }
            if index.insert(participant.name.clone(), position).is_some() {
                return Err(Error::DuplicateParticipant(participant.name));
            }
            participant.contact = participant
                .contact
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            normalized.push(participant);
        }

        for participant in &normalized {
            if let Some(unknown) = participant
                .excluded
                .iter()
                .find(|name| !index.contains_key(name.as_str()))
            {
                return Err(Error::UnknownParticipantReference {
                    participant: participant.name.clone(),
                    reference: unknown.clone(),
                });
            }
            debug!(
                name = %participant.name,
                excluded = participant.excluded.len(),
                has_contact = participant.contact.is_some(),
                "Loaded participant"
            );
        }

        Ok(Self {
            participants: normalized,
            index,
        })
    }

    /// Parse and validate a JSON participant list
    pub fn from_json(json: &str) -> Result<Self> {
        let participants: Vec<Participant> =
            serde_json::from_str(json).map_err(|e| Error::MalformedInput(e.to_string()))?;
        Self::new(participants)
    }

    /// Read, parse and validate the participant list at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let roster = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            participants = roster.len(),
            "Participant list loaded"
        );
        Ok(roster)
    }

    /// Participants in list order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by name
    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.index.get(name).map(|&i| &self.participants[i])
    }

    /// Names in list order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.participants.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Whether `giver` may be assigned `receiver`
    ///
    /// Unknown givers are never allowed anything.
    pub fn allows(&self, giver: &str, receiver: &str) -> bool {
        self.get(giver).is_some_and(|p| p.may_give_to(receiver))
    }
}
