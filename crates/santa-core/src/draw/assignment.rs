//! The result of a draw

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::roster::Roster;

/// One giver/receiver pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub giver: String,
    pub receiver: String,
}

/// A complete giver → receiver mapping
///
/// Pairs are kept in roster order. There is deliberately no `Display` or
/// `Serialize` impl: the whole mapping is never meant to be shown to anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pairs: Vec<Pair>,
}

impl Assignment {
    pub(crate) fn from_pairs(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    /// Pairs in roster order
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Receiver drawn by `giver`, if `giver` took part
    pub fn receiver_for(&self, giver: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.giver == giver)
            .map(|p| p.receiver.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Check every invariant of a finished draw against `roster`
    ///
    /// Every participant gives exactly once and receives exactly once, nobody
    /// draws themself, and no pair is excluded.
    pub fn verify(&self, roster: &Roster) -> Result<()> {
        if self.pairs.len() != roster.len() {
            return Err(Error::ConstraintUnsatisfiable(format!(
                "{} pairs for {} participants",
                self.pairs.len(),
                roster.len()
            )));
        }

        let mut givers = HashSet::with_capacity(self.pairs.len());
        let mut receivers = HashSet::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            if roster.get(&pair.giver).is_none() || roster.get(&pair.receiver).is_none() {
                return Err(Error::ConstraintUnsatisfiable(format!(
                    "pair {} -> {} names someone outside the list",
                    pair.giver, pair.receiver
                )));
            }
            if !givers.insert(pair.giver.as_str()) {
                return Err(Error::ConstraintUnsatisfiable(format!(
                    "'{}' gives more than once",
                    pair.giver
                )));
            }
            if !receivers.insert(pair.receiver.as_str()) {
                return Err(Error::ConstraintUnsatisfiable(format!(
                    "'{}' receives more than once",
                    pair.receiver
                )));
            }
            if !roster.allows(&pair.giver, &pair.receiver) {
                return Err(Error::ConstraintUnsatisfiable(format!(
                    "'{}' may not buy for '{}'",
                    pair.giver, pair.receiver
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;

    fn pair(giver: &str, receiver: &str) -> Pair {
        Pair {
            giver: giver.to_string(),
            receiver: receiver.to_string(),
        }
    }

    fn abc() -> Roster {
        Roster::new(vec![
            Participant::new("A"),
            Participant::new("B").excluding(["A"]),
            Participant::new("C"),
        ])
        .unwrap()
    }

    #[test]
    fn test_receiver_for() {
        let assignment =
            Assignment::from_pairs(vec![pair("A", "B"), pair("B", "C"), pair("C", "A")]);
        assert_eq!(assignment.receiver_for("B"), Some("C"));
        assert_eq!(assignment.receiver_for("Z"), None);
        assert_eq!(assignment.len(), 3);
    }

    #[test]
    fn test_verify_accepts_valid_cycle() {
        let assignment =
            Assignment::from_pairs(vec![pair("A", "B"), pair("B", "C"), pair("C", "A")]);
        assert!(assignment.verify(&abc()).is_ok());
    }

    #[test]
    fn test_verify_rejects_self_assignment() {
        let assignment =
            Assignment::from_pairs(vec![pair("A", "A"), pair("B", "C"), pair("C", "B")]);
        assert!(assignment.verify(&abc()).is_err());
    }

    #[test]
    fn test_verify_rejects_exclusion() {
        let assignment =
            Assignment::from_pairs(vec![pair("A", "C"), pair("B", "A"), pair("C", "B")]);
        let err = assignment.verify(&abc()).unwrap_err();
        assert!(err.to_string().contains("'B' may not buy for 'A'"));
    }

    #[test]
    fn test_verify_rejects_double_receiver() {
        let assignment =
            Assignment::from_pairs(vec![pair("A", "B"), pair("B", "C"), pair("C", "B")]);
        let err = assignment.verify(&abc()).unwrap_err();
        assert!(err.to_string().contains("receives more than once"));
    }

    #[test]
    fn test_verify_rejects_missing_pair() {
        let assignment = Assignment::from_pairs(vec![pair("A", "B"), pair("B", "C")]);
        assert!(assignment.verify(&abc()).is_err());
    }
}
