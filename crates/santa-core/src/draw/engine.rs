//! Rejection-sampling draw engine
//!
//! Every candidate is a uniform shuffle of the receiver pool paired
//! positionally with the givers, so each candidate is already a bijection.
//! Only self-assignment and exclusions need checking; a candidate failing
//! either is thrown away and the pool is reshuffled.

use rand::prelude::*;
use tracing::{debug, info};

use super::assignment::{Assignment, Pair};
use crate::error::{Error, Result};
use crate::roster::Roster;

/// Default number of shuffles before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Draws assignments from a roster
#[derive(Debug)]
pub struct DrawEngine<R = StdRng> {
    rng: R,
    max_attempts: usize,
}

impl Default for DrawEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawEngine<StdRng> {
    /// Create an engine seeded from system entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create an engine with a fixed seed (reproducible draws)
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DrawEngine<R> {
    /// Create an engine around any random source
    pub fn from_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the retry bound (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Draw one valid assignment
    ///
    /// Fails with [`Error::ConstraintUnsatisfiable`] when the roster is
    /// obviously infeasible or no valid shuffle turned up within the retry
    /// bound.
    pub fn draw(&mut self, roster: &Roster) -> Result<Assignment> {
        check_feasible(roster)?;

        let givers: Vec<&str> = roster.names().collect();
        let mut pool = givers.clone();

        for attempt in 1..=self.max_attempts {
            pool.shuffle(&mut self.rng);

            let valid = givers
                .iter()
                .zip(&pool)
                .all(|(giver, receiver)| roster.allows(giver, receiver));

            if valid {
                info!(
                    attempts = attempt,
                    participants = givers.len(),
                    "Draw complete"
                );
                let pairs = givers
                    .iter()
                    .zip(&pool)
                    .map(|(giver, receiver)| Pair {
                        giver: (*giver).to_string(),
                        receiver: (*receiver).to_string(),
                    })
                    .collect();
                return Ok(Assignment::from_pairs(pairs));
            }

            if attempt % 1000 == 0 {
                debug!(attempts = attempt, "Still searching for a valid draw");
            }
        }

        Err(Error::ConstraintUnsatisfiable(format!(
            "no valid draw in {} attempts; the exclusions may be too tight",
            self.max_attempts
        )))
    }
}

/// Reject rosters that no shuffle could ever satisfy
///
/// Catches the common dead ends cheaply: fewer than two people, someone who
/// may buy for nobody, and someone nobody may buy for.
fn check_feasible(roster: &Roster) -> Result<()> {
    if roster.len() < 2 {
        return Err(Error::ConstraintUnsatisfiable(format!(
            "a draw needs at least 2 participants, got {}",
            roster.len()
        )));
    }

    for participant in roster.participants() {
        if !roster.names().any(|receiver| participant.may_give_to(receiver)) {
            return Err(Error::ConstraintUnsatisfiable(format!(
                "'{}' excludes everyone else",
                participant.name
            )));
        }
        if !roster
            .participants()
            .iter()
            .any(|giver| giver.may_give_to(&participant.name))
        {
            return Err(Error::ConstraintUnsatisfiable(format!(
                "nobody is allowed to buy for '{}'",
                participant.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;

    fn roster(participants: Vec<Participant>) -> Roster {
        Roster::new(participants).unwrap()
    }

    fn plain(names: &[&str]) -> Roster {
        roster(names.iter().map(|n| Participant::new(*n)).collect())
    }

    fn as_tuples(assignment: &Assignment) -> Vec<(&str, &str)> {
        assignment
            .pairs()
            .iter()
            .map(|p| (p.giver.as_str(), p.receiver.as_str()))
            .collect()
    }

    #[test]
    fn test_two_people_swap() {
        let roster = plain(&["A", "B"]);
        for seed in 0..20 {
            let assignment = DrawEngine::with_seed(seed).draw(&roster).unwrap();
            assert_eq!(as_tuples(&assignment), vec![("A", "B"), ("B", "A")]);
        }
    }

    #[test]
    fn test_three_people_only_cycles() {
        let roster = plain(&["A", "B", "C"]);
        let forward = vec![("A", "B"), ("B", "C"), ("C", "A")];
        let backward = vec![("A", "C"), ("B", "A"), ("C", "B")];

        let mut seen_forward = false;
        let mut seen_backward = false;
        for seed in 0..200 {
            let assignment = DrawEngine::with_seed(seed).draw(&roster).unwrap();
            let tuples = as_tuples(&assignment);
            if tuples == forward {
                seen_forward = true;
            } else if tuples == backward {
                seen_backward = true;
            } else {
                panic!("unexpected draw: {tuples:?}");
            }
        }
        assert!(seen_forward && seen_backward);
    }

    #[test]
    fn test_single_participant_fails() {
        let err = DrawEngine::with_seed(1).draw(&plain(&["A"])).unwrap_err();
        assert!(matches!(err, Error::ConstraintUnsatisfiable(_)));
    }

    #[test]
    fn test_empty_roster_fails() {
        let err = DrawEngine::with_seed(1).draw(&plain(&[])).unwrap_err();
        assert!(matches!(err, Error::ConstraintUnsatisfiable(_)));
    }

    #[test]
    fn test_excluding_everyone_fails() {
        let roster = roster(vec![
            Participant::new("A").excluding(["B", "C"]),
            Participant::new("B"),
            Participant::new("C"),
        ]);
        let err = DrawEngine::with_seed(1).draw(&roster).unwrap_err();
        assert!(err.to_string().contains("'A' excludes everyone else"));
    }

    #[test]
    fn test_nobody_may_buy_for_fails() {
        let roster = roster(vec![
            Participant::new("A").excluding(["C"]),
            Participant::new("B").excluding(["C"]),
            Participant::new("C"),
        ]);
        let err = DrawEngine::with_seed(1).draw(&roster).unwrap_err();
        assert!(err.to_string().contains("nobody is allowed to buy for 'C'"));
    }

    #[test]
    fn test_conflicting_exclusions_exhaust_attempts() {
        // A and B can each only buy for C
        let roster = roster(vec![
            Participant::new("A").excluding(["B"]),
            Participant::new("B").excluding(["A"]),
            Participant::new("C"),
        ]);
        let err = DrawEngine::with_seed(7)
            .with_max_attempts(500)
            .draw(&roster)
            .unwrap_err();
        match err {
            Error::ConstraintUnsatisfiable(msg) => assert!(msg.contains("500 attempts")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rotating_exclusions_force_single_cycle() {
        let roster = roster(vec![
            Participant::new("A").excluding(["B"]),
            Participant::new("B").excluding(["C"]),
            Participant::new("C").excluding(["A"]),
        ]);
        let assignment = DrawEngine::with_seed(3).draw(&roster).unwrap();
        assert_eq!(
            as_tuples(&assignment),
            vec![("A", "C"), ("B", "A"), ("C", "B")]
        );
    }

    #[test]
    fn test_draw_respects_exclusions() {
        let roster = roster(vec![
            Participant::new("Ann").excluding(["Bob"]),
            Participant::new("Bob").excluding(["Ann"]),
            Participant::new("Cat").excluding(["Dan"]),
            Participant::new("Dan").excluding(["Cat"]),
            Participant::new("Eve"),
            Participant::new("Fay").excluding(["Eve"]),
        ]);
        for seed in 0..100 {
            let assignment = DrawEngine::with_seed(seed).draw(&roster).unwrap();
            assignment.verify(&roster).unwrap();
        }
    }

    #[test]
    fn test_same_seed_same_draw() {
        let roster = plain(&["A", "B", "C", "D", "E", "F"]);
        let first = DrawEngine::with_seed(42).draw(&roster).unwrap();
        let second = DrawEngine::with_seed(42).draw(&roster).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_attempts_floor() {
        let engine = DrawEngine::with_seed(0).with_max_attempts(0);
        assert_eq!(engine.max_attempts(), 1);
    }
}
