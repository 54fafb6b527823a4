//! Constrained random assignment
//!
//! Turns a validated [`Roster`](crate::roster::Roster) into an
//! [`Assignment`]: a permutation of the participants where nobody draws
//! themself or anyone they excluded.
//!
//! ## Example
//!
//! ```rust,ignore
//! use santa_core::draw::DrawEngine;
//! use santa_core::roster::Roster;
//!
//! let roster = Roster::load("people.json")?;
//! let assignment = DrawEngine::new().draw(&roster)?;
//! assignment.verify(&roster)?;
//! ```

mod assignment;
mod engine;

pub use assignment::{Assignment, Pair};
pub use engine::{DEFAULT_MAX_ATTEMPTS, DrawEngine};
