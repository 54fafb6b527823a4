//! Telling each giver who they drew
//!
//! A [`Notification`] is rendered from exactly one pair, and a [`Notifier`]
//! only ever sees a single notification. Nothing downstream of
//! [`notify_all`] has access to the full assignment.
//!
//! Channels:
//!
//! - **File**: one `<name>.txt` per giver under the output directory. Always
//!   written, so there is a local record even when mail is sent.
//! - **Mail**: JSON POST to an HTTP mail relay, enabled with `--email`.

mod file;
mod mail;

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use file::FileNotifier;
pub use mail::MailNotifier;

use crate::draw::Assignment;
use crate::error::{Error, Result};
use crate::roster::{Participant, Roster};
use crate::template::MessageTemplate;

/// Body and subject templates for the letter
#[derive(Debug, Clone)]
pub struct Letter {
    pub body: MessageTemplate,
    pub subject: MessageTemplate,
}

impl Letter {
    pub fn new(body: MessageTemplate, subject: impl Into<String>) -> Self {
        Self {
            body,
            subject: MessageTemplate::new(subject),
        }
    }
}

/// Everything one giver is allowed to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    giver: String,
    contact: Option<String>,
    receiver: String,
    subject: String,
    body: String,
}

impl Notification {
    /// Render the letter for a single giver
    pub fn render(giver: &Participant, receiver: &str, letter: &Letter) -> Self {
        Self {
            giver: giver.name.clone(),
            contact: giver.contact.clone(),
            receiver: receiver.to_string(),
            subject: letter.subject.render(&giver.name, receiver),
            body: letter.body.render(&giver.name, receiver),
        }
    }

    pub fn giver(&self) -> &str {
        &self.giver
    }

    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// What a notifier did with a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered to the given target (file path, address)
    Sent(String),
    /// Deliberately not delivered, with the reason
    Skipped(String),
}

/// A delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in reports
    fn channel(&self) -> &'static str;

    /// Deliver a single notification
    async fn deliver(&self, notification: &Notification) -> Result<Delivery>;
}

/// Final status of one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered(String),
    Skipped(String),
    Failed(String),
}

impl DeliveryStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of delivering to one giver over one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub giver: String,
    pub channel: &'static str,
    pub status: DeliveryStatus,
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            DeliveryStatus::Delivered(target) => {
                write!(f, "{} [{}] delivered to {}", self.giver, self.channel, target)
            }
            DeliveryStatus::Skipped(reason) => {
                write!(f, "{} [{}] skipped: {}", self.giver, self.channel, reason)
            }
            DeliveryStatus::Failed(reason) => {
                write!(f, "{} [{}] FAILED: {}", self.giver, self.channel, reason)
            }
        }
    }
}

/// Per-participant results of a notification run
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    /// Outcomes for a single channel
    pub fn for_channel<'a>(
        &'a self,
        channel: &'a str,
    ) -> impl Iterator<Item = &'a DeliveryOutcome> + 'a {
        self.outcomes.iter().filter(move |o| o.channel == channel)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    fn record(&mut self, giver: &str, channel: &'static str, status: DeliveryStatus) {
        self.outcomes.push(DeliveryOutcome {
            giver: giver.to_string(),
            channel,
            status,
        });
    }
}

/// Notify every giver over every channel
///
/// A failed delivery is recorded and the loop moves on; it never touches
/// other participants.
pub async fn notify_all(
    assignment: &Assignment,
    roster: &Roster,
    letter: &Letter,
    notifiers: &[Box<dyn Notifier>],
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for pair in assignment.pairs() {
        let Some(giver) = roster.get(&pair.giver) else {
            // Assignment and roster come from the same run
            warn!(giver = %pair.giver, "Giver missing from roster, skipping");
            continue;
        };
        let notification = Notification::render(giver, &pair.receiver, letter);

        for notifier in notifiers {
            let status = match notifier.deliver(&notification).await {
                Ok(Delivery::Sent(target)) => {
                    debug!(
                        giver = %giver.name,
                        channel = notifier.channel(),
                        "Notification delivered"
                    );
                    DeliveryStatus::Delivered(target)
                }
                Ok(Delivery::Skipped(reason)) => {
                    info!(
                        giver = %giver.name,
                        channel = notifier.channel(),
                        %reason,
                        "Notification skipped"
                    );
                    DeliveryStatus::Skipped(reason)
                }
                Err(e) => {
                    warn!(
                        giver = %giver.name,
                        channel = notifier.channel(),
                        error = %e,
                        "Notification failed"
                    );
                    DeliveryStatus::Failed(failure_reason(e))
                }
            };
            report.record(&giver.name, notifier.channel(), status);
        }
    }

    info!(
        outcomes = report.outcomes.len(),
        failures = report.failure_count(),
        "Notification run finished"
    );
    report
}

fn failure_reason(error: Error) -> String {
    match error {
        Error::DeliveryFailure { reason, .. } => reason,
        other => other.to_string(),
    }
}
