//! The draw command: load, draw, notify
//!
//! Stages run strictly in order. Anything that fails while loading or
//! drawing aborts before a single letter goes out; delivery failures are
//! collected per participant in the returned report.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::draw::DrawEngine;
use crate::error::Result;
use crate::notify::{DeliveryReport, FileNotifier, Letter, MailNotifier, Notifier, notify_all};
use crate::roster::Roster;
use crate::template::MessageTemplate;

/// Inputs and overrides for a draw run
#[derive(Debug, Clone)]
pub struct DrawOptions {
    /// Participant list (JSON)
    pub list: PathBuf,
    /// Letter template
    pub message: PathBuf,
    /// Also deliver by email
    pub send_email: bool,
    /// Overrides `output.dir`
    pub output_dir: Option<PathBuf>,
    /// Fixed seed for a reproducible draw
    pub seed: Option<u64>,
    /// Overrides `draw.max_attempts`
    pub max_attempts: Option<usize>,
}

impl DrawOptions {
    pub fn new(list: impl Into<PathBuf>, message: impl Into<PathBuf>) -> Self {
        Self {
            list: list.into(),
            message: message.into(),
            send_email: false,
            output_dir: None,
            seed: None,
            max_attempts: None,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct DrawSummary {
    pub output_dir: PathBuf,
    pub participants: usize,
    pub emailed: bool,
    pub report: DeliveryReport,
}

/// Run a complete draw
pub async fn run(options: &DrawOptions, config: &Config) -> Result<DrawSummary> {
    let roster = Roster::load(&options.list)?;
    let template = MessageTemplate::load(&options.message)?;
    if !template.names_receiver() {
        warn!(
            path = %options.message.display(),
            "Template has no '*' marker; letters will not name the receiver"
        );
    }
    let letter = Letter::new(template, config.mail.subject.clone());

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.dir.clone());
    let notifiers = build_notifiers(&roster, &output_dir, options.send_email, config)?;

    let mut engine = match options.seed {
        Some(seed) => DrawEngine::with_seed(seed),
        None => DrawEngine::new(),
    }
    .with_max_attempts(options.max_attempts.unwrap_or(config.draw.max_attempts));

    let assignment = engine.draw(&roster)?;
    assignment.verify(&roster)?;

    info!(
        participants = roster.len(),
        output_dir = %output_dir.display(),
        email = options.send_email,
        "Notifying participants"
    );
    let report = notify_all(&assignment, &roster, &letter, &notifiers).await;

    Ok(DrawSummary {
        output_dir,
        participants: roster.len(),
        emailed: options.send_email,
        report,
    })
}

fn build_notifiers(
    roster: &Roster,
    output_dir: &Path,
    send_email: bool,
    config: &Config,
) -> Result<Vec<Box<dyn Notifier>>> {
    let files = FileNotifier::new(output_dir);
    files.check_distinct_paths(roster)?;

    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(files)];

    if send_email {
        notifiers.push(Box::new(MailNotifier::from_config(&config.mail)?));
    }
    Ok(notifiers)
}
