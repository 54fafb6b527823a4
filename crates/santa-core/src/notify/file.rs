//! File output channel

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::{Delivery, Notification, Notifier};
use crate::error::{Error, Result};
use crate::roster::Roster;

/// Writes each giver's letter to `<dir>/<name>.txt`
#[derive(Debug, Clone)]
pub struct FileNotifier {
    dir: PathBuf,
}

impl FileNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file written for `giver`
    pub fn path_for(&self, giver: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", file_stem(giver)))
    }

    /// Fail if two participants would be written to the same file
    ///
    /// Stems are compared ignoring case, since the output directory may
    /// live on a case-insensitive filesystem.
    pub fn check_distinct_paths(&self, roster: &Roster) -> Result<()> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        for name in roster.names() {
            let stem = file_stem(name);
            if let Some(other) = seen.insert(stem.to_lowercase(), name) {
                return Err(Error::MalformedInput(format!(
                    "'{other}' and '{name}' would both be written to {stem}.txt; rename one of them"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    fn channel(&self) -> &'static str {
        "file"
    }

    async fn deliver(&self, notification: &Notification) -> Result<Delivery> {
        let path = self.path_for(notification.giver());

        let written = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, notification.body()).await
        }
        .await;

        written.map_err(|e| Error::DeliveryFailure {
            participant: notification.giver().to_string(),
            reason: format!("could not write {}: {}", path.display(), e),
        })?;

        info!(path = %path.display(), "Letter written");
        Ok(Delivery::Sent(path.display().to_string()))
    }
}

/// Turn a display name into a safe file stem
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => "_".repeat(stem.len().max(1)),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Letter;
    use crate::roster::Participant;
    use crate::template::MessageTemplate;
    use tempfile::TempDir;

    fn plain(names: &[&str]) -> Roster {
        Roster::new(names.iter().map(|n| Participant::new(*n)).collect()).unwrap()
    }

    fn notification(giver: &str, receiver: &str) -> Notification {
        let letter = Letter::new(MessageTemplate::new("Hi ^, you drew *."), "Santa");
        Notification::render(&Participant::new(giver), receiver, &letter)
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Ann"), "Ann");
        assert_eq!(file_stem("Ann Marie"), "Ann Marie");
        assert_eq!(file_stem("../etc/passwd"), ".._etc_passwd");
        assert_eq!(file_stem(".."), "__");
        assert_eq!(file_stem("a:b*c"), "a_b_c");
    }

    #[tokio::test]
    async fn test_writes_only_own_letter() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let notifier = FileNotifier::new(&out);

        let delivery = notifier.deliver(&notification("Ann", "Bob")).await.unwrap();

        let path = out.join("Ann.txt");
        assert_eq!(delivery, Delivery::Sent(path.display().to_string()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Hi Ann, you drew Bob."
        );
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_delivery_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let notifier = FileNotifier::new(blocker.join("out"));
        let err = notifier
            .deliver(&notification("Ann", "Bob"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DeliveryFailure { participant, .. } if participant == "Ann"));
    }

    #[test]
    fn test_distinct_paths_accepted() {
        let notifier = FileNotifier::new("out");
        notifier
            .check_distinct_paths(&plain(&["Ann", "Ann Marie", "Bob"]))
            .unwrap();
    }

    #[test]
    fn test_sanitised_name_clash_rejected() {
        let notifier = FileNotifier::new("out");

        for names in [
            ["Ann*", "Ann?"],
            [" Ann", "Ann"],
            ["_", "."],
            ["ann", "ANN"],
        ] {
            let err = notifier.check_distinct_paths(&plain(&names)).unwrap_err();
            assert!(matches!(err, Error::MalformedInput(_)), "{names:?}: {err}");
        }

        let err = notifier
            .check_distinct_paths(&plain(&["Ann*", "Bob", "Ann?"]))
            .unwrap_err();
        assert!(err.to_string().contains("'Ann*' and 'Ann?'"));
        assert!(err.to_string().contains("Ann_.txt"));
    }
}
