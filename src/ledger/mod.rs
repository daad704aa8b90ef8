use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// History entry for one followed account. Entries are never deleted:
/// an unfollow flips `unfollowed` instead, so a later re-follow can
/// overwrite the record without losing the invariant that at most one
/// active follow exists per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowRecord {
    pub display_name: String,
    pub followed_at: DateTime<Utc>,
    pub unfollowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfollowed_at: Option<DateTime<Utc>>,
}

/// Durable map of subject id to follow history, backing unfollow
/// eligibility decisions. The whole document is rewritten on every
/// mutation; there is no batching.
pub struct FollowLedger {
    path: PathBuf,
    records: HashMap<String, FollowRecord>,
}

impl FollowLedger {
    /// Load the ledger from `path`. A missing file starts an empty ledger;
    /// a file that exists but cannot be parsed is a hard error, so a
    /// corrupted history is never silently reset.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                LedgerError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, records })
    }

    /// Record a successful follow and persist immediately.
    pub fn record_follow(
        &mut self,
        subject_id: &str,
        display_name: &str,
    ) -> Result<(), LedgerError> {
        self.records.insert(
            subject_id.to_string(),
            FollowRecord {
                display_name: display_name.to_string(),
                followed_at: Utc::now(),
                unfollowed: false,
                unfollowed_at: None,
            },
        );
        self.persist()
    }

    /// Mark a subject as unfollowed and persist. No-op for untracked ids.
    pub fn mark_unfollowed(&mut self, subject_id: &str) -> Result<(), LedgerError> {
        if let Some(record) = self.records.get_mut(subject_id) {
            record.unfollowed = true;
            record.unfollowed_at = Some(Utc::now());
            self.persist()?;
        }
        Ok(())
    }

    /// Whether `subject_id` is eligible for an unfollow: never tracked
    /// (conservative default), or followed at least `days_threshold` days
    /// ago and not already unfollowed.
    pub fn should_unfollow(&self, subject_id: &str, days_threshold: i64) -> bool {
        match self.records.get(subject_id) {
            None => true,
            Some(record) => {
                let days = (Utc::now() - record.followed_at).num_days();
                days >= days_threshold && !record.unfollowed
            }
        }
    }

    pub fn get(&self, subject_id: &str) -> Option<&FollowRecord> {
        self.records.get(subject_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.records).map_err(std::io::Error::from)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
