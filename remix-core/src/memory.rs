//! Per-user long-term memory with bounded compaction.
//!
//! Each user has one JSON file holding a profile (recurring themes, tone)
//! and a rolling log of timestamped session summaries. A missing or corrupt
//! file reloads as the default record, and write failures are logged and
//! dropped, so memory can never take down a run.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::state::RemixState;

/// Summary count that triggers compaction.
const COMPACT_AT: usize = 10;

/// Summaries kept after compaction, most recent first in original order.
const COMPACT_KEEP: usize = 5;

/// Maximum characters of a summary digest before truncation.
const SUMMARY_MAX_CHARS: usize = 100;

/// Number of recent summaries joined into the injected context.
const CONTEXT_SUMMARIES: usize = 3;

fn default_tone() -> String {
    "neutral".to_string()
}

/// Declarative profile attached to pipeline state on injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryProfile {
    /// Recurring themes observed across runs.
    #[serde(default)]
    pub themes: Vec<String>,

    /// Preferred narrative tone.
    #[serde(default = "default_tone")]
    pub tone: String,
}

impl Default for MemoryProfile {
    fn default() -> Self {
        Self {
            themes: Vec::new(),
            tone: default_tone(),
        }
    }
}

/// One user's persisted memory record.
///
/// `profile` and `summaries` are required keys: a file missing either is
/// structurally incomplete and reloads as the default record. Missing
/// nested profile fields default individually without discarding the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub profile: MemoryProfile,
    pub summaries: Vec<String>,
}

/// File-backed memory store for one user.
///
/// Loaded lazily per identity, mutated in memory, and flushed to disk only
/// by [`DreamBank::extract_and_store`]. Context injection never writes.
pub struct DreamBank {
    user_id: String,
    path: PathBuf,
    record: MemoryRecord,
}

impl DreamBank {
    /// Load the memory record for a user.
    ///
    /// Falls back to the default record if the file is absent, unreadable,
    /// or structurally incomplete. Loading leaves no partial state behind,
    /// so repeated loads of a corrupt file are identical.
    pub async fn load(dir: impl AsRef<Path>, user_id: &str) -> Self {
        let path = bank_path(dir, user_id);
        let record = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => MemoryRecord::default(),
        };

        Self {
            user_id: user_id.to_string(),
            path,
            record,
        }
    }

    /// The in-memory record.
    pub fn record(&self) -> &MemoryRecord {
        &self.record
    }

    /// Attach the profile and a short rolling context to pipeline state.
    ///
    /// Pure with respect to storage. The context summary joins the last
    /// three summaries with `" | "`, or is empty when fewer than three
    /// exist.
    pub fn inject_context(&self, state: &mut RemixState) {
        state.memory = Some(self.record.profile.clone());

        let summaries = &self.record.summaries;
        state.context_summary = Some(if summaries.len() >= CONTEXT_SUMMARIES {
            summaries[summaries.len() - CONTEXT_SUMMARIES..].join(" | ")
        } else {
            String::new()
        });
    }

    /// Append a bounded digest of one run and persist the record.
    ///
    /// The digest is timestamped to second precision and truncated to
    /// [`SUMMARY_MAX_CHARS`] characters. Compaction keeps the log bounded:
    /// growing past [`COMPACT_AT`] entries truncates to the most recent
    /// [`COMPACT_KEEP`], preserving relative order.
    pub async fn extract_and_store(&mut self, narrative: &str, feedback: &str) {
        let digest: String = format!("Extract key: {narrative} + feedback: {feedback}")
            .chars()
            .take(SUMMARY_MAX_CHARS)
            .collect();
        let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%S");

        self.record.summaries.push(format!("{stamp}: {digest}..."));

        if self.record.summaries.len() > COMPACT_AT {
            let excess = self.record.summaries.len() - COMPACT_KEEP;
            self.record.summaries.drain(..excess);
        }

        self.save().await;
    }

    /// Write-new-then-replace so a crash mid-write cannot corrupt the
    /// previous valid record. Failures are logged and dropped.
    async fn save(&self) {
        let content = match serde_json::to_string_pretty(&self.record) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "memory serialize failed");
                return;
            }
        };

        if let Some(dir) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(dir).await {
                tracing::warn!(user_id = %self.user_id, error = %e, "memory dir create failed");
                return;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, content).await {
            tracing::warn!(user_id = %self.user_id, error = %e, "memory write failed");
            return;
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            tracing::warn!(user_id = %self.user_id, error = %e, "memory replace failed");
        }
    }
}

/// Memory file path for a user, with non-alphanumerics sanitized.
pub fn bank_path(dir: impl AsRef<Path>, user_id: &str) -> PathBuf {
    let sanitized: String = user_id
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    dir.as_ref().join(format!("{sanitized}_dreams.json"))
}
