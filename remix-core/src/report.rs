//! Run artifacts: JSON state dump and plain-text transcript.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use crate::judge::Critique;
use crate::state::RemixState;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub json: PathBuf,
    pub transcript: PathBuf,
}

/// Render the human-readable transcript of a finished run.
pub fn render_transcript(state: &RemixState, critique: &Critique) -> String {
    let mut out = String::from("=== Remixed Branches ===\n\n");
    for (i, branch) in state.branches.iter().enumerate() {
        out.push_str(&format!("Branch {}:\n{branch}\n\n", i + 1));
    }
    out.push_str("=== Critique ===\n");
    out.push_str(&critique.critique);
    out.push('\n');
    out
}

/// Write the JSON state dump and transcript under `dir`.
///
/// File names derive from the sanitized user id, so one user's artifacts
/// overwrite their previous run and never escape the directory.
pub async fn save_artifacts(
    dir: impl AsRef<Path>,
    state: &RemixState,
    critique: &Critique,
) -> Result<Artifacts, ReportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;

    let stem: String = state
        .user_id
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    let json = dir.join(format!("{stem}_remix.json"));
    fs::write(&json, serde_json::to_string_pretty(state)?).await?;

    let transcript = dir.join(format!("{stem}_remix.txt"));
    fs::write(&transcript, render_transcript(state, critique)).await?;

    Ok(Artifacts { json, transcript })
}
