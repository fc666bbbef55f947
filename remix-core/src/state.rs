//! The state record threaded through the pipeline stages.

use serde::{Deserialize, Serialize};

use crate::memory::MemoryProfile;

/// Narrative style used when the caller does not supply one.
pub const DEFAULT_STYLE: &str = "whimsical";

/// Tone used when no memory profile has been injected.
pub const DEFAULT_TONE: &str = "neutral";

/// The mutable record passed through the pipeline.
///
/// Each field has exactly one writer: `prompt`, `user_id`, and `style` are
/// set at construction; Ideation fills `memory`, `context_summary`, and
/// `core_idea`; Branching fills `branches`. Evaluation may replace
/// individual branch elements in place but never changes the branch count,
/// and no stage removes a field another stage has set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemixState {
    /// User's story prompt.
    pub prompt: String,

    /// Identity key for memory and artifacts.
    pub user_id: String,

    /// Tone hint (e.g. "whimsical", "dark", "epic").
    pub style: String,

    /// Profile injected from the memory store; read-only downstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryProfile>,

    /// Rolling summary of recent runs, informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_summary: Option<String>,

    /// The core surreal story written by Ideation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_idea: Option<String>,

    /// Alternate full story variants written by Branching.
    #[serde(default)]
    pub branches: Vec<String>,
}

impl RemixState {
    /// Create the initial state for a run. An empty style falls back to
    /// [`DEFAULT_STYLE`].
    pub fn new(
        prompt: impl Into<String>,
        user_id: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        let style = style.into();
        Self {
            prompt: prompt.into(),
            user_id: user_id.into(),
            style: if style.is_empty() {
                DEFAULT_STYLE.to_string()
            } else {
                style
            },
            memory: None,
            context_summary: None,
            core_idea: None,
            branches: Vec::new(),
        }
    }

    /// Tone resolved from the injected memory profile.
    pub fn tone(&self) -> &str {
        self.memory
            .as_ref()
            .map(|profile| profile.tone.as_str())
            .unwrap_or(DEFAULT_TONE)
    }
}
