//! LLM-as-judge scoring and run critique.
//!
//! Scoring is total: a malformed response or a failed service call yields
//! the neutral default instead of an error, and the final value is always
//! clamped to the valid range.

use std::sync::Arc;

use serde::Serialize;

use crate::llm::TextGenerator;
use crate::prompts;
use crate::state::RemixState;
use crate::trace::TraceSink;

pub const SCORE_MIN: f32 = 1.0;
pub const SCORE_MAX: f32 = 5.0;
pub const SCORE_DEFAULT: f32 = 3.0;

/// Characters of scored content kept in the Eval trace snapshot.
const SNIPPET_CHARS: usize = 80;

/// Parse a `Score: <number>` response into a clamped score.
///
/// Takes the first non-empty line; if it mentions "score", the first
/// whitespace-delimited token after the first colon is parsed as a number.
/// Any miss yields [`SCORE_DEFAULT`]; the result is always in
/// `[SCORE_MIN, SCORE_MAX]`.
pub fn parse_score(response: &str) -> f32 {
    first_line_score(response)
        .unwrap_or(SCORE_DEFAULT)
        .clamp(SCORE_MIN, SCORE_MAX)
}

fn first_line_score(response: &str) -> Option<f32> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty())?;
    if !line.to_lowercase().contains("score") {
        return None;
    }
    let (_, rest) = line.split_once(':')?;
    let token = rest.split_whitespace().next()?;
    // "NaN" and "inf" parse as f32; only finite values count as scores.
    token.parse().ok().filter(|v: &f32| v.is_finite())
}

/// Critique of a whole run, returned beside the pipeline state.
#[derive(Debug, Clone, Serialize)]
pub struct Critique {
    /// Free-text review of the trajectory.
    pub critique: String,

    /// Coherence/resonance score of the joined branches, in [1, 5].
    pub overall: f32,
}

/// Reusable scoring primitive over a text-generation collaborator.
pub struct Judge {
    generator: Arc<dyn TextGenerator>,
    trace: Arc<dyn TraceSink>,
}

impl Judge {
    pub fn new(generator: Arc<dyn TextGenerator>, trace: Arc<dyn TraceSink>) -> Self {
        Self { generator, trace }
    }

    /// Score content on the given criteria.
    ///
    /// Never fails its caller: a service failure records an `EvalError`
    /// checkpoint and returns the neutral default.
    pub async fn score(&self, content: &str, criteria: &str) -> f32 {
        let prompt = prompts::judge_prompt(content, criteria);

        let response = match self.generator.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "judge generation failed");
                self.trace.record(
                    "EvalError",
                    serde_json::json!({ "error": e.to_string() }),
                );
                return SCORE_DEFAULT;
            }
        };

        let score = parse_score(&response);
        self.trace.record(
            "Eval",
            serde_json::json!({
                "score": score,
                "snippet": content.chars().take(SNIPPET_CHARS).collect::<String>(),
            }),
        );
        score
    }

    /// Critic pass over a finished run.
    ///
    /// A failed critique generation substitutes the failure description
    /// rather than propagating; the overall score comes from scoring the
    /// blank-line-joined branches.
    pub async fn review_run(&self, state: &RemixState) -> Critique {
        let state_json =
            serde_json::to_string_pretty(state).unwrap_or_else(|_| "{}".to_string());

        let critique = match self.generator.generate(&prompts::critic_prompt(&state_json)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "critic generation failed");
                format!("Critic model error: {e}")
            }
        };

        let combined = state.branches.join("\n\n");
        let overall = self.score(&combined, "coherence, resonance").await;

        Critique { critique, overall }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;
    use crate::trace::RecordingTrace;

    #[test]
    fn test_parse_score_vectors() {
        assert_eq!(parse_score("Score: 4"), 4.0);
        assert_eq!(parse_score("Score: 4.0 great job"), 4.0);
        assert_eq!(parse_score("SCORE:2"), 2.0);
        assert_eq!(parse_score("garbled"), 3.0);
    }

    #[test]
    fn test_parse_score_clamps() {
        assert_eq!(parse_score("Score: -3"), 1.0);
        assert_eq!(parse_score("Score: 9.5"), 5.0);
    }

    #[test]
    fn test_parse_score_edge_lines() {
        // Leading blank lines are skipped.
        assert_eq!(parse_score("\n\n  Score: 2.5 decent\nmore"), 2.5);
        // "score" without a colon or with a non-numeric token defaults.
        assert_eq!(parse_score("score"), 3.0);
        assert_eq!(parse_score("Score: great"), 3.0);
        assert_eq!(parse_score(""), 3.0);
        // Non-finite tokens parse as f32 but are not scores.
        assert_eq!(parse_score("Score: NaN"), 3.0);
        assert_eq!(parse_score("Score: inf"), 3.0);
        assert_eq!(parse_score("Score: -inf"), 3.0);
    }

    #[tokio::test]
    async fn test_score_records_eval_checkpoint() {
        let generator = Arc::new(MockGenerator::new().with_default("Score: 4 tight prose"));
        let trace = Arc::new(RecordingTrace::new());
        let judge = Judge::new(generator, trace.clone());

        let score = judge.score("a branch text", "emotional resonance").await;
        assert_eq!(score, 4.0);
        assert_eq!(trace.checkpoints(), vec!["Eval"]);
        assert_eq!(trace.entries()[0].1["snippet"], "a branch text");
    }

    #[tokio::test]
    async fn test_score_survives_service_failure() {
        let generator = Arc::new(MockGenerator::new().fail_on("Judge"));
        let trace = Arc::new(RecordingTrace::new());
        let judge = Judge::new(generator, trace.clone());

        let score = judge.score("whatever", "coherence, resonance").await;
        assert_eq!(score, SCORE_DEFAULT);
        assert_eq!(trace.checkpoints(), vec!["EvalError"]);
    }

    #[tokio::test]
    async fn test_review_run_degrades_critique() {
        let generator = Arc::new(
            MockGenerator::new()
                .with_default("Score: 5 seamless")
                .fail_on("critic agent"),
        );
        let trace = Arc::new(RecordingTrace::new());
        let judge = Judge::new(generator, trace);

        let mut state = RemixState::new("a door", "u1", "dark");
        state.branches = vec!["one".to_string(), "two".to_string()];

        let critique = judge.review_run(&state).await;
        assert!(critique.critique.contains("Critic model error"));
        assert_eq!(critique.overall, 5.0);
    }
}
