//! The staged remix pipeline.
//!
//! A run walks a fixed stage order: Ideation writes the core story,
//! Branching writes alternate versions, Evaluation scores each branch and
//! refines the weak ones. Generation failures abort the run; memory and
//! fact lookups only ever degrade it.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::llm::{GenerateError, TextGenerator};
use crate::memory::DreamBank;
use crate::prompts;
use crate::state::RemixState;
use crate::tools::{branch_concepts, FactSource};
use crate::trace::TraceSink;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum RemixError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerateError),
}

/// Knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Alternate versions to write during Branching.
    pub branch_count: usize,

    /// Skip the fact lookup, leaving a resume key in the trace.
    pub pause_facts: bool,

    /// Directory holding per-user memory files.
    pub memory_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            branch_count: 2,
            pause_facts: false,
            memory_dir: PathBuf::from("memory"),
        }
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ideation,
    Branching,
    Evaluation,
    Done,
}

impl Stage {
    fn next(self) -> Self {
        match self {
            Self::Ideation => Self::Branching,
            Self::Branching => Self::Evaluation,
            Self::Evaluation => Self::Done,
            Self::Done => Self::Done,
        }
    }
}

/// Drives a [`RemixState`] through the stages.
pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    facts: Arc<dyn FactSource>,
    trace: Arc<dyn TraceSink>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        facts: Arc<dyn FactSource>,
        trace: Arc<dyn TraceSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            facts,
            trace,
            config,
        }
    }

    /// Run every stage to completion, mutating `state` in place.
    ///
    /// The prompt and user id must be non-empty; an empty one fails before
    /// any stage runs or any external call is made.
    pub async fn run(&self, state: &mut RemixState) -> Result<(), RemixError> {
        if state.prompt.trim().is_empty() {
            return Err(RemixError::MissingField("prompt"));
        }
        if state.user_id.trim().is_empty() {
            return Err(RemixError::MissingField("user_id"));
        }

        self.trace.record(
            "Start",
            serde_json::json!({
                "prompt": state.prompt,
                "user_id": state.user_id,
                "style": state.style,
            }),
        );

        let mut stage = Stage::Ideation;
        while stage != Stage::Done {
            tracing::debug!(?stage, "entering stage");
            match stage {
                Stage::Ideation => self.ideate(state).await?,
                Stage::Branching => self.branch(state).await?,
                Stage::Evaluation => self.evaluate(state).await?,
                Stage::Done => unreachable!(),
            }
            stage = stage.next();
        }

        self.trace.record(
            "End",
            serde_json::json!({
                "core_idea": state.core_idea,
                "branches": state.branches.len(),
            }),
        );
        Ok(())
    }

    /// Inject memory, gather facts, and write the core story.
    async fn ideate(&self, state: &mut RemixState) -> Result<(), RemixError> {
        let bank = DreamBank::load(&self.config.memory_dir, &state.user_id).await;
        bank.inject_context(state);

        let lookup = self
            .facts
            .lookup(&state.prompt, &state.style, self.config.pause_facts)
            .await;
        self.trace.record(
            "Facts",
            serde_json::json!({
                "status": format!("{:?}", lookup.status),
                "facts": lookup.facts.len(),
                "resume_key": lookup.resume_key,
            }),
        );

        let prompt =
            prompts::ideation_prompt(&state.prompt, &lookup.facts, state.tone(), &state.style);
        let story = self.generator.generate(&prompt).await?;

        self.trace.record(
            "Ideation",
            serde_json::json!({ "chars": story.chars().count() }),
        );
        state.core_idea = Some(story);
        Ok(())
    }

    /// Rewrite the core story once per branch concept, in order.
    async fn branch(&self, state: &mut RemixState) -> Result<(), RemixError> {
        let core_idea = state
            .core_idea
            .as_deref()
            .ok_or(RemixError::MissingField("core_idea"))?;

        let concepts = branch_concepts(core_idea, self.config.branch_count);
        let mut branches = Vec::with_capacity(concepts.len());
        for concept in &concepts {
            let prompt = prompts::branch_rewrite_prompt(core_idea, concept);
            branches.push(self.generator.generate(&prompt).await?);
        }

        self.trace.record(
            "Branching",
            serde_json::json!({ "branches": branches.len() }),
        );
        state.branches = branches;
        Ok(())
    }

    /// Score each branch and refine the ones judged weak.
    ///
    /// A refinement only fires when the raw verdict text contains a
    /// low-score marker; a branch that passes stays byte-identical.
    async fn evaluate(&self, state: &mut RemixState) -> Result<(), RemixError> {
        for i in 0..state.branches.len() {
            let verdict = self
                .generator
                .generate(&prompts::resonance_score_prompt(&state.branches[i]))
                .await?
                .to_lowercase();

            let weak = verdict.contains("score: 1") || verdict.contains("score: 2");
            self.trace.record(
                "Evaluation",
                serde_json::json!({ "branch": i, "refined": weak }),
            );

            if weak {
                let refined = self
                    .generator
                    .generate(&prompts::refine_prompt(&state.branches[i]))
                    .await?;
                state.branches[i] = refined;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerator, StaticFacts};
    use crate::trace::RecordingTrace;
    use tempfile::TempDir;

    fn pipeline(generator: MockGenerator, dir: &TempDir) -> (Pipeline, Arc<RecordingTrace>) {
        let trace = Arc::new(RecordingTrace::new());
        let config = PipelineConfig {
            memory_dir: dir.path().to_path_buf(),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(
            Arc::new(generator),
            Arc::new(StaticFacts::default()),
            trace.clone(),
            config,
        );
        (pipeline, trace)
    }

    #[tokio::test]
    async fn test_empty_prompt_fails_before_any_call() {
        let dir = TempDir::new().unwrap();
        let generator = MockGenerator::new();
        let (pipeline, trace) = pipeline(generator, &dir);

        let mut state = RemixState::new("   ", "u1", "dark");
        let err = pipeline.run(&mut state).await.unwrap_err();

        assert!(matches!(err, RemixError::MissingField("prompt")));
        assert!(trace.entries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_user_id_fails_before_any_call() {
        let dir = TempDir::new().unwrap();
        let (pipeline, trace) = pipeline(MockGenerator::new(), &dir);

        let mut state = RemixState::new("a door", "", "dark");
        let err = pipeline.run(&mut state).await.unwrap_err();

        assert!(matches!(err, RemixError::MissingField("user_id")));
        assert!(trace.entries().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let generator = MockGenerator::new().fail_on("surreal short story");
        let (pipeline, _trace) = pipeline(generator, &dir);

        let mut state = RemixState::new("a door", "u1", "dark");
        let err = pipeline.run(&mut state).await.unwrap_err();

        assert!(matches!(err, RemixError::Generation(_)));
        assert!(state.core_idea.is_none());
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Ideation.next(), Stage::Branching);
        assert_eq!(Stage::Branching.next(), Stage::Evaluation);
        assert_eq!(Stage::Evaluation.next(), Stage::Done);
        assert_eq!(Stage::Done.next(), Stage::Done);
    }
}
