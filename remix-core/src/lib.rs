//! Surreal story remix pipeline with per-user long-term memory.
//!
//! This crate provides:
//! - A staged generation pipeline (ideation, branching, evaluation)
//! - A bounded, file-backed memory store that survives corruption
//! - An LLM judge for scoring branches and critiquing whole runs
//! - Run artifacts (JSON state dump + plain-text transcript)
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use remix_core::{
//!     GeminiGenerator, Judge, LogTrace, Pipeline, PipelineConfig, RemixState, SerpApiFacts,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = Arc::new(GeminiGenerator::from_env()?);
//!     let trace = Arc::new(LogTrace);
//!     let pipeline = Pipeline::new(
//!         generator.clone(),
//!         Arc::new(SerpApiFacts::from_env()),
//!         trace.clone(),
//!         PipelineConfig::default(),
//!     );
//!
//!     let mut state = RemixState::new("a door that leads nowhere", "u1", "dark");
//!     pipeline.run(&mut state).await?;
//!
//!     let critique = Judge::new(generator, trace).review_run(&state).await;
//!     println!("{}", critique.critique);
//!     Ok(())
//! }
//! ```

pub mod judge;
pub mod llm;
pub mod memory;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod state;
pub mod testing;
pub mod tools;
pub mod trace;

// Primary public API
pub use judge::{parse_score, Critique, Judge};
pub use llm::{GeminiGenerator, GenerateError, TextGenerator};
pub use memory::{DreamBank, MemoryProfile, MemoryRecord};
pub use pipeline::{Pipeline, PipelineConfig, RemixError, Stage};
pub use report::{render_transcript, save_artifacts, Artifacts};
pub use state::RemixState;
pub use testing::{MockGenerator, StaticFacts};
pub use tools::{branch_concepts, FactLookup, FactSource, FactStatus, SerpApiFacts};
pub use trace::{LogTrace, RecordingTrace, TraceSink};
