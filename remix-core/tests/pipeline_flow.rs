//! End-to-end pipeline runs against scripted collaborators.

use std::sync::Arc;

use remix_core::{
    MockGenerator, Pipeline, PipelineConfig, RemixState, StaticFacts, RecordingTrace,
};
use tempfile::TempDir;

fn config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        memory_dir: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn test_full_run_fills_every_stage() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(
        MockGenerator::new()
            .respond("emotional resonance", "Score: 4 solid work")
            .respond("sci-fi twist", "BRANCH-SCIFI")
            .respond("myth twist", "BRANCH-MYTH")
            .respond("surreal short story", "CORE"),
    );
    let trace = Arc::new(RecordingTrace::new());
    let pipeline = Pipeline::new(
        generator.clone(),
        Arc::new(StaticFacts::with_facts(vec!["Twist: a fact.".to_string()])),
        trace.clone(),
        config(&dir),
    );

    let mut state = RemixState::new("a door that leads nowhere", "u1", "dark");
    pipeline.run(&mut state).await.unwrap();

    assert_eq!(state.core_idea.as_deref(), Some("CORE"));
    assert_eq!(state.branches, vec!["BRANCH-SCIFI", "BRANCH-MYTH"]);
    assert_eq!(state.context_summary.as_deref(), Some(""));
    assert!(state.memory.is_some());

    let checkpoints = trace.checkpoints();
    assert_eq!(checkpoints.first().map(String::as_str), Some("Start"));
    assert_eq!(checkpoints.last().map(String::as_str), Some("End"));
    assert!(checkpoints.contains(&"Ideation".to_string()));
    assert!(checkpoints.contains(&"Branching".to_string()));

    // One scoring call per branch, no refinement calls.
    assert_eq!(generator.calls_containing("emotional resonance from 1 to 5"), 2);
    assert_eq!(generator.calls_containing("more emotionally engaging"), 0);
}

#[tokio::test]
async fn test_weak_branch_is_refined_in_place() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(
        MockGenerator::new()
            .respond("more emotionally engaging", "REFINED")
            .respond("BRANCH-A", "Score: 2 too flat")
            .respond("BRANCH-B", "Score: 3 fine")
            .respond("as sci-fi twist", "BRANCH-A")
            .respond("as myth twist", "BRANCH-B")
            .respond("surreal short story", "CORE"),
    );
    let trace = Arc::new(RecordingTrace::new());
    let pipeline = Pipeline::new(
        generator.clone(),
        Arc::new(StaticFacts::default()),
        trace,
        config(&dir),
    );

    let mut state = RemixState::new("a door", "u1", "dark");
    pipeline.run(&mut state).await.unwrap();

    // The weak branch is replaced; the passing one stays byte-identical.
    assert_eq!(state.branches, vec!["REFINED", "BRANCH-B"]);
    assert_eq!(generator.calls_containing("more emotionally engaging"), 1);
}

#[tokio::test]
async fn test_branch_count_is_configurable() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(
        MockGenerator::new()
            .respond("emotional resonance", "Score: 5 superb")
            .respond("surreal short story", "CORE")
            .with_default("A BRANCH"),
    );
    let pipeline = Pipeline::new(
        generator,
        Arc::new(StaticFacts::default()),
        Arc::new(RecordingTrace::new()),
        PipelineConfig {
            branch_count: 4,
            memory_dir: dir.path().to_path_buf(),
            ..PipelineConfig::default()
        },
    );

    let mut state = RemixState::new("a door", "u1", "dark");
    pipeline.run(&mut state).await.unwrap();
    assert_eq!(state.branches.len(), 4);
}

#[tokio::test]
async fn test_paused_facts_still_complete_the_run() {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(
        MockGenerator::new()
            .respond("emotional resonance", "Score: 4 good")
            .respond("surreal short story", "CORE")
            .with_default("A BRANCH"),
    );
    let trace = Arc::new(RecordingTrace::new());
    let pipeline = Pipeline::new(
        generator,
        Arc::new(StaticFacts::with_facts(vec!["never seen".to_string()])),
        trace.clone(),
        PipelineConfig {
            pause_facts: true,
            memory_dir: dir.path().to_path_buf(),
            ..PipelineConfig::default()
        },
    );

    let mut state = RemixState::new("a door", "u1", "dark");
    pipeline.run(&mut state).await.unwrap();

    assert!(state.core_idea.is_some());
    let facts_entry = trace
        .entries()
        .into_iter()
        .find(|(checkpoint, _)| checkpoint == "Facts")
        .unwrap();
    assert_eq!(facts_entry.1["resume_key"], "a door");
    assert_eq!(facts_entry.1["facts"], 0);
}

#[tokio::test]
async fn test_stored_memory_shapes_the_next_run() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        remix_core::memory::bank_path(dir.path(), "u1"),
        r#"{
            "profile": {"themes": ["doors"], "tone": "melancholy"},
            "summaries": ["one", "two", "three"]
        }"#,
    )
    .unwrap();

    let generator = Arc::new(
        MockGenerator::new()
            .respond("emotional resonance", "Score: 4 good")
            .respond("surreal short story", "CORE")
            .with_default("A BRANCH"),
    );
    let pipeline = Pipeline::new(
        generator.clone(),
        Arc::new(StaticFacts::default()),
        Arc::new(RecordingTrace::new()),
        config(&dir),
    );

    let mut state = RemixState::new("a door", "u1", "dark");
    pipeline.run(&mut state).await.unwrap();

    assert_eq!(state.tone(), "melancholy");
    assert_eq!(state.context_summary.as_deref(), Some("one | two | three"));
    assert_eq!(generator.calls_containing("Match this tone: melancholy"), 1);
}
