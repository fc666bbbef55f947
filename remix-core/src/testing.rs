//! Scripted test doubles for the generation and fact seams.
//!
//! These let pipeline and judge tests run without network access or API
//! keys, with full control over responses.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{GenerateError, TextGenerator};
use crate::tools::{FactLookup, FactSource, FactStatus};

/// Generator that answers by matching needles against the prompt.
///
/// Rules are checked in insertion order and the first match wins, so
/// register the most specific needles first. Prompts matching no rule get
/// the default response. Every prompt is recorded for later inspection.
pub struct MockGenerator {
    rules: Vec<(String, String)>,
    default: String,
    fail_when: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: "mock response".to_string(),
            fail_when: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Response for prompts matching no rule.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default = response.into();
        self
    }

    /// Respond with `response` when the prompt contains `needle`.
    pub fn respond(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), response.into()));
        self
    }

    /// Fail with a network error when the prompt contains `needle`.
    /// Failure takes priority over rules.
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_when = Some(needle.into());
        self
    }

    /// Every prompt seen, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of prompts containing `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls().iter().filter(|p| p.contains(needle)).count()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(prompt.to_string());
        }

        if let Some(needle) = &self.fail_when {
            if prompt.contains(needle.as_str()) {
                return Err(GenerateError::Network("mock failure".to_string()));
            }
        }

        for (needle, response) in &self.rules {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.default.clone())
    }
}

/// Fact source returning a fixed fact list, honoring the pause flag.
#[derive(Debug, Default)]
pub struct StaticFacts {
    pub facts: Vec<String>,
}

impl StaticFacts {
    pub fn with_facts(facts: Vec<String>) -> Self {
        Self { facts }
    }
}

#[async_trait]
impl FactSource for StaticFacts {
    async fn lookup(&self, query: &str, _style: &str, pause: bool) -> FactLookup {
        if pause {
            return FactLookup {
                status: FactStatus::Paused,
                facts: Vec::new(),
                sources: Vec::new(),
                error: None,
                resume_key: Some(query.to_string()),
            };
        }

        FactLookup {
            status: FactStatus::Ok,
            facts: self.facts.clone(),
            sources: Vec::new(),
            error: None,
            resume_key: None,
        }
    }
}
