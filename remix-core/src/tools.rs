//! Fact lookup and branch concepts.
//!
//! The fact tool wraps a SerpAPI web search for strange flavor facts.
//! Every failure mode degrades to a synthetic placeholder: an unconfigured
//! or broken search can never fail ideation.

use async_trait::async_trait;
use serde::Deserialize;

const SEARCH_URL: &str = "https://serpapi.com/search.json";
const RESULT_LIMIT: usize = 3;

/// Outcome status of a fact lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactStatus {
    Ok,
    Paused,
    NoApiKey,
    Error,
}

/// Facts returned by a lookup, possibly degraded.
#[derive(Debug, Clone)]
pub struct FactLookup {
    pub status: FactStatus,
    pub facts: Vec<String>,
    pub sources: Vec<String>,
    pub error: Option<String>,
    /// Query to resume from when the lookup was paused.
    pub resume_key: Option<String>,
}

impl FactLookup {
    fn placeholder(
        query: &str,
        style: &str,
        status: FactStatus,
        reason: &str,
        error: Option<String>,
    ) -> Self {
        Self {
            status,
            facts: vec![format!(
                "Imagined twist for '{query}' in {style} style ({reason})."
            )],
            sources: Vec::new(),
            error,
            resume_key: None,
        }
    }

    fn paused(query: &str) -> Self {
        Self {
            status: FactStatus::Paused,
            facts: Vec::new(),
            sources: Vec::new(),
            error: None,
            resume_key: Some(query.to_string()),
        }
    }
}

/// A collaborator that finds short flavor facts for a prompt.
///
/// Total: implementations return degraded results instead of errors.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn lookup(&self, query: &str, style: &str, pause: bool) -> FactLookup;
}

/// SerpAPI-backed fact source.
pub struct SerpApiFacts {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SerpApiFacts {
    /// Create a fact source. A `None` key degrades every lookup to the
    /// placeholder instead of calling out.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Read the key from the SERPAPI_KEY environment variable, if set.
    pub fn from_env() -> Self {
        Self::new(std::env::var("SERPAPI_KEY").ok())
    }
}

#[async_trait]
impl FactSource for SerpApiFacts {
    async fn lookup(&self, query: &str, style: &str, pause: bool) -> FactLookup {
        if pause {
            return FactLookup::paused(query);
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return FactLookup::placeholder(
                query,
                style,
                FactStatus::NoApiKey,
                "no SERPAPI_KEY set",
                None,
            );
        };

        let q = format!("{query} {style} facts");
        let num = RESULT_LIMIT.to_string();
        let request = self.client.get(SEARCH_URL).query(&[
            ("engine", "google"),
            ("q", q.as_str()),
            ("api_key", api_key),
            ("num", num.as_str()),
        ]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return FactLookup::placeholder(
                    query,
                    style,
                    FactStatus::Error,
                    "search error",
                    Some(e.to_string()),
                );
            }
        };

        let search: SearchResponse = match response.json().await {
            Ok(search) => search,
            Err(e) => {
                return FactLookup::placeholder(
                    query,
                    style,
                    FactStatus::Error,
                    "search error",
                    Some(e.to_string()),
                );
            }
        };

        let (facts, sources) = twist_results(search.organic_results, style);
        FactLookup {
            status: FactStatus::Ok,
            facts,
            sources,
            error: None,
            resume_key: None,
        }
    }
}

/// Turn raw search results into twisted fact strings plus source links.
fn twist_results(results: Vec<OrganicResult>, style: &str) -> (Vec<String>, Vec<String>) {
    let mut facts = Vec::new();
    let mut sources = Vec::new();

    for result in results.into_iter().take(RESULT_LIMIT) {
        let title = if result.title.is_empty() {
            "Untitled result".to_string()
        } else {
            result.title
        };
        facts.push(format!(
            "Twist: {title} -> {} in {style} veil.",
            result.snippet
        ));
        if let Some(link) = result.link {
            sources.push(link);
        }
    }

    (facts, sources)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    link: Option<String>,
}

const BRANCH_TWISTS: [&str; 2] = ["sci-fi", "myth"];

/// Deterministic branch concepts derived from the core idea.
///
/// A local transform with no external call; concepts alternate through the
/// twist table in request order.
pub fn branch_concepts(core_idea: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "Branch {}: {core_idea} as {} twist.",
                i + 1,
                BRANCH_TWISTS[i % BRANCH_TWISTS.len()]
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pause_short_circuits() {
        let source = SerpApiFacts::new(Some("key".to_string()));
        let lookup = source.lookup("lost keys", "whimsical", true).await;

        assert_eq!(lookup.status, FactStatus::Paused);
        assert_eq!(lookup.resume_key.as_deref(), Some("lost keys"));
        assert!(lookup.facts.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_degrades_to_placeholder() {
        let source = SerpApiFacts::new(None);
        let lookup = source.lookup("lost keys", "dark", false).await;

        assert_eq!(lookup.status, FactStatus::NoApiKey);
        assert_eq!(lookup.facts.len(), 1);
        assert!(lookup.facts[0].contains("lost keys"));
        assert!(lookup.facts[0].contains("dark"));
        assert!(lookup.sources.is_empty());
    }

    #[test]
    fn test_twist_results() {
        let json = r#"{
            "organic_results": [
                {"title": "Octopus facts", "snippet": "They have three hearts.", "link": "https://example.com/octo"},
                {"snippet": "No title here."}
            ]
        }"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        let (facts, sources) = twist_results(search.organic_results, "epic");

        assert_eq!(facts.len(), 2);
        assert_eq!(
            facts[0],
            "Twist: Octopus facts -> They have three hearts. in epic veil."
        );
        assert!(facts[1].starts_with("Twist: Untitled result"));
        assert_eq!(sources, vec!["https://example.com/octo".to_string()]);
    }

    #[test]
    fn test_branch_concepts() {
        let concepts = branch_concepts("the door story", 3);
        assert_eq!(
            concepts,
            vec![
                "Branch 1: the door story as sci-fi twist.",
                "Branch 2: the door story as myth twist.",
                "Branch 3: the door story as sci-fi twist.",
            ]
        );
        // Deterministic: same input, same output.
        assert_eq!(concepts, branch_concepts("the door story", 3));
    }
}
