//! Query type classifier.
//!
//! Decides whether a question is a plain lookup or a forecast request.
//! Keyword rules decide first; an optional zero-temperature LLM call
//! breaks ties only for ambiguous phrasing neither rule set matched.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::llm::ChatClient;

use super::types::QueryType;

const FORECAST_KEYWORDS: &[&str] = &[
    "forecast",
    "predict",
    "projection",
    "outlook",
    "next year",
    "next quarter",
    "coming months",
    "will be",
    "expected",
    "estimate",
    "trend",
];

const PLAIN_INDICATORS: &[&str] = &[
    "list", "show", "what are", "who are", "how many", "history", "past", "previous", "current",
    "today",
];

const AMBIGUOUS_PHRASES: &[&str] = &[
    "look like",
    "will be",
    "what will",
    "how will",
    "going to be",
    "should we expect",
];

fn keyword_pattern(words: &[&str]) -> Regex {
    Regex::new(&format!(r"\b({})\b", words.join("|"))).unwrap()
}

static FORECAST_RE: LazyLock<Regex> = LazyLock::new(|| keyword_pattern(FORECAST_KEYWORDS));
static PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| keyword_pattern(PLAIN_INDICATORS));
static AMBIGUOUS_RE: LazyLock<Regex> = LazyLock::new(|| keyword_pattern(AMBIGUOUS_PHRASES));

const CLASSIFY_SYSTEM_PROMPT: &str = "You are a query classifier. Analyze the user's question \
and determine if it is asking for a future prediction/forecast. Respond with ONLY a single \
word: either 'plain' or 'forecast'.";

/// Classifies questions as plain lookups or forecast requests.
pub struct QueryClassifier {
    llm: Option<Arc<ChatClient>>,
}

impl QueryClassifier {
    pub fn new(llm: Option<Arc<ChatClient>>) -> Self {
        Self { llm }
    }

    /// Classify a question. May perform one outbound LLM call when the
    /// phrasing is ambiguous and a client is configured.
    pub async fn classify(&self, question: &str) -> QueryType {
        if let Some(by_keyword) = Self::classify_keywords(question) {
            return by_keyword;
        }

        if let Some(llm) = &self.llm {
            if Self::is_ambiguous(question) {
                match self.classify_with_llm(llm, question).await {
                    Ok(query_type) => return query_type,
                    Err(e) => {
                        tracing::warn!(error = %e, "LLM classification failed, fallback to plain");
                    }
                }
            }
        }

        QueryType::Plain
    }

    /// Keyword-only classification. Forecast keywords take strict
    /// precedence over plain indicators; `None` means no keyword matched.
    pub fn classify_keywords(question: &str) -> Option<QueryType> {
        let lower = question.to_lowercase();
        if FORECAST_RE.is_match(&lower) {
            return Some(QueryType::Forecast);
        }
        if PLAIN_RE.is_match(&lower) {
            return Some(QueryType::Plain);
        }
        None
    }

    /// Whether the phrasing warrants an LLM tiebreak.
    pub fn is_ambiguous(question: &str) -> bool {
        AMBIGUOUS_RE.is_match(&question.to_lowercase())
    }

    async fn classify_with_llm(
        &self,
        llm: &ChatClient,
        question: &str,
    ) -> crate::error::Result<QueryType> {
        let user = format!("Question: {}", question);
        let answer = llm.chat(CLASSIFY_SYSTEM_PROMPT, &user, 0.0, Some(10)).await?;
        // Any non-conforming response coerces to plain.
        Ok(match answer.trim().to_lowercase().as_str() {
            "forecast" => QueryType::Forecast,
            _ => QueryType::Plain,
        })
    }
}
