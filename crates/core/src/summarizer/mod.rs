//! Optional weekly summary of the merged ticket set.
//!
//! The summary is informational only. Nothing in the pipeline branches on it,
//! and a failing provider just means no summary.

mod config;
mod llm;

pub use config::{LlmProvider, SummarizerConfig};
pub use llm::{
    create_llm_client, CompletionRequest, LlmClient, LlmError, OllamaClient, OpenAiClient,
};

use std::collections::HashMap;

use crate::ticket::{Priority, TicketRecord};

const SYSTEM_PROMPT: &str = "You are an operations analyst. Summarize weekly support tickets \
with clear, concise insights for non-technical stakeholders. Include 3-5 findings and \
actionable next steps. Keep it under 130 words. Finish your answer completely with a full \
sentence (do not cut off).";

const TOP_TOPICS: usize = 5;

/// Produces a short executive summary through an [`LlmClient`].
pub struct Summarizer {
    client: Box<dyn LlmClient>,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self {
            client,
            max_tokens: 220,
        }
    }

    pub fn from_config(config: &SummarizerConfig) -> Result<Self, LlmError> {
        let mut summarizer = Self::new(create_llm_client(config)?);
        summarizer.max_tokens = config.max_tokens;
        Ok(summarizer)
    }

    pub fn provider(&self) -> &str {
        self.client.provider()
    }

    /// Summarize `records`, trimmed back to the last complete sentence.
    pub async fn summarize(&self, records: &[TicketRecord]) -> Result<String, LlmError> {
        let request = CompletionRequest::new(build_summary_prompt(records))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens);
        let text = self.client.complete(request).await?;
        Ok(trim_to_sentence(&text))
    }
}

/// Counts-only prompt: totals, P1 count and the most frequent topics.
pub fn build_summary_prompt(records: &[TicketRecord]) -> String {
    let total = records.len();
    let p1 = records
        .iter()
        .filter(|r| r.priority == Some(Priority::P1))
        .count();

    let mut topics: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let topic = record.topic.map(|t| t.as_str()).unwrap_or("other");
        *topics.entry(topic).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = topics.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top = ranked
        .iter()
        .take(TOP_TOPICS)
        .map(|(topic, count)| format!("{}({})", topic, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Weekly tickets: {}. Critical (P1): {}. Top topics: {}.\n\
         Write a short executive summary and 2-3 next actions.",
        total, p1, top
    )
}

/// Cut text that does not end in `.`, `!` or `?` back to its last period.
pub fn trim_to_sentence(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() || text.ends_with(['.', '!', '?']) {
        return text.to_string();
    }
    match text.rfind('.') {
        Some(idx) => text[..=idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::Topic;
    use async_trait::async_trait;

    fn record(id: &str, topic: Topic, priority: Priority) -> TicketRecord {
        let mut record: TicketRecord =
            serde_json::from_value(serde_json::json!({"id": id, "subject": "s"})).unwrap();
        record.topic = Some(topic);
        record.priority = Some(priority);
        record
    }

    struct CannedClient(&'static str);

    #[async_trait]
    impl LlmClient for CannedClient {
        fn provider(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
            assert!(request.prompt.starts_with("Weekly tickets:"));
            assert!(request.system.is_some());
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_prompt_counts() {
        let records = vec![
            record("1", Topic::Login, Priority::P1),
            record("2", Topic::Login, Priority::P3),
            record("3", Topic::Billing, Priority::P2),
        ];
        let prompt = build_summary_prompt(&records);
        assert!(prompt.starts_with(
            "Weekly tickets: 3. Critical (P1): 1. Top topics: login(2), billing(1)."
        ));
    }

    #[test]
    fn test_prompt_unclassified_rows_count_as_other() {
        let mut unclassified: TicketRecord =
            serde_json::from_value(serde_json::json!({"id": "9"})).unwrap();
        unclassified.topic = None;
        let prompt = build_summary_prompt(&[unclassified]);
        assert!(prompt.contains("Top topics: other(1)."));
    }

    #[test]
    fn test_trim_to_sentence() {
        assert_eq!(trim_to_sentence("Done. Next steps incl"), "Done.");
        assert_eq!(trim_to_sentence("All good!"), "All good!");
        assert_eq!(trim_to_sentence("  no period at all "), "no period at all");
        assert_eq!(trim_to_sentence(""), "");
    }

    #[tokio::test]
    async fn test_summarize_trims_output() {
        let summarizer = Summarizer::new(Box::new(CannedClient("Login spiked. Fix SSO and")));
        let summary = summarizer
            .summarize(&[record("1", Topic::Login, Priority::P1)])
            .await
            .unwrap();
        assert_eq!(summary, "Login spiked.");
    }
}
