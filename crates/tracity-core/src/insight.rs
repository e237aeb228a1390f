//! Natural-language insights from a completion API.
//!
//! [`InsightService`] sends a small sample of records to a
//! [`CompletionProvider`] and parses the structured reply into an [`Insight`].
//! Any provider or parse failure is logged and replaced by a static fallback,
//! so callers never see an error from this layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Document;
use crate::traits::CompletionProvider;

/// Number of records forwarded to the completion API as context.
pub const CONTEXT_RECORDS: usize = 5;

/// System message sent with every insight prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert data analyst. Always respond with valid JSON.";

fn default_insight_text() -> String {
    "Analysis completed".to_string()
}

fn default_trend() -> String {
    "stable".to_string()
}

/// Parsed completion reply. Members missing from the reply take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default = "default_insight_text")]
    pub insight: String,
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub key_metrics: Vec<Value>,
    #[serde(default)]
    pub anomalies: Vec<Value>,
    #[serde(default = "default_trend")]
    pub trend: String,
}

impl Default for Insight {
    fn default() -> Self {
        Self {
            insight: default_insight_text(),
            chart_type: None,
            key_metrics: Vec::new(),
            anomalies: Vec::new(),
            trend: default_trend(),
        }
    }
}

impl Insight {
    /// Static insight returned whenever the completion API cannot help.
    pub fn fallback() -> Self {
        Self {
            insight: "Data analysis completed. Multiple trends detected in the dataset."
                .to_string(),
            chart_type: Some("bar".to_string()),
            key_metrics: vec![Value::from("count"), Value::from("average")],
            anomalies: Vec::new(),
            trend: default_trend(),
        }
    }
}

/// Builds the user message for an insight request.
pub fn build_prompt(sample: &[Document], query: &str) -> String {
    let context: Vec<&Document> = sample.iter().take(CONTEXT_RECORDS).collect();
    let data_context = serde_json::to_string(&context).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze this dataset and provide insights for the query: "{query}"

Data sample: {data_context}

Respond with a JSON object containing:
- insight: A clear, actionable insight (max 100 words)
- chart_type: Recommended chart type (bar, line, pie, scatter, area)
- key_metrics: Array of important metrics found
- anomalies: Array of any unusual patterns or outliers detected
- trend: Overall trend direction (increasing, decreasing, stable, volatile)"#
    )
}

/// Service turning record samples into insights.
#[derive(Clone)]
pub struct InsightService<P: CompletionProvider> {
    provider: P,
}

impl<P: CompletionProvider> InsightService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Asks the completion API about `sample` in the light of `query`.
    ///
    /// Never fails: errors yield [`Insight::fallback`].
    pub async fn analyze(&self, sample: &[Document], query: &str) -> Insight {
        if !self.provider.is_enabled() {
            tracing::debug!("No completion provider configured; using fallback insight");
            return Insight::fallback();
        }

        let prompt = build_prompt(sample, query);

        let reply = match self.provider.complete_json(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(provider = self.provider.name(), "Completion error: {}", e);
                return Insight::fallback();
            }
        };

        match serde_json::from_value::<Insight>(reply) {
            Ok(insight) => insight,
            Err(e) => {
                tracing::error!(
                    provider = self.provider.name(),
                    "Unparsable completion reply: {}",
                    e
                );
                Insight::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct ScriptedProvider {
        reply: Arc<dyn Fn() -> Result<Value, AppError> + Send + Sync>,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
        enabled: bool,
    }

    impl ScriptedProvider {
        fn replying(reply: impl Fn() -> Result<Value, AppError> + Send + Sync + 'static) -> Self {
            Self {
                reply: Arc::new(reply),
                prompts: Arc::new(Mutex::new(Vec::new())),
                enabled: true,
            }
        }

        fn disabled() -> Self {
            Self {
                enabled: false,
                ..Self::replying(|| Err(AppError::ConfigError("disabled".to_string())))
            }
        }
    }

    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            (self.reply)()
        }
    }

    fn records(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| {
                json!({"state": format!("S{i}"), "year": 2000 + i})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_disabled_provider_is_not_called() {
        let provider = ScriptedProvider::disabled();
        let service = InsightService::new(provider.clone());

        let insight = service.analyze(&records(3), "trend?").await;

        assert_eq!(insight, Insight::fallback());
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_parses_reply() {
        let provider = ScriptedProvider::replying(|| {
            Ok(json!({
                "insight": "Cases rise every year",
                "chart_type": "line",
                "key_metrics": ["cases"],
                "anomalies": ["2020 spike"],
                "trend": "increasing"
            }))
        });
        let service = InsightService::new(provider);

        let insight = service.analyze(&records(3), "trend?").await;
        assert_eq!(insight.insight, "Cases rise every year");
        assert_eq!(insight.chart_type.as_deref(), Some("line"));
        assert_eq!(insight.anomalies, vec![json!("2020 spike")]);
        assert_eq!(insight.trend, "increasing");
    }

    #[tokio::test]
    async fn test_analyze_fills_missing_members() {
        let service = InsightService::new(ScriptedProvider::replying(|| Ok(json!({}))));
        let insight = service.analyze(&records(1), "q").await;
        assert_eq!(insight, Insight::default());
        assert_eq!(insight.insight, "Analysis completed");
        assert_eq!(insight.trend, "stable");
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_provider_error() {
        let service = InsightService::new(ScriptedProvider::replying(|| {
            Err(AppError::NetworkError("connection refused".to_string()))
        }));
        let insight = service.analyze(&records(2), "q").await;
        assert_eq!(insight, Insight::fallback());
        assert_eq!(insight.key_metrics, vec![json!("count"), json!("average")]);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_unparsable_reply() {
        let service = InsightService::new(ScriptedProvider::replying(|| {
            Ok(json!(["not", "an", "object"]))
        }));
        assert_eq!(service.analyze(&records(2), "q").await, Insight::fallback());

        let service = InsightService::new(ScriptedProvider::replying(|| {
            Ok(json!({"insight": 42}))
        }));
        assert_eq!(service.analyze(&records(2), "q").await, Insight::fallback());
    }

    #[tokio::test]
    async fn test_prompt_carries_first_five_records() {
        let provider = ScriptedProvider::replying(|| Ok(json!({})));
        let service = InsightService::new(provider.clone());
        service.analyze(&records(8), "Analyze the crimes dataset").await;

        let prompts = provider.prompts.lock().unwrap();
        let (system, prompt) = &prompts[0];
        assert_eq!(system, SYSTEM_PROMPT);
        assert!(prompt.contains("\"Analyze the crimes dataset\""));
        assert!(prompt.contains("\"S4\""));
        assert!(!prompt.contains("\"S5\""));
    }

    #[test]
    fn test_build_prompt_with_empty_sample() {
        let prompt = build_prompt(&[], "anything");
        assert!(prompt.contains("Data sample: []"));
        assert!(prompt.contains("max 100 words"));
    }
}
