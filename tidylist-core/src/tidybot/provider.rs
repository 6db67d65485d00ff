//! Insight text providers.

use crate::config::{TextProviderKind, TidyBotConfig};
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::json;
use std::time::Duration;

/// Turns a prompt into free text.
///
/// Anything that can answer a prompt can stand in here; the HTTP providers
/// below are only the default.
pub trait InsightTextProvider: Send + Sync {
    /// Short provider name recorded with each exchange
    fn name(&self) -> &str;

    fn model(&self) -> Option<&str> {
        None
    }

    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Create the default HTTP-backed provider.
pub fn create_provider(config: &TidyBotConfig) -> Result<Box<dyn InsightTextProvider>> {
    Ok(Box::new(HttpTextProvider::new(config)?))
}

/// Gemini `generateContent` URL with the key as a query parameter.
fn gemini_url(endpoint: &str, model: &str, api_key: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        endpoint.trim_end_matches('/'),
        model,
        urlencoding::encode(api_key)
    )
}

fn gemini_text(json: &serde_json::Value) -> Result<String> {
    json.get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get("parts"))
        .and_then(|v| v.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            Error::Llm("gemini response missing candidates[0].content.parts[].text".to_string())
        })
}

fn ollama_text(json: &serde_json::Value) -> Result<String> {
    json.get("response")
        .and_then(|v| v.as_str())
        .map(ToString::to_string)
        .ok_or_else(|| Error::Llm("ollama response missing string field `response`".to_string()))
}

struct HttpTextProvider {
    model: String,
    provider: TextProviderKind,
    endpoint: String,
    api_key: Option<String>,
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
}

impl HttpTextProvider {
    fn new(config: &TidyBotConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| config.provider.default_endpoint().to_string());
        let api_key = config.api_key.clone().or_else(|| {
            config
                .provider
                .api_key_env()
                .and_then(|var| std::env::var(var).ok())
        });

        if config.provider == TextProviderKind::Gemini && api_key.is_none() {
            return Err(Error::Config(
                "tidybot.api_key (or GEMINI_API_KEY) is required".to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Llm(format!("failed to build tokio runtime: {e}")))?;
        let timeout_secs = config.timeout_secs.max(1);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            provider: config.provider,
            endpoint,
            api_key,
            runtime,
            http,
        })
    }

    async fn post(
        &self,
        label: &str,
        url: String,
        body: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("{label} request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Llm(format!("{label} read body failed: {e}")))?;
        if !status.is_success() {
            return Err(Error::Llm(format!(
                "{label} returned {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl InsightTextProvider for HttpTextProvider {
    fn name(&self) -> &str {
        match self.provider {
            TextProviderKind::Gemini => "gemini",
            TextProviderKind::Ollama => "ollama",
        }
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            provider = self.name(),
            model = %self.model,
            prompt_chars = prompt.len(),
            "Requesting insight text"
        );

        self.runtime.block_on(async {
            match self.provider {
                TextProviderKind::Gemini => {
                    let url = gemini_url(
                        &self.endpoint,
                        &self.model,
                        self.api_key.as_deref().unwrap_or_default(),
                    );
                    let json = self
                        .post(
                            "gemini",
                            url,
                            json!({
                                "contents": [{ "parts": [{ "text": prompt }] }],
                            }),
                        )
                        .await?;
                    gemini_text(&json)
                }
                TextProviderKind::Ollama => {
                    let url = format!("{}/api/generate", self.endpoint.trim_end_matches('/'));
                    let json = self
                        .post(
                            "ollama",
                            url,
                            json!({
                                "model": self.model,
                                "prompt": prompt,
                                "stream": false,
                            }),
                        )
                        .await?;
                    ollama_text(&json)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_url_encodes_key() {
        assert_eq!(
            gemini_url("https://example.test/", "gemini-1.5-flash", "a b&c"),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent?key=a%20b%26c"
        );
    }

    #[test]
    fn test_gemini_text_joins_parts() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] }
            }]
        });
        assert_eq!(gemini_text(&json).unwrap(), "Hello there");
        assert!(matches!(gemini_text(&json!({})), Err(Error::Llm(_))));
    }

    #[test]
    fn test_ollama_text() {
        assert_eq!(ollama_text(&json!({ "response": "ok" })).unwrap(), "ok");
        assert!(ollama_text(&json!({ "done": true })).is_err());
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let config = TidyBotConfig {
            provider: TextProviderKind::Gemini,
            api_key: None,
            ..Default::default()
        };
        // Only meaningful when the environment does not supply a key
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(matches!(create_provider(&config), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = TidyBotConfig {
            provider: TextProviderKind::Ollama,
            model: "llama3".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), Some("llama3"));
    }
}
