//! Generation request body.

use serde::Serialize;

use crate::config::GenerationConfig;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
}

impl From<&GenerationConfig> for GenerationParameters {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            do_sample: config.do_sample,
        }
    }
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

/// `{ "inputs": ..., "parameters": { ... } }`
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerationParameters,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(prompt: &'a str, parameters: GenerationParameters) -> Self {
        Self {
            inputs: prompt,
            parameters,
        }
    }

    /// JSON body as sent on the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Characters of the prompt kept in a payload summary.
const SUMMARY_PROMPT_CHARS: usize = 120;

/// One-line description of a request for diagnostics.
pub fn summarize_payload(prompt: &str, parameters: &GenerationParameters) -> String {
    let total = prompt.chars().count();
    let head: String = prompt.chars().take(SUMMARY_PROMPT_CHARS).collect();
    let ellipsis = if total > SUMMARY_PROMPT_CHARS { "..." } else { "" };
    format!(
        "inputs=\"{}{}\" ({} chars) max_new_tokens={} temperature={} top_p={} do_sample={}",
        head.replace('\n', " "),
        ellipsis,
        total,
        parameters.max_new_tokens,
        parameters.temperature,
        parameters.top_p,
        parameters.do_sample
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_body_shape() {
        let request = GenerationRequest::new("Hello", GenerationParameters::default());
        let value: serde_json::Value = serde_json::from_str(&request.to_json()).unwrap();
        assert_eq!(value["inputs"], "Hello");
        assert_eq!(value["parameters"]["max_new_tokens"], 1024);
        assert_eq!(value["parameters"]["do_sample"], true);
        let temperature = value["parameters"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        let top_p = value["parameters"]["top_p"].as_f64().unwrap();
        assert!((top_p - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_summary_truncates_long_prompts() {
        let prompt = "a".repeat(500);
        let summary = summarize_payload(&prompt, &GenerationParameters::default());
        assert!(summary.contains("(500 chars)"));
        assert!(summary.contains("...\""));
        assert!(summary.len() < 300);
    }
}
