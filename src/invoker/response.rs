//! Response shape normalization.
//!
//! Providers answer in different JSON shapes. Each known shape is a variant;
//! detection tries them in a fixed order and falls through to
//! `Unrecognized`, which normalizes to empty text.

use serde_json::Value;

/// Known response layouts, in detection order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape<'a> {
    /// `[{"generated_text": "..."}]`
    GeneratedTextList(&'a str),
    /// `{"generated_text": "..."}`
    GeneratedTextObject(&'a str),
    /// `"..."`
    RawString(&'a str),
    /// `{"choices": [{"text": "..."}]}`
    CompletionChoice(&'a str),
    /// `{"choices": [{"message": {"content": "..."}}]}`
    ChatChoice(&'a str),
    Unrecognized,
}

impl<'a> ResponseShape<'a> {
    pub fn detect(value: &'a Value) -> Self {
        if let Some(text) = value
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("generated_text"))
            .and_then(Value::as_str)
        {
            return Self::GeneratedTextList(text);
        }
        if let Some(text) = value
            .as_object()
            .and_then(|obj| obj.get("generated_text"))
            .and_then(Value::as_str)
        {
            return Self::GeneratedTextObject(text);
        }
        if let Some(text) = value.as_str() {
            return Self::RawString(text);
        }

        let first_choice = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first());
        if let Some(text) = first_choice.and_then(|c| c.get("text")).and_then(Value::as_str) {
            return Self::CompletionChoice(text);
        }
        if let Some(text) = first_choice
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
        {
            return Self::ChatChoice(text);
        }

        Self::Unrecognized
    }

    pub fn text(&self) -> &'a str {
        match self {
            Self::GeneratedTextList(text)
            | Self::GeneratedTextObject(text)
            | Self::RawString(text)
            | Self::CompletionChoice(text)
            | Self::ChatChoice(text) => text,
            Self::Unrecognized => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GeneratedTextList(_) => "generated_text_list",
            Self::GeneratedTextObject(_) => "generated_text_object",
            Self::RawString(_) => "raw_string",
            Self::CompletionChoice(_) => "completion_choice",
            Self::ChatChoice(_) => "chat_choice",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Extract generated text from any known shape; empty when unrecognized.
pub fn normalize_response(value: &Value) -> String {
    let shape = ResponseShape::detect(value);
    tracing::trace!(shape = shape.label(), "Normalized backend response");
    shape.text().trim().to_string()
}
