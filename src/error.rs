//! Structured error types for the zcat composer.
//!
//! Composition itself degrades instead of failing. What remains are the
//! real error sources: job parsing, font loading, image sources handed to
//! the public API, and delivery.

use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::image_loader::DecodeError;

/// The unified error type returned by the public zcat API.
#[derive(Debug, Error)]
pub enum ZcatError {
    /// JSON input failed to parse as a composition job or settings file.
    #[error("Failed to parse job: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The font payload could not be parsed or embedded.
    #[error("Font error: {0}")]
    Font(String),
    /// An image source could not be resolved or decoded.
    #[error(transparent)]
    Image(#[from] DecodeError),
    /// The composed document could not be delivered.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ZcatError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the job schema. Check field names and types."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ZcatError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_syntax_hint() {
        let err: ZcatError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse job"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn eof_error_hint() {
        let err: ZcatError = serde_json::from_str::<serde_json::Value>("{\"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }
}
