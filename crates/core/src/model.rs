//! Boundary to an external language model.
//!
//! Nothing in this workspace talks to a real model. Planning, enrichment,
//! sub-agent execution and intent detection accept an injected
//! [`LanguageModel`] and fall back to heuristics when none is given.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;

/// Text completion capability.
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` and return the raw reply.
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<F> LanguageModel for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn complete(&self, prompt: &str) -> Result<String> {
        self(prompt)
    }
}

/// Cut the JSON payload out of a model reply.
///
/// Replies often wrap the payload in a fenced code block or surround it
/// with prose. Returns the span from the first `{` or `[` to the last
/// matching closer, or `None` if there is no such span.
pub fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find(|c: char| c == '{' || c == '[')?;
    let closer = if reply[start..].starts_with('{') { '}' } else { ']' };
    let end = reply.rfind(closer)?;
    (end > start).then(|| &reply[start..=end])
}

/// Complete `prompt` and deserialize the JSON found in the reply.
pub fn complete_json<T: DeserializeOwned>(model: &dyn LanguageModel, prompt: &str) -> Result<T> {
    let reply = model.complete(prompt)?;
    let json = extract_json(&reply)
        .ok_or_else(|| Error::ModelError("Reply contained no JSON".to_string()))?;

    serde_json::from_str(json).map_err(|e| Error::ModelError(format!("Unparseable reply: {}", e)))
}
