//! Intent detection for chat messages.

use crate::model::{complete_json, LanguageModel};
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a chat message is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Build a deck from the message.
    Presentation,
    Chart,
    Analysis,
    /// Anything else.
    Chat,
}

/// Classifies chat messages.
pub trait IntentDetector: Send + Sync {
    fn detect(&self, message: &str) -> Intent;
}

const CREATE_WORDS: &[&str] = &["create", "generate", "make", "build"];
const DECK_WORDS: &[&str] = &["presentation", "slides"];
const CHART_WORDS: &[&str] = &["chart", "graph", "visualization", "plot"];
const ANALYSIS_WORDS: &[&str] = &["analyze", "structure", "plan"];

/// Substring keyword matching, used when no model is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentDetector;

impl IntentDetector for KeywordIntentDetector {
    fn detect(&self, message: &str) -> Intent {
        let message = message.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| message.contains(word));

        if mentions(CREATE_WORDS) && mentions(DECK_WORDS) {
            Intent::Presentation
        } else if mentions(CHART_WORDS) {
            Intent::Chart
        } else if mentions(ANALYSIS_WORDS) {
            Intent::Analysis
        } else {
            Intent::Chat
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentReply {
    intent: Intent,
}

/// Asks a language model for the intent, falling back to keywords.
pub struct ModelIntentDetector {
    model: Arc<dyn LanguageModel>,
    fallback: KeywordIntentDetector,
}

impl ModelIntentDetector {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            fallback: KeywordIntentDetector,
        }
    }
}

impl IntentDetector for ModelIntentDetector {
    fn detect(&self, message: &str) -> Intent {
        let prompt = prompts::intent_prompt(message);
        match complete_json::<IntentReply>(self.model.as_ref(), &prompt) {
            Ok(reply) => reply.intent,
            Err(e) => {
                log::warn!("Model intent detection failed, using keywords: {}", e);
                self.fallback.detect(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    #[test]
    fn test_keyword_intents() {
        let detector = KeywordIntentDetector;
        assert_eq!(
            detector.detect("Please CREATE a presentation about Q4"),
            Intent::Presentation
        );
        assert_eq!(detector.detect("Build slides with a chart"), Intent::Presentation);
        assert_eq!(detector.detect("Make a bar graph of revenue"), Intent::Chart);
        assert_eq!(detector.detect("Can you analyze this?"), Intent::Analysis);
        assert_eq!(detector.detect("hello there"), Intent::Chat);
    }

    #[test]
    fn test_create_without_deck_word_is_not_presentation() {
        // "create" alone is not enough; "plan" inside "planet" still matches analysis
        assert_eq!(KeywordIntentDetector.detect("create a planet"), Intent::Analysis);
    }

    #[test]
    fn test_model_detector() {
        let model = Arc::new(|_: &str| -> Result<String> { Ok(r#"{"intent": "chart"}"#.to_string()) });
        assert_eq!(ModelIntentDetector::new(model).detect("hello"), Intent::Chart);

        let broken = Arc::new(|_: &str| -> Result<String> { Err(Error::ModelError("down".to_string())) });
        assert_eq!(
            ModelIntentDetector::new(broken).detect("make a presentation"),
            Intent::Presentation
        );
    }
}
