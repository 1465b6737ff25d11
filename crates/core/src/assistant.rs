//! Chat assistant: turns messages into tool calls and runs the tools.
//!
//! The assistant never calls tools on its own. A message yields either a
//! plain reply or a suggested tool call, and the client decides whether to
//! execute it.

use crate::error::{Error, Result};
use crate::intent::{Intent, IntentDetector, KeywordIntentDetector};
use crate::outline;
use crate::planner::{analyze_content_depth, apply_gradients, heuristic_plan};
use crate::render::DeckRenderer;
use crate::tools::{AnalyzeParams, ChartParams, CreateSlideParams, RenderParams, ToolName};
use crate::types::{SlideKind, SlideRecord};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Greeting returned when a conversation starts.
pub const GREETING: &str = "New conversation started. How can I help you create your presentation?";

const HELP_TEXT: &str = "I'm your presentation assistant. I can help you:

• Create presentations from outlines
• Design individual slides with optimal layouts
• Turn data into chart slides
• Analyze content and suggest structures
• Apply brand guidelines automatically

What would you like to create?";

/// Prefix of decks rendered from a conversation.
pub const CHAT_DECK_PREFIX: &str = "deck_chat";

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantReply {
    Message {
        content: String,
    },
    ToolCall {
        tool: ToolName,
        parameters: Value,
        reasoning: String,
    },
}

/// Successful tool execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReport {
    pub tool: ToolName,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide: Option<SlideRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl ToolReport {
    fn new(tool: ToolName, result: impl Into<String>) -> Self {
        Self {
            tool,
            result: result.into(),
            slide: None,
            analysis: None,
            download_url: None,
        }
    }
}

/// Result of executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolOutcome {
    ToolResult(ToolReport),
    Error { message: String },
}

/// One entry of a conversation's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", content = "content", rename_all = "snake_case")]
pub enum ChatMessage {
    User(String),
    Assistant(AssistantReply),
    Tool(ToolOutcome),
}

/// Per-conversation state: accumulated slides and message history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    pub id: String,
    pub slides: Vec<SlideRecord>,
    pub messages: Vec<ChatMessage>,
}

/// Sizes of a conversation's slides and history at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationMark {
    slides: usize,
    messages: usize,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn mark(&self) -> ConversationMark {
        ConversationMark {
            slides: self.slides.len(),
            messages: self.messages.len(),
        }
    }

    /// Append what `working` gained since `mark`. `working` must be a copy of
    /// this conversation taken when `mark` was recorded; entries added here
    /// in the meantime are kept ahead of the merged ones.
    pub fn merge_from(&mut self, working: Conversation, mark: ConversationMark) {
        self.slides.extend(working.slides.into_iter().skip(mark.slides));
        self.messages.extend(working.messages.into_iter().skip(mark.messages));
    }
}

/// Routes messages to tool calls and executes tools against a conversation.
#[derive(Clone)]
pub struct Orchestrator {
    detector: Arc<dyn IntentDetector>,
    renderer: Arc<dyn DeckRenderer>,
    output_dir: PathBuf,
}

impl Orchestrator {
    /// Orchestrator with keyword intent detection.
    pub fn new(renderer: Arc<dyn DeckRenderer>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            detector: Arc::new(KeywordIntentDetector),
            renderer,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn IntentDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Answer a user message, recording both sides in the history.
    pub fn process_message(&self, conversation: &mut Conversation, message: &str) -> AssistantReply {
        conversation
            .messages
            .push(ChatMessage::User(message.to_string()));

        let reply = self.reply_to(message);
        conversation
            .messages
            .push(ChatMessage::Assistant(reply.clone()));
        reply
    }

    fn reply_to(&self, message: &str) -> AssistantReply {
        match self.detector.detect(message) {
            Intent::Presentation => AssistantReply::ToolCall {
                tool: ToolName::AnalyzeContent,
                parameters: json!({
                    "content": message,
                    "audience": "business",
                    "goal": "create_presentation",
                }),
                reasoning: "Analyzing your content to determine optimal slide structure and layouts..."
                    .to_string(),
            },
            Intent::Chart => AssistantReply::ToolCall {
                tool: ToolName::GenerateChart,
                parameters: json!({
                    "chart_type": "bar",
                    "data": {"values": [85, 92, 78, 96]},
                    "title": "Sample Chart",
                    "labels": ["Q1", "Q2", "Q3", "Q4"],
                }),
                reasoning: "Generating chart based on your data...".to_string(),
            },
            Intent::Analysis => AssistantReply::ToolCall {
                tool: ToolName::AnalyzeContent,
                parameters: json!({
                    "content": message,
                    "audience": "executive",
                    "goal": "inform",
                }),
                reasoning: "Analyzing content structure and audience fit...".to_string(),
            },
            Intent::Chat => AssistantReply::Message {
                content: HELP_TEXT.to_string(),
            },
        }
    }

    /// Execute `tool` and record the outcome. Failures become
    /// [`ToolOutcome::Error`].
    pub fn execute_tool(
        &self,
        conversation: &mut Conversation,
        tool: &str,
        parameters: Value,
    ) -> ToolOutcome {
        let outcome = ToolName::from_name(tool)
            .and_then(|tool| self.run_tool(conversation, tool, parameters))
            .unwrap_or_else(|e| {
                log::warn!("Tool '{}' failed: {}", tool, e);
                ToolOutcome::Error {
                    message: e.to_string(),
                }
            });

        conversation.messages.push(ChatMessage::Tool(outcome.clone()));
        outcome
    }

    fn run_tool(
        &self,
        conversation: &mut Conversation,
        tool: ToolName,
        parameters: Value,
    ) -> Result<ToolOutcome> {
        match tool {
            ToolName::CreateSlide => {
                let params: CreateSlideParams = tool.parse_params(parameters)?;
                let slide = params.into_slide();
                conversation.slides.push(slide.clone());

                let summary = format!("Created {} slide: '{}'", slide.kind.as_str(), slide.title);
                Ok(ToolOutcome::ToolResult(ToolReport {
                    slide: Some(slide),
                    ..ToolReport::new(tool, summary)
                }))
            }
            ToolName::GenerateChart => {
                let params: ChartParams = tool.parse_params(parameters)?;
                let chart_type = params.chart_type.clone();
                let slide = params.into_slide();
                conversation.slides.push(slide.clone());

                let summary = format!("Generated {} chart slide: '{}'", chart_type, slide.title);
                Ok(ToolOutcome::ToolResult(ToolReport {
                    slide: Some(slide),
                    ..ToolReport::new(tool, summary)
                }))
            }
            ToolName::AnalyzeContent => {
                let params: AnalyzeParams = tool.parse_params(parameters)?;
                Ok(ToolOutcome::ToolResult(ToolReport {
                    analysis: Some(analyze(&params)),
                    ..ToolReport::new(tool, "Analysis complete")
                }))
            }
            ToolName::RenderPresentation => {
                let params: RenderParams = tool.parse_params(parameters)?;
                let url = self.render(conversation, params)?;
                Ok(ToolOutcome::ToolResult(ToolReport {
                    download_url: Some(url),
                    ..ToolReport::new(tool, "Presentation rendered successfully")
                }))
            }
        }
    }

    fn render(&self, conversation: &Conversation, params: RenderParams) -> Result<String> {
        let mut slides = params
            .slides
            .unwrap_or_else(|| conversation.slides.clone());
        if slides.is_empty() {
            return Err(Error::RenderError("No slides to render".to_string()));
        }

        apply_gradients(
            &mut slides,
            params.title_gradient.as_deref(),
            params.section_gradient.as_deref(),
        );

        std::fs::create_dir_all(&self.output_dir)?;
        let filename = format!("{}_{}.pptx", CHAT_DECK_PREFIX, conversation.id);
        let path = self.output_dir.join(&filename);
        self.renderer.render_to_path(&slides, &path)?;

        log::info!(
            "Rendered {} slides for conversation {} to {}",
            slides.len(),
            conversation.id,
            path.display()
        );
        Ok(format!("/download/{}", filename))
    }
}

/// Content-depth numbers plus the layouts the heuristic plan would use.
fn analyze(params: &AnalyzeParams) -> Value {
    let depth = analyze_content_depth(&params.content);
    let mut plan = heuristic_plan(&params.content);
    outline::validate(&mut plan);

    let layouts: Vec<&str> = plan
        .iter()
        .map(|slide| match slide.kind {
            SlideKind::Content => slide.layout.unwrap_or_default().as_str(),
            kind => kind.as_str(),
        })
        .collect();

    json!({
        "total_lines": depth.total_lines,
        "bullet_count": depth.bullet_count,
        "needs_expansion": depth.needs_expansion,
        "suggested_slides": depth.estimated_slides,
        "recommended_layouts": layouts,
        "audience_fit": params.audience.as_deref().unwrap_or("executive"),
        "goal": params.goal.as_deref().unwrap_or("inform"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layout;
    use parking_lot::Mutex;
    use std::path::Path;

    /// Records what it was asked to render instead of writing a deck.
    #[derive(Default)]
    struct RecordingRenderer {
        rendered: Mutex<Vec<(PathBuf, Vec<SlideRecord>)>>,
    }

    impl DeckRenderer for RecordingRenderer {
        fn render_to_path(&self, slides: &[SlideRecord], path: &Path) -> Result<()> {
            self.rendered.lock().push((path.to_path_buf(), slides.to_vec()));
            Ok(())
        }
    }

    fn orchestrator(dir: &Path) -> (Orchestrator, Arc<RecordingRenderer>) {
        let renderer = Arc::new(RecordingRenderer::default());
        (Orchestrator::new(renderer.clone(), dir), renderer)
    }

    #[test]
    fn test_messages_map_to_tool_calls() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut conversation = Conversation::new("c1");

        let reply = assistant.process_message(&mut conversation, "Create a presentation on 5G");
        let AssistantReply::ToolCall { tool, parameters, .. } = reply else {
            panic!("expected a tool call");
        };
        assert_eq!(tool, ToolName::AnalyzeContent);
        assert_eq!(parameters["goal"], "create_presentation");

        let reply = assistant.process_message(&mut conversation, "hi");
        assert!(matches!(reply, AssistantReply::Message { .. }));
        assert_eq!(conversation.messages.len(), 4);
    }

    #[test]
    fn test_reply_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut conversation = Conversation::new("c1");

        let reply = assistant.process_message(&mut conversation, "plot revenue");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "tool_call");
        assert_eq!(json["tool"], "generate_chart");

        let history = serde_json::to_value(&conversation.messages).unwrap();
        assert_eq!(history[0]["role"], "user");
        assert_eq!(history[1]["role"], "assistant");
        assert_eq!(history[1]["content"]["type"], "tool_call");
    }

    #[test]
    fn test_create_slide_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut conversation = Conversation::new("c1");

        let outcome = assistant.execute_tool(
            &mut conversation,
            "create_slide",
            json!({"type": "content", "title": "Wins", "content": ["Up 15%"], "layout": "big_number"}),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["result"], "Created content slide: 'Wins'");
        assert_eq!(json["slide"]["layout"], "big_number");
        assert!(json.get("download_url").is_none());

        assert_eq!(conversation.slides.len(), 1);
        assert_eq!(conversation.slides[0].layout, Some(Layout::BigNumber));
    }

    #[test]
    fn test_unknown_tool_is_error_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut conversation = Conversation::new("c1");

        let outcome = assistant.execute_tool(&mut conversation, "teleport", Value::Null);
        assert_eq!(
            outcome,
            ToolOutcome::Error {
                message: "Unknown tool: teleport".to_string()
            }
        );
        assert!(matches!(conversation.messages[0], ChatMessage::Tool(_)));
    }

    #[test]
    fn test_chart_tool_adds_content_slide() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut conversation = Conversation::new("c1");

        let outcome = assistant.execute_tool(
            &mut conversation,
            "generate_chart",
            json!({"chart_type": "pie", "data": {"values": [40, 60]}, "labels": ["A", "B"], "title": "Split"}),
        );
        let ToolOutcome::ToolResult(report) = outcome else {
            panic!("expected a tool result");
        };
        assert_eq!(report.result, "Generated pie chart slide: 'Split'");
        assert_eq!(report.slide.unwrap().bullet_items, vec!["A: 40", "B: 60"]);
        assert_eq!(conversation.slides.len(), 1);
    }

    #[test]
    fn test_analyze_content_tool() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut conversation = Conversation::new("c1");

        let outcome = assistant.execute_tool(
            &mut conversation,
            "analyze_content",
            json!({"content": "# Deck\n## Results\n- Up 15%\n- Down 2%"}),
        );
        let ToolOutcome::ToolResult(report) = outcome else {
            panic!("expected a tool result");
        };
        let analysis = report.analysis.unwrap();
        assert_eq!(analysis["bullet_count"], 2);
        assert_eq!(analysis["suggested_slides"], 3);
        assert_eq!(analysis["recommended_layouts"], json!(["title", "big_number"]));
        assert_eq!(analysis["audience_fit"], "executive");
    }

    #[test]
    fn test_render_uses_accumulated_slides() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, renderer) = orchestrator(dir.path());
        let mut conversation = Conversation::new("abc");

        assistant.execute_tool(&mut conversation, "create_slide", json!({"type": "title", "title": "Hi"}));
        let outcome = assistant.execute_tool(
            &mut conversation,
            "render_presentation",
            json!({"title_gradient": "azurewaters"}),
        );

        let ToolOutcome::ToolResult(report) = outcome else {
            panic!("expected a tool result");
        };
        assert_eq!(report.download_url.as_deref(), Some("/download/deck_chat_abc.pptx"));

        let rendered = renderer.rendered.lock();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].0, dir.path().join("deck_chat_abc.pptx"));
        assert_eq!(rendered[0].1[0].gradient_name.as_deref(), Some("azurewaters"));
    }

    #[test]
    fn test_merge_from_appends_new_entries() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, _) = orchestrator(dir.path());
        let mut shared = Conversation::new("c1");
        assistant.execute_tool(&mut shared, "create_slide", json!({"type": "title", "title": "A"}));

        let mark = shared.mark();
        let mut working = shared.clone();
        assistant.execute_tool(&mut working, "create_slide", json!({"type": "section", "title": "B"}));

        // Changed by another request while `working` was out
        assistant.execute_tool(&mut shared, "create_slide", json!({"type": "section", "title": "C"}));

        shared.merge_from(working, mark);
        let titles: Vec<&str> = shared.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C", "B"]);
        assert_eq!(shared.messages.len(), 3);
    }

    #[test]
    fn test_render_without_slides_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (assistant, renderer) = orchestrator(dir.path());
        let mut conversation = Conversation::new("empty");

        let outcome = assistant.execute_tool(&mut conversation, "render_presentation", json!({}));
        assert!(matches!(outcome, ToolOutcome::Error { .. }));
        assert!(renderer.rendered.lock().is_empty());
    }
}
