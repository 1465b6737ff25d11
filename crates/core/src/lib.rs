//! Core domain types, outline parsing, layout heuristics, brand config,
//! planning and chat assistant plumbing for branded deck generation.

pub mod agents;
pub mod assistant;
pub mod brand;
pub mod error;
pub mod ids;
pub mod intent;
pub mod layout;
pub mod model;
pub mod outline;
pub mod planner;
pub mod prompts;
pub mod render;
pub mod store;
pub mod tools;
pub mod types;

pub use agents::{SlideAgentCoordinator, SlideAgentSpawner};
pub use assistant::{AssistantReply, Conversation, Orchestrator, ToolOutcome};
pub use brand::BrandConfig;
pub use error::{Error, Result};
pub use intent::{IntentDetector, KeywordIntentDetector, ModelIntentDetector};
pub use layout::choose_layout;
pub use model::LanguageModel;
pub use outline::OutlineParser;
pub use planner::{ContentEnricher, PlanOptions, SlidePlanner};
pub use render::DeckRenderer;
pub use store::{ConversationStore, JobStore};
pub use types::{GenerationJob, JobPhase, Layout, SlideBatch, SlideKind, SlideRecord};
