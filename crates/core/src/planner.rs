//! Slide planning: turns an outline into render-ready slide records.
//!
//! With an injected [`LanguageModel`] the planner asks the model for a
//! structured plan. Otherwise, or whenever the model fails, it parses the
//! outline and picks layouts and gradients heuristically.

use crate::brand::{DEFAULT_SECTION_GRADIENT, DEFAULT_TITLE_GRADIENT};
use crate::error::{Error, Result};
use crate::layout::choose_layout;
use crate::model::{complete_json, LanguageModel};
use crate::outline;
use crate::prompts;
use crate::types::{SlideKind, SlideRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sparse slides with fewer points than this are worth enriching.
const ENRICH_BELOW: usize = 2;

#[derive(Debug, Deserialize)]
struct PlanReply {
    #[serde(default)]
    slides: Vec<SlideRecord>,
}

/// How much material an outline carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDepth {
    pub total_lines: usize,
    pub bullet_count: usize,
    pub needs_expansion: bool,
    pub estimated_slides: usize,
}

/// Options for [`SlidePlanner::prepare`].
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Plan layouts and gradients; when false the outline is only parsed.
    pub use_planner: bool,
    pub title_gradient: Option<String>,
    pub section_gradient: Option<String>,
}

/// Plans deck structure, optionally with a language model.
#[derive(Clone, Default)]
pub struct SlidePlanner {
    model: Option<Arc<dyn LanguageModel>>,
}

impl std::fmt::Debug for SlidePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidePlanner")
            .field("has_model", &self.model.is_some())
            .finish()
    }
}

impl SlidePlanner {
    /// Planner that always uses the heuristic plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Planner backed by `model`.
    pub fn with_model(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Plan slides for `outline`.
    ///
    /// Model errors and empty or unparseable replies fall back to
    /// [`heuristic_plan`].
    pub fn plan(&self, outline: &str) -> Vec<SlideRecord> {
        let Some(model) = &self.model else {
            return heuristic_plan(outline);
        };

        let prompt = prompts::analysis_prompt(outline);
        match complete_json::<PlanReply>(model.as_ref(), &prompt) {
            Ok(reply) if !reply.slides.is_empty() => {
                log::debug!("Model planned {} slides", reply.slides.len());
                fill_plan_defaults(reply.slides)
            }
            Ok(_) => {
                log::warn!("Model returned an empty plan, using heuristic plan");
                heuristic_plan(outline)
            }
            Err(e) => {
                log::warn!("Model planning failed, using heuristic plan: {}", e);
                heuristic_plan(outline)
            }
        }
    }

    /// Parse or plan `outline` and make it ready for rendering.
    ///
    /// Fails with [`Error::EmptyOutline`] when nothing could be parsed. The
    /// result always starts with a title slide and carries the requested
    /// gradients.
    pub fn prepare(&self, outline: &str, options: &PlanOptions) -> Result<Vec<SlideRecord>> {
        let mut slides = if options.use_planner {
            self.plan(outline)
        } else {
            outline::parse(outline)
        };

        if slides.is_empty() {
            return Err(Error::EmptyOutline);
        }

        outline::validate(&mut slides);
        apply_gradients(
            &mut slides,
            options.title_gradient.as_deref(),
            options.section_gradient.as_deref(),
        );
        Ok(slides)
    }

    /// Enricher sharing this planner's model.
    pub fn enricher(&self) -> ContentEnricher {
        ContentEnricher {
            model: self.model.clone(),
        }
    }
}

/// Parse `outline` and choose layouts and gradients without a model.
pub fn heuristic_plan(outline: &str) -> Vec<SlideRecord> {
    fill_plan_defaults(outline::parse(outline))
}

/// Give content slides a layout and title/section slides a gradient where
/// they have none.
fn fill_plan_defaults(mut slides: Vec<SlideRecord>) -> Vec<SlideRecord> {
    for slide in &mut slides {
        match slide.kind {
            SlideKind::Content => {
                if slide.layout.is_none() {
                    slide.layout = Some(choose_layout(slide));
                }
            }
            SlideKind::Title => {
                slide
                    .gradient_name
                    .get_or_insert_with(|| DEFAULT_TITLE_GRADIENT.to_string());
            }
            SlideKind::Section => {
                slide
                    .gradient_name
                    .get_or_insert_with(|| DEFAULT_SECTION_GRADIENT.to_string());
            }
        }
    }
    slides
}

/// Apply user gradient selections.
///
/// A selection overrides whatever the plan chose. Without a selection a
/// slide keeps its planned gradient, or gets the default for its kind.
pub fn apply_gradients(
    slides: &mut [SlideRecord],
    title_gradient: Option<&str>,
    section_gradient: Option<&str>,
) {
    let pick = |chosen: Option<&str>, current: &Option<String>, default: &str| -> String {
        chosen
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .or_else(|| current.clone())
            .unwrap_or_else(|| default.to_string())
    };

    for slide in slides.iter_mut() {
        match slide.kind {
            SlideKind::Title => {
                slide.gradient_name = Some(pick(
                    title_gradient,
                    &slide.gradient_name,
                    DEFAULT_TITLE_GRADIENT,
                ));
            }
            SlideKind::Section => {
                slide.gradient_name = Some(pick(
                    section_gradient,
                    &slide.gradient_name,
                    DEFAULT_SECTION_GRADIENT,
                ));
            }
            SlideKind::Content => {}
        }
    }
}

/// Count lines and bullets to judge whether an outline needs expanding.
pub fn analyze_content_depth(outline: &str) -> ContentDepth {
    let lines: Vec<&str> = outline.trim().split('\n').collect();
    let bullet_count = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.starts_with('-') || line.starts_with('•'))
        .count();

    ContentDepth {
        total_lines: lines.len(),
        bullet_count,
        needs_expansion: bullet_count < 10,
        estimated_slides: (bullet_count / 4 + 1).max(3),
    }
}

/// Expands sparse slide content with a language model.
#[derive(Clone, Default)]
pub struct ContentEnricher {
    model: Option<Arc<dyn LanguageModel>>,
}

impl ContentEnricher {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// Expand `points` when there are fewer than two and a model is present.
    ///
    /// Any failure returns the points unchanged.
    pub fn enrich(&self, title: &str, points: &[String]) -> Vec<String> {
        let Some(model) = &self.model else {
            return points.to_vec();
        };
        if points.len() >= ENRICH_BELOW {
            return points.to_vec();
        }

        let prompt = prompts::enrichment_prompt(title, points);
        match complete_json::<Vec<String>>(model.as_ref(), &prompt) {
            Ok(expanded) if !expanded.is_empty() => expanded,
            Ok(_) => points.to_vec(),
            Err(e) => {
                log::warn!("Enrichment of '{}' failed: {}", title, e);
                points.to_vec()
            }
        }
    }
}
