//! Prompt builders for the language model boundary.

use crate::types::{SlideKind, SlideRecord};

const GRADIENT_GUIDE: &str = "\
   * `ultraviolet` - Professional, corporate (default)
   * `coraldawn` - Energetic, warm
   * `limelagoon` - Fresh, innovative
   * `midnightsky` - Sophisticated, premium
   * `azurewaters` - Calm, trustworthy
   * `magentafade` - Bold, dynamic
   * `twilightmist` - Creative, modern
   * `jadehorizon` - Growth, sustainability";

const PLAN_FORMAT: &str = r#"{
  "analysis": {
    "purpose": "Brief description of presentation purpose",
    "audience": "Target audience",
    "key_message": "The one thing the audience should remember"
  },
  "slides": [
    {"type": "title", "title": "Main Title", "subtitle": "Subtitle", "gradient": "ultraviolet"},
    {"type": "section", "title": "Section Name", "gradient": "coraldawn"},
    {"type": "content", "title": "Slide Title", "layout": "bullets", "content": ["Point one", "Point two"]},
    {"type": "content", "title": "Key Achievement", "layout": "big_number", "content": ["47% Growth", "Exceeded target by 12%"]}
  ]
}"#;

const BRAND_GUIDELINES: &str = "\
BRAND GUIDELINES:
- Tone: Professional, innovative, confident
- Language: Clear, concise, action-oriented
- Avoid: Jargon, passive voice, overly long sentences

Respond ONLY with the JSON object, no other text.
";

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking the model to plan a whole deck from an outline.
pub fn analysis_prompt(outline: &str) -> String {
    format!(
        "You are an expert presentation designer and content strategist.

Analyze the following presentation outline and create an optimal slide plan.

## INPUT OUTLINE:
{outline}

## TASK:
1. Identify the purpose, audience and narrative arc.
2. Break the content into logical slides and pick a layout for each:
   * `bullets` - standard bullet points
   * `two_column` - comparisons or many points
   * `big_number` - a key statistic or achievement
   * `quote` - testimonials or impactful statements
3. Rewrite bullet points to be punchy and presentation-ready.
4. Choose a gradient for title and section slides:
{GRADIENT_GUIDE}

## OUTPUT FORMAT:
{PLAN_FORMAT}

## RULES:
- At most 8 content slides, not counting title and section slides
- 3-5 bullet points per slide
- Use `big_number` for impressive stats and `quote` for insights

Respond ONLY with the JSON object, no other text.
"
    )
}

/// Prompt asking the model to expand sparse points into fuller bullets.
pub fn enrichment_prompt(topic: &str, points: &[String]) -> String {
    format!(
        "You are a business presentation expert.

Topic: {topic}
Existing points:
{}

Expand these points into 4-5 compelling, professional bullet points suitable for a C-suite presentation.
Each bullet should:
- Start with a strong action verb
- Include specific impact or metric where possible
- Be concise (one sentence max)
- Focus on business value

Respond as a JSON array of strings.
",
        bullet_list(points)
    )
}

/// Prompt for a sub-agent generating slide `index` (zero-based) of `total`.
pub fn slide_generation_prompt(slide: &SlideRecord, index: usize, total: usize) -> String {
    let mut prompt = format!(
        "You are a presentation designer for Zain, a telecommunications company.

Generate slide {} of {} for a PowerPoint presentation.

SLIDE TYPE: {}
TITLE: {}

",
        index + 1,
        total,
        slide.kind.as_str(),
        slide.title
    );

    match slide.kind {
        SlideKind::Title => {
            prompt.push_str(&format!(
                "SUBTITLE: {}\n\n",
                slide.subtitle.as_deref().unwrap_or_default()
            ));
            prompt.push_str(
                r#"INSTRUCTIONS:
1. Create a compelling title slide
2. Use professional, confident language
3. The subtitle should expand on the main title
4. Keep it concise and impactful

OUTPUT FORMAT (JSON):
{"type": "title", "title": "Main Title Text", "subtitle": "Subtitle Text"}
"#,
            );
        }
        SlideKind::Section => {
            prompt.push_str(
                r#"INSTRUCTIONS:
1. This is a section divider slide
2. Create a clear, bold section title
3. Keep it short - 2-4 words maximum

OUTPUT FORMAT (JSON):
{"type": "section", "title": "Section Name"}
"#,
            );
        }
        SlideKind::Content => {
            prompt.push_str(&format!(
                "CONTENT POINTS:\n{}\n\n",
                bullet_list(&slide.bullet_items)
            ));
            prompt.push_str(
                r#"INSTRUCTIONS:
1. Transform these points into clear, professional bullet points
2. Each bullet should be one concise sentence
3. Use action verbs and specific metrics where possible
4. Maximum 5 bullet points per slide
5. If content is sparse, expand with relevant context

OUTPUT FORMAT (JSON):
{"type": "content", "title": "Slide Title", "content": ["First bullet point", "Second bullet point"]}
"#,
            );
        }
    }

    prompt.push('\n');
    prompt.push_str(BRAND_GUIDELINES);
    prompt
}

/// Prompt asking the model to classify a chat message.
pub fn intent_prompt(message: &str) -> String {
    format!(
        r#"You route requests for a presentation assistant.

Classify the user message into exactly one intent:
- "presentation": the user wants a deck or slides created
- "chart": the user wants a chart, graph or visualization
- "analysis": the user wants content analyzed, structured or planned
- "chat": anything else

USER MESSAGE:
{message}

Respond ONLY with a JSON object like {{"intent": "presentation"}}.
"#
    )
}
