//! Outline parsing.
//!
//! Turns a loosely structured text outline into slide records with a single
//! forward pass over its lines. Each line is classified as a heading, a
//! divider, a bullet or free text; there is no grammar beyond that.

use crate::types::{SlideBatch, SlideKind, SlideRecord};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// `# Title` or `## Title`. Deeper headings are treated as free text.
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,2}\s+(.*)$").unwrap());

/// Three or more dashes, optionally followed by a section name.
static DIVIDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3,}\s*(.*)$").unwrap());

/// Hyphen, bullet glyph, or the bullet glyph as it looks after a
/// UTF-8/Windows-1252 mix-up.
static BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-|•|â€¢)+\s*(.*)$").unwrap());

/// Leading `Section:` label on section titles.
static SECTION_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^section\s*:\s*").unwrap());

/// Title given to content slides that start without a heading.
pub const DEFAULT_CONTENT_TITLE: &str = "Content";

/// Title of the placeholder slide inserted by [`validate`].
pub const PLACEHOLDER_TITLE: &str = "Presentation";

/// Sample outline served by the example endpoints.
pub const EXAMPLE_OUTLINE: &str = "# Q4 2025 Strategy Review
Driving Growth Through Digital Innovation

## Market Analysis

- Revenue increased 15% year-over-year to $1.2B
- Customer base expanded by 2.4M subscribers
- 5G coverage now reaches 85% of population
- Market share grew from 16% to 18%

## Financial Performance

- Operating profit: $450M (up 12% YoY)
- EBITDA margin improved to 42%
- Free cash flow: $280M
- Dividend payout maintained at 65%

## Product Innovation

- Zain Plus loyalty program: 3M+ members
- AI-powered customer service launched
- Fintech partnership with regional banks
- IoT solutions for enterprise clients

## 2026 Strategic Priorities

- Expand 5G to rural and remote areas
- Launch super-app for digital services
- Enter fintech with Zain Pay
- Achieve carbon neutrality by 2030
";

/// How a single trimmed, non-empty line is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Title(&'a str),
    Section(String),
    Bullet(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(caps) = HEADING_REGEX.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        if text.to_lowercase().contains("section") {
            return Line::Section(strip_section_label(text));
        }
        return Line::Title(text);
    }

    if let Some(caps) = DIVIDER_REGEX.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        return Line::Section(strip_section_label(text));
    }

    if let Some(caps) = BULLET_REGEX.captures(line) {
        return Line::Bullet(caps.get(1).map_or("", |m| m.as_str()).trim());
    }

    Line::Text(line)
}

fn strip_section_label(text: &str) -> String {
    SECTION_LABEL_REGEX.replace(text, "").trim().to_string()
}

/// Normalize line endings and Unicode composition before classification.
fn normalize_input(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").nfc().collect()
}

/// Parse an outline into slide records. Never fails: lines that fit nowhere
/// are dropped.
pub fn parse(text: &str) -> Vec<SlideRecord> {
    let text = normalize_input(text);
    let mut slides = Vec::new();
    let mut current: Option<SlideRecord> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match classify(line) {
            Line::Title(title) => {
                slides.extend(current.take());
                current = Some(SlideRecord::title(title, None));
            }
            Line::Section(title) => {
                slides.extend(current.take());
                current = Some(SlideRecord::section(title));
            }
            Line::Bullet(item) => {
                current = Some(push_bullet(current.take(), item, &mut slides));
            }
            Line::Text(free) => match current.as_mut() {
                Some(slide) if slide.kind == SlideKind::Title && !slide.has_subtitle() => {
                    slide.subtitle = Some(free.to_string());
                }
                Some(slide) if slide.kind == SlideKind::Content => {
                    slide.bullet_items.push(free.to_string());
                }
                _ => log::debug!("Dropping unattached outline line: {}", free),
            },
        }
    }

    slides.extend(current);
    slides
}

/// Attach a bullet to the current record, coercing or starting records as
/// needed. A title that already has its subtitle is complete, so the bullet
/// opens a fresh content slide instead of swallowing it.
fn push_bullet(
    current: Option<SlideRecord>,
    item: &str,
    slides: &mut Vec<SlideRecord>,
) -> SlideRecord {
    match current {
        None => SlideRecord::content(DEFAULT_CONTENT_TITLE, vec![item.to_string()]),
        Some(mut slide) => match slide.kind {
            SlideKind::Content => {
                slide.bullet_items.push(item.to_string());
                slide
            }
            SlideKind::Title if slide.has_subtitle() => {
                slides.push(slide);
                SlideRecord::content(DEFAULT_CONTENT_TITLE, vec![item.to_string()])
            }
            SlideKind::Title | SlideKind::Section => {
                log::debug!(
                    "Coercing {} slide '{}' into a content slide",
                    slide.kind.as_str(),
                    slide.title
                );
                slide.kind = SlideKind::Content;
                if slide.title.is_empty() {
                    slide.title = DEFAULT_CONTENT_TITLE.to_string();
                }
                slide.subtitle = None;
                slide.bullet_items = vec![item.to_string()];
                slide
            }
        },
    }
}

/// Ensure the deck opens with a title slide.
///
/// Prepends a placeholder title when the first record is not a title.
/// Returns `false`, without touching the sequence, when it is empty.
pub fn validate(slides: &mut Vec<SlideRecord>) -> bool {
    let Some(first) = slides.first() else {
        return false;
    };

    if !first.is_title() {
        slides.insert(0, SlideRecord::title(PLACEHOLDER_TITLE, Some(String::new())));
    }

    true
}

/// Partition slides into contiguous batches of at most `batch_size`.
///
/// A batch size of zero is treated as one.
pub fn split_for_parallel_processing(slides: &[SlideRecord], batch_size: usize) -> Vec<SlideBatch> {
    let size = batch_size.max(1);

    slides
        .chunks(size)
        .enumerate()
        .map(|(batch_id, chunk)| SlideBatch {
            batch_id,
            start_index: batch_id * size,
            slides: chunk.to_vec(),
        })
        .collect()
}

/// Write slide records back out in outline syntax.
///
/// Layouts and gradients are not represented in outline syntax and are lost.
pub fn to_outline(slides: &[SlideRecord]) -> String {
    let blocks: Vec<String> = slides
        .iter()
        .map(|slide| {
            let mut block = Vec::new();
            match slide.kind {
                SlideKind::Title => {
                    block.push(format!("# {}", slide.title));
                    if slide.has_subtitle() {
                        block.push(slide.subtitle.clone().unwrap_or_default());
                    }
                }
                SlideKind::Section if slide.title.is_empty() => block.push("---".to_string()),
                SlideKind::Section => block.push(format!("## Section: {}", slide.title)),
                SlideKind::Content => {
                    block.push(format!("## {}", slide.title));
                    block.extend(slide.bullet_items.iter().map(|item| format!("- {}", item)));
                }
            }
            block.join("\n")
        })
        .collect();

    blocks.join("\n\n")
}

/// Stateful wrapper over [`parse`] that keeps the last parsed deck around.
#[derive(Debug, Clone, Default)]
pub struct OutlineParser {
    slides: Vec<SlideRecord>,
}

impl OutlineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, replacing any previously parsed slides.
    pub fn parse_text(&mut self, text: &str) -> &[SlideRecord] {
        self.slides = parse(text);
        &self.slides
    }

    /// See [`validate`].
    pub fn validate_structure(&mut self) -> bool {
        validate(&mut self.slides)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> Option<&SlideRecord> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    /// See [`split_for_parallel_processing`].
    pub fn split_for_agents(&self, batch_size: usize) -> Vec<SlideBatch> {
        split_for_parallel_processing(&self.slides, batch_size)
    }
}
