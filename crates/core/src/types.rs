//! Domain types for representing parsed slides and generation jobs.

use serde::{Deserialize, Deserializer, Serialize};

/// The kind of a slide record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    /// Opening slide with a title and optional subtitle.
    Title,
    /// Section divider.
    Section,
    /// Slide with a title and a list of items.
    #[default]
    Content,
}

impl SlideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Section => "section",
            Self::Content => "content",
        }
    }
}

/// Visual arrangement of a content slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One column of bullet points.
    #[default]
    Bullets,
    /// Items split across two columns.
    TwoColumn,
    /// First item shown as a large statistic, the rest as supporting points.
    BigNumber,
    /// First item as a quotation, second as its attribution.
    Quote,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullets => "bullets",
            Self::TwoColumn => "two_column",
            Self::BigNumber => "big_number",
            Self::Quote => "quote",
        }
    }

    /// Look up a layout by its tag (`bullets`, `two_column`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "bullets" => Some(Self::Bullets),
            "two_column" => Some(Self::TwoColumn),
            "big_number" => Some(Self::BigNumber),
            "quote" => Some(Self::Quote),
            _ => None,
        }
    }
}

/// One slide as parsed from an outline, prior to rendering.
///
/// Serializes to the `{"type", "title", "subtitle", "content", "layout",
/// "gradient"}` shape used by the chat API and by model replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    #[serde(rename = "type", default)]
    pub kind: SlideKind,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Items in outline order. A bare string is accepted as a single item.
    #[serde(rename = "content", default, deserialize_with = "one_or_many")]
    pub bullet_items: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    #[serde(rename = "gradient", default, skip_serializing_if = "Option::is_none")]
    pub gradient_name: Option<String>,
}

impl SlideRecord {
    /// Create a title record.
    pub fn title(title: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            kind: SlideKind::Title,
            title: title.into(),
            subtitle,
            ..Self::default()
        }
    }

    /// Create a section divider record.
    pub fn section(title: impl Into<String>) -> Self {
        Self {
            kind: SlideKind::Section,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Create a content record with the given items.
    pub fn content(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            kind: SlideKind::Content,
            title: title.into(),
            bullet_items: items,
            ..Self::default()
        }
    }

    pub fn is_title(&self) -> bool {
        self.kind == SlideKind::Title
    }

    /// Whether a non-empty subtitle has been set.
    pub fn has_subtitle(&self) -> bool {
        self.subtitle.as_deref().is_some_and(|s| !s.is_empty())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}

/// Contiguous chunk of slides handed to one batch of sub-agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideBatch {
    pub batch_id: usize,
    pub start_index: usize,
    pub slides: Vec<SlideRecord>,
}

/// Phase of a web generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Planning,
    Rendering,
    Complete,
    Failed,
}

/// Progress of a single generation request, tracked in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub status: JobPhase,
    pub progress: u8,
}

impl GenerationJob {
    pub fn planning() -> Self {
        Self {
            status: JobPhase::Planning,
            progress: 10,
        }
    }

    pub fn rendering() -> Self {
        Self {
            status: JobPhase::Rendering,
            progress: 50,
        }
    }

    pub fn complete() -> Self {
        Self {
            status: JobPhase::Complete,
            progress: 100,
        }
    }

    /// Failed jobs keep the progress they had reached.
    pub fn failed(progress: u8) -> Self {
        Self {
            status: JobPhase::Failed,
            progress,
        }
    }
}
