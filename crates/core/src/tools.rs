//! Chat tool catalog and typed tool parameters.

use crate::brand::{DEFAULT_SECTION_GRADIENT, DEFAULT_TITLE_GRADIENT};
use crate::error::{Error, Result};
use crate::layout::choose_layout_for_items;
use crate::types::{Layout, SlideKind, SlideRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Title used by `create_slide` when none is given.
pub const DEFAULT_SLIDE_TITLE: &str = "Slide Title";

/// Title used by `generate_chart` when none is given.
pub const DEFAULT_CHART_TITLE: &str = "Chart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    CreateSlide,
    GenerateChart,
    AnalyzeContent,
    RenderPresentation,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        Self::CreateSlide,
        Self::GenerateChart,
        Self::AnalyzeContent,
        Self::RenderPresentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSlide => "create_slide",
            Self::GenerateChart => "generate_chart",
            Self::AnalyzeContent => "analyze_content",
            Self::RenderPresentation => "render_presentation",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateSlide => "Create a single slide with specific content and layout",
            Self::GenerateChart => "Turn labelled data into a slide",
            Self::AnalyzeContent => "Analyze content and suggest optimal slide structure",
            Self::RenderPresentation => "Render all slides into the final PPTX file",
        }
    }

    fn parameter_schema(&self) -> Value {
        match self {
            Self::CreateSlide => json!({
                "type": {"type": "string", "enum": ["title", "content", "section"]},
                "title": {"type": "string"},
                "subtitle": {"type": "string"},
                "content": {"type": "array", "items": {"type": "string"}},
                "layout": {"type": "string", "enum": ["bullets", "two_column", "big_number", "quote"]},
                "gradient": {"type": "string"}
            }),
            Self::GenerateChart => json!({
                "chart_type": {"type": "string", "enum": ["bar", "line", "pie", "doughnut"]},
                "data": {"type": "object", "properties": {"values": {"type": "array", "items": {"type": "number"}}}},
                "title": {"type": "string"},
                "labels": {"type": "array", "items": {"type": "string"}}
            }),
            Self::AnalyzeContent => json!({
                "content": {"type": "string"},
                "audience": {"type": "string"},
                "goal": {"type": "string"}
            }),
            Self::RenderPresentation => json!({
                "slides": {"type": "array"},
                "title_gradient": {"type": "string"},
                "section_gradient": {"type": "string"}
            }),
        }
    }

    /// Deserialize `parameters` for this tool.
    pub fn parse_params<T: DeserializeOwned>(&self, parameters: Value) -> Result<T> {
        // Callers may omit parameters entirely
        let parameters = if parameters.is_null() {
            json!({})
        } else {
            parameters
        };

        serde_json::from_value(parameters).map_err(|e| Error::ToolParameterError {
            tool: self.as_str().to_string(),
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool catalog served by `GET /api/tools`.
pub fn tool_catalog() -> Value {
    let tools: serde_json::Map<String, Value> = ToolName::ALL
        .iter()
        .map(|tool| {
            (
                tool.as_str().to_string(),
                json!({
                    "description": tool.description(),
                    "parameters": tool.parameter_schema(),
                }),
            )
        })
        .collect();

    Value::Object(tools)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSlideParams {
    #[serde(rename = "type", default)]
    pub kind: SlideKind,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub content: Vec<String>,
    pub layout: Option<Layout>,
    pub gradient: Option<String>,
}

impl CreateSlideParams {
    /// Build the slide, filling in title, layout and gradient defaults.
    pub fn into_slide(self) -> SlideRecord {
        let gradient = self.gradient.unwrap_or_else(|| {
            if self.kind == SlideKind::Title {
                DEFAULT_TITLE_GRADIENT.to_string()
            } else {
                DEFAULT_SECTION_GRADIENT.to_string()
            }
        });

        SlideRecord {
            kind: self.kind,
            title: self.title.unwrap_or_else(|| DEFAULT_SLIDE_TITLE.to_string()),
            subtitle: self.subtitle,
            bullet_items: self.content,
            layout: Some(self.layout.unwrap_or_default()),
            gradient_name: Some(gradient),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartParams {
    #[serde(default = "default_chart_type")]
    pub chart_type: String,
    #[serde(default)]
    pub data: ChartData,
    pub title: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

fn default_chart_type() -> String {
    "bar".to_string()
}

impl ChartParams {
    /// One `label: value` item per data point. Unlabelled points are
    /// numbered.
    pub fn into_slide(self) -> SlideRecord {
        let items: Vec<String> = self
            .data
            .values
            .iter()
            .enumerate()
            .map(|(i, value)| match self.labels.get(i) {
                Some(label) => format!("{}: {}", label, value),
                None => format!("Item {}: {}", i + 1, value),
            })
            .collect();

        let layout = choose_layout_for_items(&items);
        let mut slide =
            SlideRecord::content(self.title.unwrap_or_else(|| DEFAULT_CHART_TITLE.to_string()), items);
        slide.layout = Some(layout);
        slide
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub content: String,
    pub audience: Option<String>,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderParams {
    pub slides: Option<Vec<SlideRecord>>,
    pub title_gradient: Option<String>,
    pub section_gradient: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(ToolName::from_name("generate_chart").unwrap(), ToolName::GenerateChart);
        assert!(matches!(
            ToolName::from_name("make_coffee"),
            Err(Error::UnknownTool(name)) if name == "make_coffee"
        ));
        assert_eq!(
            serde_json::to_value(ToolName::RenderPresentation).unwrap(),
            "render_presentation"
        );
    }

    #[test]
    fn test_catalog_lists_every_tool() {
        let catalog = tool_catalog();
        for tool in ToolName::ALL {
            assert!(catalog[tool.as_str()]["description"].is_string());
        }
        assert_eq!(
            catalog["create_slide"]["parameters"]["layout"]["enum"][3],
            "quote"
        );
    }

    #[test]
    fn test_create_slide_defaults() {
        let params: CreateSlideParams = ToolName::CreateSlide.parse_params(Value::Null).unwrap();
        let slide = params.into_slide();
        assert_eq!(slide.kind, SlideKind::Content);
        assert_eq!(slide.title, "Slide Title");
        assert_eq!(slide.layout, Some(Layout::Bullets));
        assert_eq!(slide.gradient_name.as_deref(), Some("coraldawn"));

        let params: CreateSlideParams = ToolName::CreateSlide
            .parse_params(json!({"type": "title", "title": "Hello"}))
            .unwrap();
        assert_eq!(params.into_slide().gradient_name.as_deref(), Some("ultraviolet"));
    }

    #[test]
    fn test_bad_parameters_name_the_tool() {
        let err = ToolName::CreateSlide
            .parse_params::<CreateSlideParams>(json!({"layout": "spiral"}))
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid parameters for create_slide"));
    }

    #[test]
    fn test_chart_becomes_content_slide() {
        let params: ChartParams = ToolName::GenerateChart
            .parse_params(json!({
                "chart_type": "bar",
                "data": {"values": [85, 92.5, 78]},
                "title": "Quarterly NPS",
                "labels": ["Q1", "Q2"]
            }))
            .unwrap();

        let slide = params.into_slide();
        assert_eq!(slide.title, "Quarterly NPS");
        assert_eq!(slide.bullet_items, vec!["Q1: 85", "Q2: 92.5", "Item 3: 78"]);
        assert_eq!(slide.layout, Some(Layout::Bullets));
    }
}
