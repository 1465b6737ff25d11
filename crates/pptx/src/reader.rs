//! Text extraction from `.pptx` decks.
//!
//! Slides are read in presentation order. Each paragraph becomes one line,
//! and lines are ordered top-to-bottom then left-to-right by the offset of
//! the shape they sit in.

use deck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Text found on one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckSlide {
    /// 1-based position in the deck.
    pub number: usize,
    pub lines: Vec<String>,
}

#[derive(Debug)]
struct PositionedLine {
    x: i64,
    y: i64,
    text: String,
}

/// Reads slide text back out of a deck.
pub struct DeckReader;

impl DeckReader {
    pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<DeckSlide>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("Reading deck {}", path.display());
        Self::read(BufReader::new(file))
    }

    pub fn read<R: Read + Seek>(reader: R) -> Result<Vec<DeckSlide>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let presentation = read_part(&mut archive, "ppt/presentation.xml")?;
        let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels")?;
        let targets = relationship_targets(&rels)?;

        slide_rel_ids(&presentation)?
            .iter()
            .enumerate()
            .map(|(index, rel_id)| {
                let target = targets.get(rel_id).ok_or_else(|| {
                    Error::PptxParseError(format!("Slide relationship '{}' is missing", rel_id))
                })?;
                let content = read_part(&mut archive, &resolve_target(target))?;
                Ok(DeckSlide {
                    number: index + 1,
                    lines: slide_lines(&content)?,
                })
            })
            .collect()
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;
    Ok(content)
}

/// Targets in `ppt/_rels/presentation.xml.rels` are relative to `ppt/`.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn xml_error(part: &str, e: quick_xml::Error) -> Error {
    Error::XmlError(format!("Error parsing {}: {}", part, e))
}

/// `r:id` of every `p:sldId`, in deck order.
fn slide_rel_ids(presentation: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(presentation);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldId" => {
                if let Some(id) = attribute(e, b"r:id") {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("presentation", e)),
            _ => {}
        }
    }
    Ok(ids)
}

fn relationship_targets(rels: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(rels);
    reader.trim_text(true);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(e, b"Id"), attribute(e, b"Target")) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("relationships", e)),
            _ => {}
        }
    }
    Ok(targets)
}

/// Non-empty paragraphs of every shape on a slide, in reading order.
fn slide_lines(slide: &str) -> Result<Vec<String>> {
    // Whitespace inside runs is significant
    let mut reader = Reader::from_str(slide);

    let mut lines: Vec<PositionedLine> = Vec::new();
    let mut offset: Option<(i64, i64)> = None;
    let mut paragraph: Option<String> = None;
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" => offset = None,
                b"p" => paragraph = Some(String::new()),
                b"t" => in_run_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if local_name(e.name().as_ref()) == b"off" => {
                // The first offset inside a shape is its own position
                if offset.is_none() {
                    let coord = |key: &[u8]| attribute(e, key).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
                    offset = Some((coord(b"x"), coord(b"y")));
                }
            }
            Ok(Event::Text(ref e)) if in_run_text => {
                if let Some(text) = paragraph.as_mut() {
                    let unescaped = e.unescape().map_err(|e| xml_error("slide", e))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"t" => in_run_text = false,
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"p" => {
                if let Some(text) = paragraph.take() {
                    let text = text.trim();
                    if !text.is_empty() {
                        let (x, y) = offset.unwrap_or((0, 0));
                        lines.push(PositionedLine {
                            x,
                            y,
                            text: text.to_string(),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("slide", e)),
            _ => {}
        }
    }

    // Stable, so paragraphs of one shape keep their order
    lines.sort_by_key(|line| (line.y, line.x));
    Ok(lines.into_iter().map(|line| line.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PptxRenderer;
    use deck_core::{BrandConfig, DeckRenderer, Layout, SlideRecord};
    use std::io::Cursor;

    #[test]
    fn test_read_rendered_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        let renderer = PptxRenderer::new(BrandConfig::default().with_base_path(dir.path()));

        let mut columns = SlideRecord::content("Plan", (1..=6).map(|i| format!("Step {}", i)).collect());
        columns.layout = Some(Layout::TwoColumn);
        let slides = vec![
            SlideRecord::title("Q3 Review", Some("Finance & Ops".into())),
            SlideRecord::section("Results"),
            columns,
        ];
        renderer.render_to_path(&slides, &path).unwrap();

        let deck = DeckReader::read_path(&path).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck[0].number, 1);
        assert_eq!(deck[0].lines, vec!["Q3 Review", "Finance & Ops"]);
        assert_eq!(deck[1].lines, vec!["Results"]);
        // Both columns share a top edge, so the left one reads first
        assert_eq!(
            deck[2].lines,
            vec!["Plan", "• Step 1", "• Step 2", "• Step 3", "• Step 4", "• Step 5", "• Step 6"]
        );
    }

    #[test]
    fn test_read_rejects_non_zip() {
        let result = DeckReader::read(Cursor::new(b"not a deck".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }

    #[test]
    fn test_slide_lines_order_by_position() {
        let xml = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
            <p:sp><p:spPr><a:xfrm><a:off x="500" y="900"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Bottom</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:spPr><a:xfrm><a:off x="900" y="100"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Top right</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:spPr><a:xfrm><a:off x="100" y="100"/></a:xfrm></p:spPr>
              <p:txBody><a:p><a:r><a:t>Top </a:t></a:r><a:r><a:t>left</a:t></a:r></a:p><a:p/></p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;

        assert_eq!(slide_lines(xml).unwrap(), vec!["Top left", "Top right", "Bottom"]);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sldId"), b"sldId");
        assert_eq!(local_name(b"Relationship"), b"Relationship");
    }
}
