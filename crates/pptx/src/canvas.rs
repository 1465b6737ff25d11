//! A single slide as a list of positioned shapes, serialized to slide XML.

use crate::units::{hundredths, Frame};
use crate::xml::{relationships_xml, XmlWriter, NS_DRAWING, NS_PRESENTATION, NS_RELATIONSHIPS, REL_IMAGE, REL_SLIDE_LAYOUT};
use deck_core::Result;

/// Run formatting shared by every paragraph of a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    /// Size in points.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    /// Hex color without `#`.
    pub color: String,
}

impl TextStyle {
    pub fn new(font: impl Into<String>, size: f64, color: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            size,
            bold: false,
            italic: false,
            color: color.into(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    /// Spacing after the paragraph, in points.
    pub space_after: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    pub word_wrap: bool,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBox {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            word_wrap: false,
            paragraphs: Vec::new(),
        }
    }

    pub fn word_wrap(mut self) -> Self {
        self.word_wrap = true;
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>, style: TextStyle, space_after: Option<f64>) -> Self {
        self.paragraphs.push(Paragraph {
            text: text.into(),
            style,
            space_after,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Rectangle { frame: Frame, fill: String },
    Text(TextBox),
    Picture { frame: Frame, rel_id: String },
}

/// Shapes on one slide plus the images they reference.
#[derive(Debug, Clone, Default)]
pub struct SlideCanvas {
    shapes: Vec<Shape>,
    /// Media file names, in relationship order starting at rId2.
    images: Vec<String>,
}

impl SlideCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solid rectangle with no outline.
    pub fn add_rectangle(&mut self, frame: Frame, fill: impl Into<String>) {
        self.shapes.push(Shape::Rectangle {
            frame,
            fill: fill.into(),
        });
    }

    pub fn add_text_box(&mut self, text_box: TextBox) {
        self.shapes.push(Shape::Text(text_box));
    }

    /// Picture showing `media_name` from the package's media folder.
    pub fn add_picture(&mut self, frame: Frame, media_name: &str) {
        let index = match self.images.iter().position(|name| name == media_name) {
            Some(index) => index,
            None => {
                self.images.push(media_name.to_string());
                self.images.len() - 1
            }
        };

        self.shapes.push(Shape::Picture {
            frame,
            rel_id: image_rel_id(index),
        });
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn picture_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|shape| matches!(shape, Shape::Picture { .. }))
            .count()
    }

    /// Media file names referenced by this slide.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Text of every paragraph, in shape order.
    pub fn texts(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Text(text_box) => Some(text_box),
                _ => None,
            })
            .flat_map(|text_box| text_box.paragraphs.iter().map(|p| p.text.as_str()))
            .collect()
    }

    /// `ppt/slides/slideN.xml`.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::document()?;
        xml.start(
            "p:sld",
            &[
                ("xmlns:a", NS_DRAWING),
                ("xmlns:r", NS_RELATIONSHIPS),
                ("xmlns:p", NS_PRESENTATION),
            ],
        )?;
        xml.start("p:cSld", &[])?;
        xml.start("p:spTree", &[])?;
        write_group_properties(&mut xml)?;

        for (index, shape) in self.shapes.iter().enumerate() {
            // Id 1 belongs to the shape tree itself
            let id = (index + 2).to_string();
            match shape {
                Shape::Rectangle { frame, fill } => {
                    write_rectangle(&mut xml, &id, &format!("Rectangle {}", index + 1), frame, fill)?
                }
                Shape::Text(text_box) => {
                    write_text_box(&mut xml, &id, &format!("TextBox {}", index + 1), text_box)?
                }
                Shape::Picture { frame, rel_id } => {
                    write_picture(&mut xml, &id, &format!("Picture {}", index + 1), frame, rel_id)?
                }
            }
        }

        xml.end("p:spTree")?;
        xml.end("p:cSld")?;
        xml.start("p:clrMapOvr", &[])?;
        xml.empty("a:masterClrMapping", &[])?;
        xml.end("p:clrMapOvr")?;
        xml.end("p:sld")?;
        Ok(xml.finish())
    }

    /// `ppt/slides/_rels/slideN.xml.rels`: the blank layout, then images.
    pub fn rels_xml(&self) -> Result<Vec<u8>> {
        let mut rels = vec![(
            "rId1".to_string(),
            REL_SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml".to_string(),
        )];
        rels.extend(
            self.images
                .iter()
                .enumerate()
                .map(|(index, name)| (image_rel_id(index), REL_IMAGE, format!("../media/{}", name))),
        );
        relationships_xml(&rels)
    }
}

fn image_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

fn write_group_properties(xml: &mut XmlWriter) -> Result<()> {
    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;

    xml.start("p:grpSpPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.end("a:xfrm")?;
    xml.end("p:grpSpPr")
}

fn write_transform(xml: &mut XmlWriter, frame: &Frame) -> Result<()> {
    let (x, y) = (frame.x.to_string(), frame.y.to_string());
    let (cx, cy) = (frame.cx.to_string(), frame.cy.to_string());

    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end("a:xfrm")?;
    xml.start("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")
}

fn write_solid_fill(xml: &mut XmlWriter, color: &str) -> Result<()> {
    xml.start("a:solidFill", &[])?;
    xml.empty("a:srgbClr", &[("val", color)])?;
    xml.end("a:solidFill")
}

fn write_rectangle(xml: &mut XmlWriter, id: &str, name: &str, frame: &Frame, fill: &str) -> Result<()> {
    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id), ("name", name)])?;
    xml.empty("p:cNvSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    xml.start("p:spPr", &[])?;
    write_transform(xml, frame)?;
    write_solid_fill(xml, fill)?;
    xml.start("a:ln", &[])?;
    xml.empty("a:noFill", &[])?;
    xml.end("a:ln")?;
    xml.end("p:spPr")?;
    xml.end("p:sp")
}

fn write_text_box(xml: &mut XmlWriter, id: &str, name: &str, text_box: &TextBox) -> Result<()> {
    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id), ("name", name)])?;
    xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    xml.start("p:spPr", &[])?;
    write_transform(xml, &text_box.frame)?;
    xml.empty("a:noFill", &[])?;
    xml.end("p:spPr")?;

    xml.start("p:txBody", &[])?;
    let wrap = if text_box.word_wrap { "square" } else { "none" };
    xml.start("a:bodyPr", &[("wrap", wrap), ("rtlCol", "0")])?;
    xml.empty("a:spAutoFit", &[])?;
    xml.end("a:bodyPr")?;
    xml.empty("a:lstStyle", &[])?;

    for paragraph in &text_box.paragraphs {
        write_paragraph(xml, paragraph)?;
    }

    xml.end("p:txBody")?;
    xml.end("p:sp")
}

fn write_paragraph(xml: &mut XmlWriter, paragraph: &Paragraph) -> Result<()> {
    let style = &paragraph.style;
    xml.start("a:p", &[])?;

    if let Some(points) = paragraph.space_after {
        xml.start("a:pPr", &[])?;
        xml.start("a:spcAft", &[])?;
        let spacing = hundredths(points).to_string();
        xml.empty("a:spcPts", &[("val", spacing.as_str())])?;
        xml.end("a:spcAft")?;
        xml.end("a:pPr")?;
    }

    let size = hundredths(style.size).to_string();
    let mut run_attrs = vec![("lang", "en-US"), ("sz", size.as_str())];
    if style.bold {
        run_attrs.push(("b", "1"));
    }
    if style.italic {
        run_attrs.push(("i", "1"));
    }
    run_attrs.push(("dirty", "0"));

    xml.start("a:r", &[])?;
    xml.start("a:rPr", &run_attrs)?;
    write_solid_fill(xml, &style.color)?;
    xml.empty("a:latin", &[("typeface", style.font.as_str())])?;
    xml.empty("a:cs", &[("typeface", style.font.as_str())])?;
    xml.end("a:rPr")?;
    xml.text_element("a:t", &[], &paragraph.text)?;
    xml.end("a:r")?;

    xml.end("a:p")
}

fn write_picture(xml: &mut XmlWriter, id: &str, name: &str, frame: &Frame, rel_id: &str) -> Result<()> {
    xml.start("p:pic", &[])?;
    xml.start("p:nvPicPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id), ("name", name)])?;
    xml.start("p:cNvPicPr", &[])?;
    xml.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    xml.end("p:cNvPicPr")?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvPicPr")?;

    xml.start("p:blipFill", &[])?;
    xml.empty("a:blip", &[("r:embed", rel_id)])?;
    xml.start("a:stretch", &[])?;
    xml.empty("a:fillRect", &[])?;
    xml.end("a:stretch")?;
    xml.end("p:blipFill")?;

    xml.start("p:spPr", &[])?;
    write_transform(xml, frame)?;
    xml.end("p:spPr")?;
    xml.end("p:pic")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_string(canvas: &SlideCanvas) -> String {
        String::from_utf8(canvas.to_xml().unwrap()).unwrap()
    }

    #[test]
    fn test_text_box_xml() {
        let mut canvas = SlideCanvas::new();
        canvas.add_text_box(
            TextBox::new(Frame::inches(0.75, 1.8, 11.8, 4.5))
                .word_wrap()
                .paragraph("• Revenue up 15%", TextStyle::new("Zain-Regular", 18.0, "1A1A1A"), Some(12.0))
                .paragraph("Tom & Jerry", TextStyle::new("Zain-Bold", 32.0, "6E2C91").bold(), None),
        );

        let xml = xml_string(&canvas);
        assert!(xml.contains(r#"<a:off x="685800" y="1645920"/>"#));
        assert!(xml.contains(r#"<a:bodyPr wrap="square" rtlCol="0">"#));
        assert!(xml.contains(r#"<a:spcPts val="1200"/>"#));
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="1800" dirty="0">"#));
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="3200" b="1" dirty="0">"#));
        assert!(xml.contains(r#"<a:latin typeface="Zain-Bold"/>"#));
        assert!(xml.contains("<a:t>Tom &amp; Jerry</a:t>"));
        assert_eq!(canvas.texts(), vec!["• Revenue up 15%", "Tom & Jerry"]);
    }

    #[test]
    fn test_rectangle_has_fill_and_no_line() {
        let mut canvas = SlideCanvas::new();
        canvas.add_rectangle(Frame::full_slide(), "FFFFFF");

        let xml = xml_string(&canvas);
        assert!(xml.contains(r#"<a:srgbClr val="FFFFFF"/>"#));
        assert!(xml.contains("<a:ln><a:noFill/></a:ln>"));
        assert!(xml.contains(r#"<p:cNvPr id="2" name="Rectangle 1"/>"#));
    }

    #[test]
    fn test_pictures_share_relationships() {
        let mut canvas = SlideCanvas::new();
        canvas.add_picture(Frame::full_slide(), "image1.png");
        canvas.add_picture(Frame::inches(10.0, 0.5, 2.5, 1.0), "image2.png");
        canvas.add_picture(Frame::inches(1.0, 1.0, 1.0, 1.0), "image1.png");

        assert_eq!(canvas.picture_count(), 3);
        assert_eq!(canvas.images(), &["image1.png".to_string(), "image2.png".to_string()]);

        let xml = xml_string(&canvas);
        assert_eq!(xml.matches(r#"r:embed="rId2""#).count(), 2);
        assert_eq!(xml.matches(r#"r:embed="rId3""#).count(), 1);

        let rels = String::from_utf8(canvas.rels_xml().unwrap()).unwrap();
        assert!(rels.contains(r#"Target="../slideLayouts/slideLayout1.xml""#));
        assert!(rels.contains(r#"Id="rId3""#));
        assert!(rels.contains(r#"Target="../media/image2.png""#));
    }
}
