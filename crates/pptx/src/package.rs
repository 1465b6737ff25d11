//! OOXML package assembly: every part of a `.pptx` around the slides.
//!
//! The package carries one slide master with a single blank layout, one
//! theme and any number of slides and images.

use crate::canvas::SlideCanvas;
use crate::units::{SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::xml::*;
use deck_core::{Error, Result};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const FIRST_SLIDE_ID: usize = 256;
const MASTER_ID: &str = "2147483648";
const LAYOUT_ID: &str = "2147483649";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Colors and fonts written into the deck theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Dark text color, hex without `#`.
    pub text: String,
    pub primary: String,
    pub accent: String,
    pub muted: String,
    pub heading_font: String,
    pub body_font: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Office Theme".to_string(),
            text: "000000".to_string(),
            primary: "44546A".to_string(),
            accent: "ED7D31".to_string(),
            muted: "A5A5A5".to_string(),
            heading_font: "Calibri Light".to_string(),
            body_font: "Calibri".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct MediaFile {
    name: String,
    data: Vec<u8>,
}

/// A deck ready to be zipped.
#[derive(Debug, Clone, Default)]
pub struct DeckPackage {
    title: String,
    theme: Theme,
    slides: Vec<SlideCanvas>,
    media: Vec<MediaFile>,
}

impl DeckPackage {
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        Self {
            title: title.into(),
            theme,
            ..Self::default()
        }
    }

    pub fn add_slide(&mut self, slide: SlideCanvas) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[SlideCanvas] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Store image bytes under `ppt/media` and return the file name slides
    /// should reference.
    pub fn add_media(&mut self, data: Vec<u8>, extension: &str) -> String {
        let name = format!("image{}.{}", self.media.len() + 1, extension.to_lowercase());
        self.media.push(MediaFile {
            name: name.clone(),
            data,
        });
        name
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Write the package to `writer`.
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut put = |name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        put("[Content_Types].xml", &self.content_types_xml()?)?;
        put("_rels/.rels", &root_rels_xml()?)?;
        put("docProps/core.xml", &self.core_xml()?)?;
        put("docProps/app.xml", &self.app_xml()?)?;
        put("ppt/presentation.xml", &self.presentation_xml()?)?;
        put("ppt/_rels/presentation.xml.rels", &self.presentation_rels_xml()?)?;
        put("ppt/slideMasters/slideMaster1.xml", &slide_master_xml()?)?;
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &relationships_xml(&[
                ("rId1".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
                ("rId2".to_string(), REL_THEME, "../theme/theme1.xml".to_string()),
            ])?,
        )?;
        put("ppt/slideLayouts/slideLayout1.xml", &slide_layout_xml()?)?;
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &relationships_xml(&[(
                "rId1".to_string(),
                REL_SLIDE_MASTER,
                "../slideMasters/slideMaster1.xml".to_string(),
            )])?,
        )?;
        put("ppt/theme/theme1.xml", &theme_xml(&self.theme)?)?;

        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            put(&format!("ppt/slides/slide{}.xml", number), &slide.to_xml()?)?;
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &slide.rels_xml()?,
            )?;
        }

        for media in &self.media {
            put(&format!("ppt/media/{}", media.name), &media.data)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Write the package to `path`.
    ///
    /// The deck is written to a sibling temporary file first, so a failure
    /// never leaves a partial deck at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let partial = partial_path(path);
        let result = File::create(&partial)
            .map_err(Error::from)
            .and_then(|file| self.write(file).map(drop))
            .and_then(|()| std::fs::rename(&partial, path).map_err(Error::from));

        if result.is_err() {
            let _ = std::fs::remove_file(&partial);
        }
        result
    }

    fn content_types_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::document()?;
        xml.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;

        let defaults = [
            ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
            ("xml", "application/xml"),
            ("png", "image/png"),
            ("jpeg", "image/jpeg"),
            ("jpg", "image/jpeg"),
        ];
        for (extension, content_type) in defaults {
            xml.empty("Default", &[("Extension", extension), ("ContentType", content_type)])?;
        }

        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
            ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
            ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
            ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
            ("/docProps/core.xml".to_string(), CT_CORE),
            ("/docProps/app.xml".to_string(), CT_APP),
        ];
        overrides.extend((1..=self.slides.len()).map(|n| (format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)));

        for (part, content_type) in &overrides {
            xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", *content_type)])?;
        }

        xml.end("Types")?;
        Ok(xml.finish())
    }

    fn core_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::document()?;
        xml.start(
            "cp:coreProperties",
            &[
                ("xmlns:cp", "http://schemas.openxmlformats.org/package/2006/metadata/core-properties"),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ],
        )?;
        xml.text_element("dc:title", &[], &self.title)?;
        xml.text_element("dc:creator", &[], &self.theme.name)?;
        xml.end("cp:coreProperties")?;
        Ok(xml.finish())
    }

    fn app_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::document()?;
        xml.start(
            "Properties",
            &[("xmlns", "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties")],
        )?;
        xml.text_element("Application", &[], "deckgen")?;
        xml.text_element("Slides", &[], &self.slides.len().to_string())?;
        xml.end("Properties")?;
        Ok(xml.finish())
    }

    fn presentation_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::document()?;
        xml.start(
            "p:presentation",
            &[
                ("xmlns:a", NS_DRAWING),
                ("xmlns:r", NS_RELATIONSHIPS),
                ("xmlns:p", NS_PRESENTATION),
                ("saveSubsetFonts", "1"),
            ],
        )?;

        xml.start("p:sldMasterIdLst", &[])?;
        xml.empty("p:sldMasterId", &[("id", MASTER_ID), ("r:id", "rId1")])?;
        xml.end("p:sldMasterIdLst")?;

        if !self.slides.is_empty() {
            xml.start("p:sldIdLst", &[])?;
            for index in 0..self.slides.len() {
                let id = (FIRST_SLIDE_ID + index).to_string();
                let rel_id = slide_rel_id(index);
                xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
            }
            xml.end("p:sldIdLst")?;
        }

        let (cx, cy) = (SLIDE_WIDTH.to_string(), SLIDE_HEIGHT.to_string());
        xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
        xml.end("p:presentation")?;
        Ok(xml.finish())
    }

    /// Master is rId1, theme rId2, slides from rId3.
    fn presentation_rels_xml(&self) -> Result<Vec<u8>> {
        let mut rels = vec![
            ("rId1".to_string(), REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
            ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
        ];
        rels.extend(
            (0..self.slides.len())
                .map(|index| (slide_rel_id(index), REL_SLIDE, format!("slides/slide{}.xml", index + 1))),
        );
        relationships_xml(&rels)
    }
}

fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + 3)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn root_rels_xml() -> Result<Vec<u8>> {
    relationships_xml(&[
        ("rId1".to_string(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
        ("rId2".to_string(), REL_CORE_PROPERTIES, "docProps/core.xml".to_string()),
        ("rId3".to_string(), REL_EXTENDED_PROPERTIES, "docProps/app.xml".to_string()),
    ])
}

fn empty_shape_tree(xml: &mut XmlWriter) -> Result<()> {
    xml.start("p:spTree", &[])?;
    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;
    xml.empty("p:grpSpPr", &[])?;
    xml.end("p:spTree")
}

fn slide_master_xml() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::document()?;
    xml.start(
        "p:sldMaster",
        &[
            ("xmlns:a", NS_DRAWING),
            ("xmlns:r", NS_RELATIONSHIPS),
            ("xmlns:p", NS_PRESENTATION),
        ],
    )?;
    xml.start("p:cSld", &[])?;
    empty_shape_tree(&mut xml)?;
    xml.end("p:cSld")?;

    xml.empty(
        "p:clrMap",
        &[
            ("bg1", "lt1"),
            ("tx1", "dk1"),
            ("bg2", "lt2"),
            ("tx2", "dk2"),
            ("accent1", "accent1"),
            ("accent2", "accent2"),
            ("accent3", "accent3"),
            ("accent4", "accent4"),
            ("accent5", "accent5"),
            ("accent6", "accent6"),
            ("hlink", "hlink"),
            ("folHlink", "folHlink"),
        ],
    )?;

    xml.start("p:sldLayoutIdLst", &[])?;
    xml.empty("p:sldLayoutId", &[("id", LAYOUT_ID), ("r:id", "rId1")])?;
    xml.end("p:sldLayoutIdLst")?;
    xml.end("p:sldMaster")?;
    Ok(xml.finish())
}

fn slide_layout_xml() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::document()?;
    xml.start(
        "p:sldLayout",
        &[
            ("xmlns:a", NS_DRAWING),
            ("xmlns:r", NS_RELATIONSHIPS),
            ("xmlns:p", NS_PRESENTATION),
            ("type", "blank"),
            ("preserve", "1"),
        ],
    )?;
    xml.start("p:cSld", &[("name", "Blank")])?;
    empty_shape_tree(&mut xml)?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sldLayout")?;
    Ok(xml.finish())
}

fn theme_color(xml: &mut XmlWriter, slot: &str, hex: &str) -> Result<()> {
    xml.start(slot, &[])?;
    xml.empty("a:srgbClr", &[("val", hex)])?;
    xml.end(slot)
}

fn theme_font(xml: &mut XmlWriter, slot: &str, typeface: &str) -> Result<()> {
    xml.start(slot, &[])?;
    xml.empty("a:latin", &[("typeface", typeface)])?;
    xml.empty("a:ea", &[("typeface", "")])?;
    xml.empty("a:cs", &[("typeface", "")])?;
    xml.end(slot)
}

/// Three identical entries, the minimum each format style list needs.
fn style_list(xml: &mut XmlWriter, list: &str, mut entry: impl FnMut(&mut XmlWriter) -> Result<()>) -> Result<()> {
    xml.start(list, &[])?;
    for _ in 0..3 {
        entry(&mut *xml)?;
    }
    xml.end(list)
}

fn phantom_fill(xml: &mut XmlWriter) -> Result<()> {
    xml.start("a:solidFill", &[])?;
    xml.empty("a:schemeClr", &[("val", "phClr")])?;
    xml.end("a:solidFill")
}

fn theme_xml(theme: &Theme) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::document()?;
    xml.start("a:theme", &[("xmlns:a", NS_DRAWING), ("name", theme.name.as_str())])?;
    xml.start("a:themeElements", &[])?;

    xml.start("a:clrScheme", &[("name", theme.name.as_str())])?;
    theme_color(&mut xml, "a:dk1", &theme.text)?;
    theme_color(&mut xml, "a:lt1", "FFFFFF")?;
    theme_color(&mut xml, "a:dk2", &theme.primary)?;
    theme_color(&mut xml, "a:lt2", "F2F2F2")?;
    theme_color(&mut xml, "a:accent1", &theme.primary)?;
    theme_color(&mut xml, "a:accent2", &theme.accent)?;
    theme_color(&mut xml, "a:accent3", &theme.muted)?;
    theme_color(&mut xml, "a:accent4", &theme.primary)?;
    theme_color(&mut xml, "a:accent5", &theme.accent)?;
    theme_color(&mut xml, "a:accent6", &theme.muted)?;
    theme_color(&mut xml, "a:hlink", &theme.accent)?;
    theme_color(&mut xml, "a:folHlink", &theme.primary)?;
    xml.end("a:clrScheme")?;

    xml.start("a:fontScheme", &[("name", theme.name.as_str())])?;
    theme_font(&mut xml, "a:majorFont", &theme.heading_font)?;
    theme_font(&mut xml, "a:minorFont", &theme.body_font)?;
    xml.end("a:fontScheme")?;

    xml.start("a:fmtScheme", &[("name", theme.name.as_str())])?;
    style_list(&mut xml, "a:fillStyleLst", phantom_fill)?;
    style_list(&mut xml, "a:lnStyleLst", |xml| {
        xml.start("a:ln", &[("w", "6350")])?;
        phantom_fill(xml)?;
        xml.end("a:ln")
    })?;
    style_list(&mut xml, "a:effectStyleLst", |xml| {
        xml.start("a:effectStyle", &[])?;
        xml.empty("a:effectLst", &[])?;
        xml.end("a:effectStyle")
    })?;
    style_list(&mut xml, "a:bgFillStyleLst", phantom_fill)?;
    xml.end("a:fmtScheme")?;

    xml.end("a:themeElements")?;
    xml.end("a:theme")?;
    Ok(xml.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Frame;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn sample_package() -> DeckPackage {
        let mut package = DeckPackage::new("Quarterly", Theme::default());
        let media = package.add_media(vec![1, 2, 3], "PNG");
        let mut slide = SlideCanvas::new();
        slide.add_picture(Frame::full_slide(), &media);
        package.add_slide(slide);
        package.add_slide(SlideCanvas::new());
        package
    }

    #[test]
    fn test_package_parts() {
        let bytes = sample_package().write(Cursor::new(Vec::new())).unwrap().into_inner();

        let content_types = read_part(&bytes, "[Content_Types].xml");
        assert!(content_types.contains(r#"PartName="/ppt/slides/slide2.xml""#));
        assert!(content_types.contains(r#"Extension="png""#));

        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldId id="256" r:id="rId3"/>"#));
        assert!(presentation.contains(r#"<p:sldId id="257" r:id="rId4"/>"#));
        assert!(presentation.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));

        let rels = read_part(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains(r#"Target="slides/slide2.xml""#));

        let media = {
            let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
            let mut file = archive.by_name("ppt/media/image1.png").unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            data
        };
        assert_eq!(media, vec![1, 2, 3]);

        assert!(read_part(&bytes, "docProps/core.xml").contains("<dc:title>Quarterly</dc:title>"));
        assert!(read_part(&bytes, "ppt/theme/theme1.xml").contains("<a:fillStyleLst>"));
    }

    #[test]
    fn test_save_writes_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");

        sample_package().save(&path).unwrap();
        assert!(path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("deck.pptx");

        assert!(sample_package().save(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/out/deck.pptx")),
            PathBuf::from("/out/deck.pptx.partial")
        );
    }
}
