//! Brand template: maps slide records onto positioned shapes.

use crate::canvas::{SlideCanvas, TextBox, TextStyle};
use crate::package::{DeckPackage, Theme};
use crate::units::Frame;
use deck_core::brand::{DEFAULT_SECTION_GRADIENT, DEFAULT_TITLE_GRADIENT};
use deck_core::outline::PLACEHOLDER_TITLE;
use deck_core::{BrandConfig, DeckRenderer, Error, Layout, Result, SlideKind, SlideRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const WHITE: &str = "FFFFFF";

#[derive(Debug, Clone)]
struct Asset {
    media_name: String,
    width: u32,
    height: u32,
}

/// Renders slide records with a brand's colors, fonts, logos and gradients.
#[derive(Debug, Clone)]
pub struct PptxRenderer {
    brand: BrandConfig,
}

impl PptxRenderer {
    pub fn new(brand: BrandConfig) -> Self {
        Self { brand }
    }

    pub fn brand(&self) -> &BrandConfig {
        &self.brand
    }

    /// Build the deck package in memory.
    pub fn render(&self, slides: &[SlideRecord]) -> Result<DeckPackage> {
        let title = slides
            .iter()
            .find(|slide| slide.is_title() && !slide.title.is_empty())
            .map(|slide| slide.title.as_str())
            .unwrap_or(PLACEHOLDER_TITLE);

        let mut session = RenderSession {
            brand: &self.brand,
            package: DeckPackage::new(title, self.theme()),
            assets: HashMap::new(),
        };

        for slide in slides {
            let canvas = match slide.kind {
                SlideKind::Title => session.title_slide(slide),
                SlideKind::Section => session.section_slide(slide),
                SlideKind::Content => session.content_slide(slide),
            };
            session.package.add_slide(canvas);
        }

        log::debug!(
            "Rendered {} slides with {} media files",
            session.package.slide_count(),
            session.package.media_count()
        );
        Ok(session.package)
    }

    fn theme(&self) -> Theme {
        Theme {
            name: self.brand.name.clone(),
            text: self.brand.color("text"),
            primary: self.brand.color("primary"),
            accent: self.brand.color("accent"),
            muted: self.brand.color("muted"),
            heading_font: self.brand.font_name("bold").to_string(),
            body_font: self.brand.font_name("primary").to_string(),
        }
    }
}

impl DeckRenderer for PptxRenderer {
    fn render_to_path(&self, slides: &[SlideRecord], path: &Path) -> Result<()> {
        let package = self.render(slides)?;
        package.save(path)?;
        log::info!("Saved {} slides to {}", package.slide_count(), path.display());
        Ok(())
    }
}

/// State for one render call. Each asset file is embedded at most once.
struct RenderSession<'a> {
    brand: &'a BrandConfig,
    package: DeckPackage,
    assets: HashMap<PathBuf, Option<Asset>>,
}

impl RenderSession<'_> {
    fn title_slide(&mut self, slide: &SlideRecord) -> SlideCanvas {
        let mut canvas = SlideCanvas::new();
        let gradient = slide.gradient_name.as_deref().unwrap_or(DEFAULT_TITLE_GRADIENT);
        self.background(&mut canvas, gradient, "primary");
        self.logo(&mut canvas, "english_white", 10.0, 0.5, 2.5);

        canvas.add_text_box(TextBox::new(Frame::inches(0.75, 2.5, 11.8, 1.5)).paragraph(
            slide.title.as_str(),
            TextStyle::new(self.brand.font_name("bold"), 44.0, WHITE).bold(),
            None,
        ));

        if let Some(subtitle) = slide.subtitle.as_deref().filter(|s| !s.is_empty()) {
            canvas.add_text_box(TextBox::new(Frame::inches(0.75, 4.2, 11.8, 1.0)).paragraph(
                subtitle,
                TextStyle::new(self.brand.font_name("primary"), 24.0, WHITE),
                None,
            ));
        }
        canvas
    }

    fn section_slide(&mut self, slide: &SlideRecord) -> SlideCanvas {
        let mut canvas = SlideCanvas::new();
        let gradient = slide.gradient_name.as_deref().unwrap_or(DEFAULT_SECTION_GRADIENT);
        self.background(&mut canvas, gradient, "accent");
        self.logo(&mut canvas, "english_white", 10.0, 0.5, 2.5);

        canvas.add_text_box(TextBox::new(Frame::inches(0.75, 2.5, 11.8, 2.0)).paragraph(
            slide.title.as_str(),
            TextStyle::new(self.brand.font_name("black"), 48.0, WHITE).bold(),
            None,
        ));
        canvas
    }

    fn content_slide(&mut self, slide: &SlideRecord) -> SlideCanvas {
        let mut canvas = SlideCanvas::new();
        canvas.add_rectangle(Frame::full_slide(), self.brand.color("background"));
        self.logo(&mut canvas, "english_black", 10.5, 6.5, 2.0);

        canvas.add_text_box(TextBox::new(Frame::inches(0.75, 0.5, 11.8, 1.0)).word_wrap().paragraph(
            slide.title.as_str(),
            TextStyle::new(self.brand.font_name("bold"), 32.0, self.brand.color("primary")).bold(),
            None,
        ));

        let items = &slide.bullet_items;
        match slide.layout.unwrap_or_default() {
            Layout::Bullets => {
                canvas.add_text_box(self.bullet_box(Frame::inches(0.75, 1.8, 11.8, 4.5), items, 18.0, 12.0));
            }
            Layout::TwoColumn => {
                let mid = items.len() / 2;
                let (left, right) = if mid == 0 {
                    (&items[..], &items[..0])
                } else {
                    items.split_at(mid)
                };
                canvas.add_text_box(self.bullet_box(Frame::inches(0.75, 1.8, 5.5, 4.5), left, 16.0, 10.0));
                if !right.is_empty() {
                    canvas.add_text_box(self.bullet_box(Frame::inches(7.0, 1.8, 5.5, 4.5), right, 16.0, 10.0));
                }
            }
            Layout::BigNumber => {
                if let Some((number, rest)) = items.split_first() {
                    canvas.add_text_box(TextBox::new(Frame::inches(0.75, 2.0, 6.0, 2.0)).word_wrap().paragraph(
                        number.as_str(),
                        TextStyle::new(self.brand.font_name("black"), 60.0, self.brand.color("primary")).bold(),
                        None,
                    ));
                    if !rest.is_empty() {
                        canvas.add_text_box(self.bullet_box(Frame::inches(7.0, 2.0, 5.5, 4.0), rest, 16.0, 8.0));
                    }
                }
            }
            Layout::Quote => {
                if let Some(quote) = items.first() {
                    canvas.add_text_box(TextBox::new(Frame::inches(1.0, 2.0, 11.3, 3.5)).word_wrap().paragraph(
                        format!("\"{}\"", quote),
                        TextStyle::new(self.brand.font_name("italic"), 28.0, self.brand.color("primary")).italic(),
                        None,
                    ));
                }
                if let Some(attribution) = items.get(1) {
                    canvas.add_text_box(TextBox::new(Frame::inches(1.0, 5.5, 11.3, 0.8)).word_wrap().paragraph(
                        format!("— {}", attribution),
                        TextStyle::new(self.brand.font_name("primary"), 18.0, self.brand.color("muted")),
                        None,
                    ));
                }
            }
        }
        canvas
    }

    fn bullet_box(&self, frame: Frame, items: &[String], size: f64, space_after: f64) -> TextBox {
        let style = TextStyle::new(self.brand.font_name("primary"), size, self.brand.color("text"));
        items.iter().fold(TextBox::new(frame).word_wrap(), |text_box, item| {
            text_box.paragraph(format!("• {}", item), style.clone(), Some(space_after))
        })
    }

    /// Full-bleed gradient, or a solid rectangle in `fallback_role`.
    fn background(&mut self, canvas: &mut SlideCanvas, gradient: &str, fallback_role: &str) {
        let asset = match self.brand.gradient_path(gradient) {
            Some(path) => self.asset(&path),
            None => {
                log::warn!("Unknown gradient '{}'", gradient);
                None
            }
        };

        match asset {
            Some(asset) => canvas.add_picture(Frame::full_slide(), &asset.media_name),
            None => canvas.add_rectangle(Frame::full_slide(), self.brand.color(fallback_role)),
        }
    }

    fn logo(&mut self, canvas: &mut SlideCanvas, variant: &str, x: f64, y: f64, width: f64) {
        let Some(path) = self.brand.logo_path(variant) else {
            log::warn!("No '{}' logo configured", variant);
            return;
        };
        if let Some(asset) = self.asset(&path) {
            canvas.add_picture(Frame::with_aspect(x, y, width, asset.width, asset.height), &asset.media_name);
        }
    }

    /// Embed an image once per deck. Unusable files are skipped.
    fn asset(&mut self, path: &Path) -> Option<Asset> {
        if let Some(cached) = self.assets.get(path) {
            return cached.clone();
        }
        let asset = match read_image(path) {
            Ok(image) => Some(Asset {
                media_name: self.package.add_media(image.data, &image.extension),
                width: image.width,
                height: image.height,
            }),
            Err(e) => {
                log::warn!("Skipping image {}: {}", path.display(), e);
                None
            }
        };
        self.assets.insert(path.to_path_buf(), asset.clone());
        asset
    }
}

/// Raw bytes and pixel size of a PNG or JPEG.
struct ImageFile {
    data: Vec<u8>,
    extension: String,
    width: u32,
    height: u32,
}

fn read_image(path: &Path) -> Result<ImageFile> {
    let extension = match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase) {
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg") => ext,
        _ => return Err(Error::ImageError("unsupported image format".to_string())),
    };

    let (width, height) =
        image::image_dimensions(path).map_err(|e| Error::ImageError(e.to_string()))?;
    let data = std::fs::read(path)?;

    Ok(ImageFile {
        data,
        extension,
        width,
        height,
    })
}
