//! Brand configuration: colors, fonts, logos and gradient backgrounds.
//!
//! Loaded from a JSON file. Asset paths in the file are relative to the
//! file's own directory. The config is read-only once loaded.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Font used when a font role is missing from the config.
pub const FALLBACK_FONT: &str = "Zain-Regular";

/// Gradient backgrounds shipped with the brand assets.
const BUILTIN_GRADIENTS: &[(&str, &str)] = &[
    ("ultraviolet", "brand-assets/gradients/ZN_GRD_16x9_ULTRAVIOLET.png"),
    ("limelagoon", "brand-assets/gradients/ZN_GRD_16x9_LIMELAGOON.png"),
    ("midnightsky", "brand-assets/gradients/ZN_GRD_16x9_MIDNIGHTSKY.png"),
    ("coraldawn", "brand-assets/gradients/ZN_GRD_16x9_CORALDAWN.png"),
    ("twilightmist", "brand-assets/gradients/ZN_GRD_16x9_TWILIGHTMIST.png"),
    ("azurewaters", "brand-assets/gradients/ZN_GRD_16x9_AZUREWATERS.png"),
    ("magentafade", "brand-assets/gradients/ZN_GRD_16x9_MAGENTAFADE.png"),
    ("jadehorizon", "brand-assets/gradients/ZN_GRD_16x9_JADEHORIZON.png"),
];

/// Colors used by the slide template when the config does not name them.
const BUILTIN_COLORS: &[(&str, &str)] = &[
    ("primary", "#6E2C91"),
    ("accent", "#E6007E"),
    ("text", "#1A1A1A"),
    ("muted", "#4A4A4A"),
    ("background", "#FFFFFF"),
    ("on_dark", "#FFFFFF"),
];

/// Default gradient for title slides.
pub const DEFAULT_TITLE_GRADIENT: &str = "ultraviolet";

/// Default gradient for section slides.
pub const DEFAULT_SECTION_GRADIENT: &str = "coraldawn";

/// Named colors. Gradient tints may sit under a nested `gradients` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorTable {
    #[serde(default)]
    pub gradients: BTreeMap<String, String>,

    #[serde(flatten)]
    pub roles: BTreeMap<String, String>,
}

/// Visual identity applied to every generated deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub colors: ColorTable,

    #[serde(default)]
    pub fonts: BTreeMap<String, String>,

    #[serde(default)]
    pub logos: BTreeMap<String, String>,

    /// Extra or overriding gradient image paths.
    #[serde(default)]
    pub gradients: BTreeMap<String, String>,

    /// Directory that relative asset paths are resolved against.
    #[serde(skip)]
    base_path: PathBuf,
}

fn default_name() -> String {
    "Zain".to_string()
}

impl Default for BrandConfig {
    fn default() -> Self {
        let fonts = [
            ("primary", "Zain-Regular"),
            ("bold", "Zain-Bold"),
            ("black", "Zain-Black"),
            ("italic", "Zain-Italic"),
        ];
        let logos = [
            ("english_black", "brand-assets/logos/zain_logo_english_black.png"),
            ("english_white", "brand-assets/logos/zain_logo_english_white.png"),
        ];

        Self {
            name: default_name(),
            colors: ColorTable::default(),
            fonts: fonts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            logos: logos
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            gradients: BTreeMap::new(),
            base_path: PathBuf::from("."),
        }
    }
}

impl BrandConfig {
    /// Load a brand config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::BrandConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let base_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = Self::from_json_str(&content, base_path)?;
        log::debug!("Loaded brand config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Parse a brand config, resolving assets against `base_path`.
    pub fn from_json_str(json: &str, base_path: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| Error::BrandConfigError(format!("Invalid brand config: {}", e)))?;
        config.base_path = base_path.into();
        Ok(config)
    }

    /// Use `base_path` for resolving asset paths.
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Look up a hex color by name, checking gradient tints second.
    pub fn get_color(&self, name: &str) -> Option<&str> {
        self.colors
            .roles
            .get(name)
            .or_else(|| self.colors.gradients.get(name))
            .map(String::as_str)
    }

    /// Color for a template role as six uppercase hex digits without `#`.
    ///
    /// Unknown roles and malformed values fall back to the built-in palette.
    pub fn color(&self, role: &str) -> String {
        let builtin = BUILTIN_COLORS
            .iter()
            .find(|(name, _)| *name == role)
            .map(|(_, hex)| *hex)
            .unwrap_or("#000000");

        let configured = self.get_color(role).filter(|hex| hex_to_rgb(hex).is_some());
        if self.get_color(role).is_some() && configured.is_none() {
            log::warn!("Ignoring malformed color for role '{}'", role);
        }

        configured
            .unwrap_or(builtin)
            .trim()
            .trim_start_matches('#')
            .to_uppercase()
    }

    /// Font name for a style, falling back to [`FALLBACK_FONT`].
    pub fn font_name(&self, style: &str) -> &str {
        self.fonts.get(style).map_or(FALLBACK_FONT, String::as_str)
    }

    /// Absolute path of a logo variant, if the config names one.
    pub fn logo_path(&self, variant: &str) -> Option<PathBuf> {
        self.logos.get(variant).map(|rel| self.base_path.join(rel))
    }

    /// Absolute path of a gradient background, if the name is known.
    pub fn gradient_path(&self, gradient_name: &str) -> Option<PathBuf> {
        let key = gradient_name.trim().to_lowercase();
        self.gradients
            .get(&key)
            .map(String::as_str)
            .or_else(|| {
                BUILTIN_GRADIENTS
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, rel)| *rel)
            })
            .map(|rel| self.base_path.join(rel))
    }

    /// All gradient names that resolve to a path, built-ins first.
    pub fn gradient_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_GRADIENTS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        for name in self.gradients.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Convert `#RRGGBB` (with or without `#`) into its components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
