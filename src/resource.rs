//! Font and image resources
//!
//! Settings refer to external resources (font faces, tile sheets, image tag
//! icons) either by file path or by an inline `data:<mime>;base64,<payload>`
//! URL. Resources are loaded once per settings snapshot; a resource that
//! fails to load is logged and the preview falls back to placeholder
//! metrics instead of failing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use image::RgbaImage;

use crate::glyph::{FontdueMeasurer, TextMeasurer};
use crate::settings::{AppSettings, FontKind};

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data URL")]
    InvalidDataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to parse font face: {0}")]
    FontFace(String),
}

/// Read the bytes a resource reference points to.
///
/// Relative paths resolve against `base_dir` when one is given.
pub fn load_bytes(source: &str, base_dir: Option<&Path>) -> Result<Vec<u8>, ResourceError> {
    if let Some(rest) = source.strip_prefix("data:") {
        return decode_data_url(rest);
    }

    let path = Path::new(source);
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    std::fs::read(&path).map_err(|source| ResourceError::Io { path, source })
}

/// Decode the part of a data URL after `data:`
fn decode_data_url(rest: &str) -> Result<Vec<u8>, ResourceError> {
    let (meta, payload) = rest.split_once(',').ok_or(ResourceError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(ResourceError::InvalidDataUrl);
    }
    // Tolerate line-wrapped payloads
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Load and decode an image resource into RGBA
pub fn load_image(source: &str, base_dir: Option<&Path>) -> Result<RgbaImage, ResourceError> {
    let bytes = load_bytes(source, base_dir)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Encode bytes as a `data:` URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[derive(Debug, Clone)]
struct LoadedFace {
    family: String,
    weight: u16,
    measurer: Arc<dyn TextMeasurer>,
}

/// Resources currently available to the preview
#[derive(Debug, Clone, Default)]
pub struct FontResources {
    faces: Vec<LoadedFace>,
    bitmap_sheet: Option<Arc<RgbaImage>>,
    /// Decoded image tag icons, indexed like the settings' image tag list
    images: Vec<Option<Arc<RgbaImage>>>,
}

impl FontResources {
    /// Load every resource the settings reference.
    ///
    /// Failures are logged and returned alongside whatever did load.
    pub fn load(settings: &AppSettings, base_dir: Option<&Path>) -> (Self, Vec<ResourceError>) {
        let mut resources = Self::default();
        let mut errors = Vec::new();

        if let Some(source) = settings.system_font.source.as_deref() {
            let font = &settings.system_font;
            match load_bytes(source, base_dir).and_then(|b| FontdueMeasurer::from_bytes(&b)) {
                Ok(measurer) => {
                    tracing::info!("Loaded font '{}' weight {}", font.family, font.weight);
                    resources.add_face(&font.family, font.weight, Arc::new(measurer));
                }
                Err(e) => {
                    tracing::warn!("Failed to load font '{}': {}", font.family, e);
                    errors.push(e);
                }
            }
        }

        if let Some(source) = settings.bitmap_font.image.as_deref() {
            match load_image(source, base_dir) {
                Ok(image) => {
                    tracing::info!("Loaded bitmap font sheet ({}x{})", image.width(), image.height());
                    resources.set_bitmap_sheet(image);
                }
                Err(e) => {
                    // Only worth a warning when the bitmap font is in use
                    if settings.font_type == FontKind::Bitmap {
                        tracing::warn!("Failed to load bitmap font sheet: {}", e);
                    } else {
                        tracing::debug!("Failed to load bitmap font sheet: {}", e);
                    }
                    errors.push(e);
                }
            }
        }

        for tag in &settings.image_tags {
            let image = match Some(tag.image_url.as_str()).filter(|s| !s.is_empty()) {
                Some(source) => match load_image(source, base_dir) {
                    Ok(image) => Some(Arc::new(image)),
                    Err(e) => {
                        tracing::warn!("Failed to load image for tag '{}': {}", tag.tag, e);
                        errors.push(e);
                        None
                    }
                },
                None => None,
            };
            resources.images.push(image);
        }

        (resources, errors)
    }

    /// Register a measurer for a font family at a weight
    pub fn add_face(&mut self, family: &str, weight: u16, measurer: Arc<dyn TextMeasurer>) {
        tracing::debug!("Registered font face '{}' weight {}", family, weight);
        self.faces.retain(|f| !(f.family == family && f.weight == weight));
        self.faces.push(LoadedFace {
            family: family.to_string(),
            weight,
            measurer,
        });
    }

    /// The loaded face of `family` closest to `weight`
    pub fn face(&self, family: &str, weight: u16) -> Option<Arc<dyn TextMeasurer>> {
        self.faces
            .iter()
            .filter(|f| f.family.eq_ignore_ascii_case(family))
            .min_by_key(|f| f.weight.abs_diff(weight))
            .map(|f| Arc::clone(&f.measurer))
    }

    pub fn set_bitmap_sheet(&mut self, image: RgbaImage) {
        self.bitmap_sheet = Some(Arc::new(image));
    }

    pub fn bitmap_image(&self) -> Option<&RgbaImage> {
        self.bitmap_sheet.as_deref()
    }

    pub fn set_tag_image(&mut self, index: usize, image: RgbaImage) {
        if self.images.len() <= index {
            self.images.resize(index + 1, None);
        }
        self.images[index] = Some(Arc::new(image));
    }

    pub fn tag_image(&self, index: usize) -> Option<&RgbaImage> {
        self.images.get(index)?.as_deref()
    }
}
