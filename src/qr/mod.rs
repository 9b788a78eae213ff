//! Branded QR cards for referral links
//!
//! Output is a PNG that depends only on the URL and the bytes of the
//! configured asset files, so the same inputs always produce the same image.

pub mod layout;

use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use qrcode::{EcLevel, QrCode};

use crate::core::config::QrConfig;
use crate::core::error::{AppError, AppResult};
use layout::{CANVAS_SIZE, QR_SIZE};

/// Renders referral QR cards from the configured assets.
#[derive(Debug, Clone)]
pub struct QrIssuer {
    background_path: Option<PathBuf>,
    font_path: Option<PathBuf>,
    brand_text: String,
}

impl QrIssuer {
    pub fn new(config: &QrConfig) -> Self {
        Self {
            background_path: config.background_path.clone(),
            font_path: config.font_path.clone(),
            brand_text: config.brand_text.clone(),
        }
    }

    /// Full card: background, decorations, code and brand line.
    ///
    /// # Errors
    ///
    /// `AppError::Render` if a configured asset is missing or unreadable, or
    /// the URL does not fit in a QR code.
    pub fn generate(&self, url: &str) -> AppResult<Vec<u8>> {
        let mut canvas = match &self.background_path {
            Some(path) => load_background(path)?,
            None => RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, layout::BACKGROUND),
        };
        layout::draw_decorations(&mut canvas);

        let code = encode(url)?;
        layout::paint_code(
            &mut canvas,
            &code.to_colors(),
            code.width(),
            layout::qr_origin(),
            QR_SIZE,
            layout::LIGHT_ALPHA,
        );

        if let Some(path) = &self.font_path {
            let font = load_font(path)?;
            draw_brand_text(&mut canvas, &font, &self.brand_text);
        }

        encode_png(canvas)
    }

    /// Bare black-on-white code with no assets; used when `generate` fails.
    pub fn generate_plain(url: &str) -> AppResult<Vec<u8>> {
        let code = encode(url)?;
        let mut canvas = RgbaImage::from_pixel(QR_SIZE, QR_SIZE, layout::WHITE);
        layout::paint_code(&mut canvas, &code.to_colors(), code.width(), (0, 0), QR_SIZE, 0xFF);
        encode_png(canvas)
    }

    /// Configured asset files paired with whether they exist.
    pub fn asset_status(&self) -> Vec<(PathBuf, bool)> {
        [&self.background_path, &self.font_path]
            .into_iter()
            .flatten()
            .map(|path| (path.clone(), path.is_file()))
            .collect()
    }
}

fn encode(url: &str) -> AppResult<QrCode> {
    QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)
        .map_err(|e| AppError::Render(format!("cannot encode {}: {}", url, e)))
}

fn load_background(path: &Path) -> AppResult<RgbaImage> {
    let image = image::open(path)
        .map_err(|e| AppError::Render(format!("background {}: {}", path.display(), e)))?;
    if image.width() == CANVAS_SIZE && image.height() == CANVAS_SIZE {
        return Ok(image.to_rgba8());
    }
    Ok(image.resize_exact(CANVAS_SIZE, CANVAS_SIZE, FilterType::Triangle).to_rgba8())
}

fn load_font(path: &Path) -> AppResult<FontVec> {
    let bytes = std::fs::read(path).map_err(|e| AppError::Render(format!("font {}: {}", path.display(), e)))?;
    FontVec::try_from_vec(bytes).map_err(|e| AppError::Render(format!("font {}: {}", path.display(), e)))
}

fn draw_brand_text(canvas: &mut RgbaImage, font: &FontVec, text: &str) {
    if text.is_empty() {
        return;
    }
    let scale = PxScale::from(layout::FONT_SIZE);
    let (width, _) = text_size(scale, font, text);
    let x = (CANVAS_SIZE.saturating_sub(width) / 2) as i32;
    let y = layout::text_top() as i32;
    draw_text_mut(canvas, layout::TEXT_COLOR, x, y, scale, font, text);
}

fn encode_png(canvas: RgbaImage) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_status_lists_configured_files_only() {
        let issuer = QrIssuer::new(&QrConfig {
            background_path: Some(PathBuf::from("/nonexistent/bg.jpg")),
            font_path: None,
            brand_text: String::new(),
        });
        assert_eq!(issuer.asset_status(), vec![(PathBuf::from("/nonexistent/bg.jpg"), false)]);
    }

    #[test]
    fn test_plain_code_is_png() {
        let bytes = QrIssuer::generate_plain("https://example.com/?ref=1").unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
