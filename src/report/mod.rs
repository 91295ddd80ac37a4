pub mod font;
pub mod panel;
pub mod radar;

use crate::domain::models::{Feedback, TraitScores};
use crate::report::font::FontResource;
use ab_glyph::PxScale;
use chrono::{DateTime, Utc};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report font not found at {path}; no substitute font is used")]
    FontNotFound { path: PathBuf },
    #[error("failed to read report font {path}: {source}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report font {path} is not a usable TrueType/OpenType file")]
    InvalidFont { path: PathBuf },
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
pub struct Report {
    pub png: Vec<u8>,
    pub generated_at: DateTime<Utc>,
}

pub fn render_report(
    scores: &TraitScores,
    feedback: &Feedback,
    display_name: &str,
    font: &FontResource,
) -> Result<Report, ReportError> {
    render_report_at(scores, feedback, display_name, font, Utc::now())
}

pub fn render_report_at(
    scores: &TraitScores,
    feedback: &Feedback,
    display_name: &str,
    font: &FontResource,
    generated_at: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let radar_img = radar::render_radar(scores, font);
    let (radar_w, radar_h) = radar_img.dimensions();
    let (canvas_w, canvas_h) = panel::canvas_size(radar_w, radar_h);

    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([255, 255, 255, 255]));
    let (ox, oy) = panel::RADAR_OFFSET;
    imageops::overlay(&mut canvas, &radar_img, ox, oy);

    let lines = panel::layout_panel(radar_w, canvas_h, feedback, display_name, generated_at);
    for line in &lines {
        draw_text_mut(
            &mut canvas,
            line.color,
            line.x,
            line.y,
            PxScale::from(line.size),
            font.font(),
            &line.text,
        );
    }

    let rgb = image::DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut png = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    tracing::info!(
        "Rendered report for {}: {}x{}, {} text lines, {} bytes",
        display_name,
        canvas_w,
        canvas_h,
        lines.len(),
        png.len()
    );
    Ok(Report { png, generated_at })
}
