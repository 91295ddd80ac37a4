use crate::domain::models::Feedback;
use chrono::{DateTime, Utc};
use image::Rgba;

pub const PANEL_WIDTH: u32 = 640;
pub const MIN_CANVAS_HEIGHT: u32 = 920;
pub const RADAR_OFFSET: (i64, i64) = (40, 80);
pub const TEXT_LIMIT: usize = 120;
const ELLIPSIS: &str = "...";

const TITLE_SIZE: f32 = 30.0;
const HEADER_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 14.0;

const TITLE_ADVANCE: i32 = 52;
const HEADER_ADVANCE: i32 = 24;
const NARRATIVE_ADVANCE: i32 = 38;
const ROLES_ADVANCE: i32 = 34;
const BOTTOM_RESERVE: i32 = 170;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const HEADER_COLOR: Rgba<u8> = Rgba([0x22, 0x22, 0x22, 255]);
const NARRATIVE_COLOR: Rgba<u8> = Rgba([0x44, 0x44, 0x44, 255]);
const ROLES_COLOR: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 255]);
const MUTED: Rgba<u8> = Rgba([0x66, 0x66, 0x66, 255]);

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: i32,
    pub y: i32,
    pub size: f32,
    pub color: Rgba<u8>,
    pub text: String,
}

pub fn canvas_size(radar_w: u32, radar_h: u32) -> (u32, u32) {
    (radar_w + PANEL_WIDTH, (radar_h + 220).max(MIN_CANVAS_HEIGHT))
}

/// Collapses newlines and cuts to `limit` characters, ellipsis included.
pub fn truncate_line(text: &str, limit: usize) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    let flat = flat.trim();
    if flat.chars().count() <= limit {
        return flat.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Positions every text line of the report. Painting happens separately.
///
/// Once the cursor passes `canvas_h - BOTTOM_RESERVE` the remaining entries are
/// dropped behind a truncation notice. The notice is skipped when the entry that
/// crossed the limit was the last one, since nothing was actually cut.
pub fn layout_panel(
    radar_w: u32,
    canvas_h: u32,
    feedback: &Feedback,
    display_name: &str,
    generated_at: DateTime<Utc>,
) -> Vec<TextLine> {
    let x = radar_w as i32 + 70;
    let mut y = 80;
    let limit = canvas_h as i32 - BOTTOM_RESERVE;
    let mut lines = Vec::new();

    lines.push(TextLine {
        x,
        y,
        size: TITLE_SIZE,
        color: BLACK,
        text: format!("{display_name} 的香氛人格報告"),
    });
    y += TITLE_ADVANCE;

    let total = feedback.len();
    for (idx, (t, entry)) in feedback.iter().enumerate() {
        lines.push(TextLine {
            x,
            y,
            size: HEADER_SIZE,
            color: HEADER_COLOR,
            text: format!("{t}: {:.2} / 5", entry.score),
        });
        y += HEADER_ADVANCE;

        lines.push(TextLine {
            x,
            y,
            size: BODY_SIZE,
            color: NARRATIVE_COLOR,
            text: truncate_line(&entry.narrative, TEXT_LIMIT),
        });
        y += NARRATIVE_ADVANCE;

        if !entry.suggested_roles.is_empty() {
            lines.push(TextLine {
                x,
                y,
                size: BODY_SIZE,
                color: ROLES_COLOR,
                text: truncate_line(
                    &format!("適合：{}", entry.suggested_roles.join(", ")),
                    TEXT_LIMIT,
                ),
            });
            y += ROLES_ADVANCE;
        }

        if y > limit && idx + 1 < total {
            lines.push(TextLine {
                x,
                y,
                size: BODY_SIZE,
                color: MUTED,
                text: "（內容過長，已截斷）".to_string(),
            });
            break;
        }
    }

    lines.push(TextLine {
        x: 40,
        y: canvas_h as i32 - 60,
        size: BODY_SIZE,
        color: MUTED,
        text: format!(
            "生成時間：{}",
            generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    });

    lines
}
