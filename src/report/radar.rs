use crate::domain::models::{Trait, TraitScores};
use crate::report::font::FontResource;
use ab_glyph::PxScale;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size, Blend,
};
use imageproc::point::Point;
use std::f32::consts::TAU;

pub const RADAR_SIZE: u32 = 720;
pub const MAX_VALUE: f64 = 5.0;
const RADIUS: f32 = 250.0;
const LABEL_GAP: f32 = 34.0;

const GRID: Rgba<u8> = Rgba([200, 200, 200, 255]);
const TICK_TEXT: Rgba<u8> = Rgba([120, 120, 120, 255]);
const LABEL_TEXT: Rgba<u8> = Rgba([34, 34, 34, 255]);
const OUTLINE: Rgba<u8> = Rgba([31, 119, 180, 255]);
const FILL: Rgba<u8> = Rgba([31, 119, 180, 64]);

fn center() -> (f32, f32) {
    let c = RADAR_SIZE as f32 / 2.0;
    (c, c)
}

/// Clockwise from twelve o'clock.
fn point_at(radius: f32, index: usize, count: usize) -> (f32, f32) {
    let (cx, cy) = center();
    let angle = index as f32 * TAU / count as f32;
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Polygon vertices in trait order, closed by repeating the first vertex.
pub fn polygon_vertices(scores: &TraitScores) -> Vec<(f32, f32)> {
    let n = Trait::ALL.len();
    let mut points: Vec<(f32, f32)> = Trait::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let value = scores.get(t).copied().unwrap_or(0.0);
            let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, MAX_VALUE) };
            point_at(RADIUS * (value / MAX_VALUE) as f32, i, n)
        })
        .collect();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

fn fill_polygon(image: RgbaImage, closed: &[(f32, f32)]) -> RgbaImage {
    let mut pts: Vec<Point<i32>> = Vec::with_capacity(closed.len());
    for (x, y) in &closed[..closed.len().saturating_sub(1)] {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return image;
    }
    let mut canvas = Blend(image);
    draw_polygon_mut(&mut canvas, &pts, FILL);
    canvas.0
}

pub fn render_radar(scores: &TraitScores, font: &FontResource) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(RADAR_SIZE, RADAR_SIZE, Rgba([255, 255, 255, 255]));
    let (cx, cy) = center();
    let n = Trait::ALL.len();

    for tick in 1..=MAX_VALUE as i32 {
        let r = RADIUS * tick as f32 / MAX_VALUE as f32;
        draw_hollow_circle_mut(&mut img, (cx as i32, cy as i32), r.round() as i32, GRID);
        draw_text_mut(
            &mut img,
            TICK_TEXT,
            cx as i32 + 4,
            (cy - r) as i32 - 16,
            PxScale::from(14.0),
            font.font(),
            &tick.to_string(),
        );
    }

    let label_scale = PxScale::from(20.0);
    for (i, t) in Trait::ALL.iter().enumerate() {
        draw_line_segment_mut(&mut img, (cx, cy), point_at(RADIUS, i, n), GRID);

        let (lx, ly) = point_at(RADIUS + LABEL_GAP, i, n);
        let (w, h) = text_size(label_scale, font.font(), t.as_str());
        draw_text_mut(
            &mut img,
            LABEL_TEXT,
            (lx - w as f32 / 2.0) as i32,
            (ly - h as f32 / 2.0) as i32,
            label_scale,
            font.font(),
            t.as_str(),
        );
    }

    let vertices = polygon_vertices(scores);
    let mut img = fill_polygon(img, &vertices);

    // 2px outline
    for pair in vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            draw_line_segment_mut(&mut img, (a.0 + dx, a.1 + dy), (b.0 + dx, b.1 + dy), OUTLINE);
        }
    }
    for (x, y) in &vertices {
        draw_filled_circle_mut(&mut img, (x.round() as i32, y.round() as i32), 4, OUTLINE);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::font::fixture_font_path;

    fn uniform(value: f64) -> TraitScores {
        Trait::ALL.iter().map(|t| (*t, value)).collect()
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 0.01 && (a.1 - b.1).abs() < 0.01
    }

    #[test]
    fn test_first_vertex_at_top_and_clockwise() {
        let v = polygon_vertices(&uniform(5.0));
        let (cx, cy) = center();
        assert_eq!(v.len(), 6);
        assert!(close(v[0], (cx, cy - RADIUS)));
        // second trait sits right of center, above the horizontal axis
        assert!(v[1].0 > cx && v[1].1 < cy);
        // last trait mirrors it on the left
        assert!(v[4].0 < cx && close((cx - v[4].0, v[4].1), (v[1].0 - cx, v[1].1)));
        assert!(close(v[5], v[0]));
    }

    #[test]
    fn test_values_clamped_to_axis_range() {
        let mut scores = uniform(3.0);
        scores.insert(Trait::Extraversion, 9.0);
        scores.insert(Trait::Agreeableness, -2.0);
        let v = polygon_vertices(&scores);
        let (cx, cy) = center();
        assert!(close(v[0], (cx, cy - RADIUS)));
        assert!(close(v[1], (cx, cy)));
    }

    #[test]
    fn test_renders_degenerate_polygons() {
        let font = FontResource::load(fixture_font_path()).unwrap();
        for scores in [uniform(0.0), TraitScores::new(), uniform(5.0)] {
            let img = render_radar(&scores, &font);
            assert_eq!(img.dimensions(), (RADAR_SIZE, RADAR_SIZE));
        }
    }

    #[test]
    fn test_fill_is_translucent() {
        let font = FontResource::load(fixture_font_path()).unwrap();
        let img = render_radar(&uniform(4.0), &font);
        let (cx, cy) = center();
        // a point inside the polygon, off the grid lines
        let px = img.get_pixel(cx as u32 - 40, cy as u32 + 10);
        assert!(px[2] > px[0], "expected blue tint, got {px:?}");
        assert!(px[0] > 31, "fill should blend with the background, got {px:?}");
    }
}
