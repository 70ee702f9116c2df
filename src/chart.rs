//! Scatter-and-trendline rendering for the daily best-play series
//!
//! Marks are rasterized straight onto an RGB canvas and encoded as PNG:
//! the full series as small dots, record plays overlaid larger, and a
//! dashed least-squares trend line across the whole series. Axis lines are
//! drawn but carry no text.

use crate::error::{Error, Result};
use crate::models::BestPlay;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Canvas width in pixels
pub const CHART_WIDTH: u32 = 3200;
/// Canvas height in pixels
pub const CHART_HEIGHT: u32 = 1800;

const MARGIN: u32 = 100;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([30, 30, 30]);
const SERIES: Rgb<u8> = Rgb([0, 100, 255]);
const RECORD: Rgb<u8> = Rgb([255, 0, 100]);
const TREND: Rgb<u8> = Rgb([0, 0, 255]);

const SERIES_RADIUS: i64 = 2;
const RECORD_RADIUS: i64 = 3;

/// Render the series and its record subsequence to `path` as a PNG
pub fn render_chart(series: &[BestPlay], records: &[BestPlay], path: &Path) -> Result<()> {
    let canvas = draw(series, records);
    canvas
        .save(path)
        .map_err(|e| Error::Chart(format!("cannot write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), points = series.len(), "chart rendered");
    Ok(())
}

/// Data-to-pixel mapping over the plot area
struct PlotSpace {
    min_x: f64,
    span_x: f64,
    min_y: f64,
    span_y: f64,
}

impl PlotSpace {
    fn from_points(points: &[(f64, f64)]) -> Self {
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        Self {
            min_x,
            span_x: (max_x - min_x).max(1.0),
            min_y: 0.0,
            span_y: (max_y * 1.05).max(1.0),
        }
    }

    fn project(&self, x: f64, y: f64) -> (i64, i64) {
        let plot_w = (CHART_WIDTH - 2 * MARGIN) as f64;
        let plot_h = (CHART_HEIGHT - 2 * MARGIN) as f64;
        let px = MARGIN as f64 + (x - self.min_x) / self.span_x * plot_w;
        let py = (CHART_HEIGHT - MARGIN) as f64 - (y - self.min_y) / self.span_y * plot_h;
        (px as i64, py as i64)
    }
}

fn points_of(series: &[BestPlay]) -> Vec<(f64, f64)> {
    series
        .iter()
        .filter_map(|play| match play.timestamp() {
            Some(at) => Some((at.timestamp() as f64, play.pp)),
            None => {
                tracing::warn!(score_time = %play.score_time, "unparseable timestamp, point dropped");
                None
            }
        })
        .collect()
}

/// Least-squares fit over `points`, as `(slope, intercept)`
///
/// Returns `None` when fewer than two points exist or all x values
/// coincide.
pub(crate) fn linear_fit(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (x, y) in points {
        covariance += (x - mean_x) * (y - mean_y);
        variance += (x - mean_x) * (x - mean_x);
    }
    if variance.abs() < f64::EPSILON {
        return None;
    }

    let slope = covariance / variance;
    Some((slope, mean_y - slope * mean_x))
}

fn put_pixel_clamped(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < CHART_WIDTH && (y as u32) < CHART_HEIGHT {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_disc(canvas: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_clamped(canvas, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_axes(canvas: &mut RgbImage) {
    for thickness in 0..2_i64 {
        for y in MARGIN..=(CHART_HEIGHT - MARGIN) {
            put_pixel_clamped(canvas, MARGIN as i64 + thickness, y as i64, AXIS);
        }
        for x in MARGIN..=(CHART_WIDTH - MARGIN) {
            put_pixel_clamped(canvas, x as i64, (CHART_HEIGHT - MARGIN) as i64 + thickness, AXIS);
        }
    }
}

fn draw_trendline(canvas: &mut RgbImage, space: &PlotSpace, slope: f64, intercept: f64) {
    // Dash pattern in plot pixels: 14 on, 8 off.
    let plot_w = CHART_WIDTH - 2 * MARGIN;
    for step in 0..plot_w {
        if step % 22 >= 14 {
            continue;
        }
        let x = space.min_x + step as f64 / plot_w as f64 * space.span_x;
        let y = slope * x + intercept;
        let (px, py) = space.project(x, y);
        if py < MARGIN as i64 || py > (CHART_HEIGHT - MARGIN) as i64 {
            continue;
        }
        put_pixel_clamped(canvas, px, py, TREND);
        put_pixel_clamped(canvas, px, py + 1, TREND);
    }
}

fn draw(series: &[BestPlay], records: &[BestPlay]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);
    draw_axes(&mut canvas);

    let series_points = points_of(series);
    if series_points.is_empty() {
        return canvas;
    }
    let space = PlotSpace::from_points(&series_points);

    for &(x, y) in &series_points {
        let (px, py) = space.project(x, y);
        draw_disc(&mut canvas, px, py, SERIES_RADIUS, SERIES);
    }

    if let Some((slope, intercept)) = linear_fit(&series_points) {
        draw_trendline(&mut canvas, &space, slope, intercept);
    }

    // Records go on top of the series dots they coincide with.
    for &(x, y) in &points_of(records) {
        let (px, py) = space.project(x, y);
        draw_disc(&mut canvas, px, py, RECORD_RADIUS, RECORD);
    }

    canvas
}
