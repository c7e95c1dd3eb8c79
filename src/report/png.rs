//! Learning-curve plot: loss panel on the left, accuracy panel on the right,
//! train series in blue and test series in orange.

use std::path::PathBuf;

use image::{Rgb, RgbImage};

use crate::error::Result;
use crate::report::CurveReporter;

const PANEL_W: u32 = 480;
const PANEL_H: u32 = 320;
const MARGIN: u32 = 24;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const TRAIN: Rgb<u8> = Rgb([31, 119, 180]);
const TEST: Rgb<u8> = Rgb([255, 127, 14]);

pub struct PngCurveReporter {
    path: PathBuf,
}

impl PngCurveReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PngCurveReporter { path: path.into() }
    }
}

impl CurveReporter for PngCurveReporter {
    fn render(
        &mut self,
        train_loss: &[f64],
        test_loss: &[f64],
        train_accuracy: &[f64],
        test_accuracy: &[f64],
    ) -> Result<()> {
        let img = draw_curves(train_loss, test_loss, train_accuracy, test_accuracy);
        img.save(&self.path)?;
        log::info!("Wrote learning-curve plot to {}", self.path.display());
        Ok(())
    }
}

/// Renders both panels into one image.
pub fn draw_curves(
    train_loss: &[f64],
    test_loss: &[f64],
    train_accuracy: &[f64],
    test_accuracy: &[f64],
) -> RgbImage {
    let mut img = RgbImage::from_pixel(PANEL_W * 2, PANEL_H, BACKGROUND);
    draw_panel(&mut img, 0, &[(train_loss, TRAIN), (test_loss, TEST)]);
    draw_panel(&mut img, PANEL_W, &[(train_accuracy, TRAIN), (test_accuracy, TEST)]);
    img
}

fn draw_panel(img: &mut RgbImage, x0: u32, series: &[(&[f64], Rgb<u8>)]) {
    let left = (x0 + MARGIN) as i64;
    let right = (x0 + PANEL_W - MARGIN) as i64;
    let top = MARGIN as i64;
    let bottom = (PANEL_H - MARGIN) as i64;

    draw_line(img, (left, bottom), (right, bottom), AXIS);
    draw_line(img, (left, top), (left, bottom), AXIS);

    let finite = series.iter().flat_map(|(s, _)| s.iter()).copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return;
    }
    let span = if hi - lo < 1e-12 { 1.0 } else { hi - lo };
    let n = series.iter().map(|(s, _)| s.len()).max().unwrap_or(0);

    let to_px = |i: usize, v: f64| -> (i64, i64) {
        let fx = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 };
        let fy = (v - lo) / span;
        (
            left + (fx * (right - left) as f64).round() as i64,
            bottom - (fy * (bottom - top) as f64).round() as i64,
        )
    };

    for &(values, color) in series {
        let points: Vec<(i64, i64)> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| to_px(i, v))
            .collect();
        for p in &points {
            draw_dot(img, *p, color);
        }
        for pair in points.windows(2) {
            draw_line(img, pair[0], pair[1], color);
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_dot(img: &mut RgbImage, (x, y): (i64, i64), color: Rgb<u8>) {
    for dx in -1..=1 {
        for dy in -1..=1 {
            put(img, x + dx, y + dy, color);
        }
    }
}

/// Bresenham line.
fn draw_line(img: &mut RgbImage, (mut x0, mut y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_both_colours() {
        let img = draw_curves(&[1.0, 0.6, 0.4], &[1.2, 0.9, 0.8], &[50.0, 70.0, 80.0], &[45.0, 60.0, 66.0]);
        assert_eq!(img.dimensions(), (PANEL_W * 2, PANEL_H));
        assert!(img.pixels().any(|p| *p == TRAIN));
        assert!(img.pixels().any(|p| *p == TEST));
    }

    #[test]
    fn test_empty_and_constant_series_do_not_panic() {
        draw_curves(&[], &[], &[], &[]);
        draw_curves(&[0.5], &[0.5], &[10.0], &[10.0]);
        draw_curves(&[f64::NAN, 1.0], &[1.0, 1.0], &[0.0, 0.0], &[0.0, 0.0]);
    }

    #[test]
    fn test_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.png");
        PngCurveReporter::new(&path)
            .render(&[1.0, 0.5], &[1.0, 0.7], &[50.0, 75.0], &[40.0, 70.0])
            .unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), PANEL_W * 2);
    }
}
