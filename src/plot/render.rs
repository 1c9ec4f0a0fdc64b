//! PNG rendering with plotters
//!
//! Every figure is drawn onto its own bitmap, so nothing drawn for one plot
//! can leak into the next. Charts use a fixed canvas; map overlays are drawn
//! directly onto a copy of the map raster at its native resolution.

use std::ops::Range;
use std::path::Path;

use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::figure::{Figure, FigureBody, Group, MapOverlay, Series};
use super::stats::{
    circle_points, dash_segments, jitter, kde, letter_values, sorted_finite, swarm_offsets,
    BoxSummary,
};
use crate::keys::DistributionKind;
use crate::{Error, Result};

/// Chart canvas size (px).
pub const CHART_SIZE: (u32, u32) = (1024, 768);

const FONT: &str = "sans-serif";
const CATEGORY_WIDTH: f64 = 0.8;
const KDE_POINTS: usize = 64;

fn render_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Render(format!("{e:?}"))
}

fn color(index: usize) -> RGBAColor {
    Palette99::pick(index).to_rgba()
}

/// Render a figure to a PNG file.
///
/// # Errors
///
/// Returns [`Error::Render`] if drawing fails or [`Error::Image`] if the
/// overlay cannot be encoded.
pub fn render_to_file(figure: &Figure, path: &Path) -> Result<()> {
    if let FigureBody::Map(overlay) = &figure.body {
        return render_map(figure, overlay, path);
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    match &figure.body {
        FigureBody::Line(series) => draw_lines(&root, figure, series)?,
        FigureBody::Bars { categories, groups } => draw_bars(&root, figure, categories, groups)?,
        FigureBody::Distribution { kind, groups } => {
            draw_distribution(&root, figure, *kind, groups)?;
        }
        FigureBody::Map(_) => {}
    }
    root.present().map_err(render_err)
}

/// Value range padded by 5 %, widened when degenerate.
fn padded(values: impl Iterator<Item = f64>, include_zero: bool) -> Range<f64> {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { lo.abs().max(1.0) * 0.5 };
    (lo - pad)..(hi + pad)
}

#[allow(clippy::cast_precision_loss)]
fn category_range(count: usize) -> Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

fn draw_lines(root: &DrawingArea<BitMapBackend<'_>, Shift>, figure: &Figure, series: &[Series]) -> Result<()> {
    let x_range = padded(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)), false);
    let y_range = padded(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)), false);

    let mut chart = ChartBuilder::on(root)
        .caption(figure.title(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()
        .map_err(render_err)?;

    for (i, s) in series.iter().enumerate() {
        let c = color(i);
        chart
            .draw_series(LineSeries::new(
                s.points.iter().copied().filter(|p| p.1.is_finite()),
                c.stroke_width(2),
            ))
            .map_err(render_err)?
            .label(s.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c.stroke_width(2)));
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn draw_bars(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    figure: &Figure,
    categories: &[String],
    groups: &[Group],
) -> Result<()> {
    let y_range = padded(groups.iter().flat_map(|g| g.values.iter().copied()), true);
    let y_floor = y_range.start;

    let mut chart = ChartBuilder::on(root)
        .caption(figure.title(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(categories.len()), y_range)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()
        .map_err(render_err)?;

    let width = CATEGORY_WIDTH / groups.len().max(1) as f64;
    for (g, group) in groups.iter().enumerate() {
        let c = color(g);
        let bars = group.values.iter().enumerate().filter(|(_, v)| v.is_finite()).map(|(ci, &v)| {
            let x0 = ci as f64 - CATEGORY_WIDTH / 2.0 + width * g as f64;
            Rectangle::new([(x0, 0.0), (x0 + width * 0.95, v)], c.filled())
        });
        chart
            .draw_series(bars)
            .map_err(render_err)?
            .label(group.label.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.filled()));
    }

    draw_category_labels(&mut chart, categories, y_floor)?;
    if !groups.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

type CategoryChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>>;

#[allow(clippy::cast_precision_loss)]
fn draw_category_labels(chart: &mut CategoryChart<'_, '_>, categories: &[String], y: f64) -> Result<()> {
    let style = TextStyle::from((FONT, 14).into_font()).color(&BLACK);
    chart
        .draw_series(categories.iter().enumerate().map(|(i, name)| {
            Text::new(name.clone(), (i as f64 - 0.1, y), style.clone())
        }))
        .map_err(render_err)?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn draw_distribution(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    figure: &Figure,
    kind: DistributionKind,
    groups: &[Group],
) -> Result<()> {
    let y_range = padded(groups.iter().flat_map(|g| g.values.iter().copied()), false);
    let y_floor = y_range.start;
    let y_span = y_range.end - y_range.start;

    let mut chart = ChartBuilder::on(root)
        .caption(figure.title(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(groups.len()), y_range)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()
        .map_err(render_err)?;

    let half = CATEGORY_WIDTH / 2.0;
    for (i, group) in groups.iter().enumerate() {
        let c = color(i);
        let x = i as f64;
        let sorted = sorted_finite(&group.values);
        if sorted.is_empty() {
            continue;
        }

        match kind {
            DistributionKind::Strip => {
                let points = group.values.iter().enumerate().filter(|(_, v)| v.is_finite()).map(|(j, &v)| {
                    Circle::new((x + jitter(j, half), v), 3, c.filled())
                });
                chart.draw_series(points).map_err(render_err)?;
            }
            DistributionKind::Swarm => {
                let offsets = swarm_offsets(&group.values, y_span / 80.0, 0.03, half);
                let points = group
                    .values
                    .iter()
                    .zip(offsets)
                    .filter(|(v, _)| v.is_finite())
                    .map(|(&v, dx)| Circle::new((x + dx, v), 3, c.filled()));
                chart.draw_series(points).map_err(render_err)?;
            }
            DistributionKind::Box => {
                let Some(summary) = BoxSummary::from_sorted(&sorted) else {
                    continue;
                };
                let w = half * 0.75;
                chart
                    .draw_series([
                        Rectangle::new([(x - w, summary.q1), (x + w, summary.q3)], c.mix(0.5).filled()),
                        Rectangle::new([(x - w, summary.q1), (x + w, summary.q3)], BLACK.stroke_width(1)),
                    ])
                    .map_err(render_err)?;
                chart
                    .draw_series([
                        PathElement::new(vec![(x - w, summary.median), (x + w, summary.median)], BLACK.stroke_width(2)),
                        PathElement::new(vec![(x, summary.q3), (x, summary.upper_whisker)], BLACK.stroke_width(1)),
                        PathElement::new(vec![(x, summary.q1), (x, summary.lower_whisker)], BLACK.stroke_width(1)),
                        PathElement::new(
                            vec![(x - w / 2.0, summary.upper_whisker), (x + w / 2.0, summary.upper_whisker)],
                            BLACK.stroke_width(1),
                        ),
                        PathElement::new(
                            vec![(x - w / 2.0, summary.lower_whisker), (x + w / 2.0, summary.lower_whisker)],
                            BLACK.stroke_width(1),
                        ),
                    ])
                    .map_err(render_err)?;
                let outliers = sorted
                    .iter()
                    .filter(|v| summary.is_outlier(**v))
                    .map(|&v| Circle::new((x, v), 3, BLACK.stroke_width(1)));
                chart.draw_series(outliers).map_err(render_err)?;
            }
            DistributionKind::Boxen => {
                let boxes = letter_values(&sorted);
                let levels = boxes.len().max(1) as f64;
                let rects = boxes.iter().enumerate().map(|(level, &(lo, hi))| {
                    let w = half * (1.0 - level as f64 / (levels + 1.0));
                    Rectangle::new([(x - w, lo), (x + w, hi)], c.mix(0.35).filled())
                });
                chart.draw_series(rects).map_err(render_err)?;
                if let Some(median) = super::stats::quantile(&sorted, 0.5) {
                    chart
                        .draw_series([PathElement::new(
                            vec![(x - half, median), (x + half, median)],
                            BLACK.stroke_width(2),
                        )])
                        .map_err(render_err)?;
                }
            }
            DistributionKind::Violin => {
                let curve = kde(&sorted, KDE_POINTS);
                let peak = curve.iter().map(|p| p.1).fold(0.0, f64::max);
                if peak <= 0.0 {
                    continue;
                }
                let mut outline: Vec<(f64, f64)> =
                    curve.iter().map(|&(y, d)| (x + half * d / peak, y)).collect();
                outline.extend(curve.iter().rev().map(|&(y, d)| (x - half * d / peak, y)));
                chart
                    .draw_series([Polygon::new(outline.clone(), c.mix(0.4).filled())])
                    .map_err(render_err)?;
                if let Some(first) = outline.first().copied() {
                    outline.push(first);
                }
                chart
                    .draw_series([PathElement::new(outline, c.stroke_width(1))])
                    .map_err(render_err)?;
            }
        }
    }

    let names: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    draw_category_labels(&mut chart, &names, y_floor)
}

#[allow(clippy::cast_possible_truncation)]
fn px((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn render_map(figure: &Figure, overlay: &MapOverlay, path: &Path) -> Result<()> {
    let (width, height) = overlay.map.dimensions();
    let mut buffer = overlay.map.pixels().clone().into_raw();

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_overlay(&root, figure, overlay)?;
        root.present().map_err(render_err)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| Error::Render("Overlay buffer does not match map size".to_string()))?;
    image.save(path)?;
    Ok(())
}

fn draw_overlay(root: &DrawingArea<BitMapBackend<'_>, Shift>, figure: &Figure, overlay: &MapOverlay) -> Result<()> {
    let obstacle_style = RGBColor(90, 90, 90).stroke_width(2);

    for marker in &overlay.static_obstacles {
        let outline = circle_points(marker.center, marker.radius.max(2.0), 32);
        draw_dashed(root, &outline, obstacle_style)?;
    }
    for waypoints in &overlay.dynamic_obstacles {
        draw_dashed(root, waypoints, obstacle_style)?;
    }

    for (i, series) in overlay.paths.iter().enumerate() {
        let points: Vec<(i32, i32)> = series.points.iter().copied().map(px).collect();
        root.draw(&PathElement::new(points, color(i).stroke_width(2)))
            .map_err(render_err)?;
    }

    if let Some(start) = overlay.start {
        root.draw(&Circle::new(px(start), 6, GREEN.filled())).map_err(render_err)?;
    }
    if let Some(goal) = overlay.goal {
        root.draw(&Cross::new(px(goal), 7, RED.stroke_width(3))).map_err(render_err)?;
    }

    let title_style = TextStyle::from((FONT, 18).into_font()).color(&BLACK);
    root.draw(&Text::new(figure.title().to_string(), (10, 8), title_style))
        .map_err(render_err)?;

    let label_style = TextStyle::from((FONT, 13).into_font()).color(&BLACK);
    for (i, series) in overlay.paths.iter().enumerate() {
        let y = 32 + 16 * i32::try_from(i).unwrap_or(i32::MAX / 32);
        root.draw(&PathElement::new(vec![(10, y + 6), (30, y + 6)], color(i).stroke_width(3)))
            .map_err(render_err)?;
        root.draw(&Text::new(series.label.clone(), (36, y), label_style.clone()))
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_dashed(root: &DrawingArea<BitMapBackend<'_>, Shift>, points: &[(f64, f64)], style: ShapeStyle) -> Result<()> {
    for [a, b] in dash_segments(points, 6.0, 4.0) {
        root.draw(&PathElement::new(vec![px(a), px(b)], style))
            .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        let range = padded([0.0, 10.0].into_iter(), false);
        assert!((range.start + 0.5).abs() < 1e-12);
        assert!((range.end - 10.5).abs() < 1e-12);
        assert_eq!(padded(std::iter::empty(), false), 0.0..1.0);
    }

    #[test]
    fn test_padded_range_includes_zero_for_bars() {
        let range = padded([4.0, 8.0].into_iter(), true);
        assert!(range.start < 0.0);
        let flat = padded([3.0, 3.0].into_iter(), false);
        assert!(flat.start < 3.0 && flat.end > 3.0);
    }
}
